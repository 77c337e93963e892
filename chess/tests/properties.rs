use chess::pgn::{format_san, san::legal_moves};
use chess::{
    build_game, parse_pgn, split_games, to_pgn_collection, to_pgn_text, Game, GameError,
    GameHeaders, ParseOptions, RawGame,
};
use cozy_chess::Board;
use proptest::prelude::*;

/// Movetext for a random legal game: each byte picks one of the legal moves.
fn random_movetext(choices: &[u8]) -> String {
    let mut board = Board::default();
    let mut sans = Vec::new();
    for &choice in choices {
        let moves = legal_moves(&board);
        if moves.is_empty() {
            break;
        }
        let mv = moves[choice as usize % moves.len()];
        sans.push(format_san(&board, mv));
        board.play_unchecked(mv);
    }
    sans.join(" ")
}

fn headers_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[A-Z][A-Za-z]{0,8}", "[A-Za-z0-9.,?-]{0,12}"), 0..6)
}

fn game_strategy() -> impl Strategy<Value = Game> {
    (headers_strategy(), prop::collection::vec(any::<u8>(), 0..80)).prop_map(|(headers, choices)| {
        let raw = RawGame {
            index: 0,
            line: 1,
            headers: headers.into_iter().collect::<GameHeaders>(),
            movetext: random_movetext(&choices),
        };
        build_game(raw, &ParseOptions::default()).game
    })
}

proptest! {
    #[test]
    fn export_reparses_to_same_game(game in game_strategy()) {
        let text = to_pgn_text(&game);
        let split = split_games(&text);
        prop_assert!(split.diagnostics.is_empty());
        prop_assert_eq!(split.games.len(), 1);
        let rebuilt = build_game(split.games[0].clone(), &ParseOptions::default());
        prop_assert!(rebuilt.diagnostics.is_empty());
        prop_assert_eq!(&rebuilt.game, &game);
        prop_assert_eq!(to_pgn_text(&rebuilt.game), text);
    }

    #[test]
    fn every_ply_in_range_has_a_position(game in game_strategy(), extra in 1usize..10) {
        for ply in 0..=game.len() {
            prop_assert!(game.board_at(ply).is_ok());
        }
        let past = game.len() + extra;
        prop_assert_eq!(
            game.board_at(past).unwrap_err(),
            GameError::OutOfRange { ply: past, len: game.len() }
        );
    }

    #[test]
    fn concatenated_games_segment(games in prop::collection::vec(game_strategy(), 1..6)) {
        let text = to_pgn_collection(&games);
        let split = split_games(&text);
        prop_assert_eq!(split.games.len(), games.len());
    }

    #[test]
    fn reparsing_is_idempotent(games in prop::collection::vec(game_strategy(), 0..4), junk in "[a-h1-8NBRQK+#x= ]{0,30}") {
        let text = format!("{}\n{}\n", to_pgn_collection(&games), junk);
        let options = ParseOptions::default();
        prop_assert_eq!(parse_pgn(&text, &options), parse_pgn(&text, &options));
    }

    #[test]
    fn well_formed_headers_pass_through(headers in headers_strategy()) {
        let mut text = String::new();
        for (tag, value) in &headers {
            text.push_str(&format!("[{} \"{}\"]\n", tag, value));
        }
        text.push_str("\n1. e4 *\n");
        let split = split_games(&text);
        prop_assert_eq!(split.games.len(), 1);
        let parsed = &split.games[0].headers;
        let expected: GameHeaders = headers.into_iter().collect();
        prop_assert_eq!(parsed, &expected);
    }
}
