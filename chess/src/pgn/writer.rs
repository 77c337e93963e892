//! PGN export.

use crate::game::{Game, GameMove};
use crate::types::PieceColor;

const MAX_LINE: usize = 80;

/// Render a game as PGN text that [`super::parse_pgn`] reads back into an
/// equal game.
///
/// Headers come first in roster order, then a blank line, then the
/// movetext wrapped at 80 columns and terminated by the result marker.
/// A game without headers is written as bare movetext.
pub fn to_pgn_text(game: &Game) -> String {
    let mut out = String::new();

    let headers = game.headers();
    if !headers.is_empty() {
        for (tag, value) in headers.ordered() {
            out.push_str(&format!("[{} \"{}\"]\n", tag, value));
        }
        out.push('\n');
    }

    let mut tokens = numbered_moves(game.moves(), None);
    let result = headers.result().map_or("*", |r| r.as_str());
    tokens.push(result.to_string());

    let mut line_len = 0;
    for token in tokens {
        if line_len > 0 && line_len + 1 + token.len() > MAX_LINE {
            out.push('\n');
            line_len = 0;
        }
        if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        line_len += token.len();
        out.push_str(&token);
    }
    out.push('\n');

    out
}

/// Export several games, separated by blank lines.
pub fn to_pgn_collection<'a>(games: impl IntoIterator<Item = &'a Game>) -> String {
    games
        .into_iter()
        .map(to_pgn_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Move numbers and SAN, one token each. The number `n.` precedes White's
/// move of each pair; with `current = Some(k)`, move `k - 1` is bracketed.
pub(crate) fn numbered_moves(moves: &[GameMove], current: Option<usize>) -> Vec<String> {
    let mut tokens = Vec::with_capacity(moves.len() * 3 / 2 + 1);
    for (i, entry) in moves.iter().enumerate() {
        if entry.color == PieceColor::White {
            tokens.push(format!("{}.", i / 2 + 1));
        }
        if current == Some(i + 1) {
            tokens.push(format!("[{}]", entry.san));
        } else {
            tokens.push(entry.san.clone());
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{build_game, ParseOptions};
    use crate::pgn::{parse_pgn, RawGame};

    fn game(headers: &[(&str, &str)], movetext: &str) -> Game {
        build_game(
            RawGame {
                index: 0,
                line: 1,
                headers: headers.iter().copied().collect(),
                movetext: movetext.to_string(),
            },
            &ParseOptions::default(),
        )
        .game
    }

    #[test]
    fn test_export_layout() {
        let g = game(
            &[("Black", "Botvinnik"), ("White", "Tal"), ("Result", "1-0"), ("ECO", "C20")],
            "1. e4 e5 2. Nf3 1-0",
        );
        assert_eq!(
            to_pgn_text(&g),
            "[White \"Tal\"]\n[Black \"Botvinnik\"]\n[Result \"1-0\"]\n[ECO \"C20\"]\n\n1. e4 e5 2. Nf3 1-0\n"
        );
    }

    #[test]
    fn test_export_without_headers_or_result() {
        let g = game(&[], "1. d4 d5");
        assert_eq!(to_pgn_text(&g), "1. d4 d5 *\n");
    }

    #[test]
    fn test_long_games_wrap() {
        let moves = "1. Nf3 Nf6 2. Ng1 Ng8 ".repeat(20);
        let g = game(&[("Event", "Shuffle")], &moves);
        let text = to_pgn_text(&g);
        assert!(text.lines().all(|line| line.len() <= MAX_LINE));
        let reparsed = parse_pgn(&text, &ParseOptions::default());
        assert_eq!(reparsed.games, vec![g]);
    }

    #[test]
    fn test_collection_roundtrip() {
        let a = game(&[("White", "A")], "1. e4 c5");
        let b = game(&[("White", "B")], "1. c4");
        let text = to_pgn_collection([&a, &b]);
        let reparsed = parse_pgn(&text, &ParseOptions::default());
        assert!(reparsed.diagnostics.is_empty());
        assert_eq!(reparsed.games, vec![a, b]);
    }
}
