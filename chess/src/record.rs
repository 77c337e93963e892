//! Flat game records for storage and JSON output.

use serde::{Deserialize, Serialize};

use crate::game::{build_game, BuiltGame, Game, ParseOptions};
use crate::pgn::{split_games, to_pgn_text};

/// A game flattened to the columns a game library stores.
///
/// Missing tags are filled with the same fallbacks the headers use for
/// display (`Unknown` players, `*` result, `?` elsewhere). The full game,
/// every header included, lives in `pgn_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub event: String,
    pub site: String,
    pub date: String,
    pub round: String,
    pub white: String,
    pub black: String,
    pub result: String,
    pub white_elo: Option<u16>,
    pub black_elo: Option<u16>,
    pub eco: String,
    pub pgn_text: String,
}

impl GameRecord {
    pub fn from_game(game: &Game) -> Self {
        let h = game.headers();
        Self {
            event: h.event().to_string(),
            site: h.site().to_string(),
            date: h.date().to_string(),
            round: h.round().to_string(),
            white: h.white().to_string(),
            black: h.black().to_string(),
            result: h.result_text().to_string(),
            white_elo: h.white_elo(),
            black_elo: h.black_elo(),
            eco: h.eco().to_string(),
            pgn_text: to_pgn_text(game),
        }
    }

    /// Rebuild the game from `pgn_text`, the same way games from files are
    /// built. `None` when the text holds no game at all.
    pub fn to_game(&self, options: &ParseOptions) -> Option<BuiltGame> {
        let split = split_games(&self.pgn_text);
        let mut diagnostics = split.diagnostics;
        let raw = split.games.into_iter().next()?;
        let built = build_game(raw, options);
        diagnostics.extend(built.diagnostics);
        Some(BuiltGame {
            game: built.game,
            diagnostics,
        })
    }
}

impl From<&Game> for GameRecord {
    fn from(game: &Game) -> Self {
        Self::from_game(game)
    }
}
