//! PGN parsing and game navigation for pgnview.
//!
//! Raw PGN text is split into header/movetext pairs by
//! [`pgn::split_games`], each pair is replayed into a [`Game`] by
//! [`build_game`], and positions are derived on demand with
//! [`Game::board_at`]. Recoverable problems never abort a parse; they are
//! returned as [`ParseDiagnostic`]s next to the games that did build.

pub mod analysis;
pub mod board_display;
pub mod diagnostics;
pub mod fen;
pub mod game;
pub mod navigator;
pub mod pgn;
pub mod position;
pub mod record;
pub mod types;
pub mod uci;

pub use analysis::{AnalysisLine, AnalysisProvider, AnalysisRequest, AnalysisScore, SearchLimit};
pub use board_display::DisplayBoard;
pub use diagnostics::{DiagnosticKind, ParseDiagnostic};
pub use game::{build_game, BuiltGame, Game, GameError, GameMove, MoveErrorPolicy, ParseOptions};
pub use navigator::{GameBrowser, PlyCursor};
pub use pgn::{
    parse_pgn, read_pgn_file, split_games, to_pgn_collection, to_pgn_text, GameHeaders,
    GameResult, ParsedPgn, PgnError, RawGame,
};
pub use position::Position;
pub use record::GameRecord;
pub use types::{PieceColor, PieceKind};
