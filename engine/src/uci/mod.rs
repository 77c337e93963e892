//! UCI wire format: engine output lines and long-algebraic moves.

pub mod parser;

pub use parser::{parse_uci_message, parse_uci_move, UciMessage};

/// Failures talking UCI: pipe trouble or output we cannot read.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("engine pipe error: {0}")]
    Io(#[from] std::io::Error),
    #[error("engine process has no stdin pipe")]
    NoStdin,
    #[error("engine process has no stdout pipe")]
    NoStdout,
    #[error("malformed UCI line: {0:?}")]
    MalformedMessage(String),
    #[error("unrecognised UCI line: {0:?}")]
    UnknownMessage(String),
    #[error("bad UCI move {0:?}")]
    InvalidMove(String),
    #[error("bad square in UCI move {0:?}")]
    InvalidSquare(String),
    #[error("bad promotion piece in UCI move {0:?}")]
    InvalidPromotion(String),
}
