//! UCI engine adapter used for position analysis.
//!
//! [`UciEngine`] owns one engine process and implements
//! [`chess::AnalysisProvider`]. [`discover_engines`] and
//! [`default_engine`] find engine binaries under a directory.

pub mod discovery;
pub mod process;
pub mod uci;

pub use discovery::{default_engine, discover_engines, EngineCandidate};
pub use process::{EngineError, EngineOptions, UciEngine};
pub use uci::{parse_uci_message, parse_uci_move, UciError, UciMessage};

use chess::AnalysisScore;
use cozy_chess::Move;

/// Engine analysis information from one `info` line.
#[derive(Debug, Clone, Default)]
pub struct EngineInfo {
    pub depth: Option<u8>,
    pub seldepth: Option<u8>,
    pub time_ms: Option<u64>,
    pub nodes: Option<u64>,
    pub score: Option<Score>,
    pub pv: Vec<Move>, // Principal variation
    pub multipv: Option<u8>,
    pub currmove: Option<Move>,
    pub hashfull: Option<u16>,
    pub nps: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Centipawns(i32),
    Mate(i8), // Negative for being mated
}

impl From<Score> for AnalysisScore {
    fn from(score: Score) -> Self {
        match score {
            Score::Centipawns(cp) => AnalysisScore::Centipawns(cp),
            Score::Mate(m) => AnalysisScore::Mate(i32::from(m)),
        }
    }
}
