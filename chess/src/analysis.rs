//! Engine analysis types shared by the viewer and engine adapters.

use std::future::Future;

use cozy_chess::{Board, Move};
use serde::{Deserialize, Serialize};

use crate::pgn::san::{format_san, legal_moves};
use crate::position::Position;
use crate::uci::convert_uci_castling_to_cozy;

/// Engine evaluation score.
///
/// Centipawns: positive = side-to-move is better.
/// Mate: positive N = side-to-move mates in N moves,
/// negative N = side-to-move gets mated in N moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisScore {
    Centipawns(i32),
    Mate(i32),
}

impl AnalysisScore {
    pub fn display(&self) -> String {
        match self {
            Self::Centipawns(cp) => format!("{:+.2}", *cp as f64 / 100.0),
            Self::Mate(m) => {
                if *m > 0 {
                    format!("+M{}", m)
                } else {
                    format!("-M{}", m.abs())
                }
            }
        }
    }
}

impl std::fmt::Display for AnalysisScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// How long the engine may think.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchLimit {
    Depth(u32),
    /// Milliseconds.
    MoveTime(u64),
}

impl Default for SearchLimit {
    fn default() -> Self {
        Self::Depth(20)
    }
}

/// A position to analyse, usually straight from [`crate::Game::board_at`].
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub position: Position,
    pub limit: SearchLimit,
    /// Number of principal variations wanted (UCI `MultiPV`), at least 1.
    pub lines: u8,
}

impl AnalysisRequest {
    pub fn new(position: Position, limit: SearchLimit, lines: u8) -> Self {
        Self {
            position,
            limit,
            lines: lines.max(1),
        }
    }
}

/// One principal variation reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisLine {
    /// 1-based MultiPV index.
    pub multipv: u8,
    pub depth: u32,
    pub score: AnalysisScore,
    /// The variation in SAN, already numbered (`"1. e4 e5 2. Nf3"`).
    pub variation: String,
}

impl AnalysisLine {
    /// `Line 1: +0.35 1. e4 e5 2. Nf3`
    pub fn display(&self) -> String {
        format!("Line {}: {} {}", self.multipv, self.score, self.variation)
            .trim_end()
            .to_string()
    }
}

/// Render engine PV moves (UCI castling form allowed) as numbered SAN.
///
/// Stops at the first move that is not legal in the position reached so
/// far, so a stale or truncated PV still yields its valid prefix.
pub fn variation_san(position: &Position, pv: &[Move]) -> String {
    let mut board: Board = position.board().clone();
    let mut tokens = Vec::with_capacity(pv.len() * 3 / 2 + 1);
    let mut fullmove = position.fullmove_number();

    for (i, &uci) in pv.iter().enumerate() {
        let mv = convert_uci_castling_to_cozy(&board, uci);
        if !legal_moves(&board).contains(&mv) {
            tracing::debug!(index = i, "PV move is not legal here, truncating variation");
            break;
        }

        let white = board.side_to_move() == cozy_chess::Color::White;
        if white {
            tokens.push(format!("{}.", fullmove));
        } else if i == 0 {
            tokens.push(format!("{}...", fullmove));
        }

        tokens.push(format_san(&board, mv));
        board.play_unchecked(mv);
        if !white {
            fullmove = fullmove.saturating_add(1);
        }
    }

    tokens.join(" ")
}

/// Something that can evaluate positions, such as a UCI engine process.
pub trait AnalysisProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    fn analyse(
        &mut self,
        request: &AnalysisRequest,
    ) -> impl Future<Output = Result<Vec<AnalysisLine>, Self::Error>> + Send;
}
