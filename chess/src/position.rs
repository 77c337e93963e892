//! Board snapshots handed out by [`crate::Game::board_at`].

use cozy_chess::{Board, Square};

use crate::fen::{format_fen, parse_fen, FenError};
use crate::types::{PieceColor, PieceKind};

/// An immutable board position at some ply of a game.
///
/// This is the value passed to analysis engines and board renderers. The
/// underlying `cozy_chess::Board` is reachable through [`Position::board`]
/// for collaborators that already speak `cozy-chess`.
#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
}

impl Position {
    /// The standard starting position.
    pub fn start() -> Self {
        Self {
            board: Board::default(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Ok(Self {
            board: parse_fen(fen)?,
        })
    }

    pub(crate) fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Piece on the square at `file` (0 = a) and `rank` (0 = first rank).
    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        let sq = chess_common::parse_square(&format!(
            "{}{}",
            char::from(b'a' + file),
            char::from(b'1' + rank)
        ))?;
        self.piece_on_square(sq)
    }

    /// Piece on a square given in coordinate notation, e.g. `"f3"`.
    pub fn piece_on(&self, square: &str) -> Option<(PieceKind, PieceColor)> {
        chess_common::parse_square(square).and_then(|sq| self.piece_on_square(sq))
    }

    fn piece_on_square(&self, sq: Square) -> Option<(PieceKind, PieceColor)> {
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some((piece.into(), color.into()))
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.board.side_to_move().into()
    }

    pub fn fullmove_number(&self) -> u16 {
        self.board.fullmove_number()
    }

    pub fn fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn is_start(&self) -> bool {
        self.fen() == Self::start().fen()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::start()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fen())
    }
}
