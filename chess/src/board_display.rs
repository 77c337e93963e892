//! Plain-text board diagrams for terminal output.

use crate::position::Position;
use crate::types::{PieceColor, PieceKind};

/// An 8x8 board for display purposes only.
#[derive(Debug, Clone, Default)]
pub struct DisplayBoard {
    squares: [[Option<(PieceKind, PieceColor)>; 8]; 8],
    flipped: bool,
}

impl DisplayBoard {
    pub fn from_position(position: &Position) -> Self {
        let mut squares = [[None; 8]; 8];
        for (rank, row) in squares.iter_mut().enumerate() {
            for (file, square) in row.iter_mut().enumerate() {
                *square = position.piece_at(file as u8, rank as u8);
            }
        }
        Self {
            squares,
            flipped: false,
        }
    }

    /// Draw from Black's side.
    pub fn flipped(mut self, flipped: bool) -> Self {
        self.flipped = flipped;
        self
    }

    pub fn piece_at(&self, file: u8, rank: u8) -> Option<(PieceKind, PieceColor)> {
        if file > 7 || rank > 7 {
            return None;
        }
        self.squares[rank as usize][file as usize]
    }

    /// Rank labels on the left, file labels underneath, `.` for empty squares.
    pub fn render(&self) -> String {
        let ranks: Vec<usize> = if self.flipped {
            (0..8).collect()
        } else {
            (0..8).rev().collect()
        };
        let files: Vec<usize> = if self.flipped {
            (0..8).rev().collect()
        } else {
            (0..8).collect()
        };

        let mut out = String::with_capacity(8 * 20 + 20);
        for &rank in &ranks {
            out.push(char::from(b'1' + rank as u8));
            for &file in &files {
                out.push(' ');
                out.push(match self.squares[rank][file] {
                    Some((kind, color)) => kind.symbol(color),
                    None => '.',
                });
            }
            out.push('\n');
        }
        out.push(' ');
        for &file in &files {
            out.push(' ');
            out.push(char::from(b'a' + file as u8));
        }
        out.push('\n');
        out
    }
}

impl std::fmt::Display for DisplayBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}
