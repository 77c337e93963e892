//! Canonical piece and color types for the project.
//! cozy-chess types are internal implementation details.

use serde::Serialize;

/// Project-owned piece type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Project-owned color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceKind {
    /// Board diagram symbol: uppercase for White, lowercase for Black.
    pub fn symbol(self, color: PieceColor) -> char {
        let upper = match self {
            Self::Pawn => 'P',
            Self::Knight => 'N',
            Self::Bishop => 'B',
            Self::Rook => 'R',
            Self::Queen => 'Q',
            Self::King => 'K',
        };
        match color {
            PieceColor::White => upper,
            PieceColor::Black => upper.to_ascii_lowercase(),
        }
    }
}

impl PieceColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl From<cozy_chess::Piece> for PieceKind {
    fn from(p: cozy_chess::Piece) -> Self {
        match p {
            cozy_chess::Piece::Pawn => Self::Pawn,
            cozy_chess::Piece::Knight => Self::Knight,
            cozy_chess::Piece::Bishop => Self::Bishop,
            cozy_chess::Piece::Rook => Self::Rook,
            cozy_chess::Piece::Queen => Self::Queen,
            cozy_chess::Piece::King => Self::King,
        }
    }
}

impl From<cozy_chess::Color> for PieceColor {
    fn from(c: cozy_chess::Color) -> Self {
        match c {
            cozy_chess::Color::White => Self::White,
            cozy_chess::Color::Black => Self::Black,
        }
    }
}

impl std::fmt::Display for PieceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol(PieceColor::White))
    }
}

impl std::fmt::Display for PieceColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols() {
        assert_eq!(PieceKind::Knight.symbol(PieceColor::White), 'N');
        assert_eq!(PieceKind::Knight.symbol(PieceColor::Black), 'n');
        assert_eq!(PieceKind::Queen.to_string(), "Q");
    }

    #[test]
    fn test_from_cozy() {
        assert_eq!(PieceKind::from(cozy_chess::Piece::Rook), PieceKind::Rook);
        assert_eq!(PieceColor::from(cozy_chess::Color::Black), PieceColor::Black);
        assert_eq!(PieceColor::from(cozy_chess::Color::White).as_str(), "white");
    }
}
