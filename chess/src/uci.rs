//! UCI (Universal Chess Interface) utilities

use chess_common::{format_piece, format_square};
use cozy_chess::{Board, File, Move, Square};

use crate::pgn::san::{is_castle, legal_moves};

/// Convert UCI castling notation to cozy_chess notation
///
/// UCI uses standard notation (king moves 2 squares): e1g1, e1c1, e8g8, e8c8
/// cozy_chess uses king-to-rook notation: e1h1, e1a1, e8h8, e8a8
///
/// Any other move is returned unchanged.
pub fn convert_uci_castling_to_cozy(board: &Board, mv: Move) -> Move {
    if board.piece_on(mv.from) != Some(cozy_chess::Piece::King) || mv.promotion.is_some() {
        return mv;
    }

    let from_file = mv.from.file() as u8;
    let to_file = mv.to.file() as u8;
    if mv.from.rank() != mv.to.rank() || from_file.abs_diff(to_file) != 2 {
        return mv;
    }

    let rook_file = if to_file > from_file { File::H } else { File::A };
    let converted = Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };

    if legal_moves(board).contains(&converted) {
        converted
    } else {
        mv
    }
}

/// Format a move in UCI notation (e.g., "e2e4", "e7e8q", "e1g1")
///
/// Castling is written as the two-square king move engines expect, not
/// the king-takes-rook form cozy-chess uses internally.
pub fn format_uci_move(board: &Board, mv: Move) -> String {
    let to = if is_castle(board, mv) {
        let file = if (mv.to.file() as u8) > (mv.from.file() as u8) {
            File::G
        } else {
            File::C
        };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    };

    let mut s = format!("{}{}", format_square(mv.from), format_square(to));
    if let Some(promo) = mv.promotion {
        s.push(format_piece(promo));
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::parse_fen;
    use cozy_chess::{Piece, Rank};

    #[test]
    fn test_format_uci_move() {
        let mv = Move {
            from: Square::new(File::E, Rank::Second),
            to: Square::new(File::E, Rank::Fourth),
            promotion: None,
        };
        assert_eq!(format_uci_move(&Board::default(), mv), "e2e4");
    }

    #[test]
    fn test_format_uci_move_with_promotion() {
        let board = parse_fen("8/4P2k/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mv = Move {
            from: Square::new(File::E, Rank::Seventh),
            to: Square::new(File::E, Rank::Eighth),
            promotion: Some(Piece::Queen),
        };
        assert_eq!(format_uci_move(&board, mv), "e7e8q");
    }

    #[test]
    fn test_castling_conversion_both_ways() {
        let board = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let uci = Move {
            from: Square::new(File::E, Rank::First),
            to: Square::new(File::G, Rank::First),
            promotion: None,
        };
        let cozy = convert_uci_castling_to_cozy(&board, uci);
        assert_eq!(cozy.to, Square::new(File::H, Rank::First));
        assert_eq!(format_uci_move(&board, cozy), "e1g1");

        let long = Move {
            from: Square::new(File::E, Rank::First),
            to: Square::new(File::C, Rank::First),
            promotion: None,
        };
        assert_eq!(convert_uci_castling_to_cozy(&board, long).to, Square::new(File::A, Rank::First));
    }

    #[test]
    fn test_non_castling_move_unchanged() {
        let board = Board::default();
        let mv = Move {
            from: Square::new(File::G, Rank::First),
            to: Square::new(File::F, Rank::Third),
            promotion: None,
        };
        assert_eq!(convert_uci_castling_to_cozy(&board, mv), mv);
    }
}
