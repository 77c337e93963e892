//! Text conversions for `cozy-chess` squares, files, ranks and pieces.

use cozy_chess::{File, Piece, Rank, Square};

/// Format a file as its lowercase letter (`a`..`h`).
pub fn format_file(file: File) -> char {
    match file {
        File::A => 'a',
        File::B => 'b',
        File::C => 'c',
        File::D => 'd',
        File::E => 'e',
        File::F => 'f',
        File::G => 'g',
        File::H => 'h',
    }
}

/// Format a rank as its digit (`1`..`8`).
pub fn format_rank(rank: Rank) -> char {
    match rank {
        Rank::First => '1',
        Rank::Second => '2',
        Rank::Third => '3',
        Rank::Fourth => '4',
        Rank::Fifth => '5',
        Rank::Sixth => '6',
        Rank::Seventh => '7',
        Rank::Eighth => '8',
    }
}

pub fn parse_file(c: char) -> Option<File> {
    match c {
        'a' => Some(File::A),
        'b' => Some(File::B),
        'c' => Some(File::C),
        'd' => Some(File::D),
        'e' => Some(File::E),
        'f' => Some(File::F),
        'g' => Some(File::G),
        'h' => Some(File::H),
        _ => None,
    }
}

pub fn parse_rank(c: char) -> Option<Rank> {
    match c {
        '1' => Some(Rank::First),
        '2' => Some(Rank::Second),
        '3' => Some(Rank::Third),
        '4' => Some(Rank::Fourth),
        '5' => Some(Rank::Fifth),
        '6' => Some(Rank::Sixth),
        '7' => Some(Rank::Seventh),
        '8' => Some(Rank::Eighth),
        _ => None,
    }
}

/// Format a square in coordinate notation, e.g. `e4`.
pub fn format_square(sq: Square) -> String {
    let mut s = String::with_capacity(2);
    s.push(format_file(sq.file()));
    s.push(format_rank(sq.rank()));
    s
}

/// Parse a two-character coordinate such as `e4`.
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = parse_file(chars.next()?)?;
    let rank = parse_rank(chars.next()?)?;
    if chars.next().is_some() {
        return None;
    }
    Some(Square::new(file, rank))
}

/// Lowercase piece letter as used by UCI promotions (`q`, `r`, `b`, `n`, ...).
pub fn format_piece(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

/// Uppercase piece letter as used by SAN (`N`, `B`, `R`, `Q`, `K`).
pub fn format_piece_upper(piece: Piece) -> char {
    format_piece(piece).to_ascii_uppercase()
}

/// Parse a piece letter of either case.
pub fn parse_piece(c: char) -> Option<Piece> {
    match c.to_ascii_lowercase() {
        'p' => Some(Piece::Pawn),
        'n' => Some(Piece::Knight),
        'b' => Some(Piece::Bishop),
        'r' => Some(Piece::Rook),
        'q' => Some(Piece::Queen),
        'k' => Some(Piece::King),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_text() {
        let sq = Square::new(File::E, Rank::Fourth);
        assert_eq!(format_square(sq), "e4");
        assert_eq!(parse_square("e4"), Some(sq));
    }

    #[test]
    fn test_parse_square_rejects_garbage() {
        assert_eq!(parse_square("i4"), None);
        assert_eq!(parse_square("e9"), None);
        assert_eq!(parse_square("e"), None);
        assert_eq!(parse_square("e44"), None);
    }

    #[test]
    fn test_piece_letters() {
        assert_eq!(format_piece(Piece::Knight), 'n');
        assert_eq!(format_piece_upper(Piece::Knight), 'N');
        assert_eq!(parse_piece('Q'), Some(Piece::Queen));
        assert_eq!(parse_piece('x'), None);
    }
}
