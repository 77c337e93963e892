use chess_common::{format_file, format_piece_upper, format_rank, format_square, parse_file, parse_piece, parse_rank};
use cozy_chess::{Board, File, GameStatus, Move, Piece, Rank, Square};

/// A SAN token broken into its parts, before it is matched against a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SanPattern {
    Castle {
        kingside: bool,
    },
    Normal {
        piece: Piece,
        from_file: Option<File>,
        from_rank: Option<Rank>,
        to: Square,
        promotion: Option<Piece>,
    },
}

/// Parse Standard Algebraic Notation (SAN) move
///
/// The grammar is strict: an optional piece letter, optional origin file
/// and rank, an optional `x` or `-`, the destination square, an optional
/// promotion (`=Q` or `Q`) and at most one `+`/`#`. Annotation glyphs such
/// as `!` or `?` are not part of SAN and make the token unresolvable.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let pattern = parse_pattern(san)?;

    let candidates: Vec<Move> = legal_moves(board)
        .into_iter()
        .filter(|&mv| matches_pattern(board, mv, pattern))
        .collect();

    match candidates.as_slice() {
        [mv] => Ok(*mv),
        [] => Err(SanError::NoLegalMove(san.to_string())),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

/// Format a move as SAN
///
/// `mv` must be legal in `board`; check and mate suffixes are computed by
/// playing the move on a copy of the board.
pub fn format_san(board: &Board, mv: Move) -> String {
    let Some(piece) = board.piece_on(mv.from) else {
        return format_move_simple(mv);
    };

    let mut san = String::new();
    if is_castle(board, mv) {
        san.push_str(if is_kingside(mv) { "O-O" } else { "O-O-O" });
    } else if piece == Piece::Pawn {
        if mv.from.file() != mv.to.file() {
            san.push(format_file(mv.from.file()));
            san.push('x');
        }
        san.push_str(&format_square(mv.to));
        if let Some(promo) = mv.promotion {
            san.push('=');
            san.push(format_piece_upper(promo));
        }
    } else {
        san.push(format_piece_upper(piece));
        san.push_str(&disambiguation(board, mv, piece));
        if board.piece_on(mv.to).is_some() {
            san.push('x');
        }
        san.push_str(&format_square(mv.to));
    }

    let mut after = board.clone();
    after.play_unchecked(mv);
    if !after.checkers().is_empty() {
        san.push(if matches!(after.status(), GameStatus::Won) {
            '#'
        } else {
            '+'
        });
    }

    san
}

/// All legal moves in `board`, castling encoded king-takes-rook as cozy-chess does.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

/// cozy-chess encodes castling as the king moving onto its own rook.
pub(crate) fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move())
}

fn is_kingside(mv: Move) -> bool {
    (mv.to.file() as u8) > (mv.from.file() as u8)
}

fn matches_pattern(board: &Board, mv: Move, pattern: SanPattern) -> bool {
    match pattern {
        SanPattern::Castle { kingside } => is_castle(board, mv) && is_kingside(mv) == kingside,
        SanPattern::Normal {
            piece,
            from_file,
            from_rank,
            to,
            promotion,
        } => {
            board.piece_on(mv.from) == Some(piece)
                && !is_castle(board, mv)
                && mv.to == to
                && mv.promotion == promotion
                && from_file.map_or(true, |f| mv.from.file() == f)
                && from_rank.map_or(true, |r| mv.from.rank() == r)
                // a bare pawn push never changes file
                && (piece != Piece::Pawn || from_file.is_some() || mv.from.file() == to.file())
        }
    }
}

fn parse_pattern(san: &str) -> Result<SanPattern, SanError> {
    let body = san
        .strip_suffix('+')
        .or_else(|| san.strip_suffix('#'))
        .unwrap_or(san);

    match body {
        "O-O" | "0-0" => return Ok(SanPattern::Castle { kingside: true }),
        "O-O-O" | "0-0-0" => return Ok(SanPattern::Castle { kingside: false }),
        _ => {}
    }

    let mut chars: Vec<char> = body.chars().collect();

    let mut promotion = None;
    if let Some(&last) = chars.last() {
        if matches!(last, 'N' | 'B' | 'R' | 'Q') {
            promotion = parse_piece(last);
            chars.pop();
            if chars.last() == Some(&'=') {
                chars.pop();
            }
        }
    }

    let (Some(rank_c), Some(file_c)) = (chars.pop(), chars.pop()) else {
        return Err(SanError::InvalidFormat(san.to_string()));
    };
    let file = parse_file(file_c).ok_or(SanError::InvalidFile(file_c))?;
    let rank = parse_rank(rank_c).ok_or(SanError::InvalidRank(rank_c))?;
    let to = Square::new(file, rank);

    let mut rest = chars.as_slice();

    let piece = match rest.first() {
        Some(&c) if matches!(c, 'N' | 'B' | 'R' | 'Q' | 'K') => {
            rest = &rest[1..];
            parse_piece(c).ok_or(SanError::InvalidFormat(san.to_string()))?
        }
        _ => Piece::Pawn,
    };

    if let Some((&last, init)) = rest.split_last() {
        if last == 'x' || last == '-' {
            rest = init;
        }
    }

    let mut from_file = None;
    if let Some(f) = rest.first().and_then(|&c| parse_file(c)) {
        from_file = Some(f);
        rest = &rest[1..];
    }

    let mut from_rank = None;
    if let Some(r) = rest.first().and_then(|&c| parse_rank(c)) {
        from_rank = Some(r);
        rest = &rest[1..];
    }

    if !rest.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    if promotion.is_some() && piece != Piece::Pawn {
        return Err(SanError::InvalidPromotion(san.to_string()));
    }

    Ok(SanPattern::Normal {
        piece,
        from_file,
        from_rank,
        to,
        promotion,
    })
}

/// Origin file and/or rank needed to tell `mv` apart from other legal moves
/// of the same piece type to the same square.
fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
                && !is_castle(board, *other)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }

    let shares_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

    if !shares_file {
        format_file(mv.from.file()).to_string()
    } else if !shares_rank {
        format_rank(mv.from.rank()).to_string()
    } else {
        format_square(mv.from)
    }
}

fn format_move_simple(mv: Move) -> String {
    format!("{}{}", format_square(mv.from), format_square(mv.to))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid file: {0}")]
    InvalidFile(char),
    #[error("Invalid rank: {0}")]
    InvalidRank(char),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}
