use cozy_chess::Board;

/// Parse a FEN string into a Board
pub fn parse_fen(fen: &str) -> Result<Board, FenError> {
    if fen.split_whitespace().count() < 4 {
        return Err(FenError::InvalidFormat);
    }
    fen.parse().map_err(|_| FenError::InvalidBoardLayout)
}

/// Format a Board as a FEN string
pub fn format_fen(board: &Board) -> String {
    // cozy-chess renders standard FEN through Display
    board.to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum FenError {
    #[error("Invalid FEN format")]
    InvalidFormat,
    #[error("Invalid board layout")]
    InvalidBoardLayout,
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn test_start_position_fen() {
        assert_eq!(format_fen(&Board::default()), START);
    }

    #[test]
    fn test_parse_fen_roundtrip() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let board = parse_fen(fen).unwrap();
        assert_eq!(format_fen(&board), fen);
    }

    #[test]
    fn test_parse_fen_rejects_short_input() {
        assert!(matches!(parse_fen("8/8/8"), Err(FenError::InvalidFormat)));
    }
}
