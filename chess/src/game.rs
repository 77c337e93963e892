use cozy_chess::{Board, Move, Piece};

use crate::diagnostics::ParseDiagnostic;
use crate::pgn::san::{self, SanError};
use crate::pgn::{movetext, writer, GameHeaders, RawGame};
use crate::position::Position;
use crate::types::{PieceColor, PieceKind};

/// What to do with the rest of a game's movetext once a token fails to
/// resolve. Both policies record a diagnostic for the failing token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MoveErrorPolicy {
    /// Stop at the first bad token and keep the moves validated so far.
    #[default]
    Truncate,
    /// Drop the bad token and keep going from the unchanged position.
    SkipAndContinue,
}

impl MoveErrorPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Truncate => "truncate",
            Self::SkipAndContinue => "skip",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub policy: MoveErrorPolicy,
}

impl ParseOptions {
    pub fn with_policy(policy: MoveErrorPolicy) -> Self {
        Self { policy }
    }
}

/// One validated ply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameMove {
    pub mv: Move,
    /// SAN as rendered against the position before the move.
    pub san: String,
    pub piece: PieceKind,
    pub color: PieceColor,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
}

impl GameMove {
    fn new(board: &Board, mv: Move) -> Result<Self, SanError> {
        let piece = board
            .piece_on(mv.from)
            .ok_or_else(|| SanError::NoLegalMove(chess_common::format_square(mv.from)))?;

        let captured = if san::is_castle(board, mv) {
            None
        } else if piece == Piece::Pawn && mv.from.file() != mv.to.file() && board.piece_on(mv.to).is_none() {
            // en passant
            Some(PieceKind::Pawn)
        } else {
            board.piece_on(mv.to).map(PieceKind::from)
        };

        Ok(Self {
            mv,
            san: san::format_san(board, mv),
            piece: piece.into(),
            color: board.side_to_move().into(),
            captured,
            promotion: mv.promotion.map(PieceKind::from),
        })
    }
}

/// A parsed game: its header map and its validated moves, one entry per ply.
///
/// A `Game` never changes after it is built. Which ply a viewer is showing
/// is tracked by [`crate::PlyCursor`], not here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Game {
    headers: GameHeaders,
    moves: Vec<GameMove>,
}

/// A game plus the diagnostics produced while building it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltGame {
    pub game: Game,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Replay a game's movetext against the standard start position.
///
/// Move numbers and result markers are skipped. Every SAN candidate that
/// does not resolve to a legal move yields a diagnostic; what happens next
/// depends on [`ParseOptions::policy`]. The header map is passed through
/// unchanged. A game with no valid moves is still returned.
pub fn build_game(raw: RawGame, options: &ParseOptions) -> BuiltGame {
    let mut board = Board::default();
    let mut moves = Vec::new();
    let mut diagnostics = Vec::new();

    for token in movetext::san_tokens(&raw.movetext) {
        let ply = moves.len();
        let resolved = san::parse_san(&board, token).and_then(|mv| GameMove::new(&board, mv));

        match resolved {
            Ok(entry) => {
                board.play_unchecked(entry.mv);
                moves.push(entry);
            }
            Err(err) => {
                tracing::debug!(game = raw.index, ply, token, "unresolvable move: {}", err);
                diagnostics.push(ParseDiagnostic::illegal_move(raw.index, ply, token, &err));
                match options.policy {
                    MoveErrorPolicy::Truncate => break,
                    MoveErrorPolicy::SkipAndContinue => continue,
                }
            }
        }
    }

    BuiltGame {
        game: Game {
            headers: raw.headers,
            moves,
        },
        diagnostics,
    }
}

impl Game {
    pub fn headers(&self) -> &GameHeaders {
        &self.headers
    }

    pub fn moves(&self) -> &[GameMove] {
        &self.moves
    }

    /// Number of plies.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// The position after `ply` half-moves, replayed from the start.
    ///
    /// Valid for `0..=len()`. Anything else is [`GameError::OutOfRange`];
    /// the request is never clamped.
    pub fn board_at(&self, ply: usize) -> Result<Position, GameError> {
        if ply > self.moves.len() {
            return Err(GameError::OutOfRange {
                ply,
                len: self.moves.len(),
            });
        }
        Ok(Position::from_board(self.replay(ply)))
    }

    /// Rebuild position from start + history. Every stored move was checked
    /// against its board when the game was built.
    fn replay(&self, ply: usize) -> Board {
        let mut board = Board::default();
        for entry in &self.moves[..ply] {
            board.play_unchecked(entry.mv);
        }
        board
    }

    pub fn san_moves(&self) -> Vec<&str> {
        self.moves.iter().map(|m| m.san.as_str()).collect()
    }

    /// Moves in UCI notation (`e1g1` for castling), as engines expect.
    pub fn uci_moves(&self) -> Vec<String> {
        let mut board = Board::default();
        self.moves
            .iter()
            .map(|entry| {
                let uci = crate::uci::format_uci_move(&board, entry.mv);
                board.play_unchecked(entry.mv);
                uci
            })
            .collect()
    }

    /// Numbered move list for display, e.g. `1. e4 e5 2. Nf3`.
    ///
    /// With `current = Some(k)` and `k > 0`, the move that led to ply `k`
    /// is bracketed.
    pub fn move_list(&self, current: Option<usize>) -> String {
        writer::numbered_moves(&self.moves, current).join(" ")
    }

    /// One-line description: players with ratings, result, event and date.
    pub fn summary(&self) -> String {
        let h = &self.headers;
        let elo = |e: Option<u16>| e.map_or_else(|| "?".to_string(), |e| e.to_string());
        let mut parts = vec![
            format!("{} ({})", h.white(), elo(h.white_elo())),
            "vs".to_string(),
            format!("{} ({})", h.black(), elo(h.black_elo())),
            format!("[{}]", h.result_text()),
        ];
        if let Some(event) = h.get("Event") {
            parts.push(format!("- {}", event));
        }
        if let Some(date) = h.get("Date") {
            parts.push(format!("({})", date));
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Ply {ply} is out of range (game has {len} plies)")]
    OutOfRange { ply: usize, len: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(headers: &[(&str, &str)], movetext: &str) -> RawGame {
        RawGame {
            index: 0,
            line: 1,
            headers: headers.iter().copied().collect(),
            movetext: movetext.to_string(),
        }
    }

    fn build(movetext: &str, policy: MoveErrorPolicy) -> BuiltGame {
        build_game(raw(&[], movetext), &ParseOptions::with_policy(policy))
    }

    #[test]
    fn test_build_simple_game() {
        let built = build_game(
            raw(&[("White", "Tal"), ("Result", "1-0")], "1. e4 e5 2. Nf3 1-0"),
            &ParseOptions::default(),
        );
        assert!(built.diagnostics.is_empty());
        let game = built.game;
        assert_eq!(game.san_moves(), vec!["e4", "e5", "Nf3"]);
        assert_eq!(game.headers().get("White"), Some("Tal"));
        assert_eq!(game.headers().len(), 2);
        assert_eq!(game.moves()[0].color, PieceColor::White);
        assert_eq!(game.moves()[1].color, PieceColor::Black);
        assert_eq!(game.moves()[2].piece, PieceKind::Knight);
    }

    #[test]
    fn test_truncate_policy_keeps_prefix() {
        let built = build("1. e4 e5 2. Qh5#? 3. Ng8", MoveErrorPolicy::Truncate);
        assert_eq!(built.game.san_moves(), vec!["e4", "e5"]);
        assert_eq!(built.diagnostics.len(), 1);
        assert_eq!(built.diagnostics[0].ply, Some(2));
        assert_eq!(built.diagnostics[0].text, "Qh5#?");
    }

    #[test]
    fn test_skip_policy_continues_from_same_position() {
        let built = build("1. e4 e5 2. Qh5#? Nf3 Nc6", MoveErrorPolicy::SkipAndContinue);
        assert_eq!(built.game.san_moves(), vec!["e4", "e5", "Nf3", "Nc6"]);
        assert_eq!(built.diagnostics.len(), 1);
        assert_eq!(built.diagnostics[0].ply, Some(2));
    }

    #[test]
    fn test_unplayable_movetext_still_yields_game() {
        let built = build("1. Ke2?? Ke7", MoveErrorPolicy::SkipAndContinue);
        assert!(built.game.is_empty());
        assert_eq!(built.diagnostics.len(), 2);
        assert!(built.game.board_at(0).unwrap().is_start());
    }

    #[test]
    fn test_board_at_bounds() {
        let game = build("1. e4 e5 2. Nf3", MoveErrorPolicy::Truncate).game;
        assert!(game.board_at(0).unwrap().is_start());
        let pos = game.board_at(3).unwrap();
        assert_eq!(pos.piece_on("f3"), Some((PieceKind::Knight, PieceColor::White)));
        assert_eq!(pos.piece_on("e4"), Some((PieceKind::Pawn, PieceColor::White)));
        assert_eq!(pos.piece_on("e5"), Some((PieceKind::Pawn, PieceColor::Black)));
        assert_eq!(pos.piece_on("g1"), None);
        assert_eq!(game.board_at(4).unwrap_err(), GameError::OutOfRange { ply: 4, len: 3 });
    }

    #[test]
    fn test_captures_recorded() {
        let game = build("1. e4 d5 2. exd5 Qxd5 3. Nc3", MoveErrorPolicy::Truncate).game;
        assert_eq!(game.moves()[2].captured, Some(PieceKind::Pawn));
        assert_eq!(game.moves()[3].captured, Some(PieceKind::Pawn));
        assert_eq!(game.moves()[4].captured, None);
    }

    #[test]
    fn test_castling_uci_and_capture_flag() {
        let game = build("1. e4 e5 2. Nf3 Nc6 3. Bc4 Bc5 4. O-O", MoveErrorPolicy::Truncate).game;
        let last = game.moves().last().unwrap();
        assert_eq!(last.san, "O-O");
        assert_eq!(last.captured, None);
        assert_eq!(game.uci_moves().last().map(String::as_str), Some("e1g1"));
    }

    #[test]
    fn test_move_list_and_summary() {
        let built = build_game(
            raw(
                &[("White", "Tal"), ("Black", "Botvinnik"), ("WhiteElo", "2700"), ("Result", "1-0"), ("Event", "WCh")],
                "1. e4 e5 2. Nf3",
            ),
            &ParseOptions::default(),
        );
        let game = built.game;
        assert_eq!(game.move_list(None), "1. e4 e5 2. Nf3");
        assert_eq!(game.move_list(Some(2)), "1. e4 [e5] 2. Nf3");
        assert_eq!(game.summary(), "Tal (2700) vs Botvinnik (?) [1-0] - WCh");
    }
}
