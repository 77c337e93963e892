//! Recoverable parse problems, collected rather than thrown.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// A `[`-line that did not yield a tag/value pair. The line is dropped.
    MalformedHeaderLine,
    /// A header block with no movetext. The game is not emitted.
    EmptyGame,
    /// A movetext token that is not a legal move in the current position.
    IllegalOrUnresolvableMove,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MalformedHeaderLine => "malformed header line",
            Self::EmptyGame => "empty game",
            Self::IllegalOrUnresolvableMove => "illegal or unresolvable move",
        }
    }
}

/// One recoverable problem found while parsing a file or a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostic {
    pub kind: DiagnosticKind,
    /// Ordinal of the game block in the source, counting dropped games.
    pub game_index: usize,
    /// 1-based source line, when the problem maps to one.
    pub line: Option<usize>,
    /// Ply index the offending move token would have occupied.
    pub ply: Option<usize>,
    /// The offending line or token.
    pub text: String,
    pub message: String,
}

impl ParseDiagnostic {
    pub fn malformed_header(game_index: usize, line: usize, text: &str) -> Self {
        Self {
            kind: DiagnosticKind::MalformedHeaderLine,
            game_index,
            line: Some(line),
            ply: None,
            text: text.to_string(),
            message: "header line is not of the form [Tag \"Value\"]".to_string(),
        }
    }

    pub fn empty_game(game_index: usize, line: usize, players: String) -> Self {
        Self {
            kind: DiagnosticKind::EmptyGame,
            game_index,
            line: Some(line),
            ply: None,
            text: players,
            message: "game has headers but no moves".to_string(),
        }
    }

    pub fn illegal_move(game_index: usize, ply: usize, token: &str, reason: impl std::fmt::Display) -> Self {
        Self {
            kind: DiagnosticKind::IllegalOrUnresolvableMove,
            game_index,
            line: None,
            ply: Some(ply),
            text: token.to_string(),
            message: reason.to_string(),
        }
    }
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "game {}", self.game_index + 1)?;
        if let Some(line) = self.line {
            write!(f, ", line {}", line)?;
        }
        if let Some(ply) = self.ply {
            write!(f, ", ply {}", ply)?;
        }
        write!(f, ": {}: {} ({:?})", self.kind.as_str(), self.message, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let diag = ParseDiagnostic::illegal_move(0, 2, "Qh5#?", "Invalid file: #");
        assert_eq!(
            diag.to_string(),
            "game 1, ply 2: illegal or unresolvable move: Invalid file: # (\"Qh5#?\")"
        );

        let diag = ParseDiagnostic::malformed_header(3, 17, "[White \"Tal]");
        assert!(diag.to_string().starts_with("game 4, line 17: malformed header line"));
    }

    #[test]
    fn test_serializes_to_json() {
        let diag = ParseDiagnostic::empty_game(1, 9, "Tal vs Botvinnik".to_string());
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "EmptyGame");
        assert_eq!(json["game_index"], 1);
        assert_eq!(json["line"], 9);
        assert!(json["ply"].is_null());
    }
}
