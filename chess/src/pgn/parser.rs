use std::path::{Path, PathBuf};

use super::headers::{parse_header_line, GameHeaders};
use crate::diagnostics::ParseDiagnostic;
use crate::game::{build_game, Game, ParseOptions};

/// One game's header block and raw movetext, before any chess validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawGame {
    /// Ordinal of this game block in the source, counting dropped games.
    pub index: usize,
    /// 1-based line where the game starts.
    pub line: usize,
    pub headers: GameHeaders,
    /// Movetext lines joined with newlines.
    pub movetext: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutput {
    pub games: Vec<RawGame>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Games built from a whole file plus every diagnostic collected on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPgn {
    pub games: Vec<Game>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    SeekingHeader,
    InHeaderBlock,
    InMovetext,
}

/// Split PGN text into `(headers, movetext)` pairs.
///
/// Line-oriented state machine:
///
/// - `SeekingHeader`: blank lines are skipped; a `[` line opens a header
///   block; any other line starts movetext for a game without headers.
/// - `InHeaderBlock`: `[` lines and blank lines stay; anything else starts
///   movetext. A `[` line after a blank line closes the block as a game
///   without moves and opens the next one.
/// - `InMovetext`: text lines are appended; a blank line ends the game and a
///   `[` line ends it and opens the next header block.
///
/// End of input ends the game in progress. Malformed header lines are
/// dropped and games without movetext are not emitted; both leave a
/// diagnostic. Lines starting with `%` are PGN escapes and are ignored.
pub fn split_games(text: &str) -> SplitOutput {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut out = SplitOutput::default();
    let mut state = SplitState::SeekingHeader;
    let mut pending: Option<RawGame> = None;
    let mut next_index = 0;
    // blank line seen since the last header line
    let mut header_gap = false;

    for (i, raw_line) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw_line.trim();

        if line.starts_with('%') {
            continue;
        }

        if line.is_empty() {
            match state {
                SplitState::InMovetext => {
                    finish_game(pending.take(), &mut out);
                    state = SplitState::SeekingHeader;
                }
                SplitState::InHeaderBlock => header_gap = true,
                SplitState::SeekingHeader => {}
            }
            continue;
        }

        if line.starts_with('[') {
            let closes_block = state == SplitState::InMovetext
                || (state == SplitState::InHeaderBlock && header_gap);
            if closes_block {
                finish_game(pending.take(), &mut out);
            }
            if closes_block || state == SplitState::SeekingHeader {
                pending = Some(open_game(&mut next_index, line_no));
            }
            state = SplitState::InHeaderBlock;
            header_gap = false;

            if let Some(game) = pending.as_mut() {
                match parse_header_line(line) {
                    Some((tag, value)) => {
                        game.headers.insert(tag, value);
                    }
                    None => {
                        tracing::debug!(line = line_no, "dropping malformed header line");
                        out.diagnostics
                            .push(ParseDiagnostic::malformed_header(game.index, line_no, line));
                    }
                }
            }
            continue;
        }

        if state == SplitState::SeekingHeader {
            pending = Some(open_game(&mut next_index, line_no));
        }
        state = SplitState::InMovetext;

        if let Some(game) = pending.as_mut() {
            if !game.movetext.is_empty() {
                game.movetext.push('\n');
            }
            game.movetext.push_str(line);
        }
    }

    finish_game(pending.take(), &mut out);
    out
}

fn open_game(next_index: &mut usize, line: usize) -> RawGame {
    let index = *next_index;
    *next_index += 1;
    RawGame {
        index,
        line,
        headers: GameHeaders::new(),
        movetext: String::new(),
    }
}

fn finish_game(game: Option<RawGame>, out: &mut SplitOutput) {
    let Some(game) = game else {
        return;
    };

    if game.movetext.trim().is_empty() {
        let players = format!("{} vs {}", game.headers.white(), game.headers.black());
        tracing::warn!(game = game.index, "no moves found for game: {}", players);
        out.diagnostics
            .push(ParseDiagnostic::empty_game(game.index, game.line, players));
        return;
    }

    out.games.push(game);
}

/// Parse every game in `text`.
///
/// Per-game problems never abort the parse: each game that splits cleanly
/// is built (possibly with fewer moves than its movetext names) and all
/// diagnostics are returned alongside.
pub fn parse_pgn(text: &str, options: &ParseOptions) -> ParsedPgn {
    let split = split_games(text);
    let mut parsed = ParsedPgn {
        games: Vec::with_capacity(split.games.len()),
        diagnostics: split.diagnostics,
    };

    for raw in split.games {
        let built = build_game(raw, options);
        parsed.games.push(built.game);
        parsed.diagnostics.extend(built.diagnostics);
    }

    for diag in &parsed.diagnostics {
        tracing::debug!("{}", diag);
    }
    tracing::info!(
        games = parsed.games.len(),
        diagnostics = parsed.diagnostics.len(),
        policy = options.policy.as_str(),
        "parsed PGN text"
    );

    parsed
}

/// Read and parse a PGN file.
///
/// Only I/O and decoding failures are errors; everything else is reported
/// through [`ParsedPgn::diagnostics`].
pub fn read_pgn_file(path: &Path, options: &ParseOptions) -> Result<ParsedPgn, PgnError> {
    let bytes = std::fs::read(path).map_err(|source| {
        tracing::error!("Failed to open PGN file {}: {}", path.display(), source);
        PgnError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let text = String::from_utf8(bytes).map_err(|e| {
        tracing::error!("PGN file {} is not valid UTF-8", path.display());
        PgnError::NotUtf8 {
            path: path.to_path_buf(),
            valid_up_to: e.utf8_error().valid_up_to(),
        }
    })?;

    let parsed = parse_pgn(&text, options);
    tracing::info!("Successfully parsed {} games from {}", parsed.games.len(), path.display());
    Ok(parsed)
}

#[derive(Debug, thiserror::Error)]
pub enum PgnError {
    #[error("cannot read {}: {source}", .path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid UTF-8 (first bad byte at offset {valid_up_to})", .path.display())]
    NotUtf8 { path: PathBuf, valid_up_to: usize },
}

impl PgnError {
    pub fn path(&self) -> &Path {
        match self {
            Self::FileUnreadable { path, .. } | Self::NotUtf8 { path, .. } => path,
        }
    }
}
