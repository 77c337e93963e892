//! Movetext lexing and token classification.
//!
//! Movetext is reduced to three kinds of token: move numbers, result
//! markers and SAN candidates. Comments (`{...}` and `;` to end of line),
//! variations (`(...)`, nested) and numeric annotation glyphs (`$n`) are
//! dropped by the lexer so they never reach SAN resolution.

use serde::Serialize;

/// Game termination marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Ongoing,
}

impl GameResult {
    /// Parse one of the four PGN result markers.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1-0" => Some(Self::WhiteWins),
            "0-1" => Some(Self::BlackWins),
            "1/2-1/2" => Some(Self::Draw),
            "*" => Some(Self::Ongoing),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WhiteWins => "1-0",
            Self::BlackWins => "0-1",
            Self::Draw => "1/2-1/2",
            Self::Ongoing => "*",
        }
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovetextToken<'a> {
    /// `12.` or `12...`
    MoveNumber(u32),
    Result(GameResult),
    San(&'a str),
}

/// Classify a single whitespace-free word.
///
/// A word is a move number only when it is digits followed by dots and
/// nothing else; a period anywhere else leaves it a SAN candidate.
pub fn classify(word: &str) -> MovetextToken<'_> {
    if let Some(result) = GameResult::from_token(word) {
        return MovetextToken::Result(result);
    }
    match split_move_number(word) {
        Some((number, "")) => MovetextToken::MoveNumber(number),
        _ => MovetextToken::San(word),
    }
}

/// Split `12.` / `12...` / `12.Nf3` into the number and whatever follows the dots.
fn split_move_number(word: &str) -> Option<(u32, &str)> {
    let digits = word.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let dots = word[digits..].bytes().take_while(|&b| b == b'.').count();
    if dots == 0 {
        return None;
    }
    let number = word[..digits].parse().ok()?;
    Some((number, &word[digits + dots..]))
}

/// Lex movetext into classified tokens, in source order.
pub fn tokenize(movetext: &str) -> Vec<MovetextToken<'_>> {
    let mut tokens = Vec::new();
    let mut variation_depth = 0usize;
    let mut word_start: Option<usize> = None;
    let mut chars = movetext.char_indices();

    while let Some((i, c)) = chars.next() {
        let delimiter = matches!(c, '{' | ';' | '(' | ')') || c.is_whitespace();
        if !delimiter {
            word_start.get_or_insert(i);
            continue;
        }

        if let Some(start) = word_start.take() {
            if variation_depth == 0 {
                push_word(&mut tokens, &movetext[start..i]);
            }
        }

        match c {
            '{' => {
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                }
            }
            ';' => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' => variation_depth += 1,
            ')' => variation_depth = variation_depth.saturating_sub(1),
            _ => {}
        }
    }

    if let Some(start) = word_start {
        if variation_depth == 0 {
            push_word(&mut tokens, &movetext[start..]);
        }
    }

    tokens
}

fn push_word<'a>(tokens: &mut Vec<MovetextToken<'a>>, word: &'a str) {
    if word.starts_with('$') {
        return;
    }
    match split_move_number(word) {
        Some((number, rest)) if !rest.is_empty() && GameResult::from_token(word).is_none() => {
            tokens.push(MovetextToken::MoveNumber(number));
            tokens.push(classify(rest));
        }
        _ => tokens.push(classify(word)),
    }
}

/// Only the SAN candidates of `movetext`.
pub fn san_tokens(movetext: &str) -> impl Iterator<Item = &str> {
    tokenize(movetext).into_iter().filter_map(|token| match token {
        MovetextToken::San(san) => Some(san),
        _ => None,
    })
}
