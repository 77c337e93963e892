use serde::Serialize;
use std::collections::BTreeMap;

use super::movetext::GameResult;

/// Tags exported first, in this order.
pub const SEVEN_TAG_ROSTER: [&str; 7] = ["Event", "Site", "Date", "Round", "White", "Black", "Result"];

/// Tag-value pairs from a game's header block.
///
/// Only tags that were actually present in the source are stored. The
/// display accessors ([`GameHeaders::white`] and friends) supply fallback
/// text for missing tags without inserting anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GameHeaders {
    tags: BTreeMap<String, String>,
}

impl GameHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag, replacing any earlier value.
    ///
    /// Refuses pairs that could not be written back as a single `[Tag "Value"]`
    /// line: empty tag names, tags containing whitespace, `"` or `]`, and
    /// values containing a line break.
    pub fn insert(&mut self, tag: impl Into<String>, value: impl Into<String>) -> bool {
        let tag = tag.into();
        let value = value.into();
        if !is_valid_tag(&tag) || value.contains(['\n', '\r']) {
            return false;
        }
        self.tags.insert(tag, value);
        true
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.tags.get(tag).map(String::as_str)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Tags in export order: the seven-tag roster first, then the rest by name.
    pub fn ordered(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<(&str, &str)> = SEVEN_TAG_ROSTER
            .iter()
            .filter_map(|&tag| self.get(tag).map(|value| (tag, value)))
            .collect();
        out.extend(
            self.iter()
                .filter(|(tag, _)| !SEVEN_TAG_ROSTER.contains(tag)),
        );
        out
    }

    pub fn white(&self) -> &str {
        self.get("White").unwrap_or("Unknown")
    }

    pub fn black(&self) -> &str {
        self.get("Black").unwrap_or("Unknown")
    }

    pub fn result_text(&self) -> &str {
        self.get("Result").unwrap_or("*")
    }

    /// The Result tag, when it holds one of the four result markers.
    pub fn result(&self) -> Option<GameResult> {
        self.get("Result").and_then(GameResult::from_token)
    }

    pub fn event(&self) -> &str {
        self.get("Event").unwrap_or("?")
    }

    pub fn site(&self) -> &str {
        self.get("Site").unwrap_or("?")
    }

    pub fn date(&self) -> &str {
        self.get("Date").unwrap_or("?")
    }

    pub fn round(&self) -> &str {
        self.get("Round").unwrap_or("?")
    }

    pub fn eco(&self) -> &str {
        self.get("ECO").unwrap_or("?")
    }

    pub fn white_elo(&self) -> Option<u16> {
        self.get("WhiteElo").and_then(parse_elo)
    }

    pub fn black_elo(&self) -> Option<u16> {
        self.get("BlackElo").and_then(parse_elo)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for GameHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (tag, value) in iter {
            headers.insert(tag, value);
        }
        headers
    }
}

/// Extract `(tag, value)` from a `[Tag "Value"]` line.
///
/// The tag runs from after `[` to the first space; the value is everything
/// between the first and the last `"`. Returns `None` when the line has no
/// closing bracket, no space after the tag, or fewer than two quotes.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    let inner = line.strip_prefix('[')?;
    if !inner.contains(']') {
        return None;
    }

    let tag = &inner[..inner.find(' ')?];
    if !is_valid_tag(tag) {
        return None;
    }

    let first = line.find('"')?;
    let last = line.rfind('"')?;
    if last <= first {
        return None;
    }

    Some((tag.to_string(), line[first + 1..last].to_string()))
}

fn is_valid_tag(tag: &str) -> bool {
    !tag.is_empty() && !tag.contains(|c: char| c.is_whitespace() || c == '"' || c == ']')
}

/// Parse a rating tag. Non-digits are stripped; only 100..=3000 is accepted.
pub fn parse_elo(text: &str) -> Option<u16> {
    let text = text.trim();
    if text.is_empty() || text == "?" || text == "-" {
        return None;
    }
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    let rating: u16 = digits.parse().ok()?;
    (100..=3000).contains(&rating).then_some(rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header_line() {
        assert_eq!(
            parse_header_line(r#"[White "Tal, Mikhail"]"#),
            Some(("White".to_string(), "Tal, Mikhail".to_string()))
        );
        assert_eq!(
            parse_header_line(r#"  [Annotator ""]  "#),
            Some(("Annotator".to_string(), String::new()))
        );
    }

    #[test]
    fn test_malformed_header_lines() {
        assert_eq!(parse_header_line(r#"[White "Tal]"#), None);
        assert_eq!(parse_header_line(r#"[White "Tal""#), None);
        assert_eq!(parse_header_line("[White Tal]"), None);
        assert_eq!(parse_header_line(r#"[White"Tal"]"#), None);
        assert_eq!(parse_header_line(r#"[ "Tal"]"#), None);
        assert_eq!(parse_header_line("1. e4"), None);
    }

    #[test]
    fn test_fallbacks_are_not_stored() {
        let headers = GameHeaders::new();
        assert_eq!(headers.white(), "Unknown");
        assert_eq!(headers.black(), "Unknown");
        assert_eq!(headers.result_text(), "*");
        assert_eq!(headers.event(), "?");
        assert!(headers.is_empty());
        assert!(!headers.contains("White"));
    }

    #[test]
    fn test_insert_refuses_empty_tag() {
        let mut headers = GameHeaders::new();
        assert!(!headers.insert("", "x"));
        assert!(headers.insert("Event", "Casual"));
        assert!(headers.insert("Event", "Rated"));
        assert_eq!(headers.get("Event"), Some("Rated"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_insert_refuses_unwritable_pairs() {
        let mut headers = GameHeaders::new();
        assert!(!headers.insert("White Elo", "2700"));
        assert!(!headers.insert("Eve\"nt", "x"));
        assert!(!headers.insert("Event]", "x"));
        assert!(!headers.insert("Event", "line one\nline two"));
        assert!(headers.is_empty());

        assert!(headers.insert("Annotator", "A \"quoted\" name [x]"));
        let line = format!("[Annotator \"{}\"]", headers.get("Annotator").unwrap());
        assert_eq!(
            parse_header_line(&line),
            Some(("Annotator".to_string(), "A \"quoted\" name [x]".to_string()))
        );
    }

    #[test]
    fn test_ordered_puts_roster_first() {
        let headers: GameHeaders = [
            ("WhiteElo", "2700"),
            ("Result", "1-0"),
            ("ECO", "C20"),
            ("Event", "Casual"),
            ("White", "Tal"),
        ]
        .into_iter()
        .collect();
        let tags: Vec<&str> = headers.ordered().into_iter().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["Event", "White", "Result", "ECO", "WhiteElo"]);
    }

    #[test]
    fn test_parse_elo() {
        assert_eq!(parse_elo("2705"), Some(2705));
        assert_eq!(parse_elo(" 1850 "), Some(1850));
        assert_eq!(parse_elo("2100?"), Some(2100));
        assert_eq!(parse_elo("?"), None);
        assert_eq!(parse_elo("-"), None);
        assert_eq!(parse_elo("50"), None);
        assert_eq!(parse_elo("4000"), None);
        assert_eq!(parse_elo("abc"), None);
    }

    #[test]
    fn test_result_accessor() {
        let headers: GameHeaders = [("Result", "1/2-1/2")].into_iter().collect();
        assert_eq!(headers.result(), Some(GameResult::Draw));
        let headers: GameHeaders = [("Result", "?")].into_iter().collect();
        assert_eq!(headers.result(), None);
        assert_eq!(headers.result_text(), "?");
    }
}
