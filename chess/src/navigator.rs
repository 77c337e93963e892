//! Ply and game navigation for viewers.
//!
//! The viewer owns the cursor; [`Game`] itself never tracks a current ply.

use crate::game::{Game, GameError};
use crate::position::Position;

/// Current ply within one game, always inside `0..=len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlyCursor {
    ply: usize,
    len: usize,
}

impl PlyCursor {
    /// A cursor at the start of `game`.
    pub fn new(game: &Game) -> Self {
        Self {
            ply: 0,
            len: game.len(),
        }
    }

    pub fn ply(&self) -> usize {
        self.ply
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn at_start(&self) -> bool {
        self.ply == 0
    }

    pub fn at_end(&self) -> bool {
        self.ply == self.len
    }

    /// Step forward one ply. Returns `false` at the end.
    pub fn next(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.ply += 1;
        true
    }

    /// Step back one ply. Returns `false` at the start.
    pub fn prev(&mut self) -> bool {
        if self.at_start() {
            return false;
        }
        self.ply -= 1;
        true
    }

    pub fn first(&mut self) {
        self.ply = 0;
    }

    pub fn last(&mut self) {
        self.ply = self.len;
    }

    /// Jump to `ply`; out-of-range requests fail and leave the cursor alone.
    pub fn goto(&mut self, ply: usize) -> Result<(), GameError> {
        if ply > self.len {
            return Err(GameError::OutOfRange { ply, len: self.len });
        }
        self.ply = ply;
        Ok(())
    }

    pub fn position(&self, game: &Game) -> Result<Position, GameError> {
        game.board_at(self.ply)
    }
}

/// An in-memory game list with a selected game and a ply cursor into it.
#[derive(Debug, Clone, Default)]
pub struct GameBrowser {
    games: Vec<Game>,
    selected: Option<usize>,
    cursor: PlyCursor,
}

impl GameBrowser {
    /// Take ownership of `games`, selecting the first one if any.
    pub fn new(games: Vec<Game>) -> Self {
        let mut browser = Self {
            games,
            selected: None,
            cursor: PlyCursor::default(),
        };
        browser.select(0);
        browser
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&Game> {
        self.selected.and_then(|i| self.games.get(i))
    }

    pub fn cursor(&self) -> &PlyCursor {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut PlyCursor {
        &mut self.cursor
    }

    /// Select game `index` and rewind to its start. Returns `false` if
    /// there is no such game.
    pub fn select(&mut self, index: usize) -> bool {
        let Some(game) = self.games.get(index) else {
            return false;
        };
        self.cursor = PlyCursor::new(game);
        self.selected = Some(index);
        true
    }

    pub fn next_game(&mut self) -> bool {
        match self.selected {
            Some(i) => self.select(i + 1),
            None => false,
        }
    }

    pub fn prev_game(&mut self) -> bool {
        match self.selected {
            Some(i) if i > 0 => self.select(i - 1),
            _ => false,
        }
    }

    /// Remove a game from the list. The selection stays on the same index
    /// when possible, otherwise moves to the new last game.
    pub fn remove(&mut self, index: usize) -> Option<Game> {
        if index >= self.games.len() {
            return None;
        }
        let removed = self.games.remove(index);

        match self.selected {
            _ if self.games.is_empty() => {
                self.selected = None;
                self.cursor = PlyCursor::default();
            }
            Some(sel) if sel > index => {
                self.selected = Some(sel - 1);
            }
            Some(sel) if sel == index => {
                self.select(sel.min(self.games.len() - 1));
            }
            _ => {}
        }

        Some(removed)
    }

    /// Position of the selected game at the cursor.
    pub fn position(&self) -> Option<Result<Position, GameError>> {
        self.selected().map(|game| self.cursor.position(game))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::ParseOptions;
    use crate::pgn::parse_pgn;

    fn games() -> Vec<Game> {
        let text = "[Event \"A\"]\n\n1. e4 e5 2. Nf3 *\n\n[Event \"B\"]\n\n1. d4 *\n\n[Event \"C\"]\n\n1. c4 c5 *\n";
        parse_pgn(text, &ParseOptions::default()).games
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let games = games();
        let mut cursor = PlyCursor::new(&games[0]);
        assert!(cursor.at_start());
        assert!(!cursor.prev());
        assert!(cursor.next());
        assert!(cursor.next());
        assert!(cursor.next());
        assert!(!cursor.next());
        assert_eq!(cursor.ply(), 3);
        assert!(cursor.at_end());
        cursor.first();
        assert_eq!(cursor.ply(), 0);
        cursor.last();
        assert_eq!(cursor.ply(), 3);
    }

    #[test]
    fn test_goto_does_not_clamp() {
        let games = games();
        let mut cursor = PlyCursor::new(&games[0]);
        cursor.goto(2).unwrap();
        assert_eq!(cursor.goto(9), Err(GameError::OutOfRange { ply: 9, len: 3 }));
        assert_eq!(cursor.ply(), 2);
        let pos = cursor.position(&games[0]).unwrap();
        assert!(pos.piece_on("e5").is_some());
    }

    #[test]
    fn test_browser_selection_resets_cursor() {
        let mut browser = GameBrowser::new(games());
        assert_eq!(browser.selected_index(), Some(0));
        browser.cursor_mut().last();
        assert_eq!(browser.cursor().ply(), 3);

        assert!(browser.next_game());
        assert_eq!(browser.selected_index(), Some(1));
        assert_eq!(browser.cursor().ply(), 0);
        assert_eq!(browser.cursor().len(), 1);

        assert!(browser.next_game());
        assert!(!browser.next_game());
        assert_eq!(browser.selected_index(), Some(2));

        assert!(browser.prev_game());
        assert!(browser.prev_game());
        assert!(!browser.prev_game());
        assert_eq!(browser.selected_index(), Some(0));
    }

    #[test]
    fn test_browser_remove() {
        let mut browser = GameBrowser::new(games());
        browser.select(2);
        let removed = browser.remove(2).unwrap();
        assert_eq!(removed.headers().get("Event"), Some("C"));
        assert_eq!(browser.selected_index(), Some(1));

        browser.remove(0);
        assert_eq!(browser.selected_index(), Some(0));
        assert_eq!(browser.selected().unwrap().headers().get("Event"), Some("B"));

        browser.remove(0);
        assert!(browser.is_empty());
        assert_eq!(browser.selected_index(), None);
        assert!(browser.position().is_none());
        assert!(browser.remove(0).is_none());
    }

    #[test]
    fn test_empty_browser() {
        let mut browser = GameBrowser::new(Vec::new());
        assert!(browser.selected().is_none());
        assert!(!browser.next_game());
        assert!(!browser.select(0));
    }
}
