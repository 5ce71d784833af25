//! Which single slide is on screen.
//!
//! [`NavState`] is a plain value with pure transitions so any session layer
//! (terminal pager, HTTP handler) can own it. [`Navigator`] bundles the state
//! with the length of the deck it was loaded from.

use storydeck_common::{Deck, SlideRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavState {
    #[default]
    Empty,
    Viewing(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavCommand {
    Next,
    Previous,
    First,
    Last,
}

impl NavState {
    pub fn load(len: usize) -> Self {
        if len == 0 {
            Self::Empty
        } else {
            Self::Viewing(0)
        }
    }

    /// Advance one slide, stopping at the last.
    pub fn next(self, len: usize) -> Self {
        match self {
            Self::Viewing(i) if len > 0 => Self::Viewing((i + 1).min(len - 1)),
            _ => self.clamp(len),
        }
    }

    /// Go back one slide, stopping at the first.
    pub fn previous(self, len: usize) -> Self {
        match self {
            Self::Viewing(i) => Self::Viewing(i.saturating_sub(1)).clamp(len),
            Self::Empty => Self::Empty,
        }
    }

    pub fn apply(self, command: NavCommand, len: usize) -> Self {
        match command {
            NavCommand::Next => self.next(len),
            NavCommand::Previous => self.previous(len),
            NavCommand::First => match self {
                Self::Empty => Self::Empty,
                Self::Viewing(_) => Self::load(len),
            },
            NavCommand::Last => match self {
                Self::Viewing(_) if len > 0 => Self::Viewing(len - 1),
                _ => self.clamp(len),
            },
        }
    }

    pub fn position(self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::Viewing(i) => Some(i),
        }
    }

    fn clamp(self, len: usize) -> Self {
        match self {
            Self::Viewing(_) if len == 0 => Self::Empty,
            Self::Viewing(i) => Self::Viewing(i.min(len - 1)),
            Self::Empty => Self::Empty,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Navigator {
    len: usize,
    state: NavState,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_deck(deck: &Deck) -> Self {
        let mut nav = Self::new();
        nav.load(deck);
        nav
    }

    /// Start over on a new deck.
    pub fn load(&mut self, deck: &Deck) {
        self.len = deck.len();
        self.state = NavState::load(self.len);
    }

    pub fn apply(&mut self, command: NavCommand) {
        self.state = self.state.apply(command, self.len);
    }

    pub fn next(&mut self) {
        self.apply(NavCommand::Next);
    }

    pub fn previous(&mut self) {
        self.apply(NavCommand::Previous);
    }

    pub fn first(&mut self) {
        self.apply(NavCommand::First);
    }

    pub fn last(&mut self) {
        self.apply(NavCommand::Last);
    }

    pub fn state(&self) -> NavState {
        self.state
    }

    pub fn position(&self) -> Option<usize> {
        self.state.position()
    }

    pub fn is_first(&self) -> bool {
        self.position() == Some(0)
    }

    pub fn is_last(&self) -> bool {
        self.len > 0 && self.position() == Some(self.len - 1)
    }

    pub fn current<'a>(&self, deck: &'a Deck) -> Option<&'a SlideRecord> {
        self.position().and_then(|i| deck.get(i))
    }

    /// "3/12", or "0/0" for an empty deck.
    pub fn progress_label(&self) -> String {
        match self.position() {
            Some(i) => format!("{}/{}", i + 1, self.len),
            None => "0/0".to_string(),
        }
    }
}
