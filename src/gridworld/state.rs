//! States and actions of the grid world

use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell of the grid, or the terminal sentinel.
///
/// States are plain values: two states are equal iff their coordinates and
/// terminal flag match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State {
    x: i32,
    y: i32,
    terminal: bool,
}

impl State {
    /// The single terminal sentinel, outside the grid coordinate space.
    pub const TERMINAL: State = State {
        x: -1,
        y: -1,
        terminal: true,
    };

    /// Create a non-terminal grid cell state.
    pub const fn new(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            terminal: false,
        }
    }

    pub const fn x(&self) -> i32 {
        self.x
    }

    pub const fn y(&self) -> i32 {
        self.y
    }

    pub const fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Coordinates as an `(x, y)` pair
    pub const fn coords(&self) -> (i32, i32) {
        (self.x, self.y)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// A move in the grid, or the finish action that leaves the goal cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Right,
    Left,
    Up,
    Down,
    Finish,
}

impl Action {
    /// Every action, in declaration order
    pub const ALL: [Action; 5] = [
        Action::Right,
        Action::Left,
        Action::Up,
        Action::Down,
        Action::Finish,
    ];

    /// Coordinate offset `(dx, dy)` of a directional move.
    ///
    /// Returns `None` for [`Action::Finish`], which does not move within the grid.
    pub const fn offset(self) -> Option<(i32, i32)> {
        match self {
            Action::Right => Some((1, 0)),
            Action::Left => Some((-1, 0)),
            Action::Up => Some((0, -1)),
            Action::Down => Some((0, 1)),
            Action::Finish => None,
        }
    }

    /// Single-letter tag used in dumps
    pub const fn symbol(self) -> char {
        match self {
            Action::Right => 'r',
            Action::Left => 'l',
            Action::Up => 'u',
            Action::Down => 'd',
            Action::Finish => 't',
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Result of one environment step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub next_state: State,
    pub reward: f64,
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_equality_includes_terminal_flag() {
        assert_eq!(State::new(1, 2), State::new(1, 2));
        assert_ne!(State::new(-1, -1), State::TERMINAL);
        assert!(State::TERMINAL.is_terminal());
        assert!(!State::new(0, 0).is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(State::new(3, 1).to_string(), "(3,1)");
        assert_eq!(State::TERMINAL.to_string(), "(-1,-1)");
        let tags: String = Action::ALL.iter().map(|a| a.symbol()).collect();
        assert_eq!(tags, "rludt");
    }

    #[test]
    fn test_offsets() {
        assert_eq!(Action::Right.offset(), Some((1, 0)));
        assert_eq!(Action::Up.offset(), Some((0, -1)));
        assert_eq!(Action::Finish.offset(), None);
    }
}
