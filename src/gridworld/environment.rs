//! Deterministic grid-world environment

use std::{collections::HashSet, fmt};

use tracing::trace;

use super::{
    reward::{RewardContext, RewardFunction, RewardModel},
    state::{Action, State, Transition},
};
use crate::{Error, Result};

/// Rectangular grid the agent walks from a start cell to the bottom-right
/// goal cell.
///
/// Entering the goal cell does not end an episode: the agent must take
/// [`Action::Finish`] from there, which moves it to [`State::TERMINAL`].
#[derive(Debug)]
pub struct GridWorld {
    height: usize,
    width: usize,
    /// Cells indexed `[row][col]`, i.e. `[y][x]`
    states: Vec<Vec<State>>,
    start: State,
    current: Option<State>,
    previous: Option<State>,
    hazards: HashSet<(i32, i32)>,
    reward: Box<dyn RewardFunction>,
}

impl GridWorld {
    /// Create a `height` x `width` grid with the default reward model and
    /// the start cell at `(0, 0)`.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::InvalidConfiguration {
                message: format!("grid must be at least 1x1, got {height}x{width}"),
            });
        }
        let (rows, cols) = match (i32::try_from(height), i32::try_from(width)) {
            (Ok(rows), Ok(cols)) => (rows, cols),
            _ => {
                return Err(Error::InvalidConfiguration {
                    message: format!("grid {height}x{width} exceeds coordinate range"),
                });
            }
        };

        let states = (0..rows)
            .map(|y| (0..cols).map(|x| State::new(x, y)).collect())
            .collect();

        Ok(Self {
            height,
            width,
            states,
            start: State::new(0, 0),
            current: None,
            previous: None,
            hazards: HashSet::new(),
            reward: Box::new(RewardModel::default()),
        })
    }

    /// Replace the reward strategy (builder form)
    pub fn with_reward(mut self, reward: Box<dyn RewardFunction>) -> Self {
        self.reward = reward;
        self
    }

    /// Replace the reward strategy
    pub fn set_reward(&mut self, reward: Box<dyn RewardFunction>) {
        self.reward = reward;
    }

    /// Set the cell every episode starts from
    pub fn set_start_state(&mut self, x: i32, y: i32) -> Result<()> {
        self.start = self
            .state_at(x, y)
            .ok_or_else(|| Error::InvalidConfiguration {
                message: format!(
                    "start ({x},{y}) is outside the {}x{} grid",
                    self.height, self.width
                ),
            })?;
        Ok(())
    }

    /// Replace the set of hazard coordinates
    pub fn set_hazards<I>(&mut self, hazards: I) -> Result<()>
    where
        I: IntoIterator<Item = (i32, i32)>,
    {
        let mut accepted = HashSet::new();
        for (x, y) in hazards {
            if !self.contains(x, y) {
                return Err(Error::InvalidConfiguration {
                    message: format!(
                        "hazard ({x},{y}) is outside the {}x{} grid",
                        self.height, self.width
                    ),
                });
            }
            accepted.insert((x, y));
        }
        self.hazards = accepted;
        Ok(())
    }

    /// Put the agent back on the start cell
    pub fn reset(&mut self) -> State {
        self.current = Some(self.start);
        self.start
    }

    /// Take `action` from the current state.
    ///
    /// # Errors
    ///
    /// [`Error::EpisodeNotStarted`] before the first [`reset`](Self::reset),
    /// [`Error::IllegalAction`] if `action` is not among
    /// [`possible_actions`](Self::possible_actions) of the current state.
    pub fn step(&mut self, action: Action) -> Result<Transition> {
        let current = self.current.ok_or(Error::EpisodeNotStarted)?;
        let illegal = || Error::IllegalAction {
            state: current,
            action,
        };

        if !self.possible_actions(&current).contains(&action) {
            return Err(illegal());
        }

        let next_state = match action {
            Action::Right | Action::Left | Action::Up | Action::Down => {
                let (dx, dy) = action.offset().ok_or_else(illegal)?;
                self.state_at(current.x() + dx, current.y() + dy)
                    .ok_or_else(illegal)?
            }
            Action::Finish => State::TERMINAL,
        };

        let reward = self.reward.reward(&RewardContext {
            previous: current,
            next: next_state,
            goal: self.goal_state(),
            hazards: &self.hazards,
        });

        self.previous = Some(current);
        self.current = Some(next_state);
        trace!(from = %current, %action, to = %next_state, reward, "step");

        Ok(Transition {
            next_state,
            reward,
            done: next_state.is_terminal(),
        })
    }

    /// Legal actions at `state`.
    ///
    /// The goal cell only allows [`Action::Finish`]. Other cells allow every
    /// move that stays inside the grid, listed right, left, down, up. The
    /// terminal sentinel and off-grid states have no legal actions.
    pub fn possible_actions(&self, state: &State) -> Vec<Action> {
        if state.is_terminal() || !self.contains(state.x(), state.y()) {
            return Vec::new();
        }
        if *state == self.goal_state() {
            return vec![Action::Finish];
        }

        let (x, y) = state.coords();
        let mut actions = Vec::with_capacity(4);
        if x < self.last_col() {
            actions.push(Action::Right);
        }
        if x > 0 {
            actions.push(Action::Left);
        }
        if y < self.last_row() {
            actions.push(Action::Down);
        }
        if y > 0 {
            actions.push(Action::Up);
        }
        actions
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Grid rows, top to bottom
    pub fn states(&self) -> &[Vec<State>] {
        &self.states
    }

    /// All grid cells in row-major order (excludes the terminal sentinel)
    pub fn all_states(&self) -> impl Iterator<Item = State> + '_ {
        self.states.iter().flatten().copied()
    }

    /// Grid cell at `(x, y)`, if inside the grid
    pub fn state_at(&self, x: i32, y: i32) -> Option<State> {
        if !self.contains(x, y) {
            return None;
        }
        let row = self.states.get(usize::try_from(y).ok()?)?;
        row.get(usize::try_from(x).ok()?).copied()
    }

    pub fn start_state(&self) -> State {
        self.start
    }

    /// Bottom-right cell; reaching it still requires a [`Action::Finish`] step
    pub fn goal_state(&self) -> State {
        State::new(self.last_col(), self.last_row())
    }

    pub fn end_state(&self) -> State {
        State::TERMINAL
    }

    pub fn current_state(&self) -> Option<State> {
        self.current
    }

    pub fn previous_state(&self) -> Option<State> {
        self.previous
    }

    pub fn hazards(&self) -> &HashSet<(i32, i32)> {
        &self.hazards
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        (0..=self.last_col()).contains(&x) && (0..=self.last_row()).contains(&y)
    }

    fn last_col(&self) -> i32 {
        self.states.first().map_or(0, |row| row.len() as i32 - 1)
    }

    fn last_row(&self) -> i32 {
        self.states.len() as i32 - 1
    }
}

impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.states {
            for state in row {
                write!(f, "{state}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_grid() {
        assert!(matches!(
            GridWorld::new(0, 3),
            Err(Error::InvalidConfiguration { .. })
        ));
        assert!(GridWorld::new(1, 1).is_ok());
    }

    #[test]
    fn test_grid_layout_is_row_major() {
        let env = GridWorld::new(2, 3).unwrap();
        assert_eq!(env.states().len(), 2);
        assert_eq!(env.states()[0].len(), 3);
        assert_eq!(env.states()[1][2], State::new(2, 1));
        assert_eq!(env.goal_state(), State::new(2, 1));
        assert!(!env.goal_state().is_terminal());
        assert_eq!(env.to_string(), "(0,0)(1,0)(2,0)\n(0,1)(1,1)(2,1)\n");
    }

    #[test]
    fn test_action_counts_by_position() {
        let env = GridWorld::new(4, 4).unwrap();
        // corners
        assert_eq!(
            env.possible_actions(&State::new(0, 0)),
            vec![Action::Right, Action::Down]
        );
        assert_eq!(
            env.possible_actions(&State::new(3, 0)),
            vec![Action::Left, Action::Down]
        );
        assert_eq!(
            env.possible_actions(&State::new(0, 3)),
            vec![Action::Right, Action::Up]
        );
        // edges
        assert_eq!(env.possible_actions(&State::new(1, 0)).len(), 3);
        assert_eq!(env.possible_actions(&State::new(0, 2)).len(), 3);
        assert_eq!(env.possible_actions(&State::new(3, 1)).len(), 3);
        assert_eq!(env.possible_actions(&State::new(2, 3)).len(), 3);
        // interior
        assert_eq!(
            env.possible_actions(&State::new(1, 1)),
            vec![Action::Right, Action::Left, Action::Down, Action::Up]
        );
        // goal
        assert_eq!(
            env.possible_actions(&State::new(3, 3)),
            vec![Action::Finish]
        );
        assert!(env.possible_actions(&State::TERMINAL).is_empty());
        assert!(env.possible_actions(&State::new(4, 0)).is_empty());
    }

    #[test]
    fn test_single_column_grid() {
        let env = GridWorld::new(3, 1).unwrap();
        assert_eq!(env.possible_actions(&State::new(0, 0)), vec![Action::Down]);
        assert_eq!(
            env.possible_actions(&State::new(0, 1)),
            vec![Action::Down, Action::Up]
        );
        assert_eq!(
            env.possible_actions(&State::new(0, 2)),
            vec![Action::Finish]
        );
    }

    #[test]
    fn test_step_before_reset_fails() {
        let mut env = GridWorld::new(2, 2).unwrap();
        assert!(matches!(
            env.step(Action::Right),
            Err(Error::EpisodeNotStarted)
        ));
    }

    #[test]
    fn test_two_step_termination() {
        let mut env = GridWorld::new(2, 2)
            .unwrap()
            .with_reward(Box::new(RewardModel::flat(800.0, -1.0)));
        env.reset();

        let t = env.step(Action::Right).unwrap();
        assert_eq!(t.next_state, State::new(1, 0));
        assert_eq!(t.reward, -1.0);
        assert!(!t.done);

        let t = env.step(Action::Down).unwrap();
        assert_eq!(t.next_state, env.goal_state());
        assert!(!t.done, "entering the goal cell does not end the episode");

        let t = env.step(Action::Finish).unwrap();
        assert_eq!(t.next_state, State::TERMINAL);
        assert_eq!(t.reward, 800.0);
        assert!(t.done);
        assert_eq!(env.previous_state(), Some(State::new(1, 1)));
        assert_eq!(env.current_state(), Some(State::TERMINAL));
    }

    #[test]
    fn test_illegal_moves_are_rejected() {
        let mut env = GridWorld::new(3, 3).unwrap();
        env.reset();
        let err = env.step(Action::Left).unwrap_err();
        assert!(matches!(
            err,
            Error::IllegalAction {
                action: Action::Left,
                ..
            }
        ));
        // the failed step leaves the agent where it was
        assert_eq!(env.current_state(), Some(State::new(0, 0)));
        assert!(env.previous_state().is_none());
    }

    #[test]
    fn test_step_after_terminal_requires_reset() {
        let mut env = GridWorld::new(1, 1).unwrap();
        env.reset();
        assert!(env.step(Action::Finish).unwrap().done);
        assert!(matches!(
            env.step(Action::Finish),
            Err(Error::IllegalAction { .. })
        ));
        assert_eq!(env.reset(), State::new(0, 0));
    }

    #[test]
    fn test_start_and_hazard_validation() {
        let mut env = GridWorld::new(3, 4).unwrap();
        env.set_start_state(3, 2).unwrap();
        assert_eq!(env.reset(), State::new(3, 2));
        assert!(env.set_start_state(4, 0).is_err());
        assert!(env.set_start_state(0, -1).is_err());

        env.set_hazards([(1, 1), (2, 1)]).unwrap();
        assert_eq!(env.hazards().len(), 2);
        assert!(env.set_hazards([(9, 9)]).is_err());
        assert_eq!(env.hazards().len(), 2, "rejected update keeps the old set");
    }

    #[test]
    fn test_hazard_penalty_applies() {
        let mut env = GridWorld::new(3, 3)
            .unwrap()
            .with_reward(Box::new(RewardModel::flat(800.0, -5.0).with_hazard_penalty(-1000.0)));
        env.set_hazards([(1, 0)]).unwrap();
        env.reset();
        assert_eq!(env.step(Action::Right).unwrap().reward, -1000.0);
        assert_eq!(env.step(Action::Down).unwrap().reward, -5.0);
    }
}
