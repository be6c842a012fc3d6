//! Q-table implementation for temporal difference learning

use std::{collections::HashMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    gridworld::{Action, GridWorld, State},
};

/// Values of the actions recorded for one state, in the environment's
/// action order.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValues {
    entries: Vec<(Action, f64)>,
}

impl ActionValues {
    fn zeroed(actions: &[Action]) -> Self {
        Self {
            entries: actions.iter().map(|&action| (action, 0.0)).collect(),
        }
    }

    /// Value of `action`, if recorded
    pub fn get(&self, action: Action) -> Option<f64> {
        self.entries
            .iter()
            .find(|(a, _)| *a == action)
            .map(|&(_, value)| value)
    }

    fn get_mut(&mut self, action: Action) -> Option<&mut f64> {
        self.entries
            .iter_mut()
            .find(|(a, _)| *a == action)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn actions(&self) -> impl Iterator<Item = Action> + '_ {
        self.entries.iter().map(|&(action, _)| action)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Action with the highest value.
    ///
    /// Ties go to the action listed first, so the environment's action order
    /// is the tie-break.
    pub fn best(&self) -> Option<(Action, f64)> {
        self.entries
            .iter()
            .copied()
            .fold(None, |best, (action, value)| match best {
                Some((_, best_value)) if value <= best_value => best,
                _ => Some((action, value)),
            })
    }
}

/// One `(state, action, value)` row of a Q-table snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QEntry {
    pub state: State,
    pub action: Action,
    pub value: f64,
}

/// Q-table mapping (state, action) pairs to Q-values
///
/// The table is populated once from the environment's full state/action
/// space and never changes shape afterwards; only values are updated.
#[derive(Debug, Clone, Default)]
pub struct QTable {
    values: HashMap<State, ActionValues>,
    /// Grid rows as laid out by the environment, for ordered dumps
    layout: Vec<Vec<State>>,
}

impl QTable {
    /// Create an empty, uninitialized table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table populated for every state of `env`
    pub fn for_environment(env: &GridWorld) -> Result<Self> {
        let mut table = Self::new();
        table.init_q_values(env)?;
        Ok(table)
    }

    /// Populate zero-valued entries for every legal action of every grid
    /// state, plus the single finish entry of the terminal sentinel.
    pub fn init_q_values(&mut self, env: &GridWorld) -> Result<()> {
        if !self.values.is_empty() {
            return Err(Error::AlreadyInitialized {
                states: self.values.len(),
            });
        }

        for state in env.all_states() {
            let actions = env.possible_actions(&state);
            self.values.insert(state, ActionValues::zeroed(&actions));
        }
        self.values
            .insert(env.end_state(), ActionValues::zeroed(&[Action::Finish]));
        self.layout = env.states().to_vec();
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        !self.values.is_empty()
    }

    /// Action values recorded for `state`
    pub fn get_action_values(&self, state: &State) -> Result<&ActionValues> {
        self.values
            .get(state)
            .ok_or(Error::UninitializedState { state: *state })
    }

    /// Overwrite the value of one recorded (state, action) entry
    pub fn set_action_value(&mut self, state: &State, action: Action, value: f64) -> Result<()> {
        let values = self
            .values
            .get_mut(state)
            .ok_or(Error::UninitializedState { state: *state })?;
        let slot = values.get_mut(action).ok_or(Error::UnknownAction {
            state: *state,
            action,
        })?;
        *slot = value;
        Ok(())
    }

    /// Get Q-value for a state-action pair
    pub fn value(&self, state: &State, action: Action) -> Result<f64> {
        self.get_action_values(state)?
            .get(action)
            .ok_or(Error::UnknownAction {
                state: *state,
                action,
            })
    }

    /// Greedy action and its value (first maximum in action order)
    pub fn best_action(&self, state: &State) -> Result<(Action, f64)> {
        self.get_action_values(state)?
            .best()
            .ok_or(Error::UninitializedState { state: *state })
    }

    /// Maximum Q-value over the actions recorded for `state`
    pub fn max_value(&self, state: &State) -> Result<f64> {
        self.best_action(state).map(|(_, value)| value)
    }

    /// Q-learning update: off-policy TD control
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ max_a' Q(s',a') - Q(s,a)]
    ///
    /// Returns the TD error.
    pub fn q_learning_update(
        &mut self,
        state: &State,
        action: Action,
        reward: f64,
        next_state: &State,
        alpha: f64,
        discount_factor: f64,
    ) -> Result<f64> {
        let max_next_q = self.max_value(next_state)?;
        let current_q = self.value(state, action)?;
        let td_target = reward + discount_factor * max_next_q;
        let td_error = td_target - current_q;
        self.set_action_value(state, action, current_q + alpha * td_error)?;
        Ok(td_error)
    }

    /// Number of states with recorded values (grid cells plus the terminal sentinel)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Recorded states: grid cells row by row, then the terminal sentinel
    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.layout
            .iter()
            .flatten()
            .copied()
            .chain(self.values.contains_key(&State::TERMINAL).then_some(State::TERMINAL))
    }

    /// Flat, serializable listing of every entry
    pub fn snapshot(&self) -> Vec<QEntry> {
        self.states()
            .filter_map(|state| self.values.get(&state).map(|values| (state, values)))
            .flat_map(|(state, values)| {
                values.iter().map(move |(action, value)| QEntry {
                    state,
                    action,
                    value,
                })
            })
            .collect()
    }
}

impl fmt::Display for QTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.layout {
            for state in row {
                write!(f, "{state}[")?;
                if let Some(values) = self.values.get(state) {
                    for (action, value) in values.iter() {
                        write!(f, "{action}: {value:.3}\t")?;
                    }
                }
                write!(f, "]  ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
