//! Greedy evaluation of a learned Q-table

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    gridworld::{Action, GridWorld, State},
    q_learning::QTable,
};

/// Trajectory produced by following the greedy policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rollout {
    /// Visited states, starting with the start state
    pub states: Vec<State>,
    /// Actions taken; one fewer than `states`
    pub actions: Vec<Action>,
    pub total_reward: f64,
    pub reached_terminal: bool,
}

impl Rollout {
    pub fn steps(&self) -> usize {
        self.actions.len()
    }

    /// Path rendered as `(0,0) -r-> (1,0) -d-> ...`
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let mut states = self.states.iter();
        if let Some(first) = states.next() {
            out.push_str(&first.to_string());
        }
        for (action, state) in self.actions.iter().zip(states) {
            out.push_str(&format!(" -{action}-> {state}"));
        }
        out
    }
}

/// Follow the greedy action of `q_table` from the start state for at most
/// `max_steps` steps. The table is not modified.
pub fn greedy_rollout(env: &mut GridWorld, q_table: &QTable, max_steps: usize) -> Result<Rollout> {
    let mut state = env.reset();
    let mut rollout = Rollout {
        states: vec![state],
        actions: Vec::new(),
        total_reward: 0.0,
        reached_terminal: false,
    };

    while rollout.steps() < max_steps {
        let (action, _) = q_table.best_action(&state)?;
        let transition = env.step(action)?;
        rollout.actions.push(action);
        rollout.states.push(transition.next_state);
        rollout.total_reward += transition.reward;
        if transition.done {
            rollout.reached_terminal = true;
            break;
        }
        state = transition.next_state;
    }

    Ok(rollout)
}
