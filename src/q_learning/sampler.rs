//! Drawing actions from a probability distribution

use rand::{Rng, SeedableRng, rngs::StdRng};

use super::policy::ActionDistribution;
use crate::{Result, gridworld::Action};

/// Seeded RNG when `seed` is given, otherwise seeded from the thread RNG
pub fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Draw one action with exactly the probabilities of `distribution`.
///
/// Zero-probability actions are never drawn.
///
/// # Errors
///
/// [`crate::Error::MalformedDistribution`] if the distribution is empty, has
/// negative entries or does not sum to 1.
pub fn sample_action<R: Rng>(
    distribution: &ActionDistribution,
    rng: &mut R,
) -> Result<Action> {
    distribution.validate()?;

    let ticket: f64 = rng.random();
    let mut cumulative = 0.0;
    let mut fallback = None;
    for (action, p) in distribution.iter() {
        if p <= 0.0 {
            continue;
        }
        cumulative += p;
        if ticket < cumulative {
            return Ok(action);
        }
        fallback = Some(action);
    }

    // Rounding left the cumulative mass just under the ticket.
    fallback.ok_or_else(|| crate::Error::MalformedDistribution {
        reason: "no action has positive probability".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_degenerate_distribution() {
        let mut rng = build_rng(Some(1));
        let dist = ActionDistribution::new(vec![
            (Action::Right, 0.0),
            (Action::Down, 1.0),
            (Action::Up, 0.0),
        ]);
        for _ in 0..200 {
            assert_eq!(sample_action(&dist, &mut rng).unwrap(), Action::Down);
        }
    }

    #[test]
    fn test_frequencies_follow_probabilities() {
        let mut rng = build_rng(Some(42));
        let dist = ActionDistribution::new(vec![(Action::Right, 0.25), (Action::Down, 0.75)]);
        let draws = 20_000;
        let downs = (0..draws)
            .filter(|_| sample_action(&dist, &mut rng).unwrap() == Action::Down)
            .count();
        let freq = downs as f64 / draws as f64;
        assert!((freq - 0.75).abs() < 0.02, "observed frequency {freq}");
    }

    #[test]
    fn test_same_seed_same_draws() {
        let dist = ActionDistribution::new(vec![
            (Action::Right, 0.3),
            (Action::Left, 0.3),
            (Action::Down, 0.4),
        ]);
        let mut a = build_rng(Some(7));
        let mut b = build_rng(Some(7));
        let first: Vec<_> = (0..50).map(|_| sample_action(&dist, &mut a).unwrap()).collect();
        let second: Vec<_> = (0..50).map(|_| sample_action(&dist, &mut b).unwrap()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_malformed_distribution() {
        let mut rng = build_rng(Some(3));
        let dist = ActionDistribution::new(vec![(Action::Right, 0.6), (Action::Down, 0.6)]);
        assert!(matches!(
            sample_action(&dist, &mut rng),
            Err(Error::MalformedDistribution { .. })
        ));
        let dist = ActionDistribution::new(vec![(Action::Right, 1.5), (Action::Down, -0.5)]);
        assert!(sample_action(&dist, &mut rng).is_err());
    }
}
