use clap::ValueEnum;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tabletop_core::Inject;

/// How the scripted player answers each inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Pick the option with the highest combined impact
    Best,
    /// Pick the option with the lowest combined impact
    Worst,
    /// Pick uniformly at random
    Random,
    /// Never answer; let the clock run out
    Timeout,
}

impl Strategy {
    pub const ALL: [Self; 4] = [Self::Best, Self::Worst, Self::Random, Self::Timeout];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::Worst => "worst",
            Self::Random => "random",
            Self::Timeout => "timeout",
        }
    }

    /// Option id to submit, or `None` to wait for the timeout.
    pub fn choose<R: Rng + ?Sized>(self, inject: &Inject, rng: &mut R) -> Option<String> {
        let choice = match self {
            Self::Best => inject.options.iter().max_by_key(|c| c.impact.total()),
            Self::Worst => inject.options.iter().min_by_key(|c| c.impact.total()),
            Self::Random => inject.options.choose(rng),
            Self::Timeout => None,
        };
        choice.map(|c| c.id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use tabletop_core::{Role, ScenarioLoader, StaticScenarioLoader, build_session_injects};

    fn inject() -> Inject {
        let doc = StaticScenarioLoader.load_scenarios().unwrap().remove(0);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        build_session_injects(&doc, &Role::ALL, 1, &mut rng).remove(0)
    }

    #[test]
    fn best_and_worst_pick_extremes() {
        let inject = inject();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let best = Strategy::Best.choose(&inject, &mut rng).unwrap();
        let worst = Strategy::Worst.choose(&inject, &mut rng).unwrap();
        let max = inject.options.iter().map(|c| c.impact.total()).max();
        let min = inject.options.iter().map(|c| c.impact.total()).min();
        assert_eq!(inject.choice(&best).map(|c| c.impact.total()), max);
        assert_eq!(inject.choice(&worst).map(|c| c.impact.total()), min);
    }

    #[test]
    fn random_stays_in_options_and_timeout_waits() {
        let inject = inject();
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        for _ in 0..10 {
            let id = Strategy::Random.choose(&inject, &mut rng).unwrap();
            assert!(inject.choice(&id).is_some());
        }
        assert!(Strategy::Timeout.choose(&inject, &mut rng).is_none());
    }
}
