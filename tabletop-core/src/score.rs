//! Three-dimensional score model and impact application.
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SCORE, SCORE_MAX, SCORE_MIN};

/// Signed adjustment applied to a [`ScoreTriad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Impact {
    pub security: i32,
    pub business: i32,
    pub reputation: i32,
}

impl Impact {
    #[must_use]
    pub const fn new(security: i32, business: i32, reputation: i32) -> Self {
        Self {
            security,
            business,
            reputation,
        }
    }

    #[must_use]
    pub const fn total(self) -> i32 {
        self.security + self.business + self.reputation
    }
}

/// Live session score; every dimension stays within `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreTriad {
    pub security: i32,
    pub business: i32,
    pub reputation: i32,
}

impl Default for ScoreTriad {
    fn default() -> Self {
        Self::uniform(DEFAULT_SCORE)
    }
}

impl ScoreTriad {
    #[must_use]
    pub const fn new(security: i32, business: i32, reputation: i32) -> Self {
        Self {
            security,
            business,
            reputation,
        }
    }

    #[must_use]
    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value)
    }

    /// Clamp every dimension into the score range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            security: clamp_score(self.security),
            business: clamp_score(self.business),
            reputation: clamp_score(self.reputation),
        }
    }

    #[must_use]
    pub fn apply(self, impact: Impact) -> Self {
        apply_impact(self, impact)
    }

    #[must_use]
    pub fn is_terminal_loss(self) -> bool {
        is_terminal_loss(self)
    }

    #[must_use]
    pub const fn total(self) -> i32 {
        self.security + self.business + self.reputation
    }

    #[must_use]
    pub const fn in_range(self) -> bool {
        in_range(self.security) && in_range(self.business) && in_range(self.reputation)
    }
}

const fn in_range(value: i32) -> bool {
    value >= SCORE_MIN && value <= SCORE_MAX
}

#[must_use]
pub fn clamp_score(value: i32) -> i32 {
    value.clamp(SCORE_MIN, SCORE_MAX)
}

/// Add `impact` to `scores`, clamping each dimension independently.
#[must_use]
pub fn apply_impact(scores: ScoreTriad, impact: Impact) -> ScoreTriad {
    ScoreTriad {
        security: clamp_score(scores.security.saturating_add(impact.security)),
        business: clamp_score(scores.business.saturating_add(impact.business)),
        reputation: clamp_score(scores.reputation.saturating_add(impact.reputation)),
    }
}

/// A session is lost as soon as any single dimension reaches zero.
#[must_use]
pub const fn is_terminal_loss(scores: ScoreTriad) -> bool {
    scores.security <= SCORE_MIN || scores.business <= SCORE_MIN || scores.reputation <= SCORE_MIN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_clamps_each_dimension_independently() {
        let scores = ScoreTriad::new(95, 5, 50);
        let next = apply_impact(scores, Impact::new(20, -20, 10));
        assert_eq!(next, ScoreTriad::new(100, 0, 60));
    }

    #[test]
    fn apply_is_monotonic_with_impact_sign() {
        for base in [0, 1, 37, 50, 99, 100] {
            for delta in [-100, -15, -1, 0, 1, 15, 100] {
                let scores = ScoreTriad::uniform(base);
                let next = apply_impact(scores, Impact::new(delta, delta, delta));
                assert!(next.in_range());
                match delta.signum() {
                    1 => assert!(next.security >= base),
                    -1 => assert!(next.security <= base),
                    _ => assert_eq!(next.security, base),
                }
            }
        }
    }

    #[test]
    fn terminal_loss_requires_a_zero_dimension() {
        assert!(is_terminal_loss(ScoreTriad::new(0, 50, 50)));
        assert!(is_terminal_loss(ScoreTriad::new(50, 50, 0)));
        assert!(!is_terminal_loss(ScoreTriad::uniform(5)));
    }

    #[test]
    fn extreme_impacts_do_not_overflow() {
        let next = apply_impact(ScoreTriad::uniform(100), Impact::new(i32::MAX, i32::MIN, 0));
        assert_eq!(next, ScoreTriad::new(100, 0, 100));
    }

    #[test]
    fn default_scores_are_even() {
        assert_eq!(ScoreTriad::default().total(), DEFAULT_SCORE * 3);
    }
}
