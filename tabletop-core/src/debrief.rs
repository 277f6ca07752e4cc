//! End-of-session summary shown after victory or game over.
use serde::{Deserialize, Serialize};

use crate::constants::{
    BADGE_CYBER_HERO_MIN, BADGE_FIRST_RESPONDER_MIN, BADGE_INCIDENT_COMMANDER_MIN,
};
use crate::game::{GamePhase, GameState};
use crate::score::ScoreTriad;

/// Performance badge awarded from the final score total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    CyberHero,
    IncidentCommander,
    FirstResponder,
    Trainee,
}

impl Badge {
    #[must_use]
    pub const fn for_total(total: i32) -> Self {
        if total >= BADGE_CYBER_HERO_MIN {
            Self::CyberHero
        } else if total >= BADGE_INCIDENT_COMMANDER_MIN {
            Self::IncidentCommander
        } else if total >= BADGE_FIRST_RESPONDER_MIN {
            Self::FirstResponder
        } else {
            Self::Trainee
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::CyberHero => "Cyber Hero",
            Self::IncidentCommander => "Incident Commander",
            Self::FirstResponder => "First Responder",
            Self::Trainee => "Trainee",
        }
    }
}

impl std::fmt::Display for Badge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebriefSummary {
    pub scenario_id: String,
    pub outcome: Outcome,
    pub scores: ScoreTriad,
    pub total: i32,
    pub badge: Badge,
    pub decisions: usize,
    pub timeouts: usize,
}

/// Summarize a finished session; `None` unless the game reached a terminal
/// phase.
#[must_use]
pub fn debrief(game: &GameState) -> Option<DebriefSummary> {
    let outcome = match game.phase {
        GamePhase::Victory => Outcome::Victory,
        GamePhase::GameOver => Outcome::Defeat,
        _ => return None,
    };
    let total = game.scores.total();
    let timeouts = game.timeout_count();
    Some(DebriefSummary {
        scenario_id: game
            .scenario
            .as_ref()
            .map(|s| s.id().to_string())
            .unwrap_or_default(),
        outcome,
        scores: game.scores,
        total,
        badge: Badge::for_total(total),
        decisions: game.history.len() - timeouts,
        timeouts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{Role, TargetRole};
    use crate::scenario::fixtures::{document, question};
    use crate::scenario::normalize;

    #[test]
    fn badge_thresholds() {
        assert_eq!(Badge::for_total(300), Badge::CyberHero);
        assert_eq!(Badge::for_total(250), Badge::CyberHero);
        assert_eq!(Badge::for_total(249), Badge::IncidentCommander);
        assert_eq!(Badge::for_total(200), Badge::IncidentCommander);
        assert_eq!(Badge::for_total(150), Badge::FirstResponder);
        assert_eq!(Badge::for_total(149), Badge::Trainee);
        assert_eq!(Badge::IncidentCommander.to_string(), "Incident Commander");
    }

    #[test]
    fn debrief_only_after_terminal_phase() {
        let scenario = normalize(&document(
            "deb",
            vec![
                question("q1", 1, &[TargetRole::Universal]),
                question("q2", 2, &[TargetRole::Universal]),
            ],
        ));
        let mut game = GameState::default();
        assert!(game.start_game(scenario, &[Role::SocLead]));
        assert!(game.begin_play());
        assert!(debrief(&game).is_none());

        assert!(game.make_decision("q1-a", 0));
        assert!(game.advance_to_next_inject());
        assert!(game.handle_timeout(1));
        assert!(game.advance_to_next_inject());

        let summary = debrief(&game).unwrap();
        assert_eq!(summary.outcome, Outcome::Victory);
        assert_eq!(summary.scores, ScoreTriad::new(45, 45, 45));
        assert_eq!(summary.total, 135);
        assert_eq!(summary.badge, Badge::Trainee);
        assert_eq!((summary.decisions, summary.timeouts), (1, 1));
    }
}
