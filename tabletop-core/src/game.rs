//! Session state and the phase machine that drives a play session.
//!
//! Every action is a guarded transition: it either applies completely and
//! returns `true`, or leaves the state untouched and returns `false`.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{TIMER_CRITICAL_SECONDS, TIMER_URGENT_SECONDS};
use crate::onboarding::OnboardingConfig;
use crate::policy::SessionPolicy;
use crate::roles::Role;
use crate::scenario::{Inject, Scenario};
use crate::score::{Impact, ScoreTriad};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    #[default]
    Idle,
    Briefing,
    Playing,
    Feedback,
    GameOver,
    Victory,
}

impl GamePhase {
    pub const ALL: [Self; 6] = [
        Self::Idle,
        Self::Briefing,
        Self::Playing,
        Self::Feedback,
        Self::GameOver,
        Self::Victory,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Briefing => "briefing",
            Self::Playing => "playing",
            Self::Feedback => "feedback",
            Self::GameOver => "gameover",
            Self::Victory => "victory",
        }
    }

    /// Terminal until an explicit reset.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Victory)
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GamePhase {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|p| p.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerUrgency {
    Calm,
    Urgent,
    Critical,
}

impl TimerUrgency {
    #[must_use]
    pub const fn for_seconds(seconds: u32) -> Self {
        if seconds <= TIMER_CRITICAL_SECONDS {
            Self::Critical
        } else if seconds <= TIMER_URGENT_SECONDS {
            Self::Urgent
        } else {
            Self::Calm
        }
    }
}

/// Render seconds as `MM:SS`.
#[must_use]
pub fn format_timer(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimerState {
    pub seconds: u32,
    pub running: bool,
}

impl TimerState {
    #[must_use]
    pub const fn stopped(seconds: u32) -> Self {
        Self {
            seconds,
            running: false,
        }
    }

    #[must_use]
    pub fn display(self) -> String {
        format_timer(self.seconds)
    }

    #[must_use]
    pub const fn urgency(self) -> TimerUrgency {
        TimerUrgency::for_seconds(self.seconds)
    }
}

/// One resolved inject, either a player choice or a timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub inject_id: String,
    pub option_id: String,
    pub option_label: String,
    pub feedback_text: String,
    pub impact: Impact,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub timed_out: bool,
}

/// Flags that outlive a single playthrough and survive `reset_game`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionLifecycle {
    pub is_simulation_active: bool,
    pub active_scenario_id: Option<String>,
    pub onboarding_config: Option<OnboardingConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub scenario: Option<Scenario>,
    pub roles: Vec<Role>,
    pub phase: GamePhase,
    pub inject_index: usize,
    pub scores: ScoreTriad,
    pub history: Vec<DecisionRecord>,
    pub timer: TimerState,
    pub lifecycle: SessionLifecycle,
    pub policy: SessionPolicy,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(SessionPolicy::default_config())
    }
}

impl GameState {
    #[must_use]
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            scenario: None,
            roles: Vec::new(),
            phase: GamePhase::Idle,
            inject_index: 0,
            scores: policy.default_scores,
            history: Vec::new(),
            timer: TimerState::default(),
            lifecycle: SessionLifecycle::default(),
            policy,
        }
    }

    /// The first selected role, used for single-role displays.
    #[must_use]
    pub fn primary_role(&self) -> Option<Role> {
        self.roles.first().copied()
    }

    #[must_use]
    pub fn current_inject(&self) -> Option<&Inject> {
        self.scenario
            .as_ref()
            .and_then(|scenario| scenario.inject(self.inject_index))
    }

    #[must_use]
    pub fn inject_count(&self) -> usize {
        self.scenario.as_ref().map_or(0, |s| s.injects.len())
    }

    #[must_use]
    pub fn timeout_count(&self) -> usize {
        self.history.iter().filter(|r| r.timed_out).count()
    }

    /// A session is resumable while it is active, bound to a scenario and
    /// not sitting idle or finished.
    #[must_use]
    pub fn has_active_session(&self) -> bool {
        self.lifecycle.is_simulation_active
            && self.lifecycle.active_scenario_id.is_some()
            && !matches!(
                self.phase,
                GamePhase::Idle | GamePhase::GameOver | GamePhase::Victory
            )
    }

    /// Mark the simulation active for `scenario_id` and keep a copy of the
    /// wizard output. Allowed in any phase.
    pub fn commit_onboarding(&mut self, scenario_id: &str, config: &OnboardingConfig) -> bool {
        self.lifecycle = SessionLifecycle {
            is_simulation_active: true,
            active_scenario_id: Some(scenario_id.to_string()),
            onboarding_config: Some(config.clone()),
        };
        log::debug!("onboarding committed for '{scenario_id}'");
        true
    }

    /// Load a session's scenario and move to the briefing.
    pub fn start_game(&mut self, scenario: Scenario, roles: &[Role]) -> bool {
        if roles.is_empty() {
            log::debug!("start_game ignored: no roles selected");
            return false;
        }
        let Some(first) = scenario.injects.first() else {
            log::debug!("start_game ignored: '{}' has no injects", scenario.id());
            return false;
        };
        self.timer = TimerState::stopped(first.timer_seconds);
        self.scores = scenario.configuration.starting_stats;
        self.roles = roles.to_vec();
        self.inject_index = 0;
        self.history.clear();
        self.phase = GamePhase::Briefing;
        log::info!(
            "game started: '{}' with {} inject(s) for {:?}",
            scenario.id(),
            scenario.injects.len(),
            self.roles
        );
        self.scenario = Some(scenario);
        true
    }

    /// Leave the briefing and start the clock on the first inject.
    pub fn begin_play(&mut self) -> bool {
        if self.phase != GamePhase::Briefing {
            log::debug!("begin_play ignored in phase {}", self.phase);
            return false;
        }
        self.phase = GamePhase::Playing;
        self.timer.running = true;
        true
    }

    pub fn make_decision(&mut self, option_id: &str, now_ms: i64) -> bool {
        if self.phase != GamePhase::Playing {
            log::debug!("make_decision ignored in phase {}", self.phase);
            return false;
        }
        let Some(inject) = self.current_inject() else {
            return false;
        };
        let Some(choice) = inject.choice(option_id) else {
            log::debug!("make_decision ignored: unknown option '{option_id}'");
            return false;
        };
        let record = DecisionRecord {
            inject_id: inject.id.clone(),
            option_id: choice.id.clone(),
            option_label: choice.label.clone(),
            feedback_text: choice.feedback_text.clone(),
            impact: choice.impact,
            timestamp_ms: now_ms,
            timed_out: false,
        };
        self.resolve(record);
        true
    }

    /// Apply the inaction penalty for the current inject.
    pub fn handle_timeout(&mut self, now_ms: i64) -> bool {
        if self.phase != GamePhase::Playing {
            log::debug!("handle_timeout ignored in phase {}", self.phase);
            return false;
        }
        let Some(inject) = self.current_inject() else {
            return false;
        };
        let record = DecisionRecord {
            inject_id: inject.id.clone(),
            option_id: self.policy.timeout_option_id.clone(),
            option_label: self.policy.timeout_label.clone(),
            feedback_text: self.policy.timeout_feedback.clone(),
            impact: self.policy.inaction_penalty,
            timestamp_ms: now_ms,
            timed_out: true,
        };
        self.resolve(record);
        true
    }

    /// Count down one second; reaching zero stops the clock and times the
    /// inject out exactly once.
    pub fn tick_timer(&mut self, now_ms: i64) -> bool {
        if !self.timer.running || self.phase != GamePhase::Playing {
            return false;
        }
        if self.timer.seconds <= 1 {
            self.timer = TimerState::stopped(0);
            self.handle_timeout(now_ms);
        } else {
            self.timer.seconds -= 1;
        }
        true
    }

    pub fn advance_to_next_inject(&mut self) -> bool {
        if self.phase != GamePhase::Feedback {
            log::debug!("advance_to_next_inject ignored in phase {}", self.phase);
            return false;
        }
        let next_index = self.inject_index + 1;
        let next_timer = self
            .scenario
            .as_ref()
            .and_then(|scenario| scenario.inject(next_index))
            .map(|inject| inject.timer_seconds);
        match next_timer {
            Some(seconds) => {
                self.inject_index = next_index;
                self.timer = TimerState {
                    seconds,
                    running: true,
                };
                self.phase = GamePhase::Playing;
                log::debug!("advanced to inject {}", next_index + 1);
            }
            None => {
                self.timer.running = false;
                self.phase = GamePhase::Victory;
                log::info!("session won with {:?}", self.scores);
            }
        }
        true
    }

    /// Back to idle, keeping lifecycle flags so the same setup can replay.
    pub fn reset_game(&mut self) {
        let lifecycle = std::mem::take(&mut self.lifecycle);
        let policy = self.policy.clone();
        *self = Self::new(policy);
        self.lifecycle = lifecycle;
    }

    /// Full teardown including lifecycle flags.
    pub fn reset_simulation(&mut self) {
        let policy = self.policy.clone();
        *self = Self::new(policy);
    }

    fn resolve(&mut self, record: DecisionRecord) {
        self.scores = self.scores.apply(record.impact);
        self.timer.running = false;
        self.phase = if self.scores.is_terminal_loss() {
            log::info!("session lost on '{}' with {:?}", record.inject_id, self.scores);
            GamePhase::GameOver
        } else {
            GamePhase::Feedback
        };
        self.history.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::OrganizationSector;
    use crate::roles::TargetRole;
    use crate::scenario::fixtures::{document, question};
    use crate::scenario::normalize;

    fn scenario(count: u32) -> Scenario {
        let questions = (1..=count)
            .map(|n| question(&format!("q{n}"), n, &[TargetRole::Universal]))
            .collect();
        normalize(&document("game", questions))
    }

    fn playing(count: u32) -> GameState {
        let mut game = GameState::default();
        assert!(game.start_game(scenario(count), &[Role::Ciso]));
        assert!(game.begin_play());
        game
    }

    #[test]
    fn start_game_requires_roles_and_injects() {
        let mut game = GameState::default();
        assert!(!game.start_game(scenario(2), &[]));
        assert!(!game.start_game(scenario(0), &[Role::Dfir]));
        assert_eq!(game.phase, GamePhase::Idle);

        assert!(game.start_game(scenario(2), &[Role::Dfir, Role::Ciso]));
        assert_eq!(game.phase, GamePhase::Briefing);
        assert_eq!(game.timer, TimerState::stopped(30));
        assert_eq!(game.primary_role(), Some(Role::Dfir));
    }

    #[test]
    fn critical_decision_ends_the_game() {
        let mut game = playing(3);
        assert!(game.make_decision("q1-d", 1_000));
        assert_eq!(game.scores, ScoreTriad::new(0, 50, 50));
        assert_eq!(game.phase, GamePhase::GameOver);
        assert_eq!(game.history.len(), 1);
        assert!(!game.history[0].timed_out);
        assert!(!game.timer.running);
    }

    #[test]
    fn second_decision_is_ignored() {
        let mut game = playing(3);
        assert!(game.make_decision("q1-a", 1));
        let snapshot = game.clone();
        assert!(!game.make_decision("q1-b", 2));
        assert_eq!(game, snapshot);
    }

    #[test]
    fn timeout_without_inject_is_ignored() {
        let mut game = GameState {
            phase: GamePhase::Playing,
            ..GameState::default()
        };
        let snapshot = game.clone();
        assert!(!game.handle_timeout(5));
        assert_eq!(game, snapshot);
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut game = playing(1);
        assert!(!game.make_decision("nope", 1));
        assert_eq!(game.phase, GamePhase::Playing);
        assert!(game.history.is_empty());
    }

    #[test]
    fn tick_to_zero_times_out_once() {
        let mut game = playing(2);
        game.timer.seconds = 1;
        assert!(game.tick_timer(5));
        assert_eq!(game.timer, TimerState::stopped(0));
        assert_eq!(game.scores, ScoreTriad::new(35, 40, 40));
        assert_eq!(game.history.len(), 1);
        assert_eq!(game.history[0].option_id, "TIMEOUT");
        assert!(game.history[0].timed_out);
        assert_eq!(game.phase, GamePhase::Feedback);

        assert!(!game.tick_timer(6));
        assert_eq!(game.history.len(), 1);
    }

    #[test]
    fn tick_only_runs_while_playing() {
        let mut game = GameState::default();
        assert!(game.start_game(scenario(1), &[Role::Ciso]));
        assert!(!game.tick_timer(0));
        assert_eq!(game.timer.seconds, 30);
        assert!(game.begin_play());
        assert!(game.tick_timer(0));
        assert_eq!(game.timer.seconds, 29);
    }

    #[test]
    fn advancing_walks_to_victory() {
        let mut game = playing(2);
        assert!(!game.advance_to_next_inject());
        assert!(game.make_decision("q1-a", 1));
        assert!(game.advance_to_next_inject());
        assert_eq!(game.phase, GamePhase::Playing);
        assert_eq!(game.current_inject().map(|i| i.id.as_str()), Some("q2"));
        assert!(game.timer.running);

        assert!(game.make_decision("q2-b", 2));
        assert!(game.advance_to_next_inject());
        assert_eq!(game.phase, GamePhase::Victory);
        assert!(!game.timer.running);
        assert_eq!(game.history.len(), 2);
    }

    #[test]
    fn resets_differ_in_lifecycle_handling() {
        let config = OnboardingConfig {
            sector: Some(OrganizationSector::Financial),
            ..OnboardingConfig::default()
        };
        let mut game = playing(2);
        game.commit_onboarding("game", &config);
        assert!(game.has_active_session());

        game.reset_game();
        assert_eq!(game.phase, GamePhase::Idle);
        assert!(game.scenario.is_none());
        assert!(game.history.is_empty());
        assert!(game.lifecycle.is_simulation_active);
        assert_eq!(game.lifecycle.onboarding_config, Some(config));
        assert!(!game.has_active_session());

        game.reset_simulation();
        assert_eq!(game.lifecycle, SessionLifecycle::default());
    }

    #[test]
    fn timer_formatting() {
        assert_eq!(format_timer(0), "00:00");
        assert_eq!(format_timer(75), "01:15");
        assert_eq!(format_timer(300), "05:00");
        assert_eq!(TimerUrgency::for_seconds(11), TimerUrgency::Calm);
        assert_eq!(TimerUrgency::for_seconds(10), TimerUrgency::Urgent);
        assert_eq!(TimerUrgency::for_seconds(5), TimerUrgency::Critical);
    }
}
