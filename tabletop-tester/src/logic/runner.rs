use colored::Colorize;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tabletop_core::{
    Badge, FixedClock, GamePhase, Outcome, Role, ScenarioDocument, ScoreTriad, SessionPolicy,
    Simulation,
};

use super::strategy::Strategy;

/// Upper bound on actions per playthrough; a session that has not finished
/// by then is reported as stuck.
const MAX_STEPS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct PlaythroughPlan {
    pub document: ScenarioDocument,
    pub roles: Vec<Role>,
    pub strategy: Strategy,
}

impl PlaythroughPlan {
    pub fn name(&self) -> String {
        let roles: Vec<&str> = self.roles.iter().map(|r| r.as_str()).collect();
        format!(
            "{} [{}] ({})",
            self.document.id(),
            self.strategy.label(),
            roles.join("+")
        )
    }
}

/// Result of one scripted session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaythroughRecord {
    pub seed: u64,
    pub outcome: Outcome,
    pub scores: ScoreTriad,
    pub badge: Badge,
    pub injects: usize,
    pub decisions: usize,
    pub timeouts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub strategy: Strategy,
    pub seed: u64,
    pub passed: bool,
    pub iterations_run: usize,
    pub successful_iterations: usize,
    pub victories: usize,
    pub failures: Vec<String>,
    pub records: Vec<PlaythroughRecord>,
    #[serde(with = "duration_serde")]
    pub average_duration: Duration,
}

pub struct PlaythroughTester {
    policy: SessionPolicy,
    verbose: bool,
}

impl PlaythroughTester {
    pub const fn new(policy: SessionPolicy, verbose: bool) -> Self {
        Self { policy, verbose }
    }

    pub fn run_plan(&self, plan: &PlaythroughPlan, seeds: &[u64], iterations: usize) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Playing: {} (seed: {})",
                        plan.name().bright_white(),
                        seed
                    );
                }
                self.run_single_plan(plan, seed, iterations)
            })
            .collect()
    }

    fn run_single_plan(&self, plan: &PlaythroughPlan, seed: u64, iterations: usize) -> ScenarioResult {
        let mut failures = Vec::new();
        let mut records = Vec::new();
        let mut durations = Vec::new();

        for i in 0..iterations {
            let iteration_seed = seed.wrapping_add(u64::try_from(i).unwrap_or(u64::MAX));
            let start = Instant::now();
            match self.play(plan, iteration_seed) {
                Ok(record) => records.push(record),
                Err(reason) => failures.push(format!(
                    "Iteration {} (seed {}): {}",
                    i + 1,
                    iteration_seed,
                    reason
                )),
            }
            durations.push(start.elapsed());
        }

        let average_duration = if durations.is_empty() {
            Duration::ZERO
        } else {
            durations.iter().sum::<Duration>() / u32::try_from(durations.len()).unwrap_or(1)
        };

        ScenarioResult {
            scenario_name: plan.name(),
            strategy: plan.strategy,
            seed,
            passed: failures.is_empty(),
            iterations_run: iterations,
            successful_iterations: records.len(),
            victories: records
                .iter()
                .filter(|r| r.outcome == Outcome::Victory)
                .count(),
            failures,
            records,
            average_duration,
        }
    }

    /// Drive one session to completion, checking the session invariants
    /// after every action.
    fn play(&self, plan: &PlaythroughPlan, seed: u64) -> Result<PlaythroughRecord, String> {
        let clock = FixedClock(i64::try_from(seed).unwrap_or(i64::MAX));
        let mut sim = Simulation::with_clock(self.policy.clone(), seed, clock)
            .map_err(|err| format!("invalid policy: {err}"))?;
        sim.registry_mut().register(plan.document.clone());
        let mut rng = ChaCha20Rng::seed_from_u64(seed ^ 0x5EED);

        if !sim.start_game(plan.document.id(), &plan.roles) {
            return Err("start_game was ignored".to_string());
        }
        check_session_mix(&sim, plan, &self.policy)?;
        if !sim.begin_play() {
            return Err("begin_play was ignored".to_string());
        }

        let mut resolved = 0;
        for _ in 0..MAX_STEPS {
            match sim.game().phase {
                GamePhase::Playing => {
                    let inject = sim
                        .game()
                        .current_inject()
                        .ok_or("playing without a current inject")?
                        .clone();
                    match plan.strategy.choose(&inject, &mut rng) {
                        Some(option_id) => {
                            if !sim.make_decision(&option_id) {
                                return Err(format!("decision '{option_id}' was ignored"));
                            }
                            if sim.make_decision(&option_id) {
                                return Err("a second decision was accepted".to_string());
                            }
                        }
                        None => {
                            while sim.tick_timer() {}
                        }
                    }
                    resolved += 1;
                    check_after_resolution(&sim, resolved, &self.policy, plan.strategy)?;
                }
                GamePhase::Feedback => {
                    sim.advance_to_next_inject();
                }
                GamePhase::Victory | GamePhase::GameOver => break,
                phase => return Err(format!("unexpected phase {phase}")),
            }
        }

        let game = sim.game();
        let terminal_loss = game.scores.is_terminal_loss();
        match game.phase {
            GamePhase::GameOver if !terminal_loss => {
                return Err("game over without a terminal loss".to_string());
            }
            GamePhase::Victory if terminal_loss => {
                return Err("victory with a depleted score".to_string());
            }
            GamePhase::Victory if resolved != game.inject_count() => {
                return Err(format!(
                    "victory after {resolved} of {} injects",
                    game.inject_count()
                ));
            }
            GamePhase::Victory | GamePhase::GameOver => {}
            phase => return Err(format!("session stuck in phase {phase}")),
        }

        let summary = sim.debrief().ok_or("no debrief for a finished session")?;
        Ok(PlaythroughRecord {
            seed,
            outcome: summary.outcome,
            scores: summary.scores,
            badge: summary.badge,
            injects: game.inject_count(),
            decisions: summary.decisions,
            timeouts: summary.timeouts,
        })
    }
}

fn check_session_mix<C>(
    sim: &Simulation<C>,
    plan: &PlaythroughPlan,
    policy: &SessionPolicy,
) -> Result<(), String>
where
    C: tabletop_core::Clock,
{
    let Some(scenario) = sim.game().scenario.as_ref() else {
        return Err("no scenario after start_game".to_string());
    };
    if scenario.injects.len() > policy.session_length {
        return Err(format!(
            "{} injects exceed session length {}",
            scenario.injects.len(),
            policy.session_length
        ));
    }
    for inject in &scenario.injects {
        if !inject.target_roles.iter().any(|t| t.matches(&plan.roles)) {
            return Err(format!("inject '{}' does not target the selected roles", inject.id));
        }
    }
    let mut ids: Vec<&str> = scenario.injects.iter().map(|i| i.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.len() != scenario.injects.len() {
        return Err("duplicate injects in session".to_string());
    }
    Ok(())
}

fn check_after_resolution<C>(
    sim: &Simulation<C>,
    resolved: usize,
    policy: &SessionPolicy,
    strategy: Strategy,
) -> Result<(), String>
where
    C: tabletop_core::Clock,
{
    let game = sim.game();
    if !game.scores.in_range() {
        return Err(format!("scores out of range: {:?}", game.scores));
    }
    if game.history.len() != resolved {
        return Err(format!(
            "history has {} entries after {resolved} resolutions",
            game.history.len()
        ));
    }
    if game.timer.running {
        return Err("timer still running after resolution".to_string());
    }
    if strategy == Strategy::Timeout
        && game
            .history
            .iter()
            .any(|r| !r.timed_out || r.option_id != policy.timeout_option_id)
    {
        return Err("timeout playthrough recorded a player decision".to_string());
    }
    Ok(())
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
