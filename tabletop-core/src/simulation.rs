//! Application context tying the registry, wizard and game together.
//!
//! A [`Simulation`] is owned by whatever runs the event loop. Every mutation
//! goes through its methods (or [`Simulation::dispatch`]) so the ignore-out-
//! of-order-input contract lives in one place.
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::briefing::{BriefingSlide, briefing_slides};
use crate::debrief::{DebriefSummary, debrief};
use crate::game::GameState;
use crate::import::{ImportError, ImportSource, parse_scenario};
use crate::mixer::build_session_injects;
use crate::onboarding::{
    CriticalAsset, InfrastructureType, OnboardingStep, OnboardingWizard, OrganizationSector,
};
use crate::policy::{PolicyError, SessionPolicy};
use crate::registry::ScenarioRegistry;
use crate::roles::Role;
use crate::scenario::{Scenario, normalize};
use crate::ScenarioLoader;

/// Source of decision timestamps in milliseconds since the Unix epoch.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Always reports the same instant. Useful for reproducible runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Every input the presentation layer can send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    SetSector { sector: OrganizationSector },
    SetInfrastructureType { infrastructure: InfrastructureType },
    SetIncludeOtSystems { include: bool },
    ToggleAsset { asset: CriticalAsset },
    NextStep,
    PrevStep,
    GoToStep { step: OnboardingStep },
    ResetOnboarding,
    CompleteOnboarding { scenario_id: String },
    StartGame { scenario_id: String, roles: Vec<Role> },
    BeginPlay,
    MakeDecision { option_id: String },
    HandleTimeout,
    TickTimer,
    AdvanceToNextInject,
    ResetGame,
    ResetSimulation,
}

pub struct Simulation<C = SystemClock> {
    registry: ScenarioRegistry,
    game: GameState,
    wizard: OnboardingWizard,
    rng: ChaCha20Rng,
    clock: C,
}

impl Simulation<SystemClock> {
    /// # Errors
    ///
    /// Returns the policy's validation error.
    pub fn new(policy: SessionPolicy, seed: u64) -> Result<Self, PolicyError> {
        Self::with_clock(policy, seed, SystemClock)
    }
}

impl<C: Clock> Simulation<C> {
    /// Build a simulation with an explicit clock and a validated policy.
    ///
    /// # Errors
    ///
    /// Returns the policy's validation error.
    pub fn with_clock(policy: SessionPolicy, seed: u64, clock: C) -> Result<Self, PolicyError> {
        policy.validate()?;
        Ok(Self {
            registry: ScenarioRegistry::new(),
            game: GameState::new(policy),
            wizard: OnboardingWizard::new(),
            rng: ChaCha20Rng::seed_from_u64(seed),
            clock,
        })
    }

    /// Seed the registry from a loader. Returns how many scenarios were
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if built-in data cannot be produced.
    pub fn load_builtins<L>(&mut self, loader: &L) -> Result<usize, L::Error>
    where
        L: ScenarioLoader,
    {
        let documents = loader.load_scenarios()?;
        let count = documents.len();
        for document in documents {
            self.registry.register(document);
        }
        Ok(count)
    }

    #[must_use]
    pub const fn registry(&self) -> &ScenarioRegistry {
        &self.registry
    }

    pub const fn registry_mut(&mut self) -> &mut ScenarioRegistry {
        &mut self.registry
    }

    #[must_use]
    pub const fn game(&self) -> &GameState {
        &self.game
    }

    #[must_use]
    pub const fn wizard(&self) -> &OnboardingWizard {
        &self.wizard
    }

    #[must_use]
    pub const fn policy(&self) -> &SessionPolicy {
        &self.game.policy
    }

    /// Parse, sanitize, validate and register externally supplied JSON.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason; nothing is registered in that case.
    pub fn import_scenario(
        &mut self,
        text: &str,
        source: &ImportSource,
    ) -> Result<Scenario, ImportError> {
        match parse_scenario(text, source) {
            Ok(document) => {
                log::info!("imported '{}' from {}", document.id(), source.label());
                Ok(self.registry.register(document))
            }
            Err(err) => {
                log::warn!("rejected import from {}: {err}", source.label());
                Err(err)
            }
        }
    }

    /// Import like [`Self::import_scenario`], then tear down any session and
    /// wizard draft so play restarts from onboarding with the new catalog.
    /// A rejected import leaves the running session untouched.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason from [`Self::import_scenario`].
    pub fn import_and_reset(
        &mut self,
        text: &str,
        source: &ImportSource,
    ) -> Result<Scenario, ImportError> {
        let scenario = self.import_scenario(text, source)?;
        self.reset_simulation();
        Ok(scenario)
    }

    /// Commit the wizard's profile for `scenario_id`. Ignored unless every
    /// wizard step is valid and the scenario is registered.
    pub fn complete_onboarding(&mut self, scenario_id: &str) -> bool {
        if !self.wizard.is_complete() {
            log::debug!("complete_onboarding ignored: wizard incomplete");
            return false;
        }
        if !self.registry.contains(scenario_id) {
            log::debug!("complete_onboarding ignored: unknown scenario '{scenario_id}'");
            return false;
        }
        self.game.commit_onboarding(scenario_id, &self.wizard.config)
    }

    /// Mix a session for `roles` from the registered scenario and start it.
    pub fn start_game(&mut self, scenario_id: &str, roles: &[Role]) -> bool {
        let Some(document) = self.registry.document(scenario_id) else {
            log::debug!("start_game ignored: unknown scenario '{scenario_id}'");
            return false;
        };
        let injects = build_session_injects(
            document,
            roles,
            self.game.policy.session_length,
            &mut self.rng,
        );
        let scenario = normalize(document).with_injects(injects);
        self.game.start_game(scenario, roles)
    }

    pub fn begin_play(&mut self) -> bool {
        self.game.begin_play()
    }

    pub fn make_decision(&mut self, option_id: &str) -> bool {
        let now = self.clock.now_ms();
        self.game.make_decision(option_id, now)
    }

    pub fn handle_timeout(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.game.handle_timeout(now)
    }

    pub fn tick_timer(&mut self) -> bool {
        let now = self.clock.now_ms();
        self.game.tick_timer(now)
    }

    pub fn advance_to_next_inject(&mut self) -> bool {
        self.game.advance_to_next_inject()
    }

    pub fn reset_game(&mut self) {
        self.game.reset_game();
    }

    /// Full teardown of the game and the wizard draft.
    pub fn reset_simulation(&mut self) {
        self.game.reset_simulation();
        self.wizard.reset();
    }

    #[must_use]
    pub fn has_active_session(&self) -> bool {
        self.game.has_active_session()
    }

    /// Briefing slides for the committed profile, or the wizard draft when
    /// nothing has been committed yet.
    #[must_use]
    pub fn briefing(&self) -> Vec<BriefingSlide> {
        let config = self
            .game
            .lifecycle
            .onboarding_config
            .as_ref()
            .unwrap_or(&self.wizard.config);
        briefing_slides(config)
    }

    #[must_use]
    pub fn debrief(&self) -> Option<DebriefSummary> {
        debrief(&self.game)
    }

    /// Apply one action. Returns whether it changed anything.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::SetSector { sector } => {
                self.wizard.set_sector(sector);
                true
            }
            Action::SetInfrastructureType { infrastructure } => {
                self.wizard.set_infrastructure_type(infrastructure);
                true
            }
            Action::SetIncludeOtSystems { include } => {
                self.wizard.set_include_ot_systems(include);
                true
            }
            Action::ToggleAsset { asset } => {
                self.wizard.toggle_asset(asset);
                true
            }
            Action::NextStep => self.wizard.next_step(),
            Action::PrevStep => self.wizard.prev_step(),
            Action::GoToStep { step } => {
                self.wizard.go_to_step(step);
                true
            }
            Action::ResetOnboarding => {
                self.wizard.reset();
                true
            }
            Action::CompleteOnboarding { scenario_id } => self.complete_onboarding(&scenario_id),
            Action::StartGame { scenario_id, roles } => self.start_game(&scenario_id, &roles),
            Action::BeginPlay => self.begin_play(),
            Action::MakeDecision { option_id } => self.make_decision(&option_id),
            Action::HandleTimeout => self.handle_timeout(),
            Action::TickTimer => self.tick_timer(),
            Action::AdvanceToNextInject => self.advance_to_next_inject(),
            Action::ResetGame => {
                self.reset_game();
                true
            }
            Action::ResetSimulation => {
                self.reset_simulation();
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GamePhase;
    use crate::roles::TargetRole;
    use crate::scenario::fixtures::{document, question};

    fn simulation() -> Simulation<FixedClock> {
        let mut sim = Simulation::with_clock(SessionPolicy::default_config(), 11, FixedClock(42)).unwrap();
        sim.registry.register(document(
            "sim",
            vec![
                question("all", 1, &[TargetRole::Universal]),
                question("ciso", 2, &[TargetRole::Specific(Role::Ciso)]),
                question("dfir", 3, &[TargetRole::Specific(Role::Dfir)]),
            ],
        ));
        sim
    }

    fn onboard(sim: &mut Simulation<FixedClock>) {
        sim.dispatch(Action::SetSector {
            sector: OrganizationSector::Financial,
        });
        sim.dispatch(Action::SetInfrastructureType {
            infrastructure: InfrastructureType::OnPremise,
        });
        sim.dispatch(Action::ToggleAsset {
            asset: CriticalAsset::FinancialRecords,
        });
    }

    #[test]
    fn onboarding_requires_complete_wizard_and_known_scenario() {
        let mut sim = simulation();
        assert!(!sim.complete_onboarding("sim"));
        onboard(&mut sim);
        assert!(!sim.complete_onboarding("missing"));
        assert!(sim.complete_onboarding("sim"));
        assert_eq!(
            sim.game().lifecycle.active_scenario_id.as_deref(),
            Some("sim")
        );
        assert!(sim.briefing()[0].narrative.contains("Financial Services"));
    }

    #[test]
    fn start_game_mixes_for_roles() {
        let mut sim = simulation();
        assert!(!sim.start_game("missing", &[Role::Ciso]));
        assert!(!sim.start_game("sim", &[]));
        assert!(sim.start_game("sim", &[Role::Ciso]));
        assert_eq!(sim.game().inject_count(), 2);
        assert!(
            sim.game()
                .scenario
                .as_ref()
                .unwrap()
                .injects
                .iter()
                .all(|inject| inject.id != "dfir")
        );
    }

    #[test]
    fn decisions_use_the_clock() {
        let mut sim = simulation();
        assert!(sim.dispatch(Action::StartGame {
            scenario_id: "sim".into(),
            roles: vec![Role::Dfir],
        }));
        assert!(sim.dispatch(Action::BeginPlay));
        let option = format!("{}-b", sim.game().current_inject().unwrap().id);
        assert!(sim.dispatch(Action::MakeDecision { option_id: option }));
        assert_eq!(sim.game().history[0].timestamp_ms, 42);
        assert_eq!(sim.game().phase, GamePhase::Feedback);
    }

    #[test]
    fn reset_simulation_clears_wizard_too() {
        let mut sim = simulation();
        onboard(&mut sim);
        assert!(sim.complete_onboarding("sim"));
        assert!(sim.start_game("sim", &[Role::Ciso]));
        assert!(sim.dispatch(Action::BeginPlay));
        assert!(sim.has_active_session());

        sim.dispatch(Action::ResetGame);
        assert!(sim.game().lifecycle.is_simulation_active);
        assert!(sim.wizard().config.sector.is_some());

        sim.dispatch(Action::ResetSimulation);
        assert!(!sim.game().lifecycle.is_simulation_active);
        assert_eq!(sim.wizard(), &OnboardingWizard::new());
    }

    #[test]
    fn rejected_import_registers_nothing() {
        let mut sim = simulation();
        let err = sim
            .import_scenario("{ not json", &ImportSource::Paste)
            .unwrap_err();
        assert!(matches!(err, ImportError::Syntax(_)));
        assert_eq!(sim.registry().len(), 1);
    }

    #[test]
    fn actions_deserialize_from_tagged_json() {
        let action: Action =
            serde_json::from_str(r#"{ "type": "make_decision", "option_id": "x" }"#).unwrap();
        assert_eq!(
            action,
            Action::MakeDecision {
                option_id: "x".into()
            }
        );
    }
}
