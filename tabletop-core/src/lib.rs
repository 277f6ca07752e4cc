//! Tabletop Exercise Core
//!
//! Platform-agnostic session logic for a cyber incident tabletop simulator:
//! scenario intake, the scenario catalog, role-based question mixing, the
//! score model and the phase machine that drives a play session.
//! Screens and storage live with whoever embeds a [`Simulation`]; the core
//! only takes scenario JSON in and hands state snapshots back.

pub mod briefing;
pub mod constants;
#[cfg(feature = "async")]
pub mod countdown;
pub mod debrief;
pub mod game;
pub mod import;
pub mod mixer;
pub mod onboarding;
pub mod policy;
pub mod registry;
pub mod roles;
pub mod sanitize;
pub mod scenario;
pub mod score;
pub mod simulation;
pub mod validate;

use thiserror::Error;

// Re-export commonly used types
pub use briefing::{BriefingSlide, asset_phrase, briefing_slides};
#[cfg(feature = "async")]
pub use countdown::{MIN_TICK_PERIOD, run_countdown, spawn_countdown};
pub use debrief::{Badge, DebriefSummary, Outcome, debrief};
pub use game::{
    DecisionRecord, GamePhase, GameState, SessionLifecycle, TimerState, TimerUrgency, format_timer,
};
pub use import::{ImportError, ImportSource, parse_scenario};
pub use mixer::{build_session_injects, qualifying_questions, select_questions};
pub use onboarding::{
    CriticalAsset, InfrastructureType, OnboardingConfig, OnboardingStep, OnboardingWizard,
    OrganizationSector,
};
pub use policy::{PolicyError, SessionPolicy};
pub use registry::{CatalogQuery, CatalogSort, RegistryEntry, ScenarioRegistry, fingerprint};
pub use roles::{Role, TargetRole};
pub use sanitize::{sanitize_str, sanitize_value, sanitized};
pub use scenario::{
    Choice, Difficulty, Inject, OutcomeType, Question, Scenario, ScenarioConfiguration,
    ScenarioDocument, ScenarioMeta, ScenarioOption, normalize, question_to_inject,
};
pub use score::{Impact, ScoreTriad, apply_impact, clamp_score, is_terminal_loss};
pub use simulation::{Action, Clock, FixedClock, Simulation, SystemClock};
pub use validate::{ValidationErrors, validate, validate_document};

/// Trait for abstracting where built-in scenarios come from
/// Platform-specific implementations should provide this
pub trait ScenarioLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every built-in scenario document
    ///
    /// # Errors
    ///
    /// Returns an error if any scenario cannot be read or fails validation.
    fn load_scenarios(&self) -> Result<Vec<ScenarioDocument>, Self::Error>;
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("built-in scenario '{name}' is not valid JSON: {source}")]
    Parse {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("built-in scenario '{name}' failed validation: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: ValidationErrors,
    },
}

const BUILTIN_SCENARIOS: &[(&str, &str)] = &[(
    "ransomware-001",
    include_str!("../assets/scenarios/ransomware-001.json"),
)];

/// Scenarios compiled into the crate. Trusted content: validated but not
/// sanitized.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticScenarioLoader;

impl ScenarioLoader for StaticScenarioLoader {
    type Error = LoadError;

    fn load_scenarios(&self) -> Result<Vec<ScenarioDocument>, Self::Error> {
        BUILTIN_SCENARIOS
            .iter()
            .map(|&(name, json)| {
                let raw: serde_json::Value = serde_json::from_str(json)
                    .map_err(|source| LoadError::Parse { name, source })?;
                validate(&raw).map_err(|source| LoadError::Invalid { name, source })
            })
            .collect()
    }
}

/// A registry seeded with every built-in scenario.
///
/// # Errors
///
/// Returns an error if built-in data is malformed.
pub fn builtin_registry() -> Result<ScenarioRegistry, LoadError> {
    StaticScenarioLoader
        .load_scenarios()
        .map(ScenarioRegistry::with_documents)
}
