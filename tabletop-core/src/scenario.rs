//! Scenario document model.
//!
//! [`ScenarioDocument`] is the canonical authored shape: questions with a
//! four-outcome option matrix. [`Scenario`] is the play-facing projection the
//! session engine consumes; it is always derived with [`normalize`] and never
//! edited on its own.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

use crate::roles::{Role, TargetRole};
use crate::score::{Impact, ScoreTriad};

/// Targeted roles rarely exceed the four concrete roles.
pub type TargetRoles = SmallVec<[TargetRole; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        }
    }

    /// Ordering weight, 0 for the easiest.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Self::Easy),
            "Medium" => Ok(Self::Medium),
            "Hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// Quality of a response option. Every question covers all four once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeType {
    /// "Yes, and…"
    CriticalSuccess,
    /// "Yes, but…"
    PartialSuccess,
    /// "No, but…"
    PartialFailure,
    /// "No, and…"
    CriticalFailure,
}

impl OutcomeType {
    pub const ALL: [Self; 4] = [
        Self::CriticalSuccess,
        Self::PartialSuccess,
        Self::PartialFailure,
        Self::CriticalFailure,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CriticalSuccess => "critical_success",
            Self::PartialSuccess => "partial_success",
            Self::PartialFailure => "partial_failure",
            Self::CriticalFailure => "critical_failure",
        }
    }
}

impl fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutcomeType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|outcome| outcome.as_str() == s)
            .ok_or(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioMeta {
    pub id: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub duration_minutes: u32,
    pub tags: Vec<String>,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioConfiguration {
    pub playable_roles: Vec<Role>,
    pub starting_stats: ScoreTriad,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOption {
    pub id: String,
    pub label: String,
    pub outcome_type: OutcomeType,
    pub feedback_text: String,
    pub impact: Impact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub order: u32,
    pub timestamp_display: String,
    pub context: String,
    pub text: String,
    pub timer_seconds: u32,
    #[serde(rename = "targetRoles")]
    pub target_roles: TargetRoles,
    pub options: Vec<ScenarioOption>,
}

impl Question {
    /// Whether any of `selected` may be asked this question.
    #[must_use]
    pub fn is_playable_by(&self, selected: &[Role]) -> bool {
        self.target_roles.iter().any(|target| target.matches(selected))
    }
}

/// Top-level importable scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDocument {
    pub meta: ScenarioMeta,
    pub configuration: ScenarioConfiguration,
    pub questions: Vec<Question>,
}

impl ScenarioDocument {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    #[must_use]
    pub fn question_by_id(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Flattened response option as seen by the session engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
    pub feedback_text: String,
    pub impact: Impact,
}

/// One timed decision point presented during play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inject {
    pub id: String,
    pub order: u32,
    pub timestamp_display: String,
    pub context: String,
    pub question: String,
    pub timer_seconds: u32,
    #[serde(rename = "targetRoles", default)]
    pub target_roles: TargetRoles,
    pub options: Vec<Choice>,
}

impl Inject {
    #[must_use]
    pub fn choice(&self, option_id: &str) -> Option<&Choice> {
        self.options.iter().find(|choice| choice.id == option_id)
    }
}

/// Play-facing scenario: metadata plus an ordered inject timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub meta: ScenarioMeta,
    pub configuration: ScenarioConfiguration,
    pub injects: Vec<Inject>,
}

impl Scenario {
    #[must_use]
    pub fn id(&self) -> &str {
        &self.meta.id
    }

    #[must_use]
    pub fn inject(&self, index: usize) -> Option<&Inject> {
        self.injects.get(index)
    }

    /// Same scenario restricted to a session's selected injects.
    #[must_use]
    pub fn with_injects(&self, injects: Vec<Inject>) -> Self {
        Self {
            meta: self.meta.clone(),
            configuration: self.configuration.clone(),
            injects,
        }
    }
}

/// Project one question into an inject at position `index` (0-based).
#[must_use]
pub fn question_to_inject(question: &Question, index: usize) -> Inject {
    Inject {
        id: question.id.clone(),
        order: u32::try_from(index).map_or(u32::MAX, |i| i.saturating_add(1)),
        timestamp_display: question.timestamp_display.clone(),
        context: question.context.clone(),
        question: question.text.clone(),
        timer_seconds: question.timer_seconds,
        target_roles: question.target_roles.clone(),
        options: question
            .options
            .iter()
            .map(|opt| Choice {
                id: opt.id.clone(),
                label: opt.label.clone(),
                feedback_text: opt.feedback_text.clone(),
                impact: opt.impact,
            })
            .collect(),
    }
}

/// Build the play-facing projection of a full document, preserving question
/// order and each question's authored `order`.
#[must_use]
pub fn normalize(document: &ScenarioDocument) -> Scenario {
    let injects = document
        .questions
        .iter()
        .enumerate()
        .map(|(index, question)| Inject {
            order: question.order,
            ..question_to_inject(question, index)
        })
        .collect();
    Scenario {
        meta: document.meta.clone(),
        configuration: document.configuration.clone(),
        injects,
    }
}
