//! Session policy values: session length, the inaction penalty and the
//! text recorded for timeouts.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_SCORE, INACTION_BUSINESS_PENALTY, INACTION_REPUTATION_PENALTY,
    INACTION_SECURITY_PENALTY, SESSION_QUESTION_COUNT, TIMEOUT_FEEDBACK, TIMEOUT_LABEL,
    TIMEOUT_OPTION_ID,
};
use crate::score::{Impact, ScoreTriad};

/// Errors raised when policy invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("session_length must be at least 1")]
    EmptySession,
    #[error("inaction penalty must not reward inaction (got {security}/{business}/{reputation})")]
    RewardingPenalty {
        security: i32,
        business: i32,
        reputation: i32,
    },
    #[error("default scores must lie within 0..=100 (got {security}/{business}/{reputation})")]
    DefaultScoresOutOfRange {
        security: i32,
        business: i32,
        reputation: i32,
    },
    #[error("timeout_option_id must not be empty")]
    EmptyTimeoutId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPolicy {
    #[serde(default = "SessionPolicy::default_session_length")]
    pub session_length: usize,
    #[serde(default = "SessionPolicy::default_inaction_penalty")]
    pub inaction_penalty: Impact,
    #[serde(default = "SessionPolicy::default_scores")]
    pub default_scores: ScoreTriad,
    #[serde(default = "SessionPolicy::default_timeout_option_id")]
    pub timeout_option_id: String,
    #[serde(default = "SessionPolicy::default_timeout_label")]
    pub timeout_label: String,
    #[serde(default = "SessionPolicy::default_timeout_feedback")]
    pub timeout_feedback: String,
}

impl SessionPolicy {
    const fn default_session_length() -> usize {
        SESSION_QUESTION_COUNT
    }

    const fn default_inaction_penalty() -> Impact {
        Impact::new(
            INACTION_SECURITY_PENALTY,
            INACTION_BUSINESS_PENALTY,
            INACTION_REPUTATION_PENALTY,
        )
    }

    const fn default_scores() -> ScoreTriad {
        ScoreTriad::uniform(DEFAULT_SCORE)
    }

    fn default_timeout_option_id() -> String {
        TIMEOUT_OPTION_ID.to_string()
    }

    fn default_timeout_label() -> String {
        TIMEOUT_LABEL.to_string()
    }

    fn default_timeout_feedback() -> String {
        TIMEOUT_FEEDBACK.to_string()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self {
            session_length: Self::default_session_length(),
            inaction_penalty: Self::default_inaction_penalty(),
            default_scores: Self::default_scores(),
            timeout_option_id: Self::default_timeout_option_id(),
            timeout_label: Self::default_timeout_label(),
            timeout_feedback: Self::default_timeout_feedback(),
        }
    }

    /// Parse a policy from JSON; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a policy.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.session_length == 0 {
            return Err(PolicyError::EmptySession);
        }
        let Impact {
            security,
            business,
            reputation,
        } = self.inaction_penalty;
        if security > 0 || business > 0 || reputation > 0 {
            return Err(PolicyError::RewardingPenalty {
                security,
                business,
                reputation,
            });
        }
        if !self.default_scores.in_range() {
            let ScoreTriad {
                security,
                business,
                reputation,
            } = self.default_scores;
            return Err(PolicyError::DefaultScoresOutOfRange {
                security,
                business,
                reputation,
            });
        }
        if self.timeout_option_id.is_empty() {
            return Err(PolicyError::EmptyTimeoutId);
        }
        Ok(())
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::default_config()
    }
}
