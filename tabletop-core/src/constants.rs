//! Centralized limits and policy defaults for tabletop session logic.
//!
//! Schema bounds live here so the validator, the score model and the
//! session policy agree on the same numbers.

// Score bounds -------------------------------------------------------------
pub const SCORE_MIN: i32 = 0;
pub const SCORE_MAX: i32 = 100;
pub const DEFAULT_SCORE: i32 = 50;

// Schema bounds ------------------------------------------------------------
pub const IMPACT_MIN: i32 = -100;
pub const IMPACT_MAX: i32 = 100;
pub const MAX_TIMER_SECONDS: u32 = 300;
pub const OPTIONS_PER_QUESTION: usize = 4;

// Session policy defaults --------------------------------------------------
pub const SESSION_QUESTION_COUNT: usize = 5;
pub const INACTION_SECURITY_PENALTY: i32 = -15;
pub const INACTION_BUSINESS_PENALTY: i32 = -10;
pub const INACTION_REPUTATION_PENALTY: i32 = -10;
pub const TIMEOUT_OPTION_ID: &str = "TIMEOUT";
pub const TIMEOUT_LABEL: &str = "No decision made — inaction penalty applied.";
pub const TIMEOUT_FEEDBACK: &str = "Time expired. Your team hesitated, and the situation deteriorated. The attackers exploited the delay.";

// Timer urgency ------------------------------------------------------------
pub const TIMER_URGENT_SECONDS: u32 = 10;
pub const TIMER_CRITICAL_SECONDS: u32 = 5;

// Debrief badge thresholds (sum of the three scores) -----------------------
pub const BADGE_CYBER_HERO_MIN: i32 = 250;
pub const BADGE_INCIDENT_COMMANDER_MIN: i32 = 200;
pub const BADGE_FIRST_RESPONDER_MIN: i32 = 150;

// Sentinel role accepted in question targeting -----------------------------
pub const UNIVERSAL_ROLE: &str = "ALL";
