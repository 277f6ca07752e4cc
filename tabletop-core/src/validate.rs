//! Structural validation of untrusted scenario JSON.
//!
//! The validator walks a parsed [`serde_json::Value`] and builds a
//! [`ScenarioDocument`] while collecting one path-qualified message per
//! violated constraint. It never panics and never stops at the first error.
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    IMPACT_MAX, IMPACT_MIN, MAX_TIMER_SECONDS, OPTIONS_PER_QUESTION, SCORE_MAX, SCORE_MIN,
};
use crate::roles::{Role, TargetRole};
use crate::scenario::{
    Difficulty, OutcomeType, Question, ScenarioConfiguration, ScenarioDocument, ScenarioMeta,
    ScenarioOption,
};
use crate::score::{Impact, ScoreTriad};

const OUTCOME_COVERAGE_MESSAGE: &str = "Each question must have exactly 4 options: one critical_success ('Yes, and…'), one partial_success ('Yes, but…'), one partial_failure ('No, but…'), and one critical_failure ('No, and…').";
const ROLE_NAMES: [&str; 4] = ["CISO", "SOC_LEAD", "DFIR", "IT_MANAGER"];
const TARGET_ROLE_NAMES: [&str; 5] = ["CISO", "SOC_LEAD", "DFIR", "IT_MANAGER", "ALL"];
const DIFFICULTY_NAMES: [&str; 3] = ["Easy", "Medium", "Hard"];
const OUTCOME_NAMES: [&str; 4] = [
    "critical_success",
    "partial_success",
    "partial_failure",
    "critical_failure",
];

/// Path-qualified schema violations, formatted `[path] message`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<String>);

impl ValidationErrors {
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scenario failed validation with {} error(s)", self.0.len())?;
        for message in &self.0 {
            write!(f, "\n  {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Validate a parsed JSON value against the scenario schema.
///
/// # Errors
///
/// Returns every violated constraint when `raw` is not a valid scenario.
pub fn validate(raw: &Value) -> Result<ScenarioDocument, ValidationErrors> {
    let mut validator = Validator::default();
    let document = validator.document(raw);
    match document {
        Some(document) if validator.errors.is_empty() => Ok(document),
        _ => Err(ValidationErrors(validator.errors)),
    }
}

/// Re-check an already typed document, e.g. one built in code.
///
/// # Errors
///
/// Returns every violated constraint of the document.
pub fn validate_document(document: &ScenarioDocument) -> Result<(), ValidationErrors> {
    let value = serde_json::to_value(document)
        .map_err(|err| ValidationErrors(vec![format!("[root] {err}")]))?;
    validate(&value).map(|_| ())
}

#[derive(Debug, Clone, Copy)]
enum Segment {
    Key(&'static str),
    Index(usize),
}

#[derive(Debug, Clone, Copy)]
enum Lower {
    Positive,
    AtLeast(i64),
}

#[derive(Default)]
struct Validator {
    path: Vec<Segment>,
    errors: Vec<String>,
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn quoted_options(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl Validator {
    fn path_label(&self) -> String {
        if self.path.is_empty() {
            return "root".to_string();
        }
        self.path
            .iter()
            .map(|segment| match segment {
                Segment::Key(key) => (*key).to_string(),
                Segment::Index(index) => index.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    fn error(&mut self, message: impl fmt::Display) {
        let path = self.path_label();
        self.errors.push(format!("[{path}] {message}"));
    }

    fn at<T>(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> T) -> T {
        self.path.push(segment);
        let out = f(self);
        self.path.pop();
        out
    }

    fn field<T>(
        &mut self,
        obj: &Map<String, Value>,
        key: &'static str,
        f: impl FnOnce(&mut Self, &Value) -> Option<T>,
    ) -> Option<T> {
        self.at(Segment::Key(key), |v| match obj.get(key) {
            Some(value) => f(v, value),
            None => {
                v.error("Required");
                None
            }
        })
    }

    fn object<'v>(&mut self, value: &'v Value) -> Option<&'v Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.error(format!("Expected object, received {}", kind_of(value)));
        }
        obj
    }

    fn array<'v>(&mut self, value: &'v Value, min_len: usize) -> Option<&'v Vec<Value>> {
        let Some(items) = value.as_array() else {
            self.error(format!("Expected array, received {}", kind_of(value)));
            return None;
        };
        if items.len() < min_len {
            self.error(format!(
                "Array must contain at least {min_len} element(s)"
            ));
        }
        Some(items)
    }

    fn each<T>(
        &mut self,
        items: &[Value],
        mut f: impl FnMut(&mut Self, &Value) -> Option<T>,
    ) -> Option<Vec<T>> {
        let parsed: Vec<Option<T>> = items
            .iter()
            .enumerate()
            .map(|(index, item)| self.at(Segment::Index(index), |v| f(v, item)))
            .collect();
        parsed.into_iter().collect()
    }

    fn string(&mut self, value: &Value) -> Option<String> {
        let Some(text) = value.as_str() else {
            self.error(format!("Expected string, received {}", kind_of(value)));
            return None;
        };
        if text.is_empty() {
            self.error("String must contain at least 1 character(s)");
            return None;
        }
        Some(text.to_string())
    }

    fn integer(&mut self, value: &Value, lower: Lower, upper: i64) -> Option<i64> {
        let Some(number) = value.as_number() else {
            self.error(format!("Expected number, received {}", kind_of(value)));
            return None;
        };
        let parsed = number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
                .map(|f| f as i64)
        });
        let Some(int) = parsed else {
            if number.is_u64() {
                self.error(format!("Number must be less than or equal to {upper}"));
            } else {
                self.error("Expected integer, received float");
            }
            return None;
        };
        let mut ok = true;
        match lower {
            Lower::Positive if int <= 0 => {
                self.error("Number must be greater than 0");
                ok = false;
            }
            Lower::AtLeast(min) if int < min => {
                self.error(format!("Number must be greater than or equal to {min}"));
                ok = false;
            }
            _ => {}
        }
        if int > upper {
            self.error(format!("Number must be less than or equal to {upper}"));
            ok = false;
        }
        ok.then_some(int)
    }

    fn bounded_i32(&mut self, value: &Value, min: i32, max: i32) -> Option<i32> {
        self.integer(value, Lower::AtLeast(i64::from(min)), i64::from(max))
            .and_then(|int| i32::try_from(int).ok())
    }

    fn positive_u32(&mut self, value: &Value, max: u32) -> Option<u32> {
        self.integer(value, Lower::Positive, i64::from(max))
            .and_then(|int| u32::try_from(int).ok())
    }

    fn enumeration<T: FromStr>(&mut self, value: &Value, names: &[&str]) -> Option<T> {
        let expected = quoted_options(names);
        let Some(text) = value.as_str() else {
            self.error(format!("Expected {expected}, received {}", kind_of(value)));
            return None;
        };
        let parsed = T::from_str(text).ok();
        if parsed.is_none() {
            self.error(format!(
                "Invalid enum value. Expected {expected}, received '{text}'"
            ));
        }
        parsed
    }

    fn triad(&mut self, value: &Value, min: i32, max: i32) -> Option<(i32, i32, i32)> {
        let obj = self.object(value)?;
        let security = self.field(obj, "security", |v, x| v.bounded_i32(x, min, max));
        let business = self.field(obj, "business", |v, x| v.bounded_i32(x, min, max));
        let reputation = self.field(obj, "reputation", |v, x| v.bounded_i32(x, min, max));
        Some((security?, business?, reputation?))
    }

    fn document(&mut self, value: &Value) -> Option<ScenarioDocument> {
        let obj = self.object(value)?;
        let meta = self.field(obj, "meta", Self::meta);
        let configuration = self.field(obj, "configuration", Self::configuration);
        let questions = self.field(obj, "questions", Self::questions);
        Some(ScenarioDocument {
            meta: meta?,
            configuration: configuration?,
            questions: questions?,
        })
    }

    fn meta(&mut self, value: &Value) -> Option<ScenarioMeta> {
        let obj = self.object(value)?;
        let id = self.field(obj, "id", Self::string);
        let title = self.field(obj, "title", Self::string);
        let description = self.field(obj, "description", Self::string);
        let difficulty =
            self.field(obj, "difficulty", |v, x| v.enumeration::<Difficulty>(x, &DIFFICULTY_NAMES));
        let duration_minutes =
            self.field(obj, "duration_minutes", |v, x| v.positive_u32(x, u32::MAX));
        let tags = self.field(obj, "tags", |v, x| {
            let items = v.array(x, 1)?;
            v.each(items, Self::string)
        });
        let version = self.field(obj, "version", Self::string);
        Some(ScenarioMeta {
            id: id?,
            title: title?,
            description: description?,
            difficulty: difficulty?,
            duration_minutes: duration_minutes?,
            tags: tags?,
            version: version?,
        })
    }

    fn configuration(&mut self, value: &Value) -> Option<ScenarioConfiguration> {
        let obj = self.object(value)?;
        let playable_roles = self.field(obj, "playable_roles", |v, x| {
            let items = v.array(x, 1)?;
            v.each(items, |v, item| v.enumeration::<Role>(item, &ROLE_NAMES))
        });
        let starting_stats = self.field(obj, "starting_stats", |v, x| {
            v.triad(x, SCORE_MIN, SCORE_MAX)
                .map(|(s, b, r)| ScoreTriad::new(s, b, r))
        });
        Some(ScenarioConfiguration {
            playable_roles: playable_roles?,
            starting_stats: starting_stats?,
        })
    }

    fn questions(&mut self, value: &Value) -> Option<Vec<Question>> {
        let items = self.array(value, 1)?;
        let mut seen = HashSet::new();
        self.each(items, |v, item| {
            let question = v.question(item)?;
            if !seen.insert(question.id.clone()) {
                v.at(Segment::Key("id"), |v| {
                    v.error(format!("Duplicate question id '{}'", question.id));
                });
                return None;
            }
            Some(question)
        })
    }

    fn question(&mut self, value: &Value) -> Option<Question> {
        let obj = self.object(value)?;
        let id = self.field(obj, "id", Self::string);
        let order = self.field(obj, "order", |v, x| v.positive_u32(x, u32::MAX));
        let timestamp_display = self.field(obj, "timestamp_display", Self::string);
        let context = self.field(obj, "context", Self::string);
        let text = self.field(obj, "text", Self::string);
        let timer_seconds =
            self.field(obj, "timer_seconds", |v, x| v.positive_u32(x, MAX_TIMER_SECONDS));
        let target_roles = self.field(obj, "targetRoles", |v, x| {
            let items = v.array(x, 1)?;
            v.each(items, |v, item| {
                v.enumeration::<TargetRole>(item, &TARGET_ROLE_NAMES)
            })
        });
        let options = self.field(obj, "options", Self::options);
        Some(Question {
            id: id?,
            order: order?,
            timestamp_display: timestamp_display?,
            context: context?,
            text: text?,
            timer_seconds: timer_seconds?,
            target_roles: target_roles?.into_iter().collect(),
            options: options?,
        })
    }

    fn options(&mut self, value: &Value) -> Option<Vec<ScenarioOption>> {
        let Some(items) = value.as_array() else {
            self.error(format!("Expected array, received {}", kind_of(value)));
            return None;
        };
        let count_ok = items.len() == OPTIONS_PER_QUESTION;
        if !count_ok {
            self.error(format!(
                "Array must contain exactly {OPTIONS_PER_QUESTION} element(s)"
            ));
        }
        let options = self.each(items, Self::option)?;
        let outcomes: HashSet<OutcomeType> = options.iter().map(|o| o.outcome_type).collect();
        if OutcomeType::ALL.iter().any(|outcome| !outcomes.contains(outcome)) {
            self.error(OUTCOME_COVERAGE_MESSAGE);
            return None;
        }
        if !count_ok {
            return None;
        }
        let mut ids = HashSet::new();
        if let Some(dup) = options.iter().find(|o| !ids.insert(o.id.as_str())) {
            self.error(format!("Duplicate option id '{}'", dup.id));
            return None;
        }
        Some(options)
    }

    fn option(&mut self, value: &Value) -> Option<ScenarioOption> {
        let obj = self.object(value)?;
        let id = self.field(obj, "id", Self::string);
        let label = self.field(obj, "label", Self::string);
        let outcome_type =
            self.field(obj, "outcome_type", |v, x| v.enumeration::<OutcomeType>(x, &OUTCOME_NAMES));
        let feedback_text = self.field(obj, "feedback_text", Self::string);
        let impact = self.field(obj, "impact", |v, x| {
            v.triad(x, IMPACT_MIN, IMPACT_MAX)
                .map(|(s, b, r)| Impact::new(s, b, r))
        });
        Some(ScenarioOption {
            id: id?,
            label: label?,
            outcome_type: outcome_type?,
            feedback_text: feedback_text?,
            impact: impact?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn option(id: &str, outcome: &str) -> Value {
        json!({
            "id": id,
            "label": format!("Label {id}"),
            "outcome_type": outcome,
            "feedback_text": "Feedback",
            "impact": { "security": -5, "business": 0, "reputation": 5 }
        })
    }

    fn question(id: &str) -> Value {
        json!({
            "id": id,
            "order": 1,
            "timestamp_display": "T+00:05",
            "context": "Context",
            "text": "Prompt",
            "timer_seconds": 45,
            "targetRoles": ["ALL"],
            "options": [
                option("a", "critical_success"),
                option("b", "partial_success"),
                option("c", "partial_failure"),
                option("d", "critical_failure")
            ]
        })
    }

    fn scenario() -> Value {
        json!({
            "meta": {
                "id": "drill-001",
                "title": "Drill",
                "description": "Desc",
                "difficulty": "Hard",
                "duration_minutes": 30,
                "tags": ["Ransomware"],
                "version": "1.0.0"
            },
            "configuration": {
                "playable_roles": ["CISO", "DFIR"],
                "starting_stats": { "security": 50, "business": 60, "reputation": 70 }
            },
            "questions": [question("q1"), question("q2")]
        })
    }

    #[test]
    fn accepts_a_complete_document() {
        let doc = validate(&scenario()).unwrap();
        assert_eq!(doc.meta.id, "drill-001");
        assert_eq!(doc.meta.difficulty, Difficulty::Hard);
        assert_eq!(doc.configuration.starting_stats, ScoreTriad::new(50, 60, 70));
        assert_eq!(doc.questions.len(), 2);
        assert_eq!(doc.questions[0].target_roles[0], TargetRole::Universal);
        assert!(validate_document(&doc).is_ok());
    }

    #[test]
    fn integral_floats_are_accepted() {
        let mut raw = scenario();
        raw["questions"][0]["timer_seconds"] = json!(60.0);
        let doc = validate(&raw).unwrap();
        assert_eq!(doc.questions[0].timer_seconds, 60);
    }

    #[test]
    fn reports_every_violation_with_paths() {
        let mut raw = scenario();
        raw["meta"].as_object_mut().unwrap().remove("title");
        raw["meta"]["difficulty"] = json!("Extreme");
        raw["configuration"]["playable_roles"] = json!([]);
        raw["questions"][1]["timer_seconds"] = json!(301);
        raw["questions"][1]["options"][0]["impact"]["security"] = json!(-101);

        let errors = validate(&raw).unwrap_err();
        let messages = errors.messages();
        assert!(messages.contains(&"[meta.title] Required".to_string()));
        assert!(messages.iter().any(|m| m.starts_with("[meta.difficulty] Invalid enum value")));
        assert!(messages.contains(
            &"[configuration.playable_roles] Array must contain at least 1 element(s)".to_string()
        ));
        assert!(messages.contains(
            &"[questions.1.timer_seconds] Number must be less than or equal to 300".to_string()
        ));
        assert!(messages.contains(
            &"[questions.1.options.0.impact.security] Number must be greater than or equal to -100"
                .to_string()
        ));
        assert_eq!(errors.len(), 5);
    }

    #[test]
    fn rejects_missing_outcome_category() {
        let mut raw = scenario();
        raw["questions"][0]["options"][3]["outcome_type"] = json!("partial_failure");
        let errors = validate(&raw).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.messages()[0].starts_with("[questions.0.options] Each question must have"));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let mut raw = scenario();
        let options = raw["questions"][0]["options"].as_array_mut().unwrap();
        let mut extra = options[0].clone();
        extra["id"] = json!("q1-extra");
        options.push(extra);
        let errors = validate(&raw).unwrap_err();
        assert_eq!(
            errors.messages(),
            ["[questions.0.options] Array must contain exactly 4 element(s)".to_string()]
        );
    }

    #[test]
    fn short_option_list_also_reports_missing_outcome() {
        let mut raw = scenario();
        let options = raw["questions"][0]["options"].as_array_mut().unwrap();
        options.retain(|o| o["outcome_type"] != json!("critical_failure"));
        assert_eq!(options.len(), 3);
        let errors = validate(&raw).unwrap_err();
        let messages = errors.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0],
            "[questions.0.options] Array must contain exactly 4 element(s)"
        );
        assert!(messages[1].starts_with("[questions.0.options] Each question must have"));
    }

    #[test]
    fn rejects_duplicate_question_ids() {
        let mut raw = scenario();
        raw["questions"][1]["id"] = json!("q1");
        let errors = validate(&raw).unwrap_err();
        assert_eq!(
            errors.messages(),
            ["[questions.1.id] Duplicate question id 'q1'".to_string()]
        );
    }

    #[test]
    fn sentinel_role_is_not_playable() {
        let mut raw = scenario();
        raw["configuration"]["playable_roles"] = json!(["ALL"]);
        let errors = validate(&raw).unwrap_err();
        assert!(errors.messages()[0].starts_with("[configuration.playable_roles.0] Invalid enum"));
    }

    #[test]
    fn non_object_root_reports_root_path() {
        let errors = validate(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.messages(), ["[root] Expected object, received array".to_string()]);
    }

    #[test]
    fn empty_strings_and_wrong_types_are_flagged() {
        let mut raw = scenario();
        raw["meta"]["id"] = json!("");
        raw["meta"]["duration_minutes"] = json!("30");
        raw["questions"][0]["order"] = json!(0);
        let errors = validate(&raw).unwrap_err();
        let messages = errors.messages();
        assert!(messages.contains(
            &"[meta.id] String must contain at least 1 character(s)".to_string()
        ));
        assert!(messages.contains(
            &"[meta.duration_minutes] Expected number, received string".to_string()
        ));
        assert!(messages.contains(&"[questions.0.order] Number must be greater than 0".to_string()));
    }
}
