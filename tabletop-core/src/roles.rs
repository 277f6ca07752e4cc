use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::UNIVERSAL_ROLE;

/// Playable responder roles for a tabletop exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "CISO")]
    Ciso,
    #[serde(rename = "SOC_LEAD")]
    SocLead,
    #[serde(rename = "DFIR")]
    Dfir,
    #[serde(rename = "IT_MANAGER")]
    ItManager,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::Ciso, Self::SocLead, Self::Dfir, Self::ItManager];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ciso => "CISO",
            Self::SocLead => "SOC_LEAD",
            Self::Dfir => "DFIR",
            Self::ItManager => "IT_MANAGER",
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Ciso => "Chief Information Security Officer",
            Self::SocLead => "SOC Lead",
            Self::Dfir => "DFIR Analyst",
            Self::ItManager => "IT Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CISO" => Ok(Self::Ciso),
            "SOC_LEAD" => Ok(Self::SocLead),
            "DFIR" => Ok(Self::Dfir),
            "IT_MANAGER" => Ok(Self::ItManager),
            _ => Err(()),
        }
    }
}

/// Audience of a question: one concrete role, or every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TargetRole {
    Specific(Role),
    Universal,
}

impl TargetRole {
    /// Whether a question aimed at this target is playable by `selected`.
    #[must_use]
    pub fn matches(self, selected: &[Role]) -> bool {
        match self {
            Self::Universal => true,
            Self::Specific(role) => selected.contains(&role),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Universal => UNIVERSAL_ROLE,
            Self::Specific(role) => role.as_str(),
        }
    }
}

impl From<Role> for TargetRole {
    fn from(value: Role) -> Self {
        Self::Specific(value)
    }
}

impl FromStr for TargetRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == UNIVERSAL_ROLE {
            return Ok(Self::Universal);
        }
        Role::from_str(s).map(Self::Specific)
    }
}

impl TryFrom<String> for TargetRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value).map_err(|()| format!("unknown target role '{value}'"))
    }
}

impl From<TargetRole> for String {
    fn from(value: TargetRole) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn universal_target_matches_any_selection() {
        assert!(TargetRole::Universal.matches(&[Role::Dfir]));
        assert!(TargetRole::Universal.matches(&[]));
    }

    #[test]
    fn specific_target_requires_overlap() {
        let target = TargetRole::Specific(Role::Ciso);
        assert!(target.matches(&[Role::Dfir, Role::Ciso]));
        assert!(!target.matches(&[Role::Dfir, Role::SocLead]));
    }

    #[test]
    fn target_roles_serialize_as_plain_strings() {
        let roles = vec![TargetRole::Universal, TargetRole::Specific(Role::SocLead)];
        let json = serde_json::to_string(&roles).unwrap();
        assert_eq!(json, r#"["ALL","SOC_LEAD"]"#);
        let back: Vec<TargetRole> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roles);
        assert!(serde_json::from_str::<TargetRole>(r#""all""#).is_err());
    }

    #[test]
    fn role_parsing_rejects_sentinel() {
        assert_eq!("IT_MANAGER".parse::<Role>(), Ok(Role::ItManager));
        assert!("ALL".parse::<Role>().is_err());
    }
}
