//! Threat briefing slides generated from the organization profile.
use serde::{Deserialize, Serialize};

use crate::onboarding::{CriticalAsset, OnboardingConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingSlide {
    pub category: String,
    pub narrative: String,
}

/// Join asset labels as "A", "A and B" or "A, B, and C".
#[must_use]
pub fn asset_phrase(assets: &[CriticalAsset]) -> String {
    let labels: Vec<&str> = assets.iter().map(|asset| asset.label()).collect();
    match labels.as_slice() {
        [] => "critical infrastructure".to_string(),
        [only] => (*only).to_string(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

#[must_use]
pub fn briefing_slides(config: &OnboardingConfig) -> Vec<BriefingSlide> {
    let sector = config.sector.map_or("Unknown", |s| s.label());
    let infrastructure = config.infrastructure_type.map_or("Unknown", |i| i.label());
    let surface = if config.include_ot_systems {
        "OT/SCADA systems detected on the network. Attack surface expanded significantly. "
    } else {
        "Network segmentation analysis in progress. "
    };
    let assets = asset_phrase(&config.critical_assets);

    vec![
        BriefingSlide {
            category: "TARGET ANALYSIS".to_string(),
            narrative: format!(
                "Intercepted comms suggest a coordinated campaign against the {sector} sector. \
                 Threat actors are mobilizing. Intelligence indicates multiple APT groups with \
                 known TTPs targeting organizations matching your profile. DEFCON status elevated."
            ),
        },
        BriefingSlide {
            category: "ATTACK VECTOR".to_string(),
            narrative: format!(
                "Vulnerability scan complete. Your {infrastructure} architecture shows critical \
                 exposure points in the perimeter defense. {surface}Immediate hardening recommended."
            ),
        },
        BriefingSlide {
            category: "IMPACT ASSESSMENT".to_string(),
            narrative: format!(
                "Primary objective identified: Compromise of {assets}. Impact assessment: \
                 CATASTROPHIC. All response teams on standby. Immediate operator assignment \
                 required to coordinate defensive operations."
            ),
        },
    ]
}
