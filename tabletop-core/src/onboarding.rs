//! Organization profile wizard.
//!
//! Four linear steps (sector, infrastructure, assets, review), each gated by
//! its own validity predicate. The finished [`OnboardingConfig`] is handed to
//! the game state through `commit_onboarding`.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationSector {
    Financial,
    Public,
    Logistics,
}

impl OrganizationSector {
    pub const ALL: [Self; 3] = [Self::Financial, Self::Public, Self::Logistics];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Public => "public",
            Self::Logistics => "logistics",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Financial => "Financial Services",
            Self::Public => "Public Administration",
            Self::Logistics => "Transportation & Logistics",
        }
    }
}

impl fmt::Display for OrganizationSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrganizationSector {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfrastructureType {
    #[serde(rename = "hybrid")]
    Hybrid,
    #[serde(rename = "on-premise")]
    OnPremise,
}

impl InfrastructureType {
    pub const ALL: [Self; 2] = [Self::Hybrid, Self::OnPremise];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hybrid => "hybrid",
            Self::OnPremise => "on-premise",
        }
    }

    /// Short name used in briefing narratives.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hybrid => "Hybrid Cloud",
            Self::OnPremise => "On-Premise",
        }
    }

    /// Title shown on the wizard's infrastructure step.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Hybrid => "Hybrid Cloud + On-Premise",
            Self::OnPremise => "On-Premise IT Only",
        }
    }
}

impl fmt::Display for InfrastructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InfrastructureType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalAsset {
    Pii,
    FinancialRecords,
    ProductionServers,
    EmailCollaboration,
    BackupInfrastructure,
    TradeSecretsIp,
}

impl CriticalAsset {
    pub const ALL: [Self; 6] = [
        Self::Pii,
        Self::FinancialRecords,
        Self::ProductionServers,
        Self::EmailCollaboration,
        Self::BackupInfrastructure,
        Self::TradeSecretsIp,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pii => "pii",
            Self::FinancialRecords => "financial_records",
            Self::ProductionServers => "production_servers",
            Self::EmailCollaboration => "email_collaboration",
            Self::BackupInfrastructure => "backup_infrastructure",
            Self::TradeSecretsIp => "trade_secrets_ip",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pii => "PII / Customer Data",
            Self::FinancialRecords => "Financial Records",
            Self::ProductionServers => "Production Servers",
            Self::EmailCollaboration => "Email & Collaboration",
            Self::BackupInfrastructure => "Backup Infrastructure",
            Self::TradeSecretsIp => "Trade Secrets / IP",
        }
    }

    #[must_use]
    pub const fn high_impact(self) -> bool {
        matches!(
            self,
            Self::Pii | Self::FinancialRecords | Self::ProductionServers
        )
    }
}

impl fmt::Display for CriticalAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CriticalAsset {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|v| v.as_str() == s).ok_or(())
    }
}

/// Organization profile collected by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub sector: Option<OrganizationSector>,
    pub infrastructure_type: Option<InfrastructureType>,
    #[serde(default)]
    pub include_ot_systems: bool,
    #[serde(default)]
    pub critical_assets: Vec<CriticalAsset>,
}

impl OnboardingConfig {
    #[must_use]
    pub fn has_asset(&self, asset: CriticalAsset) -> bool {
        self.critical_assets.contains(&asset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OnboardingStep {
    Sector,
    Infrastructure,
    Assets,
    Review,
}

impl OnboardingStep {
    pub const ALL: [Self; 4] = [Self::Sector, Self::Infrastructure, Self::Assets, Self::Review];

    /// 1-based position in the wizard.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Sector => 1,
            Self::Infrastructure => 2,
            Self::Assets => 3,
            Self::Review => 4,
        }
    }

    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    #[must_use]
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number().saturating_add(1))
    }

    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

/// Draft wizard state. Mutators never fail; invalid moves are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingWizard {
    pub step: OnboardingStep,
    pub config: OnboardingConfig,
}

impl Default for OnboardingWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingWizard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: OnboardingStep::Sector,
            config: OnboardingConfig::default(),
        }
    }

    pub fn set_sector(&mut self, sector: OrganizationSector) {
        self.config.sector = Some(sector);
    }

    pub fn set_infrastructure_type(&mut self, infrastructure: InfrastructureType) {
        self.config.infrastructure_type = Some(infrastructure);
    }

    pub fn set_include_ot_systems(&mut self, include: bool) {
        self.config.include_ot_systems = include;
    }

    /// Add the asset when absent, remove it when present.
    pub fn toggle_asset(&mut self, asset: CriticalAsset) {
        let assets = &mut self.config.critical_assets;
        if let Some(pos) = assets.iter().position(|a| *a == asset) {
            assets.remove(pos);
        } else {
            assets.push(asset);
        }
    }

    #[must_use]
    pub fn is_step_valid(&self, step: OnboardingStep) -> bool {
        match step {
            OnboardingStep::Sector => self.config.sector.is_some(),
            OnboardingStep::Infrastructure => self.config.infrastructure_type.is_some(),
            OnboardingStep::Assets => !self.config.critical_assets.is_empty(),
            OnboardingStep::Review => true,
        }
    }

    #[must_use]
    pub fn is_current_step_valid(&self) -> bool {
        self.is_step_valid(self.step)
    }

    /// Move forward one step. Returns `false` when the current step is
    /// invalid or already last.
    pub fn next_step(&mut self) -> bool {
        if !self.is_current_step_valid() {
            log::debug!("onboarding: step {} incomplete", self.step.number());
            return false;
        }
        match self.step.next() {
            Some(next) => {
                self.step = next;
                true
            }
            None => false,
        }
    }

    pub fn prev_step(&mut self) -> bool {
        match self.step.prev() {
            Some(prev) => {
                self.step = prev;
                true
            }
            None => false,
        }
    }

    pub fn go_to_step(&mut self, step: OnboardingStep) {
        self.step = step;
    }

    /// True when every step's predicate holds.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        OnboardingStep::ALL
            .into_iter()
            .all(|step| self.is_step_valid(step))
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_step_is_gated_by_validity() {
        let mut wizard = OnboardingWizard::new();
        assert!(!wizard.next_step());
        assert_eq!(wizard.step, OnboardingStep::Sector);

        wizard.set_sector(OrganizationSector::Logistics);
        assert!(wizard.next_step());
        assert!(!wizard.next_step());

        wizard.set_infrastructure_type(InfrastructureType::Hybrid);
        assert!(wizard.next_step());
        assert_eq!(wizard.step, OnboardingStep::Assets);
        assert!(!wizard.next_step());

        wizard.toggle_asset(CriticalAsset::Pii);
        assert!(wizard.next_step());
        assert_eq!(wizard.step, OnboardingStep::Review);
        assert!(!wizard.next_step());
        assert!(wizard.is_complete());
    }

    #[test]
    fn prev_step_stops_at_first() {
        let mut wizard = OnboardingWizard::new();
        assert!(!wizard.prev_step());
        wizard.go_to_step(OnboardingStep::Assets);
        assert!(wizard.prev_step());
        assert_eq!(wizard.step, OnboardingStep::Infrastructure);
    }

    #[test]
    fn toggle_asset_adds_and_removes_in_order() {
        let mut wizard = OnboardingWizard::new();
        wizard.toggle_asset(CriticalAsset::BackupInfrastructure);
        wizard.toggle_asset(CriticalAsset::Pii);
        wizard.toggle_asset(CriticalAsset::TradeSecretsIp);
        wizard.toggle_asset(CriticalAsset::Pii);
        assert_eq!(
            wizard.config.critical_assets,
            vec![CriticalAsset::BackupInfrastructure, CriticalAsset::TradeSecretsIp]
        );
    }

    #[test]
    fn reset_clears_draft() {
        let mut wizard = OnboardingWizard::new();
        wizard.set_sector(OrganizationSector::Public);
        wizard.set_include_ot_systems(true);
        wizard.go_to_step(OnboardingStep::Review);
        wizard.reset();
        assert_eq!(wizard, OnboardingWizard::new());
    }

    #[test]
    fn asset_metadata() {
        let high: Vec<_> = CriticalAsset::ALL
            .into_iter()
            .filter(|a| a.high_impact())
            .collect();
        assert_eq!(
            high,
            [
                CriticalAsset::Pii,
                CriticalAsset::FinancialRecords,
                CriticalAsset::ProductionServers
            ]
        );
        assert_eq!(
            "email_collaboration".parse::<CriticalAsset>(),
            Ok(CriticalAsset::EmailCollaboration)
        );
        assert_eq!(
            serde_json::to_string(&InfrastructureType::OnPremise).unwrap(),
            r#""on-premise""#
        );
    }
}
