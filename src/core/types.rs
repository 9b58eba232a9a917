use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressInputs {
    pub rate_shock_pct: f64,
    pub uninsured_pct: f64,
    pub duration_years: f64,
    pub unrealized_loss_pct_cap: f64,
    pub withdrawal_speed: f64,
    pub concentration: f64,
}

/// Raw inputs divided by their ceilings, each in `[0, 1]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedInputs {
    pub rate_shock: f64,
    pub uninsured: f64,
    pub duration: f64,
    pub losses: f64,
    pub withdrawal: f64,
    pub concentration: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Driver {
    RateShock,
    Uninsured,
    Duration,
    Losses,
    Withdrawal,
    Concentration,
}

impl Driver {
    pub const ALL: [Driver; 6] = [
        Driver::RateShock,
        Driver::Uninsured,
        Driver::Duration,
        Driver::Losses,
        Driver::Withdrawal,
        Driver::Concentration,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Driver::RateShock => "Rate shock",
            Driver::Uninsured => "Uninsured deposits",
            Driver::Duration => "Asset duration",
            Driver::Losses => "Unrealized losses",
            Driver::Withdrawal => "Withdrawal speed",
            Driver::Concentration => "Concentration",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum StressStatus {
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "at-risk")]
    AtRisk,
    #[serde(rename = "critical")]
    Critical,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub status: StressStatus,
    pub label: &'static str,
    pub narrative: &'static str,
    pub accent: &'static str,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverContribution {
    pub driver: Driver,
    pub label: &'static str,
    pub weight: f64,
    pub normalized: f64,
    pub contribution: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StressReport {
    pub inputs: StressInputs,
    pub normalized: NormalizedInputs,
    pub contributions: Vec<DriverContribution>,
    pub score: f64,
    pub classification: Classification,
    pub duration_loss_pct: f64,
}

impl StressReport {
    pub fn score_display(&self) -> String {
        format!("{:.1}", self.score)
    }

    pub fn duration_loss_display(&self) -> String {
        format!("{:.1}%", self.duration_loss_pct)
    }
}
