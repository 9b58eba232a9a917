use super::types::{
    Classification, Driver, DriverContribution, NormalizedInputs, StressInputs, StressReport,
    StressStatus,
};

pub const RATE_SHOCK_CEILING: f64 = 6.0;
pub const UNINSURED_CEILING: f64 = 100.0;
pub const DURATION_CEILING: f64 = 10.0;
pub const LOSSES_CEILING: f64 = 120.0;
pub const WITHDRAWAL_CEILING: f64 = 100.0;
pub const CONCENTRATION_CEILING: f64 = 100.0;

pub const AT_RISK_THRESHOLD: f64 = 40.0;
pub const CRITICAL_THRESHOLD: f64 = 70.0;

const MAX_SCORE: f64 = 100.0;
const MAX_DURATION_LOSS: f64 = 100.0;

const STABLE_NARRATIVE: &str = "Funding is sticky and rate exposure is contained. Unrealized \
     losses stay small relative to capital, so depositors have little reason to move.";
const AT_RISK_NARRATIVE: &str = "Rate-driven losses are building on long-duration assets while \
     a meaningful share of deposits is uninsured. Confidence can turn quickly if losses must \
     be realized to meet withdrawals.";
const CRITICAL_NARRATIVE: &str = "Concentrated, uninsured depositors can withdraw faster than \
     assets can be sold without crystallizing losses. Forced sales deepen the capital hole and \
     feed the run.";

impl Driver {
    pub fn weight(self) -> f64 {
        match self {
            Driver::RateShock => 18.0,
            Driver::Uninsured => 22.0,
            Driver::Duration => 15.0,
            Driver::Losses => 18.0,
            Driver::Withdrawal => 17.0,
            Driver::Concentration => 10.0,
        }
    }

    pub fn ceiling(self) -> f64 {
        match self {
            Driver::RateShock => RATE_SHOCK_CEILING,
            Driver::Uninsured => UNINSURED_CEILING,
            Driver::Duration => DURATION_CEILING,
            Driver::Losses => LOSSES_CEILING,
            Driver::Withdrawal => WITHDRAWAL_CEILING,
            Driver::Concentration => CONCENTRATION_CEILING,
        }
    }
}

impl StressInputs {
    pub fn raw(&self, driver: Driver) -> f64 {
        match driver {
            Driver::RateShock => self.rate_shock_pct,
            Driver::Uninsured => self.uninsured_pct,
            Driver::Duration => self.duration_years,
            Driver::Losses => self.unrealized_loss_pct_cap,
            Driver::Withdrawal => self.withdrawal_speed,
            Driver::Concentration => self.concentration,
        }
    }
}

impl NormalizedInputs {
    pub fn value(&self, driver: Driver) -> f64 {
        match driver {
            Driver::RateShock => self.rate_shock,
            Driver::Uninsured => self.uninsured,
            Driver::Duration => self.duration,
            Driver::Losses => self.losses,
            Driver::Withdrawal => self.withdrawal,
            Driver::Concentration => self.concentration,
        }
    }
}

impl StressStatus {
    pub fn label(self) -> &'static str {
        match self {
            StressStatus::Stable => "Stable",
            StressStatus::AtRisk => "At Risk",
            StressStatus::Critical => "Critical",
        }
    }

    pub fn narrative(self) -> &'static str {
        match self {
            StressStatus::Stable => STABLE_NARRATIVE,
            StressStatus::AtRisk => AT_RISK_NARRATIVE,
            StressStatus::Critical => CRITICAL_NARRATIVE,
        }
    }

    pub fn accent(self) -> &'static str {
        match self {
            StressStatus::Stable => "#2e9e5b",
            StressStatus::AtRisk => "#e0a526",
            StressStatus::Critical => "#d64545",
        }
    }
}

pub fn weight_total() -> f64 {
    Driver::ALL.iter().map(|d| d.weight()).sum()
}

pub fn normalize(inputs: &StressInputs) -> NormalizedInputs {
    let n = |driver: Driver| unit_ratio(inputs.raw(driver), driver.ceiling());
    NormalizedInputs {
        rate_shock: n(Driver::RateShock),
        uninsured: n(Driver::Uninsured),
        duration: n(Driver::Duration),
        losses: n(Driver::Losses),
        withdrawal: n(Driver::Withdrawal),
        concentration: n(Driver::Concentration),
    }
}

pub fn score(normalized: &NormalizedInputs) -> f64 {
    let raw: f64 = Driver::ALL
        .iter()
        .map(|&d| d.weight() * normalized.value(d))
        .sum();
    clamp_finite(raw, 0.0, MAX_SCORE)
}

pub fn contributions(normalized: &NormalizedInputs) -> Vec<DriverContribution> {
    Driver::ALL
        .iter()
        .map(|&driver| {
            let value = normalized.value(driver);
            DriverContribution {
                driver,
                label: driver.label(),
                weight: driver.weight(),
                normalized: value,
                contribution: driver.weight() * value,
            }
        })
        .collect()
}

/// Linear bond-price sensitivity: duration times the rate move, in percent.
/// Kept separate from the losses driver of the score.
pub fn duration_loss(duration_years: f64, rate_shock_pct: f64) -> f64 {
    clamp_finite(duration_years * rate_shock_pct, 0.0, MAX_DURATION_LOSS)
}

pub fn classify(score: f64) -> Classification {
    let status = if score >= CRITICAL_THRESHOLD {
        StressStatus::Critical
    } else if score >= AT_RISK_THRESHOLD {
        StressStatus::AtRisk
    } else {
        StressStatus::Stable
    };
    Classification {
        status,
        label: status.label(),
        narrative: status.narrative(),
        accent: status.accent(),
    }
}

pub fn evaluate(inputs: &StressInputs) -> StressReport {
    let normalized = normalize(inputs);
    let score = score(&normalized);
    StressReport {
        inputs: *inputs,
        normalized,
        contributions: contributions(&normalized),
        score,
        classification: classify(score),
        duration_loss_pct: duration_loss(inputs.duration_years, inputs.rate_shock_pct),
    }
}

fn unit_ratio(value: f64, ceiling: f64) -> f64 {
    clamp_finite(value / ceiling, 0.0, 1.0)
}

// NaN sits at the floor; infinities saturate.
fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}
