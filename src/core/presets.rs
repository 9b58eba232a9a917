use serde::Serialize;
use thiserror::Error;

use super::types::StressInputs;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum PresetName {
    #[serde(rename = "svb")]
    Svb,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "rateShock")]
    RateShock,
    #[serde(rename = "run")]
    Run,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preset {
    pub name: PresetName,
    pub title: &'static str,
    pub inputs: StressInputs,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PresetError {
    #[error("unknown preset `{0}` (expected one of: svb, stable, rateShock, run)")]
    Unknown(String),
}

pub static PRESETS: [Preset; 4] = [
    Preset {
        name: PresetName::Svb,
        title: "SVB, March 2023",
        inputs: StressInputs {
            rate_shock_pct: 2.5,
            uninsured_pct: 80.0,
            duration_years: 6.5,
            unrealized_loss_pct_cap: 65.0,
            withdrawal_speed: 85.0,
            concentration: 85.0,
        },
    },
    Preset {
        name: PresetName::Stable,
        title: "Stable regional bank",
        inputs: StressInputs {
            rate_shock_pct: 0.5,
            uninsured_pct: 25.0,
            duration_years: 2.0,
            unrealized_loss_pct_cap: 5.0,
            withdrawal_speed: 15.0,
            concentration: 20.0,
        },
    },
    Preset {
        name: PresetName::RateShock,
        title: "Rate shock, sticky deposits",
        inputs: StressInputs {
            rate_shock_pct: 4.5,
            uninsured_pct: 40.0,
            duration_years: 7.5,
            unrealized_loss_pct_cap: 80.0,
            withdrawal_speed: 30.0,
            concentration: 35.0,
        },
    },
    Preset {
        name: PresetName::Run,
        title: "Digital bank run",
        inputs: StressInputs {
            rate_shock_pct: 3.0,
            uninsured_pct: 95.0,
            duration_years: 5.0,
            unrealized_loss_pct_cap: 50.0,
            withdrawal_speed: 98.0,
            concentration: 95.0,
        },
    },
];

impl PresetName {
    pub fn as_str(self) -> &'static str {
        match self {
            PresetName::Svb => "svb",
            PresetName::Stable => "stable",
            PresetName::RateShock => "rateShock",
            PresetName::Run => "run",
        }
    }

    pub fn parse(name: &str) -> Result<Self, PresetError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "svb" => Ok(PresetName::Svb),
            "stable" => Ok(PresetName::Stable),
            "rateshock" | "rate-shock" | "rate_shock" => Ok(PresetName::RateShock),
            "run" => Ok(PresetName::Run),
            _ => Err(PresetError::Unknown(name.to_string())),
        }
    }
}

impl std::str::FromStr for PresetName {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PresetName::parse(s)
    }
}

pub fn preset(name: PresetName) -> &'static Preset {
    match name {
        PresetName::Svb => &PRESETS[0],
        PresetName::Stable => &PRESETS[1],
        PresetName::RateShock => &PRESETS[2],
        PresetName::Run => &PRESETS[3],
    }
}

pub fn find_preset(name: &str) -> Result<&'static Preset, PresetError> {
    PresetName::parse(name).map(preset)
}

/// Inputs used before any slider or preset has been touched.
pub fn default_inputs() -> StressInputs {
    preset(PresetName::Svb).inputs
}
