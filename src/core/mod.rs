mod engine;
mod presets;
mod types;

pub use engine::{
    AT_RISK_THRESHOLD, CRITICAL_THRESHOLD, classify, contributions, duration_loss, evaluate,
    normalize, score, weight_total,
};
pub use presets::{
    PRESETS, Preset, PresetError, PresetName, default_inputs, find_preset, preset,
};
pub use types::{
    Classification, Driver, DriverContribution, NormalizedInputs, StressInputs, StressReport,
    StressStatus,
};
