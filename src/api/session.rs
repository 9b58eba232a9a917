use std::collections::VecDeque;

use serde::Serialize;

use crate::core::{PresetName, StressInputs, StressReport, default_inputs, evaluate, preset};

pub const DEFAULT_HISTORY_CAPACITY: usize = 30;

/// Rolling window of recent stress scores; the oldest point is dropped once full.
#[derive(Debug, Clone)]
pub struct ScoreHistory {
    capacity: usize,
    points: VecDeque<f64>,
}

impl ScoreHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, score: f64) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(score);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.points.back().copied()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl Default for ScoreHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub inputs: StressInputs,
    pub report: StressReport,
    pub history: Vec<f64>,
    pub history_capacity: usize,
    pub updates: u64,
}

/// State behind the dashboard: the current slider values, the latest report
/// and the score history. Every change runs the whole pipeline once and
/// records one history point.
#[derive(Debug, Clone)]
pub struct Session {
    inputs: StressInputs,
    report: StressReport,
    history: ScoreHistory,
    updates: u64,
}

impl Session {
    pub fn new(history_capacity: usize) -> Self {
        let inputs = default_inputs();
        let report = evaluate(&inputs);
        let mut history = ScoreHistory::new(history_capacity);
        history.push(report.score);
        Self {
            inputs,
            report,
            history,
            updates: 1,
        }
    }

    pub fn inputs(&self) -> StressInputs {
        self.inputs
    }

    pub fn report(&self) -> &StressReport {
        &self.report
    }

    pub fn history(&self) -> &ScoreHistory {
        &self.history
    }

    pub fn on_input_changed(&mut self, inputs: StressInputs) -> &StressReport {
        self.inputs = inputs;
        self.report = evaluate(&inputs);
        self.history.push(self.report.score);
        self.updates += 1;
        &self.report
    }

    /// Overwrites all six inputs with the preset's values.
    pub fn apply_preset(&mut self, name: PresetName) -> &StressReport {
        self.on_input_changed(preset(name).inputs)
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.updates = 0;
        self.on_input_changed(default_inputs());
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            inputs: self.inputs,
            report: self.report.clone(),
            history: self.history.values(),
            history_capacity: self.history.capacity(),
            updates: self.updates,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
