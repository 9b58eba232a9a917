//! Educational bank-stress demonstrator: six balance-sheet and deposit risk
//! drivers folded into a single 0-100 stress score, with an embedded browser
//! dashboard served over HTTP.

pub mod api;
pub mod core;
