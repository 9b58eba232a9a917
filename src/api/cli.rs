use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use super::{ConfigError, InputOverrides, ServerConfig, run_http_server};
use crate::core::{PRESETS, PresetName, StressReport, default_inputs, evaluate, preset};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("failed to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "bank-stress",
    version,
    about = "Bank balance-sheet stress demonstrator (rate shock, uninsured deposits, duration, run speed)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the interactive dashboard and JSON API
    Serve(ServeArgs),
    /// Evaluate one scenario and print the report
    Score(ScoreArgs),
    /// List the preset scenarios
    Presets {
        #[arg(long, help = "Print the catalog as JSON")]
        json: bool,
    },
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[arg(long, help = "TOML config file with host, port, history_capacity and max_sessions")]
    config: Option<PathBuf>,
    #[arg(long, help = "Host to bind to, overrides the config file")]
    host: Option<String>,
    #[arg(long, help = "Port to listen on, overrides the config file")]
    port: Option<u16>,
    #[arg(long, help = "Score points kept for the history chart")]
    history_capacity: Option<usize>,
    #[arg(long, help = "Browser sessions kept before the least recently used is dropped")]
    max_sessions: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    #[arg(
        long,
        value_parser = PresetName::parse,
        help = "Start from a preset: svb, stable, rateShock or run"
    )]
    preset: Option<PresetName>,
    #[arg(long, allow_negative_numbers = true, help = "Rate shock in percentage points (0-6)")]
    rate_shock_pct: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Uninsured deposit share in percent (0-100)")]
    uninsured_pct: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Asset duration in years (0-10)")]
    duration_years: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Unrealized losses as percent of capital (0-120)")]
    unrealized_loss_pct_cap: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Withdrawal speed intensity (0-100)")]
    withdrawal_speed: Option<f64>,
    #[arg(long, allow_negative_numbers = true, help = "Depositor concentration intensity (0-100)")]
    concentration: Option<f64>,
    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

impl ServeArgs {
    fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(capacity) = self.history_capacity {
            config.history_capacity = capacity;
        }
        if let Some(max_sessions) = self.max_sessions {
            config.max_sessions = max_sessions;
        }
        config.validate()?;
        Ok(config)
    }
}

impl ScoreArgs {
    fn overrides(&self) -> InputOverrides {
        InputOverrides {
            rate_shock_pct: self.rate_shock_pct,
            uninsured_pct: self.uninsured_pct,
            duration_years: self.duration_years,
            unrealized_loss_pct_cap: self.unrealized_loss_pct_cap,
            withdrawal_speed: self.withdrawal_speed,
            concentration: self.concentration,
        }
    }

    fn scenario_title(&self) -> &'static str {
        let overridden = self.overrides() != InputOverrides::default();
        match (self.preset, overridden) {
            (Some(name), false) => preset(name).title,
            (Some(_), true) => "Custom (from preset)",
            (None, false) => preset(PresetName::Svb).title,
            (None, true) => "Custom",
        }
    }

    fn report(&self) -> StressReport {
        let base = self
            .preset
            .map(|name| preset(name).inputs)
            .unwrap_or_else(default_inputs);
        evaluate(&self.overrides().apply(base))
    }
}

pub async fn run_cli(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Serve(args) => {
            let config = args.server_config()?;
            run_http_server(config).await?;
        }
        Command::Score(args) => {
            let report = args.report();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render_report(args.scenario_title(), &report));
            }
        }
        Command::Presets { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&PRESETS)?);
            } else {
                print!("{}", render_presets());
            }
        }
    }
    Ok(())
}

fn render_report(title: &str, report: &StressReport) -> String {
    let mut out = String::new();
    let c = &report.classification;
    let _ = writeln!(out, "Scenario: {title}");
    let _ = writeln!(
        out,
        "Stress score: {} / 100 [{}]",
        report.score_display(),
        c.label
    );
    let _ = writeln!(
        out,
        "Duration-loss estimate: {}",
        report.duration_loss_display()
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<20} {:>6} {:>10} {:>12}",
        "Driver", "Weight", "Intensity", "Contribution"
    );
    for d in &report.contributions {
        let _ = writeln!(
            out,
            "{:<20} {:>6.0} {:>10.2} {:>12.1}",
            d.label, d.weight, d.normalized, d.contribution
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", c.narrative);
    out
}

fn render_presets() -> String {
    let mut out = String::new();
    for p in &PRESETS {
        let report = evaluate(&p.inputs);
        let i = p.inputs;
        let _ = writeln!(
            out,
            "{:<10} {:<28} score {:>5} {:<8} | rate {} uninsured {} duration {} losses {} withdrawal {} concentration {}",
            p.name.as_str(),
            p.title,
            report.score_display(),
            report.classification.label,
            i.rate_shock_pct,
            i.uninsured_pct,
            i.duration_years,
            i.unrealized_loss_pct_cap,
            i.withdrawal_speed,
            i.concentration
        );
    }
    out
}
