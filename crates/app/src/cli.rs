//! Command-line arguments.

use std::path::PathBuf;

use bookcheck_application::{ConfigError, Scenario, SuiteConfig};
use bookcheck_infrastructure::ConfigLoader;
use clap::{Parser, ValueEnum};

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per scenario plus a summary.
    Text,
    /// The full report as JSON.
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "bookcheck")]
#[command(about = "Verify the contract of a booking REST service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root URL of the booking service (overrides config and environment)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Scenario to run; repeat to run several (default: all configured)
    #[arg(long = "scenario", value_name = "NAME", value_parser = parse_scenario)]
    pub scenarios: Vec<Scenario>,

    /// Run scenarios concurrently
    #[arg(long)]
    pub parallel: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    /// Builds the suite configuration: file, then environment, then flags.
    pub fn resolve_config(&self, loader: &ConfigLoader) -> Result<SuiteConfig, ConfigError> {
        let mut config = loader.resolve(self.config.as_deref())?;
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if !self.scenarios.is_empty() {
            config.scenarios.clone_from(&self.scenarios);
        }
        config.parallel |= self.parallel;
        config.validate()?;
        Ok(config)
    }
}

fn parse_scenario(raw: &str) -> Result<Scenario, String> {
    raw.parse()
}
