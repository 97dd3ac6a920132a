//! Suite runner and report.

use std::sync::Arc;
use std::time::Instant;

use bookcheck_domain::{BookingId, FieldMismatch};
use serde::Serialize;
use tracing::{Instrument, error, field, info, info_span, warn};

use crate::config::{ConfigError, SuiteConfig};
use crate::error::ContractError;
use crate::lifecycle::LifecycleOrchestrator;
use crate::ports::HttpClient;
use crate::scenarios::Scenario;

/// Why a scenario failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Machine-readable error kind, such as `status_mismatch`.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl From<&ContractError> for Failure {
    fn from(error: &ContractError) -> Self {
        Self {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }
}

/// Result of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario that ran.
    pub scenario: Scenario,
    /// Whether every check passed.
    pub passed: bool,
    /// Field-level mismatches, if the failure was about fields.
    pub mismatches: Vec<FieldMismatch>,
    /// The failure, if any.
    pub error: Option<Failure>,
    /// Booking the scenario worked on, if it got that far.
    pub booking_id: Option<BookingId>,
    /// Wall-clock time of the scenario.
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    /// Builds an outcome from a scenario result.
    #[must_use]
    pub fn from_result(
        scenario: Scenario,
        result: &Result<Option<BookingId>, ContractError>,
        duration_ms: u64,
    ) -> Self {
        match result {
            Ok(booking_id) => Self {
                scenario,
                passed: true,
                mismatches: Vec::new(),
                error: None,
                booking_id: *booking_id,
                duration_ms,
            },
            Err(error) => Self {
                scenario,
                passed: false,
                mismatches: error.mismatches().to_vec(),
                error: Some(Failure::from(error)),
                booking_id: None,
                duration_ms,
            },
        }
    }

    fn aborted(scenario: Scenario, message: String) -> Self {
        Self {
            scenario,
            passed: false,
            mismatches: Vec::new(),
            error: Some(Failure {
                kind: "aborted".to_string(),
                message,
            }),
            booking_id: None,
            duration_ms: 0,
        }
    }
}

/// Aggregated results of a suite run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Outcomes in the order the scenarios were selected.
    pub outcomes: Vec<ScenarioOutcome>,
    /// Number of scenarios run.
    pub total: usize,
    /// Number of scenarios that passed.
    pub passed: usize,
    /// Number of scenarios that failed.
    pub failed: usize,
    /// Wall-clock time of the whole run.
    pub duration_ms: u64,
}

impl SuiteReport {
    /// Create a new report.
    #[must_use]
    pub fn new(outcomes: Vec<ScenarioOutcome>, duration_ms: u64) -> Self {
        let total = outcomes.len();
        let passed = outcomes.iter().filter(|o| o.passed).count();
        let failed = total - passed;

        Self {
            outcomes,
            total,
            passed,
            failed,
            duration_ms,
        }
    }

    /// Check if all scenarios passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

/// Runs a selection of scenarios against one service.
pub struct ContractSuite<C: HttpClient> {
    orchestrator: Arc<LifecycleOrchestrator<C>>,
    scenarios: Vec<Scenario>,
    parallel: bool,
}

impl<C: HttpClient + 'static> ContractSuite<C> {
    /// Creates a suite for the scenarios and mode named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration does not validate.
    pub fn new(client: Arc<C>, config: &SuiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            orchestrator: Arc::new(LifecycleOrchestrator::new(client, config)?),
            scenarios: config.scenarios.clone(),
            parallel: config.parallel,
        })
    }

    /// Scenarios this suite runs.
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Runs every selected scenario and reports on all of them. A failing
    /// scenario never stops the others.
    pub async fn run(&self) -> SuiteReport {
        let start = Instant::now();
        info!(
            scenarios = self.scenarios.len(),
            parallel = self.parallel,
            "starting contract suite"
        );

        let outcomes = if self.parallel {
            self.run_concurrently().await
        } else {
            let mut outcomes = Vec::with_capacity(self.scenarios.len());
            for scenario in &self.scenarios {
                outcomes.push(run_scenario(*scenario, &self.orchestrator).await);
            }
            outcomes
        };

        let report = SuiteReport::new(outcomes, elapsed_ms(start));
        info!(
            passed = report.passed,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "contract suite finished"
        );
        report
    }

    async fn run_concurrently(&self) -> Vec<ScenarioOutcome> {
        let handles: Vec<_> = self
            .scenarios
            .iter()
            .map(|scenario| {
                let scenario = *scenario;
                let orchestrator = Arc::clone(&self.orchestrator);
                let handle =
                    tokio::spawn(async move { run_scenario(scenario, &orchestrator).await });
                (scenario, handle)
            })
            .collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for (scenario, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!(%scenario, %join_error, "scenario task aborted");
                    ScenarioOutcome::aborted(scenario, join_error.to_string())
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}

async fn run_scenario<C: HttpClient>(
    scenario: Scenario,
    orchestrator: &LifecycleOrchestrator<C>,
) -> ScenarioOutcome {
    let span = info_span!("lifecycle", %scenario, run_id = field::Empty);
    async {
        let start = Instant::now();
        let result = scenario.run(orchestrator).await;
        let outcome = ScenarioOutcome::from_result(scenario, &result, elapsed_ms(start));
        match &result {
            Ok(_) => info!(duration_ms = outcome.duration_ms, "scenario passed"),
            Err(error) => warn!(%error, "scenario failed"),
        }
        outcome
    }
    .instrument(span)
    .await
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}
