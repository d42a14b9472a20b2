//! Record validation and error aggregation
//!
//! Drives the full per-datapoint pipeline (build state, simulate, detect,
//! compare) and reduces a record's comparisons to one scalar score.
//! Datapoints are independent, so they are evaluated on the rayon pool
//! and collected back in datapoint order regardless of completion order.
//! A failing datapoint is recorded on its `ComparisonResult` and never
//! aborts the rest of the record.

use crate::core_types::record::{DataPoint, ExperimentRecord};
use crate::core_types::units::{Unit, UnitValue};
use crate::error::ValidationError;
use crate::simulation::detect::detect_ignition;
use crate::simulation::runner::{ReactorSimulator, SimulationConfig};
use crate::simulation::state::InitialStateBuilder;
use crate::solver::KineticsModel;
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info, warn};

/// Reduction applied to the per-datapoint absolute relative errors
///
/// The literature does not agree on one aggregate, so the reduction is a
/// knob; mean absolute relative error is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorReduction {
    /// Mean of `|relative error|`
    #[default]
    MeanAbsolute,
    /// Median of `|relative error|`, robust to a single outlier point
    MedianAbsolute,
    /// Root mean square of the relative errors
    RootMeanSquare,
}

impl ErrorReduction {
    /// Reduce a set of relative errors to the record score
    ///
    /// Returns `None` for an empty set (every datapoint failed).
    #[must_use]
    pub fn reduce(self, relative_errors: &[f64]) -> Option<f64> {
        if relative_errors.is_empty() {
            return None;
        }
        let n = relative_errors.len() as f64;
        match self {
            ErrorReduction::MeanAbsolute => {
                Some(relative_errors.iter().map(|e| e.abs()).sum::<f64>() / n)
            }
            ErrorReduction::MedianAbsolute => {
                let mut magnitudes: Vec<f64> =
                    relative_errors.iter().map(|e| e.abs()).collect();
                magnitudes.sort_by(f64::total_cmp);
                let mid = magnitudes.len() / 2;
                if magnitudes.len() % 2 == 1 {
                    Some(magnitudes[mid])
                } else {
                    Some(0.5 * (magnitudes[mid - 1] + magnitudes[mid]))
                }
            }
            ErrorReduction::RootMeanSquare => {
                Some((relative_errors.iter().map(|e| e * e).sum::<f64>() / n).sqrt())
            }
        }
    }
}

impl fmt::Display for ErrorReduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReduction::MeanAbsolute => write!(f, "mean |rel err|"),
            ErrorReduction::MedianAbsolute => write!(f, "median |rel err|"),
            ErrorReduction::RootMeanSquare => write!(f, "rms rel err"),
        }
    }
}

/// Knobs for record validation
#[derive(Debug, Clone, Copy)]
pub struct ValidationConfig {
    pub simulation: SimulationConfig,
    pub reduction: ErrorReduction,
    /// Composition sum tolerance passed to the state builder
    pub sum_tolerance: f64,
    /// Cap on concurrent datapoint simulations; `None` uses the global
    /// rayon pool
    pub max_parallel: Option<usize>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        ValidationConfig {
            simulation: SimulationConfig::default(),
            reduction: ErrorReduction::default(),
            sum_tolerance: crate::core_types::composition::DEFAULT_SUM_TOLERANCE,
            max_parallel: None,
        }
    }
}

/// Successful prediction for one datapoint
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// Predicted delay, reported in the measured delay's unit
    pub predicted: UnitValue,
    pub measured: UnitValue,
    /// `(predicted - measured) / measured`, dimensionless
    pub relative_error: f64,
    /// First-stage delay for two-stage ignition, when detected
    pub first_stage: Option<UnitValue>,
}

/// Outcome for one datapoint: a comparison, or the error that stopped it
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    pub index: usize,
    pub temperature: UnitValue,
    pub outcome: Result<Comparison, ValidationError>,
}

impl ComparisonResult {
    /// Relative error when the datapoint succeeded
    #[must_use]
    pub fn relative_error(&self) -> Option<f64> {
        self.outcome.as_ref().ok().map(|c| c.relative_error)
    }
}

/// Record-level validation output
#[derive(Debug, Clone)]
pub struct RecordSummary {
    /// One result per datapoint, in record order
    pub results: Vec<ComparisonResult>,
    /// Aggregate score; `None` when no datapoint succeeded
    pub score: Option<f64>,
    pub reduction: ErrorReduction,
}

impl RecordSummary {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_ok()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

/// Orchestrates validation of experiment records against one mechanism
pub struct Validator<'m, M: KineticsModel + ?Sized> {
    mech: &'m M,
    config: ValidationConfig,
}

impl<'m, M: KineticsModel + ?Sized> Validator<'m, M> {
    #[must_use]
    pub fn new(mech: &'m M) -> Self {
        Validator {
            mech,
            config: ValidationConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ValidationConfig) -> Self {
        self.config = config;
        self
    }

    /// Validate every datapoint of a record and aggregate the score
    ///
    /// Per-datapoint failures are contained in the returned results; the
    /// method itself only fails on configuration-level problems.
    pub fn validate_record(
        &self,
        record: &ExperimentRecord,
    ) -> Result<RecordSummary, ValidationError> {
        if record.is_empty() {
            return Err(ValidationError::UnsupportedApparatus(
                "record contains no datapoints".into(),
            ));
        }
        info!(
            apparatus = %record.apparatus,
            datapoints = record.len(),
            "validating record"
        );

        let results: Vec<ComparisonResult> = match self.config.max_parallel {
            Some(limit) => match rayon::ThreadPoolBuilder::new().num_threads(limit).build() {
                Ok(pool) => pool.install(|| self.evaluate_all(record)),
                Err(err) => {
                    warn!(%err, "scoped thread pool unavailable; using global pool");
                    self.evaluate_all(record)
                }
            },
            None => self.evaluate_all(record),
        };

        let errors: Vec<f64> = results.iter().filter_map(ComparisonResult::relative_error).collect();
        let score = self.config.reduction.reduce(&errors);
        info!(
            succeeded = errors.len(),
            failed = results.len() - errors.len(),
            score,
            "record validation complete"
        );

        Ok(RecordSummary {
            results,
            score,
            reduction: self.config.reduction,
        })
    }

    fn evaluate_all(&self, record: &ExperimentRecord) -> Vec<ComparisonResult> {
        record
            .datapoints
            .par_iter()
            .enumerate()
            .map(|(index, point)| self.evaluate_datapoint(record, index, point))
            .collect()
    }

    /// Run one datapoint through build -> simulate -> detect -> compare
    fn evaluate_datapoint(
        &self,
        record: &ExperimentRecord,
        index: usize,
        point: &DataPoint,
    ) -> ComparisonResult {
        let temperature_k = point
            .temperature
            .convert_to(Unit::Kelvin)
            .map_or(f64::NAN, UnitValue::magnitude);
        let outcome = self
            .compare_point(record, point)
            .map_err(|err| err.with_datapoint(index, temperature_k));
        if let Err(err) = &outcome {
            warn!(index, %err, "datapoint evaluation failed");
        }
        ComparisonResult {
            index,
            temperature: point.temperature,
            outcome,
        }
    }

    fn compare_point(
        &self,
        record: &ExperimentRecord,
        point: &DataPoint,
    ) -> Result<Comparison, ValidationError> {
        let case = InitialStateBuilder::new(self.mech)
            .with_sum_tolerance(self.config.sum_tolerance)
            .build(record.apparatus, point)?;
        // A non-positive measurement cannot anchor a relative error; fail
        // the datapoint here instead of letting an infinity reach the score
        if !(case.measured_delay_s.is_finite() && case.measured_delay_s > 0.0) {
            return Err(ValidationError::UnitConversion(format!(
                "measured delay {} s is not a positive time",
                case.measured_delay_s
            )));
        }
        debug!(model = ?case.model, "case built, simulating");

        let simulator = ReactorSimulator::new(self.mech).with_config(self.config.simulation);
        let trace = simulator.simulate(&case)?;
        debug!(samples = trace.len(), "trace ready, detecting ignition");

        let detected =
            detect_ignition(&trace, &point.ignition, self.mech, case.compression_time_s)?;

        let report_unit = point.measured_delay.unit();
        let predicted = UnitValue::new(detected.delay_s, Unit::Second).convert_to(report_unit)?;
        let first_stage = match detected.first_stage_s {
            Some(t) => Some(UnitValue::new(t, Unit::Second).convert_to(report_unit)?),
            None => None,
        };
        let measured_s = point.measured_delay.convert_to(Unit::Second)?.magnitude();
        let relative_error = (detected.delay_s - measured_s) / measured_s;

        Ok(Comparison {
            predicted,
            measured: point.measured_delay,
            relative_error,
            first_stage,
        })
    }
}
