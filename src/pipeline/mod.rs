//! Batch inference: validate, scale, predict, label, summarize.
//!
//! A run is atomic. It either reaches [`PipelineState::Done`] with a complete
//! [`ResultTable`] or stops in `Rejected` (schema problem, nothing was scaled
//! or predicted) or `Failed` (bad cell data or an artifact problem, no partial
//! output).

pub mod adapters;
pub mod assemble;
pub mod export;
pub mod features;
pub mod label;

use std::sync::Arc;

use thiserror::Error;

use crate::artifacts::FittedArtifacts;
use crate::schema::{FeatureSchema, STUDENT_FEATURES, SchemaError};
use crate::table::InputTable;

use adapters::{AdapterError, InferenceError, TransformError};
use assemble::{AssembleError, ResultTable, assemble};
use features::{ExtractError, extract_feature_vectors, to_matrix};
use label::{StatusLabel, map_class_code};

pub use adapters::{ClassCode, Classifier, FeatureMatrix, Preprocessor};
pub use assemble::{LABEL_COLUMN, Summary};

/// Lifecycle of a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Validating,
    Processing,
    Done,
    Rejected,
    Failed,
}

impl PipelineState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Rejected | Self::Failed)
    }
}

/// Why a run produced no result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PipelineError {
    /// The input table is missing required columns.
    #[error("input rejected: {0}")]
    Rejected(#[source] SchemaError),
    /// A feature cell holds a value the preprocessor cannot read.
    #[error("invalid input data: {0}")]
    InvalidData(#[source] TransformError),
    /// A fitted artifact rejected the batch or failed.
    #[error("inference failed: {0}")]
    Failed(#[source] AdapterError),
}

impl PipelineError {
    /// Bad input from the caller.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Rejected(_) | Self::InvalidData(_))
    }

    /// Broken or mismatched deployment artifacts.
    pub fn is_deployment_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn terminal_state(&self) -> PipelineState {
        match self {
            Self::Rejected(_) => PipelineState::Rejected,
            Self::InvalidData(_) | Self::Failed(_) => PipelineState::Failed,
        }
    }

    fn from_adapter(err: AdapterError) -> Self {
        match err {
            AdapterError::Transform(err @ TransformError::NonNumericCell { .. }) => {
                Self::InvalidData(err)
            }
            other => Self::Failed(other),
        }
    }
}

/// Outcome of [`Pipeline::execute`] with the states it passed through.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    states: Vec<PipelineState>,
    outcome: Result<ResultTable, PipelineError>,
}

impl PipelineRun {
    pub fn states(&self) -> &[PipelineState] {
        &self.states
    }

    pub fn final_state(&self) -> PipelineState {
        self.states.last().copied().unwrap_or(PipelineState::Idle)
    }

    pub fn outcome(&self) -> &Result<ResultTable, PipelineError> {
        &self.outcome
    }

    pub fn into_result(self) -> Result<ResultTable, PipelineError> {
        self.outcome
    }
}

struct StateLog {
    states: Vec<PipelineState>,
}

impl StateLog {
    fn new() -> Self {
        Self {
            states: vec![PipelineState::Idle],
        }
    }

    fn enter(&mut self, state: PipelineState) {
        tracing::debug!("Pipeline state {:?} -> {:?}", self.states.last(), state);
        self.states.push(state);
    }

    fn finish(mut self, outcome: Result<ResultTable, PipelineError>) -> PipelineRun {
        let terminal = match &outcome {
            Ok(_) => PipelineState::Done,
            Err(err) => err.terminal_state(),
        };
        self.enter(terminal);
        PipelineRun {
            states: self.states,
            outcome,
        }
    }
}

/// Inference pipeline bound to one set of fitted artifacts.
///
/// Cloning is cheap; clones share the same read-only artifacts.
#[derive(Debug, Clone)]
pub struct Pipeline {
    artifacts: Arc<FittedArtifacts>,
    schema: FeatureSchema,
}

impl Pipeline {
    /// Pipeline over the student feature schema.
    pub fn new(artifacts: Arc<FittedArtifacts>) -> Self {
        Self::with_schema(artifacts, STUDENT_FEATURES)
    }

    pub fn with_schema(artifacts: Arc<FittedArtifacts>, schema: FeatureSchema) -> Self {
        Self { artifacts, schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Run the batch and return the labeled table.
    pub fn run(&self, table: &InputTable) -> Result<ResultTable, PipelineError> {
        self.execute(table).into_result()
    }

    /// Run the batch, keeping the state transitions.
    pub fn execute(&self, table: &InputTable) -> PipelineRun {
        let mut log = StateLog::new();
        log.enter(PipelineState::Validating);
        if let Err(err) = self.schema.validate(table) {
            tracing::warn!("Rejected input table: {err}");
            return log.finish(Err(PipelineError::Rejected(err)));
        }
        log.enter(PipelineState::Processing);
        let outcome = self.process(table).map_err(|err| {
            let err = PipelineError::from_adapter(err);
            match &err {
                PipelineError::InvalidData(cause) => {
                    tracing::warn!("Invalid input data: {cause}");
                }
                PipelineError::Failed(cause) => {
                    tracing::error!("{} failed: {cause}", cause.stage());
                }
                PipelineError::Rejected(_) => {}
            }
            err
        });
        if let Ok(result) = &outcome {
            let summary = result.summary();
            tracing::info!(
                "Predicted {} rows: {} dropout, {} enrolled, {} graduate, {} unknown",
                summary.total_rows,
                summary.dropout_count,
                summary.enrolled_count,
                summary.graduate_count,
                summary.unknown_count
            );
        }
        log.finish(outcome)
    }

    fn process(&self, table: &InputTable) -> Result<ResultTable, AdapterError> {
        if table.is_empty() {
            return assemble(table, &[]).map_err(internal_assemble_error);
        }
        let (vectors, substitutions) =
            extract_feature_vectors(table, &self.schema).map_err(|err| match err {
                ExtractError::Transform(err) => AdapterError::Transform(err),
                ExtractError::Schema(err) => {
                    AdapterError::Transform(TransformError::Internal(err.to_string()))
                }
            })?;
        if substitutions.filled_cells > 0 {
            tracing::debug!(
                "Filled {} missing feature cells with zero",
                substitutions.filled_cells
            );
        }
        let batch = to_matrix(&vectors, self.schema.len())?;
        let scaled = adapters::transform_checked(self.artifacts.preprocessor(), &batch)?;
        let codes = adapters::predict_checked(self.artifacts.classifier(), &scaled)?;
        let labels = label_codes(&codes);
        assemble(table, &labels).map_err(internal_assemble_error)
    }
}

/// Map every code, reporting unrecognized ones.
pub fn label_codes(codes: &[ClassCode]) -> Vec<StatusLabel> {
    codes
        .iter()
        .enumerate()
        .map(|(row, &code)| {
            let label = map_class_code(code);
            if label == StatusLabel::Unknown {
                tracing::warn!("Row {row}: unrecognized class code {code}");
            }
            label
        })
        .collect()
}

fn internal_assemble_error(err: AssembleError) -> AdapterError {
    AdapterError::Inference(InferenceError::Internal(err.to_string()))
}
