//! Ordered pipelines and the sequential runner.
//!
//! [`PipelineRunner::run`] dry-runs every step in order and stops at the
//! first failure. If all steps check clean it executes them in order,
//! stopping at the first step that fails or when cancellation is requested.
//! Steps are never reordered; a step's inputs must pre-exist or be created
//! by an earlier step.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::registry::DataContainerRegistry;
use crate::pipeline::observer::{CancellationToken, PipelineObserver};
use crate::pipeline::persistence::{ParameterReader, ParameterWriter};
use crate::pipeline::step::{PipelineStep, StepWarning};
use crate::pipeline_error::{CANCELLED, PipelineError};

/// Runner settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Work items a step processes between cancellation polls.
    pub poll_interval: usize,
    /// Stop after the dry-run phase.
    pub dry_run_only: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: 1000,
            dry_run_only: false,
        }
    }
}

/// Phase in which a run stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum RunPhase {
    DryRun,
    Execute,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunPhase::DryRun => "dry run",
            RunPhase::Execute => "execute",
        })
    }
}

/// Which step stopped a run, in which phase, and why.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{phase} stopped at step {step_index} ({step_label}) with code {code}: {message}")]
pub struct RunFailure {
    pub step_index: usize,
    pub step_label: String,
    pub phase: RunPhase,
    pub code: i32,
    pub message: String,
}

impl RunFailure {
    pub fn is_cancelled(&self) -> bool {
        self.code == CANCELLED
    }
}

/// Summary of a successful run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunReport {
    pub steps_checked: usize,
    pub steps_executed: usize,
    /// Warnings by step index.
    pub warnings: Vec<(usize, StepWarning)>,
}

/// Named, ordered list of steps.
#[derive(Default)]
pub struct Pipeline {
    name: String,
    steps: Vec<Box<dyn PipelineStep>>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.steps.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl Pipeline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, step: Box<dyn PipelineStep>) {
        self.steps.push(step);
    }

    /// Insert at `index`, clamped to the end.
    pub fn insert(&mut self, index: usize, step: Box<dyn PipelineStep>) {
        let index = index.min(self.steps.len());
        self.steps.insert(index, step);
    }

    pub fn remove(&mut self, index: usize) -> Option<Box<dyn PipelineStep>> {
        (index < self.steps.len()).then(|| self.steps.remove(index))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Box<dyn PipelineStep>] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&dyn PipelineStep> {
        self.steps.get(index).map(|s| &**s)
    }

    pub fn step_mut(&mut self, index: usize) -> Option<&mut (dyn PipelineStep + 'static)> {
        self.steps.get_mut(index).map(|s| &mut **s)
    }

    /// Copy of the pipeline with fresh steps carrying the same parameters.
    pub fn duplicate(&self) -> Self {
        Self {
            name: self.name.clone(),
            steps: self.steps.iter().map(|s| s.new_instance(true)).collect(),
        }
    }

    /// Write every step's parameters, one group per step.
    pub fn write_parameters(&self, writer: &mut dyn ParameterWriter) -> Result<(), PipelineError> {
        let mut index = 0;
        for step in &self.steps {
            index = step.write_parameters(writer, index)?;
        }
        writer.finish(self.steps.len())
    }

    /// Rebuild a pipeline from a store. `factory` maps a step class name to
    /// a fresh step.
    ///
    /// # Errors
    /// `NotFound` if the factory does not know a stored class name.
    pub fn read_parameters<F>(
        name: impl Into<String>,
        reader: &dyn ParameterReader,
        factory: F,
    ) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<Box<dyn PipelineStep>>,
    {
        let mut pipeline = Self::new(name);
        let mut index = 0;
        while index < reader.number_of_steps() {
            let class = reader.step_name(index)?;
            let mut step = factory(&class)
                .ok_or_else(|| PipelineError::NotFound(format!("step class `{class}`")))?;
            index = step.read_parameters(reader, index)?;
            pipeline.push(step);
        }
        Ok(pipeline)
    }
}

/// Runs pipelines against a registry.
#[derive(Clone, Debug, Default)]
pub struct PipelineRunner {
    config: RunnerConfig,
    cancel: CancellationToken,
}

impl PipelineRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Runner polling an externally owned token.
    pub fn with_cancellation(config: RunnerConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Handle for requesting cancellation from elsewhere.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Dry-run every step in order. Returns the number of steps checked.
    pub fn preflight(
        &self,
        pipeline: &mut Pipeline,
        registry: &mut DataContainerRegistry,
        observer: &dyn PipelineObserver,
    ) -> Result<usize, RunFailure> {
        for (index, step) in pipeline.steps.iter_mut().enumerate() {
            let code = step.dry_run_check(registry, observer);
            if code != 0 {
                let failure = failure(index, &**step, RunPhase::DryRun);
                log::warn!("{failure}");
                return Err(failure);
            }
        }
        Ok(pipeline.len())
    }

    /// Dry-run, then execute, every step in order.
    pub fn run(
        &self,
        pipeline: &mut Pipeline,
        registry: &mut DataContainerRegistry,
        observer: &dyn PipelineObserver,
    ) -> Result<RunReport, RunFailure> {
        log::info!("running pipeline `{}` ({} steps)", pipeline.name, pipeline.len());
        let mut report = RunReport {
            steps_checked: self.preflight(pipeline, registry, observer)?,
            ..RunReport::default()
        };
        if self.config.dry_run_only {
            collect_warnings(pipeline, &mut report);
            return Ok(report);
        }

        for (index, step) in pipeline.steps.iter_mut().enumerate() {
            let code = step.execute(registry, observer, &self.cancel, &self.config);
            if code != 0 {
                let failure = failure(index, &**step, RunPhase::Execute);
                log::warn!("{failure}");
                return Err(failure);
            }
            report.steps_executed += 1;
            if self.cancel.is_cancelled() {
                let failure = RunFailure {
                    step_index: index,
                    step_label: step.human_label().to_string(),
                    phase: RunPhase::Execute,
                    code: CANCELLED,
                    message: PipelineError::Cancelled.to_string(),
                };
                log::warn!("{failure}");
                return Err(failure);
            }
        }
        collect_warnings(pipeline, &mut report);
        log::info!("pipeline `{}` finished", pipeline.name);
        Ok(report)
    }
}

fn failure(index: usize, step: &dyn PipelineStep, phase: RunPhase) -> RunFailure {
    RunFailure {
        step_index: index,
        step_label: step.human_label().to_string(),
        phase,
        code: step.error_code(),
        message: step.status().message.clone(),
    }
}

fn collect_warnings(pipeline: &Pipeline, report: &mut RunReport) {
    for (index, step) in pipeline.steps.iter().enumerate() {
        report
            .warnings
            .extend(step.status().warnings.iter().cloned().map(|w| (index, w)));
    }
}
