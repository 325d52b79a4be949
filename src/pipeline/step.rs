//! The two-phase step contract.
//!
//! A step is first dry-run ([`PipelineStep::dry_run_check`]): it resolves
//! its required arrays, checks tuple-count agreement and reserves the arrays
//! it will create, all without touching array contents. Execution
//! ([`PipelineStep::execute`]) repeats the dry run against the current
//! registry and, if that is still clean, runs the transformation.
//!
//! Neither phase returns an error. Failures are folded into the step's
//! [`StepStatus`] as a signed code (0 = success) plus message, which the
//! runner polls after each phase.

use crate::data::registry::DataContainerRegistry;
use crate::pipeline::context::{DryRunContext, ExecuteContext};
use crate::pipeline::observer::{CancellationToken, PipelineObserver, StepMessage};
use crate::pipeline::parameter::{FilterParameter, ParameterValue};
use crate::pipeline::persistence::{ParameterReader, ParameterWriter};
use crate::pipeline::runner::RunnerConfig;
use crate::pipeline_error::{CANCELLED, PipelineError};

/// Lifecycle state of a step.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StepState {
    #[default]
    Uninitialized,
    /// Dry run finished; see the error code for the outcome.
    Checked,
    /// Execution finished; see the error code for the outcome.
    Executed,
    /// Execution stopped on a cancellation request.
    Cancelled,
}

/// Non-fatal condition recorded during a phase.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StepWarning {
    pub code: i32,
    pub message: String,
}

/// Polled outcome of the last phase a step ran.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepStatus {
    pub state: StepState,
    /// 0 on success, negative on failure.
    pub error_code: i32,
    pub message: String,
    pub warnings: Vec<StepWarning>,
}

impl StepStatus {
    /// Back to `Uninitialized` with no error.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_ok(&self) -> bool {
        self.error_code == 0
    }

    fn record(&mut self, state: StepState, result: Result<(), PipelineError>) {
        self.state = state;
        match result {
            Ok(()) => {
                self.error_code = 0;
                self.message.clear();
            }
            Err(e) => {
                self.error_code = e.code();
                self.message = e.to_string();
            }
        }
    }
}

/// A pipeline step ("filter").
///
/// Implementors provide the parameter surface and the two phase bodies
/// ([`data_check`](Self::data_check) and [`run`](Self::run)); the provided
/// methods wrap them into the polled status protocol.
pub trait PipelineStep: Send {
    /// Class name, used as the step's key in persisted pipelines.
    fn name(&self) -> &str;

    /// Display name.
    fn human_label(&self) -> &str;

    /// Declared parameters, in display order.
    fn parameters(&self) -> Vec<FilterParameter>;

    /// Current value of parameter `key`.
    fn parameter(&self, key: &str) -> Option<ParameterValue>;

    /// Set parameter `key`.
    ///
    /// # Errors
    /// `InvalidParameter` for an unknown key or a value of the wrong variant.
    fn set_parameter(&mut self, key: &str, value: ParameterValue) -> Result<(), PipelineError>;

    /// Dry-run body: validate inputs and reserve outputs.
    fn data_check(&mut self, ctx: &mut DryRunContext<'_>) -> Result<(), PipelineError>;

    /// Execute body. Called only after a clean [`data_check`](Self::data_check).
    fn run(&mut self, ctx: &mut ExecuteContext<'_>) -> Result<(), PipelineError>;

    /// New step of the same kind with default parameters.
    fn fresh_instance(&self) -> Box<dyn PipelineStep>;

    fn status(&self) -> &StepStatus;

    fn status_mut(&mut self) -> &mut StepStatus;

    /// Run the dry-run phase and return the resulting error code.
    fn dry_run_check(
        &mut self,
        registry: &mut DataContainerRegistry,
        observer: &dyn PipelineObserver,
    ) -> i32 {
        let label = self.human_label().to_string();
        let mut ctx = DryRunContext::new(registry, observer, &label);
        let result = self.data_check(&mut ctx);
        let warnings = std::mem::take(&mut ctx.warnings);
        drop(ctx);

        if let Err(e) = &result {
            log::debug!("dry run of `{label}` failed: {e}");
            observer.notify(&StepMessage::Error {
                step: label.clone(),
                code: e.code(),
                text: e.to_string(),
            });
        }
        let status = self.status_mut();
        status.warnings = warnings;
        status.record(StepState::Checked, result);
        status.error_code
    }

    /// Re-run the dry run, then the transformation, and return the resulting
    /// error code. A cancellation observed by [`run`](Self::run) leaves the
    /// step in [`StepState::Cancelled`] with code `-1`.
    fn execute(
        &mut self,
        registry: &mut DataContainerRegistry,
        observer: &dyn PipelineObserver,
        cancel: &CancellationToken,
        config: &RunnerConfig,
    ) -> i32 {
        let code = self.dry_run_check(registry, observer);
        if code != 0 {
            return code;
        }
        let label = self.human_label().to_string();
        let mut ctx = ExecuteContext::new(registry, observer, cancel, config, &label);
        let result = match ctx.check_cancelled() {
            Ok(()) => self.run(&mut ctx),
            Err(e) => Err(e),
        };
        let warnings = std::mem::take(&mut ctx.warnings);
        drop(ctx);

        let state = match &result {
            Err(PipelineError::Cancelled) => StepState::Cancelled,
            _ => StepState::Executed,
        };
        match &result {
            Ok(()) => log::debug!("executed `{label}`"),
            Err(e) => {
                log::debug!("execution of `{label}` stopped: {e}");
                observer.notify(&StepMessage::Error {
                    step: label.clone(),
                    code: e.code(),
                    text: e.to_string(),
                });
            }
        }
        let status = self.status_mut();
        status.warnings.extend(warnings);
        status.record(state, result);
        status.error_code
    }

    /// New step of the same kind, optionally carrying over this step's
    /// parameter values.
    fn new_instance(&self, copy_parameters: bool) -> Box<dyn PipelineStep> {
        let mut step = self.fresh_instance();
        if copy_parameters {
            for param in self.parameters() {
                if let Some(value) = self.parameter(&param.key) {
                    if let Err(e) = step.set_parameter(&param.key, value) {
                        log::warn!("could not copy `{}` to new `{}`: {e}", param.key, self.name());
                    }
                }
            }
        }
        step
    }

    /// Load declared parameters from group `index` of `reader`; absent keys
    /// keep their current value. Returns the next group index.
    fn read_parameters(
        &mut self,
        reader: &dyn ParameterReader,
        index: usize,
    ) -> Result<usize, PipelineError> {
        for param in self.parameters() {
            let current = self.parameter(&param.key).unwrap_or(param.default);
            if let Some(value) = reader.read_value(index, &param.key, &current)? {
                self.set_parameter(&param.key, value)?;
            }
        }
        Ok(index + 1)
    }

    /// Store declared parameters as group `index` of `writer`. Returns the
    /// next group index.
    fn write_parameters(
        &self,
        writer: &mut dyn ParameterWriter,
        index: usize,
    ) -> Result<usize, PipelineError> {
        writer.begin_step(index, self.name())?;
        for param in self.parameters() {
            let value = self.parameter(&param.key).unwrap_or(param.default);
            writer.write_value(index, &param.key, &value)?;
        }
        Ok(index + 1)
    }

    fn error_code(&self) -> i32 {
        self.status().error_code
    }

    fn is_ok(&self) -> bool {
        self.status().is_ok()
    }

    fn is_cancelled(&self) -> bool {
        self.status().state == StepState::Cancelled || self.status().error_code == CANCELLED
    }
}
