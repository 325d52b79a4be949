//! Step contract, runner and their surfaces (parameters, persistence,
//! status channel).

pub mod context;
pub mod observer;
pub mod parameter;
pub mod persistence;
pub mod runner;
pub mod step;

pub use context::{DryRunContext, ExecuteContext, GeometryShape, GroupShape};
pub use observer::{CancellationToken, LogObserver, NullObserver, PipelineObserver, StepMessage};
pub use parameter::{FilterParameter, ParameterCategory, ParameterValue};
pub use persistence::{JsonParameterStore, ParameterReader, ParameterWriter};
pub use runner::{Pipeline, PipelineRunner, RunFailure, RunPhase, RunReport, RunnerConfig};
pub use step::{PipelineStep, StepState, StepStatus, StepWarning};
