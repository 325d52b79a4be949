//! One-way status channel and cooperative cancellation.
//!
//! Steps push [`StepMessage`]s to a [`PipelineObserver`] without waiting for
//! any acknowledgement, and poll a [`CancellationToken`] between batches of
//! work.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Notification emitted by a running step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepMessage {
    /// Free-form status line.
    Status { step: String, text: String },
    /// Progress in percent (0..=100) with a status line.
    Progress {
        step: String,
        percent: u8,
        text: String,
    },
    /// Non-fatal condition with a signed code.
    Warning {
        step: String,
        code: i32,
        text: String,
    },
    /// Failure with a signed code; the step's status holds the same pair.
    Error {
        step: String,
        code: i32,
        text: String,
    },
}

impl StepMessage {
    /// Human label of the step that emitted the message.
    pub fn step(&self) -> &str {
        match self {
            StepMessage::Status { step, .. }
            | StepMessage::Progress { step, .. }
            | StepMessage::Warning { step, .. }
            | StepMessage::Error { step, .. } => step,
        }
    }
}

/// Receiver of step notifications.
pub trait PipelineObserver {
    fn notify(&self, message: &StepMessage);
}

impl<F> PipelineObserver for F
where
    F: Fn(&StepMessage),
{
    fn notify(&self, message: &StepMessage) {
        self(message)
    }
}

/// Observer that drops every message.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl PipelineObserver for NullObserver {
    fn notify(&self, _message: &StepMessage) {}
}

/// Observer that forwards messages to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn notify(&self, message: &StepMessage) {
        match message {
            StepMessage::Status { step, text } => log::info!("[{step}] {text}"),
            StepMessage::Progress {
                step,
                percent,
                text,
            } => log::debug!("[{step}] {percent:>3}% {text}"),
            StepMessage::Warning { step, code, text } => log::warn!("[{step}] ({code}) {text}"),
            StepMessage::Error { step, code, text } => log::error!("[{step}] ({code}) {text}"),
        }
    }
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Clear a previous request so the token can be reused.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}
