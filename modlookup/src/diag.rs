//! Diagnostic context for lookup tracing.
//!
//! Each environment carries its own context: the name of the task doing the
//! lookups and whether that task is muted. Nesting of merge and search steps
//! is expressed with `tracing` spans, so the output indents per task without
//! any process-wide state.

use tracing::Span;

use crate::config::LookupConfig;

/// Per-environment diagnostic context.
#[derive(Debug, Clone)]
pub struct DiagContext {
    task: String,
    muted: bool,
}

impl DiagContext {
    /// Derive the context from a configuration.
    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            task: config.task.clone(),
            muted: config.is_quiet(),
        }
    }

    /// The task name attached to every event.
    pub fn task(&self) -> &str {
        &self.task
    }

    /// Whether events for this task are suppressed.
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Open a span for one lookup step. Muted tasks get a disabled span.
    pub fn span(&self, step: &'static str) -> Span {
        if self.muted {
            Span::none()
        } else {
            tracing::debug_span!("lookup", task = %self.task, step)
        }
    }
}

/// Emit a debug event unless the environment's task is muted.
macro_rules! lookup_debug {
    ($env:expr, $($arg:tt)+) => {
        if !$env.diag.is_muted() {
            tracing::debug!(task = %$env.diag.task(), $($arg)+);
        }
    };
}

/// Emit a per-candidate trace event unless the task is muted.
macro_rules! lookup_trace {
    ($env:expr, $($arg:tt)+) => {
        if !$env.diag.is_muted() {
            tracing::trace!(task = %$env.diag.task(), $($arg)+);
        }
    };
}

/// Emit a warning for an internal-consistency anomaly. Never fatal.
macro_rules! lookup_anomaly {
    ($env:expr, $($arg:tt)+) => {
        if !$env.diag.is_muted() {
            tracing::warn!(task = %$env.diag.task(), $($arg)+);
        }
    };
}

pub(crate) use lookup_anomaly;
pub(crate) use lookup_debug;
pub(crate) use lookup_trace;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_task_is_muted() {
        let config = LookupConfig::builder().task("reconciler").build().unwrap();
        let diag = DiagContext::from_config(&config);
        assert!(diag.is_muted());
        assert!(diag.span("combine").is_none());
    }

    #[test]
    fn test_main_task_is_not_muted() {
        let diag = DiagContext::from_config(&LookupConfig::default());
        assert!(!diag.is_muted());
        assert_eq!(diag.task(), "main");
    }
}
