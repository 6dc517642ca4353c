//! Build/test pipeline seam.
//!
//! The engine only needs a pass/fail verdict before recording a version;
//! what "the pipeline" runs is the host's business.

use crate::state::ComponentState;

/// Verdict of one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub passed: bool,
    /// Human-readable output, kept for reports and failure errors.
    pub diagnostics: String,
}

impl PipelineOutcome {
    pub fn pass() -> Self {
        Self {
            passed: true,
            diagnostics: String::new(),
        }
    }

    pub fn fail(diagnostics: impl Into<String>) -> Self {
        Self {
            passed: false,
            diagnostics: diagnostics.into(),
        }
    }
}

/// Runs the build/test pipeline against a working copy.
///
/// `skip_tests` asks the runner to execute the build step only; the runner
/// decides what its test step is.
pub trait PipelineRunner: Send + Sync {
    fn run(&self, state: &ComponentState, skip_tests: bool) -> PipelineOutcome;
}

/// Pipeline that always passes. The engine's default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopPipeline;

impl PipelineRunner for NoopPipeline {
    fn run(&self, _state: &ComponentState, _skip_tests: bool) -> PipelineOutcome {
        PipelineOutcome::pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_always_passes() {
        let state = ComponentState::new("acme/button".parse().unwrap(), Default::default());
        assert!(NoopPipeline.run(&state, false).passed);
        assert!(NoopPipeline.run(&state, true).passed);
    }

    #[test]
    fn fail_carries_diagnostics() {
        let outcome = PipelineOutcome::fail("2 tests failed");
        assert!(!outcome.passed);
        assert_eq!(outcome.diagnostics, "2 tests failed");
    }
}
