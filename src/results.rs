use std::fmt;

use serde::Serialize;

use crate::items::ProvenanceItem;
use crate::services::{MessageStyle, SessionStatus};

/// An item that did not make it through a step, with the reason why.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFailure<F> {
    pub payload: F,
    pub message: String,
}

impl<F> StepFailure<F> {
    pub fn new(payload: F, message: impl Into<String>) -> Self {
        Self {
            payload,
            message: message.into(),
        }
    }
}

impl<F> fmt::Display for StepFailure<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Items produced by a step (`R`), and the items that entered it but were
/// excluded (`F`).
///
/// Warnings are expected exclusions, failures are errors. Neither is passed to the
/// next step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResults<R, F = R> {
    pub succeeded: Vec<R>,
    pub warning: Vec<StepFailure<F>>,
    pub failed: Vec<StepFailure<F>>,
}

impl<R, F> Default for StepResults<R, F> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            warning: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<R, F> StepResults<R, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_succeeded(&mut self, item: R) {
        self.succeeded.push(item);
    }

    pub fn add_warning(&mut self, previous: F, message: impl Into<String>) {
        self.warning.push(StepFailure::new(previous, message));
    }

    pub fn add_failed(&mut self, previous: F, message: impl Into<String>) {
        self.failed.push(StepFailure::new(previous, message));
    }

    /// Number of items accounted for.
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.warning.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Step results with items waiting to be submitted again.
///
/// Only used while a bulk task is being reconciled; by the time a step returns, every
/// item to retry has been resolved into `succeeded` or `failed`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryableStepResults<R, F = R> {
    pub results: StepResults<R, F>,
    pub to_retry: Vec<R>,
}

impl<R, F> Default for RetryableStepResults<R, F> {
    fn default() -> Self {
        Self {
            results: StepResults::default(),
            to_retry: Vec::new(),
        }
    }
}

impl<R, F> RetryableStepResults<R, F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_succeeded(&mut self, item: R) {
        self.results.add_succeeded(item);
    }

    pub fn add_failed(&mut self, previous: F, message: impl Into<String>) {
        self.results.add_failed(previous, message);
    }

    pub fn add_to_retry(&mut self, item: R) {
        self.to_retry.push(item);
    }
}

/// Overall outcome of a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Succeeded,
    CompletedWithWarnings,
    Failed,
}

impl FlowStatus {
    pub fn from_counts(succeeded: usize, warning: usize, failed: usize) -> Self {
        if failed > 0 {
            if succeeded == 0 {
                FlowStatus::Failed
            } else {
                FlowStatus::CompletedWithWarnings
            }
        } else if warning > 0 {
            FlowStatus::CompletedWithWarnings
        } else {
            FlowStatus::Succeeded
        }
    }

    pub fn session_status(&self) -> SessionStatus {
        match self {
            FlowStatus::Succeeded => SessionStatus::Succeeded,
            FlowStatus::CompletedWithWarnings => SessionStatus::CompletedWithWarnings,
            FlowStatus::Failed => SessionStatus::Failed,
        }
    }

    pub fn message_style(&self) -> MessageStyle {
        match self {
            FlowStatus::Succeeded => MessageStyle::Success,
            FlowStatus::CompletedWithWarnings => MessageStyle::Warning,
            FlowStatus::Failed => MessageStyle::Error,
        }
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowStatus::Succeeded => "succeeded",
            FlowStatus::CompletedWithWarnings => "completed with warnings",
            FlowStatus::Failed => "failed",
        })
    }
}

/// Merged results of every step that ran.
///
/// `succeeded` holds the output of the last step; warnings and failures of all steps
/// are kept, their messages prefixed with the name of the step results they came from.
#[derive(Debug)]
pub struct FlowResults<R> {
    pub succeeded: Vec<R>,
    pub warning: Vec<StepFailure<Box<dyn ProvenanceItem>>>,
    pub failed: Vec<StepFailure<Box<dyn ProvenanceItem>>>,
}

impl<R> Default for FlowResults<R> {
    fn default() -> Self {
        Self {
            succeeded: Vec::new(),
            warning: Vec::new(),
            failed: Vec::new(),
        }
    }
}

impl<R> FlowResults<R> {
    /// Fold the warnings and failures of one step into the flow results, returning the
    /// items the step produced.
    pub fn merge_step<S, F: ProvenanceItem + 'static>(
        &mut self,
        step_name: &str,
        results: StepResults<S, F>,
    ) -> Vec<S> {
        let prefixed = |failure: StepFailure<F>| {
            StepFailure::new(
                Box::new(failure.payload) as Box<dyn ProvenanceItem>,
                format!("{step_name}Results: {}", failure.message),
            )
        };

        let warnings = results.warning.into_iter().map(prefixed);
        self.warning.extend(warnings);
        let failures = results.failed.into_iter().map(prefixed);
        self.failed.extend(failures);
        results.succeeded
    }

    pub fn status(&self) -> FlowStatus {
        FlowStatus::from_counts(self.succeeded.len(), self.warning.len(), self.failed.len())
    }

    pub fn summary(&self) -> FlowSummary<'_> {
        FlowSummary {
            succeeded: self.succeeded.len(),
            warnings: self.warning.iter().map(|w| w.message.as_str()).collect(),
            failures: self.failed.iter().map(|f| f.message.as_str()).collect(),
            status: self.status(),
        }
    }
}

/// Counts and messages reported once a flow completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowSummary<'a> {
    pub succeeded: usize,
    pub warnings: Vec<&'a str>,
    pub failures: Vec<&'a str>,
    pub status: FlowStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Sample(&'static str);

    impl ProvenanceItem for Sample {
        fn entity_id(&self) -> &str {
            self.0
        }

        fn to_json(&self) -> serde_json::Value {
            serde_json::Value::String(self.0.to_owned())
        }
    }

    #[test]
    fn status_derivation() {
        assert_eq!(FlowStatus::from_counts(3, 0, 0), FlowStatus::Succeeded);
        assert_eq!(FlowStatus::from_counts(0, 0, 0), FlowStatus::Succeeded);
        assert_eq!(FlowStatus::from_counts(0, 0, 2), FlowStatus::Failed);
        assert_eq!(FlowStatus::from_counts(0, 4, 2), FlowStatus::Failed);
        for (succeeded, warnings, failed) in [(1, 0, 2), (0, 1, 0), (5, 1, 0)] {
            assert_eq!(
                FlowStatus::from_counts(succeeded, warnings, failed),
                FlowStatus::CompletedWithWarnings
            );
        }
        assert_eq!(
            FlowStatus::CompletedWithWarnings.to_string(),
            "completed with warnings"
        );
    }

    #[test]
    fn buckets_keep_processing_order() {
        let mut results = StepResults::<u32, Sample>::new();
        results.add_failed(Sample("b"), "second");
        results.add_succeeded(1);
        results.add_warning(Sample("c"), "warned");
        results.add_failed(Sample("a"), "first");

        assert_eq!(results.len(), 4);
        assert_eq!(results.succeeded, vec![1]);
        let failed: Vec<_> = results.failed.iter().map(|f| f.payload.0).collect();
        assert_eq!(failed, vec!["b", "a"]);
        assert_eq!(results.warning[0].to_string(), "warned");
    }

    #[test]
    fn merge_prefixes_messages_with_step_name() {
        let mut flow = FlowResults::<u32>::default();

        let mut first = StepResults::<u32, Sample>::new();
        first.add_succeeded(7);
        first.add_failed(Sample("x"), "missing clone");
        let next = flow.merge_step("ValidateEventsStep", first);

        let mut second = StepResults::<u32, Sample>::new();
        second.add_warning(Sample("y"), "stop codon");
        flow.succeeded = flow.merge_step("ExcludeStopCodonsStep", second);

        assert_eq!(next, vec![7]);
        assert_eq!(
            flow.failed[0].message,
            "ValidateEventsStepResults: missing clone"
        );
        assert_eq!(flow.failed[0].payload.entity_id(), "x");
        assert_eq!(
            flow.warning[0].message,
            "ExcludeStopCodonsStepResults: stop codon"
        );
        assert_eq!(flow.status(), FlowStatus::Failed);

        let summary = flow.summary();
        assert_eq!(summary.succeeded, 0);
        assert_eq!(
            summary.failures,
            vec!["ValidateEventsStepResults: missing clone"]
        );
    }
}
