//! Linear flows of steps over batches of items.
//!
//! A [`Flow`] is built from a fixed list of steps with [`Flow::new`] and
//! [`Flow::then`]. Every step receives the items that succeeded in the step before
//! it, so the item types have to line up at compile time:
//! ```ignore
//! let flow = Flow::new(ValidateEventsStep::new(&config))
//!     .then(GetDnaSequencesStep::new(registry))
//!     .then(GetSpeciesStep::new(registry));
//! let results = flow.run(events, &session)?;
//! ```
//! Once a step has nothing left to pass on, the remaining steps are skipped. The
//! warnings and failures of every step that ran are merged into one
//! [`FlowResults`].

pub use crate::errors::*;
pub use crate::items::ProvenanceItem;
pub use crate::results::*;

mod async_task;
pub use async_task::*;

pub mod steps;
pub use steps::*;

mod sequence_annotation;
pub use sequence_annotation::*;

/// One stage of a flow.
pub trait Step {
    type Input;
    type Output;
    /// Payload recorded for warnings and failures.
    type Failure: ProvenanceItem + 'static;

    /// Type name, used to attribute warnings and failures.
    fn name(&self) -> &'static str;

    /// Human-readable description shown while the flow runs.
    fn label(&self) -> &'static str;

    /// Process a batch. Every input item must end up in exactly one bucket of the
    /// returned results. An `Err` aborts the whole flow.
    fn execute(&self, items: Vec<Self::Input>) -> Result<StepResults<Self::Output, Self::Failure>>;
}

impl<S: Step + ?Sized> Step for &S {
    type Input = S::Input;
    type Output = S::Output;
    type Failure = S::Failure;

    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn label(&self) -> &'static str {
        (**self).label()
    }

    fn execute(&self, items: Vec<Self::Input>) -> Result<StepResults<Self::Output, Self::Failure>> {
        (**self).execute(items)
    }
}

/// Receives progress of a running flow.
pub trait FlowObserver {
    fn step_started(&self, label: &str, items: usize) -> Result<()>;

    fn flow_completed(&self, summary: &FlowSummary<'_>) -> Result<()>;
}

/// A sequence of steps whose item types line up.
pub trait StepChain {
    type Input;
    type Output;

    /// Run the steps in order, merging warnings and failures into `results`, and
    /// return the items that made it through the last step that ran.
    fn run_chain<R>(
        &self,
        items: Vec<Self::Input>,
        results: &mut FlowResults<R>,
        observer: &dyn FlowObserver,
    ) -> Result<Vec<Self::Output>>;
}

pub struct Single<S>(S);

impl<S: Step> StepChain for Single<S> {
    type Input = S::Input;
    type Output = S::Output;

    fn run_chain<R>(
        &self,
        items: Vec<S::Input>,
        results: &mut FlowResults<R>,
        observer: &dyn FlowObserver,
    ) -> Result<Vec<S::Output>> {
        let step = &self.0;

        observer.step_started(step.label(), items.len())?;
        tracing::info!(step = step.name(), items = items.len(), "{}", step.label());

        let step_results = step.execute(items)?;

        tracing::info!(
            step = step.name(),
            succeeded = step_results.succeeded.len(),
            warning = step_results.warning.len(),
            failed = step_results.failed.len(),
            "Step completed"
        );

        Ok(results.merge_step(step.name(), step_results))
    }
}

pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A, B> StepChain for Then<A, B>
where
    A: StepChain,
    B: StepChain<Input = A::Output>,
{
    type Input = A::Input;
    type Output = B::Output;

    fn run_chain<R>(
        &self,
        items: Vec<A::Input>,
        results: &mut FlowResults<R>,
        observer: &dyn FlowObserver,
    ) -> Result<Vec<B::Output>> {
        let items = self.first.run_chain(items, results, observer)?;

        if items.is_empty() {
            return Ok(Vec::new());
        }

        self.second.run_chain(items, results, observer)
    }
}

pub struct Flow<C> {
    steps: C,
}

impl<S: Step> Flow<Single<S>> {
    pub fn new(step: S) -> Self {
        Self {
            steps: Single(step),
        }
    }
}

impl<C: StepChain> Flow<C> {
    /// Append a step that consumes the output of the current last step.
    pub fn then<S: Step<Input = C::Output>>(self, step: S) -> Flow<Then<C, Single<S>>> {
        Flow {
            steps: Then {
                first: self.steps,
                second: Single(step),
            },
        }
    }

    /// Run all steps on a batch of items.
    ///
    /// Item-level problems end up in the returned results. An `Err` means a step could
    /// not complete at all, and no summary is sent to the observer.
    pub fn run(
        &self,
        items: Vec<C::Input>,
        observer: &dyn FlowObserver,
    ) -> Result<FlowResults<C::Output>> {
        let mut results = FlowResults::default();
        let succeeded = self.steps.run_chain(items, &mut results, observer)?;
        results.succeeded = succeeded;

        let summary = results.summary();
        tracing::info!(
            succeeded = summary.succeeded,
            warning = summary.warnings.len(),
            failed = summary.failures.len(),
            status = %summary.status,
            "Flow completed"
        );
        observer.flow_completed(&summary)?;

        Ok(results)
    }
}
