use std::collections::BTreeMap;

use serde_json::Value;

use crate::errors::*;
use crate::items::ProvenanceItem;
use crate::results::*;
use crate::services::AsyncTask;

/// Key and value the registry reports when it rejected a whole batch.
const BATCH_ERROR: &str = "index";
const BATCH_ERROR_MESSAGE: &str = "message";

/// Errors reported by a completed bulk task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskErrors {
    /// Nothing was rejected.
    None,
    /// The whole batch was rejected, and nothing was applied.
    Batch(String),
    /// Some items were rejected, keyed by their position in the batch. Nothing was
    /// applied.
    ByIndex(BTreeMap<usize, String>),
}

/// Splits the items of a bulk task into succeeded, failed and to-retry, based on the
/// errors the registry reported for it.
pub struct AsyncTaskResultProcessor<'t> {
    task: &'t AsyncTask,
}

impl<'t> AsyncTaskResultProcessor<'t> {
    pub fn new(task: &'t AsyncTask) -> Self {
        Self { task }
    }

    /// Read the error payload of the task.
    ///
    /// Accepted shapes are an empty payload, the batch-level `{"index": "message"}`
    /// entry, a map from index to message, and a list of `{"index", "message"}`
    /// entries. Messages of entries sharing an index are joined with newlines.
    pub fn errors(&self, batch_len: usize) -> Result<TaskErrors> {
        let errors = match &self.task.errors {
            None | Some(Value::Null) => return Ok(TaskErrors::None),
            Some(Value::Object(m)) if m.is_empty() => return Ok(TaskErrors::None),
            Some(Value::Array(a)) if a.is_empty() => return Ok(TaskErrors::None),
            Some(errors) => errors,
        };

        let mut by_index = BTreeMap::<usize, String>::new();

        match errors {
            Value::Object(m) => {
                if m.get(BATCH_ERROR).and_then(|v| v.as_str()) == Some(BATCH_ERROR_MESSAGE) {
                    let message = self.task.message.clone().unwrap_or_default();
                    return Ok(TaskErrors::Batch(message));
                }

                for (index, message) in m {
                    let index = self.parse_index(&Value::String(index.clone()), batch_len)?;
                    by_index.insert(index, message_text(message));
                }
            }
            Value::Array(entries) => {
                for entry in entries {
                    let fields = (entry.get("index"), entry.get("message"));
                    let (Some(index), Some(message)) = fields else {
                        return Err(self.unparseable(format!("unexpected entry {entry}")));
                    };
                    let index = self.parse_index(index, batch_len)?;
                    let message = message_text(message);

                    by_index
                        .entry(index)
                        .and_modify(|m| {
                            m.push('\n');
                            m.push_str(&message);
                        })
                        .or_insert(message);
                }
            }
            other => return Err(self.unparseable(format!("unexpected payload {other}"))),
        }

        Ok(TaskErrors::ByIndex(by_index))
    }

    /// Route each item of the submitted batch.
    ///
    /// Without errors every item succeeded. A batch-level error fails every item. With
    /// per-index errors the listed items fail and all others are to be retried, since
    /// the registry applied none of them.
    pub fn process<T>(&self, items: Vec<T>) -> Result<RetryableStepResults<T>> {
        let mut results = RetryableStepResults::new();

        match self.errors(items.len())? {
            TaskErrors::None => {
                for item in items {
                    results.add_succeeded(item);
                }
            }
            TaskErrors::Batch(message) => {
                tracing::error!(
                    task_id = %self.task.id,
                    items = items.len(),
                    message = %message,
                    "Async task rejected the batch"
                );
                for item in items {
                    results.add_failed(item, message.clone());
                }
            }
            TaskErrors::ByIndex(mut by_index) => {
                tracing::warn!(
                    task_id = %self.task.id,
                    failed = by_index.len(),
                    items = items.len(),
                    "Async task rejected items"
                );
                for (i, item) in items.into_iter().enumerate() {
                    match by_index.remove(&i) {
                        Some(message) => results.add_failed(item, message),
                        None => results.add_to_retry(item),
                    }
                }
            }
        }

        Ok(results)
    }

    fn parse_index(&self, index: &Value, batch_len: usize) -> Result<usize> {
        let parsed = match index {
            Value::Number(n) => n.as_u64().map(|n| n as usize),
            Value::String(s) => s.parse::<usize>().ok(),
            _ => None,
        };

        match parsed {
            Some(i) if i < batch_len => Ok(i),
            Some(i) => {
                let reason = format!("index {i} is out of range for {batch_len} item(s)");
                Err(self.unparseable(reason))
            }
            None => Err(self.unparseable(format!("invalid index {index}"))),
        }
    }

    fn unparseable(&self, reason: String) -> Error {
        Error::TaskErrors {
            task_id: self.task.id.clone(),
            reason,
        }
    }
}

fn message_text(message: &Value) -> String {
    match message {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A step that applies its items in a registry bulk task.
pub trait AsyncTaskStep {
    type Input: ProvenanceItem + 'static;
    type Output;

    fn initialize_results(&self) -> StepResults<Self::Output, Self::Input> {
        StepResults::new()
    }

    /// Submit one bulk task for the batch and wait for it to complete.
    fn submit_task(&self, items: &[Self::Input]) -> Result<AsyncTask>;

    /// Build the step output for items the task applied.
    fn succeeded_items(
        &self,
        items: Vec<Self::Input>,
        task: &AsyncTask,
    ) -> Result<Vec<Self::Output>>;
}

/// Run a bulk task over `items`, resubmitting the items that were not rejected until
/// a round goes through without errors or nothing is left to submit.
///
/// Every round that reports per-item errors fails at least one item, so the batch
/// shrinks until it is empty or accepted.
pub fn execute_async_task<S: AsyncTaskStep + ?Sized>(
    step: &S,
    items: Vec<S::Input>,
) -> Result<StepResults<S::Output, S::Input>> {
    let mut results = step.initialize_results();
    let mut batch = items;
    let mut round = 0;

    while !batch.is_empty() {
        round += 1;
        let submitted = batch.len();

        let task = step.submit_task(&batch)?;
        let RetryableStepResults {
            results: processed,
            to_retry,
        } = AsyncTaskResultProcessor::new(&task).process(batch)?;

        let failed = processed.failed.len();
        results.failed.extend(processed.failed);
        if !processed.succeeded.is_empty() {
            let succeeded = step.succeeded_items(processed.succeeded, &task)?;
            results.succeeded.extend(succeeded);
        }

        if !to_retry.is_empty() && to_retry.len() >= submitted {
            return Err(Error::TaskErrors {
                task_id: task.id,
                reason: "partial failure did not reject any item".to_owned(),
            });
        }

        tracing::debug!(
            task_id = %task.id,
            round,
            submitted,
            failed,
            to_retry = to_retry.len(),
            "Async task round completed"
        );
        batch = to_retry;
    }

    Ok(results)
}
