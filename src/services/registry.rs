use crate::errors::*;
use crate::services::*;

/// Client for the laboratory registry the flow reads from and writes into.
///
/// Implementations own authentication, rate limiting and task polling. Bulk
/// operations are applied all-or-nothing per call.
pub trait Registry {
    fn create_session(&self, name: &str, timeout_secs: u64) -> Result<String>;

    fn add_session_message(
        &self,
        session_id: &str,
        content: &str,
        style: MessageStyle,
    ) -> Result<()>;

    fn update_session_status(&self, session_id: &str, status: SessionStatus) -> Result<()>;

    fn get_dna_sequences(&self, ids: &[String]) -> Result<Vec<DnaSequence>>;

    fn get_custom_entities(&self, ids: &[String]) -> Result<Vec<CustomEntity>>;

    fn create_aa_sequence(&self, request: &AaSequenceCreate) -> Result<AaSequence>;

    fn bulk_create_dna_sequences(&self, requests: &[DnaSequenceBulkCreate]) -> Result<TaskLink>;

    fn bulk_update_dna_sequences(&self, requests: &[DnaSequenceBulkUpdate]) -> Result<TaskLink>;

    /// Block until the task leaves the running state, bounded by the client's own
    /// polling interval and maximum wait.
    fn wait_for_task(&self, task_id: &str) -> Result<AsyncTask>;

    fn create_template_alignment(&self, request: &TemplateAlignmentCreate) -> Result<TaskLink>;
}

/// Submit a bulk create and wait for it to complete.
pub fn create_dna_sequences(
    registry: &dyn Registry,
    requests: &[DnaSequenceBulkCreate],
) -> Result<AsyncTask> {
    tracing::info!(
        sequences = requests.len(),
        "Creating DNA sequences in registry"
    );
    let link = registry.bulk_create_dna_sequences(requests)?;
    let task = registry.wait_for_task(&link.task_id)?;
    tracing::info!(
        task_id = %task.id,
        status = ?task.status,
        "DNA sequences create task completed"
    );
    Ok(task)
}

/// Submit a bulk update and wait for it to complete.
pub fn update_dna_sequences(
    registry: &dyn Registry,
    requests: &[DnaSequenceBulkUpdate],
) -> Result<AsyncTask> {
    tracing::info!(
        sequences = requests.len(),
        "Updating DNA sequences in registry"
    );
    let link = registry.bulk_update_dna_sequences(requests)?;
    let task = registry.wait_for_task(&link.task_id)?;
    tracing::info!(
        task_id = %task.id,
        status = ?task.status,
        "DNA sequences update task completed"
    );
    Ok(task)
}
