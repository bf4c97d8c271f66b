use std::collections::BTreeSet;

use crate::config::Config;
use crate::flow::*;
use crate::items::*;
use crate::mapper::IgBlastToRegistryMapper;
use crate::services::*;

/// The session log follows the flow: one message per step, then a summary.
impl FlowObserver for AppSession<'_> {
    fn step_started(&self, label: &str, items: usize) -> Result<()> {
        self.info(&format!("{label} ({items})"))
    }

    fn flow_completed(&self, summary: &FlowSummary<'_>) -> Result<()> {
        let warnings = summary.warnings.len();
        if warnings > 0 {
            tracing::error!(warnings = ?summary.warnings, "{warnings} warning(s) detected");
            let unique = unique_messages(&summary.warnings);
            let message = format!("{warnings} warning(s) detected: {unique}");
            self.add_message(&message, MessageStyle::Error)?;
        }

        let failures = summary.failures.len();
        if failures > 0 {
            tracing::error!(errors = ?summary.failures, "{failures} error(s) detected");
            let unique = unique_messages(&summary.failures);
            let message = format!("{failures} error(s) detected: {unique}");
            self.add_message(&message, MessageStyle::Error)?;
        }

        self.set_status(summary.status.session_status());
        let succeeded = summary.succeeded;
        let message = format!(
            "Flow completed {succeeded} succeeded / {warnings} warnings / {failures} failed"
        );
        self.add_message(&message, summary.status.message_style())
    }
}

fn unique_messages(messages: &[&str]) -> String {
    messages
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Annotates newly registered antibody DNA sequences: IgBLAST them, register their
/// annotated translations and germline alignments, and align each sequence against
/// its germline.
pub struct SequenceAnnotationFlow<'a> {
    registry: &'a dyn Registry,
    annotator: &'a dyn Annotator,
    config: &'a Config,
}

impl<'a> SequenceAnnotationFlow<'a> {
    pub fn new(
        registry: &'a dyn Registry,
        annotator: &'a dyn Annotator,
        config: &'a Config,
    ) -> Self {
        Self {
            registry,
            annotator,
            config,
        }
    }

    pub fn session_name(events: usize) -> String {
        format!("Sequence Annotation Bulk Flow ({events} sequences)")
    }

    /// Run the flow over a batch of events inside an app session.
    ///
    /// The session is closed whatever the outcome; an error that aborted the flow is
    /// posted to it before being returned.
    pub fn execute(
        &self,
        events: Vec<EntityRegisteredEvent>,
    ) -> Result<FlowResults<TemplateAlignmentItem>> {
        let session = AppSession::open(
            self.registry,
            &Self::session_name(events.len()),
            &self.config.session,
        )?;
        let mapper = IgBlastToRegistryMapper::new(&self.config.registry);

        let run = self.run(events, &session, &mapper);
        if let Err(e) = &run {
            tracing::error!(
                session_id = %session.id(),
                error = %e,
                "Sequence annotation flow aborted"
            );
        }

        let closed = session.close(run.as_ref().err());
        let results = run?;
        closed?;

        Ok(results)
    }

    fn run(
        &self,
        events: Vec<EntityRegisteredEvent>,
        session: &AppSession<'_>,
        mapper: &IgBlastToRegistryMapper<'_>,
    ) -> Result<FlowResults<TemplateAlignmentItem>> {
        let registry = self.registry;

        Flow::new(ValidateEventsStep::new(&self.config.registry))
            .then(GetDnaSequencesStep::new(registry))
            .then(GetSpeciesStep::new(registry))
            .then(ExecuteIgBlastStep::new(self.annotator))
            .then(ExcludeStopCodonsStep::new(registry, session, mapper))
            .then(CreateAaSequencesStep::new(registry, mapper))
            .then(FillTranslationsStep::new(registry, mapper))
            .then(CreateGermlineAlignmentSequencesStep::new(registry, mapper))
            .then(CreateNucleotideTemplateAlignmentStep::new(registry))
            .run(events, session)
    }
}

/// Entry point for registration notifications.
///
/// Events are grouped by entity schema, and one flow runs per DNA sequence or DNA
/// feature group. Other schemas are logged and skipped. A flow that aborts is logged
/// and does not stop the other groups.
pub fn handle_registered_events(
    events: Vec<EntityRegisteredEvent>,
    registry: &dyn Registry,
    annotator: &dyn Annotator,
    config: &Config,
) -> Vec<FlowResults<TemplateAlignmentItem>> {
    tracing::info!(events = events.len(), "Events received");

    let mut groups: Vec<(String, Vec<EntityRegisteredEvent>)> = Vec::new();
    for event in events {
        let schema_id = event.schema_id();
        match groups.iter_mut().find(|(id, _)| id == schema_id) {
            Some((_, group)) => group.push(event),
            None => groups.push((schema_id.to_owned(), vec![event])),
        }
    }

    let supported = [
        config.registry.dna_sequence_schema_id.as_str(),
        config.registry.dna_feature_schema_id.as_str(),
    ];
    let flow = SequenceAnnotationFlow::new(registry, annotator, config);
    let mut completed = Vec::new();

    for (schema_id, group) in groups {
        if !supported.contains(&schema_id.as_str()) {
            tracing::error!(schema_id = %schema_id, events = group.len(), "Unsupported schema");
            continue;
        }

        match flow.execute(group) {
            Ok(results) => completed.push(results),
            Err(e) => {
                tracing::error!(
                    schema_id = %schema_id,
                    error = %e,
                    "Unexpected error while running flow"
                );
            }
        }
    }

    completed
}
