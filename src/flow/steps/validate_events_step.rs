use crate::config::RegistryConfig;
use crate::flow::*;
use crate::items::*;
use crate::services::fields::*;
use crate::services::*;

/// Antibody chain types the flow annotates.
pub const SUPPORTED_TYPES: [&str; 3] = ["VL", "VH", "HCDR3"];

pub struct ValidateEventsStep<'a> {
    config: &'a RegistryConfig,
}

impl<'a> ValidateEventsStep<'a> {
    const NAME: &'static str = "ValidateEventsStep";
    const LABEL: &'static str = "Filter events";

    /// Keep events for DNA sequences and features of a supported type.
    pub fn new(config: &'a RegistryConfig) -> Self {
        Self { config }
    }

    fn dna_schema_type(&self, entity: &RegisteredEntity) -> Option<DnaSchemaType> {
        let schema_id = entity.schema.id.as_str();
        if schema_id == self.config.dna_sequence_schema_id {
            Some(DnaSchemaType::Sequence)
        } else if schema_id == self.config.dna_feature_schema_id {
            Some(DnaSchemaType::Feature)
        } else {
            None
        }
    }

    fn error_message(entity: &RegisteredEntity, dna_schema_type: DnaSchemaType) -> Option<String> {
        let type_key = match dna_schema_type {
            DnaSchemaType::Sequence => dna_sequence::TYPE,
            DnaSchemaType::Feature => dna_feature::FUNCTIONS,
        };
        let kind = entity.field_text_value(type_key).unwrap_or_default();

        if !SUPPORTED_TYPES.contains(&kind) {
            return Some(format!("Type \"{kind}\" is not supported"));
        }

        if dna_schema_type == DnaSchemaType::Sequence {
            let has_source_clone = entity
                .field_value(dna_sequence::SOURCE_CLONE)
                .and_then(|v| v.first())
                .is_some_and(|v| !v.is_empty());

            if !has_source_clone {
                let field = dna_sequence::SOURCE_CLONE;
                return Some(format!("Missing \"{field}\" field value"));
            }
        }

        None
    }
}

impl<'a> Step for ValidateEventsStep<'a> {
    type Input = EntityRegisteredEvent;
    type Output = EventValidationItem;
    type Failure = EntityRegisteredEvent;

    fn execute(
        &self,
        items: Vec<EntityRegisteredEvent>,
    ) -> Result<StepResults<EventValidationItem, EntityRegisteredEvent>> {
        let mut results = StepResults::new();

        for event in items {
            let entity = &event.entity;
            let outcome = match self.dna_schema_type(entity) {
                Some(schema_type) => match Self::error_message(entity, schema_type) {
                    Some(message) => Err(message),
                    None => Ok(schema_type),
                },
                None => Err(format!("Unknown entity schema \"{}\"", entity.schema.id)),
            };

            match outcome {
                Ok(schema_type) => {
                    results.add_succeeded(EventValidationItem::new(event, schema_type));
                }
                Err(message) => {
                    tracing::error!(entity_id = %entity.id, name = %entity.name, "{message}");
                    results.add_failed(event, message);
                }
            }
        }

        Ok(results)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn label(&self) -> &'static str {
        Self::LABEL
    }
}
