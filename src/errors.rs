pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Unable to parse amino acids \"{amino_acids}\" using regex with {fragments} fragment(s)"
    )]
    RegionDetection {
        amino_acids: String,
        fragments: usize,
    },
    #[error("Invalid region pattern \"{pattern}\"")]
    RegionPattern {
        pattern: String,
        source: Box<regex::Error>,
    },
    #[error("Unable to parse errors from async task \"{task_id}\": {reason}")]
    TaskErrors { task_id: String, reason: String },
    #[error("Missing {what} in response of async task \"{task_id}\"")]
    TaskResponse { task_id: String, what: String },
    #[error("Registry error in {context}: {message}")]
    Registry {
        message: String,
        context: &'static str,
    },
    #[error("Annotation service error in {context}: {message}")]
    Annotation {
        message: String,
        context: &'static str,
    },
    #[error("Error parsing annotation report")]
    AnnotationReport { source: Box<csv::Error> },
    #[error("Missing \"{field}\" value for {entity}")]
    MissingField { field: String, entity: String },
    #[error("Error reading config file \"{file}\"")]
    ConfigIo {
        file: String,
        source: Box<std::io::Error>,
    },
    #[error("Error parsing config")]
    ConfigParse { source: Box<serde_yaml::Error> },
}
