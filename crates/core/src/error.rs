#[derive(Debug, thiserror::Error)]
pub enum AncError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid triage policy: {0}")]
    InvalidPolicy(String),
    #[error("failed to read triage policy file: {0}")]
    PolicyRead(std::io::Error),
    #[error("triage policy schema mismatch at {path}: {source}")]
    PolicyParse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to serialize triage policy: {0}")]
    PolicySerialization(serde_yaml::Error),
    #[error("invalid date: {0}")]
    InvalidDate(#[from] anc_types::TypesError),
}

pub type AncResult<T> = std::result::Result<T, AncError>;
