use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid service date `{value}` (expected DD-MMM-YYYY)")]
    InvalidDateFormat { value: String },
    #[error("unknown service category `{0}`")]
    UnknownCategory(String),
}
