use thiserror::Error;

/// Validation failures for synchronization configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A field holds a value outside its accepted range.
    #[error("invalid value for `{field}`: {constraint}")]
    InvalidFieldValue {
        field: &'static str,
        constraint: &'static str,
    },
}
