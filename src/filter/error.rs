use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("Operator '{op}' cannot be used on field '{field}'")]
    InvalidOperatorData { field: String, op: String },

    #[error("Malformed query parameter: {0}")]
    MalformedParameter(String),
}
