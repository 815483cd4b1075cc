use thiserror::Error;

pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

#[derive(Clone, Debug, Error)]
pub enum SchemaError {
    #[error("malformed schema, {reason}")]
    MalformedSchema { reason: String },
    #[error("invalid type `{value}`")]
    InvalidType { value: String },
    #[error("keyword `{keyword}` is incompatible with type `{declared}`")]
    IncompatibleKeyword { keyword: String, declared: String },
    #[error("failed to fetch `{url}`, {reason}")]
    ReferenceFetch { url: String, reason: String },
    #[error("circular reference `{reference}`")]
    CircularReference { reference: String },
    #[error("unknown ref `{reference}`")]
    UnknownRef { reference: String },
}
