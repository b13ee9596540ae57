use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A repository declaration that cannot be resolved against its model.
    #[error("Repository configuration error: {0}")]
    Configuration(String),

    #[error("Record not found")]
    NotFound,

    /// A synchronization payload item with missing or mistyped keys.
    #[error("Invalid payload: {0}")]
    DataShape(String),

    #[error("Relation `{relation}` cannot be used for {context}")]
    UnsupportedRelationKind {
        relation: String,
        context: &'static str,
    },

    #[error("Unknown attribute `{0}`")]
    UnknownAttribute(String),

    #[error("Invalid value `{value}` for parameter `{key}`")]
    InvalidParameter { key: String, value: String },

    #[error("Object storage error: {0}")]
    ObjectStorageError(String),

    #[error("Internal server error")]
    InternalServerError,
}
