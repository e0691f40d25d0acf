use flowstacks_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("catalog error in {file}: {message}")]
    Catalog { file: String, message: String },

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    #[error("article not found: {0}")]
    ArticleNotFound(String),

    #[error("invalid input: {0}")]
    Invalid(String),
}
