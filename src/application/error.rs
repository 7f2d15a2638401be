#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("year must start with an integer, got '{0}'")]
    InvalidYear(String),
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}
