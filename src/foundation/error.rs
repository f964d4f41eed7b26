pub type DialResult<T> = Result<T, DialError>;

#[derive(thiserror::Error, Debug)]
pub enum DialError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("color error: {0}")]
    Color(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("text error: {0}")]
    Text(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DialError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn color(msg: impl Into<String>) -> Self {
        Self::Color(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn text(msg: impl Into<String>) -> Self {
        Self::Text(msg.into())
    }
}
