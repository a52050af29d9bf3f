use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid UTC offset: {hours} hours")]
    InvalidOffset { hours: i32 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
