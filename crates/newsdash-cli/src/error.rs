use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] newsdash_core::ValidationError),

    #[error(transparent)]
    Load(#[from] newsdash_core::LoadError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Serve(#[from] newsdash_web::ServeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Load(_) => 3,
            Self::Serialization(_) => 4,
            Self::Serve(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
