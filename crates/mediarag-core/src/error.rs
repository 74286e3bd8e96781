use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to scrape article: {0}")]
    Scrape(String),

    #[error("Failed to store article in database: {0}")]
    Persist(String),

    #[error("Failed to process and store content: {0}")]
    Index(String),

    #[error("Failed to perform searches: {0}")]
    Search(String),

    #[error("Failed to generate answer: {0}")]
    Generation(String),

    #[error("Unsupported API choice: {0}")]
    UnsupportedBackend(String),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    /// Fixed, user-facing description of the failing stage.
    pub fn stage_message(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "Invalid configuration",
            Self::Scrape(_) => "Failed to scrape article",
            Self::Persist(_) => "Failed to store article in database",
            Self::Index(_) => "Failed to process and store content",
            Self::Search(_) => "Failed to perform searches",
            Self::Generation(_) | Self::UnsupportedBackend(_) => "Failed to generate answer",
            Self::Operation(_) => "An unexpected error occurred",
        }
    }

    /// Underlying message without the stage prefix.
    pub fn details(&self) -> String {
        match self {
            Self::UnsupportedBackend(choice) => format!("Unsupported API choice: {choice}"),
            Self::InvalidConfig(d)
            | Self::Scrape(d)
            | Self::Persist(d)
            | Self::Index(d)
            | Self::Search(d)
            | Self::Generation(d)
            | Self::Operation(d) => d.clone(),
        }
    }
}

/// Render an adapter error with its full context chain.
pub fn describe(err: &anyhow::Error) -> String {
    format!("{err:#}")
}

pub type Result<T> = std::result::Result<T, Error>;
