/// Error surface for the exploration engine. Recoverable situations (a
/// failed single action, a duplicate transition) are modeled through
/// `ExplorationStatus` instead of this type. This enum covers the handful
/// of genuinely exceptional paths.
#[derive(thiserror::Error, Debug)]
pub enum ExplorerError {
    #[error("browser navigation failed: {0}")]
    Navigation(String),

    #[error("DOM snapshot failed: {0}")]
    Snapshot(String),

    #[error("LLM call failed: {0}")]
    Llm(String),

    #[error("graph store write failed: {0}")]
    GraphWrite(String),

    #[error("invalid engine configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
