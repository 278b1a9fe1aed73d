pub mod table;
pub mod etl;
pub mod merge;
pub mod preview;
pub mod config;
pub mod args;
pub mod logging;

pub use config::MergeConfig;
pub use args::{Cli, Commands};
pub use table::Table;
pub use etl::{load_and_rename, ETLLoader, MappingVersion, ModuleMappings, RenameMapping};
pub use merge::{combine_and_save, inner_join, KeyMatch, MergeOutcome, MergeReport, Merger, JOIN_KEYS};

#[derive(Debug, PartialEq)]
pub enum MergeError {
    NotFound(String),
    Decode(String),
    Schema(String),
    Write(String),
    Config(String),
}

impl std::fmt::Display for MergeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeError::NotFound(path) => write!(f, "File not found: {}", path),
            MergeError::Decode(msg) => write!(f, "Decode error: {}", msg),
            MergeError::Schema(msg) => write!(f, "Schema error: {}", msg),
            MergeError::Write(msg) => write!(f, "Write error: {}", msg),
            MergeError::Config(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for MergeError {

}

// Result type for load/merge operations
pub type MergeResult<T> = Result<T, MergeError>;
