use std::path::PathBuf;

use concilium_core::SpawnError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("\"{}\" does not exist.", .0.display())]
    NotFound(PathBuf),

    #[error("\"{}\" is not a directory.", .0.display())]
    NotADirectory(PathBuf),

    #[error(
        "Could not find packaged binary at: {}\nRun \"npm run build\" first, or use \"npm start\" for development.",
        .0.display()
    )]
    MissingBinary(PathBuf),

    #[error("Failed to start {}: {source}", .program.display())]
    Start {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Agent(#[from] SpawnError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LaunchError>;
