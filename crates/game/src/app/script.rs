use std::fs;
use std::path::{Path, PathBuf};

use grid_engine::GameAction;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum ScriptError {
    #[error("failed to read action script at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid action script{}: {message}", location_suffix(.location))]
    Parse {
        location: Option<String>,
        message: String,
    },
}

fn location_suffix(location: &Option<String>) -> String {
    location
        .as_deref()
        .map(|path| format!(" at {path}"))
        .unwrap_or_default()
}

/// A JSON array of actions, e.g. `["reset", "action2", {"action6": {"x": 3, "y": 9}}]`.
pub(crate) fn parse_script(raw: &str) -> Result<Vec<GameAction>, ScriptError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, Vec<GameAction>>(&mut deserializer).map_err(|error| {
        let path = error.path().to_string();
        let message = error.into_inner().to_string();
        ScriptError::Parse {
            location: (!path.is_empty() && path != ".").then_some(path),
            message,
        }
    })
}

pub(crate) fn load_script(path: &Path) -> Result<Vec<GameAction>, ScriptError> {
    let raw = fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&raw)
}
