use std::{fs, path::Path};

use path_defence_core::tuning::Tuning;
use thiserror::Error;

/// Errors raised while loading a tuning overlay file.
#[derive(Debug, Error)]
pub(crate) enum TuningOverlayError {
    /// The overlay file could not be read from disk.
    #[error("could not read tuning file '{path}'")]
    Io {
        /// Path provided on the command line.
        path: String,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The overlay file was not valid TOML for the tuning schema.
    #[error("could not parse tuning file '{path}'")]
    Parse {
        /// Path provided on the command line.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Loads tuning from a TOML file, falling back to defaults for absent keys.
pub(crate) fn load_tuning(path: &Path) -> Result<Tuning, TuningOverlayError> {
    let text = fs::read_to_string(path).map_err(|source| TuningOverlayError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| TuningOverlayError::Parse {
        path: path.display().to_string(),
        source,
    })
}
