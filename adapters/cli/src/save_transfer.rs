#![allow(clippy::missing_errors_doc)]

use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use path_defence_core::{Difficulty, SaveSnapshot, SavedTower};
use serde::{Deserialize, Serialize};

const SNAPSHOT_DOMAIN: &str = "pathdef";
const SNAPSHOT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded snapshot payload.
pub(crate) const SNAPSHOT_HEADER: &str = "pathdef:v1";
/// Delimiter used to separate the prefix, wave marker and payload.
const FIELD_DELIMITER: char = ':';

/// Single-line save code wrapping a session snapshot for clipboard transfer.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SaveTransfer {
    /// Session snapshot carried by the code.
    pub snapshot: SaveSnapshot,
}

impl SaveTransfer {
    /// Encodes the snapshot into a single-line string suitable for clipboard transfer.
    #[must_use]
    pub(crate) fn encode(&self) -> String {
        let payload = SerializableSnapshot {
            gold: self.snapshot.gold,
            lives: self.snapshot.lives,
            score: self.snapshot.score,
            map_index: self.snapshot.map_index,
            difficulty: self.snapshot.difficulty,
            towers: self.snapshot.towers.clone(),
        };
        let json = serde_json::to_vec(&payload).expect("save snapshot serialization never fails");
        let encoded = STANDARD_NO_PAD.encode(json);
        format!("{SNAPSHOT_HEADER}:w{}:{encoded}", self.snapshot.wave)
    }

    /// Decodes a save code from the provided string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, SaveTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(SaveTransferError::EmptyPayload);
        }

        let mut parts = trimmed.split(FIELD_DELIMITER);
        let domain = parts.next().ok_or(SaveTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(SaveTransferError::MissingVersion)?;
        let wave = parts.next().ok_or(SaveTransferError::MissingWave)?;
        let payload = parts.next().ok_or(SaveTransferError::MissingPayload)?;

        if domain != SNAPSHOT_DOMAIN {
            return Err(SaveTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != SNAPSHOT_VERSION {
            return Err(SaveTransferError::UnsupportedVersion(version.to_owned()));
        }

        let wave = parse_wave(wave)?;
        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(SaveTransferError::InvalidEncoding)?;
        let decoded: SerializableSnapshot =
            serde_json::from_slice(&bytes).map_err(SaveTransferError::InvalidPayload)?;

        Ok(Self {
            snapshot: SaveSnapshot {
                gold: decoded.gold,
                lives: decoded.lives,
                wave,
                score: decoded.score,
                map_index: decoded.map_index,
                difficulty: decoded.difficulty,
                towers: decoded.towers,
            },
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableSnapshot {
    gold: u32,
    lives: u32,
    score: u32,
    map_index: u32,
    difficulty: Difficulty,
    towers: Vec<SavedTower>,
}

/// Errors that can occur while decoding save transfer strings.
#[derive(Debug)]
pub(crate) enum SaveTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing from the encoded snapshot.
    MissingPrefix,
    /// The encoded snapshot did not contain a version segment.
    MissingVersion,
    /// The encoded snapshot did not include the wave marker.
    MissingWave,
    /// The encoded snapshot did not include the payload segment.
    MissingPayload,
    /// The encoded snapshot used an unexpected prefix segment.
    InvalidPrefix(String),
    /// The encoded snapshot used an unsupported version identifier.
    UnsupportedVersion(String),
    /// The wave marker could not be parsed from the encoded snapshot.
    InvalidWave(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for SaveTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "save code was empty"),
            Self::MissingPrefix => write!(f, "save code is missing the prefix"),
            Self::MissingVersion => write!(f, "save code is missing the version"),
            Self::MissingWave => write!(f, "save code is missing the wave marker"),
            Self::MissingPayload => write!(f, "save code is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "save prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "save version '{version}' is not supported")
            }
            Self::InvalidWave(wave) => write!(f, "could not parse wave marker '{wave}'"),
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode save payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse save payload: {error}")
            }
        }
    }
}

impl Error for SaveTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}

fn parse_wave(marker: &str) -> Result<u32, SaveTransferError> {
    let digits = marker
        .strip_prefix('w')
        .ok_or_else(|| SaveTransferError::InvalidWave(marker.to_owned()))?;
    digits
        .parse::<u32>()
        .map_err(|_| SaveTransferError::InvalidWave(marker.to_owned()))
}
