#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Best-score persistence for Simon.
//!
//! The record is seven little-endian signed 32-bit integers,
//! `[10, 255, 15, encoded, 15, 255, 10]`. The surrounding sentinels must
//! match exactly on load. `encoded` is the best score shifted left by four
//! bits, or the plain score for files written by the legacy format.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Number of integers in a save record.
pub const RECORD_FIELDS: usize = 7;

/// Size of a save record in bytes.
pub const RECORD_BYTES: usize = RECORD_FIELDS * 4;

const SCORE_FIELD: usize = 3;
const SENTINELS: [(usize, i32); 6] = [(0, 10), (1, 255), (2, 15), (4, 15), (5, 255), (6, 10)];
const SHIFT: u32 = 4;

/// How the best score is stored inside the record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SaveFormat {
    /// Score shifted left by four bits.
    #[default]
    Shifted,
    /// Score stored as-is.
    Legacy,
}

impl SaveFormat {
    fn encode(self, best: u32) -> Result<i32, SaveFileError> {
        let limit = match self {
            Self::Shifted => i32::MAX >> SHIFT,
            Self::Legacy => i32::MAX,
        };
        let value = i32::try_from(best)
            .ok()
            .filter(|value| *value <= limit)
            .ok_or(SaveFileError::ScoreOutOfRange { best })?;
        Ok(match self {
            Self::Shifted => value << SHIFT,
            Self::Legacy => value,
        })
    }

    fn decode(self, encoded: i32) -> Result<u32, SaveFileError> {
        let value = match self {
            Self::Shifted => encoded >> SHIFT,
            Self::Legacy => encoded,
        };
        u32::try_from(value).map_err(|_| SaveFileError::NegativeScore { encoded })
    }
}

/// Errors raised while reading or writing the save record.
#[derive(Debug, Error)]
pub enum SaveFileError {
    /// The file could not be read or written.
    #[error("save file {path} is not accessible")]
    Io {
        /// Location of the save file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The record holds fewer bytes than a full record.
    #[error("save record is truncated: {len} of {RECORD_BYTES} bytes")]
    Truncated {
        /// Bytes actually present.
        len: usize,
    },
    /// A sentinel field does not hold its fixed value.
    #[error("save record field {index} holds {found}, expected {expected}")]
    Corrupt {
        /// Index of the offending field.
        index: usize,
        /// Value found in the record.
        found: i32,
        /// Value the field must hold.
        expected: i32,
    },
    /// The stored score decodes to a negative number.
    #[error("save record score {encoded} decodes to a negative value")]
    NegativeScore {
        /// Raw score field.
        encoded: i32,
    },
    /// The score cannot be represented in the chosen format.
    #[error("best score {best} does not fit in a save record")]
    ScoreOutOfRange {
        /// Score that was rejected.
        best: u32,
    },
    /// Only part of the record reached the file.
    #[error("short write: {written} of {RECORD_BYTES} bytes")]
    ShortWrite {
        /// Bytes accepted by the file.
        written: usize,
    },
}

/// Serialises `best` into a save record.
pub fn encode(best: u32, format: SaveFormat) -> Result<[u8; RECORD_BYTES], SaveFileError> {
    let mut fields = [0_i32; RECORD_FIELDS];
    for (index, value) in SENTINELS {
        fields[index] = value;
    }
    fields[SCORE_FIELD] = format.encode(best)?;

    let mut record = [0_u8; RECORD_BYTES];
    for (chunk, field) in record.chunks_exact_mut(4).zip(fields) {
        chunk.copy_from_slice(&field.to_le_bytes());
    }
    Ok(record)
}

/// Parses a save record, validating every sentinel.
///
/// Bytes beyond the first record are ignored.
pub fn decode(bytes: &[u8], format: SaveFormat) -> Result<u32, SaveFileError> {
    if bytes.len() < RECORD_BYTES {
        return Err(SaveFileError::Truncated { len: bytes.len() });
    }

    let mut fields = [0_i32; RECORD_FIELDS];
    for (field, chunk) in fields.iter_mut().zip(bytes.chunks_exact(4)) {
        let mut raw = [0_u8; 4];
        raw.copy_from_slice(chunk);
        *field = i32::from_le_bytes(raw);
    }

    for (index, expected) in SENTINELS {
        if fields[index] != expected {
            return Err(SaveFileError::Corrupt {
                index,
                found: fields[index],
                expected,
            });
        }
    }
    format.decode(fields[SCORE_FIELD])
}

/// Save record stored at a fixed path.
#[derive(Clone, Debug)]
pub struct SaveFile {
    path: PathBuf,
    format: SaveFormat,
}

impl SaveFile {
    /// Creates a handle for the record at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, format: SaveFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Location of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored best score.
    pub fn load(&self) -> Result<u32, SaveFileError> {
        let bytes = fs::read(&self.path).map_err(|source| self.io_error(source))?;
        decode(&bytes, self.format)
    }

    /// Reads the stored best score, falling back to `fallback` on any fault.
    ///
    /// A missing file is expected on first launch and only noted at info
    /// level; every other fault is logged as a warning.
    #[must_use]
    pub fn load_or(&self, fallback: u32) -> u32 {
        match self.load() {
            Ok(best) => {
                debug!(best, path = %self.path.display(), "loaded best score");
                best
            }
            Err(SaveFileError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "no save file yet");
                fallback
            }
            Err(error) => {
                warn!(%error, path = %self.path.display(), "ignoring unreadable save file");
                fallback
            }
        }
    }

    /// Writes `best` as one record.
    ///
    /// The record is written to a temporary file in the same directory and
    /// moved over the old one, so a failed write leaves the previous record
    /// intact. A short write is reported and not retried.
    pub fn store(&self, best: u32) -> Result<(), SaveFileError> {
        let record = encode(best, self.format)?;
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(directory).map_err(|source| self.io_error(source))?;
        let written = file.write(&record).map_err(|source| self.io_error(source))?;
        if written < record.len() {
            return Err(SaveFileError::ShortWrite { written });
        }
        file.flush().map_err(|source| self.io_error(source))?;
        let _ = file
            .persist(&self.path)
            .map_err(|error| self.io_error(error.error))?;

        debug!(best, path = %self.path.display(), "stored best score");
        Ok(())
    }

    fn io_error(&self, source: io::Error) -> SaveFileError {
        SaveFileError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(record: &[u8]) -> Vec<i32> {
        record
            .chunks_exact(4)
            .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    #[test]
    fn shifted_record_layout() {
        let record = encode(3, SaveFormat::Shifted).expect("encode");
        assert_eq!(fields(&record), vec![10, 255, 15, 48, 15, 255, 10]);
    }

    #[test]
    fn legacy_record_stores_plain_score() {
        let record = encode(3, SaveFormat::Legacy).expect("encode");
        assert_eq!(fields(&record)[SCORE_FIELD], 3);
        assert_eq!(decode(&record, SaveFormat::Legacy).expect("decode"), 3);
    }

    #[test]
    fn largest_shifted_score_survives() {
        let best = (i32::MAX >> SHIFT) as u32;
        let record = encode(best, SaveFormat::Shifted).expect("encode");
        assert_eq!(decode(&record, SaveFormat::Shifted).expect("decode"), best);
        assert!(matches!(
            encode(best + 1, SaveFormat::Shifted),
            Err(SaveFileError::ScoreOutOfRange { .. })
        ));
    }

    #[test]
    fn sentinel_mismatch_is_corrupt() {
        let mut record = encode(7, SaveFormat::Shifted).expect("encode");
        record[20] = 0;
        assert!(matches!(
            decode(&record, SaveFormat::Shifted),
            Err(SaveFileError::Corrupt { index: 5, .. })
        ));
    }

    #[test]
    fn short_record_is_truncated() {
        let record = encode(7, SaveFormat::Shifted).expect("encode");
        assert!(matches!(
            decode(&record[..RECORD_BYTES - 1], SaveFormat::Shifted),
            Err(SaveFileError::Truncated { len }) if len == RECORD_BYTES - 1
        ));
    }

    #[test]
    fn negative_score_is_rejected() {
        let mut record = encode(0, SaveFormat::Legacy).expect("encode");
        record[12..16].copy_from_slice(&(-1_i32).to_le_bytes());
        assert!(matches!(
            decode(&record, SaveFormat::Legacy),
            Err(SaveFileError::NegativeScore { encoded: -1 })
        ));
    }
}
