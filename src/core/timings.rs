//! Emulated device latency for file-backed tapes
//!
//! Timings live in a small sidecar file of whitespace-separated `key=value`
//! tokens, all values in milliseconds:
//!
//! ```text
//! read=2 write=3 move_left=1 move_right=1 rewind=50
//! ```
//!
//! Short keys `r`, `w`, `ml` and `mr` are accepted as well. Unknown keys and
//! malformed tokens are skipped, and the last occurrence of a key wins.

use crate::error::{Result, TapeError};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Per-operation delays in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimingsConfig {
    pub read: u64,
    pub write: u64,
    pub move_left: u64,
    pub move_right: u64,
    pub rewind: u64,
}

impl TimingsConfig {
    /// Load timings from a sidecar file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TapeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Load timings, writing the defaults first if the sidecar does not exist
    ///
    /// Writing the defaults out keeps subsequent runs reproducible: the file
    /// can be edited in place and picked up on the next run.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::load(path);
        }

        let timings = TimingsConfig::default();
        debug!("Timings config {:?} not found, writing defaults", path);
        timings.save(path)?;
        Ok(timings)
    }

    /// Write the canonical form to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, format!("{}\n", self)).map_err(|source| TapeError::Open {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse the token grammar; never fails
    pub fn parse(text: &str) -> Self {
        let mut timings = TimingsConfig::default();

        for token in text.split_whitespace() {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            let Ok(value) = value.parse::<u64>() else {
                continue;
            };
            match key {
                "r" | "read" => timings.read = value,
                "w" | "write" => timings.write = value,
                "ml" | "move_left" => timings.move_left = value,
                "mr" | "move_right" => timings.move_right = value,
                "rewind" => timings.rewind = value,
                _ => {}
            }
        }

        timings
    }

    /// True when no operation is delayed
    pub fn is_zero(&self) -> bool {
        *self == TimingsConfig::default()
    }

    pub(crate) fn pause(millis: u64) {
        if millis > 0 {
            thread::sleep(Duration::from_millis(millis));
        }
    }
}

impl FromStr for TimingsConfig {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for TimingsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read={} write={} move_left={} move_right={} rewind={}",
            self.read, self.write, self.move_left, self.move_right, self.rewind
        )
    }
}
