use std::path::PathBuf;

use serde::Deserialize;

pub const KIB: usize = 1024;
pub const MIB: usize = 1024 * KIB;

pub const DEFAULT_BUFFER_SIZE: usize = 100 * MIB;
pub const DEFAULT_FLUSH_THRESHOLD: usize = 80 * MIB;
pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 10;
pub const DEFAULT_TMP_DIR: &str = "/tmp/";

/// Engine sizing, loaded from a TOML file or defaulted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Arena capacity in bytes.
    pub buffer_size: usize,
    /// Used bytes at or above this trigger a non-forced drain.
    pub flush_threshold: usize,
    /// Longest the flush worker sleeps between drain attempts.
    pub flush_interval_ms: u64,
    /// Prefix for auto-named cache files.
    pub tmp_dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL_MS,
            tmp_dir: PathBuf::from(DEFAULT_TMP_DIR),
        }
    }
}

impl CacheConfig {
    /// Default cache file path for a producer process, unique per
    /// parent/child pid pair.
    pub fn storage_filename(&self, parent_pid: u32, pid: u32) -> PathBuf {
        self.tmp_dir
            .join(format!("buffered_storage_{parent_pid}_{pid}.bin"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_constants() {
        let config = CacheConfig::default();
        assert_eq!(config.buffer_size, 100 * MIB);
        assert_eq!(config.flush_threshold, 80 * MIB);
        assert_eq!(config.flush_interval_ms, 10);
        assert_eq!(config.tmp_dir, PathBuf::from("/tmp/"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: CacheConfig =
            toml::from_str("buffer_size = 1048576\nflush_threshold = 524288\n")
                .expect("parse config");
        assert_eq!(config.buffer_size, MIB);
        assert_eq!(config.flush_threshold, 512 * KIB);
        assert_eq!(config.flush_interval_ms, DEFAULT_FLUSH_INTERVAL_MS);
    }

    #[test]
    fn storage_filename_shape() {
        let config = CacheConfig::default();
        assert_eq!(
            config.storage_filename(17, 42),
            PathBuf::from("/tmp/buffered_storage_17_42.bin")
        );
    }
}
