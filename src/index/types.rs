//! Types shared by index building, persistence and querying.

use crate::text::OracleKind;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text position (0-based offset into the indexed text)
pub type TextPosition = usize;

/// Magic number for index files
pub const INDEX_MAGIC: u32 = 0x44505453; // "STPD" in little-endian

/// Current version of the index format
pub const INDEX_VERSION: u32 = 1;

/// Default length of the packed suffix windows used by the dictionary search
pub const DEFAULT_WINDOW_LEN: usize = 15;

/// Longest window whose 2-bit packing fits a 64-bit key with room to spare
pub const MAX_WINDOW_LEN: usize = 31;

/// Structure answering phi queries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PhiBackend {
    /// Run table with Elias-Fano run ends
    #[default]
    EliasFano,
    /// Run table with a plain rank/select bit vector of run ends
    Dense,
    /// Run ends and run starts in one interleaved Elias-Fano dictionary
    Interleaved,
    /// Move table over the intervals of the phi permutation
    Move,
}

/// How the sample array narrows a binary search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayKind {
    /// One bucket per last symbol
    #[default]
    Buckets,
    /// Elias-Fano dictionary of packed suffix windows with LCS bounds
    Windows,
}

/// Which colex samples the array was built from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SamplingKind {
    /// Colex-smallest occurrences (`.colex_m`)
    #[default]
    #[serde(rename = "colex-m")]
    #[value(name = "colex-m")]
    ColexMin,
    /// Colex-smallest and colex-largest occurrences (`.colex_pm`)
    #[serde(rename = "colex-pm")]
    #[value(name = "colex-pm")]
    ColexMinMax,
}

impl SamplingKind {
    /// Extension of the sample file next to the text
    pub fn extension(self) -> &'static str {
        match self {
            SamplingKind::ColexMin => "colex_m",
            SamplingKind::ColexMinMax => "colex_pm",
        }
    }

    pub(crate) fn tag(self) -> u32 {
        match self {
            SamplingKind::ColexMin => 0,
            SamplingKind::ColexMinMax => 1,
        }
    }

    pub(crate) fn from_tag(tag: u32) -> Result<Self> {
        Ok(match tag {
            0 => SamplingKind::ColexMin,
            1 => SamplingKind::ColexMinMax,
            _ => bail!("unknown sampling tag {}", tag),
        })
    }
}

/// Configuration for index building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Text representation (default: packed)
    pub oracle: OracleKind,
    /// Reference length for RLZ (default: n/8, at least 1024)
    pub rlz_reference_len: Option<usize>,
    /// Sample search strategy (default: buckets)
    pub array: ArrayKind,
    /// Window length for the dictionary search (default: 15)
    pub window_len: usize,
    /// Phi structure (default: Elias-Fano run table)
    pub phi: PhiBackend,
    /// Sample file flavour (default: colex-m)
    pub sampling: SamplingKind,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            oracle: OracleKind::Packed,
            rlz_reference_len: None,
            array: ArrayKind::Buckets,
            window_len: DEFAULT_WINDOW_LEN,
            phi: PhiBackend::EliasFano,
            sampling: SamplingKind::ColexMin,
        }
    }
}

impl IndexConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_WINDOW_LEN).contains(&self.window_len) {
            bail!(
                "window length {} must be between 1 and {}",
                self.window_len,
                MAX_WINDOW_LEN
            );
        }
        Ok(())
    }
}

/// Index metadata stored in `<index>.meta.json`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexMeta {
    /// Index format version
    pub version: u32,
    /// Number of indexed symbols
    pub text_len: u64,
    /// Number of samples in the array
    pub sample_count: u64,
    /// Number of BWT runs (or phi intervals for the move table)
    pub run_count: u64,
    /// Structures the index was built with
    pub config: IndexConfig,
    /// Serialized bytes per section
    pub oracle_bytes: u64,
    pub array_bytes: u64,
    pub phi_bytes: u64,
    /// Total file size including the header
    pub total_bytes: u64,
    /// Unix timestamp of the write
    pub created_at: u64,
}

impl IndexMeta {
    /// Sidecar path for an index file
    pub fn path_for(index_path: &Path) -> std::path::PathBuf {
        let mut name = index_path.as_os_str().to_owned();
        name.push(".meta.json");
        name.into()
    }
}

/// Header at the start of an index file
#[derive(Debug, Clone, Copy)]
pub struct IndexHeader {
    /// Magic number (INDEX_MAGIC)
    pub magic: u32,
    /// Version number
    pub version: u32,
    /// Sampling tag; the sections carry their own tags
    pub flags: u32,
    /// Number of indexed symbols
    pub text_len: u64,
    /// Number of samples
    pub sample_count: u64,
}

impl IndexHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 4 + 8 + 8; // 28 bytes

    pub fn new(text_len: u64, sample_count: u64, sampling: SamplingKind) -> Self {
        Self {
            magic: INDEX_MAGIC,
            version: INDEX_VERSION,
            flags: sampling.tag(),
            text_len,
            sample_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let config: IndexConfig = serde_json::from_str(r#"{"phi": "move", "sampling": "colex-pm"}"#).unwrap();
        assert_eq!(config.phi, PhiBackend::Move);
        assert_eq!(config.sampling, SamplingKind::ColexMinMax);
        assert_eq!(config.window_len, DEFAULT_WINDOW_LEN);
        assert_eq!(config.oracle, OracleKind::Packed);
    }

    #[test]
    fn test_config_rejects_bad_window() {
        let config = IndexConfig {
            window_len: 40,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stpd.json");
        std::fs::write(&path, r#"{"array": "windows", "window_len": 8, "oracle": "rlz"}"#).unwrap();
        let config = IndexConfig::load(&path).unwrap();
        assert_eq!(config.array, ArrayKind::Windows);
        assert_eq!(config.window_len, 8);
        assert_eq!(config.oracle, OracleKind::Rlz);
    }

    #[test]
    fn test_meta_path() {
        let path = IndexMeta::path_for(Path::new("/tmp/chr21.stpd"));
        assert_eq!(path, Path::new("/tmp/chr21.stpd.meta.json"));
    }
}
