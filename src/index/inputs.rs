//! Collaborator files consumed by the index build.
//!
//! For a text `<base>`:
//! - `<base>` - ASCII DNA text
//! - `<base>.rbwt` - one byte per prefix-array row, the symbol following the prefix
//! - `<base>.pa` - 5-byte prefix lengths in colex order, row 0 being the empty prefix
//! - `<base>.colex_m` / `<base>.colex_pm` - 5-byte sample positions in colex order
//! - `<base>.lcs` - optional 5-byte longest common suffix of each row with the previous one

use super::types::SamplingKind;
use crate::utils::encoding::{check_u40_stream, iter_u40, read_u40_at};
use anyhow::{Context, Result, bail};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Paths of the files an index is built from
#[derive(Debug, Clone)]
pub struct BuildInputs {
    pub text: PathBuf,
    pub samples: PathBuf,
    pub rbwt: PathBuf,
    pub pa: PathBuf,
    pub lcs: Option<PathBuf>,
}

impl BuildInputs {
    /// Standard file names around `base`. The `.lcs` file is used only if present.
    pub fn from_base(base: &Path, sampling: SamplingKind) -> Self {
        let lcs = with_extension(base, "lcs");
        Self {
            text: base.to_path_buf(),
            samples: with_extension(base, sampling.extension()),
            rbwt: with_extension(base, "rbwt"),
            pa: with_extension(base, "pa"),
            lcs: lcs.exists().then_some(lcs),
        }
    }
}

pub(crate) fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    name.into()
}

/// Memory-map a whole file
pub(crate) fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("Failed to map {}", path.display()))?;
    Ok(mmap)
}

/// All build inputs, memory-mapped
pub(crate) struct MappedInputs {
    pub text: Mmap,
    pub samples: Mmap,
    pub rbwt: Mmap,
    pub pa: Mmap,
    pub lcs: Option<Mmap>,
}

impl MappedInputs {
    pub fn open(inputs: &BuildInputs) -> Result<Self> {
        let mapped = Self {
            text: map_file(&inputs.text)?,
            samples: map_file(&inputs.samples)?,
            rbwt: map_file(&inputs.rbwt)?,
            pa: map_file(&inputs.pa)?,
            lcs: inputs.lcs.as_deref().map(map_file).transpose()?,
        };
        check_u40_stream(&mapped.samples, "sample file")?;
        Ok(mapped)
    }

    /// Sample positions in stored order
    pub fn samples(&self) -> impl ExactSizeIterator<Item = u64> + '_ {
        iter_u40(&self.samples)
    }
}

/// Validated view over the prefix array and its reversed BWT
#[derive(Clone, Copy)]
pub struct PrefixArrayView<'a> {
    rbwt: &'a [u8],
    pa: &'a [u8],
    lcs: Option<&'a [u8]>,
    text_len: usize,
}

impl<'a> PrefixArrayView<'a> {
    /// Check that both files hold `text_len + 1` rows and that every
    /// non-empty row is a prefix length in `1..=text_len`
    pub fn new(rbwt: &'a [u8], pa: &'a [u8], lcs: Option<&'a [u8]>, text_len: usize) -> Result<Self> {
        let rows = check_u40_stream(pa, "prefix array")?;
        if rows != text_len + 1 || rbwt.len() != text_len + 1 {
            bail!(
                "prefix array has {} rows and reversed BWT {} bytes, text of {} symbols needs {}",
                rows,
                rbwt.len(),
                text_len,
                text_len + 1
            );
        }
        if let Some(lcs) = lcs {
            let lcs_rows = check_u40_stream(lcs, "LCS file")?;
            if lcs_rows != rows {
                bail!("LCS file has {} rows, prefix array {}", lcs_rows, rows);
            }
        }
        if let Some((row, len)) = iter_u40(pa)
            .enumerate()
            .skip(1)
            .find(|&(_, len)| len == 0 || len > text_len as u64)
        {
            bail!("prefix array row {} holds {}, outside 1..={}", row, len, text_len);
        }
        Ok(Self {
            rbwt,
            pa,
            lcs,
            text_len,
        })
    }

    #[inline]
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Text position where the prefix of row `k >= 1` ends
    #[inline]
    pub fn end(&self, k: usize) -> u64 {
        read_u40_at(self.pa, k) - 1
    }

    /// Reversed-BWT symbol of row `k`
    #[inline]
    pub fn bwt(&self, k: usize) -> u8 {
        self.rbwt[k]
    }

    /// Stored LCS of row `k` with row `k - 1`, when an LCS file was supplied
    #[inline]
    pub fn lcs(&self, k: usize) -> Option<u64> {
        self.lcs.map(|lcs| read_u40_at(lcs, k))
    }
}
