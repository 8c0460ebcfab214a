use crate::index::inputs::map_file;
use crate::index::phi::Phi;
use crate::index::stpd_array::StpdArray;
use crate::index::stpd_index::StpdIndex;
use crate::index::types::*;
use crate::text::{Oracle, TextOracle};
use crate::utils::encoding::{Persist, read_u32_le, read_u64_le};
use anyhow::{Context, Result, bail};
use std::fs::File;
use std::path::Path;

/// Loads index files written by [`IndexWriter`](crate::index::IndexWriter)
pub struct IndexReader;

impl IndexReader {
    /// Map and decode an index file
    pub fn open(path: &Path) -> Result<StpdIndex> {
        let mmap = map_file(path)?;
        let header = Self::read_header(&mmap).with_context(|| format!("Invalid index {}", path.display()))?;

        let mut body = &mmap[IndexHeader::SIZE..];
        let oracle = Oracle::read_from(&mut body).context("Failed to read text oracle")?;
        let array = StpdArray::read_from(&mut body).context("Failed to read sample array")?;
        let phi = Phi::read_from(&mut body).context("Failed to read phi")?;
        if !body.is_empty() {
            bail!("{} trailing bytes after the phi section of {}", body.len(), path.display());
        }

        if header.text_len != oracle.len() as u64
            || header.sample_count != array.len() as u64
            || header.flags != array.sampling().tag()
        {
            bail!("index header of {} does not match its sections", path.display());
        }
        StpdIndex::from_parts(oracle, array, phi)
    }

    /// Decode and check the fixed-size header
    pub fn read_header(bytes: &[u8]) -> Result<IndexHeader> {
        if bytes.len() < IndexHeader::SIZE {
            bail!("file is {} bytes, shorter than the index header", bytes.len());
        }
        let mut bytes = &bytes[..IndexHeader::SIZE];
        let header = IndexHeader {
            magic: read_u32_le(&mut bytes)?,
            version: read_u32_le(&mut bytes)?,
            flags: read_u32_le(&mut bytes)?,
            text_len: read_u64_le(&mut bytes)?,
            sample_count: read_u64_le(&mut bytes)?,
        };
        if header.magic != INDEX_MAGIC {
            bail!("bad magic {:#010x}, not an STPD index", header.magic);
        }
        if header.version != INDEX_VERSION {
            bail!(
                "index version {} is not supported (expected {})",
                header.version,
                INDEX_VERSION
            );
        }
        Ok(header)
    }

    /// Read the metadata sidecar of an index file
    pub fn read_meta(index_path: &Path) -> Result<IndexMeta> {
        let meta_path = IndexMeta::path_for(index_path);
        let file = File::open(&meta_path).with_context(|| format!("Failed to open {}", meta_path.display()))?;
        let meta = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to parse {}", meta_path.display()))?;
        Ok(meta)
    }
}
