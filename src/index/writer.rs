use crate::index::phi::PhiFunction;
use crate::index::stpd_index::StpdIndex;
use crate::index::types::*;
use crate::text::TextOracle;
use crate::utils::encoding::Persist;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Writes an index file and its metadata sidecar
pub struct IndexWriter;

impl IndexWriter {
    /// Write `index` to `path`
    ///
    /// Layout: header, then the oracle, array and phi sections, each carrying
    /// its own tag and lengths. `<path>.meta.json` gets the configuration and
    /// section sizes.
    pub fn write(path: &Path, index: &StpdIndex) -> Result<IndexMeta> {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut file = BufWriter::with_capacity(65536, file);

        let header = IndexHeader::new(
            index.text_len() as u64,
            index.array().len() as u64,
            index.array().sampling(),
        );
        file.write_all(&header.magic.to_le_bytes())?;
        file.write_all(&header.version.to_le_bytes())?;
        file.write_all(&header.flags.to_le_bytes())?;
        file.write_all(&header.text_len.to_le_bytes())?;
        file.write_all(&header.sample_count.to_le_bytes())?;

        let oracle_bytes = index.oracle().write_to(&mut file)?;
        let array_bytes = index.array().write_to(&mut file)?;
        let phi_bytes = index.phi().write_to(&mut file)?;
        file.flush()?;
        debug!(oracle_bytes, array_bytes, phi_bytes, "Sections written");

        let meta = IndexMeta {
            version: INDEX_VERSION,
            text_len: index.oracle().len() as u64,
            sample_count: index.array().len() as u64,
            run_count: index.phi().run_count() as u64,
            config: index.config(),
            oracle_bytes,
            array_bytes,
            phi_bytes,
            total_bytes: IndexHeader::SIZE as u64 + oracle_bytes + array_bytes + phi_bytes,
            created_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        };
        Self::write_meta(path, &meta)?;

        info!(path = %path.display(), bytes = meta.total_bytes, "Index written");
        Ok(meta)
    }

    fn write_meta(index_path: &Path, meta: &IndexMeta) -> Result<()> {
        let meta_path = IndexMeta::path_for(index_path);
        let file = File::create(&meta_path).with_context(|| format!("Failed to create {}", meta_path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), meta)?;
        Ok(())
    }
}
