//! Batch locate over a FASTA file of patterns.
//!
//! Every record is located independently on the rayon pool. Results are
//! written in input order to `<patterns>.occs`: the record's header line,
//! then the start positions, each followed by a space, on one line.

use crate::index::stpd_index::StpdIndex;
use crate::index::types::TextPosition;
use crate::utils::progress::Progress;
use anyhow::{Context, Result, bail};
use memchr::memchr_iter;
use rayon::prelude::*;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// One FASTA record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// Header line including the leading `>`
    pub header: Vec<u8>,
    /// Sequence lines joined together
    pub sequence: Vec<u8>,
}

/// Totals of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub patterns: usize,
    pub symbols: usize,
    pub occurrences: usize,
    /// Time spent locating, excluding parsing and output
    pub elapsed: Duration,
    pub output: PathBuf,
}

impl BatchSummary {
    pub fn per_pattern(&self) -> Duration {
        average(self.elapsed, self.patterns)
    }

    pub fn per_symbol(&self) -> Duration {
        average(self.elapsed, self.symbols)
    }
}

/// `total / count`, zero for an empty batch; counts may exceed `u32`
fn average(total: Duration, count: usize) -> Duration {
    match total.as_nanos().checked_div(count as u128) {
        Some(nanos) => Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)),
        None => Duration::ZERO,
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patterns:             {}", self.patterns)?;
        writeln!(f, "Symbols:              {}", self.symbols)?;
        writeln!(f, "Occurrences:          {}", self.occurrences)?;
        writeln!(f, "Elapsed:              {:.3} sec", self.elapsed.as_secs_f64())?;
        writeln!(
            f,
            "Per pattern:          {:.4} ms",
            self.per_pattern().as_secs_f64() * 1e3
        )?;
        write!(
            f,
            "Per symbol:           {:.4} us",
            self.per_symbol().as_secs_f64() * 1e6
        )
    }
}

/// Split FASTA text into records. Blank lines are skipped and `\r\n` line
/// endings are accepted.
pub fn parse_fasta(data: &[u8]) -> Result<Vec<FastaRecord>> {
    let mut records: Vec<FastaRecord> = Vec::new();
    let mut start = 0;
    let ends = memchr_iter(b'\n', data).chain(std::iter::once(data.len()));
    for (number, end) in ends.enumerate() {
        if start > data.len() {
            break;
        }
        let mut line = &data[start..end];
        start = end + 1;
        if let [rest @ .., b'\r'] = line {
            line = rest;
        }
        if line.is_empty() {
            continue;
        }
        if line[0] == b'>' {
            records.push(FastaRecord {
                header: line.to_vec(),
                sequence: Vec::new(),
            });
        } else {
            match records.last_mut() {
                Some(record) => record.sequence.extend_from_slice(line),
                None => bail!("line {} holds sequence data before the first header", number + 1),
            }
        }
    }
    Ok(records)
}

/// Output path for a pattern file
pub fn occs_path(patterns: &Path) -> PathBuf {
    let mut name = patterns.as_os_str().to_owned();
    name.push(".occs");
    name.into()
}

/// Locate every record of `patterns_path`, writing `<patterns_path>.occs`
pub fn locate_fasta(index: &StpdIndex, patterns_path: &Path, cap: Option<usize>) -> Result<BatchSummary> {
    let data = std::fs::read(patterns_path)
        .with_context(|| format!("Failed to read patterns {}", patterns_path.display()))?;
    let records = parse_fasta(&data).with_context(|| format!("Invalid FASTA {}", patterns_path.display()))?;
    info!(patterns = records.len(), "Locating patterns");

    let progress = Progress::patterns(records.len() as u64);
    let results: Vec<Vec<TextPosition>> = records
        .par_iter()
        .map(|record| {
            let occurrences = index.locate_limited(&record.sequence, cap);
            progress.inc();
            occurrences
        })
        .collect();
    let elapsed = progress.finish();

    let output = occs_path(patterns_path);
    let file = File::create(&output).with_context(|| format!("Failed to create {}", output.display()))?;
    let mut file = BufWriter::with_capacity(65536, file);
    for (record, occurrences) in records.iter().zip(&results) {
        file.write_all(&record.header)?;
        file.write_all(b"\n")?;
        for pos in occurrences {
            write!(file, "{} ", pos)?;
        }
        file.write_all(b"\n")?;
    }
    file.flush()?;

    Ok(BatchSummary {
        patterns: records.len(),
        symbols: records.iter().map(|r| r.sequence.len()).sum(),
        occurrences: results.iter().map(Vec::len).sum(),
        elapsed,
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiline_records() {
        let records = parse_fasta(b">p1\nACG\nTA\r\n\n>p2 second\nGG\n>empty\n").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].header, b">p1");
        assert_eq!(records[0].sequence, b"ACGTA");
        assert_eq!(records[1].header, b">p2 second");
        assert_eq!(records[1].sequence, b"GG");
        assert!(records[2].sequence.is_empty());
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let records = parse_fasta(b">p\nACGT").unwrap();
        assert_eq!(records[0].sequence, b"ACGT");
    }

    #[test]
    fn test_parse_rejects_headless_sequence() {
        assert!(parse_fasta(b"ACGT\n>p\nA\n").is_err());
    }

    #[test]
    fn test_summary_rates() {
        let summary = BatchSummary {
            patterns: 4,
            symbols: 40,
            occurrences: 9,
            elapsed: Duration::from_millis(400),
            output: PathBuf::from("p.fa.occs"),
        };
        assert_eq!(summary.per_pattern(), Duration::from_millis(100));
        assert_eq!(summary.per_symbol(), Duration::from_millis(10));
        assert!(summary.to_string().contains("Occurrences:          9"));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_summary_rates_past_u32_counts() {
        let summary = BatchSummary {
            patterns: 0,
            symbols: 5_000_000_000,
            occurrences: 0,
            elapsed: Duration::from_secs(10),
            output: PathBuf::from("p.fa.occs"),
        };
        assert_eq!(summary.per_symbol(), Duration::from_nanos(2));
        assert_eq!(summary.per_pattern(), Duration::ZERO);
    }

    #[test]
    fn test_occs_path() {
        assert_eq!(occs_path(Path::new("/data/reads.fa")), PathBuf::from("/data/reads.fa.occs"));
    }
}
