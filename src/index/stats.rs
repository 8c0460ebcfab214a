use crate::index::phi::PhiFunction;
use crate::index::reader::IndexReader;
use crate::index::stpd_index::StpdIndex;
use crate::text::Oracle;
use anyhow::Result;
use std::path::Path;

/// Display index statistics
pub fn show_stats(index_path: &Path) -> Result<()> {
    let index = StpdIndex::load(index_path)?;
    let config = index.config();

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Index file:       {}", index_path.display());
    println!("Text length:      {}", index.text_len());
    println!("Samples:          {}", index.array().len());
    println!("Phi runs:         {}", index.phi().run_count());
    if index.text_len() > 0 {
        println!(
            "Samples/symbol:   {:.4}",
            index.array().len() as f64 / index.text_len() as f64
        );
    }

    println!();
    println!("Structures:");
    println!("  {:15} {:?}", "oracle", config.oracle);
    if let Oracle::Rlz(text) = index.oracle() {
        println!("  {:15} {} phrases, {} reference symbols", "", text.phrase_count(), text.reference_len());
    }
    println!("  {:15} {:?}", "array", config.array);
    if let Some(window) = index.array().window() {
        println!("  {:15} window of {} symbols", "", window);
    }
    println!("  {:15} {:?}", "phi", config.phi);
    println!("  {:15} {:?}", "sampling", config.sampling);

    let n = index.text_len();
    println!();
    println!("Space:");
    println!("  {:15} {}", "oracle", format_space(index.oracle().size_in_bytes() as u64, n));
    println!("  {:15} {}", "array", format_space(index.array().size_in_bytes() as u64, n));
    println!("  {:15} {}", "phi", format_space(index.phi().size_in_bytes() as u64, n));
    println!("  {:15} {}", "total", format_space(index.size_in_bytes() as u64, n));
    if let Ok(file) = std::fs::metadata(index_path) {
        println!("  {:15} {}", "on disk", format_space(file.len(), n));
    }

    // Sidecar is optional for stats
    if let Ok(meta) = IndexReader::read_meta(index_path) {
        println!();
        println!("Format version:   {}", meta.version);
        println!("Written at:       {} (unix seconds)", meta.created_at);
    }

    Ok(())
}

/// Size in binary units plus the space it costs per indexed symbol
pub fn format_space(bytes: u64, symbols: usize) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    let mut size = if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        String::new()
    };
    let mut scaled = bytes as f64;
    for unit in UNITS {
        if scaled < 1024.0 {
            break;
        }
        scaled /= 1024.0;
        size = format!("{:.1} {}", scaled, unit);
    }
    if symbols == 0 {
        return size;
    }
    format!("{} ({:.3} bits/symbol)", size, bytes as f64 * 8.0 / symbols as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_space() {
        assert_eq!(format_space(512, 0), "512 B");
        assert_eq!(format_space(512, 4096), "512 B (1.000 bits/symbol)");
        assert_eq!(format_space(3 * 1024 * 1024, 1 << 20), "3.0 MiB (24.000 bits/symbol)");
        assert_eq!(format_space(1536, 48_000), "1.5 KiB (0.256 bits/symbol)");
    }
}
