//! Export validated redirections as a two-column CSV.
//!
//! The output has no header row so it can be fed straight back into the
//! Redirection plugin's importer.

use anyhow::Result;
use redirection_core::models::CandidatePair;
use std::io::Write;
use std::path::Path;

/// Write pairs as `before,after` records.
pub fn write_pairs<W: Write>(out: W, pairs: &[CandidatePair]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);
    for pair in pairs {
        writer.write_record([pair.before.as_str(), pair.after.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Export pairs to `output`, or to stdout when `output` is `-`.
pub fn export_pairs(output: &Path, pairs: &[CandidatePair]) -> Result<()> {
    if output.as_os_str() == "-" {
        let stdout = std::io::stdout();
        return write_pairs(stdout.lock(), pairs);
    }

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(output)?;
    write_pairs(file, pairs)?;
    eprintln!(
        "Exported {} redirection{} to {}",
        pairs.len(),
        if pairs.len() == 1 { "" } else { "s" },
        output.display()
    );
    Ok(())
}
