//! Zip archive of a crawler's output directory.

use crate::error::Result;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::{debug, info, instrument};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Zip every regular file directly inside `dir` into `zip_path`.
///
/// Entries use bare file names; sub-directories are not descended into.
/// Returns the number of files written.
#[instrument(level = "info", skip_all, fields(dir = %dir.display(), zip = %zip_path.display()))]
pub fn zip_output(dir: &Path, zip_path: &Path) -> Result<usize> {
    let mut entries = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();
    entries.sort();

    let mut zip = ZipWriter::new(File::create(zip_path)?);
    let options = SimpleFileOptions::default();
    let mut buffer = Vec::new();

    for path in &entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        buffer.clear();
        File::open(path)?.read_to_end(&mut buffer)?;
        zip.start_file(name, options)?;
        zip.write_all(&buffer)?;
        debug!(file = %name, bytes = buffer.len(), "Added to archive");
    }
    zip.finish()?;

    info!(files = entries.len(), "Output files zipped successfully.");
    Ok(entries.len())
}
