use std::path::{Path, PathBuf};

use anyhow::Context as _;
use payload_marshal::{Payload, PayloadFormat};
use tracing::debug;

fn file_extension(format: PayloadFormat) -> &'static str {
    match format {
        PayloadFormat::Binary => "pb",
        PayloadFormat::Json => "json",
    }
}

/// Writes each payload to its own file in `dir`, creating the directory if necessary.
///
/// Files are named after the payload's position, starting at zero: `payload-0.json`, `payload-1.json`, and so on.
/// Returns the paths written, in payload order.
pub fn write_payloads(dir: &Path, payloads: &[Payload]) -> Result<Vec<PathBuf>, anyhow::Error> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory '{}'.", dir.display()))?;

    let mut paths = Vec::with_capacity(payloads.len());
    for (n, payload) in payloads.iter().enumerate() {
        let path = dir.join(format!("payload-{}.{}", n, file_extension(payload.format())));
        std::fs::write(&path, payload.data())
            .with_context(|| format!("Failed to write payload to '{}'.", path.display()))?;

        debug!(
            path = %path.display(),
            records = ?payload.records(),
            size = payload.size(),
            "Wrote payload."
        );
        paths.push(path);
    }

    Ok(paths)
}
