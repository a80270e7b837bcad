use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::Context as _;

use crate::sample::{Sample, SampleBatch};

/// Reads a batch of samples from a JSON Lines file, with one sample per line.
///
/// Blank lines are skipped.
pub fn read_samples_file(path: &Path) -> Result<SampleBatch, anyhow::Error> {
    let file = File::open(path).with_context(|| format!("Failed to open input file '{}'.", path.display()))?;
    read_samples(BufReader::new(file))
}

fn read_samples<R: BufRead>(reader: R) -> Result<SampleBatch, anyhow::Error> {
    let mut samples = Vec::new();
    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {} of input.", line_idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }

        let sample = serde_json::from_str::<Sample>(&line)
            .with_context(|| format!("Invalid sample on line {} of input.", line_idx + 1))?;
        samples.push(sample);
    }

    Ok(SampleBatch::new(samples))
}
