//! Splits a file of metric samples into size-bounded payloads, writing each payload to disk.
//!
//! Samples are read from a JSON Lines file, encoded as either JSON or Protocol Buffers, and divided into as many
//! payloads as needed for each to stay within the configured size limit.

#![deny(missing_docs)]

use std::time::Instant;

use clap::Parser as _;
use payload_marshal::{JsonPayloadBuilder, Payload};
use tracing::{error, info};

mod cli;
use self::cli::Cli;

mod config;
use self::config::{Config, Strategy};

mod input;
use self::input::read_samples_file;

mod logging;
use self::logging::initialize_logging;

mod output;
use self::output::write_payloads;

mod sample;
use self::sample::SampleBatch;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = initialize_logging(cli.log_level(), cli.log_format_json) {
        eprintln!("FATAL: {:?}", e);
        std::process::exit(1);
    }

    match run(cli) {
        Ok(()) => info!("payload-splitter stopped."),
        Err(e) => {
            error!("{:?}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<(), anyhow::Error> {
    let started = Instant::now();
    info!("payload-splitter starting...");

    let mut config = Config::load(cli.config_file.as_deref())?;
    config.apply_overrides(&cli);
    config.validate()?;

    let batch = read_samples_file(&cli.input)?;
    info!(
        input = %cli.input.display(),
        samples = batch.samples().len(),
        format = %config.payload_format,
        limit = %config.payload_size_limit,
        strategy = ?config.strategy,
        "Loaded samples."
    );

    let payloads = build_payloads(&config, &batch)?;
    let paths = write_payloads(&cli.output, &payloads)?;

    let total_bytes = payloads.iter().map(Payload::size).sum::<usize>();
    info!(
        payloads = paths.len(),
        total_bytes,
        output = %cli.output.display(),
        elapsed = ?started.elapsed(),
        "Wrote payloads."
    );

    Ok(())
}

fn build_payloads(config: &Config, batch: &SampleBatch) -> Result<Vec<Payload>, anyhow::Error> {
    let limit = config.payload_size_limit()?;

    let payloads = match config.strategy {
        Strategy::Split => {
            let producer = config.splitter.build_producer()?;
            producer.produce(batch, config.payload_format, limit)?
        }
        Strategy::Greedy => {
            let mut builder = JsonPayloadBuilder::new();
            builder.with_max_records_per_payload(config.splitter.max_records_per_payload);
            builder.build(batch, limit)?
        }
    };

    Ok(payloads)
}

#[cfg(test)]
mod tests {
    use bytesize::ByteSize;
    use payload_marshal::{PayloadFormat, SplitterConfiguration};

    use super::*;
    use crate::sample::Sample;

    fn config(format: PayloadFormat, limit: u64, strategy: Strategy) -> Config {
        Config {
            payload_format: format,
            payload_size_limit: ByteSize::b(limit),
            strategy,
            splitter: SplitterConfiguration::default(),
        }
    }

    fn batch(count: usize) -> SampleBatch {
        SampleBatch::new(
            (0..count)
                .map(|i| Sample {
                    metric: "system.cpu.user".to_string(),
                    value: i as f64 * 0.5,
                    timestamp: 1700000000 + i as i64,
                    tags: vec![format!("core:{}", i)],
                    host: Some("web-1".to_string()),
                })
                .collect(),
        )
    }

    fn assert_complete_and_bounded(payloads: &[Payload], count: usize, limit: usize) {
        let mut next = 0;
        for payload in payloads {
            assert_eq!(payload.records().start, next);
            assert!(payload.size() <= limit);
            next = payload.records().end;
        }
        assert_eq!(next, count);
    }

    #[test]
    fn split_strategy() {
        let batch = batch(50);

        for format in [PayloadFormat::Json, PayloadFormat::Binary] {
            let payloads = build_payloads(&config(format, 1024, Strategy::Split), &batch).unwrap();
            assert!(payloads.len() > 1);
            assert_complete_and_bounded(&payloads, 50, 1024);
        }
    }

    #[test]
    fn greedy_strategy() {
        let batch = batch(50);

        let greedy = build_payloads(&config(PayloadFormat::Json, 1024, Strategy::Greedy), &batch).unwrap();
        assert_complete_and_bounded(&greedy, 50, 1024);

        // Greedy packing never needs more payloads than splitting does.
        let split = build_payloads(&config(PayloadFormat::Json, 1024, Strategy::Split), &batch).unwrap();
        assert!(greedy.len() <= split.len());
    }

    #[test]
    fn oversized_sample() {
        let batch = batch(3);

        let error = build_payloads(&config(PayloadFormat::Json, 32, Strategy::Split), &batch).unwrap_err();
        assert!(error.to_string().contains("payload splitting failed"));
    }
}
