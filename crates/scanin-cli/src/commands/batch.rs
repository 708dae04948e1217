//! Batch processing command for multiple OCR result files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use scanin_core::{ExtractionResult, HeuristicInvoiceParser};

use super::process::{build_parser, decode_ocr, extract, format_result, OutputFormat, OutputOptions};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of files read concurrently
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Currency to assume when a document does not show one (USD, EUR, GBP)
    #[arg(long)]
    default_currency: Option<String>,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    extraction: Option<ExtractionResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let parser = build_parser(&config, args.default_currency.as_deref())?;

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("json")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Reads run concurrently; results arrive in input order.
    let mut reads = stream::iter(files)
        .map(|path| async move {
            let payload = tokio::fs::read_to_string(&path).await;
            (path, payload)
        })
        .buffered(args.jobs.max(1));

    let mut results = Vec::new();

    while let Some((path, payload)) = reads.next().await {
        let file_start = Instant::now();
        let outcome = payload
            .map_err(anyhow::Error::from)
            .and_then(|payload| process_payload(&payload, &path, &parser));
        let processing_time_ms = file_start.elapsed().as_millis() as u64;

        match outcome {
            Ok(extraction) => results.push(ProcessResult {
                path,
                extraction: Some(extraction),
                error: None,
                processing_time_ms,
            }),
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        extraction: None,
                        error: Some(error_msg),
                        processing_time_ms,
                    });
                } else {
                    overall_pb.abandon();
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let options = OutputOptions {
        format: args.format,
        include_raw_text: config.output.include_raw_text,
        pretty: config.output.pretty,
    };

    let successful: Vec<_> = results.iter().filter(|r| r.extraction.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        for result in &successful {
            if let Some(extraction) = &result.extraction {
                let output_path = output_path(output_dir, &result.path, args.format);
                fs::write(&output_path, format_result(extraction, options)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_payload(
    payload: &str,
    path: &Path,
    parser: &HeuristicInvoiceParser,
) -> anyhow::Result<ExtractionResult> {
    let ocr = decode_ocr(payload)?;
    Ok(extract(parser, &ocr, path))
}

fn output_path(output_dir: &Path, input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    output_dir.join(format!("{}.{}", stem, format.extension()))
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "vendor_name",
        "invoice_number",
        "date",
        "total_amount",
        "currency",
        "warnings",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(extraction) = &result.extraction {
            let record = &extraction.record;
            wtr.write_record([
                filename,
                "success",
                &record.vendor_name,
                &record.invoice_number,
                &record.date,
                &record.total_amount.to_string(),
                record.currency.code(),
                &extraction.warnings.len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_stem_and_format() {
        let path = output_path(Path::new("out"), Path::new("scans/acme.json"), OutputFormat::Text);
        assert_eq!(path, PathBuf::from("out/acme.txt"));
    }

    #[test]
    fn test_summary_marks_failures() {
        let dir = tempfile::tempdir().unwrap();
        let summary = dir.path().join("summary.csv");
        let results = vec![ProcessResult {
            path: PathBuf::from("broken.json"),
            extraction: None,
            error: Some("bad payload".to_string()),
            processing_time_ms: 1,
        }];

        write_summary(&summary, &results).unwrap();
        let content = fs::read_to_string(&summary).unwrap();

        assert!(content.starts_with("filename,status,vendor_name"));
        assert!(content.contains("broken.json,error,,,,,,,1,bad payload"));
    }
}
