//! Process command - extract fields from a single OCR result.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, warn};

use scanin_core::models::invoice::{Currency, InvoiceRecord};
use scanin_core::{ExtractionResult, HeuristicInvoiceParser, InvoiceParser, OcrResult, ScaninConfig};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// OCR result file (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Currency to assume when the document does not show one (USD, EUR, GBP)
    #[arg(long)]
    default_currency: Option<String>,

    /// Include the concatenated OCR text in the output
    #[arg(long)]
    raw_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for outputs in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Output options shared by `process` and `batch`.
#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub include_raw_text: bool,
    pub pretty: bool,
}

/// JSON shape of a record, optionally with the source text.
#[derive(Serialize)]
struct RecordOutput<'a> {
    #[serde(flatten)]
    record: &'a InvoiceRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw_text: Option<&'a str>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let parser = build_parser(&config, args.default_currency.as_deref())?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );

    pb.set_message("Reading OCR result...");
    let ocr = read_ocr(&args.input)?;

    pb.set_message("Extracting invoice fields...");
    let result = extract(&parser, &ocr, &args.input);

    pb.finish_and_clear();

    if !result.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let options = OutputOptions {
        format: args.format,
        include_raw_text: args.raw_text || config.output.include_raw_text,
        pretty: config.output.pretty,
    };
    let output = format_result(&result, options)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Build a parser from config, with an optional currency override.
pub fn build_parser(
    config: &ScaninConfig,
    default_currency: Option<&str>,
) -> anyhow::Result<HeuristicInvoiceParser> {
    let currency = match default_currency {
        Some(code) => Currency::from_str(code)?,
        None => config.extraction.default_currency,
    };

    Ok(HeuristicInvoiceParser::new()
        .with_default_currency(currency)
        .with_position_sort(config.extraction.sort_by_position))
}

/// Read and decode an OCR result file.
pub fn read_ocr(path: &Path) -> anyhow::Result<OcrResult> {
    let payload = fs::read_to_string(path)?;
    decode_ocr(&payload)
}

/// Decode an OCR result payload.
pub fn decode_ocr(payload: &str) -> anyhow::Result<OcrResult> {
    Ok(OcrResult::from_json(payload)?)
}

/// Run the parser over a decoded payload. A payload without usable lines
/// still yields the all-unknown record.
pub fn extract(parser: &HeuristicInvoiceParser, ocr: &OcrResult, source: &Path) -> ExtractionResult {
    let lines = ocr.require_text_lines().unwrap_or_else(|e| {
        warn!("{}: {}", source.display(), e);
        Vec::new()
    });
    parser.parse(&lines)
}

/// Render an extraction result in the requested format.
pub fn format_result(result: &ExtractionResult, options: OutputOptions) -> anyhow::Result<String> {
    let raw_text = options.include_raw_text.then_some(result.raw_text.as_str());

    match options.format {
        OutputFormat::Json => {
            let output = RecordOutput {
                record: &result.record,
                raw_text,
            };
            if options.pretty {
                Ok(serde_json::to_string_pretty(&output)?)
            } else {
                Ok(serde_json::to_string(&output)?)
            }
        }
        OutputFormat::Csv => format_csv(&result.record, raw_text),
        OutputFormat::Text => Ok(format_text(&result.record, raw_text)),
    }
}

fn format_csv(record: &InvoiceRecord, raw_text: Option<&str>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec![
        "vendor_name",
        "invoice_number",
        "date",
        "total_amount",
        "currency",
    ];
    if raw_text.is_some() {
        header.push("raw_text");
    }
    wtr.write_record(&header)?;

    let mut row = vec![
        record.vendor_name.clone(),
        record.invoice_number.clone(),
        record.date.clone(),
        record.total_amount.to_string(),
        record.currency.to_string(),
    ];
    if let Some(text) = raw_text {
        row.push(text.to_string());
    }
    wtr.write_record(&row)?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(record: &InvoiceRecord, raw_text: Option<&str>) -> String {
    let mut output = String::new();

    output.push_str(&format!("Vendor:  {}\n", record.vendor_name));
    output.push_str(&format!("Invoice: {}\n", record.invoice_number));
    match record.issue_date() {
        Some(date) => output.push_str(&format!("Date:    {} ({})\n", record.date, date)),
        None => output.push_str(&format!("Date:    {}\n", record.date)),
    }
    output.push_str(&format!(
        "Total:   {}{} {}\n",
        record.currency.symbol(),
        record.total_amount,
        record.currency
    ));

    if let Some(text) = raw_text {
        output.push_str("\nRaw text:\n");
        output.push_str(text);
        output.push('\n');
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanin_core::TextLine;

    fn acme_result() -> ExtractionResult {
        let lines = vec![
            TextLine::new("INVOICE #4521", 600, 50, 120, 20),
            TextLine::new("Acme Corp", 50, 40, 120, 20),
            TextLine::new("www.acmecorp.com", 50, 600, 120, 20),
            TextLine::new("Total: €1.234,50", 50, 900, 120, 20),
        ];
        HeuristicInvoiceParser::new().parse(&lines)
    }

    fn options(format: OutputFormat, include_raw_text: bool) -> OutputOptions {
        OutputOptions {
            format,
            include_raw_text,
            pretty: false,
        }
    }

    #[test]
    fn test_json_output_is_flat_record() {
        let output = format_result(&acme_result(), options(OutputFormat::Json, false)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["vendor_name"], "Acme Corp");
        assert_eq!(value["invoice_number"], "4521");
        assert_eq!(value["currency"], "EUR");
        assert!(value.get("raw_text").is_none());
    }

    #[test]
    fn test_json_output_with_raw_text() {
        let output = format_result(&acme_result(), options(OutputFormat::Json, true)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(value["raw_text"].as_str().unwrap().contains("Acme Corp"));
    }

    #[test]
    fn test_csv_output() {
        let output = format_result(&acme_result(), options(OutputFormat::Csv, false)).unwrap();
        let mut lines = output.lines();

        assert_eq!(
            lines.next(),
            Some("vendor_name,invoice_number,date,total_amount,currency")
        );
        assert_eq!(lines.next(), Some("Acme Corp,4521,UNKNOWN,1234.50,EUR"));
    }

    #[test]
    fn test_text_output() {
        let output = format_result(&acme_result(), options(OutputFormat::Text, false)).unwrap();

        assert!(output.contains("Vendor:  Acme Corp"));
        assert!(output.contains("Total:   €1234.50 EUR"));
    }

    #[test]
    fn test_unknown_currency_override() {
        let err = build_parser(&ScaninConfig::default(), Some("JPY")).err().unwrap();
        assert!(err.to_string().contains("JPY"));
    }
}
