use crate::output::{OutputFormat, RecordWriter};
use clap::{Args, ValueEnum};
use expense_ds::config::AppConfig;
use expense_ds::error::AppError;
use expense_ds::extraction::{
    json_schema, parse_model_response, response_schema, Extraction, ExtractionService,
    LazyGeminiExtractor, MessageFilter,
};
use expense_ds::ExpenseRecord;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ExtractArgs {
    /// A single message to extract from
    #[arg(long, conflicts_with = "input")]
    pub(crate) text: Option<String>,
    /// File with one message per line (`-` for stdin, the default)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
    /// Emit an all-null record for skipped messages instead of omitting them
    #[arg(long)]
    pub(crate) keep_skipped: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ParseArgs {
    /// File holding the raw model response (`-` for stdin, the default)
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub(crate) format: OutputFormat,
}

#[derive(Args, Debug)]
pub(crate) struct SchemaArgs {
    /// Schema dialect to print
    #[arg(long, value_enum, default_value_t = SchemaDialect::JsonSchema)]
    pub(crate) dialect: SchemaDialect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum SchemaDialect {
    /// Standard JSON Schema with field titles
    JsonSchema,
    /// The structured-output schema sent with generateContent requests
    Gemini,
}

pub(crate) async fn run_extract(config: &AppConfig, args: ExtractArgs) -> Result<(), AppError> {
    let ExtractArgs {
        text,
        input,
        format,
        keep_skipped,
    } = args;

    let messages = match text {
        Some(text) => vec![text],
        None => read_messages(&read_input(input.as_deref())?),
    };

    let extractor = Arc::new(LazyGeminiExtractor::new(config.model.clone()));
    let service = ExtractionService::new(
        extractor,
        MessageFilter::new(&config.extraction.keywords),
    );
    info!(
        ?config.environment,
        model = %config.model.model,
        messages = messages.len(),
        "starting extraction"
    );

    let results = service.process_batch(&messages).await;
    let stdout = io::stdout();
    let mut writer = RecordWriter::new(format, stdout.lock())?;
    let mut first_failure = None;

    for (index, result) in results.into_iter().enumerate() {
        let line = index + 1;
        match result {
            Ok(Extraction::Extracted(record)) => writer.write(&record)?,
            Ok(Extraction::Skipped { reason }) => {
                eprintln!("message {line}: skipped ({})", reason.label());
                if keep_skipped {
                    writer.write(&ExpenseRecord::empty())?;
                }
            }
            Err(err) => {
                eprintln!("message {line}: {err}");
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }
    writer.finish()?;

    match first_failure {
        Some(err) => Err(AppError::from(err)),
        None => Ok(()),
    }
}

pub(crate) fn run_parse(args: ParseArgs) -> Result<(), AppError> {
    let raw = read_input(args.input.as_deref())?;
    let record = parse_model_response(&raw)?;

    let stdout = io::stdout();
    let mut writer = RecordWriter::new(args.format, stdout.lock())?;
    writer.write(&record)?;
    writer.finish()?;
    Ok(())
}

pub(crate) fn run_schema(args: SchemaArgs) -> Result<(), AppError> {
    let schema = match args.dialect {
        SchemaDialect::JsonSchema => json_schema(),
        SchemaDialect::Gemini => response_schema(),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String, AppError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

pub(crate) fn read_messages(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use expense_ds::config::{AppEnvironment, ExtractionConfig, ModelConfig, TelemetryConfig};
    use std::io::Write;

    fn offline_config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            model: ModelConfig::default(),
            extraction: ExtractionConfig::default(),
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn extract_without_api_key_succeeds_when_every_message_is_skipped() {
        let args = ExtractArgs {
            text: Some("Dinner at 8?".to_string()),
            input: None,
            format: OutputFormat::Json,
            keep_skipped: false,
        };
        run_extract(&offline_config(), args)
            .await
            .expect("no model call needed");
    }

    #[tokio::test]
    async fn extract_without_api_key_fails_once_a_message_needs_the_model() {
        let args = ExtractArgs {
            text: Some("Rs 40 spent at Cafe".to_string()),
            input: None,
            format: OutputFormat::Json,
            keep_skipped: false,
        };
        let err = run_extract(&offline_config(), args)
            .await
            .expect_err("model is unavailable");
        assert!(err.to_string().contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn read_messages_drops_blank_lines() {
        let raw = "Rs 40 spent at Cafe\n\n   \r\nINR 99 debited via UPI  \n";
        assert_eq!(
            read_messages(raw),
            ["Rs 40 spent at Cafe", "INR 99 debited via UPI"]
        );
    }

    #[test]
    fn read_input_reads_files() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file created");
        write!(file, r#"{{"merchant": "Starbucks"}}"#).expect("temp file written");

        let raw = read_input(Some(file.path())).expect("file read");

        let record = parse_model_response(&raw).expect("valid response");
        assert_eq!(record.merchant(), Some("Starbucks"));
    }

    #[test]
    fn read_input_reports_missing_files() {
        let path = Path::new("/nonexistent/expense-ds/response.json");
        assert!(matches!(read_input(Some(path)), Err(AppError::Io(_))));
    }
}
