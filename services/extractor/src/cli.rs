use crate::commands::{run_extract, run_parse, run_schema, ExtractArgs, ParseArgs, SchemaArgs};
use clap::{Parser, Subcommand};
use expense_ds::config::{AppConfig, TelemetryConfig};
use expense_ds::error::AppError;
use expense_ds::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "expense-ds",
    about = "Extract structured expenses from transaction messages",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send messages to the model and print the extracted expenses
    Extract(ExtractArgs),
    /// Validate a raw model response offline and print the expense
    Parse(ParseArgs),
    /// Print the structured-output schema requested from the model
    Schema(SchemaArgs),
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    telemetry::init(&TelemetryConfig::load())?;

    // Only extraction talks to the model, so only it needs model settings.
    match cli.command {
        Command::Extract(args) => {
            let config = AppConfig::load()?;
            run_extract(&config, args).await
        }
        Command::Parse(args) => run_parse(args),
        Command::Schema(args) => run_schema(args),
    }
}
