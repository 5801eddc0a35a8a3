mod cli;
mod commands;
mod output;

use expense_ds::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
