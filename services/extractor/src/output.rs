use clap::ValueEnum;
use expense_ds::error::AppError;
use expense_ds::extraction::EXPENSE_FIELDS;
use expense_ds::ExpenseRecord;
use serde_json::Value;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One JSON object per line
    #[default]
    Json,
    /// `amount,merchant,currency` rows with a header
    Csv,
}

/// Writes serialized records in the selected format.
pub(crate) enum RecordWriter<W: Write> {
    Json(W),
    Csv(csv::Writer<W>),
}

impl<W: Write> RecordWriter<W> {
    pub(crate) fn new(format: OutputFormat, writer: W) -> Result<Self, AppError> {
        match format {
            OutputFormat::Json => Ok(Self::Json(writer)),
            OutputFormat::Csv => {
                let mut csv_writer = csv::WriterBuilder::new()
                    .has_headers(false)
                    .from_writer(writer);
                csv_writer
                    .write_record(EXPENSE_FIELDS.iter().map(|spec| spec.name))
                    .map_err(output_error)?;
                Ok(Self::Csv(csv_writer))
            }
        }
    }

    pub(crate) fn write(&mut self, record: &ExpenseRecord) -> Result<(), AppError> {
        match self {
            Self::Json(writer) => {
                serde_json::to_writer(&mut *writer, record)?;
                writeln!(writer)?;
            }
            Self::Csv(writer) => {
                let row = record.serialize_map();
                writer
                    .write_record(EXPENSE_FIELDS.iter().map(|spec| {
                        row.get(spec.name).and_then(Value::as_str).unwrap_or("")
                    }))
                    .map_err(output_error)?;
            }
        }
        Ok(())
    }

    pub(crate) fn finish(self) -> Result<W, AppError> {
        match self {
            Self::Json(mut writer) => {
                writer.flush()?;
                Ok(writer)
            }
            Self::Csv(writer) => writer
                .into_inner()
                .map_err(|err| output_error(err.into_error())),
        }
    }
}

fn output_error<E>(err: E) -> AppError
where
    E: std::error::Error + Send + Sync + 'static,
{
    AppError::Output(Box::new(err))
}
