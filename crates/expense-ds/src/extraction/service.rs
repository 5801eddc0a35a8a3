use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::filter::MessageFilter;
use super::model::{ExpenseExtractor, ModelError};
use super::parser::{parse_model_response, ResponseError};
use super::record::ExpenseRecord;

/// Why a message was not sent to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Blank,
    NotTransactional,
}

impl SkipReason {
    pub fn label(&self) -> &'static str {
        match self {
            SkipReason::Blank => "blank message",
            SkipReason::NotTransactional => "no transaction keywords",
        }
    }
}

/// Outcome of processing one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Skipped { reason: SkipReason },
    Extracted(ExpenseRecord),
}

impl Extraction {
    pub fn record(&self) -> Option<&ExpenseRecord> {
        match self {
            Extraction::Extracted(record) => Some(record),
            Extraction::Skipped { .. } => None,
        }
    }

    pub fn into_record(self) -> Option<ExpenseRecord> {
        match self {
            Extraction::Extracted(record) => Some(record),
            Extraction::Skipped { .. } => None,
        }
    }
}

/// Error raised by the extraction service.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// Service composing the message filter, the model, and response validation.
pub struct ExtractionService<E> {
    filter: MessageFilter,
    extractor: Arc<E>,
}

impl<E> ExtractionService<E>
where
    E: ExpenseExtractor + 'static,
{
    pub fn new(extractor: Arc<E>, filter: MessageFilter) -> Self {
        Self { filter, extractor }
    }

    pub fn filter(&self) -> &MessageFilter {
        &self.filter
    }

    /// Extract an expense from a single message.
    pub async fn process(&self, message: &str) -> Result<Extraction, ExtractionError> {
        if message.trim().is_empty() {
            debug!("skipping blank message");
            return Ok(Extraction::Skipped {
                reason: SkipReason::Blank,
            });
        }

        if !self.filter.is_transaction_message(message) {
            debug!(chars = message.len(), "skipping message without transaction keywords");
            return Ok(Extraction::Skipped {
                reason: SkipReason::NotTransactional,
            });
        }

        let raw = self.extractor.extract(message).await.map_err(|err| {
            warn!(error = %err, "model call failed");
            err
        })?;

        let record = parse_model_response(&raw).map_err(|err| {
            warn!(error = %err, "model response rejected");
            err
        })?;

        info!(
            has_amount = record.amount().is_some(),
            has_merchant = record.merchant().is_some(),
            has_currency = record.currency().is_some(),
            "expense extracted"
        );
        Ok(Extraction::Extracted(record))
    }

    /// Process messages in order; each message gets its own result.
    pub async fn process_batch<I, S>(&self, messages: I) -> Vec<Result<Extraction, ExtractionError>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = Vec::new();
        for message in messages {
            results.push(self.process(message.as_ref()).await);
        }
        results
    }
}
