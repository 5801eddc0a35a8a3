//! Structured expense extraction: the record contract, the schema handed to
//! the model, and the pipeline that turns message text into records.

pub(crate) mod filter;
pub mod model;
pub(crate) mod parser;
pub mod record;
pub mod schema;
pub mod service;

#[cfg(test)]
mod tests;

pub use filter::{MessageFilter, DEFAULT_TRANSACTION_KEYWORDS};
pub use model::{
    build_prompt, ExpenseExtractor, ExtractionPrompt, GeminiExtractor, LazyGeminiExtractor,
    ModelError,
};
pub use parser::{parse_model_response, ResponseError};
pub use record::{ExpenseRecord, ValidationError};
pub use schema::{json_schema, response_schema, FieldSpec, EXPENSE_FIELDS};
pub use service::{Extraction, ExtractionError, ExtractionService, SkipReason};
