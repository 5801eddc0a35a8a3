use std::collections::VecDeque;
use std::sync::Mutex;

use crate::extraction::model::{ExpenseExtractor, ModelError};

/// Extractor replaying canned model output and recording the messages it saw.
#[derive(Default)]
pub(super) struct ScriptedExtractor {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedExtractor {
    pub(super) fn replying<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, ModelError>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn seen(&self) -> Vec<String> {
        self.seen.lock().expect("seen mutex poisoned").clone()
    }
}

impl ExpenseExtractor for ScriptedExtractor {
    async fn extract(&self, message: &str) -> Result<String, ModelError> {
        self.seen
            .lock()
            .expect("seen mutex poisoned")
            .push(message.to_string());
        self.replies
            .lock()
            .expect("reply mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Unavailable("no scripted reply".to_string())))
    }
}

pub(super) fn reply(text: &str) -> Result<String, ModelError> {
    Ok(text.to_string())
}

pub(super) const CARD_SMS: &str =
    "INR 1,250.00 spent on HDFC Bank Card XX1234 at AMAZON on 2024-03-02.";
pub(super) const UPI_SMS: &str = "Rs 80 debited via UPI to CHAI POINT. Ref 4411.";
pub(super) const CHAT_SMS: &str = "Are we still on for lunch tomorrow?";
