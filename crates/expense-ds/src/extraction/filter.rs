pub const DEFAULT_TRANSACTION_KEYWORDS: [&str; 8] = [
    "spent", "card", "bank", "debited", "credited", "txn", "upi", "paid",
];

/// Keyword heuristic deciding whether a message is worth sending to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageFilter {
    keywords: Vec<String>,
}

impl Default for MessageFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSACTION_KEYWORDS)
    }
}

impl MessageFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|keyword| normalize_message(keyword.as_ref()))
            .filter(|keyword| !keyword.is_empty())
            .collect();
        Self { keywords }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True when any keyword occurs as a whole word in the message.
    pub fn is_transaction_message(&self, message: &str) -> bool {
        let normalized = normalize_message(message);
        if normalized.is_empty() {
            return false;
        }

        let words = split_words(&normalized);
        self.keywords.iter().any(|keyword| {
            let phrase = split_words(keyword);
            !phrase.is_empty()
                && words
                    .windows(phrase.len())
                    .any(|window| window == phrase.as_slice())
        })
    }
}

fn split_words(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect()
}

pub(crate) fn normalize_message(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.to_lowercase()
}
