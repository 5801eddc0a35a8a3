use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::schema::EXPENSE_FIELDS;

/// One parsed financial transaction as extracted from message text.
///
/// Every field is optional: `None` means the value could not be extracted,
/// which is distinct from an empty string. Values are kept exactly as
/// extracted, so `amount` is text and `currency` is not checked against any
/// code list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ExpenseRecord {
    amount: Option<String>,
    merchant: Option<String>,
    currency: Option<String>,
}

impl ExpenseRecord {
    pub fn new<A, M, C>(amount: Option<A>, merchant: Option<M>, currency: Option<C>) -> Self
    where
        A: Into<String>,
        M: Into<String>,
        C: Into<String>,
    {
        Self {
            amount: amount.map(Into::into),
            merchant: merchant.map(Into::into),
            currency: currency.map(Into::into),
        }
    }

    /// A record where nothing could be extracted.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn with_merchant(mut self, merchant: impl Into<String>) -> Self {
        self.merchant = Some(merchant.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    /// Validates a JSON object against the expense schema.
    ///
    /// Missing keys and `null` values are absent fields, unknown keys are
    /// ignored, and any value that is not a string is rejected rather than
    /// coerced.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject {
            found: json_kind(value),
        })?;

        Ok(Self {
            amount: text_field(object, "amount")?,
            merchant: text_field(object, "merchant")?,
            currency: text_field(object, "currency")?,
        })
    }

    pub fn amount(&self) -> Option<&str> {
        self.amount.as_deref()
    }

    pub fn merchant(&self) -> Option<&str> {
        self.merchant.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.merchant.is_none() && self.currency.is_none()
    }

    /// Flat mapping with exactly the keys `amount`, `merchant` and `currency`.
    ///
    /// Absent fields are present as `null`, never omitted.
    pub fn serialize_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        for spec in &EXPENSE_FIELDS {
            let value = self
                .field_value(spec.name)
                .map(|text| Value::String(text.to_string()))
                .unwrap_or(Value::Null);
            map.insert(spec.name.to_string(), value);
        }
        map
    }

    fn field_value(&self, name: &str) -> Option<&str> {
        match name {
            "amount" => self.amount(),
            "merchant" => self.merchant(),
            "currency" => self.currency(),
            _ => None,
        }
    }
}

impl TryFrom<Value> for ExpenseRecord {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl From<&ExpenseRecord> for Value {
    fn from(record: &ExpenseRecord) -> Self {
        Value::Object(record.serialize_map())
    }
}

/// Schema violation raised while constructing an [`ExpenseRecord`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("expense payload must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("field `{field}` must be text or null, found {found}")]
    InvalidType {
        field: &'static str,
        found: &'static str,
    },
}

fn text_field(
    object: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Err(ValidationError::InvalidType {
            field,
            found: json_kind(other),
        }),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_helpers_set_fields() {
        let record = ExpenseRecord::empty()
            .with_amount("12")
            .with_currency("EUR");
        assert_eq!(record.amount(), Some("12"));
        assert_eq!(record.merchant(), None);
        assert_eq!(record.currency(), Some("EUR"));
        assert!(!record.is_empty());
        assert!(ExpenseRecord::empty().is_empty());
    }

    #[test]
    fn empty_string_is_not_absent() {
        let record = ExpenseRecord::from_value(&json!({ "merchant": "" })).expect("valid");
        assert_eq!(record.merchant(), Some(""));
        assert_eq!(record.serialize_map()["merchant"], json!(""));
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let record = ExpenseRecord::from_value(&json!({
            "amount": "5",
            "category": 7,
        }))
        .expect("extra keys are not part of the schema");
        assert_eq!(record.amount(), Some("5"));
    }

    #[test]
    fn rejects_non_object_payloads() {
        let err = ExpenseRecord::from_value(&json!(["42.50"])).expect_err("array rejected");
        assert_eq!(err, ValidationError::NotAnObject { found: "array" });
    }

    #[test]
    fn rejects_each_non_text_kind() {
        for (value, kind) in [
            (json!(42.5), "number"),
            (json!(true), "boolean"),
            (json!(["a"]), "array"),
            (json!({ "value": "a" }), "object"),
        ] {
            let err = ExpenseRecord::from_value(&json!({ "currency": value }))
                .expect_err("non-text rejected");
            assert_eq!(
                err,
                ValidationError::InvalidType {
                    field: "currency",
                    found: kind,
                }
            );
        }
    }

    #[test]
    fn deserialize_goes_through_validation() {
        let record: ExpenseRecord =
            serde_json::from_str(r#"{"amount":"9.99","merchant":null}"#).expect("valid json");
        assert_eq!(record.amount(), Some("9.99"));
        assert_eq!(record.merchant(), None);

        let err = serde_json::from_str::<ExpenseRecord>(r#"{"amount":9.99}"#)
            .expect_err("number rejected");
        assert!(err.to_string().contains("field `amount` must be text or null"));
    }

    #[test]
    fn serialize_derive_keeps_nulls() {
        let record = ExpenseRecord::new(Some("1"), None::<String>, None::<String>);
        let text = serde_json::to_string(&record).expect("serializes");
        assert_eq!(text, r#"{"amount":"1","merchant":null,"currency":null}"#);
    }

    #[test]
    fn amount_text_is_kept_verbatim() {
        for raw in ["1.250,00", "Rs.-500", "$ 7", "forty two"] {
            let record = ExpenseRecord::from_value(&json!({ "amount": raw })).expect("text amount");
            assert_eq!(record.amount(), Some(raw));
            assert_eq!(record.serialize_map()["amount"], json!(raw));
        }
    }
}
