use serde_json::{json, Map, Value};

/// Description of the whole record as presented to the model.
pub const RECORD_DESCRIPTION: &str = "Information about a transaction made on any Card";

/// Name, title and description of one extractable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Ordered field list. Serialized records use the same key order.
pub const EXPENSE_FIELDS: [FieldSpec; 3] = [
    FieldSpec {
        name: "amount",
        title: "expense",
        description: "Expense made on the transaction",
    },
    FieldSpec {
        name: "merchant",
        title: "merchant",
        description: "Merchant name by whom the transaction has been made",
    },
    FieldSpec {
        name: "currency",
        title: "currency",
        description: "Currency of the transaction",
    },
];

pub fn field(name: &str) -> Option<&'static FieldSpec> {
    EXPENSE_FIELDS.iter().find(|spec| spec.name == name)
}

/// Structured-output schema in the dialect accepted by the generateContent API.
///
/// Every property is a nullable string and nothing is required, so the model
/// may answer `null` for anything it cannot find in the message.
pub fn response_schema() -> Value {
    let mut properties = Map::new();
    for spec in &EXPENSE_FIELDS {
        properties.insert(
            spec.name.to_string(),
            json!({
                "type": "STRING",
                "nullable": true,
                "description": spec.description,
            }),
        );
    }

    json!({
        "type": "OBJECT",
        "description": RECORD_DESCRIPTION,
        "properties": properties,
        "propertyOrdering": EXPENSE_FIELDS.iter().map(|spec| spec.name).collect::<Vec<_>>(),
    })
}

/// Standard JSON Schema for the record, including field titles.
pub fn json_schema() -> Value {
    let mut properties = Map::new();
    for spec in &EXPENSE_FIELDS {
        properties.insert(
            spec.name.to_string(),
            json!({
                "title": spec.title,
                "description": spec.description,
                "type": ["string", "null"],
            }),
        );
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Expense",
        "description": RECORD_DESCRIPTION,
        "type": "object",
        "properties": properties,
    })
}
