//! Wire types for the persistent support chat, plus classification of
//! inbound structured payloads into a tagged rendering variant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message kind on the wire.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    #[display("MESSAGE")]
    Message,
    #[display("TYPING")]
    Typing,
    #[display("ERROR")]
    Error,
    #[serde(other)]
    #[display("OTHER")]
    Other,
}

/// Server hint for how a payload should be presented.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisplayFormat {
    #[display("STRING")]
    String,
    #[display("TABLE")]
    Table,
    #[display("READING")]
    Reading,
    #[serde(other)]
    #[display("OTHER")]
    Other,
}

/// The message shape published to `/app/chat.*` and received from
/// `/topic/public`. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_format: Option<DisplayFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl ChatMessage {
    pub fn text(content: impl Into<String>, sender: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            sender: Some(sender.into()),
            kind: Some(MessageKind::Message),
            ..Default::default()
        }
    }

    pub fn is_typing(&self) -> bool {
        self.kind == Some(MessageKind::Typing)
    }
}

/// A blood bank row as it appears in assistant answers. Field names vary
/// between backend revisions, hence the aliases.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BankRow {
    #[serde(default, alias = "bloodBankName")]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "contactNumber")]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StateRow {
    #[serde(default)]
    pub state_id: Option<String>,
    #[serde(default)]
    pub state_name: Option<String>,
    #[serde(default)]
    pub state_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DistrictRow {
    #[serde(default)]
    pub district_id: Option<String>,
    #[serde(default)]
    pub district_name: Option<String>,
    #[serde(default)]
    pub district_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StockRow {
    #[serde(default, alias = "bloodBankName")]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub blood_groups: Option<BTreeMap<String, u32>>,
    #[serde(default)]
    pub distance: Option<f64>,
}

/// How an inbound message should render, decided once at receive time.
#[derive(Debug, Clone, PartialEq)]
pub enum Structured {
    BankList {
        banks: Vec<BankRow>,
        total: Option<u64>,
    },
    StateList {
        states: Vec<StateRow>,
        total: Option<u64>,
    },
    DistrictList {
        districts: Vec<DistrictRow>,
        total: Option<u64>,
        state_name: Option<String>,
    },
    StockTable {
        stocks: Vec<StockRow>,
        total: Option<u64>,
    },
    GenericTable(Vec<serde_json::Map<String, Value>>),
    PlainText(String),
    Raw(Value),
}

/// Decide the rendering variant for one inbound message.
pub fn classify(message: &ChatMessage) -> Structured {
    match (&message.display_format, &message.data, &message.content) {
        (Some(DisplayFormat::Table), Some(data), _) => classify_value(data),
        (Some(DisplayFormat::Reading), _, Some(content))
        | (Some(DisplayFormat::String), _, Some(content)) => {
            Structured::PlainText(content.clone())
        }
        (_, Some(data), _) => classify_value(data),
        (_, None, Some(content)) => {
            // Some replies arrive as plain text with a JSON object embedded
            // mid-sentence.
            if let Some(embedded) = extract_json(content) {
                classify_value(&embedded)
            } else {
                Structured::PlainText(content.clone())
            }
        }
        (_, None, None) => Structured::PlainText("No content".to_string()),
    }
}

fn classify_value(data: &Value) -> Structured {
    let total = data
        .get("totalResults")
        .and_then(Value::as_u64);

    if let Some(banks) = typed_rows::<BankRow>(data, "bloodBanks") {
        return Structured::BankList { banks, total };
    }
    if let Some(states) = typed_rows::<StateRow>(data, "states") {
        return Structured::StateList { states, total };
    }
    if let Some(districts) = typed_rows::<DistrictRow>(data, "districts") {
        let state_name = data
            .get("stateName")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Structured::DistrictList {
            districts,
            total,
            state_name,
        };
    }
    if let Some(stocks) = typed_rows::<StockRow>(data, "stocks") {
        return Structured::StockTable { stocks, total };
    }

    if let Value::Array(items) = data {
        let objects: Vec<_> = items
            .iter()
            .filter_map(|item| item.as_object().cloned())
            .collect();
        if !objects.is_empty() && objects.len() == items.len() {
            return Structured::GenericTable(objects);
        }
    }

    Structured::Raw(data.clone())
}

fn typed_rows<T: serde::de::DeserializeOwned>(
    data: &Value,
    key: &str,
) -> Option<Vec<T>> {
    let rows = data.get(key)?.as_array()?;
    rows.iter()
        .map(|row| serde_json::from_value(row.clone()).ok())
        .collect()
}

/// Pull the first JSON object or array out of free-form text.
fn extract_json(content: &str) -> Option<Value> {
    let start = content.find(['{', '['])?;
    let tail = &content[start..];
    let end = match tail.as_bytes()[0] {
        b'{' => tail.rfind('}')?,
        _ => tail.rfind(']')?,
    };
    serde_json::from_str(&tail[..=end]).ok()
}

/// Column order for a generic table: union of keys in first-seen order.
pub fn generic_columns(
    rows: &[serde_json::Map<String, Value>],
) -> Vec<String> {
    let mut columns = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// The distinct component labels across all stock rows, with the well-known
/// labels first in transfusion-priority order.
pub fn stock_columns(stocks: &[StockRow]) -> Vec<String> {
    const ORDER: [&str; 16] = [
        "O+Ve", "O-Ve", "A+Ve", "A-Ve", "B+Ve", "B-Ve", "AB+Ve", "AB-Ve",
        "O+", "O-", "A+", "A-", "B+", "B-", "AB+", "AB-",
    ];
    let mut labels: Vec<String> = Vec::new();
    for stock in stocks {
        if let Some(groups) = &stock.blood_groups {
            for label in groups.keys() {
                if !labels.iter().any(|l| l == label) {
                    labels.push(label.clone());
                }
            }
        }
    }
    labels.sort_by(|a, b| {
        let rank = |label: &str| {
            ORDER
                .iter()
                .position(|known| *known == label)
                .unwrap_or(ORDER.len())
        };
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_round_trips_uppercase() {
        assert_eq!(
            serde_json::to_string(&MessageKind::Typing).unwrap(),
            "\"TYPING\""
        );
        let kind: MessageKind = serde_json::from_str("\"MESSAGE\"").unwrap();
        assert_eq!(kind, MessageKind::Message);
        let kind: MessageKind = serde_json::from_str("\"JOIN\"").unwrap();
        assert_eq!(kind, MessageKind::Other);
    }

    #[test]
    fn outbound_message_omits_empty_fields() {
        let message = ChatMessage::text("hello", "User");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            json!({"content": "hello", "sender": "User", "type": "MESSAGE"})
        );
    }

    #[test]
    fn bank_list_is_detected_and_typed() {
        let message = ChatMessage {
            data: Some(json!({
                "bloodBanks": [
                    {"bloodBankName": "Apollo", "contactNumber": "123"}
                ],
                "totalResults": 1
            })),
            ..Default::default()
        };
        match classify(&message) {
            Structured::BankList { banks, total } => {
                assert_eq!(total, Some(1));
                assert_eq!(banks[0].name.as_deref(), Some("Apollo"));
                assert_eq!(banks[0].phone.as_deref(), Some("123"));
            }
            other => panic!("expected bank list, got {other:?}"),
        }
    }

    #[test]
    fn districts_carry_the_state_name() {
        let message = ChatMessage {
            data: Some(json!({
                "districts": [{"districtId": "7", "districtName": "North"}],
                "stateName": "Delhi"
            })),
            ..Default::default()
        };
        match classify(&message) {
            Structured::DistrictList {
                districts,
                state_name,
                ..
            } => {
                assert_eq!(districts.len(), 1);
                assert_eq!(state_name.as_deref(), Some("Delhi"));
            }
            other => panic!("expected district list, got {other:?}"),
        }
    }

    #[test]
    fn string_format_beats_data_sniffing() {
        let message = ChatMessage {
            content: Some("just words".into()),
            display_format: Some(DisplayFormat::String),
            data: Some(json!({"states": []})),
            ..Default::default()
        };
        assert_eq!(
            classify(&message),
            Structured::PlainText("just words".into())
        );
    }

    #[test]
    fn embedded_json_in_content_is_classified() {
        let message = ChatMessage {
            content: Some(
                "Here is what I found: {\"stocks\": [{\"bloodBankName\": \
                 \"Red Cross\"}]}"
                    .into(),
            ),
            ..Default::default()
        };
        match classify(&message) {
            Structured::StockTable { stocks, .. } => {
                assert_eq!(stocks[0].name.as_deref(), Some("Red Cross"));
            }
            other => panic!("expected stock table, got {other:?}"),
        }
    }

    #[test]
    fn array_of_objects_becomes_a_generic_table() {
        let message = ChatMessage {
            data: Some(json!([{"a": 1, "b": 2}, {"b": 3, "c": 4}])),
            ..Default::default()
        };
        match classify(&message) {
            Structured::GenericTable(rows) => {
                assert_eq!(generic_columns(&rows), vec!["a", "b", "c"]);
            }
            other => panic!("expected generic table, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_objects_fall_back_to_raw() {
        let message = ChatMessage {
            data: Some(json!({"anything": true})),
            ..Default::default()
        };
        assert!(matches!(classify(&message), Structured::Raw(_)));
    }

    #[test]
    fn stock_columns_put_known_labels_first() {
        let stocks = vec![
            StockRow {
                blood_groups: Some(
                    [("Platelets".to_string(), 1), ("A+Ve".to_string(), 2)]
                        .into_iter()
                        .collect(),
                ),
                ..Default::default()
            },
            StockRow {
                blood_groups: Some(
                    [("O+Ve".to_string(), 3)].into_iter().collect(),
                ),
                ..Default::default()
            },
        ];
        assert_eq!(stock_columns(&stocks), vec!["O+Ve", "A+Ve", "Platelets"]);
    }
}
