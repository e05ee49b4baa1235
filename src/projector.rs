// src/projector.rs
//! Flattens decoded records into the JSON objects sent to bridge clients.

use serde_json::{Map, Value, json};

use crate::ndef::{DecodedRecord, RawRecord, TextRecord};

pub type Fields = Map<String, Value>;

pub const RESULT_TYPE_NDEF: &str = "ndef";
pub const RESULT_TYPE_TAG: &str = "tag";

fn text_encoding(text: &TextRecord) -> &'static str {
    if text.utf16 { "utf16" } else { "utf8" }
}

fn record_id(record: &RawRecord<'_>) -> String {
    record
        .header
        .identifier
        .as_deref()
        .map(|id| String::from_utf8_lossy(id).into_owned())
        .unwrap_or_default()
}

/// One record as a flat map: `id`, `tnf`, `type`, then fields for its kind.
/// Records nothing can decode carry their payload as uppercase hex.
pub fn project_record(record: &RawRecord<'_>) -> Fields {
    let mut fields = Fields::new();
    fields.insert("id".into(), json!(record_id(record)));
    fields.insert("tnf".into(), json!(record.header.tnf.as_str()));
    fields.insert("type".into(), json!(record.header.record_type));

    match record.decode() {
        Some(DecodedRecord::Text(text)) => {
            fields.insert("languageCode".into(), json!(text.language_code));
            fields.insert("encoding".into(), json!(text_encoding(&text)));
            fields.insert("payload".into(), json!(text.text));
        }
        Some(DecodedRecord::Uri(uri)) => {
            fields.insert("payload".into(), json!(uri.uri));
        }
        Some(DecodedRecord::SmartPoster(poster)) => {
            if let Some(title) = poster.title() {
                fields.insert("languageCode".into(), json!(title.language_code));
                fields.insert("payload".into(), json!(title.text));
            }
            if let Some(uri) = &poster.uri {
                fields.insert("uri".into(), json!(uri.uri));
            }
            let texts: Vec<Value> = poster
                .texts
                .iter()
                .map(|t| json!({ "languageCode": t.language_code, "payload": t.text }))
                .collect();
            fields.insert("texts".into(), Value::Array(texts));
        }
        Some(DecodedRecord::VCard(card)) => {
            fields.insert("payload".into(), json!(card.text));
        }
        Some(DecodedRecord::WifiConfig(config)) => {
            fields.insert("credentials".into(), json!(config.credentials));
            if let Some(v2) = &config.version2 {
                fields.insert("version".into(), json!(v2.version));
            }
        }
        None => {
            fields.insert("payload".into(), json!(hex::encode_upper(record.payload)));
        }
    }
    fields
}

/// A whole message. Its `id` is the first non-empty record id, else the
/// tag UID.
pub fn project_message(tag_uid: &[u8], records: &[RawRecord<'_>]) -> Fields {
    let projected: Vec<Fields> = records.iter().map(project_record).collect();
    let id = projected
        .iter()
        .filter_map(|r| r.get("id").and_then(Value::as_str))
        .find(|id| !id.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| hex::encode_upper(tag_uid));

    let mut fields = Fields::new();
    fields.insert("id".into(), json!(id));
    fields.insert("result_type".into(), json!(RESULT_TYPE_NDEF));
    fields.insert(
        "records".into(),
        Value::Array(projected.into_iter().map(Value::Object).collect()),
    );
    fields
}

/// A tag with no NDEF content, identified by its UID alone.
pub fn project_tag(uid: &[u8]) -> Option<Fields> {
    if uid.is_empty() {
        return None;
    }
    let mut fields = Fields::new();
    fields.insert("id".into(), json!(hex::encode_upper(uid)));
    fields.insert("result_type".into(), json!(RESULT_TYPE_TAG));
    Some(fields)
}
