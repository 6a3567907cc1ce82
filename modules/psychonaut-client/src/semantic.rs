//! Decoder for the `browsebysubject` payload.
//!
//! Semantic MediaWiki hands back weakly-typed data items tagged with an
//! integer type. This module turns them into a small sum type so the
//! property parser never touches raw JSON; unknown shapes degrade to text
//! instead of failing the whole subject.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{PsychonautError, Result};

/// SMW serializes wiki pages as `Title#<namespace>#`; only the main-ish
/// namespace markers show up in practice.
static SMW_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#1?0#").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub enum SmwItem {
    Number(f64),
    Text(String),
    /// A wiki page reference, stripped of the namespace marker.
    Page(String),
}

impl SmwItem {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            SmwItem::Number(value) => Some(*value),
            SmwItem::Text(text) => text.trim().parse().ok().filter(|n: &f64| n.is_finite()),
            SmwItem::Page(_) => None,
        }
    }

    pub fn to_text(&self) -> String {
        match self {
            SmwItem::Number(value) if value.fract() == 0.0 => format!("{}", *value as i64),
            SmwItem::Number(value) => value.to_string(),
            SmwItem::Text(text) | SmwItem::Page(text) => text.clone(),
        }
    }
}

/// A property value, preserving upstream arity: singletons stay scalars,
/// anything longer stays a list.
#[derive(Debug, Clone, PartialEq)]
pub enum SmwValue {
    Null,
    One(SmwItem),
    Many(Vec<SmwItem>),
}

impl SmwValue {
    pub fn items(&self) -> Vec<&SmwItem> {
        match self {
            SmwValue::Null => Vec::new(),
            SmwValue::One(item) => vec![item],
            SmwValue::Many(items) => items.iter().collect(),
        }
    }

    /// First numeric scalar, if any.
    pub fn number(&self) -> Option<f64> {
        self.items().iter().find_map(|item| item.as_number())
    }

    /// First scalar rendered as text.
    pub fn text(&self) -> Option<String> {
        self.items().first().map(|item| item.to_text())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticProperty {
    /// Lowercased, underscore-separated property name.
    pub name: String,
    pub value: SmwValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemanticSubject {
    pub subject: String,
    pub properties: Vec<SemanticProperty>,
}

/// Decodes a `browsebysubject` response. Internal properties (leading `_`)
/// are dropped; an empty `dataitem` list yields a null-valued entry.
pub fn decode_browse(payload: &Value) -> Result<SemanticSubject> {
    let query = payload
        .get("query")
        .ok_or_else(|| PsychonautError::Parse("browsebysubject payload has no query".into()))?;

    let subject = query
        .get("subject")
        .and_then(Value::as_str)
        .map(strip_marker)
        .unwrap_or_default();

    let data = query
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| PsychonautError::Parse("browsebysubject payload has no data".into()))?;

    let mut properties = Vec::new();
    for entry in data {
        let Some(name) = entry.get("property").and_then(Value::as_str) else {
            continue;
        };
        if name.starts_with('_') {
            continue;
        }

        let items: Vec<SmwItem> = entry
            .get("dataitem")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(decode_item).collect())
            .unwrap_or_default();

        let value = match items.len() {
            0 => SmwValue::Null,
            1 => match items.into_iter().next() {
                Some(item) => SmwValue::One(item),
                None => SmwValue::Null,
            },
            _ => SmwValue::Many(items),
        };

        properties.push(SemanticProperty {
            name: name.to_lowercase().replace(' ', "_"),
            value,
        });
    }

    Ok(SemanticSubject {
        subject,
        properties,
    })
}

fn decode_item(item: &Value) -> SmwItem {
    let tag = item.get("type").and_then(Value::as_u64).unwrap_or(0);
    let raw = item.get("item");

    match tag {
        1 => {
            if let Some(number) = raw.and_then(Value::as_f64).filter(|n| n.is_finite()) {
                return SmwItem::Number(number);
            }
            let text = raw_text(raw);
            match text.trim().parse::<f64>().ok().filter(|n| n.is_finite()) {
                Some(number) => SmwItem::Number(number),
                None => SmwItem::Text(text),
            }
        }
        9 => SmwItem::Page(strip_marker(&raw_text(raw))),
        _ => SmwItem::Text(raw_text(raw)),
    }
}

fn raw_text(raw: Option<&Value>) -> String {
    match raw {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn strip_marker(text: &str) -> String {
    SMW_MARKER.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_typed_items_and_strips_markers() {
        let payload = json!({
            "query": {
                "subject": "LSD#0#",
                "data": [
                    {"property": "Oral_common_min_dose", "dataitem": [{"type": 1, "item": "75"}]},
                    {"property": "Psychoactive_class", "dataitem": [{"type": 9, "item": "Psychedelics#10#"}]},
                    {"property": "Featured", "dataitem": [{"type": 2, "item": "t"}]},
                ]
            }
        });

        let subject = decode_browse(&payload).unwrap();
        assert_eq!(subject.subject, "LSD");
        assert_eq!(subject.properties.len(), 3);
        assert_eq!(
            subject.properties[0],
            SemanticProperty {
                name: "oral_common_min_dose".into(),
                value: SmwValue::One(SmwItem::Number(75.0)),
            }
        );
        assert_eq!(
            subject.properties[1].value,
            SmwValue::One(SmwItem::Page("Psychedelics".into()))
        );
        assert_eq!(
            subject.properties[2].value,
            SmwValue::One(SmwItem::Text("t".into()))
        );
    }

    #[test]
    fn internal_properties_are_skipped() {
        let payload = json!({
            "query": {
                "subject": "LSD#0#",
                "data": [
                    {"property": "_MDAT", "dataitem": [{"type": 2, "item": "modified"}]},
                    {"property": "Toxicity", "dataitem": [{"type": 2, "item": "low"}]},
                ]
            }
        });

        let subject = decode_browse(&payload).unwrap();
        assert_eq!(subject.properties.len(), 1);
        assert_eq!(subject.properties[0].name, "toxicity");
    }

    #[test]
    fn arity_survives_decoding() {
        let payload = json!({
            "query": {
                "subject": "X#0#",
                "data": [
                    {"property": "Dangerousinteraction", "dataitem": [
                        {"type": 9, "item": "Alcohol#0#"},
                        {"type": 9, "item": "Cocaine#0#"},
                    ]},
                    {"property": "Empty", "dataitem": []},
                ]
            }
        });

        let subject = decode_browse(&payload).unwrap();
        assert_eq!(
            subject.properties[0].value,
            SmwValue::Many(vec![
                SmwItem::Page("Alcohol".into()),
                SmwItem::Page("Cocaine".into()),
            ])
        );
        assert_eq!(subject.properties[1].value, SmwValue::Null);
    }

    #[test]
    fn unparseable_numbers_degrade_to_text() {
        let payload = json!({
            "query": {
                "subject": "X#0#",
                "data": [
                    {"property": "Oral_heavy_dose", "dataitem": [{"type": 1, "item": "lots"}]},
                ]
            }
        });

        let subject = decode_browse(&payload).unwrap();
        assert_eq!(
            subject.properties[0].value,
            SmwValue::One(SmwItem::Text("lots".into()))
        );
    }

    #[test]
    fn missing_data_is_a_parse_error() {
        assert!(decode_browse(&json!({"query": {}})).is_err());
        assert!(decode_browse(&json!({})).is_err());
    }
}
