use crate::schema::{FieldDescriptor, FieldKind, Schema};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Value, json};
use std::sync::LazyLock;

/// Output format of the `created` column
pub const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CREATED_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Anything the filter engine can evaluate a predicate against
pub trait Record {
    /// Value of the named field, or `None` if the record has no such field
    fn field(&self, name: &str) -> Option<Value>;
}

/// A single client-side log message, as stored by the log service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: i64,
    /// Browser family that produced the message (e.g. "Chrome", "Safari")
    pub browser: String,
    #[serde(default)]
    pub page_url: String,
    pub country: String,
    pub message: String,
    #[serde(with = "created_format")]
    pub created: NaiveDateTime,
}

impl LogRecord {
    /// Schema shared by every log record
    pub fn schema() -> &'static Schema {
        static LOG_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
            Schema::new(
                "log",
                vec![
                    FieldDescriptor::new("id", FieldKind::Integer),
                    FieldDescriptor::new("browser", FieldKind::Text),
                    FieldDescriptor::new("page_url", FieldKind::Text),
                    FieldDescriptor::new("country", FieldKind::Text),
                    FieldDescriptor::new("message", FieldKind::Text),
                    FieldDescriptor::new("created", FieldKind::Timestamp),
                ],
                &["id"],
            )
        });
        &LOG_SCHEMA
    }

    pub fn created_text(&self) -> String {
        self.created.format(CREATED_FORMAT).to_string()
    }

    /// Flat representation with `created` rendered as text
    pub fn to_flat_json(&self) -> Value {
        json!({
            "id": self.id,
            "browser": self.browser,
            "page_url": self.page_url,
            "country": self.country,
            "message": self.message,
            "created": self.created_text(),
        })
    }
}

impl Record for LogRecord {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(json!(self.id)),
            "browser" => Some(Value::String(self.browser.clone())),
            "page_url" => Some(Value::String(self.page_url.clone())),
            "country" => Some(Value::String(self.country.clone())),
            "message" => Some(Value::String(self.message.clone())),
            "created" => Some(Value::String(self.created_text())),
            _ => None,
        }
    }
}

/// Parse a `created` timestamp in any of the accepted layouts
pub fn parse_created(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    CREATED_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

mod created_format {
    use super::*;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(CREATED_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_created(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid created timestamp: '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LogRecord {
        LogRecord {
            id: 7,
            browser: "Chrome".to_string(),
            page_url: "https://example.com/a".to_string(),
            country: "Italy".to_string(),
            message: "Stacktrace at line 5".to_string(),
            created: parse_created("2018-03-01 10:20:30").unwrap(),
        }
    }

    #[test]
    fn test_field_access() {
        let record = sample();
        assert_eq!(record.field("id"), Some(json!(7)));
        assert_eq!(record.field("browser"), Some(json!("Chrome")));
        assert_eq!(record.field("created"), Some(json!("2018-03-01 10:20:30")));
        assert_eq!(record.field("nope"), None);
    }

    #[test]
    fn test_schema_matches_record_fields() {
        let record = sample();
        for field in LogRecord::schema().fields() {
            assert!(record.field(&field.name).is_some(), "{}", field.name);
        }
        assert_eq!(LogRecord::schema().sort_keys(), ["id".to_string()]);
    }

    #[test]
    fn test_parse_created_layouts() {
        assert!(parse_created("2018-03-01 10:20:30.123456").is_some());
        assert!(parse_created("2018-03-01T10:20:30").is_some());
        assert!(parse_created("2018-03-01T10:20:30Z").is_some());
        assert!(parse_created("yesterday").is_none());
    }

    #[test]
    fn test_deserialize_from_seed_json() {
        let raw = r#"{"id": 1, "browser": "IE", "page_url": "/", "country": "Philippines",
                      "message": "boom", "created": "2018-01-02 03:04:05"}"#;
        let record: LogRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.created_text(), "2018-01-02 03:04:05");
        assert_eq!(record.to_flat_json()["created"], json!("2018-01-02 03:04:05"));
    }
}
