use crate::error::TableError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name of the profile table's natural key
pub const PROFILE_KEY_FIELD: &str = "Instagram Handle";
/// Field name of the reels table's natural key
pub const REEL_KEY_FIELD: &str = "Reel ID";

/// Maximum number of characters stored in a reel caption
pub const CAPTION_MAX_CHARS: usize = 1000;

/// Normalized profile row, keyed by `handle`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(rename = "Instagram Handle")]
    pub handle: String,
    #[serde(rename = "Profile Name")]
    pub display_name: String,
    #[serde(rename = "Follower Count")]
    pub follower_count: u64,
    #[serde(rename = "Biography")]
    pub biography: String,
    #[serde(rename = "Last Checked")]
    pub last_checked: String,
}

/// Normalized reel row, keyed by `reel_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReelRecord {
    #[serde(rename = "Reel ID")]
    pub reel_id: String,
    #[serde(rename = "Profile")]
    pub owner_handle: String,
    #[serde(rename = "Reel URL")]
    pub url: String,
    #[serde(rename = "Caption")]
    pub caption: String,
    #[serde(rename = "Views")]
    pub view_count: u64,
    #[serde(rename = "Likes")]
    pub like_count: u64,
    #[serde(rename = "Comments")]
    pub comment_count: u64,
    #[serde(rename = "Date Posted")]
    pub posted_at: String,
    #[serde(rename = "Last Checked")]
    pub last_checked: String,
}

/// A record that can be written to the table service under a natural key
pub trait TableRecord: Serialize {
    fn natural_key(&self) -> &str;

    /// Field mapping as sent to the table service. Anything that does not
    /// serialize to a JSON object is an error, never an empty row.
    fn to_fields(&self) -> Result<Map<String, Value>, TableError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(TableError::Encode(format!(
                "expected an object, got {}",
                other
            ))),
            Err(e) => Err(TableError::Encode(e.to_string())),
        }
    }
}

impl TableRecord for ProfileRecord {
    fn natural_key(&self) -> &str {
        &self.handle
    }
}

impl TableRecord for ReelRecord {
    fn natural_key(&self) -> &str {
        &self.reel_id
    }
}

/// A row as returned by the table service: opaque id plus its fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// Result of a single upsert call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Raw HTTP answer handed back by a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_profile() -> ProfileRecord {
        ProfileRecord {
            handle: "alice".to_string(),
            display_name: "Alice A".to_string(),
            follower_count: 100,
            biography: "bio".to_string(),
            last_checked: "2025-08-04T19:43:53+00:00".to_string(),
        }
    }

    #[test]
    fn test_profile_fields_use_table_column_names() {
        let fields = sample_profile().to_fields().unwrap();
        assert_eq!(fields.get("Instagram Handle"), Some(&Value::from("alice")));
        assert_eq!(fields.get("Profile Name"), Some(&Value::from("Alice A")));
        assert_eq!(fields.get("Follower Count"), Some(&Value::from(100)));
        assert_eq!(fields.get("Biography"), Some(&Value::from("bio")));
        assert!(fields.contains_key("Last Checked"));
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn test_reel_fields_use_table_column_names() {
        let reel = ReelRecord {
            reel_id: "r1".to_string(),
            owner_handle: "alice".to_string(),
            url: "https://instagram.com/reel/abc".to_string(),
            caption: String::new(),
            view_count: 50,
            like_count: 5,
            comment_count: 0,
            posted_at: String::new(),
            last_checked: String::new(),
        };
        let fields = reel.to_fields().unwrap();
        assert_eq!(fields.get("Reel ID"), Some(&Value::from("r1")));
        assert_eq!(fields.get("Profile"), Some(&Value::from("alice")));
        assert_eq!(fields.get("Views"), Some(&Value::from(50)));
        assert_eq!(fields.get("Likes"), Some(&Value::from(5)));
        assert_eq!(fields.get("Comments"), Some(&Value::from(0)));
        assert_eq!(fields.len(), 9);
    }

    #[derive(Serialize)]
    struct BareKey(String);

    impl TableRecord for BareKey {
        fn natural_key(&self) -> &str {
            &self.0
        }
    }

    #[test]
    fn test_non_object_record_is_an_encode_error() {
        assert!(matches!(
            BareKey("k".to_string()).to_fields(),
            Err(TableError::Encode(_))
        ));
    }

    #[test]
    fn test_natural_keys() {
        assert_eq!(sample_profile().natural_key(), "alice");
    }

    #[test]
    fn test_table_row_without_fields_decodes() {
        let row: TableRow = serde_json::from_str(r#"{"id":"rec1"}"#).unwrap();
        assert_eq!(row.id, "rec1");
        assert!(row.fields.is_empty());
    }
}
