use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Incoming post payload for `POST /api/post`.
///
/// The slug is the upsert key. `excerpt` is never accepted from the client;
/// the store recomputes it from `content` on every write so the two cannot
/// drift apart.
#[derive(Debug, Clone, Deserialize)]
pub struct PostUpsert {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Client-supplied estimate; accepts a string or a number.
    #[serde(default, deserialize_with = "deserialize_string_lax")]
    pub read_time: String,
}

/// Incoming thought payload for `POST /api/thought`.
///
/// Without `id` this inserts a new row; with `id` it updates content/mood of
/// that row in place.
#[derive(Debug, Clone, Deserialize)]
pub struct ThoughtSave {
    #[serde(default)]
    pub id: Option<i64>,
    pub content: String,
    #[serde(default)]
    pub mood: Option<String>,
}

fn deserialize_string_lax<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Value::deserialize(deserializer)?;

    match v {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        _ => Err(serde::de::Error::custom(
            "expected a string or a number for read_time",
        )),
    }
}
