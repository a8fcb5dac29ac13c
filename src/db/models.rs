use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A published (or draft) article as exposed over the API.
///
/// `tags` is a first-class list here; the JSON text encoding used by the
/// `posts.tags` column never leaves the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub read_time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbPost {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: String,
    pub read_time: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbPost> for Post {
    fn from(row: DbPost) -> Self {
        // A row with unreadable tag data keeps its post visible with no tags
        // instead of failing the whole listing.
        let tags = serde_json::from_str(&row.tags).unwrap_or_default();
        Post {
            id: row.id,
            slug: row.slug,
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            tags,
            read_time: row.read_time,
            created_at: row.created_at,
        }
    }
}

/// A short mood-tagged note.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thought {
    pub id: i64,
    pub content: String,
    pub mood: Mood,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbThought {
    pub id: i64,
    pub content: String,
    pub mood: String,
    pub created_at: DateTime<Utc>,
}

impl From<DbThought> for Thought {
    fn from(row: DbThought) -> Self {
        Thought {
            id: row.id,
            content: row.content,
            mood: Mood::parse_or_default(&row.mood),
            created_at: row.created_at,
        }
    }
}

/// Closed mood vocabulary. Anything unrecognized collapses to `Neutral`,
/// both on the wire and when read back from storage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Pensive,
    Excited,
}

impl Mood {
    pub fn parse_or_default(s: &str) -> Mood {
        match s {
            "happy" => Mood::Happy,
            "pensive" => Mood::Pensive,
            "excited" => Mood::Excited,
            _ => Mood::Neutral,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Pensive => "pensive",
            Mood::Excited => "excited",
        }
    }
}

const EXCERPT_MAX_CHARS: usize = 100;

/// Derives the preview excerpt from markdown content: markdown syntax
/// characters are stripped, the result trimmed, and anything beyond 100
/// characters cut off with an ellipsis marker.
pub fn excerpt_of(content: &str) -> String {
    let stripped: String = content
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`' | '!' | '[' | ']' | '(' | ')'))
        .collect();
    let stripped = stripped.trim();

    if stripped.chars().count() <= EXCERPT_MAX_CHARS {
        stripped.to_string()
    } else {
        let mut cut: String = stripped.chars().take(EXCERPT_MAX_CHARS).collect();
        cut.push_str("...");
        cut
    }
}
