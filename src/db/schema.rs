//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `posts` table (long-form articles, one unique slug per row)
/// - `thoughts` table (short mood-tagged notes)
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- Posts (slug is the business key, created_at is set once on first insert)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY NOT NULL,
    slug TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    excerpt TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]', -- JSON array of strings
    read_time TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at);

-- ---------------------------------------------------------------------------
-- Thoughts
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS thoughts (
    id INTEGER PRIMARY KEY NOT NULL,
    content TEXT NOT NULL,
    mood TEXT NOT NULL DEFAULT 'neutral',
    created_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_thoughts_created_at ON thoughts(created_at);
"#;
