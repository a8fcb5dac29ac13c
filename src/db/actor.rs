use crate::db::models::{DbPost, DbThought, Mood, Post, Thought, excerpt_of};
use crate::db::patch::{PostUpsert, ThoughtSave};
use crate::db::schema::SQLITE_INIT;
use crate::error::InkstoneError;
use chrono::Utc;
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum DbActorMessage {
    /// Liveness probe against the pool.
    Ping(RpcReplyPort<Result<(), InkstoneError>>),

    /// List all posts, newest first.
    ListPosts(RpcReplyPort<Result<Vec<Post>, InkstoneError>>),

    /// Get a single post by slug.
    GetPost(String, RpcReplyPort<Result<Option<Post>, InkstoneError>>),

    /// Insert-or-update a post keyed on slug. `created_at` is set on first
    /// insert only.
    UpsertPost(PostUpsert, RpcReplyPort<Result<(), InkstoneError>>),

    /// Delete a post by slug; deleting an absent slug succeeds.
    DeletePost(String, RpcReplyPort<Result<(), InkstoneError>>),

    /// List all thoughts, newest first.
    ListThoughts(RpcReplyPort<Result<Vec<Thought>, InkstoneError>>),

    /// Insert a thought (no id) or update content/mood of an existing one.
    SaveThought(ThoughtSave, RpcReplyPort<Result<(), InkstoneError>>),

    /// Delete a thought by id; deleting an absent id succeeds.
    DeleteThought(i64, RpcReplyPort<Result<(), InkstoneError>>),
}

#[derive(Clone)]
pub struct DbActorHandle {
    actor: ActorRef<DbActorMessage>,
}

impl DbActorHandle {
    pub async fn ping(&self) -> Result<(), InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::Ping)
            .map_err(|e| InkstoneError::RactorError(format!("DbActor Ping RPC failed: {e}")))?
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::ListPosts)
            .map_err(|e| InkstoneError::RactorError(format!("DbActor ListPosts RPC failed: {e}")))?
    }

    pub async fn get_post(&self, slug: String) -> Result<Option<Post>, InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::GetPost, slug)
            .map_err(|e| InkstoneError::RactorError(format!("DbActor GetPost RPC failed: {e}")))?
    }

    pub async fn upsert_post(&self, upsert: PostUpsert) -> Result<(), InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::UpsertPost, upsert)
            .map_err(|e| InkstoneError::RactorError(format!("DbActor UpsertPost RPC failed: {e}")))?
    }

    pub async fn delete_post(&self, slug: String) -> Result<(), InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::DeletePost, slug)
            .map_err(|e| InkstoneError::RactorError(format!("DbActor DeletePost RPC failed: {e}")))?
    }

    pub async fn list_thoughts(&self) -> Result<Vec<Thought>, InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::ListThoughts).map_err(|e| {
            InkstoneError::RactorError(format!("DbActor ListThoughts RPC failed: {e}"))
        })?
    }

    pub async fn save_thought(&self, save: ThoughtSave) -> Result<(), InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::SaveThought, save).map_err(|e| {
            InkstoneError::RactorError(format!("DbActor SaveThought RPC failed: {e}"))
        })?
    }

    pub async fn delete_thought(&self, id: i64) -> Result<(), InkstoneError> {
        ractor::call!(self.actor, DbActorMessage::DeleteThought, id).map_err(|e| {
            InkstoneError::RactorError(format!("DbActor DeleteThought RPC failed: {e}"))
        })?
    }
}

struct DbActorState {
    pool: SqlitePool,
}

struct DbActor;

#[ractor::async_trait]
impl Actor for DbActor {
    type Msg = DbActorMessage;
    type State = DbActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        apply_schema(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("DbActor initialized");
        Ok(DbActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            DbActorMessage::Ping(reply) => {
                let res = sqlx::query("SELECT 1")
                    .execute(&state.pool)
                    .await
                    .map(|_| ())
                    .map_err(InkstoneError::from);
                let _ = reply.send(res);
            }
            DbActorMessage::ListPosts(reply) => {
                let res = self.list_posts(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::GetPost(slug, reply) => {
                let res = self.get_post(&state.pool, &slug).await;
                let _ = reply.send(res);
            }
            DbActorMessage::UpsertPost(upsert, reply) => {
                let res = self.upsert_post(&state.pool, upsert).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeletePost(slug, reply) => {
                let res = self.delete_post(&state.pool, &slug).await;
                let _ = reply.send(res);
            }
            DbActorMessage::ListThoughts(reply) => {
                let res = self.list_thoughts(&state.pool).await;
                let _ = reply.send(res);
            }
            DbActorMessage::SaveThought(save, reply) => {
                let res = self.save_thought(&state.pool, save).await;
                let _ = reply.send(res);
            }
            DbActorMessage::DeleteThought(id, reply) => {
                let res = self.delete_thought(&state.pool, id).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl DbActor {
    async fn list_posts(&self, pool: &SqlitePool) -> Result<Vec<Post>, InkstoneError> {
        let rows = sqlx::query_as::<_, DbPost>(
            r#"
        SELECT id, slug, title, content, excerpt, tags, read_time, created_at
        FROM posts
        ORDER BY created_at DESC, id DESC
        "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, pool: &SqlitePool, slug: &str) -> Result<Option<Post>, InkstoneError> {
        let row = sqlx::query_as::<_, DbPost>(
            r#"
        SELECT id, slug, title, content, excerpt, tags, read_time, created_at
        FROM posts
        WHERE slug = ?
        "#,
        )
        .bind(slug)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Post::from))
    }

    /// Single compound statement so concurrent upserts on one slug cannot
    /// interleave a read-then-write. The update arm leaves `created_at`
    /// alone.
    async fn upsert_post(
        &self,
        pool: &SqlitePool,
        upsert: PostUpsert,
    ) -> Result<(), InkstoneError> {
        let excerpt = excerpt_of(&upsert.content);
        let tags = serde_json::to_string(&upsert.tags)?;
        let now = Utc::now();

        sqlx::query(
            r#"
        INSERT INTO posts (slug, title, content, excerpt, tags, read_time, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(slug) DO UPDATE SET
            title=excluded.title,
            content=excluded.content,
            excerpt=excluded.excerpt,
            tags=excluded.tags,
            read_time=excluded.read_time
        "#,
        )
        .bind(&upsert.slug)
        .bind(&upsert.title)
        .bind(&upsert.content)
        .bind(&excerpt)
        .bind(&tags)
        .bind(&upsert.read_time)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    async fn delete_post(&self, pool: &SqlitePool, slug: &str) -> Result<(), InkstoneError> {
        sqlx::query("DELETE FROM posts WHERE slug = ?")
            .bind(slug)
            .execute(pool)
            .await?;

        Ok(())
    }

    async fn list_thoughts(&self, pool: &SqlitePool) -> Result<Vec<Thought>, InkstoneError> {
        let rows = sqlx::query_as::<_, DbThought>(
            r#"
        SELECT id, content, mood, created_at
        FROM thoughts
        ORDER BY created_at DESC, id DESC
        "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Thought::from).collect())
    }

    /// Updating a missing id is a successful no-op, mirroring delete's
    /// idempotence.
    async fn save_thought(&self, pool: &SqlitePool, save: ThoughtSave) -> Result<(), InkstoneError> {
        let mood = Mood::parse_or_default(save.mood.as_deref().unwrap_or(""));

        match save.id {
            Some(id) => {
                sqlx::query("UPDATE thoughts SET content = ?, mood = ? WHERE id = ?")
                    .bind(&save.content)
                    .bind(mood.as_str())
                    .bind(id)
                    .execute(pool)
                    .await?;
            }
            None => {
                let now = Utc::now();
                sqlx::query("INSERT INTO thoughts (content, mood, created_at) VALUES (?, ?, ?)")
                    .bind(&save.content)
                    .bind(mood.as_str())
                    .bind(now)
                    .execute(pool)
                    .await?;
            }
        }

        Ok(())
    }

    async fn delete_thought(&self, pool: &SqlitePool, id: i64) -> Result<(), InkstoneError> {
        sqlx::query("DELETE FROM thoughts WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}

/// Spawn the database actor and return a cloneable handle.
pub async fn spawn(database_url: &str) -> DbActorHandle {
    let (actor, _jh) = ractor::Actor::spawn(None, DbActor, database_url.to_string())
        .await
        .expect("failed to spawn DbActor");

    DbActorHandle { actor }
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), InkstoneError> {
    for stmt in SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
