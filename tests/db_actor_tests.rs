use inkstone::db::{PostUpsert, ThoughtSave};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "inkstone-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

async fn cleanup_db(db_path: &std::path::Path) {
    let wal_path = std::path::PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = std::path::PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    let _ = fs::remove_file(db_path).await;
}

fn post(slug: &str, title: &str, content: &str, tags: &[&str]) -> PostUpsert {
    PostUpsert {
        slug: slug.to_string(),
        title: title.to_string(),
        content: content.to_string(),
        tags: tags.iter().map(ToString::to_string).collect(),
        read_time: "3 min".to_string(),
    }
}

#[tokio::test]
async fn test_post_upsert_baseline() {
    let db_path = unique_sqlite_path("posts-baseline");
    let db = inkstone::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    // Fresh DB lists nothing.
    assert!(db.list_posts().await.unwrap().is_empty());
    assert!(db.get_post("hello-world".to_string()).await.unwrap().is_none());

    db.upsert_post(post(
        "hello-world",
        "Hello",
        "# Hi *there*!",
        &["a", "b"],
    ))
    .await
    .unwrap();

    let fetched = db
        .get_post("hello-world".to_string())
        .await
        .unwrap()
        .expect("post should exist after upsert");

    assert_eq!(fetched.slug, "hello-world");
    assert_eq!(fetched.title, "Hello");
    assert_eq!(fetched.content, "# Hi *there*!");
    assert_eq!(fetched.excerpt, "Hi there");
    assert_eq!(fetched.tags, vec!["a".to_string(), "b".to_string()]);
    assert_eq!(fetched.read_time, "3 min");
    assert!(fetched.created_at <= chrono::Utc::now());

    cleanup_db(&db_path).await;
}

#[tokio::test]
async fn test_reupserting_a_slug_updates_in_place_and_keeps_created_at() {
    let db_path = unique_sqlite_path("posts-reupsert");
    let db = inkstone::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    db.upsert_post(post("stable-slug", "First title", "first body", &["x"]))
        .await
        .unwrap();
    let first = db
        .get_post("stable-slug".to_string())
        .await
        .unwrap()
        .unwrap();

    db.upsert_post(post(
        "stable-slug",
        "Second title",
        "second body, rather longer than before",
        &["y", "z"],
    ))
    .await
    .unwrap();

    let second = db
        .get_post("stable-slug".to_string())
        .await
        .unwrap()
        .unwrap();

    // Same row: same id and original creation timestamp.
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    // All payload fields replaced, excerpt recomputed from the new content.
    assert_eq!(second.title, "Second title");
    assert_eq!(second.content, "second body, rather longer than before");
    assert_eq!(second.excerpt, "second body, rather longer than before");
    assert_eq!(second.tags, vec!["y".to_string(), "z".to_string()]);

    // Still exactly one row for the slug.
    assert_eq!(db.list_posts().await.unwrap().len(), 1);

    cleanup_db(&db_path).await;
}

#[tokio::test]
async fn test_list_posts_is_newest_first() {
    let db_path = unique_sqlite_path("posts-ordering");
    let db = inkstone::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    db.upsert_post(post("older", "Older", "one", &[]))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    db.upsert_post(post("newer", "Newer", "two", &[]))
        .await
        .unwrap();

    let listed = db.list_posts().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].slug, "newer");
    assert_eq!(listed[1].slug, "older");
    assert!(listed[0].created_at >= listed[1].created_at);

    cleanup_db(&db_path).await;
}

#[tokio::test]
async fn test_delete_post_is_idempotent() {
    let db_path = unique_sqlite_path("posts-delete");
    let db = inkstone::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    db.upsert_post(post("doomed", "Doomed", "body", &[]))
        .await
        .unwrap();

    db.delete_post("doomed".to_string()).await.unwrap();
    assert!(db.get_post("doomed".to_string()).await.unwrap().is_none());

    // Deleting again (and deleting a slug that never existed) still succeeds.
    db.delete_post("doomed".to_string()).await.unwrap();
    db.delete_post("never-existed".to_string()).await.unwrap();

    cleanup_db(&db_path).await;
}

#[tokio::test]
async fn test_malformed_stored_tags_do_not_break_listing() {
    let db_path = unique_sqlite_path("posts-bad-tags");
    let database_url = format!("sqlite:{}", db_path.display());
    let db = inkstone::db::spawn(&database_url).await;

    db.upsert_post(post("tagged", "Tagged", "body", &["ok"]))
        .await
        .unwrap();

    // Corrupt the stored tag encoding behind the actor's back.
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .connect(&database_url)
        .await
        .unwrap();
    sqlx::query("UPDATE posts SET tags = 'definitely not json' WHERE slug = 'tagged'")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let listed = db.list_posts().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].tags.is_empty());

    cleanup_db(&db_path).await;
}

#[tokio::test]
async fn test_thought_lifecycle() {
    let db_path = unique_sqlite_path("thoughts");
    let db = inkstone::db::spawn(&format!("sqlite:{}", db_path.display())).await;

    // Mood defaults to neutral when absent or unrecognized.
    db.save_thought(ThoughtSave {
        id: None,
        content: "no mood given".to_string(),
        mood: None,
    })
    .await
    .unwrap();
    db.save_thought(ThoughtSave {
        id: None,
        content: "weird mood given".to_string(),
        mood: Some("grumpy".to_string()),
    })
    .await
    .unwrap();
    db.save_thought(ThoughtSave {
        id: None,
        content: "feeling good".to_string(),
        mood: Some("happy".to_string()),
    })
    .await
    .unwrap();

    let listed = db.list_thoughts().await.unwrap();
    assert_eq!(listed.len(), 3);
    // Newest first.
    assert_eq!(listed[0].content, "feeling good");
    assert_eq!(listed[0].mood, inkstone::db::Mood::Happy);
    assert_eq!(listed[1].mood, inkstone::db::Mood::Neutral);
    assert_eq!(listed[2].mood, inkstone::db::Mood::Neutral);

    // Update in place: content/mood change, created_at and row count do not.
    let target = listed[0].clone();
    db.save_thought(ThoughtSave {
        id: Some(target.id),
        content: "feeling even better".to_string(),
        mood: Some("excited".to_string()),
    })
    .await
    .unwrap();

    let relisted = db.list_thoughts().await.unwrap();
    assert_eq!(relisted.len(), 3);
    let updated = relisted.iter().find(|t| t.id == target.id).unwrap();
    assert_eq!(updated.content, "feeling even better");
    assert_eq!(updated.mood, inkstone::db::Mood::Excited);
    assert_eq!(updated.created_at, target.created_at);

    // Updating a missing id is a successful no-op.
    db.save_thought(ThoughtSave {
        id: Some(999_999),
        content: "ghost".to_string(),
        mood: None,
    })
    .await
    .unwrap();
    assert_eq!(db.list_thoughts().await.unwrap().len(), 3);

    // Idempotent delete.
    db.delete_thought(target.id).await.unwrap();
    db.delete_thought(target.id).await.unwrap();
    assert_eq!(db.list_thoughts().await.unwrap().len(), 2);

    cleanup_db(&db_path).await;
}
