use chrono::Utc;
use sea_orm::{DatabaseBackend, DbConn, MockDatabase, MockExecResult};
use uuid::Uuid;

use scriptorium_core::domain::{LengthClass, Post, PostStatus, Quote};
use scriptorium_core::error::RepoError;
use scriptorium_core::ports::{BaseRepository, PostRepository, QuoteStore};

use crate::database::entity::{post, quote};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresQuoteStore};

fn post_model(id: Uuid, status: &str) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        quote_id: Uuid::new_v4(),
        image: vec![0x89, b'P', b'N', b'G'],
        caption: "The ash remembers.".to_owned(),
        hashtags: serde_json::json!(["#darkacademia", "#bookstagram"]),
        call_to_action: "Follow for more fragments of the Order".to_owned(),
        full_caption: "The ash remembers.\n\n— We Burned, Quietly".to_owned(),
        status: status.to_owned(),
        forced_repeat: false,
        created_at: now.into(),
        approved_at: None,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "pending")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.id, post_id);
    assert_eq!(post.status, PostStatus::Pending);
    assert_eq!(post.hashtags, vec!["#darkacademia", "#bookstagram"]);
}

#[tokio::test]
async fn test_unknown_status_is_a_query_error() {
    let post_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(post_id, "rejected")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Result<Option<Post>, _> = repo.find_by_id(post_id).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_find_by_status_maps_rows() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            post_model(Uuid::new_v4(), "approved"),
            post_model(Uuid::new_v4(), "approved"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let posts = repo.find_by_status(PostStatus::Approved).await.unwrap();
    assert_eq!(posts.len(), 2);
    assert!(posts.iter().all(|p| p.status == PostStatus::Approved));
}

#[tokio::test]
async fn test_list_quotes() {
    let quote_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![quote::Model {
            id: quote_id,
            text: "We burned, quietly.".to_owned(),
            theme: "loss".to_owned(),
            tone: "melancholic".to_owned(),
            length: "short".to_owned(),
            visual_keywords: serde_json::json!(["ashes", "candlelight"]),
            last_selected_at: None,
            times_selected: 0,
            position: 0,
        }]])
        .into_connection();

    let store = PostgresQuoteStore::new(db);

    let quotes = store.list().await.unwrap();
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0].id, quote_id);
    assert_eq!(quotes[0].length, LengthClass::Short);
    assert_eq!(quotes[0].visual_keywords, vec!["ashes", "candlelight"]);
}

fn exec_result(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

/// SQL of every logged statement, one entry per transaction.
fn logged_sql(db: DbConn) -> Vec<Vec<String>> {
    db.into_transaction_log()
        .iter()
        .map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()).collect())
        .collect()
}

#[tokio::test]
async fn test_record_selection_keeps_latest_timestamp() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_result(1)])
        .into_connection();

    let store = PostgresQuoteStore::new(db);
    store.record_selection(Uuid::new_v4(), Utc::now()).await.unwrap();

    let log = logged_sql(store.db);
    assert_eq!(log.len(), 1);
    let sql = &log[0][0];
    assert!(sql.starts_with("UPDATE \"quotes\""));
    assert!(sql.contains("GREATEST(COALESCE(last_selected_at, $"));
    assert!(sql.contains("\"times_selected\" = \"times_selected\" + $"));
}

#[tokio::test]
async fn test_record_selection_of_unknown_quote_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_result(0)])
        .into_connection();

    let store = PostgresQuoteStore::new(db);
    let result = store.record_selection(Uuid::new_v4(), Utc::now()).await;
    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_replace_all_deletes_and_inserts_in_one_transaction() {
    let quotes = vec![
        Quote::new("We burned, quietly.", "loss", "melancholic", LengthClass::Short, vec![]).unwrap(),
        Quote::new("The ash remembers.", "memory", "solemn", LengthClass::Short, vec![]).unwrap(),
    ];

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_result(5), exec_result(2)])
        .into_connection();

    let store = PostgresQuoteStore::new(db);
    assert_eq!(store.replace_all(quotes).await.unwrap(), 2);

    let log = logged_sql(store.db);
    assert_eq!(log.len(), 1, "expected a single transaction, got {log:?}");
    let statements = &log[0];
    assert_eq!(statements.len(), 4);
    assert_eq!(statements[0], "BEGIN");
    assert!(statements[1].starts_with("DELETE FROM \"quotes\""));
    assert!(statements[2].starts_with("INSERT INTO \"quotes\""));
    assert_eq!(statements[3], "COMMIT");
}

#[tokio::test]
async fn test_replace_all_with_empty_bank_only_deletes() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([exec_result(3)])
        .into_connection();

    let store = PostgresQuoteStore::new(db);
    assert_eq!(store.replace_all(Vec::new()).await.unwrap(), 0);

    let log = logged_sql(store.db);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].len(), 3);
    assert!(log[0][1].starts_with("DELETE FROM \"quotes\""));
    assert_eq!(log[0][2], "COMMIT");
}

#[tokio::test]
async fn test_save_inserts_when_update_finds_no_row() {
    let post_id = Uuid::new_v4();
    let model = post_model(post_id, "pending");
    let post = Post::try_from(model.clone()).unwrap();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = repo.save(post).await.unwrap();
    assert_eq!(saved.id, post_id);
    assert_eq!(saved.status, PostStatus::Pending);

    let log = logged_sql(repo.db);
    assert_eq!(log.len(), 2);
    assert!(log[0][0].starts_with("UPDATE \"posts\""));
    assert!(log[1][0].starts_with("INSERT INTO \"posts\""));
}

#[tokio::test]
async fn test_save_updates_existing_row_without_insert() {
    let post_id = Uuid::new_v4();
    let mut model = post_model(post_id, "approved");
    model.approved_at = Some(Utc::now().into());
    let post = Post::try_from(model.clone()).unwrap();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let saved = repo.save(post).await.unwrap();
    assert_eq!(saved.status, PostStatus::Approved);

    let log = logged_sql(repo.db);
    assert_eq!(log.len(), 1);
    assert!(log[0][0].starts_with("UPDATE \"posts\""));
}
