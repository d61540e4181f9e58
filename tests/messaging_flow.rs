use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use courier_chat::crypto::{HashingParams, TokenSigner};
use courier_chat::error::AppError;
use courier_chat::service::{IdentityService, MessageService, NewUser};

async fn test_pool() -> Pool<Sqlite> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flow_test.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    std::mem::forget(dir);

    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .unwrap();

    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    pool
}

fn test_hashing() -> HashingParams {
    HashingParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    }
}

fn new_user(username: &str, password: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        password: password.to_string(),
        first_name: format!("{}-first", username),
        last_name: format!("{}-last", username),
        phone: "555-0000".to_string(),
    }
}

#[tokio::test]
async fn full_messaging_flow() {
    let pool = test_pool().await;
    let identity = IdentityService::new(
        pool.clone(),
        TokenSigner::new("flow-test-secret"),
        test_hashing(),
    );
    let messages = MessageService::new(pool);

    // Three accounts
    for (name, pass) in [
        ("alice", "wonderland"),
        ("bob", "builder"),
        ("carol", "christmas"),
    ] {
        identity.register(new_user(name, pass)).await.unwrap();
    }

    // Alice logs in and her token asserts her identity
    let alice_token = identity.login("alice", "wonderland").await.unwrap();
    let alice = identity.verify_token(&alice_token).unwrap();
    assert_eq!(alice, "alice");

    // Alice messages Bob
    let sent = messages.send(&alice, "bob", "hello bob").await.unwrap();
    assert!(sent.read_at.is_none());

    // Bob logs in and reads it
    let bob_token = identity.login("bob", "builder").await.unwrap();
    let bob = identity.verify_token(&bob_token).unwrap();

    let detail = messages.get_for_viewer(&sent.id, &bob).await.unwrap();
    assert_eq!(detail.body, "hello bob");
    assert_eq!(detail.from_user.username, "alice");
    assert_eq!(detail.to_user.username, "bob");
    assert!(detail.read_at.is_none());

    // Bob marks it read; both participants now see the stamp
    let marked = messages.mark_read(&sent.id, &bob).await.unwrap();
    assert!(marked.read_at.is_some());

    let as_alice = messages.get_for_viewer(&sent.id, &alice).await.unwrap();
    assert_eq!(as_alice.read_at, marked.read_at);

    // Carol is not a participant and sees nothing
    let err = messages.get_for_viewer(&sent.id, "carol").await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // The conversation shows up in both users' folders
    let from_alice = messages.messages_from("alice").await.unwrap();
    assert_eq!(from_alice.len(), 1);
    assert_eq!(from_alice[0].to_user.username, "bob");

    let to_bob = messages.messages_to("bob").await.unwrap();
    assert_eq!(to_bob.len(), 1);
    assert_eq!(to_bob[0].from_user.username, "alice");
}

#[tokio::test]
async fn tokens_do_not_cross_service_boundaries() {
    let pool_a = test_pool().await;
    let pool_b = test_pool().await;

    let service_a = IdentityService::new(pool_a, TokenSigner::new("secret-a"), test_hashing());
    let service_b = IdentityService::new(pool_b, TokenSigner::new("secret-b"), test_hashing());

    service_a
        .register(new_user("alice", "wonderland"))
        .await
        .unwrap();

    let token = service_a.login("alice", "wonderland").await.unwrap();
    assert_eq!(service_a.verify_token(&token).unwrap(), "alice");

    // Signed under a different secret, rejected outright
    let err = service_b.verify_token(&token).unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}
