//! Integration tests for the durable file session store.

use pressboard_client::core::{Credentials, Identity, Session, SessionStore};
use pressboard_client::infra::store::FileSessionStore;

fn sample_session() -> Session {
    Session {
        credentials: Credentials {
            access_token: "access-1".into(),
            refresh_token: "refresh-1".into(),
        },
        identity: Identity {
            user_id: 7,
            org_id: 2,
            role: 1,
        },
    }
}

#[tokio::test]
async fn test_load_without_file_starts_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::load(dir.path().join("session.json"))
        .await
        .unwrap();
    assert!(store.read().await.is_none());
}

#[tokio::test]
async fn test_session_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = FileSessionStore::load(&path).await.unwrap();
    store.start(sample_session()).await.unwrap();
    drop(store);

    let reopened = FileSessionStore::load(&path).await.unwrap();
    assert_eq!(reopened.read().await.unwrap(), sample_session());
}

#[tokio::test]
async fn test_credential_rotation_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = FileSessionStore::load(&path).await.unwrap();
    store.start(sample_session()).await.unwrap();
    store
        .write_credentials(Credentials {
            access_token: "access-2".into(),
            refresh_token: "refresh-2".into(),
        })
        .await
        .unwrap();
    drop(store);

    let reopened = FileSessionStore::load(&path).await.unwrap();
    let session = reopened.read().await.unwrap();
    assert_eq!(session.credentials.access_token, "access-2");
    assert_eq!(session.credentials.refresh_token, "refresh-2");
    assert_eq!(session.identity, sample_session().identity);
}

#[tokio::test]
async fn test_clear_removes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = FileSessionStore::load(&path).await.unwrap();
    store.start(sample_session()).await.unwrap();
    assert!(path.exists());

    store.clear().await.unwrap();
    assert!(store.read().await.is_none());
    assert!(!path.exists());

    // Clearing an already-cleared store is not an error.
    store.clear().await.unwrap();
}

#[tokio::test]
async fn test_rotation_without_session_fails() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::load(dir.path().join("session.json"))
        .await
        .unwrap();
    assert!(store
        .write_credentials(Credentials {
            access_token: "a".into(),
            refresh_token: "r".into(),
        })
        .await
        .is_err());
}

#[cfg(unix)]
#[tokio::test]
async fn test_session_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    let store = FileSessionStore::load(&path).await.unwrap();
    store.start(sample_session()).await.unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_corrupt_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    tokio::fs::write(&path, b"not json").await.unwrap();

    assert!(FileSessionStore::load(&path).await.is_err());
}
