//! Integration tests for the file-backed credential store.

use jobboard_core::{AccessToken, CredentialStore, RefreshToken, TokenPair};
use jobboard_file::{CREDENTIALS_FILE, FileCredentialStore};
use tempfile::TempDir;

fn login_pair() -> TokenPair {
    TokenPair::new(
        AccessToken::new("access-1"),
        Some(RefreshToken::new("refresh-1")),
    )
}

#[tokio::test]
async fn test_missing_file_means_no_session() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::in_dir(dir.path()).unwrap();

    assert!(store.access_token().await.unwrap().is_none());
    assert!(store.refresh_token().await.unwrap().is_none());
    assert!(store.updated_at().await.unwrap().is_none());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_tokens_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::in_dir(dir.path()).unwrap();
    store.store_tokens(login_pair()).await.unwrap();

    let reopened = FileCredentialStore::in_dir(dir.path()).unwrap();
    assert_eq!(
        reopened.access_token().await.unwrap(),
        Some(AccessToken::new("access-1"))
    );
    assert_eq!(
        reopened.refresh_token().await.unwrap(),
        Some(RefreshToken::new("refresh-1"))
    );
    assert!(reopened.updated_at().await.unwrap().is_some());
}

#[tokio::test]
async fn test_refresh_replaces_only_access_token() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::in_dir(dir.path()).unwrap();
    store.store_tokens(login_pair()).await.unwrap();

    store
        .set_access_token(AccessToken::new("access-2"))
        .await
        .unwrap();

    assert_eq!(
        store.access_token().await.unwrap(),
        Some(AccessToken::new("access-2"))
    );
    assert_eq!(
        store.refresh_token().await.unwrap(),
        Some(RefreshToken::new("refresh-1"))
    );
}

#[tokio::test]
async fn test_clear_removes_file() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::in_dir(dir.path()).unwrap();
    store.store_tokens(login_pair()).await.unwrap();
    assert!(dir.path().join(CREDENTIALS_FILE).exists());

    store.clear().await.unwrap();

    assert!(!dir.path().join(CREDENTIALS_FILE).exists());
    assert!(store.access_token().await.unwrap().is_none());
    assert!(store.refresh_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_clearing_one_slot_keeps_the_other() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::in_dir(dir.path()).unwrap();
    store.store_tokens(login_pair()).await.unwrap();

    store.clear_access_token().await.unwrap();

    assert!(store.access_token().await.unwrap().is_none());
    assert_eq!(
        store.refresh_token().await.unwrap(),
        Some(RefreshToken::new("refresh-1"))
    );
}

#[tokio::test]
async fn test_two_handles_share_state() {
    let dir = TempDir::new().unwrap();
    let first = FileCredentialStore::in_dir(dir.path()).unwrap();
    let second = FileCredentialStore::in_dir(dir.path()).unwrap();

    first.store_tokens(login_pair()).await.unwrap();
    assert_eq!(
        second.access_token().await.unwrap(),
        Some(AccessToken::new("access-1"))
    );

    second.clear().await.unwrap();
    assert!(first.access_token().await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_writers_do_not_lose_updates() {
    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::in_dir(dir.path()).unwrap();

    let access = {
        let store = store.clone();
        tokio::spawn(async move { store.set_access_token(AccessToken::new("a")).await })
    };
    let refresh = {
        let store = store.clone();
        tokio::spawn(async move { store.set_refresh_token(RefreshToken::new("r")).await })
    };
    access.await.unwrap().unwrap();
    refresh.await.unwrap().unwrap();

    assert_eq!(store.access_token().await.unwrap(), Some(AccessToken::new("a")));
    assert_eq!(
        store.refresh_token().await.unwrap(),
        Some(RefreshToken::new("r"))
    );
}

#[cfg(unix)]
#[tokio::test]
async fn test_credentials_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let store = FileCredentialStore::in_dir(dir.path()).unwrap();
    store.store_tokens(login_pair()).await.unwrap();

    let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_open_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("state").join(CREDENTIALS_FILE);
    let store = FileCredentialStore::open(&path).unwrap();
    store.store_tokens(login_pair()).await.unwrap();
    assert!(path.exists());
}
