//! End-to-end registration over a real TCP listener.
//!
//! Each test opens a fresh SQLite file, serves the full application router on an
//! ephemeral port, and drives it through `RegistrationClient`.

use anyhow::{Context, Result};
use enlist::{
    api,
    client::{Outcome, RegistrationClient, RegistrationForm},
    registration::Registrar,
    store::SqliteStore,
};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc};
use tokio::{net::TcpListener, task::JoinHandle};
use ulid::Ulid;

struct TestServer {
    base_url: String,
    store: SqliteStore,
    db_path: PathBuf,
    handle: JoinHandle<Result<()>>,
}

impl TestServer {
    async fn start() -> Result<Self> {
        let db_path = std::env::temp_dir().join(format!("enlist-it-{}.db", Ulid::new()));
        let dsn = format!("sqlite://{}", db_path.display());
        let store = SqliteStore::connect(&dsn)
            .await
            .context("failed to open test database")?;

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let registrar = Registrar::new(Arc::new(store.clone()));
        let handle = tokio::spawn(api::serve(listener, registrar));

        Ok(Self {
            base_url: format!("http://{addr}"),
            store,
            db_path,
            handle,
        })
    }

    fn client(&self) -> Result<RegistrationClient> {
        Ok(RegistrationClient::new(&self.base_url)?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
        let _ = std::fs::remove_file(&self.db_path);
    }
}

fn form(username: &str, email: &str, password: &str) -> RegistrationForm {
    RegistrationForm {
        username: username.to_string(),
        email: email.to_string(),
        password: SecretString::from(password.to_string()),
    }
}

#[tokio::test]
async fn register_then_repeat_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    let first = client.submit(&form("alice", "alice@x.com", "secret")).await;
    assert_eq!(
        first,
        Outcome::Registered("User registered successfully".to_string())
    );
    assert_eq!(server.store.user_count().await?, 1);

    let second = client.submit(&form("alice", "alice@x.com", "secret")).await;
    assert_eq!(
        second,
        Outcome::Rejected {
            status: 400,
            message: "Username or email already registered".to_string()
        }
    );
    assert_eq!(server.store.user_count().await?, 1);

    let user = server
        .store
        .find_by_username("alice")
        .await?
        .context("alice should be stored")?;
    assert_ne!(user.password_hash, "secret");
    assert!(bcrypt::verify("secret", &user.password_hash)?);
    Ok(())
}

#[tokio::test]
async fn empty_username_is_rejected() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    let outcome = client.submit(&form("", "b@x.com", "pw")).await;

    assert_eq!(
        outcome,
        Outcome::Rejected {
            status: 400,
            message: "All fields are required".to_string()
        }
    );
    assert_eq!(server.store.user_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn distinct_users_each_get_a_record() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    for (username, email) in [("alice", "alice@x.com"), ("bob", "bob@x.com")] {
        let outcome = client.submit(&form(username, email, "pw")).await;
        assert!(matches!(outcome, Outcome::Registered(_)), "{outcome:?}");
    }
    assert_eq!(server.store.user_count().await?, 2);
    Ok(())
}

#[tokio::test]
async fn concurrent_duplicates_create_one_record() -> Result<()> {
    let server = TestServer::start().await?;
    let client = server.client()?;

    let submissions = (0..4).map(|_| {
        let client = client.clone();
        tokio::spawn(async move { client.submit(&form("carol", "carol@x.com", "pw")).await })
    });

    let mut registered = 0;
    for submission in submissions.collect::<Vec<_>>() {
        match submission.await? {
            Outcome::Registered(_) => registered += 1,
            Outcome::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Username or email already registered");
            }
            Outcome::Transport(reason) => panic!("transport failure: {reason}"),
        }
    }

    assert_eq!(registered, 1);
    assert_eq!(server.store.user_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_transport_outcome() -> Result<()> {
    // Reserve a port, then release it so nothing is listening there.
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);

    let client = RegistrationClient::new(&format!("http://{addr}"))?;
    let outcome = client.submit(&form("dave", "dave@x.com", "pw")).await;

    assert!(matches!(outcome, Outcome::Transport(_)), "{outcome:?}");
    Ok(())
}

#[tokio::test]
async fn health_is_served_alongside_register() -> Result<()> {
    let server = TestServer::start().await?;

    let response = reqwest::get(format!("{}/health", server.base_url)).await?;

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let payload: serde_json::Value = response.json().await?;
    assert_eq!(payload["database"], "ok");
    Ok(())
}
