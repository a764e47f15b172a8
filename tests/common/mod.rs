#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use helpdesk_api::access::Role;
use helpdesk_api::auth::{Identity, TokenCodec};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Secret the spawned server signs with, so tests can mint staff tokens.
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();
static NEXT_ACCOUNT: AtomicU32 = AtomicU32::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_helpdesk-api"));
        cmd.args(["serve", "--in-memory", "--port", &port.to_string()])
            .env("APP_ENV", "development")
            .env("JWT_SECRET", TEST_JWT_SECRET)
            .env("RUST_LOG", "helpdesk_api=warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn codec() -> TokenCodec {
    TokenCodec::with_default_ttl(TEST_JWT_SECRET.as_bytes()).expect("test secret is not empty")
}

/// Token for `user_id` with `role`, as if the account had been promoted and logged in again.
pub fn token_for(user_id: i64, role: Role) -> String {
    codec().issue(&Identity::new(user_id, role)).expect("token signs")
}

pub struct Account {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Registers a fresh account; emails are unique across the shared server.
pub async fn register(server: &TestServer, name: &str) -> Result<Account> {
    let n = NEXT_ACCOUNT.fetch_add(1, Ordering::SeqCst);
    let email = format!("{}-{}-{}@example.com", name, std::process::id(), n);

    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&json!({"username": name, "email": email, "password": "hunter2"}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register returned {}", res.status());

    let body: Value = res.json().await?;
    Ok(Account {
        id: body["data"]["user"]["id"].as_i64().context("user id")?,
        email,
        token: body["data"]["token"].as_str().context("token")?.to_string(),
    })
}
