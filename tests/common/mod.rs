#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const ADMIN_EMAIL: &str = "admin@crm.test";
pub const ADMIN_PASSWORD: &str = "admin-secret-1";
pub const AGENT_PASSWORD: &str = "agent-secret-1";

static SERVER: OnceLock<TestServer> = OnceLock::new();
static EMAIL_SEQ: AtomicU64 = AtomicU64::new(0);

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

        // Each suite gets its own process with an in-memory store, so suites
        // never see each other's documents and no database is needed.
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_crm-api"));
        cmd.env("CRM_BIND", "127.0.0.1")
            .env("CRM_PORT", port.to_string())
            .env("CRM_STORE", "memory")
            .env("CRM_JWT_SECRET", "integration-test-secret")
            .env("CRM_ADMIN_EMAIL", ADMIN_EMAIL)
            .env("CRM_ADMIN_PASSWORD", ADMIN_PASSWORD)
            .env("CRM_ADMIN_NAME", "Root Admin")
            .env("SECURITY_ENABLE_AUDIT_LOGGING", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
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
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Unique-per-run email so repeated registrations never collide.
pub fn unique_email(prefix: &str) -> String {
    let n = EMAIL_SEQ.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}@crm.test", prefix, std::process::id(), n)
}

/// Registers an account and returns its token and public user document.
pub async fn register(
    server: &TestServer,
    client: &reqwest::Client,
    name: &str,
    email: &str,
    password: &str,
) -> Result<(String, Value)> {
    let res = client
        .post(server.url("/api/users/register"))
        .json(&json!({"name": name, "email": email, "password": password}))
        .send()
        .await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "register of {} failed with {}",
        email,
        res.status()
    );
    let body: Value = res.json().await?;
    let token = body["token"]
        .as_str()
        .context("register response missing token")?
        .to_string();
    Ok((token, body["user"].clone()))
}

/// Registers a fresh agent under a generated email.
pub async fn register_agent(
    server: &TestServer,
    client: &reqwest::Client,
    name: &str,
) -> Result<(String, Value)> {
    register(server, client, name, &unique_email("agent"), AGENT_PASSWORD).await
}

pub async fn login(
    server: &TestServer,
    client: &reqwest::Client,
    email: &str,
    password: &str,
) -> Result<reqwest::Response> {
    Ok(client
        .post(server.url("/api/users/login"))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await?)
}

/// Token for the bootstrapped admin account.
pub async fn admin_token(server: &TestServer, client: &reqwest::Client) -> Result<String> {
    let res = login(server, client, ADMIN_EMAIL, ADMIN_PASSWORD).await?;
    anyhow::ensure!(
        res.status() == StatusCode::OK,
        "admin login failed with {}",
        res.status()
    );
    let body: Value = res.json().await?;
    body["token"]
        .as_str()
        .map(String::from)
        .context("admin login response missing token")
}

pub fn id_of(user: &Value) -> String {
    user["id"].as_str().unwrap_or_default().to_string()
}
