#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use sqlx::Executor;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const ADMIN_EMAIL: &str = "admin@tirhuta.test";
const SCHEMA: &str = include_str!("../../schema/schema.sql");
const SCHEMA_LOCK_KEY: i64 = 7_340_021;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
    _uploads: tempfile::TempDir,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let uploads = tempfile::tempdir().context("failed to create uploads dir")?;

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tirhuta-api"));
        cmd.arg("--port")
            .arg(port.to_string())
            .arg("--host")
            .arg("127.0.0.1")
            .env("ADMIN_EMAIL", ADMIN_EMAIL)
            .env("STORAGE_ROOT", uploads.path())
            .env("STORAGE_PUBLIC_URL", format!("{}/uploads", base_url))
            .env("DATABASE_CONNECTION_TIMEOUT", "2")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited when set; otherwise the server runs degraded
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
            _uploads: uploads,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
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
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(server)
}

/// Database-backed tests are `#[ignore]`d and need DATABASE_URL when run.
/// The schema is installed once per database under an advisory lock.
pub async fn database() -> Result<sqlx::PgPool> {
    let url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set for database-backed tests")?;

    let pool = sqlx::PgPool::connect(&url).await.context("failed to connect to DATABASE_URL")?;
    let mut conn = pool.acquire().await?;
    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await?;
    let installed = (&mut *conn).execute(SCHEMA).await;
    sqlx::query("SELECT pg_advisory_unlock($1)")
        .bind(SCHEMA_LOCK_KEY)
        .execute(&mut *conn)
        .await?;
    installed.context("failed to install schema")?;

    Ok(pool)
}

/// Unique suffix so repeated runs never collide on unique columns
pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}

pub struct Session {
    pub id: i64,
    pub token: String,
}

/// Registers a fresh account; `email` decides whether it is the admin
pub async fn register(server: &TestServer, email: &str, full_name: &str) -> Result<Session> {
    let res = reqwest::Client::new()
        .post(server.url("/api/auth/register"))
        .json(&json!({
            "mobile_or_email": email,
            "full_name": full_name,
            "password": "correct horse battery",
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

    let body: Value = res.json().await?;
    Ok(Session {
        id: body["data"]["user"]["id"].as_i64().context("missing user id")?,
        token: body["data"]["token"].as_str().context("missing token")?.to_string(),
    })
}

pub async fn register_user(server: &TestServer) -> Result<Session> {
    let email = format!("{}@tirhuta.test", unique("user"));
    register(server, &email, "Test Viewer").await
}

/// The admin account is shared; later calls log in instead
pub async fn admin_session(server: &TestServer) -> Result<Session> {
    if let Ok(session) = register(server, ADMIN_EMAIL, "Admin").await {
        return Ok(session);
    }
    let res = reqwest::Client::new()
        .post(server.url("/api/auth/login"))
        .json(&json!({ "mobile_or_email": ADMIN_EMAIL, "password": "correct horse battery" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "admin login failed: {}", res.status());
    let body: Value = res.json().await?;
    Ok(Session {
        id: body["data"]["user"]["id"].as_i64().context("missing user id")?,
        token: body["data"]["token"].as_str().context("missing token")?.to_string(),
    })
}

/// Creates a video through the upload endpoint using a remote URL
pub async fn create_video(server: &TestServer, session: &Session, title: &str) -> Result<i64> {
    let res = reqwest::Client::new()
        .post(server.url("/api/videos"))
        .bearer_auth(&session.token)
        .json(&json!({ "title": title, "video_url": "https://cdn.tirhuta.test/v.mp4" }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "video upload failed: {}", res.status());
    let body: Value = res.json().await?;
    body["data"]["id"].as_i64().context("missing video id")
}
