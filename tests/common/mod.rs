use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sqlx::Executor;
use tokio::sync::OnceCell;

static SERVER: OnceLock<TestServer> = OnceLock::new();
static SCHEMA: OnceCell<()> = OnceCell::const_new();

const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    // Held in a static, so never dropped; the server outlives the test binary
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_user-accounts-api"));
        cmd.env("PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("JWT_SECRET", "integration-test-secret")
            .env("SECURITY_BCRYPT_COST", "4")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited from the test environment
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

    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn apply_schema(database_url: &str) -> Result<()> {
    SCHEMA
        .get_or_try_init(|| async {
            let pool = sqlx::PgPool::connect(database_url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            pool.execute(SCHEMA_SQL).await.context("failed to apply schema")?;
            pool.close().await;
            Ok::<(), anyhow::Error>(())
        })
        .await?;
    Ok(())
}

/// Start the server once per test binary. Returns None when no database is
/// configured, so the suite degrades to a no-op instead of failing.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let _ = dotenvy::dotenv();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return Ok(None);
    };

    apply_schema(&database_url).await?;

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(Some(server))
}

/// Suffix that keeps usernames, emails and phone numbers unique across runs
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..12].to_string()
}

/// Digits-only variant for phone numbers
#[allow(dead_code)]
pub fn unique_phone() -> String {
    let digits: String = uuid::Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(12)
        .collect();
    format!("+{}", digits)
}
