use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info};
use wedding_invitation_api::{create_router, ApiState, InvitationApiConfig};

pub use wedding_site::bench_support::random_slug;

/// Runs the invitation API on an ephemeral port against throwaway storage.
pub struct TestHarness {
    temp_dir: TempDir,
    addr: SocketAddr,
    http_client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

impl TestHarness {
    pub async fn start() -> Result<Self> {
        tracing_subscriber::fmt::try_init().ok();

        let temp_dir = TempDir::new().context("creating harness tempdir")?;
        let config = InvitationApiConfig {
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            data_dir: temp_dir.path().join("data"),
            music_dir: temp_dir.path().join("music"),
            tenant_cache_ttl_secs: 5,
            ..Default::default()
        };
        config.validate().context("validating harness config")?;

        let state = Arc::new(ApiState::new(config).context("building api state")?);
        let router = create_router(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding ephemeral port")?;
        let addr = listener.local_addr().context("reading socket address")?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            let result = axum::serve(listener, router.into_make_service())
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await;
            if let Err(err) = result {
                error!("invitation-api test server failed: {err:#}");
            }
        });

        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("building reqwest client")?;

        let harness = Self {
            temp_dir,
            addr,
            http_client,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        };
        harness
            .wait_for_health(Duration::from_secs(10))
            .await
            .context("waiting for invitation-api health")?;
        info!(%addr, "invitation-api test server ready");
        Ok(harness)
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub fn music_dir(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("music")
    }

    pub async fn wait_for_health(&self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let url = self.url("/health");
        while start.elapsed() < timeout {
            match self.http_client.get(&url).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                Ok(response) => debug!("health check returned {}", response.status()),
                Err(err) => debug!("health check failed: {err}"),
            }
            sleep(Duration::from_millis(50)).await;
        }
        bail!("timed out waiting for {url}")
    }

    pub async fn get(&self, path: &str) -> Result<Response> {
        self.http_client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {path}"))
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Response> {
        self.http_client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path}"))
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<Response> {
        self.http_client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {path}"))
    }

    pub async fn create_tenant(&self, slug: &str, config: &Value) -> Result<Value> {
        let response = self
            .post(
                "/api/tenants",
                &json!({ "slug": slug, "name": format!("Wedding of {slug}"), "config": config }),
            )
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("tenant creation failed: {status} {body}");
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn set_tenant_active(&self, slug: &str, is_active: bool) -> Result<()> {
        let response = self
            .put(&format!("/api/tenants/{slug}"), &json!({ "isActive": is_active }))
            .await?;
        if !response.status().is_success() {
            bail!("tenant update failed: {}", response.status());
        }
        Ok(())
    }

    pub fn write_track(&self, slug: &str, file_name: &str) -> Result<()> {
        let dir = self.music_dir().join(slug);
        std::fs::create_dir_all(&dir).context("creating tenant music dir")?;
        write_file(&dir.join(file_name), b"ID3")
    }

    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
        if let Some(server) = self.server.take() {
            if let Err(err) = server.await {
                error!("failed to await server shutdown: {err}");
            }
        }
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.send(()).ok();
        }
    }
}

pub fn default_wedding_config() -> Value {
    json!({
        "weddingDate": "2099-09-20T16:30:00Z",
        "venue": "Lakeside Pavilion",
        "theme": { "primaryColor": "#b76e79" }
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("writing {}", path.display()))
}
