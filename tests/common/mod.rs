#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::json;

use storefront_api::auth::{generate_jwt, Claims};
use storefront_api::config::ApiConfig;
use storefront_api::http::HttpHelper;
use url::Url;

pub const SECRET: &str = "integration-secret";
pub const ADMIN_ID: &str = "admin-1";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    users_file: PathBuf,
    child: Child,
}

impl TestServer {
    /// Spawn the backend binary on a free port with a one-admin users file.
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let users_file = std::env::temp_dir().join(format!("storefront-users-{}.json", uuid::Uuid::new_v4()));
        let users = json!([
            {"id": ADMIN_ID, "name": "admin", "email": "admin@example.com", "role": "admin", "password": "s3cret"}
        ]);
        std::fs::write(&users_file, users.to_string()).context("failed to write users file")?;

        let child = Command::new(env!("CARGO_BIN_EXE_storefront-api"))
            .env("APP_ENV", "development")
            .env("STOREFRONT_PORT", port.to_string())
            .env("TOKEN_SECRET", SECRET)
            .env("STOREFRONT_USERS_FILE", &users_file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        let server = Self {
            port,
            base_url,
            users_file,
            child,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self) -> Url {
        Url::parse(&self.base_url).expect("server url")
    }

    /// A helper that sends the admin's bearer token.
    pub fn admin_http(&self) -> HttpHelper {
        self.http().with_bearer(&admin_token())
    }

    pub fn http(&self) -> HttpHelper {
        HttpHelper::new(&ApiConfig {
            base_url: self.base_url.clone(),
            request_timeout_secs: Some(5),
        })
        .expect("http helper")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_file(&self.users_file);
    }
}

pub fn admin_token() -> String {
    token_for(ADMIN_ID)
}

pub fn token_for(user_id: &str) -> String {
    generate_jwt(&Claims::new(user_id, 1).expect("claims"), SECRET).expect("sign token")
}
