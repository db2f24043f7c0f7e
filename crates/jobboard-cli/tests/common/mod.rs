use std::path::{Path, PathBuf};
use std::process::Output;

use tempfile::TempDir;
use tokio::process::Command;
use wiremock::MockServer;

/// Isolated CLI environment pointed at a mock API.
pub struct TestEnv {
    pub dir: TempDir,
    pub api_url: String,
}

impl TestEnv {
    pub fn new(server: &MockServer) -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
            api_url: format!("http://127.0.0.1:{}/api", server.address().port()),
        }
    }

    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("credentials.json")
    }

    /// Write a session into the credentials file.
    pub fn seed_session(&self, access: &str, refresh: Option<&str>) {
        let mut state = serde_json::json!({ "access_token": access });
        if let Some(refresh) = refresh {
            state["refresh_token"] = refresh.into();
        }
        std::fs::write(self.store_path(), state.to_string()).expect("Failed to seed session");
    }

    pub fn stored(&self) -> Option<serde_json::Value> {
        read_json(&self.store_path())
    }

    /// Run the CLI binary with arguments.
    pub async fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_jobboard"))
            .args(args)
            .arg("--api-url")
            .arg(&self.api_url)
            .arg("--store")
            .arg(self.store_path())
            .env("HOME", self.dir.path())
            .env_remove("JOBBOARD_PASSWORD")
            .env_remove("JOBBOARD_API_URL")
            .env_remove("JOBBOARD_CREDENTIALS")
            .output()
            .await
            .expect("Failed to execute CLI")
    }

    /// Run the CLI and expect success.
    pub async fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args).await;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run the CLI and expect failure.
    pub async fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args).await;
        if output.status.success() {
            panic!("CLI command should have failed: {:?}", args);
        }
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

fn read_json(path: &Path) -> Option<serde_json::Value> {
    let raw = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}
