//! Embeds the CLI version shown by `--version` and sent in the user agent.
//!
//! Precedence: `JOBBOARD_VERSION` from the build environment (release
//! pipelines), then `git describe`, then the crate version.

use std::process::Command;

const VERSION_ENV: &str = "JOBBOARD_VERSION";

fn main() {
    println!("cargo:rerun-if-env-changed={}", VERSION_ENV);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");

    let version = std::env::var(VERSION_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(describe)
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env={}={}", VERSION_ENV, version.trim_start_matches('v'));
}

fn describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;

    let described = String::from_utf8(output.stdout).ok()?;
    Some(described.trim().to_string()).filter(|v| !v.is_empty())
}
