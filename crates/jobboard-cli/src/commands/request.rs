//! Generic request command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;

use jobboard_core::{Method, ResponseType};
use jobboard_http::{RequestOptions, ResponseBody};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: Method,

    /// Path relative to the API base URL (e.g., /jobs/42)
    pub path: String,

    /// JSON request body, or @FILE to read it from a file
    #[arg(long)]
    pub data: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_query)]
    pub query: Vec<(String, String)>,

    /// Extra header as "Name: value" (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Write the raw response body to a file instead of printing it
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub async fn run(args: RequestArgs, global: &GlobalArgs) -> Result<()> {
    let client = session::client(global)?;

    let mut options = RequestOptions::default();
    if let Some(data) = &args.data {
        options = options.json(read_body(data)?);
    }
    for (key, value) in args.query {
        options = options.query(key, value);
    }
    for (name, value) in &args.headers {
        options = options.header(name, value.clone());
    }
    if args.output.is_some() {
        options = options.response_type(ResponseType::Bytes);
    }

    let response = client
        .request(args.method, &args.path, options)
        .await
        .with_context(|| format!("{} {} failed", args.method, args.path))?;

    if let Some(path) = &args.output {
        let len = match response.body() {
            ResponseBody::Bytes(bytes) => bytes.len(),
            _ => 0,
        };
        tokio::fs::write(path, response.into_bytes())
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        output::success(&format!("Wrote {} bytes to {}", len, path.display()));
        return Ok(());
    }

    match response.body() {
        ResponseBody::Json(serde_json::Value::Null) => {
            output::success(&format!("HTTP {}", response.status()))
        }
        ResponseBody::Json(value) => output::json_pretty(value)?,
        ResponseBody::Text(text) => println!("{}", text),
        ResponseBody::Bytes(bytes) => println!("{}", String::from_utf8_lossy(bytes)),
    }

    Ok(())
}

fn read_body(data: &str) -> Result<serde_json::Value> {
    let raw = match data.strip_prefix('@') {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?
        }
        None => data.to_string(),
    };
    serde_json::from_str(&raw).context("Request body is not valid JSON")
}

fn parse_query(s: &str) -> Result<(String, String)> {
    let Some((key, value)) = s.split_once('=') else {
        bail!("expected KEY=VALUE, got '{}'", s);
    };
    Ok((key.to_string(), value.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String)> {
    let Some((name, value)) = s.split_once(':') else {
        bail!("expected 'Name: value', got '{}'", s);
    };
    let name = name.trim();
    if name.is_empty() {
        bail!("header name is empty");
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_split_on_first_equals() {
        assert_eq!(
            parse_query("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert!(parse_query("novalue").is_err());
    }

    #[test]
    fn headers_are_trimmed() {
        assert_eq!(
            parse_header("X-Trace:  abc ").unwrap(),
            ("X-Trace".to_string(), "abc".to_string())
        );
        assert!(parse_header(": abc").is_err());
    }

    #[test]
    fn inline_body_must_be_json() {
        assert_eq!(read_body(r#"{"a": 1}"#).unwrap()["a"], 1);
        assert!(read_body("not json").is_err());
    }

    #[test]
    fn body_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, r#"{"title": "Rust engineer"}"#).unwrap();

        let body = read_body(&format!("@{}", path.display())).unwrap();
        assert_eq!(body["title"], "Rust engineer");
    }
}
