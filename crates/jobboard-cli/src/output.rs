//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use jobboard_http::Message;

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning to stderr.
pub fn warning(msg: &str) {
    eprintln!("{} {}", "!".yellow(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a server message, falling back to `default` when the server sent none.
pub fn message(message: &Message, default: &str) {
    success(message.msg.as_deref().unwrap_or(default));
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}
