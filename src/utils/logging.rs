//! Logging utilities
//!
//! Tracing subscriber setup plus the plain-text run log written beside
//! the console output.

use std::fs;
use std::fs::OpenOptions;
use std::io::Write;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `info` level.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Starts the run log with a dated header, replacing any previous run.
pub fn init_log_file(path: &str) -> Result<()> {
    let header = format!(
        "{}\nPaper generation log - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(path, header).with_context(|| format!("failed to write log file: {}", path))?;
    Ok(())
}

/// Appends one line to the run log.
pub fn append_line(path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file: {}", path))?;

    writeln!(file, "{}", line)?;
    Ok(())
}

/// Truncates long text for console display.
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_text("abcdefghijk", 10), "abcdefghij...");
    }

    #[test]
    fn test_log_file_header_and_append() {
        let path = std::env::temp_dir().join(format!(
            "run-log-{}.txt",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let path_str = path.to_string_lossy().to_string();

        init_log_file(&path_str).unwrap();
        append_line(&path_str, "first entry").unwrap();
        append_line(&path_str, "second entry").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Paper generation log"));
        assert!(content.contains("first entry\nsecond entry\n"));

        let _ = fs::remove_file(&path);
    }
}
