//! Tracing setup
//!
//! One-shot commands log to stderr. The dashboard owns the terminal, so it
//! logs to a file in the storage directory instead.

use crate::constants::LOG_FILE_NAME;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "secondbrain=info";

pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn file_in(dir: &Path) -> Self {
        LogTarget::File(dir.join(LOG_FILE_NAME))
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Install the global subscriber
///
/// Fails if the log file can't be opened. A subscriber installed earlier
/// (e.g. by a test harness) is left in place.
pub fn init(target: LogTarget) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = match target {
        LogTarget::Stderr => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(&path)?;
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false),
                )
                .try_init()
        }
    };

    if let Err(e) = result {
        tracing::debug!("Subscriber already installed: {}", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_target_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("state");

        init(LogTarget::file_in(&nested)).unwrap();
        assert!(nested.join(LOG_FILE_NAME).exists());
    }
}
