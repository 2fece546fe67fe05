//! Logging setup utilities for the Hibiki binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Where the fmt layer writes log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    /// Keeps stdout free for an interactive display.
    Stderr,
}

/// Build the default filter directive used when `RUST_LOG` is not set.
///
/// Every Hibiki crate and the binary itself get `default_log_level`.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    ["hibiki_shared", "hibiki_server", "hibiki_client", binary_name]
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "hibiki-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn")
/// * `target` - Where log lines are written
///
/// # Examples
///
/// ```no_run
/// use hibiki_shared::logger::{LogTarget, setup_logger};
///
/// setup_logger("hibiki-server", "debug", LogTarget::Stdout);
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str, target: LogTarget) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    match target {
        LogTarget::Stdout => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogTarget::Stderr => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_covers_all_crates_and_binary() {
        // テスト項目: 全クレートとバイナリにデフォルトのログレベルが設定される
        // given (前提条件):
        let binary_name = "hibiki-client";

        // when (操作):
        let directive = default_directive(binary_name, "warn");

        // then (期待する結果):
        assert_eq!(
            directive,
            "hibiki_shared=warn,hibiki_server=warn,hibiki_client=warn,hibiki_client=warn"
        );
    }
}
