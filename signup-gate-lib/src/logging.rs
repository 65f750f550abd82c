//! Diagnostic logging setup.

/// Initialize the process-wide logger from the configured level string.
///
/// An empty or unrecognized level falls back to `info`. `RUST_LOG` still
/// wins when set, so operators can override the deployed configuration.
pub fn init(level: &str) {
    let level = match level.to_ascii_lowercase().as_str() {
        "error" => "error",
        "warn" | "warning" => "warn",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .init();
}
