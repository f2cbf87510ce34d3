//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `fedimark_core` linkage and print its version.
//! - Optionally load a bot config file and print it with secrets masked.
//!
//! Usage: `fedimark_cli [CONFIG.{json,yaml,yml}]`

use fedimark_core::{default_log_level, init_stderr_logging, Config};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("fedimark_core version={}", fedimark_core::core_version());

    let Some(path) = std::env::args_os().nth(1) else {
        return ExitCode::SUCCESS;
    };

    if let Err(err) = init_stderr_logging(default_log_level()) {
        eprintln!("logging disabled: {err}");
    }

    let config = match Config::load(&path) {
        Ok(config) => config,
        Err(err) => {
            error!("event=config_load module=cli status=error error={err}");
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let redacted = config.redacted();
    println!("server={}", redacted.server);
    println!("user_agent={}", config.user_agent());
    match serde_yaml::to_string(&redacted) {
        Ok(text) => print!("{text}"),
        Err(err) => {
            eprintln!("failed to render config: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
