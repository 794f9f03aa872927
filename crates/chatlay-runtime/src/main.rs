use std::process::ExitCode;

use chatlay_core::logging;
use chatlay_runtime::cli::Cli;
use clap::Parser;
use tracing::error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match cli.load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("chatlay: {}", e);
            return exit_code(e.exit_code());
        }
    };
    logging::init(settings.debug);

    // Reject bad configuration before any window exists.
    if let Err(e) = settings.validate() {
        error!("invalid configuration: {}", e);
        return exit_code(e.exit_code());
    }

    exit_code(chatlay_runtime::run(settings))
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
