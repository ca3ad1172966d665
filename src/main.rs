use std::process::ExitCode;
use tracing::{error, info};
use trafficdb::cli;

fn main() -> ExitCode {
    // Diagnostics go to stderr so command output on stdout stays clean
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    info!("Starting trafficdb...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = cli::parse_args(&args);

    let stdout = std::io::stdout();
    match cli::run(&invocation, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
