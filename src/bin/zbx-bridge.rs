#[path = "zbx-bridge/app.rs"]
mod app;
#[path = "zbx-bridge/cli.rs"]
mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse_args();
    match app::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("zbx-bridge: {err:#}");
            ExitCode::FAILURE
        }
    }
}
