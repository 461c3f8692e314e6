use std::process::ExitCode;

use clap::Parser;

mod app;
mod get;
mod users;

use app::{App, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let app = App::parse();
    app.init_logging();

    let outcome = match app.cmd {
        Commands::Get(arg) => get::run(arg).await,
        Commands::Users(arg) => users::run(arg).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
