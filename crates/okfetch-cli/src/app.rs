use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::get::GetArg;
use crate::users::UsersArg;

#[derive(Clone, Debug, Parser)]
#[command(name = "okfetch", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "g", name = "get", about = "Fetch a URL and print the response")]
    Get(GetArg),
    #[command(alias = "u", name = "users", about = "Query a users endpoint")]
    Users(UsersArg),
}

impl App {
    /// `RUST_LOG` wins over `--verbose` when set.
    pub fn init_logging(&self) {
        let fallback = match self.verbose {
            0 => "warn",
            1 => "okfetch=debug,okfetch_users=debug",
            _ => "okfetch=trace,okfetch_users=trace",
        };
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback.into()))
            .with_writer(std::io::stderr)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let app = App::try_parse_from(["okfetch", "-v", "get", "https://example.com", "-X", "post", "-H", "A: b"])
            .unwrap();
        assert_eq!(app.verbose, 1);
        let Commands::Get(arg) = app.cmd else { panic!("expected get") };
        assert_eq!(arg.url, "https://example.com");
        assert_eq!(arg.headers, vec!["A: b".to_string()]);
    }

    #[test]
    fn test_parse_users() {
        let app = App::try_parse_from(["okfetch", "users", "--host", "https://api.test", "--id", "3"]).unwrap();
        let Commands::Users(arg) = app.cmd else { panic!("expected users") };
        assert_eq!(arg.host, "https://api.test");
        assert_eq!(arg.id, Some(3));
    }
}
