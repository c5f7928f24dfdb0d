use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gridshare",
    about = "Share block grids behind short, unguessable tokens",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Store a grid submission from a JSON file
    Store(StoreArgs),
    /// Look up a grid by token
    Fetch(FetchArgs),
    /// Show a random public grid
    Random,
    /// Show row counts and cache counters
    Stats,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Override the configured bind address
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[derive(Args)]
pub struct StoreArgs {
    /// Submission JSON file, or `-` for stdin
    pub file: PathBuf,
}

#[derive(Args)]
pub struct FetchArgs {
    pub token: String,
    /// Decode the token in the secret namespace
    #[arg(long)]
    pub secret: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["gridshare", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.bind.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_bind() {
        let cli = Cli::try_parse_from(["gridshare", "serve", "--bind", "0.0.0.0:8000"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8000".parse().unwrap()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_bad_bind() {
        assert!(Cli::try_parse_from(["gridshare", "serve", "--bind", "nowhere"]).is_err());
    }

    #[test]
    fn parse_store() {
        let cli = Cli::try_parse_from(["gridshare", "store", "grid.json"]).unwrap();
        if let Command::Store(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("grid.json"));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_fetch_secret() {
        let cli = Cli::try_parse_from(["gridshare", "fetch", "gJd8J9", "--secret"]).unwrap();
        if let Command::Fetch(args) = cli.command {
            assert_eq!(args.token, "gJd8J9");
            assert!(args.secret);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_random_and_stats() {
        let cli = Cli::try_parse_from(["gridshare", "random"]).unwrap();
        assert!(matches!(cli.command, Command::Random));
        let cli = Cli::try_parse_from(["gridshare", "stats"]).unwrap();
        assert!(matches!(cli.command, Command::Stats));
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "gridshare", "stats", "--format", "json", "-v", "--config", "grid.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("grid.toml")));
    }

    #[test]
    fn parse_invalid() {
        assert!(Cli::try_parse_from(["gridshare", "nonexistent"]).is_err());
        assert!(Cli::try_parse_from(["gridshare", "fetch"]).is_err());
    }
}
