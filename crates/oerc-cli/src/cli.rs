use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "oerc", about = "OERC site server", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration
    Config,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Overrides `bind_addr` from the config
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Overrides `data_dir` from the config
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["oerc", "serve"]).unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("wrong command");
        };
        assert!(args.bind.is_none());
    }

    #[test]
    fn parse_serve_with_overrides() {
        let cli = Cli::try_parse_from([
            "oerc",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--data-dir",
            "/srv/oerc",
            "-c",
            "site.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("site.toml")));
        let Command::Serve(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.bind, Some("0.0.0.0:9000".parse().unwrap()));
        assert_eq!(args.data_dir, Some(PathBuf::from("/srv/oerc")));
    }

    #[test]
    fn parse_config_verbose() {
        let cli = Cli::try_parse_from(["oerc", "-v", "config"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Config));
    }

    #[test]
    fn bad_bind_is_rejected() {
        assert!(Cli::try_parse_from(["oerc", "serve", "--bind", "nowhere"]).is_err());
    }
}
