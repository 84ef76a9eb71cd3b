use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "vtfs",
    about = "vtfs: an in-memory tree filesystem, local or served over HTTP",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Peer to talk to
    #[arg(long, global = true, default_value = "http://127.0.0.1:7878")]
    pub endpoint: String,

    /// Access token sent with every request
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Round-trip timeout in milliseconds
    #[arg(long, global = true, default_value_t = 5000)]
    pub timeout_ms: u64,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve an in-memory tree over HTTP
    Serve(ServeArgs),
    /// List a directory
    Ls(LsArgs),
    /// Show metadata of a path
    Stat(PathArgs),
    /// Create a directory
    Mkdir(CreateArgs),
    /// Create an empty file
    Touch(CreateArgs),
    /// Write data into a file
    Write(WriteArgs),
    /// Print a file
    Cat(PathArgs),
    /// Remove a file entry
    Rm(PathArgs),
    /// Remove an empty directory
    Rmdir(PathArgs),
    /// Add a hard link to a file
    Ln(LnArgs),
    /// Set the size of a file
    Truncate(TruncateArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Listen address, overriding the configuration
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Args)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Args)]
pub struct LsArgs {
    #[arg(default_value = "/")]
    pub path: String,
    /// Include "." and ".."
    #[arg(short, long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CreateArgs {
    pub path: String,
    /// Permission bits, octal
    #[arg(short, long)]
    pub mode: Option<String>,
}

#[derive(Args)]
pub struct WriteArgs {
    pub path: String,
    pub data: String,
    #[arg(long, default_value_t = 0)]
    pub offset: u64,
}

#[derive(Args)]
pub struct LnArgs {
    pub target: String,
    pub link: String,
}

#[derive(Args)]
pub struct TruncateArgs {
    pub path: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["vtfs", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.as_deref(), Some("0.0.0.0:9000"));
            assert!(args.config.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn global_connection_flags() {
        let cli = Cli::try_parse_from([
            "vtfs", "ls", "/docs", "--endpoint", "http://peer:1", "--token", "devtoken", "-v",
        ])
        .unwrap();
        assert_eq!(cli.endpoint, "http://peer:1");
        assert_eq!(cli.token.as_deref(), Some("devtoken"));
        assert_eq!(cli.timeout_ms, 5000);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Ls(LsArgs { ref path, all: false }) if path == "/docs"));
    }

    #[test]
    fn ls_defaults_to_root() {
        let cli = Cli::try_parse_from(["vtfs", "ls"]).unwrap();
        assert!(matches!(cli.command, Command::Ls(LsArgs { ref path, .. }) if path == "/"));
    }

    #[test]
    fn parse_write() {
        let cli = Cli::try_parse_from(["vtfs", "write", "/f", "hello", "--offset", "4"]).unwrap();
        if let Command::Write(args) = cli.command {
            assert_eq!(args.path, "/f");
            assert_eq!(args.data, "hello");
            assert_eq!(args.offset, 4);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_ln_and_truncate() {
        let cli = Cli::try_parse_from(["vtfs", "ln", "/a", "/b"]).unwrap();
        assert!(matches!(cli.command, Command::Ln(LnArgs { ref target, ref link }) if target == "/a" && link == "/b"));
        let cli = Cli::try_parse_from(["vtfs", "truncate", "/a", "12"]).unwrap();
        assert!(matches!(cli.command, Command::Truncate(TruncateArgs { size: 12, .. })));
    }

    #[test]
    fn truncate_needs_a_number() {
        assert!(Cli::try_parse_from(["vtfs", "truncate", "/a", "big"]).is_err());
    }
}
