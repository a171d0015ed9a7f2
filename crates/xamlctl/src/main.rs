use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xamlctl::cmd_parse;
use xamlctl::cmd_resources;
use xamlctl::cmd_types;

#[derive(Parser, Debug)]
#[command(name = "xamlctl", version, about = "XAML markup inspection CLI")]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    /// Output JSON where applicable
    #[arg(long)]
    json: bool,
    /// Skip keyless resource dictionary entries instead of failing
    #[arg(long)]
    lenient_keys: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Materialize a markup file and print the object tree
    Parse { file: PathBuf },
    /// List the root resource dictionary of a markup file
    Resources { file: PathBuf },
    /// List the registered presentation types
    Types {
        /// Only types whose name contains this text
        #[arg(long)]
        filter: Option<String>,
    },
}

fn main() -> Result<()> {
    let Cli {
        verbose,
        json,
        lenient_keys,
        cmd,
    } = Cli::parse();

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.into()),
        ))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cmd {
        Cmd::Parse { file } => cmd_parse::run(&file, lenient_keys, json)?,
        Cmd::Resources { file } => cmd_resources::run(&file, lenient_keys, json)?,
        Cmd::Types { filter } => cmd_types::run(filter.as_deref(), json)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_before_subcommand() {
        let cli = Cli::parse_from(["xamlctl", "-vv", "--json", "--lenient-keys", "parse", "main.xaml"]);
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(cli.lenient_keys);
        assert!(matches!(cli.cmd, Cmd::Parse { ref file } if file == &PathBuf::from("main.xaml")));
    }

    #[test]
    fn types_filter_is_optional() {
        let cli = Cli::parse_from(["xamlctl", "types"]);
        assert!(matches!(cli.cmd, Cmd::Types { filter: None }));
        let cli = Cli::parse_from(["xamlctl", "types", "--filter", "Brush"]);
        assert!(matches!(cli.cmd, Cmd::Types { filter: Some(ref f) } if f == "Brush"));
    }

    #[test]
    fn file_argument_is_required() {
        assert!(Cli::try_parse_from(["xamlctl", "resources"]).is_err());
    }
}
