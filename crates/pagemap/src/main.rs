//! pagemap CLI - wiki page hierarchy diagrams.
//!
//! Provides commands for:
//! - `build`: Fetch a page tree from Confluence and draw it
//! - `outline`: Print the section outline of a local page file

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, OutlineArgs};
use output::Output;

/// pagemap - wiki page hierarchy diagrams.
#[derive(Parser)]
#[command(name = "pagemap", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the page tree below a root page and render it.
    Build(BuildArgs),
    /// Print the section outline of a page content file.
    Outline(OutlineArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Build(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Build(args) => args.execute(),
        Commands::Outline(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagemap_config::OutputFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from([
            "pagemap",
            "build",
            "Docs",
            "--root-title",
            "Home",
            "--root-id",
            "123",
            "--format",
            "svg",
            "--max-depth",
            "4",
            "-v",
        ])
        .unwrap();

        let Commands::Build(args) = cli.command else {
            panic!("expected build command");
        };
        assert_eq!(args.project, "Docs");
        assert_eq!(args.root_title, "Home");
        assert_eq!(args.root_id, "123");
        assert_eq!(args.format, Some(OutputFormat::Svg));
        assert_eq!(args.max_depth, Some(4));
        assert_eq!(args.timeout, None);
        assert!(args.verbose);
    }

    #[test]
    fn test_build_requires_root_id() {
        let result = Cli::try_parse_from(["pagemap", "build", "Docs", "--root-title", "Home"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_unknown_format() {
        let result = Cli::try_parse_from([
            "pagemap",
            "build",
            "Docs",
            "--root-title",
            "Home",
            "--root-id",
            "1",
            "--format",
            "png",
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_outline() {
        let cli = Cli::try_parse_from(["pagemap", "outline", "page.xml", "--storage"]).unwrap();

        let Commands::Outline(args) = cli.command else {
            panic!("expected outline command");
        };
        assert_eq!(args.file, std::path::PathBuf::from("page.xml"));
        assert!(args.storage);
        assert!(!args.json);
    }
}
