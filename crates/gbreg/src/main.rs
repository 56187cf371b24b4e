//! gbreg CLI - browse, search and export the graph-break registry.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use gbreg_render::Format;

mod commands;

#[derive(Parser)]
#[command(name = "gbreg")]
#[command(about = "Browse, search and export the graph-break registry")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to gbreg.toml config file
    #[arg(short, long, default_value = "gbreg.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default gbreg.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },

    /// Run the live registry site
    Serve {
        /// Host to bind to (defaults to config or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to config or 3000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open browser once listening
        #[arg(long)]
        open: bool,
    },

    /// Export the registry as a static site
    Export {
        /// Page format (defaults to config or markdown)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,

        /// Output directory (defaults to config or "gbid_directory")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip stylesheet minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Preview an exported HTML site
    Preview {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve
        #[arg(short, long, default_value = "gbid_directory")]
        dir: PathBuf,
    },

    /// Fuzzy-search the registry
    Search {
        /// Search text
        query: String,

        /// Maximum number of matches to print
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Markdown,
    Html,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Markdown => Format::Markdown,
            FormatArg::Html => Format::Html,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Serve { host, port, open } => {
            commands::serve::run(&cli.config, host, port, open).await?;
        }
        Commands::Export {
            format,
            output,
            no_minify,
        } => {
            let minify = if no_minify { Some(false) } else { None };
            commands::export::run(&cli.config, format.map(Format::from), output, minify).await?;
        }
        Commands::Preview { port, dir } => {
            commands::preview::run(port, dir).await?;
        }
        Commands::Search { query, limit } => {
            commands::search::run(&cli.config, &query, limit).await?;
        }
    }

    Ok(())
}
