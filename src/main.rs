//! CLI entry point for inkwell

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "inkwell")]
#[command(version)]
#[command(about = "A server-rendered blog frontend backed by a hosted content store", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Read content from a dataset export (NDJSON) instead of the hosted store
    #[arg(long, global = true)]
    dataset_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List posts in the content store
    List,

    /// Print the routes built at startup
    Paths,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "inkwell=debug,tower_http=debug,info"
    } else {
        "inkwell=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let blog = inkwell::Blog::new(&base_dir)?;
            let source = blog.content_source(cli.dataset_file.as_deref())?;
            inkwell::commands::serve::run(&blog, source, &ip, port).await?;
        }

        Commands::List => {
            let blog = inkwell::Blog::new(&base_dir)?;
            let source = blog.content_source(cli.dataset_file.as_deref())?;
            inkwell::commands::list::run(source.as_ref()).await?;
        }

        Commands::Paths => {
            let blog = inkwell::Blog::new(&base_dir)?;
            let source = blog.content_source(cli.dataset_file.as_deref())?;
            inkwell::commands::paths::run(source.as_ref()).await?;
        }

        Commands::Version => {
            println!("inkwell version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
