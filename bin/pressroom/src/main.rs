//! Pressroom CLI
//!
//! Publishes draft pages and fingerprinted assets into the public tree.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for Pressroom.
#[derive(Parser)]
#[command(
    name = "pressroom",
    version,
    about = "Publish draft pages and fingerprinted assets"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "pressroom.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Publish one page, or every draft page
    Publish {
        /// Page path relative to the draft tree (e.g., blog/post.html)
        page: Option<String>,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a page from the public tree
    Unpublish {
        /// Page path relative to the public tree
        page: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show whether a page is published and up to date
    Status {
        /// Page path relative to the draft tree
        page: String,
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },
    /// List draft pages
    List {
        /// Only list pages under this directory
        subdir: Option<String>,
    },
    /// Regenerate sitemap.xml from the public tree
    Sitemap,
    /// Start the read-only preview server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    pressroom::init_tracing(cli.verbose);

    match cli.command {
        Commands::Publish { page, json } => {
            pressroom::cmd::publish::run(&cli.config, page.as_deref(), json).await?;
        }
        Commands::Unpublish { page, json } => {
            pressroom::cmd::publish::run_unpublish(&cli.config, &page, json).await?;
        }
        Commands::Status { page, json } => {
            pressroom::cmd::status::run(&cli.config, &page, json).await?;
        }
        Commands::List { subdir } => {
            pressroom::cmd::status::run_list(&cli.config, subdir.as_deref().unwrap_or_default())
                .await?;
        }
        Commands::Sitemap => {
            pressroom::cmd::sitemap::run(&cli.config).await?;
        }
        Commands::Serve { port } => {
            pressroom::cmd::serve::run(&cli.config, port).await?;
        }
    }

    Ok(())
}
