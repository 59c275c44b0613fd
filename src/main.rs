//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands;
use folio::Folio;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A blog content store and static site builder", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post or page
    New {
        /// Layout to use (defaults to `default_layout` from the config)
        #[arg(short, long)]
        layout: Option<String>,

        /// Title of the new document
        title: String,

        /// Path for the new document, relative to the source directory
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Validate content without generating
    Check,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the generated output
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, page, menu, redirect, layout)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let open_site = || Folio::new(&base_dir);

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = base_dir.join(folder);
            commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::New {
            layout,
            title,
            path,
        } => {
            let folio = open_site()?;
            let file = commands::new::create(&folio, &title, layout.as_deref(), path.as_deref())?;
            println!("Created: {:?}", file);
        }

        Commands::Generate { watch } => {
            let folio = open_site()?;
            let site = commands::generate::run(&folio)?;
            println!("Generated {} files into {:?}", site.len(), folio.public_dir);

            if watch {
                tokio::task::spawn_blocking(move || commands::generate::watch(&folio, || {}))
                    .await??;
            }
        }

        Commands::Check => open_site()?.check()?,

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let folio = open_site()?;
            folio.generate()?;
            folio::server::start(&folio, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let folio = open_site()?;
            folio.clean()?;
            println!("Removed {:?}", folio.public_dir);
        }

        Commands::List { r#type } => commands::list::run(&open_site()?, &r#type)?,

        Commands::Version => {
            println!("folio {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `--debug`
fn init_logging(debug: bool) {
    let default_filter = if debug { "folio=debug,info" } else { "folio=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
