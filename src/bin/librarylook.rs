use clap::{Parser, Subcommand};
use librarylook::lens::catalog::{BookSearchArgs, BrowseArgs};
use librarylook::lens::utils::OutputFormat;
use librarylook::LibraryConfig;
use tracing::Level;

mod commands;

use commands::add::AddCommands;
use commands::database::DatabaseArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.librarylook/librarylook.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the catalog tables if they do not exist yet
    Init,

    /// Show the database location, schema status and row counts
    Status,

    /// Print the effective configuration
    Config,

    /// List every row of a catalog table
    Browse(BrowseArgs),

    /// Search books by title, author or ISBN
    Search(BookSearchArgs),

    /// Add a record to the catalog
    Add {
        #[clap(subcommand)]
        command: AddCommands,
    },

    /// Database maintenance
    Database(DatabaseArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match LibraryConfig::new(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let format = cli.format;
    match cli.command {
        Commands::Init => commands::init::run(&config, format).await,
        Commands::Status => commands::status::run(&config, format).await,
        Commands::Config => commands::config::run(&config, format),
        Commands::Browse(args) => commands::browse::run(&config, args, format).await,
        Commands::Search(args) => commands::search::run(&config, args, format).await,
        Commands::Add { command } => commands::add::run(&config, command, format).await,
        Commands::Database(args) => commands::database::run(&config, args, format).await,
    }
}
