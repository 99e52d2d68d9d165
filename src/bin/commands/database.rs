use clap::{Args, Subcommand};
use librarylook::lens::utils::OutputFormat;
use librarylook::LibraryConfig;
use serde_json::json;

/// Arguments for the Database command
#[derive(Args)]
pub struct DatabaseArgs {
    #[clap(subcommand)]
    pub command: DatabaseCommands,
}

/// Database subcommands
#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// Drop every catalog table and all their rows
    Reset {
        /// Skip confirmation prompt
        #[clap(long, short = 'y')]
        yes: bool,
    },
}

pub async fn run(config: &LibraryConfig, args: DatabaseArgs, output_format: OutputFormat) {
    match args.command {
        DatabaseCommands::Reset { yes } => run_reset(config, yes, output_format).await,
    }
}

async fn run_reset(config: &LibraryConfig, skip_confirm: bool, output_format: OutputFormat) {
    // Confirmation prompt
    if !skip_confirm && !output_format.is_json() {
        eprintln!(
            "This will drop all catalog tables in {}",
            config.sqlite_path()
        );
        eprint!("Are you sure? [y/N] ");

        let mut input = String::new();
        if std::io::stdin().read_line(&mut input).is_ok() {
            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                eprintln!("Aborted.");
                return;
            }
        } else {
            eprintln!("Aborted.");
            return;
        }
    }

    let db = super::open_database(config).await;
    let result = db.schema().reset().await;
    db.shutdown().await;

    match result {
        Ok(()) => {
            if output_format.is_json() {
                let output = json!({ "reset": true, "database": config.sqlite_path() });
                super::print_or_exit(output_format.render_value(&output));
            } else {
                println!("All catalog tables dropped. Run `librarylook init` to recreate them.");
            }
        }
        Err(e) => {
            eprintln!("ERROR: Failed to reset database: {:#}", e);
            std::process::exit(1);
        }
    }
}
