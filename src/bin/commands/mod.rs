pub mod add;
pub mod browse;
pub mod config;
pub mod database;
pub mod init;
pub mod search;
pub mod status;

use librarylook::database::ensure_data_dir;
use librarylook::{LibraryConfig, LibraryDatabase};

/// Open the configured catalog database, creating the data directory and
/// schema as needed; exits the process on failure
pub(crate) async fn open_database(config: &LibraryConfig) -> LibraryDatabase {
    if let Err(e) = ensure_data_dir(&config.data_dir) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    match LibraryDatabase::open(config.connection_settings(), config.pool_options()).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("ERROR: Failed to open database: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Print a lens result or exit with its error
pub(crate) fn print_or_exit(output: anyhow::Result<String>) {
    match output {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            std::process::exit(1);
        }
    }
}
