use librarylook::lens::utils::OutputFormat;
use librarylook::LibraryConfig;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ConfigInfo {
    config_file: String,
    data_dir: String,
    sqlite_path: String,
    host: String,
    user: String,
    password_set: bool,
    database: String,
    pool_size: usize,
    retry_backoff_secs: u64,
}

pub fn run(config: &LibraryConfig, output_format: OutputFormat) {
    if output_format.is_json() {
        let info = ConfigInfo {
            config_file: LibraryConfig::config_file_path(),
            data_dir: config.data_dir.clone(),
            sqlite_path: config.sqlite_path(),
            host: config.host.clone(),
            user: config.user.clone(),
            password_set: !config.password.is_empty(),
            database: config.database.clone(),
            pool_size: config.pool_size,
            retry_backoff_secs: config.retry_backoff_secs,
        };
        super::print_or_exit(output_format.render_value(&info));
        return;
    }

    println!("librarylook Configuration");
    println!("=========================\n");
    println!("Config File:        {}", LibraryConfig::config_file_path());
    println!("{}", config.summary());
    println!("\nEnvironment variables with the LIBRARYLOOK_ prefix override file values,");
    println!("e.g. LIBRARYLOOK_DATABASE=branch or LIBRARYLOOK_POOL_SIZE=2.");
}
