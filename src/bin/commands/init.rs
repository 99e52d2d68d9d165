use librarylook::lens::utils::OutputFormat;
use librarylook::LibraryConfig;
use serde_json::json;

pub async fn run(config: &LibraryConfig, output_format: OutputFormat) {
    let db = super::open_database(config).await;

    let status = match db.schema().check_status().await {
        Ok(status) => status,
        Err(e) => {
            eprintln!("ERROR: Failed to check schema: {:#}", e);
            std::process::exit(1);
        }
    };

    if output_format.is_json() {
        let output = json!({
            "database": config.sqlite_path(),
            "schema": status,
        });
        super::print_or_exit(output_format.render_value(&output));
    } else {
        println!("Catalog database ready at {}", config.sqlite_path());
        println!("Schema: {}", status);
    }

    db.shutdown().await;
}
