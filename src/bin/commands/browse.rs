use librarylook::lens::catalog::{BrowseArgs, CatalogLens};
use librarylook::lens::utils::OutputFormat;
use librarylook::LibraryConfig;

pub async fn run(config: &LibraryConfig, args: BrowseArgs, output_format: OutputFormat) {
    let db = super::open_database(config).await;
    let lens = CatalogLens::new(&db);

    let table = match lens.browse(args.kind).await {
        Ok(table) => table,
        Err(e) => {
            eprintln!("ERROR: Failed to load {}: {:#}", args.kind, e);
            std::process::exit(1);
        }
    };

    if table.is_empty() && !output_format.is_json() {
        println!("No {} in the catalog yet.", args.kind);
    } else {
        super::print_or_exit(lens.format_table(&table, &output_format, !args.full));
    }

    db.shutdown().await;
}
