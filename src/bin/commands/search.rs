use librarylook::lens::catalog::{BookSearchArgs, CatalogLens};
use librarylook::lens::utils::OutputFormat;
use librarylook::LibraryConfig;

pub async fn run(config: &LibraryConfig, args: BookSearchArgs, output_format: OutputFormat) {
    if let Err(e) = args.validate() {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    let db = super::open_database(config).await;
    let lens = CatalogLens::new(&db);

    let books = match lens.search_books(&args).await {
        Ok(books) => books,
        Err(e) => {
            eprintln!("ERROR: Search failed: {:#}", e);
            std::process::exit(1);
        }
    };

    if books.is_empty() && !output_format.is_json() {
        println!("No books matching '{}'.", args.term);
    } else {
        super::print_or_exit(lens.format_books(&books, &output_format, !args.full));
    }

    db.shutdown().await;
}
