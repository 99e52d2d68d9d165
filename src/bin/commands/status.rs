use librarylook::lens::utils::OutputFormat;
use librarylook::{format_size, get_database_info, DatabaseInfo, LibraryConfig};
use tabled::settings::Style;
use tabled::Table;

pub async fn run(config: &LibraryConfig, output_format: OutputFormat) {
    let info = get_database_info(config).await;

    match output_format {
        OutputFormat::Table | OutputFormat::Markdown | OutputFormat::Psv => {
            print_status(&info, &output_format)
        }
        _ => super::print_or_exit(output_format.render_value(&info)),
    }
}

fn print_status(info: &DatabaseInfo, output_format: &OutputFormat) {
    println!("librarylook Database Status");
    println!("===========================\n");

    println!("  Path:           {}", info.path);
    println!("  Connection:     {}", info.descriptor);
    println!(
        "  Status:         {}",
        if info.exists { "exists" } else { "not created" }
    );
    if let Some(size) = info.size_bytes {
        println!("  Size:           {}", format_size(size));
    }
    match &info.schema {
        Some(schema) => println!("  Schema:         {}", schema),
        None if info.exists => println!("  Schema:         unknown"),
        None => {
            println!("\nRun `librarylook init` to create the catalog.");
            return;
        }
    }

    if info.tables.is_empty() {
        return;
    }

    println!();
    let mut table = Table::new(&info.tables);
    match output_format {
        OutputFormat::Markdown => table.with(Style::markdown()),
        _ => table.with(Style::rounded()),
    };
    println!("{}", table);
}
