use clap::Subcommand;
use librarylook::lens::catalog::{
    AddBookArgs, AddMemberArgs, AddMembershipTypeArgs, AddPublisherArgs, AddStaffArgs,
    CatalogLens,
};
use librarylook::lens::utils::OutputFormat;
use librarylook::{classify, DbErrorKind, LibraryConfig};

/// Record kinds that can be added
#[derive(Subcommand)]
pub enum AddCommands {
    /// Add a publisher
    Publisher(AddPublisherArgs),

    /// Add a book
    Book(AddBookArgs),

    /// Add a library member
    Member(AddMemberArgs),

    /// Add a staff member
    Staff(AddStaffArgs),

    /// Add a membership type
    MembershipType(AddMembershipTypeArgs),
}

pub async fn run(config: &LibraryConfig, command: AddCommands, output_format: OutputFormat) {
    let db = super::open_database(config).await;
    let lens = CatalogLens::new(&db);

    let result = match &command {
        AddCommands::Publisher(args) => lens.add_publisher(args).await,
        AddCommands::Book(args) => lens.add_book(args).await,
        AddCommands::Member(args) => lens.add_member(args).await,
        AddCommands::Staff(args) => lens.add_staff(args).await,
        AddCommands::MembershipType(args) => lens.add_membership_type(args).await,
    };

    match result {
        Ok(added) => super::print_or_exit(lens.format_added(&added, &output_format)),
        Err(e) => {
            match classify(&e) {
                DbErrorKind::ConstraintViolation => eprintln!(
                    "ERROR: Rejected by the catalog constraints (duplicate or invalid value): {:#}",
                    e
                ),
                _ => eprintln!("ERROR: {:#}", e),
            }
            db.shutdown().await;
            std::process::exit(1);
        }
    }

    db.shutdown().await;
}
