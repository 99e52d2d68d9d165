//! Lens module
//!
//! Lenses combine repository access with validation and output formatting, so
//! every front end (the CLI today) shares one implementation of each command.
//!
//! # Architecture
//!
//! Each lens module exports:
//! - A **Lens struct** (e.g., `CatalogLens`) - the entry point for all operations
//! - **Args structs** - validated input for lens methods
//! - **Output types** - tagged result tables and their display rows
//!
//! # Usage
//!
//! ```rust,ignore
//! use librarylook::lens::catalog::{CatalogKind, CatalogLens};
//! use librarylook::lens::utils::OutputFormat;
//!
//! let lens = CatalogLens::new(&db);
//! let table = lens.browse(CatalogKind::Books).await?;
//! println!("{}", lens.format_table(&table, &OutputFormat::Markdown, true)?);
//! ```

pub mod catalog;
pub mod utils;
