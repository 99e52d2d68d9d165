//! Catalog lens arguments
//!
//! Input structures for browsing, searching and adding catalog records. They
//! derive `clap::Args` for the CLI and serde for any other front end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::CatalogKind;
use crate::database::{NewBook, NewMember, NewMembershipType, NewPublisher, NewStaffMember};

/// Arguments for browsing one catalog table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct BrowseArgs {
    /// Table to show
    #[cfg_attr(feature = "cli", clap(value_enum))]
    pub kind: CatalogKind,

    /// Show full text instead of truncating long names in tables
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub full: bool,
}

/// Arguments for book search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct BookSearchArgs {
    /// Text to look for in title or author (any case) or ISBN
    pub term: String,

    /// Show full text instead of truncating long names in tables
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub full: bool,
}

impl BookSearchArgs {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            full: false,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.term.trim().is_empty() {
            return Err("Search term must not be empty".to_string());
        }
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }
    Ok(())
}

/// Blank optional text counts as absent
fn optional(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Arguments for adding a publisher
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct AddPublisherArgs {
    /// Publisher name
    #[cfg_attr(feature = "cli", clap(long))]
    pub name: String,

    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub address: Option<String>,

    /// Contact email, unique across publishers
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub email: Option<String>,

    /// Contact phone, unique across publishers
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub phone: Option<String>,
}

impl AddPublisherArgs {
    pub fn validate(&self) -> Result<(), String> {
        required("Name", &self.name)
    }

    pub fn to_record(&self) -> NewPublisher {
        NewPublisher {
            name: self.name.trim().to_string(),
            address: optional(&self.address),
            email: optional(&self.email),
            phone: optional(&self.phone),
        }
    }
}

/// Arguments for adding a book
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct AddBookArgs {
    #[cfg_attr(feature = "cli", clap(long))]
    pub title: String,

    #[cfg_attr(feature = "cli", clap(long))]
    pub author: String,

    /// ISBN, unique across the catalog
    #[cfg_attr(feature = "cli", clap(long))]
    pub isbn: String,

    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub genre: Option<String>,

    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub published_year: Option<i32>,

    /// Id of an existing publisher
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub publisher_id: Option<i64>,

    /// Copies on hand
    #[cfg_attr(feature = "cli", clap(long, default_value_t = 1, allow_hyphen_values = true))]
    pub quantity: i64,
}

impl AddBookArgs {
    pub fn validate(&self) -> Result<(), String> {
        required("Title", &self.title)?;
        required("Author", &self.author)?;
        required("ISBN", &self.isbn)?;
        if self.quantity < 0 {
            return Err("Quantity must not be negative".to_string());
        }
        Ok(())
    }

    pub fn to_record(&self) -> NewBook {
        NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            genre: optional(&self.genre),
            published_year: self.published_year,
            publisher_id: self.publisher_id,
            quantity: self.quantity,
        }
    }
}

/// Arguments for adding a member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct AddMemberArgs {
    #[cfg_attr(feature = "cli", clap(long))]
    pub name: String,

    #[cfg_attr(feature = "cli", clap(long))]
    pub email: String,

    #[cfg_attr(feature = "cli", clap(long))]
    pub phone: String,

    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub address: Option<String>,

    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub membership_type_id: Option<i64>,

    /// Join date (YYYY-MM-DD), today if omitted
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub membership_date: Option<NaiveDate>,
}

impl AddMemberArgs {
    pub fn validate(&self) -> Result<(), String> {
        required("Name", &self.name)?;
        required("Email", &self.email)?;
        required("Phone", &self.phone)
    }

    pub fn to_record(&self) -> NewMember {
        NewMember {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: optional(&self.address),
            membership_type_id: self.membership_type_id,
            membership_date: self.membership_date,
        }
    }
}

/// Arguments for adding a staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct AddStaffArgs {
    #[cfg_attr(feature = "cli", clap(long))]
    pub name: String,

    #[cfg_attr(feature = "cli", clap(long))]
    pub email: String,

    #[cfg_attr(feature = "cli", clap(long))]
    pub phone: String,

    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub role: Option<String>,

    /// Hire date (YYYY-MM-DD), today if omitted
    #[cfg_attr(feature = "cli", clap(long))]
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
}

impl AddStaffArgs {
    pub fn validate(&self) -> Result<(), String> {
        required("Name", &self.name)?;
        required("Email", &self.email)?;
        required("Phone", &self.phone)
    }

    pub fn to_record(&self) -> NewStaffMember {
        NewStaffMember {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            role: optional(&self.role),
            hire_date: self.hire_date,
        }
    }
}

/// Arguments for adding a membership type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::Args))]
pub struct AddMembershipTypeArgs {
    #[cfg_attr(feature = "cli", clap(long))]
    pub type_name: String,

    #[cfg_attr(feature = "cli", clap(long, allow_hyphen_values = true))]
    pub duration_months: i64,

    #[cfg_attr(feature = "cli", clap(long, allow_hyphen_values = true))]
    pub fee: f64,
}

impl AddMembershipTypeArgs {
    pub fn validate(&self) -> Result<(), String> {
        required("Type name", &self.type_name)?;
        if self.duration_months <= 0 {
            return Err("Duration must be at least one month".to_string());
        }
        if !self.fee.is_finite() || self.fee < 0.0 {
            return Err("Fee must not be negative".to_string());
        }
        Ok(())
    }

    pub fn to_record(&self) -> NewMembershipType {
        NewMembershipType {
            type_name: self.type_name.trim().to_string(),
            duration_months: self.duration_months,
            fee: self.fee,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> AddBookArgs {
        AddBookArgs {
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            isbn: "9780441013593".to_string(),
            genre: Some("  ".to_string()),
            published_year: Some(1965),
            publisher_id: None,
            quantity: 0,
        }
    }

    #[test]
    fn test_search_term_required() {
        assert!(BookSearchArgs::new("").validate().is_err());
        assert!(BookSearchArgs::new("   ").validate().is_err());
        assert!(BookSearchArgs::new("dune").validate().is_ok());
    }

    #[test]
    fn test_book_validation() {
        assert!(book().validate().is_ok());

        let mut negative = book();
        negative.quantity = -1;
        assert_eq!(
            negative.validate().unwrap_err(),
            "Quantity must not be negative"
        );

        let mut untitled = book();
        untitled.title = " ".to_string();
        assert_eq!(untitled.validate().unwrap_err(), "Title is required");
    }

    #[test]
    fn test_blank_optional_fields_become_none() {
        let record = book().to_record();
        assert_eq!(record.genre, None);
        assert_eq!(record.published_year, Some(1965));
    }

    #[test]
    fn test_publisher_record() {
        let args = AddPublisherArgs {
            name: " Penguin Books ".to_string(),
            email: Some("contact@penguin.com".to_string()),
            ..Default::default()
        };
        assert!(args.validate().is_ok());
        let record = args.to_record();
        assert_eq!(record.name, "Penguin Books");
        assert_eq!(record.address, None);

        assert!(AddPublisherArgs::default().validate().is_err());
    }

    #[test]
    fn test_membership_type_validation() {
        let mut args = AddMembershipTypeArgs {
            type_name: "Annual".to_string(),
            duration_months: 12,
            fee: 49.99,
        };
        assert!(args.validate().is_ok());

        args.fee = -1.0;
        assert!(args.validate().is_err());

        args.fee = 0.0;
        args.duration_months = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_member_requires_contact() {
        let args = AddMemberArgs {
            name: "Ada".to_string(),
            email: String::new(),
            phone: "5550001".to_string(),
            address: None,
            membership_type_id: None,
            membership_date: None,
        };
        assert_eq!(args.validate().unwrap_err(), "Email is required");
    }
}
