//! Urlencoded form payloads posted by the HTML pages.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{CatalogError, CatalogResult};
use crate::modules::books::models::Book;
use crate::modules::categories::models::CategoryId;

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Default, Deserialize)]
pub struct BookForm {
    #[serde(default)]
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    #[serde(rename = "publishedDate")]
    pub published_date: Option<String>,
    pub available: Option<String>,
    pub category: Option<String>,
}

impl BookForm {
    /// The book described by the form and the category it was assigned to.
    pub fn parse(self) -> CatalogResult<(Book, Option<CategoryId>)> {
        let published_date = non_empty(self.published_date)
            .map(|raw| {
                NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                    CatalogError::InvalidArgument(format!("invalid publication date '{}'", raw))
                })
            })
            .transpose()?;

        let category = non_empty(self.category)
            .map(|raw| {
                raw.parse::<CategoryId>().map_err(|_| {
                    CatalogError::InvalidArgument(format!("invalid category '{}'", raw))
                })
            })
            .transpose()?;

        let mut book = Book::with_title(self.title.trim());
        book.author = non_empty(self.author);
        book.isbn = non_empty(self.isbn);
        book.published_date = published_date;
        book.available = matches!(self.available.as_deref(), Some("true" | "on"));

        Ok((book, category))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_form() {
        let form = BookForm {
            title: " Dune ".into(),
            author: Some("Frank Herbert".into()),
            isbn: Some("".into()),
            published_date: Some("1965-08-01".into()),
            available: Some("true".into()),
            category: Some("3".into()),
        };

        let (book, category) = form.parse().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author.as_deref(), Some("Frank Herbert"));
        assert!(book.isbn.is_none());
        assert_eq!(book.published_date, NaiveDate::from_ymd_opt(1965, 8, 1));
        assert!(book.available);
        assert_eq!(category, Some(3));
    }

    #[test]
    fn blank_fields_become_absent() {
        let form = BookForm {
            title: "Emma".into(),
            published_date: Some(String::new()),
            category: Some(String::new()),
            ..BookForm::default()
        };

        let (book, category) = form.parse().unwrap();
        assert!(book.published_date.is_none());
        assert!(!book.available);
        assert!(category.is_none());
    }

    #[test]
    fn rejects_malformed_values() {
        let bad_date = BookForm {
            published_date: Some("08/01/1965".into()),
            ..BookForm::default()
        };
        assert!(matches!(
            bad_date.parse(),
            Err(CatalogError::InvalidArgument(_))
        ));

        let bad_category = BookForm {
            category: Some("fiction".into()),
            ..BookForm::default()
        };
        assert!(matches!(
            bad_category.parse(),
            Err(CatalogError::InvalidArgument(_))
        ));
    }

    #[test]
    fn ignores_unknown_fields() {
        let form: BookForm = serde_json::from_value(serde_json::json!({
            "title": "Emma",
            "publishedDate": "1815-12-23",
            "_method": "put"
        }))
        .unwrap();
        assert_eq!(form.published_date.as_deref(), Some("1815-12-23"));
    }
}
