//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{
    Error, UserID, ValidationErrors,
    database_id::CategoryId,
    entry_type::EntryType,
    validation::{InvalidValue, required, trimmed_with_length},
};

/// A category name with 1 to 50 characters and no surrounding whitespace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from untrimmed input.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is empty or longer than 50 characters.
    pub fn new(name: &str) -> Result<Self, InvalidValue> {
        trimmed_with_length("name", name, 1, 50).map(Self)
    }

    /// Create a category name without validation.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the length invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A colour in the form `#rrggbb` with lowercase hex digits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Color(String);

impl Color {
    /// Parse a hex colour.
    ///
    /// Accepts three or six hex digits with or without a leading `#`, in any
    /// case. Three digit colours are expanded, so "#F0a" becomes "#ff00aa".
    ///
    /// # Errors
    ///
    /// Returns an error if `color` is not a hex colour.
    pub fn new(color: &str) -> Result<Self, InvalidValue> {
        let color = color.trim();
        let digits = color.strip_prefix('#').unwrap_or(color);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(Self::invalid());
        }

        let digits = digits.to_ascii_lowercase();

        match digits.len() {
            6 => Ok(Self(format!("#{digits}"))),
            3 => Ok(Self(
                digits
                    .chars()
                    .fold(String::from("#"), |mut expanded, c| {
                        expanded.push(c);
                        expanded.push(c);
                        expanded
                    }),
            )),
            _ => Err(Self::invalid()),
        }
    }

    /// Create a colour without validation.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the format invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_owned())
    }

    fn invalid() -> InvalidValue {
        InvalidValue::new("color must be a hex colour such as #22c55e")
    }
}

impl Default for Color {
    fn default() -> Self {
        Self("#000000".to_owned())
    }
}

impl AsRef<str> for Color {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A user's label for grouping transactions, e.g. 'Food' or 'Salary'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name shown to the user.
    pub name: CategoryName,
    /// Whether the category holds income or expenses.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// The colour used to display the category.
    pub color: Color,
    /// The user who owns the category.
    pub user_id: UserID,
}

impl Category {
    /// The fields of the category that are embedded in a transaction.
    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            id: self.id,
            name: self.name.clone(),
            entry_type: self.entry_type,
            color: self.color.clone(),
        }
    }
}

/// The category of a transaction as it is embedded in transaction listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: CategoryName,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub color: Color,
}

/// A validated category that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub entry_type: EntryType,
    pub color: Color,
}

/// The body of a create or update category request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CategoryForm {
    /// The name, required.
    pub name: Option<String>,
    /// "income" or "expense", required.
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    /// A hex colour, optional.
    pub color: Option<String>,
}

impl CategoryForm {
    /// Validate every field, using `default_color` when no colour was given.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] listing every invalid field.
    pub fn validate(self, default_color: Color) -> Result<NewCategory, Error> {
        let mut errors = ValidationErrors::new();

        let name = errors.check(
            "name",
            self.name
                .as_deref()
                .ok_or_else(|| required("name"))
                .and_then(CategoryName::new),
        );
        let entry_type = errors.check(
            "type",
            self.entry_type
                .as_deref()
                .ok_or_else(|| required("type"))
                .and_then(str::parse::<EntryType>),
        );
        let color = match self.color.as_deref() {
            None => Some(default_color),
            Some(raw_color) => errors.check("color", Color::new(raw_color)),
        };

        match (name, entry_type, color) {
            (Some(name), Some(entry_type), Some(color)) => Ok(NewCategory {
                name,
                entry_type,
                color,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}
