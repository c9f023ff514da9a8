//! Database operations for categories.
//!
//! Every function takes the ID of the user acting on the category. A category
//! owned by someone else is treated exactly like one that does not exist.

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error, UserID,
    category::{Category, CategoryForm, CategoryName, Color, NewCategory},
    database_id::CategoryId,
    entry_type::EntryType,
};

/// The categories every new user starts with.
const DEFAULT_CATEGORIES: [(&str, EntryType, &str); 8] = [
    ("Salary", EntryType::Income, "#22c55e"),
    ("Freelance", EntryType::Income, "#16a34a"),
    ("Investments", EntryType::Income, "#15803d"),
    ("Food", EntryType::Expense, "#ef4444"),
    ("Transport", EntryType::Expense, "#dc2626"),
    ("Housing", EntryType::Expense, "#b91c1c"),
    ("Leisure", EntryType::Expense, "#991b1b"),
    ("Health", EntryType::Expense, "#7f1d1d"),
];

/// Create a category owned by `user_id` and return it with its generated ID.
pub fn create_category(
    user_id: UserID,
    category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (name, type, color, user_id) VALUES (?1, ?2, ?3, ?4);",
        (
            category.name.as_ref(),
            category.entry_type,
            category.color.as_ref(),
            user_id.as_i64(),
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name: category.name,
        entry_type: category.entry_type,
        color: category.color,
        user_id,
    })
}

/// Give `user_id` the starter set of income and expense categories.
pub fn create_default_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|(name, entry_type, color)| {
            create_category(
                user_id,
                NewCategory {
                    name: CategoryName::new_unchecked(name),
                    entry_type: *entry_type,
                    color: Color::new_unchecked(color),
                },
                connection,
            )
        })
        .collect()
}

/// Look up a category owned by `user_id`.
///
/// Returns `None` if the category does not exist or belongs to another user.
pub fn find_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, type, color, user_id FROM category
            WHERE id = :id AND user_id = :user_id;",
        )?
        .query_row(
            &[(":id", &category_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve a single category owned by `user_id`.
///
/// # Errors
///
/// Returns an [Error::NotFound] if the category does not exist or belongs to another user.
pub fn get_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    find_category(category_id, user_id, connection)?.ok_or(Error::NotFound)
}

/// Retrieve all of the categories owned by `user_id`, ordered by type then name.
pub fn get_categories(user_id: UserID, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, name, type, color, user_id FROM category
            WHERE user_id = :user_id
            ORDER BY type ASC, name ASC, id ASC;",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Validate `form` against the stored category and save the changes.
///
/// An omitted colour keeps the stored colour.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if the category does not exist or belongs to another
///   user, before any field is validated.
/// - [Error::Validation] if any field is invalid.
/// - [Error::CategoryTypeInUse] if the type would change while transactions use the category.
pub fn update_category(
    category_id: CategoryId,
    user_id: UserID,
    form: CategoryForm,
    connection: &Connection,
) -> Result<Category, Error> {
    let current = get_category(category_id, user_id, connection)?;
    let changes = form.validate(current.color.clone())?;

    if changes.entry_type != current.entry_type
        && count_category_transactions(category_id, connection)? > 0
    {
        return Err(Error::CategoryTypeInUse);
    }

    connection.execute(
        "UPDATE category SET name = ?1, type = ?2, color = ?3 WHERE id = ?4 AND user_id = ?5",
        (
            changes.name.as_ref(),
            changes.entry_type,
            changes.color.as_ref(),
            category_id,
            user_id.as_i64(),
        ),
    )?;

    Ok(Category {
        id: current.id,
        name: changes.name,
        entry_type: changes.entry_type,
        color: changes.color,
        user_id,
    })
}

/// Delete a category owned by `user_id`.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if the category does not exist or belongs to another user.
/// - [Error::CategoryInUse] if any transaction refers to the category. Nothing is deleted.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    get_category(category_id, user_id, connection)?;

    if count_category_transactions(category_id, connection)? > 0 {
        return Err(Error::CategoryInUse);
    }

    connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    Ok(())
}

/// Count the transactions that refer to a category.
pub fn count_category_transactions(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COUNT(id) FROM \"transaction\" WHERE category_id = ?1",
            [category_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Initialize the category table and indexes.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
            color TEXT NOT NULL DEFAULT '#000000',
            user_id INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let raw_name: String = row.get(1)?;
    let raw_color: String = row.get(3)?;

    Ok(Category {
        id: row.get(0)?,
        name: CategoryName::new_unchecked(&raw_name),
        entry_type: row.get(2)?,
        color: Color::new_unchecked(&raw_color),
        user_id: UserID::new(row.get(4)?),
    })
}
