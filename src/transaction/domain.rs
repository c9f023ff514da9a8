//! Core transaction domain types and request validation.

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use time::Date;

use crate::{
    Error, UserID, ValidationErrors,
    category::CategorySummary,
    database_id::{CategoryId, TransactionId},
    date_format::{self, parse_date},
    entry_type::EntryType,
    validation::{InvalidValue, required, trimmed_with_length},
};

/// The longest receipt reference that may be stored.
const MAX_RECEIPT_URL_LENGTH: usize = 2048;

/// A strictly positive amount of money with cent precision, stored as whole cents.
///
/// Serialized as a JSON number in dollars, e.g. 1250 cents is `12.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// The largest amount, 99,999,999.99, in cents.
    pub const MAX_CENTS: i64 = 9_999_999_999;

    /// Create an amount from whole cents.
    ///
    /// # Errors
    ///
    /// Returns an error if `cents` is not positive or exceeds [Amount::MAX_CENTS].
    pub fn from_cents(cents: i64) -> Result<Self, InvalidValue> {
        if cents < 1 {
            return Err(InvalidValue::new("amount must be greater than zero"));
        }

        if cents > Self::MAX_CENTS {
            return Err(InvalidValue::new("amount must be at most 99999999.99"));
        }

        Ok(Self(cents))
    }

    /// Create an amount from a decimal number of dollars.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not positive, has more than two decimal
    /// places, or is too large.
    pub fn from_decimal(value: Decimal) -> Result<Self, InvalidValue> {
        if value <= Decimal::ZERO {
            return Err(InvalidValue::new("amount must be greater than zero"));
        }

        if value.normalize().scale() > 2 {
            return Err(InvalidValue::new(
                "amount must have at most two decimal places",
            ));
        }

        let cents = value
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| InvalidValue::new("amount must be at most 99999999.99"))?;

        Self::from_cents(cents)
    }

    /// Create an amount without validation.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the range invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(cents: i64) -> Self {
        Self(cents)
    }

    /// The amount in whole cents.
    pub fn cents(&self) -> i64 {
        self.0
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serialize_cents(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        parse_amount(&value).map_err(serde::de::Error::custom)
    }
}

/// Serialize a signed number of cents as a decimal number of dollars.
pub fn serialize_cents<S>(cents: &i64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(*cents as f64 / 100.0)
}

/// Read an amount sent as a JSON number or a numeric string.
///
/// Numbers are read from their shortest decimal representation, so `12.345`
/// is rejected for having three decimal places rather than rounded.
pub fn parse_amount(value: &Value) -> Result<Amount, InvalidValue> {
    let decimal = match value {
        Value::Number(number) => parse_decimal(&number.to_string()),
        Value::String(text) => parse_decimal(text.trim()),
        _ => None,
    };

    decimal
        .ok_or_else(|| InvalidValue::new("amount must be a number"))
        .and_then(Amount::from_decimal)
}

/// Parse plain (`12.50`) or scientific (`1.25e1`) decimal notation without rounding.
fn parse_decimal(text: &str) -> Option<Decimal> {
    Decimal::from_str_exact(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Read a category ID sent as a JSON integer or a numeric string.
pub fn parse_category_id(value: &Value) -> Result<CategoryId, InvalidValue> {
    let id = match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    };

    id.ok_or_else(|| InvalidValue::new("categoryId must be an integer"))
}

/// Trim a description and check that it has 1 to 255 characters.
pub fn validate_description(description: &str) -> Result<String, InvalidValue> {
    trimmed_with_length("description", description, 1, 255)
}

/// Trim a receipt reference. A blank reference means there is no receipt.
pub fn validate_receipt_url(receipt_url: &str) -> Result<Option<String>, InvalidValue> {
    let receipt_url = receipt_url.trim();

    if receipt_url.is_empty() {
        return Ok(None);
    }

    if receipt_url.chars().count() > MAX_RECEIPT_URL_LENGTH {
        return Err(InvalidValue(format!(
            "receiptUrl must be at most {MAX_RECEIPT_URL_LENGTH} characters"
        )));
    }

    Ok(Some(receipt_url.to_owned()))
}

/// An amount of money that came in or went out on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short text describing the transaction, e.g. "Lunch".
    pub description: String,
    /// The amount of money that came in or went out.
    pub amount: Amount,
    /// Whether the money came in or went out.
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    /// The day the transaction happened.
    #[serde(with = "date_format")]
    pub date: Date,
    /// Where a photo or scan of the receipt can be found.
    pub receipt_url: Option<String>,
    /// The category the transaction belongs to, of the same type.
    pub category_id: CategoryId,
    /// The user who owns the transaction.
    pub user_id: UserID,
}

/// A transaction with its category embedded, as returned by transaction listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: CategorySummary,
}

/// A validated transaction that has not been stored yet.
///
/// The category has not been checked against the owner yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// The trimmed description, 1 to 255 characters.
    pub description: String,
    /// The amount of money that came in or went out.
    pub amount: Amount,
    /// Whether the money came in or went out.
    pub entry_type: EntryType,
    /// The day the transaction happened.
    pub date: Date,
    /// Where a photo or scan of the receipt can be found.
    pub receipt_url: Option<String>,
    /// The category the transaction belongs to.
    pub category_id: CategoryId,
}

/// The body of a create transaction request.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionForm {
    /// The description, required.
    pub description: Option<String>,
    /// The amount as a number or numeric string, required.
    pub amount: Option<Value>,
    /// "income" or "expense", required.
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    /// The date as `YYYY-MM-DD`, defaults to today.
    pub date: Option<String>,
    /// The ID of one of the user's categories, required.
    pub category_id: Option<Value>,
    /// An optional receipt reference.
    pub receipt_url: Option<String>,
}

impl TransactionForm {
    /// Validate every field, dating the transaction `today` if no date was given.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] listing every invalid field.
    pub fn validate(self, today: Date) -> Result<NewTransaction, Error> {
        let mut errors = ValidationErrors::new();

        let description = errors.check(
            "description",
            self.description
                .as_deref()
                .ok_or_else(|| required("description"))
                .and_then(validate_description),
        );
        let amount = errors.check(
            "amount",
            self.amount
                .as_ref()
                .ok_or_else(|| required("amount"))
                .and_then(parse_amount),
        );
        let entry_type = errors.check(
            "type",
            self.entry_type
                .as_deref()
                .ok_or_else(|| required("type"))
                .and_then(str::parse::<EntryType>),
        );
        let date = match self.date.as_deref() {
            None => Some(today),
            Some(raw_date) => errors.check("date", parse_date("date", raw_date)),
        };
        let category_id = errors.check(
            "categoryId",
            self.category_id
                .as_ref()
                .ok_or_else(|| required("categoryId"))
                .and_then(parse_category_id),
        );
        let receipt_url = match self.receipt_url.as_deref() {
            None => Some(None),
            Some(raw_url) => errors.check("receiptUrl", validate_receipt_url(raw_url)),
        };

        match (description, amount, entry_type, date, category_id, receipt_url) {
            (
                Some(description),
                Some(amount),
                Some(entry_type),
                Some(date),
                Some(category_id),
                Some(receipt_url),
            ) => Ok(NewTransaction {
                description,
                amount,
                entry_type,
                date,
                receipt_url,
                category_id,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

/// The body of an update transaction request. Omitted fields keep their stored value.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub description: Option<String>,
    pub amount: Option<Value>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub date: Option<String>,
    pub category_id: Option<Value>,
    /// `Some(None)` when the request sets the receipt to `null`, which removes it.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub receipt_url: Option<Option<String>>,
}

/// Distinguishes a field set to `null` from a missing field.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl TransactionUpdate {
    /// Validate the fields present in the request and merge them into `current`.
    ///
    /// # Errors
    ///
    /// Returns an [Error::Validation] listing every invalid field.
    pub fn apply(self, current: &Transaction) -> Result<NewTransaction, Error> {
        let mut errors = ValidationErrors::new();

        let description = match self.description.as_deref() {
            None => Some(current.description.clone()),
            Some(raw) => errors.check("description", validate_description(raw)),
        };
        let amount = match self.amount.as_ref() {
            None => Some(current.amount),
            Some(raw) => errors.check("amount", parse_amount(raw)),
        };
        let entry_type = match self.entry_type.as_deref() {
            None => Some(current.entry_type),
            Some(raw) => errors.check("type", raw.parse::<EntryType>()),
        };
        let date = match self.date.as_deref() {
            None => Some(current.date),
            Some(raw) => errors.check("date", parse_date("date", raw)),
        };
        let category_id = match self.category_id.as_ref() {
            None => Some(current.category_id),
            Some(raw) => errors.check("categoryId", parse_category_id(raw)),
        };
        let receipt_url = match self.receipt_url {
            None => Some(current.receipt_url.clone()),
            Some(None) => Some(None),
            Some(Some(raw)) => errors.check("receiptUrl", validate_receipt_url(&raw)),
        };

        match (description, amount, entry_type, date, category_id, receipt_url) {
            (
                Some(description),
                Some(amount),
                Some(entry_type),
                Some(date),
                Some(category_id),
                Some(receipt_url),
            ) => Ok(NewTransaction {
                description,
                amount,
                entry_type,
                date,
                receipt_url,
                category_id,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

#[cfg(test)]
mod amount_tests {
    use serde_json::json;

    use super::{Amount, parse_amount};

    fn cents(value: serde_json::Value) -> Option<i64> {
        parse_amount(&value).ok().map(|amount| amount.cents())
    }

    #[test]
    fn zero_and_negative_amounts_fail() {
        assert!(parse_amount(&json!(0)).is_err());
        assert!(parse_amount(&json!(0.0)).is_err());
        assert!(parse_amount(&json!(-5)).is_err());
        assert!(parse_amount(&json!("-0.01")).is_err());
    }

    #[test]
    fn one_cent_succeeds() {
        assert_eq!(cents(json!(0.01)), Some(1));
        assert_eq!(cents(json!("0.01")), Some(1));
    }

    #[test]
    fn sub_cent_precision_fails() {
        assert!(parse_amount(&json!(0.001)).is_err());
        assert!(parse_amount(&json!(12.345)).is_err());
    }

    #[test]
    fn trailing_digits_are_not_dropped() {
        assert!(parse_amount(&json!("0.100000001")).is_err());
        assert!(parse_amount(&json!(12.500000004)).is_err());
        assert!(parse_amount(&json!("19.9900000009")).is_err());
    }

    #[test]
    fn trailing_zeros_are_allowed() {
        assert_eq!(cents(json!("7.500000")), Some(750));
        assert_eq!(cents(json!(20.0)), Some(2000));
    }

    #[test]
    fn decimals_are_exact() {
        assert_eq!(cents(json!(19.99)), Some(1999));
        assert_eq!(cents(json!(0.29)), Some(29));
        assert_eq!(cents(json!("1.25e1")), Some(1250));
    }

    #[test]
    fn maximum_amount() {
        assert_eq!(cents(json!(99_999_999.99)), Some(Amount::MAX_CENTS));
        assert!(parse_amount(&json!(100_000_000)).is_err());
        assert!(parse_amount(&json!(1e300)).is_err());
        assert!(parse_amount(&json!("99999999999999999999999999999999")).is_err());
    }

    #[test]
    fn serializes_as_dollars() {
        assert_eq!(
            serde_json::to_value(Amount::new_unchecked(1250)).unwrap(),
            json!(12.5)
        );
    }

    #[test]
    fn parses_numbers_and_numeric_strings() {
        assert_eq!(parse_amount(&json!(12.5)), Ok(Amount::new_unchecked(1250)));
        assert_eq!(parse_amount(&json!(20)), Ok(Amount::new_unchecked(2000)));
        assert_eq!(parse_amount(&json!(" 7.05 ")), Ok(Amount::new_unchecked(705)));
        assert!(parse_amount(&json!("seven")).is_err());
        assert!(parse_amount(&json!("")).is_err());
        assert!(parse_amount(&json!(true)).is_err());
    }
}
