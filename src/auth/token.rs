//! Defines the session token stored in the auth cookie.

use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::auth::UserID;

mod datetime_format {
    //! Serializes a [time::OffsetDateTime] with two digit hours.
    //!
    //! The default serializer writes midnight as "0:00:00.0", which the
    //! default deserializer then rejects.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{
        OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
    };

    /// Date time format for the session expiry, e.g. "2021-01-01 00:00:00.000000 +00:00:00".
    const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond] [offset_hour \
             sign:mandatory]:[offset_minute]:[offset_second]"
    );

    pub fn serialize<S>(dt: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = dt
            .format(DATE_TIME_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        OffsetDateTime::parse(&s, DATE_TIME_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Identifies the logged in user and when their session ends.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Token {
    pub user_id: UserID,

    #[serde(with = "datetime_format")]
    pub expires_at: OffsetDateTime,
}

impl Token {
    /// A token for `user_id` that expires `duration` from now.
    pub fn new(user_id: UserID, duration: Duration) -> Self {
        Self {
            user_id,
            expires_at: OffsetDateTime::now_utc() + duration,
        }
    }

    /// Whether the session has ended.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= OffsetDateTime::now_utc()
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, UtcOffset, macros::datetime};

    use crate::{UserID, auth::token::Token};

    #[test]
    fn serialise_token() {
        let token = Token {
            user_id: UserID::new(7),
            expires_at: datetime!(2025-12-21 03:54:00).assume_offset(UtcOffset::UTC),
        };
        let expected = r#"{"user_id":7,"expires_at":"2025-12-21 03:54:00.0 +00:00:00"}"#;

        let actual = serde_json::to_string(&token).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn deserialise_token_with_midnight_expiry() {
        let expected = Token {
            user_id: UserID::new(7),
            expires_at: datetime!(2025-12-21 00:00:00).assume_offset(UtcOffset::UTC),
        };
        let token_string = r#"{"user_id":7,"expires_at":"2025-12-21 00:00:00.0 +00:00:00"}"#;

        let actual: Token = serde_json::from_str(token_string).unwrap();

        assert_eq!(expected, actual);
    }

    #[test]
    fn new_token_is_not_expired() {
        assert!(!Token::new(UserID::new(1), Duration::minutes(5)).is_expired());
    }

    #[test]
    fn token_in_the_past_is_expired() {
        assert!(Token::new(UserID::new(1), Duration::minutes(-5)).is_expired());
    }
}
