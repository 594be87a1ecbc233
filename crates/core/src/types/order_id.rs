//! Order identifier type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OrderId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderIdError {
    /// The input string is empty.
    #[error("order id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("order id must be at most {max} digits")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("order id must contain only digits")]
    NotNumeric,
}

/// An order identifier as typed by a reporter.
///
/// Order ids are numeric in practice but are kept as text so leading zeros
/// survive and the store key matches exactly what was reported.
///
/// ## Examples
///
/// ```
/// use issuedesk_core::OrderId;
///
/// assert!(OrderId::parse("42").is_ok());
/// assert!(OrderId::parse("0042").is_ok());
///
/// assert!(OrderId::parse("").is_err());
/// assert!(OrderId::parse("42a").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Maximum number of digits accepted.
    pub const MAX_LENGTH: usize = 64;

    /// Parse an `OrderId` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than
    /// [`Self::MAX_LENGTH`], or contains anything but ASCII digits.
    pub fn parse(s: &str) -> Result<Self, OrderIdError> {
        if s.is_empty() {
            return Err(OrderIdError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(OrderIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OrderIdError::NotNumeric);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the order id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderId` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the numeric value, if it fits in a `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for OrderId {
    type Err = OrderIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for OrderId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}
