//! Column values that can be bound to a PostgreSQL query and compared in memory.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::Database;
use std::cmp::Ordering;
use std::fmt;

/// A single column value. Each variant binds with its own Postgres type.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Ordering between values of the same kind; `Null` sorts first, mixed kinds are unordered.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        use FieldValue::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Null, _) => Some(Ordering::Less),
            (_, Null) => Some(Ordering::Greater),
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (Int(a), Int(b)) => a.partial_cmp(b),
            (BigInt(a), BigInt(b)) => a.partial_cmp(b),
            (Int(a), BigInt(b)) => i64::from(*a).partial_cmp(b),
            (BigInt(a), Int(b)) => a.partial_cmp(&i64::from(*b)),
            (Decimal(a), Decimal(b)) => a.partial_cmp(b),
            (Text(a), Text(b)) => a.partial_cmp(b),
            (Timestamp(a), Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::BigInt(n) => write!(f, "{}", n),
            FieldValue::Decimal(d) => write!(f, "{}", d),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Timestamp(t) => f.write_str(&t.to_rfc3339()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        s.map(FieldValue::Text).unwrap_or(FieldValue::Null)
    }
}

impl From<i32> for FieldValue {
    fn from(n: i32) -> Self {
        FieldValue::Int(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::BigInt(n)
    }
}

impl From<Decimal> for FieldValue {
    fn from(d: Decimal) -> Self {
        FieldValue::Decimal(d)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }
}

impl<'q> Encode<'q, Postgres> for FieldValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            FieldValue::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            FieldValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            FieldValue::Int(n) => <i32 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            FieldValue::BigInt(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            FieldValue::Decimal(d) => <Decimal as Encode<Postgres>>::encode_by_ref(d, buf)?,
            FieldValue::Text(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf)?,
            FieldValue::Timestamp(t) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(t, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            FieldValue::Null | FieldValue::Text(_) => <String as sqlx::Type<Postgres>>::type_info(),
            FieldValue::Bool(_) => <bool as sqlx::Type<Postgres>>::type_info(),
            FieldValue::Int(_) => <i32 as sqlx::Type<Postgres>>::type_info(),
            FieldValue::BigInt(_) => <i64 as sqlx::Type<Postgres>>::type_info(),
            FieldValue::Decimal(_) => <Decimal as sqlx::Type<Postgres>>::type_info(),
            FieldValue::Timestamp(_) => <DateTime<Utc> as sqlx::Type<Postgres>>::type_info(),
        })
    }
}

impl sqlx::Type<Postgres> for FieldValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_same_kind_and_widens_integers() {
        assert_eq!(FieldValue::Int(3).compare(&FieldValue::BigInt(7)), Some(Ordering::Less));
        assert_eq!(
            FieldValue::Decimal(Decimal::new(250, 2)).compare(&FieldValue::Decimal(Decimal::new(25, 1))),
            Some(Ordering::Equal)
        );
        assert_eq!(FieldValue::Null.compare(&FieldValue::Text("a".into())), Some(Ordering::Less));
        assert_eq!(FieldValue::Text("a".into()).compare(&FieldValue::Int(1)), None);
    }
}
