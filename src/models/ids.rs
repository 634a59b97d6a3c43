//! Strongly-typed ID wrappers for ledger entities
//!
//! The ledger hands out plain integer identifiers. Wrapping them in newtypes
//! prevents accidentally passing a category ID where a transaction ID is
//! expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw ledger identifier
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Get the underlying ledger identifier
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_id!(TransactionId);
define_id!(CategoryId);
define_id!(TagId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(TransactionId::new(242330919).to_string(), "242330919");
    }

    #[test]
    fn test_id_serializes_as_bare_integer() {
        let json = serde_json::to_string(&TransactionId::new(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: TransactionId = serde_json::from_str("42").unwrap();
        assert_eq!(parsed, TransactionId::new(42));
    }

    #[test]
    fn test_id_parse() {
        let id: CategoryId = " 17 ".parse().unwrap();
        assert_eq!(id.get(), 17);
        assert!("cat-17".parse::<CategoryId>().is_err());
    }
}
