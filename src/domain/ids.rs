//! Document identifiers.
//!
//! The host store is document-shaped: every key is an opaque string, never
//! an auto-increment integer. These newtypes keep the different id spaces
//! from being accidentally interchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! doc_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

doc_id!(SeasonId);
doc_id!(TeamId);
doc_id!(PlayerId);
doc_id!(GameId);
doc_id!(CalculationId);
