//! Portfolio currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PrepayError;

/// Currency of a credit and of the discount curve used to value it.
///
/// `UVR` is the inflation-indexed real-value unit; it is treated as a
/// currency because it carries its own discount curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Currency {
    /// Colombian Peso
    #[default]
    COP,
    /// United States Dollar
    USD,
    /// Unidad de Valor Real
    UVR,
}

impl Currency {
    /// All supported currencies, in curve-column order.
    pub const ALL: [Currency; 3] = [Currency::COP, Currency::USD, Currency::UVR];

    /// Returns the 3-letter code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Currency::COP => "COP",
            Currency::USD => "USD",
            Currency::UVR => "UVR",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "COP" => Ok(Currency::COP),
            "USD" => Ok(Currency::USD),
            "UVR" => Ok(Currency::UVR),
            other => Err(PrepayError::unknown_variant("currency", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("cop".parse::<Currency>().unwrap(), Currency::COP);
        assert_eq!(" UVR ".parse::<Currency>().unwrap(), Currency::UVR);
        assert!("EUR".parse::<Currency>().is_err());
    }

    #[test]
    fn test_display_matches_code() {
        for ccy in Currency::ALL {
            assert_eq!(ccy.to_string(), ccy.code());
        }
    }
}
