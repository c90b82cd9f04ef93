//! Loan records as they arrive from the portfolio file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PrepayError, PrepayResult};
use crate::types::{Currency, Date, PaymentFrequency};

/// Repayment structure of a credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AmortizationType {
    /// Constant installment (annuity).
    French,
    /// Constant principal per installment.
    German,
    /// Interest only, principal at the last installment.
    American,
    /// Single payment of principal plus compounded interest at maturity.
    Bullet,
}

impl AmortizationType {
    /// Returns true for single-payment credits.
    #[must_use]
    pub fn is_bullet(&self) -> bool {
        matches!(self, AmortizationType::Bullet)
    }
}

impl fmt::Display for AmortizationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AmortizationType::French => "French",
            AmortizationType::German => "German",
            AmortizationType::American => "American",
            AmortizationType::Bullet => "Bullet",
        };
        write!(f, "{name}")
    }
}

impl FromStr for AmortizationType {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "french" | "francés" | "frances" => Ok(AmortizationType::French),
            "german" | "alemán" | "aleman" => Ok(AmortizationType::German),
            "american" | "americano" => Ok(AmortizationType::American),
            "bullet" => Ok(AmortizationType::Bullet),
            _ => Err(PrepayError::unknown_variant("amortization type", s)),
        }
    }
}

/// Product line of a credit. Selects the historical market-rate series
/// used to calibrate the Vasicek model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductCategory {
    /// Commercial loans
    Comercial,
    /// Consumer loans
    Consumo,
    /// Mortgages
    Vivienda,
}

impl ProductCategory {
    /// All categories, in the column order of the market-rate table.
    pub const ALL: [ProductCategory; 3] = [
        ProductCategory::Comercial,
        ProductCategory::Consumo,
        ProductCategory::Vivienda,
    ];

    /// Column label used in the historical rate table.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            ProductCategory::Comercial => "Comercial",
            ProductCategory::Consumo => "Consumo",
            ProductCategory::Vivienda => "Vivienda",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for ProductCategory {
    type Err = PrepayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comercial" | "commercial" => Ok(ProductCategory::Comercial),
            "consumo" | "consumer" => Ok(ProductCategory::Consumo),
            "vivienda" | "mortgage" => Ok(ProductCategory::Vivienda),
            _ => Err(PrepayError::unknown_variant("product category", s)),
        }
    }
}

/// A single loan in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credit {
    /// Unique credit identifier.
    pub id: String,
    /// Repayment structure.
    pub amortization: AmortizationType,
    /// Product line.
    pub category: ProductCategory,
    /// Disbursed principal.
    pub principal: f64,
    /// Contractual effective-annual rate, decimal.
    pub rate: f64,
    /// Number of installments.
    pub installments: u32,
    /// Disbursement date.
    pub disbursement: Date,
    /// Contractual maturity date.
    pub maturity: Date,
    /// Currency (selects the discount curve).
    pub currency: Currency,
    /// Installment frequency.
    pub frequency: PaymentFrequency,
}

impl Credit {
    /// Checks the fields every amortization generator relies on.
    pub fn validate(&self) -> PrepayResult<()> {
        if self.principal <= 0.0 || !self.principal.is_finite() {
            return Err(PrepayError::invalid_credit(&self.id, "principal must be positive"));
        }
        if self.rate < 0.0 || !self.rate.is_finite() {
            return Err(PrepayError::invalid_credit(&self.id, "rate must be non-negative"));
        }
        if !self.amortization.is_bullet() && self.installments == 0 {
            return Err(PrepayError::invalid_credit(
                &self.id,
                "number of installments must be positive",
            ));
        }
        if self.amortization.is_bullet() && self.maturity <= self.disbursement {
            return Err(PrepayError::invalid_credit(
                &self.id,
                "maturity must be after disbursement",
            ));
        }
        Ok(())
    }

    /// Contractual tenor in years (actual/365).
    #[must_use]
    pub fn tenor_years(&self) -> f64 {
        self.disbursement.days_between(&self.maturity) as f64 / 365.0
    }
}
