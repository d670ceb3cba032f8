//! The request value the sample policy is evaluated against.

use serde::{Deserialize, Serialize};

/// A mortgage application, as submitted by a prospective borrower.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MortgageApplication {
    pub applicant_age: u32,
    /// Product code, e.g. `FTB` (first-time buyer) or `BTL` (buy-to-let).
    pub mortgage_type: String,
    pub loan_amount: f64,
    pub principal_amount: f64,
    pub gross_income: f64,
    pub monthly_living_expenses: f64,
    pub monthly_household_expenses: f64,
    /// Loan term in years.
    #[serde(default = "default_loan_term")]
    pub loan_term: u32,
}

fn default_loan_term() -> u32 {
    25
}
