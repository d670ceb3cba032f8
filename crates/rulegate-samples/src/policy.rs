//! The sample loan policy: six eligibility rules over a mortgage
//! application, parameterized by a per-product threshold table.

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use rulegate_engine::{CancellationToken, LookupValue, NestedLookup, Policy, Rule};

use crate::application::MortgageApplication;

/// Per-product underwriting thresholds.
///
/// Page, product row, named column. Rule bodies navigate the table with the
/// product code taken straight from the application, relying on the lookup's
/// never-throw navigation for unknown products.
pub fn mortgage_lookups() -> NestedLookup<String> {
    NestedLookup::new([
        // First Time Buyer thresholds
        (["Default", "FTB", "MinLoan"], LookupValue::from(100_000)),
        (["Default", "FTB", "MaxLoan"], LookupValue::from(420_000)),
        (["Default", "FTB", "MinApplicantAge"], LookupValue::from(25)),
        (["Default", "FTB", "MinLTV"], LookupValue::from(95.0)),
        (["Default", "FTB", "MinDSCR"], LookupValue::from(50)),
        (["Default", "FTB", "InterestRateDSCR"], LookupValue::from(0.95)),
        // Buy to Let thresholds
        (["Default", "BTL", "MinLoan"], LookupValue::from(200_000)),
        (["Default", "BTL", "MaxLoan"], LookupValue::from(2_000_000)),
        (["Default", "BTL", "MinApplicantAge"], LookupValue::from(30)),
        (["Default", "BTL", "MinLTV"], LookupValue::from(75.0)),
        (["Default", "BTL", "MinDSCR"], LookupValue::from(50)),
        (["Default", "BTL", "InterestRateDSCR"], LookupValue::from(0.95)),
    ])
    .expect("threshold table paths are non-empty")
}

/// Builds the sample loan policy over the given threshold table.
pub fn mortgage_policy(lookups: Arc<NestedLookup<String>>) -> Policy<MortgageApplication> {
    let known_mortgage_type = {
        let table = Arc::clone(&lookups);
        Rule::new(
            "MA001",
            "KnownMortgageType",
            move |request: &MortgageApplication, token: CancellationToken| {
                let table = Arc::clone(&table);
                async move {
                    simulate_upstream_check(Duration::from_millis(100), token).await?;
                    Ok(table.at("Default").is_defined(request.mortgage_type.as_str()))
                }
                .boxed()
            },
        )
        .with_description("Checks the mortgage type")
        .with_failure_message(|r: &MortgageApplication| {
            format!("The mortgage type [{}] is not known.", r.mortgage_type)
        })
    };

    let age_limit = {
        let table = Arc::clone(&lookups);
        Rule::new(
            "MA002",
            "MinAgeCheck",
            move |request: &MortgageApplication, token: CancellationToken| {
                let table = Arc::clone(&table);
                async move {
                    simulate_upstream_check(Duration::from_millis(50), token).await?;
                    let min_age = table
                        .at("Default")
                        .at(request.mortgage_type.as_str())
                        .at("MinApplicantAge")
                        .as_i64()?;
                    Ok(i64::from(request.applicant_age) >= min_age)
                }
                .boxed()
            },
        )
        .with_description("Minimum age of the applicant")
        .with_failure_message(|r: &MortgageApplication| {
            format!("The applicant age [{}] is too young.", r.applicant_age)
        })
    };

    let min_loan_amount = {
        let table = Arc::clone(&lookups);
        Rule::new(
            "MA003",
            "MinLoanAmount",
            move |request: &MortgageApplication, token: CancellationToken| {
                let table = Arc::clone(&table);
                async move {
                    simulate_upstream_check(Duration::from_millis(20), token).await?;
                    let min_loan = table
                        .at("Default")
                        .at(request.mortgage_type.as_str())
                        .at("MinLoan")
                        .as_i64()?;
                    Ok(request.loan_amount >= min_loan as f64)
                }
                .boxed()
            },
        )
        .with_description("Minimum loan amount check")
        .with_failure_message(|r: &MortgageApplication| {
            format!("The loan amount [{}] is too small.", r.loan_amount)
        })
    };

    let max_loan_amount = {
        let table = Arc::clone(&lookups);
        Rule::new(
            "MA004",
            "MaxLoanAmount",
            move |request: &MortgageApplication, token: CancellationToken| {
                let table = Arc::clone(&table);
                async move {
                    simulate_upstream_check(Duration::from_millis(20), token).await?;
                    let max_loan = table
                        .at("Default")
                        .at(request.mortgage_type.as_str())
                        .at("MaxLoan")
                        .as_i64()?;
                    Ok(request.loan_amount <= max_loan as f64)
                }
                .boxed()
            },
        )
        .with_description("Maximum loan amount check")
        .with_failure_message(|r: &MortgageApplication| {
            format!("The loan amount [{}] is too large.", r.loan_amount)
        })
    };

    let loan_to_value = {
        let table = Arc::clone(&lookups);
        let message_table = Arc::clone(&lookups);
        Rule::new(
            "MA005",
            "LTV",
            move |request: &MortgageApplication, token: CancellationToken| {
                let table = Arc::clone(&table);
                async move {
                    simulate_upstream_check(Duration::from_millis(20), token).await?;
                    let min_ltv = table
                        .at("Default")
                        .at(request.mortgage_type.as_str())
                        .at("MinLTV")
                        .as_f64()?;
                    let ltv = loan_to_value_ratio(request);
                    Ok(ltv <= min_ltv)
                }
                .boxed()
            },
        )
        .with_description(
            "Loan-To-Value Ratio must be above the minimum threshold for lenders to satisfy \
             loan serviceability requirements",
        )
        .with_failure_message(move |r: &MortgageApplication| {
            let min_ltv = message_table
                .at("Default")
                .at(r.mortgage_type.as_str())
                .at("MinLTV")
                .as_f64()
                .unwrap_or_default();
            format!(
                "The LTV ratio [{}] is above the minimum threshold for the high-ltv loans [{}]. \
                 Either increase the principal {} or lower the loan amount {}",
                loan_to_value_ratio(r),
                min_ltv,
                r.principal_amount,
                r.loan_amount
            )
        })
    };

    let debt_service = {
        let table = Arc::clone(&lookups);
        let message_table = Arc::clone(&lookups);
        Rule::new(
            "MA006",
            "DSR",
            move |request: &MortgageApplication, token: CancellationToken| {
                let table = Arc::clone(&table);
                async move {
                    simulate_upstream_check(Duration::from_millis(20), token).await?;
                    let interest_rate = table
                        .at("Default")
                        .at(request.mortgage_type.as_str())
                        .at("InterestRateDSCR")
                        .as_f64()?;
                    let min_dsr = table
                        .at("Default")
                        .at(request.mortgage_type.as_str())
                        .at("MinDSCR")
                        .as_i64()?;
                    let dsr = debt_service_ratio(request, interest_rate);
                    Ok(dsr <= min_dsr as f64)
                }
                .boxed()
            },
        )
        .with_description(
            "Debt-To-Service Ratio must be below threshold so applicant can handle monthly \
             loan commitments",
        )
        .with_failure_message(move |r: &MortgageApplication| {
            let interest_rate = message_table
                .at("Default")
                .at(r.mortgage_type.as_str())
                .at("InterestRateDSCR")
                .as_f64()
                .unwrap_or_default();
            let min_dsr = message_table
                .at("Default")
                .at(r.mortgage_type.as_str())
                .at("MinDSCR")
                .as_i64()
                .unwrap_or_default();
            format!(
                "The DSCR ratio [{}] is above the minimum threshold [{}]. Either increase \
                 applicant monthly salary or reduce applicant monthly expenditures",
                debt_service_ratio(r, interest_rate),
                min_dsr
            )
        })
    };

    Policy::builder("P001", "LoanPolicy")
        .description("Simple loan policy")
        .rule(known_mortgage_type)
        .rule(age_limit)
        .rule(min_loan_amount)
        .rule(max_loan_amount)
        .rule(loan_to_value)
        .rule(debt_service)
        .build()
}

fn loan_to_value_ratio(r: &MortgageApplication) -> f64 {
    (r.loan_amount - r.principal_amount) / r.loan_amount * 100.0
}

fn debt_service_ratio(r: &MortgageApplication, interest_rate: f64) -> f64 {
    let monthly_repayment = annuity_payment(
        interest_rate,
        f64::from(r.loan_term * 12),
        -r.loan_amount,
    );
    let monthly_outgoings =
        r.monthly_household_expenses + monthly_repayment + (0.02 * r.loan_amount) / 12.0;
    (monthly_outgoings - r.monthly_living_expenses) / (r.gross_income / 12.0)
}

/// Fixed-rate annuity payment per period for a present value.
fn annuity_payment(rate: f64, periods: f64, present_value: f64) -> f64 {
    if rate == 0.0 {
        -present_value / periods
    } else {
        -present_value * rate / (1.0 - (1.0 + rate).powf(-periods))
    }
}

/// Stand-in for an upstream eligibility service call. Faults when the
/// cancellation signal is observed mid-wait.
async fn simulate_upstream_check(
    latency: Duration,
    token: CancellationToken,
) -> anyhow::Result<()> {
    tokio::select! {
        _ = token.cancelled() => anyhow::bail!("upstream eligibility check cancelled"),
        _ = tokio::time::sleep(latency) => Ok(()),
    }
}
