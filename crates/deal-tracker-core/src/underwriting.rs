use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{monthly_payment, remaining_balance};
use crate::error::checked;
use crate::sanitize::{FieldStatus, NumericInput};
use crate::types::{
    with_metadata, ComputationOutput, Money, Months, Percent, Years, MONTHS_PER_YEAR,
};
use crate::DealResult;

/// Loan term applied when `loanTermYears` is absent, `null` or blank.
pub const DEFAULT_LOAN_TERM_YEARS: Decimal = dec!(30);

const DSCR_WARNING_THRESHOLD: Decimal = dec!(1.20);
const LTV_WARNING_THRESHOLD_PCT: Decimal = dec!(80);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How the acquisition loan is serviced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DebtServiceType {
    /// Level monthly payment of principal and interest
    #[default]
    Standard,
    /// Interest only; the principal is repaid in full at exit
    #[serde(alias = "interest_only")]
    InterestOnly,
}

/// Raw deal record as entered in the tracker.
///
/// Every numeric field is optional and may be text. Percent fields are in
/// percent units (`70` means 70%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DealInput {
    /// Rentable building area
    pub square_feet: NumericInput,
    /// Base rent per square foot per month
    pub monthly_base_rent_per_sqft: NumericInput,
    /// Explicit monthly rent; when non-zero it replaces area * rate
    pub monthly_rent: NumericInput,
    pub purchase_price: NumericInput,
    pub improvements: NumericInput,
    pub closing_costs: NumericInput,
    /// Loan-to-value against all-in cost
    pub ltv_percent: NumericInput,
    pub interest_rate_percent: NumericInput,
    pub loan_term_years: NumericInput,
    pub debt_service_type: DebtServiceType,
    pub exit_cap_rate_percent: NumericInput,
    pub holding_period_months: NumericInput,
}

impl Default for DealInput {
    fn default() -> Self {
        DealInput {
            square_feet: NumericInput::Missing,
            monthly_base_rent_per_sqft: NumericInput::Missing,
            monthly_rent: NumericInput::Missing,
            purchase_price: NumericInput::Missing,
            improvements: NumericInput::Missing,
            closing_costs: NumericInput::Missing,
            ltv_percent: NumericInput::Missing,
            interest_rate_percent: NumericInput::Missing,
            loan_term_years: NumericInput::Value(DEFAULT_LOAN_TERM_YEARS),
            debt_service_type: DebtServiceType::Standard,
            exit_cap_rate_percent: NumericInput::Missing,
            holding_period_months: NumericInput::Missing,
        }
    }
}

impl DealInput {
    /// Build a deal from an already-parsed JSON document.
    pub fn from_value(value: serde_json::Value) -> DealResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Numeric fields paired with their record names, in record order.
    pub fn numeric_fields(&self) -> [(&'static str, &NumericInput); 11] {
        [
            ("squareFeet", &self.square_feet),
            ("monthlyBaseRentPerSqft", &self.monthly_base_rent_per_sqft),
            ("monthlyRent", &self.monthly_rent),
            ("purchasePrice", &self.purchase_price),
            ("improvements", &self.improvements),
            ("closingCosts", &self.closing_costs),
            ("ltvPercent", &self.ltv_percent),
            ("interestRatePercent", &self.interest_rate_percent),
            ("loanTermYears", &self.loan_term_years),
            ("exitCapRatePercent", &self.exit_cap_rate_percent),
            ("holdingPeriodMonths", &self.holding_period_months),
        ]
    }
}

/// Underwriting metrics for one deal. Plain numbers; no rounding applied.
///
/// `dscr`, `capRate`, `cashOnCash`, `equityMultiple` and `exitValue` report
/// `0` when they cannot be computed (no debt, no cost, no equity, no exit cap).
/// `capRate` and `cashOnCash` are in percent units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealMetrics {
    pub all_in_cost: Money,
    pub monthly_rent: Money,
    pub annual_rent: Money,
    pub noi: Money,
    pub loan_amount: Money,
    pub equity_required: Money,
    pub monthly_debt_service: Money,
    pub annual_debt_service: Money,
    pub dscr: Decimal,
    pub annual_cash_flow: Money,
    pub cap_rate: Decimal,
    pub cash_on_cash: Decimal,
    pub exit_value: Money,
    pub remaining_loan_balance: Money,
    pub net_proceeds_at_exit: Money,
    pub equity_multiple: Decimal,
}

/// Deal fields resolved to numbers, percentages converted to fractions.
#[derive(Debug, Clone)]
struct ResolvedDeal {
    square_feet: Decimal,
    rent_per_sqft: Money,
    monthly_rent_override: Money,
    purchase_price: Money,
    improvements: Money,
    closing_costs: Money,
    ltv: Percent,
    interest_rate: Percent,
    loan_term_years: Years,
    debt_service_type: DebtServiceType,
    exit_cap_rate: Percent,
    holding_period_months: Months,
}

impl ResolvedDeal {
    fn from_input(input: &DealInput) -> Self {
        ResolvedDeal {
            square_feet: input.square_feet.resolve(),
            rent_per_sqft: input.monthly_base_rent_per_sqft.resolve(),
            monthly_rent_override: input.monthly_rent.resolve(),
            purchase_price: input.purchase_price.resolve(),
            improvements: input.improvements.resolve(),
            closing_costs: input.closing_costs.resolve(),
            ltv: Percent::from_percent_units(input.ltv_percent.resolve()),
            interest_rate: Percent::from_percent_units(input.interest_rate_percent.resolve()),
            loan_term_years: match input.loan_term_years.status() {
                FieldStatus::Missing => DEFAULT_LOAN_TERM_YEARS,
                FieldStatus::Valid(years) => years,
                FieldStatus::Invalid(_) => Decimal::ZERO,
            },
            debt_service_type: input.debt_service_type,
            exit_cap_rate: Percent::from_percent_units(input.exit_cap_rate_percent.resolve()),
            holding_period_months: input.holding_period_months.resolve(),
        }
    }

    fn is_financed(&self) -> bool {
        self.interest_rate.is_positive()
    }

    fn amortises(&self) -> bool {
        self.debt_service_type == DebtServiceType::Standard
            && self.loan_term_years > Decimal::ZERO
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive the underwriting metrics for a deal.
///
/// Total: missing or unparseable fields count as zero and ratios with a zero
/// denominator report `0`. When arithmetic leaves the Decimal range, the
/// metrics that depend on the failing step are reported as zero.
pub fn compute_metrics(input: &DealInput) -> DealMetrics {
    evaluate(&ResolvedDeal::from_input(input)).0
}

/// Underwrite a deal and wrap the metrics in the standard output envelope,
/// with advisory warnings for unusual or unparseable inputs.
pub fn analyze_deal(input: &DealInput) -> ComputationOutput<DealMetrics> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let deal = ResolvedDeal::from_input(input);
    let (metrics, failure) = evaluate(&deal);

    if let Some(warning) = failure {
        warnings.push(warning);
    }
    collect_warnings(input, &deal, &metrics, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;

    with_metadata(
        "NNN Acquisition Underwriting (Direct Capitalisation Exit)",
        input,
        warnings,
        elapsed,
        metrics,
    )
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Metrics plus, when some of them could not be computed, the warning that
/// explains the zeros.
fn evaluate(deal: &ResolvedDeal) -> (DealMetrics, Option<String>) {
    let operating = match operating_metrics(deal) {
        Ok(metrics) => metrics,
        Err(e) => {
            tracing::warn!(error = %e, "deal metrics not computable; reporting zeros");
            return (
                DealMetrics::default(),
                Some(format!("Metrics not computable, reporting zeros: {e}")),
            );
        }
    };

    match financed_metrics(deal, &operating) {
        Ok(metrics) => (metrics, None),
        Err(e) => {
            tracing::warn!(error = %e, "financing metrics not computable; reporting zeros");
            (
                operating,
                Some(format!(
                    "Financing, return and exit metrics not computable, reporting zeros: {e}"
                )),
            )
        }
    }
}

/// Acquisition and income metrics. These never depend on the loan.
fn operating_metrics(deal: &ResolvedDeal) -> DealResult<DealMetrics> {
    // --- Acquisition ---
    let all_in_cost = add(
        add(deal.purchase_price, deal.improvements, "all-in cost")?,
        deal.closing_costs,
        "all-in cost",
    )?;

    // --- Income (NNN: tenant pays operating expenses, NOI = gross rent) ---
    let monthly_rent = if deal.monthly_rent_override.is_zero() {
        mul(deal.square_feet, deal.rent_per_sqft, "monthly rent")?
    } else {
        deal.monthly_rent_override
    };
    let annual_rent = mul(monthly_rent, MONTHS_PER_YEAR, "annual rent")?;
    let noi = annual_rent;

    let cap_rate = mul(ratio(noi, all_in_cost, "cap rate")?, dec!(100), "cap rate")?;

    Ok(DealMetrics {
        all_in_cost,
        monthly_rent,
        annual_rent,
        noi,
        cap_rate,
        ..DealMetrics::default()
    })
}

/// Financing, return and exit metrics layered on the operating ones.
fn financed_metrics(deal: &ResolvedDeal, operating: &DealMetrics) -> DealResult<DealMetrics> {
    let all_in_cost = operating.all_in_cost;
    let noi = operating.noi;

    // --- Financing ---
    let loan_amount = mul(all_in_cost, deal.ltv.as_fraction(), "loan amount")?;
    let equity_required = sub(all_in_cost, loan_amount, "equity required")?;

    let monthly_debt_service = debt_service(deal, loan_amount)?;
    let annual_debt_service = mul(monthly_debt_service, MONTHS_PER_YEAR, "annual debt service")?;

    let monthly_noi = noi / MONTHS_PER_YEAR;
    let dscr = ratio(monthly_noi, monthly_debt_service, "dscr")?;

    // --- Returns ---
    let annual_cash_flow = sub(noi, annual_debt_service, "annual cash flow")?;
    let cash_on_cash = mul(
        ratio(annual_cash_flow, equity_required, "cash-on-cash")?,
        dec!(100),
        "cash-on-cash",
    )?;

    // --- Exit ---
    let exit_value = ratio(noi, deal.exit_cap_rate.as_fraction(), "exit value")?;
    let remaining_loan_balance = balance_at_exit(deal, loan_amount)?;
    let net_proceeds_at_exit = sub(exit_value, remaining_loan_balance, "net proceeds at exit")?;
    let equity_multiple = ratio(net_proceeds_at_exit, equity_required, "equity multiple")?;

    Ok(DealMetrics {
        loan_amount,
        equity_required,
        monthly_debt_service,
        annual_debt_service,
        dscr,
        annual_cash_flow,
        cash_on_cash,
        exit_value,
        remaining_loan_balance,
        net_proceeds_at_exit,
        equity_multiple,
        ..operating.clone()
    })
}

/// Monthly debt service; zero when there is no loan or no interest rate.
fn debt_service(deal: &ResolvedDeal, loan_amount: Money) -> DealResult<Money> {
    if loan_amount <= Decimal::ZERO || !deal.is_financed() {
        return Ok(Decimal::ZERO);
    }

    match deal.debt_service_type {
        DebtServiceType::InterestOnly => {
            let annual_interest = mul(loan_amount, deal.interest_rate.as_fraction(), "interest")?;
            Ok(annual_interest / MONTHS_PER_YEAR)
        }
        DebtServiceType::Standard if deal.amortises() => {
            monthly_payment(loan_amount, deal.interest_rate, deal.loan_term_years)
        }
        DebtServiceType::Standard => {
            tracing::warn!(
                loan_term_years = %deal.loan_term_years,
                "standard loan without a positive term; debt service reported as 0"
            );
            Ok(Decimal::ZERO)
        }
    }
}

/// Outstanding principal at the end of the holding period. Only amortising
/// loans pay down; interest-only loans carry the full amount to exit.
fn balance_at_exit(deal: &ResolvedDeal, loan_amount: Money) -> DealResult<Money> {
    let pays_down = deal.amortises()
        && deal.holding_period_months > Decimal::ZERO
        && deal.is_financed();

    if !pays_down {
        return Ok(loan_amount);
    }

    remaining_balance(
        loan_amount,
        deal.interest_rate,
        deal.loan_term_years,
        deal.holding_period_months,
    )
}

// ---------------------------------------------------------------------------
// Checked arithmetic
// ---------------------------------------------------------------------------

fn add(a: Decimal, b: Decimal, context: &str) -> DealResult<Decimal> {
    checked(a.checked_add(b), context)
}

fn sub(a: Decimal, b: Decimal, context: &str) -> DealResult<Decimal> {
    checked(a.checked_sub(b), context)
}

fn mul(a: Decimal, b: Decimal, context: &str) -> DealResult<Decimal> {
    checked(a.checked_mul(b), context)
}

/// numerator / denominator, or the `0` sentinel when the denominator is not
/// positive.
fn ratio(numerator: Decimal, denominator: Decimal, metric: &str) -> DealResult<Decimal> {
    if denominator <= Decimal::ZERO {
        tracing::debug!(metric, %denominator, "not applicable; reporting 0");
        return Ok(Decimal::ZERO);
    }
    checked(numerator.checked_div(denominator), metric)
}

// ---------------------------------------------------------------------------
// Warnings
// ---------------------------------------------------------------------------

fn collect_warnings(
    input: &DealInput,
    deal: &ResolvedDeal,
    metrics: &DealMetrics,
    warnings: &mut Vec<String>,
) {
    for (name, field) in input.numeric_fields() {
        if let FieldStatus::Invalid(raw) = field.status() {
            warnings.push(format!(
                "{name}: '{raw}' is not a number and was treated as 0"
            ));
        }
    }

    let financed = metrics.loan_amount > Decimal::ZERO && deal.is_financed();

    if financed && deal.debt_service_type == DebtServiceType::Standard && !deal.amortises() {
        warnings.push(format!(
            "Loan term of {} years cannot amortise the loan; debt service reported as 0",
            deal.loan_term_years
        ));
    }

    if metrics.dscr > Decimal::ZERO && metrics.dscr < DSCR_WARNING_THRESHOLD {
        warnings.push(format!(
            "DSCR of {:.2} is below 1.20x: lender covenant risk",
            metrics.dscr
        ));
    }

    if deal.ltv.as_percent_units() > LTV_WARNING_THRESHOLD_PCT {
        warnings.push(format!(
            "LTV of {:.1}% exceeds 80%: high leverage",
            deal.ltv.as_percent_units()
        ));
    }

    if metrics.annual_cash_flow < Decimal::ZERO {
        warnings.push(format!(
            "Annual cash flow of {:.0} is negative: debt service exceeds NOI",
            metrics.annual_cash_flow
        ));
    }

    if financed && deal.amortises() {
        if let Some(term_months) = deal.loan_term_years.checked_mul(MONTHS_PER_YEAR) {
            if deal.holding_period_months > term_months {
                warnings.push(format!(
                    "Holding period of {} months outlasts the {}-year loan term; loan fully repaid at exit",
                    deal.holding_period_months, deal.loan_term_years
                ));
            }
        }
    }

    let has_exit_cap = input.exit_cap_rate_percent.is_supplied();
    let has_holding = input.holding_period_months.is_supplied();
    if has_exit_cap && !has_holding {
        warnings.push(
            "Exit cap rate supplied without a holding period: exit assumes no amortisation".into(),
        );
    } else if has_holding && !has_exit_cap {
        warnings.push("Holding period supplied without an exit cap rate: exit value is 0".into());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
