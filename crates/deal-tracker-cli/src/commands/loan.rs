use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;

use deal_tracker_core::amortization;
use deal_tracker_core::types::{with_metadata, Percent, MONTHS_PER_YEAR};

/// Arguments for the level monthly payment
#[derive(Args, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Amortisation term in years
    #[arg(long, default_value = "30")]
    pub term: Decimal,
}

/// Arguments for the outstanding balance
#[derive(Args, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Decimal,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Decimal,

    /// Amortisation term in years
    #[arg(long, default_value = "30")]
    pub term: Decimal,

    /// Number of monthly payments already made
    #[arg(long)]
    pub months: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResult {
    monthly_payment: Decimal,
    annual_debt_service: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResult {
    remaining_balance: Decimal,
    principal_repaid: Decimal,
    monthly_payment: Decimal,
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let rate = Percent::from_percent_units(args.rate);

    let monthly_payment = amortization::monthly_payment(args.principal, rate, args.term)?;
    let annual_debt_service = monthly_payment
        .checked_mul(MONTHS_PER_YEAR)
        .ok_or("annual debt service exceeds the supported range")?;
    let result = PaymentResult {
        monthly_payment,
        annual_debt_service,
    };

    let output = with_metadata(
        "Level-Payment Amortisation",
        &args,
        Vec::new(),
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_balance(args: BalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let rate = Percent::from_percent_units(args.rate);

    let monthly_payment = amortization::monthly_payment(args.principal, rate, args.term)?;
    let remaining_balance =
        amortization::remaining_balance(args.principal, rate, args.term, args.months)?;

    let mut warnings = Vec::new();
    if args.months > args.term * MONTHS_PER_YEAR {
        warnings.push(format!(
            "{} payments exceed the {}-year term; balance is fully repaid",
            args.months, args.term
        ));
    }

    let result = BalanceResult {
        remaining_balance,
        principal_repaid: args.principal - remaining_balance,
        monthly_payment,
    };

    let output = with_metadata(
        "Level-Payment Amortisation (Outstanding Balance)",
        &args,
        warnings,
        start.elapsed().as_micros() as u64,
        result,
    );
    Ok(serde_json::to_value(output)?)
}
