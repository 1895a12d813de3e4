use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::{checked, DealError};
use crate::types::{Money, Months, Percent, Years, MONTHS_PER_YEAR};
use crate::DealResult;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Level monthly payment on a fixed-rate, fully amortising loan:
/// P * r / (1 - (1+r)^-n), with r the monthly rate and n = term * 12.
///
/// A zero rate amortises straight-line (P / n). `term_years` must be positive.
pub fn monthly_payment(
    principal: Money,
    annual_rate: Percent,
    term_years: Years,
) -> DealResult<Money> {
    let total_months = payment_count(term_years)?;
    let monthly_rate = annual_rate.monthly_fraction();

    if monthly_rate.is_zero() {
        return checked(
            principal.checked_div(total_months),
            "straight-line payment",
        );
    }

    let denominator = annuity_denominator(monthly_rate, total_months)?;
    let interest = checked(principal.checked_mul(monthly_rate), "mortgage payment interest")?;

    checked(interest.checked_div(denominator), "mortgage payment")
}

/// Outstanding principal after `months_paid` level payments.
///
/// P * (1 - (1+r)^-(n-m)) / (1 - (1+r)^-n), floored at zero. Paying past the
/// end of the term leaves a zero balance.
pub fn remaining_balance(
    principal: Money,
    annual_rate: Percent,
    term_years: Years,
    months_paid: Months,
) -> DealResult<Money> {
    if months_paid < Decimal::ZERO {
        return Err(DealError::InvalidInput {
            field: "months_paid".into(),
            reason: "Months paid cannot be negative".into(),
        });
    }

    let total_months = payment_count(term_years)?;
    if months_paid >= total_months {
        return Ok(Decimal::ZERO);
    }
    if months_paid.is_zero() {
        return Ok(principal.max(Decimal::ZERO));
    }

    let monthly_rate = annual_rate.monthly_fraction();

    let balance = if monthly_rate.is_zero() {
        let per_month = checked(
            principal.checked_div(total_months),
            "straight-line payment",
        )?;
        let repaid = checked(per_month.checked_mul(months_paid), "straight-line repayment")?;
        checked(principal.checked_sub(repaid), "remaining balance")?
    } else {
        let months_left = total_months - months_paid;
        let outstanding_share = annuity_denominator(monthly_rate, months_left)?;
        let full_share = annuity_denominator(monthly_rate, total_months)?;
        checked(
            principal
                .checked_mul(outstanding_share)
                .and_then(|v| v.checked_div(full_share)),
            "remaining balance",
        )?
    };

    Ok(balance.max(Decimal::ZERO))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Number of monthly payments over the term. The term must be positive.
fn payment_count(term_years: Years) -> DealResult<Months> {
    if term_years <= Decimal::ZERO {
        return Err(DealError::InvalidInput {
            field: "term_years".into(),
            reason: "Loan term must be greater than zero".into(),
        });
    }

    checked(term_years.checked_mul(MONTHS_PER_YEAR), "payment count")
}

/// 1 - (1+r)^-n, built from the discount factor 1/(1+r) so that high rates
/// shrink the power toward zero instead of overflowing. Integral n is exact to
/// 28 digits; fractional n goes through exp/ln.
fn annuity_denominator(monthly_rate: Decimal, periods: Months) -> DealResult<Decimal> {
    let discount = Decimal::ONE
        .checked_div(Decimal::ONE + monthly_rate)
        .ok_or_else(|| DealError::DivisionByZero {
            context: "discount factor".into(),
        })?;
    // For 0 < discount < 1 and positive periods the power lies in (0, 1), so a
    // failed power is an intermediate overflow in exp/ln and the true value is
    // below Decimal precision.
    let discounted = if discount > Decimal::ZERO && discount < Decimal::ONE {
        discount.checked_powd(periods).unwrap_or(Decimal::ZERO)
    } else {
        checked(discount.checked_powd(periods), "discount factor")?
    };
    let denominator = Decimal::ONE - discounted;

    if denominator.is_zero() {
        return Err(DealError::DivisionByZero {
            context: "mortgage payment denominator".into(),
        });
    }

    Ok(denominator)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pct(units: Decimal) -> Percent {
        Percent::from_percent_units(units)
    }

    // --- Monthly payment ---

    #[test]
    fn test_monthly_payment_sanity() {
        // $750k at 6.5% over 30 years, expected ~$4,740.51/mo
        let payment = monthly_payment(dec!(750000), pct(dec!(6.5)), dec!(30)).unwrap();
        assert!(
            (payment - dec!(4740.51)).abs() < dec!(0.01),
            "Monthly payment {payment} outside expected range"
        );
    }

    #[test]
    fn test_monthly_payment_acquisition_loan() {
        // $7M at 6% over 30 years
        let payment = monthly_payment(dec!(7000000), pct(dec!(6)), dec!(30)).unwrap();
        assert!(
            (payment - dec!(41968.5368)).abs() < dec!(0.0001),
            "Expected ~41,968.54, got {payment}"
        );
    }

    #[test]
    fn test_zero_rate_mortgage() {
        let payment = monthly_payment(dec!(360000), Percent::ZERO, dec!(30)).unwrap();
        // $360k / 360 months = $1000/mo
        assert_eq!(payment, dec!(1000));
    }

    #[test]
    fn test_zero_rate_is_exact_division() {
        let principal = dec!(1000000);
        let payment = monthly_payment(principal, Percent::ZERO, dec!(7)).unwrap();
        assert_eq!(payment, principal / (dec!(7) * dec!(12)));
    }

    #[test]
    fn test_zero_principal() {
        let payment = monthly_payment(Decimal::ZERO, pct(dec!(6)), dec!(30)).unwrap();
        assert_eq!(payment, Decimal::ZERO);
    }

    #[test]
    fn test_fractional_term() {
        // 2.5 years = 30 payments
        let fractional = monthly_payment(dec!(300000), pct(dec!(5)), dec!(2.5)).unwrap();
        let whole = monthly_payment(dec!(300000), pct(dec!(5)), dec!(30) / dec!(12)).unwrap();
        assert_eq!(fractional, whole);
        assert!(fractional > dec!(10000) && fractional < dec!(10700));
    }

    #[test]
    fn test_zero_term_error() {
        let result = monthly_payment(dec!(100000), pct(dec!(6)), Decimal::ZERO);
        assert!(matches!(
            result,
            Err(DealError::InvalidInput { ref field, .. }) if field == "term_years"
        ));
    }

    #[test]
    fn test_negative_term_error() {
        assert!(monthly_payment(dec!(100000), Percent::ZERO, dec!(-5)).is_err());
    }

    #[test]
    fn test_very_high_rate_stays_finite() {
        // At 200% the discount factor vanishes and the payment tends to P * r
        let payment = monthly_payment(dec!(1000000), pct(dec!(200)), dec!(30)).unwrap();
        assert!((payment - dec!(166666.6667)).abs() < dec!(0.0001), "got {payment}");

        let payment = monthly_payment(dec!(1000000), pct(dec!(300)), dec!(30)).unwrap();
        assert!((payment - dec!(250000)).abs() < dec!(0.0001), "got {payment}");
    }

    #[test]
    fn test_high_rate_fractional_term_stays_finite() {
        // 30.55 years = 366.6 payments, taken through exp/ln
        let payment = monthly_payment(dec!(1000000), pct(dec!(300)), dec!(30.55)).unwrap();
        assert!((payment - dec!(250000)).abs() < dec!(0.0001), "got {payment}");
    }

    #[test]
    fn test_absurd_rate_does_not_overflow() {
        let payment = monthly_payment(dec!(1000000), pct(dec!(100000)), dec!(30)).unwrap();
        assert!(payment > Decimal::ZERO);
    }

    // --- Remaining balance ---

    #[test]
    fn test_balance_before_any_payment() {
        let balance = remaining_balance(dec!(7000000), pct(dec!(6)), dec!(30), Decimal::ZERO).unwrap();
        assert_eq!(balance, dec!(7000000));
    }

    #[test]
    fn test_balance_after_five_years() {
        // $7M at 6% / 30y after 60 payments ~ $6,513,804.98
        let balance = remaining_balance(dec!(7000000), pct(dec!(6)), dec!(30), dec!(60)).unwrap();
        assert!(
            (balance - dec!(6513804.9776)).abs() < dec!(0.001),
            "Expected ~6,513,804.98, got {balance}"
        );
    }

    #[test]
    fn test_balance_ten_year_loan_midpoint() {
        // $1M at 5% / 10y after 60 payments ~ $562,048.66
        let balance = remaining_balance(dec!(1000000), pct(dec!(5)), dec!(10), dec!(60)).unwrap();
        assert!((balance - dec!(562048.6569)).abs() < dec!(0.001));
    }

    #[test]
    fn test_balance_at_maturity_is_zero() {
        let balance = remaining_balance(dec!(7000000), pct(dec!(6)), dec!(30), dec!(360)).unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn test_balance_one_payment_before_maturity() {
        let payment = monthly_payment(dec!(500000), pct(dec!(4)), dec!(15)).unwrap();
        let balance = remaining_balance(dec!(500000), pct(dec!(4)), dec!(15), dec!(179)).unwrap();
        // Last payment covers the balance plus one month of interest
        let expected = payment / (Decimal::ONE + dec!(0.04) / dec!(12));
        assert!((balance - expected).abs() < dec!(0.0001));
    }

    #[test]
    fn test_over_amortisation_saturates_at_zero() {
        let balance = remaining_balance(dec!(7000000), pct(dec!(6)), dec!(30), dec!(100000)).unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn test_zero_rate_straight_line_balance() {
        let balance = remaining_balance(dec!(360000), Percent::ZERO, dec!(30), dec!(60)).unwrap();
        assert_eq!(balance, dec!(300000));
    }

    #[test]
    fn test_zero_rate_balance_past_term() {
        let balance = remaining_balance(dec!(360000), Percent::ZERO, dec!(30), dec!(400)).unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn test_balance_declines_over_time() {
        let p = dec!(2500000);
        let rate = pct(dec!(7.25));
        let mut previous = p;
        for months in [12, 24, 60, 120, 240, 300, 359] {
            let balance = remaining_balance(p, rate, dec!(25), Decimal::from(months)).unwrap();
            assert!(balance <= previous, "balance rose at month {months}");
            previous = balance;
        }
    }

    #[test]
    fn test_negative_months_error() {
        let result = remaining_balance(dec!(100000), pct(dec!(6)), dec!(30), dec!(-1));
        assert!(matches!(
            result,
            Err(DealError::InvalidInput { ref field, .. }) if field == "months_paid"
        ));
    }

    #[test]
    fn test_balance_at_very_high_rate_is_nearly_the_principal() {
        // Early payments are almost all interest at 200%
        let balance = remaining_balance(dec!(7000000), pct(dec!(200)), dec!(30), dec!(60)).unwrap();
        assert!(balance <= dec!(7000000));
        assert!((balance - dec!(7000000)).abs() < dec!(0.01), "got {balance}");
    }

    #[test]
    fn test_balance_zero_term_error() {
        assert!(remaining_balance(dec!(100000), pct(dec!(6)), Decimal::ZERO, dec!(12)).is_err());
    }
}
