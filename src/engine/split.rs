use crate::domain::Decimal;
use serde::{Deserialize, Serialize};

use super::{ensure_non_negative, overflow, CalcError};

/// How the margin over cost is turned into taxable value and tax.
///
/// The two modes are not numerically equivalent; one invoice uses one mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Tax is charged on top of the service charge.
    Simple,
    /// The service charge already includes tax; back it out.
    #[default]
    ReverseInclusive,
}

impl SplitMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitMode::Simple => "simple",
            SplitMode::ReverseInclusive => "reverse_inclusive",
        }
    }
}

impl std::str::FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "simple" => Ok(SplitMode::Simple),
            "reverse_inclusive" | "inclusive" => Ok(SplitMode::ReverseInclusive),
            other => Err(format!("must be simple or reverse_inclusive, got {}", other)),
        }
    }
}

impl std::fmt::Display for SplitMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Cost and tax breakdown of one disposal. Unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FifoResult {
    pub total_cost: Decimal,
    pub service_charges: Decimal,
    pub taxable_value: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

/// Split `proceeds` over `cost` into service charge, taxable value and tax.
///
/// A negative service charge is a loss and passes through unchanged.
pub fn split(
    proceeds: Decimal,
    cost: Decimal,
    tax_rate: Decimal,
    mode: SplitMode,
) -> Result<FifoResult, CalcError> {
    ensure_non_negative("proceeds", proceeds)?;
    ensure_non_negative("cost", cost)?;
    ensure_non_negative("tax rate", tax_rate)?;

    let service_charges = proceeds
        .checked_sub(cost)
        .ok_or_else(|| overflow("service charge"))?;

    let taxable_value = match mode {
        SplitMode::Simple => service_charges,
        SplitMode::ReverseInclusive => {
            let divisor = Decimal::one()
                .checked_add(tax_rate)
                .ok_or_else(|| overflow("tax rate"))?;
            service_charges
                .checked_div(divisor)
                .ok_or_else(|| overflow("taxable value"))?
        }
    };
    let tax_amount = taxable_value
        .checked_mul(tax_rate)
        .ok_or_else(|| overflow("tax amount"))?;
    let total_amount = cost
        .checked_add(taxable_value)
        .and_then(|sum| sum.checked_add(tax_amount))
        .ok_or_else(|| overflow("total amount"))?;

    Ok(FifoResult {
        total_cost: cost,
        service_charges,
        taxable_value,
        tax_amount,
        total_amount,
    })
}

/// Cost assumed when no lot history is usable: proceeds less the default margin.
pub fn fallback_cost(proceeds: Decimal, default_margin_rate: Decimal) -> Result<Decimal, CalcError> {
    ensure_non_negative("proceeds", proceeds)?;
    if default_margin_rate.is_negative() || default_margin_rate > Decimal::one() {
        return Err(CalcError::InvalidInput(format!(
            "default margin rate must be within [0, 1], got {}",
            default_margin_rate
        )));
    }
    proceeds
        .checked_mul(Decimal::one() - default_margin_rate)
        .ok_or_else(|| overflow("fallback cost"))
}
