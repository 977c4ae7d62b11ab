use crate::domain::{AcquisitionLot, Decimal, TimeMs};

use super::{ensure_non_negative, overflow, CalcError};

/// Portion of a single lot matched against a disposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotConsumption {
    pub acquired_at: TimeMs,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub cost: Decimal,
}

/// Outcome of walking the lots oldest-first for one disposal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FifoMatch {
    pub total_cost: Decimal,
    pub matched_quantity: Decimal,
    /// Quantity left uncovered once the lots ran out. Costed at zero.
    pub unmatched_quantity: Decimal,
    pub consumed: Vec<LotConsumption>,
}

impl FifoMatch {
    pub fn is_fully_matched(&self) -> bool {
        self.unmatched_quantity.is_zero()
    }
}

/// Total matched cost of `requested_quantity` taken oldest-first from `lots`.
///
/// `lots` must already be in ascending acquisition order.
pub fn consume(lots: &[AcquisitionLot], requested_quantity: Decimal) -> Result<Decimal, CalcError> {
    match_lots(lots, requested_quantity).map(|m| m.total_cost)
}

/// Walk `lots` in the given order, consuming quantity until the request is
/// covered. The last lot touched may be partially consumed. When the lots
/// run out the remainder is reported as unmatched and adds no cost.
pub fn match_lots(
    lots: &[AcquisitionLot],
    requested_quantity: Decimal,
) -> Result<FifoMatch, CalcError> {
    ensure_non_negative("quantity", requested_quantity)?;
    for (idx, lot) in lots.iter().enumerate() {
        if !lot.quantity.is_positive() {
            return Err(CalcError::InvalidInput(format!(
                "lot {} has non-positive quantity {}",
                idx, lot.quantity
            )));
        }
        if lot.unit_cost.is_negative() {
            return Err(CalcError::InvalidInput(format!(
                "lot {} has negative unit cost {}",
                idx, lot.unit_cost
            )));
        }
    }

    if requested_quantity.is_zero() {
        return Ok(FifoMatch::default());
    }

    let mut remaining = requested_quantity;
    let mut total_cost = Decimal::zero();
    let mut consumed = Vec::new();

    for lot in lots {
        if !remaining.is_positive() {
            break;
        }

        let take = if lot.quantity >= remaining {
            remaining
        } else {
            lot.quantity
        };
        let cost = take
            .checked_mul(lot.unit_cost)
            .ok_or_else(|| overflow("lot cost"))?;
        total_cost = total_cost
            .checked_add(cost)
            .ok_or_else(|| overflow("total cost"))?;
        // take <= remaining, both non-negative
        remaining -= take;

        tracing::debug!(
            "FIFO take qty={} @ {} from lot at {} (remaining {})",
            take,
            lot.unit_cost,
            lot.acquired_at.as_ms(),
            remaining
        );

        consumed.push(LotConsumption {
            acquired_at: lot.acquired_at,
            quantity: take,
            unit_cost: lot.unit_cost,
            cost,
        });
    }

    if remaining.is_positive() {
        tracing::warn!(
            "Insufficient lot history: matched {} of {} requested, {} costed at zero",
            requested_quantity - remaining,
            requested_quantity,
            remaining
        );
    }

    Ok(FifoMatch {
        total_cost,
        matched_quantity: requested_quantity - remaining,
        unmatched_quantity: remaining,
        consumed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn lot(qty: &str, cost: &str, at: i64) -> AcquisitionLot {
        AcquisitionLot::new(d(qty), d(cost), TimeMs::new(at))
    }

    #[test]
    fn partially_consumes_last_lot() {
        let lots = vec![lot("10", "80", 1), lot("10", "90", 2)];
        let m = match_lots(&lots, d("15")).unwrap();
        assert_eq!(m.total_cost, d("1250"));
        assert_eq!(m.matched_quantity, d("15"));
        assert!(m.is_fully_matched());
        assert_eq!(m.consumed.len(), 2);
        assert_eq!(m.consumed[1].quantity, d("5"));
        assert_eq!(m.consumed[1].cost, d("450"));
    }

    #[test]
    fn exact_lot_boundary_stops_without_touching_next_lot() {
        let lots = vec![lot("10", "80", 1), lot("10", "90", 2)];
        let m = match_lots(&lots, d("10")).unwrap();
        assert_eq!(m.total_cost, d("800"));
        assert_eq!(m.consumed.len(), 1);
    }

    #[test]
    fn insufficient_lots_leave_remainder_free() {
        let lots = vec![lot("5", "100", 1)];
        assert_eq!(consume(&lots, d("5")).unwrap(), d("500"));

        let m = match_lots(&lots, d("8")).unwrap();
        assert_eq!(m.total_cost, d("500"));
        assert_eq!(m.matched_quantity, d("5"));
        assert_eq!(m.unmatched_quantity, d("3"));
        assert!(!m.is_fully_matched());
    }

    #[test]
    fn zero_request_returns_zero() {
        let lots = vec![lot("5", "100", 1)];
        let m = match_lots(&lots, Decimal::zero()).unwrap();
        assert_eq!(m, FifoMatch::default());
    }

    #[test]
    fn empty_ledger_returns_zero() {
        assert_eq!(consume(&[], d("12")).unwrap(), Decimal::zero());
    }

    #[test]
    fn order_matters() {
        let lots = vec![lot("10", "80", 1), lot("10", "90", 2)];
        let reversed: Vec<_> = lots.iter().rev().cloned().collect();
        assert_eq!(consume(&lots, d("15")).unwrap(), d("1250"));
        assert_eq!(consume(&reversed, d("15")).unwrap(), d("1300"));
    }

    #[test]
    fn negative_request_rejected() {
        let err = consume(&[], d("-1")).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(_)));
    }

    #[test]
    fn invalid_lots_rejected_before_processing() {
        let zero_qty = vec![lot("0", "80", 1)];
        assert!(matches!(
            consume(&zero_qty, d("1")),
            Err(CalcError::InvalidInput(_))
        ));

        let negative_cost = vec![lot("1", "80", 1), lot("1", "-5", 2)];
        assert!(matches!(
            consume(&negative_cost, Decimal::zero()),
            Err(CalcError::InvalidInput(_))
        ));
    }

    #[test]
    fn cost_beyond_decimal_range_is_an_error() {
        let lots = vec![lot("100000000000000000000", "10000000000", 1)];
        let err = consume(&lots, d("100000000000000000000")).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput(ref m) if m.contains("overflows")));

        // each lot fits, the running total does not
        let lots = vec![
            lot("10000000000000000000", "5000000000", 1),
            lot("10000000000000000000", "5000000000", 2),
        ];
        assert!(matches!(
            consume(&lots, d("20000000000000000000")),
            Err(CalcError::InvalidInput(_))
        ));
    }

    #[test]
    fn fractional_quantities_keep_full_precision() {
        let lots = vec![lot("0.333", "83.17", 1), lot("2", "83.19", 2)];
        let cost = consume(&lots, d("1")).unwrap();
        // 0.333 * 83.17 + 0.667 * 83.19
        assert_eq!(cost, d("27.69561") + d("55.48773"));
    }
}
