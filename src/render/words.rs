use crate::config::Currency;
use crate::domain::Decimal;
use rust_decimal::prelude::ToPrimitive;

const ONES: [&str; 20] = [
    "Zero",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Spell out an amount rounded to two places, Indian grouping.
///
/// `1000` -> `Rupees One Thousand Only`,
/// `42.37` -> `Rupees Forty Two and Thirty Seven Paise Only`.
pub fn amount_in_words(amount: Decimal, currency: Currency) -> String {
    let (major_name, minor_name) = currency.unit_names();
    let rounded = amount.round_dp(2);
    let abs = rounded.abs();

    let major = abs.trunc().inner().to_u128().unwrap_or_default();
    let minor = (abs.fract() * Decimal::from(100))
        .inner()
        .trunc()
        .to_u128()
        .unwrap_or_default();

    let mut out = String::new();
    if rounded.is_negative() {
        out.push_str("Minus ");
    }
    out.push_str(major_name);
    out.push(' ');
    out.push_str(&integer_in_words(major));
    if minor > 0 {
        out.push_str(" and ");
        out.push_str(&integer_in_words(minor));
        out.push(' ');
        out.push_str(minor_name);
    }
    out.push_str(" Only");
    out
}

/// Spell out a whole number using crore, lakh, thousand and hundred.
pub fn integer_in_words(n: u128) -> String {
    if n == 0 {
        return ONES[0].to_string();
    }

    let mut parts: Vec<String> = Vec::new();
    let crore = n / 10_000_000;
    let mut rest = n % 10_000_000;

    if crore > 0 {
        // Amounts beyond 99 crore recurse: "One Hundred Crore".
        parts.push(format!("{} Crore", integer_in_words(crore)));
    }

    for (unit, name) in [(100_000u128, "Lakh"), (1_000, "Thousand"), (100, "Hundred")] {
        let count = rest / unit;
        rest %= unit;
        if count > 0 {
            parts.push(format!("{} {}", below_hundred(count), name));
        }
    }

    if rest > 0 {
        parts.push(below_hundred(rest));
    }

    parts.join(" ")
}

fn below_hundred(n: u128) -> String {
    debug_assert!(n < 100);
    let n = n as usize;
    if n < 20 {
        ONES[n].to_string()
    } else if n % 10 == 0 {
        TENS[n / 10].to_string()
    } else {
        format!("{} {}", TENS[n / 10], ONES[n % 10])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn whole_amounts() {
        assert_eq!(
            amount_in_words(d("1000.00"), Currency::Inr),
            "Rupees One Thousand Only"
        );
        assert_eq!(amount_in_words(d("0"), Currency::Inr), "Rupees Zero Only");
    }

    #[test]
    fn amounts_with_paise() {
        assert_eq!(
            amount_in_words(d("42.37"), Currency::Inr),
            "Rupees Forty Two and Thirty Seven Paise Only"
        );
        assert_eq!(
            amount_in_words(d("7.6271186"), Currency::Inr),
            "Rupees Seven and Sixty Three Paise Only"
        );
    }

    #[test]
    fn rounding_can_carry_into_major_units() {
        assert_eq!(
            amount_in_words(d("999.999"), Currency::Inr),
            "Rupees One Thousand Only"
        );
    }

    #[test]
    fn indian_grouping() {
        assert_eq!(
            integer_in_words(12_34_56_789),
            "Twelve Crore Thirty Four Lakh Fifty Six Thousand Seven Hundred Eighty Nine"
        );
        assert_eq!(integer_in_words(1_00_000), "One Lakh");
        assert_eq!(integer_in_words(115), "One Hundred Fifteen");
        assert_eq!(integer_in_words(250_00_00_000), "Two Hundred Fifty Crore");
    }

    #[test]
    fn negative_and_other_currency() {
        assert_eq!(
            amount_in_words(d("-50.5"), Currency::Usd),
            "Minus Dollars Fifty and Fifty Cents Only"
        );
    }
}
