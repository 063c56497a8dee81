//! Price, discount and rating formatting.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::text::collapse_whitespace;

static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid regex"));

/// Extracts a monetary amount from a number or a price string such as
/// `"₹1,299.00"` or `"Rs. 499"`.
#[must_use]
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .ok()
            .or_else(|| n.as_f64().and_then(Decimal::from_f64_retain)),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    }
}

/// String form of [`parse_amount`]; takes the first number in `raw`.
#[must_use]
pub fn parse_amount_str(raw: &str) -> Option<Decimal> {
    let found = AMOUNT_RE.find(raw)?;
    Decimal::from_str(&found.as_str().replace(',', "")).ok()
}

/// Formats `amount` with `currency` as a prefix. Rupee amounts use Indian
/// digit grouping (`₹1,23,456`); other currencies group by thousands.
/// Whole amounts drop the fractional part.
#[must_use]
pub fn format_price(amount: Decimal, currency: &str) -> String {
    let rounded = amount
        .abs()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let whole = rounded.trunc();
    let cents = ((rounded - whole) * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or(0);

    let digits = whole.normalize().to_string();
    let grouped = if is_rupee(currency) {
        group_indian(&digits)
    } else {
        group_thousands(&digits)
    };

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    if cents == 0 {
        format!("{sign}{currency}{grouped}")
    } else {
        format!("{sign}{currency}{grouped}.{cents:02}")
    }
}

/// Formats an arbitrary payload price value, passing through strings that
/// contain no number.
#[must_use]
pub fn format_price_value(value: &Value, currency: &str) -> Option<String> {
    match parse_amount(value) {
        Some(amount) => Some(format_price(amount, currency)),
        None => value
            .as_str()
            .map(collapse_whitespace)
            .filter(|s| !s.is_empty()),
    }
}

/// Whole-percent discount of `price` against `mrp`, when `price` is lower.
#[must_use]
pub fn discount_percent(mrp: Decimal, price: Decimal) -> Option<u32> {
    if mrp <= Decimal::ZERO || price < Decimal::ZERO || price >= mrp {
        return None;
    }
    ((mrp - price) / mrp * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .filter(|pct| *pct > 0)
}

/// Builds the discount label. A payload discount wins; bare numbers become
/// `"N% off"`. Without one, the discount is computed from `mrp` and `price`.
#[must_use]
pub fn format_discount(
    raw: Option<&Value>,
    mrp: Option<Decimal>,
    price: Option<Decimal>,
) -> Option<String> {
    let from_payload = raw.and_then(|value| match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|pct| *pct > 0.0)
            .map(|pct| format!("{}% off", trim_float(pct))),
        Value::String(s) => {
            let cleaned = collapse_whitespace(s);
            if cleaned.is_empty() {
                None
            } else if let Ok(pct) = cleaned.trim_end_matches('%').parse::<f64>() {
                (pct > 0.0).then(|| format!("{}% off", trim_float(pct)))
            } else {
                Some(cleaned)
            }
        }
        _ => None,
    });

    from_payload.or_else(|| {
        let pct = discount_percent(mrp?, price?)?;
        Some(format!("{pct}% off"))
    })
}

/// Formats a rating as `"4.3 / 5"`, with the review count when known.
#[must_use]
pub fn format_rating(value: &Value, reviews: Option<&str>) -> Option<String> {
    let score = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount_str(s)?.to_f64()?,
        _ => return None,
    };
    if score <= 0.0 {
        return None;
    }
    let base = format!("{} / 5", trim_float((score * 10.0).round() / 10.0));
    Some(match reviews.map(str::trim).filter(|r| !r.is_empty()) {
        Some(count) => format!("{base} ({count} reviews)"),
        None => base,
    })
}

fn is_rupee(currency: &str) -> bool {
    matches!(currency.trim(), "\u{20b9}" | "Rs." | "Rs" | "INR")
}

fn trim_float(value: f64) -> String {
    let s = format!("{value:.1}");
    s.strip_suffix(".0").map_or(s.clone(), str::to_owned)
}

fn group_thousands(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(char::from(*b));
    }
    out
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let head_bytes = head.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 2);
    for (i, b) in head_bytes.iter().enumerate() {
        if i > 0 && (head_bytes.len() - i) % 2 == 0 {
            out.push(',');
        }
        out.push(char::from(*b));
    }
    out.push(',');
    out.push_str(tail);
    out
}
