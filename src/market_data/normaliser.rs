// Convert bookTicker wire messages into `Quote`s.
// Only plain non-negative decimals are accepted ("25.3519", "40", ".5");
// exponents, signs, NaN and infinities are rejected as malformed.

use crate::engine::types::{MalformedQuoteError, Quote};
use crate::market_data::adapters::binance_types::{WsBookTicker, WsCombined};

pub fn normalize(raw: &str) -> Result<Quote, MalformedQuoteError> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(invalid_json)?;

    // accept both the single-stream payload and the combined-stream wrapper
    let ticker: WsBookTicker = if value.get("stream").is_some() && value.get("data").is_some() {
        serde_json::from_value::<WsCombined>(value)
            .map_err(invalid_json)?
            .data
    } else {
        serde_json::from_value(value).map_err(invalid_json)?
    };

    normalize_ticker(&ticker)
}

fn invalid_json(e: serde_json::Error) -> MalformedQuoteError {
    MalformedQuoteError::InvalidJson(e.to_string())
}

pub fn normalize_ticker(ticker: &WsBookTicker) -> Result<Quote, MalformedQuoteError> {
    Ok(Quote {
        bid_price: required_decimal("b", ticker.bid_price.as_deref())?,
        bid_qty: required_decimal("B", ticker.bid_qty.as_deref())?,
        ask_price: required_decimal("a", ticker.ask_price.as_deref())?,
        ask_qty: required_decimal("A", ticker.ask_qty.as_deref())?,
    })
}

fn required_decimal(field: &'static str, value: Option<&str>) -> Result<f64, MalformedQuoteError> {
    let s = value.ok_or(MalformedQuoteError::MissingField(field))?;
    parse_decimal(field, s)
}

pub fn parse_decimal(field: &'static str, s: &str) -> Result<f64, MalformedQuoteError> {
    let not_decimal = || MalformedQuoteError::NotDecimal {
        field,
        value: s.to_string(),
    };

    let s_trimmed = s.trim();
    let mut digits = 0;
    let mut dots = 0;
    for c in s_trimmed.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return Err(not_decimal()),
        }
    }
    if digits == 0 || dots > 1 {
        return Err(not_decimal());
    }

    let parsed: f64 = s_trimmed.parse().map_err(|_| not_decimal())?;
    if !parsed.is_finite() {
        return Err(not_decimal());
    }
    Ok(parsed)
}
