use crate::error::CotacaoError;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a pt-BR price token into a Decimal.
///
/// Handles formats like:
/// - "R$ 9.309,0000" -> 9309.0000
/// - "9309,0000" -> 9309.0000
/// - "6 750,0000" -> 6750.0000 (digit groups split by spaces)
/// - "" or "-" -> None
pub fn parse_price(s: &str) -> Result<Option<Decimal>, CotacaoError> {
    let s = s.trim();
    let s = s.strip_prefix("R$").unwrap_or(s).trim();

    if s.is_empty() || s == "-" || s == "—" {
        return Ok(None);
    }

    let mut digits = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ',' => digits.push('.'),
            '.' | ' ' | '\u{a0}' => {}
            _ => {
                return Err(CotacaoError::ParseError(format!(
                    "invalid price '{}': unexpected character '{}'",
                    s, c
                )))
            }
        }
    }

    Decimal::from_str(&digits)
        .map(Some)
        .map_err(|e| CotacaoError::ParseError(format!("invalid price '{}': {}", s, e)))
}

/// Format a value with a decimal comma and a fixed number of places.
pub fn format_ptbr(value: Decimal, places: u32) -> String {
    format!("{:.*}", places as usize, value.round_dp(places)).replace('.', ",")
}
