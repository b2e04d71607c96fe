//! Conversions between human decimal strings and ERC-20 base units.

use alloy::primitives::U256;

use crate::types::{AppError, AppResult};

/// `10^decimals`, or `None` past 77 decimals where U256 overflows.
fn pow10(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

/// Parse a decimal amount (`"100"`, `"0.25"`) into base units.
pub fn parse_units(text: &str, decimals: u8) -> AppResult<U256> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Debes ingresar un monto".to_string()));
    }

    let (whole, fraction) = match text.split_once('.') {
        Some((w, f)) => (w, f),
        None => (text, ""),
    };

    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(AppError::Validation(format!("Monto inválido: {}", text)));
    }
    if fraction.len() > decimals as usize {
        return Err(AppError::Validation(format!(
            "El monto admite como máximo {} decimales",
            decimals
        )));
    }

    let overflow = || AppError::Validation(format!("Monto demasiado grande: {}", text));
    let scale = pow10(decimals).ok_or_else(|| {
        AppError::Validation(format!("Token con {} decimales no soportado", decimals))
    })?;

    let whole = if whole.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(whole, 10).map_err(|_| overflow())?
    };
    let padded = format!("{:0<width$}", fraction, width = decimals as usize);
    let fraction = if padded.is_empty() {
        U256::ZERO
    } else {
        U256::from_str_radix(&padded, 10).map_err(|_| overflow())?
    };

    whole
        .checked_mul(scale)
        .and_then(|w| w.checked_add(fraction))
        .ok_or_else(overflow)
}

/// Format base units as an exact decimal string, trailing zeros trimmed.
///
/// Unrepresentable scales show the raw amount.
pub fn format_units(value: U256, decimals: u8) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let Some(divisor) = pow10(decimals) else {
        return value.to_string();
    };
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        return whole.to_string();
    }

    let remainder_str = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    format!("{}.{}", whole, remainder_str.trim_end_matches('0'))
}

/// Format base units truncated (not rounded) to `places` fractional digits.
pub fn format_fixed(value: U256, decimals: u8, places: usize) -> String {
    let Some(divisor) = pow10(decimals) else {
        return value.to_string();
    };
    let whole = value / divisor;
    if places == 0 {
        return whole.to_string();
    }

    let remainder = value % divisor;
    let mut fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
    fraction.truncate(places);
    format!("{}.{:0<width$}", whole, fraction, width = places)
}

/// Parse a lock duration in whole seconds.
pub fn parse_duration(text: &str) -> AppResult<u64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Debes ingresar una duración".to_string()));
    }
    match text.parse::<u64>() {
        Ok(0) => Err(AppError::Validation(
            "La duración debe ser de al menos 1 segundo".to_string(),
        )),
        Ok(secs) => Ok(secs),
        Err(_) => Err(AppError::Validation(format!("Duración inválida: {}", text))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_ETHER: u128 = 1_000_000_000_000_000_000;

    #[test]
    fn test_parse_units() {
        assert_eq!(parse_units("1", 18).unwrap(), U256::from(ONE_ETHER));
        assert_eq!(parse_units("1.5", 18).unwrap(), U256::from(ONE_ETHER + ONE_ETHER / 2));
        assert_eq!(parse_units(".5", 6).unwrap(), U256::from(500_000u64));
        assert_eq!(parse_units("100000", 0).unwrap(), U256::from(100_000u64));
        assert_eq!(parse_units(" 2. ", 2).unwrap(), U256::from(200u64));
    }

    #[test]
    fn test_parse_units_rejects_bad_input() {
        assert!(parse_units("", 18).is_err());
        assert!(parse_units(".", 18).is_err());
        assert!(parse_units("-1", 18).is_err());
        assert!(parse_units("1e18", 18).is_err());
        assert!(parse_units("1.2.3", 18).is_err());
        assert!(parse_units("0.001", 2).is_err());
    }

    #[test]
    fn test_parse_units_overflow() {
        let huge = "9".repeat(80);
        assert!(matches!(parse_units(&huge, 18), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unsupported_decimals() {
        assert!(matches!(parse_units("1", 80), Err(AppError::Validation(_))));
        assert!(parse_units("1", 77).is_ok());
        assert_eq!(format_units(U256::from(123u64), 80), "123");
        assert_eq!(format_fixed(U256::from(123u64), 255, 4), "123");
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(U256::from(ONE_ETHER), 18), "1");
        assert_eq!(format_units(U256::from(ONE_ETHER + ONE_ETHER / 2), 18), "1.5");
        assert_eq!(format_units(U256::from(1_000_000_000u64), 6), "1000");
        assert_eq!(format_units(U256::from(1u64), 18), "0.000000000000000001");
        assert_eq!(format_units(U256::ZERO, 18), "0");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(U256::ZERO, 18, 4), "0.0000");
        assert_eq!(format_fixed(U256::from(ONE_ETHER / 3), 18, 4), "0.3333");
        assert_eq!(format_fixed(U256::from(25u64), 1, 4), "2.5000");
        assert_eq!(format_fixed(U256::from(ONE_ETHER * 7), 18, 0), "7");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("86400").unwrap(), 86_400);
        assert!(parse_duration("").is_err());
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("-5").is_err());
        assert!(parse_duration("1.5").is_err());
    }
}
