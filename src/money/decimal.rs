use super::AmountError;

/// Scale a decimal token like `"2.5"` by `10^exponent` using integer math.
///
/// Fractional digits below one won are dropped, so the result is truncated
/// rather than rounded. The token must already be free of thousands
/// separators.
pub(crate) fn scale_decimal(token: &str, exponent: u32) -> Result<u64, AmountError> {
    let (int_part, frac_part) = token.split_once('.').unwrap_or((token, ""));

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AmountError::Malformed(token.to_string()));
    }
    // A second '.' ends up in frac_part and fails here.
    if !is_digits(int_part) || !is_digits(frac_part) {
        return Err(AmountError::Malformed(token.to_string()));
    }

    let unit = 10u64.checked_pow(exponent).ok_or(AmountError::Overflow)?;

    let mut whole: u64 = 0;
    for digit in int_part.bytes().map(|b| u64::from(b - b'0')) {
        whole = whole
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or(AmountError::Overflow)?;
    }
    let whole = whole.checked_mul(unit).ok_or(AmountError::Overflow)?;

    let mut fraction: u64 = 0;
    let mut place = unit;
    for digit in frac_part.bytes().take(exponent as usize).map(|b| u64::from(b - b'0')) {
        place /= 10;
        fraction += digit * place;
    }

    whole.checked_add(fraction).ok_or(AmountError::Overflow)
}

fn is_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
