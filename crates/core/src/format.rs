//! Display formatting shared by markers and the CLI.

/// Group a number with comma thousands separators, keeping at most three
/// fraction digits and dropping trailing zeros.
///
/// `5000000.0` → `"5,000,000"`, `1234.5678` → `"1,234.568"`.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = round_to_thousandths(value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Three fraction digits, exact ties rounded away from zero.
fn round_to_thousandths(abs: f64) -> String {
    let scaled = (abs * 1000.0).round();
    if scaled < 1e15 {
        let scaled = scaled as u64;
        format!("{}.{:03}", scaled / 1000, scaled % 1000)
    } else {
        // no fraction digits survive at this magnitude
        format!("{:.3}", abs)
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Shortest decimal form of a price (`10.6`, `10`).
pub fn format_price(price: f64) -> String {
    price.to_string()
}
