//! Compact display of large spark amounts.

const UNITS: [&str; 6] = ["K", "M", "B", "T", "Qa", "Qi"];

/// Render an amount for display: `∞` for non-finite values, 2/1/0 decimals
/// below 1000, otherwise a thousands suffix with 2 decimals.
#[must_use]
pub fn format_amount(n: f64) -> String {
    if !n.is_finite() {
        return "∞".to_string();
    }
    if n < 1000.0 {
        let decimals = if n < 10.0 {
            2
        } else if n < 100.0 {
            1
        } else {
            0
        };
        return format!("{n:.decimals$}");
    }
    let mut scaled = n;
    let mut unit = 0;
    scaled /= 1000.0;
    while scaled >= 1000.0 && unit < UNITS.len() - 1 {
        scaled /= 1000.0;
        unit += 1;
    }
    format!("{scaled:.2}{}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_amounts_use_variable_precision() {
        assert_eq!(format_amount(3.14159), "3.14");
        assert_eq!(format_amount(42.26), "42.3");
        assert_eq!(format_amount(512.7), "513");
    }

    #[test]
    fn large_amounts_use_suffixes() {
        assert_eq!(format_amount(1_500.0), "1.50K");
        assert_eq!(format_amount(2_340_000.0), "2.34M");
        assert_eq!(format_amount(1e21), "1000.00Qi");
    }

    #[test]
    fn non_finite_is_infinity() {
        assert_eq!(format_amount(f64::INFINITY), "∞");
        assert_eq!(format_amount(f64::NAN), "∞");
    }
}
