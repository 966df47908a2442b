use crate::aggregate::to_millions;

pub const NOT_AVAILABLE: &str = "N/A";

/// Insert `,` separators into the integer part of an already formatted number.
fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix(['-', '+']) {
        Some(rest) => (&formatted[..1], rest),
        None => ("", formatted),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{grouped}{fraction}")
}

fn finite_or_na(value: f64, render: impl FnOnce(f64) -> String) -> String {
    if value.is_finite() {
        render(value)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// `12,345.68M`
pub fn millions(value: f64) -> String {
    finite_or_na(to_millions(value), |m| {
        format!("{}M", group_thousands(&format!("{m:.2}")))
    })
}

/// `+1.25M` / `-0.40M`
pub fn signed_millions(value: f64) -> String {
    finite_or_na(to_millions(value), |m| {
        format!("{}M", group_thousands(&format!("{m:+.2}")))
    })
}

pub fn percent(value: f64) -> String {
    finite_or_na(value, |v| format!("{v:.2}%"))
}

pub fn signed_percent(value: f64) -> String {
    finite_or_na(value, |v| format!("{v:+.2}%"))
}

pub fn count(value: f64) -> String {
    finite_or_na(value, |v| group_thousands(&format!("{v:.0}")))
}

pub fn signed_count(value: f64) -> String {
    finite_or_na(value, |v| group_thousands(&format!("{v:+.0}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(group_thousands("1234567.89"), "1,234,567.89");
        assert_eq!(group_thousands("-1234"), "-1,234");
        assert_eq!(group_thousands("+999"), "+999");
    }

    #[test]
    fn renders_non_finite_as_na() {
        assert_eq!(percent(f64::INFINITY), NOT_AVAILABLE);
        assert_eq!(millions(f64::NAN), NOT_AVAILABLE);
        assert_eq!(signed_count(f64::NEG_INFINITY), NOT_AVAILABLE);
    }

    #[test]
    fn renders_units() {
        assert_eq!(millions(12_345_678_901.0), "12,345.68M");
        assert_eq!(signed_millions(-1_250_000.0), "-1.25M");
        assert_eq!(signed_millions(400_000.0), "+0.40M");
        assert_eq!(signed_percent(5.5), "+5.50%");
        assert_eq!(count(1080.0), "1,080");
        assert_eq!(signed_count(80.0), "+80");
    }
}
