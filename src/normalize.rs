//! Value cleaning: raw cell content to clean text, currency magnitudes and
//! quantities. All functions are pure.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::Cell;

fn digit_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("digit run regex"))
}

fn rupiah_amount() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\d,]+").expect("rupiah amount regex"))
}

/// Trim, drop NUL and carriage returns, turn line breaks into spaces and
/// remove remaining control characters. `nan` reads as empty.
pub fn clean_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().chars() {
        match c {
            '\n' => out.push(' '),
            '\r' | '\0' => {}
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    let out = out.trim();
    if out.eq_ignore_ascii_case("nan") {
        return String::new();
    }
    out.to_string()
}

/// Clean a decoded cell into the text stored on extracted records.
/// Text carrying the `Rp` marker is reduced to its first digit/comma group,
/// so `"Rp 75,000"` becomes `"75,000"`.
pub fn clean_cell(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Number(_) | Cell::Date(_) => cell.display_text(),
        Cell::Text(s) => {
            let cleaned = clean_text(s);
            if cleaned.contains("Rp") {
                if let Some(m) = rupiah_amount().find(&cleaned) {
                    return m.as_str().to_string();
                }
            }
            cleaned
        }
    }
}

/// Currency magnitude from localized text such as `"Rp 75,000"` or
/// `"700.000,-"`. Markers, separators and the trailing `-` sentinel are
/// stripped and the first digit run is returned; fractional digits are not
/// preserved.
pub fn clean_currency(value: &str) -> Option<f64> {
    let stripped: String = value
        .trim()
        .replace("Rp", "")
        .chars()
        .filter(|c| !matches!(c, ' ' | ',' | '-' | '.'))
        .collect();
    digit_run()
        .find(&stripped)
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

/// Quantity from text: everything but digits, `.` and `-` is dropped.
pub fn clean_numeric(value: &str) -> Option<f64> {
    let kept: String = value
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if !kept.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    kept.parse::<f64>().ok()
}

/// Nearest integer, halves to the even neighbour (2.5 -> 2, 3.5 -> 4).
fn round_half_even(n: f64) -> f64 {
    let rounded = n.round();
    if (n - n.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded - n.signum()
    } else {
        rounded
    }
}

/// Round to an integer and group thousands with commas (2304000 -> "2,304,000").
/// Halves round to even.
pub fn format_grouped(n: f64) -> String {
    let s = format!("{:.0}", round_half_even(n));
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let mut out = String::from(sign);
    let len = digits.len();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if out == "-0" {
        return "0".to_string();
    }
    out
}

/// Text safe to hand across a JSON boundary: NUL removed, line breaks
/// collapsed, non-finite numbers as empty string.
pub fn json_safe_text(cell: &Cell) -> String {
    cell.display_text()
        .replace('\0', "")
        .replace('\n', " ")
        .replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_accepts_both_grouping_styles() {
        assert_eq!(clean_currency("Rp 75,000"), Some(75000.0));
        assert_eq!(clean_currency("700.000,-"), Some(700000.0));
        assert_eq!(clean_currency("384.000,-"), Some(384000.0));
        assert_eq!(clean_currency(""), None);
        assert_eq!(clean_currency("abc"), None);
    }

    #[test]
    fn numeric_keeps_sign_and_dot() {
        assert_eq!(clean_numeric("6"), Some(6.0));
        assert_eq!(clean_numeric(" 2.5 pcs"), Some(2.5));
        assert_eq!(clean_numeric("-3"), Some(-3.0));
        assert_eq!(clean_numeric("pcs"), None);
        assert_eq!(clean_numeric("1.2.3"), None);
    }

    #[test]
    fn text_cleaning_strips_control_characters() {
        assert_eq!(clean_text("  Kamar\nVIP\r "), "Kamar VIP");
        assert_eq!(clean_text("a\0b"), "ab");
        assert_eq!(clean_text("NaN"), "");
    }

    #[test]
    fn cell_cleaning_extracts_rupiah_amount() {
        assert_eq!(clean_cell(&Cell::text("Rp 500,000")), "500,000");
        assert_eq!(clean_cell(&Cell::Number(1.0)), "1");
        assert_eq!(clean_cell(&Cell::Empty), "");
        assert_eq!(clean_cell(&Cell::Number(f64::INFINITY)), "");
    }

    #[test]
    fn grouping_thousands() {
        assert_eq!(format_grouped(2_304_000.0), "2,304,000");
        assert_eq!(format_grouped(500.0), "500");
        assert_eq!(format_grouped(1000.4), "1,000");
        assert_eq!(format_grouped(-12345.0), "-12,345");
        assert_eq!(format_grouped(0.0), "0");
    }

    #[test]
    fn grouping_rounds_halves_to_even() {
        assert_eq!(format_grouped(2.5), "2");
        assert_eq!(format_grouped(3.5), "4");
        assert_eq!(format_grouped(-2.5), "-2");
        assert_eq!(format_grouped(0.5), "0");
        assert_eq!(format_grouped(-0.5), "0");
        assert_eq!(format_grouped(1_000_000.5), "1,000,000");
        assert_eq!(format_grouped(2.6), "3");
    }

    #[test]
    fn json_safe_text_collapses_breaks() {
        assert_eq!(json_safe_text(&Cell::text("a\nb\r")), "a b");
        assert_eq!(json_safe_text(&Cell::Number(f64::NAN)), "");
    }
}
