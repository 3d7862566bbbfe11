use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format an amount for display: thousands grouped with commas, at most two
/// fractional digits, trailing zeros dropped (`1234.5` -> `1,234.5`).
pub fn format_amount(value: f64) -> String {
    let rounded = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (rounded.as_str(), ""),
    };
    let frac_part = frac_part.trim_end_matches('0');

    // -0.001 rounds to zero, which should not print a sign
    let sign = if value < 0.0 && rounded != "0.00" { "-" } else { "" };

    let grouped = group_thousands(int_part);
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Terminal columns a string occupies (CJK characters take two)
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to a maximum display width, adding ellipsis if needed
pub fn truncate_string(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }

    let (budget, ellipsis) = if max_width <= 3 {
        (max_width, "")
    } else {
        (max_width - 3, "...")
    };

    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str(ellipsis);
    out
}

/// Pad with spaces on the right to fill `width` terminal columns.
/// `format!("{:<w$}")` counts chars, which misaligns wide characters.
pub fn pad_to_width(s: &str, width: usize) -> String {
    let pad = width.saturating_sub(display_width(s));
    format!("{}{}", s, " ".repeat(pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(3.5), "3.5");
        assert_eq!(format_amount(4.0), "4");
        assert_eq!(format_amount(999.0), "999");
        assert_eq!(format_amount(1000.0), "1,000");
        assert_eq!(format_amount(1234.5), "1,234.5");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(0.1 + 0.2), "0.3");
        assert_eq!(format_amount(2.999), "3");
    }

    #[test]
    fn test_format_amount_negative() {
        assert_eq!(format_amount(-1500.25), "-1,500.25");
        assert_eq!(format_amount(-0.001), "0");
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        // Counts terminal columns; each of these takes two
        assert_eq!(truncate_string("咖啡咖啡", 8), "咖啡咖啡");
        assert_eq!(truncate_string("咖啡咖啡咖啡", 7), "咖啡...");
        // A wide character that would overflow is dropped whole
        assert_eq!(truncate_string("咖啡咖啡咖啡", 8), "咖啡...");
        assert!(display_width(&truncate_string("早餐 breakfast", 9)) <= 9);
    }

    #[test]
    fn test_pad_to_width() {
        assert_eq!(display_width("早餐"), 4);
        assert_eq!(pad_to_width("早餐", 6), "早餐  ");
        assert_eq!(pad_to_width("Tea", 6), "Tea   ");
        assert_eq!(pad_to_width("too long", 3), "too long");

        let padded = pad_to_width(&truncate_string("早餐早餐早餐", 7), 7);
        assert_eq!(display_width(&padded), 7);
    }
}
