//! Timestamp decomposition and display helpers.
//!
//! Timestamps are split by fixed character offsets, never parsed as calendar
//! values: an offset past the end of the string contributes an empty piece,
//! so malformed input produces odd-looking output instead of an error.

/// Characters `start..end` of `s`, clamped to the string's length.
///
/// ```
/// use timeline_core::formatting::substring;
///
/// assert_eq!(substring("20200115", 4, 6), "01");
/// assert_eq!(substring("2020", 4, 6), "");
/// assert_eq!(substring("20201", 4, 6), "1");
/// ```
pub fn substring(s: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    s.chars().skip(start).take(end - start).collect()
}

/// `YYYYMMDDhhmmss` → `YYYY-MM-DD`.
///
/// ```
/// use timeline_core::formatting::format_date;
///
/// assert_eq!(format_date("20200115093000"), "2020-01-15");
/// ```
pub fn format_date(timestamp: &str) -> String {
    format!(
        "{}-{}-{}",
        substring(timestamp, 0, 4),
        substring(timestamp, 4, 6),
        substring(timestamp, 6, 8)
    )
}

/// `YYYYMMDDhhmmss` → `YYYY-MM-DD hh:mm:ss`.
///
/// ```
/// use timeline_core::formatting::format_date_time;
///
/// assert_eq!(format_date_time("20200115093005"), "2020-01-15 09:30:05");
/// assert_eq!(format_date_time("2020"), "2020-- ::");
/// ```
pub fn format_date_time(timestamp: &str) -> String {
    format!(
        "{}-{}-{} {}:{}:{}",
        substring(timestamp, 0, 4),
        substring(timestamp, 4, 6),
        substring(timestamp, 6, 8),
        substring(timestamp, 8, 10),
        substring(timestamp, 10, 12),
        substring(timestamp, 12, 14)
    )
}

/// Month aggregation key: the first six characters of a timestamp.
pub fn month_key(timestamp: &str) -> String {
    substring(timestamp, 0, 6)
}

/// `YYYYMM` → `YYYY-MM` chart label.
///
/// ```
/// use timeline_core::formatting::month_label;
///
/// assert_eq!(month_label("202003"), "2020-03");
/// ```
pub fn month_label(month_key: &str) -> String {
    format!("{}-{}", substring(month_key, 0, 4), substring(month_key, 4, 6))
}

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// ```
/// use timeline_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a relative epsilon so exact midpoints round away from zero.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` is "0.xx"; keep ".xx".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative {
        format!("-{}", result)
    } else {
        result
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places` with
/// [`round_half_up`].
///
/// Returns `0.0` if `whole` is zero.
///
/// ```
/// use timeline_core::formatting::percentage;
///
/// assert!((percentage(2.0, 3.0, 1) - 66.7).abs() < 1e-9);
/// assert_eq!(percentage(0.0, 0.0, 2), 0.0);
/// ```
pub fn percentage(part: f64, whole: f64, decimal_places: u32) -> f64 {
    if whole == 0.0 {
        return 0.0;
    }
    round_half_up((part / whole) * 100.0, decimal_places)
}

/// Round `value` to `decimal_places` by its exact decimal expansion, with
/// exact ties going away from zero.
///
/// Scaling by a power of ten first would round twice, so `0.15` (stored as
/// `0.1499999…`) must stay `0.1` while a true tie such as `6.25` becomes `6.3`.
///
/// ```
/// use timeline_core::formatting::round_half_up;
///
/// assert_eq!(round_half_up(6.25, 1), 6.3);
/// assert_eq!(round_half_up(3.0 / 2000.0 * 100.0, 1), 0.1);
/// assert_eq!(round_half_up(-0.05, 1), -0.1);
/// ```
pub fn round_half_up(value: f64, decimal_places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let places = decimal_places as usize;

    // Every finite f64 has at most 1074 fractional decimal digits.
    let exact = format!("{:.1074}", value.abs());
    let Some((int_part, frac)) = exact.split_once('.') else {
        return value;
    };

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac.bytes().chain(std::iter::repeat(b'0')).take(places))
        .collect();

    if frac.as_bytes().get(places).is_some_and(|&d| d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, b'1');
                break;
            }
            i -= 1;
            if digits[i] == b'9' {
                digits[i] = b'0';
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let split = digits.len() - places;
    let mut text = String::with_capacity(digits.len() + 2);
    if value.is_sign_negative() {
        text.push('-');
    }
    text.extend(digits[..split].iter().map(|&b| b as char));
    if places > 0 {
        text.push('.');
        text.extend(digits[split..].iter().map(|&b| b as char));
    }
    text.parse().unwrap_or(value)
}

/// Render a text progress bar such as `[█████░░░░░]  50%`.
///
/// `percentage` is clamped to `[0, 100]`.
pub fn render_progress_bar(percentage: f64, width: usize) -> String {
    let pct = percentage.clamp(0.0, 100.0);
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {:>3.0}%",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(width - filled),
        pct
    )
}

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── substring ────────────────────────────────────────────────────────────

    #[test]
    fn test_substring_within_bounds() {
        assert_eq!(substring("20200115093005", 8, 10), "09");
    }

    #[test]
    fn test_substring_past_end_is_empty() {
        assert_eq!(substring("2020", 10, 12), "");
    }

    #[test]
    fn test_substring_inverted_range_is_empty() {
        assert_eq!(substring("20200115", 6, 4), "");
    }

    #[test]
    fn test_substring_multibyte_does_not_panic() {
        assert_eq!(substring("2020é1", 4, 6), "é1");
    }

    // ── format_date / format_date_time ───────────────────────────────────────

    #[test]
    fn test_format_date_truncates_time() {
        assert_eq!(format_date("20201231235959"), "2020-12-31");
    }

    #[test]
    fn test_format_date_time_full() {
        assert_eq!(format_date_time("20200101000000"), "2020-01-01 00:00:00");
    }

    #[test]
    fn test_format_date_time_short_input_is_garbled_not_fatal() {
        assert_eq!(format_date_time("202001"), "2020-01- ::");
        assert_eq!(format_date_time(""), "-- ::");
    }

    #[test]
    fn test_format_date_time_ignores_extra_characters() {
        assert_eq!(
            format_date_time("20200101000000999"),
            "2020-01-01 00:00:00"
        );
    }

    // ── month_key / month_label ──────────────────────────────────────────────

    #[test]
    fn test_month_key_takes_six_characters() {
        assert_eq!(month_key("20200115000000"), "202001");
    }

    #[test]
    fn test_month_key_short_timestamp() {
        assert_eq!(month_key("2020"), "2020");
    }

    #[test]
    fn test_month_label() {
        assert_eq!(month_label("202112"), "2021-12");
    }

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_with_thousands() {
        assert_eq!(format_number(1_234.5, 1), "1,234.5");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_exact_thousands() {
        assert_eq!(format_number(1_000.0, 0), "1,000");
    }

    // ── percentage ───────────────────────────────────────────────────────────

    #[test]
    fn test_percentage_two_thirds_rounds_to_one_decimal() {
        let p = percentage(2.0, 3.0, 1);
        assert!((p - 66.7).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(10.0, 0.0, 2), 0.0);
    }

    #[test]
    fn test_percentage_full() {
        let p = percentage(7.0, 7.0, 1);
        assert!((p - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentage_one_of_eight() {
        let p = percentage(1.0, 8.0, 1);
        assert!((p - 12.5).abs() < 1e-9, "percentage = {p}");
    }

    #[test]
    fn test_percentage_rounds_by_exact_value() {
        // 3 / 2000 * 100 is stored just below 0.15.
        assert_eq!(format!("{:.1}", percentage(3.0, 2000.0, 1)), "0.1");
        assert_eq!(format!("{:.1}", percentage(9.0, 2000.0, 1)), "0.4");
        assert_eq!(format!("{:.1}", percentage(19.0, 2000.0, 1)), "0.9");
    }

    #[test]
    fn test_percentage_exact_tie_rounds_up() {
        // 1 / 16 * 100 is exactly 6.25.
        assert_eq!(percentage(1.0, 16.0, 1), 6.3);
    }

    #[test]
    fn test_round_half_up_carries() {
        assert_eq!(round_half_up(9.96, 1), 10.0);
        assert_eq!(round_half_up(99.95, 0), 100.0);
        assert_eq!(round_half_up(0.0, 2), 0.0);
        assert_eq!(round_half_up(2.5, 0), 3.0);
    }

    // ── render_progress_bar ──────────────────────────────────────────────────

    #[test]
    fn test_progress_bar_half() {
        let bar = render_progress_bar(50.0, 10);
        assert_eq!(bar, "[█████░░░░░]  50%");
    }

    #[test]
    fn test_progress_bar_clamps() {
        assert_eq!(render_progress_bar(150.0, 4), "[████] 100%");
        assert_eq!(render_progress_bar(-5.0, 4), "[░░░░]   0%");
    }
}
