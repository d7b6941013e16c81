/// Group the integer digits of an already-formatted number: "1234567" → "1,234,567"
fn with_commas(int_part: &str) -> String {
    let mut out = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    // -0.001 rounds to zero and should not carry a sign
    let negative = val < 0.0 && cents != "0.00";

    if negative {
        format!("-${}.{dec_part}", with_commas(int_part))
    } else {
        format!("${}.{dec_part}", with_commas(int_part))
    }
}

/// Whole dollars for bar labels: $12,346
pub fn money_short(val: f64) -> String {
    let rounded = format!("{:.0}", val.abs());
    if val < 0.0 && rounded != "0" {
        format!("-${}", with_commas(&rounded))
    } else {
        format!("${}", with_commas(&rounded))
    }
}

/// One decimal place with a percent sign: 12.3%
pub fn percent(val: f64) -> String {
    format!("{val:.1}%")
}

/// Thousands-separated integer: 1,234
pub fn count(n: usize) -> String {
    with_commas(&n.to_string())
}
