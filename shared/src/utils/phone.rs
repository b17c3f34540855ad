//! Phone number text utilities
//!
//! These helpers only clean up human-typed text. Country-aware
//! normalization to E.164 lives in the core phone service.

/// Characters treated as visual separators in typed phone numbers
const SEPARATORS: &[char] = &[
    '-', '\u{2010}', '\u{2011}', '\u{2012}', '\u{2013}', '\u{2014}', '\u{2015}', '\u{2212}',
    '\u{30FC}', '\u{FF0D}', '\u{FF70}', '(', ')', '\u{FF08}', '\u{FF09}', '.',
];

/// Convert full-width digits and plus sign to their ASCII forms
pub fn to_half_width(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{FF10}'..='\u{FF19}' => {
                char::from_u32(c as u32 - 0xFF10 + '0' as u32).unwrap_or(c)
            }
            '\u{FF0B}' => '+',
            other => other,
        })
        .collect()
}

/// Remove whitespace (including the ideographic space), hyphen and dash
/// variants, and parentheses
pub fn strip_formatting(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && !SEPARATORS.contains(c))
        .collect()
}

/// Half-width conversion followed by separator stripping
pub fn clean_phone_input(input: &str) -> String {
    strip_formatting(&to_half_width(input))
}

/// Mask a phone number for logs and audit rows (e.g. `+81****5678`)
pub fn mask_phone_number(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() >= 7 {
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}****{}", head, tail)
    } else {
        "****".to_string()
    }
}
