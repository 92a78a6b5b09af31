//! Canonical form for phone numbers coming from dialer exports and contact
//! files.

/// Brazilian country calling code.
pub const COUNTRY_CODE: &str = "55";

/// Longest national number (area code + subscriber number) in digits.
pub const NATIONAL_MAX_LEN: usize = 10;

/// Reduces a raw phone representation to its national digits.
///
/// Every non-digit is dropped. While the digits start with the country code
/// and are longer than [`NATIONAL_MAX_LEN`], the country code is removed, so
/// short numbers that happen to begin with `55` are left alone. Returns
/// `None` when no digit remains.
///
/// Stripping repeats until the condition no longer holds, which makes the
/// function idempotent on its own output.
///
/// ```
/// use callrecon::phone::normalize_phone;
///
/// assert_eq!(normalize_phone("+55 (11) 98765-4321").as_deref(), Some("11987654321"));
/// assert_eq!(normalize_phone("5511").as_deref(), Some("5511"));
/// assert_eq!(normalize_phone("n/a"), None);
/// ```
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let mut national = digits.as_str();
    while national.starts_with(COUNTRY_CODE) && national.len() > NATIONAL_MAX_LEN {
        national = &national[COUNTRY_CODE.len()..];
    }
    if national.is_empty() {
        None
    } else {
        Some(national.to_string())
    }
}

/// Joins an area-code cell and a subscriber-number cell and normalises the
/// result. Missing parts count as empty strings.
pub fn normalize_pair(area_code: &str, number: &str) -> Option<String> {
    let mut joined = String::with_capacity(area_code.len() + number.len());
    joined.push_str(area_code.trim());
    joined.push_str(number.trim());
    normalize_phone(&joined)
}
