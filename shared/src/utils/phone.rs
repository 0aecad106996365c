//! Phone number utilities

/// Strip every character that is not an ASCII digit
pub fn sanitize_digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Combine a selected country code and a typed phone number into the digit
/// string the verification API expects.
///
/// Both inputs are reduced to digits. When the number already starts with the
/// country code digits it is returned as is, otherwise the country code is
/// prepended.
///
/// # Examples
///
/// ```
/// use av_shared::phone::sanitize_phone_number;
///
/// assert_eq!(sanitize_phone_number("+1", "(012) 345-6789"), "10123456789");
/// assert_eq!(sanitize_phone_number("+1", "+1 012 345 6789"), "10123456789");
/// ```
pub fn sanitize_phone_number(country_code: &str, phone_number: &str) -> String {
    let country_digits = sanitize_digits(country_code);
    let phone_digits = sanitize_digits(phone_number);

    if phone_digits.starts_with(&country_digits) {
        phone_digits
    } else {
        country_digits + &phone_digits
    }
}

/// Mask a phone number for display and logs (e.g., 101****6789)
pub fn mask_phone_number(phone: &str) -> String {
    let digits = sanitize_digits(phone);
    if digits.len() >= 7 {
        format!("{}****{}", &digits[0..3], &digits[digits.len() - 4..])
    } else {
        "****".to_string()
    }
}
