//! Payout card number handling

pub const CARD_DIGITS: usize = 16;

/// Normalizes user input into a display-grouped card number.
///
/// Everything that is not an ASCII digit is dropped; the rest must be exactly
/// 16 digits. The result is four space-separated groups of four.
///
/// # Example
///
/// ```
/// use refcore::withdrawal::card::normalize_card_number;
///
/// assert_eq!(
///     normalize_card_number("8600-1234 5678 9012").as_deref(),
///     Some("8600 1234 5678 9012")
/// );
/// assert_eq!(normalize_card_number("1234"), None);
/// ```
pub fn normalize_card_number(input: &str) -> Option<String> {
    let digits: Vec<char> = input.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != CARD_DIGITS {
        return None;
    }

    let groups: Vec<String> = digits.chunks(4).map(|group| group.iter().collect()).collect();
    Some(groups.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_sixteen_digits() {
        assert_eq!(
            normalize_card_number("8600123456789012").as_deref(),
            Some("8600 1234 5678 9012")
        );
    }

    #[test]
    fn test_whitespace_and_separators_are_stripped() {
        assert_eq!(
            normalize_card_number("  9860 1234\t5678-9012 ").as_deref(),
            Some("9860 1234 5678 9012")
        );
    }

    #[test]
    fn test_wrong_length_is_rejected() {
        assert_eq!(normalize_card_number("1234"), None);
        assert_eq!(normalize_card_number("86001234567890123"), None);
        assert_eq!(normalize_card_number("card please"), None);
        assert_eq!(normalize_card_number(""), None);
    }

    #[test]
    fn test_non_ascii_digits_do_not_count() {
        // Arabic-Indic digits are numeric but not card digits
        assert_eq!(normalize_card_number("٨٦٠٠123456789012"), None);
    }
}
