//! Join-key derivation for both exports.
//!
//! The two document types print the same student number with different
//! trailing conventions: roster ids carry a decimal separator, answer cards
//! append a check digit and left-pad with zeros.

/// Roster side: drop every `.` separator.
pub fn roster_key(raw: &str) -> String {
    raw.replace('.', "").trim().to_string()
}

/// Answer side: drop the trailing check digit, then the zero padding.
pub fn answer_key(raw: &str) -> String {
    let mut chars = raw.trim().chars();
    chars.next_back();
    chars.as_str().trim_start_matches('0').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roster_strips_separator_only() {
        assert_eq!(roster_key("1234.5"), "12345");
        assert_eq!(roster_key("0012.3"), "00123");
        assert_eq!(roster_key("1.234.5"), "12345");
    }

    #[test]
    fn answer_drops_check_digit_then_zeros() {
        assert_eq!(answer_key("0001234X"), "1234");
        assert_eq!(answer_key("00012345"), "1234");
        assert_eq!(answer_key("123450"), "12345");
    }

    #[test]
    fn answer_degenerate_ids() {
        assert_eq!(answer_key("7"), "");
        assert_eq!(answer_key(""), "");
        assert_eq!(answer_key("00000"), "");
    }

    #[test]
    fn sides_meet_in_same_key_space() {
        // card 00123459 is roster 1234.5 plus check digit 9
        assert_eq!(roster_key("1234.5"), answer_key("00123459"));
    }
}
