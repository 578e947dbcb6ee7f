//! CJK display-name validation.

use super::RegistryError;

/// Fewest ideographs a name may contain.
pub const MIN_NAME_CHARS: usize = 2;

/// Most ideographs a name may contain.
pub const MAX_NAME_CHARS: usize = 4;

/// First and last code point accepted as a name character.
const IDEOGRAPH_RANGE: std::ops::RangeInclusive<char> = '\u{4E00}'..='\u{9FA5}';

/// Returns true if `c` is an accepted CJK unified ideograph.
pub fn is_name_char(c: char) -> bool {
    IDEOGRAPH_RANGE.contains(&c)
}

/// Checks that `name` is exactly 2 to 4 CJK unified ideographs.
///
/// Pure; performs no I/O.
///
/// # Errors
///
/// - `InvalidName` for anything else, including surrounding whitespace
pub fn check_name_valid(name: &str) -> Result<(), RegistryError> {
    let mut count = 0usize;
    for c in name.chars() {
        if !is_name_char(c) {
            return Err(RegistryError::invalid_name(name));
        }
        count += 1;
    }

    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&count) {
        return Err(RegistryError::invalid_name(name));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_two_to_four_ideographs() {
        assert!(check_name_valid("爱心").is_ok());
        assert!(check_name_valid("张三丰").is_ok());
        assert!(check_name_valid("欧阳小明").is_ok());
    }

    #[test]
    fn rejects_single_ideograph() {
        assert!(matches!(
            check_name_valid("爱"),
            Err(RegistryError::InvalidName { .. })
        ));
    }

    #[test]
    fn rejects_five_ideographs() {
        assert!(check_name_valid("爱爱爱爱爱").is_err());
    }

    #[test]
    fn rejects_latin_and_mixed_input() {
        assert!(check_name_valid("ab").is_err());
        assert!(check_name_valid("张a").is_err());
        assert!(check_name_valid(" 张三").is_err());
        assert!(check_name_valid("").is_err());
    }

    #[test]
    fn rejects_ideographs_outside_accepted_block() {
        // U+3400 is CJK Extension A, U+9FA6 is past the accepted range.
        assert!(check_name_valid("\u{3400}\u{3401}").is_err());
        assert!(check_name_valid("\u{9FA6}\u{4E00}").is_err());
        assert!(check_name_valid("\u{9FA5}\u{4E00}").is_ok());
    }

    #[test]
    fn error_carries_offending_name() {
        let err = check_name_valid("ab").unwrap_err();
        assert_eq!(err, RegistryError::InvalidName { name: "ab".into() });
    }

    proptest! {
        #[test]
        fn any_ideograph_string_of_valid_length_passes(
            chars in proptest::collection::vec(0x4E00u32..=0x9FA5u32, 2..=4)
        ) {
            let name: String = chars.into_iter().filter_map(char::from_u32).collect();
            prop_assert!(check_name_valid(&name).is_ok());
        }

        #[test]
        fn any_ideograph_string_of_invalid_length_fails(
            chars in proptest::collection::vec(0x4E00u32..=0x9FA5u32, 5..12)
        ) {
            let name: String = chars.into_iter().filter_map(char::from_u32).collect();
            prop_assert!(check_name_valid(&name).is_err());
        }

        #[test]
        fn any_ascii_string_fails(name in "[ -~]{0,8}") {
            prop_assert!(check_name_valid(&name).is_err());
        }
    }
}
