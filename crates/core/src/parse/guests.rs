use crate::errors::ParseError;
use crate::parse::{at_digit_boundary, digit_run, skip_whitespace};
use crate::pricing::GuestCount;

/// Unit words tried in priority order before falling back to a bare number.
/// A unit-qualified count anywhere in the text beats an unrelated bare number
/// appearing earlier.
const UNIT_WORDS: [&str; 3] = ["人", "位", "大人"];

/// Up to 9 digits keeps the run inside `u32` without truncating longer runs
/// into a partial match.
const MAX_DIGITS: usize = 9;

/// Extracts a validated guest count from free text. Each matcher scans the
/// whole text; an out-of-range hit falls through to the next matcher rather
/// than ending the search.
pub fn parse_guest_count(text: &str) -> Result<GuestCount, ParseError> {
    let chars: Vec<char> = text.chars().collect();

    for unit in UNIT_WORDS {
        if let Some(count) = number_before_unit(&chars, unit) {
            if let Ok(guests) = GuestCount::new(count) {
                return Ok(guests);
            }
        }
    }

    if let Some(count) = first_number(&chars) {
        if let Ok(guests) = GuestCount::new(count) {
            return Ok(guests);
        }
    }

    Err(ParseError::GuestCount)
}

fn number_before_unit(chars: &[char], unit: &str) -> Option<u32> {
    let unit_chars: Vec<char> = unit.chars().collect();

    for pos in 0..chars.len() {
        if !at_digit_boundary(chars, pos) {
            continue;
        }
        let Some((value, after)) = digit_run(chars, pos, MAX_DIGITS) else {
            continue;
        };

        let unit_pos = skip_whitespace(chars, after);
        if chars[unit_pos..].starts_with(&unit_chars[..]) {
            return Some(value);
        }
    }

    None
}

fn first_number(chars: &[char]) -> Option<u32> {
    for pos in 0..chars.len() {
        if !at_digit_boundary(chars, pos) {
            continue;
        }
        if let Some((value, _)) = digit_run(chars, pos, MAX_DIGITS) {
            return Some(value);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use crate::errors::ParseError;

    use super::parse_guest_count;

    #[test]
    fn unit_qualified_counts_parse() {
        assert_eq!(parse_guest_count("4人").expect("4人").get(), 4);
        assert_eq!(parse_guest_count("4 位").expect("4 位").get(), 4);
        assert_eq!(parse_guest_count("4大人").expect("4大人").get(), 4);
    }

    #[test]
    fn bare_number_is_the_last_resort() {
        assert_eq!(parse_guest_count("4").expect("bare number").get(), 4);
        assert_eq!(parse_guest_count("大概4個").expect("embedded bare number").get(), 4);
    }

    #[test]
    fn unit_qualified_count_beats_an_earlier_bare_number() {
        // 3000 appears first, but only 4 carries a unit word.
        assert_eq!(parse_guest_count("預算3000 一共4人").expect("qualified wins").get(), 4);
    }

    #[test]
    fn out_of_range_unit_match_falls_through_to_the_next_matcher() {
        assert_eq!(parse_guest_count("原本10人 改成6位").expect("fallthrough").get(), 6);
    }

    #[test]
    fn counts_outside_one_to_eight_are_rejected() {
        assert_eq!(parse_guest_count("0人"), Err(ParseError::GuestCount));
        assert_eq!(parse_guest_count("9人"), Err(ParseError::GuestCount));
        assert_eq!(parse_guest_count("10"), Err(ParseError::GuestCount));
    }

    #[test]
    fn numberless_text_is_a_parse_failure() {
        assert_eq!(parse_guest_count("兩個人"), Err(ParseError::GuestCount));
        assert_eq!(parse_guest_count(""), Err(ParseError::GuestCount));
    }

    #[test]
    fn full_count_range_parses() {
        for count in 1..=8u8 {
            let text = format!("{count}人");
            assert_eq!(parse_guest_count(&text).expect(&text).get(), count);
        }
    }
}
