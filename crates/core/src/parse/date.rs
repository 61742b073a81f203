use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::ParseError;
use crate::parse::{at_digit_boundary, digit_run, skip_whitespace};

/// Inclusive stay range. A single parsed date is a one-night range with
/// `start == end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ParseError> {
        if end < start {
            return Err(ParseError::Date);
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of priced nights, one per calendar date from start to end
    /// inclusive.
    pub fn nights(&self) -> u32 {
        (self.end.signed_duration_since(self.start).num_days() + 1) as u32
    }

    pub fn iter_nights(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.nights() as usize)
    }
}

/// Characters accepted between the two dates of a range expression.
const RANGE_SEPARATORS: [char; 4] = ['-', '~', '到', '至'];
/// Characters accepted between month and day in slash-form dates.
const DATE_DELIMITERS: [char; 2] = ['/', '-'];

/// `None` means the pattern did not occur in the text; `Some(Err(_))` means it
/// occurred but named an impossible calendar date, which fails the whole parse
/// instead of falling through to a lower-priority pattern.
type MatchResult = Option<Result<DateRange, ParseError>>;

type Matcher = fn(&[char], i32) -> MatchResult;

/// Priority order: ranges are tried before single dates, and within each group
/// slash forms before written `月/日` forms.
const MATCHERS: &[Matcher] = &[
    match_slash_range,
    match_written_range,
    match_full_single,
    match_slash_single,
    match_written_single,
];

/// Extracts a check-in/check-out range from free text. Year-less forms assume
/// `current_year`; a range whose end month is numerically lower than its start
/// month rolls the end date into the following year.
pub fn parse_date_range(text: &str, current_year: i32) -> Result<DateRange, ParseError> {
    let chars: Vec<char> = text.chars().collect();

    for matcher in MATCHERS {
        if let Some(result) = matcher(&chars, current_year) {
            return result;
        }
    }

    Err(ParseError::Date)
}

fn match_slash_range(chars: &[char], current_year: i32) -> MatchResult {
    match_range(chars, current_year, slash_month_day)
}

fn match_written_range(chars: &[char], current_year: i32) -> MatchResult {
    match_range(chars, current_year, written_month_day)
}

fn match_range(
    chars: &[char],
    current_year: i32,
    month_day: fn(&[char], usize) -> Option<(u32, u32, usize)>,
) -> MatchResult {
    for pos in 0..chars.len() {
        if !at_digit_boundary(chars, pos) {
            continue;
        }
        let Some((start_month, start_day, after_start)) = month_day(chars, pos) else {
            continue;
        };

        let separator_pos = skip_whitespace(chars, after_start);
        match chars.get(separator_pos) {
            Some(separator) if RANGE_SEPARATORS.contains(separator) => {}
            _ => continue,
        }

        let second_pos = skip_whitespace(chars, separator_pos + 1);
        let Some((end_month, end_day, _)) = month_day(chars, second_pos) else {
            continue;
        };

        return Some(build_range(current_year, start_month, start_day, end_month, end_day));
    }

    None
}

fn build_range(
    current_year: i32,
    start_month: u32,
    start_day: u32,
    end_month: u32,
    end_day: u32,
) -> Result<DateRange, ParseError> {
    let start =
        NaiveDate::from_ymd_opt(current_year, start_month, start_day).ok_or(ParseError::Date)?;

    // A range like 12/30-1/2 crosses into the following calendar year.
    let end_year = if end_month < start_month { current_year + 1 } else { current_year };
    let end = NaiveDate::from_ymd_opt(end_year, end_month, end_day).ok_or(ParseError::Date)?;

    DateRange::new(start, end)
}

fn match_full_single(chars: &[char], _current_year: i32) -> MatchResult {
    for pos in 0..chars.len() {
        if !at_digit_boundary(chars, pos) {
            continue;
        }
        let Some((year, after_year)) = digit_run(chars, pos, 4) else {
            continue;
        };
        if after_year - pos != 4 {
            continue;
        }

        match chars.get(after_year) {
            Some(delimiter) if DATE_DELIMITERS.contains(delimiter) => {}
            _ => continue,
        }
        let Some((month, after_month)) = digit_run(chars, after_year + 1, 2) else {
            continue;
        };
        match chars.get(after_month) {
            Some(delimiter) if DATE_DELIMITERS.contains(delimiter) => {}
            _ => continue,
        }
        let Some((day, _)) = digit_run(chars, after_month + 1, 2) else {
            continue;
        };

        return Some(single_date(year as i32, month, day));
    }

    None
}

fn match_slash_single(chars: &[char], current_year: i32) -> MatchResult {
    for pos in 0..chars.len() {
        if !at_digit_boundary(chars, pos) {
            continue;
        }
        if let Some((month, day, _)) = slash_month_day(chars, pos) {
            return Some(single_date(current_year, month, day));
        }
    }

    None
}

fn match_written_single(chars: &[char], current_year: i32) -> MatchResult {
    for pos in 0..chars.len() {
        if !at_digit_boundary(chars, pos) {
            continue;
        }
        if let Some((month, day, _)) = written_month_day(chars, pos) {
            return Some(single_date(current_year, month, day));
        }
    }

    None
}

fn single_date(year: i32, month: u32, day: u32) -> Result<DateRange, ParseError> {
    NaiveDate::from_ymd_opt(year, month, day).map(DateRange::single).ok_or(ParseError::Date)
}

/// `M/D` or `M-D`, each component 1-2 digits.
fn slash_month_day(chars: &[char], pos: usize) -> Option<(u32, u32, usize)> {
    let (month, after_month) = digit_run(chars, pos, 2)?;
    if !DATE_DELIMITERS.contains(chars.get(after_month)?) {
        return None;
    }
    let (day, after_day) = digit_run(chars, after_month + 1, 2)?;
    Some((month, day, after_day))
}

/// `M月D日`, each component 1-2 digits.
fn written_month_day(chars: &[char], pos: usize) -> Option<(u32, u32, usize)> {
    let (month, after_month) = digit_run(chars, pos, 2)?;
    if *chars.get(after_month)? != '月' {
        return None;
    }
    let (day, after_day) = digit_run(chars, after_month + 1, 2)?;
    if *chars.get(after_day)? != '日' {
        return None;
    }
    Some((month, day, after_day + 1))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::errors::ParseError;

    use super::{parse_date_range, DateRange};

    const YEAR: i32 = 2025;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(date(start.0, start.1, start.2), date(end.0, end.1, end.2))
            .expect("valid test range")
    }

    #[test]
    fn slash_single_date_defaults_to_current_year() {
        let parsed = parse_date_range("3/20", YEAR).expect("3/20");

        assert_eq!(parsed, range((2025, 3, 20), (2025, 3, 20)));
        assert_eq!(parsed.nights(), 1);
    }

    #[test]
    fn written_single_date_parses() {
        let parsed = parse_date_range("3月20日", YEAR).expect("3月20日");
        assert_eq!(parsed, range((2025, 3, 20), (2025, 3, 20)));
    }

    #[test]
    fn full_date_carries_its_own_year() {
        assert_eq!(
            parse_date_range("2026/03/20", YEAR).expect("slash full date"),
            range((2026, 3, 20), (2026, 3, 20))
        );
        assert_eq!(
            parse_date_range("2026-3-20", YEAR).expect("dash full date"),
            range((2026, 3, 20), (2026, 3, 20))
        );
    }

    #[test]
    fn slash_range_parses_with_every_separator() {
        for text in ["3/20-3/22", "3/20~3/22", "3/20到3/22", "3/20 至 3/22"] {
            let parsed = parse_date_range(text, YEAR).expect(text);
            assert_eq!(parsed, range((2025, 3, 20), (2025, 3, 22)), "{text}");
            assert_eq!(parsed.nights(), 3, "{text}");
        }
    }

    #[test]
    fn written_range_parses() {
        let parsed = parse_date_range("3月20日-3月22日", YEAR).expect("written range");
        assert_eq!(parsed, range((2025, 3, 20), (2025, 3, 22)));
    }

    #[test]
    fn range_embedded_in_free_text_is_found() {
        let parsed = parse_date_range("想詢問 3/20-3/22 的房價", YEAR).expect("embedded range");
        assert_eq!(parsed, range((2025, 3, 20), (2025, 3, 22)));
    }

    #[test]
    fn end_month_before_start_month_rolls_into_next_year() {
        let parsed = parse_date_range("12/30-1/2", YEAR).expect("cross-year range");

        assert_eq!(parsed, range((2025, 12, 30), (2026, 1, 2)));
        assert_eq!(parsed.nights(), 4);
    }

    #[test]
    fn invalid_calendar_values_fail_instead_of_panicking() {
        assert_eq!(parse_date_range("13/45", YEAR), Err(ParseError::Date));
        assert_eq!(parse_date_range("2/30", YEAR), Err(ParseError::Date));
        assert_eq!(parse_date_range("0月9日", YEAR), Err(ParseError::Date));
    }

    #[test]
    fn matched_range_with_invalid_date_does_not_fall_through_to_single() {
        // 13/20 is no month; the textual range match must fail the parse
        // rather than let a lower-priority matcher pick 3/22 out of the text.
        assert_eq!(parse_date_range("13/20-3/22", YEAR), Err(ParseError::Date));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert_eq!(parse_date_range("3/22-3/20", YEAR), Err(ParseError::Date));
    }

    #[test]
    fn unrecognized_text_is_a_parse_failure() {
        assert_eq!(parse_date_range("下週末", YEAR), Err(ParseError::Date));
        assert_eq!(parse_date_range("", YEAR), Err(ParseError::Date));
    }

    #[test]
    fn canonical_format_reparses_to_the_same_range() {
        for text in ["3/20", "3月20日", "3/20-3/22", "12/30~1/2", "2025/03/20"] {
            let parsed = parse_date_range(text, YEAR).expect(text);
            let canonical =
                format!("{}-{}", parsed.start().format("%m/%d"), parsed.end().format("%m/%d"));
            assert_eq!(parse_date_range(&canonical, YEAR).expect(&canonical), parsed, "{text}");
        }
    }

    #[test]
    fn night_iteration_walks_every_date_inclusively() {
        let parsed = parse_date_range("3/20-3/22", YEAR).expect("range");
        let nights: Vec<_> = parsed.iter_nights().collect();

        assert_eq!(nights, vec![date(2025, 3, 20), date(2025, 3, 21), date(2025, 3, 22)]);
    }
}
