//! Parser and evaluator for a subset of the OpenStreetMap `opening_hours`
//! syntax.
//!
//! Supported: `24/7`; `;`-separated rules made of an optional weekday
//! selector (`Mo`..`Su`, ranges such as `Mo-Fr` or wrapping `Fr-Mo`, comma
//! lists) followed by comma-separated `HH:MM-HH:MM` spans or `off`/`closed`.
//! A later rule replaces earlier ones for the days it names. Spans ending at
//! or before their start run past midnight into the next day. Public and
//! school holiday selectors (`PH`, `SH`) are skipped. Anything else is
//! rejected, and callers decide how to treat the rejection.

use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::time_bucket::{BucketConvention, TimeBucket};

const MINUTES_PER_DAY: u16 = 24 * 60;
const WEEKDAYS: [&str; 7] = ["mo", "tu", "we", "th", "fr", "sa", "su"];

/// Reasons an `opening_hours` value is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpeningHoursError {
    /// Blank input.
    #[error("opening hours are empty")]
    Empty,
    /// A selector item is not a weekday or holiday token.
    #[error("unsupported day selector '{0}'")]
    UnsupportedSelector(String),
    /// A rule has a selector but no spans or `off`.
    #[error("rule '{0}' has no time spans")]
    MissingSpans(String),
    /// A span is not `HH:MM-HH:MM` with valid clock values.
    #[error("invalid time span '{0}'")]
    InvalidSpan(String),
}

/// An open interval in minutes since the start of its day.
///
/// `end` may exceed one day when the span runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: u16,
    end: u16,
}

impl Span {
    fn contains(self, minute: u16) -> bool {
        (self.start..self.end).contains(&minute)
    }

    fn spill_contains(self, minute: u16) -> bool {
        self.end > MINUTES_PER_DAY && minute < self.end - MINUTES_PER_DAY
    }

    fn overlaps(self, start: u16, end: u16) -> bool {
        let overlaps_today = self.start < end && start < self.end;
        let overlaps_tomorrow = self.end > MINUTES_PER_DAY
            && start < self.end - MINUTES_PER_DAY
            && self.start < end + MINUTES_PER_DAY;
        overlaps_today || overlaps_tomorrow
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Schedule {
    AlwaysOpen,
    /// Spans per weekday, Monday first.
    Weekly(Box<[Vec<Span>; 7]>),
}

/// A parsed opening-hours declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningHours(Schedule);

impl OpeningHours {
    /// Parse an `opening_hours` tag value.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use nearby::domain::OpeningHours;
    ///
    /// let hours = OpeningHours::parse("Mo-Fr 09:00-17:00; Sa 10:00-14:00").expect("valid");
    /// // 2024-06-03 is a Monday.
    /// let monday_noon = NaiveDate::from_ymd_opt(2024, 6, 3)
    ///     .and_then(|d| d.and_hms_opt(12, 0, 0))
    ///     .expect("valid instant");
    /// assert!(hours.is_open_at(monday_noon));
    /// ```
    pub fn parse(raw: &str) -> Result<Self, OpeningHoursError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(OpeningHoursError::Empty);
        }
        if trimmed.eq_ignore_ascii_case("24/7") {
            return Ok(Self(Schedule::AlwaysOpen));
        }

        let mut week: [Vec<Span>; 7] = Default::default();
        for rule in trimmed.split(';').map(str::trim).filter(|r| !r.is_empty()) {
            let Some((days, spans)) = parse_rule(rule)? else {
                continue;
            };
            for day in days {
                if let Some(slot) = week.get_mut(day) {
                    slot.clone_from(&spans);
                }
            }
        }
        Ok(Self(Schedule::Weekly(Box::new(week))))
    }

    /// Whether the place is open at the given local instant.
    #[must_use]
    pub fn is_open_at(&self, at: NaiveDateTime) -> bool {
        let week = match &self.0 {
            Schedule::AlwaysOpen => return true,
            Schedule::Weekly(week) => week,
        };
        let day = at.weekday().num_days_from_monday() as usize;
        let previous = (day + 6) % 7;
        let minute = clock_minutes(at.hour(), at.minute());

        week[day].iter().any(|span| span.contains(minute))
            || week[previous].iter().any(|span| span.spill_contains(minute))
    }

    /// Whether any declared span overlaps the bucket's hours on any day.
    #[must_use]
    pub fn overlaps_bucket(&self, bucket: TimeBucket, convention: BucketConvention) -> bool {
        let week = match &self.0 {
            Schedule::AlwaysOpen => return true,
            Schedule::Weekly(week) => week,
        };
        let hours = bucket.hours(convention);
        let start = clock_minutes(hours.start, 0);
        let end = clock_minutes(hours.end, 0);
        week.iter().flatten().any(|span| span.overlaps(start, end))
    }
}

impl FromStr for OpeningHours {
    type Err = OpeningHoursError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

fn clock_minutes(hour: u32, minute: u32) -> u16 {
    u16::try_from(hour * 60 + minute).unwrap_or(MINUTES_PER_DAY)
}

type Rule = (Vec<usize>, Vec<Span>);

/// Parse one rule; `None` means the rule only targets holidays.
fn parse_rule(rule: &str) -> Result<Option<Rule>, OpeningHoursError> {
    let (selector, body) = split_rule(rule);
    let days = match selector {
        None => (0..7).collect(),
        Some(selector) => match parse_selector(selector)? {
            Some(days) => days,
            None => return Ok(None),
        },
    };

    let body = body.trim();
    if body.is_empty() {
        return Err(OpeningHoursError::MissingSpans(rule.to_owned()));
    }
    if body.eq_ignore_ascii_case("off") || body.eq_ignore_ascii_case("closed") {
        return Ok(Some((days, Vec::new())));
    }

    let spans = body
        .split(',')
        .map(str::trim)
        .map(parse_span)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some((days, spans)))
}

/// Split a rule into its selector (if any) and body.
fn split_rule(rule: &str) -> (Option<&str>, &str) {
    if let Some(index) = rule.find(|c: char| c.is_ascii_digit()) {
        let (selector, body) = rule.split_at(index);
        let selector = selector.trim();
        return ((!selector.is_empty()).then_some(selector), body);
    }
    let lowered = rule.to_ascii_lowercase();
    for keyword in ["closed", "off"] {
        if lowered.ends_with(keyword) {
            let (selector, body) = rule.split_at(rule.len() - keyword.len());
            let selector = selector.trim();
            return ((!selector.is_empty()).then_some(selector), body);
        }
    }
    (Some(rule), "")
}

/// Parse a weekday selector; `None` when every item is a holiday token.
fn parse_selector(selector: &str) -> Result<Option<Vec<usize>>, OpeningHoursError> {
    let compact: String = selector.chars().filter(|c| !c.is_whitespace()).collect();
    let mut days = Vec::new();
    let mut saw_weekday = false;

    for item in compact.split(',') {
        if item.eq_ignore_ascii_case("ph") || item.eq_ignore_ascii_case("sh") {
            continue;
        }
        saw_weekday = true;
        let unsupported = || OpeningHoursError::UnsupportedSelector(item.to_owned());
        match item.split_once('-') {
            Some((from, to)) => {
                let from = weekday_index(from).ok_or_else(unsupported)?;
                let to = weekday_index(to).ok_or_else(unsupported)?;
                let mut day = from;
                loop {
                    days.push(day);
                    if day == to {
                        break;
                    }
                    day = (day + 1) % 7;
                }
            }
            None => days.push(weekday_index(item).ok_or_else(unsupported)?),
        }
    }

    if !saw_weekday {
        return Ok(None);
    }
    days.sort_unstable();
    days.dedup();
    Ok(Some(days))
}

fn weekday_index(token: &str) -> Option<usize> {
    let lowered = token.to_ascii_lowercase();
    WEEKDAYS.iter().position(|day| *day == lowered)
}

fn parse_span(raw: &str) -> Result<Span, OpeningHoursError> {
    let invalid = || OpeningHoursError::InvalidSpan(raw.to_owned());
    let (start, end) = raw.split_once('-').ok_or_else(invalid)?;
    let start = parse_clock(start.trim()).ok_or_else(invalid)?;
    let end = parse_clock(end.trim()).ok_or_else(invalid)?;
    if start >= MINUTES_PER_DAY {
        return Err(invalid());
    }
    let end = if end <= start {
        end + MINUTES_PER_DAY
    } else {
        end
    };
    Ok(Span { start, end })
}

fn parse_clock(raw: &str) -> Option<u16> {
    let (hour, minute) = raw.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
        return None;
    }
    let hour: u16 = hour.parse().ok()?;
    let minute: u16 = minute.parse().ok()?;
    if minute >= 60 || hour > 24 || (hour == 24 && minute != 0) {
        return None;
    }
    Some(hour * 60 + minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    /// 2024-06-03 is a Monday; `day` 0..7 walks Monday to Sunday.
    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 3 + day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid test instant")
    }

    #[rstest]
    #[case("24/7", at(6, 3, 0), true)]
    #[case("Mo-Fr 09:00-17:00", at(0, 9, 0), true)]
    #[case("Mo-Fr 09:00-17:00", at(0, 17, 0), false)]
    #[case("Mo-Fr 09:00-17:00", at(5, 12, 0), false)]
    #[case("Mo-Fr 08:00-12:00,14:00-18:00", at(2, 13, 0), false)]
    #[case("Mo-Fr 08:00-12:00, 14:00-18:00", at(2, 15, 30), true)]
    #[case("Fr-Mo 10:00-14:00", at(6, 11, 0), true)]
    #[case("Fr-Mo 10:00-14:00", at(1, 11, 0), false)]
    #[case("Mo, We 10:00-12:00", at(2, 11, 0), true)]
    #[case("10:00-22:00", at(4, 21, 59), true)]
    #[case("Mo-Su 18:00-24:00", at(3, 23, 59), true)]
    fn evaluates_open_state(#[case] raw: &str, #[case] instant: NaiveDateTime, #[case] open: bool) {
        let hours = OpeningHours::parse(raw).expect("valid opening hours");
        assert_eq!(hours.is_open_at(instant), open, "{raw} at {instant}");
    }

    #[rstest]
    fn overnight_spans_continue_into_the_next_day() {
        let hours = OpeningHours::parse("Fr 20:00-02:00").expect("valid");
        assert!(hours.is_open_at(at(4, 23, 0)));
        assert!(hours.is_open_at(at(5, 1, 30)));
        assert!(!hours.is_open_at(at(5, 2, 0)));
        assert!(!hours.is_open_at(at(3, 1, 0)));
    }

    #[rstest]
    fn later_rules_override_earlier_days() {
        let hours = OpeningHours::parse("Mo-Su 09:00-21:00; Su off").expect("valid");
        assert!(hours.is_open_at(at(5, 10, 0)));
        assert!(!hours.is_open_at(at(6, 10, 0)));
    }

    #[rstest]
    fn holiday_rules_are_ignored() {
        let hours = OpeningHours::parse("Mo-Fr 09:00-17:00; PH off").expect("valid");
        assert!(hours.is_open_at(at(0, 10, 0)));
        let mixed = OpeningHours::parse("Sa,PH 10:00-12:00").expect("valid");
        assert!(mixed.is_open_at(at(5, 11, 0)));
    }

    #[rstest]
    #[case("")]
    #[case("sometimes")]
    #[case("Mo-Fr")]
    #[case("Mo-Fr 9-17")]
    #[case("Mo-Fr 25:00-26:00")]
    #[case("Mo-Fr 09:60-17:00")]
    #[case("Jan-Mar 10:00-12:00")]
    #[case("Mo-Xx 10:00-12:00")]
    fn rejects_malformed_values(#[case] raw: &str) {
        assert!(
            OpeningHours::parse(raw).is_err(),
            "{raw:?} should be rejected"
        );
    }

    #[rstest]
    #[case("24/7", TimeBucket::Morning, true)]
    #[case("Mo-Fr 08:00-11:00", TimeBucket::Morning, true)]
    #[case("Mo-Fr 08:00-11:00", TimeBucket::Afternoon, false)]
    #[case("Mo-Fr 11:30-12:30", TimeBucket::Afternoon, true)]
    #[case("Sa 20:00-02:00", TimeBucket::Evening, true)]
    #[case("Sa 20:00-02:00", TimeBucket::Afternoon, false)]
    #[case("Mo 00:00-12:00; Mo off", TimeBucket::Morning, false)]
    fn detects_bucket_overlap(
        #[case] raw: &str,
        #[case] bucket: TimeBucket,
        #[case] expected: bool,
    ) {
        let hours = OpeningHours::parse(raw).expect("valid opening hours");
        assert_eq!(
            hours.overlaps_bucket(bucket, BucketConvention::Midnight),
            expected
        );
    }

    #[rstest]
    fn dawn_convention_ignores_small_hours_for_morning() {
        let hours = OpeningHours::parse("Fr 22:00-04:00").expect("valid");
        let morning = |convention| hours.overlaps_bucket(TimeBucket::Morning, convention);
        assert!(morning(BucketConvention::Midnight));
        assert!(!morning(BucketConvention::Dawn));
    }
}
