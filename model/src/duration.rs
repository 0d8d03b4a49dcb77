use serde_yaml::Value;
use syntax::ast::DurationDef;

use crate::{Diagnostics, Error};

const SECS_PER_MIN: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

/// A normalized span of time: minutes and seconds are always < 60.
/// Hours are never rolled over into days.
///
/// Only a top-level duration may carry an `offset`; the offset itself never has one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Duration {
    hours: u64,
    minutes: u64,
    seconds: u64,
    offset: Option<Box<Duration>>,
}

impl Duration {
    /// Create a new normalized `Duration` with no offset.
    /// Totals past `u64::MAX` seconds saturate.
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        let total = hours
            .saturating_mul(SECS_PER_HOUR)
            .saturating_add(minutes.saturating_mul(SECS_PER_MIN))
            .saturating_add(seconds);
        Self::from_seconds(total)
    }

    /// Like `new`, but `None` if the total doesn't fit in a `u64` of seconds.
    pub fn checked_new(hours: u64, minutes: u64, seconds: u64) -> Option<Self> {
        let total = hours
            .checked_mul(SECS_PER_HOUR)?
            .checked_add(minutes.checked_mul(SECS_PER_MIN)?)?
            .checked_add(seconds)?;
        Some(Self::from_seconds(total))
    }

    /// Create a `Duration` from a number of seconds.
    pub fn from_seconds(total: u64) -> Self {
        Self {
            hours: total / SECS_PER_HOUR,
            minutes: (total % SECS_PER_HOUR) / SECS_PER_MIN,
            seconds: total % SECS_PER_MIN,
            offset: None,
        }
    }

    /// Attach an offset. Any offset carried by `offset` itself is dropped.
    pub fn with_offset(mut self, mut offset: Duration) -> Self {
        offset.offset = None;
        self.offset = Some(Box::new(offset));
        self
    }

    /// Build a duration from its YAML definition.
    ///
    /// Fields that aren't non-negative integers are reported to `diags`
    /// and counted as zero, as is a total too large to represent;
    /// this never fails.
    pub fn from_def(def: &DurationDef, diags: &mut Diagnostics) -> Self {
        Self::from_def_inner(def, diags, true)
    }

    fn from_def_inner(def: &DurationDef, diags: &mut Diagnostics, use_offset: bool) -> Self {
        let hours = field("hours", def.hours.as_ref(), diags);
        let minutes = field("minutes", def.minutes.as_ref(), diags);
        let seconds = field("seconds", def.seconds.as_ref(), diags);
        let duration = Self::checked_new(hours, minutes, seconds).unwrap_or_else(|| {
            diags.warn(Error::DurationOverflow(hours, minutes, seconds).to_string());
            Self::default()
        });
        match &def.offset {
            Some(offset) if use_offset => {
                duration.with_offset(Self::from_def_inner(offset, diags, false))
            }
            _ => duration,
        }
    }

    #[inline]
    pub fn hours(&self) -> u64 {
        self.hours
    }

    #[inline]
    pub fn minutes(&self) -> u64 {
        self.minutes
    }

    #[inline]
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    #[inline]
    pub fn offset(&self) -> Option<&Duration> {
        self.offset.as_deref()
    }

    /// Exact, since the fields were split off a `u64` total.
    pub fn total_seconds(&self) -> u64 {
        self.hours * SECS_PER_HOUR + self.minutes * SECS_PER_MIN + self.seconds
    }

    pub fn total_minutes(&self) -> f64 {
        self.total_seconds() as f64 / SECS_PER_MIN as f64
    }

    pub fn total_hours(&self) -> f64 {
        self.total_seconds() as f64 / SECS_PER_HOUR as f64
    }

    /// Fill a pattern like "H:M" or "H:M:S" with zero-padded values.
    /// Only the first occurrence of each letter is replaced.
    pub fn format(&self, pattern: &str) -> String {
        pattern
            .replacen('H', &format!("{:02}", self.hours), 1)
            .replacen('M', &format!("{:02}", self.minutes), 1)
            .replacen('S', &format!("{:02}", self.seconds), 1)
    }
}

fn field(name: &'static str, value: Option<&Value>, diags: &mut Diagnostics) -> u64 {
    match value {
        None | Some(Value::Null) => 0,
        Some(v) => match as_whole_number(v) {
            Some(n) => n,
            None => {
                let shown = serde_yaml::to_string(v).unwrap_or_default();
                diags.warn(Error::NonIntegerDuration(name, shown.trim().to_owned()).to_string());
                0
            }
        },
    }
}

/// A non-negative integer, also accepting integral floats like `5.0`.
fn as_whole_number(v: &Value) -> Option<u64> {
    if let Some(n) = v.as_u64() {
        return Some(n);
    }
    let f = v.as_f64()?;
    // 2^64 itself is the first float that no longer fits
    (f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64).then_some(f as u64)
}

#[cfg(test)]
mod test {
    use super::*;

    fn def(text: &str) -> DurationDef {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn test_normalization() {
        for (h, m, s) in [(0, 0, 0), (0, 59, 59), (1, 61, 3599), (2, 120, 60), (0, 0, 7322)] {
            let d = Duration::new(h, m, s);
            assert_eq!(d.total_seconds(), h * 3600 + m * 60 + s);
            assert!(d.minutes() < 60);
            assert!(d.seconds() < 60);
        }
        let d = Duration::new(0, 75, 90);
        assert_eq!((d.hours(), d.minutes(), d.seconds()), (1, 16, 30));
    }

    #[test]
    fn test_totals() {
        let d = Duration::new(1, 30, 0);
        assert_eq!(d.total_minutes(), 90.0);
        assert_eq!(d.total_hours(), 1.5);
        assert_eq!(d.total_seconds(), 5400);
    }

    #[test]
    fn test_format() {
        let d = Duration::new(1, 5, 9);
        assert_eq!(d.format("H:M"), "01:05");
        assert_eq!(d.format("H:M:S"), "01:05:09");
        // only the first of each letter is filled:
        assert_eq!(d.format("H H"), "01 H");
    }

    #[test]
    fn test_offset_does_not_recurse() {
        let mut diags = Diagnostics::default();
        let d = Duration::from_def(
            &def("{minutes: 5, offset: {minutes: 3, offset: {minutes: 1}}}"),
            &mut diags,
        );
        let offset = d.offset().expect("offset should be set");
        assert_eq!(offset.minutes(), 3);
        assert!(offset.offset().is_none());

        let nested = Duration::new(0, 1, 0).with_offset(Duration::new(0, 2, 0));
        let d = Duration::new(0, 5, 0).with_offset(nested);
        assert!(d.offset().unwrap().offset().is_none());
        assert!(diags.is_empty());
    }

    #[test]
    fn test_non_integer_fields_are_reported() {
        let mut diags = Diagnostics::default();
        let d = Duration::from_def(&def("{hours: 1, minutes: 2.5, seconds: soon}"), &mut diags);
        assert_eq!(d, Duration::new(1, 0, 0));
        assert_eq!(diags.warnings().len(), 2);
        assert!(diags.warnings()[0].contains("minutes"));
    }

    #[test]
    fn test_integral_floats_are_accepted() {
        let mut diags = Diagnostics::default();
        let d = Duration::from_def(&def("{hours: 1.0, minutes: 5.0, seconds: 0.0}"), &mut diags);
        assert_eq!(d, Duration::new(1, 5, 0));
        assert!(diags.is_empty(), "{:?}", diags.warnings());

        let d = Duration::from_def(&def("{minutes: -5.0, seconds: .inf}"), &mut diags);
        assert_eq!(d, Duration::default());
        assert_eq!(diags.warnings().len(), 2);
    }

    #[test]
    fn test_overflow_is_reported() {
        let mut diags = Diagnostics::default();
        let d = Duration::from_def(&def("{hours: 18446744073709551615, minutes: 1}"), &mut diags);
        assert_eq!(d, Duration::default());
        assert_eq!(diags.warnings().len(), 1);
        assert!(diags.warnings()[0].contains("too long"));

        // the offset is checked on its own:
        let d = Duration::from_def(
            &def("{minutes: 5, offset: {seconds: 18446744073709551615, minutes: 1}}"),
            &mut diags,
        );
        assert_eq!(d.minutes(), 5);
        assert_eq!(d.offset(), Some(&Duration::default()));
        assert_eq!(diags.warnings().len(), 2);
    }

    #[test]
    fn test_new_saturates() {
        let d = Duration::new(u64::MAX, u64::MAX, u64::MAX);
        assert_eq!(d.total_seconds(), u64::MAX);
        assert!(Duration::checked_new(u64::MAX, 0, 0).is_none());
        assert_eq!(Duration::checked_new(0, 1, 1), Some(Duration::new(0, 1, 1)));
    }
}
