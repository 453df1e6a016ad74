//! Timestamps following a time-of-day pattern.

use super::Generator;
use crate::context::{CounterKind, GenerationContext};
use crate::error::{ConfigError, GenerationError};
use crate::value::Value;
use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, Timelike, Weekday};
use rand::Rng;
use std::str::FromStr;
use tracing::warn;

const BUSINESS_START_HOUR: u32 = 9;
const BUSINESS_END_HOUR: u32 = 17;
const BUSINESS_MAX_ATTEMPTS: usize = 1000;

const PEAK_START_HOUR: u32 = 11;
const PEAK_HOURS: i64 = 4;
const PEAK_SHARE: f64 = 0.6;

/// Shape of the generated series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePattern {
    /// Evenly spaced by the interval, random once the range is exhausted
    #[default]
    Uniform,
    /// Weekdays between 09:00 and 17:00
    BusinessHours,
    /// 60% of values between 11:00 and 15:00
    DailyPeak,
}

impl FromStr for TimePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "uniform" => Ok(TimePattern::Uniform),
            "business_hours" => Ok(TimePattern::BusinessHours),
            "daily_peak" => Ok(TimePattern::DailyPeak),
            _ => Err(format!(
                "unknown pattern '{}' (expected uniform, business_hours, daily_peak)",
                s
            )),
        }
    }
}

/// Parse an interval such as `90`, `30s`, `15m`, `1h`, `1d` or `2w`.
/// A bare number is seconds.
pub fn parse_interval(s: &str) -> Option<Duration> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let n: i64 = digits.parse().ok()?;
    let factor = match unit.trim() {
        "" | "s" | "sec" | "secs" | "seconds" => 1,
        "m" | "min" | "mins" | "minutes" => 60,
        "h" | "hour" | "hours" => 3600,
        "d" | "day" | "days" => 86_400,
        "w" | "week" | "weeks" => 604_800,
        _ => return None,
    };
    let seconds = n.checked_mul(factor)?;
    if seconds <= 0 {
        return None;
    }
    Duration::try_seconds(seconds)
}

/// Timestamps within `[start, end]`.
///
/// Missing bounds resolve against the context's reference time: `end`
/// defaults to it and `start` to one year before `end`. A `start` later than
/// the reference time with no `end` gets `end = start + interval`.
#[derive(Debug, Clone)]
pub struct TimeSeriesGenerator {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    interval: Duration,
    pattern: TimePattern,
}

impl TimeSeriesGenerator {
    pub fn new(
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
        interval: Duration,
        pattern: TimePattern,
    ) -> Result<Self, ConfigError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ConfigError::InvalidValue {
                    generator: "time_series",
                    key: "end",
                    message: format!("end ({}) is before start ({})", e, s),
                });
            }
        }
        Ok(Self {
            start,
            end,
            interval,
            pattern,
        })
    }

    pub fn default_interval() -> Duration {
        Duration::hours(1)
    }

    fn bounds(&self, reference: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let end = match (self.start, self.end) {
            (_, Some(end)) => end,
            (Some(start), None) if start > reference => start
                .checked_add_signed(self.interval)
                .unwrap_or(start),
            _ => reference,
        };
        let start = self.start.unwrap_or_else(|| {
            end.checked_sub_signed(Duration::days(365))
                .unwrap_or(end)
        });
        (start.min(end), end)
    }
}

fn uniform_between<R: Rng + ?Sized>(
    rng: &mut R,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> NaiveDateTime {
    let span = (end - start).num_seconds();
    if span <= 0 {
        return start;
    }
    start
        .checked_add_signed(Duration::seconds(rng.random_range(0..=span)))
        .unwrap_or(start)
}

fn is_business_hour(ts: NaiveDateTime) -> bool {
    !matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
        && (BUSINESS_START_HOUR..BUSINESS_END_HOUR).contains(&ts.hour())
}

fn in_peak(ts: NaiveDateTime) -> bool {
    let hour = ts.hour() as i64;
    hour >= PEAK_START_HOUR as i64 && hour < PEAK_START_HOUR as i64 + PEAK_HOURS
}

impl Generator for TimeSeriesGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let (start, end) = self.bounds(ctx.reference_time());

        let ts = match self.pattern {
            TimePattern::Uniform => {
                let step = ctx.next_counter(CounterKind::TimeSeries) - 1;
                let next = self
                    .interval
                    .checked_mul(step.clamp(0, i32::MAX as i64) as i32)
                    .and_then(|offset| start.checked_add_signed(offset));
                match next {
                    Some(ts) if ts <= end => ts,
                    _ => uniform_between(ctx.rng(), start, end),
                }
            }
            TimePattern::BusinessHours => {
                let rng = ctx.rng();
                let mut candidate = uniform_between(rng, start, end);
                let mut attempts = 1;
                while !is_business_hour(candidate) && attempts < BUSINESS_MAX_ATTEMPTS {
                    candidate = uniform_between(rng, start, end);
                    attempts += 1;
                }
                if !is_business_hour(candidate) {
                    warn!(
                        table = ctx.table(),
                        column = ctx.column(),
                        "no business-hours instant found in range"
                    );
                }
                candidate
            }
            TimePattern::DailyPeak => {
                let rng = ctx.rng();
                let day = uniform_between(rng, start, end).date();
                if rng.random_bool(PEAK_SHARE) {
                    let peak_start = NaiveTime::from_hms_opt(PEAK_START_HOUR, 0, 0)
                        .map(|t| day.and_time(t))
                        .unwrap_or(start);
                    let offset = Duration::seconds(rng.random_range(0..PEAK_HOURS * 3600));
                    peak_start.checked_add_signed(offset).unwrap_or(peak_start)
                } else {
                    let candidate = uniform_between(rng, start, end);
                    if in_peak(candidate) {
                        candidate
                            .checked_add_signed(Duration::hours(PEAK_HOURS))
                            .unwrap_or(candidate)
                    } else {
                        candidate
                    }
                }
            }
        };

        Ok(Value::Timestamp(ts.clamp(start, end)))
    }

    fn name(&self) -> &str {
        "time_series"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::parse_timestamp;

    fn ts(s: &str) -> NaiveDateTime {
        parse_timestamp(s).unwrap()
    }

    fn ctx() -> GenerationContext {
        let mut ctx = GenerationContext::for_table(42, "events");
        ctx.set_position("occurred_at", 0);
        ctx
    }

    fn timestamp(v: Value) -> NaiveDateTime {
        match v {
            Value::Timestamp(t) => t,
            other => panic!("expected timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("90"), Some(Duration::seconds(90)));
        assert_eq!(parse_interval("15m"), Some(Duration::minutes(15)));
        assert_eq!(parse_interval("1h"), Some(Duration::hours(1)));
        assert_eq!(parse_interval("2d"), Some(Duration::days(2)));
        assert_eq!(parse_interval("0s"), None);
        assert_eq!(parse_interval("soon"), None);
    }

    #[test]
    fn test_parse_interval_out_of_range() {
        assert_eq!(parse_interval("99999999999999w"), None);
        assert_eq!(parse_interval("10000000000000000"), None);
        assert_eq!(parse_interval("99999999999999999999"), None);
        assert_eq!(parse_interval("1w"), Some(Duration::weeks(1)));
    }

    #[test]
    fn test_future_start_without_end() {
        let mut ctx = ctx();
        let start = ctx.reference_time() + Duration::days(30);
        let gen =
            TimeSeriesGenerator::new(Some(start), None, Duration::hours(2), TimePattern::Uniform)
                .unwrap();
        let first = timestamp(gen.generate(&mut ctx).unwrap());
        let second = timestamp(gen.generate(&mut ctx).unwrap());
        assert_eq!(first, start);
        assert_eq!(second, start + Duration::hours(2));
        for _ in 0..20 {
            let t = timestamp(gen.generate(&mut ctx).unwrap());
            assert!(t >= start && t <= start + Duration::hours(2));
        }
    }

    #[test]
    fn test_uniform_steps_then_wraps_randomly() {
        let start = ts("2024-01-01 00:00:00");
        let end = ts("2024-01-01 02:00:00");
        let gen = TimeSeriesGenerator::new(
            Some(start),
            Some(end),
            Duration::hours(1),
            TimePattern::Uniform,
        )
        .unwrap();
        let mut ctx = ctx();
        assert_eq!(timestamp(gen.generate(&mut ctx).unwrap()), start);
        assert_eq!(
            timestamp(gen.generate(&mut ctx).unwrap()),
            ts("2024-01-01 01:00:00")
        );
        assert_eq!(timestamp(gen.generate(&mut ctx).unwrap()), end);
        for _ in 0..20 {
            let t = timestamp(gen.generate(&mut ctx).unwrap());
            assert!(t >= start && t <= end);
        }
    }

    #[test]
    fn test_business_hours() {
        let gen = TimeSeriesGenerator::new(
            Some(ts("2024-03-01 00:00:00")),
            Some(ts("2024-03-31 23:59:59")),
            Duration::hours(1),
            TimePattern::BusinessHours,
        )
        .unwrap();
        let mut ctx = ctx();
        for _ in 0..200 {
            let t = timestamp(gen.generate(&mut ctx).unwrap());
            assert!(is_business_hour(t), "{} outside business hours", t);
        }
    }

    #[test]
    fn test_daily_peak_biases_midday() {
        let start = ts("2024-06-01 00:00:00");
        let end = ts("2024-06-30 23:59:59");
        let gen = TimeSeriesGenerator::new(
            Some(start),
            Some(end),
            Duration::hours(1),
            TimePattern::DailyPeak,
        )
        .unwrap();
        let mut ctx = ctx();
        let mut peak = 0;
        for _ in 0..1000 {
            let t = timestamp(gen.generate(&mut ctx).unwrap());
            assert!(t >= start && t <= end);
            if in_peak(t) {
                peak += 1;
            }
        }
        assert!((500..=700).contains(&peak), "peak share {}", peak);
    }

    #[test]
    fn test_defaults_follow_reference_time() {
        let gen =
            TimeSeriesGenerator::new(None, None, Duration::days(1), TimePattern::Uniform).unwrap();
        let mut ctx = ctx();
        let first = timestamp(gen.generate(&mut ctx).unwrap());
        assert_eq!(first, ctx.reference_time() - Duration::days(365));
    }

    #[test]
    fn test_pattern_names() {
        assert_eq!("business-hours".parse(), Ok(TimePattern::BusinessHours));
        assert_eq!("DAILY_PEAK".parse(), Ok(TimePattern::DailyPeak));
        assert!("weekly".parse::<TimePattern>().is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        assert!(TimeSeriesGenerator::new(
            Some(ts("2024-02-01")),
            Some(ts("2024-01-01")),
            Duration::hours(1),
            TimePattern::Uniform,
        )
        .is_err());
    }
}
