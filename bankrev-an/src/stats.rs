//! Sentiment counting, period bucketing and date labels for the dashboard

use bankrev_common::Sentiment;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

const MONTH_LABELS: [&str; 12] = [
    "Янв", "Фев", "Мар", "Апр", "Май", "Июн", "Июл", "Авг", "Сен", "Окт", "Ноя", "Дек",
];

/// Link counts per sentiment
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SentimentCounts {
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

impl SentimentCounts {
    /// Add `count` links labelled `sentiment` (case-insensitive); other
    /// labels are ignored
    pub fn add(&mut self, sentiment: &str, count: i64) {
        match sentiment.to_lowercase().parse::<Sentiment>() {
            Ok(Sentiment::Positive) => self.positive += count,
            Ok(Sentiment::Neutral) => self.neutral += count,
            Ok(Sentiment::Negative) => self.negative += count,
            Err(_) => {}
        }
    }

    pub fn get(&self, sentiment: Sentiment) -> i64 {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    pub fn total(&self) -> i64 {
        self.positive + self.neutral + self.negative
    }

    /// Share of `sentiment` in percent; 0 when there are no links
    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.get(sentiment) as f64 / total as f64 * 100.0
        }
    }
}

/// Round half to even, as the dashboard front end expects
pub fn round_percent(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Time bucket size of trend and dynamics queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
}

impl Granularity {
    /// `day` and `week` are recognised; anything else means month
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("day") => Granularity::Day,
            Some("week") => Granularity::Week,
            _ => Granularity::Month,
        }
    }

    /// First day of the period containing `date` (weeks start on Monday)
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Granularity::Month => month_start(date),
        }
    }

    /// Category label of the period starting at `period_start`
    pub fn label(&self, period_start: NaiveDate) -> String {
        match self {
            Granularity::Day => period_start.format("%d.%m.%Y").to_string(),
            Granularity::Week => format!(
                "W{} {}",
                period_start.iso_week().week(),
                period_start.year()
            ),
            Granularity::Month => format!(
                "{} {}",
                MONTH_LABELS[period_start.month0() as usize],
                period_start.year()
            ),
        }
    }

    /// Intervals compared for KPI trends, as inclusive `(start, end)` pairs:
    /// the period containing `end` up to `end`, and the full period before it
    pub fn trend_intervals(
        &self,
        end: NaiveDate,
    ) -> ((NaiveDate, NaiveDate), (NaiveDate, NaiveDate)) {
        let last_start = self.period_start(end);
        let previous_end = match self {
            Granularity::Day => end - Duration::days(1),
            Granularity::Week | Granularity::Month => last_start - Duration::days(1),
        };
        let previous_start = self.period_start(previous_end);
        ((last_start, end), (previous_start, previous_end))
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_counts_are_case_insensitive() {
        let mut counts = SentimentCounts::default();
        counts.add("positive", 2);
        counts.add("Positive", 1);
        counts.add("NEGATIVE", 4);
        counts.add("mixed", 10);
        assert_eq!(
            counts,
            SentimentCounts {
                positive: 3,
                neutral: 0,
                negative: 4
            }
        );
        assert_eq!(counts.total(), 7);
    }

    #[test]
    fn test_percent_of_empty_counts_is_zero() {
        assert_eq!(SentimentCounts::default().percent(Sentiment::Positive), 0.0);
    }

    #[test]
    fn test_round_half_to_even() {
        assert_eq!(round_percent(12.5), 12);
        assert_eq!(round_percent(13.5), 14);
        assert_eq!(round_percent(-0.5), 0);
        assert_eq!(round_percent(66.666), 67);
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!(Granularity::parse_lenient(Some("day")), Granularity::Day);
        assert_eq!(Granularity::parse_lenient(Some("week")), Granularity::Week);
        assert_eq!(Granularity::parse_lenient(Some("month")), Granularity::Month);
        assert_eq!(Granularity::parse_lenient(Some("quarter")), Granularity::Month);
        assert_eq!(Granularity::parse_lenient(None), Granularity::Month);
    }

    #[test]
    fn test_period_start() {
        // 2024-03-14 is a Thursday
        assert_eq!(Granularity::Day.period_start(d(2024, 3, 14)), d(2024, 3, 14));
        assert_eq!(Granularity::Week.period_start(d(2024, 3, 14)), d(2024, 3, 11));
        assert_eq!(Granularity::Week.period_start(d(2024, 3, 17)), d(2024, 3, 11));
        assert_eq!(Granularity::Week.period_start(d(2024, 3, 11)), d(2024, 3, 11));
        assert_eq!(Granularity::Month.period_start(d(2024, 3, 14)), d(2024, 3, 1));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Granularity::Month.label(d(2024, 1, 1)), "Янв 2024");
        assert_eq!(Granularity::Month.label(d(2023, 12, 1)), "Дек 2023");
        assert_eq!(Granularity::Week.label(d(2024, 3, 11)), "W11 2024");
        assert_eq!(Granularity::Day.label(d(2024, 3, 5)), "05.03.2024");
    }

    #[test]
    fn test_trend_intervals() {
        let end = d(2024, 3, 14);
        assert_eq!(
            Granularity::Day.trend_intervals(end),
            ((end, end), (d(2024, 3, 13), d(2024, 3, 13)))
        );
        assert_eq!(
            Granularity::Week.trend_intervals(end),
            ((d(2024, 3, 11), end), (d(2024, 3, 4), d(2024, 3, 10)))
        );
        assert_eq!(
            Granularity::Month.trend_intervals(end),
            ((d(2024, 3, 1), end), (d(2024, 2, 1), d(2024, 2, 29)))
        );
    }

    #[test]
    fn test_month_trend_across_year_boundary() {
        assert_eq!(
            Granularity::Month.trend_intervals(d(2024, 1, 1)),
            ((d(2024, 1, 1), d(2024, 1, 1)), (d(2023, 12, 1), d(2023, 12, 31)))
        );
    }
}
