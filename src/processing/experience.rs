//! Years-of-experience extraction
//!
//! Strategies are tried in a fixed order:
//! 1. employment date ranges, summed;
//! 2. explicit "<N> years" statements, maximum taken;
//! 3. seniority keywords, giving a canned estimate.
//!
//! The result is always a string. `"0"` is the zero sentinel.

use crate::config::ExperienceConfig;
use chrono::{Datelike, Local, NaiveDate};
use log::debug;
use regex::{Captures, Regex};

pub const ESTIMATED_SENIOR: &str = "5+ years (Estimated)";
pub const NO_EXPERIENCE: &str = "0";

const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
const SEPARATOR: &str = r"\s*(?:-|–|—|to|until)\s*";
const PRESENT: &str = r"(present|current|now|today|date)";

/// One employment interval, months counted from the first of each month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn months(&self) -> i32 {
        (self.end.year() - self.start.year()) * 12 + self.end.month() as i32
            - self.start.month() as i32
    }
}

pub struct ExperienceExtractor {
    month_range: Regex,
    numeric_range: Regex,
    year_range: Regex,
    strict_years: Regex,
    seniority: Regex,
    number: Regex,
    reference_date: NaiveDate,
    max_range_months: u32,
    max_plausible_years: u32,
}

impl ExperienceExtractor {
    pub fn new(config: &ExperienceConfig) -> Self {
        Self {
            month_range: Regex::new(&format!(
                r"(?i)\b{MONTH}\.?,?\s*(\d{{4}}){SEPARATOR}(?:{MONTH}\.?,?\s*(\d{{4}})|{PRESENT})\b"
            ))
            .expect("Invalid month range regex"),
            numeric_range: Regex::new(&format!(
                r"(?i)\b(\d{{1,2}})\s*/\s*(\d{{4}}){SEPARATOR}(?:(\d{{1,2}})\s*/\s*(\d{{4}})|{PRESENT})\b"
            ))
            .expect("Invalid numeric range regex"),
            year_range: Regex::new(&format!(
                r"(?i)\b((?:19|20)\d{{2}}){SEPARATOR}(?:((?:19|20)\d{{2}})|{PRESENT})\b"
            ))
            .expect("Invalid year range regex"),
            strict_years: Regex::new(r"(?i)\b(\d{1,3}(?:\.\d+)?)\s*\+?\s*(?:years?|yrs?)\b")
                .expect("Invalid years regex"),
            seniority: Regex::new(r"(?i)\b(?:senior|lead|manager|principal|head\s+of)\b")
                .expect("Invalid seniority regex"),
            number: Regex::new(r"\d+(?:\.\d+)?").expect("Invalid number regex"),
            reference_date: Local::now().date_naive(),
            max_range_months: config.max_range_months,
            max_plausible_years: config.max_plausible_years,
        }
    }

    /// Fix "today" for ranges ending in "Present"
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    pub fn extract(&self, text: &str) -> String {
        let months = self.total_months(text);
        if months > 0 {
            let years = (months as f32 / 12.0 * 10.0).round() / 10.0;
            debug!("Experience from date ranges: {} months", months);
            return format!("{:.1} years", years);
        }

        if let Some(years) = self.strict_years(text) {
            debug!("Experience from explicit statement: {} years", years);
            return format_years(years);
        }

        if self.seniority.is_match(text) {
            return ESTIMATED_SENIOR.to_string();
        }

        NO_EXPERIENCE.to_string()
    }

    /// Sum of all plausible date ranges, in months
    pub fn total_months(&self, text: &str) -> u32 {
        self.date_ranges(text)
            .iter()
            .map(DateRange::months)
            .filter(|m| *m > 0 && *m as u32 <= self.max_range_months)
            .map(|m| m as u32)
            .sum()
    }

    /// Ranges whose end falls after their start. Each span of text is claimed
    /// by the most specific pattern only.
    pub fn date_ranges(&self, text: &str) -> Vec<DateRange> {
        let mut ranges = Vec::new();
        let mut masked = text.to_string();

        for (pattern, parse) in [
            (&self.month_range, Self::parse_month_range as fn(&Self, &Captures) -> Option<DateRange>),
            (&self.numeric_range, Self::parse_numeric_range),
            (&self.year_range, Self::parse_year_range),
        ] {
            let mut spans = Vec::new();
            for caps in pattern.captures_iter(&masked) {
                if let Some(range) = parse(self, &caps) {
                    if range.end > range.start {
                        ranges.push(range);
                    }
                }
                if let Some(m) = caps.get(0) {
                    spans.push(m.range());
                }
            }
            for span in spans {
                let blank = " ".repeat(span.len());
                masked.replace_range(span, &blank);
            }
        }

        ranges
    }

    fn parse_month_range(&self, caps: &Captures) -> Option<DateRange> {
        let start = month_date(caps.get(2)?.as_str(), month_index(caps.get(1)?.as_str())?)?;
        let end = match (caps.get(3), caps.get(4)) {
            (Some(month), Some(year)) => month_date(year.as_str(), month_index(month.as_str())?)?,
            _ => self.reference_date,
        };
        Some(DateRange { start, end })
    }

    fn parse_numeric_range(&self, caps: &Captures) -> Option<DateRange> {
        let start = month_date(caps.get(2)?.as_str(), caps.get(1)?.as_str().parse().ok()?)?;
        let end = match (caps.get(3), caps.get(4)) {
            (Some(month), Some(year)) => month_date(year.as_str(), month.as_str().parse().ok()?)?,
            _ => self.reference_date,
        };
        Some(DateRange { start, end })
    }

    fn parse_year_range(&self, caps: &Captures) -> Option<DateRange> {
        let start = month_date(caps.get(1)?.as_str(), 1)?;
        let end = match caps.get(2) {
            Some(year) => month_date(year.as_str(), 1)?,
            None => self.reference_date,
        };
        Some(DateRange { start, end })
    }

    /// Largest plausible "<N> years" figure in the text
    pub fn strict_years(&self, text: &str) -> Option<f32> {
        self.strict_years
            .captures_iter(text)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<f32>().ok())
            .filter(|y| *y >= 0.0 && *y <= self.max_plausible_years as f32)
            .fold(None, |best: Option<f32>, y| Some(best.map_or(y, |b| b.max(y))))
    }

    /// Numeric years out of an extracted experience string; 0 when there is none
    pub fn parse_years(&self, value: &str) -> f32 {
        self.number
            .find(value)
            .and_then(|m| m.as_str().parse::<f32>().ok())
            .unwrap_or(0.0)
    }
}

impl Default for ExperienceExtractor {
    fn default() -> Self {
        Self::new(&ExperienceConfig {
            max_range_months: 120,
            max_plausible_years: 40,
        })
    }
}

fn format_years(years: f32) -> String {
    if years.fract() == 0.0 {
        format!("{} years", years as u32)
    } else {
        format!("{:.1} years", years)
    }
}

fn month_index(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn month_date(year: &str, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ExperienceExtractor {
        ExperienceExtractor::default()
            .with_reference_date(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    #[test]
    fn test_sums_month_ranges() {
        let ex = extractor();
        // Jan 2019 - Dec 2020 = 23 months, Mar 2021 - Jun 2024 = 39 months
        let months = ex.total_months("Jan 2019 - Dec 2020, Mar 2021 - Present");
        assert_eq!(months, 23 + 39);
        assert_eq!(ex.extract("Jan 2019 - Dec 2020, Mar 2021 - Present"), "5.2 years");
    }

    #[test]
    fn test_discards_implausible_ranges() {
        let ex = extractor();
        // 1990 - 2010 spans 240 months
        let months = ex.total_months("Janitor, 1990 - 2010\nEngineer, 01/2020 - 01/2022");
        assert_eq!(months, 24);
    }

    #[test]
    fn test_ranges_are_counted_once() {
        let ex = extractor();
        let ranges = ex.date_ranges("March 2021 – Present");
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].start, NaiveDate::from_ymd_opt(2021, 3, 1).unwrap());
    }

    #[test]
    fn test_reversed_range_ignored() {
        let ex = extractor();
        assert_eq!(ex.total_months("Dec 2020 - Jan 2019"), 0);
    }

    #[test]
    fn test_numeric_and_year_ranges() {
        let ex = extractor();
        assert_eq!(ex.total_months("06/2018 to 06/2019"), 12);
        assert_eq!(ex.total_months("2015 - 2017"), 24);
    }

    #[test]
    fn test_strict_fallback_takes_max() {
        let ex = extractor();
        let text = "2 years of Rust, 7+ yrs backend, 250 years of history";
        assert_eq!(ex.strict_years(text), Some(7.0));
        assert_eq!(ex.extract(text), "7 years");
    }

    #[test]
    fn test_keyword_fallback() {
        let ex = extractor();
        assert_eq!(ex.extract("Senior Engineer at Acme"), ESTIMATED_SENIOR);
        assert_eq!(ex.extract("Recent graduate"), NO_EXPERIENCE);
        assert_eq!(ex.extract(""), NO_EXPERIENCE);
    }

    #[test]
    fn test_parse_years() {
        let ex = extractor();
        assert_eq!(ex.parse_years("5.2 years"), 5.2);
        assert_eq!(ex.parse_years(ESTIMATED_SENIOR), 5.0);
        assert_eq!(ex.parse_years("Fresh/Entry Level"), 0.0);
        assert_eq!(ex.parse_years(NO_EXPERIENCE), 0.0);
    }
}
