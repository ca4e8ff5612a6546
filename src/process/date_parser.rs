use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

use crate::error::{Error, Result};

/// A parsed date, keeping whatever UTC offset the text carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    Naive(NaiveDateTime),
    Aware(DateTime<FixedOffset>),
}

impl Moment {
    pub fn is_aware(&self) -> bool {
        matches!(self, Moment::Aware(_))
    }

    /// `YYYY-MM-DDTHH:MM:SS[.ffffff][±HH:MM]`, fraction only when non-zero.
    pub fn to_iso8601(&self) -> String {
        match self {
            Moment::Naive(dt) => iso_naive(dt),
            Moment::Aware(dt) => format!("{}{}", iso_naive(&dt.naive_local()), dt.format("%:z")),
        }
    }

    /// Order two moments of the same kind; `None` when one is naive and the
    /// other aware.
    pub fn try_cmp(&self, other: &Moment) -> Option<Ordering> {
        match (self, other) {
            (Moment::Naive(a), Moment::Naive(b)) => Some(a.cmp(b)),
            (Moment::Aware(a), Moment::Aware(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

fn iso_naive(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+|[A-Za-z]+|\S").unwrap());

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Filler words that may sit between date components.
const SKIP_WORDS: &[&str] = &["t", "st", "nd", "rd", "th", "of", "at", "on", "and"];

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
    Num(&'a str),
    Word(String),
    Punct(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Meridiem {
    Am,
    Pm,
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    Year,
    Month,
    Day,
}

#[derive(Debug, Default)]
struct Components {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    nanos: u32,
    offset: Option<i32>,
    meridiem: Option<Meridiem>,
    /// Bare numbers whose role is decided once every token has been seen.
    loose: Vec<(u32, usize)>,
}

/// Parse a date/time string the permissive way.
///
/// Understands ISO 8601 / RFC 3339, `YYYY/MM/DD`, month-first `MM/DD/YYYY`
/// (day-first when the first part cannot be a month), compact
/// `YYYYMMDD[THHMMSS]`, month names and abbreviations, weekday names, AM/PM,
/// `Z`/`UTC`/`GMT` and numeric offsets. Components missing from the text are
/// taken from 0001-01-01T00:00:00. An offset in the text yields
/// [`Moment::Aware`], otherwise [`Moment::Naive`].
pub fn parse_datetime(raw: &str) -> Result<Moment> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(Error::date(raw, "empty string"));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(Moment::Aware(dt));
    }

    let tokens: Vec<Token> = TOKEN
        .find_iter(s)
        .map(|m| {
            let text = m.as_str();
            let first = text.chars().next().unwrap_or(' ');
            if first.is_ascii_digit() {
                Token::Num(text)
            } else if first.is_ascii_alphabetic() {
                Token::Word(text.to_ascii_lowercase())
            } else {
                Token::Punct(first)
            }
        })
        .collect();

    let mut parts = Components::default();
    let mut i = 0;
    while i < tokens.len() {
        i = match &tokens[i] {
            Token::Num(_) => parts.numeric(&tokens, i, raw)?,
            Token::Word(w) => parts.word(w, i, raw)?,
            Token::Punct(c) => parts.punct(*c, &tokens, i, raw)?,
        };
    }

    parts.resolve_loose(raw)?;
    parts.build(raw)
}

fn num_at<'a>(tokens: &[Token<'a>], i: usize) -> Option<&'a str> {
    match tokens.get(i) {
        Some(Token::Num(d)) => Some(*d),
        _ => None,
    }
}

fn punct_at(tokens: &[Token], i: usize) -> Option<char> {
    match tokens.get(i) {
        Some(Token::Punct(c)) => Some(*c),
        _ => None,
    }
}

fn value(digits: &str, raw: &str) -> Result<u32> {
    digits
        .parse()
        .map_err(|_| Error::date(raw, format!("number {} out of range", digits)))
}

/// Four-digit years are taken as written; shorter ones pivot at 69.
fn year_from(digits: &str, raw: &str) -> Result<i32> {
    let v = value(digits, raw)? as i32;
    Ok(if digits.len() > 2 {
        v
    } else if v >= 69 {
        1900 + v
    } else {
        2000 + v
    })
}

fn fraction_nanos(digits: &str) -> u32 {
    let mut padded: String = digits.chars().take(9).collect();
    while padded.len() < 9 {
        padded.push('0');
    }
    padded.parse().unwrap_or(0)
}

fn month_from_word(word: &str) -> Option<u32> {
    if word == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|m| word == *m || (word.len() == 3 && m.starts_with(word)))
        .map(|idx| idx as u32 + 1)
}

fn is_weekday(word: &str) -> bool {
    matches!(word, "tues" | "thur" | "thurs")
        || WEEKDAYS
            .iter()
            .any(|d| word == *d || (word.len() == 3 && d.starts_with(word)))
}

impl Components {
    fn has_date(&self) -> bool {
        self.year.is_some() || self.month.is_some() || self.day.is_some()
    }

    fn has_full_date(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    fn set_time(&mut self, h: u32, m: u32, s: u32, raw: &str) -> Result<()> {
        if self.hour.is_some() {
            return Err(Error::date(raw, "more than one time of day"));
        }
        self.hour = Some(h);
        self.minute = Some(m);
        self.second = Some(s);
        Ok(())
    }

    fn set_ymd(&mut self, y: i32, m: u32, d: Option<u32>) {
        self.year = Some(y);
        self.month = Some(m);
        self.day = d;
    }

    fn numeric(&mut self, tokens: &[Token], i: usize, raw: &str) -> Result<usize> {
        let digits = num_at(tokens, i).unwrap_or("");

        // HH:MM[:SS[.fff]]
        if punct_at(tokens, i + 1) == Some(':') {
            if let Some(minute) = num_at(tokens, i + 2) {
                let mut j = i + 3;
                let mut second = 0;
                if punct_at(tokens, j) == Some(':') {
                    if let Some(sec) = num_at(tokens, j + 1) {
                        second = value(sec, raw)?;
                        j += 2;
                    }
                }
                self.set_time(value(digits, raw)?, value(minute, raw)?, second, raw)?;
                return Ok(self.fraction(tokens, j));
            }
        }

        // YYYYMMDDhhmm[ss]
        if (digits.len() == 12 || digits.len() == 14) && !self.has_date() {
            self.set_ymd(
                year_from(&digits[0..4], raw)?,
                value(&digits[4..6], raw)?,
                Some(value(&digits[6..8], raw)?),
            );
            let second = if digits.len() == 14 {
                value(&digits[12..14], raw)?
            } else {
                0
            };
            self.set_time(
                value(&digits[8..10], raw)?,
                value(&digits[10..12], raw)?,
                second,
                raw,
            )?;
            return Ok(self.fraction(tokens, i + 1));
        }

        // YYYYMMDD
        if digits.len() == 8 && !self.has_date() {
            self.set_ymd(
                year_from(&digits[0..4], raw)?,
                value(&digits[4..6], raw)?,
                Some(value(&digits[6..8], raw)?),
            );
            return Ok(i + 1);
        }

        // compact HH[MM[SS]] right after the `T` of a complete date
        let after_t = i > 0 && tokens[i - 1] == Token::Word("t".into());
        if after_t && self.has_full_date() && self.hour.is_none() && digits.len() % 2 == 0 {
            let h = value(&digits[0..2], raw)?;
            let m = if digits.len() >= 4 {
                value(&digits[2..4], raw)?
            } else {
                0
            };
            let s = if digits.len() >= 6 {
                value(&digits[4..6], raw)?
            } else {
                0
            };
            if digits.len() <= 6 {
                self.set_time(h, m, s, raw)?;
                return Ok(self.fraction(tokens, i + 1));
            }
        }

        // D-M-Y style groups sharing one separator
        if let Some(sep) = punct_at(tokens, i + 1).filter(|c| matches!(c, '-' | '/' | '.')) {
            if let Some(second) = num_at(tokens, i + 2).filter(|_| !self.has_date()) {
                let mut group = vec![digits, second];
                let mut j = i + 3;
                if punct_at(tokens, j) == Some(sep) {
                    if let Some(third) = num_at(tokens, j + 1) {
                        group.push(third);
                        j += 2;
                    }
                }
                self.date_group(&group, raw)?;
                return Ok(j);
            }
        }

        // an hour qualified by AM/PM
        if let Some(Token::Word(w)) = tokens.get(i + 1) {
            if (w == "am" || w == "pm") && self.hour.is_none() {
                self.set_time(value(digits, raw)?, 0, 0, raw)?;
                return Ok(i + 1);
            }
        }

        self.loose.push((value(digits, raw)?, digits.len()));
        Ok(i + 1)
    }

    fn fraction(&mut self, tokens: &[Token], j: usize) -> usize {
        if matches!(punct_at(tokens, j), Some('.') | Some(',')) {
            if let Some(frac) = num_at(tokens, j + 1) {
                self.nanos = fraction_nanos(frac);
                return j + 2;
            }
        }
        j
    }

    fn date_group(&mut self, group: &[&str], raw: &str) -> Result<()> {
        let first = value(group[0], raw)?;
        let second = value(group[1], raw)?;
        let year_first = group[0].len() >= 3 || first > 31;

        match group {
            [y, _, d] if year_first => {
                let day = value(d, raw)?;
                self.set_ymd(year_from(y, raw)?, second, Some(day));
            }
            [_, _, y] => {
                let year = year_from(y, raw)?;
                // month first unless the first part cannot be a month
                if first > 12 && second <= 12 {
                    self.set_ymd(year, second, Some(first));
                } else {
                    self.set_ymd(year, first, Some(second));
                }
            }
            [y, _] if year_first => self.set_ymd(year_from(y, raw)?, second, None),
            [_, y] if y.len() >= 3 => self.set_ymd(year_from(y, raw)?, first, None),
            _ => {
                if first > 12 && second <= 12 {
                    self.month = Some(second);
                    self.day = Some(first);
                } else {
                    self.month = Some(first);
                    self.day = Some(second);
                }
            }
        }
        Ok(())
    }

    fn word(&mut self, word: &str, i: usize, raw: &str) -> Result<usize> {
        if let Some(month) = month_from_word(word) {
            if self.month.is_some() {
                return Err(Error::date(raw, "more than one month"));
            }
            self.month = Some(month);
        } else if word == "am" || word == "pm" {
            if self.hour.is_none() {
                return Err(Error::date(raw, "AM/PM without an hour"));
            }
            self.meridiem = Some(if word == "am" { Meridiem::Am } else { Meridiem::Pm });
        } else if matches!(word, "z" | "utc" | "gmt") {
            self.offset = Some(0);
        } else if !is_weekday(word) && !SKIP_WORDS.contains(&word) {
            return Err(Error::date(raw, format!("unknown token {:?}", word)));
        }
        Ok(i + 1)
    }

    fn punct(&mut self, c: char, tokens: &[Token], i: usize, raw: &str) -> Result<usize> {
        match c {
            '+' | '-' if self.hour.is_some() && num_at(tokens, i + 1).is_some() => {
                let digits = num_at(tokens, i + 1).unwrap_or("");
                let mut j = i + 2;
                let (hours, minutes) = match digits.len() {
                    4 => (value(&digits[0..2], raw)?, value(&digits[2..4], raw)?),
                    1 | 2 => {
                        let mut minutes = 0;
                        if punct_at(tokens, j) == Some(':') {
                            if let Some(mm) = num_at(tokens, j + 1) {
                                minutes = value(mm, raw)?;
                                j += 2;
                            }
                        }
                        (value(digits, raw)?, minutes)
                    }
                    _ => return Err(Error::date(raw, "malformed UTC offset")),
                };
                let sign = if c == '-' { -1 } else { 1 };
                self.offset = Some(sign * (hours as i32 * 3600 + minutes as i32 * 60));
                Ok(j)
            }
            ',' | '/' | '-' | '.' | ':' | '(' | ')' | '+' => Ok(i + 1),
            _ => Err(Error::date(raw, format!("unexpected character {:?}", c))),
        }
    }

    fn resolve_loose(&mut self, raw: &str) -> Result<()> {
        let order: &[Slot] = if self.loose.len() == 1 {
            &[Slot::Day, Slot::Month, Slot::Year]
        } else {
            &[Slot::Month, Slot::Day, Slot::Year]
        };

        for (v, len) in std::mem::take(&mut self.loose) {
            if len >= 3 || v > 31 {
                if self.year.is_some() {
                    return Err(Error::date(raw, "more than one year"));
                }
                self.year = Some(v as i32);
                continue;
            }
            let slot = order.iter().find(|slot| match slot {
                Slot::Month => self.month.is_none() && (1..=12).contains(&v),
                Slot::Day => self.day.is_none(),
                Slot::Year => self.year.is_none(),
            });
            match slot {
                Some(Slot::Month) => self.month = Some(v),
                Some(Slot::Day) => self.day = Some(v),
                Some(Slot::Year) => self.year = Some(year_from(&v.to_string(), raw)?),
                None => return Err(Error::date(raw, format!("cannot place number {}", v))),
            }
        }
        Ok(())
    }

    fn build(self, raw: &str) -> Result<Moment> {
        if !self.has_date() && self.hour.is_none() {
            return Err(Error::date(raw, "no date or time components"));
        }

        let mut hour = self.hour.unwrap_or(0);
        match self.meridiem {
            Some(_) if hour == 0 || hour > 12 => {
                return Err(Error::date(raw, "hour out of range for AM/PM"));
            }
            Some(Meridiem::Pm) if hour < 12 => hour += 12,
            Some(Meridiem::Am) if hour == 12 => hour = 0,
            _ => {}
        }

        let date = NaiveDate::from_ymd_opt(
            self.year.unwrap_or(1),
            self.month.unwrap_or(1),
            self.day.unwrap_or(1),
        )
        .ok_or_else(|| Error::date(raw, "day is out of range for month"))?;
        let time = NaiveTime::from_hms_nano_opt(
            hour,
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
            self.nanos,
        )
        .ok_or_else(|| Error::date(raw, "time of day out of range"))?;
        let naive = date.and_time(time);

        match self.offset {
            None => Ok(Moment::Naive(naive)),
            Some(secs) => {
                let offset = FixedOffset::east_opt(secs)
                    .ok_or_else(|| Error::date(raw, "UTC offset out of range"))?;
                offset
                    .from_local_datetime(&naive)
                    .single()
                    .map(Moment::Aware)
                    .ok_or_else(|| Error::date(raw, "ambiguous local time"))
            }
        }
    }
}
