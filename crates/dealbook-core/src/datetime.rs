use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  DateTime,
  Datelike,
  NaiveDate,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;

const DATE_KEY_FORMAT: &str =
  "%Y-%m-%d";

const MONTH_NAMES: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December"
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
  "Jan", "Feb", "Mar", "Apr", "May",
  "Jun", "Jul", "Aug", "Sep", "Oct",
  "Nov", "Dec"
];

fn date_key_regex()
-> Option<&'static Regex> {
  static DATE_KEY_RE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  DATE_KEY_RE
    .get_or_init(|| {
      Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$"
      )
      .map_err(|err| {
        tracing::error!(
          error = %err,
          "internal date key regex \
           failed to compile"
        );
      })
      .ok()
    })
    .as_ref()
}

/// Parses a canonical `YYYY-MM-DD` key.
/// Signs, spaces and unpadded fields
/// are rejected even where chrono would
/// accept them.
pub fn parse_date_key(
  key: &str
) -> anyhow::Result<NaiveDate> {
  let canonical = date_key_regex()
    .ok_or_else(|| {
      anyhow!(
        "date key pattern unavailable"
      )
    })?
    .is_match(key);
  if !canonical {
    return Err(anyhow!(
      "date key must be YYYY-MM-DD: \
       {key}"
    ));
  }
  NaiveDate::parse_from_str(
    key,
    DATE_KEY_FORMAT
  )
  .with_context(|| {
    format!("invalid date key: {key}")
  })
}

#[must_use]
pub fn date_key(
  date: NaiveDate
) -> String {
  date
    .format(DATE_KEY_FORMAT)
    .to_string()
}

#[must_use]
pub fn today_in(
  timezone: Tz,
  now: DateTime<Utc>
) -> NaiveDate {
  now.with_timezone(&timezone)
    .date_naive()
}

pub fn month_name(
  month: u32
) -> Option<&'static str> {
  let idx = month.checked_sub(1)?;
  MONTH_NAMES
    .get(idx as usize)
    .copied()
}

pub fn month_abbreviation(
  month: u32
) -> Option<&'static str> {
  let idx = month.checked_sub(1)?;
  MONTH_ABBREVIATIONS
    .get(idx as usize)
    .copied()
}

/// English ordinal suffix for a day of
/// the month. 11 through 13 always take
/// "th".
#[must_use]
pub fn ordinal_suffix(
  day: u32
) -> &'static str {
  if (11..=13).contains(&(day % 100)) {
    return "th";
  }
  match day % 10 {
    | 1 => "st",
    | 2 => "nd",
    | 3 => "rd",
    | _ => "th"
  }
}

pub fn try_format_long_date(
  key: &str
) -> anyhow::Result<String> {
  let date = parse_date_key(key)?;
  let month = month_name(date.month())
    .ok_or_else(|| {
      anyhow!(
        "month out of range: {}",
        date.month()
      )
    })?;
  Ok(format!(
    "{month} {}{} {}",
    date.day(),
    ordinal_suffix(date.day()),
    date.year()
  ))
}

pub fn try_format_short_date(
  key: &str
) -> anyhow::Result<String> {
  let date = parse_date_key(key)?;
  let month =
    month_abbreviation(date.month())
      .ok_or_else(|| {
        anyhow!(
          "month out of range: {}",
          date.month()
        )
      })?;
  Ok(format!("{month} {}", date.day()))
}

pub fn try_format_numeric_date(
  key: &str
) -> anyhow::Result<String> {
  let date = parse_date_key(key)?;
  Ok(format!(
    "{:02}/{:02}/{:02}",
    date.month(),
    date.day(),
    date.year().rem_euclid(100)
  ))
}

/// `"2025-04-09"` -> `"April 9th 2025"`.
/// An unparsable key comes back as-is.
#[must_use]
pub fn format_long_date(
  key: &str
) -> String {
  or_passthrough(
    key,
    try_format_long_date(key)
  )
}

/// `"2025-04-09"` -> `"Apr 9"`.
#[must_use]
pub fn format_short_date(
  key: &str
) -> String {
  or_passthrough(
    key,
    try_format_short_date(key)
  )
}

/// `"2025-04-09"` -> `"04/09/25"`.
#[must_use]
pub fn format_numeric_date(
  key: &str
) -> String {
  or_passthrough(
    key,
    try_format_numeric_date(key)
  )
}

fn or_passthrough(
  key: &str,
  formatted: anyhow::Result<String>
) -> String {
  match formatted {
    | Ok(text) => text,
    | Err(err) => {
      tracing::warn!(
        key,
        error = %err,
        "unformattable date key; \
         showing raw value"
      );
      key.to_string()
    }
  }
}

fn clock_regex() -> Option<&'static Regex>
{
  static CLOCK_RE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  CLOCK_RE
    .get_or_init(|| {
      Regex::new(
        r"(?i)^(?P<hour>\d{1,2}):(?P<minute>\d{2})\s*(?P<ampm>[ap]m)$",
      )
      .map_err(|err| {
        tracing::error!(
          error = %err,
          "internal clock regex failed \
           to compile"
        );
      })
      .ok()
    })
    .as_ref()
}

/// Minutes since midnight for a 12-hour
/// clock string like `"9:00 PM"`.
///
/// Returns `None` unless the hour is
/// 1..=12, the minute 0..=59 and a
/// meridiem is present.
pub fn minutes_since_midnight(
  time: &str
) -> Option<u32> {
  let captures = clock_regex()?
    .captures(time.trim())?;

  let raw_hour = captures
    .name("hour")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  let minute = captures
    .name("minute")?
    .as_str()
    .parse::<u32>()
    .ok()?;
  if raw_hour == 0
    || raw_hour > 12
    || minute > 59
  {
    return None;
  }

  let meridiem = captures
    .name("ampm")?
    .as_str()
    .to_ascii_lowercase();
  let hour = match meridiem.as_str() {
    | "pm" if raw_hour != 12 => {
      raw_hour + 12
    }
    | "am" if raw_hour == 12 => 0,
    | _ => raw_hour
  };

  Some(hour * 60 + minute)
}

#[cfg(test)]
mod tests {
  use chrono::{
    NaiveDate,
    TimeZone,
    Utc
  };

  use super::{
    date_key,
    format_long_date,
    format_numeric_date,
    format_short_date,
    minutes_since_midnight,
    ordinal_suffix,
    parse_date_key,
    today_in
  };

  #[test]
  fn long_date_uses_ordinals() {
    assert_eq!(
      format_long_date("2025-04-09"),
      "April 9th 2025"
    );
    assert_eq!(
      format_long_date("2025-04-11"),
      "April 11th 2025"
    );
    assert_eq!(
      format_long_date("2025-05-01"),
      "May 1st 2025"
    );
    assert_eq!(
      format_long_date("2025-06-22"),
      "June 22nd 2025"
    );
    assert_eq!(
      format_long_date("2025-12-23"),
      "December 23rd 2025"
    );
  }

  #[test]
  fn ordinal_teens_take_th() {
    for day in [11, 12, 13] {
      assert_eq!(
        ordinal_suffix(day),
        "th"
      );
    }
    assert_eq!(ordinal_suffix(21), "st");
    assert_eq!(ordinal_suffix(31), "st");
    assert_eq!(ordinal_suffix(30), "th");
  }

  #[test]
  fn short_and_numeric_forms() {
    assert_eq!(
      format_short_date("2025-04-09"),
      "Apr 9"
    );
    assert_eq!(
      format_numeric_date("2025-04-09"),
      "04/09/25"
    );
    assert_eq!(
      format_numeric_date("2003-11-30"),
      "11/30/03"
    );
  }

  #[test]
  fn malformed_keys_pass_through() {
    assert_eq!(
      format_long_date("someday"),
      "someday"
    );
    assert_eq!(
      format_short_date("2025-02-30"),
      "2025-02-30"
    );
    assert!(
      parse_date_key("2025-4-9").is_err()
    );
  }

  #[test]
  fn rejects_non_canonical_keys() {
    for raw in [
      "+2025-4-09",
      "2025- 4- 9",
      "2025-04- 9",
      " 2025-04-09",
      "2025-04-09 ",
      "20250-4-09"
    ] {
      assert!(
        parse_date_key(raw).is_err(),
        "{raw:?}"
      );
      assert_eq!(
        format_long_date(raw),
        raw
      );
    }
    assert_eq!(
      parse_date_key("2025-04-09")
        .expect("canonical key"),
      NaiveDate::from_ymd_opt(2025, 4, 9)
        .expect("valid date")
    );
  }

  #[test]
  fn date_key_is_zero_padded() {
    let date =
      NaiveDate::from_ymd_opt(2025, 4, 3)
        .expect("valid date");
    assert_eq!(
      date_key(date),
      "2025-04-03"
    );
  }

  #[test]
  fn clock_times_convert_to_minutes() {
    assert_eq!(
      minutes_since_midnight("9:00 PM"),
      Some(21 * 60)
    );
    assert_eq!(
      minutes_since_midnight("12:15 AM"),
      Some(15)
    );
    assert_eq!(
      minutes_since_midnight("12:30 PM"),
      Some(12 * 60 + 30)
    );
    assert_eq!(
      minutes_since_midnight("09:05 am"),
      Some(9 * 60 + 5)
    );
    assert_eq!(
      minutes_since_midnight("11:00AM"),
      Some(11 * 60)
    );
  }

  #[test]
  fn rejects_malformed_clock_times() {
    for raw in [
      "", "noon", "21:00", "13:00 PM",
      "0:30 AM", "9:60 PM", "9 PM"
    ] {
      assert_eq!(
        minutes_since_midnight(raw),
        None,
        "{raw}"
      );
    }
  }

  #[test]
  fn today_follows_timezone() {
    let now = Utc
      .with_ymd_and_hms(
        2025, 4, 10, 2, 0, 0
      )
      .single()
      .expect("valid now");
    assert_eq!(
      date_key(today_in(
        chrono_tz::America::New_York,
        now
      )),
      "2025-04-09"
    );
    assert_eq!(
      date_key(today_in(
        chrono_tz::UTC,
        now
      )),
      "2025-04-10"
    );
  }
}
