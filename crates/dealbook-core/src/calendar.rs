use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Weekday
};
use serde::Serialize;

use crate::datetime::{
  date_key,
  month_name
};
use crate::index::DateIndex;

const GRID_WEEKS: usize = 6;
const GRID_DAYS: usize = GRID_WEEKS * 7;

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct CalendarDay {
  pub date:       NaiveDate,
  pub in_month:   bool,
  pub item_count: usize
}

/// Six weeks of days covering one month,
/// starting on the configured first day
/// of the week.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct MonthGrid {
  pub year:       i32,
  pub month:      u32,
  pub week_start: Weekday,
  pub days:       Vec<CalendarDay>
}

impl MonthGrid {
  #[tracing::instrument(skip(index))]
  pub fn build(
    year: i32,
    month: u32,
    week_start: Weekday,
    index: &DateIndex<'_>
  ) -> anyhow::Result<Self> {
    let first = NaiveDate::from_ymd_opt(
      year, month, 1
    )
    .ok_or_else(|| {
      anyhow!(
        "invalid calendar month: \
         {year}-{month}"
      )
    })?;
    let grid_start =
      start_of_week(first, week_start);

    let days = (0..GRID_DAYS as i64)
      .map(|offset| {
        let date =
          add_days(grid_start, offset);
        let item_count = index
          .get(date_key(date).as_str())
          .map_or(0, Vec::len);
        CalendarDay {
          date,
          in_month: date.month() == month
            && date.year() == year,
          item_count
        }
      })
      .collect::<Vec<_>>();

    tracing::debug!(
      grid_start = %grid_start,
      busy_days = days
        .iter()
        .filter(|day| day.item_count > 0)
        .count(),
      "built month grid"
    );

    Ok(Self {
      year,
      month,
      week_start,
      days
    })
  }

  pub fn title(&self) -> String {
    format!(
      "{} {}",
      month_name(self.month)
        .unwrap_or("?"),
      self.year
    )
  }

  pub fn weeks(
    &self
  ) -> impl Iterator<Item = &[CalendarDay]>
  {
    self.days.chunks(7)
  }

  /// First and last day of every grid row
  /// that touches the month.
  pub fn week_spans(
    &self
  ) -> Vec<(NaiveDate, NaiveDate)> {
    self
      .weeks()
      .filter(|week| {
        week.iter().any(|day| day.in_month)
      })
      .filter_map(|week| {
        Some((
          week.first()?.date,
          week.last()?.date
        ))
      })
      .collect()
  }

  pub fn total_items(&self) -> usize {
    self
      .days
      .iter()
      .filter(|day| day.in_month)
      .map(|day| day.item_count)
      .sum()
  }
}

pub fn weekday_labels(
  week_start: Weekday
) -> Vec<&'static str> {
  match week_start {
    | Weekday::Sun => {
      vec![
        "Sun", "Mon", "Tue", "Wed",
        "Thu", "Fri", "Sat",
      ]
    }
    | _ => {
      vec![
        "Mon", "Tue", "Wed", "Thu",
        "Fri", "Sat", "Sun",
      ]
    }
  }
}

pub fn parse_week_start(
  raw: &str
) -> Option<Weekday> {
  match raw
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "monday" | "mon" => {
      Some(Weekday::Mon)
    }
    | "sunday" | "sun" => {
      Some(Weekday::Sun)
    }
    | _ => None
  }
}

/// Parses a `YYYY-MM` month key.
pub fn parse_month_key(
  raw: &str
) -> anyhow::Result<(i32, u32)> {
  let (year, month) = raw
    .trim()
    .split_once('-')
    .ok_or_else(|| {
      anyhow!(
        "month must be YYYY-MM: {raw}"
      )
    })?;
  let year: i32 =
    year.parse().with_context(|| {
      format!("invalid year in {raw}")
    })?;
  let month: u32 =
    month.parse().with_context(|| {
      format!("invalid month in {raw}")
    })?;
  if !(1..=12).contains(&month) {
    return Err(anyhow!(
      "month out of range in {raw}"
    ));
  }
  Ok((year, month))
}

pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  let mut year = date.year();
  let mut month =
    date.month() as i32 + months;

  while month < 1 {
    month += 12;
    year = year.saturating_sub(1);
  }
  while month > 12 {
    month -= 12;
    year = year.saturating_add(1);
  }

  let month = month as u32;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .unwrap_or(date)
}

fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  NaiveDate::from_ymd_opt(
    next_year, next_month, 1
  )
  .and_then(|first| first.pred_opt())
  .map_or(31, |last| last.day())
}

pub fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let day_idx = day
    .weekday()
    .num_days_from_monday()
    as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  let diff =
    (7 + day_idx - start_idx) % 7;
  add_days(day, -diff)
}

fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}
