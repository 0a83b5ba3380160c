use std::io::{self, IsTerminal, Write};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::calendar::{MonthGrid, weekday_labels};
use crate::config::Config;
use crate::datetime::{date_key, format_long_date, format_numeric_date, format_short_date};
use crate::index::{DateIndex, indexed_item_count};
use crate::schedule::ScheduleItem;

/// Day number, a space, then up to three characters of item count.
const MONTH_CELL_WIDTH: usize = 6;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.color && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, out, index))]
    pub fn write_index<W: Write>(&self, out: &mut W, index: &DateIndex<'_>) -> anyhow::Result<()> {
        if index.is_empty() {
            writeln!(out, "No scheduled items.")?;
            return Ok(());
        }

        for (date, items) in index {
            writeln!(out, "{}", self.paint(&format_long_date(date), "1"))?;
            for item in items {
                writeln!(out, "  {:>8}  {}  {}", item.time, item.kind.label(), item.title)?;
            }
            writeln!(out)?;
        }
        writeln!(
            out,
            "{} across {}",
            count_label(indexed_item_count(index), "item"),
            count_label(index.len(), "date")
        )?;
        Ok(())
    }

    #[tracing::instrument(skip(self, out, items))]
    pub fn write_agenda<W: Write>(
        &self,
        out: &mut W,
        date_key: &str,
        items: &[&ScheduleItem],
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&format_long_date(date_key), "1"))?;
        if items.is_empty() {
            writeln!(out, "Nothing scheduled.")?;
            return Ok(());
        }

        let rows = items
            .iter()
            .map(|item| {
                let deal = item
                    .deal
                    .as_ref()
                    .map(|deal| format!("{} ({} items, {:.2})", deal.name, deal.product_count, deal.value))
                    .unwrap_or_default();
                let contact = item
                    .contact
                    .as_ref()
                    .map(|contact| format!("{} {}", contact.name, contact.phone))
                    .unwrap_or_default();
                [
                    self.paint(&item.time, "33"),
                    item.kind.label().to_string(),
                    item.title.clone(),
                    deal,
                    contact,
                ]
            })
            .collect::<Vec<_>>();

        write_agenda_table(out, &rows)
    }

    #[tracing::instrument(skip(self, out, grid))]
    pub fn write_month<W: Write>(
        &self,
        out: &mut W,
        grid: &MonthGrid,
        today: NaiveDate,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(&grid.title(), "1"))?;
        let labels = weekday_labels(grid.week_start)
            .into_iter()
            .map(|label| format!("  {label:<MONTH_CELL_WIDTH$}"))
            .collect::<String>();
        writeln!(out, "{labels}")?;

        for week in grid.weeks() {
            for day in week {
                let cell = if day.in_month {
                    format!("{:>2} {:<3}", day.date.day(), busy_marker(day.item_count))
                } else {
                    " ".repeat(MONTH_CELL_WIDTH)
                };
                let cell = if day.date == today {
                    self.paint(&cell, "7")
                } else {
                    cell
                };
                write!(out, "  {cell}")?;
            }
            writeln!(out)?;
        }

        writeln!(out)?;
        for (start, end) in grid.week_spans() {
            writeln!(
                out,
                "  {} - {}",
                format_short_date(&date_key(start)),
                format_short_date(&date_key(end))
            )?;
        }
        writeln!(out, "{} this month", count_label(grid.total_items(), "item"))?;
        Ok(())
    }

    pub fn write_formats<W: Write>(&self, out: &mut W, date_key: &str) -> anyhow::Result<()> {
        writeln!(out, "long     {}", format_long_date(date_key))?;
        writeln!(out, "short    {}", format_short_date(date_key))?;
        writeln!(out, "numeric  {}", format_numeric_date(date_key))?;
        Ok(())
    }

    pub fn write_json<W: Write, T: Serialize + ?Sized>(&self, out: &mut W, value: &T) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, value)?;
        writeln!(out)?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

const AGENDA_HEADERS: [&str; 5] = ["Time", "Type", "Title", "Deal", "Contact"];

/// Time is right-aligned so `9:00 PM` lines up under `11:00 AM`; the last
/// column is never padded.
fn write_agenda_table<W: Write>(writer: &mut W, rows: &[[String; 5]]) -> anyhow::Result<()> {
    let mut widths = AGENDA_HEADERS.map(|header| UnicodeWidthStr::width(header));
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(visible_width(cell));
        }
    }

    let header = AGENDA_HEADERS.map(str::to_string);
    write_agenda_row(writer, &header, &widths)?;
    let rule = widths.map(|width| "-".repeat(width));
    write_agenda_row(writer, &rule, &widths)?;
    for row in rows {
        write_agenda_row(writer, row, &widths)?;
    }
    Ok(())
}

fn write_agenda_row<W: Write>(writer: &mut W, cells: &[String; 5], widths: &[usize; 5]) -> anyhow::Result<()> {
    let last = cells.len() - 1;
    let mut line = String::new();
    for (idx, (cell, width)) in cells.iter().zip(widths).enumerate() {
        let padding = " ".repeat(width.saturating_sub(visible_width(cell)));
        if idx == 0 {
            line.push_str(&padding);
            line.push_str(cell);
        } else if idx == last {
            line.push_str(cell);
        } else {
            line.push_str(cell);
            line.push_str(&padding);
        }
        if idx != last {
            line.push_str("  ");
        }
    }
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}

/// Display width of `s` ignoring ANSI colour sequences.
fn visible_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for ch in s.chars() {
        match (in_escape, ch) {
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, '\x1b') => in_escape = true,
            (false, _) => width += UnicodeWidthChar::width(ch).unwrap_or(0),
        }
    }
    width
}

/// Day-cell marker: `3*` for three items, `99+` past two digits.
fn busy_marker(count: usize) -> String {
    match count {
        0 => String::new(),
        1..=99 => format!("{count}*"),
        _ => "99+".to_string(),
    }
}

fn count_label(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
