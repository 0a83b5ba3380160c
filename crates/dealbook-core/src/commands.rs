use std::io::Write;
use std::path::Path;

use anyhow::{Context, anyhow};
use chrono::{Datelike, NaiveDate};
use tracing::{debug, instrument};

use crate::agenda::items_for_date;
use crate::calendar::{MonthGrid, parse_month_key, shift_months};
use crate::cli::Command;
use crate::config::Config;
use crate::datetime::date_key;
use crate::index::index_by_date;
use crate::render::Renderer;
use crate::schedule::ScheduleItem;
use crate::source::load_items;

/// Per-invocation inputs shared by every command.
#[derive(Debug)]
pub struct CommandContext<'a> {
    pub cfg: &'a Config,
    pub renderer: &'a Renderer,
    pub today: NaiveDate,
}

#[instrument(skip(ctx, out, items_path))]
pub fn dispatch<W: Write>(
    ctx: &CommandContext<'_>,
    out: &mut W,
    items_path: Option<&Path>,
    command: Command,
) -> anyhow::Result<()> {
    let items = if command.needs_items() {
        let path = items_path.ok_or_else(|| anyhow!("--items <PATH> is required for this command"))?;
        load_items(path)?
    } else {
        vec![]
    };

    match command {
        Command::Index { json } => cmd_index(ctx, out, &items, json),
        Command::Agenda { date, json } => {
            let date = date.unwrap_or_else(|| date_key(ctx.today));
            cmd_agenda(ctx, out, &items, &date, json)
        }
        Command::Month { month, offset } => {
            let anchor = match month {
                Some(raw) => {
                    let (year, month) = parse_month_key(&raw)?;
                    NaiveDate::from_ymd_opt(year, month, 1)
                        .ok_or_else(|| anyhow!("invalid calendar month: {raw}"))?
                }
                None => ctx.today,
            };
            let target = shift_months(anchor, offset);
            cmd_month(ctx, out, &items, target.year(), target.month())
        }
        Command::Format { date } => ctx.renderer.write_formats(out, &date),
    }
}

fn cmd_index<W: Write>(
    ctx: &CommandContext<'_>,
    out: &mut W,
    items: &[ScheduleItem],
    json: bool,
) -> anyhow::Result<()> {
    let index = index_by_date(items);
    if json {
        return ctx.renderer.write_json(out, &index);
    }
    ctx.renderer.write_index(out, &index)
}

fn cmd_agenda<W: Write>(
    ctx: &CommandContext<'_>,
    out: &mut W,
    items: &[ScheduleItem],
    date: &str,
    json: bool,
) -> anyhow::Result<()> {
    let day = items_for_date(items, date);
    debug!(date, matched = day.len(), "agenda resolved");
    if json {
        return ctx.renderer.write_json(out, &day);
    }
    ctx.renderer.write_agenda(out, date, &day)
}

fn cmd_month<W: Write>(
    ctx: &CommandContext<'_>,
    out: &mut W,
    items: &[ScheduleItem],
    year: i32,
    month: u32,
) -> anyhow::Result<()> {
    let index = index_by_date(items);
    let grid = MonthGrid::build(year, month, ctx.cfg.week_start, &index)
        .with_context(|| format!("failed to build calendar for {year}-{month:02}"))?;
    ctx.renderer.write_month(out, &grid, ctx.today)
}
