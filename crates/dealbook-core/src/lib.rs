pub mod agenda;
pub mod calendar;
pub mod cli;
pub mod commands;
pub mod config;
pub mod datetime;
pub mod index;
pub mod render;
pub mod schedule;
pub mod source;

use std::ffi::OsString;
use std::io;

use chrono::Utc;
use clap::Parser;
use tracing::{
  debug,
  info
};

pub use agenda::items_for_date;
pub use datetime::{
  format_long_date,
  format_numeric_date,
  format_short_date
};
pub use index::{
  DateIndex,
  index_by_date
};
pub use schedule::{
  Contact,
  Deal,
  ItemKind,
  ScheduleItem
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting dealbook CLI"
  );

  let cfg = config::Config::load(
    cli.config.as_deref()
  )?;
  debug!(loaded = ?cfg.loaded_file, "config ready");

  let renderer =
    render::Renderer::new(&cfg);
  let ctx = commands::CommandContext {
    cfg:      &cfg,
    renderer: &renderer,
    today:    datetime::today_in(
      cfg.timezone,
      Utc::now()
    )
  };

  let mut out = io::stdout().lock();
  commands::dispatch(
    &ctx,
    &mut out,
    cli.items.as_deref(),
    cli.command
  )?;

  info!("done");
  Ok(())
}
