use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::Context;
use tracing::info;

use crate::schedule::ScheduleItem;

/// Reads a JSON array of schedule items. A path of `-` reads stdin.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_items(path: &Path) -> anyhow::Result<Vec<ScheduleItem>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read schedule items from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };

    let items = parse_items(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    info!(count = items.len(), "loaded schedule items");
    Ok(items)
}

pub fn parse_items(text: &str) -> anyhow::Result<Vec<ScheduleItem>> {
    if text.trim().is_empty() {
        return Ok(vec![]);
    }
    Ok(serde_json::from_str(text)?)
}
