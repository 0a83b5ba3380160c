use std::collections::BTreeMap;

use tracing::debug;

use crate::schedule::ScheduleItem;

/// Items grouped by their date key. Every group is non-empty and keeps the
/// input order of its items.
pub type DateIndex<'a> = BTreeMap<&'a str, Vec<&'a ScheduleItem>>;

/// Groups `items` by their `date` key.
///
/// Keys are used verbatim, so a malformed date still forms its own group.
#[tracing::instrument(skip_all, fields(items = items.len()))]
pub fn index_by_date(items: &[ScheduleItem]) -> DateIndex<'_> {
    let mut index: DateIndex<'_> = BTreeMap::new();
    for item in items {
        index.entry(item.date.as_str()).or_default().push(item);
    }

    debug!(dates = index.len(), "indexed schedule items by date");
    index
}

pub fn indexed_item_count(index: &DateIndex<'_>) -> usize {
    index.values().map(Vec::len).sum()
}
