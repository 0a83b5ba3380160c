use tracing::{debug, warn};

use crate::datetime::minutes_since_midnight;
use crate::schedule::ScheduleItem;

/// Sort key for one day's items. Parsable times order by minutes since
/// midnight; unparsable times sort after all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimeSlot {
    At(u32),
    Unscheduled,
}

fn time_slot(item: &ScheduleItem) -> TimeSlot {
    match minutes_since_midnight(&item.time) {
        Some(minutes) => TimeSlot::At(minutes),
        None => {
            warn!(id = %item.id, time = %item.time, "unparsable item time; ordering it last");
            TimeSlot::Unscheduled
        }
    }
}

/// Items dated `date_key`, earliest first.
///
/// The sort is stable: items with equal times, and items whose time could
/// not be parsed, keep their input order.
#[tracing::instrument(skip(items), fields(items = items.len()))]
pub fn items_for_date<'a>(items: &'a [ScheduleItem], date_key: &str) -> Vec<&'a ScheduleItem> {
    let mut day: Vec<(TimeSlot, &ScheduleItem)> = items
        .iter()
        .filter(|item| item.date == date_key)
        .map(|item| (time_slot(item), item))
        .collect();

    day.sort_by_key(|(slot, _)| *slot);

    debug!(matched = day.len(), "collected items for date");
    day.into_iter().map(|(_, item)| item).collect()
}
