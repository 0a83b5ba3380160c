use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ItemKind {
    #[serde(rename = "Lead call")]
    LeadCall,
    #[serde(rename = "Internal meeting")]
    InternalMeeting,
    #[serde(rename = "Reminder")]
    Reminder,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::LeadCall => "Lead call",
            ItemKind::InternalMeeting => "Internal meeting",
            ItemKind::Reminder => "Reminder",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub name: String,
    pub product_count: u32,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
}

/// One calendar entry as supplied by the caller.
///
/// `date` is a `YYYY-MM-DD` key and `time` a 12-hour clock string such as
/// `"9:00 PM"`. Neither is validated on construction; grouping and ordering
/// degrade gracefully when they are malformed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleItem {
    #[serde(default = "new_item_id")]
    pub id: String,

    pub date: String,

    pub time: String,

    #[serde(rename = "type")]
    pub kind: ItemKind,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deal: Option<Deal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
}

impl ScheduleItem {
    pub fn new(
        date: impl Into<String>,
        time: impl Into<String>,
        kind: ItemKind,
        title: impl Into<String>,
    ) -> Self {
        Self {
            id: new_item_id(),
            date: date.into(),
            time: time.into(),
            kind,
            title: title.into(),
            deal: None,
            contact: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_deal(mut self, deal: Deal) -> Self {
        self.deal = Some(deal);
        self
    }

    pub fn with_contact(mut self, contact: Contact) -> Self {
        self.contact = Some(contact);
        self
    }
}

fn new_item_id() -> String {
    Uuid::new_v4().to_string()
}
