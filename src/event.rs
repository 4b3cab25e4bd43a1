use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A tracked deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Positive identifier assigned by the store on insert.
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
}

impl Event {
    pub fn new(id: i64, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            date,
        }
    }

    pub fn draft(&self) -> EventDraft {
        EventDraft::new(self.name.clone(), self.date)
    }
}

/// An event that has not been stored yet and therefore carries no id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub date: NaiveDate,
}

impl EventDraft {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
        }
    }

    pub fn with_id(self, id: i64) -> Event {
        Event {
            id,
            name: self.name,
            date: self.date,
        }
    }
}

/// A single calendar date excluded from business-day counting, e.g. a holiday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonWorkingDay {
    pub id: i64,
    /// Free-form label; may be empty.
    pub name: String,
    pub date: NaiveDate,
}

impl NonWorkingDay {
    pub fn new(id: i64, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id,
            name: name.into(),
            date,
        }
    }

    pub fn draft(&self) -> NonWorkingDayDraft {
        NonWorkingDayDraft::new(self.name.clone(), self.date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonWorkingDayDraft {
    pub name: String,
    pub date: NaiveDate,
}

impl NonWorkingDayDraft {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            date,
        }
    }

    pub fn with_id(self, id: i64) -> NonWorkingDay {
        NonWorkingDay {
            id,
            name: self.name,
            date: self.date,
        }
    }
}
