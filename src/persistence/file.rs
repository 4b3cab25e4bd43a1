use super::{PersistenceError, PersistenceResult};
use crate::exchange::{self, DAYS_FIELD, EVENTS_FIELD, ExchangeData};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs::{self, File};
use std::path::Path;

pub fn save_exchange_to_json<P: AsRef<Path>>(data: &ExchangeData, path: P) -> PersistenceResult<()> {
    let text = exchange::serialize_export(data)?;
    fs::write(path, text)?;
    Ok(())
}

pub fn load_exchange_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<ExchangeData> {
    let text = fs::read_to_string(path)?;
    Ok(exchange::parse_import(&text)?)
}

/// One CSV line per record; `kind` tells events and non-working days apart.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ExchangeCsvRecord {
    kind: String,
    id: String,
    name: String,
    date: String,
}

impl ExchangeCsvRecord {
    fn into_json(self) -> Value {
        let id = match self.id.trim().parse::<i64>() {
            Ok(id) => Value::from(id),
            Err(_) => Value::String(self.id),
        };
        json!({ "id": id, "name": self.name, "date": self.date })
    }
}

pub fn save_exchange_to_csv<P: AsRef<Path>>(data: &ExchangeData, path: P) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for event in &data.events {
        writer.serialize(ExchangeCsvRecord {
            kind: EVENTS_FIELD.to_string(),
            id: event.id.to_string(),
            name: event.name.clone(),
            date: event.date.format("%Y-%m-%d").to_string(),
        })?;
    }
    for day in &data.days {
        writer.serialize(ExchangeCsvRecord {
            kind: DAYS_FIELD.to_string(),
            id: day.id.to_string(),
            name: day.name.clone(),
            date: day.date.format("%Y-%m-%d").to_string(),
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Rows are reassembled into the JSON exchange shape so CSV input passes the same validator.
pub fn load_exchange_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<ExchangeData> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut events = Vec::new();
    let mut days = Vec::new();
    for record in reader.deserialize::<ExchangeCsvRecord>() {
        let record = record?;
        match record.kind.trim() {
            EVENTS_FIELD => events.push(record.into_json()),
            DAYS_FIELD => days.push(record.into_json()),
            other => {
                return Err(PersistenceError::InvalidData(format!(
                    "unknown record kind '{other}' (expected '{EVENTS_FIELD}' or '{DAYS_FIELD}')"
                )));
            }
        }
    }
    let raw = json!({ EVENTS_FIELD: events, DAYS_FIELD: days });
    Ok(exchange::validate(&raw)?)
}
