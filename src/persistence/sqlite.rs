use super::{Batch, EntityKind, EntityStore, PersistenceError, PersistenceResult};
use crate::entity_validation::{validate_day, validate_event, validate_event_draft};
use crate::event::{Event, EventDraft, NonWorkingDay, NonWorkingDayDraft};
use crate::exchange::parse_calendar_date;
use chrono::NaiveDate;
use log::{error, info, warn};
use rusqlite::{Connection, params};
use std::path::Path;

/// SQLite-backed store. `AUTOINCREMENT` keeps removed ids from being handed out again.
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        info!("event=db_open module=sqlite status=start mode=file");
        let connection = Connection::open(path).map_err(|err| {
            error!("event=db_open module=sqlite status=error mode=file error={err}");
            err
        })?;
        Self::from_connection(connection)
    }

    pub fn open_in_memory() -> PersistenceResult<Self> {
        info!("event=db_open module=sqlite status=start mode=memory");
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        info!("event=db_open module=sqlite status=ok");
        Ok(Self { connection })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS days (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                date TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_events_date ON events(date);
            CREATE INDEX IF NOT EXISTS idx_days_date ON days(date);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn list_rows(&self, table: &str) -> PersistenceResult<Vec<(i64, String, NaiveDate)>> {
        let mut stmt = self
            .connection
            .prepare(&format!("SELECT id, name, date FROM {table} ORDER BY id ASC"))?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, name, date) = row?;
            let date = parse_calendar_date(&date).ok_or_else(|| {
                PersistenceError::InvalidData(format!("{table} row {id} has invalid date '{date}'"))
            })?;
            records.push((id, name, date));
        }
        Ok(records)
    }

    fn insert_row(&self, table: &str, name: &str, date: NaiveDate) -> PersistenceResult<i64> {
        self.connection.execute(
            &format!("INSERT INTO {table} (name, date) VALUES (?1, ?2)"),
            params![name, format_date(date)],
        )?;
        Ok(self.connection.last_insert_rowid())
    }

    fn update_row(
        &self,
        table: &str,
        kind: EntityKind,
        id: i64,
        name: &str,
        date: NaiveDate,
    ) -> PersistenceResult<()> {
        let changed = self.connection.execute(
            &format!("UPDATE {table} SET name = ?1, date = ?2 WHERE id = ?3"),
            params![name, format_date(date), id],
        )?;
        if changed == 0 {
            return Err(PersistenceError::NotFound { kind, id });
        }
        Ok(())
    }

    fn delete_row(&self, table: &str, id: i64) -> PersistenceResult<bool> {
        let changed = self
            .connection
            .execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
        Ok(changed > 0)
    }
}

impl EntityStore for SqliteStore {
    fn list_events(&self) -> PersistenceResult<Vec<Event>> {
        Ok(self
            .list_rows("events")?
            .into_iter()
            .map(|(id, name, date)| Event::new(id, name, date))
            .collect())
    }

    fn insert_event(&mut self, draft: EventDraft) -> PersistenceResult<Event> {
        validate_event_draft(&draft)?;
        let id = self.insert_row("events", &draft.name, draft.date)?;
        Ok(draft.with_id(id))
    }

    fn update_event(&mut self, event: &Event) -> PersistenceResult<()> {
        validate_event(event)?;
        self.update_row("events", EntityKind::Event, event.id, &event.name, event.date)
    }

    fn remove_event(&mut self, id: i64) -> PersistenceResult<bool> {
        self.delete_row("events", id)
    }

    fn list_days(&self) -> PersistenceResult<Vec<NonWorkingDay>> {
        Ok(self
            .list_rows("days")?
            .into_iter()
            .map(|(id, name, date)| NonWorkingDay::new(id, name, date))
            .collect())
    }

    fn insert_day(&mut self, draft: NonWorkingDayDraft) -> PersistenceResult<NonWorkingDay> {
        let id = self.insert_row("days", &draft.name, draft.date)?;
        Ok(draft.with_id(id))
    }

    fn update_day(&mut self, day: &NonWorkingDay) -> PersistenceResult<()> {
        validate_day(day)?;
        self.update_row("days", EntityKind::NonWorkingDay, day.id, &day.name, day.date)
    }

    fn remove_day(&mut self, id: i64) -> PersistenceResult<bool> {
        self.delete_row("days", id)
    }

    fn in_transaction(&mut self, batch: &mut Batch<'_>) -> PersistenceResult<()> {
        // Nested batches join the transaction that is already open.
        if !self.connection.is_autocommit() {
            return batch(&mut *self);
        }
        self.connection.execute_batch("BEGIN IMMEDIATE")?;
        let outcome = batch(&mut *self)
            .and_then(|()| self.connection.execute_batch("COMMIT").map_err(Into::into));
        if let Err(err) = &outcome {
            warn!("event=transaction module=sqlite status=rollback error={err}");
            if !self.connection.is_autocommit() {
                if let Err(rollback) = self.connection.execute_batch("ROLLBACK") {
                    error!("event=transaction module=sqlite status=rollback_failed error={rollback}");
                }
            }
        }
        outcome
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
