use business_days::{
    AppConfig, DynStore, Event, EventDraft, ImportStrategy, NonWorkingDay, NonWorkingDayDraft,
    ResultQuery, ResultSummary, Tracker, load_exchange_from_csv, logging, open_store,
    results::rows_to_dataframe, save_exchange_to_csv, save_exchange_to_json,
};
use chrono::{Local, NaiveDate};
use polars::prelude::{AnyValue, DataFrame};
use std::fs;
use std::io::{self, Write};

struct Session {
    tracker: Tracker<DynStore>,
    today_override: Option<NaiveDate>,
    search: String,
    minimum_business_days: i64,
}

impl Session {
    fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn query(&self) -> ResultQuery {
        ResultQuery::new(self.search.clone(), self.minimum_business_days)
    }
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(true) => "AT RISK".to_string(),
        AnyValue::Boolean(false) => String::new(),
        other => other.to_string(),
    }
}

fn render_df_as_text_table(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let col_names: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();

    let mut cells: Vec<Vec<String>> = Vec::with_capacity(df.height());
    for row_idx in 0..df.height() {
        let row = columns
            .iter()
            .map(|col| col.get(row_idx).map(|av| cell_text(&av)).unwrap_or_default())
            .collect::<Vec<_>>();
        cells.push(row);
    }

    let mut widths: Vec<usize> = col_names.iter().map(|n| n.len()).collect();
    for row in &cells {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }

    let render_row = |values: &[String]| {
        let mut line = String::from("|");
        for (ci, value) in values.iter().enumerate() {
            let pad = widths[ci].saturating_sub(value.chars().count());
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(pad));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&col_names));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in &cells {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show business days left per event\n  events                             List events\n  days                               List non-working days\n  add-event <YYYY-MM-DD> <name...>   Add an event\n  edit-event <id> <YYYY-MM-DD> <name...>\n                                     Replace an event's date and name\n  delete-event <id>                  Delete an event\n  add-day <YYYY-MM-DD> [name...]     Add a non-working day\n  edit-day <id> <YYYY-MM-DD> [name...]\n                                     Replace a non-working day's date and name\n  delete-day <id>                    Delete a non-working day\n  search [text...]                   Filter results by name (no text clears)\n  min <n>                            Flag results at or below n business days\n  today [<YYYY-MM-DD>|reset]         Show or pin the reference date\n  import <path> [strategy]           Import JSON data (append|replace|skip_duplicates)\n  export <path>                      Export all data as JSON\n  save csv <path>                    Export all data as CSV\n  load csv <path> [strategy]         Import CSV data\n  quit|exit                          Exit"
    );
}

fn print_results(session: &Session) {
    let today = session.today();
    let rows = match session.tracker.view(today, &session.query()) {
        Ok(rows) => rows,
        Err(e) => {
            println!("Error computing results: {e}");
            return;
        }
    };
    println!(
        "Today: {today} | search: '{}' | minimum: {}",
        session.search, session.minimum_business_days
    );
    match rows_to_dataframe(&rows) {
        Ok(df) => println!("{}", render_df_as_text_table(&df)),
        Err(e) => println!("Error rendering results: {e}"),
    }
    println!("Summary: {}", ResultSummary::from_rows(&rows).to_cli_summary());
}

fn print_events(events: &[Event]) {
    if events.is_empty() {
        println!("No events.");
    }
    for event in events {
        println!("  #{:<4} {}  {}", event.id, event.date, event.name);
    }
}

fn print_days(days: &[NonWorkingDay]) {
    if days.is_empty() {
        println!("No non-working days.");
    }
    for day in days {
        println!("  #{:<4} {}  {}", day.id, day.date, day.name);
    }
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    business_days::exchange::parse_calendar_date(input)
}

fn parse_strategy(input: Option<&str>) -> Result<ImportStrategy, String> {
    match input {
        Some(raw) => raw.parse::<ImportStrategy>(),
        None => Ok(ImportStrategy::default()),
    }
}

fn rest_of_line<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(" ")
}

fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    if let Err(e) = logging::init_logging(&config.log_level, config.log_dir.as_deref()) {
        eprintln!("Logging disabled: {e}");
    }
    let store = match open_store(config.db_path.as_deref()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Could not open store: {e}");
            std::process::exit(1);
        }
    };

    let mut session = Session {
        tracker: Tracker::new(store),
        today_override: None,
        search: String::new(),
        minimum_business_days: config.minimum_business_days,
    };

    println!("Business Days To Go (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => print_results(&session),
            "events" => match session.tracker.events() {
                Ok(events) => print_events(&events),
                Err(e) => println!("Error: {e}"),
            },
            "days" => match session.tracker.days() {
                Ok(days) => print_days(&days),
                Err(e) => println!("Error: {e}"),
            },
            "add-event" => {
                let Some(date) = parts.next().and_then(parse_date) else {
                    println!("Usage: add-event <YYYY-MM-DD> <name...>");
                    continue;
                };
                let name = rest_of_line(parts);
                match session.tracker.add_event(EventDraft::new(name, date)) {
                    Ok(event) => println!("Added event #{} '{}' on {}.", event.id, event.name, event.date),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "edit-event" => {
                let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                let date = parts.next().and_then(parse_date);
                let (Some(id), Some(date)) = (id, date) else {
                    println!("Usage: edit-event <id> <YYYY-MM-DD> <name...>");
                    continue;
                };
                let event = Event::new(id, rest_of_line(parts), date);
                match session.tracker.update_event(&event) {
                    Ok(()) => println!("Updated event #{id}."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete-event" => match parts.next().map(|s| s.parse::<i64>()) {
                Some(Ok(id)) => match session.tracker.delete_event(id) {
                    Ok(true) => println!("Deleted event #{id}."),
                    Ok(false) => println!("Event #{id} not found."),
                    Err(e) => println!("Error deleting event: {e}"),
                },
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: delete-event <id>"),
            },
            "add-day" => {
                let Some(date) = parts.next().and_then(parse_date) else {
                    println!("Usage: add-day <YYYY-MM-DD> [name...]");
                    continue;
                };
                let name = rest_of_line(parts);
                match session.tracker.add_day(NonWorkingDayDraft::new(name, date)) {
                    Ok(day) => println!("Added non-working day #{} on {}.", day.id, day.date),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "edit-day" => {
                let id = parts.next().and_then(|s| s.parse::<i64>().ok());
                let date = parts.next().and_then(parse_date);
                let (Some(id), Some(date)) = (id, date) else {
                    println!("Usage: edit-day <id> <YYYY-MM-DD> [name...]");
                    continue;
                };
                let day = NonWorkingDay::new(id, rest_of_line(parts), date);
                match session.tracker.update_day(&day) {
                    Ok(()) => println!("Updated non-working day #{id}."),
                    Err(e) => println!("Error: {e}"),
                }
            }
            "delete-day" => match parts.next().map(|s| s.parse::<i64>()) {
                Some(Ok(id)) => match session.tracker.delete_day(id) {
                    Ok(true) => println!("Deleted non-working day #{id}."),
                    Ok(false) => println!("Non-working day #{id} not found."),
                    Err(e) => println!("Error deleting non-working day: {e}"),
                },
                Some(Err(_)) => println!("Invalid id"),
                None => println!("Usage: delete-day <id>"),
            },
            "search" => {
                session.search = rest_of_line(parts);
                if session.search.is_empty() {
                    println!("Search cleared.");
                } else {
                    println!("Search set to '{}'.", session.search);
                }
            }
            "min" => match parts.next().map(|s| s.parse::<i64>()) {
                Some(Ok(value)) => {
                    session.minimum_business_days = value;
                    println!("Minimum business days set to {value}.");
                }
                Some(Err(_)) => println!("Invalid integer"),
                None => println!("Usage: min <n>"),
            },
            "today" => match parts.next() {
                None => println!("Today: {}", session.today()),
                Some("reset") => {
                    session.today_override = None;
                    println!("Today reset to {}.", session.today());
                }
                Some(raw) => match parse_date(raw) {
                    Some(date) => {
                        session.today_override = Some(date);
                        println!("Today pinned to {date}.");
                    }
                    None => println!("Invalid date (YYYY-MM-DD)"),
                },
            },
            "import" => {
                let Some(path) = parts.next() else {
                    println!("Usage: import <path> [strategy]");
                    continue;
                };
                let strategy = match parse_strategy(parts.next()) {
                    Ok(strategy) => strategy,
                    Err(e) => {
                        println!("{e}");
                        continue;
                    }
                };
                let text = match fs::read_to_string(path) {
                    Ok(text) => text,
                    Err(e) => {
                        println!("An error occurred while reading the file: {e}");
                        continue;
                    }
                };
                match session
                    .tracker
                    .import_text(&text, strategy.importer().as_ref())
                {
                    Ok(report) => println!(
                        "Data imported successfully ({strategy}: {}).",
                        report.to_cli_summary()
                    ),
                    Err(e) => println!("Import failed: {e}"),
                }
            }
            "export" => {
                let Some(path) = parts.next() else {
                    println!("Usage: export <path>");
                    continue;
                };
                match session
                    .tracker
                    .export_data()
                    .and_then(|data| save_exchange_to_json(&data, path))
                {
                    Ok(()) => println!("Data exported to {path}."),
                    Err(e) => println!("Export failed: {e}"),
                }
            }
            "save" | "load" => {
                let format = parts.next();
                let path = parts.next();
                let (Some("csv"), Some(path)) = (format, path) else {
                    println!("Usage: {cmd} csv <path>");
                    continue;
                };
                if cmd == "save" {
                    match session
                        .tracker
                        .export_data()
                        .and_then(|data| save_exchange_to_csv(&data, path))
                    {
                        Ok(()) => println!("Data saved to {path}."),
                        Err(e) => println!("Save failed: {e}"),
                    }
                } else {
                    let strategy = match parse_strategy(parts.next()) {
                        Ok(strategy) => strategy,
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    };
                    match load_exchange_from_csv(path).and_then(|data| {
                        session
                            .tracker
                            .import_data(data, strategy.importer().as_ref())
                    }) {
                        Ok(report) => println!(
                            "Data loaded from {path} ({strategy}: {}).",
                            report.to_cli_summary()
                        ),
                        Err(e) => println!("Load failed: {e}"),
                    }
                }
            }
            other => println!("Unknown command '{other}'. Type 'help' for commands."),
        }
    }
}
