use chrono::{DateTime, Utc};
use colored::Colorize;
use inmovia_store::commands::{CmdMessage, MessageLevel};
use inmovia_store::config::StoreConfig;
use inmovia_store::model::{lenient, record_id, Record, CREATED_AT_FIELD, UPDATED_AT_FIELD};
use serde_json::Value;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 38;

/// Fields tried, in order, to give a record a human label.
const LABEL_FIELDS: [&str; 8] = [
    "nombre", "titulo", "title", "name", "username", "email", "text", "period",
];

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub fn eprint_messages(messages: &[CmdMessage]) {
    for message in messages {
        eprintln!("{}", message.content);
    }
}

pub fn print_json<T: serde::Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_full_records(records: &[Record]) -> serde_json::Result<()> {
    for (i, record) in records.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} {}",
            record_id(record).unwrap_or("?").yellow(),
            record_label(record).bold()
        );
        println!("--------------------------------");
        println!("{}", serde_json::to_string_pretty(record)?);
    }
    Ok(())
}

pub fn print_records(records: &[Record]) {
    for record in records {
        let id = record_id(record).unwrap_or("?");
        let id_display = format!("{:<width$}", id, width = ID_WIDTH);

        let available = LINE_WIDTH.saturating_sub(ID_WIDTH + TIME_WIDTH + 2);
        let label = truncate_to_width(&record_label(record), available);
        let padding = available.saturating_sub(label.width());

        let time_ago = record_time(record)
            .map(format_time_ago)
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));

        println!(
            "{} {}{} {}",
            id_display.yellow(),
            label,
            " ".repeat(padding),
            time_ago.dimmed()
        );
    }
}

pub fn print_collections(names: &[String]) {
    for name in names {
        println!("{}", name);
    }
}

pub fn print_config(config: &StoreConfig) {
    for key in StoreConfig::KEYS {
        if let Some(value) = config.get(key) {
            println!("{} = {}", key, value);
        }
    }
}

fn record_label(record: &Record) -> String {
    let mut parts = Vec::new();
    for field in LABEL_FIELDS {
        if let Some(Value::String(text)) = record.get(field) {
            if !text.is_empty() {
                parts.push(text.replace('\n', " "));
            }
        }
        if parts.len() == 2 {
            break;
        }
    }
    parts.join(" · ")
}

fn record_time(record: &Record) -> Option<DateTime<Utc>> {
    [UPDATED_AT_FIELD, CREATED_AT_FIELD]
        .iter()
        .filter_map(|field| record.get(*field)?.as_str())
        .find_map(lenient::parse_datetime)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0;

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }

    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
