#![allow(dead_code)]

use log_search::record::parse_created;
use log_search::LogRecord;
use std::path::{Path, PathBuf};

pub const FIXTURE_SIZE: usize = 100;
pub const CHROME_COUNT: usize = 27;

const COUNTRIES: [&str; 7] = [
    "Italy",
    "Germany",
    "Philippines",
    "France",
    "Spain",
    "Brazil",
    "Japan",
];

fn browser_for(idx: usize) -> &'static str {
    match idx {
        0..27 => "Chrome",
        27..45 => "Safari",
        45..70 => "Firefox",
        70..88 => "IE",
        _ => "Edge",
    }
}

fn message_for(idx: usize) -> String {
    match idx % 9 {
        0 => format!("Stacktrace at line {idx}"),
        4 => format!("TypeError: x is undefined (see stacktrace {idx})"),
        _ => "Page loaded".to_string(),
    }
}

/// 100 log records with ids 1..=100, stored in scrambled id order.
/// Exactly 27 have browser "Chrome".
pub fn fixture() -> Vec<LogRecord> {
    (0..FIXTURE_SIZE)
        .map(|step| (step * 37) % FIXTURE_SIZE)
        .map(|idx| LogRecord {
            id: idx as i64 + 1,
            browser: browser_for(idx).to_string(),
            page_url: format!("https://shop.example.com/page/{}", idx % 5),
            country: COUNTRIES[(idx * 3) % COUNTRIES.len()].to_string(),
            message: message_for(idx),
            created: parse_created(&format!("2018-06-{:02} 10:{:02}:00", idx % 28 + 1, idx % 60))
                .expect("valid fixture timestamp"),
        })
        .collect()
}

/// Ids of fixture records satisfying `keep`, ascending
pub fn expected_ids(keep: impl Fn(&LogRecord) -> bool) -> Vec<i64> {
    let mut ids: Vec<i64> = fixture().iter().filter(|r| keep(r)).map(|r| r.id).collect();
    ids.sort_unstable();
    ids
}

pub fn ids(records: &[LogRecord]) -> Vec<i64> {
    records.iter().map(|r| r.id).collect()
}

/// Write the fixture as a JSON record file in `dir`
pub fn write_fixture(dir: &Path) -> PathBuf {
    let path = dir.join("logs.json");
    let rows: Vec<_> = fixture().iter().map(LogRecord::to_flat_json).collect();
    std::fs::write(&path, serde_json::to_string_pretty(&rows).expect("serialize fixture"))
        .expect("failed to write fixture file");
    path
}
