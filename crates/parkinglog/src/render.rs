//! Text and JSON rendering of a session.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::api::RecordBackend;
use crate::record::{ParkingRecord, Vehicle};
use crate::session::{Session, ViewState};

/// Shown in place of the history list when there are no records.
pub const EMPTY_HISTORY: &str = "No parking locations recorded yet.";

/// Format a timestamp as month/day hour:minute in the given time zone.
#[must_use]
pub fn format_time_in<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%-m/%-d %H:%M").to_string()
}

/// Format a timestamp as month/day hour:minute in local time.
#[must_use]
pub fn format_time(ts: DateTime<Utc>) -> String {
    format_time_in(ts, &Local)
}

/// Where a record says the car is, e.g. `basement 1 G12`.
#[must_use]
pub fn location(record: &ParkingRecord) -> String {
    format!("{} {}{}", record.floor.level(), record.floor, record.number)
}

/// One history line: `<car> | <level> | <floor><number>  <time>  [<id>]`.
#[must_use]
pub fn history_line(record: &ParkingRecord, time: &str) -> String {
    let car = record.car.map_or("-", Vehicle::as_str);
    format!(
        "{} | {} | {}{}  {}  [{}]",
        car,
        record.floor.level(),
        record.floor,
        record.number,
        time,
        record.id
    )
}

/// Render the history list.
#[must_use]
pub fn history(records: &[ParkingRecord]) -> String {
    if records.is_empty() {
        return format!("{EMPTY_HISTORY}\n");
    }

    let mut out = String::from("Recent parking records\n");
    for record in records {
        out.push_str("  ");
        out.push_str(&history_line(record, &format_time(record.created_at)));
        out.push('\n');
    }
    out
}

/// Render the full view: status line, latest location per vehicle, history.
#[must_use]
pub fn view<B: RecordBackend>(session: &Session<B>) -> String {
    let mut out = String::new();

    match session.state() {
        ViewState::Loading => out.push_str("Loading...\n\n"),
        ViewState::Error(message) => {
            out.push_str("Error: ");
            out.push_str(message);
            out.push_str("\n\n");
        }
        ViewState::Ready => {}
    }

    for vehicle in Vehicle::ALL {
        match session.latest_for(vehicle) {
            Some(record) => {
                out.push_str(&format!("{vehicle} last parked: {}\n", location(record)));
            }
            None => out.push_str(&format!("{vehicle} last parked: -\n")),
        }
    }
    out.push('\n');
    out.push_str(&history(session.records()));
    out
}

/// Serializable snapshot of a session.
#[derive(Debug, Serialize)]
pub struct ViewJson<'a> {
    /// `loading`, `ready` or `error`.
    pub state: &'static str,
    /// Error message when the state is `error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
    /// Most recent record, or the placeholder.
    pub current: &'a ParkingRecord,
    /// Records, newest first.
    pub records: &'a [ParkingRecord],
}

impl<'a> ViewJson<'a> {
    /// Snapshot a session.
    #[must_use]
    pub fn from_session<B: RecordBackend>(session: &'a Session<B>) -> Self {
        let state = match session.state() {
            ViewState::Loading => "loading",
            ViewState::Ready => "ready",
            ViewState::Error(_) => "error",
        };
        Self {
            state,
            error: session.error(),
            current: session.current(),
            records: session.records(),
        }
    }
}
