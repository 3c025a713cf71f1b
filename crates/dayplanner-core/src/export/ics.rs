//! iCalendar (RFC 5545) export.
//!
//! Blocks carry naive wall-clock times; the caller names the zone they are
//! in and every timestamp is written in UTC basic format (`YYYYMMDDTHHMMSSZ`).

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use crate::schedule::ScheduleBlock;

const PRODID: &str = "-//dayplanner//dayplanner//EN";
/// Maximum octets per content line, excluding the CRLF.
const MAX_LINE_OCTETS: usize = 75;

/// Render `blocks` as a VCALENDAR with one VEVENT per block.
///
/// `stamp` becomes every event's `DTSTAMP`.
pub fn to_ics<Tz: TimeZone>(blocks: &[ScheduleBlock], tz: &Tz, stamp: DateTime<Utc>) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, &format!("PRODID:{PRODID}"));
    push_line(&mut out, "CALSCALE:GREGORIAN");

    for block in blocks {
        let start = to_utc(tz, block.start);
        let end = to_utc(tz, block.end);

        push_line(&mut out, "BEGIN:VEVENT");
        push_line(
            &mut out,
            &format!("UID:{}-{}@dayplanner", block.task_id, format_utc(start)),
        );
        push_line(&mut out, &format!("DTSTAMP:{}", format_utc(stamp)));
        push_line(&mut out, &format!("DTSTART:{}", format_utc(start)));
        push_line(&mut out, &format!("DTEND:{}", format_utc(end)));
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&block.name)));
        push_line(
            &mut out,
            &format!("DESCRIPTION:{}", escape_text(&description(block))),
        );
        push_line(
            &mut out,
            &format!("CATEGORIES:{}", escape_text(block.category.as_str())),
        );
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn description(block: &ScheduleBlock) -> String {
    match block.notes.as_deref().map(str::trim) {
        Some(notes) if !notes.is_empty() => format!("{}\n{notes}", block.category),
        _ => block.category.to_string(),
    }
}

/// Wall-clock time in `tz` to UTC. Ambiguous times take the earlier instant;
/// times skipped by a DST jump are taken as UTC.
fn to_utc<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&naive).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => {
            tracing::warn!(%naive, "local time does not exist in zone; exporting as UTC");
            Utc.from_utc_datetime(&naive)
        }
    }
}

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Escape a TEXT value: backslash, semicolon, comma and newlines.
pub(crate) fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Append `line` folded at 75 octets, never splitting a UTF-8 sequence.
fn push_line(out: &mut String, line: &str) {
    let mut budget = MAX_LINE_OCTETS;
    let mut used = 0;
    for c in line.chars() {
        let width = c.len_utf8();
        if used + width > budget {
            out.push_str("\r\n ");
            // Continuation lines spend one octet on the leading space.
            budget = MAX_LINE_OCTETS - 1;
            used = 0;
        }
        out.push(c);
        used += width;
    }
    out.push_str("\r\n");
}
