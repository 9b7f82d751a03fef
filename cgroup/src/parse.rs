//! Parsers for the cgroup v2 memory pseudo-files.
//
//  Pure functions over readers so they can be fed byte slices in tests.

use std::io::BufRead;

use tracing::debug;

use crate::model::{CounterSnapshot, PressureStats};

/// `memory.current`: a single unsigned byte count.
pub fn parse_usage<R: BufRead>(reader: R) -> Option<u64> {
    let first_line = reader.lines().next()?.ok()?;
    first_line.trim().parse().ok()
}

/// Extract the `some` line of a PSI file.
///
/// Expected shape: `some avg10=0.12 avg60=0.05 avg300=0.01 total=123456`.
/// The `full` line, if any, is ignored.
pub fn parse_pressure_some<R: BufRead>(reader: R) -> Option<PressureStats> {
    reader
        .lines()
        .map_while(Result::ok)
        .find_map(|line| parse_some_line(&line))
}

fn parse_some_line(line: &str) -> Option<PressureStats> {
    let mut tokens = line.split_whitespace();
    if tokens.next()? != "some" {
        return None;
    }

    let avg10 = tokens.next()?.strip_prefix("avg10=")?.parse().ok()?;
    let avg60 = tokens.next()?.strip_prefix("avg60=")?.parse().ok()?;
    let avg300 = tokens.next()?.strip_prefix("avg300=")?.parse().ok()?;
    let total = tokens.next()?.strip_prefix("total=")?.parse().ok()?;

    Some(PressureStats {
        avg10,
        avg60,
        avg300,
        total,
    })
}

/// Pick the reclaim counters out of `memory.stat`.
///
/// Keys that are absent stay at zero. Lines that are not `key value`
/// are skipped.
pub fn parse_counter_snapshot<R: BufRead>(reader: R) -> CounterSnapshot {
    let mut snap = CounterSnapshot::default();

    for line in reader.lines().map_while(Result::ok) {
        let mut tokens = line.split_whitespace();
        let (Some(key), Some(raw)) = (tokens.next(), tokens.next()) else {
            if !line.trim().is_empty() {
                debug!(line = %line, "skipping malformed memory.stat line");
            }
            continue;
        };

        let Ok(value) = raw.parse::<u64>() else {
            debug!(line = %line, "skipping memory.stat line with non-numeric value");
            continue;
        };

        match key {
            "pgscan" => snap.pgscan = value,
            "pgsteal" => snap.pgsteal = value,
            "workingset_activate_anon" => snap.refault_anon = value,
            "workingset_activate_file" => snap.refault_file = value,
            "pswpin" => snap.pswpin = value,
            "pswpout" => snap.pswpout = value,
            _ => {}
        }
    }

    snap
}
