//! Per-tick CSV trace of a simulation run.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::engine::TickReport;

#[derive(Debug, Serialize)]
struct TraceRow<'a> {
    scenario: &'a str,
    tick: u64,
    elapsed: f64,
    used: f64,
    maximum: f64,
    bonus_percent: f64,
    skills_advanced: usize,
    failures: usize,
}

/// Writes one row per tick, with a header.
pub fn write_trace<W: Write>(
    writer: W,
    scenario: &str,
    reports: &[TickReport],
) -> Result<(), csv::Error> {
    write_traces(writer, [(scenario, reports)])
}

/// Several runs in one table, distinguished by the `scenario` column.
pub fn write_traces<'a, W, I>(writer: W, runs: I) -> Result<(), csv::Error>
where
    W: Write,
    I: IntoIterator<Item = (&'a str, &'a [TickReport])>,
{
    let mut csv = csv::Writer::from_writer(writer);
    for (scenario, reports) in runs {
        for report in reports {
            csv.serialize(TraceRow {
                scenario,
                tick: report.tick,
                elapsed: report.elapsed,
                used: report.budget.used,
                maximum: report.budget.maximum,
                bonus_percent: report.budget.bonus_percent,
                skills_advanced: report.skills_advanced,
                failures: report.failures.len(),
            })?;
        }
    }
    csv.flush()?;
    Ok(())
}

pub fn trace_to_string(scenario: &str, reports: &[TickReport]) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_trace(&mut buffer, scenario, reports)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

pub fn write_trace_file<'a, I>(path: impl AsRef<Path>, runs: I) -> Result<(), csv::Error>
where
    I: IntoIterator<Item = (&'a str, &'a [TickReport])>,
{
    write_traces(File::create(path)?, runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BudgetSnapshot;

    #[test]
    fn one_row_per_tick_with_header() {
        let report = TickReport {
            tick: 1,
            elapsed: 1.0,
            dt: 1.0,
            skills_advanced: 2,
            budget: BudgetSnapshot {
                used: 150.0,
                maximum: 120.0,
                bonus_percent: 87.5,
                max_bonus: 100.0,
            },
            failures: vec![],
        };
        let out = trace_to_string("e2e", &[report]).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("scenario,tick,elapsed,used,maximum,bonus_percent,skills_advanced,failures")
        );
        assert_eq!(lines.next(), Some("e2e,1,1.0,150.0,120.0,87.5,2,0"));
        assert_eq!(lines.next(), None);
    }
}
