//! Final report output.

use std::fmt::Write;

use cutoff_config::ReportFormat;
use cutoff_types::BatchReport;

pub fn render(report: &BatchReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => {
            let mut out = serde_json::to_string_pretty(report)?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn render_text(report: &BatchReport) -> String {
    let mut out = String::new();
    for record in &report.records {
        let _ = writeln!(out, "{record}");
    }
    let _ = writeln!(
        out,
        "{}; {} of {} records fully completed",
        report.stop,
        report.fully_completed_count(),
        report.total_records
    );
    out
}
