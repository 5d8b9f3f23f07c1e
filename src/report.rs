//! Report rendering: plain-text log, colored terminal summary, JSON.
//!
//! The text report is a deterministic serialization of already-computed
//! statistics, laid out in fixed sections: configuration, segment
//! descriptions, repetition count, cumulative results, incremental
//! results, and the full duration matrix. When outlier trimming was
//! applied, the statistic sections appear twice, labeled raw and
//! cleaned. Durations are printed in milliseconds; the underlying
//! nanosecond values only become interesting at that granularity.

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use colored::Colorize;
use time::format_description::well_known::Rfc2822;
use time::OffsetDateTime;

use crate::delta::SegmentStatistic;
use crate::pipeline::{AnalysisSet, RunReport};
use crate::stats::StatisticResult;

const SECTION: &str = "#################################";

fn ms(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000.0
}

fn ms_signed(nanos: i64) -> f64 {
    nanos as f64 / 1_000_000.0
}

/// Textual overview of one cumulative result.
pub fn format_statistic(result: &StatisticResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, " Min: {} ms", ms(result.min));
    let _ = writeln!(out, " Max: {} ms", ms(result.max));
    let _ = writeln!(out, " Average: {} ms", ms(result.mean));
    let _ = writeln!(out, " Median: {} ms", ms(result.median));
    let _ = writeln!(out, " 25% Quantile: {} ms", ms(result.q25));
    let _ = writeln!(out, " 75% Quantile: {} ms", ms(result.q75));
    let _ = writeln!(out, " Std Deviation: {} ms", ms(result.std_dev));
    match result.variation_coefficient {
        Some(coefficient) => {
            let _ = writeln!(out, " Variation Coef: {:.3} %", coefficient * 100.0);
        }
        None => {
            let _ = writeln!(out, " Variation Coef: undefined (zero mean)");
        }
    }
    out
}

/// Textual overview of one incremental result.
pub fn format_segment_statistic(segment: &SegmentStatistic) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        " Duration considering Average: {} ms",
        ms_signed(segment.mean_delta)
    );
    let _ = writeln!(
        out,
        " Duration considering Median: {} ms",
        ms_signed(segment.median_delta)
    );
    let _ = writeln!(
        out,
        " Duration Min considering StdDev: {} ms",
        ms_signed(segment.std_dev_bound_low)
    );
    let _ = writeln!(
        out,
        " Duration Max considering StdDev: {} ms",
        ms_signed(segment.std_dev_bound_high)
    );
    let _ = writeln!(
        out,
        " Duration considering Min: {} ms",
        ms_signed(segment.min_delta)
    );
    out
}

fn push_statistic_sections(out: &mut String, label: &str, analysis: &AnalysisSet) {
    let prefix = if label.is_empty() {
        String::new()
    } else {
        format!("{label} ")
    };
    let _ = writeln!(out, "\n{SECTION}");
    let _ = writeln!(
        out,
        "{prefix}Results: Complete duration to the end of each handshake segment."
    );
    for (dataset, result) in analysis.datasets.iter().zip(&analysis.cumulative) {
        let _ = writeln!(out, "\nHandshake Segment {}", dataset.segment_index);
        out.push_str(&format_statistic(result));
    }

    let _ = writeln!(out, "\n{SECTION}");
    let _ = writeln!(
        out,
        "{prefix}Results: Actual duration for each handshake segment."
    );
    for (dataset, segment) in analysis.datasets.iter().zip(&analysis.incremental) {
        let _ = writeln!(out, "\nHandshake Segment {}", dataset.segment_index);
        out.push_str(&format_segment_statistic(segment));
    }
}

fn push_matrix(out: &mut String, label: &str, analysis: &AnalysisSet) {
    let prefix = if label.is_empty() {
        String::new()
    } else {
        format!("{label} ")
    };
    let _ = writeln!(out, "\n{SECTION}");
    let _ = writeln!(out, "{prefix}Detailed Measurement Results");
    for dataset in &analysis.datasets {
        let values: Vec<String> = dataset
            .samples
            .iter()
            .map(|s| s.nanos().to_string())
            .collect();
        let _ = writeln!(
            out,
            "segment {}: [{}]",
            dataset.segment_index,
            values.join(", ")
        );
    }
}

/// Render the full plain-text report, stamped with the current time.
pub fn render(report: &RunReport) -> String {
    render_at(report, OffsetDateTime::now_utc())
}

/// Render the full plain-text report with an explicit timestamp.
pub fn render_at(report: &RunReport, timestamp: OffsetDateTime) -> String {
    let stamp = timestamp
        .format(&Rfc2822)
        .unwrap_or_else(|_| timestamp.unix_timestamp().to_string());

    let mut out = String::new();
    let _ = writeln!(out, "TIME MEASUREMENT RESULTS");
    let _ = writeln!(out, "{stamp}");
    let _ = writeln!(out, "{}", report.variant);

    let _ = writeln!(out, "\n{SECTION}");
    let _ = writeln!(out, "Used Configuration\n");
    out.push_str(&report.config.overview());

    let _ = writeln!(out, "\n{SECTION}");
    let _ = writeln!(out, "Used Handshake Segments\n");
    for segment in &report.segments {
        let marker = if segment.measured { "measured" } else { "skipped" };
        let _ = writeln!(
            out,
            "segment {} ({marker}): {}",
            segment.index, segment.actions
        );
    }

    let _ = writeln!(out, "\n{SECTION}");
    let _ = writeln!(out, "Used Repetitions\n");
    let _ = writeln!(out, "{}", report.repetitions);

    if report.fault_count() > 0 {
        let _ = writeln!(out, "\n{SECTION}");
        let _ = writeln!(
            out,
            "Faulted Repetitions (recorded as zero-duration sentinels)\n"
        );
        let _ = writeln!(out, "{}", report.fault_count());
    }

    match &report.cleaned {
        Some(cleaned) => {
            push_statistic_sections(&mut out, "Raw", &report.raw);
            let _ = writeln!(out, "\n{SECTION}{SECTION}");
            let _ = writeln!(
                out,
                "CLEANED RESULTS (removed top {}% of longest durations)",
                report.outlier_percent
            );
            push_statistic_sections(&mut out, "Cleaned", cleaned);
            push_matrix(&mut out, "Raw", &report.raw);
            push_matrix(&mut out, "Cleaned", cleaned);
        }
        None => {
            push_statistic_sections(&mut out, "", &report.raw);
            push_matrix(&mut out, "", &report.raw);
        }
    }

    out
}

/// Render a short colored summary for the terminal: one line per
/// segment with its marginal mean, plus a fault warning if any
/// repetition failed.
pub fn render_summary(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} {}",
        "measured".bold(),
        report.variant.to_string().bold()
    );

    let analysis = report.cleaned.as_ref().unwrap_or(&report.raw);
    let labels: Vec<&str> = report
        .measured_segments()
        .map(|s| s.label.as_str())
        .collect();
    for (label, (cumulative, incremental)) in labels
        .iter()
        .zip(analysis.cumulative.iter().zip(&analysis.incremental))
    {
        let marginal = format!("{:+.3} ms", ms_signed(incremental.mean_delta));
        let _ = writeln!(
            out,
            "  {label}: {} (cumulative {:.3} ms, \u{00b1}{:.3} ms)",
            marginal.cyan(),
            ms(cumulative.mean),
            ms(cumulative.std_dev)
        );
    }

    let faults = report.fault_count();
    if faults > 0 {
        let _ = writeln!(
            out,
            "  {}",
            format!("{faults} repetition(s) faulted").yellow()
        );
    }
    out
}

/// Serialize the full run report to a compact JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `RunReport`).
pub fn to_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string(report)
}

/// Serialize the full run report to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails (should not happen for
/// `RunReport`).
pub fn to_json_pretty(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Write the plain-text report to a file.
///
/// A sink failure leaves the in-memory report untouched; callers log the
/// error and carry on with the computed statistics.
pub fn write_to(report: &RunReport, path: &Path) -> io::Result<()> {
    fs::write(path, render(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BulkAlgo, HashAlgo, KeyExchange, MeasurementConfig, ServerAuth, TlsVersion,
    };
    use crate::executor::ScriptedExecutor;
    use crate::pipeline::HandshakeProfiler;
    use crate::variant::HandshakeVariant;

    fn sample_report(outlier_percent: u8) -> RunReport {
        let config = MeasurementConfig::new(
            TlsVersion::Tls13,
            KeyExchange::Ecdhe,
            ServerAuth::Ecdsa,
            HashAlgo::Sha256,
            BulkAlgo::Aes128Gcm,
        );
        let mut exec =
            ScriptedExecutor::from_nanos(&[100, 110, 105, 120, 95, 101, 99, 140, 98, 102]);
        HandshakeProfiler::new(config)
            .repetitions(10)
            .outlier_percent(outlier_percent)
            .measure(HandshakeVariant::Tls13NoClientAuth, &mut exec)
            .unwrap()
    }

    #[test]
    fn raw_report_contains_every_section_in_order() {
        let text = render(&sample_report(0));
        let sections = [
            "TIME MEASUREMENT RESULTS",
            "Used Configuration",
            "Used Handshake Segments",
            "Used Repetitions",
            "Complete duration to the end of each handshake segment",
            "Actual duration for each handshake segment",
            "Detailed Measurement Results",
        ];
        let mut cursor = 0;
        for section in sections {
            let at = text[cursor..]
                .find(section)
                .unwrap_or_else(|| panic!("missing section {section:?}"));
            cursor += at;
        }
        assert!(!text.contains("CLEANED RESULTS"));
    }

    #[test]
    fn cleaned_report_labels_raw_and_cleaned_sections() {
        let text = render(&sample_report(10));
        assert!(text.contains("Raw Results: Complete duration"));
        assert!(text.contains("CLEANED RESULTS (removed top 10% of longest durations)"));
        assert!(text.contains("Cleaned Results: Complete duration"));
        assert!(text.contains("Raw Detailed Measurement Results"));
        assert!(text.contains("Cleaned Detailed Measurement Results"));
    }

    #[test]
    fn report_header_carries_the_timestamp() {
        let when = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let text = render_at(&sample_report(0), when);
        assert!(text.starts_with("TIME MEASUREMENT RESULTS\n"));
        assert!(text.contains("14 Nov 2023 22:13:20 +0000"));
    }

    #[test]
    fn statistic_sections_use_the_plan_level_segment_index() {
        // The only measured prefix of this variant sits at plan index 2,
        // and the matrix lines must agree with the statistic sections.
        let text = render(&sample_report(0));
        assert!(text.contains("Handshake Segment 2"));
        assert!(!text.contains("Handshake Segment 0"));
        assert!(text.contains("segment 2: ["));
    }

    #[test]
    fn statistics_print_in_milliseconds() {
        let result = StatisticResult {
            min: 1_000_000,
            max: 3_000_000,
            mean: 2_000_000,
            median: 2_000_000,
            q25: 1_500_000,
            q75: 2_500_000,
            std_dev: 500_000,
            variation_coefficient: Some(0.25),
        };
        let text = format_statistic(&result);
        assert!(text.contains(" Min: 1 ms"));
        assert!(text.contains(" Max: 3 ms"));
        assert!(text.contains(" Variation Coef: 25.000 %"));
    }

    #[test]
    fn undefined_variation_coefficient_is_flagged() {
        let result = StatisticResult {
            min: 0,
            max: 0,
            mean: 0,
            median: 0,
            q25: 0,
            q75: 0,
            std_dev: 0,
            variation_coefficient: None,
        };
        assert!(format_statistic(&result).contains("undefined (zero mean)"));
    }

    #[test]
    fn summary_names_measured_segments() {
        colored::control::set_override(false);
        let summary = render_summary(&sample_report(0));
        assert!(summary.contains("TLS 1.3, no client auth"));
        assert!(summary.contains("send Finished"));
        colored::control::unset_override();
    }

    #[test]
    fn json_round_trips_through_serde() {
        let report = sample_report(10);
        let json = to_json(&report).unwrap();
        assert!(json.contains("\"repetitions\":10"));
        let pretty = to_json_pretty(&report).unwrap();
        assert!(pretty.contains("\"outlier_percent\": 10"));
    }
}
