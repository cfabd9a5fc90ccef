//! Result rendering and persistence.
//!
//! Console output plus JSON, CSV, and plain-text result files, and an
//! optional detailed JSON report carrying scan metadata.

use crate::error::{ScanError, ScanResult};
use crate::scanner::{Finding, Protocol, ScanStats};
use crate::services;
use crate::sysinfo::{self, SysInfo};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Output file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON array of findings.
    Json,
    /// CSV with a header row.
    Csv,
    /// Plain text summary.
    Txt,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }
}

/// Detailed scan report with metadata, for `--report`.
#[derive(Debug, Serialize)]
pub struct ScanReport<'a> {
    pub metadata: ReportMetadata,
    pub results: &'a [Finding],
    pub statistics: &'a ScanStats,
}

#[derive(Debug, Serialize)]
pub struct ReportMetadata {
    pub scan_date: DateTime<Utc>,
    pub target: String,
    pub protocol: Protocol,
    pub system_info: SysInfo,
}

/// Print one finding as a console line.
pub fn print_finding(finding: &Finding) {
    println!(
        "{} Port {} | {:<13} | {}",
        style("[+]").green().bold(),
        style(format!("{:>5}", finding.port)).yellow(),
        finding.service,
        style(&finding.banner).dim()
    );
}

/// Print the scan statistics block.
pub fn print_stats(stats: &ScanStats) {
    let seconds = stats.duration_ms as f64 / 1000.0;

    println!("{}", separator());
    println!("Scan statistics:");
    println!("  Total ports:    {}", stats.total_ports);
    if stats.total_ports > 0 {
        let percentage = stats.open_ports as f64 / stats.total_ports as f64 * 100.0;
        println!(
            "  Open ports:     {} ({:.2}%)",
            style(stats.open_ports).green().bold(),
            percentage
        );
    } else {
        println!("  Open ports:     {}", stats.open_ports);
    }
    println!("  Closed ports:   {}", stats.closed_ports);
    println!("  Duration:       {:.2}s", seconds);
    if seconds > 0.0 {
        println!("  Ports/second:   {:.2}", stats.total_ports as f64 / seconds);
    }
    println!("{}", separator());
}

/// Print the startup header lines.
pub fn print_scan_header(
    host: &str,
    protocol: Protocol,
    port_spec: &str,
    total_ports: usize,
    workers: usize,
    timeout_ms: u64,
) {
    println!(
        "{} Starting {} scan on {}",
        style("[*]").cyan(),
        protocol,
        style(host).bold()
    );
    println!(
        "{} Port range: {} ({} ports)",
        style("[*]").cyan(),
        port_spec,
        total_ports
    );
    println!(
        "{} Workers: {} | Timeout: {}ms",
        style("[*]").cyan(),
        workers,
        timeout_ms
    );
    println!("{}", separator());
}

/// Save findings in the given format. Returns the full path written.
pub fn save_findings(
    findings: &[Finding],
    format: OutputFormat,
    base_name: &str,
) -> ScanResult<PathBuf> {
    let path = PathBuf::from(format!("{}.{}", base_name, format.extension()));
    match format {
        OutputFormat::Json => save_json(findings, &path)?,
        OutputFormat::Csv => save_csv(findings, &path)?,
        OutputFormat::Txt => save_txt(findings, &path)?,
    }
    Ok(path)
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> ScanError {
    ScanError::OutputWrite {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn save_json(findings: &[Finding], path: &Path) -> ScanResult<()> {
    let json = serde_json::to_string_pretty(findings).map_err(|e| write_error(path, e))?;
    fs::write(path, json).map_err(|e| write_error(path, e))
}

fn save_csv(findings: &[Finding], path: &Path) -> ScanResult<()> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| write_error(path, e))?;

    writer
        .write_record(["Port", "Service", "Banner", "Status"])
        .map_err(|e| write_error(path, e))?;

    for finding in findings {
        writer
            .write_record([
                &finding.port.to_string(),
                &finding.service,
                &finding.banner,
                &finding.status,
            ])
            .map_err(|e| write_error(path, e))?;
    }

    writer.flush().map_err(|e| write_error(path, e))
}

fn save_txt(findings: &[Finding], path: &Path) -> ScanResult<()> {
    let mut file = fs::File::create(path).map_err(|e| write_error(path, e))?;

    writeln!(file, "Port Scan Results").map_err(|e| write_error(path, e))?;
    writeln!(file, "=================\n").map_err(|e| write_error(path, e))?;

    for finding in findings {
        writeln!(
            file,
            "[{}] Port {} ({} - {})",
            finding.status,
            finding.port,
            finding.service,
            services::describe(&finding.service)
        )
        .map_err(|e| write_error(path, e))?;
        if !finding.banner.is_empty() && finding.banner != crate::banner::NO_BANNER {
            writeln!(file, "    Banner: {}", finding.banner).map_err(|e| write_error(path, e))?;
        }
        writeln!(file).map_err(|e| write_error(path, e))?;
    }

    Ok(())
}

/// Save a detailed JSON report with scan metadata alongside the findings.
pub fn save_report(
    findings: &[Finding],
    stats: &ScanStats,
    target: &str,
    protocol: Protocol,
    path: &Path,
) -> ScanResult<()> {
    let report = ScanReport {
        metadata: ReportMetadata {
            scan_date: Utc::now(),
            target: target.to_string(),
            protocol,
            system_info: sysinfo::collect(),
        },
        results: findings,
        statistics: stats,
    };

    let json = serde_json::to_string_pretty(&report).map_err(|e| write_error(path, e))?;
    fs::write(path, json).map_err(|e| write_error(path, e))
}

/// Separator line used around console sections.
pub fn separator() -> String {
    "=".repeat(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_findings() -> Vec<Finding> {
        vec![
            Finding::new(22, "SSH", "SSH-2.0-OpenSSH_8.9"),
            Finding::new(80, "HTTP", "No banner"),
        ]
    }

    fn sample_stats() -> ScanStats {
        ScanStats {
            total_ports: 100,
            open_ports: 2,
            closed_ports: 98,
            duration_ms: 1234,
        }
    }

    #[test]
    fn test_save_json_round_trips() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("results");
        let path = save_findings(
            &sample_findings(),
            OutputFormat::Json,
            base.to_str().unwrap(),
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let parsed: Vec<Finding> = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed, sample_findings());
    }

    #[test]
    fn test_save_csv_has_header_and_rows() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("results");
        let path = save_findings(
            &sample_findings(),
            OutputFormat::Csv,
            base.to_str().unwrap(),
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "Port,Service,Banner,Status");
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("22,SSH,SSH-2.0-OpenSSH_8.9,open"));
    }

    #[test]
    fn test_save_txt_skips_empty_banners() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("results");
        let path = save_findings(
            &sample_findings(),
            OutputFormat::Txt,
            base.to_str().unwrap(),
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[open] Port 22 (SSH - Secure Shell)"));
        assert!(content.contains("Banner: SSH-2.0-OpenSSH_8.9"));
        // "No banner" sentinel is not echoed into the file.
        assert!(!content.contains("Banner: No banner"));
    }

    #[test]
    fn test_save_report_includes_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.json");
        save_report(
            &sample_findings(),
            &sample_stats(),
            "127.0.0.1",
            Protocol::Tcp,
            &path,
        )
        .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["metadata"]["target"], "127.0.0.1");
        assert_eq!(json["metadata"]["protocol"], "tcp");
        assert_eq!(json["statistics"]["open_ports"], 2);
        assert_eq!(json["results"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unwritable_path_is_an_output_error() {
        let result = save_findings(
            &sample_findings(),
            OutputFormat::Json,
            "/nonexistent-dir/results",
        );
        assert!(matches!(result, Err(ScanError::OutputWrite { .. })));
    }
}
