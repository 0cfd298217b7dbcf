//! Output formatting for build reports, doctor results and failures
//!
//! Every result can be rendered as JSON, YAML, or human-readable text. The
//! machine formats serialize the same structures the pipeline returns, so the
//! field names are stable across formats.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::HostPlatform;
use crate::error::BuildError;
use crate::pipeline::DoctorReport;
use crate::report::BuildReport;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
    /// Human-readable formatted text
    Human,
}

/// Serializable view of a fatal [`BuildError`].
#[derive(Debug, Clone, Serialize)]
pub struct FailureReport {
    pub status: &'static str,
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub remediation: Vec<String>,
}

impl FailureReport {
    pub fn new(error: &BuildError, platform: HostPlatform) -> Self {
        Self {
            status: "failed",
            kind: error.kind(),
            message: error.to_string(),
            exit_code: error.exit_code(),
            remediation: error.remediation(platform),
        }
    }
}

#[derive(Serialize)]
struct Succeeded<'a, T: Serialize> {
    status: &'static str,
    #[serde(flatten)]
    body: &'a T,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&succeeded(report)),
            OutputFormat::Yaml => to_yaml(&succeeded(report)),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_doctor(&self, report: &DoctorReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(&succeeded(report)),
            OutputFormat::Yaml => to_yaml(&succeeded(report)),
            OutputFormat::Human => Ok(self.format_doctor_human(report)),
        }
    }

    pub fn format_failure(&self, failure: &FailureReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => to_json(failure),
            OutputFormat::Yaml => to_yaml(failure),
            OutputFormat::Human => Ok(self.format_failure_human(failure)),
        }
    }

    fn format_report_human(&self, report: &BuildReport) -> String {
        let mut output = String::new();

        output.push_str("\u{2713} Build Succeeded\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!(
            "Target:     {} ({})\n",
            report.target.as_str(),
            report.target.task_name()
        ));
        output.push_str(&format!(
            "Java:       {} ({})\n",
            report.toolchain.version.major,
            report.toolchain.version.raw
        ));
        output.push_str(&java_home_line(
            &report.java_home.java_home.display().to_string(),
            report.java_home.aliased,
        ));
        output.push('\n');

        output.push_str("Steps:\n");
        for (i, step) in report.steps.iter().enumerate() {
            let connector = tree_connector(i, report.steps.len());
            let status = match step.exit_code {
                Some(code) => format!("exit {}", code),
                None => "not started".to_string(),
            };
            output.push_str(&format!("{}\u{2500} {:<22} {}\n", connector, step.task, status));
        }
        output.push('\n');

        if report.result.artifacts.is_empty() {
            output.push_str("Artifacts: (none found)\n");
        } else {
            output.push_str("Artifacts:\n");
            for (i, artifact) in report.result.artifacts.iter().enumerate() {
                let connector = tree_connector(i, report.result.artifacts.len());
                output.push_str(&format!(
                    "{}\u{2500} {}: {}\n",
                    connector,
                    artifact.kind.label(),
                    artifact.path.display()
                ));
            }
        }

        if !report.advisories.is_empty() {
            output.push_str("\n\u{26A0} Warnings:\n");
            for advisory in &report.advisories {
                output.push_str(&format!("  - {}\n", advisory.message));
            }
        }

        output
    }

    fn format_doctor_human(&self, report: &DoctorReport) -> String {
        let toolchain = &report.prepared.toolchain;
        let mut output = String::new();

        output.push_str("\u{2713} Ready to build\n");
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str("Toolchain:\n");
        output.push_str(&format!(
            "\u{251C}\u{2500} Version:  {} ({})\n",
            toolchain.version.major, toolchain.version.raw
        ));
        output.push_str(&format!(
            "\u{251C}\u{2500} java:     {}\n",
            toolchain.java.display()
        ));
        output.push_str(&format!(
            "\u{251C}\u{2500} javac:    {}\n",
            toolchain.javac.display()
        ));
        output.push_str(&format!(
            "\u{2514}\u{2500} Found via {:?}\n\n",
            toolchain.source
        ));

        output.push_str(&java_home_line(
            &report.prepared.java_home.java_home.display().to_string(),
            report.prepared.java_home.aliased,
        ));
        output.push_str(&format!("Wrapper:    {}\n", report.wrapper.display()));

        output
    }

    fn format_failure_human(&self, failure: &FailureReport) -> String {
        let mut output = String::new();

        output.push_str(&format!("\u{2717} {}\n", failure.message));
        if !failure.remediation.is_empty() {
            output.push_str("\nTo fix:\n");
            for line in &failure.remediation {
                output.push_str(&format!("  {}\n", line));
            }
        }

        output
    }
}

fn succeeded<T: Serialize>(body: &T) -> Succeeded<'_, T> {
    Succeeded {
        status: "succeeded",
        body,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output to JSON")
}

fn to_yaml<T: Serialize>(value: &T) -> Result<String> {
    serde_yaml::to_string(value).context("Failed to serialize output to YAML")
}

fn tree_connector(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "\u{2514}"
    } else {
        "\u{251C}"
    }
}

fn java_home_line(java_home: &str, aliased: bool) -> String {
    if aliased {
        format!("JAVA_HOME:  {} (alias)\n", java_home)
    } else {
        format!("JAVA_HOME:  {}\n", java_home)
    }
}
