//! Console, JSON and Markdown rendering of scoring results

use crate::config::OutputFormat;
use crate::error::Result;
use crate::models::{BatchStatus, BatchSummary, ExtractedFields, JobProfile, MatchResult};
use colored::{Color, Colorize};
use serde::Serialize;
use std::path::Path;

/// One resume scored against one job
#[derive(Debug, Clone, Serialize)]
pub struct MatchReport<'a> {
    pub job: &'a JobProfile,
    pub fields: &'a ExtractedFields,
    pub result: &'a MatchResult,
}

pub trait OutputFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String>;
    fn format_batch(&self, summary: &BatchSummary) -> Result<String>;
    fn format_fields(&self, fields: &ExtractedFields) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter;

pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

fn percent(fraction: f32) -> String {
    format!("{:.1}%", fraction * 100.0)
}

fn or_dash(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => "-",
    }
}

fn status_label(status: BatchStatus) -> &'static str {
    match status {
        BatchStatus::Completed => "completed",
        BatchStatus::JobNotFound => "job not found",
        BatchStatus::NoCandidates => "no candidates",
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: f32) -> String {
        let (badge, color) = match score.round() as u32 {
            85..=100 => ("STRONG", Color::Green),
            70..=84 => ("GOOD", Color::BrightGreen),
            50..=69 => ("PARTIAL", Color::Yellow),
            _ => ("WEAK", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_sub_scores(&self, result: &MatchResult) -> String {
        format!(
            "Skills:      {}\nExperience:  {}\nEducation:   {}\nFull text:   {}\nCoverage:    {}\n",
            percent(result.skills_score),
            percent(result.experience_score),
            percent(result.education_score),
            percent(result.full_text_score),
            percent(result.keyword_coverage),
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        let result = report.result;
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("MATCH: {}", report.job.title), 1));
        output.push_str(&format!(
            "Final score: {:.1} {}\n",
            result.final_score,
            self.format_score_badge(result.final_score)
        ));

        output.push_str(&self.format_header("Sub-scores", 2));
        output.push_str(&self.format_sub_scores(result));

        output.push_str(&self.format_header("Matched skills", 2));
        if result.matched_skills.is_empty() {
            output.push_str(&self.colorize("none\n", Color::Red));
        } else {
            for skill in &result.matched_skills {
                output.push_str(&format!("{} {}\n", self.colorize("✓", Color::Green), skill));
            }
        }

        if self.detailed {
            output.push_str(&self.format_fields(report.fields)?);
        }

        Ok(output)
    }

    fn format_batch(&self, summary: &BatchSummary) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("BATCH: job {}", summary.job_id), 1));
        let status_color = match summary.status {
            BatchStatus::Completed => Color::Green,
            _ => Color::Yellow,
        };
        output.push_str(&format!(
            "Status: {} | scored: {} | failed: {}\n",
            self.colorize(status_label(summary.status), status_color),
            summary.processed_candidates,
            summary.failed
        ));

        if summary.results.is_empty() {
            return Ok(output);
        }

        output.push_str(&self.format_header("Ranking", 2));
        for result in &summary.results {
            output.push_str(&format!(
                "#{:<3} candidate {:<6} {:>5.1} {}\n",
                result.rank.unwrap_or(0),
                result.candidate_id,
                result.final_score,
                self.format_score_badge(result.final_score)
            ));
            if self.detailed {
                output.push_str(&format!(
                    "     skills {} | experience {} | education {} | full text {} | coverage {}\n",
                    percent(result.skills_score),
                    percent(result.experience_score),
                    percent(result.education_score),
                    percent(result.full_text_score),
                    percent(result.keyword_coverage)
                ));
            }
        }

        Ok(output)
    }

    fn format_fields(&self, fields: &ExtractedFields) -> Result<String> {
        let mut output = self.format_header("Extracted fields", 2);
        output.push_str(&format!("Skills:     {}\n", or_dash(fields.skills.as_deref())));
        output.push_str(&format!("Experience: {}\n", or_dash(fields.experience.as_deref())));
        output.push_str(&format!("Education:  {}\n", or_dash(fields.education.as_deref())));
        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        self.render(report)
    }

    fn format_batch(&self, summary: &BatchSummary) -> Result<String> {
        self.render(summary)
    }

    fn format_fields(&self, fields: &ExtractedFields) -> Result<String> {
        self.render(fields)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    fn sub_score_table(result: &MatchResult) -> String {
        let mut table = String::from("| Component | Score |\n|---|---|\n");
        for (name, value) in [
            ("Skills", result.skills_score),
            ("Experience", result.experience_score),
            ("Education", result.education_score),
            ("Full text", result.full_text_score),
            ("Keyword coverage", result.keyword_coverage),
        ] {
            table.push_str(&format!("| {} | {} |\n", name, percent(value)));
        }
        table
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_match(&self, report: &MatchReport) -> Result<String> {
        let result = report.result;
        let mut output = format!("# Match report: {}\n\n", report.job.title);
        output.push_str(&format!("**Final score:** {:.1} / 100\n\n", result.final_score));
        output.push_str("## Sub-scores\n\n");
        output.push_str(&Self::sub_score_table(result));

        output.push_str("\n## Matched skills\n\n");
        if result.matched_skills.is_empty() {
            output.push_str("_None_\n");
        } else {
            for skill in &result.matched_skills {
                output.push_str(&format!("- {}\n", skill));
            }
        }

        output.push('\n');
        output.push_str(&self.format_fields(report.fields)?);
        Ok(output)
    }

    fn format_batch(&self, summary: &BatchSummary) -> Result<String> {
        let mut output = format!("# Batch results: job {}\n\n", summary.job_id);
        output.push_str(&format!(
            "Status: **{}**, scored: {}, failed: {}\n\n",
            status_label(summary.status),
            summary.processed_candidates,
            summary.failed
        ));

        if !summary.results.is_empty() {
            output.push_str("| Rank | Candidate | Final | Skills | Experience | Education | Full text | Coverage |\n");
            output.push_str("|---|---|---|---|---|---|---|---|\n");
            for r in &summary.results {
                output.push_str(&format!(
                    "| {} | {} | {:.1} | {} | {} | {} | {} | {} |\n",
                    r.rank.unwrap_or(0),
                    r.candidate_id,
                    r.final_score,
                    percent(r.skills_score),
                    percent(r.experience_score),
                    percent(r.education_score),
                    percent(r.full_text_score),
                    percent(r.keyword_coverage)
                ));
            }
        }

        Ok(output)
    }

    fn format_fields(&self, fields: &ExtractedFields) -> Result<String> {
        Ok(format!(
            "## Extracted fields\n\n- **Skills:** {}\n- **Experience:** {}\n- **Education:** {}\n",
            or_dash(fields.skills.as_deref()),
            or_dash(fields.experience.as_deref()),
            or_dash(fields.education.as_deref())
        ))
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter,
        }
    }

    fn formatter(&self, format: &OutputFormat) -> &dyn OutputFormatter {
        match format {
            OutputFormat::Console => &self.console_formatter,
            OutputFormat::Json => &self.json_formatter,
            OutputFormat::Markdown => &self.markdown_formatter,
        }
    }

    pub fn match_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        self.formatter(format).format_match(report)
    }

    pub fn batch_report(&self, summary: &BatchSummary, format: &OutputFormat) -> Result<String> {
        self.formatter(format).format_batch(summary)
    }

    pub fn fields_report(&self, fields: &ExtractedFields, format: &OutputFormat) -> Result<String> {
        self.formatter(format).format_fields(fields)
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: &OutputFormat, stem: &str, timestamp: bool) -> String {
    let base_name = Path::new(stem)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    let extension = match format {
        OutputFormat::Console => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    };
    format!("{}_score{}.{}", base_name, timestamp_suffix, extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> BatchSummary {
        BatchSummary {
            job_id: 7,
            processed_candidates: 2,
            failed: 1,
            status: BatchStatus::Completed,
            results: vec![
                MatchResult { candidate_id: 2, final_score: 81.0, rank: Some(1), ..Default::default() },
                MatchResult { candidate_id: 1, final_score: 40.5, rank: Some(2), ..Default::default() },
            ],
        }
    }

    #[test]
    fn test_console_batch_without_colors() {
        let output = ConsoleFormatter::new(false, false).format_batch(&summary()).unwrap();
        assert!(output.contains("BATCH: job 7"));
        assert!(output.contains("Status: completed | scored: 2 | failed: 1"));
        assert!(output.contains("[GOOD]"));
        assert!(output.contains("[WEAK]"));
    }

    #[test]
    fn test_json_batch_uses_snake_case_status() {
        let output = JsonFormatter::new(false).format_batch(&summary()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["results"][0]["rank"], 1);
    }

    #[test]
    fn test_markdown_match_report() {
        let job = JobProfile {
            job_id: 1,
            title: "Backend Engineer".to_string(),
            description: String::new(),
            requirements: "Python".to_string(),
            location: None,
            weights: None,
        };
        let fields = ExtractedFields {
            skills: Some("Python".to_string()),
            experience: Some("5 years".to_string()),
            education: None,
        };
        let result = MatchResult {
            candidate_id: 1,
            skills_score: 0.9,
            matched_skills: vec!["Python".to_string()],
            final_score: 77.25,
            ..Default::default()
        };

        let output = MarkdownFormatter
            .format_match(&MatchReport { job: &job, fields: &fields, result: &result })
            .unwrap();
        assert!(output.starts_with("# Match report: Backend Engineer"));
        assert!(output.contains("**Final score:** 77.2 / 100") || output.contains("**Final score:** 77.3 / 100"));
        assert!(output.contains("| Skills | 90.0% |"));
        assert!(output.contains("- Python"));
        assert!(output.contains("- **Education:** -"));
    }

    #[test]
    fn test_suggest_filename() {
        assert_eq!(suggest_filename(&OutputFormat::Json, "jane.pdf", false), "jane_score.json");
        assert_eq!(suggest_filename(&OutputFormat::Markdown, "job-7", false), "job-7_score.md");
    }

    #[test]
    fn test_save_report_creates_parent_dirs() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("reports").join("out.md");
        save_report_to_file("# hi", &path).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# hi");
    }
}
