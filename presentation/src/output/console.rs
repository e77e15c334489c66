//! Console output formatter for experiments, responses and scores

use colored::Colorize;
use paramlab_domain::{
    Comparison, Experiment, ExperimentStats, GeneratedResponse, GenerationOutcome,
    GenerationParameters, MetricsResult, ParameterPreset,
};
use serde::Serialize;

/// Longest response excerpt shown in listings
const EXCERPT_CHARS: usize = 160;

/// Formats command results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format any result as pretty JSON
    pub fn format_json<T: Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Table of all presets with their parameters
    pub fn format_presets() -> String {
        let mut output = Self::header("Parameter Presets");
        for preset in ParameterPreset::all() {
            let params = preset.parameters();
            output.push_str(&format!(
                "\n{:<14} {}\n               {}\n",
                preset.as_str().cyan().bold(),
                preset.description(),
                Self::parameter_summary(&params).dimmed()
            ));
        }
        output
    }

    /// One line per experiment
    pub fn format_experiment_list(experiments: &[Experiment]) -> String {
        if experiments.is_empty() {
            return format!("{}\n", "No experiments yet.".dimmed());
        }

        let mut output = Self::header(&format!("Experiments ({})", experiments.len()));
        output.push('\n');
        for exp in experiments {
            output.push_str(&format!(
                "{}  {}  {} {}\n",
                exp.id.as_str().yellow(),
                exp.name.bold(),
                format!("[{}]", exp.model).dimmed(),
                format!("{} responses", exp.responses.len()).dimmed()
            ));
        }
        output
    }

    /// Full experiment detail including responses
    pub fn format_experiment(experiment: &Experiment) -> String {
        let mut output = Self::header(&experiment.name);
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Id:".cyan().bold(), experiment.id));
        if let Some(description) = &experiment.description {
            output.push_str(&format!("{} {}\n", "Description:".cyan().bold(), description));
        }
        output.push_str(&format!("{} {}\n", "Prompt:".cyan().bold(), experiment.prompt));
        output.push_str(&format!(
            "{} {}\n",
            "Parameters:".cyan().bold(),
            Self::parameter_summary(&experiment.parameters)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Created:".cyan().bold(),
            experiment.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        if experiment.responses.is_empty() {
            output.push_str(&format!("\n{}\n", "No responses yet.".dimmed()));
        } else {
            output.push_str(&Self::section_header(&format!(
                "Responses ({})",
                experiment.responses.len()
            )));
            for response in &experiment.responses {
                output.push_str(&Self::format_response(response));
            }
        }
        output
    }

    /// Responses produced by a generation call
    pub fn format_outcome(outcome: &GenerationOutcome) -> String {
        let mut output = Self::section_header(&format!(
            "Generated {} responses for {}",
            outcome.responses.len(),
            outcome.experiment_id
        ));
        for response in &outcome.responses {
            output.push_str(&Self::format_response(response));
        }
        output
    }

    fn format_response(response: &GeneratedResponse) -> String {
        let mut meta = Vec::new();
        if let Some(tokens) = response.token_count {
            meta.push(format!("{} tokens", tokens));
        }
        if let Some(latency) = response.latency_ms {
            meta.push(format!("{}ms", latency));
        }
        let meta = if meta.is_empty() {
            String::new()
        } else {
            format!(" ({})", meta.join(", "))
        };

        format!(
            "\n{}{}\n{}\n",
            format!("── {} ──", response.id).yellow().bold(),
            meta.dimmed(),
            excerpt(&response.text, EXCERPT_CHARS)
        )
    }

    pub fn format_stats(stats: &ExperimentStats) -> String {
        let mut output = Self::header(&format!("Statistics for {}", stats.experiment_id));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Responses:".cyan().bold(),
            stats.response_count
        ));
        output.push_str(&format!(
            "{} {:.1} chars\n",
            "Average length:".cyan().bold(),
            stats.avg_response_length
        ));
        let quality = match stats.avg_quality_score {
            Some(score) => format!("{:.3}", score),
            None => "n/a".to_string(),
        };
        output.push_str(&format!("{} {}\n", "Average quality:".cyan().bold(), quality));
        output
    }

    /// Metric table, best overall score first
    pub fn format_metrics(results: &[MetricsResult]) -> String {
        if results.is_empty() {
            return format!("{}\n", "No scores.".dimmed());
        }

        let mut sorted: Vec<&MetricsResult> = results.iter().collect();
        sorted.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

        let mut output = Self::section_header("Quality Metrics");
        for result in sorted {
            output.push_str(&format!(
                "\n{}  {} {}\n",
                result.response_id.as_str().yellow().bold(),
                "overall".cyan(),
                Self::score(result.overall_score)
            ));
            for (name, value) in &result.metrics {
                output.push_str(&format!("    {:<22} {:.3}\n", name, value));
            }
        }
        output
    }

    pub fn format_comparison(comparison: &Comparison) -> String {
        let mut output = Self::section_header("Comparison");
        output.push('\n');
        for (rank, entry) in comparison.rankings.iter().enumerate() {
            let marker = if Some(&entry.response_id) == comparison.best_response_id.as_ref() {
                "*".green().bold().to_string()
            } else {
                " ".to_string()
            };
            output.push_str(&format!(
                "{} {}. {}  {}\n",
                marker,
                rank + 1,
                entry.response_id,
                Self::score(entry.score)
            ));
        }
        if !comparison.summary.is_empty() {
            output.push_str(&format!("\n{}\n", comparison.summary));
        }
        output
    }

    /// Compact `key=value` rendering of a parameter set
    pub fn parameter_summary(params: &GenerationParameters) -> String {
        let mut parts = vec![
            format!("model={}", params.model),
            format!("temperature={}", params.temperature),
            format!("top_p={}", params.top_p),
        ];
        if let Some(k) = params.top_k {
            parts.push(format!("top_k={}", k));
        }
        parts.push(format!("max_tokens={}", params.max_tokens));
        if params.frequency_penalty != 0.0 {
            parts.push(format!("frequency_penalty={}", params.frequency_penalty));
        }
        if params.presence_penalty != 0.0 {
            parts.push(format!("presence_penalty={}", params.presence_penalty));
        }
        if let Some(seed) = params.seed {
            parts.push(format!("seed={}", seed));
        }
        parts.join(" ")
    }

    fn score(value: f64) -> String {
        let text = format!("{:.3}", value);
        if value >= 0.7 {
            text.green().to_string()
        } else if value >= 0.4 {
            text.yellow().to_string()
        } else {
            text.red().to_string()
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!(
            "\n{}\n{}\n{}\n",
            line.cyan(),
            format!("  {}", title).cyan().bold(),
            line.cyan()
        )
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n", format!("=== {} ===", title).cyan().bold())
    }
}

/// Shorten `text` to at most `max` characters, marking the cut.
fn excerpt(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}…", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use paramlab_domain::{ExperimentId, ResponseId};
    use std::collections::BTreeMap;

    fn plain() {
        colored::control::set_override(false);
    }

    fn experiment() -> Experiment {
        Experiment {
            id: ExperimentId::new("exp-1"),
            name: "Tides".to_string(),
            prompt: "Explain tides".to_string(),
            parameters: GenerationParameters::default(),
            model: GenerationParameters::default().model,
            description: None,
            responses: vec![GeneratedResponse {
                id: ResponseId::new("r1"),
                experiment_id: ExperimentId::new("exp-1"),
                text: "The moon pulls the ocean.".to_string(),
                parameters: None,
                token_count: Some(5),
                latency_ms: None,
                created_at: Utc::now(),
            }],
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_experiment_list() {
        plain();
        let output = ConsoleFormatter::format_experiment_list(&[experiment()]);
        assert!(output.contains("Experiments (1)"));
        assert!(output.contains("exp-1  Tides"));
        assert!(output.contains("1 responses"));

        let empty = ConsoleFormatter::format_experiment_list(&[]);
        assert!(empty.contains("No experiments yet."));
    }

    #[test]
    fn test_experiment_detail_shows_responses() {
        plain();
        let output = ConsoleFormatter::format_experiment(&experiment());
        assert!(output.contains("Prompt: Explain tides"));
        assert!(output.contains("── r1 ──"));
        assert!(output.contains("(5 tokens)"));
        assert!(output.contains("The moon pulls the ocean."));
    }

    #[test]
    fn test_metrics_sorted_by_score() {
        plain();
        let low = MetricsResult {
            response_id: ResponseId::new("low"),
            metrics: BTreeMap::new(),
            overall_score: 0.2,
        };
        let high = MetricsResult {
            response_id: ResponseId::new("high"),
            metrics: BTreeMap::from([("length".to_string(), 42.0)]),
            overall_score: 0.9,
        };
        let output = ConsoleFormatter::format_metrics(&[low, high]);
        let high_at = output.find("high").unwrap();
        let low_at = output.find("low").unwrap();
        assert!(high_at < low_at);
        assert!(output.contains("42.000"));
    }

    #[test]
    fn test_parameter_summary_omits_unset() {
        let summary = ConsoleFormatter::parameter_summary(&GenerationParameters::default());
        assert!(summary.contains("temperature=0.7"));
        assert!(!summary.contains("seed="));
        assert!(!summary.contains("top_k="));
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("short", 10), "short");
        assert_eq!(excerpt("abcdefghij", 4), "abcd…");
    }

    #[test]
    fn test_json() {
        let json = ConsoleFormatter::format_json(&experiment());
        assert!(json.contains("\"name\": \"Tides\""));
    }
}
