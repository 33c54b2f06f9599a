use std::io::IsTerminal;
use owo_colors::OwoColorize;
use terminal_size::{Width, terminal_size};

use crate::scoring::validation::parse_hex_color;
use crate::scoring::{
    CombinedAssessment, HazardResult, OverallRisk, Questionnaire, Rejection, Settlement,
    SettlementInput, Tier,
};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Format a score or weight without trailing zeros (2, 3.5, 1.25)
pub fn format_score(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// Hazard index with two decimals
pub fn format_index(index: f64) -> String {
    format!("{:.2}", index)
}

/// Paint `text` in the threshold's hex color, falling back to a tier color
fn paint_tier(text: &str, tier: Tier, color: Option<&str>) -> String {
    if let Some((r, g, b)) = color.and_then(parse_hex_color) {
        return text.truecolor(r, g, b).bold().to_string();
    }
    match tier {
        Tier::Low => text.green().bold().to_string(),
        Tier::Moderate => text.yellow().bold().to_string(),
        Tier::High => text.red().bold().to_string(),
    }
}

fn paint_risk(text: &str, risk: OverallRisk) -> String {
    match risk {
        OverallRisk::Low => text.green().bold().to_string(),
        OverallRisk::Moderate => text.yellow().bold().to_string(),
        OverallRisk::High => text.red().bold().to_string(),
        OverallRisk::VeryHigh | OverallRisk::Extreme => text.bright_red().bold().reversed().to_string(),
    }
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate a label to fit available width, counting chars rather than bytes
fn truncate_label(label: &str, max_width: usize) -> String {
    let chars: Vec<char> = label.chars().collect();
    if chars.len() <= max_width {
        label.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Fit `label` into what is left of the terminal after `fixed_width` columns
fn fit_label(label: &str, fixed_width: usize, term_width: Option<usize>) -> String {
    match term_width {
        Some(width) if width > fixed_width + 10 => truncate_label(label, width - fixed_width),
        Some(_) => truncate_label(label, 20),
        None => label.to_string(),
    }
}

/// Format one evaluation: headline, recommendation and the answers that
/// entered the mean.
pub fn format_result(result: &HazardResult, use_colors: bool) -> String {
    let verdict = format!("{} ({})", result.label, result.tier);
    let verdict = if use_colors {
        paint_tier(&verdict, result.tier, result.color.as_deref())
    } else {
        verdict
    };

    let mut lines = vec![format!(
        "{} [{}]: index {}  {}",
        result.questionnaire,
        result.mode.as_str(),
        format_index(result.index),
        verdict
    )];

    lines.extend(result.recommendation.lines().map(|l| format!("  {}", l)));

    lines.push(format!("  Answers: {}", result.answered));
    for c in &result.contributions {
        let weight = if (c.weight - 1.0).abs() > f64::EPSILON {
            format!(" x{}", format_score(c.weight))
        } else {
            String::new()
        };
        let score = format!("{}{}", format_score(c.score), weight);
        let score = if use_colors {
            score.bold().to_string()
        } else {
            score
        };
        lines.push(format!("    {}: {} = {}", c.question, c.option, score));
    }

    lines.join("\n")
}

/// Format a rejection for stderr
pub fn format_rejection(questionnaire: &str, rejection: &Rejection) -> String {
    format!("Cannot evaluate '{}': {}", questionnaire, rejection)
}

/// Format a settlement estimate together with its inputs
pub fn format_settlement(input: &SettlementInput, settlement: &Settlement) -> String {
    let header = format!(
        "Snow {} cm, {} °C, {} h elapsed",
        format_score(input.snow_cm),
        format_score(input.temp_c),
        format_score(input.elapsed_hours)
    );
    match settlement.degree {
        Some(degree) if !settlement.is_none() => format!(
            "{}\n  {} (score {}, settlement degree {:.0}%)",
            header,
            settlement.label,
            format_score(settlement.score),
            degree
        ),
        _ => format!("{}\n  No settlement estimate without elapsed time", header),
    }
}

/// One line per questionnaire: marker for the default, name, title, size
pub fn format_questionnaire_list(
    questionnaires: &[Questionnaire],
    default_name: &str,
    use_colors: bool,
) -> String {
    if questionnaires.is_empty() {
        return "No questionnaires configured.".to_string();
    }

    let name_width = questionnaires
        .iter()
        .map(|q| q.name.chars().count())
        .max()
        .unwrap_or(0);

    questionnaires
        .iter()
        .map(|q| {
            let marker = if q.name == default_name { "*" } else { " " };
            let name = format!("{:<width$}", q.name, width = name_width);
            let name = if use_colors {
                name.cyan().to_string()
            } else {
                name
            };
            let kind = if q.is_weighted() { ", weighted" } else { "" };
            format!(
                "{} {}  {} ({} questions{})",
                marker,
                name,
                q.display_title(),
                q.questions.len(),
                kind
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered questions with their options, scores, tags and constraints.
/// Option labels are truncated to the terminal width.
pub fn format_questionnaire_detail(questionnaire: &Questionnaire, use_colors: bool) -> String {
    format_questionnaire_detail_width(questionnaire, use_colors, get_terminal_width())
}

fn format_questionnaire_detail_width(
    questionnaire: &Questionnaire,
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    let title = questionnaire.display_title();
    let mut lines = vec![if use_colors {
        title.bold().to_string()
    } else {
        title.to_string()
    }];
    if let Some(description) = &questionnaire.description {
        lines.push(description.clone());
    }

    for (i, question) in questionnaire.questions.iter().enumerate() {
        let mut header = format!("{}. {}", i + 1, question.name);
        if let Some(weight) = question.weight {
            header.push_str(&format!(" (weight {})", format_score(weight)));
        }
        if questionnaire.is_required(&question.name) {
            header.push_str(" [required]");
        }
        if let Some(partner) = questionnaire.exclusive_partner(&question.name) {
            header.push_str(&format!(" [or: {}]", partner));
        }
        lines.push(String::new());
        lines.push(header);

        for (j, option) in question.options.iter().enumerate() {
            let prefix = format!("   {}) ", j + 1);
            let score = format!("  = {}", format_score(option.score));
            let fixed_width = prefix.chars().count() + score.chars().count();
            let label = fit_label(&option.display_label(), fixed_width, term_width);
            let score = if use_colors {
                score.dimmed().to_string()
            } else {
                score
            };
            lines.push(format!("{}{}{}", prefix, label, score));
        }
    }

    lines.push(String::new());
    lines.push("Thresholds:".to_string());
    for threshold in &questionnaire.thresholds {
        let bound = match threshold.upper {
            Some(upper) => format!("<= {}", format_score(upper)),
            None => "above".to_string(),
        };
        let label = if use_colors {
            paint_tier(&threshold.label, threshold.tier, threshold.color.as_deref())
        } else {
            threshold.label.clone()
        };
        lines.push(format!("  {:<8} {} ({})", bound, label, threshold.tier));
    }

    let mut notes = Vec::new();
    if let Some(min) = questionnaire.min_same_tag {
        notes.push(format!("at least {} answers must share one tag", min));
    }
    if let Some(pair) = &questionnaire.exclusive {
        notes.push(format!("answer exactly one of '{}' and '{}'", pair.first, pair.second));
    }
    if questionnaire.settlement {
        notes.push("accepts a new-snow settlement estimate".to_string());
    }
    if !notes.is_empty() {
        lines.push(String::new());
        lines.extend(notes.into_iter().map(|n| format!("Note: {}", n)));
    }

    lines.join("\n")
}

/// Both evaluations followed by the overall risk
pub fn format_combined(assessment: &CombinedAssessment, use_colors: bool) -> String {
    let overall = assessment.overall.label();
    let overall = if use_colors {
        paint_risk(overall, assessment.overall)
    } else {
        overall.to_string()
    };
    format!(
        "{}\n\n{}\n\n{}",
        format_result(&assessment.release, use_colors),
        format_result(&assessment.size, use_colors),
        overall
    )
}

/// Results as tab-separated values for scripting
/// Columns: questionnaire, mode, index, tier, label (no headers, no colors)
pub fn format_tsv(results: &[HazardResult]) -> String {
    results
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                r.questionnaire,
                r.mode.as_str(),
                format_index(r.index),
                r.tier,
                r.label
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
