use std::collections::HashSet;

use super::config::Questionnaire;
use super::settlement::SETTLEMENT_QUESTION;

/// Validate a questionnaire definition.
/// Returns all validation errors at once (not just the first).
pub fn validate_questionnaire(q: &Questionnaire) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if q.name.trim().is_empty() {
        errors.push("name: must not be empty".to_string());
    }

    if q.questions.is_empty() {
        errors.push("questions: at least one question is required".to_string());
    }

    let mut seen_questions = HashSet::new();
    for (i, question) in q.questions.iter().enumerate() {
        if question.name.trim().is_empty() {
            errors.push(format!("questions[{}].name: must not be empty", i));
        } else if !seen_questions.insert(question.name.as_str()) {
            errors.push(format!(
                "questions[{}].name: duplicate question '{}'",
                i, question.name
            ));
        }
        if q.settlement && question.name == SETTLEMENT_QUESTION {
            errors.push(format!(
                "questions[{}].name: '{}' is reserved for the settlement estimate",
                i, question.name
            ));
        }

        if let Some(weight) = question.weight {
            if !weight.is_finite() || weight <= 0.0 {
                errors.push(format!(
                    "questions[{}].weight: must be a positive number (got {})",
                    i, weight
                ));
            }
        }

        if question.options.is_empty() {
            errors.push(format!("questions[{}].options: at least one option is required", i));
        }

        let mut seen_labels = HashSet::new();
        for (j, option) in question.options.iter().enumerate() {
            if option.label.trim().is_empty() {
                errors.push(format!(
                    "questions[{}].options[{}].label: must not be empty (leave a question unanswered instead)",
                    i, j
                ));
            } else if !seen_labels.insert(option.label.as_str()) {
                errors.push(format!(
                    "questions[{}].options[{}].label: duplicate option '{}'",
                    i, j, option.label
                ));
            }
            if !option.score.is_finite() || option.score < 0.0 {
                errors.push(format!(
                    "questions[{}].options[{}].score: must be non-negative (got {})",
                    i, j, option.score
                ));
            }
        }
    }

    validate_thresholds(q, &mut errors);

    if let Some(ref pair) = q.exclusive {
        for (field, name) in [("first", &pair.first), ("second", &pair.second)] {
            if q.question(name).is_none() {
                errors.push(format!("exclusive.{}: unknown question '{}'", field, name));
            } else if q.is_required(name) {
                errors.push(format!(
                    "exclusive.{}: '{}' cannot be both required and exclusive",
                    field, name
                ));
            }
        }
        if pair.first == pair.second {
            errors.push("exclusive: the pair must name two different questions".to_string());
        }
    }

    for (i, name) in q.required.iter().enumerate() {
        if q.question(name).is_none() {
            errors.push(format!("required[{}]: unknown question '{}'", i, name));
        }
    }

    if let Some(min) = q.min_same_tag {
        if min == 0 {
            errors.push("min_same_tag: must be at least 1".to_string());
        }
        let any_tagged = q
            .questions
            .iter()
            .flat_map(|question| question.options.iter())
            .any(|option| option.tag.is_some());
        if !any_tagged && !q.settlement {
            errors.push("min_same_tag: set, but no option carries a severity tag".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_thresholds(q: &Questionnaire, errors: &mut Vec<String>) {
    if q.thresholds.is_empty() {
        errors.push("thresholds: at least one threshold is required".to_string());
        return;
    }

    let last = q.thresholds.len() - 1;
    let mut previous: Option<(f64, usize)> = None;
    for (i, threshold) in q.thresholds.iter().enumerate() {
        match threshold.upper {
            Some(upper) if i == last => errors.push(format!(
                "thresholds[{}].upper: the last threshold must be unbounded (got {})",
                i, upper
            )),
            None if i != last => errors.push(format!(
                "thresholds[{}].upper: only the last threshold may be unbounded",
                i
            )),
            Some(upper) => {
                if !upper.is_finite() {
                    errors.push(format!("thresholds[{}].upper: must be finite", i));
                } else if let Some((prev, prev_i)) = previous {
                    if upper <= prev {
                        errors.push(format!(
                            "thresholds[{}].upper: {} must be greater than thresholds[{}].upper {}",
                            i, upper, prev_i, prev
                        ));
                    }
                }
                previous = Some((upper, i));
            }
            None => {}
        }

        if i > 0 && threshold.tier < q.thresholds[i - 1].tier {
            errors.push(format!(
                "thresholds[{}].tier: '{}' is lower than the previous tier '{}'",
                i,
                threshold.tier,
                q.thresholds[i - 1].tier
            ));
        }

        if threshold.label.trim().is_empty() {
            errors.push(format!("thresholds[{}].label: must not be empty", i));
        }

        if let Some(ref color) = threshold.color {
            if parse_hex_color(color).is_none() {
                errors.push(format!(
                    "thresholds[{}].color: invalid '{}' - expected #RRGGBB",
                    i, color
                ));
            }
        }
    }
}

/// Parse "#RRGGBB" into its components
pub fn parse_hex_color(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::{AnswerOption, ExclusivePair, Question, SeverityTag, Threshold, Tier};
    use crate::scoring::presets;

    fn minimal() -> Questionnaire {
        Questionnaire {
            name: "minimal".to_string(),
            title: None,
            description: None,
            questions: vec![Question::new(
                "Wind",
                vec![
                    AnswerOption::tagged("stark", SeverityTag::High, 3.0),
                    AnswerOption::tagged("schwach", SeverityTag::Low, 1.0),
                ],
            )],
            thresholds: vec![
                Threshold {
                    upper: Some(2.0),
                    tier: Tier::Low,
                    label: "gering".to_string(),
                    color: None,
                    recommendation: String::new(),
                },
                Threshold {
                    upper: None,
                    tier: Tier::High,
                    label: "hoch".to_string(),
                    color: Some("#ff4b4b".to_string()),
                    recommendation: String::new(),
                },
            ],
            min_same_tag: Some(1),
            exclusive: None,
            required: vec![],
            settlement: false,
        }
    }

    #[test]
    fn test_valid_questionnaire() {
        assert!(validate_questionnaire(&minimal()).is_ok());
        assert!(validate_questionnaire(&presets::size_reach()).is_ok());
    }

    #[test]
    fn test_settlement_name_reserved() {
        let mut q = minimal();
        q.questions[0].name = SETTLEMENT_QUESTION.to_string();
        assert!(validate_questionnaire(&q).is_ok());

        q.settlement = true;
        let errors = validate_questionnaire(&q).unwrap_err();
        assert_eq!(
            errors,
            vec![format!(
                "questions[0].name: '{}' is reserved for the settlement estimate",
                SETTLEMENT_QUESTION
            )]
        );
    }

    #[test]
    fn test_empty_questionnaire() {
        let mut q = minimal();
        q.questions.clear();
        q.min_same_tag = None;
        let errors = validate_questionnaire(&q).unwrap_err();
        assert_eq!(errors, vec!["questions: at least one question is required".to_string()]);
    }

    #[test]
    fn test_negative_score_and_weight() {
        let mut q = minimal();
        q.questions[0].options[0].score = -1.0;
        q.questions[0].weight = Some(0.0);
        let errors = validate_questionnaire(&q).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("questions[0].weight"));
        assert!(errors[1].contains("questions[0].options[0].score"));
    }

    #[test]
    fn test_duplicate_names() {
        let mut q = minimal();
        q.questions.push(q.questions[0].clone());
        q.questions[0].options.push(AnswerOption::new("stark", 2.0));
        let errors = validate_questionnaire(&q).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("questions[0].options[2].label: duplicate")));
        assert!(errors.iter().any(|e| e.contains("questions[1].name: duplicate question 'Wind'")));
    }

    #[test]
    fn test_thresholds_must_increase() {
        let mut q = minimal();
        q.thresholds.insert(
            1,
            Threshold {
                upper: Some(1.5),
                tier: Tier::Moderate,
                label: "mäßig".to_string(),
                color: None,
                recommendation: String::new(),
            },
        );
        let errors = validate_questionnaire(&q).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("thresholds[1].upper: 1.5 must be greater"));
    }

    #[test]
    fn test_last_threshold_unbounded() {
        let mut q = minimal();
        q.thresholds[1].upper = Some(5.0);
        q.thresholds[0].upper = None;
        let errors = validate_questionnaire(&q).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("thresholds[0].upper: only the last")));
        assert!(errors.iter().any(|e| e.contains("thresholds[1].upper: the last threshold must be unbounded")));
    }

    #[test]
    fn test_tiers_must_not_decrease() {
        let mut q = minimal();
        q.thresholds[0].tier = Tier::High;
        q.thresholds[1].tier = Tier::Low;
        let errors = validate_questionnaire(&q).unwrap_err();
        assert!(errors[0].contains("thresholds[1].tier"));
    }

    #[test]
    fn test_invalid_color() {
        let mut q = minimal();
        q.thresholds[1].color = Some("red".to_string());
        let errors = validate_questionnaire(&q).unwrap_err();
        assert!(errors[0].contains("thresholds[1].color: invalid 'red'"));
    }

    #[test]
    fn test_exclusive_and_required_references() {
        let mut q = minimal();
        q.exclusive = Some(ExclusivePair {
            first: "Wind".to_string(),
            second: "Regen".to_string(),
        });
        q.required = vec!["Wind".to_string(), "Sonne".to_string()];
        let errors = validate_questionnaire(&q).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("exclusive.first: 'Wind' cannot be both required")));
        assert!(errors.iter().any(|e| e.contains("exclusive.second: unknown question 'Regen'")));
        assert!(errors.iter().any(|e| e.contains("required[1]: unknown question 'Sonne'")));
    }

    #[test]
    fn test_min_same_tag_without_tags() {
        let mut q = minimal();
        for option in &mut q.questions[0].options {
            option.tag = None;
        }
        q.min_same_tag = Some(0);
        let errors = validate_questionnaire(&q).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut q = minimal();
        q.name = String::new(); // Error 1
        q.questions[0].options[1].label = " ".to_string(); // Error 2
        q.thresholds.clear(); // Error 3
        let errors = validate_questionnaire(&q).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#4CAF50"), Some((0x4c, 0xaf, 0x50)));
        assert_eq!(parse_hex_color("4CAF50"), None);
        assert_eq!(parse_hex_color("#4CAF5"), None);
        assert_eq!(parse_hex_color("#GGGGGG"), None);
    }
}
