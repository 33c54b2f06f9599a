use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::answers::AnswerSet;
use super::config::{Questionnaire, SeverityTag, Tier};
use super::settlement::SETTLEMENT_QUESTION;
use super::tiers::classify;

/// Which mean produces the hazard index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Unweighted,
    Weighted,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Unweighted => "unweighted",
            Mode::Weighted => "weighted",
        }
    }
}

/// How the exclusive question pair was misused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Exclusivity {
    Both,
    Neither,
}

/// Why an answer set could not be classified. Every variant is fixable by
/// changing the answers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    #[error("no question has been answered")]
    InsufficientAnswers,

    #[error("required question '{question}' is unanswered")]
    MissingRequired { question: String },

    #[error("{}", exclusivity_message(.kind, .first, .second))]
    ExclusivityViolation {
        kind: Exclusivity,
        first: String,
        second: String,
    },

    #[error("at least {required} answers must share one severity tag (most common tag has {best})")]
    NoMajorityTag { required: usize, best: usize },

    #[error("weighted mean requires a positive sum of weights")]
    ZeroWeightSum,

    #[error("questionnaire has no thresholds")]
    NoThresholds,
}

fn exclusivity_message(kind: &Exclusivity, first: &str, second: &str) -> String {
    match kind {
        Exclusivity::Both => format!(
            "questions '{}' and '{}' are both answered; answer only one",
            first, second
        ),
        Exclusivity::Neither => format!("answer either '{}' or '{}'", first, second),
    }
}

impl Rejection {
    fn exclusivity(kind: Exclusivity, first: &str, second: &str) -> Self {
        Rejection::ExclusivityViolation {
            kind,
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

/// One answered question as it entered the mean
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub question: String,
    pub option: String,
    pub tag: Option<SeverityTag>,
    pub score: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HazardResult {
    pub questionnaire: String,
    pub mode: Mode,
    pub index: f64,
    pub tier: Tier,
    pub label: String,
    pub color: Option<String>,
    pub recommendation: String,
    pub answered: usize,
    pub contributions: Vec<Contribution>,
}

/// Evaluate an answer set against a questionnaire.
///
/// Validation runs in a fixed order: at least one answer, required questions,
/// exclusive pair, same-tag minimum, then (weighted only) the weight sum.
/// Sums run in questionnaire order, so the insertion order of answers never
/// affects the result.
pub fn evaluate(
    questionnaire: &Questionnaire,
    answers: &AnswerSet,
    mode: Mode,
) -> Result<HazardResult, Rejection> {
    let result = evaluate_inner(questionnaire, answers, mode);
    match &result {
        Ok(r) => debug!(
            questionnaire = %questionnaire.name,
            mode = mode.as_str(),
            index = r.index,
            tier = %r.tier,
            answered = r.answered,
            "evaluated"
        ),
        Err(e) => debug!(questionnaire = %questionnaire.name, reason = %e, "rejected"),
    }
    result
}

fn evaluate_inner(
    questionnaire: &Questionnaire,
    answers: &AnswerSet,
    mode: Mode,
) -> Result<HazardResult, Rejection> {
    let contributions = collect_contributions(questionnaire, answers);
    if contributions.is_empty() {
        return Err(Rejection::InsufficientAnswers);
    }
    let answered = |name: &str| contributions.iter().any(|c| c.question == name);

    if let Some(missing) = questionnaire
        .required
        .iter()
        .find(|name| !answered(name.as_str()))
    {
        return Err(Rejection::MissingRequired {
            question: missing.clone(),
        });
    }

    if let Some(pair) = &questionnaire.exclusive {
        match (answered(pair.first.as_str()), answered(pair.second.as_str())) {
            (true, true) => {
                return Err(Rejection::exclusivity(Exclusivity::Both, &pair.first, &pair.second))
            }
            (false, false) => {
                return Err(Rejection::exclusivity(
                    Exclusivity::Neither,
                    &pair.first,
                    &pair.second,
                ))
            }
            _ => {}
        }
    }

    if let Some(required) = questionnaire.min_same_tag {
        let best = tag_counts(&contributions).into_iter().max().unwrap_or(0);
        if best < required {
            return Err(Rejection::NoMajorityTag { required, best });
        }
    }

    let index = match mode {
        Mode::Unweighted => unweighted_mean(&contributions),
        Mode::Weighted => weighted_mean(&contributions).ok_or(Rejection::ZeroWeightSum)?,
    };

    let threshold = classify(index, &questionnaire.thresholds).ok_or(Rejection::NoThresholds)?;

    Ok(HazardResult {
        questionnaire: questionnaire.name.clone(),
        mode,
        index,
        tier: threshold.tier,
        label: threshold.label.clone(),
        color: threshold.color.clone(),
        recommendation: threshold.recommendation.clone(),
        answered: contributions.len(),
        contributions,
    })
}

/// Answered questions in questionnaire order, followed by the settlement
/// estimate when the questionnaire accepts one and it applies.
pub fn collect_contributions(questionnaire: &Questionnaire, answers: &AnswerSet) -> Vec<Contribution> {
    let mut contributions: Vec<Contribution> = questionnaire
        .questions
        .iter()
        .filter_map(|q| {
            let index = answers.selected(&q.name)?;
            let Some(option) = q.options.get(index) else {
                debug!(question = %q.name, index, "ignoring out-of-range selection");
                return None;
            };
            Some(Contribution {
                question: q.name.clone(),
                option: option.label.clone(),
                tag: option.tag,
                score: option.score,
                weight: q.effective_weight(),
            })
        })
        .collect();

    if questionnaire.settlement {
        if let Some(input) = answers.settlement().filter(|i| i.applies()) {
            let estimate = input.estimate();
            if !estimate.is_none() {
                contributions.push(Contribution {
                    question: SETTLEMENT_QUESTION.to_string(),
                    option: estimate.label,
                    tag: estimate.tag,
                    score: estimate.score,
                    weight: 1.0,
                });
            }
        }
    }

    contributions
}

/// Count of answers per severity tag, in [`SeverityTag::ALL`] order
pub fn tag_counts(contributions: &[Contribution]) -> [usize; 3] {
    let mut counts = [0usize; 3];
    for (slot, tag) in SeverityTag::ALL.iter().enumerate() {
        counts[slot] = contributions
            .iter()
            .filter(|c| c.tag == Some(*tag))
            .count();
    }
    counts
}

pub fn unweighted_mean(contributions: &[Contribution]) -> f64 {
    if contributions.is_empty() {
        return 0.0;
    }
    let total: f64 = contributions.iter().map(|c| c.score).sum();
    total / contributions.len() as f64
}

/// `None` when the weights do not sum to a positive number
pub fn weighted_mean(contributions: &[Contribution]) -> Option<f64> {
    let weight_sum: f64 = contributions.iter().map(|c| c.weight).sum();
    if weight_sum <= 0.0 {
        return None;
    }
    let weighted: f64 = contributions.iter().map(|c| c.score * c.weight).sum();
    Some(weighted / weight_sum)
}
