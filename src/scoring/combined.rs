use serde::Serialize;
use std::fmt;

use super::answers::AnswerSet;
use super::config::{Questionnaire, Tier};
use super::engine::{evaluate, HazardResult, Mode, Rejection};

/// Overall risk from release likelihood and avalanche size together
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl OverallRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallRisk::Low => "low",
            OverallRisk::Moderate => "moderate",
            OverallRisk::High => "high",
            OverallRisk::VeryHigh => "very_high",
            OverallRisk::Extreme => "extreme",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OverallRisk::Low => "Gesamtrisiko: GERING",
            OverallRisk::Moderate => "Gesamtrisiko: MODERAT",
            OverallRisk::High => "Gesamtrisiko: HOCH",
            OverallRisk::VeryHigh => "Gesamtrisiko: SEHR HOCH",
            OverallRisk::Extreme => "Gesamtrisiko: EXTREM HOCH",
        }
    }
}

impl fmt::Display for OverallRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Merge the release tier with the size/reach tier.
pub fn combine(release: Tier, size: Tier) -> OverallRisk {
    match (release, size) {
        (Tier::Low, Tier::Low) => OverallRisk::Low,
        (Tier::Low, Tier::Moderate) => OverallRisk::Moderate,
        (Tier::Low, Tier::High) => OverallRisk::High,
        (Tier::Moderate, Tier::Low) => OverallRisk::Moderate,
        (Tier::Moderate, Tier::Moderate) => OverallRisk::High,
        (Tier::Moderate, Tier::High) => OverallRisk::VeryHigh,
        (Tier::High, Tier::Low) => OverallRisk::High,
        (Tier::High, _) => OverallRisk::Extreme,
    }
}

/// A size/reach analysis is only worth doing once release is plausible
pub fn size_analysis_recommended(release: Tier) -> bool {
    matches!(release, Tier::Moderate | Tier::High)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedAssessment {
    pub release: HazardResult,
    pub size: HazardResult,
    pub overall: OverallRisk,
}

/// Evaluate both questionnaires and merge their tiers.
///
/// Release uses the unweighted mean, size uses the weighted mean.
pub fn assess(
    release_questionnaire: &Questionnaire,
    release_answers: &AnswerSet,
    size_questionnaire: &Questionnaire,
    size_answers: &AnswerSet,
) -> Result<CombinedAssessment, Rejection> {
    let release = evaluate(release_questionnaire, release_answers, Mode::Unweighted)?;
    let size = evaluate(size_questionnaire, size_answers, Mode::Weighted)?;
    let overall = combine(release.tier, size.tier);
    Ok(CombinedAssessment {
        release,
        size,
        overall,
    })
}
