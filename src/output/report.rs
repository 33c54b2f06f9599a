use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::scoring::{CombinedAssessment, HazardResult, Settlement, SettlementInput};

/// JSON envelope: the payload plus the time it was produced
#[derive(Debug, Serialize)]
pub struct Report<T: Serialize> {
    pub evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Report<T> {
    pub fn new(body: T) -> Self {
        Self {
            evaluated_at: Utc::now(),
            body,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize report")
    }
}

#[derive(Debug, Serialize)]
pub struct Evaluations<'a> {
    pub results: &'a [HazardResult],
}

#[derive(Debug, Serialize)]
pub struct SettlementReport<'a> {
    pub input: &'a SettlementInput,
    pub settlement: &'a Settlement,
}

pub fn results_json(results: &[HazardResult]) -> Result<String> {
    Report::new(Evaluations { results }).to_json()
}

pub fn combined_json(assessment: &CombinedAssessment) -> Result<String> {
    Report::new(assessment).to_json()
}

pub fn settlement_json(input: &SettlementInput, settlement: &Settlement) -> Result<String> {
    Report::new(SettlementReport { input, settlement }).to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{assess, evaluate, presets, AnswerSet, Mode};

    #[test]
    fn test_results_json_shape() {
        let q = presets::self_release();
        let mut answers = AnswerSet::new();
        for name in ["1", "2", "3"] {
            answers.select(&q, name, "1").unwrap();
        }
        let result = evaluate(&q, &answers, Mode::Unweighted).unwrap();
        let json = results_json(std::slice::from_ref(&result)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["evaluated_at"].as_str().unwrap().contains('T'));
        let first = &value["results"][0];
        assert_eq!(first["questionnaire"], "self-release");
        assert_eq!(first["mode"], "unweighted");
        assert_eq!(first["tier"], result.tier.as_str());
        assert_eq!(first["contributions"].as_array().unwrap().len(), 3);
        assert_eq!(first["contributions"][0]["tag"], 1);
    }

    #[test]
    fn test_combined_json_flattens_assessment() {
        let release = presets::self_release();
        let mut release_answers = AnswerSet::new();
        for name in ["1", "2", "3"] {
            release_answers.select(&release, name, "1").unwrap();
        }
        let size = presets::size_reach();
        let mut size_answers = AnswerSet::new();
        for i in 1..=6 {
            size_answers.select(&size, &i.to_string(), "1").unwrap();
        }
        let assessment = assess(&release, &release_answers, &size, &size_answers).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&combined_json(&assessment).unwrap()).unwrap();

        assert_eq!(value["overall"], assessment.overall.as_str());
        assert_eq!(value["release"]["questionnaire"], "self-release");
        assert_eq!(value["size"]["mode"], "weighted");
    }

    #[test]
    fn test_settlement_json() {
        let input = SettlementInput::new(50.0, 2.0, 24.0);
        let value: serde_json::Value =
            serde_json::from_str(&settlement_json(&input, &input.estimate()).unwrap()).unwrap();
        assert_eq!(value["input"]["snow_cm"], 50.0);
        assert_eq!(value["settlement"]["label"], "2: mäßige Setzung");
        assert_eq!(value["settlement"]["score"], 2.0);
    }
}
