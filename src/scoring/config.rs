use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tag attached to an answer option.
///
/// `1` marks high concern, `2` medium and `3` low. Questionnaires that set
/// `min_same_tag` only produce an index once enough answers share one tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SeverityTag {
    High,
    Medium,
    Low,
}

impl SeverityTag {
    pub const ALL: [SeverityTag; 3] = [SeverityTag::High, SeverityTag::Medium, SeverityTag::Low];

    /// The digit shown in front of an option label ("1", "2" or "3")
    pub fn digit(self) -> u8 {
        match self {
            SeverityTag::High => 1,
            SeverityTag::Medium => 2,
            SeverityTag::Low => 3,
        }
    }
}

impl TryFrom<u8> for SeverityTag {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(SeverityTag::High),
            2 => Ok(SeverityTag::Medium),
            3 => Ok(SeverityTag::Low),
            other => Err(format!("severity tag must be 1, 2 or 3 (got {})", other)),
        }
    }
}

impl From<SeverityTag> for u8 {
    fn from(tag: SeverityTag) -> u8 {
        tag.digit()
    }
}

impl fmt::Display for SeverityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// Discrete hazard tier. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Low,
    Moderate,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Moderate => "moderate",
            Tier::High => "high",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable answer of a question.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AnswerOption {
    pub label: String,

    /// Severity tag counted towards the same-tag minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<SeverityTag>,

    pub score: f64,
}

impl AnswerOption {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            tag: None,
            score,
        }
    }

    pub fn tagged(label: impl Into<String>, tag: SeverityTag, score: f64) -> Self {
        Self {
            label: label.into(),
            tag: Some(tag),
            score,
        }
    }

    /// Label with its tag digit in front, e.g. "2: mäßiger Wind (< 40 km/h)"
    pub fn display_label(&self) -> String {
        match self.tag {
            Some(tag) => format!("{}: {}", tag, self.label),
            None => self.label.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Question {
    pub name: String,

    /// Weight used by the weighted mean. Absent means 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn new(name: impl Into<String>, options: Vec<AnswerOption>) -> Self {
        Self {
            name: name.into(),
            weight: None,
            options,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn effective_weight(&self) -> f64 {
        self.weight.unwrap_or(1.0)
    }

    /// Resolve an option by 1-based number or by label (case-insensitive).
    /// The tagged display form ("1: ...") is accepted as well.
    pub fn find_option(&self, selector: &str) -> Option<usize> {
        let selector = selector.trim();
        if let Ok(number) = selector.parse::<usize>() {
            if number >= 1 && number <= self.options.len() {
                return Some(number - 1);
            }
        }
        self.options.iter().position(|opt| {
            opt.label.eq_ignore_ascii_case(selector)
                || opt.display_label().eq_ignore_ascii_case(selector)
        })
    }
}

/// Upper bound of one hazard tier.
///
/// `upper: None` marks the final, unbounded entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Threshold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<f64>,

    pub tier: Tier,

    pub label: String,

    /// Display color as "#RRGGBB"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub recommendation: String,
}

/// Two questions of which exactly one must be answered.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExclusivePair {
    pub first: String,
    pub second: String,
}

/// A complete questionnaire definition.
///
/// Example YAML:
/// ```yaml
/// name: quick-check
/// min_same_tag: 2
/// questions:
///   - name: Wind
///     options:
///       - { label: "starker Wind", tag: 1, score: 3 }
///       - { label: "kein Wind", tag: 3, score: 1 }
/// thresholds:
///   - { upper: 2.2, tier: low, label: "Geringe Gefahr" }
///   - { tier: high, label: "Hohe Gefahr" }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Questionnaire {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub questions: Vec<Question>,

    /// Ordered tier bounds, strictly increasing, last one unbounded
    pub thresholds: Vec<Threshold>,

    /// Minimum number of answers that must share one severity tag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_same_tag: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive: Option<ExclusivePair>,

    /// Questions that must be answered before evaluation
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Whether a settlement estimate may be added as an extra answer
    #[serde(default)]
    pub settlement: bool,
}

impl Questionnaire {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }

    pub fn question(&self, name: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.name == name)
    }

    /// Resolve a question by exact name, 1-based number or case-insensitive name.
    pub fn find_question(&self, selector: &str) -> Option<&Question> {
        let selector = selector.trim();
        if let Some(q) = self.question(selector) {
            return Some(q);
        }
        if let Ok(number) = selector.parse::<usize>() {
            if number >= 1 {
                return self.questions.get(number - 1);
            }
        }
        self.questions
            .iter()
            .find(|q| q.name.eq_ignore_ascii_case(selector))
    }

    /// True if any question carries an explicit weight
    pub fn is_weighted(&self) -> bool {
        self.questions.iter().any(|q| q.weight.is_some())
    }

    /// The other member of the exclusive pair, if `name` belongs to it
    pub fn exclusive_partner(&self, name: &str) -> Option<&str> {
        let pair = self.exclusive.as_ref()?;
        if pair.first == name {
            Some(&pair.second)
        } else if pair.second == name {
            Some(&pair.first)
        } else {
            None
        }
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}
