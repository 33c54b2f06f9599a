pub mod answers;
pub mod combined;
pub mod config;
pub mod engine;
pub mod presets;
pub mod settlement;
pub mod tiers;
pub mod validation;

pub use answers::{parse_answer, AnswerSet};
pub use combined::{assess, combine, size_analysis_recommended, CombinedAssessment, OverallRisk};
pub use config::*;
pub use engine::{evaluate, Contribution, Exclusivity, HazardResult, Mode, Rejection};
pub use settlement::{compute_settlement, parse_elapsed_hours, Settlement, SettlementInput};
pub use tiers::classify;
pub use validation::validate_questionnaire;
