pub mod formatter;
pub mod report;

pub use formatter::{
    format_combined, format_index, format_questionnaire_detail, format_questionnaire_list,
    format_rejection, format_result, format_score, format_settlement, format_tsv,
    should_use_colors,
};
pub use report::{combined_json, results_json, settlement_json, Report};
