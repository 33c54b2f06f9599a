use anyhow::{bail, Context, Result};
use std::collections::HashMap;

use super::config::Questionnaire;
use super::settlement::SettlementInput;

/// Snapshot of the answers for one evaluation.
///
/// Maps question names to the index of the selected option. An absent entry
/// means unanswered (the empty option).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerSet {
    selections: HashMap<String, usize>,
    settlement: Option<SettlementInput>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `selected` for `question`; `None` clears the answer.
    pub fn record_answer(&mut self, question: &str, selected: Option<usize>) {
        match selected {
            Some(index) => {
                self.selections.insert(question.to_string(), index);
            }
            None => {
                self.selections.remove(question);
            }
        }
    }

    pub fn selected(&self, question: &str) -> Option<usize> {
        self.selections.get(question).copied()
    }

    pub fn is_answered(&self, question: &str) -> bool {
        self.selections.contains_key(question)
    }

    /// Number of answered questions, settlement not included
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn set_settlement(&mut self, input: Option<SettlementInput>) {
        self.settlement = input;
    }

    pub fn settlement(&self) -> Option<&SettlementInput> {
        self.settlement.as_ref()
    }

    /// Record an answer given as text.
    ///
    /// `question` is a question name or 1-based number, `option` an option
    /// label or 1-based number. An empty `option` clears the answer.
    pub fn select(&mut self, questionnaire: &Questionnaire, question: &str, option: &str) -> Result<()> {
        let Some(q) = questionnaire.find_question(question) else {
            bail!(
                "Unknown question '{}' in questionnaire '{}'",
                question,
                questionnaire.name
            );
        };

        if option.trim().is_empty() {
            self.record_answer(&q.name, None);
            return Ok(());
        }

        match q.find_option(option) {
            Some(index) => {
                self.record_answer(&q.name, Some(index));
                Ok(())
            }
            None => {
                let valid: Vec<String> = q
                    .options
                    .iter()
                    .enumerate()
                    .map(|(i, opt)| format!("{}) {}", i + 1, opt.label))
                    .collect();
                bail!(
                    "Unknown option '{}' for question '{}'. Valid options: {}",
                    option,
                    q.name,
                    valid.join(", ")
                )
            }
        }
    }
}

/// Split a `QUESTION=OPTION` argument.
pub fn parse_answer(arg: &str) -> Result<(String, String)> {
    let (question, option) = arg
        .split_once('=')
        .with_context(|| format!("Invalid answer '{}': expected QUESTION=OPTION", arg))?;
    let question = question.trim();
    if question.is_empty() {
        bail!("Invalid answer '{}': question is empty", arg);
    }
    Ok((question.to_string(), option.trim().to_string()))
}
