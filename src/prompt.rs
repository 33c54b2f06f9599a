use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};

use crate::scoring::{parse_elapsed_hours, AnswerSet, Question, Questionnaire, SettlementInput};

/// Line-based interactive questionnaire over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print a message and read one trimmed line. Fails on end of input.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message)?;
        self.output.flush().context("Failed to flush output")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            bail!("Input ended before the questionnaire was complete");
        }
        Ok(line.trim().to_string())
    }

    /// Returns default if input is empty.
    fn prompt_with_default(&mut self, message: &str, default: &str) -> Result<String> {
        let input = self.prompt(&format!("{} [{}]: ", message, default))?;
        if input.is_empty() {
            Ok(default.to_string())
        } else {
            Ok(input)
        }
    }

    fn prompt_yes_no(&mut self, message: &str, default_yes: bool) -> Result<bool> {
        let hint = if default_yes { "Y/n" } else { "y/N" };
        let input = self.prompt(&format!("{} [{}]: ", message, hint))?.to_lowercase();
        if input.is_empty() {
            Ok(default_yes)
        } else {
            Ok(input == "y" || input == "yes" || input == "j" || input == "ja")
        }
    }

    /// Re-prompts until the input parses as a finite number
    fn prompt_number(&mut self, message: &str, default: &str) -> Result<f64> {
        loop {
            let input = self.prompt_with_default(message, default)?;
            match input.replace(',', ".").parse::<f64>() {
                Ok(value) if value.is_finite() => return Ok(value),
                _ => writeln!(self.output, "  Not a number: {}", input)?,
            }
        }
    }

    /// Ask every question in order and return the collected answers.
    ///
    /// Blank input leaves a question unanswered unless it is required. Once one
    /// member of the exclusive pair is answered the other is skipped.
    pub fn ask(&mut self, questionnaire: &Questionnaire) -> Result<AnswerSet> {
        let mut answers = AnswerSet::new();

        writeln!(self.output, "{}", questionnaire.display_title())?;
        if let Some(description) = &questionnaire.description {
            writeln!(self.output, "{}", description)?;
        }

        let total = questionnaire.questions.len();
        for (i, question) in questionnaire.questions.iter().enumerate() {
            writeln!(self.output)?;
            if let Some(partner) = questionnaire.exclusive_partner(&question.name) {
                if answers.is_answered(partner) {
                    writeln!(
                        self.output,
                        "{}/{} {}: skipped, '{}' already answered",
                        i + 1,
                        total,
                        question.name,
                        partner
                    )?;
                    continue;
                }
            }

            let required = questionnaire.is_required(&question.name);
            self.print_question(i + 1, total, question, required)?;
            let selected = self.read_choice(question, required)?;
            answers.record_answer(&question.name, selected);
        }

        if questionnaire.settlement {
            writeln!(self.output)?;
            if self.prompt_yes_no("Estimate new-snow settlement?", false)? {
                answers.set_settlement(Some(self.ask_settlement()?));
            }
        }

        Ok(answers)
    }

    fn print_question(
        &mut self,
        number: usize,
        total: usize,
        question: &Question,
        required: bool,
    ) -> Result<()> {
        let mut header = format!("{}/{} {}", number, total, question.name);
        if let Some(weight) = question.weight {
            header.push_str(&format!(" (weight {})", weight));
        }
        if required {
            header.push_str(" *");
        }
        writeln!(self.output, "{}", header)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(self.output, "  {}) {}", i + 1, option.display_label())?;
        }
        Ok(())
    }

    fn read_choice(&mut self, question: &Question, required: bool) -> Result<Option<usize>> {
        let count = question.options.len();
        let message = if required {
            format!("Choice (1-{}): ", count)
        } else {
            format!("Choice (1-{}, blank to skip): ", count)
        };

        loop {
            let input = self.prompt(&message)?;
            if input.is_empty() {
                if required {
                    writeln!(self.output, "  An answer is required.")?;
                    continue;
                }
                return Ok(None);
            }
            match question.find_option(&input) {
                Some(index) => return Ok(Some(index)),
                None => writeln!(self.output, "  Invalid choice: {}", input)?,
            }
        }
    }

    fn ask_settlement(&mut self) -> Result<SettlementInput> {
        let snow_cm = loop {
            let snow = self.prompt_number("New snow (cm)", "0")?;
            if snow >= 0.0 {
                break snow;
            }
            writeln!(self.output, "  Snow depth cannot be negative")?;
        };
        let temp_c = self.prompt_number("Air temperature (°C)", "0")?;
        let elapsed_hours = loop {
            let input = self.prompt_with_default("Time since snowfall (hours or e.g. 1day 6h)", "24")?;
            match parse_elapsed_hours(&input) {
                Ok(hours) => break hours,
                Err(e) => writeln!(self.output, "  {}", e)?,
            }
        };
        SettlementInput::checked(snow_cm, temp_c, elapsed_hours)
    }
}

/// Run the questionnaire on the terminal
pub fn ask_interactive(questionnaire: &Questionnaire) -> Result<AnswerSet> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Prompter::new(stdin.lock(), stdout.lock()).ask(questionnaire)
}
