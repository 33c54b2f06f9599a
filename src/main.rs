use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

use lawine::config::Config;
use lawine::output;
use lawine::scoring::{
    self, parse_answer, presets, AnswerSet, HazardResult, Mode, Questionnaire, Rejection,
    SettlementInput,
};

const EXIT_SUCCESS: i32 = 0;
const EXIT_REJECTED: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Human,
    Json,
    Tsv,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModeArg {
    Unweighted,
    Weighted,
    Both,
}

#[derive(Args, Debug, Default)]
struct SettlementArgs {
    /// New snow depth in cm
    #[arg(long)]
    snow: Option<f64>,

    /// Air temperature in °C
    #[arg(long, allow_negative_numbers = true)]
    temp: Option<f64>,

    /// Time since snowfall: hours ("24") or a duration ("1day 6h")
    #[arg(long)]
    elapsed: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available questionnaires (default if no subcommand)
    List,
    /// Show the questions, options and thresholds of a questionnaire
    Show {
        /// Questionnaire name (defaults to the configured default)
        questionnaire: Option<String>,
    },
    /// Evaluate answers given on the command line
    Evaluate {
        /// Questionnaire name (defaults to the configured default)
        questionnaire: Option<String>,

        /// Answer as QUESTION=OPTION; both may be names or 1-based numbers
        #[arg(short, long = "answer", value_name = "QUESTION=OPTION")]
        answers: Vec<String>,

        /// Which mean to use (default: both for weighted questionnaires)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        #[command(flatten)]
        settlement: SettlementArgs,
    },
    /// Estimate new-snow settlement
    Settlement {
        #[command(flatten)]
        settlement: SettlementArgs,
    },
    /// Evaluate release and size questionnaires and combine them
    Combine {
        /// Release questionnaire
        #[arg(long, default_value = presets::SELF_RELEASE)]
        release: String,

        /// Size/reach questionnaire
        #[arg(long, default_value = presets::SIZE_REACH)]
        size: String,

        /// Release answer as QUESTION=OPTION
        #[arg(long = "release-answer", value_name = "QUESTION=OPTION")]
        release_answers: Vec<String>,

        /// Size answer as QUESTION=OPTION
        #[arg(long = "size-answer", value_name = "QUESTION=OPTION")]
        size_answers: Vec<String>,

        #[command(flatten)]
        settlement: SettlementArgs,
    },
    /// Answer a questionnaire interactively
    Ask {
        /// Questionnaire name (defaults to the configured default)
        questionnaire: Option<String>,

        /// Which mean to use (default: both for weighted questionnaires)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Write the built-in questionnaires to the config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "lawine")]
#[command(about = "Avalanche hazard questionnaire scoring CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/lawine/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = lawine::logging::init_logging(cli.verbose) {
        eprintln!("{}", e);
    }

    let command = cli.command.unwrap_or(Commands::List);
    let config_path = cli.config.map(PathBuf::from);
    let start_time = Instant::now();

    // Init writes the config, so it must not require a valid one
    if let Commands::Init { force } = command {
        match lawine::config::write_default_config(config_path, force) {
            Ok(path) => {
                println!("Wrote built-in questionnaires to {}", path.display());
                std::process::exit(EXIT_SUCCESS);
            }
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(EXIT_CONFIG);
            }
        }
    }

    let config = match lawine::config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate questionnaire definitions at startup
    if let Err(errors) = lawine::config::validate_config(&config) {
        eprintln!("Questionnaire config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let format = cli.format;
    let use_colors = format == OutputFormat::Human && output::should_use_colors();

    let code = match command {
        Commands::List => {
            let questionnaires = config.effective_questionnaires();
            match format {
                OutputFormat::Json => print_json(serde_json::to_string_pretty(&questionnaires).map_err(Into::into)),
                OutputFormat::Tsv => {
                    for q in &questionnaires {
                        println!("{}\t{}\t{}", q.name, q.display_title(), q.questions.len());
                    }
                    EXIT_SUCCESS
                }
                OutputFormat::Human => {
                    println!(
                        "{}",
                        output::format_questionnaire_list(
                            &questionnaires,
                            config.default_questionnaire_name(),
                            use_colors
                        )
                    );
                    EXIT_SUCCESS
                }
            }
        }
        Commands::Show { questionnaire } => {
            let q = resolve_questionnaire(&config, questionnaire.as_deref());
            match format {
                OutputFormat::Json => print_json(serde_json::to_string_pretty(&q).map_err(Into::into)),
                _ => {
                    println!("{}", output::format_questionnaire_detail(&q, use_colors));
                    EXIT_SUCCESS
                }
            }
        }
        Commands::Evaluate {
            questionnaire,
            answers,
            mode,
            settlement,
        } => {
            let q = resolve_questionnaire(&config, questionnaire.as_deref());
            let mut answer_set = input_or_exit(collect_answers(&q, &answers));
            apply_settlement(&q, &mut answer_set, &settlement);
            let modes = select_modes(&q, mode);
            report_evaluations(&q, &answer_set, &modes, format, use_colors)
        }
        Commands::Settlement { settlement } => {
            let input = match input_or_exit(parse_settlement(&settlement)) {
                Some(input) => input,
                None => {
                    eprintln!("Settlement needs --snow, --temp and --elapsed");
                    std::process::exit(EXIT_INPUT);
                }
            };
            let estimate = input.estimate();
            match format {
                OutputFormat::Json => print_json(output::settlement_json(&input, &estimate)),
                OutputFormat::Tsv => {
                    println!(
                        "{}\t{}\t{}",
                        estimate.label,
                        output::format_score(estimate.score),
                        estimate.degree.map(|d| format!("{:.1}", d)).unwrap_or_default()
                    );
                    EXIT_SUCCESS
                }
                OutputFormat::Human => {
                    println!("{}", output::format_settlement(&input, &estimate));
                    EXIT_SUCCESS
                }
            }
        }
        Commands::Combine {
            release,
            size,
            release_answers,
            size_answers,
            settlement,
        } => {
            let release_q = resolve_questionnaire(&config, Some(release.as_str()));
            let size_q = resolve_questionnaire(&config, Some(size.as_str()));
            let mut release_set = input_or_exit(collect_answers(&release_q, &release_answers));
            apply_settlement(&release_q, &mut release_set, &settlement);
            let size_set = input_or_exit(collect_answers(&size_q, &size_answers));

            match scoring::assess(&release_q, &release_set, &size_q, &size_set) {
                Ok(assessment) => match format {
                    OutputFormat::Json => print_json(output::combined_json(&assessment)),
                    OutputFormat::Tsv => {
                        println!(
                            "{}",
                            output::format_tsv(&[assessment.release.clone(), assessment.size.clone()])
                        );
                        println!("overall\t\t\t{}\t{}", assessment.overall.as_str(), assessment.overall.label());
                        EXIT_SUCCESS
                    }
                    OutputFormat::Human => {
                        if !scoring::size_analysis_recommended(assessment.release.tier) {
                            println!("Note: release likelihood is low, size analysis is optional.\n");
                        }
                        println!("{}", output::format_combined(&assessment, use_colors));
                        EXIT_SUCCESS
                    }
                },
                Err(rejection) => {
                    let which = if scoring::evaluate(&release_q, &release_set, Mode::Unweighted).is_err() {
                        &release_q.name
                    } else {
                        &size_q.name
                    };
                    eprintln!("{}", output::format_rejection(which, &rejection));
                    EXIT_REJECTED
                }
            }
        }
        Commands::Ask { questionnaire, mode } => {
            let q = resolve_questionnaire(&config, questionnaire.as_deref());
            let answer_set = input_or_exit(lawine::prompt::ask_interactive(&q));
            println!();
            let modes = select_modes(&q, mode);
            report_evaluations(&q, &answer_set, &modes, format, use_colors)
        }
        Commands::Init { .. } => EXIT_SUCCESS,
    };

    debug!(elapsed = ?start_time.elapsed(), "done");
    std::process::exit(code);
}

/// Look up a questionnaire by name, or exit with the list of known names
fn resolve_questionnaire(config: &Config, name: Option<&str>) -> Questionnaire {
    let name = name.unwrap_or_else(|| config.default_questionnaire_name());
    match config.questionnaire(name) {
        Some(q) => q,
        None => {
            let known: Vec<String> = config
                .effective_questionnaires()
                .into_iter()
                .map(|q| q.name)
                .collect();
            eprintln!(
                "Unknown questionnaire '{}'. Available: {}",
                name,
                known.join(", ")
            );
            std::process::exit(EXIT_INPUT);
        }
    }
}

fn input_or_exit<T>(result: anyhow::Result<T>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            eprintln!("Input error: {:#}", e);
            std::process::exit(EXIT_INPUT);
        }
    }
}

fn collect_answers(questionnaire: &Questionnaire, args: &[String]) -> anyhow::Result<AnswerSet> {
    let mut answers = AnswerSet::new();
    for arg in args {
        let (question, option) = parse_answer(arg)?;
        answers.select(questionnaire, &question, &option)?;
    }
    debug!(questionnaire = %questionnaire.name, answered = answers.len(), "collected answers");
    Ok(answers)
}

/// All three settlement flags or none of them
fn parse_settlement(args: &SettlementArgs) -> anyhow::Result<Option<SettlementInput>> {
    match (args.snow, args.temp, args.elapsed.as_deref()) {
        (None, None, None) => Ok(None),
        (Some(snow), Some(temp), Some(elapsed)) => {
            let hours = scoring::parse_elapsed_hours(elapsed)?;
            Ok(Some(SettlementInput::checked(snow, temp, hours)?))
        }
        _ => anyhow::bail!("--snow, --temp and --elapsed must be given together"),
    }
}

fn apply_settlement(questionnaire: &Questionnaire, answers: &mut AnswerSet, args: &SettlementArgs) {
    let Some(input) = input_or_exit(parse_settlement(args)) else {
        return;
    };
    if !questionnaire.settlement {
        warn!(questionnaire = %questionnaire.name, "questionnaire takes no settlement estimate, ignoring it");
        return;
    }
    answers.set_settlement(Some(input));
}

fn select_modes(questionnaire: &Questionnaire, mode: Option<ModeArg>) -> Vec<Mode> {
    let mode = mode.unwrap_or(if questionnaire.is_weighted() {
        ModeArg::Both
    } else {
        ModeArg::Unweighted
    });
    match mode {
        ModeArg::Unweighted => vec![Mode::Unweighted],
        ModeArg::Weighted => vec![Mode::Weighted],
        ModeArg::Both => vec![Mode::Unweighted, Mode::Weighted],
    }
}

fn evaluate_all(
    questionnaire: &Questionnaire,
    answers: &AnswerSet,
    modes: &[Mode],
) -> Result<Vec<HazardResult>, Rejection> {
    modes
        .iter()
        .map(|mode| scoring::evaluate(questionnaire, answers, *mode))
        .collect()
}

fn report_evaluations(
    questionnaire: &Questionnaire,
    answers: &AnswerSet,
    modes: &[Mode],
    format: OutputFormat,
    use_colors: bool,
) -> i32 {
    let results = match evaluate_all(questionnaire, answers, modes) {
        Ok(results) => results,
        Err(rejection) => {
            eprintln!("{}", output::format_rejection(&questionnaire.name, &rejection));
            return EXIT_REJECTED;
        }
    };

    match format {
        OutputFormat::Json => print_json(output::results_json(&results)),
        OutputFormat::Tsv => {
            println!("{}", output::format_tsv(&results));
            EXIT_SUCCESS
        }
        OutputFormat::Human => {
            let blocks: Vec<String> = results
                .iter()
                .map(|r| output::format_result(r, use_colors))
                .collect();
            println!("{}", blocks.join("\n\n"));
            EXIT_SUCCESS
        }
    }
}

fn print_json(json: anyhow::Result<String>) -> i32 {
    match json {
        Ok(json) => {
            println!("{}", json);
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("Output error: {:#}", e);
            EXIT_INPUT
        }
    }
}
