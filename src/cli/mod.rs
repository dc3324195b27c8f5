//! loanfit CLI Module
//!
//! Interactive dashboard plus one-shot `build` and `info` commands.

pub mod app;
pub mod content;

use clap::{Args, Parser, Subcommand};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::AppConfig;
use crate::data::{Dataset, HoldoutSplit, LoanDataLoader};
use crate::error::{LoanfitError, Result};
use crate::evaluation::{run_session, SessionReport};
use crate::feature_engineering::MAX_DEGREE;
use crate::pipeline::{
    AlphaRange, FeatureCreation, FeatureSelection, ModelChoice, PipelineConfig, SelectorModel, CREATION_MENU,
    DEFAULT_DEGREE, MAX_CV, MIN_CV, MODEL_MENU, SELECTION_MENU,
};
use crate::scoring::ProfitScorer;
use crate::training::ClassWeight;
use app::{render, AppState, Section};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn wait_enter() {
    println!();
    println!("  {}", dim("press enter to continue"));
    let mut input = String::new();
    let _ = std::io::stdin().read_line(&mut input);
}

fn print_block(text: &str) {
    for line in text.lines() {
        println!("  {}", line);
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "loanfit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build loan-default models and score them on lending profit")]
#[command(long_about = None)]
pub struct Cli {
    /// JSON config file (data path, profit parameters, split, folds)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, fit and cross-validate one pipeline
    Build(BuildArgs),

    /// Show the loan data columns and label balance
    Info {
        /// Loan CSV file
        #[arg(short, long)]
        data: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Loan CSV file
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Model menu entry
    #[arg(short, long, default_value = "Logistic Regression")]
    pub model: String,

    /// Feature-selection menu entry
    #[arg(long, default_value = "passthrough")]
    pub select: String,

    /// Feature-creation menu entry
    #[arg(long, default_value = "passthrough")]
    pub create: String,

    /// Numeric features, comma separated
    #[arg(long, value_delimiter = ',')]
    pub num: Vec<String>,

    /// Categorical features, comma separated
    #[arg(long, value_delimiter = ',')]
    pub cat: Vec<String>,

    /// Polynomial degree
    #[arg(long)]
    pub degree: Option<usize>,

    /// Polynomial interaction terms only
    #[arg(long)]
    pub interaction_only: bool,

    /// Lasso/Ridge alpha grid
    #[arg(long, value_name = "MIN,MAX,POINTS")]
    pub alpha_range: Option<String>,

    /// HistGradientBoosting learning-rate range
    #[arg(long, value_name = "MIN,MAX")]
    pub lr_range: Option<String>,

    /// Logistic Regression / Linear SVC C range
    #[arg(long, value_name = "MIN,MAX")]
    pub c_range: Option<String>,

    /// SelectKBest k
    #[arg(long)]
    pub k: Option<usize>,

    /// SelectFromModel importance threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Folds used inside RFECV and SequentialFeatureSelector
    #[arg(long)]
    pub selector_cv: Option<usize>,

    /// SequentialFeatureSelector target feature count
    #[arg(long)]
    pub n_features: Option<usize>,

    /// Unweighted classes in the selector models
    #[arg(long)]
    pub no_balanced: bool,

    /// Cross-validation folds
    #[arg(long)]
    pub cv: Option<usize>,

    /// Print the session report as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_floats(raw: &str, name: &str, expected: usize) -> Result<Vec<f64>> {
    let values: Vec<f64> = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| LoanfitError::invalid_param(name, raw, "expected comma-separated numbers"))?;
    if values.len() != expected {
        return Err(LoanfitError::invalid_param(
            name,
            raw,
            &format!("expected {} values", expected),
        ));
    }
    Ok(values)
}

fn parse_pair(raw: &str, name: &str) -> Result<(f64, f64)> {
    let v = parse_floats(raw, name, 2)?;
    Ok((v[0], v[1]))
}

impl BuildArgs {
    /// Translate the flags into a pipeline config
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let model = self.model_choice()?;
        let selection = self.selection()?;
        let creation = match FeatureCreation::parse_menu(&self.create)? {
            FeatureCreation::Polynomial { .. } => FeatureCreation::Polynomial {
                degree: self.degree.unwrap_or(DEFAULT_DEGREE),
                interaction_only: self.interaction_only,
            },
            other => other,
        };

        let config = PipelineConfig::new(model)
            .with_features(self.num.clone(), self.cat.clone())
            .with_selection(selection)
            .with_creation(creation);
        config.validate()?;
        Ok(config)
    }

    fn model_choice(&self) -> Result<ModelChoice> {
        let misplaced = |flag: &str, model: &ModelChoice| {
            LoanfitError::ValidationError(format!("{} does not apply to {}", flag, model))
        };
        let mut choice: ModelChoice = self.model.parse()?;

        if let Some(raw) = &self.alpha_range {
            let v = parse_floats(raw, "alpha_range", 3)?;
            if v[2] < 1.0 || v[2].fract() != 0.0 {
                return Err(LoanfitError::invalid_param("alpha_points", v[2], "must be a positive integer"));
            }
            let range = Some(AlphaRange::new(v[0], v[1], v[2] as usize));
            choice = match choice {
                ModelChoice::Lasso { .. } => ModelChoice::Lasso { alpha_range: range },
                ModelChoice::Ridge { .. } => ModelChoice::Ridge { alpha_range: range },
                other => return Err(misplaced("--alpha-range", &other)),
            };
        }
        if let Some(raw) = &self.lr_range {
            let range = Some(parse_pair(raw, "learning_rate_range")?);
            choice = match choice {
                ModelChoice::HistGradientBoosting { .. } => ModelChoice::HistGradientBoosting { lr_range: range },
                other => return Err(misplaced("--lr-range", &other)),
            };
        }
        if let Some(raw) = &self.c_range {
            let range = Some(parse_pair(raw, "c_range")?);
            choice = match choice {
                ModelChoice::LogisticRegression { .. } => ModelChoice::LogisticRegression { c_range: range },
                ModelChoice::LinearSvc { .. } => ModelChoice::LinearSvc { c_range: range },
                other => return Err(misplaced("--c-range", &other)),
            };
        }
        Ok(choice)
    }

    fn selection(&self) -> Result<FeatureSelection> {
        let class_weight = if self.no_balanced {
            ClassWeight::Uniform
        } else {
            ClassWeight::Balanced
        };
        Ok(match FeatureSelection::parse_menu(&self.select)? {
            FeatureSelection::SelectKBest { k } => FeatureSelection::SelectKBest {
                k: self.k.unwrap_or(k),
            },
            FeatureSelection::SelectFromModel { estimator, threshold } => FeatureSelection::SelectFromModel {
                estimator: match estimator {
                    SelectorModel::LinearSvcL1 { .. } => SelectorModel::LinearSvcL1 { class_weight },
                    SelectorModel::LassoCv => SelectorModel::LassoCv,
                },
                threshold: self.threshold.unwrap_or(threshold),
            },
            FeatureSelection::Rfecv { cv, .. } => FeatureSelection::Rfecv {
                cv: self.selector_cv.unwrap_or(cv),
                class_weight,
            },
            FeatureSelection::Sequential { n_features, cv, .. } => FeatureSelection::Sequential {
                n_features: self.n_features.unwrap_or(n_features),
                cv: self.selector_cv.unwrap_or(cv),
                class_weight,
            },
            other => other,
        })
    }
}

fn check_folds(folds: usize) -> Result<usize> {
    if (MIN_CV..=MAX_CV).contains(&folds) {
        Ok(folds)
    } else {
        Err(LoanfitError::invalid_param("cv", folds, "must be between 2 and 10"))
    }
}

// ─── Data loading ──────────────────────────────────────────────────────────────

/// Read the config file if one was given, else the defaults
pub fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(p) => AppConfig::load(p)?,
        None => AppConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn load_dataset(config: &AppConfig, path: &Path) -> anyhow::Result<(Dataset, HoldoutSplit)> {
    step_run("Loading loans");
    let start = Instant::now();
    let dataset = LoanDataLoader::from_config(config).load(path)?;
    let split = dataset.holdout(config.test_size, config.random_state)?;
    step_done(&format!(
        "{} rows ({} charged off), {} train / {} test in {:?}",
        dataset.n_rows(),
        dataset.n_positive(),
        split.train.n_rows(),
        split.test.n_rows(),
        start.elapsed()
    ));
    Ok((dataset, split))
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_build(args: &BuildArgs, config: &AppConfig) -> anyhow::Result<()> {
    let pipeline_config = args.to_config()?;
    let folds = check_folds(args.cv.unwrap_or(config.cv_folds))?;
    let path = args.data.clone().unwrap_or_else(|| config.data_path.clone());
    let scorer = ProfitScorer::new(config.roa, config.haircut);

    if !args.json {
        section("Build");
    }
    let (dataset, split) = load_dataset(config, &path)?;

    if !args.json {
        step_run(&format!("Fitting {} and running {}-fold CV", pipeline_config.model.to_string().cyan(), folds));
    }
    let start = Instant::now();
    let report = run_session(&pipeline_config, &dataset, &split, folds, &scorer)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    step_done(&format!("{:?}", start.elapsed()));

    let mut state = AppState::new();
    state.section = Section::CustomModelBuilder;
    state.builder.config = Some(pipeline_config);
    state.builder.cv_folds = folds;
    state.leaderboard.record(&report);
    println!();
    print_block(&render(&state, Some(&report)));
    println!();
    Ok(())
}

pub fn cmd_info(data: Option<&Path>, config: &AppConfig) -> anyhow::Result<()> {
    section("Data Info");

    let path = data.unwrap_or(&config.data_path);
    let dataset = LoanDataLoader::from_config(config).load(path)?;
    let df = &dataset.features;

    println!("  {:<12} {}", muted("File"), path.display());
    println!("  {:<12} {}", muted("Rows"), dataset.n_rows());
    println!("  {:<12} {}", muted("Charged off"), dataset.n_positive());
    println!("  {:<12} {}", muted("Numeric"), dataset.numeric_features.len());
    println!("  {:<12} {}", muted("Categorical"), dataset.categorical_features.len());
    println!();

    println!("  {:<24} {:<12} {:>6} {:>8}", muted("Column"), muted("Type"), muted("Nulls"), muted("Unique"));
    println!("  {}", dim(&"─".repeat(54)));

    for col in df.get_columns() {
        println!(
            "  {:<24} {:<12} {:>6} {:>8}",
            col.name().as_str(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
            col.n_unique().unwrap_or(0)
        );
    }

    println!();
    Ok(())
}

// ─── Interactive mode ──────────────────────────────────────────────────────────

fn print_banner(config: &AppConfig) {
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "loanfit".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Data    ", &config.data_path.display().to_string()));
    line_box(&kv("ROA     ", &format!("{}", config.roa)));
    line_box(&kv("Haircut ", &format!("{}", config.haircut)));
    line_box_empty();
    line_box_bottom();
    println!();
}

fn theme() -> ColorfulTheme {
    ColorfulTheme {
        active_item_prefix: dialoguer::console::style("  ›".to_string()).for_stderr().cyan(),
        active_item_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        inactive_item_prefix: dialoguer::console::style("   ".to_string()).for_stderr(),
        inactive_item_style: dialoguer::console::Style::new().for_stderr().color256(245),
        prompt_prefix: dialoguer::console::style("  ?".to_string()).for_stderr().color256(111),
        prompt_style: dialoguer::console::Style::new().for_stderr().white().bold(),
        ..ColorfulTheme::default()
    }
}

fn ask_f64(theme: &ColorfulTheme, prompt: &str, default: f64, range: RangeInclusive<f64>) -> anyhow::Result<f64> {
    Ok(Input::<f64>::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .validate_with(move |v: &f64| -> std::result::Result<(), String> {
            if range.contains(v) {
                Ok(())
            } else {
                Err(format!("enter a value between {} and {}", range.start(), range.end()))
            }
        })
        .interact_text()?)
}

fn ask_usize(
    theme: &ColorfulTheme,
    prompt: &str,
    default: usize,
    range: RangeInclusive<usize>,
) -> anyhow::Result<usize> {
    Ok(Input::<usize>::with_theme(theme)
        .with_prompt(prompt)
        .default(default)
        .validate_with(move |v: &usize| -> std::result::Result<(), String> {
            if range.contains(v) {
                Ok(())
            } else {
                Err(format!("enter a value between {} and {}", range.start(), range.end()))
            }
        })
        .interact_text()?)
}

fn ask_class_weight(theme: &ColorfulTheme) -> anyhow::Result<ClassWeight> {
    let sel = Select::with_theme(theme)
        .with_prompt("Class weight")
        .items(&["balanced", "None"])
        .default(0)
        .interact()?;
    Ok(if sel == 0 { ClassWeight::Balanced } else { ClassWeight::Uniform })
}

fn ask_features(
    theme: &ColorfulTheme,
    prompt: &str,
    available: &[String],
    previous: Option<&[String]>,
) -> anyhow::Result<Option<Vec<String>>> {
    if available.is_empty() {
        return Ok(Some(Vec::new()));
    }
    let defaults: Vec<bool> = available
        .iter()
        .map(|name| previous.is_some_and(|p| p.contains(name)))
        .collect();
    let picked = MultiSelect::with_theme(theme)
        .with_prompt(prompt)
        .items(available)
        .defaults(&defaults)
        .interact_opt()?;
    Ok(picked.map(|idx| idx.into_iter().map(|i| available[i].clone()).collect()))
}

fn ask_c_range(theme: &ColorfulTheme) -> anyhow::Result<(f64, f64)> {
    let min = ask_f64(theme, "Minimum C", 0.0001, 1e-6..=1e6)?;
    let max = ask_f64(theme, "Maximum C", 100.0_f64.max(min), min..=1e6)?;
    Ok((min, max))
}

fn ask_alpha_range(theme: &ColorfulTheme) -> anyhow::Result<AlphaRange> {
    let min = ask_f64(theme, "Minimum alpha", 0.0001, 1e-6..=1e6)?;
    let max = ask_f64(theme, "Maximum alpha", 100.0_f64.max(min), min..=1e6)?;
    let points = ask_usize(theme, "Alpha grid points", 25, 1..=1000)?;
    Ok(AlphaRange::new(min, max, points))
}

fn ask_model(theme: &ColorfulTheme) -> anyhow::Result<Option<ModelChoice>> {
    let Some(sel) = Select::with_theme(theme)
        .with_prompt("Select a model")
        .items(&MODEL_MENU)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };

    let choice = match MODEL_MENU[sel].parse::<ModelChoice>()? {
        ModelChoice::LogisticRegression { .. } => ModelChoice::LogisticRegression {
            c_range: Some(ask_c_range(theme)?),
        },
        ModelChoice::LinearSvc { .. } => ModelChoice::LinearSvc {
            c_range: Some(ask_c_range(theme)?),
        },
        ModelChoice::HistGradientBoosting { .. } => {
            let min = ask_f64(theme, "Minimum learning rate", 0.1, 0.01..=1.0)?;
            let max = ask_f64(theme, "Maximum learning rate", min.max(0.1), min..=1.0)?;
            ModelChoice::HistGradientBoosting { lr_range: Some((min, max)) }
        }
        ModelChoice::Lasso { .. } => ModelChoice::Lasso {
            alpha_range: Some(ask_alpha_range(theme)?),
        },
        ModelChoice::Ridge { .. } => ModelChoice::Ridge {
            alpha_range: Some(ask_alpha_range(theme)?),
        },
    };
    Ok(Some(choice))
}

fn ask_selection(theme: &ColorfulTheme, n_columns: usize) -> anyhow::Result<Option<FeatureSelection>> {
    let Some(sel) = Select::with_theme(theme)
        .with_prompt("Select a feature-selection method")
        .items(&SELECTION_MENU)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };

    let selection = match FeatureSelection::parse_menu(SELECTION_MENU[sel])? {
        FeatureSelection::SelectKBest { k } => FeatureSelection::SelectKBest {
            k: ask_usize(theme, "Number of features (k)", k.min(n_columns), 1..=n_columns.max(1))?,
        },
        FeatureSelection::SelectFromModel { estimator, threshold } => {
            let threshold = ask_f64(theme, "Importance threshold", threshold, 0.0..=1.0)?;
            let estimator = match estimator {
                SelectorModel::LinearSvcL1 { .. } => SelectorModel::LinearSvcL1 {
                    class_weight: ask_class_weight(theme)?,
                },
                SelectorModel::LassoCv => SelectorModel::LassoCv,
            };
            FeatureSelection::SelectFromModel { estimator, threshold }
        }
        FeatureSelection::Rfecv { cv, .. } => FeatureSelection::Rfecv {
            cv: ask_usize(theme, "RFECV folds", cv, MIN_CV..=MAX_CV)?,
            class_weight: ask_class_weight(theme)?,
        },
        FeatureSelection::Sequential { n_features, cv, .. } => FeatureSelection::Sequential {
            n_features: ask_usize(
                theme,
                "Features to select",
                n_features.min(n_columns.saturating_sub(1)).max(1),
                1..=n_columns.saturating_sub(1).max(1),
            )?,
            cv: ask_usize(theme, "Selector folds", cv, MIN_CV..=MAX_CV)?,
            class_weight: ask_class_weight(theme)?,
        },
        other => other,
    };
    Ok(Some(selection))
}

fn ask_creation(theme: &ColorfulTheme) -> anyhow::Result<Option<FeatureCreation>> {
    let Some(sel) = Select::with_theme(theme)
        .with_prompt("Select a feature-creation method")
        .items(&CREATION_MENU)
        .default(0)
        .interact_opt()?
    else {
        return Ok(None);
    };

    Ok(Some(match FeatureCreation::parse_menu(CREATION_MENU[sel])? {
        FeatureCreation::Polynomial { interaction_only, .. } => FeatureCreation::Polynomial {
            degree: ask_usize(theme, "Polynomial degree", DEFAULT_DEGREE, 1..=MAX_DEGREE)?,
            interaction_only,
        },
        other => other,
    }))
}

/// Walk through the builder prompts; `None` when the user backs out
fn ask_builder(
    theme: &ColorfulTheme,
    dataset: &Dataset,
    state: &AppState,
) -> anyhow::Result<Option<(PipelineConfig, usize)>> {
    let previous = state.builder.config.as_ref();

    let Some(numeric) = ask_features(
        theme,
        "Numerical features (space to toggle)",
        &dataset.numeric_features,
        previous.map(|c| c.numeric_features.as_slice()),
    )?
    else {
        return Ok(None);
    };
    let Some(categorical) = ask_features(
        theme,
        "Categorical features (space to toggle)",
        &dataset.categorical_features,
        previous.map(|c| c.categorical_features.as_slice()),
    )?
    else {
        return Ok(None);
    };

    let Some(model) = ask_model(theme)? else { return Ok(None) };
    let Some(selection) = ask_selection(theme, numeric.len() + categorical.len())? else {
        return Ok(None);
    };
    let Some(creation) = ask_creation(theme)? else { return Ok(None) };
    let folds = ask_usize(theme, "Cross-validation folds", state.builder.cv_folds, MIN_CV..=MAX_CV)?;

    let config = PipelineConfig::new(model)
        .with_features(numeric, categorical)
        .with_selection(selection)
        .with_creation(creation);
    Ok(Some((config, folds)))
}

pub fn cmd_interactive(config: &AppConfig) -> anyhow::Result<()> {
    print_banner(config);

    let theme = theme();
    let scorer = ProfitScorer::new(config.roa, config.haircut);
    let (dataset, split) = load_dataset(config, &config.data_path)?;

    let mut state = AppState::new();
    state.builder.cv_folds = config.cv_folds;
    let mut last_report: Option<SessionReport> = None;

    loop {
        let mut items: Vec<&str> = Section::ALL.iter().map(|s| s.menu_label()).collect();
        items.push("Exit");

        println!();
        let sel = Select::with_theme(&theme)
            .with_prompt("Choose a section")
            .items(&items)
            .default(0)
            .interact_opt()?;

        let section = match sel {
            Some(i) if i < Section::ALL.len() => Section::ALL[i],
            _ => {
                println!();
                println!("  {}", dim("goodbye"));
                println!();
                break;
            }
        };
        state.section = section;

        if section == Section::CustomModelBuilder {
            let Some((pipeline_config, folds)) = ask_builder(&theme, &dataset, &state)? else {
                continue;
            };
            state.builder.config = Some(pipeline_config.clone());
            state.builder.cv_folds = folds;

            step_run(&format!("Fitting {} and running {}-fold CV", pipeline_config.model.to_string().cyan(), folds));
            let start = Instant::now();
            match run_session(&pipeline_config, &dataset, &split, folds, &scorer) {
                Ok(report) => {
                    step_done(&format!("{:?}", start.elapsed()));
                    state.leaderboard.record(&report);
                    state.last_error = None;
                    last_report = Some(report);
                    step_ok(&format!("Added to leaderboard ({} runs)", state.leaderboard.len()));
                }
                Err(e) => {
                    println!("{}", "failed".red());
                    state.last_error = Some(e.to_string());
                    last_report = None;
                }
            }
        }

        println!();
        print_block(&render(&state, last_report.as_ref()));
        wait_enter();
    }

    Ok(())
}
