//! `marketplan`: build a six-section marketing plan from the command line.
//!
//! Project state lives in `.marketplan/` under `--root` (default: the
//! current directory). The plan document is kept by the configured store;
//! the wizard step, business description and anonymous user id are kept in
//! `.marketplan/session.json` between invocations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde_json::Value;

use marketplan::builder::{PlanBuilder, SuggestError};
use marketplan::core::steps::StepView;
use marketplan::core::types::{PlanError, SectionKey};
use marketplan::exit_codes;
use marketplan::gateway::{Gateway, GenerationError, HttpModelClient};
use marketplan::io::init::{InitOptions, init_project};
use marketplan::logging;
use marketplan::project::Project;
use marketplan::schema::copy::{CopyRequest, CopyResponse};

#[derive(Parser)]
#[command(
    name = "marketplan",
    version,
    about = "Draft a marketing plan step by step, with model-generated suggestions"
)]
struct Cli {
    /// Project root containing `.marketplan/`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create `.marketplan/` with a default config.
    Init {
        /// Overwrite an existing config and forget the session.
        #[arg(short, long)]
        force: bool,
    },
    /// Generate ad, landing page and email copy for a product.
    Copy {
        #[arg(long)]
        product: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        audience: String,
        /// Print the raw response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Fill every section with suggestions for the business description.
    Suggest {
        /// Business description; defaults to the one remembered from the last run.
        description: Option<String>,
    },
    /// Ask how to improve one field, or a whole section when no field is given.
    SuggestSection {
        /// Section key (`step3_stp`) or step number (`3`).
        section: SectionKey,
        field: Option<String>,
    },
    /// Set a field. VALUE is parsed as JSON when it is an array, object or
    /// quoted string, and taken verbatim otherwise.
    Set {
        section: SectionKey,
        field: String,
        value: String,
    },
    /// Append an empty item to a list field.
    Add { section: SectionKey, field: String },
    /// Remove the item at INDEX (zero-based) from a list field.
    Remove {
        section: SectionKey,
        field: String,
        index: usize,
    },
    /// Set the plan title.
    Title { title: String },
    /// Start a new, empty plan.
    New {
        #[arg(default_value = "")]
        title: String,
    },
    /// Show the current wizard step, or move to `next`, `prev` or a step number.
    Step { target: Option<String> },
    /// Print the plan, or one section, as JSON.
    Show { section: Option<SectionKey> },
    /// Show which sections are complete.
    Progress {
        #[arg(long)]
        json: bool,
    },
    /// Print the plain-text plan summary.
    Summary,
}

fn main() {
    logging::init("warn");
    if let Err(err) = run(Cli::parse()) {
        let code = match generation_error(&err) {
            Some(GenerationError::Validation(validation)) => {
                eprintln!("{validation}");
                exit_codes::INVALID
            }
            Some(generation) => {
                eprintln!("{}", generation.user_message());
                exit_codes::GENERATION_FAILED
            }
            None => {
                eprintln!("{err:#}");
                exit_codes::INVALID
            }
        };
        std::process::exit(code);
    }
}

fn generation_error(err: &anyhow::Error) -> Option<&GenerationError> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<GenerationError>()
            .or_else(|| match cause.downcast_ref::<SuggestError>() {
                Some(SuggestError::Generation(inner)) => Some(inner),
                _ => None,
            })
    })
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.root, force),
        command => run_in_project(Project::open(&cli.root)?, command),
    }
}

fn run_in_project(mut project: Project, command: Command) -> Result<()> {
    match command {
        Command::Init { force } => cmd_init(&project.paths.root, force),
        Command::Copy {
            product,
            description,
            audience,
            json,
        } => {
            let request = CopyRequest {
                product_name: product,
                product_description: description,
                target_audience: audience,
            };
            let response = model_gateway(&project)?.generate_copy(&request)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                print!("{}", render_copy(&response));
            }
            Ok(())
        }
        Command::Suggest { description } => {
            if let Some(description) = description {
                project.builder.set_business_description(description);
            }
            if project.builder.business_description().trim().is_empty() {
                bail!("describe the business first: marketplan suggest \"<description>\"");
            }
            // Remember the description even if generation fails.
            project.save_session()?;
            let gateway = model_gateway(&project)?;
            project.builder.generate_plan(&gateway)?;
            report_persistence(&project);
            let progress = project.builder.progress();
            println!(
                "Suggestions merged: {}/{} sections complete.",
                progress.completed, progress.total
            );
            Ok(())
        }
        Command::SuggestSection { section, field } => {
            let gateway = model_gateway(&project)?;
            let text = project
                .builder
                .suggest_for_field(&gateway, section, field.as_deref())?;
            println!("{text}");
            Ok(())
        }
        Command::Set {
            section,
            field,
            value,
        } => {
            project.builder.edit(section, &field, parse_value(&value))?;
            finish_edit(&project)
        }
        Command::Add { section, field } => {
            project.builder.append_item(section, &field)?;
            finish_edit(&project)
        }
        Command::Remove {
            section,
            field,
            index,
        } => {
            project.builder.remove_item(section, &field, index)?;
            finish_edit(&project)
        }
        Command::Title { title } => {
            project.builder.set_title(title);
            finish_edit(&project)
        }
        Command::New { title } => {
            let key = project.start_new_plan(title)?.clone();
            finish_edit(&project)?;
            println!("started {}", key.plan_id);
            Ok(())
        }
        Command::Step { target } => {
            if let Some(target) = target {
                move_to(&mut project.builder, &target)?;
                project.save_session()?;
            }
            print!("{}", render_step(&project.builder));
            Ok(())
        }
        Command::Show { section } => {
            let value = match section {
                Some(key) => project
                    .builder
                    .section(key)
                    .to_value()
                    .context("serialize section")?,
                None => serde_json::to_value(project.builder.plan()).context("serialize plan")?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Command::Progress { json } => {
            let progress = project.builder.progress();
            if json {
                println!("{}", serde_json::to_string_pretty(&progress)?);
                return Ok(());
            }
            println!(
                "{}/{} sections complete ({}%)",
                progress.completed,
                progress.total,
                progress.percent()
            );
            for section in &progress.sections {
                let mark = if section.complete { "x" } else { " " };
                println!("[{mark}] {}. {}", section.step, section.title);
            }
            Ok(())
        }
        Command::Summary => {
            print!("{}", project.builder.summary());
            Ok(())
        }
    }
}

fn cmd_init(root: &Path, force: bool) -> Result<()> {
    let paths = init_project(root, InitOptions { force })?;
    println!("initialized {}", paths.dir.display());
    Ok(())
}

fn model_gateway(project: &Project) -> Result<Gateway<HttpModelClient>> {
    let client = HttpModelClient::from_config(&project.config.model)?;
    Ok(Gateway::new(client))
}

fn report_persistence(project: &Project) {
    if let Some(warning) = project.builder.persistence_warning() {
        eprintln!("warning: plan not saved: {warning}");
    }
}

fn finish_edit(project: &Project) -> Result<()> {
    report_persistence(project);
    project.save_session()
}

/// JSON for arrays, objects and quoted strings; anything else is plain text.
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Array(_) | Value::Object(_) | Value::String(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

fn move_to(builder: &mut PlanBuilder, target: &str) -> Result<(), PlanError> {
    match target {
        "next" => {
            builder.next();
        }
        "prev" | "previous" => {
            builder.previous();
        }
        other => {
            let key: SectionKey = other.parse()?;
            builder.go_to(key.index())?;
        }
    }
    Ok(())
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(text) if text.trim().is_empty() => "-".to_string(),
        Value::String(text) => text.clone(),
        Value::Array(items) if items.is_empty() => "-".to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}

fn render_step(builder: &PlanBuilder) -> String {
    let view: StepView = builder.current_view();
    let mut out = format!(
        "Step {} of {}: {}\n{}\n\n",
        view.step,
        SectionKey::ALL.len(),
        view.title,
        view.description
    );
    for spec in view.fields {
        let value = builder
            .read(view.key, spec.path)
            .map(|value| render_value(&value))
            .unwrap_or_else(|err| format!("<{err}>"));
        out.push_str(&format!("  {} ({}): {}\n", spec.label, spec.path, value));
    }
    out
}

fn render_copy(copy: &CopyResponse) -> String {
    let mut out = String::new();
    out.push_str("Facebook ad\n");
    out.push_str(&format!("  {}\n  {}\n\n", copy.facebook_ad.headline, copy.facebook_ad.body));
    out.push_str("Google Ads headlines\n");
    for headline in &copy.google_ads.headlines {
        out.push_str(&format!("  - {headline}\n"));
    }
    out.push_str("Google Ads descriptions\n");
    for description in &copy.google_ads.descriptions {
        out.push_str(&format!("  - {description}\n"));
    }
    out.push_str("\nLanding page\n");
    out.push_str(&format!(
        "  {}\n  {}\n\n",
        copy.landing_page.hero_title, copy.landing_page.hero_subtitle
    ));
    out.push_str("Email\n");
    out.push_str(&format!("  Subject: {}\n  {}\n", copy.email.subject, copy.email.body));
    out
}
