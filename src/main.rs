//! Command-line front end for the translation pipeline.
//!
//! Responsibilities here are intentionally minimal:
//! - Parse command-line arguments.
//! - Load user configuration from `conf/config.toml`.
//! - Run a selection through validate → expand → dispatch and print the
//!   outcome, optionally exporting the session history as Markdown.

use anyhow::{Context, Result, anyhow};
use docutranslate::config::load_config;
use docutranslate::history::TranslationLog;
use docutranslate::sanitize::validate_selection;
use docutranslate::selection::{SelectionMode, expand_selection};
use docutranslate::translate::{TranslationOutcome, TranslationRequest, Translator};
use std::env;
use std::io::Read;
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

struct CliArgs {
    text: Option<String>,
    target_language: Option<String>,
    mode: Option<SelectionMode>,
    per_word: bool,
    export_path: Option<String>,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args()?;
    let config = load_config(Path::new("conf/config.toml"));
    set_log_level(reload_handle, config.log_level.as_filter_str());

    let text = match args.text {
        Some(text) => text,
        None => read_stdin()?,
    };
    let target_language = args
        .target_language
        .unwrap_or_else(|| config.target_language.clone());
    let mode = args.mode.unwrap_or(config.selection_mode);
    let per_word = args.per_word || config.per_word_dictionary;
    info!(%mode, %target_language, per_word, "Starting translation");

    let selection = expand_selection(&text, None, mode, &config.auto_thresholds());
    let report = validate_selection(&selection, config.max_selection_chars);
    if !report.valid {
        return Err(anyhow!(report
            .error
            .unwrap_or_else(|| "Selection was rejected.".to_string())));
    }

    let request = if per_word {
        TranslationRequest::Dictionary {
            text: selection.clone(),
            target_language: target_language.clone(),
        }
    } else {
        TranslationRequest::FreeText {
            text: selection.clone(),
            target_language: target_language.clone(),
        }
    };

    let translator = Translator::new(config.endpoint())?;
    let outcome = translator.translate(&request)?;
    print_outcome(&outcome);

    let mut history = TranslationLog::new(config.history_limit);
    history.record(selection, outcome.logged_text());
    if let Some(path) = args.export_path {
        std::fs::write(&path, history.export_markdown(&target_language))
            .with_context(|| format!("Failed to write history to {path}"))?;
        info!(path, "History exported");
    }
    Ok(())
}

fn print_outcome(outcome: &TranslationOutcome) {
    match outcome {
        TranslationOutcome::Text(text) => println!("{text}"),
        TranslationOutcome::Dictionary { entries, raw } => {
            if entries.is_empty() {
                println!("{raw}");
                return;
            }
            for entry in entries {
                let pos = if entry.pos.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", entry.pos)
                };
                println!("{}{pos}: {}", entry.word, entry.translation);
                if let Some(example) = &entry.example {
                    println!("    e.g. {example}");
                }
            }
        }
    }
}

fn parse_args() -> Result<CliArgs> {
    let mut parsed = CliArgs {
        text: None,
        target_language: None,
        mode: None,
        per_word: false,
        export_path: None,
    };
    let mut words = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--lang" => {
                parsed.target_language =
                    Some(args.next().ok_or_else(|| usage("--lang needs a value"))?);
            }
            "--mode" => {
                let value = args.next().ok_or_else(|| usage("--mode needs a value"))?;
                parsed.mode = Some(match value.as_str() {
                    "auto" => SelectionMode::Auto,
                    "word" => SelectionMode::Word,
                    "sentence" => SelectionMode::Sentence,
                    "paragraph" => SelectionMode::Paragraph,
                    other => return Err(usage(&format!("unknown mode {other:?}"))),
                });
            }
            "--per-word" => parsed.per_word = true,
            "--export" => {
                parsed.export_path =
                    Some(args.next().ok_or_else(|| usage("--export needs a value"))?);
            }
            "--help" | "-h" => return Err(usage("")),
            other => words.push(other.to_string()),
        }
    }
    if !words.is_empty() {
        parsed.text = Some(words.join(" "));
    }
    Ok(parsed)
}

fn usage(detail: &str) -> anyhow::Error {
    let base = "Usage: docutranslate [--lang LANGUAGE] [--mode auto|word|sentence|paragraph] \
                [--per-word] [--export FILE.md] [text ...]\nReads stdin when no text is given.";
    if detail.is_empty() {
        anyhow!("{base}")
    } else {
        anyhow!("{detail}\n{base}")
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read text from stdin")?;
    if buffer.trim().is_empty() {
        return Err(usage("no text provided"));
    }
    Ok(buffer)
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if EnvFilter::try_from_default_env().is_ok() {
        // RUST_LOG wins over the config file.
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    }
}
