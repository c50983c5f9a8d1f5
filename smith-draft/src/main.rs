//! smith-draft - Draft LinkedIn posts with a language model

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use libpostsmith::logging::LoggingConfig;
use libpostsmith::service::generation::GenerationService;
use libpostsmith::service::validation::ValidationService;
use libpostsmith::{Config, PostLength, PostRequest, PostTone, PostsmithError};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "smith-draft")]
#[command(version, about = "Draft a LinkedIn post from a topic")]
#[command(long_about = r#"Draft a LinkedIn post from a topic with an OpenAI-compatible model.

The draft is cleaned of echoed prompt text and trimmed to the character
budget, then printed to stdout. Nothing is published.

EXAMPLES:
    # Draft a post
    smith-draft "remote work tips"

    # Casual, short, no hashtags
    smith-draft "remote work tips" --tone casual --length short --no-hashtags

    # Pick a model tier
    smith-draft "machine learning in retail" --model fast

    # Improve an existing post
    cat post.txt | smith-draft --enhance

    # Suggest hashtags for an existing post
    cat post.txt | smith-draft --hashtags 4

    # Draft and publish
    smith-draft "remote work tips" | smith-post

EXIT CODES:
    0 - Success (including a rate-limit advisory with --format json)
    1 - Provider or configuration error, or a rate-limited generation
        (the advisory goes to stderr so nothing reaches a pipe)
    3 - Invalid input
"#)]
struct Cli {
    /// Topic (or existing content with --enhance / --hashtags); read from stdin if omitted
    input: Option<String>,

    /// Tone: professional, casual, inspirational, educational, promotional
    #[arg(short, long, default_value = "professional")]
    tone: String,

    /// Length: short, medium, long
    #[arg(short, long, default_value = "medium")]
    length: String,

    /// Do not ask for hashtags
    #[arg(long)]
    no_hashtags: bool,

    /// Target audience
    #[arg(long, value_name = "AUDIENCE")]
    audience: Option<String>,

    /// Closing call to action (a random question is used otherwise)
    #[arg(long, value_name = "TEXT")]
    cta: Option<String>,

    /// Model tier key or model id
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,

    /// Improve the input as an existing post instead of drafting a new one
    #[arg(long, conflicts_with = "hashtags")]
    enhance: bool,

    /// Suggest N hashtags for the input instead of drafting
    #[arg(long, value_name = "N")]
    hashtags: Option<usize>,

    /// List available models and exit
    #[arg(long)]
    list_models: bool,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ModelEntry<'a> {
    key: &'a str,
    model: &'a str,
    active: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::from_env("warn").verbose(cli.verbose).init();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<PostsmithError>()
                .map(PostsmithError::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

/// Returns `Ok(false)` when generation was rate limited in text mode
async fn run(cli: Cli) -> Result<bool> {
    if cli.list_models {
        list_models(&Config::load()?, &cli.format)?;
        return Ok(true);
    }

    let input = read_input(cli.input.as_deref())?;

    if cli.enhance || cli.hashtags.is_some() {
        let content = input
            .ok_or_else(|| PostsmithError::InvalidInput("Content is required".to_string()))?;
        let service = generation_service(&cli)?;

        if let Some(count) = cli.hashtags {
            let tags = service.suggest_hashtags(&content, count).await?;
            print_output(&tags, &tags.join(" "), &cli.format)?;
            return Ok(true);
        }

        let text = service.enhance(&content).await?;
        print_output(&serde_json::json!({ "text": text }), &text, &cli.format)?;
        return Ok(true);
    }

    let request = PostRequest {
        topic: input,
        tone: cli
            .tone
            .parse::<PostTone>()
            .map_err(PostsmithError::InvalidInput)?,
        length: cli
            .length
            .parse::<PostLength>()
            .map_err(PostsmithError::InvalidInput)?,
        include_hashtags: !cli.no_hashtags,
        target_audience: cli.audience.clone(),
        call_to_action: cli.cta.clone(),
        ..Default::default()
    };

    // Reject bad input before touching config or credentials
    let validation = ValidationService::new(Default::default());
    validation.require_topic(&request)?;

    let service = generation_service(&cli)?;
    let post = service.generate_post(&request).await?;

    if post.rate_limited {
        tracing::warn!(model = %post.model, "Generation was rate limited");
        // The advisory is not a post; keep it off stdout
        if cli.format != "json" {
            eprintln!("{}", post.text);
            return Ok(false);
        }
    }

    print_output(&post, &post.text, &cli.format)?;
    Ok(true)
}

fn generation_service(cli: &Cli) -> Result<GenerationService> {
    let config = Config::load()?;
    let service = GenerationService::from_config(&config)?;
    if let Some(model) = &cli.model {
        service.switch_model(model)?;
    }
    Ok(service)
}

/// Positional argument, else stdin when it is not a terminal
fn read_input(arg: Option<&str>) -> Result<Option<String>> {
    let raw = match arg {
        Some(value) => value.to_string(),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read from stdin")?;
            buffer
        }
        None => String::new(),
    };

    let trimmed = raw.trim();
    Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
}

fn list_models(config: &Config, format: &str) -> Result<()> {
    let catalog = config.model_catalog();
    let active = catalog.resolve(config.generation.model.as_deref());

    let entries: Vec<ModelEntry> = catalog
        .entries()
        .iter()
        .map(|(key, model)| ModelEntry {
            key,
            model,
            active: *model == active,
        })
        .collect();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for entry in &entries {
            let marker = if entry.active { "*" } else { " " };
            println!("{} {:<10} {}", marker, entry.key, entry.model);
        }
    }
    Ok(())
}

fn print_output<T: Serialize>(value: &T, text: &str, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text);
    }
    Ok(())
}
