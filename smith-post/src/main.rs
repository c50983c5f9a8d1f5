//! smith-post - Publish posts to LinkedIn

use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use libpostsmith::logging::LoggingConfig;
use libpostsmith::service::generation::GenerationService;
use libpostsmith::platforms::article_text;
use libpostsmith::service::publishing::{fit_article, PublishingService};
use libpostsmith::service::validation::ValidationService;
use libpostsmith::{
    Config, PostLength, PostRequest, PostTone, PostsmithError, PostsmithService, PublishResult,
};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "smith-post")]
#[command(version, about = "Publish a post to LinkedIn")]
#[command(long_about = r#"Publish a post to LinkedIn.

Content comes from the CONTENT argument, from stdin, or is generated from
--topic. Text over the 3000 character platform limit is trimmed to the
character budget before it is sent.

EXAMPLES:
    # Publish text
    smith-post "Shipping our new release today."

    # Publish from stdin
    cat post.txt | smith-post

    # Generate from a topic and publish
    smith-post --topic "remote work tips" --tone casual

    # See exactly what would be published
    smith-post --topic "remote work tips" --dry-run

    # Publish an article share headed by a title
    smith-post --title "What async taught us" < article.txt

    # Account and post management
    smith-post --whoami
    smith-post --recent 5 --format json
    smith-post --delete urn:li:share:1234567890
    smith-post --analytics urn:li:share:1234567890

ENVIRONMENT:
    LINKEDIN_ACCESS_TOKEN  OAuth token (overrides publishing.token_file)
    LINKEDIN_PERSON_ID     Default author id (overrides publishing.author_id)
    GROQ_API_KEY           Generation API key, needed with --topic

EXIT CODES:
    0 - Success
    1 - Provider or configuration error, or a rate-limited generation
    2 - Authentication error
    3 - Invalid input
"#)]
struct Cli {
    /// Content to post (reads from stdin if neither CONTENT nor --topic is given)
    content: Option<String>,

    /// Generate the post from this topic
    #[arg(long, conflicts_with = "content")]
    topic: Option<String>,

    /// Tone for generation: professional, casual, inspirational, educational, promotional
    #[arg(short, long, default_value = "professional")]
    tone: String,

    /// Length for generation: short, medium, long
    #[arg(short, long, default_value = "medium")]
    length: String,

    /// Do not ask for hashtags
    #[arg(long)]
    no_hashtags: bool,

    /// Target audience for generation
    #[arg(long, value_name = "AUDIENCE")]
    audience: Option<String>,

    /// Closing call to action for generation
    #[arg(long, value_name = "TEXT")]
    cta: Option<String>,

    /// Model tier key or model id for generation
    #[arg(short, long, value_name = "MODEL")]
    model: Option<String>,

    /// Publish as an article share headed by TITLE
    #[arg(long, value_name = "TITLE")]
    title: Option<String>,

    /// Schedule time (RFC 3339 or "YYYY-MM-DD HH:MM"); validated, then posted immediately
    #[arg(long, value_name = "TIME")]
    schedule: Option<String>,

    /// Author person id or URN (defaults to LINKEDIN_PERSON_ID / publishing.author_id)
    #[arg(short, long, value_name = "ID")]
    author: Option<String>,

    /// Print the final text without publishing
    #[arg(long)]
    dry_run: bool,

    /// Show the account behind the access token and exit
    #[arg(long, conflicts_with_all = ["recent", "delete", "analytics"])]
    whoami: bool,

    /// List the author's N most recent posts and exit
    #[arg(long, value_name = "N", conflicts_with_all = ["delete", "analytics"])]
    recent: Option<usize>,

    /// Delete a post by id and exit
    #[arg(long, value_name = "ID", conflicts_with = "analytics")]
    delete: Option<String>,

    /// Show likes and comments for a post and exit
    #[arg(long, value_name = "ID")]
    analytics: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct DryRun<'a> {
    final_text: &'a str,
    length: usize,
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

/// Returns `Ok(false)` when nothing was published but no error occurred
async fn run(cli: Cli) -> Result<bool> {
    if cli.whoami || cli.recent.is_some() || cli.delete.is_some() || cli.analytics.is_some() {
        manage(&cli).await?;
        return Ok(true);
    }

    let request = build_request(&cli)?;
    let config = Config::load()?;

    // Reject bad input before touching credentials
    let report = ValidationService::new(config.limits).ensure_valid(&request)?;
    for warning in &report.warnings {
        eprintln!("Warning: {}", warning);
    }

    if cli.dry_run {
        return dry_run(&cli, &config, &request).await;
    }

    let result = match request.content_text() {
        Some(content) => {
            let publishing = PublishingService::from_config(&config)?;
            let author = publishing.resolve_author(cli.author.as_deref())?;
            match &cli.title {
                Some(title) => publishing.publish_article(title, content, &author).await?,
                None => publishing.publish_post(content, &author).await?,
            }
        }
        None => {
            let service = PostsmithService::from_config(config)?;
            if let Some(model) = &cli.model {
                service.generation().switch_model(model)?;
            }
            let author = cli.author.as_deref();
            match &cli.title {
                Some(title) => service.create_article(&request, title, author).await?,
                None => service.create_post(&request, author).await?,
            }
        }
    };

    print_result(&result, &cli.format)?;
    Ok(result.success)
}

fn build_request(cli: &Cli) -> Result<PostRequest> {
    let content = match (&cli.content, &cli.topic) {
        (Some(content), _) => Some(content.clone()),
        (None, Some(_)) => None,
        (None, None) => read_stdin()?,
    };

    Ok(PostRequest {
        topic: cli.topic.clone(),
        content,
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
        schedule_time: cli.schedule.clone(),
    })
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;

    Ok(Some(buffer))
}

async fn dry_run(cli: &Cli, config: &Config, request: &PostRequest) -> Result<bool> {
    let text = match request.content_text() {
        Some(content) => content.to_string(),
        None => {
            let generation = GenerationService::from_config(config)?;
            if let Some(model) = &cli.model {
                generation.switch_model(model)?;
            }
            let post = generation.generate_post(request).await?;
            if post.rate_limited {
                eprintln!("{}", post.text);
                return Ok(false);
            }
            post.text
        }
    };

    let final_text = match &cli.title {
        Some(title) => article_text(title, &fit_article(&config.limits, title, &text)?),
        None => config.limits.fit_platform(text.trim()),
    };

    if cli.format == "json" {
        let output = DryRun {
            final_text: &final_text,
            length: final_text.chars().count(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", final_text);
    }
    Ok(true)
}

async fn manage(cli: &Cli) -> Result<()> {
    let config = Config::load()?;
    let publishing = PublishingService::from_config(&config)?;

    if cli.whoami {
        let profile = publishing.profile().await?;
        if cli.format == "json" {
            println!("{}", serde_json::to_string_pretty(&profile)?);
        } else {
            println!("{} ({})", profile.display_name, profile.id);
        }
    } else if let Some(count) = cli.recent {
        let author = publishing.resolve_author(cli.author.as_deref())?;
        let posts = publishing.recent_posts(&author, count).await?;
        if cli.format == "json" {
            println!("{}", serde_json::to_string_pretty(&posts)?);
        } else {
            for post in &posts {
                let preview: String = post
                    .text
                    .as_deref()
                    .unwrap_or("")
                    .chars()
                    .take(60)
                    .collect();
                println!("{}\t{}", post.id, preview.replace('\n', " "));
            }
        }
    } else if let Some(id) = &cli.analytics {
        let stats = publishing.post_analytics(id).await?;
        if cli.format == "json" {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            let count = |n: Option<u64>| n.map_or_else(|| "-".to_string(), |n| n.to_string());
            println!(
                "{}\tlikes:{}\tcomments:{}",
                stats.post_id,
                count(stats.likes),
                count(stats.comments)
            );
        }
    } else if let Some(id) = &cli.delete {
        publishing.delete_post(id).await?;
        if cli.format == "json" {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("deleted:{}", id);
        }
    }

    Ok(())
}

fn print_result(result: &PublishResult, format: &str) -> Result<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if !result.success {
        eprintln!("{}", result.message);
        return Ok(());
    }

    match (&result.external_post_id, &result.url) {
        (Some(id), Some(url)) => println!("linkedin:{}\t{}", id, url),
        (Some(id), None) => println!("linkedin:{}", id),
        _ => println!("linkedin:published"),
    }
    Ok(())
}
