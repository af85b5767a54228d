//! texmix CLI - question text parsing tool
//!
//! Parses question text into Markdown, JSON or YAML, checks math spans, and
//! lists or rewrites image directives.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use texmix_cli::{Config, OutputFormat};
use texmix_core::{
    JsonOptions, JsonSerializer, MarkdownSerializer, ParseTree, TexmixError, YamlSerializer,
};
use texmix_latex::{
    cdn_image_url, image_urls, parse_question_with_options, rewrite_image_urls, typeset_tree,
    Tier,
};

#[derive(Parser, Debug)]
#[command(
    name = "texmix",
    about = "Parse question text with LaTeX math into structured output",
    long_about = "Parse question text mixing prose, LaTeX math, environments, images and\n\
                  **Part (a) [2 marks]** markers into Markdown, JSON or YAML.\n\
                  \n\
                  Defaults can be set via a .texmix.toml configuration file.",
    version
)]
struct Args {
    /// Configuration file (default: ./.texmix.toml, then ~/.texmix.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a question into Markdown, JSON, or YAML
    Parse {
        /// Input file path, or '-' to read from stdin
        #[arg(value_name = "INPUT", default_value = "-")]
        input: String,

        /// Output format (default: markdown, or from config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file path (default: stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Keep **Part (x) [n marks]** markers as text instead of splitting
        #[arg(long)]
        no_parts: bool,

        /// Compact JSON output (no pretty-printing, only affects JSON format)
        #[arg(long)]
        compact: bool,
    },

    /// Typeset every math span with the built-in syntax checker
    Check {
        /// Input file path, or '-' to read from stdin
        #[arg(value_name = "INPUT", default_value = "-")]
        input: String,

        /// Fail when any span only renders as literal text
        #[arg(long)]
        strict: bool,
    },

    /// List image URLs, show CDN locations, or rewrite image URLs
    Images {
        /// Input file path, or '-' to read from stdin
        #[arg(value_name = "INPUT", default_value = "-")]
        input: String,

        /// Print the input with every image URL replaced by this URL
        #[arg(long, value_name = "URL", conflicts_with_all = ["cdn_base", "question_id"])]
        rewrite: Option<String>,

        /// CDN base URL (default: from config)
        #[arg(long, value_name = "BASE")]
        cdn_base: Option<String>,

        /// Question ID used in CDN paths
        #[arg(long, value_name = "ID")]
        question_id: Option<String>,

        /// Upload timestamp in milliseconds (default: now)
        #[arg(long, value_name = "MILLIS")]
        timestamp: Option<u64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Commands::Parse {
            input,
            format,
            output,
            no_parts,
            compact,
        } => parse_command(&config, &input, format, output.as_deref(), no_parts, compact),
        Commands::Check { input, strict } => check_command(&config, &input, strict),
        Commands::Images {
            input,
            rewrite,
            cdn_base,
            question_id,
            timestamp,
        } => images_command(
            &config,
            &input,
            rewrite.as_deref(),
            cdn_base.as_deref(),
            question_id.as_deref(),
            timestamp,
        ),
    }
}

/// Read a file, or stdin for `-`
fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read from stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(input).with_context(|| format!("Failed to read input file: {input}"))
    }
}

fn parse_tree(config: &Config, input: &str, no_parts: bool) -> Result<ParseTree> {
    let content = read_input(input)?;
    let mut options = config.parse;
    options.split_parts &= !no_parts;
    Ok(parse_question_with_options(&content, &options))
}

fn parse_command(
    config: &Config,
    input: &str,
    format: Option<OutputFormat>,
    output: Option<&Path>,
    no_parts: bool,
    compact: bool,
) -> Result<()> {
    let tree = parse_tree(config, input, no_parts)?;

    let rendered = match config.resolve_format(format) {
        OutputFormat::Markdown => MarkdownSerializer::new().serialize(&tree),
        OutputFormat::Json => {
            let options = JsonOptions {
                pretty: config.resolve_pretty(compact),
            };
            JsonSerializer::with_options(options)
                .serialize(&tree)
                .map_err(TexmixError::from)?
        }
        OutputFormat::Yaml => YamlSerializer::new()
            .serialize(&tree)
            .map_err(TexmixError::from)?,
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            eprintln!(
                "{} Wrote {} block(s) to {}",
                "✓".green().bold(),
                tree.blocks.len(),
                path.display()
            );
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{rendered}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn check_command(config: &Config, input: &str, strict: bool) -> Result<()> {
    let tree = parse_tree(config, input, false)?;
    let report = typeset_tree(&config.syntax_check(), &tree);

    println!(
        "{} spans: {} rendered, {} rendered raw, {} literal",
        report.spans.len(),
        report.count(Tier::Rendered).to_string().green(),
        report.count(Tier::RenderedRaw).to_string().yellow(),
        report.count(Tier::Literal).to_string().red(),
    );
    for span in report.literals() {
        println!(
            "  {} block {}, {}: {}",
            "literal".red().bold(),
            span.block,
            span.source,
            span.latex
        );
    }

    let literal = report.count(Tier::Literal);
    if strict && literal > 0 {
        bail!("{literal} span(s) only render as literal text");
    }
    Ok(())
}

fn images_command(
    config: &Config,
    input: &str,
    rewrite: Option<&str>,
    cdn_base: Option<&str>,
    question_id: Option<&str>,
    timestamp: Option<u64>,
) -> Result<()> {
    let content = read_input(input)?;

    if let Some(new_url) = rewrite {
        print!("{}", rewrite_image_urls(&content, new_url));
        return Ok(());
    }

    let urls = image_urls(&content);
    let cdn_base = cdn_base.or(config.images.cdn_base.as_deref());
    let Some(base) = cdn_base else {
        if question_id.is_some() {
            return Err(TexmixError::Config(
                "--question-id needs a CDN base: pass --cdn-base or set [images] cdn_base"
                    .to_string(),
            )
            .into());
        }
        for url in &urls {
            println!("{url}");
        }
        return Ok(());
    };

    let timestamp = match timestamp {
        Some(timestamp) => timestamp,
        None => now_millis()?,
    };
    for url in &urls {
        let cdn_url = cdn_image_url(base, file_name(url), question_id, timestamp);
        println!("{url} {} {cdn_url}", "->".cyan());
    }
    Ok(())
}

/// Last path segment of a URL, without query or fragment
fn file_name(url: &str) -> &str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit('/').next().unwrap_or(path)
}

fn now_millis() -> Result<u64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the Unix epoch")?;
    u64::try_from(elapsed.as_millis()).context("Timestamp does not fit in u64")
}
