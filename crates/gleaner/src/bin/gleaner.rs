// ABOUTME: CLI binary for the gleaner readability extractor.
// ABOUTME: Reads an HTML file or stdin and prints the extracted article as content or JSON.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use gleaner::{Article, ContentType, ExtractError, ExtractionOptions, Reader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gleaner")]
#[command(about = "Extract the readable article from an HTML page")]
struct Args {
    /// HTML file to read (default: stdin)
    #[arg()]
    file: Option<PathBuf>,

    /// Absolute URL of the page, used to resolve relative links
    #[arg(long = "url")]
    url: String,

    /// Output format: html (default), markdown/md, text/txt
    #[arg(short = 'f', long = "format", default_value = "html")]
    format: String,

    /// Print the whole article as JSON instead of just its content
    #[arg(long = "json")]
    json_output: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// JSON file with extraction options
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Wrap merged content in <div> instead of <article>
    #[arg(long = "div-wrapper")]
    div_wrapper: bool,

    #[arg(long = "top-n")]
    top_n: Option<usize>,

    #[arg(long = "max-rank-gap")]
    max_rank_gap: Option<usize>,

    #[arg(long = "max-depth-delta")]
    max_depth_delta: Option<usize>,

    #[arg(long = "min-jaccard")]
    min_jaccard: Option<f64>,

    /// Keep relative links as they appear in the page
    #[arg(long = "no-resolve-urls")]
    no_resolve_urls: bool,

    /// Print elapsed time in ms to stderr
    #[arg(long = "timing")]
    timing: bool,

    /// Log pipeline details to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_options(path: &Path) -> anyhow::Result<ExtractionOptions> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

/// Config file first, then individual flags on top.
fn extraction_options(args: &Args) -> anyhow::Result<ExtractionOptions> {
    let mut opts = match &args.config {
        Some(path) => load_options(path)
            .map_err(|e| anyhow::anyhow!("reading config {}: {}", path.display(), e))?,
        None => ExtractionOptions::default(),
    };
    if args.div_wrapper {
        opts.wrap_in_article_tag = false;
    }
    if let Some(n) = args.top_n {
        opts.cluster_top_n = n;
    }
    if let Some(gap) = args.max_rank_gap {
        opts.cluster_max_rank_gap = gap;
    }
    if let Some(delta) = args.max_depth_delta {
        opts.cluster_max_depth_delta = delta;
    }
    if let Some(jaccard) = args.min_jaccard {
        opts.cluster_min_token_jaccard = jaccard;
    }
    Ok(opts)
}

fn read_input(file: Option<&Path>, url: &str) -> Result<Vec<u8>, ExtractError> {
    match file {
        Some(path) => fs::read(path).map_err(|e| ExtractError::io(url, "read", e)),
        None => {
            let mut buf = Vec::new();
            io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| ExtractError::io(url, "read", e))?;
            Ok(buf)
        }
    }
}

fn format_output(article: &Article, json_output: bool) -> anyhow::Result<String> {
    if json_output {
        Ok(serde_json::to_string_pretty(article)?)
    } else {
        Ok(article.content.clone())
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let reader = Reader::builder()
        .content_type(ContentType::from(args.format.as_str()))
        .extraction(extraction_options(args)?)
        .resolve_urls(!args.no_resolve_urls)
        .build();

    let start = Instant::now();
    let bytes = read_input(args.file.as_deref(), &args.url)?;
    let article = reader.parse_bytes(&bytes, None, &args.url)?;

    if args.timing {
        eprintln!("elapsed: {}ms", start.elapsed().as_millis());
    }

    let output = format_output(&article, args.json_output)?;
    match &args.output {
        Some(path) => fs::write(path, output.as_bytes())
            .map_err(|e| ExtractError::io(&args.url, "write", e))?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", output)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(1)
        }
    }
}
