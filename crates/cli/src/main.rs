mod echo;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use sitecarve_core::{
    AttrMatch, Batch, DEFAULT_TRIGGERS, DEFAULT_USER_AGENT, FetchConfig, HttpFetcher, ScrapeOptions, SiteConfig, clean_content,
    extract_region, fetch_file, fetch_stdin, fetch_url, localize_images, organize_images, scrape_site,
};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Carve the content region out of web pages and regenerate them as a static site
#[derive(Parser, Debug)]
#[command(name = "sitecarve", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the content region of a single page
    Extract(ExtractArgs),
    /// Scrape every sitemap page into regenerated standalone pages
    Scrape(ScrapeArgs),
    /// Download remote images referenced by the regenerated pages
    Images(ImagesArgs),
    /// Move images of configured sections into their taxonomy folders
    Organize(SiteArgs),
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Attribute match that opens the region, as name=value (repeatable)
    #[arg(short, long = "trigger", value_name = "NAME=VALUE")]
    triggers: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the region as JSON with its completeness and token count
    #[arg(long)]
    json: bool,

    /// Strip scripts, and links to --base-url, from the region
    #[arg(long)]
    clean: bool,

    /// Origin whose links become root-relative with --clean
    #[arg(long, value_name = "URL", requires = "clean")]
    base_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Site configuration file (default: ./sitecarve.toml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Source site origin; overrides the configuration file
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Directory of the regenerated site; overrides the configuration file
    #[arg(long, value_name = "DIR")]
    output_root: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// Number of items to skip
    #[arg(long, default_value = "0", value_name = "NUM")]
    offset: usize,

    /// Maximum number of items to process
    #[arg(long, value_name = "NUM")]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    batch: BatchArgs,

    /// Rewrite pages that already exist
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
struct ImagesArgs {
    #[command(flatten)]
    site: SiteArgs,

    #[command(flatten)]
    batch: BatchArgs,
}

impl SiteArgs {
    /// Loads the site configuration and applies command-line overrides.
    fn load(&self) -> anyhow::Result<SiteConfig> {
        let path = self.config.clone().or_else(|| if self.base_url.is_some() { None } else { SiteConfig::discover() });

        let mut config = match (&path, &self.base_url) {
            (Some(path), _) => SiteConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
            (None, Some(base_url)) => SiteConfig::new(base_url.as_str()),
            (None, None) => bail!("No site configuration found; pass --config or --base-url"),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(output_root) = &self.output_root {
            config.output_root = output_root.clone();
        }

        let config = config.validated().context("Invalid site configuration")?;
        tracing::debug!(base_url = %config.base_url, output_root = %config.output_root.display(), "site configuration");
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).with_target(false).init();
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to serialize report")?);
    Ok(())
}

async fn run_extract(args: ExtractArgs, verbose: bool) -> anyhow::Result<()> {
    let specs: Vec<String> = if args.triggers.is_empty() {
        DEFAULT_TRIGGERS.iter().map(|s| s.to_string()).collect()
    } else {
        args.triggers
    };
    let triggers = specs
        .iter()
        .map(|spec| spec.parse::<AttrMatch>())
        .collect::<Result<Vec<_>, _>>()
        .context("Invalid --trigger")?;

    let html = if args.input == "-" {
        if verbose {
            echo::print_step(1, 3, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else if args.input.starts_with("http://") || args.input.starts_with("https://") {
        if verbose {
            echo::print_step(1, 3, &format!("Fetching from {}", args.input.bright_white().underline()));
        }
        let config = FetchConfig {
            timeout: args.timeout,
            user_agent: args.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };
        fetch_url(&args.input, &config).await.context("Failed to fetch URL")?
    } else {
        if verbose {
            echo::print_step(1, 3, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if verbose {
        eprintln!("  {} {}\n", "Size:".dimmed(), echo::format_size(html.len()).bright_white());
        let names: Vec<String> = triggers.iter().map(ToString::to_string).collect();
        echo::print_step(2, 3, &format!("Capturing region ({})", names.join(" | ")));
    }

    let Some(mut region) = extract_region(&html, triggers.as_slice()) else {
        bail!("No content region matched {}", specs.join(" or "));
    };
    if !region.complete {
        echo::print_warning("Region was not closed before the end of input");
    }
    if region.is_empty() {
        echo::print_warning("Region is empty");
    }

    if args.clean {
        region.content = clean_content(&region.content, args.base_url.as_deref().unwrap_or_default());
    }

    if verbose {
        eprintln!("  {} {}", "Tokens:".dimmed(), region.token_count.to_string().bright_white());
        eprintln!("  {} {}\n", "Output:".dimmed(), echo::format_size(region.content.len()).bright_white());
        echo::print_step(3, 3, "Writing output");
    }

    let output = if args.json {
        serde_json::to_string_pretty(&region).context("Failed to serialize region")?
    } else {
        region.content
    };

    match args.output {
        Some(path) => {
            fs::write(&path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None if output.is_empty() => {}
        None => println!("{}", output),
    }

    Ok(())
}

async fn run_scrape(args: ScrapeArgs) -> anyhow::Result<()> {
    let config = args.site.load()?;
    let fetcher = HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?;
    let options = ScrapeOptions { offset: args.batch.offset, limit: args.batch.limit, force: args.force };

    let start = Instant::now();
    let report = scrape_site(&config, &fetcher, options).await.context("Scrape failed")?;

    if args.site.json {
        return print_json(&report);
    }
    echo::print_summary(
        "Scrape",
        &[
            ("Pages", report.total.to_string()),
            ("Written", report.written.to_string()),
            ("Skipped", report.skipped.to_string()),
            ("No content", report.no_content.to_string()),
            ("Outside site", report.out_of_site.to_string()),
            ("Failed", report.failed.to_string()),
        ],
    );
    echo::print_success(&format!(
        "Wrote {} pages to {} in {}",
        report.written,
        config.output_root.display(),
        echo::format_duration(start.elapsed())
    ));
    Ok(())
}

async fn run_images(args: ImagesArgs) -> anyhow::Result<()> {
    let config = args.site.load()?;
    let fetcher = HttpFetcher::new(&config.fetch).context("Failed to build HTTP client")?;
    let batch = Batch::new(args.batch.offset, args.batch.limit);

    let start = Instant::now();
    let report = localize_images(&config, batch, &fetcher).await.context("Image localization failed")?;

    if args.site.json {
        return print_json(&report);
    }
    echo::print_summary(
        "Images",
        &[
            ("Pages", format!("{} of {}", report.pages, report.total_pages)),
            ("Downloaded", report.downloaded.to_string()),
            ("Reused", report.reused.to_string()),
            ("Failed", report.failed.to_string()),
        ],
    );
    if report.failed > 0 {
        echo::print_warning(&format!("{} images kept their remote source", report.failed));
    }
    echo::print_success(&format!("Images localized in {}", echo::format_duration(start.elapsed())));
    Ok(())
}

fn run_organize(args: SiteArgs) -> anyhow::Result<()> {
    let config = args.load()?;
    if config.taxonomy.is_empty() {
        echo::print_info("No [[taxonomy]] rules configured; nothing to organize");
    }

    let report = organize_images(&config).context("Image organization failed")?;

    if args.json {
        return print_json(&report);
    }
    echo::print_success(&format!(
        "Updated {} pages, moved {} images",
        report.pages_updated, report.images_moved
    ));
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let result = match cli.command {
        Command::Extract(args) => run_extract(args, cli.verbose).await,
        Command::Scrape(args) => run_scrape(args).await,
        Command::Images(args) => run_images(args).await,
        Command::Organize(args) => run_organize(args),
        Command::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "sitecarve", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            echo::print_error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
