use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storyguide_cli::output::{render_json, render_listing, render_text, OutputFormat};
use storyguide_core::dashboard::{
    SortBy, StatusFilter, StoryListController, StoryQuery, ViewConfig, DEFAULT_STORIES_PER_PAGE,
};
use storyguide_core::rules::DebugConfig;
use storyguide_core::storage::FileStorage;
use storyguide_core::{GuidanceConfig, GuidanceProcessor};

/// Exit code for `check --fail-on-guidance` when the story has guidance
const GUIDANCE_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(name = "storyguide")]
#[command(about = "Prepublish guidance checks for visual stories", version)]
struct Cli {
    /// Path to custom guidance config file (YAML format)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Report cache directory (default: platform cache dir)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run guidance over a story JSON file
    Check {
        /// Story JSON file
        input: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Log timings for every processing step and rule
        #[arg(long)]
        profile: bool,

        /// Skip cache and force a fresh check
        #[arg(long)]
        skip_cache: bool,

        /// Trace rule outcomes for elements whose id matches (regex or substring).
        /// Enables debug logging and bypasses the cache.
        #[arg(long = "debug-filter")]
        debug_filter: Vec<String>,

        /// Exit with code 2 when any guidance is reported
        #[arg(long)]
        fail_on_guidance: bool,
    },
    /// List saved stories the way the dashboard does
    List {
        /// Directory of `<id>.json` story files
        #[arg(short, long)]
        dir: PathBuf,

        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, value_enum, default_value_t = StatusArg::All)]
        status: StatusArg,

        #[arg(long, value_enum, default_value_t = SortArg::LastModified)]
        sort: SortArg,

        #[arg(long, default_value_t = DEFAULT_STORIES_PER_PAGE)]
        per_page: usize,

        /// How many pages to load
        #[arg(long, default_value_t = 1)]
        pages: usize,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the effective guidance config as YAML
    ShowConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Draft,
    Published,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => StatusFilter::All,
            StatusArg::Draft => StatusFilter::Draft,
            StatusArg::Published => StatusFilter::Published,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    LastModified,
    Name,
    CreatedBy,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::LastModified => SortBy::LastModified,
            SortArg::Name => SortBy::Name,
            SortArg::CreatedBy => SortBy::CreatedBy,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tracing_rules = matches!(&cli.command, Command::Check { debug_filter, .. } if !debug_filter.is_empty());
    let mut filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "storyguide=info".into()),
    );
    if tracing_rules {
        filter = filter.add_directive("storyguide=debug".parse::<Directive>()?);
    }

    // Logs go to stderr so stdout carries only the report
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    let config = GuidanceConfig::load_with_fallback(cli.config.as_deref());
    if let Some(path) = &cli.config {
        tracing::info!(path = path.as_str(), "Loaded guidance config");
    }

    match cli.command {
        Command::Check {
            input,
            format,
            output,
            profile,
            skip_cache,
            debug_filter,
            fail_on_guidance,
        } => {
            let mut processor = create_processor(cli.cache_dir.as_deref())?;
            // Rule tracing needs the rules to actually run
            let skip_cache = skip_cache || !debug_filter.is_empty();
            if !debug_filter.is_empty() {
                processor.set_debug_config(DebugConfig::new(true, debug_filter));
            }

            let (story, report) = processor.check_story_file(&input, &config, profile, skip_cache)?;
            let rendered = match format {
                OutputFormat::Text => render_text(&report, &story),
                OutputFormat::Json => render_json(&report)?,
            };

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{rendered}"),
            }

            if fail_on_guidance && !report.is_clean() {
                std::process::exit(GUIDANCE_EXIT_CODE);
            }
        }
        Command::List {
            dir,
            search,
            status,
            sort,
            per_page,
            pages,
            format,
        } => {
            let storage = FileStorage::new(&dir)?;
            let sort = SortBy::from(sort);
            let query = StoryQuery {
                search,
                status: status.into(),
                sort,
                direction: sort.default_direction(),
                per_page,
            };

            let mut controller = StoryListController::new(&storage, query, ViewConfig::default());
            for _ in 0..pages.max(1) {
                if controller.request_next_page()? == 0 {
                    break;
                }
            }

            match format {
                OutputFormat::Text => print!(
                    "{}",
                    render_listing(&controller.content_view(), controller.total_stories())
                ),
                OutputFormat::Json => println!("{}", render_json(&controller.stories())?),
            }
        }
        Command::ShowConfig => {
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}

/// File-backed processor when a cache dir is known, otherwise in-memory only
fn create_processor(cache_dir: Option<&Path>) -> Result<GuidanceProcessor> {
    let cache_dir = cache_dir
        .map(Path::to_path_buf)
        .or_else(|| dirs::cache_dir().map(|dir| dir.join("storyguide")));

    match cache_dir {
        Some(dir) => {
            tracing::debug!(cache_dir = %dir.display(), "Using report cache");
            GuidanceProcessor::with_file_cache(dir)
        }
        None => {
            tracing::warn!("No cache directory available, reports will not be cached");
            Ok(GuidanceProcessor::in_memory())
        }
    }
}
