use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tandem::analysis::filter::{clamp_year, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN};
use tandem::config::{CompareConfig, Config};
use tandem::embedding::EmbeddingMethod;
use tandem::output::{markdown, terminal};
use tandem::pipeline::compare::ComparisonReport;
use tandem::pipeline::explore;
use tandem::records::ids::normalize_id;
use tandem::records::models::TermSource;
use tandem::session::{AnalysisSession, QueryParams};
use tandem::sources::loader::InstitutionLoader;
use tandem::sources::RoutedSource;

/// Tandem: compare two institutions' research output side by side.
///
/// Loads each institution's roster and publication exports, then reports
/// publication trends, cross-institution co-authorship, topic overlap and
/// a 2-D map of authors by research topic.
#[derive(Parser)]
#[command(name = "tandem", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Query flags shared by `compare`, `pair` and `explore`.
#[derive(clap::Args, Debug, Clone)]
struct QueryArgs {
    /// Institution A (defaults to the config's A)
    #[arg(long)]
    a: Option<String>,

    /// Institution B (defaults to the config's B)
    #[arg(long)]
    b: Option<String>,

    /// First year of the window (clamped to 1990–2100)
    #[arg(long)]
    year_min: Option<f64>,

    /// Last year of the window (clamped to 1990–2100)
    #[arg(long)]
    year_max: Option<f64>,

    /// Divide counts by headcount
    #[arg(long)]
    per_capita: bool,

    /// Count every appointment in the headcount, not just full-time
    #[arg(long)]
    all_appointments: bool,

    /// Use concepts instead of topics as terms
    #[arg(long)]
    concepts: bool,

    /// Keep every publication type (default: article, review, book, book-chapter)
    #[arg(long)]
    all_types: bool,

    /// Embedding method: pca or mds
    #[arg(long, default_value = "pca")]
    method: EmbeddingMethod,

    /// Fixed embedding seed (overrides TANDEM_SEED)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured institutions and defaults
    Institutions,

    /// Compare two institutions and write a report
    Compare {
        #[command(flatten)]
        query: QueryArgs,

        /// Highlight authors whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Also write the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List collaborating pairs, or the joint publications of one pair
    Pair {
        #[command(flatten)]
        query: QueryArgs,

        /// Author id from either roster (with --with, shows joint works)
        author: Option<String>,

        /// The other author of the pair
        #[arg(long)]
        with: Option<String>,

        /// How many pairs to list (default: 25)
        #[arg(long, default_value = "25")]
        limit: usize,
    },

    /// Interactive session: edit parameters and search from stdin
    Explore {
        #[command(flatten)]
        query: QueryArgs,
    },
}

impl QueryArgs {
    fn resolve(&self, base: QueryParams, config_seed: Option<u64>) -> QueryParams {
        QueryParams {
            a: self.a.clone().unwrap_or(base.a),
            b: self.b.clone().unwrap_or(base.b),
            year_min: self
                .year_min
                .map(|y| clamp_year(y, DEFAULT_YEAR_MIN))
                .unwrap_or(base.year_min),
            year_max: self
                .year_max
                .map(|y| clamp_year(y, DEFAULT_YEAR_MAX))
                .unwrap_or(base.year_max),
            per_capita: self.per_capita,
            full_time_only: !self.all_appointments,
            term_source: if self.concepts {
                TermSource::Concepts
            } else {
                TermSource::Topics
            },
            normalize_types: !self.all_types,
            method: self.method,
            seed: self.seed.or(config_seed),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tandem=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let comparison = config.load_comparison()?;

    match cli.command {
        Commands::Institutions => {
            terminal::display_institutions(&comparison);
        }

        Commands::Compare {
            query,
            search,
            json,
        } => {
            let mut session = open_session(&config, comparison);
            let params = query.resolve(session.default_params(), config.seed);
            info!(a = %params.a, b = %params.b, "Comparing");

            let report = with_spinner("Loading and comparing...", session.compare(&params)).await?;
            terminal::display_report(&report);

            if let Some(query) = search.as_deref() {
                if let (Some(embedding), Some(overlay)) = (session.last_embedding(), session.search(query)) {
                    terminal::display_search(embedding, &overlay);
                }
            }

            let stem = format!("tandem-{}-vs-{}", params.a, params.b);
            let md_path = config.output_dir.join(format!("{stem}.md"));
            let report_path = markdown::generate_report(&report, &md_path)?;
            println!(
                "\n{}",
                format!("Markdown report saved to: {report_path}").bold()
            );
            if json {
                let json_path =
                    markdown::write_json(&report, &config.output_dir.join(format!("{stem}.json")))?;
                println!("{}", format!("JSON report saved to: {json_path}").bold());
            }
        }

        Commands::Pair {
            query,
            author,
            with,
            limit,
        } => {
            let mut session = open_session(&config, comparison);
            let params = query.resolve(session.default_params(), config.seed);
            let report = with_spinner("Loading and comparing...", session.compare(&params)).await?;
            show_pairs(&report, author.as_deref(), with.as_deref(), limit);
        }

        Commands::Explore { query } => {
            let mut session = open_session(&config, comparison);
            let params = query.resolve(session.default_params(), config.seed);
            println!("{}", "Tandem explore — type `help` for commands.".bold());
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            explore::run(&mut session, stdin, params).await?;
        }
    }

    Ok(())
}

fn open_session(config: &Config, comparison: CompareConfig) -> AnalysisSession<RoutedSource> {
    let loader = InstitutionLoader::new(RoutedSource::new(config.data_dir.clone()));
    AnalysisSession::new(comparison, loader)
}

/// Await `work` behind a terminal spinner.
async fn with_spinner<T>(message: &str, work: impl Future<Output = T>) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let out = work.await;
    pb.finish_and_clear();
    out
}

fn show_pairs(report: &ComparisonReport, author: Option<&str>, with: Option<&str>, limit: usize) {
    match (author, with) {
        (Some(x), Some(y)) => {
            let (x, y) = (normalize_id(x), normalize_id(y));
            match report.graph.find_pair(&x, &y) {
                Some(pair) => terminal::display_pair_works(&report.graph, pair),
                None => println!("No joint publications for {x} and {y} in this window."),
            }
        }
        (Some(x), None) => {
            let x = normalize_id(x);
            let mut involving = report.graph.clone();
            involving
                .pairs
                .retain(|p| p.author_a == x || p.author_b == x);
            terminal::display_pairs(&involving, limit);
        }
        _ => terminal::display_pairs(&report.graph, limit),
    }
}
