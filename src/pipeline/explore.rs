// Interactive explore loop.
//
// Reads one command per line. Parameter edits are debounced and trigger a
// background recompute (load, then compute on a blocking thread), so input
// keeps being read while data loads. Search commands restyle the last
// embedding immediately. Results are tagged with a generation token and
// anything older than the newest request is dropped.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::compare::ComparisonReport;
use super::debounce::{Debouncer, Generation};
use crate::analysis::filter::{clamp_year, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN};
use crate::embedding::EmbeddingMethod;
use crate::output::terminal;
use crate::records::models::TermSource;
use crate::session::{AnalysisSession, QueryParams};
use crate::sources::traits::DatasetSource;

pub const HELP: &str = "\
Commands:
  a <key> | b <key> | swap        choose institutions
  year-min <year> | year-max <year>
  per-capita on|off               divide by headcount
  full-time on|off                count only full-time appointments
  terms topics|concepts
  types default|all
  method pca|mds
  seed <n>|off
  search <text>                   highlight authors (empty clears)
  show | help | quit";

/// An edit to the query parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamChange {
    A(String),
    B(String),
    Swap,
    YearMin(i32),
    YearMax(i32),
    PerCapita(bool),
    FullTimeOnly(bool),
    Terms(TermSource),
    NormalizeTypes(bool),
    Method(EmbeddingMethod),
    Seed(Option<u64>),
}

impl ParamChange {
    pub fn apply(self, params: &mut QueryParams) {
        match self {
            ParamChange::A(key) => params.a = key,
            ParamChange::B(key) => params.b = key,
            ParamChange::Swap => *params = params.swapped(),
            ParamChange::YearMin(y) => params.year_min = y,
            ParamChange::YearMax(y) => params.year_max = y,
            ParamChange::PerCapita(on) => params.per_capita = on,
            ParamChange::FullTimeOnly(on) => params.full_time_only = on,
            ParamChange::Terms(source) => params.term_source = source,
            ParamChange::NormalizeTypes(on) => params.normalize_types = on,
            ParamChange::Method(method) => params.method = method,
            ParamChange::Seed(seed) => params.seed = seed,
        }
    }
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum ExploreCommand {
    Change(ParamChange),
    Search(String),
    Show,
    Help,
    Quit,
    Empty,
}

fn parse_switch(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => bail!("expected on or off, got '{other}'"),
    }
}

fn parse_year(value: &str, default: i32) -> i32 {
    clamp_year(value.trim().parse::<f64>().unwrap_or(0.0), default)
}

impl ExploreCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_lowercase().as_str() {
            "" => ExploreCommand::Empty,
            "a" if !rest.is_empty() => ExploreCommand::Change(ParamChange::A(rest.to_string())),
            "b" if !rest.is_empty() => ExploreCommand::Change(ParamChange::B(rest.to_string())),
            "swap" => ExploreCommand::Change(ParamChange::Swap),
            "year-min" => ExploreCommand::Change(ParamChange::YearMin(parse_year(rest, DEFAULT_YEAR_MIN))),
            "year-max" => ExploreCommand::Change(ParamChange::YearMax(parse_year(rest, DEFAULT_YEAR_MAX))),
            "per-capita" => ExploreCommand::Change(ParamChange::PerCapita(parse_switch(rest)?)),
            "full-time" => ExploreCommand::Change(ParamChange::FullTimeOnly(parse_switch(rest)?)),
            "terms" => match rest.to_lowercase().as_str() {
                "topics" => ExploreCommand::Change(ParamChange::Terms(TermSource::Topics)),
                "concepts" => ExploreCommand::Change(ParamChange::Terms(TermSource::Concepts)),
                other => bail!("expected topics or concepts, got '{other}'"),
            },
            "types" => match rest.to_lowercase().as_str() {
                "default" => ExploreCommand::Change(ParamChange::NormalizeTypes(true)),
                "all" => ExploreCommand::Change(ParamChange::NormalizeTypes(false)),
                other => bail!("expected default or all, got '{other}'"),
            },
            "method" => ExploreCommand::Change(ParamChange::Method(rest.parse()?)),
            "seed" if rest.eq_ignore_ascii_case("off") => ExploreCommand::Change(ParamChange::Seed(None)),
            "seed" => ExploreCommand::Change(ParamChange::Seed(Some(
                rest.parse::<u64>()
                    .with_context(|| format!("seed must be an unsigned integer, got '{rest}'"))?,
            ))),
            "search" | "/" => ExploreCommand::Search(rest.to_string()),
            "show" => ExploreCommand::Show,
            "help" | "?" => ExploreCommand::Help,
            "quit" | "exit" | "q" => ExploreCommand::Quit,
            other => bail!("unknown command '{other}' (try `help`)"),
        };
        Ok(command)
    }
}

/// What one explore session did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExploreSummary {
    /// Recomputes started.
    pub recomputes: usize,
    /// Results rendered.
    pub shown: usize,
    /// Results dropped because a newer request had been made.
    pub discarded: usize,
}

/// Drive the explore loop until `quit` or end of input. Pending work is
/// drained before returning on end of input.
pub async fn run<S, R>(
    session: &mut AnalysisSession<S>,
    input: R,
    mut params: QueryParams,
) -> Result<ExploreSummary>
where
    S: DatasetSource + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let generation = Generation::new();
    let mut debouncer = Debouncer::default();
    let (tx, mut rx) = mpsc::unbounded_channel::<(u64, Result<ComparisonReport>)>();
    let mut summary = ExploreSummary::default();

    let mut search = String::new();
    let mut in_flight: Option<u64> = None;
    let mut input_open = true;

    // Initial render.
    debouncer.trigger();

    loop {
        if !input_open && !debouncer.is_armed() && in_flight.is_none() {
            break;
        }

        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line.context("Failed to read input")? else {
                    input_open = false;
                    continue;
                };
                match ExploreCommand::parse(&line) {
                    Ok(ExploreCommand::Change(change)) => {
                        change.apply(&mut params);
                        debouncer.trigger();
                    }
                    Ok(ExploreCommand::Search(query)) => {
                        search = query;
                        match session.search(&search) {
                            Some(overlay) => {
                                if let Some(embedding) = session.last_embedding() {
                                    terminal::display_search(embedding, &overlay);
                                }
                            }
                            None => println!("{}", "No embedding yet.".dimmed()),
                        }
                    }
                    Ok(ExploreCommand::Show) => terminal::display_params(&params),
                    Ok(ExploreCommand::Help) => println!("{HELP}"),
                    Ok(ExploreCommand::Quit) => break,
                    Ok(ExploreCommand::Empty) => {}
                    Err(e) => println!("{}", format!("{e:#}").red()),
                }
            }

            _ = debouncer.ready() => {
                let token = generation.advance();
                let loader = session.pair_loader();
                let request = params.clone();
                let tx = tx.clone();
                in_flight = Some(token);
                summary.recomputes += 1;
                debug!(token, "Dispatching recompute");
                tokio::spawn(async move {
                    let result = loader.compare(&request).await;
                    // Receiver only goes away when the loop has exited.
                    let _ = tx.send((token, result));
                });
            }

            Some((token, result)) = rx.recv() => {
                if !generation.is_current(token) {
                    summary.discarded += 1;
                    debug!(token, latest = generation.current(), "Discarding stale result");
                    continue;
                }
                in_flight = None;
                match result {
                    Ok(report) => {
                        summary.shown += 1;
                        session.accept(&report);
                        terminal::display_report(&report);
                        if !search.trim().is_empty() {
                            if let (Some(embedding), Some(overlay)) =
                                (session.last_embedding(), session.search(&search))
                            {
                                terminal::display_search(embedding, &overlay);
                            }
                        }
                    }
                    Err(e) => println!("{}", format!("Recompute failed: {e:#}").red()),
                }
            }
        }
    }

    info!(
        recomputes = summary.recomputes,
        shown = summary.shown,
        discarded = summary.discarded,
        "Explore session ended"
    );
    Ok(summary)
}
