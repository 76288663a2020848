use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use analytics::{aggregate_by_country, aggregate_by_faction, attribute_summary};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use coordinator::{
    load_settings, load_settings_from, CoordinatorSettings, SelectionCoordinator, ViewAdapter,
};
use entry_store::EntryTable;
use serde_json::json;
use shared::{
    attributes::Attribute,
    domain::{PartyId, PartySet, ViewId, Year},
    protocol::{StoreChange, ViewCommand},
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod dataset;

#[derive(Parser, Debug)]
#[command(name = "linkview", about = "Drive the linked-view coordinator from the command line")]
struct Cli {
    /// Settings file; defaults to ./linkview.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON list of view commands and print the state after each.
    Replay {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        script: PathBuf,
    },
    /// Box-plot summary of one attribute in one year.
    Summary {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        attribute: Attribute,
        /// Party ids brushed before summarising.
        #[arg(long, value_delimiter = ',')]
        brush: Vec<i64>,
        #[arg(long)]
        brushed_only: bool,
    },
    /// Per-faction or per-country means for one year.
    Aggregate {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        year: i32,
        #[arg(long, value_enum, default_value_t = GroupBy::Faction)]
        by: GroupBy,
        #[arg(long, value_delimiter = ',', required = true)]
        dims: Vec<Attribute>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum GroupBy {
    Faction,
    Country,
}

/// Stands in for a rendering surface: logs every redraw it is asked for.
struct LoggingView {
    id: ViewId,
    redraws: usize,
}

impl ViewAdapter for LoggingView {
    fn view_id(&self) -> &ViewId {
        &self.id
    }

    fn redraw(&mut self, change: &StoreChange, table: &EntryTable) {
        self.redraws += 1;
        debug!(
            view = %self.id,
            ?change,
            brushed = table.brushed_count(),
            hovered = table.hovered_count(),
            "redraw"
        );
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };

    match cli.command {
        Command::Replay { dataset, script } => replay(&settings, &dataset, &script),
        Command::Summary {
            dataset,
            year,
            attribute,
            brush,
            brushed_only,
        } => summary(&settings, &dataset, Year(year), attribute, brush, brushed_only),
        Command::Aggregate {
            dataset,
            year,
            by,
            dims,
        } => aggregate(&dataset, Year(year), by, &dims),
    }
}

fn replay(settings: &CoordinatorSettings, dataset: &Path, script: &Path) -> Result<()> {
    let store = dataset::load_store(dataset)?;
    let raw = fs::read_to_string(script)
        .with_context(|| format!("failed to read script '{}'", script.display()))?;
    let commands: Vec<ViewCommand> = serde_json::from_str(&raw)
        .with_context(|| format!("script '{}' is not a list of view commands", script.display()))?;

    let mut coordinator = SelectionCoordinator::new(store, settings);
    let view = Rc::new(RefCell::new(LoggingView {
        id: ViewId::new("log"),
        redraws: 0,
    }));
    coordinator.attach_view(Rc::clone(&view));

    for (step, command) in commands.into_iter().enumerate() {
        let name = command.name();
        let line = match coordinator.dispatch(command) {
            Ok(outcome) => json!({
                "step": step,
                "command": name,
                "outcome": outcome,
                "canonical": coordinator.canonical_selection(),
                "brushed": coordinator.table().brushed_count(),
                "hovered": coordinator.table().hovered_count(),
            }),
            Err(error) => {
                warn!(step, command = name, %error, "command rejected");
                json!({ "step": step, "command": name, "error": error.to_string() })
            }
        };
        println!("{line}");
    }

    debug!(redraws = view.borrow().redraws, "replay finished");
    Ok(())
}

fn summary(
    settings: &CoordinatorSettings,
    dataset: &Path,
    year: Year,
    attribute: Attribute,
    brush: Vec<i64>,
    brushed_only: bool,
) -> Result<()> {
    let store = dataset::load_store(dataset)?;
    let mut coordinator = SelectionCoordinator::new(store, settings);
    coordinator.set_year(year);
    if !brush.is_empty() {
        let view_id = ViewId::new("cli");
        coordinator.register_view(view_id.clone());
        let selection: PartySet = brush.into_iter().map(PartyId).collect();
        coordinator.apply_brush(&view_id, Some(selection))?;
    }
    if !attribute.is_available_in(year) {
        warn!(%attribute, %year, "attribute was not surveyed in this year");
    }

    let rows = coordinator.table().entries_in_active_year();
    let summary = attribute_summary(rows, attribute, brushed_only);
    let line = json!({
        "year": year,
        "attribute": attribute,
        "brushed_only": brushed_only,
        "summary": summary,
    });
    println!("{line}");
    Ok(())
}

fn aggregate(dataset: &Path, year: Year, by: GroupBy, dims: &[Attribute]) -> Result<()> {
    let store = dataset::load_store(dataset)?;
    let rows = store.entries_in_year(year);
    let groups = match by {
        GroupBy::Faction => aggregate_by_faction(rows, dims),
        GroupBy::Country => aggregate_by_country(rows, dims),
    };
    for group in groups {
        let line = json!({
            "id": group.key,
            "label": group.label(),
            "members": group.member_count,
            "values": group.values,
        });
        println!("{line}");
    }
    Ok(())
}
