use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use backlog_rank::config::Config;
use backlog_rank::db::Database;
use backlog_rank::models::Placement;

#[derive(Parser)]
#[command(name = "brank")]
#[command(about = "Rank stories within backlogs")]
struct Cli {
    /// Path to the rank database (overrides BACKLOG_RANK_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Place a story immediately above another
    Above {
        item: Uuid,
        context: Uuid,
        reference: Uuid,
    },
    /// Place a story immediately below another
    Below {
        item: Uuid,
        context: Uuid,
        reference: Uuid,
    },
    /// Move a story to the top of a backlog
    Head { item: Uuid, context: Uuid },
    /// Move a story to the bottom of a backlog
    Bottom { item: Uuid, context: Uuid },
    /// Unrank a story in one backlog
    Remove { item: Uuid, context: Uuid },
    /// Unrank a story in every backlog
    RemoveItem { item: Uuid },
    /// Drop all ranks of a backlog
    RemoveContext { context: Uuid },
    /// Move a story from one backlog into another
    Move {
        item: Uuid,
        from: Uuid,
        to: Uuid,
        #[command(flatten)]
        placement: PlacementArgs,
    },
    /// List a backlog's stories, top first
    List {
        context: Uuid,
        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Target spot for `move`. Defaults to the bottom.
#[derive(Args)]
#[group(multiple = false)]
struct PlacementArgs {
    #[arg(long, value_name = "STORY")]
    above: Option<Uuid>,
    #[arg(long, value_name = "STORY")]
    below: Option<Uuid>,
    #[arg(long)]
    head: bool,
}

impl PlacementArgs {
    fn placement(&self) -> Placement {
        match (self.above, self.below, self.head) {
            (Some(reference), _, _) => Placement::Above(reference),
            (_, Some(reference), _) => Placement::Below(reference),
            (_, _, true) => Placement::Head,
            _ => Placement::Bottom,
        }
    }
}

/// Initialize tracing on stderr so stdout stays clean for listings
fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env(cli.db)?;
    init_tracing(&config.log_filter);

    let db = Database::open(config.db_path)?;
    db.migrate()?;

    match cli.command {
        Commands::Above {
            item,
            context,
            reference,
        } => db.rank_above(item, context, reference)?,
        Commands::Below {
            item,
            context,
            reference,
        } => db.rank_below(item, context, reference)?,
        Commands::Head { item, context } => db.rank_to_head(item, context)?,
        Commands::Bottom { item, context } => db.rank_to_bottom(item, context)?,
        Commands::Remove { item, context } => {
            if !db.remove_rank(item, context)? {
                tracing::warn!("Item {} is not ranked in context {}", item, context);
            }
        }
        Commands::RemoveItem { item } => {
            let removed = db.remove_all_ranks_for_item(item)?;
            println!("Removed {} rank entries", removed);
        }
        Commands::RemoveContext { context } => {
            let removed = db.remove_all_ranks_for_context(context)?;
            println!("Removed {} rank entries", removed);
        }
        Commands::Move {
            item,
            from,
            to,
            placement,
        } => db.move_to_context(item, from, to, placement.placement())?,
        Commands::List { context, json } => {
            let entries = db.list_entries(context)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in entries {
                    let position = entry.position.map(|p| p.to_string()).unwrap_or_default();
                    println!("{}\t{}", position, entry.item_id);
                }
            }
        }
    }

    Ok(())
}
