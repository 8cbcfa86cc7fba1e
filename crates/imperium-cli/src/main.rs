use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use imperium_cli::commands::{blueprint, build, calc, init, modules, research, scan};
use imperium_cli::commands::build::KindArg;
use imperium_cli::context::GlobalOptions;
use imperium_cli::output::OutputFormat;
use imperium_lib::catalog::{BuildingTypeId, FactionId, ResearchId};
use imperium_lib::construction::QueueEntryId;
use imperium_lib::store::DATABASE_ENV;
use imperium_lib::{BlueprintId, PlanetId, PlayerId};

#[derive(Parser, Debug)]
#[command(author, version, about = "Imperium blueprint, construction and research utilities")]
struct Cli {
    /// Directory holding modules.csv, research.csv and buildings.csv.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// SQLite database path. Defaults to imperium.db in the data directory.
    #[arg(long, global = true, env = DATABASE_ENV)]
    database: Option<PathBuf>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or migrate the database, optionally seeding a player and planet.
    Init {
        #[arg(long)]
        player: Option<String>,
        #[arg(long, requires = "player")]
        faction: Option<FactionId>,
        #[arg(long, requires = "player")]
        planet: Option<String>,
    },
    /// Calculate stats and costs for a blueprint JSON file.
    Calc {
        path: PathBuf,
        /// Validate research against this player's completed research.
        #[arg(long)]
        player: Option<PlayerId>,
    },
    /// List the module catalog.
    Modules,
    /// Manage saved blueprints.
    Blueprint {
        #[command(subcommand)]
        action: BlueprintCommand,
    },
    /// Inspect and drive research.
    Research {
        #[command(subcommand)]
        action: ResearchCommand,
    },
    /// Queue or cancel construction orders.
    Build {
        #[command(subcommand)]
        action: BuildCommand,
    },
    /// Complete every construction order that is due.
    Scan {
        /// Scan as of this RFC 3339 timestamp instead of now.
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
}

#[derive(Subcommand, Debug)]
enum BlueprintCommand {
    Save {
        #[arg(long)]
        player: PlayerId,
        path: PathBuf,
    },
    List {
        #[arg(long)]
        player: PlayerId,
    },
    Delete {
        #[arg(long)]
        player: PlayerId,
        id: BlueprintId,
    },
}

#[derive(Subcommand, Debug)]
enum ResearchCommand {
    /// Show every research node visible to the player.
    Status {
        #[arg(long)]
        player: PlayerId,
    },
    Start {
        #[arg(long)]
        player: PlayerId,
        research_id: ResearchId,
    },
    Cancel {
        #[arg(long)]
        player: PlayerId,
    },
    /// Apply one research tick.
    Tick {
        #[arg(long)]
        player: PlayerId,
        /// Research points produced this tick.
        #[arg(long, default_value_t = 0)]
        points: u64,
    },
}

#[derive(Subcommand, Debug)]
enum BuildCommand {
    Ship {
        #[arg(long)]
        player: PlayerId,
        #[arg(long)]
        planet: PlanetId,
        #[arg(long)]
        blueprint: BlueprintId,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    Building {
        #[arg(long)]
        player: PlayerId,
        #[arg(long)]
        planet: PlanetId,
        #[arg(long = "type")]
        building_type: BuildingTypeId,
        #[arg(long, default_value_t = 1)]
        quantity: u32,
    },
    List {
        #[arg(long)]
        player: PlayerId,
    },
    Cancel {
        #[arg(long)]
        player: PlayerId,
        #[arg(value_enum)]
        kind: KindArg,
        id: QueueEntryId,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let options = GlobalOptions {
        data_dir: cli.data_dir,
        database: cli.database,
    };
    let format = cli.format;

    match cli.command {
        Command::Init {
            player,
            faction,
            planet,
        } => init::handle_init(
            &options,
            format,
            player.as_deref(),
            faction,
            planet.as_deref(),
        ),
        Command::Calc { path, player } => calc::handle_calc(&options, format, &path, player),
        Command::Modules => modules::handle_list_modules(&options, format),
        Command::Blueprint { action } => match action {
            BlueprintCommand::Save { player, path } => {
                blueprint::handle_save(&options, format, player, &path)
            }
            BlueprintCommand::List { player } => blueprint::handle_list(&options, format, player),
            BlueprintCommand::Delete { player, id } => {
                blueprint::handle_delete(&options, format, player, id)
            }
        },
        Command::Research { action } => match action {
            ResearchCommand::Status { player } => research::handle_status(&options, format, player),
            ResearchCommand::Start {
                player,
                research_id,
            } => research::handle_start(&options, format, player, research_id),
            ResearchCommand::Cancel { player } => research::handle_cancel(&options, format, player),
            ResearchCommand::Tick { player, points } => {
                research::handle_tick(&options, format, player, points)
            }
        },
        Command::Build { action } => match action {
            BuildCommand::Ship {
                player,
                planet,
                blueprint,
                quantity,
            } => build::handle_ship(&options, format, player, planet, blueprint, quantity),
            BuildCommand::Building {
                player,
                planet,
                building_type,
                quantity,
            } => build::handle_building(&options, format, player, planet, building_type, quantity),
            BuildCommand::List { player } => build::handle_list(&options, format, player),
            BuildCommand::Cancel { player, kind, id } => {
                build::handle_cancel(&options, format, player, kind, id)
            }
        },
        Command::Scan { at } => scan::handle_scan(&options, format, at),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
