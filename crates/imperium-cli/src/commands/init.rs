//! `init`: create or migrate the database and optionally seed a player.

use anyhow::{Context, Result};
use serde::Serialize;

use imperium_lib::catalog::FactionId;
use imperium_lib::{Planet, Player};

use crate::context::GlobalOptions;
use crate::output::{emit, OutputFormat};

#[derive(Debug, Default, Serialize)]
struct InitOutcome {
    database: String,
    player: Option<Player>,
    planet: Option<Planet>,
}

pub fn handle_init(
    options: &GlobalOptions,
    format: OutputFormat,
    player: Option<&str>,
    faction: Option<FactionId>,
    planet: Option<&str>,
) -> Result<()> {
    let path = options.database_path()?;
    let store = options.open_store()?;
    let mut outcome = InitOutcome {
        database: path.display().to_string(),
        ..InitOutcome::default()
    };

    if let Some(name) = player {
        let created = store
            .create_player(name, faction)
            .with_context(|| format!("failed to create player '{name}'"))?;
        if let Some(planet_name) = planet {
            outcome.planet = Some(
                store
                    .create_planet(created.id, planet_name)
                    .with_context(|| format!("failed to create planet '{planet_name}'"))?,
            );
        }
        outcome.player = Some(created);
    }

    emit(format, &outcome, |o| {
        let mut text = format!("Database ready at {}\n", o.database);
        if let Some(player) = &o.player {
            text.push_str(&format!("Created player {} ({})\n", player.id, player.name));
        }
        if let Some(planet) = &o.planet {
            text.push_str(&format!("Created planet {} ({})\n", planet.id, planet.name));
        }
        text
    })
}
