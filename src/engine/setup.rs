use tracing::debug;

use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::rng::{unique_random_subset, RandomSource};
use crate::rooms::{Container, StandardRoom};
use crate::types::{ContainerId, EntityId, Suspect};
use crate::world::World;

pub(super) struct Seating {
    pub world: World,
    pub murderers: Vec<EntityId>,
}

pub(super) fn seat_party<R: RandomSource + ?Sized>(
    config: &GameConfig,
    rng: &mut R,
) -> Result<Seating, ConfigError> {
    config.validate()?;

    let rooms = config
        .rooms
        .iter()
        .enumerate()
        .map(|(idx, room)| {
            StandardRoom::new(idx + 1, room.name, room.capacity, room.resolved_weapons())
        })
        .collect();
    let mut world = World::new(rooms, config.character_count);

    let murderer_ids = unique_random_subset(
        0,
        config.character_count as i32,
        config.murderer_count,
        rng,
    )?;

    let mut cast = Vec::with_capacity(config.character_count);
    let mut murderers = Vec::with_capacity(config.murderer_count);
    for (idx, &name) in Suspect::ALL
        .iter()
        .enumerate()
        .take(config.character_count)
    {
        let murderer = murderer_ids.contains(&(idx as i32));
        let id = world.spawn(name, murderer);
        if murderer {
            murderers.push(id);
        }
        cast.push(id);
    }

    let mut waiting = cast.into_iter().peekable();
    for number in 1..=config.rooms.len() {
        while waiting.peek().is_some() {
            let full = world.room(number).map(|room| room.is_full()).unwrap_or(true);
            if full {
                break;
            }
            if let Some(id) = waiting.next() {
                world.place(id, ContainerId::Room(number))?;
            }
        }
    }
    let mut overflow = 0;
    for id in waiting {
        world.place(id, ContainerId::Lobby)?;
        overflow += 1;
    }
    debug!(
        characters = config.character_count,
        murderers = murderers.len(),
        overflow,
        "party seated"
    );

    Ok(Seating { world, murderers })
}
