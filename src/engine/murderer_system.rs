use tracing::{error, info};

use super::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KillDecision {
    Killed(KillReport),
    /// Fewer than two possible victims shared the room.
    HeldOff { pool: usize },
    Unarmed,
}

impl<R: RandomSource> GameEngine<R> {
    pub(super) fn arm(&mut self, slot: usize) -> bool {
        let Some(murderer) = self.murderers.get(slot) else {
            return false;
        };
        let name = murderer.name;
        let Some(ContainerId::Room(number)) = self.location_of(murderer.entity) else {
            info!(%name, "murderer is not in a room, stays unarmed");
            return false;
        };
        let Some(room) = self.world.room_mut(number) else {
            return false;
        };
        let Some(weapon) = room.take_random_weapon(&mut self.rng) else {
            info!(%name, room = number, "no weapons left to take");
            return false;
        };

        debug!(%name, room = number, weapon = weapon.name(), "murderer armed");
        self.murderers[slot].weapon = Some(weapon);
        true
    }

    pub(super) fn determine_to_kill(&mut self, slot: usize) -> KillDecision {
        let Some(murderer) = self.murderers.get(slot) else {
            return KillDecision::Unarmed;
        };
        let name = murderer.name;
        if !murderer.is_armed() {
            error!(%name, "unarmed murderer cannot kill");
            return KillDecision::Unarmed;
        }

        let pool: Vec<EntityId> = match self.location_of(murderer.entity) {
            Some(ContainerId::Room(number)) => self
                .world
                .room(number)
                .map(|room| {
                    room.occupants()
                        .iter()
                        .copied()
                        .filter(|&id| {
                            self.world
                                .entity(id)
                                .map(|entity| entity.is_alive() && !entity.is_murderer())
                                .unwrap_or(false)
                        })
                        .collect()
                })
                .unwrap_or_default(),
            _ => Vec::new(),
        };

        if pool.len() < 2 {
            info!(day = self.day, %name, pool = pool.len(), "murderer holds off");
            self.events.push(RuntimeEvent::QuietNight);
            return KillDecision::HeldOff { pool: pool.len() };
        }

        let victim = pool[self.rng.pick_index(pool.len())];
        match self.kill(slot, victim) {
            Some(report) => KillDecision::Killed(report),
            None => KillDecision::HeldOff { pool: pool.len() },
        }
    }

    pub(super) fn kill(&mut self, slot: usize, victim: EntityId) -> Option<KillReport> {
        let Some(ContainerId::Room(room)) = self.location_of(victim) else {
            return None;
        };
        let murderer = self.murderers.get_mut(slot)?;
        let murderer_name = murderer.name;
        let weapon = murderer.weapon.take()?;
        let weapon_type = weapon.weapon_type();

        if let Err(err) = self.world.convert_to_corpse(victim, weapon_type) {
            error!(%murderer_name, ?victim, %err, "kill failed");
            self.murderers[slot].weapon = Some(weapon);
            return None;
        }
        self.weapons_spent += 1;

        let victim_name = self.world.entity(victim)?.name();
        let label = self
            .world
            .room(room)
            .map(|r| r.name().label())
            .unwrap_or("a room");
        info!(
            day = self.day,
            victim = %victim_name,
            room,
            weapon = weapon.name(),
            "victim killed"
        );
        self.victims.push(VictimEntry {
            name: victim_name,
            day: self.day,
            room,
            weapon_type,
        });
        self.events.push(RuntimeEvent::VictimKilled {
            victim: victim_name,
            room,
            weapon_type,
        });
        self.timeline.push(TimelineEvent {
            day: self.day,
            label: format!("{victim_name} was found dead in the {label}"),
        });

        Some(KillReport {
            murderer: murderer_name,
            victim: victim_name,
            victim_id: victim,
            room,
            weapon: weapon.name().to_string(),
            weapon_type,
        })
    }
}
