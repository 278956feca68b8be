use serde::Serialize;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::constants::FLAVOR_SEED_SALT;
use crate::error::{ActionError, ConfigError, EndDayError, TransferError};
use crate::rng::{RandomSource, Rng};
use crate::rooms::{Container, ExecutionChamber, Lobby, StandardRoom};
use crate::types::{
    ContainerId, CorpseReport, EntityId, GameOutcome, GameSummary, HoldingView, LossReason,
    OccupantKind, OccupantView, RoomReport, RoomView, RuntimeEvent, Snapshot, Suspect,
    TimelineEvent, VictimEntry, WeaponType,
};
use crate::weapon::{roll_cause_of_death, Weapon};
use crate::world::{Entity, Transfer, World};

mod murderer_system;
mod setup;

pub use self::murderer_system::KillDecision;

#[derive(Debug)]
struct MurdererState {
    entity: EntityId,
    name: Suspect,
    weapon: Option<Weapon>,
    active: bool,
}

impl MurdererState {
    fn is_armed(&self) -> bool {
        self.weapon.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    pub name: Suspect,
    pub murderer: bool,
    #[serde(rename = "murderersRemaining")]
    pub murderers_remaining: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KillReport {
    pub murderer: Suspect,
    pub victim: Suspect,
    #[serde(rename = "victimId")]
    pub victim_id: EntityId,
    pub room: usize,
    pub weapon: String,
    #[serde(rename = "weaponType")]
    pub weapon_type: WeaponType,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DayReport {
    pub day: u32,
    #[serde(rename = "daysRemaining")]
    pub days_remaining: i32,
    pub execution: Option<ExecutionReport>,
    pub kill: Option<KillReport>,
    pub outcome: GameOutcome,
}

/// New roster position of the rotation cursor after the murderer at `removed`
/// leaves, chosen so the next advance lands on the murderer who was due next.
fn rotation_after_removal(index: usize, removed: usize, remaining: usize) -> usize {
    if remaining == 0 {
        return 0;
    }
    if removed <= index {
        if index == 0 {
            remaining - 1
        } else {
            index - 1
        }
    } else {
        index.min(remaining - 1)
    }
}

#[derive(Debug)]
pub struct GameEngine<R: RandomSource = Rng> {
    pub config: GameConfig,

    world: World,
    rng: R,
    // cause-of-death phrases only; never feeds the simulation
    flavor: Rng,
    murderers: Vec<MurdererState>,
    cast_murderers: Vec<Suspect>,
    rotation_index: usize,
    days_remaining: i32,
    day: u32,
    action_points: u32,
    outcome: GameOutcome,
    events: Vec<RuntimeEvent>,
    timeline: Vec<TimelineEvent>,
    victims: Vec<VictimEntry>,
    executed: Vec<Suspect>,
    weapons_spent: usize,
}

impl GameEngine<Rng> {
    pub fn new(config: GameConfig, seed: u32) -> Result<Self, ConfigError> {
        Self::with_rngs(config, Rng::new(seed), Rng::new(seed ^ FLAVOR_SEED_SALT))
    }
}

impl<R: RandomSource> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        Self::with_rngs(config, rng, Rng::new(FLAVOR_SEED_SALT))
    }

    pub fn with_rngs(config: GameConfig, mut rng: R, flavor: Rng) -> Result<Self, ConfigError> {
        let seating = setup::seat_party(&config, &mut rng)?;
        let murderers: Vec<MurdererState> = seating
            .murderers
            .iter()
            .filter_map(|&id| seating.world.entity(id))
            .map(|entity| MurdererState {
                entity: entity.id(),
                name: entity.name(),
                weapon: None,
                active: false,
            })
            .collect();
        let cast_murderers = murderers.iter().map(|murderer| murderer.name).collect();
        info!(
            rooms = config.rooms.len(),
            characters = config.character_count,
            days = config.days,
            "game started"
        );

        Ok(Self {
            days_remaining: config.days,
            action_points: config.action_points,
            world: seating.world,
            rng,
            flavor,
            murderers,
            cast_murderers,
            rotation_index: 0,
            day: 0,
            outcome: GameOutcome::InProgress,
            events: Vec::new(),
            timeline: vec![TimelineEvent {
                day: 0,
                label: "The party gathers".to_string(),
            }],
            victims: Vec::new(),
            executed: Vec::new(),
            weapons_spent: 0,
            config,
        })
    }

    pub fn is_ended(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn outcome(&self) -> GameOutcome {
        self.outcome
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn days_remaining(&self) -> i32 {
        self.days_remaining
    }

    pub fn murderers_remaining(&self) -> usize {
        self.murderers.len()
    }

    pub fn action_points(&self) -> u32 {
        self.action_points
    }

    pub fn rooms(&self) -> &[StandardRoom] {
        self.world.rooms()
    }

    pub fn room(&self, number: usize) -> Option<&StandardRoom> {
        self.world.room(number)
    }

    pub fn lobby(&self) -> &Lobby {
        self.world.lobby()
    }

    pub fn execution_chamber(&self) -> &ExecutionChamber {
        self.world.execution()
    }

    pub fn room_weapon_names(&self, number: usize) -> Option<Vec<String>> {
        self.world.room(number).map(StandardRoom::weapon_names)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.world.entity(id)
    }

    pub fn find(&self, name: Suspect) -> Option<EntityId> {
        self.world.find(name)
    }

    pub fn location_of(&self, id: EntityId) -> Option<ContainerId> {
        self.world.entity(id).and_then(Entity::container)
    }

    pub fn cause_of_death(&mut self, id: EntityId) -> Option<&'static str> {
        let weapon_type = self.world.entity(id)?.weapon_type()?;
        Some(roll_cause_of_death(weapon_type, &mut self.flavor))
    }

    pub fn transfer(&mut self, id: EntityId, destination: i32) -> Result<Transfer, TransferError> {
        if self.is_ended() {
            return Err(TransferError::GameOver);
        }
        match self.world.transfer(id, destination) {
            Ok(moved) => {
                self.events.push(RuntimeEvent::EntityMoved {
                    name: moved.name,
                    from: moved.from,
                    to: moved.to,
                });
                Ok(moved)
            }
            Err(err) => {
                if let TransferError::DestinationUnavailable { destination } = err {
                    if let Some(entity) = self.world.entity(id) {
                        self.events.push(RuntimeEvent::TransferRejected {
                            name: entity.name(),
                            destination,
                        });
                    }
                }
                Err(err)
            }
        }
    }

    pub fn investigate(&mut self, number: usize) -> Result<RoomReport, ActionError> {
        if self.is_ended() {
            return Err(ActionError::GameOver);
        }
        if self.action_points == 0 {
            return Err(ActionError::NoActionPoints);
        }
        let room = self
            .world
            .room(number)
            .ok_or(ActionError::UnknownRoom(number))?;

        let mut corpses = Vec::new();
        for &occupant in room.occupants() {
            let Some(entity) = self.world.entity(occupant) else {
                continue;
            };
            if let Some(weapon_type) = entity.weapon_type() {
                corpses.push(CorpseReport {
                    id: entity.id(),
                    name: entity.name(),
                    cause_of_death: roll_cause_of_death(weapon_type, &mut self.flavor),
                });
            }
        }
        let report = RoomReport {
            number,
            name: room.name(),
            weapons: room.weapon_names(),
            corpses,
        };
        self.action_points -= 1;
        debug!(room = number, points_left = self.action_points, "room investigated");
        Ok(report)
    }

    pub fn can_end_day(&self) -> Result<(), EndDayError> {
        if self.outcome.is_terminal() {
            return Err(EndDayError::GameOver {
                outcome: self.outcome,
            });
        }
        let waiting = self.world.lobby().len();
        if waiting > 0 {
            return Err(EndDayError::LobbyNotEmpty { count: waiting });
        }
        if let Some(room) = self.world.rooms().iter().find(|room| room.len() == 1) {
            return Err(EndDayError::LoneOccupant {
                room: room.number(),
            });
        }
        Ok(())
    }

    pub fn end_day(&mut self) -> Result<DayReport, EndDayError> {
        self.can_end_day()?;

        self.day += 1;
        self.days_remaining -= 1;
        info!(
            day = self.day,
            days_remaining = self.days_remaining,
            "day ended"
        );
        if self.days_remaining < 0 && !self.murderers.is_empty() {
            self.record_outcome(GameOutcome::Lost {
                loss: LossReason::MurdererEscaped,
            });
        }

        let execution = self.resolve_execution();

        let mut kill = None;
        if !self.murderers.is_empty() {
            for slot in 0..self.murderers.len() {
                if self.murderers[slot].is_armed() {
                    self.murderers[slot].active = true;
                } else {
                    self.arm(slot);
                    self.murderers[slot].active = false;
                }
            }

            self.rotation_index = (self.rotation_index + 1) % self.murderers.len();
            let slot = self.rotation_index;
            if self.murderers[slot].active {
                if let KillDecision::Killed(report) = self.determine_to_kill(slot) {
                    kill = Some(report);
                }
            } else {
                debug!(name = %self.murderers[slot].name, "selected murderer is not active");
                self.events.push(RuntimeEvent::QuietNight);
            }
        }

        self.action_points = self.config.action_points;
        self.events.push(RuntimeEvent::DayEnded {
            day: self.day,
            days_remaining: self.days_remaining,
        });
        self.timeline.push(TimelineEvent {
            day: self.day,
            label: format!("Day {} ended", self.day),
        });

        Ok(DayReport {
            day: self.day,
            days_remaining: self.days_remaining,
            execution,
            kill,
            outcome: self.outcome,
        })
    }

    fn resolve_execution(&mut self) -> Option<ExecutionReport> {
        let id = self.world.execute_occupant()?;
        let entity = self.world.entity(id)?;
        let name = entity.name();
        let murderer = entity.is_murderer();
        self.executed.push(name);
        self.events.push(RuntimeEvent::Executed { name, murderer });
        self.timeline.push(TimelineEvent {
            day: self.day,
            label: format!("{name} was executed"),
        });
        info!(day = self.day, %name, murderer, "suspect executed");

        if !murderer {
            self.record_outcome(GameOutcome::Lost {
                loss: LossReason::InnocentExecuted { name },
            });
        } else if let Some(pos) = self.murderers.iter().position(|m| m.entity == id) {
            let caught = self.murderers.remove(pos);
            if caught.is_armed() {
                self.weapons_spent += 1;
            }
            self.rotation_index =
                rotation_after_removal(self.rotation_index, pos, self.murderers.len());
            self.events.push(RuntimeEvent::MurdererCaught {
                remaining: self.murderers.len(),
            });
            if self.murderers.is_empty() {
                self.record_outcome(GameOutcome::Won);
            }
        }

        Some(ExecutionReport {
            name,
            murderer,
            murderers_remaining: self.murderers.len(),
        })
    }

    /// The first terminal outcome of a game is final.
    fn record_outcome(&mut self, outcome: GameOutcome) {
        if self.outcome.is_terminal() {
            debug!(?outcome, current = ?self.outcome, "outcome already decided");
            return;
        }
        self.outcome = outcome;
        let label = match outcome {
            GameOutcome::Won => {
                self.events.push(RuntimeEvent::GameWon);
                "Every murderer has been executed".to_string()
            }
            GameOutcome::Lost { loss } => {
                self.events.push(RuntimeEvent::GameLost { loss });
                match loss {
                    LossReason::InnocentExecuted { name } => format!("{name} was innocent"),
                    LossReason::MurdererEscaped => "A murderer escaped".to_string(),
                }
            }
            GameOutcome::InProgress => return,
        };
        info!(day = self.day, ?outcome, "game over");
        self.timeline.push(TimelineEvent {
            day: self.day,
            label,
        });
    }

    fn occupant_views(&self, container: &dyn Container) -> Vec<OccupantView> {
        container
            .occupants()
            .iter()
            .enumerate()
            .filter_map(|(slot, &id)| {
                let entity = self.world.entity(id)?;
                Some(OccupantView {
                    id,
                    name: entity.name(),
                    kind: if entity.is_corpse() {
                        OccupantKind::Corpse
                    } else {
                        OccupantKind::Character
                    },
                    slot,
                })
            })
            .collect()
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let rooms = self
            .world
            .rooms()
            .iter()
            .map(|room| RoomView {
                number: room.number(),
                name: room.name(),
                label: room.name().label().to_string(),
                capacity: room.capacity(),
                occupants: self.occupant_views(room),
                weapons: room.weapon_names(),
            })
            .collect();
        let lobby = self.world.lobby();
        let execution = self.world.execution();

        let snapshot = Snapshot {
            day: self.day,
            days_remaining: self.days_remaining,
            final_day: self.days_remaining == 0,
            action_points: self.action_points,
            murderers_remaining: self.murderers.len(),
            outcome: self.outcome,
            rooms,
            lobby: HoldingView {
                capacity: lobby.capacity(),
                occupants: self.occupant_views(lobby),
            },
            execution: HoldingView {
                capacity: execution.capacity(),
                occupants: self.occupant_views(execution),
            },
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
            timeline: self
                .timeline
                .iter()
                .rev()
                .take(24)
                .cloned()
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect(),
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    pub fn build_summary(&self) -> GameSummary {
        GameSummary {
            outcome: self.outcome,
            days_played: self.day,
            murderers: self.cast_murderers.clone(),
            murderers_remaining: self.murderers.iter().map(|m| m.name).collect(),
            victims: self.victims.clone(),
            executed: self.executed.clone(),
            timeline: self.timeline.clone(),
        }
    }

    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = self.world.invariant_violations();

        for murderer in &self.murderers {
            match self.world.entity(murderer.entity) {
                Some(entity) if entity.is_alive() && entity.is_murderer() => {}
                Some(entity) => violations.push(format!(
                    "roster holds {} in state {:?}",
                    entity.name(),
                    entity.state()
                )),
                None => violations.push(format!("roster holds unknown {:?}", murderer.entity)),
            }
        }

        let initial: usize = self
            .world
            .rooms()
            .iter()
            .map(|room| room.initial_weapons().len())
            .sum();
        let stocked: usize = self.world.rooms().iter().map(|room| room.weapons().len()).sum();
        let held = self.murderers.iter().filter(|m| m.is_armed()).count();
        if stocked + held + self.weapons_spent != initial {
            violations.push(format!(
                "weapon count drifted: {stocked} stocked + {held} held + {} spent != {initial}",
                self.weapons_spent
            ));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::config::RoomConfig;
    use crate::constants::{EXECUTION_ID, LOBBY_ID};
    use crate::rng::ScriptedRng;
    use crate::types::RoomName;
    use crate::weapon::{causes_of_death, WeaponConfig};
    use crate::world::EntityState;

    fn scripted(config: GameConfig, picks: &[usize]) -> GameEngine<ScriptedRng> {
        GameEngine::with_rng(config, ScriptedRng::new(picks.iter().copied()))
            .expect("valid config")
    }

    fn id_of<R: RandomSource>(engine: &GameEngine<R>, name: Suspect) -> EntityId {
        engine.find(name).expect("suspect is in the cast")
    }

    fn roster<R: RandomSource>(engine: &GameEngine<R>) -> Vec<Suspect> {
        engine.murderers.iter().map(|m| m.name).collect()
    }

    #[test]
    fn rotation_cursor_keeps_next_murderer_after_removal() {
        // three murderers before each removal
        assert_eq!(rotation_after_removal(0, 0, 2), 1);
        assert_eq!(rotation_after_removal(0, 1, 2), 0);
        assert_eq!(rotation_after_removal(1, 1, 2), 0);
        assert_eq!(rotation_after_removal(2, 0, 2), 1);
        assert_eq!(rotation_after_removal(1, 2, 2), 1);
        assert_eq!(rotation_after_removal(0, 0, 0), 0);
    }

    #[test]
    fn default_party_ends_first_day_with_fresh_unarmed_murderers_armed() {
        // murderers: Meursault (room 1) and Burnham (room 2)
        let mut engine = scripted(GameConfig::default(), &[0, 4, 1, 2]);
        assert_eq!(roster(&engine), vec![Suspect::Meursault, Suspect::Burnham]);
        assert!(engine.invariant_violations().is_empty());

        let report = engine.end_day().expect("board is settled");
        assert_eq!(report.day, 1);
        assert_eq!(report.days_remaining, 6);
        assert_eq!(report.execution, None);
        assert_eq!(report.kill, None);
        assert_eq!(report.outcome, GameOutcome::InProgress);

        for murderer in &engine.murderers {
            assert!(murderer.is_armed());
            assert!(!murderer.active);
        }
        assert_eq!(
            engine.murderers[0].weapon.as_ref().map(Weapon::name),
            Some("meat hook")
        );
        assert_eq!(
            engine.murderers[1].weapon.as_ref().map(Weapon::name),
            Some("bone saw")
        );
        assert_eq!(
            engine.room_weapon_names(1),
            Some(vec!["cleaver".to_string(), "tenderizing mallet".to_string()])
        );
        assert_eq!(engine.room(2).map(|room| room.weapons().len()), Some(2));
        assert_eq!(engine.rotation_index, 1);
        assert!(engine.invariant_violations().is_empty());
    }

    #[test]
    fn armed_murderer_kills_on_their_night() {
        let mut engine = scripted(GameConfig::default(), &[0, 4, 1, 2, 2]);
        engine.end_day().expect("first night");

        let report = engine.end_day().expect("second night");
        let kill = report.kill.expect("Meursault is active and has victims");
        assert_eq!(kill.murderer, Suspect::Meursault);
        assert_eq!(kill.victim, Suspect::Montresor);
        assert_eq!(kill.room, 1);
        assert_eq!(kill.weapon, "meat hook");
        assert_eq!(kill.weapon_type, WeaponType::Stabbing);

        let victim = engine.entity(kill.victim_id).expect("corpse stays in the arena");
        assert_eq!(victim.name(), Suspect::Montresor);
        assert_eq!(
            victim.state(),
            EntityState::Dead {
                weapon_type: WeaponType::Stabbing
            }
        );
        assert_eq!(engine.location_of(kill.victim_id), Some(ContainerId::Room(1)));
        assert_eq!(engine.room(1).map(|room| room.len()), Some(4));
        assert!(!engine.murderers[0].is_armed());
        assert!(engine.murderers[1].is_armed());
        assert_eq!(engine.weapons_spent, 1);

        let cause = engine
            .cause_of_death(kill.victim_id)
            .expect("corpses have a cause of death");
        assert!(causes_of_death(WeaponType::Stabbing).contains(&cause));
        assert_eq!(engine.cause_of_death(id_of(&engine, Suspect::Hope)), None);

        let summary = engine.build_summary();
        assert_eq!(summary.victims.len(), 1);
        assert_eq!(summary.victims[0].day, 2);
        assert!(engine.invariant_violations().is_empty());
    }

    #[test]
    fn executing_an_innocent_loses_the_game() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        let innocent = id_of(&engine, Suspect::Raskolnikov);
        engine.transfer(innocent, EXECUTION_ID).expect("chamber is empty");

        let report = engine.end_day().expect("board is settled");
        let execution = report.execution.expect("someone was executed");
        assert_eq!(execution.name, Suspect::Raskolnikov);
        assert!(!execution.murderer);
        assert_eq!(execution.murderers_remaining, 2);
        let expected = GameOutcome::Lost {
            loss: LossReason::InnocentExecuted {
                name: Suspect::Raskolnikov,
            },
        };
        assert_eq!(report.outcome, expected);
        assert!(engine.is_ended());
        assert_eq!(engine.location_of(innocent), None);
        assert_eq!(
            engine.entity(innocent).map(Entity::state),
            Some(EntityState::Executed)
        );
        assert!(engine.invariant_violations().is_empty());
    }

    #[test]
    fn executing_the_last_murderer_wins() {
        let config = GameConfig {
            murderer_count: 1,
            ..GameConfig::default()
        };
        let mut engine = scripted(config, &[0]);
        let murderer = id_of(&engine, Suspect::Meursault);
        engine.transfer(murderer, EXECUTION_ID).expect("chamber is empty");

        let report = engine.end_day().expect("board is settled");
        let execution = report.execution.expect("someone was executed");
        assert!(execution.murderer);
        assert_eq!(execution.murderers_remaining, 0);
        assert_eq!(report.kill, None);
        assert_eq!(report.outcome, GameOutcome::Won);
        assert_eq!(engine.murderers_remaining(), 0);

        let summary = engine.build_summary();
        assert_eq!(summary.murderers, vec![Suspect::Meursault]);
        assert!(summary.murderers_remaining.is_empty());
        assert_eq!(summary.executed, vec![Suspect::Meursault]);
        assert!(engine.invariant_violations().is_empty());
    }

    #[test]
    fn catching_one_of_two_murderers_keeps_the_game_going() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        let murderer = id_of(&engine, Suspect::Burnham);
        engine.transfer(murderer, EXECUTION_ID).expect("chamber is empty");

        let report = engine.end_day().expect("board is settled");
        assert_eq!(report.outcome, GameOutcome::InProgress);
        assert_eq!(roster(&engine), vec![Suspect::Meursault]);
        assert_eq!(engine.rotation_index, 0);
        let events = engine.build_snapshot(true).events;
        assert!(events.contains(&RuntimeEvent::MurdererCaught { remaining: 1 }));
        assert!(engine.invariant_violations().is_empty());
    }

    #[test]
    fn ended_game_refuses_more_days_and_moves() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        let innocent = id_of(&engine, Suspect::Hope);
        engine.transfer(innocent, EXECUTION_ID).expect("chamber is empty");
        let report = engine.end_day().expect("board is settled");
        let day = engine.day();

        for _ in 0..3 {
            assert_eq!(
                engine.end_day(),
                Err(EndDayError::GameOver {
                    outcome: report.outcome
                })
            );
        }
        assert_eq!(engine.day(), day);
        assert_eq!(engine.outcome(), report.outcome);
        assert_eq!(
            engine.transfer(id_of(&engine, Suspect::Hyde), 1),
            Err(TransferError::GameOver)
        );
        assert_eq!(engine.investigate(1).map(|_| ()), Err(ActionError::GameOver));
    }

    #[test]
    fn occupied_lobby_blocks_the_night() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        let straggler = id_of(&engine, Suspect::Druitt);
        engine.transfer(straggler, LOBBY_ID).expect("lobby has space");

        assert_eq!(engine.end_day(), Err(EndDayError::LobbyNotEmpty { count: 1 }));
        assert_eq!(engine.day(), 0);
        assert_eq!(engine.days_remaining(), 7);
        assert!(engine.murderers.iter().all(|m| !m.is_armed()));

        engine.transfer(straggler, 4).expect("room 4 has a free slot");
        assert!(engine.end_day().is_ok());
    }

    #[test]
    fn lone_occupant_blocks_the_night() {
        let config = GameConfig {
            character_count: 8,
            murderer_count: 1,
            rooms: vec![
                RoomConfig::preset(RoomName::Church, 4),
                RoomConfig::preset(RoomName::Barn, 4),
                RoomConfig::preset(RoomName::TownHall, 4),
            ],
            ..GameConfig::default()
        };
        let mut engine = scripted(config, &[0]);
        assert!(engine.can_end_day().is_ok());

        let wanderer = id_of(&engine, Suspect::Burnham);
        engine.transfer(wanderer, 3).expect("town hall is empty");
        assert_eq!(engine.end_day(), Err(EndDayError::LoneOccupant { room: 3 }));
        assert_eq!(engine.day(), 0);

        engine
            .transfer(id_of(&engine, Suspect::Bayley), 3)
            .expect("town hall has space");
        assert!(engine.end_day().is_ok());
    }

    #[test]
    fn corpse_counts_as_company() {
        let config = GameConfig {
            character_count: 6,
            murderer_count: 1,
            rooms: vec![
                RoomConfig::preset(RoomName::Room1, 3),
                RoomConfig::preset(RoomName::Room2, 3),
            ],
            ..GameConfig::default()
        };
        // Meursault arms night one, kills Raskolnikov night two
        let mut engine = scripted(config, &[0, 0, 0]);
        engine.end_day().expect("first night");
        let report = engine.end_day().expect("second night");
        assert_eq!(report.kill.map(|kill| kill.victim), Some(Suspect::Raskolnikov));

        let murderer = id_of(&engine, Suspect::Meursault);
        engine.transfer(murderer, EXECUTION_ID).expect("chamber is empty");
        // room 1 now holds Smerdyakov and a corpse
        assert_eq!(engine.room(1).map(|room| room.len()), Some(2));
        assert!(engine.can_end_day().is_ok());
    }

    #[test]
    fn arming_takes_the_only_weapon_and_leaves_the_next_murderer_empty_handed() {
        let mut config = GameConfig::default();
        config.rooms[0].weapons = Some(vec![WeaponConfig {
            name: "hatchet".to_string(),
            weapon_type: WeaponType::Slashing,
        }]);
        // both murderers in room 1
        let mut engine = scripted(config, &[0, 0]);
        assert_eq!(roster(&engine), vec![Suspect::Meursault, Suspect::Raskolnikov]);

        engine.end_day().expect("board is settled");
        assert_eq!(
            engine.murderers[0].weapon.as_ref().map(Weapon::name),
            Some("hatchet")
        );
        assert!(!engine.murderers[1].is_armed());
        assert_eq!(engine.room_weapon_names(1), Some(Vec::new()));
        assert!(engine.invariant_violations().is_empty());

        engine.end_day().expect("board is settled");
        assert!(!engine.murderers[1].is_armed());
        assert!(!engine.murderers[1].active);
        assert!(engine.murderers[0].active);
    }

    #[test]
    fn empty_armoury_leaves_murderers_unarmed() {
        let mut config = GameConfig::default();
        for room in &mut config.rooms {
            room.weapons = Some(Vec::new());
        }
        let mut engine = scripted(config, &[0, 4]);
        for _ in 0..3 {
            let report = engine.end_day().expect("board is settled");
            assert_eq!(report.kill, None);
        }
        assert!(engine.murderers.iter().all(|m| !m.is_armed() && !m.active));
        assert!(engine.invariant_violations().is_empty());
    }

    #[test]
    fn murderer_outside_a_room_cannot_arm() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        let murderer = id_of(&engine, Suspect::Meursault);
        engine.transfer(murderer, LOBBY_ID).expect("lobby has space");
        assert!(!engine.arm(0));
        assert!(!engine.murderers[0].is_armed());
        assert_eq!(engine.room(1).map(|room| room.weapons().len()), Some(3));
    }

    #[test]
    fn unarmed_murderer_cannot_kill() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        assert_eq!(engine.determine_to_kill(0), KillDecision::Unarmed);
        assert!(engine.victims.is_empty());
    }

    #[test]
    fn murderer_holds_off_with_a_single_witness() {
        let config = GameConfig {
            character_count: 6,
            murderer_count: 1,
            rooms: vec![
                RoomConfig::preset(RoomName::Church, 2),
                RoomConfig::preset(RoomName::Barn, 4),
            ],
            ..GameConfig::default()
        };
        let mut engine = scripted(config, &[0]);
        engine.end_day().expect("first night");
        assert!(engine.murderers[0].is_armed());

        let report = engine.end_day().expect("second night");
        assert_eq!(report.kill, None);
        assert!(engine.murderers[0].is_armed());
        assert!(engine.murderers[0].active);
        let events = engine.build_snapshot(true).events;
        assert!(events.contains(&RuntimeEvent::QuietNight));
        assert!(engine.invariant_violations().is_empty());
    }

    #[test]
    fn counter_expiry_loses_and_sticks() {
        let config = GameConfig {
            days: 0,
            murderer_count: 1,
            ..GameConfig::default()
        };
        let mut engine = scripted(config, &[0]);
        assert!(engine.build_snapshot(false).final_day);

        // catching the last murderer on the same night cannot undo the escape
        let murderer = id_of(&engine, Suspect::Meursault);
        engine.transfer(murderer, EXECUTION_ID).expect("chamber is empty");
        let report = engine.end_day().expect("board is settled");
        assert_eq!(report.days_remaining, -1);
        assert_eq!(
            report.outcome,
            GameOutcome::Lost {
                loss: LossReason::MurdererEscaped
            }
        );
        assert_eq!(report.execution.map(|execution| execution.murderer), Some(true));
        assert_eq!(engine.murderers_remaining(), 0);
        let events = engine.build_snapshot(true).events;
        assert!(!events.contains(&RuntimeEvent::GameWon));
    }

    #[test]
    fn days_remaining_decrements_once_per_completed_day() {
        let mut engine = GameEngine::new(GameConfig::default(), 41).expect("valid config");
        for expected in (0..7).rev() {
            if engine.is_ended() {
                break;
            }
            engine.end_day().expect("board stays settled without moves");
            assert_eq!(engine.days_remaining(), expected);
        }
    }

    #[test]
    fn rejected_transfer_changes_nothing_and_is_reported() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        let mover = id_of(&engine, Suspect::Hope);
        let before = engine.location_of(mover);
        assert_eq!(
            engine.transfer(mover, 1),
            Err(TransferError::DestinationUnavailable {
                destination: ContainerId::Room(1)
            })
        );
        assert_eq!(engine.location_of(mover), before);
        let events = engine.build_snapshot(true).events;
        assert_eq!(
            events,
            vec![RuntimeEvent::TransferRejected {
                name: Suspect::Hope,
                destination: ContainerId::Room(1)
            }]
        );
        assert!(engine.build_snapshot(true).events.is_empty());
    }

    #[test]
    fn investigating_spends_action_points_until_the_day_ends() {
        let config = GameConfig {
            action_points: 2,
            ..GameConfig::default()
        };
        let mut engine = scripted(config, &[0, 4]);
        let report = engine.investigate(3).expect("points available");
        assert_eq!(report.name, RoomName::HuntingLodge);
        assert_eq!(report.weapons.len(), 3);
        assert!(report.corpses.is_empty());
        assert_eq!(engine.investigate(9).map(|_| ()), Err(ActionError::UnknownRoom(9)));
        assert_eq!(engine.action_points(), 1);
        engine.investigate(1).expect("one point left");
        assert_eq!(
            engine.investigate(1).map(|_| ()),
            Err(ActionError::NoActionPoints)
        );

        engine.end_day().expect("board is settled");
        assert_eq!(engine.action_points(), 2);
    }

    fn kills_until_the_end(seed: u32, look_at_bodies: bool) -> Vec<Option<Suspect>> {
        let mut engine = GameEngine::new(GameConfig::default(), seed).expect("valid config");
        let mut kills = Vec::new();
        while !engine.is_ended() {
            let report = engine.end_day().expect("board stays settled without moves");
            if look_at_bodies && !engine.is_ended() {
                if let Some(kill) = &report.kill {
                    for _ in 0..3 {
                        assert!(engine.cause_of_death(kill.victim_id).is_some());
                    }
                    engine.investigate(kill.room).expect("points were just reset");
                }
            }
            kills.push(report.kill.map(|kill| kill.victim));
        }
        kills
    }

    #[test]
    fn reading_causes_of_death_leaves_later_kills_alone() {
        let mut any_kill = false;
        for seed in 0..40u32 {
            let quiet = kills_until_the_end(seed, false);
            let curious = kills_until_the_end(seed, true);
            assert_eq!(quiet, curious, "seed {seed}");
            any_kill |= quiet.iter().any(Option::is_some);
        }
        assert!(any_kill);
    }

    #[test]
    fn snapshot_hides_murderers_but_summary_names_them() {
        let mut engine = scripted(GameConfig::default(), &[0, 4]);
        let snapshot = engine.build_snapshot(false);
        assert_eq!(snapshot.rooms.len(), 4);
        assert_eq!(snapshot.rooms[0].label, "Butcher's Shop");
        assert_eq!(snapshot.rooms[0].occupants[2].slot, 2);
        assert_eq!(snapshot.execution.capacity, 1);
        let text = serde_json::to_string(&snapshot).expect("snapshot serializes");
        assert!(!text.contains("murderer\""));
        assert_eq!(snapshot.murderers_remaining, 2);

        let summary = engine.build_summary();
        assert_eq!(summary.murderers, vec![Suspect::Meursault, Suspect::Burnham]);
    }

    fn settle<R: RandomSource>(engine: &mut GameEngine<R>) -> bool {
        for _ in 0..8 {
            match engine.can_end_day() {
                Ok(()) => return true,
                Err(EndDayError::LobbyNotEmpty { .. }) => {
                    let waiting = engine.lobby().occupants().to_vec();
                    for id in waiting {
                        let open = engine
                            .rooms()
                            .iter()
                            .find(|room| !room.is_full() && !room.is_empty())
                            .or_else(|| engine.rooms().iter().find(|room| !room.is_full()))
                            .map(StandardRoom::number);
                        if let Some(number) = open {
                            let _ = engine.transfer(id, number as i32);
                        }
                    }
                }
                Err(EndDayError::LoneOccupant { room }) => {
                    let Some(id) = engine.room(room).and_then(|r| r.occupants().first().copied())
                    else {
                        return false;
                    };
                    let target = engine
                        .rooms()
                        .iter()
                        .find(|other| other.number() != room && !other.is_full() && !other.is_empty())
                        .map(StandardRoom::number);
                    match target {
                        Some(number) => {
                            let _ = engine.transfer(id, number as i32);
                        }
                        None => return false,
                    }
                }
                Err(EndDayError::GameOver { .. }) => return false,
            }
        }
        false
    }

    fn play_randomly<R: RandomSource>(engine: &mut GameEngine<R>, driver: &mut Rng) {
        let initial_weapons: usize = engine
            .rooms()
            .iter()
            .map(|room| room.initial_weapons().len())
            .sum();
        while !engine.is_ended() {
            for _ in 0..driver.int(0, 4) {
                let id = EntityId(driver.pick_index(engine.config.character_count));
                let destination = driver.int(-1, engine.rooms().len() as i32);
                let _ = engine.transfer(id, destination);
                assert!(engine.invariant_violations().is_empty());
            }
            if !settle(engine) {
                break;
            }
            engine.end_day().expect("settled board ends the day");
            let violations = engine.invariant_violations();
            assert!(violations.is_empty(), "{violations:?}");

            let held = engine.murderers.iter().filter(|m| m.is_armed()).count();
            let stocked: usize = engine.rooms().iter().map(|room| room.weapons().len()).sum();
            assert_eq!(held + stocked + engine.weapons_spent, initial_weapons);
        }
    }

    #[test]
    fn random_play_keeps_invariants() {
        for seed in 0..60u32 {
            let mut engine = GameEngine::new(GameConfig::default(), seed).expect("valid config");
            let mut driver = Rng::new(seed.wrapping_mul(7919));
            play_randomly(&mut engine, &mut driver);
        }
    }

    #[test]
    fn random_play_with_std_rng_keeps_invariants() {
        let config = GameConfig {
            character_count: 12,
            murderer_count: 3,
            rooms: vec![
                RoomConfig::preset(RoomName::Church, 5),
                RoomConfig::preset(RoomName::Barn, 5),
                RoomConfig::preset(RoomName::Room1, 3),
            ],
            ..GameConfig::default()
        };
        for seed in 0..30u64 {
            let mut engine = GameEngine::with_rng(config.clone(), StdRng::seed_from_u64(seed))
                .expect("valid config");
            let mut driver = Rng::new(seed as u32 + 1);
            play_randomly(&mut engine, &mut driver);
        }
    }
}
