use tracing::{debug, warn};

use crate::error::TransferError;
use crate::rooms::{Container, ExecutionChamber, Lobby, StandardRoom};
use crate::types::{ContainerId, EntityId, Suspect, WeaponType};
use crate::weapon::causes_of_death;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityState {
    Alive,
    Dead { weapon_type: WeaponType },
    Executed,
}

#[derive(Clone, Debug)]
pub struct Entity {
    id: EntityId,
    name: Suspect,
    murderer: bool,
    state: EntityState,
    container: Option<ContainerId>,
}

impl Entity {
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> Suspect {
        self.name
    }

    pub fn is_murderer(&self) -> bool {
        self.murderer
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn container(&self) -> Option<ContainerId> {
        self.container
    }

    pub fn is_alive(&self) -> bool {
        self.state == EntityState::Alive
    }

    pub fn is_corpse(&self) -> bool {
        matches!(self.state, EntityState::Dead { .. })
    }

    pub fn weapon_type(&self) -> Option<WeaponType> {
        match self.state {
            EntityState::Dead { weapon_type } => Some(weapon_type),
            _ => None,
        }
    }

    pub fn causes_of_death(&self) -> Option<&'static [&'static str]> {
        self.weapon_type().map(causes_of_death)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub entity: EntityId,
    pub name: Suspect,
    pub from: ContainerId,
    pub to: ContainerId,
    pub slot: usize,
}

#[derive(Debug)]
pub struct World {
    rooms: Vec<StandardRoom>,
    lobby: Lobby,
    execution: ExecutionChamber,
    entities: Vec<Entity>,
}

impl World {
    pub fn new(rooms: Vec<StandardRoom>, lobby_capacity: usize) -> Self {
        Self {
            rooms,
            lobby: Lobby::new(lobby_capacity),
            execution: ExecutionChamber::new(),
            entities: Vec::new(),
        }
    }

    pub fn rooms(&self) -> &[StandardRoom] {
        &self.rooms
    }

    pub fn room(&self, number: usize) -> Option<&StandardRoom> {
        number.checked_sub(1).and_then(|idx| self.rooms.get(idx))
    }

    pub fn room_mut(&mut self, number: usize) -> Option<&mut StandardRoom> {
        number.checked_sub(1).and_then(|idx| self.rooms.get_mut(idx))
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    pub fn execution(&self) -> &ExecutionChamber {
        &self.execution
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    pub fn find(&self, name: Suspect) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|entity| entity.name == name)
            .map(|entity| entity.id)
    }

    pub fn container(&self, id: ContainerId) -> Option<&dyn Container> {
        match id {
            ContainerId::Room(number) => self.room(number).map(|room| room as &dyn Container),
            ContainerId::Lobby => Some(&self.lobby),
            ContainerId::Execution => Some(&self.execution),
        }
    }

    fn container_mut(&mut self, id: ContainerId) -> Option<&mut dyn Container> {
        match id {
            ContainerId::Room(number) => self
                .room_mut(number)
                .map(|room| room as &mut dyn Container),
            ContainerId::Lobby => Some(&mut self.lobby),
            ContainerId::Execution => Some(&mut self.execution),
        }
    }

    pub fn spawn(&mut self, name: Suspect, murderer: bool) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(Entity {
            id,
            name,
            murderer,
            state: EntityState::Alive,
            container: None,
        });
        id
    }

    pub fn place(&mut self, id: EntityId, target: ContainerId) -> Result<usize, TransferError> {
        let entity = self.entity(id).ok_or(TransferError::UnknownEntity(id))?;
        if entity.container.is_some() || !entity.is_alive() {
            return Err(TransferError::DestinationUnavailable { destination: target });
        }
        let container = self
            .container_mut(target)
            .ok_or(TransferError::DestinationUnavailable { destination: target })?;
        let slot = container.populate(id)?;
        self.entities[id.0].container = Some(target);
        Ok(slot)
    }

    pub fn transfer(&mut self, id: EntityId, destination: i32) -> Result<Transfer, TransferError> {
        let target = ContainerId::from_destination(destination, self.rooms.len());
        if target.destination_id() != destination {
            warn!(destination, "invalid room id, moving to lobby");
        }
        self.move_to(id, target)
    }

    pub fn move_to(&mut self, id: EntityId, target: ContainerId) -> Result<Transfer, TransferError> {
        let entity = self.entity(id).ok_or(TransferError::UnknownEntity(id))?;
        let name = entity.name;
        let source = entity
            .container
            .ok_or(TransferError::NotPlaced { name })?;
        if target == ContainerId::Execution && !entity.is_alive() {
            return Err(TransferError::NotACharacter { name });
        }

        let destination_full = self
            .container(target)
            .map(|container| container.is_full())
            .unwrap_or(true);
        if destination_full {
            debug!(%name, %target, "transfer rejected, destination unavailable");
            return Err(TransferError::DestinationUnavailable { destination: target });
        }

        if let Some(container) = self.container_mut(source) {
            container.remove(id);
        }
        let slot = self
            .container_mut(target)
            .ok_or(TransferError::DestinationUnavailable { destination: target })?
            .populate(id)?;
        self.entities[id.0].container = Some(target);
        debug!(%name, from = %source, to = %target, slot, "entity moved");

        Ok(Transfer {
            entity: id,
            name,
            from: source,
            to: target,
            slot,
        })
    }

    /// Turns a living character into a corpse in the same room. The body
    /// goes through the normal removal path and is re-inserted, so it takes
    /// the first free slot after the survivors are re-packed.
    pub fn convert_to_corpse(
        &mut self,
        id: EntityId,
        weapon_type: WeaponType,
    ) -> Result<ContainerId, TransferError> {
        let entity = self.entity(id).ok_or(TransferError::UnknownEntity(id))?;
        let name = entity.name;
        if !entity.is_alive() {
            return Err(TransferError::NotACharacter { name });
        }
        let room = entity.container.ok_or(TransferError::NotPlaced { name })?;

        let container = self
            .container_mut(room)
            .ok_or(TransferError::NotPlaced { name })?;
        container.remove(id);
        container.populate(id)?;
        self.entities[id.0].state = EntityState::Dead { weapon_type };
        Ok(room)
    }

    pub fn execute_occupant(&mut self) -> Option<EntityId> {
        let id = self.execution.execute_occupant()?;
        if let Some(entity) = self.entities.get_mut(id.0) {
            entity.state = EntityState::Executed;
            entity.container = None;
        }
        Some(id)
    }

    pub fn invariant_violations(&self) -> Vec<String> {
        let mut violations = Vec::new();
        let mut containers: Vec<&dyn Container> = self
            .rooms
            .iter()
            .map(|room| room as &dyn Container)
            .collect();
        containers.push(&self.lobby);
        containers.push(&self.execution);

        for container in &containers {
            if container.len() > container.capacity() {
                violations.push(format!(
                    "{} over capacity: {}/{}",
                    container.id(),
                    container.len(),
                    container.capacity()
                ));
            }
            for &occupant in container.occupants() {
                match self.entity(occupant) {
                    Some(entity) if entity.container == Some(container.id()) => {}
                    Some(entity) => violations.push(format!(
                        "{} listed in {} but references {:?}",
                        entity.name,
                        container.id(),
                        entity.container
                    )),
                    None => violations.push(format!(
                        "{} lists unknown entity {:?}",
                        container.id(),
                        occupant
                    )),
                }
            }
        }

        for entity in &self.entities {
            let holders = containers
                .iter()
                .filter(|container| container.contains(entity.id))
                .count();
            let expected = if entity.state == EntityState::Executed {
                0
            } else {
                1
            };
            if holders != expected {
                violations.push(format!(
                    "{} held by {holders} containers, expected {expected}",
                    entity.name
                ));
            }
        }

        if let Some(occupant) = self.execution.occupant() {
            if !self.entity(occupant).map(Entity::is_alive).unwrap_or(false) {
                violations.push("execution room holds a non-living entity".to_string());
            }
        }
        violations
    }
}
