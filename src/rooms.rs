use crate::constants::EXECUTION_CAPACITY;
use crate::error::ContainerError;
use crate::rng::RandomSource;
use crate::types::{ContainerId, EntityId, RoomName};
use crate::weapon::{Weapon, WeaponConfig};

pub trait Container {
    fn id(&self) -> ContainerId;
    fn capacity(&self) -> usize;
    fn occupants(&self) -> &[EntityId];
    fn populate(&mut self, entity: EntityId) -> Result<usize, ContainerError>;
    fn remove(&mut self, entity: EntityId) -> bool;

    fn len(&self) -> usize {
        self.occupants().len()
    }

    fn is_empty(&self) -> bool {
        self.occupants().is_empty()
    }

    fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.occupants().contains(&entity)
    }

    fn slot_of(&self, entity: EntityId) -> Option<usize> {
        self.occupants().iter().position(|&id| id == entity)
    }
}

// Ordered slots; removal shifts later occupants forward so they always fill
// the front-most positions.
#[derive(Debug, Default)]
struct Slots {
    capacity: usize,
    occupants: Vec<EntityId>,
}

impl Slots {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            occupants: Vec::with_capacity(capacity),
        }
    }

    fn populate(&mut self, owner: ContainerId, entity: EntityId) -> Result<usize, ContainerError> {
        if self.occupants.contains(&entity) {
            return Err(ContainerError::AlreadyPresent {
                entity,
                container: owner,
            });
        }
        if self.occupants.len() >= self.capacity {
            return Err(ContainerError::Full(owner));
        }
        self.occupants.push(entity);
        Ok(self.occupants.len() - 1)
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        let Some(idx) = self.occupants.iter().position(|&id| id == entity) else {
            return false;
        };
        self.occupants.remove(idx);
        true
    }
}

#[derive(Debug)]
pub struct StandardRoom {
    number: usize,
    name: RoomName,
    initial_weapons: Vec<WeaponConfig>,
    weapons: Vec<Weapon>,
    slots: Slots,
}

impl StandardRoom {
    pub fn new(number: usize, name: RoomName, capacity: usize, weapons: Vec<WeaponConfig>) -> Self {
        let inventory = weapons.iter().map(WeaponConfig::build).collect();
        Self {
            number,
            name,
            initial_weapons: weapons,
            weapons: inventory,
            slots: Slots::new(capacity),
        }
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn name(&self) -> RoomName {
        self.name
    }

    pub fn initial_weapons(&self) -> &[WeaponConfig] {
        &self.initial_weapons
    }

    pub fn weapons(&self) -> &[Weapon] {
        &self.weapons
    }

    pub fn weapon_names(&self) -> Vec<String> {
        self.weapons
            .iter()
            .map(|weapon| weapon.name().to_string())
            .collect()
    }

    pub fn take_random_weapon<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> Option<Weapon> {
        if self.weapons.is_empty() {
            return None;
        }
        let idx = rng.pick_index(self.weapons.len());
        Some(self.weapons.remove(idx))
    }
}

impl Container for StandardRoom {
    fn id(&self) -> ContainerId {
        ContainerId::Room(self.number)
    }

    fn capacity(&self) -> usize {
        self.slots.capacity
    }

    fn occupants(&self) -> &[EntityId] {
        &self.slots.occupants
    }

    fn populate(&mut self, entity: EntityId) -> Result<usize, ContainerError> {
        let id = self.id();
        self.slots.populate(id, entity)
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        self.slots.remove(entity)
    }
}

#[derive(Debug)]
pub struct Lobby {
    slots: Slots,
}

impl Lobby {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Slots::new(capacity),
        }
    }
}

impl Container for Lobby {
    fn id(&self) -> ContainerId {
        ContainerId::Lobby
    }

    fn capacity(&self) -> usize {
        self.slots.capacity
    }

    fn occupants(&self) -> &[EntityId] {
        &self.slots.occupants
    }

    fn populate(&mut self, entity: EntityId) -> Result<usize, ContainerError> {
        self.slots.populate(ContainerId::Lobby, entity)
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        self.slots.remove(entity)
    }
}

#[derive(Debug, Default)]
pub struct ExecutionChamber {
    occupant: Option<EntityId>,
}

impl ExecutionChamber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.occupant.is_some()
    }

    pub fn clear(&mut self) -> Option<EntityId> {
        self.occupant.take()
    }

    pub fn execute_occupant(&mut self) -> Option<EntityId> {
        self.occupant.take()
    }
}

impl Container for ExecutionChamber {
    fn id(&self) -> ContainerId {
        ContainerId::Execution
    }

    fn capacity(&self) -> usize {
        EXECUTION_CAPACITY
    }

    fn occupants(&self) -> &[EntityId] {
        self.occupant.as_slice()
    }

    fn populate(&mut self, entity: EntityId) -> Result<usize, ContainerError> {
        if self.occupant == Some(entity) {
            return Err(ContainerError::AlreadyPresent {
                entity,
                container: ContainerId::Execution,
            });
        }
        if self.occupant.is_some() {
            return Err(ContainerError::Full(ContainerId::Execution));
        }
        self.occupant = Some(entity);
        Ok(0)
    }

    fn remove(&mut self, entity: EntityId) -> bool {
        if self.occupant != Some(entity) {
            return false;
        }
        self.clear();
        true
    }
}
