use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ContainerId, EntityId, GameOutcome, RoomName, Suspect};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("{0} is full")]
    Full(ContainerId),
    #[error("entity {entity:?} is already in {container}")]
    AlreadyPresent {
        entity: EntityId,
        container: ContainerId,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("unknown entity {0:?}")]
    UnknownEntity(EntityId),
    #[error("{name} is not placed in any room")]
    NotPlaced { name: Suspect },
    #[error("{destination} is unavailable")]
    DestinationUnavailable { destination: ContainerId },
    #[error("{name} cannot be sent to the execution room")]
    NotACharacter { name: Suspect },
    #[error("the game is over")]
    GameOver,
    #[error(transparent)]
    Container(#[from] ContainerError),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndDayError {
    #[error("cannot end day with {count} character(s) in the lobby")]
    LobbyNotEmpty { count: usize },
    #[error("cannot end day with only one character in room {room}")]
    LoneOccupant { room: usize },
    #[error("the game is already over")]
    GameOver { outcome: GameOutcome },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("no action points left, end the day")]
    NoActionPoints,
    #[error("unknown room {0}")]
    UnknownRoom(usize),
    #[error("the game is over")]
    GameOver,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubsetError {
    #[error("max ({max}) must be greater than min ({min})")]
    EmptyRange { min: i32, max: i32 },
    #[error("cannot draw an empty subset")]
    ZeroCount,
    #[error("cannot draw {count} unique values from {available}")]
    CountExceedsRange { count: usize, available: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("room count {count} must be between {min} and {max}")]
    RoomCount { count: usize, min: usize, max: usize },
    #[error("room {room} must hold at least one character")]
    RoomCapacity { room: usize },
    #[error("room {room} ({name:?}) lists weapon {weapon:?} twice")]
    DuplicateWeapon {
        room: usize,
        name: RoomName,
        weapon: String,
    },
    #[error("character count {count} must be between 1 and {max}")]
    CharacterCount { count: usize, max: usize },
    #[error("murderer count {count} must be between 1 and {characters}")]
    MurdererCount { count: usize, characters: usize },
    #[error("day count {0} must not be negative")]
    Days(i32),
    #[error("failed to pick murderers: {0}")]
    Subset(#[from] SubsetError),
    #[error("failed to seat characters: {0}")]
    Placement(#[from] TransferError),
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
