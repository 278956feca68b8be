use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    get_preset_weapons, DEFAULT_ACTION_POINTS, DEFAULT_CHARACTER_COUNT, DEFAULT_DAYS,
    DEFAULT_MURDERER_COUNT, DEFAULT_ROOMS, DEFAULT_ROOM_CAPACITY, MAX_ROOMS, MIN_ROOMS,
};
use crate::error::ConfigError;
use crate::types::{RoomName, Suspect};
use crate::weapon::WeaponConfig;

fn default_room_capacity() -> usize {
    DEFAULT_ROOM_CAPACITY
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    pub name: RoomName,
    #[serde(default = "default_room_capacity")]
    pub capacity: usize,
    /// `None` stocks the room with its name's preset weapons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapons: Option<Vec<WeaponConfig>>,
}

impl RoomConfig {
    pub fn preset(name: RoomName, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            weapons: None,
        }
    }

    pub fn resolved_weapons(&self) -> Vec<WeaponConfig> {
        match &self.weapons {
            Some(weapons) => weapons.clone(),
            None => get_preset_weapons(self.name)
                .iter()
                .map(|&(name, weapon_type)| WeaponConfig {
                    name: name.to_string(),
                    weapon_type,
                })
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub days: i32,
    #[serde(rename = "characterCount")]
    pub character_count: usize,
    #[serde(rename = "murdererCount")]
    pub murderer_count: usize,
    #[serde(rename = "actionPoints")]
    pub action_points: u32,
    pub rooms: Vec<RoomConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            character_count: DEFAULT_CHARACTER_COUNT,
            murderer_count: DEFAULT_MURDERER_COUNT,
            action_points: DEFAULT_ACTION_POINTS,
            rooms: DEFAULT_ROOMS
                .iter()
                .map(|&name| RoomConfig::preset(name, DEFAULT_ROOM_CAPACITY))
                .collect(),
        }
    }
}

impl GameConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn total_capacity(&self) -> usize {
        self.rooms.iter().map(|room| room.capacity).sum()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_ROOMS..=MAX_ROOMS).contains(&self.rooms.len()) {
            return Err(ConfigError::RoomCount {
                count: self.rooms.len(),
                min: MIN_ROOMS,
                max: MAX_ROOMS,
            });
        }
        for (idx, room) in self.rooms.iter().enumerate() {
            if room.capacity == 0 {
                return Err(ConfigError::RoomCapacity { room: idx + 1 });
            }
            let mut seen = HashSet::new();
            for weapon in room.resolved_weapons() {
                if !seen.insert(weapon.name.clone()) {
                    return Err(ConfigError::DuplicateWeapon {
                        room: idx + 1,
                        name: room.name,
                        weapon: weapon.name,
                    });
                }
            }
        }
        if self.character_count == 0 || self.character_count > Suspect::ALL.len() {
            return Err(ConfigError::CharacterCount {
                count: self.character_count,
                max: Suspect::ALL.len(),
            });
        }
        if self.murderer_count == 0 || self.murderer_count > self.character_count {
            return Err(ConfigError::MurdererCount {
                count: self.murderer_count,
                characters: self.character_count,
            });
        }
        if self.days < 0 {
            return Err(ConfigError::Days(self.days));
        }
        Ok(())
    }
}
