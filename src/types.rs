use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{EXECUTION_ID, LOBBY_ID};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Suspect {
    Meursault,
    Raskolnikov,
    Smerdyakov,
    Montresor,
    Grenouille,
    Burnham,
    Bayley,
    Knowlton,
    Hodel,
    Hope,
    Baskerville,
    Elster,
    Bates,
    Garzah,
    Druitt,
    Hyde,
}

impl Suspect {
    pub const ALL: [Suspect; 16] = [
        Suspect::Meursault,
        Suspect::Raskolnikov,
        Suspect::Smerdyakov,
        Suspect::Montresor,
        Suspect::Grenouille,
        Suspect::Burnham,
        Suspect::Bayley,
        Suspect::Knowlton,
        Suspect::Hodel,
        Suspect::Hope,
        Suspect::Baskerville,
        Suspect::Elster,
        Suspect::Bates,
        Suspect::Garzah,
        Suspect::Druitt,
        Suspect::Hyde,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|suspect| suspect.as_str().eq_ignore_ascii_case(value))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Meursault => "Meursault",
            Self::Raskolnikov => "Raskolnikov",
            Self::Smerdyakov => "Smerdyakov",
            Self::Montresor => "Montresor",
            Self::Grenouille => "Grenouille",
            Self::Burnham => "Burnham",
            Self::Bayley => "Bayley",
            Self::Knowlton => "Knowlton",
            Self::Hodel => "Hodel",
            Self::Hope => "Hope",
            Self::Baskerville => "Baskerville",
            Self::Elster => "Elster",
            Self::Bates => "Bates",
            Self::Garzah => "Garzah",
            Self::Druitt => "Druitt",
            Self::Hyde => "Hyde",
        }
    }
}

impl fmt::Display for Suspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponType {
    Blunt,
    Slashing,
    Stabbing,
    Strangulation,
    Poison,
}

impl WeaponType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "blunt" => Some(Self::Blunt),
            "slashing" => Some(Self::Slashing),
            "stabbing" => Some(Self::Stabbing),
            "strangulation" => Some(Self::Strangulation),
            "poison" => Some(Self::Poison),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomName {
    Room1,
    Room2,
    Room3,
    Room4,
    Room5,
    Room6,
    ButchersShop,
    DoctorsHouse,
    HuntingLodge,
    TownHall,
    Church,
    Barn,
}

impl RoomName {
    pub fn label(self) -> &'static str {
        match self {
            Self::Room1 => "Room 1",
            Self::Room2 => "Room 2",
            Self::Room3 => "Room 3",
            Self::Room4 => "Room 4",
            Self::Room5 => "Room 5",
            Self::Room6 => "Room 6",
            Self::ButchersShop => "Butcher's Shop",
            Self::DoctorsHouse => "Doctor's House",
            Self::HuntingLodge => "Hunting Lodge",
            Self::TownHall => "Town Hall",
            Self::Church => "Church",
            Self::Barn => "Barn",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EntityId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "number", rename_all = "snake_case")]
pub enum ContainerId {
    Room(usize),
    Lobby,
    Execution,
}

impl ContainerId {
    /// Maps a destination id onto a container. Unknown ids land in the lobby.
    pub fn from_destination(destination: i32, room_count: usize) -> Self {
        match destination {
            EXECUTION_ID => Self::Execution,
            LOBBY_ID => Self::Lobby,
            number if number > 0 && (number as usize) <= room_count => Self::Room(number as usize),
            _ => Self::Lobby,
        }
    }

    pub fn destination_id(self) -> i32 {
        match self {
            Self::Room(number) => number as i32,
            Self::Lobby => LOBBY_ID,
            Self::Execution => EXECUTION_ID,
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Room(number) => write!(f, "room {number}"),
            Self::Lobby => f.write_str("lobby"),
            Self::Execution => f.write_str("execution room"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum LossReason {
    InnocentExecuted { name: Suspect },
    MurdererEscaped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GameOutcome {
    InProgress,
    Won,
    Lost { loss: LossReason },
}

impl GameOutcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupantKind {
    Character,
    Corpse,
}

#[derive(Clone, Debug, Serialize)]
pub struct OccupantView {
    pub id: EntityId,
    pub name: Suspect,
    pub kind: OccupantKind,
    pub slot: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoomView {
    pub number: usize,
    pub name: RoomName,
    pub label: String,
    pub capacity: usize,
    pub occupants: Vec<OccupantView>,
    pub weapons: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HoldingView {
    pub capacity: usize,
    pub occupants: Vec<OccupantView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineEvent {
    pub day: u32,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    EntityMoved {
        name: Suspect,
        from: ContainerId,
        to: ContainerId,
    },
    TransferRejected {
        name: Suspect,
        destination: ContainerId,
    },
    DayEnded {
        day: u32,
        #[serde(rename = "daysRemaining")]
        days_remaining: i32,
    },
    Executed {
        name: Suspect,
        murderer: bool,
    },
    MurdererCaught {
        remaining: usize,
    },
    VictimKilled {
        victim: Suspect,
        room: usize,
        #[serde(rename = "weaponType")]
        weapon_type: WeaponType,
    },
    QuietNight,
    GameWon,
    GameLost {
        loss: LossReason,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub day: u32,
    #[serde(rename = "daysRemaining")]
    pub days_remaining: i32,
    #[serde(rename = "finalDay")]
    pub final_day: bool,
    #[serde(rename = "actionPoints")]
    pub action_points: u32,
    #[serde(rename = "murderersRemaining")]
    pub murderers_remaining: usize,
    pub outcome: GameOutcome,
    pub rooms: Vec<RoomView>,
    pub lobby: HoldingView,
    pub execution: HoldingView,
    pub events: Vec<RuntimeEvent>,
    pub timeline: Vec<TimelineEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct CorpseReport {
    pub id: EntityId,
    pub name: Suspect,
    #[serde(rename = "causeOfDeath")]
    pub cause_of_death: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct RoomReport {
    pub number: usize,
    pub name: RoomName,
    pub weapons: Vec<String>,
    pub corpses: Vec<CorpseReport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct VictimEntry {
    pub name: Suspect,
    pub day: u32,
    pub room: usize,
    #[serde(rename = "weaponType")]
    pub weapon_type: WeaponType,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameSummary {
    pub outcome: GameOutcome,
    #[serde(rename = "daysPlayed")]
    pub days_played: u32,
    pub murderers: Vec<Suspect>,
    #[serde(rename = "murderersRemaining")]
    pub murderers_remaining: Vec<Suspect>,
    pub victims: Vec<VictimEntry>,
    pub executed: Vec<Suspect>,
    pub timeline: Vec<TimelineEvent>,
}
