use crate::types::{RoomName, WeaponType};

pub const LOBBY_ID: i32 = 0;
pub const EXECUTION_ID: i32 = -1;

pub const MIN_ROOMS: usize = 2;
pub const MAX_ROOMS: usize = 6;
pub const EXECUTION_CAPACITY: usize = 1;

pub const DEFAULT_DAYS: i32 = 7;
pub const DEFAULT_CHARACTER_COUNT: usize = 16;
pub const DEFAULT_MURDERER_COUNT: usize = 2;
pub const DEFAULT_ROOM_CAPACITY: usize = 4;
pub const DEFAULT_ACTION_POINTS: u32 = 7;
pub const FLAVOR_SEED_SALT: u32 = 0x85eb_ca6b;

pub const DEFAULT_ROOMS: [RoomName; 4] = [
    RoomName::ButchersShop,
    RoomName::DoctorsHouse,
    RoomName::HuntingLodge,
    RoomName::TownHall,
];

pub fn get_preset_weapons(room: RoomName) -> &'static [(&'static str, WeaponType)] {
    match room {
        RoomName::ButchersShop => &[
            ("cleaver", WeaponType::Slashing),
            ("meat hook", WeaponType::Stabbing),
            ("tenderizing mallet", WeaponType::Blunt),
        ],
        RoomName::DoctorsHouse => &[
            ("scalpel", WeaponType::Slashing),
            ("laudanum", WeaponType::Poison),
            ("bone saw", WeaponType::Slashing),
        ],
        RoomName::HuntingLodge => &[
            ("skinning knife", WeaponType::Stabbing),
            ("snare wire", WeaponType::Strangulation),
            ("rifle butt", WeaponType::Blunt),
        ],
        RoomName::TownHall => &[
            ("gavel", WeaponType::Blunt),
            ("bell rope", WeaponType::Strangulation),
        ],
        RoomName::Church => &[
            ("candlestick", WeaponType::Blunt),
            ("communion wine", WeaponType::Poison),
        ],
        RoomName::Barn => &[
            ("pitchfork", WeaponType::Stabbing),
            ("rat poison", WeaponType::Poison),
            ("hay rope", WeaponType::Strangulation),
        ],
        RoomName::Room1 | RoomName::Room3 | RoomName::Room5 => &[
            ("candlestick", WeaponType::Blunt),
            ("letter opener", WeaponType::Stabbing),
        ],
        RoomName::Room2 | RoomName::Room4 | RoomName::Room6 => &[
            ("curtain cord", WeaponType::Strangulation),
            ("arsenic", WeaponType::Poison),
        ],
    }
}
