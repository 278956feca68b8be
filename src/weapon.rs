use serde::{Deserialize, Serialize};

use crate::rng::RandomSource;
use crate::types::WeaponType;

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Weapon {
    name: String,
    #[serde(rename = "type")]
    weapon_type: WeaponType,
}

impl Weapon {
    pub fn new(name: impl Into<String>, weapon_type: WeaponType) -> Self {
        Self {
            name: name.into(),
            weapon_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weapon_type(&self) -> WeaponType {
        self.weapon_type
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub weapon_type: WeaponType,
}

impl WeaponConfig {
    pub fn build(&self) -> Weapon {
        Weapon::new(self.name.clone(), self.weapon_type)
    }
}

pub fn causes_of_death(weapon_type: WeaponType) -> &'static [&'static str] {
    match weapon_type {
        WeaponType::Blunt => &["bruising", "bone fractures", "blunt force trauma"],
        WeaponType::Poison => &["bloodshot eyes", "swollen muscles", "bluish lips"],
        WeaponType::Slashing => &["lacerations", "deep cuts"],
        WeaponType::Stabbing => &["penetrating trauma", "cavitation", "stab wounds"],
        WeaponType::Strangulation => &["neck abrasions", "ligature marks", "swollen tongue"],
    }
}

pub fn roll_cause_of_death<R: RandomSource + ?Sized>(
    weapon_type: WeaponType,
    rng: &mut R,
) -> &'static str {
    let causes = causes_of_death(weapon_type);
    causes[rng.pick_index(causes.len())]
}
