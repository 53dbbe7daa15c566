//! Weapon catalogue and spray-pattern tables.
//!
//! Spray patterns are the expected cumulative (yaw, pitch) offset in degrees of
//! each bullet in an uninterrupted burst. A player who compensates perfectly moves
//! their view by exactly the negated offset.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broad equipment class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    /// Pistols.
    Pistol,
    /// Submachine guns.
    Smg,
    /// Assault rifles.
    Rifle,
    /// Sniper and marksman rifles.
    Sniper,
    /// Shotguns.
    Shotgun,
    /// Machine guns.
    MachineGun,
    /// Knives and other melee.
    Melee,
    /// Grenades.
    Grenade,
    /// Everything else (bomb, taser, unknown).
    Utility,
}

/// Equipment a player can hold or fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum Weapon {
    Glock,
    UspS,
    P2000,
    P250,
    FiveSeven,
    Tec9,
    Cz75,
    DualBerettas,
    DesertEagle,
    R8Revolver,
    Mp9,
    Mac10,
    Mp7,
    Mp5Sd,
    Ump45,
    P90,
    Bizon,
    Ak47,
    M4a4,
    M4a1S,
    Famas,
    GalilAr,
    Sg553,
    Aug,
    Awp,
    Ssg08,
    Scar20,
    G3sg1,
    Nova,
    Xm1014,
    SawedOff,
    Mag7,
    Negev,
    M249,
    Knife,
    HeGrenade,
    Flashbang,
    SmokeGrenade,
    Molotov,
    Incendiary,
    Decoy,
    Zeus,
    C4,
    Unknown,
}

impl Weapon {
    /// Equipment class of this weapon.
    #[must_use]
    pub const fn class(self) -> WeaponClass {
        match self {
            Weapon::Glock
            | Weapon::UspS
            | Weapon::P2000
            | Weapon::P250
            | Weapon::FiveSeven
            | Weapon::Tec9
            | Weapon::Cz75
            | Weapon::DualBerettas
            | Weapon::DesertEagle
            | Weapon::R8Revolver => WeaponClass::Pistol,
            Weapon::Mp9
            | Weapon::Mac10
            | Weapon::Mp7
            | Weapon::Mp5Sd
            | Weapon::Ump45
            | Weapon::P90
            | Weapon::Bizon => WeaponClass::Smg,
            Weapon::Ak47
            | Weapon::M4a4
            | Weapon::M4a1S
            | Weapon::Famas
            | Weapon::GalilAr
            | Weapon::Sg553
            | Weapon::Aug => WeaponClass::Rifle,
            Weapon::Awp | Weapon::Ssg08 | Weapon::Scar20 | Weapon::G3sg1 => WeaponClass::Sniper,
            Weapon::Nova | Weapon::Xm1014 | Weapon::SawedOff | Weapon::Mag7 => {
                WeaponClass::Shotgun
            }
            Weapon::Negev | Weapon::M249 => WeaponClass::MachineGun,
            Weapon::Knife => WeaponClass::Melee,
            Weapon::HeGrenade
            | Weapon::Flashbang
            | Weapon::SmokeGrenade
            | Weapon::Molotov
            | Weapon::Incendiary
            | Weapon::Decoy => WeaponClass::Grenade,
            Weapon::Zeus | Weapon::C4 | Weapon::Unknown => WeaponClass::Utility,
        }
    }

    /// Whether holding the trigger sprays (rifles, SMGs, machine guns).
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(
            self.class(),
            WeaponClass::Rifle | WeaponClass::Smg | WeaponClass::MachineGun
        )
    }

    /// Whether this is a knife.
    #[must_use]
    pub const fn is_knife(self) -> bool {
        matches!(self, Weapon::Knife)
    }

    /// Short lowercase identifier, used in metric names.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Weapon::Glock => "glock",
            Weapon::UspS => "usp_s",
            Weapon::P2000 => "p2000",
            Weapon::P250 => "p250",
            Weapon::FiveSeven => "five_seven",
            Weapon::Tec9 => "tec9",
            Weapon::Cz75 => "cz75",
            Weapon::DualBerettas => "dual_berettas",
            Weapon::DesertEagle => "deagle",
            Weapon::R8Revolver => "r8",
            Weapon::Mp9 => "mp9",
            Weapon::Mac10 => "mac10",
            Weapon::Mp7 => "mp7",
            Weapon::Mp5Sd => "mp5sd",
            Weapon::Ump45 => "ump45",
            Weapon::P90 => "p90",
            Weapon::Bizon => "bizon",
            Weapon::Ak47 => "ak47",
            Weapon::M4a4 => "m4a4",
            Weapon::M4a1S => "m4a1_s",
            Weapon::Famas => "famas",
            Weapon::GalilAr => "galil",
            Weapon::Sg553 => "sg553",
            Weapon::Aug => "aug",
            Weapon::Awp => "awp",
            Weapon::Ssg08 => "ssg08",
            Weapon::Scar20 => "scar20",
            Weapon::G3sg1 => "g3sg1",
            Weapon::Nova => "nova",
            Weapon::Xm1014 => "xm1014",
            Weapon::SawedOff => "sawed_off",
            Weapon::Mag7 => "mag7",
            Weapon::Negev => "negev",
            Weapon::M249 => "m249",
            Weapon::Knife => "knife",
            Weapon::HeGrenade => "he_grenade",
            Weapon::Flashbang => "flashbang",
            Weapon::SmokeGrenade => "smoke",
            Weapon::Molotov => "molotov",
            Weapon::Incendiary => "incendiary",
            Weapon::Decoy => "decoy",
            Weapon::Zeus => "zeus",
            Weapon::C4 => "c4",
            Weapon::Unknown => "unknown",
        }
    }

    /// Expected cumulative recoil offset for a 1-based bullet index.
    ///
    /// Indices are clamped to `1..=MAX_PATTERN_BULLET`. Weapons with a table past
    /// its end repeat the last entry; weapons without one use
    /// [`generic_recoil_offset`].
    #[must_use]
    pub fn recoil_offset(self, bullet_index: u32) -> RecoilOffset {
        let bullet = bullet_index.clamp(1, MAX_PATTERN_BULLET);
        match spray_pattern(self) {
            Some(pattern) => {
                let idx = (bullet as usize - 1).min(pattern.len() - 1);
                let (yaw, pitch) = pattern[idx];
                RecoilOffset { yaw, pitch }
            }
            None => generic_recoil_offset(bullet),
        }
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Highest bullet index a spray pattern describes.
pub const MAX_PATTERN_BULLET: u32 = 30;

/// Expected view offset from the first bullet, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecoilOffset {
    /// Horizontal drift.
    pub yaw: f64,
    /// Vertical climb.
    pub pitch: f64,
}

/// Approximation for weapons without a table: steady climb, horizontal sway after
/// bullet 10.
#[must_use]
pub fn generic_recoil_offset(bullet_index: u32) -> RecoilOffset {
    let bullet = f64::from(bullet_index);
    let yaw = if bullet_index > 10 {
        let phase = f64::from(bullet_index - 10) * 0.6;
        phase.sin() * bullet * 0.3
    } else {
        0.0
    };
    RecoilOffset {
        yaw,
        pitch: (bullet * 0.7).min(20.0),
    }
}

fn spray_pattern(weapon: Weapon) -> Option<&'static [(f64, f64)]> {
    match weapon {
        Weapon::Ak47 => Some(AK47_PATTERN),
        Weapon::M4a4 => Some(M4A4_PATTERN),
        Weapon::M4a1S => Some(M4A1S_PATTERN),
        Weapon::Mp9 => Some(MP9_PATTERN),
        Weapon::P90 => Some(P90_PATTERN),
        _ => None,
    }
}

const AK47_PATTERN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.0, 1.0),
    (0.0, 2.5),
    (0.2, 4.0),
    (0.5, 5.5),
    (1.0, 7.0),
    (2.0, 8.5),
    (3.0, 9.5),
    (3.5, 10.0),
    (2.5, 10.5),
    (0.0, 11.0),
    (-2.5, 11.5),
    (-4.0, 12.0),
    (-5.0, 12.5),
    (-5.5, 13.0),
    (-5.0, 13.5),
    (-4.0, 14.0),
    (-2.0, 14.5),
    (0.0, 15.0),
    (2.0, 15.5),
    (4.0, 16.0),
    (5.0, 16.5),
    (5.5, 17.0),
    (5.0, 17.5),
    (4.0, 18.0),
    (2.0, 18.5),
    (0.0, 19.0),
    (-2.0, 19.5),
    (-4.0, 20.0),
    (-5.0, 20.5),
];

const M4A4_PATTERN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.0, 0.8),
    (0.0, 2.0),
    (0.2, 3.5),
    (0.4, 5.0),
    (0.8, 6.2),
    (1.5, 7.0),
    (2.5, 7.5),
    (3.0, 8.0),
    (2.0, 8.5),
    (0.0, 9.0),
    (-2.0, 9.5),
    (-3.0, 10.0),
    (-3.5, 10.2),
    (-3.0, 10.5),
    (-1.5, 10.8),
    (0.0, 11.0),
    (1.5, 11.2),
    (2.5, 11.5),
    (3.0, 11.8),
];

const M4A1S_PATTERN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.0, 0.7),
    (0.0, 1.8),
    (0.1, 3.0),
    (0.3, 4.5),
    (0.7, 5.5),
    (1.2, 6.2),
    (2.0, 6.8),
    (2.5, 7.2),
    (1.8, 7.6),
    (0.0, 8.0),
    (-1.8, 8.2),
    (-2.5, 8.5),
    (-3.0, 8.7),
    (-2.5, 9.0),
    (-1.0, 9.2),
    (0.0, 9.5),
    (1.0, 9.7),
    (2.0, 10.0),
    (2.5, 10.2),
];

const MP9_PATTERN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.0, 0.6),
    (0.0, 1.5),
    (0.2, 2.2),
    (0.5, 3.0),
    (1.0, 3.8),
    (1.5, 4.5),
    (2.0, 5.0),
    (1.5, 5.5),
    (0.5, 6.0),
    (-0.5, 6.3),
    (-1.5, 6.6),
    (-2.0, 6.9),
    (-1.5, 7.2),
    (-0.5, 7.5),
    (0.5, 7.8),
    (1.5, 8.1),
    (2.0, 8.4),
    (1.5, 8.7),
    (0.5, 9.0),
];

const P90_PATTERN: &[(f64, f64)] = &[
    (0.0, 0.0),
    (0.0, 0.4),
    (0.0, 1.0),
    (0.1, 1.8),
    (0.2, 2.5),
    (0.4, 3.2),
    (0.7, 3.8),
    (1.0, 4.2),
    (1.3, 4.5),
    (1.0, 4.8),
    (0.5, 5.1),
    (0.0, 5.3),
    (-0.5, 5.5),
    (-1.0, 5.7),
    (-1.3, 5.9),
    (-1.0, 6.1),
    (-0.5, 6.3),
    (0.0, 6.5),
    (0.5, 6.7),
    (1.0, 6.9),
];
