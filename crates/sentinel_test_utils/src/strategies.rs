//! Proptest strategies for replay streams.
//!
//! Generated replays use a fixed roster with alternating teams and strictly
//! increasing ticks, so every one of them is a valid pipeline input.

use proptest::prelude::*;
use sentinel_core::math::{Vec3, ViewAngles};
use sentinel_core::replay::{
    GameEvent, PlayerId, PlayerRef, PlayerSnapshot, Replay, ReplayHeader, Team, TickFrame,
};
use sentinel_core::weapons::Weapon;

/// Weapons covering every class that matters to the detectors.
pub const SAMPLE_WEAPONS: [Weapon; 10] = [
    Weapon::Ak47,
    Weapon::M4a4,
    Weapon::M4a1S,
    Weapon::Mp9,
    Weapon::P90,
    Weapon::Famas,
    Weapon::Awp,
    Weapon::DesertEagle,
    Weapon::Glock,
    Weapon::Knife,
];

/// Generate a view direction. Yaw in [-180, 180), pitch in [-89, 89].
pub fn arb_view_angles() -> impl Strategy<Value = ViewAngles> {
    (-180.0f64..180.0, -89.0f64..=89.0).prop_map(|(yaw, pitch)| ViewAngles::new(yaw, pitch))
}

/// Generate a position on a 4000-unit square map.
pub fn arb_position() -> impl Strategy<Value = Vec3> {
    (-2000.0f64..2000.0, -2000.0f64..2000.0, -200.0f64..200.0)
        .prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

/// Generate a weapon from [`SAMPLE_WEAPONS`].
pub fn arb_weapon() -> impl Strategy<Value = Weapon> {
    proptest::sample::select(SAMPLE_WEAPONS.to_vec())
}

/// Generate a held item, sometimes nothing.
pub fn arb_held_item() -> impl Strategy<Value = Option<Weapon>> {
    prop_oneof![4 => arb_weapon().prop_map(Some), 1 => Just(None)]
}

fn team_of(id: u64) -> Team {
    if id % 2 == 0 {
        Team::CounterTerrorist
    } else {
        Team::Terrorist
    }
}

fn player_ref(id: u64) -> PlayerRef {
    PlayerRef::new(PlayerId(id), format!("player{id}"), team_of(id))
}

/// Generate the snapshot of roster player `id`.
pub fn arb_snapshot(id: u64) -> impl Strategy<Value = PlayerSnapshot> {
    (arb_view_angles(), arb_position(), arb_held_item(), prop::bool::weighted(0.9)).prop_map(
        move |(view, position, active_weapon, alive)| PlayerSnapshot {
            id: PlayerId(id),
            name: format!("player{id}"),
            team: team_of(id),
            view,
            position,
            active_weapon,
            alive,
        },
    )
}

/// Generate an event between roster players `1..=players`.
pub fn arb_event(players: u64) -> impl Strategy<Value = GameEvent> {
    let id = 1..=players;
    prop_oneof![
        6 => (id.clone(), arb_weapon()).prop_map(|(shooter, weapon)| GameEvent::WeaponFire {
            shooter: player_ref(shooter),
            weapon,
        }),
        2 => (id.clone(), id.clone(), any::<bool>(), arb_weapon()).prop_map(
            |(killer, victim, headshot, weapon)| GameEvent::Kill {
                killer: Some(player_ref(killer)),
                victim: Some(player_ref(victim)),
                headshot,
                weapon: Some(weapon),
            }
        ),
        1 => (id.clone(), id, 1u32..100).prop_map(|(attacker, victim, damage)| {
            GameEvent::PlayerHurt {
                attacker: Some(player_ref(attacker)),
                victim: player_ref(victim),
                damage,
            }
        }),
        1 => Just(GameEvent::RoundEnd),
    ]
}

/// Generate one frame's content for a roster of `players`.
pub fn arb_frame_body(players: u64) -> impl Strategy<Value = (Vec<PlayerSnapshot>, Vec<GameEvent>)> {
    let snapshots: Vec<_> = (1..=players).map(arb_snapshot).collect();
    (
        snapshots,
        proptest::collection::vec(arb_event(players), 0..3),
    )
}

/// Generate a valid replay: 2 to 10 players, up to `max_frames` frames, tick
/// gaps of 1 to 8.
pub fn arb_replay(max_frames: usize) -> impl Strategy<Value = Replay> {
    (2u64..=10).prop_flat_map(move |players| {
        proptest::collection::vec((1u64..=8, arb_frame_body(players)), 1..max_frames.max(2))
            .prop_map(|bodies| {
                let mut replay = Replay::new(ReplayHeader {
                    demo_name: "generated".to_string(),
                    map_name: "de_prop".to_string(),
                    ..ReplayHeader::default()
                });
                let mut tick = 0;
                for (gap, (players, events)) in bodies {
                    tick += gap;
                    replay.push_frame(TickFrame {
                        tick,
                        players,
                        events,
                    });
                }
                replay
            })
    })
}

/// Generate a non-empty sample of reaction times in ms.
pub fn arb_reaction_samples() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0f64..2000.0, 1..64)
}

/// Generate a non-empty sample of snap velocities in degrees/ms.
pub fn arb_snap_velocities() -> impl Strategy<Value = Vec<f64>> {
    proptest::collection::vec(0.0001f64..20.0, 1..64)
}
