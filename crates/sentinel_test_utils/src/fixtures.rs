//! Replay builders and canned scenarios.
//!
//! [`ReplayBuilder`] keeps a roster of player snapshots that carries over from
//! frame to frame, so a test only states what changes on each tick.

use sentinel_core::math::{Vec3, ViewAngles};
use sentinel_core::replay::{
    GameEvent, PlayerId, PlayerRef, PlayerSnapshot, Replay, ReplayHeader, Team, TickFrame,
};
use sentinel_core::weapons::Weapon;

/// Incremental replay constructor.
#[derive(Debug, Clone)]
pub struct ReplayBuilder {
    replay: Replay,
    roster: Vec<PlayerSnapshot>,
    events: Vec<GameEvent>,
    tick: u64,
}

impl Default for ReplayBuilder {
    fn default() -> Self {
        Self::new("fixture")
    }
}

impl ReplayBuilder {
    /// Start a 64-tick replay on `de_fixture`, first frame at tick 1.
    #[must_use]
    pub fn new(demo_name: &str) -> Self {
        Self {
            replay: Replay::new(ReplayHeader {
                demo_name: demo_name.to_string(),
                map_name: "de_fixture".to_string(),
                ..ReplayHeader::default()
            }),
            roster: Vec::new(),
            events: Vec::new(),
            tick: 1,
        }
    }

    /// Set the header tick rate.
    #[must_use]
    pub fn tick_rate(mut self, tick_rate: f64) -> Self {
        self.replay.header.tick_rate = tick_rate;
        self
    }

    /// Set the map name.
    #[must_use]
    pub fn map(mut self, map_name: &str) -> Self {
        self.replay.header.map_name = map_name.to_string();
        self
    }

    /// Add a live player holding an AK-47 at the origin, looking along +x.
    #[must_use]
    pub fn player(mut self, id: u64, name: &str, team: Team) -> Self {
        self.roster.push(PlayerSnapshot {
            id: PlayerId(id),
            name: name.to_string(),
            team,
            view: ViewAngles::default(),
            position: Vec3::ZERO,
            active_weapon: Some(Weapon::Ak47),
            alive: true,
        });
        self
    }

    /// Tick the next committed frame will carry.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Jump the next frame to `tick`.
    pub fn at_tick(&mut self, tick: u64) -> &mut Self {
        self.tick = tick;
        self
    }

    /// Mutable snapshot of a roster player.
    ///
    /// # Panics
    /// Panics if the player was never added.
    pub fn snapshot_mut(&mut self, id: u64) -> &mut PlayerSnapshot {
        self.roster
            .iter_mut()
            .find(|p| p.id == PlayerId(id))
            .unwrap_or_else(|| panic!("player {id} not in roster"))
    }

    /// Reference to a roster player, as events carry it.
    ///
    /// # Panics
    /// Panics if the player was never added.
    #[must_use]
    pub fn player_ref(&self, id: u64) -> PlayerRef {
        self.roster
            .iter()
            .find(|p| p.id == PlayerId(id))
            .map(PlayerRef::from)
            .unwrap_or_else(|| panic!("player {id} not in roster"))
    }

    /// Set a player's view.
    pub fn look(&mut self, id: u64, yaw: f64, pitch: f64) -> &mut Self {
        self.snapshot_mut(id).view = ViewAngles::new(yaw, pitch);
        self
    }

    /// Set a player's position.
    pub fn place(&mut self, id: u64, position: Vec3) -> &mut Self {
        self.snapshot_mut(id).position = position;
        self
    }

    /// Set a player's held item.
    pub fn hold(&mut self, id: u64, weapon: Option<Weapon>) -> &mut Self {
        self.snapshot_mut(id).active_weapon = weapon;
        self
    }

    /// Set a player's alive flag.
    pub fn set_alive(&mut self, id: u64, alive: bool) -> &mut Self {
        self.snapshot_mut(id).alive = alive;
        self
    }

    /// Queue an event on the pending frame.
    pub fn event(&mut self, event: GameEvent) -> &mut Self {
        self.events.push(event);
        self
    }

    /// Queue a shot with the player's held weapon (AK-47 when empty-handed).
    pub fn fire(&mut self, id: u64) -> &mut Self {
        let weapon = self.snapshot_mut(id).active_weapon.unwrap_or(Weapon::Ak47);
        let shooter = self.player_ref(id);
        self.event(GameEvent::WeaponFire { shooter, weapon })
    }

    /// Queue a kill.
    pub fn kill(&mut self, killer: u64, victim: u64, headshot: bool) -> &mut Self {
        let weapon = self.snapshot_mut(killer).active_weapon;
        let event = GameEvent::Kill {
            killer: Some(self.player_ref(killer)),
            victim: Some(self.player_ref(victim)),
            headshot,
            weapon,
        };
        self.event(event)
    }

    /// Queue a round end.
    pub fn round_end(&mut self) -> &mut Self {
        self.event(GameEvent::RoundEnd)
    }

    /// Commit the pending frame and advance one tick.
    pub fn commit(&mut self) -> &mut Self {
        self.replay.push_frame(TickFrame {
            tick: self.tick,
            players: self.roster.clone(),
            events: std::mem::take(&mut self.events),
        });
        self.tick += 1;
        self
    }

    /// Commit `count` frames with no changes.
    pub fn idle(&mut self, count: u64) -> &mut Self {
        for _ in 0..count {
            self.commit();
        }
        self
    }

    /// Finish, committing a frame first if events are pending.
    #[must_use]
    pub fn build(&mut self) -> Replay {
        if !self.events.is_empty() {
            self.commit();
        }
        self.replay.clone()
    }
}

/// Attacker 1 (T) at the origin looking along +x, opponent 2 (CT) out of view at
/// (0, 800, 0).
#[must_use]
pub fn duel() -> ReplayBuilder {
    let mut builder = ReplayBuilder::new("duel")
        .player(1, "attacker", Team::Terrorist)
        .player(2, "target", Team::CounterTerrorist);
    builder.place(2, Vec3::new(0.0, 800.0, 0.0));
    builder
}

/// A single burst from player 1 that follows the weapon's pattern exactly,
/// two ticks between shots.
#[must_use]
pub fn perfect_spray(weapon: Weapon, shots: u32) -> Replay {
    let mut builder = duel();
    builder.hold(1, Some(weapon));
    let (yaw, pitch) = (15.0, 2.0);
    for bullet in 1..=shots {
        let offset = if bullet == 1 {
            Default::default()
        } else {
            weapon.recoil_offset(bullet)
        };
        builder.look(1, yaw - offset.yaw, pitch - offset.pitch);
        builder.fire(1).commit();
        builder.commit();
    }
    builder.build()
}

/// Render a replay as RON text.
///
/// # Panics
/// Panics if serialization fails.
#[must_use]
pub fn replay_ron(replay: &Replay) -> String {
    ron::ser::to_string_pretty(replay, ron::ser::PrettyConfig::default())
        .expect("replay serializes to RON")
}
