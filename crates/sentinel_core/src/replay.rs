//! Pre-decoded replay model.
//!
//! A replay is a header plus a chronological stream of [`TickFrame`]s. Each frame
//! carries the snapshot of every connected player and the events that happened on
//! that tick, in order. Decoding the game's own demo format into this shape happens
//! outside the engine; the engine consumes it through [`ReplaySource`].

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::math::{Vec3, ViewAngles};
use crate::weapons::Weapon;

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Numeric player identifier. Zero means "no player".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl PlayerId {
    /// Whether this identifier refers to a real player.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Team affiliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Team {
    /// Not yet on a team.
    #[default]
    Unassigned,
    /// Watching only.
    Spectator,
    /// Terrorist side.
    Terrorist,
    /// Counter-terrorist side.
    CounterTerrorist,
}

impl Team {
    /// Whether the team takes part in rounds.
    #[must_use]
    pub const fn is_playing(self) -> bool {
        matches!(self, Team::Terrorist | Team::CounterTerrorist)
    }

    /// Whether two teams are opposing playing sides.
    #[must_use]
    pub fn opposes(self, other: Team) -> bool {
        self.is_playing() && other.is_playing() && self != other
    }
}

/// State of one player on one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Current team.
    pub team: Team,
    /// View direction.
    pub view: ViewAngles,
    /// Eye position.
    pub position: Vec3,
    /// Held item, `None` when empty-handed.
    #[serde(default)]
    pub active_weapon: Option<Weapon>,
    /// Whether the player is alive.
    pub alive: bool,
}

/// Identity of a player named by an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Team at the time of the event.
    pub team: Team,
}

impl PlayerRef {
    /// Create a player reference.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, team: Team) -> Self {
        Self {
            id,
            name: name.into(),
            team,
        }
    }
}

impl From<&PlayerSnapshot> for PlayerRef {
    fn from(snapshot: &PlayerSnapshot) -> Self {
        Self::new(snapshot.id, snapshot.name.clone(), snapshot.team)
    }
}

/// A discrete gameplay event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A shot was fired.
    WeaponFire {
        /// Shooter.
        shooter: PlayerRef,
        /// Weapon fired.
        weapon: Weapon,
    },
    /// A player died.
    Kill {
        /// Killer, absent for world damage.
        killer: Option<PlayerRef>,
        /// Victim.
        victim: Option<PlayerRef>,
        /// Whether the killing shot hit the head.
        headshot: bool,
        /// Weapon used.
        weapon: Option<Weapon>,
    },
    /// A round finished.
    RoundEnd,
    /// A player took damage.
    PlayerHurt {
        /// Attacker, absent for world damage.
        attacker: Option<PlayerRef>,
        /// Damaged player.
        victim: PlayerRef,
        /// Health removed.
        damage: u32,
    },
}

/// Discriminant of a [`GameEvent`], used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum EventKind {
    WeaponFire,
    Kill,
    RoundEnd,
    PlayerHurt,
}

impl GameEvent {
    /// Kind of this event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            GameEvent::WeaponFire { .. } => EventKind::WeaponFire,
            GameEvent::Kill { .. } => EventKind::Kill,
            GameEvent::RoundEnd => EventKind::RoundEnd,
            GameEvent::PlayerHurt { .. } => EventKind::PlayerHurt,
        }
    }

    /// Every player named by the event.
    pub fn players(&self) -> impl Iterator<Item = &PlayerRef> {
        let (a, b) = match self {
            GameEvent::WeaponFire { shooter, .. } => (Some(shooter), None),
            GameEvent::Kill { killer, victim, .. } => (killer.as_ref(), victim.as_ref()),
            GameEvent::RoundEnd => (None, None),
            GameEvent::PlayerHurt {
                attacker, victim, ..
            } => (attacker.as_ref(), Some(victim)),
        };
        a.into_iter().chain(b)
    }
}

/// Everything that happened on one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickFrame {
    /// Tick number. Strictly increasing along a stream.
    pub tick: u64,
    /// Snapshot of every connected player.
    #[serde(default)]
    pub players: Vec<PlayerSnapshot>,
    /// Events of this tick, in stream order.
    #[serde(default)]
    pub events: Vec<GameEvent>,
}

impl TickFrame {
    /// Snapshot of a player on this tick.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }
}

/// Replay metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayHeader {
    /// Replay format version.
    pub version: u32,
    /// Replay name.
    pub demo_name: String,
    /// Map name.
    pub map_name: String,
    /// Ticks per second.
    pub tick_rate: f64,
}

impl Default for ReplayHeader {
    fn default() -> Self {
        Self {
            version: REPLAY_VERSION,
            demo_name: String::new(),
            map_name: String::new(),
            tick_rate: 64.0,
        }
    }
}

/// Producer of tick frames in chronological order.
pub trait ReplaySource {
    /// Replay metadata, available before the first frame.
    fn header(&self) -> &ReplayHeader;

    /// Next frame, or `None` at end of stream.
    ///
    /// # Errors
    /// Any error is fatal to the analysis run.
    fn next_frame(&mut self) -> Result<Option<TickFrame>>;
}

/// Complete pre-decoded replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    /// Replay metadata.
    pub header: ReplayHeader,
    /// Frames in tick order.
    pub frames: Vec<TickFrame>,
}

impl Replay {
    /// Create an empty replay.
    #[must_use]
    pub fn new(header: ReplayHeader) -> Self {
        Self {
            header,
            frames: Vec::new(),
        }
    }

    /// Append a frame.
    pub fn push_frame(&mut self, frame: TickFrame) {
        self.frames.push(frame);
    }

    /// Number of frames.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Total number of events across frames.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.frames.iter().map(|f| f.events.len()).sum()
    }

    /// Check the format version.
    ///
    /// # Errors
    /// Returns [`AnalysisError::ReplayVersionMismatch`] for other versions.
    pub fn check_version(&self) -> Result<()> {
        if self.header.version != REPLAY_VERSION {
            return Err(AnalysisError::ReplayVersionMismatch {
                expected: REPLAY_VERSION,
                found: self.header.version,
            });
        }
        Ok(())
    }

    /// Encode as bincode.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| AnalysisError::MalformedReplay(format!("Failed to serialize replay: {e}")))
    }

    /// Decode from bincode and check the version.
    ///
    /// # Errors
    /// Returns an error if the bytes are not a replay of this version.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let replay: Self = bincode::deserialize(bytes).map_err(|e| {
            AnalysisError::MalformedReplay(format!("Failed to deserialize replay: {e}"))
        })?;
        replay.check_version()?;
        Ok(replay)
    }

    /// Parse from RON text and check the version.
    ///
    /// # Errors
    /// Returns an error if the text is not a replay of this version.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let replay: Self =
            ron::from_str(ron).map_err(|e| AnalysisError::MalformedReplay(e.to_string()))?;
        replay.check_version()?;
        Ok(replay)
    }

    /// Save the replay to a bincode file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Load a replay from a bincode file.
    ///
    /// # Errors
    /// Returns [`AnalysisError::Io`] if the file cannot be read, otherwise any
    /// decoding or version error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Consume the replay as a frame stream.
    #[must_use]
    pub fn into_stream(self) -> ReplayStream {
        ReplayStream {
            header: self.header,
            frames: self.frames.into_iter(),
        }
    }
}

/// In-memory [`ReplaySource`] over a [`Replay`].
#[derive(Debug)]
pub struct ReplayStream {
    header: ReplayHeader,
    frames: std::vec::IntoIter<TickFrame>,
}

impl ReplaySource for ReplayStream {
    fn header(&self) -> &ReplayHeader {
        &self.header
    }

    fn next_frame(&mut self) -> Result<Option<TickFrame>> {
        Ok(self.frames.next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: u64, team: Team) -> PlayerSnapshot {
        PlayerSnapshot {
            id: PlayerId(id),
            name: format!("p{id}"),
            team,
            view: ViewAngles::default(),
            position: Vec3::ZERO,
            active_weapon: Some(Weapon::Ak47),
            alive: true,
        }
    }

    fn sample_replay() -> Replay {
        let mut replay = Replay::new(ReplayHeader {
            demo_name: "sample".into(),
            map_name: "de_dust2".into(),
            ..ReplayHeader::default()
        });
        let shooter = snapshot(1, Team::Terrorist);
        replay.push_frame(TickFrame {
            tick: 1,
            players: vec![shooter.clone(), snapshot(2, Team::CounterTerrorist)],
            events: vec![GameEvent::WeaponFire {
                shooter: PlayerRef::from(&shooter),
                weapon: Weapon::Ak47,
            }],
        });
        replay.push_frame(TickFrame {
            tick: 2,
            players: vec![],
            events: vec![GameEvent::RoundEnd],
        });
        replay
    }

    #[test]
    fn test_team_opposition() {
        assert!(Team::Terrorist.opposes(Team::CounterTerrorist));
        assert!(!Team::Terrorist.opposes(Team::Terrorist));
        assert!(!Team::Spectator.opposes(Team::Terrorist));
    }

    #[test]
    fn test_bincode_roundtrip() {
        let replay = sample_replay();
        let bytes = replay.to_bytes().unwrap();
        let loaded = Replay::from_bytes(&bytes).unwrap();
        assert_eq!(loaded, replay);
        assert_eq!(loaded.event_count(), 2);
    }

    #[test]
    fn test_version_mismatch() {
        let mut replay = sample_replay();
        replay.header.version = REPLAY_VERSION + 1;
        let bytes = replay.to_bytes().unwrap();
        let err = Replay::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, AnalysisError::ReplayVersionMismatch { .. }));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = Replay::from_bytes(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, AnalysisError::MalformedReplay(_)));
    }

    #[test]
    fn test_missing_file_is_io_not_malformed() {
        let err = Replay::load("no/such/dir/match.bin").unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));

        let err = sample_replay().save("no/such/dir/match.bin").unwrap_err();
        assert!(matches!(err, AnalysisError::Io(_)));
    }

    #[test]
    fn test_stream_yields_frames_in_order() {
        let mut stream = sample_replay().into_stream();
        assert_eq!(stream.header().map_name, "de_dust2");
        assert_eq!(stream.next_frame().unwrap().unwrap().tick, 1);
        assert_eq!(stream.next_frame().unwrap().unwrap().tick, 2);
        assert!(stream.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_event_players() {
        let event = GameEvent::Kill {
            killer: None,
            victim: Some(PlayerRef::new(PlayerId(4), "v", Team::Terrorist)),
            headshot: false,
            weapon: None,
        };
        let ids: Vec<_> = event.players().map(|p| p.id).collect();
        assert_eq!(ids, vec![PlayerId(4)]);
        assert_eq!(event.kind(), EventKind::Kill);
    }
}
