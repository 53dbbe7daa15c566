//! Per-player metrics store.
//!
//! Every metric is addressed by a [`MetricKey`], an enumerated identifier that
//! knows its [`Category`]. Values are a closed tagged union ([`MetricValue`]), so
//! consumers match on kinds instead of probing loosely typed fields.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::{AnalysisError, Result};
use crate::replay::PlayerId;
use crate::weapons::Weapon;

/// Topical grouping of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Time spent per held item class.
    Weapons,
    /// Kill and headshot counts.
    Kills,
    /// Aim snap velocities.
    Aiming,
    /// Reaction times after an opponent enters view.
    Reaction,
    /// Spray control against known patterns.
    Recoil,
    /// Composite cheat scoring.
    AntiCheat,
    /// Round count and game mode.
    GameInfo,
}

impl Category {
    /// Every category, in report order.
    pub const ALL: [Category; 7] = [
        Category::Weapons,
        Category::Kills,
        Category::Aiming,
        Category::Reaction,
        Category::Recoil,
        Category::AntiCheat,
        Category::GameInfo,
    ];

    /// Stable lowercase identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::Weapons => "weapons",
            Category::Kills => "kills",
            Category::Aiming => "aiming",
            Category::Reaction => "reaction",
            Category::Recoil => "recoil",
            Category::AntiCheat => "anti_cheat",
            Category::GameInfo => "game_info",
        }
    }

    /// Human-readable title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Category::Weapons => "Weapons",
            Category::Kills => "Kills",
            Category::Aiming => "Aiming",
            Category::Reaction => "Reaction",
            Category::Recoil => "Recoil",
            Category::AntiCheat => "Anti-Cheat",
            Category::GameInfo => "Game Info",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keys in [`Category::Weapons`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum WeaponKey {
    TotalTicks,
    KnifeTicks,
    NonKnifeTicks,
    NoWeaponTicks,
    KnifePercentage,
    NonKnifePercentage,
    NoWeaponPercentage,
}

/// Keys in [`Category::Kills`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum KillKey {
    TotalKills,
    HeadshotKills,
    HeadshotPercentage,
}

/// Keys in [`Category::Aiming`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum AimKey {
    SnappedKills,
    P95SnapVelocity,
    MedianSnapVelocity,
    AvgSnapVelocity,
    SnapCount,
}

/// Keys in [`Category::Reaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum ReactionKey {
    ShotsAfterFovEntry,
    MedianReactionTime,
    P10ReactionTime,
    Sub100msRatio,
    ReactionSamples,
    ReactionCheatScore,
}

/// Keys in [`Category::Recoil`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum RecoilKey {
    TotalErrorSum,
    TotalCountedBullets,
    BurstCount,
    WeaponBullets(Weapon),
    MeanAngularError,
    RecoilEfficiency,
    RecoilScore,
    RecoilInterpretation,
}

/// Keys in [`Category::AntiCheat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum AntiCheatKey {
    CheatLikelihood,
    Cheater,
    HsScore,
    SnapScore,
    ReactionScore,
    RecoilScore,
    TotalCheatScore,
    WingmanBoost,
    CompetitiveBoost,
}

/// Keys in [`Category::GameInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum GameInfoKey {
    RoundCount,
    GameMode,
}

/// Identifier of one metric. The variant fixes its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs)]
pub enum MetricKey {
    Weapons(WeaponKey),
    Kills(KillKey),
    Aiming(AimKey),
    Reaction(ReactionKey),
    Recoil(RecoilKey),
    AntiCheat(AntiCheatKey),
    GameInfo(GameInfoKey),
}

impl MetricKey {
    /// Category this key belongs to.
    #[must_use]
    pub const fn category(self) -> Category {
        match self {
            MetricKey::Weapons(_) => Category::Weapons,
            MetricKey::Kills(_) => Category::Kills,
            MetricKey::Aiming(_) => Category::Aiming,
            MetricKey::Reaction(_) => Category::Reaction,
            MetricKey::Recoil(_) => Category::Recoil,
            MetricKey::AntiCheat(_) => Category::AntiCheat,
            MetricKey::GameInfo(_) => Category::GameInfo,
        }
    }

    /// Snake-case metric name, unique within the category.
    #[must_use]
    pub fn name(self) -> Cow<'static, str> {
        let name = match self {
            MetricKey::Weapons(key) => match key {
                WeaponKey::TotalTicks => "total_ticks",
                WeaponKey::KnifeTicks => "knife_ticks",
                WeaponKey::NonKnifeTicks => "non_knife_ticks",
                WeaponKey::NoWeaponTicks => "no_weapon_ticks",
                WeaponKey::KnifePercentage => "knife_percentage",
                WeaponKey::NonKnifePercentage => "non_knife_percentage",
                WeaponKey::NoWeaponPercentage => "no_weapon_percentage",
            },
            MetricKey::Kills(key) => match key {
                KillKey::TotalKills => "total_kills",
                KillKey::HeadshotKills => "headshot_kills",
                KillKey::HeadshotPercentage => "headshot_percentage",
            },
            MetricKey::Aiming(key) => match key {
                AimKey::SnappedKills => "snapped_kills",
                AimKey::P95SnapVelocity => "p95_snap_velocity",
                AimKey::MedianSnapVelocity => "median_snap_velocity",
                AimKey::AvgSnapVelocity => "avg_snap_velocity",
                AimKey::SnapCount => "snap_count",
            },
            MetricKey::Reaction(key) => match key {
                ReactionKey::ShotsAfterFovEntry => "shots_after_fov_entry",
                ReactionKey::MedianReactionTime => "median_reaction_time",
                ReactionKey::P10ReactionTime => "p10_reaction_time",
                ReactionKey::Sub100msRatio => "sub_100ms_ratio",
                ReactionKey::ReactionSamples => "reaction_samples",
                ReactionKey::ReactionCheatScore => "reaction_cheat_score",
            },
            MetricKey::Recoil(key) => match key {
                RecoilKey::TotalErrorSum => "total_error_sum",
                RecoilKey::TotalCountedBullets => "total_counted_bullets",
                RecoilKey::BurstCount => "burst_count",
                RecoilKey::WeaponBullets(weapon) => {
                    return Cow::Owned(format!("{}_bullets", weapon.slug()));
                }
                RecoilKey::MeanAngularError => "mean_angular_error",
                RecoilKey::RecoilEfficiency => "recoil_efficiency",
                RecoilKey::RecoilScore => "recoil_score",
                RecoilKey::RecoilInterpretation => "recoil_interpretation",
            },
            MetricKey::AntiCheat(key) => match key {
                AntiCheatKey::CheatLikelihood => "cheat_likelihood",
                AntiCheatKey::Cheater => "cheater",
                AntiCheatKey::HsScore => "hs_score",
                AntiCheatKey::SnapScore => "snap_score",
                AntiCheatKey::ReactionScore => "reaction_score",
                AntiCheatKey::RecoilScore => "recoil_score",
                AntiCheatKey::TotalCheatScore => "total_cheat_score",
                AntiCheatKey::WingmanBoost => "wingman_boost",
                AntiCheatKey::CompetitiveBoost => "competitive_boost",
            },
            MetricKey::GameInfo(key) => match key {
                GameInfoKey::RoundCount => "round_count",
                GameInfoKey::GameMode => "game_mode",
            },
        };
        Cow::Borrowed(name)
    }

    /// Default human-readable description.
    #[must_use]
    pub fn description(self) -> Cow<'static, str> {
        let text = match self {
            MetricKey::Weapons(key) => match key {
                WeaponKey::TotalTicks => "Ticks observed alive",
                WeaponKey::KnifeTicks => "Ticks with knife equipped",
                WeaponKey::NonKnifeTicks => "Ticks with non-knife weapons equipped",
                WeaponKey::NoWeaponTicks => "Ticks with no weapon equipped",
                WeaponKey::KnifePercentage => "Percentage of time with knife equipped",
                WeaponKey::NonKnifePercentage => {
                    "Percentage of time with non-knife weapons equipped"
                }
                WeaponKey::NoWeaponPercentage => "Percentage of time with no weapon equipped",
            },
            MetricKey::Kills(key) => match key {
                KillKey::TotalKills => "Kills on opponents",
                KillKey::HeadshotKills => "Kills on opponents with a headshot",
                KillKey::HeadshotPercentage => "Percentage of kills that were headshots",
            },
            MetricKey::Aiming(key) => match key {
                AimKey::SnappedKills => "Kills with view history analyzed",
                AimKey::P95SnapVelocity => "95th percentile of aim snap velocity in degrees/ms",
                AimKey::MedianSnapVelocity => "Median of aim snap velocity in degrees/ms",
                AimKey::AvgSnapVelocity => "Average aim snap velocity in degrees/ms",
                AimKey::SnapCount => "Number of aim snaps analyzed",
            },
            MetricKey::Reaction(key) => match key {
                ReactionKey::ShotsAfterFovEntry => "Shots fired after an opponent entered view",
                ReactionKey::MedianReactionTime => "Median reaction time in milliseconds",
                ReactionKey::P10ReactionTime => "10th percentile reaction time in milliseconds",
                ReactionKey::Sub100msRatio => {
                    "Percentage of shots fired within 100ms of an opponent entering view"
                }
                ReactionKey::ReactionSamples => "Number of reaction time samples collected",
                ReactionKey::ReactionCheatScore => {
                    "Reaction time-based cheat score (0-1, higher is more suspicious)"
                }
            },
            MetricKey::Recoil(key) => match key {
                RecoilKey::TotalErrorSum => "Total angular error sum in degrees",
                RecoilKey::TotalCountedBullets => "Total bullets analyzed for recoil control",
                RecoilKey::BurstCount => "Bursts analyzed for recoil control",
                RecoilKey::WeaponBullets(weapon) => {
                    return Cow::Owned(format!("Bullets analyzed for {weapon}"));
                }
                RecoilKey::MeanAngularError => "Mean angular error in recoil control (degrees)",
                RecoilKey::RecoilEfficiency => {
                    "Recoil control efficiency (higher is more suspicious)"
                }
                RecoilKey::RecoilScore => "Recoil score component for cheat detection (0-1)",
                RecoilKey::RecoilInterpretation => "Interpretation of recoil control ability",
            },
            MetricKey::AntiCheat(key) => match key {
                AntiCheatKey::CheatLikelihood => "Estimated likelihood of player cheating",
                AntiCheatKey::Cheater => "Whether the player is flagged as a potential cheater",
                AntiCheatKey::HsScore => "Headshot-based cheat score component (0-1)",
                AntiCheatKey::SnapScore => "Snap velocity-based cheat score component (0-1)",
                AntiCheatKey::ReactionScore => "Reaction time-based cheat score component (0-1)",
                AntiCheatKey::RecoilScore => "Recoil control-based cheat score component (0-1)",
                AntiCheatKey::TotalCheatScore => "Total weighted cheat score (0-1)",
                AntiCheatKey::WingmanBoost => "Kill count boost applied for Wingman",
                AntiCheatKey::CompetitiveBoost => "Kill count boost applied for regulation time",
            },
            MetricKey::GameInfo(key) => match key {
                GameInfoKey::RoundCount => "Number of rounds played",
                GameInfoKey::GameMode => "Detected game mode",
            },
        };
        Cow::Borrowed(text)
    }

    /// Raw accumulators that only feed other metrics.
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            MetricKey::Weapons(
                WeaponKey::TotalTicks
                    | WeaponKey::KnifeTicks
                    | WeaponKey::NonKnifeTicks
                    | WeaponKey::NoWeaponTicks
            ) | MetricKey::Recoil(RecoilKey::TotalErrorSum)
        )
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.category(), self.name())
    }
}

impl Serialize for MetricKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

macro_rules! impl_from_key {
    ($($variant:ident($key:ty)),* $(,)?) => {
        $(
            impl From<$key> for MetricKey {
                fn from(key: $key) -> Self {
                    MetricKey::$variant(key)
                }
            }
        )*
    };
}

impl_from_key!(
    Weapons(WeaponKey),
    Kills(KillKey),
    Aiming(AimKey),
    Reaction(ReactionKey),
    Recoil(RecoilKey),
    AntiCheat(AntiCheatKey),
    GameInfo(GameInfoKey),
);

/// Discriminant of a [`MetricValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MetricKind {
    Count,
    Percentage,
    Duration,
    Float,
    Integer,
    Text,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::Count => "count",
            MetricKind::Percentage => "percentage",
            MetricKind::Duration => "duration",
            MetricKind::Float => "float",
            MetricKind::Integer => "integer",
            MetricKind::Text => "string",
        };
        f.write_str(name)
    }
}

/// A metric value. Exactly one kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    /// Non-negative tally.
    Count(u64),
    /// Percentage in 0..=100.
    Percentage(f64),
    /// Elapsed time.
    Duration(Duration),
    /// Arbitrary real value.
    Float(f64),
    /// Signed integer, the kind produced by [`PlayerStats::increment_int`].
    Integer(i64),
    /// Free text.
    #[serde(rename = "string")]
    Text(String),
}

impl MetricValue {
    /// Kind of this value.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Count(_) => MetricKind::Count,
            MetricValue::Percentage(_) => MetricKind::Percentage,
            MetricValue::Duration(_) => MetricKind::Duration,
            MetricValue::Float(_) => MetricKind::Float,
            MetricValue::Integer(_) => MetricKind::Integer,
            MetricValue::Text(_) => MetricKind::Text,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(v) => write!(f, "{v}"),
            MetricValue::Integer(v) => write!(f, "{v}"),
            MetricValue::Percentage(v) => write!(f, "{v:.2}%"),
            MetricValue::Float(v) => write!(f, "{v:.2}"),
            MetricValue::Duration(d) => write!(f, "{:.0}ms", d.as_secs_f64() * 1000.0),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// A single statistical measure with its description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// The value.
    #[serde(flatten)]
    pub value: MetricValue,
    /// Human-readable description.
    pub description: Cow<'static, str>,
}

impl Metric {
    /// Create a metric with an explicit description.
    #[must_use]
    pub fn new(value: MetricValue, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            value,
            description: description.into(),
        }
    }

    /// Integer value, if this metric holds one.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            MetricValue::Integer(v) => Some(v),
            MetricValue::Count(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Real value for float and percentage metrics.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self.value {
            MetricValue::Float(v) | MetricValue::Percentage(v) => Some(v),
            _ => None,
        }
    }

    /// Text value, if this metric holds one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            MetricValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Fixed identity of a tracked player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerIdentity {
    /// Numeric player identifier.
    pub id: PlayerId,
    /// Display name at first observation.
    pub name: String,
}

/// All metrics for one player.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerStats {
    identity: PlayerIdentity,
    categories: BTreeMap<Category, BTreeMap<MetricKey, Metric>>,
}

impl PlayerStats {
    /// Create an empty record.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            identity: PlayerIdentity {
                id,
                name: name.into(),
            },
            categories: BTreeMap::new(),
        }
    }

    /// Player identity.
    #[must_use]
    pub fn identity(&self) -> &PlayerIdentity {
        &self.identity
    }

    /// Player identifier.
    #[must_use]
    pub fn id(&self) -> PlayerId {
        self.identity.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Add or overwrite a metric.
    pub fn add(&mut self, key: impl Into<MetricKey>, metric: Metric) {
        let key = key.into();
        self.categories
            .entry(key.category())
            .or_default()
            .insert(key, metric);
    }

    /// Add or overwrite a metric using the key's default description.
    pub fn record(&mut self, key: impl Into<MetricKey>, value: MetricValue) {
        let key = key.into();
        self.add(key, Metric::new(value, key.description()));
    }

    /// Look up a metric.
    #[must_use]
    pub fn get(&self, key: impl Into<MetricKey>) -> Option<&Metric> {
        let key = key.into();
        self.categories.get(&key.category())?.get(&key)
    }

    /// Integer value of a metric; `None` when absent or not integral.
    #[must_use]
    pub fn get_int(&self, key: impl Into<MetricKey>) -> Option<i64> {
        self.get(key).and_then(Metric::as_int)
    }

    /// Real value of a float or percentage metric.
    #[must_use]
    pub fn get_float(&self, key: impl Into<MetricKey>) -> Option<f64> {
        self.get(key).and_then(Metric::as_float)
    }

    /// Text value of a metric.
    #[must_use]
    pub fn get_text(&self, key: impl Into<MetricKey>) -> Option<&str> {
        self.get(key).and_then(Metric::as_text)
    }

    /// Increment an integer metric, creating it at 1.
    ///
    /// # Errors
    /// Returns [`AnalysisError::MetricTypeMismatch`] if the metric holds another kind.
    pub fn increment_int(&mut self, key: impl Into<MetricKey>) -> Result<i64> {
        let key = key.into();
        let slot = self.categories.entry(key.category()).or_default();
        match slot.get_mut(&key) {
            None => {
                slot.insert(key, Metric::new(MetricValue::Integer(1), key.description()));
                Ok(1)
            }
            Some(Metric {
                value: MetricValue::Integer(v),
                ..
            }) => {
                *v += 1;
                Ok(*v)
            }
            Some(other) => Err(AnalysisError::MetricTypeMismatch {
                key,
                expected: MetricKind::Integer,
                found: other.value.kind(),
            }),
        }
    }

    /// Add `delta` to a float metric, creating it at `delta`.
    ///
    /// # Errors
    /// Returns [`AnalysisError::MetricTypeMismatch`] if the metric holds another kind.
    pub fn increment_float(&mut self, key: impl Into<MetricKey>, delta: f64) -> Result<f64> {
        let key = key.into();
        let slot = self.categories.entry(key.category()).or_default();
        match slot.get_mut(&key) {
            None => {
                slot.insert(key, Metric::new(MetricValue::Float(delta), key.description()));
                Ok(delta)
            }
            Some(Metric {
                value: MetricValue::Float(v),
                ..
            }) => {
                *v += delta;
                Ok(*v)
            }
            Some(other) => Err(AnalysisError::MetricTypeMismatch {
                key,
                expected: MetricKind::Float,
                found: other.value.kind(),
            }),
        }
    }

    /// Metrics of one category, in key order.
    #[must_use]
    pub fn category(&self, category: Category) -> Option<&BTreeMap<MetricKey, Metric>> {
        self.categories.get(&category)
    }

    /// Total number of metrics across categories.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.categories.values().map(BTreeMap::len).sum()
    }
}

/// Detected game mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
pub enum GameMode {
    /// 5v5, regulation of 24 or 30 rounds.
    Competitive,
    /// 2v2.
    Wingman,
}

impl GameMode {
    /// Display name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            GameMode::Competitive => "Competitive",
            GameMode::Wingman => "Wingman",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Replay-wide facts with no per-player owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchInfo {
    /// Rounds completed.
    pub round_count: u32,
    /// Game mode, once detected.
    pub game_mode: Option<GameMode>,
}

/// Replay metadata copied from the source header.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DemoInfo {
    /// Replay file name.
    pub demo_name: String,
    /// Map name.
    pub map_name: String,
    /// Ticks per second.
    pub tick_rate: f64,
    /// Frames processed.
    pub tick_count: u64,
}

/// Statistics for every player in one replay.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DemoStats {
    /// Replay metadata.
    pub info: DemoInfo,
    /// Replay-level metrics.
    pub match_info: MatchInfo,
    players: BTreeMap<PlayerId, PlayerStats>,
}

impl DemoStats {
    /// Create empty stats for a replay.
    #[must_use]
    pub fn new(info: DemoInfo) -> Self {
        Self {
            info,
            match_info: MatchInfo::default(),
            players: BTreeMap::new(),
        }
    }

    /// Get or create the record for a player.
    ///
    /// Returns `None` for the invalid zero identifier. An existing record keeps
    /// the name it was created with.
    pub fn observe(&mut self, id: PlayerId, name: &str) -> Option<&mut PlayerStats> {
        if !id.is_valid() {
            return None;
        }
        Some(
            self.players
                .entry(id)
                .or_insert_with(|| PlayerStats::new(id, name)),
        )
    }

    /// Record for a player, if observed.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerStats> {
        self.players.get(&id)
    }

    /// Mutable record for a player, if observed.
    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut PlayerStats> {
        self.players.get_mut(&id)
    }

    /// All players in ID order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerStats> {
        self.players.values()
    }

    /// All players in ID order, mutably.
    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut PlayerStats> {
        self.players.values_mut()
    }

    /// Number of observed players.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Whether any player has a metric in `category`.
    #[must_use]
    pub fn has_category(&self, category: Category) -> bool {
        self.players
            .values()
            .any(|p| p.category(category).is_some_and(|m| !m.is_empty()))
    }
}
