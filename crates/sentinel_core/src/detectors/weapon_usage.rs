//! Time spent holding a knife, another weapon, or nothing.

use crate::metrics::{Category, DemoStats, MetricValue, WeaponKey};
use crate::pipeline::{Detector, DetectorId};
use crate::replay::{PlayerSnapshot, TickFrame};

use super::skip_on_error;

/// Held-item class of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeldItem {
    Knife,
    Weapon,
    Nothing,
}

impl HeldItem {
    fn of(snapshot: &PlayerSnapshot) -> Self {
        match snapshot.active_weapon {
            Some(weapon) if weapon.is_knife() => HeldItem::Knife,
            Some(_) => HeldItem::Weapon,
            None => HeldItem::Nothing,
        }
    }

    const fn counter(self) -> WeaponKey {
        match self {
            HeldItem::Knife => WeaponKey::KnifeTicks,
            HeldItem::Weapon => WeaponKey::NonKnifeTicks,
            HeldItem::Nothing => WeaponKey::NoWeaponTicks,
        }
    }
}

/// Counts live ticks per held-item class.
#[derive(Debug, Default)]
pub struct WeaponUsageDetector;

impl WeaponUsageDetector {
    /// Create the detector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Detector for WeaponUsageDetector {
    fn id(&self) -> DetectorId {
        DetectorId::WEAPON_USAGE
    }

    fn name(&self) -> &'static str {
        "Weapon Usage"
    }

    fn categories(&self) -> &'static [Category] {
        &[Category::Weapons]
    }

    fn on_tick(&mut self, frame: &TickFrame, stats: &mut DemoStats) {
        for snapshot in frame
            .players
            .iter()
            .filter(|p| p.alive && p.team.is_playing())
        {
            let Some(player) = stats.player_mut(snapshot.id) else {
                continue;
            };
            skip_on_error(self.id(), player.increment_int(WeaponKey::TotalTicks));
            skip_on_error(
                self.id(),
                player.increment_int(HeldItem::of(snapshot).counter()),
            );
        }
    }

    fn finalize(&mut self, stats: &mut DemoStats) {
        for player in stats.players_mut() {
            let total = player.get_int(WeaponKey::TotalTicks).unwrap_or(0);
            if total <= 0 {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let share = |key: WeaponKey| {
                player.get_int(key).unwrap_or(0) as f64 / total as f64 * 100.0
            };
            let knife = share(WeaponKey::KnifeTicks);
            let weapon = share(WeaponKey::NonKnifeTicks);
            let nothing = share(WeaponKey::NoWeaponTicks);

            player.record(WeaponKey::KnifePercentage, MetricValue::Percentage(knife));
            player.record(WeaponKey::NonKnifePercentage, MetricValue::Percentage(weapon));
            player.record(WeaponKey::NoWeaponPercentage, MetricValue::Percentage(nothing));
        }
    }
}
