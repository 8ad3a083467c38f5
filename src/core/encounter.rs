//! Battle and loot resolution plus the running session statistics.

use rand::Rng;

use super::content::{LootKind, MonsterKind};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Weapon {
    Staff,
    Bow,
    Sword,
}

impl Weapon {
    pub const ALL: [Weapon; 3] = [Weapon::Staff, Weapon::Bow, Weapon::Sword];

    pub fn name(self) -> &'static str {
        match self {
            Weapon::Staff => "Staff",
            Weapon::Bow => "Bow",
            Weapon::Sword => "Sword",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Weapon::Staff => Weapon::Bow,
            Weapon::Bow => Weapon::Sword,
            Weapon::Sword => Weapon::Staff,
        }
    }

    /// The monster this weapon is good against.
    pub fn counters(self) -> MonsterKind {
        match self {
            Weapon::Staff => MonsterKind::Dragon,
            Weapon::Bow => MonsterKind::Witch,
            Weapon::Sword => MonsterKind::Troll,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

pub const EFFECTIVE_WIN_CHANCE: u32 = 85;
pub const WEAK_WIN_CHANCE: u32 = 25;
pub const UPGRADE_BONUS: u32 = 5;
pub const MAX_WIN_CHANCE: u32 = 95;

/// Win chance in percent.
pub fn win_chance(weapon: Weapon, kind: MonsterKind, upgrades: u32) -> u32 {
    let base = if weapon.counters() == kind {
        EFFECTIVE_WIN_CHANCE
    } else {
        WEAK_WIN_CHANCE
    };
    (base + upgrades.saturating_mul(UPGRADE_BONUS)).min(MAX_WIN_CHANCE)
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BattleOutcome {
    /// `heroic` when won with a weapon that does not counter the monster.
    Won { heroic: bool, hp_gained: i32, experience: u32 },
    Lost { hp_lost: i32 },
}

pub fn resolve_battle<R: Rng + ?Sized>(weapon: Weapon, kind: MonsterKind, upgrades: u32, rng: &mut R) -> BattleOutcome {
    let chance = win_chance(weapon, kind, upgrades);
    if rng.gen_range(0..100) >= chance {
        return BattleOutcome::Lost { hp_lost: 2 };
    }
    let heroic = weapon.counters() != kind;
    let experience = rng.gen_range(15..=35);
    if heroic {
        BattleOutcome::Won { heroic, hp_gained: 2, experience: experience * 2 }
    } else {
        BattleOutcome::Won { heroic, hp_gained: 1, experience }
    }
}

/// What opening a treasure grants.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LootReward {
    pub heal: i32,
    pub points: i64,
    pub weapon_upgrade: bool,
    pub experience: u32,
}

pub fn resolve_loot<R: Rng + ?Sized>(loot: LootKind, rng: &mut R) -> LootReward {
    let mut reward = LootReward {
        experience: rng.gen_range(5..=15),
        ..LootReward::default()
    };
    match loot {
        LootKind::Health => reward.heal = rng.gen_range(1..=2),
        LootKind::MegaHealth => reward.heal = rng.gen_range(2..=4),
        LootKind::WeaponUpgrade => reward.weapon_upgrade = true,
        LootKind::Points => reward.points = rng.gen_range(30..=75),
    }
    reward
}

pub const WIN_POINTS: i64 = 25;
pub const HEROIC_POINTS: i64 = 50;
pub const LOSS_POINTS: i64 = -10;

/// Running totals for a session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub wins: u32,
    pub losses: u32,
    pub heroic_wins: u32,
    pub hp_gained: i32,
    pub hp_lost: i32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub points: i64,
    pub treasures_opened: u32,
    pub levels_generated: u32,
    /// Battles per monster kind, indexed like `MonsterKind::ALL`.
    pub battles_by_kind: [u32; 3],
    /// Battles per weapon, indexed like `Weapon::ALL`.
    pub battles_by_weapon: [u32; 3],
}

impl Stats {
    pub fn battles(&self) -> u32 {
        self.wins + self.losses
    }

    /// Share of battles won, in `[0, 1]`.
    pub fn win_rate(&self) -> f32 {
        match self.battles() {
            0 => 0.0,
            n => self.wins as f32 / n as f32,
        }
    }

    pub fn record_battle(&mut self, weapon: Weapon, kind: MonsterKind, outcome: &BattleOutcome) {
        self.battles_by_weapon[weapon.index()] += 1;
        if let Some(i) = MonsterKind::ALL.iter().position(|&k| k == kind) {
            self.battles_by_kind[i] += 1;
        }
        match *outcome {
            BattleOutcome::Won { heroic, hp_gained, .. } => {
                self.wins += 1;
                self.hp_gained += hp_gained;
                self.current_streak += 1;
                self.best_streak = self.best_streak.max(self.current_streak);
                if heroic {
                    self.heroic_wins += 1;
                    self.points += HEROIC_POINTS;
                } else {
                    self.points += WIN_POINTS;
                }
            }
            BattleOutcome::Lost { hp_lost } => {
                self.losses += 1;
                self.hp_lost += hp_lost;
                self.current_streak = 0;
                self.points += LOSS_POINTS;
            }
        }
    }

    pub fn record_loot(&mut self, reward: &LootReward) {
        self.treasures_opened += 1;
        self.points += reward.points;
        self.hp_gained += reward.heal;
    }

    /// Multi-line summary for the end-of-session log.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!(
                "Battles: {} ({} won, {} lost, {} heroic), win rate {:.0}%",
                self.battles(),
                self.wins,
                self.losses,
                self.heroic_wins,
                self.win_rate() * 100.0
            ),
            format!("Best streak: {}, points: {}", self.best_streak, self.points),
            format!(
                "HP gained: {}, HP lost: {}, treasures: {}, mazes: {}",
                self.hp_gained, self.hp_lost, self.treasures_opened, self.levels_generated
            ),
        ];
        for (kind, count) in MonsterKind::ALL.iter().zip(self.battles_by_kind) {
            lines.push(format!("  vs {}: {count}", kind.name()));
        }
        for (weapon, count) in Weapon::ALL.iter().zip(self.battles_by_weapon) {
            lines.push(format!("  with {}: {count}", weapon.name()));
        }
        lines.join("\n")
    }
}
