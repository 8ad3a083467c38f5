//! Per-frame session glue: input intents in, events and messages out.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::content::{Entity, LootKind, MonsterKind, Treasure};
use super::encounter::{resolve_battle, resolve_loot, win_chance, BattleOutcome, Stats};
use super::grid::GridPos;
use super::level::Level;
use super::player::Player;
use crate::config::GameConfig;

pub const MESSAGE_SECONDS: f32 = 3.0;
pub const MAX_MESSAGES: usize = 6;

const SENSITIVITY_STEP: f32 = 0.05;
const SENSITIVITY_RANGE: (f32, f32) = (0.05, 1.0);
const INTERACT_REACH: i32 = 2;

/// Input snapshot for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Intents {
    /// Forward/back axis in `[-1, 1]`.
    pub forward: f32,
    /// Right/left axis in `[-1, 1]`.
    pub strafe: f32,
    pub sprint: bool,
    pub jump: bool,
    pub interact: bool,
    pub regenerate: bool,
    pub cycle_weapon: bool,
    pub sensitivity_up: bool,
    pub sensitivity_down: bool,
    pub debug_dump: bool,
    pub quit: bool,
    pub mouse_dx: f32,
    pub mouse_dy: f32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    BattleWon { kind: MonsterKind, heroic: bool },
    BattleLost { kind: MonsterKind },
    TreasureOpened(LootKind),
    LevelUp(u32),
    Regenerated { seed: u64 },
    GameOver,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub text: String,
    pub remaining: f32,
}

/// Short-lived HUD messages, oldest first.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    messages: VecDeque<Message>,
}

impl MessageLog {
    pub fn push(&mut self, text: impl Into<String>) {
        self.messages.push_back(Message {
            text: text.into(),
            remaining: MESSAGE_SECONDS,
        });
        while self.messages.len() > MAX_MESSAGES {
            self.messages.pop_front();
        }
    }

    /// Age every message by `dt` and drop the expired ones.
    pub fn tick(&mut self, dt: f32) {
        for message in &mut self.messages {
            message.remaining -= dt;
        }
        self.messages.retain(|m| m.remaining > 0.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

pub struct Session {
    pub config: GameConfig,
    pub level: Level,
    pub player: Player,
    pub stats: Stats,
    pub messages: MessageLog,
    /// Degrees per pixel of mouse motion.
    pub sensitivity: f32,
    game_over: bool,
    rng: StdRng,
}

impl Session {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let level = Level::generate(&config, rng.gen_range(0..=u64::MAX));
        let spawn = level.spawn_point(config.render.floor_level(), config.player.eye_height);
        let player = Player::new(&config.player, spawn);
        let mut messages = MessageLog::default();
        messages.push("Explore the maze. E to interact, R for a new maze.");
        Self {
            sensitivity: config.player.mouse_sensitivity,
            config,
            level,
            player,
            stats: Stats {
                levels_generated: 1,
                ..Stats::default()
            },
            messages,
            game_over: false,
            rng,
        }
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Eye height when standing on the floor.
    pub fn ground_level(&self) -> f32 {
        self.config.render.floor_level() + self.config.player.eye_height
    }

    pub fn update(&mut self, intents: &Intents, dt: f32) -> Vec<SessionEvent> {
        self.messages.tick(dt);
        if self.game_over {
            return Vec::new();
        }
        let player_config = &self.config.player;

        self.player.look(
            intents.mouse_dx,
            intents.mouse_dy,
            self.sensitivity,
            player_config.pitch_limit_degrees,
        );

        let mut speed = player_config.speed;
        if intents.sprint {
            speed *= player_config.sprint_multiplier;
        }
        self.player.walk(
            &self.level,
            intents.forward,
            intents.strafe,
            speed * dt,
            player_config.collision_buffer,
        );

        if intents.jump {
            self.player.jump(player_config.jump_strength);
        }
        let ground = self.ground_level();
        self.player.apply_physics(dt, self.config.player.gravity, ground);

        let mut events = Vec::new();
        if intents.cycle_weapon {
            self.player.weapon = self.player.weapon.next();
            self.messages.push(format!("Weapon: {}", self.player.weapon.name()));
        }
        if intents.sensitivity_up {
            self.adjust_sensitivity(SENSITIVITY_STEP);
        }
        if intents.sensitivity_down {
            self.adjust_sensitivity(-SENSITIVITY_STEP);
        }
        if intents.debug_dump {
            self.log_debug_state();
        }
        if intents.regenerate {
            let seed = self.regenerate();
            events.push(SessionEvent::Regenerated { seed });
        }
        if intents.interact {
            events.extend(self.interact());
        }
        events
    }

    fn adjust_sensitivity(&mut self, delta: f32) {
        let (min, max) = SENSITIVITY_RANGE;
        let stepped = ((self.sensitivity + delta) / SENSITIVITY_STEP).round() * SENSITIVITY_STEP;
        self.sensitivity = stepped.clamp(min, max);
        self.messages.push(format!("Mouse sensitivity: {:.2}", self.sensitivity));
    }

    /// Build a new level from a fresh seed, swap it in and respawn the player.
    pub fn regenerate(&mut self) -> u64 {
        let seed = self.rng.gen_range(0..=u64::MAX);
        let level = Level::generate(&self.config, seed);
        let spawn = level.spawn_point(self.config.render.floor_level(), self.config.player.eye_height);
        self.level = level;
        self.player.respawn(spawn);
        self.stats.levels_generated += 1;
        self.messages.push("A new maze takes shape...");
        seed
    }

    /// The first active entity in reach of the player, scanning row by row.
    pub fn entity_in_reach(&self) -> Option<GridPos> {
        let cell = self.player.cell();
        let radius = self.config.player.interact_radius;
        (-INTERACT_REACH..=INTERACT_REACH)
            .flat_map(|dz| (-INTERACT_REACH..=INTERACT_REACH).map(move |dx| (dx, dz)))
            .filter(|&(dx, dz)| ((dx * dx + dz * dz) as f32).sqrt() <= radius)
            .map(|(dx, dz)| cell.offset(dx, dz))
            .find(|&pos| self.level.entities.get(pos).is_some_and(Entity::is_active))
    }

    /// Fight or loot whatever is in reach.
    pub fn interact(&mut self) -> Vec<SessionEvent> {
        let Some(pos) = self.entity_in_reach() else {
            self.messages.push("Nothing here.");
            return Vec::new();
        };
        match self.level.entities.get(pos).copied() {
            Some(Entity::Monster(monster)) => self.fight(pos, monster.kind, monster.health),
            Some(Entity::Treasure(treasure)) => self.open(pos, treasure),
            None => Vec::new(),
        }
    }

    fn fight(&mut self, pos: GridPos, kind: MonsterKind, health: u32) -> Vec<SessionEvent> {
        let weapon = self.player.weapon;
        let outcome = resolve_battle(weapon, kind, self.player.weapon_upgrades, &mut self.rng);
        self.stats.record_battle(weapon, kind, &outcome);
        log::info!("{} vs {} ({health} HP) at {pos:?}: {outcome:?}", weapon.name(), kind.name());

        let mut events = Vec::new();
        match outcome {
            BattleOutcome::Won { heroic, hp_gained, experience } => {
                if let Some(Entity::Monster(m)) = self.level.entities.get_mut(pos) {
                    m.defeated = true;
                }
                self.player.heal(hp_gained);
                let verb = if heroic { "Heroic victory over" } else { "Defeated" };
                self.messages
                    .push(format!("{verb} the {}! +{hp_gained} HP, +{experience} EXP", kind.name()));
                events.push(SessionEvent::BattleWon { kind, heroic });
                events.extend(self.grant_experience(experience));
            }
            BattleOutcome::Lost { hp_lost } => {
                self.player.damage(hp_lost);
                self.messages
                    .push(format!("The {} wounds you. -{hp_lost} HP", kind.name()));
                events.push(SessionEvent::BattleLost { kind });
                if self.player.is_dead() {
                    self.game_over = true;
                    self.messages.push("You have fallen. Game over.");
                    log::info!("Game over\n{}", self.stats.summary());
                    events.push(SessionEvent::GameOver);
                }
            }
        }
        events
    }

    fn open(&mut self, pos: GridPos, treasure: Treasure) -> Vec<SessionEvent> {
        let loot = treasure.loot;
        let reward = resolve_loot(loot, &mut self.rng);
        log::debug!("Opened {:?} treasure at ({}, {}): {}", treasure.placement, pos.x, pos.z, loot.name());
        if let Some(Entity::Treasure(t)) = self.level.entities.get_mut(pos) {
            t.opened = true;
        }
        self.stats.record_loot(&reward);
        self.player.heal(reward.heal);
        if reward.weapon_upgrade {
            self.player.weapon_upgrades += 1;
        }
        let detail = match loot {
            LootKind::Health | LootKind::MegaHealth => format!("+{} HP", reward.heal),
            LootKind::WeaponUpgrade => format!("{} sharpened", self.player.weapon.name()),
            LootKind::Points => format!("+{} points", reward.points),
        };
        self.messages.push(format!("Found {}: {detail}", loot.name()));

        let mut events = vec![SessionEvent::TreasureOpened(loot)];
        events.extend(self.grant_experience(reward.experience));
        events
    }

    fn grant_experience(&mut self, amount: u32) -> Option<SessionEvent> {
        let level = self.player.gain_experience(amount)?;
        self.messages
            .push(format!("Level up! Level {level}, max HP {}", self.player.max_hp));
        log::info!("Reached level {level}");
        Some(SessionEvent::LevelUp(level))
    }

    fn log_debug_state(&self) {
        let p = &self.player;
        log::info!(
            "Player at ({:.2}, {:.2}, {:.2}) cell {:?} ({}), yaw {:.1} pitch {:.1}, level seed {}, {} active entities",
            p.position.x,
            p.position.y,
            p.position.z,
            p.cell(),
            self.level.grid.cell_or_wall(p.cell()).name(),
            p.yaw.to_degrees(),
            p.pitch.to_degrees(),
            self.level.seed,
            self.level.entities.active_count(),
        );
    }

    /// Win chance of the current weapon against each monster kind.
    pub fn win_chances(&self) -> [(MonsterKind, u32); 3] {
        MonsterKind::ALL.map(|kind| (kind, win_chance(self.player.weapon, kind, self.player.weapon_upgrades)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::content::{Monster, Placement, Treasure};
    use crate::core::encounter::Weapon;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(GameConfig::default(), 99)
    }

    /// Clear every entity and put one next to the player.
    fn with_single_entity(session: &mut Session, entity: Entity) -> GridPos {
        session.level.entities = Default::default();
        let cell = session.player.cell();
        session.level.entities.insert(cell, entity);
        cell
    }

    #[test]
    fn message_log_expires_and_caps() {
        let mut log = MessageLog::default();
        for i in 0..10 {
            log.push(format!("message {i}"));
        }
        assert_eq!(log.len(), MAX_MESSAGES);
        assert_eq!(log.iter().next().map(|m| m.text.as_str()), Some("message 4"));
        log.tick(MESSAGE_SECONDS + 0.1);
        assert!(log.is_empty());
    }

    #[test]
    fn idle_update_keeps_player_grounded() {
        let mut session = session();
        let start = session.player.position;
        for _ in 0..30 {
            assert!(session.update(&Intents::default(), 1.0 / 60.0).is_empty());
        }
        assert_eq!(session.player.position.x, start.x);
        assert_eq!(session.player.position.y, session.ground_level());
    }

    #[test]
    fn regenerate_swaps_level_and_respawns() {
        let mut session = session();
        let old_seed = session.level.seed;
        session.player.experience = 42;
        let events = session.update(&Intents { regenerate: true, ..Intents::default() }, 0.016);
        assert!(matches!(events.as_slice(), [SessionEvent::Regenerated { .. }]));
        assert_ne!(session.level.seed, old_seed);
        assert_eq!(session.player.experience, 42);
        assert!(session.level.grid.is_walkable(session.player.cell()));
        assert_eq!(session.stats.levels_generated, 2);
    }

    #[test]
    fn opening_treasure_marks_it_and_rewards() {
        let mut session = session();
        let pos = with_single_entity(
            &mut session,
            Entity::Treasure(Treasure { loot: LootKind::Points, placement: Placement::DeadEnd, opened: false }),
        );
        let events = session.interact();
        assert_eq!(events.first(), Some(&SessionEvent::TreasureOpened(LootKind::Points)));
        assert!(session.stats.points >= 30);
        assert!(session.player.experience >= 5);
        assert!(matches!(session.level.entities.get(pos), Some(Entity::Treasure(t)) if t.opened));
        assert!(session.interact().is_empty());
        assert_eq!(session.messages.iter().last().map(|m| m.text.as_str()), Some("Nothing here."));
    }

    #[test]
    fn battles_resolve_until_the_monster_falls_or_the_player_does() {
        let mut session = session();
        let pos = with_single_entity(
            &mut session,
            Entity::Monster(Monster { kind: MonsterKind::Troll, health: 3, defeated: false }),
        );
        session.player.weapon = Weapon::Sword;
        let mut rounds = 0;
        loop {
            let events = session.interact();
            rounds += 1;
            if events.iter().any(|e| matches!(e, SessionEvent::BattleWon { heroic: false, .. })) {
                assert!(matches!(session.level.entities.get(pos), Some(Entity::Monster(m)) if m.defeated));
                break;
            }
            if session.is_over() {
                assert!(events.contains(&SessionEvent::GameOver));
                break;
            }
            assert!(rounds < 100);
        }
        assert_eq!(session.stats.battles(), rounds);
    }

    #[test]
    fn sensitivity_steps_and_clamps() {
        let mut session = session();
        for _ in 0..40 {
            session.update(&Intents { sensitivity_up: true, ..Intents::default() }, 0.016);
        }
        assert!((session.sensitivity - 1.0).abs() < 1e-5);
        for _ in 0..40 {
            session.update(&Intents { sensitivity_down: true, ..Intents::default() }, 0.016);
        }
        assert!((session.sensitivity - 0.05).abs() < 1e-5);
    }

    #[test]
    fn win_chances_follow_the_weapon() {
        let mut session = session();
        session.player.weapon = Weapon::Bow;
        let chances = session.win_chances();
        assert_eq!(chances[2], (MonsterKind::Witch, 85));
        assert_eq!(chances[0], (MonsterKind::Dragon, 25));
    }
}
