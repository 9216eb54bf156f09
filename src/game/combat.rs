//! Combat system - attack tuning, hit detection, damage and knockback

use serde::{Deserialize, Serialize};

use super::fighter::{Facing, Fighter, Side, MAX_HP};
use super::input::Action;
use super::physics::{FighterSimulation, FIGHTER_WIDTH};

/// An attack only hits while more than this many ms remain on its timer
pub const ACTIVE_THRESHOLD_MS: f32 = 40.0;
/// Vertical size of every attack hitbox
pub const HITBOX_HEIGHT: f32 = 24.0;
/// Flash duration applied to a defender that got hit or blocked
pub const FLASH_MS: f32 = 160.0;
/// Share of damage that still goes through a block, in percent
const BLOCK_PASS_PERCENT: i32 = 35;

/// Attack types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    Light,
    Heavy,
    Special,
}

impl AttackKind {
    /// The input action that requests this attack
    pub fn action(self) -> Action {
        match self {
            AttackKind::Light => Action::LightAttack,
            AttackKind::Heavy => Action::HeavyAttack,
            AttackKind::Special => Action::SpecialAttack,
        }
    }
}

/// Attack stats per attack type
#[derive(Debug, Clone, Copy)]
pub struct AttackStats {
    /// Active + recovery window (ms)
    pub duration_ms: f32,
    /// Time before the same attack can start again (ms)
    pub cooldown_ms: f64,
    /// Unblocked damage
    pub damage: i32,
    /// Hitbox length in front of the attacker
    pub reach: f32,
    /// Horizontal speed added to the defender
    pub knockback: f32,
}

impl AttackStats {
    pub fn for_kind(kind: AttackKind) -> Self {
        match kind {
            AttackKind::Light => Self {
                duration_ms: 120.0,
                cooldown_ms: 350.0,
                damage: 6,
                reach: 42.0,
                knockback: 2.2,
            },
            AttackKind::Heavy => Self {
                duration_ms: 180.0,
                cooldown_ms: 700.0,
                damage: 12,
                reach: 56.0,
                knockback: 3.2,
            },
            AttackKind::Special => Self {
                duration_ms: 240.0,
                cooldown_ms: 2200.0,
                damage: 18,
                reach: 68.0,
                knockback: 4.0,
            },
        }
    }
}

/// Axis-aligned rectangle; `top < bottom` since `y` grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// Hitbox extending `reach` from the attacker's leading edge, vertically centered on it
    pub fn hitbox(attacker: &Fighter, reach: f32) -> Rect {
        let half_width = FIGHTER_WIDTH / 2.0;
        let (left, right) = match attacker.facing {
            Facing::Right => (attacker.x + half_width, attacker.x + half_width + reach),
            Facing::Left => (attacker.x - half_width - reach, attacker.x - half_width),
        };
        let center_y = attacker.center_y();

        Rect {
            left,
            right,
            top: center_y - HITBOX_HEIGHT / 2.0,
            bottom: center_y + HITBOX_HEIGHT / 2.0,
        }
    }
}

/// Hit result from combat resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitResult {
    pub attacker: Side,
    pub defender: Side,
    pub kind: AttackKind,
    pub damage: i32,
    pub blocked: bool,
    /// Signed velocity added to the defender
    pub knockback: f32,
    pub defender_hp: i32,
    pub defender_ko: bool,
}

/// Damage math
pub struct CombatSystem;

impl CombatSystem {
    /// Damage dealt by `kind`, reduced when blocked (rounded up)
    pub fn damage_for(kind: AttackKind, blocked: bool) -> i32 {
        let base = AttackStats::for_kind(kind).damage;
        if blocked {
            (base * BLOCK_PASS_PERCENT + 99) / 100
        } else {
            base
        }
    }

    /// Apply damage to health, returns (new_health, is_ko)
    pub fn apply_damage(current_hp: i32, damage: i32) -> (i32, bool) {
        let new_hp = (current_hp - damage).clamp(0, MAX_HP);
        (new_hp, new_hp <= 0)
    }

    /// Whether the attacker's live hitbox overlaps the defender this tick
    pub fn check_hit(attacker: &Fighter, defender: &Fighter) -> Option<AttackKind> {
        if !attacker.attacking
            || attacker.attack_connected
            || attacker.attack_timer <= ACTIVE_THRESHOLD_MS
        {
            return None;
        }

        let kind = attacker.attack_type?;
        let reach = AttackStats::for_kind(kind).reach;
        Rect::hitbox(attacker, reach)
            .intersects(&defender.hurtbox())
            .then_some(kind)
    }
}

/// Outcome of resolving one tick of contact between the fighters
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub p1: Fighter,
    pub p2: Fighter,
    /// Hits registered this tick, P1's first
    pub hits: Vec<HitResult>,
}

/// Two-fighter contact resolution
pub struct CombatResolver;

impl CombatResolver {
    /// Facing, mutual hit detection, damage/knockback, then body separation.
    pub fn resolve(p1: &Fighter, p2: &Fighter) -> Resolution {
        let mut p1 = p1.clone();
        let mut p2 = p2.clone();

        // Facing: the fighter further left faces right (P1 on a tie)
        if p1.x <= p2.x {
            p1.facing = Facing::Right;
            p2.facing = Facing::Left;
        } else {
            p1.facing = Facing::Left;
            p2.facing = Facing::Right;
        }

        // Both directions are detected against the same pre-hit states
        let p1_hits = CombatSystem::check_hit(&p1, &p2);
        let p2_hits = CombatSystem::check_hit(&p2, &p1);

        let mut hits = Vec::new();
        if let Some(kind) = p1_hits {
            hits.push(Self::land(&mut p1, &mut p2, kind));
        }
        if let Some(kind) = p2_hits {
            hits.push(Self::land(&mut p2, &mut p1, kind));
        }

        if FighterSimulation::bodies_overlap(p1.x, p2.x) {
            let (x1, x2) = FighterSimulation::separate(p1.x, p2.x);
            p1.x = x1;
            p2.x = x2;
        }

        Resolution { p1, p2, hits }
    }

    fn land(attacker: &mut Fighter, defender: &mut Fighter, kind: AttackKind) -> HitResult {
        let stats = AttackStats::for_kind(kind);
        let blocked = defender.block;
        let damage = CombatSystem::damage_for(kind, blocked);
        let (new_hp, ko) = CombatSystem::apply_damage(defender.hp, damage);

        defender.hp = new_hp;
        if blocked {
            defender.blockflash = FLASH_MS;
        } else {
            defender.hitflash = FLASH_MS;
        }

        let knockback = stats.knockback * attacker.facing.sign();
        defender.vx += knockback;
        attacker.attack_connected = true;

        HitResult {
            attacker: attacker.side,
            defender: defender.side,
            kind,
            damage,
            blocked,
            knockback,
            defender_hp: new_hp,
            defender_ko: ko,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attacking(side: Side, x: f32, kind: AttackKind) -> Fighter {
        let mut f = Fighter::new(side);
        f.x = x;
        f.attacking = true;
        f.attack_type = Some(kind);
        f.attack_timer = AttackStats::for_kind(kind).duration_ms;
        f
    }

    fn standing(side: Side, x: f32) -> Fighter {
        let mut f = Fighter::new(side);
        f.x = x;
        f
    }

    #[test]
    fn blocked_damage_rounds_up_and_never_exceeds_base() {
        assert_eq!(CombatSystem::damage_for(AttackKind::Light, true), 3);
        assert_eq!(CombatSystem::damage_for(AttackKind::Heavy, true), 5);
        assert_eq!(CombatSystem::damage_for(AttackKind::Special, true), 7);
        for kind in [AttackKind::Light, AttackKind::Heavy, AttackKind::Special] {
            assert!(CombatSystem::damage_for(kind, true) <= CombatSystem::damage_for(kind, false));
        }
    }

    #[test]
    fn health_is_clamped() {
        assert_eq!(CombatSystem::apply_damage(4, 18), (0, true));
        assert_eq!(CombatSystem::apply_damage(100, 6), (94, false));
    }

    #[test]
    fn unblocked_light_hit() {
        let res = CombatResolver::resolve(
            &attacking(Side::P1, 300.0, AttackKind::Light),
            &standing(Side::P2, 360.0),
        );
        assert_eq!(res.p2.hp, 94);
        assert_eq!(res.p2.hitflash, FLASH_MS);
        assert_eq!(res.p2.blockflash, 0.0);
        assert!((res.p2.vx - 2.2).abs() < 1e-6);
        assert!(res.p1.attack_connected);
        assert_eq!(res.hits.len(), 1);
        assert_eq!(res.hits[0].attacker, Side::P1);
        assert!(!res.hits[0].blocked);
    }

    #[test]
    fn blocked_light_hit_from_the_right() {
        let mut defender = standing(Side::P1, 300.0);
        defender.block = true;
        let attacker = attacking(Side::P2, 360.0, AttackKind::Light);
        let res = CombatResolver::resolve(&defender, &attacker);
        assert_eq!(res.p1.hp, 97);
        assert_eq!(res.p1.blockflash, FLASH_MS);
        assert_eq!(res.p1.hitflash, 0.0);
        // Attacker on the right faces left, so knockback pushes left
        assert!((res.p1.vx + 2.2).abs() < 1e-6);
    }

    #[test]
    fn out_of_reach_misses() {
        let res = CombatResolver::resolve(
            &attacking(Side::P1, 300.0, AttackKind::Light),
            &standing(Side::P2, 400.0),
        );
        assert!(res.hits.is_empty());
        assert_eq!(res.p2.hp, 100);

        // Special reaches further
        let res = CombatResolver::resolve(
            &attacking(Side::P1, 300.0, AttackKind::Special),
            &standing(Side::P2, 400.0),
        );
        assert_eq!(res.p2.hp, 82);
    }

    #[test]
    fn recovery_tail_does_not_hit() {
        let mut a = attacking(Side::P1, 300.0, AttackKind::Heavy);
        a.attack_timer = ACTIVE_THRESHOLD_MS;
        let res = CombatResolver::resolve(&a, &standing(Side::P2, 360.0));
        assert!(res.hits.is_empty());
    }

    #[test]
    fn a_swing_connects_once() {
        let res = CombatResolver::resolve(
            &attacking(Side::P1, 300.0, AttackKind::Light),
            &standing(Side::P2, 360.0),
        );
        let again = CombatResolver::resolve(&res.p1, &res.p2);
        assert!(again.hits.is_empty());
        assert_eq!(again.p2.hp, 94);
    }

    #[test]
    fn simultaneous_mutual_hits() {
        let res = CombatResolver::resolve(
            &attacking(Side::P1, 300.0, AttackKind::Heavy),
            &attacking(Side::P2, 360.0, AttackKind::Light),
        );
        assert_eq!(res.hits.len(), 2);
        assert_eq!(res.p1.hp, 94);
        assert_eq!(res.p2.hp, 88);
    }

    #[test]
    fn airborne_defender_above_hitbox_is_missed() {
        let mut defender = standing(Side::P2, 360.0);
        defender.y -= 150.0;
        let attacker = attacking(Side::P1, 300.0, AttackKind::Light);
        let res = CombatResolver::resolve(&attacker, &defender);
        assert!(res.hits.is_empty());
    }

    #[test]
    fn facing_follows_positions() {
        let res = CombatResolver::resolve(&standing(Side::P1, 600.0), &standing(Side::P2, 200.0));
        assert_eq!(res.p1.facing, Facing::Left);
        assert_eq!(res.p2.facing, Facing::Right);
    }

    #[test]
    fn overlapping_bodies_are_separated_after_hits() {
        let res = CombatResolver::resolve(
            &attacking(Side::P1, 390.0, AttackKind::Light),
            &standing(Side::P2, 410.0),
        );
        assert_eq!(res.hits.len(), 1);
        assert!(res.p2.x - res.p1.x >= FIGHTER_WIDTH);
    }
}
