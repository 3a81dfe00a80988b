/// Combat resolution for walls, enemies, and the player.
///
/// Damage is plain subtraction. A target is destroyed once its counter is at
/// or below zero. Walls and enemies then drop out of play; for the player
/// the counter is food and "destroyed" means starved, which the turn
/// conductor turns into game over.

use super::entity::{Enemy, Player, Wall};
use super::movement::Obstacle;
use crate::error::SimError;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DamageOutcome {
    pub remaining: i32,
    pub destroyed: bool,
}

/// Subtract `amount` from a health counter. Amounts past `i32::MAX` clamp
/// to it, so a hit can never raise the counter.
pub fn apply_damage(health: &mut i32, amount: u32) -> DamageOutcome {
    let amount = i32::try_from(amount).unwrap_or(i32::MAX);
    *health = health.saturating_sub(amount);
    DamageOutcome { remaining: *health, destroyed: *health <= 0 }
}

/// Mutable view over every damageable actor of a level.
pub struct Combatants<'a> {
    pub walls: &'a mut [Wall],
    pub enemies: &'a mut [Enemy],
    pub player: &'a mut Player,
}

/// Apply `amount` to `target`.
///
/// Hitting a wall or enemy that is already out of play is reported as
/// [`SimError::ActorAlreadyDestroyed`]; callers treat it as a no-op.
pub fn resolve(c: &mut Combatants, target: Obstacle, amount: u32) -> Result<DamageOutcome, SimError> {
    match target {
        Obstacle::Wall(id) => {
            let wall = c.walls
                .get_mut(id.0)
                .filter(|w| w.is_standing())
                .ok_or(SimError::ActorAlreadyDestroyed(target))?;
            wall.damaged = true;
            Ok(apply_damage(&mut wall.hp, amount))
        }
        Obstacle::Enemy(id) => {
            let enemy = c.enemies
                .get_mut(id.0)
                .filter(|e| e.alive)
                .ok_or(SimError::ActorAlreadyDestroyed(target))?;
            let outcome = apply_damage(&mut enemy.health, amount);
            if outcome.destroyed {
                enemy.alive = false;
            }
            Ok(outcome)
        }
        Obstacle::Player => Ok(apply_damage(&mut c.player.food, amount)),
    }
}
