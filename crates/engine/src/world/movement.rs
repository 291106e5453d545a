use super::actor::{Actor, Direction};
use super::grid::{Cell, GridMap};
use super::tile::CollisionClass;

/// Ticks between movement attempts while a direction is held.
pub const MOVE_COOLDOWN_TICKS: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePlan {
    /// Actor is still easing toward its previous target.
    Busy,
    OutOfBounds,
    Blocked,
    /// INTERACTIVE target; commit only if the handler does not consume it.
    Interact(Cell),
    Commit(Cell),
}

/// Validates one four-directional step against `map`. Facing is updated even
/// when the step is rejected, except while the actor is still moving.
pub fn plan_move(actor: &mut Actor, map: &GridMap, direction: Direction) -> MovePlan {
    if actor.is_moving() {
        return MovePlan::Busy;
    }

    actor.face(direction);
    let (dx, dy) = direction.delta();
    let next = actor.target().offset(dx, dy);

    match map.collision_class_at(next) {
        None => MovePlan::OutOfBounds,
        Some(CollisionClass::Solid) => MovePlan::Blocked,
        Some(CollisionClass::Interactive) => MovePlan::Interact(next),
        Some(CollisionClass::Walkable) => MovePlan::Commit(next),
    }
}

/// Frame-counted throttle on movement attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveCooldown {
    remaining: u32,
}

impl MoveCooldown {
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_ready(&self) -> bool {
        self.remaining == 0
    }

    /// Counts one frame down. Returns true when an attempt may run this frame.
    pub fn poll(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            false
        } else {
            true
        }
    }

    pub fn restart(&mut self) {
        self.remaining = MOVE_COOLDOWN_TICKS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::TileId;

    fn corridor() -> GridMap {
        let mut map =
            GridMap::filled(5, 3, TileId::FloorWood, CollisionClass::Walkable).expect("map");
        map.place(Cell::new(2, 0), TileId::Wall);
        map.place(Cell::new(3, 1), TileId::DoorInt);
        map
    }

    #[test]
    fn solid_target_is_rejected_but_facing_changes() {
        let map = corridor();
        let mut actor = Actor::spawn(Cell::new(2, 1));

        assert_eq!(plan_move(&mut actor, &map, Direction::Up), MovePlan::Blocked);
        assert_eq!(actor.target(), Cell::new(2, 1));
        assert_eq!(actor.facing(), Direction::Up);
    }

    #[test]
    fn out_of_bounds_is_rejected() {
        let map = corridor();
        let mut actor = Actor::spawn(Cell::new(0, 1));
        assert_eq!(
            plan_move(&mut actor, &map, Direction::Left),
            MovePlan::OutOfBounds
        );
        assert_eq!(actor.facing(), Direction::Left);
    }

    #[test]
    fn interactive_target_defers_to_handler() {
        let map = corridor();
        let mut actor = Actor::spawn(Cell::new(2, 1));
        assert_eq!(
            plan_move(&mut actor, &map, Direction::Right),
            MovePlan::Interact(Cell::new(3, 1))
        );
    }

    #[test]
    fn moving_actor_ignores_intent_entirely() {
        let map = corridor();
        let mut actor = Actor::spawn(Cell::new(1, 1));
        actor.commit(Cell::new(1, 2));
        actor.advance();

        assert_eq!(plan_move(&mut actor, &map, Direction::Left), MovePlan::Busy);
        assert_eq!(actor.facing(), Direction::Down);
    }

    #[test]
    fn cooldown_blocks_for_fixed_frame_count() {
        let mut cooldown = MoveCooldown::default();
        assert!(cooldown.poll());
        cooldown.restart();

        let blocked = (0..MOVE_COOLDOWN_TICKS).filter(|_| !cooldown.poll()).count();
        assert_eq!(blocked as u32, MOVE_COOLDOWN_TICKS);
        assert!(cooldown.poll());
    }
}
