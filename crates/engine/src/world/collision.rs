//! Pairwise AABB collision pass.
//!
//! Every unordered pair of collidable entities is tested, so one pass is
//! O(n²) in the number of collidable entities. Fine for hand-built levels of a
//! few hundred sprites; larger worlds would need a broad phase in front of this.

use super::behavior::{CollisionContext, CollisionResponse};
use super::entity::{Entity, EntityId};

/// Runs one pass over `entities` in arena order. For each overlapping pair
/// (i < j) the handler of `i` runs against `j`, then `j` against `i`.
///
/// Entities whose handler reports [`CollisionResponse::Consumed`] take no
/// further part in the pass. Their ids are returned in consumption order and
/// the caller removes them afterwards.
pub fn resolve_collisions(
    entities: &mut [Entity],
    ctx: &mut CollisionContext<'_>,
) -> Vec<EntityId> {
    let mut consumed = vec![false; entities.len()];
    let mut consumed_ids = Vec::new();

    for i in 0..entities.len() {
        for j in (i + 1)..entities.len() {
            if consumed[i] {
                break;
            }
            if consumed[j] {
                continue;
            }

            let (head, tail) = entities.split_at_mut(j);
            let first = &mut head[i];
            let second = &mut tail[0];
            if !first.is_collidable() || !second.is_collidable() {
                continue;
            }
            if !first.body.overlaps(&second.body) {
                continue;
            }

            let first_response = dispatch(first, second, ctx);
            let second_response = dispatch(second, first, ctx);

            if first_response == CollisionResponse::Consumed {
                consumed[i] = true;
                consumed_ids.push(first.id.clone());
            }
            if second_response == CollisionResponse::Consumed {
                consumed[j] = true;
                consumed_ids.push(second.id.clone());
            }
        }
    }

    consumed_ids
}

fn dispatch(
    this: &mut Entity,
    other: &mut Entity,
    ctx: &mut CollisionContext<'_>,
) -> CollisionResponse {
    let Entity { body, behavior, .. } = this;
    match behavior {
        Some(behavior) => behavior.on_collision(body, other, ctx),
        None => CollisionResponse::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::behavior::{Behavior, CollectibleEffect, TriggerAction};
    use crate::world::entity::Body;
    use crate::world::events::{EventQueue, GameEvent};
    use crate::world::state::{GameState, Settings};

    fn entity(id: &str, x: f64, y: f64, behavior: Option<Behavior>) -> Entity {
        let mut entity = Entity::new(EntityId::from(id), "❓", Body::new(x, y, 32.0, 32.0));
        entity.behavior = behavior;
        entity
    }

    fn player(id: &str, x: f64, y: f64) -> Entity {
        entity(id, x, y, Some(Behavior::player(5.0, 10.0)))
    }

    fn coin(id: &str, x: f64, y: f64) -> Entity {
        entity(
            id,
            x,
            y,
            Some(Behavior::collectible(1.0, CollectibleEffect::Score)),
        )
    }

    fn run_pass(
        entities: &mut [Entity],
        state: &mut GameState,
        events: &mut EventQueue,
    ) -> Vec<EntityId> {
        let settings = Settings::default();
        let mut ctx = CollisionContext {
            settings: &settings,
            state,
            events,
        };
        resolve_collisions(entities, &mut ctx)
    }

    #[test]
    fn handler_runs_regardless_of_arena_order() {
        for mut entities in [
            vec![player("p", 0.0, 0.0), coin("c", 10.0, 10.0)],
            vec![coin("c", 10.0, 10.0), player("p", 0.0, 0.0)],
        ] {
            let mut state = GameState::default();
            let mut events = EventQueue::default();
            let consumed = run_pass(&mut entities, &mut state, &mut events);
            assert_eq!(state.score, 1);
            assert_eq!(consumed, vec![EntityId::from("c")]);
        }
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let mut entities = vec![player("p", 0.0, 0.0), coin("c", 32.0, 0.0)];
        let mut state = GameState::default();
        let mut events = EventQueue::default();
        let consumed = run_pass(&mut entities, &mut state, &mut events);
        assert!(consumed.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn entities_without_collidable_behavior_are_skipped() {
        let mut entities = vec![
            player("p", 0.0, 0.0),
            entity("plain", 0.0, 0.0, None),
            entity(
                "ghost",
                0.0,
                0.0,
                Some(Behavior::collectible(5.0, CollectibleEffect::Score).with_collidable(false)),
            ),
        ];
        let mut state = GameState::default();
        let mut events = EventQueue::default();
        let consumed = run_pass(&mut entities, &mut state, &mut events);
        assert!(consumed.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn collectible_is_consumed_once_even_with_two_players() {
        let mut entities = vec![
            player("p1", 0.0, 0.0),
            coin("c", 4.0, 4.0),
            player("p2", 8.0, 8.0),
        ];
        let mut state = GameState::default();
        let mut events = EventQueue::default();
        let consumed = run_pass(&mut entities, &mut state, &mut events);
        assert_eq!(state.score, 1);
        assert_eq!(consumed, vec![EntityId::from("c")]);
    }

    #[test]
    fn trigger_fires_once_for_many_overlapping_players() {
        let mut entities = vec![
            entity("exit", 0.0, 0.0, Some(Behavior::trigger(TriggerAction::NextLevel))),
            player("p1", 0.0, 0.0),
            player("p2", 4.0, 0.0),
        ];
        let mut state = GameState::default();
        let mut events = EventQueue::default();
        run_pass(&mut entities, &mut state, &mut events);
        run_pass(&mut entities, &mut state, &mut events);
        assert_eq!(events.drain_frame(), vec![GameEvent::NextLevel]);
    }

    #[test]
    fn player_is_separated_from_solid_obstacle() {
        let mut entities = vec![
            entity("wall", 100.0, 0.0, Some(Behavior::obstacle(true))),
            player("p", 90.0, 0.0),
        ];
        let mut state = GameState::default();
        let mut events = EventQueue::default();
        run_pass(&mut entities, &mut state, &mut events);
        assert_eq!(entities[1].body.x, 68.0);
        assert!(!entities[0].body.overlaps(&entities[1].body));
    }
}
