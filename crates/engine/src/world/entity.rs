use std::fmt;

use super::behavior::Behavior;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(format!("entity_{}", self.next));
        self.next = self.next.saturating_add(1);
        id
    }

    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// Axis-aligned box in world pixels, top-left origin.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
}

impl Body {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            velocity_x: 0.0,
            velocity_y: 0.0,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub fn set_velocity(&mut self, vx: f64, vy: f64) {
        self.velocity_x = vx;
        self.velocity_y = vy;
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Body) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Inclusive point test used for editor hit-testing.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub emoji: String,
    pub body: Body,
    pub behavior: Option<Behavior>,
    pub health: Option<f64>,
    pub selected: bool,
}

impl Entity {
    pub fn new(id: EntityId, emoji: impl Into<String>, body: Body) -> Self {
        Self {
            id,
            emoji: emoji.into(),
            body,
            behavior: None,
            health: None,
            selected: false,
        }
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn is_collidable(&self) -> bool {
        self.behavior
            .as_ref()
            .is_some_and(|behavior| behavior.collidable)
    }

    pub fn is_player(&self) -> bool {
        self.behavior.as_ref().is_some_and(Behavior::is_player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_never_reuses_ids() {
        let mut allocator = EntityIdAllocator::default();
        let a = allocator.allocate();
        let b = allocator.allocate();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "entity_0");
        assert_eq!(b.as_str(), "entity_1");
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Body::new(0.0, 0.0, 32.0, 32.0);
        let b = Body::new(32.0, 0.0, 32.0, 32.0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn partial_overlap_is_symmetric() {
        let a = Body::new(0.0, 0.0, 32.0, 32.0);
        let b = Body::new(31.5, 10.0, 32.0, 32.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn contains_point_includes_edges() {
        let body = Body::new(10.0, 10.0, 20.0, 20.0);
        assert!(body.contains_point(10.0, 10.0));
        assert!(body.contains_point(30.0, 30.0));
        assert!(!body.contains_point(30.1, 15.0));
    }

    #[test]
    fn move_and_set_position_update_body() {
        let mut body = Body::new(1.0, 2.0, 4.0, 4.0);
        body.move_by(3.0, -1.0);
        assert_eq!((body.x, body.y), (4.0, 1.0));
        body.set_position(-5.0, 7.0);
        assert_eq!((body.x, body.y), (-5.0, 7.0));
        body.set_velocity(0.5, -0.5);
        assert_eq!((body.velocity_x, body.velocity_y), (0.5, -0.5));
    }
}
