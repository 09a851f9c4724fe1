use glam::{IVec2, Mat4};

use crate::tilemap::TileId;

/// Four-way orientation. The discriminant indexes an entity's sprite list.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    #[default]
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Up, Facing::Right, Facing::Down, Facing::Left];

    pub fn from_index(index: i32) -> Option<Self> {
        usize::try_from(index).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// One grid step in this direction; y grows downwards.
    pub fn delta(self) -> IVec2 {
        match self {
            Facing::Up => IVec2::new(0, -1),
            Facing::Right => IVec2::new(1, 0),
            Facing::Down => IVec2::new(0, 1),
            Facing::Left => IVec2::new(-1, 0),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub name: String,
    /// Grid cell.
    pub position: IVec2,
    pub facing: Facing,
    /// One atlas id per facing, indexed by [`Facing::index`].
    pub sprites: Vec<TileId>,
    /// Negative once the entity should no longer be drawn.
    pub alive: i32,
    /// Pose authored in the entity file. Grid rendering ignores it; only the
    /// camera-follow bookkeeping updates it.
    pub transform: Mat4,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            name: "unknown".into(),
            position: IVec2::ZERO,
            facing: Facing::Up,
            sprites: Vec::new(),
            alive: 0,
            transform: Mat4::IDENTITY,
        }
    }
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn is_alive(&self) -> bool {
        self.alive >= 0
    }

    /// Atlas id for the current facing, if the sprite list covers it.
    pub fn current_sprite(&self) -> Option<TileId> {
        self.sprites.get(self.facing.index()).copied()
    }
}

/// A short-lived entity (attack swipes and the like), removed once `ttl`
/// drops below zero. Each drawn frame costs one.
#[derive(Clone, Debug, PartialEq)]
pub struct Effect {
    pub entity: Entity,
    pub ttl: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_round_trips_through_index() {
        for f in Facing::ALL {
            assert_eq!(Facing::from_index(f.index() as i32), Some(f));
        }
        assert_eq!(Facing::from_index(-1), None);
        assert_eq!(Facing::from_index(4), None);
    }

    #[test]
    fn current_sprite_requires_matching_frame() {
        let mut e = Entity::new("bat");
        e.sprites = vec![5, 6];
        e.facing = Facing::Right;
        assert_eq!(e.current_sprite(), Some(6));
        e.facing = Facing::Left;
        assert_eq!(e.current_sprite(), None);
    }
}
