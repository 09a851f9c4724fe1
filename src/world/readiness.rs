/// The three assets a level needs before it can be drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resource {
    TileMap,
    Entities,
    SpriteSheet,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::TileMap, Resource::Entities, Resource::SpriteSheet];

    pub fn index(self) -> usize {
        self as usize
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Join point for independently arriving resources.
///
/// Starts with every resource pending; the level is ready once none are.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Readiness {
    pending: u8,
}

impl Default for Readiness {
    fn default() -> Self {
        Self::new()
    }
}

impl Readiness {
    pub fn new() -> Self {
        let pending = Resource::ALL.iter().fold(0, |acc, r| acc | r.bit());
        Self { pending }
    }

    pub fn mark_ready(&mut self, resource: Resource) {
        self.pending &= !resource.bit();
    }

    pub fn mark_pending(&mut self, resource: Resource) {
        self.pending |= resource.bit();
    }

    pub fn is_ready(&self, resource: Resource) -> bool {
        self.pending & resource.bit() == 0
    }

    pub fn all_ready(&self) -> bool {
        self.pending == 0
    }

    pub fn pending(&self) -> impl Iterator<Item = Resource> + '_ {
        Resource::ALL.into_iter().filter(|r| !self.is_ready(*r))
    }
}
