use crate::components::{Cell, Vec2};

/// World-space origin of the visible viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            offset: Vec2::ZERO,
            viewport,
        }
    }

    /// Centers on `focus`, then clamps into `[0, world - viewport]` per axis.
    /// A world smaller than the viewport pins that axis to 0.
    pub fn follow(&mut self, focus: Vec2, world: Vec2) {
        self.offset = focus - self.viewport / 2.0;
        self.clamp(world);
    }

    pub fn clamp(&mut self, world: Vec2) {
        // Not f32::clamp: max may be below min here.
        self.offset.x = self.offset.x.min(world.x - self.viewport.x).max(0.0);
        self.offset.y = self.offset.y.min(world.y - self.viewport.y).max(0.0);
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.offset
    }

    /// Inclusive cell ranges (top-left, bottom-right) covering the viewport.
    pub fn visible_cells(&self, cell_size: f32, cols: usize, rows: usize) -> (Cell, Cell) {
        let first = |offset: f32| (offset / cell_size).floor().max(0.0) as usize;
        let last = |offset: f32, view: f32, n: usize| {
            let edge = ((offset + view) / cell_size).ceil().max(0.0) as usize;
            edge.min(n.saturating_sub(1))
        };
        (
            Cell::new(first(self.offset.x), first(self.offset.y)),
            Cell::new(
                last(self.offset.x, self.viewport.x, cols),
                last(self.offset.y, self.viewport.y, rows),
            ),
        )
    }
}
