/*
 * Camera Module
 *
 * Top-down camera over the simulation's x/z plane. World x maps to screen x
 * and world z to screen y; height (y) is dropped. Supports panning, zooming
 * around the cursor and framing the whole world cube.
 */

use nannou::prelude::*;

use crate::Vec3 as WorldVec3;

// Screen space left around the world square when framing it
const FRAME_MARGIN: f32 = 0.9;

pub struct Camera {
    /// Ground-plane point at the window centre.
    pub center: Vec2,
    pub zoom: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    drag_anchor: Option<Vec2>,
}

impl Camera {
    pub fn new(zoom: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            zoom,
            min_zoom: 0.2,
            max_zoom: 20.0,
            drag_anchor: None,
        }
    }

    pub fn project(position: WorldVec3) -> Vec2 {
        vec2(position.x, position.z)
    }

    /// Inverse of `project` onto the `y = 0` plane.
    pub fn unproject(ground: Vec2) -> WorldVec3 {
        WorldVec3::new(ground.x, 0.0, ground.y)
    }

    pub fn world_to_screen(&self, ground: Vec2, window_rect: Rect) -> Vec2 {
        (ground - self.center) * self.zoom + window_rect.xy()
    }

    pub fn screen_to_world(&self, point: Vec2, window_rect: Rect) -> Vec2 {
        (point - window_rect.xy()) / self.zoom + self.center
    }

    /// Centre on the origin and zoom so `[-world_size, world_size]` fills the
    /// shorter window side.
    pub fn frame_world(&mut self, world_size: f32, window_rect: Rect) {
        let side = window_rect.w().min(window_rect.h());
        if world_size > 0.0 && side > 0.0 {
            self.zoom = (side * FRAME_MARGIN / (2.0 * world_size)).clamp(self.min_zoom, self.max_zoom);
        }
        self.center = Vec2::ZERO;
    }

    // The ground point under the cursor stays put while zooming
    pub fn zoom_at(&mut self, scroll: f32, cursor: Vec2, window_rect: Rect) {
        let before = self.screen_to_world(cursor, window_rect);
        self.zoom = (self.zoom * (1.0 + scroll * 0.1)).clamp(self.min_zoom, self.max_zoom);
        let after = self.screen_to_world(cursor, window_rect);
        self.center += before - after;
    }

    pub fn start_drag(&mut self, cursor: Vec2) {
        self.drag_anchor = Some(cursor);
    }

    pub fn drag(&mut self, cursor: Vec2) {
        if let Some(anchor) = self.drag_anchor {
            self.center -= (cursor - anchor) / self.zoom;
            self.drag_anchor = Some(cursor);
        }
    }

    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> Rect {
        Rect::from_w_h(800.0, 600.0)
    }

    #[test]
    fn projection_drops_height() {
        let ground = Camera::project(WorldVec3::new(3.0, 40.0, -7.0));
        assert_eq!(ground, vec2(3.0, -7.0));
        assert_eq!(Camera::unproject(ground), WorldVec3::new(3.0, 0.0, -7.0));
    }

    #[test]
    fn framing_fits_the_world_in_the_short_side() {
        let mut camera = Camera::new(5.0);
        camera.center = vec2(100.0, 100.0);
        camera.frame_world(250.0, window());
        assert_eq!(camera.center, Vec2::ZERO);
        let corner = camera.world_to_screen(vec2(250.0, 250.0), window());
        assert!(corner.y <= 300.0 && corner.y > 250.0);
    }

    #[test]
    fn zoom_keeps_cursor_point_fixed() {
        let mut camera = Camera::new(1.0);
        let cursor = vec2(120.0, -80.0);
        let before = camera.screen_to_world(cursor, window());
        camera.zoom_at(2.0, cursor, window());
        let after = camera.screen_to_world(cursor, window());
        assert!(before.distance(after) < 1.0e-3);
        assert!(camera.zoom > 1.0);
    }

    #[test]
    fn drag_pans_only_while_held() {
        let mut camera = Camera::new(2.0);
        camera.drag(vec2(50.0, 0.0));
        assert_eq!(camera.center, Vec2::ZERO);

        camera.start_drag(Vec2::ZERO);
        camera.drag(vec2(50.0, 0.0));
        assert_eq!(camera.center, vec2(-25.0, 0.0));
        camera.end_drag();
        assert!(!camera.is_dragging());
    }
}
