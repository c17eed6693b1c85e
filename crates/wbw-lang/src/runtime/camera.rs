#[derive(Debug, Clone, PartialEq)]
pub enum Follow {
    Player,
    Entity(String),
    None,
}

/// World-space viewport origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub x: f64,
    pub y: f64,
    pub follow: Follow,
    pub lerp: f64,
    pub offset: (f64, f64),
    pub clamp: bool,
    /// Jump straight to the target on the next update (set on start and on `camreset`).
    pub snap_next: bool,
}

impl Camera {
    pub fn new(lerp: f64) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            follow: Follow::Player,
            lerp: lerp.clamp(0.0, 1.0),
            offset: (0.0, 0.0),
            clamp: true,
            snap_next: true,
        }
    }

    /// Move towards `target` (the followed entity's centre, if it still
    /// exists), then clamp to the world.
    pub fn update(&mut self, target: Option<(f64, f64)>, view: (f64, f64), world: (f64, f64)) {
        if let Some((cx, cy)) = target {
            let want_x = cx - view.0 / 2.0 + self.offset.0;
            let want_y = cy - view.1 / 2.0 + self.offset.1;
            let t = if self.snap_next { 1.0 } else { self.lerp };
            self.x += (want_x - self.x) * t;
            self.y += (want_y - self.y) * t;
            self.snap_next = false;
        }
        if self.clamp {
            self.x = self.x.clamp(0.0, (world.0 - view.0).max(0.0));
            self.y = self.y.clamp(0.0, (world.1 - view.1).max(0.0));
        }
    }

    /// Place the camera explicitly and stop following.
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
        self.follow = Follow::None;
    }

    pub fn reset(&mut self) {
        let lerp = self.lerp;
        *self = Camera::new(lerp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: (f64, f64) = (800.0, 450.0);

    #[test]
    fn snaps_then_lerps() {
        let mut cam = Camera::new(0.5);
        cam.clamp = false;
        cam.update(Some((1000.0, 225.0)), VIEW, (4000.0, 450.0));
        assert_eq!(cam.x, 600.0);
        cam.update(Some((1200.0, 225.0)), VIEW, (4000.0, 450.0));
        assert_eq!(cam.x, 700.0);
    }

    #[test]
    fn clamps_to_world() {
        let mut cam = Camera::new(1.0);
        cam.update(Some((10.0, 10.0)), VIEW, (2000.0, 1000.0));
        assert_eq!((cam.x, cam.y), (0.0, 0.0));
        cam.update(Some((1990.0, 990.0)), VIEW, (2000.0, 1000.0));
        assert_eq!((cam.x, cam.y), (1200.0, 550.0));
    }

    #[test]
    fn world_smaller_than_view_pins_to_origin() {
        let mut cam = Camera::new(1.0);
        cam.update(Some((500.0, 500.0)), VIEW, (400.0, 300.0));
        assert_eq!((cam.x, cam.y), (0.0, 0.0));
    }

    #[test]
    fn missing_target_holds_position() {
        let mut cam = Camera::new(1.0);
        cam.clamp = false;
        cam.set(50.0, 60.0);
        cam.update(None, VIEW, (800.0, 450.0));
        assert_eq!((cam.x, cam.y), (50.0, 60.0));
        assert_eq!(cam.follow, Follow::None);
    }
}
