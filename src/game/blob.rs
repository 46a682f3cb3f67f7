//! Blob entities: autonomous prey/hostile drifters and piloted player blobs.
//!
//! All actors share one record; the kind tag plus the optional pilot state
//! select which movement and visibility behavior applies.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::constants::{blob, player};
use crate::game::input::Direction;
use crate::util::vec2::Vec2;

/// Unique blob identifier, monotonically assigned and never reused
pub type BlobId = u64;

/// External account identifier (absent for anonymous play)
pub type AccountId = i64;

/// Discrete kind tag; wire names match the browser client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlobKind {
    #[serde(rename = "blob")]
    Prey,
    #[serde(rename = "baddy")]
    Hostile,
    #[serde(rename = "player")]
    Player,
}

/// Per-direction input flags
///
/// Opposed flags may be held simultaneously; their momentum contributions
/// cancel rather than one overriding the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputFlags {
    pub fn set(&mut self, direction: Direction, pressed: bool) {
        match direction {
            Direction::Up => self.up = pressed,
            Direction::Down => self.down = pressed,
            Direction::Left => self.left = pressed,
            Direction::Right => self.right = pressed,
        }
    }
}

/// Client viewport dimensions, replaced wholesale by resize events
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// Pilot-only state for player blobs
///
/// None of these fields ever cross the wire; snapshots expose only the
/// public fields of the owning blob.
#[derive(Debug, Clone)]
pub struct PilotState {
    pub input: InputFlags,
    pub momentum: Vec2,
    pub spawn_time: Instant,
    pub protection: Duration,
    /// Death is reported once via the dead-set; `alive` drives removal
    pub dead_reported: bool,
    pub account: Option<AccountId>,
    /// Personal best radius; increases signal a persistence write
    pub best_radius: f32,
    pub viewport: Viewport,
}

/// Any circular actor in the world
#[derive(Debug, Clone)]
pub struct Blob {
    pub id: BlobId,
    pub kind: BlobKind,
    pub position: Vec2,
    pub r: f32,
    pub alive: bool,
    pub color: String,
    pub name: String,
    /// Drift velocity, fixed at spawn; unused by piloted blobs
    pub drift: Vec2,
    /// Some iff kind == Player
    pub pilot: Option<PilotState>,
}

impl Blob {
    /// Create an autonomous prey or hostile blob with a random lifetime drift
    pub fn autonomous(id: BlobId, kind: BlobKind, position: Vec2, r: f32) -> Self {
        debug_assert!(kind != BlobKind::Player);
        let mut rng = rand::thread_rng();
        let drift = Vec2::new(
            rng.gen_range(-blob::DRIFT_RANGE..blob::DRIFT_RANGE),
            rng.gen_range(-blob::DRIFT_RANGE..blob::DRIFT_RANGE),
        );
        Self {
            id,
            kind,
            position,
            r,
            alive: true,
            color: kind_color(kind).to_string(),
            name: String::new(),
            drift,
            pilot: None,
        }
    }

    /// Create one split offspring near the parent's last position
    pub fn offspring(id: BlobId, kind: BlobKind, origin: Vec2) -> Self {
        let mut rng = rand::thread_rng();
        let half = blob::SPLIT_SCATTER / 2.0;
        let position = Vec2::new(
            origin.x + rng.gen_range(-half..half),
            origin.y + rng.gen_range(-half..half),
        );
        Self::autonomous(id, kind, position, blob::SPLIT_RADIUS)
    }

    /// Create a piloted player blob for an attaching client
    pub fn player(
        id: BlobId,
        position: Vec2,
        name: String,
        account: Option<AccountId>,
        best_radius: f32,
        protection: Duration,
    ) -> Self {
        let mut rng = rand::thread_rng();
        Self {
            id,
            kind: BlobKind::Player,
            position,
            r: player::START_RADIUS,
            alive: true,
            color: format!("#{:06X}", rng.gen_range(0..0x100_0000u32)),
            name,
            drift: Vec2::ZERO,
            pilot: Some(PilotState {
                input: InputFlags::default(),
                momentum: Vec2::ZERO,
                spawn_time: Instant::now(),
                protection,
                dead_reported: false,
                account,
                best_radius,
                viewport: Viewport::default(),
            }),
        }
    }

    /// The sole containment/eating predicate.
    ///
    /// Intentionally asymmetric: only this blob's radius bounds the distance
    /// check, and equal radii never contain in either direction.
    pub fn contains(&self, other: &Blob) -> bool {
        let distance = self.position.distance_to(other.position);
        distance < self.r && self.r > other.r
    }

    /// Spawn protection is a pure function of elapsed time, never a stored flag
    pub fn is_protected(&self, now: Instant) -> bool {
        match &self.pilot {
            Some(pilot) => now.saturating_duration_since(pilot.spawn_time) < pilot.protection,
            None => false,
        }
    }

    /// Advance one tick of movement within the current world bounds
    pub fn advance(&mut self, width: f32, height: f32) {
        if self.pilot.is_some() {
            self.piloted_move(width, height);
        } else {
            self.drift_move(width, height);
        }
    }

    /// Random-walk drift with wall reflection
    fn drift_move(&mut self, width: f32, height: f32) {
        self.position += self.drift;

        if self.position.x + self.r > width || self.position.x - self.r < 0.0 {
            self.drift.x *= -1.0;
            self.position.x = self.position.x.max(self.r).min(width - self.r);
        }
        if self.position.y + self.r > height || self.position.y - self.r < 0.0 {
            self.drift.y *= -1.0;
            self.position.y = self.position.y.max(self.r).min(height - self.r);
        }
    }

    /// Input-driven momentum with friction; walls stop rather than reflect
    fn piloted_move(&mut self, width: f32, height: f32) {
        let boost = player::BASE_SPEED * speed_multiplier(self.r);
        let pilot = self.pilot.as_mut().expect("piloted_move without pilot");

        if pilot.input.up {
            pilot.momentum.y -= boost;
        }
        if pilot.input.down {
            pilot.momentum.y += boost;
        }
        if pilot.input.left {
            pilot.momentum.x -= boost;
        }
        if pilot.input.right {
            pilot.momentum.x += boost;
        }

        self.position += pilot.momentum;

        if self.position.x + self.r > width || self.position.x - self.r < 0.0 {
            pilot.momentum.x = 0.0;
            self.position.x = self.position.x.max(self.r).min(width - self.r);
        }
        if self.position.y + self.r > height || self.position.y - self.r < 0.0 {
            pilot.momentum.y = 0.0;
            self.position.y = self.position.y.max(self.r).min(height - self.r);
        }

        // Friction decays momentum every tick, input or not
        pilot.momentum *= player::FRICTION;
    }

    /// Visibility predicate for snapshot filtering.
    ///
    /// The zoom multiplier depends on the viewer's current radius, so this is
    /// recomputed every tick and is not symmetric between viewers.
    pub fn can_see(&self, other: &Blob) -> bool {
        let viewport = match &self.pilot {
            Some(pilot) => pilot.viewport,
            None => return false,
        };
        let multi = (viewport.width / player::ZOOM_DIVISOR) / self.r;

        let dx = other.position.x - self.position.x;
        let dy = other.position.y - self.position.y;

        if (dx * multi).abs() > viewport.width / 2.0 + other.r * 2.0 * multi {
            return false;
        }
        if (dy * multi).abs() > viewport.height / 2.0 + other.r * 2.0 * multi {
            return false;
        }
        true
    }
}

/// Larger blobs accelerate more slowly, floored at MIN_SPEED_MULTIPLIER
pub fn speed_multiplier(r: f32) -> f32 {
    ((100.0 - r / 2.0) / 100.0 + 0.1).max(player::MIN_SPEED_MULTIPLIER)
}

/// Display color for autonomous kinds
pub fn kind_color(kind: BlobKind) -> &'static str {
    match kind {
        BlobKind::Prey => blob::PREY_COLOR,
        BlobKind::Hostile => blob::HOSTILE_COLOR,
        BlobKind::Player => "#FFFFFF",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prey(id: BlobId, x: f32, y: f32, r: f32) -> Blob {
        let mut b = Blob::autonomous(id, BlobKind::Prey, Vec2::new(x, y), r);
        b.drift = Vec2::ZERO;
        b
    }

    fn test_player(id: BlobId, x: f32, y: f32, r: f32) -> Blob {
        let mut b = Blob::player(
            id,
            Vec2::new(x, y),
            "tester".to_string(),
            None,
            0.0,
            Duration::from_millis(5000),
        );
        b.r = r;
        b
    }

    #[test]
    fn test_containment_requires_strictly_larger_radius() {
        let a = prey(1, 100.0, 100.0, 15.0);
        let b = prey(2, 102.0, 100.0, 10.0);
        assert!(a.contains(&b));
        assert!(!b.contains(&a));

        // Equal radii never contain in either direction
        let c = prey(3, 100.0, 100.0, 15.0);
        let d = prey(4, 101.0, 100.0, 15.0);
        assert!(!c.contains(&d));
        assert!(!d.contains(&c));
    }

    #[test]
    fn test_containment_threshold_is_own_radius_only() {
        let a = prey(1, 0.0, 0.0, 15.0);
        let mut b = prey(2, 14.0, 0.0, 5.0);
        assert!(a.contains(&b));

        // Distance equal to the radius is outside (strict inequality)
        b.position = Vec2::new(15.0, 0.0);
        assert!(!a.contains(&b));

        // The other blob's radius never widens the threshold
        b.position = Vec2::new(15.5, 0.0);
        b.r = 14.0;
        assert!(!a.contains(&b));
    }

    #[test]
    fn test_drift_reflects_off_walls() {
        let mut b = prey(1, 5.0, 50.0, 10.0);
        b.drift = Vec2::new(-2.0, 0.0);

        b.advance(100.0, 100.0);

        assert_eq!(b.drift.x, 2.0);
        assert_eq!(b.position.x, 10.0);
        assert_eq!(b.position.y, 50.0);
    }

    #[test]
    fn test_drift_interior_is_deterministic() {
        let mut b = prey(1, 50.0, 50.0, 10.0);
        b.drift = Vec2::new(1.5, -0.5);

        b.advance(100.0, 100.0);
        assert!(b.position.approx_eq(Vec2::new(51.5, 49.5), 1e-6));

        b.advance(100.0, 100.0);
        assert!(b.position.approx_eq(Vec2::new(53.0, 49.0), 1e-6));
    }

    #[test]
    fn test_piloted_momentum_and_friction() {
        let mut p = test_player(1, 500.0, 500.0, 20.0);
        p.pilot.as_mut().unwrap().input.up = true;

        p.advance(1000.0, 1000.0);

        // r=20: multiplier = (100 - 10)/100 + 0.1 = 1.0
        let pilot = p.pilot.as_ref().unwrap();
        assert!((p.position.y - 499.0).abs() < 1e-5);
        assert!((pilot.momentum.y - (-0.9)).abs() < 1e-5);
    }

    #[test]
    fn test_piloted_wall_zeroes_momentum() {
        let mut p = test_player(1, 25.0, 500.0, 20.0);
        p.pilot.as_mut().unwrap().momentum = Vec2::new(-10.0, 0.0);

        p.advance(1000.0, 1000.0);

        // Walls stop players instead of reflecting them
        let pilot = p.pilot.as_ref().unwrap();
        assert_eq!(pilot.momentum.x, 0.0);
        assert_eq!(p.position.x, 20.0);
    }

    #[test]
    fn test_opposed_flags_cancel() {
        let mut p = test_player(1, 500.0, 500.0, 20.0);
        {
            let pilot = p.pilot.as_mut().unwrap();
            pilot.input.up = true;
            pilot.input.down = true;
        }

        p.advance(1000.0, 1000.0);

        assert_eq!(p.pilot.as_ref().unwrap().momentum.y, 0.0);
        assert_eq!(p.position.y, 500.0);
    }

    #[test]
    fn test_speed_multiplier_floor() {
        assert!((speed_multiplier(20.0) - 1.0).abs() < 1e-6);
        assert!((speed_multiplier(100.0) - 0.6).abs() < 1e-6);
        // Huge blobs bottom out instead of going negative
        assert_eq!(speed_multiplier(300.0), 0.25);
    }

    #[test]
    fn test_protection_window() {
        let mut p = test_player(1, 0.0, 0.0, 20.0);
        let now = Instant::now();
        assert!(p.is_protected(now));

        p.pilot.as_mut().unwrap().spawn_time = now - Duration::from_millis(4999);
        assert!(p.is_protected(now));

        p.pilot.as_mut().unwrap().spawn_time = now - Duration::from_millis(5001);
        assert!(!p.is_protected(now));
    }

    #[test]
    fn test_autonomous_blobs_are_never_protected() {
        let b = prey(1, 0.0, 0.0, 10.0);
        assert!(!b.is_protected(Instant::now()));
    }

    #[test]
    fn test_can_see_window_bounds() {
        let mut viewer = test_player(1, 1000.0, 1000.0, 20.0);
        viewer.pilot.as_mut().unwrap().viewport = Viewport {
            width: 1600.0,
            height: 900.0,
        };
        // multi = (1600/16)/20 = 5; x threshold = 800 + 10*2*5 = 900 => |dx| <= 180
        let near = prey(2, 1179.0, 1000.0, 10.0);
        let far = prey(3, 1181.0, 1000.0, 10.0);

        assert!(viewer.can_see(&near));
        assert!(!viewer.can_see(&far));
    }

    #[test]
    fn test_can_see_is_not_symmetric() {
        let mut big = test_player(1, 1000.0, 1000.0, 100.0);
        big.pilot.as_mut().unwrap().viewport = Viewport {
            width: 1600.0,
            height: 900.0,
        };
        let mut small = test_player(2, 1800.0, 1000.0, 10.0);
        small.pilot.as_mut().unwrap().viewport = Viewport {
            width: 1600.0,
            height: 900.0,
        };

        // big: multi = 1.0, x threshold = 800 + 10*2 = 820 => sees small at dx=800
        // small: multi = 10.0, x threshold = 800 + 100*20 = 2800 vs dx*multi = 8000
        assert!(big.can_see(&small));
        assert!(!small.can_see(&big));
    }

    #[test]
    fn test_zero_viewport_sees_everything() {
        let viewer = test_player(1, 0.0, 0.0, 20.0);
        let distant = prey(2, 99999.0, 99999.0, 10.0);
        // Until the first resize arrives the viewport is 0x0 and nothing is culled
        assert!(viewer.can_see(&distant));
    }

    #[test]
    fn test_autonomous_blobs_cannot_see() {
        let b = prey(1, 0.0, 0.0, 10.0);
        let other = prey(2, 1.0, 0.0, 10.0);
        assert!(!b.can_see(&other));
    }

    #[test]
    fn test_offspring_lands_near_parent() {
        for _ in 0..20 {
            let child = Blob::offspring(7, BlobKind::Hostile, Vec2::new(100.0, 200.0));
            assert_eq!(child.kind, BlobKind::Hostile);
            assert_eq!(child.r, blob::SPLIT_RADIUS);
            assert!((child.position.x - 100.0).abs() <= blob::SPLIT_SCATTER / 2.0);
            assert!((child.position.y - 200.0).abs() <= blob::SPLIT_SCATTER / 2.0);
        }
    }
}
