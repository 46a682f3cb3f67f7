//! World state and the per-tick simulation step.
//!
//! The world owns the blob collection and resolves spawning, movement,
//! collisions, growth, and splitting once per tick, in a fixed order.
//! Removals and split offspring are collected during the pass and applied
//! after it, so iteration order stays deterministic and testable.

use std::time::{Duration, Instant};

use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::WorldConfig;
use crate::game::blob::{AccountId, Blob, BlobId, BlobKind};
use crate::game::constants::{blob, player, world};
use crate::game::effects::{Effect, EffectSender};
use crate::game::input::InputEvent;
use crate::game::names;
use crate::util::vec2::Vec2;

/// Aggregate world statistics, persisted externally when dirty
#[derive(Debug, Clone, PartialEq)]
pub struct WorldStats {
    /// Largest radius ever observed
    pub top_radius: f32,
    /// Display name of its owner
    pub top_name: String,
    /// Account id of its owner (0 when anonymous)
    pub top_account: AccountId,
    /// Page-view counters maintained on behalf of the web layer
    pub hits_home: u64,
    pub hits_game: u64,
}

impl Default for WorldStats {
    fn default() -> Self {
        Self {
            top_radius: 0.0,
            top_name: String::new(),
            top_account: 0,
            hits_home: 0,
            hits_game: 0,
        }
    }
}

/// Pages tracked by the view counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView {
    Home,
    Game,
}

/// The authoritative simulation state
pub struct World {
    config: WorldConfig,
    width: f32,
    height: f32,
    blobs: Vec<Blob>,
    next_id: BlobId,
    stats: WorldStats,
    stats_dirty: bool,
    effects: EffectSender,
}

impl World {
    pub fn new(config: WorldConfig, effects: EffectSender) -> Self {
        let width = config.base_size;
        let height = config.base_size;
        Self {
            config,
            width,
            height,
            blobs: Vec::new(),
            next_id: 0,
            stats: WorldStats::default(),
            stats_dirty: false,
            effects,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn blobs(&self) -> &[Blob] {
        &self.blobs
    }

    pub fn blob(&self, id: BlobId) -> Option<&Blob> {
        self.blobs.iter().find(|b| b.id == id)
    }

    #[cfg(test)]
    pub(crate) fn blob_mut(&mut self, id: BlobId) -> Option<&mut Blob> {
        self.blobs.iter_mut().find(|b| b.id == id)
    }

    /// Number of piloted blobs currently in the collection
    pub fn player_count(&self) -> usize {
        self.blobs.iter().filter(|b| b.pilot.is_some()).count()
    }

    /// Largest player blob currently in the world, if any.
    ///
    /// The status block is built from this every tick; unlike the persisted
    /// stats it forgets a record holder the moment they detach or shrink.
    pub fn top_player(&self) -> Option<&Blob> {
        self.blobs
            .iter()
            .filter(|b| b.pilot.is_some())
            .max_by(|a, b| a.r.total_cmp(&b.r))
    }

    /// Soft cap on total blob count; splits may overshoot it within a tick
    pub fn blob_cap(&self) -> usize {
        (((self.width + self.height) / 2.0) / world::CAP_DIVISOR) as usize
    }

    /// No blob may grow past a quarter of the larger world dimension
    pub fn radius_ceiling(&self) -> f32 {
        self.width.max(self.height) * world::RADIUS_CEILING_RATIO
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    /// Consume the dirty flag; the caller polls this once per tick
    pub fn take_stats_dirty(&mut self) -> bool {
        std::mem::take(&mut self.stats_dirty)
    }

    /// Replace stats wholesale, e.g. from a persistence load at startup
    pub fn seed_stats(&mut self, stats: WorldStats) {
        self.stats = stats;
    }

    /// Count a page view on behalf of the web layer
    pub fn record_page_view(&mut self, page: PageView) {
        match page {
            PageView::Home => self.stats.hits_home += 1,
            PageView::Game => self.stats.hits_game += 1,
        }
    }

    fn alloc_id(&mut self) -> BlobId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Attach a new player blob at a random position
    pub fn spawn_player(
        &mut self,
        name: Option<String>,
        account: Option<AccountId>,
        best_radius: Option<f32>,
    ) -> BlobId {
        let mut rng = rand::thread_rng();
        let position = Vec2::new(
            rng.gen::<f32>() * self.width,
            rng.gen::<f32>() * self.height,
        );
        let id = self.alloc_id();
        let name = name.unwrap_or_else(names::random_name);
        let protection = Duration::from_millis(self.config.protection_ms);
        let blob = Blob::player(
            id,
            position,
            name,
            account,
            best_radius.unwrap_or(0.0),
            protection,
        );
        info!("player '{}' spawned as blob {}", blob.name, id);
        self.blobs.push(blob);
        id
    }

    /// Remove a blob regardless of alive state (client detach path)
    pub fn remove_blob(&mut self, id: BlobId) -> bool {
        let before = self.blobs.len();
        self.blobs.retain(|b| b.id != id);
        before != self.blobs.len()
    }

    /// Apply one buffered input event; unknown ids are silent no-ops
    pub fn apply_input(&mut self, id: BlobId, event: InputEvent) {
        let Some(target) = self.blobs.iter_mut().find(|b| b.id == id) else {
            debug!("input for unknown blob {}, ignoring", id);
            return;
        };
        match event {
            InputEvent::Press(direction) => {
                if let Some(pilot) = target.pilot.as_mut() {
                    pilot.input.set(direction, true);
                }
            }
            InputEvent::Release(direction) => {
                if let Some(pilot) = target.pilot.as_mut() {
                    pilot.input.set(direction, false);
                }
            }
            InputEvent::Resize(viewport) => {
                if let Some(pilot) = target.pilot.as_mut() {
                    pilot.viewport = viewport;
                }
            }
            InputEvent::Identify {
                name,
                account,
                best_radius,
            } => {
                if let Some(name) = name {
                    target.name = name;
                }
                if let Some(pilot) = target.pilot.as_mut() {
                    if account.is_some() {
                        pilot.account = account;
                    }
                    if let Some(best) = best_radius {
                        pilot.best_radius = best;
                    }
                }
            }
        }
    }

    /// Run one simulation tick.
    ///
    /// Returns the ids of players that entered the dead state this tick; the
    /// caller notifies and detaches those sessions.
    pub fn step(&mut self, now: Instant) -> SmallVec<[BlobId; 4]> {
        self.resize();
        self.spawn_check();
        self.advance(now)
    }

    /// World dimensions grow linearly with the player count
    fn resize(&mut self) {
        let players = self.player_count() as f32;
        self.width = self.config.base_size + players * self.config.growth_per_player;
        self.height = self.config.base_size + players * self.config.growth_per_player;
    }

    /// At most one spawn attempt per tick; a candidate contained by any
    /// existing blob is discarded and retried next tick
    fn spawn_check(&mut self) {
        if self.blobs.len() >= self.blob_cap() {
            return;
        }
        let mut rng = rand::thread_rng();
        let kind = if rng.gen::<f64>() > self.config.hostile_chance {
            BlobKind::Prey
        } else {
            BlobKind::Hostile
        };
        let position = Vec2::new(
            rng.gen::<f32>() * self.width,
            rng.gen::<f32>() * self.height,
        );
        let r = (rng.gen::<f32>() * blob::SPAWN_RADIUS_SPREAD).round() + blob::MIN_RADIUS;
        let id = self.alloc_id();
        let candidate = Blob::autonomous(id, kind, position, r);

        if self.blobs.iter().any(|b| b.contains(&candidate)) {
            // Spawn starvation: skip, never force a placement
            return;
        }
        self.blobs.push(candidate);
    }

    /// The per-blob pass: stats, death reporting, movement, collisions, splits
    fn advance(&mut self, now: Instant) -> SmallVec<[BlobId; 4]> {
        let mut dead: SmallVec<[BlobId; 4]> = SmallVec::new();
        let mut hatched: Vec<Blob> = Vec::new();

        let width = self.width;
        let height = self.height;
        let ceiling = self.radius_ceiling();
        let absorption = self.config.absorption;
        let award_fraction = self.config.award_fraction;
        let pool_account = self.config.pool_account;
        let split_threshold = self.config.split_threshold;

        for i in 0..self.blobs.len() {
            // Blobs dead at the start of their turn are removal intents
            if !self.blobs[i].alive {
                continue;
            }

            // World stats: record a new top radius with its owner
            if self.blobs[i].r > self.stats.top_radius {
                let b = &self.blobs[i];
                self.stats.top_radius = b.r;
                self.stats.top_name = if b.name.is_empty() {
                    player::FALLBACK_NAME.to_string()
                } else {
                    b.name.clone()
                };
                self.stats.top_account = b.pilot.as_ref().and_then(|p| p.account).unwrap_or(0);
                self.stats_dirty = true;
            }

            // Player bookkeeping: personal best, then shrink-to-death
            {
                let b = &mut self.blobs[i];
                let id = b.id;
                let r = b.r;
                let mut died = false;
                if let Some(pilot) = b.pilot.as_mut() {
                    if r > pilot.best_radius {
                        pilot.best_radius = r;
                        if let Some(account) = pilot.account {
                            self.effects.send(Effect::HighScore { account, radius: r });
                        }
                    }
                    let protected =
                        now.saturating_duration_since(pilot.spawn_time) < pilot.protection;
                    if r <= blob::MIN_RADIUS && !pilot.dead_reported && !protected {
                        pilot.dead_reported = true;
                        died = true;
                    }
                }
                if died {
                    info!("player '{}' has died", self.blobs[i].name);
                    dead.push(id);
                }
            }

            self.blobs[i].advance(width, height);

            // Collision resolution against every other live blob
            for j in 0..self.blobs.len() {
                if j == i {
                    continue;
                }
                let (me, other) = pair_mut(&mut self.blobs, i, j);
                if !me.alive || !other.alive {
                    continue;
                }
                if !me.contains(other) {
                    continue;
                }
                // Protection grants full immunity as a victim
                if other.is_protected(now) {
                    continue;
                }

                let eats_outright = (me.kind == BlobKind::Hostile
                    && other.kind == BlobKind::Hostile)
                    || other.kind != BlobKind::Hostile
                    || other.r < blob::INSTANT_EAT_THRESHOLD;

                if eats_outright {
                    me.r += other.r * absorption;

                    // Account-linked player-on-player kills pay out of the pool
                    if me.kind == BlobKind::Player && other.kind == BlobKind::Player {
                        let to = me.pilot.as_ref().and_then(|p| p.account);
                        let victim = other.pilot.as_ref().and_then(|p| p.account);
                        if let (Some(to), Some(_)) = (to, victim) {
                            let amount = (other.r * award_fraction).round() as i64;
                            if amount > 0 {
                                self.effects.send(Effect::RewardTransfer {
                                    from: pool_account,
                                    to,
                                    amount: amount as u32,
                                });
                            }
                        }
                    }

                    other.alive = false;
                } else {
                    // Both shed the victim's pre-shrink radius times the rate;
                    // a protected aggressor skips its own penalty
                    let bite = other.r * absorption;
                    if !me.is_protected(now) {
                        me.r -= bite;
                    }
                    other.r -= bite;
                }

                // Only the aggressor is re-clamped; a bounced victim may sit
                // below the floor, which keeps the instant-eat gate reachable
                me.r = me.r.min(ceiling).max(blob::MIN_RADIUS);
            }

            // Oversized autonomous blobs split into offspring
            let (r, kind, origin) = {
                let b = &self.blobs[i];
                (b.r, b.kind, b.position)
            };
            if r > split_threshold && kind != BlobKind::Player {
                self.blobs[i].alive = false;
                self.blobs[i].r = 0.0;
                for _ in 0..blob::SPLIT_COUNT {
                    let id = self.alloc_id();
                    hatched.push(Blob::offspring(id, kind, origin));
                }
            }
        }

        // Apply removal intents, then queued offspring
        self.blobs.retain(|b| b.alive);
        self.blobs.extend(hatched);

        dead
    }
}

/// Mutable references to two distinct blobs in the collection
fn pair_mut(blobs: &mut [Blob], i: usize, j: usize) -> (&mut Blob, &mut Blob) {
    debug_assert!(i != j);
    if i < j {
        let (left, right) = blobs.split_at_mut(j);
        (&mut left[i], &mut right[0])
    } else {
        let (left, right) = blobs.split_at_mut(i);
        (&mut right[0], &mut left[j])
    }
}
