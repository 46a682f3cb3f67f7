//! The authoritative tick loop and per-client snapshot fan-out.
//!
//! One task owns the cadence: drain inputs, step the world once, then send
//! every client its own visibility-filtered view of the same state. Clients
//! whose blob died of shrinkage this tick get a death notice and are
//! detached; their transports keep running until the socket closes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::game::constants::tick;
use crate::game::effects::{Effect, EffectSender};
use crate::game::input::InputBuffer;
use crate::net::protocol::{self, BlobView, ServerMessage, StatusView, WorldUpdate};
use crate::net::session::Hub;

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(30);

const DEATH_MESSAGE: &str = "You shrank away to nothing. Reconnect to play again.";

/// Run one full tick: step, persist-if-dirty, fan out, reap the dead.
///
/// Split out from the loop so the whole tick is testable with a fake clock.
pub fn broadcast_tick(hub: &mut Hub, effects: &EffectSender, now: Instant) {
    let dead = hub.world.step(now);

    if hub.world.take_stats_dirty() {
        effects.send(Effect::StatsChanged {
            stats: hub.world.stats().clone(),
        });
    }

    // Status is identical for everyone; build it once per tick
    let status = StatusView::from_world(&hub.world);

    for handle in hub.clients() {
        let viewer = hub.world.blob(handle.blob_id);
        let player = viewer.map(|b| BlobView::pack(b, now));
        // The viewer's own blob stays in the list; clients draw it from there
        let nearby_blobs = match viewer {
            Some(viewer) => hub
                .world
                .blobs()
                .iter()
                .filter(|b| viewer.can_see(b))
                .map(|b| BlobView::pack(b, now))
                .collect(),
            None => Vec::new(),
        };

        let update = ServerMessage::Update {
            update: WorldUpdate {
                player,
                nearby_blobs,
                status: status.clone(),
            },
        };
        match protocol::encode(&update) {
            // A closed writer just means the transport is mid-teardown
            Ok(text) => {
                let _ = handle.sender.send(text);
            }
            Err(e) => warn!("failed to encode update: {}", e),
        }
    }

    for blob_id in dead {
        let Some(client_id) = hub.client_by_blob(blob_id).map(|h| h.client_id) else {
            continue;
        };
        match protocol::encode(&ServerMessage::Death {
            death: true,
            message: DEATH_MESSAGE.to_string(),
        }) {
            Ok(text) => {
                hub.send_to(client_id, text);
            }
            Err(e) => warn!("failed to encode death notice: {}", e),
        }
        hub.detach(client_id);
    }
}

/// Drive ticks forever at the fixed rate.
///
/// Inputs are drained and applied even while the world idles, so stale
/// key state never carries into the first busy tick.
pub async fn start_game_loop(hub: Arc<RwLock<Hub>>, input: InputBuffer, effects: EffectSender) {
    let mut ticker = tokio::time::interval(Duration::from_millis(tick::DURATION_MS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!("game loop running at {} Hz", tick::RATE);

    let mut last_report = Instant::now();
    loop {
        ticker.tick().await;

        let commands = input.drain();
        let mut hub = hub.write().await;
        for command in commands {
            hub.apply_command(command);
        }

        if hub.client_count() == 0 {
            continue;
        }

        broadcast_tick(&mut hub, &effects, Instant::now());

        if last_report.elapsed() >= STATS_LOG_INTERVAL {
            last_report = Instant::now();
            info!(
                "{} clients, {} blobs, arena {:.0}x{:.0}",
                hub.client_count(),
                hub.world.blobs().len(),
                hub.world.width(),
                hub.world.height()
            );
        }
    }
}
