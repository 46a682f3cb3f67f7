//! Fire-and-forget side effects emitted by the simulation.
//!
//! Reward transfers, high-score writes, and world-stats persistence all
//! belong to external collaborators. The world pushes requests into a
//! bounded channel and never waits on, retries, or observes the outcome;
//! a saturated channel drops the effect with a warning.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::game::blob::AccountId;
use crate::game::world::WorldStats;

/// A request for an external collaborator
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Pay out for one player consuming another; both must be account-linked
    RewardTransfer {
        from: AccountId,
        to: AccountId,
        amount: u32,
    },
    /// A player's personal best radius increased
    HighScore { account: AccountId, radius: f32 },
    /// World-level top-score stats changed this tick
    StatsChanged { stats: WorldStats },
}

/// Bounded outbox for simulation side effects
pub struct EffectBuffer {
    sender: Sender<Effect>,
    receiver: Receiver<Effect>,
}

impl EffectBuffer {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self { sender, receiver }
    }

    /// Create a sender handle for the world or the tick loop
    pub fn sender(&self) -> EffectSender {
        EffectSender {
            sender: self.sender.clone(),
        }
    }

    /// Receiver side for the dispatcher
    pub fn receiver(&self) -> Receiver<Effect> {
        self.receiver.clone()
    }
}

impl Default for EffectBuffer {
    fn default() -> Self {
        Self::new(256)
    }
}

/// Clonable non-blocking sender; losing an effect is tolerated, blocking is not
#[derive(Clone)]
pub struct EffectSender {
    sender: Sender<Effect>,
}

impl EffectSender {
    pub fn send(&self, effect: Effect) {
        match self.sender.try_send(effect) {
            Ok(()) => {}
            Err(TrySendError::Full(effect)) => {
                warn!("effect channel full, dropping {:?}", effect);
            }
            Err(TrySendError::Disconnected(effect)) => {
                debug!("effect dispatcher gone, dropping {:?}", effect);
            }
        }
    }
}

/// Spawn the dispatcher thread.
///
/// Stands in for the rewards gateway and the persistence layer, which are
/// outside this server's scope: every request is logged and acknowledged
/// locally. Exits when all senders are dropped.
pub fn spawn_dispatcher(receiver: Receiver<Effect>) -> std::thread::JoinHandle<()> {
    std::thread::Builder::new()
        .name("effect-dispatcher".to_string())
        .spawn(move || {
            for effect in receiver.iter() {
                match effect {
                    Effect::RewardTransfer { from, to, amount } => {
                        info!("reward transfer: {} -> {} amount {}", from, to, amount);
                    }
                    Effect::HighScore { account, radius } => {
                        info!("high score for account {}: {:.1}", account, radius);
                    }
                    Effect::StatsChanged { stats } => {
                        info!(
                            "world stats changed: top {:.1} by '{}' ({})",
                            stats.top_radius, stats.top_name, stats.top_account
                        );
                    }
                }
            }
        })
        .expect("spawn effect dispatcher")
}
