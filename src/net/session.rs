//! Client session registry.
//!
//! The hub pairs the world with the set of connected clients. Connection
//! tasks only ever touch it through the async lock in short critical
//! sections; everything per-tick happens on the game loop's side.

use hashbrown::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::game::blob::BlobId;
use crate::game::input::InputCommand;
use crate::game::world::World;
use crate::net::protocol::JoinInfo;

/// Connection identifier, distinct from the blob id so a transport can be
/// tracked even after its blob is gone
pub type ClientId = Uuid;

/// One connected client
pub struct ClientHandle {
    pub client_id: ClientId,
    pub blob_id: BlobId,
    /// Outbound frames; the writer task drains this
    pub sender: mpsc::UnboundedSender<String>,
}

/// World plus connected clients, shared behind `Arc<RwLock<_>>`
pub struct Hub {
    pub world: World,
    clients: HashMap<ClientId, ClientHandle>,
}

impl Hub {
    pub fn new(world: World) -> Self {
        Self {
            world,
            clients: HashMap::new(),
        }
    }

    /// Register a new client and spawn its blob.
    ///
    /// Identity is optional at attach; most clients attach anonymously and
    /// send a join message through the input buffer once the external login
    /// flow hands their identity over.
    pub fn attach(
        &mut self,
        client_id: ClientId,
        identity: Option<JoinInfo>,
        sender: mpsc::UnboundedSender<String>,
    ) -> BlobId {
        let identity = identity.unwrap_or(JoinInfo {
            name: None,
            account: None,
            top_score: None,
        });
        let blob_id =
            self.world
                .spawn_player(identity.name, identity.account, identity.top_score);
        self.clients.insert(
            client_id,
            ClientHandle {
                client_id,
                blob_id,
                sender,
            },
        );
        info!(
            "client {} attached as blob {} ({} connected)",
            client_id,
            blob_id,
            self.clients.len()
        );
        blob_id
    }

    /// Remove a client and its blob, dead or alive
    pub fn detach(&mut self, client_id: ClientId) -> Option<BlobId> {
        let handle = self.clients.remove(&client_id)?;
        self.world.remove_blob(handle.blob_id);
        info!(
            "client {} detached ({} connected)",
            client_id,
            self.clients.len()
        );
        Some(handle.blob_id)
    }

    /// Route one drained input command to its blob
    pub fn apply_command(&mut self, command: InputCommand) {
        let Some(handle) = self.clients.get(&command.client) else {
            debug!("input from detached client {}, ignoring", command.client);
            return;
        };
        self.world.apply_input(handle.blob_id, command.event);
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    pub fn clients(&self) -> impl Iterator<Item = &ClientHandle> {
        self.clients.values()
    }

    pub fn client_by_blob(&self, blob_id: BlobId) -> Option<&ClientHandle> {
        self.clients.values().find(|c| c.blob_id == blob_id)
    }

    /// Queue a frame for one client; false when the writer is gone
    pub fn send_to(&self, client_id: ClientId, text: String) -> bool {
        match self.clients.get(&client_id) {
            Some(handle) => handle.sender.send(text).is_ok(),
            None => false,
        }
    }
}
