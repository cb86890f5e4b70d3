use crate::transport::ConnectionHandle;
use rendezvous_core::{ConnectionId, PeerList, PeerRecord, RoomId};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::Mutex;

/// One connection's slot in a room.
#[derive(Clone)]
pub struct Member {
    pub id: ConnectionId,
    pub handle: Arc<dyn ConnectionHandle>,
    pub record: PeerRecord,
    joined_seq: u64,
    /// Room version of the last list handed to `handle`. Held across the
    /// send so deliveries to one member never go backwards.
    delivered: Arc<Mutex<u64>>,
}

impl Member {
    pub(crate) fn delivered(&self) -> &Mutex<u64> {
        &self.delivered
    }
}

/// Live membership of a single room. Only reachable through the registry.
#[derive(Default)]
pub(crate) struct Room {
    members: HashMap<ConnectionId, Member>,
    version: u64,
}

impl Room {
    pub(crate) fn insert(
        &mut self,
        handle: Arc<dyn ConnectionHandle>,
        record: PeerRecord,
        seq: u64,
    ) {
        let id = handle.id();
        self.version = seq;

        match self.members.entry(id) {
            Entry::Occupied(mut entry) => {
                let member = entry.get_mut();
                member.handle = handle;
                member.record = record;
            }
            Entry::Vacant(entry) => {
                entry.insert(Member {
                    id,
                    handle,
                    record,
                    joined_seq: seq,
                    delivered: Arc::new(Mutex::new(0)),
                });
            }
        }
    }

    pub(crate) fn remove(&mut self, id: ConnectionId, seq: u64) -> Option<Member> {
        let removed = self.members.remove(&id);
        if removed.is_some() {
            self.version = seq;
        }
        removed
    }

    pub(crate) fn len(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn snapshot(&self, room_id: &RoomId) -> RoomSnapshot {
        let mut members: Vec<Member> = self.members.values().cloned().collect();
        members.sort_by_key(|member| member.joined_seq);

        RoomSnapshot {
            room_id: room_id.clone(),
            version: self.version,
            members,
        }
    }
}

/// Immutable copy of a room taken under the registry lock. Broadcasting
/// iterates this, never the live map.
#[derive(Clone)]
pub struct RoomSnapshot {
    room_id: RoomId,
    version: u64,
    members: Vec<Member>,
}

impl RoomSnapshot {
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Membership version; grows with every join or leave in the registry.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Members in join order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.members.iter().any(|member| member.id == id)
    }

    pub fn record_of(&self, id: ConnectionId) -> Option<&PeerRecord> {
        self.members
            .iter()
            .find(|member| member.id == id)
            .map(|member| &member.record)
    }

    /// Records of every member except `id`, in join order.
    pub fn peers_for(&self, id: ConnectionId) -> PeerList {
        self.members
            .iter()
            .filter(|member| member.id != id)
            .map(|member| member.record.clone())
            .collect()
    }
}
