use super::room::{Room, RoomSnapshot};
use crate::transport::ConnectionHandle;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rendezvous_core::{ConnectionId, PeerRecord, RoomId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Room id → members. Each room lives behind its shard lock, so `join`,
/// `leave` and `snapshot` on one room are atomic with respect to each other.
///
/// Rooms exist only while they have members: `join` creates them, the `leave`
/// that removes the last member deletes them.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<DashMap<RoomId, Room>>,
    next_seq: Arc<AtomicU64>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `handle` to the room, creating the room if needed. Joining again
    /// with the same handle replaces its record.
    pub fn join(&self, room_id: &RoomId, handle: Arc<dyn ConnectionHandle>, record: PeerRecord) {
        let created = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                let seq = self.bump();
                entry.get_mut().insert(handle, record, seq);
                false
            }
            Entry::Vacant(entry) => {
                let mut room = Room::default();
                room.insert(handle, record, self.bump());
                entry.insert(room);
                true
            }
        };

        if created {
            info!("Creating new room: {}", room_id);
        }
    }

    /// Removes `id` from the room and deletes the room once it is empty.
    /// Absent rooms or members are not an error.
    pub fn leave(&self, room_id: &RoomId, id: ConnectionId) -> Option<PeerRecord> {
        let (removed, dissolved) = match self.rooms.entry(room_id.clone()) {
            Entry::Occupied(mut entry) => {
                let seq = self.bump();
                let removed = entry.get_mut().remove(id, seq);
                let dissolved = entry.get().is_empty();
                if dissolved {
                    entry.remove();
                }
                (removed, dissolved)
            }
            Entry::Vacant(_) => return None,
        };

        if dissolved {
            info!("Room is empty, removing: {}", room_id);
        }

        removed.map(|member| member.record)
    }

    /// Next membership version. Taken inside the room's critical section so
    /// versions of one room grow in the order its changes were applied.
    fn bump(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Copy of the room's current members, or `None` if the room is gone.
    pub fn snapshot(&self, room_id: &RoomId) -> Option<RoomSnapshot> {
        self.rooms.get(room_id).map(|room| room.snapshot(room_id))
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map(|room| room.len()).unwrap_or(0)
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(|entry| entry.key().clone()).collect()
    }
}
