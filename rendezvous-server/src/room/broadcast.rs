use crate::room::RoomRegistry;
use futures::future::join_all;
use rendezvous_core::{ConnectionId, RoomId};
use tracing::{debug, warn};

/// Outcome of one announce pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnounceReport {
    /// Members in the snapshot the pass worked from.
    pub recipients: usize,
    /// Members that already hold a list at least as new as this pass's.
    pub superseded: usize,
    /// Members whose send failed. Their own driver cleans them up.
    pub failed: Vec<ConnectionId>,
}

enum Delivery {
    Sent,
    Superseded,
}

/// Pushes each member of a room the list of everyone else in it.
///
/// Passes for the same room may overlap. Each member's delivery slot is
/// locked across its send and only accepts a snapshot newer than the last one
/// it got, so the final list a member sees always matches the room's latest
/// membership.
#[derive(Clone)]
pub struct Broadcaster {
    registry: RoomRegistry,
}

impl Broadcaster {
    pub fn new(registry: RoomRegistry) -> Self {
        Self { registry }
    }

    pub async fn announce(&self, room_id: &RoomId) -> AnnounceReport {
        // Sends go out over a snapshot, with no registry lock held.
        let Some(snapshot) = self.registry.snapshot(room_id) else {
            debug!("Room '{}' already dissolved, nothing to announce", room_id);
            return AnnounceReport::default();
        };
        let version = snapshot.version();

        let deliveries = snapshot.members().iter().map(|member| {
            let peers = snapshot.peers_for(member.id);
            async move {
                let mut delivered = member.delivered().lock().await;
                if *delivered >= version {
                    return (member.id, Ok(Delivery::Superseded));
                }

                let result = member.handle.send(&peers).await;
                if result.is_ok() {
                    *delivered = version;
                }
                (member.id, result.map(|()| Delivery::Sent))
            }
        });
        let results = join_all(deliveries).await;

        let mut report = AnnounceReport {
            recipients: results.len(),
            ..AnnounceReport::default()
        };

        for (id, result) in results {
            match result {
                Ok(Delivery::Sent) => {}
                Ok(Delivery::Superseded) => report.superseded += 1,
                Err(e) => {
                    warn!(
                        "Failed to deliver peer list to {} in room '{}': {}",
                        id, room_id, e
                    );
                    report.failed.push(id);
                }
            }
        }

        debug!(
            "Announced room '{}' (version {}) to {} member(s), {} superseded",
            room_id, version, report.recipients, report.superseded
        );
        report
    }
}
