//! Point-to-point transport between group members.
//!
//! The pipeline runs on a fixed-size group of participants identified by
//! integer rank: rank 0 is the coordinator, ranks `1..group_size` are
//! workers. Group size and each member's rank come from whoever forms
//! the group; the core never discovers them itself.
//!
//! # Reference Semantics
//!
//! Both operations are synchronous and blocking with no timeout and no
//! cancellation: `send` completes when the runtime has accepted the
//! payload, `receive` blocks until the full payload from the named peer
//! has arrived. A lost or slow peer stalls the corresponding call
//! indefinitely. Transfers between distinct peer pairs are independent;
//! a payload that arrives early waits in the runtime's buffer until the
//! receiver asks for that source.
//!
//! Payloads move by value. No memory is shared between ranks.

use crate::error::TransferError;
use std::sync::mpsc::{channel, Receiver, Sender};
use tracing::trace;

/// Rank of the coordinator within any group.
pub const COORDINATOR_RANK: usize = 0;

/// Blocking point-to-point message passing between ranks.
pub trait Transport {
    /// This member's own rank.
    fn rank(&self) -> usize;

    /// Total number of participants, coordinator included.
    fn group_size(&self) -> usize;

    /// Transfer `payload` to `target`. Blocks until the transfer is
    /// accepted by the runtime.
    fn send(&mut self, target: usize, payload: Vec<u8>) -> Result<(), TransferError>;

    /// Block until the next payload from `source` has fully arrived.
    fn receive(&mut self, source: usize) -> Result<Vec<u8>, TransferError>;
}

/// One member's view of an in-process group.
///
/// Holds a sender toward every peer and a receiver from every peer, so
/// each ordered pair of ranks has its own queue and transfers between
/// distinct pairs never interfere.
pub struct GroupEndpoint {
    rank: usize,
    group_size: usize,
    /// Senders indexed by target rank; `None` at our own slot
    peers: Vec<Option<Sender<Vec<u8>>>>,
    /// Receivers indexed by source rank; `None` at our own slot
    inboxes: Vec<Option<Receiver<Vec<u8>>>>,
}

/// Form an in-process group of `group_size` members.
///
/// Returns one endpoint per rank, in rank order. Each endpoint is moved
/// to the thread that plays that rank; dropping an endpoint makes every
/// pending `receive` from that rank fail with
/// [`TransferError::Disconnected`], which is how a group abort
/// propagates.
pub fn form_group(group_size: usize) -> Vec<GroupEndpoint> {
    let mut peers: Vec<Vec<Option<Sender<Vec<u8>>>>> = (0..group_size)
        .map(|_| (0..group_size).map(|_| None).collect())
        .collect();
    let mut inboxes: Vec<Vec<Option<Receiver<Vec<u8>>>>> = (0..group_size)
        .map(|_| (0..group_size).map(|_| None).collect())
        .collect();

    for from in 0..group_size {
        for to in 0..group_size {
            if from != to {
                let (tx, rx) = channel();
                peers[from][to] = Some(tx);
                inboxes[to][from] = Some(rx);
            }
        }
    }

    peers
        .into_iter()
        .zip(inboxes)
        .enumerate()
        .map(|(rank, (peers, inboxes))| GroupEndpoint {
            rank,
            group_size,
            peers,
            inboxes,
        })
        .collect()
}

impl GroupEndpoint {
    fn check_peer(&self, peer: usize) -> Result<(), TransferError> {
        if peer >= self.group_size {
            return Err(TransferError::InvalidPeer {
                rank: peer,
                group_size: self.group_size,
            });
        }
        if peer == self.rank {
            return Err(TransferError::SelfTransfer(self.rank));
        }
        Ok(())
    }
}

impl Transport for GroupEndpoint {
    fn rank(&self) -> usize {
        self.rank
    }

    fn group_size(&self) -> usize {
        self.group_size
    }

    fn send(&mut self, target: usize, payload: Vec<u8>) -> Result<(), TransferError> {
        self.check_peer(target)?;
        trace!(from = self.rank, to = target, bytes = payload.len(), "send");

        let sender = self.peers[target]
            .as_ref()
            .ok_or(TransferError::SelfTransfer(self.rank))?;
        sender
            .send(payload)
            .map_err(|_| TransferError::Disconnected { rank: target })
    }

    fn receive(&mut self, source: usize) -> Result<Vec<u8>, TransferError> {
        self.check_peer(source)?;

        let inbox = self.inboxes[source]
            .as_ref()
            .ok_or(TransferError::SelfTransfer(self.rank))?;
        let payload = inbox
            .recv()
            .map_err(|_| TransferError::Disconnected { rank: source })?;

        trace!(at = self.rank, from = source, bytes = payload.len(), "receive");
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_send_receive_pair() {
        let mut group = form_group(2);
        let mut rank1 = group.pop().unwrap();
        let mut rank0 = group.pop().unwrap();

        rank0.send(1, vec![1, 2, 3]).unwrap();
        assert_eq!(rank1.receive(0).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_fifo_per_pair() {
        let mut group = form_group(2);
        let mut rank1 = group.pop().unwrap();
        let mut rank0 = group.pop().unwrap();

        rank0.send(1, vec![1]).unwrap();
        rank0.send(1, vec![2]).unwrap();

        assert_eq!(rank1.receive(0).unwrap(), vec![1]);
        assert_eq!(rank1.receive(0).unwrap(), vec![2]);
    }

    #[test]
    fn test_pairs_are_independent() {
        // Rank 2's payload arrives first but waits in its own queue while
        // rank 0 drains rank 1's queue.
        let mut group = form_group(3);
        let mut rank2 = group.pop().unwrap();
        let mut rank1 = group.pop().unwrap();
        let mut rank0 = group.pop().unwrap();

        rank2.send(0, vec![22]).unwrap();
        rank1.send(0, vec![11]).unwrap();

        assert_eq!(rank0.receive(1).unwrap(), vec![11]);
        assert_eq!(rank0.receive(2).unwrap(), vec![22]);
    }

    #[test]
    fn test_receive_blocks_until_delivery() {
        let mut group = form_group(2);
        let mut rank1 = group.pop().unwrap();
        let mut rank0 = group.pop().unwrap();

        let sender = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            rank1.send(0, vec![9]).unwrap();
        });

        // Blocks across the sender's sleep, then completes.
        assert_eq!(rank0.receive(1).unwrap(), vec![9]);
        sender.join().unwrap();
    }

    #[test]
    fn test_invalid_peer() {
        let mut group = form_group(2);
        let mut rank0 = group.remove(0);

        assert!(matches!(
            rank0.send(5, vec![]),
            Err(TransferError::InvalidPeer {
                rank: 5,
                group_size: 2
            })
        ));
        assert!(matches!(
            rank0.receive(5),
            Err(TransferError::InvalidPeer { .. })
        ));
    }

    #[test]
    fn test_self_transfer_rejected() {
        let mut group = form_group(2);
        let mut rank0 = group.remove(0);

        assert!(matches!(
            rank0.send(0, vec![]),
            Err(TransferError::SelfTransfer(0))
        ));
        assert!(matches!(
            rank0.receive(0),
            Err(TransferError::SelfTransfer(0))
        ));
    }

    #[test]
    fn test_dropped_peer_disconnects() {
        let mut group = form_group(2);
        let rank1 = group.pop().unwrap();
        let mut rank0 = group.pop().unwrap();

        drop(rank1);

        assert!(matches!(
            rank0.receive(1),
            Err(TransferError::Disconnected { rank: 1 })
        ));
        assert!(matches!(
            rank0.send(1, vec![1]),
            Err(TransferError::Disconnected { rank: 1 })
        ));
    }
}
