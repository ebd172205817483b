use crate::{PeerId, UpdateSeq};

/// Outcome of presenting an ownership claim to an [`AuthorityRecord`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    Accepted,
    Rejected,
}

impl ClaimOutcome {
    pub fn is_accepted(self) -> bool {
        self == ClaimOutcome::Accepted
    }
}

/// Who may originate authoritative state for one entity.
///
/// `seq` counts fresh claims issued by owners; `update_seq` is the update
/// message that carried the claim we currently hold, and only orders
/// deliveries from that same owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorityRecord {
    pub owner: PeerId,
    pub seq: u32,
    pub update_seq: UpdateSeq,
}

impl AuthorityRecord {
    pub fn new(owner: PeerId, seq: u32, update_seq: UpdateSeq) -> Self {
        Self {
            owner,
            seq,
            update_seq,
        }
    }

    /// Arbitrate a remote claim. On acceptance the record becomes the claim;
    /// on rejection it is left untouched.
    ///
    /// A claim with the same owner and seq is a re-delivery: it is accepted
    /// only when it is not older than the message we already hold. Between
    /// different owners the higher seq wins, and on equal seq the lower peer
    /// id wins, so two concurrent claims converge in either arrival order.
    pub fn claim(
        &mut self,
        claimed_owner: PeerId,
        claimed_seq: u32,
        message_update_seq: UpdateSeq,
    ) -> ClaimOutcome {
        let accepted = if claimed_owner == self.owner && claimed_seq == self.seq {
            message_update_seq >= self.update_seq
        } else {
            claimed_seq > self.seq || (claimed_seq == self.seq && claimed_owner <= self.owner)
        };

        if !accepted {
            return ClaimOutcome::Rejected;
        }

        self.owner = claimed_owner;
        self.seq = claimed_seq;
        self.update_seq = message_update_seq;
        ClaimOutcome::Accepted
    }
}
