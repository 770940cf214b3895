//! `FrameQueue` — cooperative, single-threaded frame scheduling.
//!
//! # Model
//!
//! Animated components never loop on their own.  Each one asks a
//! [`FrameScheduler`] for the next frame and receives a [`FrameToken`].  The
//! host's event loop drains one frame worth of tokens and hands each back to
//! its owner, which does its work and (if still running) requests the next
//! frame.  A component therefore has at most one frame in flight.
//!
//! Cancellation has two layers: [`FrameScheduler::cancel_frame`] removes a
//! token that has not been drained yet, and owners compare every delivered
//! token with the one they are waiting for, so a token that was already
//! drained before a `stop()` is ignored on delivery.
//!
//! Tokens requested *during* dispatch land in the next frame, never the one
//! being drained.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::SimulationId;

/// Proof of a frame request, returned to the owner on dispatch.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct FrameToken {
    /// The component that requested the frame.
    pub owner: SimulationId,
    /// Queue-unique sequence number.
    pub seq: u64,
}

/// Something that can schedule "call me on the next frame" requests.
pub trait FrameScheduler {
    /// Schedule a frame for `owner`.
    fn request_frame(&mut self, owner: SimulationId) -> FrameToken;

    /// Withdraw a pending request.  Returns `false` if the token was not
    /// pending (already drained or never issued).
    fn cancel_frame(&mut self, token: FrameToken) -> bool;
}

/// Shared scheduler handle for components living on the same event loop.
impl<S: FrameScheduler> FrameScheduler for Rc<RefCell<S>> {
    fn request_frame(&mut self, owner: SimulationId) -> FrameToken {
        self.borrow_mut().request_frame(owner)
    }

    fn cancel_frame(&mut self, token: FrameToken) -> bool {
        self.borrow_mut().cancel_frame(token)
    }
}

/// FIFO frame queue driven by the host loop.
#[derive(Default, Debug)]
pub struct FrameQueue {
    pending:  VecDeque<FrameToken>,
    next_seq: u64,
    /// Number of frames drained so far.
    frames:   u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every token pending at this instant.  Requests made while the
    /// caller dispatches the returned tokens are left for the next call.
    pub fn drain_frame(&mut self) -> Vec<FrameToken> {
        self.frames += 1;
        self.pending.drain(..).collect()
    }

    /// `true` if `token` is still waiting to be drained.
    pub fn is_pending(&self, token: FrameToken) -> bool {
        self.pending.contains(&token)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Frames drained since construction.
    pub fn frames_drained(&self) -> u64 {
        self.frames
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self, owner: SimulationId) -> FrameToken {
        let token = FrameToken { owner, seq: self.next_seq };
        self.next_seq += 1;
        self.pending.push_back(token);
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) -> bool {
        match self.pending.iter().position(|t| *t == token) {
            Some(i) => {
                self.pending.remove(i);
                true
            }
            None => false,
        }
    }
}
