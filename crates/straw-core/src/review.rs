//! Review / confirm flow
//!
//! Submitting a valid configuration asks the renderer for a snapshot and
//! opens the order summary when it arrives or when the wait times out,
//! whichever happens first. Confirming shows a success state and resets the
//! configuration after a short delay.
//!
//! Times are seconds on the caller's clock (egui input time). Deadlines are
//! checked by [`ReviewFlow::tick`] once per frame.

use crate::constants::{CONFIRM_DELAY_SECS, SNAPSHOT_TIMEOUT_SECS};
use crate::snapshot::SnapshotImage;

/// Identifies one snapshot request, so stale results can be told apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureRequest(pub u64);

/// State of the review flow
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReviewState {
    #[default]
    Editing,
    /// Waiting for the renderer's snapshot
    AwaitingSnapshot {
        request: CaptureRequest,
        deadline: f64,
    },
    /// Order summary is open
    Reviewing { snapshot: Option<SnapshotImage> },
    /// Order confirmed; configuration resets at `reset_at`
    Confirming {
        snapshot: Option<SnapshotImage>,
        reset_at: f64,
    },
}

/// What the caller must do after [`ReviewFlow::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewTick {
    Idle,
    /// The snapshot wait timed out; the summary opened without an image
    SnapshotTimedOut,
    /// The confirmation delay elapsed; reset the configuration to defaults
    ResetConfiguration,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFlow {
    state: ReviewState,
    next_request: u64,
}

impl ReviewFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ReviewState {
        &self.state
    }

    /// Whether the order summary window should be shown
    pub fn is_summary_open(&self) -> bool {
        matches!(
            self.state,
            ReviewState::Reviewing { .. } | ReviewState::Confirming { .. }
        )
    }

    pub fn is_awaiting_snapshot(&self) -> bool {
        matches!(self.state, ReviewState::AwaitingSnapshot { .. })
    }

    pub fn is_confirming(&self) -> bool {
        matches!(self.state, ReviewState::Confirming { .. })
    }

    /// Snapshot shown in the summary, if any
    pub fn snapshot(&self) -> Option<&SnapshotImage> {
        match &self.state {
            ReviewState::Reviewing { snapshot } | ReviewState::Confirming { snapshot, .. } => {
                snapshot.as_ref()
            }
            _ => None,
        }
    }

    /// Start a review.
    ///
    /// Returns the capture to perform, or `None` when no capture is needed:
    /// either snapshots are unavailable (the summary opens right away without
    /// an image) or a review is already in progress (the request is ignored).
    pub fn request_review(&mut self, now: f64, snapshots_available: bool) -> Option<CaptureRequest> {
        if !matches!(self.state, ReviewState::Editing) {
            tracing::debug!("Review already in progress, ignoring request");
            return None;
        }

        if !snapshots_available {
            tracing::info!("Snapshots unavailable, reviewing without image");
            self.state = ReviewState::Reviewing { snapshot: None };
            return None;
        }

        let request = CaptureRequest(self.next_request);
        self.next_request += 1;
        self.state = ReviewState::AwaitingSnapshot {
            request,
            deadline: now + SNAPSHOT_TIMEOUT_SECS,
        };
        Some(request)
    }

    /// Deliver the outcome of a capture. Returns whether it was accepted;
    /// results for anything but the pending request are dropped.
    pub fn resolve_snapshot(
        &mut self,
        request: CaptureRequest,
        snapshot: Option<SnapshotImage>,
    ) -> bool {
        match self.state {
            ReviewState::AwaitingSnapshot { request: pending, .. } if pending == request => {
                if snapshot.is_none() {
                    tracing::warn!("Snapshot capture failed, reviewing without image");
                }
                self.state = ReviewState::Reviewing { snapshot };
                true
            }
            _ => {
                tracing::debug!("Dropping late snapshot for request {}", request.0);
                false
            }
        }
    }

    /// Advance deadlines
    pub fn tick(&mut self, now: f64) -> ReviewTick {
        match self.state {
            ReviewState::AwaitingSnapshot { deadline, .. } if now >= deadline => {
                tracing::warn!("Snapshot timed out, reviewing without image");
                self.state = ReviewState::Reviewing { snapshot: None };
                ReviewTick::SnapshotTimedOut
            }
            ReviewState::Confirming { reset_at, .. } if now >= reset_at => {
                self.state = ReviewState::Editing;
                ReviewTick::ResetConfiguration
            }
            _ => ReviewTick::Idle,
        }
    }

    /// Confirm the order from the summary. Returns whether the flow moved
    /// into the confirming state.
    pub fn confirm(&mut self, now: f64) -> bool {
        let ReviewState::Reviewing { snapshot } = &mut self.state else {
            return false;
        };
        let snapshot = snapshot.take();
        tracing::info!("Order confirmed");
        self.state = ReviewState::Confirming {
            snapshot,
            reset_at: now + CONFIRM_DELAY_SECS,
        };
        true
    }

    /// Close the summary and go back to editing, keeping the configuration.
    /// A pending confirmation is not interrupted.
    pub fn close(&mut self) {
        if matches!(self.state, ReviewState::Reviewing { .. }) {
            self.state = ReviewState::Editing;
        }
    }
}
