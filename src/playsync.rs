// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::sync::Arc;

use tokio::sync::watch;

/// Represents the current cancel state.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CancelState {
    Untouched,
    Cancelled,
}

/// A cancel handle is shared between the owner of a running task and the
/// task itself. It's the task's responsibility to respect a cancel request,
/// which it can do by selecting on `cancelled()` at each suspension point.
#[derive(Clone)]
pub struct CancelHandle {
    state: Arc<watch::Sender<CancelState>>,
}

impl CancelHandle {
    /// Creates a new cancel handle.
    pub fn new() -> CancelHandle {
        let (state, _) = watch::channel(CancelState::Untouched);
        CancelHandle {
            state: Arc::new(state),
        }
    }

    /// Returns true if the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow() == CancelState::Cancelled
    }

    /// Completes once the handle is cancelled. Returns immediately if it
    /// already was.
    pub async fn cancelled(&self) {
        let mut receiver = self.state.subscribe();
        // Only fails if the sender is dropped, and self holds it.
        let _ = receiver
            .wait_for(|state| *state == CancelState::Cancelled)
            .await;
    }

    /// Cancels the task. Cancelling twice has no further effect.
    pub fn cancel(&self) {
        self.state.send_if_modified(|state| {
            if *state == CancelState::Untouched {
                *state = CancelState::Cancelled;
                true
            } else {
                false
            }
        });
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        CancelHandle::new()
    }
}
