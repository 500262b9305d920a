// SPDX-License-Identifier: Apache-2.0
pub mod consumer;
pub mod producer;
pub mod worker;

/// Outcome of a start command. A duplicate start is informational,
/// not an error, so the command surface stays idempotent.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StartStatus {
    Started,
    AlreadyRunning,
}

/// Outcome of a stop command. Stopping an absent id is a no-op.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StopStatus {
    Stopped,
    NotRunning,
}
