// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// The two kinds of workers a registry can own
#[derive(Serialize, Deserialize, Display, Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WorkerKind {
    Producer,
    Consumer,
}

/// Producer delivery acknowledgment strategy.
/// A closed set: unknown modes are rejected at the HTTP boundary,
/// so the send loop never sees an invalid one.
#[derive(Serialize, Deserialize, Display, EnumString, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DeliveryMode {

    /// Publish and block until the broker confirms delivery
    #[serde(rename = "synchronous")]
    #[strum(serialize = "synchronous")]
    Synchronous,

    /// Publish with a delivery callback that logs success/failure
    #[serde(rename = "asynchronous")]
    #[strum(serialize = "asynchronous")]
    Asynchronous,

    /// Publish without waiting for an acknowledgment
    #[serde(rename = "fire-and-forget")]
    #[strum(serialize = "fire-and-forget")]
    FireAndForget,
}

/// The job kinds the downstream API supports.
/// A closed set: an unknown kind is a validation error at the boundary.
#[derive(Serialize, Deserialize, Display, EnumString, Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum JobType {
    Sync,
    Reset,
    Refresh,
    Clear,
}
