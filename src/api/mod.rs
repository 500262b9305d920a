// SPDX-License-Identifier: Apache-2.0
pub mod consumers;
pub mod metrics;
pub mod producers;
pub mod routes;
pub mod server;
pub mod state;
pub mod topics;
