// SPDX-License-Identifier: Apache-2.0
pub mod modes;
pub mod requests;
