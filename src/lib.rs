// Copyright 2025 TBC.TXT
// SPDX-License-Identifier: Apache-2.0

//! TBC.TXT API: game reference data and a Warcraft Logs gear proxy.

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod model;
pub mod reference;
pub mod upstream;

pub use api::{router, AppState};
