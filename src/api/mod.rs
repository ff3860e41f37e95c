// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

//! Backend HTTP surface used by the browser dashboard.

pub mod metrics;
pub mod server;

pub use server::{AppState, router, spawn_server};
