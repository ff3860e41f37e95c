// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

pub mod data_path;
pub mod parsing;
pub mod retry;
pub mod ttl_cache;

// Shared aliases for frequently used modules.
pub use crate::domain::constants;
pub use crate::domain::error;
