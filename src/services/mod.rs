// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

pub mod dashboard;
pub mod exchange;
pub mod notify;
pub mod session;
