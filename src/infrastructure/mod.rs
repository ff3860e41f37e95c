// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 BIT Access contributors

pub mod contracts;
pub mod network;
pub mod storage;
