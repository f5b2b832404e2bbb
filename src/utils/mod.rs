// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 apiflow contributors

//! Utility modules
//!
//! Common utilities for the apiflow CLI.

pub mod colors;
pub mod fingerprint;

pub use colors::*;
pub use fingerprint::*;
