// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Tubeclip Team

//! CLI support for the tubeclip binary

pub mod reporter;

pub use reporter::{parse_vector, Reporter};
