// SPDX-License-Identifier: Apache-2.0

//! Small helpers shared across the crate.

pub mod array;
pub mod parser;
