// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for the contact relay.
//!
//! Builds routers wired to a recording mailer and simulates abusive
//! submission patterns against them.

#![allow(dead_code)]

pub mod attacks;
pub mod generators;
pub mod metrics;
