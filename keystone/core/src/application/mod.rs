// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod domain_context;

pub use domain_context::DomainContext;
