// Copyright (c) 2025 Pocketbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Lifecycle managers: the library API an outer HTTP or CLI layer calls.
//! Every function takes the owning user's id and scopes each query by it.

pub mod budgets;
pub mod categories;
pub mod transactions;
pub mod users;
