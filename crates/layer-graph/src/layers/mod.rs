// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Built-in layer types.

mod coordinatewise;
mod input;
mod sum;

pub use coordinatewise::{Coordinatewise, Operation};
pub use input::Input;
pub use sum::Sum;
