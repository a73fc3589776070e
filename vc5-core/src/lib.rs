// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared byte/bit I/O primitives and error taxonomy for the VC-5 codec crates.

pub mod error;
pub mod io;
