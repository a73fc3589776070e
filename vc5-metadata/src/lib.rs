// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The VC-5 metadata tuple framework: binary tuple trees, base64 special-tag encodings, and
//! XML round-tripping.

pub mod base64;
pub mod chunk;
pub mod dedupe;
pub mod special;
pub mod tuple;
pub mod xml;
