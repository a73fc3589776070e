// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The tag-value segment syntax, chunk framing, codec state, and the top-level encode/decode
//! pipelines that tie the wavelet transform, entropy codec, and metadata framework together into
//! one VC-5 bitstream.

pub mod chunk;
pub mod codec;
pub mod params;
pub mod segment;
pub mod state;
pub mod tag;
