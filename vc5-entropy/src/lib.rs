// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Companding, quantization, codebook, and variable-length entropy coding for VC-5 subbands.

pub mod band;
pub mod codebook;
pub mod companding;
pub mod quant;
pub mod vlc;
