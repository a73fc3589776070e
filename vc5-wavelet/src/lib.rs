// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Component arrays and the two-level separable wavelet transform for the VC-5 codec.

pub mod component;
pub mod forward;
pub mod inverse;
pub mod wavelet;
