// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary codec.
//!
//! # Wire layout
//!
//! ```text
//! +-------------------+---------+---------+-----+---------+
//! | u32 LE version ix | field 0 | field 1 | ... | field N |
//! +-------------------+---------+---------+-----+---------+
//! ```
//!
//! Fields follow declaration order with no names, tags or padding:
//!
//! | Field type     | Encoding                                     |
//! |----------------|----------------------------------------------|
//! | bool           | 1 byte, 0 or 1                               |
//! | integers/float | little-endian, natural width                 |
//! | enum           | underlying integer width                     |
//! | string         | u32 LE byte length + UTF-8                   |
//! | fixed string   | exactly N bytes, truncated or zero-padded    |
//! | struct         | nested fields, no header                     |

mod io;
mod reader;
mod writer;

pub use io::{ByteSink, ByteSource, IoSink, IoSource, SliceSource};
pub use reader::{decode, decode_from, Decoded};
pub use writer::{encode, encode_into};
