// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - STL decoding, encoding and writer configuration

mod config;
mod error;
mod stl;

pub use config::WriteOptions;
pub use error::{StlError, StlResult};
pub use stl::{
    decode, decode_ascii, decode_ascii_partial, decode_binary, decode_partial, detect_format, encode,
    encode_ascii, encode_binary, read, read_from, try_read, try_write, try_write_with, write,
    write_with, StlFormat, HEADER_SIZE, PREAMBLE_SIZE, RECORD_SIZE,
};
