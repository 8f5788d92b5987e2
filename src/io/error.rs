// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL codec errors

use thiserror::Error;

/// Errors reported by the strict codec entry points
#[derive(Debug, Error)]
pub enum StlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("binary STL truncated: expected {expected} bytes, got {got}")]
    Truncated { expected: u64, got: u64 },

    #[error("unexpected end of file inside a facet (line {line})")]
    UnexpectedEof { line: usize },

    #[error("line {line}: expected `{expected}`, found `{found}`")]
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        found: String,
    },

    #[error("line {line}: invalid number `{token}`")]
    InvalidNumber { line: usize, token: String },

    #[error("{count} triangles exceed the binary STL limit of u32::MAX")]
    TooManyTriangles { count: usize },
}

pub type StlResult<T> = Result<T, StlError>;
