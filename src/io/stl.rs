// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL codec (binary and ASCII)
//!
//! # Binary layout
//!
//! ```text
//! UINT8[80]    header, content unconstrained
//! UINT32       triangle count (little-endian)
//! foreach triangle
//!     REAL32[3]  normal
//!     REAL32[3]  vertex 0
//!     REAL32[3]  vertex 1
//!     REAL32[3]  vertex 2
//!     UINT16     attribute
//! end
//! ```
//!
//! # ASCII layout
//!
//! ```text
//! solid name
//!   facet normal nx ny nz
//!     outer loop
//!       vertex x y z
//!       vertex x y z
//!       vertex x y z
//!     endloop
//!   endfacet
//! endsolid name
//! ```
//!
//! # Format detection
//!
//! A buffer is binary when its length is exactly `84 + 50 * count`, where
//! `count` is the little-endian `u32` at offset 80. Anything else is parsed as
//! ASCII. The leading `solid` keyword is not consulted: binary headers may
//! start with it and some ASCII writers omit it.
//!
//! # Precision
//!
//! Binary round trips are bit-exact, including the attribute field. ASCII
//! numbers are written in shortest round-trip exponent form, which is at least
//! 6 significant digits and in practice reproduces the same `f32`. The
//! attribute field has no ASCII representation and reads back as 0.

use super::config::WriteOptions;
use super::error::{StlError, StlResult};
use crate::geometry::{Triangle, TriangleSoup, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

/// Size of the free-form binary header
pub const HEADER_SIZE: usize = 80;

/// Header plus the triangle count
pub const PREAMBLE_SIZE: usize = HEADER_SIZE + 4;

/// One binary triangle record: 12 floats and the attribute
pub const RECORD_SIZE: usize = 50;

/// STL encoding variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StlFormat {
    #[default]
    Binary,
    Ascii,
}

impl StlFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StlFormat::Binary => "binary",
            StlFormat::Ascii => "ascii",
        }
    }
}

impl fmt::Display for StlFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StlFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "binary" | "bin" => Ok(StlFormat::Binary),
            "ascii" | "text" => Ok(StlFormat::Ascii),
            other => Err(format!("unknown STL format `{other}` (expected binary or ascii)")),
        }
    }
}

/// Classify a buffer by its structure
pub fn detect_format(bytes: &[u8]) -> StlFormat {
    match declared_count(bytes) {
        Some(count) if bytes.len() as u64 == binary_size(count) => StlFormat::Binary,
        _ => StlFormat::Ascii,
    }
}

fn declared_count(bytes: &[u8]) -> Option<u32> {
    let count = bytes.get(HEADER_SIZE..PREAMBLE_SIZE)?;
    Some(u32::from_le_bytes([count[0], count[1], count[2], count[3]]))
}

fn binary_size(count: u32) -> u64 {
    PREAMBLE_SIZE as u64 + RECORD_SIZE as u64 * u64::from(count)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Read an STL file on a best-effort basis
///
/// Missing and unreadable files yield an empty soup. Malformed ASCII keeps
/// every facet parsed before the first error. Causes are logged at `warn`
/// level; use [`try_read`] to observe the error instead.
pub fn read<P: AsRef<Path>>(path: P) -> TriangleSoup {
    let path = path.as_ref();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("could not read STL {}: {}", path.display(), err);
            return Vec::new();
        }
    };

    let (triangles, error) = decode_partial(&bytes);
    if let Some(err) = error {
        log::warn!(
            "malformed STL {}, kept {} triangles: {}",
            path.display(),
            triangles.len(),
            err
        );
    }
    triangles
}

/// Read and decode an STL file, auto-detecting the format
pub fn try_read<P: AsRef<Path>>(path: P) -> StlResult<TriangleSoup> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Read an entire stream and decode it
pub fn read_from<R: Read>(mut reader: R) -> StlResult<TriangleSoup> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}

/// Write `triangles` to `path`; returns `false` if the file cannot be written
pub fn write<P: AsRef<Path>>(path: P, triangles: &[Triangle], format: StlFormat) -> bool {
    write_with(path, triangles, &WriteOptions::new(format))
}

/// [`write`] with explicit header and solid name
pub fn write_with<P: AsRef<Path>>(path: P, triangles: &[Triangle], options: &WriteOptions) -> bool {
    let path = path.as_ref();
    match try_write_with(path, triangles, options) {
        Ok(()) => true,
        Err(err) => {
            log::warn!("could not write STL {}: {}", path.display(), err);
            false
        }
    }
}

pub fn try_write<P: AsRef<Path>>(path: P, triangles: &[Triangle], format: StlFormat) -> StlResult<()> {
    try_write_with(path, triangles, &WriteOptions::new(format))
}

pub fn try_write_with<P: AsRef<Path>>(
    path: P,
    triangles: &[Triangle],
    options: &WriteOptions,
) -> StlResult<()> {
    if options.format == StlFormat::Binary {
        triangle_count(triangles)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer, triangles, options)?;
    writer.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode an in-memory STL, auto-detecting the format
pub fn decode(bytes: &[u8]) -> StlResult<TriangleSoup> {
    match decode_partial(bytes) {
        (triangles, None) => Ok(triangles),
        (_, Some(err)) => Err(err),
    }
}

/// Best-effort [`decode`]: the triangles recovered before the first error,
/// together with that error
///
/// Binary input is all-or-nothing; ASCII input keeps every complete facet
/// that precedes the error.
pub fn decode_partial(bytes: &[u8]) -> (TriangleSoup, Option<StlError>) {
    let format = detect_format(bytes);
    let (triangles, error) = match format {
        StlFormat::Binary => match decode_binary(bytes) {
            Ok(triangles) => (triangles, None),
            Err(err) => (Vec::new(), Some(err)),
        },
        StlFormat::Ascii => decode_ascii_partial(&String::from_utf8_lossy(bytes)),
    };
    log::debug!("decoded {} triangles from {} STL", triangles.len(), format);
    (triangles, error)
}

/// Decode a binary STL buffer
///
/// Bytes past the last declared record are ignored.
pub fn decode_binary(bytes: &[u8]) -> StlResult<TriangleSoup> {
    let count = declared_count(bytes).ok_or(StlError::Truncated {
        expected: PREAMBLE_SIZE as u64,
        got: bytes.len() as u64,
    })?;

    let expected = binary_size(count);
    if (bytes.len() as u64) < expected {
        return Err(StlError::Truncated {
            expected,
            got: bytes.len() as u64,
        });
    }

    Ok(bytes[PREAMBLE_SIZE..]
        .chunks_exact(RECORD_SIZE)
        .take(count as usize)
        .map(|record| Triangle {
            normal: read_vec3(record, 0),
            v0: read_vec3(record, 12),
            v1: read_vec3(record, 24),
            v2: read_vec3(record, 36),
            attribute: u16::from_le_bytes([record[48], record[49]]),
        })
        .collect())
}

fn read_vec3(buf: &[u8], offset: usize) -> Vec3 {
    Vec3::new(
        read_f32(buf, offset),
        read_f32(buf, offset + 4),
        read_f32(buf, offset + 8),
    )
}

fn read_f32(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

/// Decode ASCII STL text
///
/// Keywords are case-insensitive and tokens may be separated by any
/// whitespace. The rest of a `solid` or `endsolid` line is the solid name and
/// is skipped. A file may hold several `solid ... endsolid` blocks; their
/// facets are concatenated in file order.
pub fn decode_ascii(text: &str) -> StlResult<TriangleSoup> {
    match decode_ascii_partial(text) {
        (triangles, None) => Ok(triangles),
        (_, Some(err)) => Err(err),
    }
}

/// Best-effort [`decode_ascii`]: every facet parsed before the first error,
/// together with that error
pub fn decode_ascii_partial(text: &str) -> (TriangleSoup, Option<StlError>) {
    let mut tokens = Tokens::new(text);
    let mut triangles = Vec::new();

    while let Some(token) = tokens.next_token() {
        if token.eq_ignore_ascii_case("solid") || token.eq_ignore_ascii_case("endsolid") {
            tokens.skip_line();
        } else if token.eq_ignore_ascii_case("facet") {
            match parse_facet(&mut tokens) {
                Ok(triangle) => triangles.push(triangle),
                Err(err) => return (triangles, Some(err)),
            }
        } else {
            let err = StlError::UnexpectedToken {
                line: tokens.line,
                expected: "facet",
                found: truncate_token(token),
            };
            return (triangles, Some(err));
        }
    }

    (triangles, None)
}

fn parse_facet(tokens: &mut Tokens<'_>) -> StlResult<Triangle> {
    tokens.expect("normal")?;
    let normal = tokens.vec3()?;
    tokens.expect("outer")?;
    tokens.expect("loop")?;
    tokens.expect("vertex")?;
    let v0 = tokens.vec3()?;
    tokens.expect("vertex")?;
    let v1 = tokens.vec3()?;
    tokens.expect("vertex")?;
    let v2 = tokens.vec3()?;
    tokens.expect("endloop")?;
    tokens.expect("endfacet")?;
    Ok(Triangle::new(normal, v0, v1, v2))
}

/// Whitespace tokenizer that tracks line numbers
struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    current: std::str::SplitWhitespace<'a>,
    line: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            current: "".split_whitespace(),
            line: 0,
        }
    }

    fn next_token(&mut self) -> Option<&'a str> {
        loop {
            if let Some(token) = self.current.next() {
                return Some(token);
            }
            let (idx, line) = self.lines.next()?;
            self.line = idx + 1;
            self.current = line.split_whitespace();
        }
    }

    fn skip_line(&mut self) {
        self.current = "".split_whitespace();
    }

    fn expect(&mut self, keyword: &'static str) -> StlResult<()> {
        match self.next_token() {
            Some(token) if token.eq_ignore_ascii_case(keyword) => Ok(()),
            Some(token) => Err(StlError::UnexpectedToken {
                line: self.line,
                expected: keyword,
                found: truncate_token(token),
            }),
            None => Err(StlError::UnexpectedEof { line: self.line }),
        }
    }

    fn number(&mut self) -> StlResult<f32> {
        let token = self
            .next_token()
            .ok_or(StlError::UnexpectedEof { line: self.line })?;
        token.parse().map_err(|_| StlError::InvalidNumber {
            line: self.line,
            token: truncate_token(token),
        })
    }

    fn vec3(&mut self) -> StlResult<Vec3> {
        Ok(Vec3::new(self.number()?, self.number()?, self.number()?))
    }
}

// Garbage input can produce arbitrarily long tokens.
fn truncate_token(token: &str) -> String {
    token.chars().take(32).collect()
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode `triangles` in the format selected by `options`
pub fn encode<W: Write>(writer: W, triangles: &[Triangle], options: &WriteOptions) -> StlResult<()> {
    match options.format {
        StlFormat::Binary => encode_binary(writer, triangles, &options.header_bytes()),
        StlFormat::Ascii => encode_ascii(writer, triangles, &options.solid_name),
    }?;
    log::debug!("encoded {} triangles as {} STL", triangles.len(), options.format);
    Ok(())
}

/// Encode as binary STL with the given 80-byte header
pub fn encode_binary<W: Write>(
    mut writer: W,
    triangles: &[Triangle],
    header: &[u8; HEADER_SIZE],
) -> StlResult<()> {
    let count = triangle_count(triangles)?;
    writer.write_all(header)?;
    writer.write_all(&count.to_le_bytes())?;

    let mut record = [0u8; RECORD_SIZE];
    for triangle in triangles {
        for (slot, vector) in [triangle.normal, triangle.v0, triangle.v1, triangle.v2]
            .iter()
            .enumerate()
        {
            for (axis, value) in vector.iter().enumerate() {
                let offset = slot * 12 + axis * 4;
                record[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
            }
        }
        record[48..50].copy_from_slice(&triangle.attribute.to_le_bytes());
        writer.write_all(&record)?;
    }

    Ok(())
}

fn triangle_count(triangles: &[Triangle]) -> StlResult<u32> {
    u32::try_from(triangles.len()).map_err(|_| StlError::TooManyTriangles {
        count: triangles.len(),
    })
}

/// Encode as ASCII STL under `solid <name>`
///
/// Only the first line of `name` is used. The attribute field is not written.
pub fn encode_ascii<W: Write>(mut writer: W, triangles: &[Triangle], name: &str) -> StlResult<()> {
    let name = name.lines().next().unwrap_or("").trim();
    if name.is_empty() {
        writeln!(writer, "solid")?;
    } else {
        writeln!(writer, "solid {name}")?;
    }

    for triangle in triangles {
        let n = &triangle.normal;
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for v in triangle.vertices() {
            writeln!(writer, "      vertex {:e} {:e} {:e}", v.x, v.y, v.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    if name.is_empty() {
        writeln!(writer, "endsolid")?;
    } else {
        writeln!(writer, "endsolid {name}")?;
    }
    Ok(())
}
