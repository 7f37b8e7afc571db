// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Typed decoding of raw tensor payloads into JSON values.
//!
//! Fixed-width elements are read from bounds-checked sub-slices in host byte
//! order. `BYTES` and `JSON` payloads are not split into elements; the whole
//! buffer becomes one string.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::DecodeError;
use crate::types::TensorPayload;

/// Declared scalar type of a tensor's raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Fp32,
    Fp64,
    Bytes,
    Json,
}

impl ElementType {
    /// Width of one element in bytes, `None` for the variable-length types.
    pub fn byte_width(self) -> Option<usize> {
        match self {
            ElementType::Bool | ElementType::Uint8 | ElementType::Int8 => Some(1),
            ElementType::Uint16 | ElementType::Int16 => Some(2),
            ElementType::Uint32 | ElementType::Int32 | ElementType::Fp32 => Some(4),
            ElementType::Uint64 | ElementType::Int64 | ElementType::Fp64 => Some(8),
            ElementType::Bytes | ElementType::Json => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Bool => "BOOL",
            ElementType::Uint8 => "UINT8",
            ElementType::Uint16 => "UINT16",
            ElementType::Uint32 => "UINT32",
            ElementType::Uint64 => "UINT64",
            ElementType::Int8 => "INT8",
            ElementType::Int16 => "INT16",
            ElementType::Int32 => "INT32",
            ElementType::Int64 => "INT64",
            ElementType::Fp32 => "FP32",
            ElementType::Fp64 => "FP64",
            ElementType::Bytes => "BYTES",
            ElementType::Json => "JSON",
        }
    }
}

impl FromStr for ElementType {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOL" => Ok(ElementType::Bool),
            "UINT8" => Ok(ElementType::Uint8),
            "UINT16" => Ok(ElementType::Uint16),
            "UINT32" => Ok(ElementType::Uint32),
            "UINT64" => Ok(ElementType::Uint64),
            "INT8" => Ok(ElementType::Int8),
            "INT16" => Ok(ElementType::Int16),
            "INT32" => Ok(ElementType::Int32),
            "INT64" => Ok(ElementType::Int64),
            "FP32" => Ok(ElementType::Fp32),
            "FP64" => Ok(ElementType::Fp64),
            "BYTES" => Ok(ElementType::Bytes),
            "JSON" => Ok(ElementType::Json),
            other => Err(DecodeError::UnsupportedType {
                tag: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copy element `index` of width `N` out of `buf`.
fn read<const N: usize>(buf: &[u8], index: usize) -> Result<[u8; N], DecodeError> {
    let out_of_bounds = || DecodeError::OutOfBounds {
        index,
        width: N,
        len: buf.len(),
    };
    let start = index.checked_mul(N).ok_or_else(out_of_bounds)?;
    let end = start.checked_add(N).ok_or_else(out_of_bounds)?;
    buf.get(start..end)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(out_of_bounds)
}

fn opaque_text(buf: &[u8]) -> Value {
    Value::String(String::from_utf8_lossy(buf).into_owned())
}

/// Decode the element at `index` of a payload into one JSON value.
///
/// An empty buffer yields `""` whatever the declared type.
pub fn decode_element(payload: &TensorPayload, index: usize) -> Result<Value, DecodeError> {
    let buf = payload.raw_bytes.as_slice();
    if buf.is_empty() {
        return Ok(Value::String(String::new()));
    }

    let element_type: ElementType = payload.element_type.parse()?;
    let value = match element_type {
        ElementType::Bool => Value::Bool(read::<1>(buf, index)?[0] != 0),
        ElementType::Uint8 => Value::from(u8::from_ne_bytes(read(buf, index)?)),
        ElementType::Uint16 => Value::from(u16::from_ne_bytes(read(buf, index)?)),
        ElementType::Uint32 => Value::from(u32::from_ne_bytes(read(buf, index)?)),
        ElementType::Uint64 => Value::from(u64::from_ne_bytes(read(buf, index)?)),
        ElementType::Int8 => Value::from(i8::from_ne_bytes(read(buf, index)?)),
        ElementType::Int16 => Value::from(i16::from_ne_bytes(read(buf, index)?)),
        ElementType::Int32 => Value::from(i32::from_ne_bytes(read(buf, index)?)),
        ElementType::Int64 => Value::from(i64::from_ne_bytes(read(buf, index)?)),
        // Non-finite floats become null.
        ElementType::Fp32 => Value::from(f32::from_ne_bytes(read(buf, index)?)),
        ElementType::Fp64 => Value::from(f64::from_ne_bytes(read(buf, index)?)),
        ElementType::Bytes | ElementType::Json => opaque_text(buf),
    };
    Ok(value)
}

/// Number of values a payload expands to.
pub fn element_count(payload: &TensorPayload) -> Result<usize, DecodeError> {
    let element_type: ElementType = payload.element_type.parse()?;
    Ok(match element_type.byte_width() {
        Some(width) => payload.raw_bytes.len() / width,
        None => 1,
    })
}

/// Decode a whole payload: a bare scalar for a single element, an array in
/// index order otherwise.
///
/// Elements that fail to decode are logged and left out of the array. An error
/// is returned only when the payload as a whole yields nothing.
pub fn decode_tensor(payload: &TensorPayload) -> Result<Value, DecodeError> {
    if payload.raw_bytes.is_empty() {
        return Ok(Value::String(String::new()));
    }

    let element_type: ElementType = payload.element_type.parse()?;
    let Some(width) = element_type.byte_width() else {
        return decode_element(payload, 0);
    };

    let count = payload.raw_bytes.len() / width;
    if count > 0 && payload.raw_bytes.len() % width != 0 {
        if let Err(e) = decode_element(payload, count) {
            tracing::warn!(
                error = %e,
                element_type = %element_type,
                "Ignoring trailing partial tensor element"
            );
        }
    }

    if count <= 1 {
        return decode_element(payload, 0);
    }

    let mut values = Vec::with_capacity(count);
    for index in 0..count {
        match decode_element(payload, index) {
            Ok(value) => values.push(value),
            Err(e) => tracing::warn!(error = %e, index, "Skipping tensor element"),
        }
    }
    Ok(Value::Array(values))
}
