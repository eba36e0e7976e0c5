use std::fmt;
use std::str::FromStr;

use crate::shared::constants::{MAX_TENSOR_RANK, MAX_TENSOR_SLOTS};
use crate::shared::error::SchemaError;

/// Element type of a tensor slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TensorType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float16,
    Float32,
    Float64,
}

impl TensorType {
    pub fn element_size(self) -> usize {
        match self {
            TensorType::Int8 | TensorType::Uint8 => 1,
            TensorType::Int16 | TensorType::Uint16 | TensorType::Float16 => 2,
            TensorType::Int32 | TensorType::Uint32 | TensorType::Float32 => 4,
            TensorType::Int64 | TensorType::Uint64 | TensorType::Float64 => 8,
        }
    }
}

impl FromStr for TensorType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "int8" => Ok(TensorType::Int8),
            "uint8" => Ok(TensorType::Uint8),
            "int16" => Ok(TensorType::Int16),
            "uint16" => Ok(TensorType::Uint16),
            "int32" => Ok(TensorType::Int32),
            "uint32" => Ok(TensorType::Uint32),
            "int64" => Ok(TensorType::Int64),
            "uint64" => Ok(TensorType::Uint64),
            "float16" => Ok(TensorType::Float16),
            "float32" => Ok(TensorType::Float32),
            "float64" => Ok(TensorType::Float64),
            other => Err(SchemaError::malformed(format!(
                "unknown tensor type \"{other}\""
            ))),
        }
    }
}

impl fmt::Display for TensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TensorType::Int8 => "int8",
            TensorType::Uint8 => "uint8",
            TensorType::Int16 => "int16",
            TensorType::Uint16 => "uint16",
            TensorType::Int32 => "int32",
            TensorType::Uint32 => "uint32",
            TensorType::Int64 => "int64",
            TensorType::Uint64 => "uint64",
            TensorType::Float16 => "float16",
            TensorType::Float32 => "float32",
            TensorType::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// One tensor slot: element type plus shape (innermost dimension first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorInfo {
    pub tensor_type: TensorType,
    pub dims: Vec<usize>,
}

impl TensorInfo {
    /// Byte size of one slot, or an error if it overflows `usize`.
    pub fn size(&self) -> Result<usize, SchemaError> {
        self.dims
            .iter()
            .try_fold(self.tensor_type.element_size(), |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| SchemaError::malformed(format!("tensor {self} is too large")))
    }
}

impl fmt::Display for TensorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(usize::to_string).collect();
        write!(f, "{}[{}]", self.tensor_type, dims.join(":"))
    }
}

/// Parses the `dimensions` and `types` fields of a tensors caps.
///
/// Slots are separated by `,` or `.`; dimensions within a slot by `:`.
pub fn parse_tensor_infos(dimensions: &str, types: &str) -> Result<Vec<TensorInfo>, SchemaError> {
    let dims = split_slots(dimensions);
    let types = split_slots(types);

    if dims.is_empty() {
        return Err(SchemaError::malformed("tensors caps has no dimensions"));
    }
    if dims.len() != types.len() {
        return Err(SchemaError::malformed(format!(
            "{} tensor dimensions but {} tensor types",
            dims.len(),
            types.len()
        )));
    }
    if dims.len() > MAX_TENSOR_SLOTS {
        return Err(SchemaError::malformed(format!(
            "{} tensors exceeds the limit of {MAX_TENSOR_SLOTS}",
            dims.len()
        )));
    }

    dims.into_iter()
        .zip(types)
        .map(|(dim, ty)| {
            Ok(TensorInfo {
                tensor_type: ty.parse()?,
                dims: parse_dims(dim)?,
            })
        })
        .collect()
}

fn split_slots(field: &str) -> Vec<&str> {
    field
        .split([',', '.'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_dims(dim: &str) -> Result<Vec<usize>, SchemaError> {
    let dims = dim
        .split(':')
        .map(|d| match d.trim().parse::<usize>() {
            Ok(v) if v > 0 => Ok(v),
            _ => Err(SchemaError::malformed(format!(
                "invalid tensor dimension \"{d}\" in \"{dim}\""
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    if dims.len() > MAX_TENSOR_RANK {
        return Err(SchemaError::malformed(format!(
            "tensor rank {} exceeds the limit of {MAX_TENSOR_RANK}",
            dims.len()
        )));
    }
    Ok(dims)
}
