// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # SPIR-V Reflection
//!
//! Walks compiled shader bytecode and keeps only what is needed to build Vulkan binding state:
//!
//! - the entry stage
//! - which descriptor bindings are occupied, and by what kind of descriptor
//! - whether push constants are used
//! - the compute work-group size
//!
//! This is not a validator.  Anything the walker does not recognize is skipped.  Anything it does
//! recognize but cannot model (a second entry point, a descriptor set other than 0, binding 32 and
//! up) is an error.
//!
//! ```ignore
//! let metadata = hevk_spirv::ShaderMetadata::from_words(&words)?;
//! assert_eq!(metadata.stage, hevk_spirv::ShaderStage::Compute);
//! ```

#[cfg(any(test, feature = "assembler"))]
pub mod assembler;
pub mod metadata;
pub mod spv;
pub mod walker;

pub use metadata::{DescriptorKind, MAX_BINDINGS, ShaderMetadata, ShaderStage};
pub use walker::{IdKind, IdRecord, Module, StorageClass, decode_op};

pub mod prelude {
    pub use super::ReflectError;
    pub use crate::metadata::{DescriptorKind, MAX_BINDINGS, ShaderMetadata, ShaderStage};
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    // Malformed input.  The bytes are not a module this walker can read.
    #[error("bad magic number: {0:#010x}")]
    BadMagic(u32),
    #[error("module too short for a header: {0} words")]
    TruncatedHeader(usize),
    #[error("byte length is not a multiple of 4: {0} bytes")]
    UnalignedLength(usize),
    #[error("zero-length instruction at word {offset}")]
    ZeroLength { offset: usize },
    #[error("instruction at word {offset} overruns the module by {excess} words")]
    Overrun { offset: usize, excess: usize },
    #[error("opcode {opcode} at word {offset} is missing operands")]
    MissingOperands { opcode: u16, offset: usize },
    #[error("id {id} is outside the declared bound {bound}")]
    IdOutOfBounds { id: u32, bound: u32 },
    #[error("id {0} is defined more than once")]
    DuplicateDefinition(u32),
    #[error("more than one entry point")]
    MultipleEntryPoints,
    #[error("no entry point")]
    MissingEntryPoint,
    #[error("unsupported execution model {0}")]
    UnsupportedExecutionModel(u32),
    #[error("constant {0} is wider than 32 bits")]
    UnsupportedConstantWidth(u32),

    // Binding model violations.  The module is fine, the shader asks for more than we model.
    #[error("resource {id} is in descriptor set {set}, only set 0 is supported")]
    NonZeroSet { id: u32, set: u32 },
    #[error("resource {id} uses binding {binding}, bindings must be below {}", MAX_BINDINGS)]
    BindingOutOfRange { id: u32, binding: u32 },
    #[error("resource {id} does not have a pointer type")]
    NotAPointer { id: u32 },
    #[error("resource {id} has no supported descriptor type")]
    UnsupportedResource { id: u32 },
    #[error("binding {binding} is declared as both {first} and {second}")]
    KindConflict {
        binding: u32,
        first: DescriptorKind,
        second: DescriptorKind,
    },
    #[error("local size id {0} is not a constant")]
    LocalSizeNotConstant(u32),
    #[error("{stage} shader has an empty work-group size {size:?}")]
    ZeroLocalSize { stage: ShaderStage, size: [u32; 3] },
}

impl ReflectError {
    /// True when the bytes themselves are broken, as opposed to a valid shader that breaks the
    /// single-set binding model.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::BadMagic(_)
                | Self::TruncatedHeader(_)
                | Self::UnalignedLength(_)
                | Self::ZeroLength { .. }
                | Self::Overrun { .. }
                | Self::MissingOperands { .. }
                | Self::IdOutOfBounds { .. }
                | Self::DuplicateDefinition(_)
                | Self::MultipleEntryPoints
                | Self::MissingEntryPoint
                | Self::UnsupportedExecutionModel(_)
                | Self::UnsupportedConstantWidth(_)
        )
    }
}

/// Convert a byte stream into words.  Modules written in the other byte order are detected by their
/// magic number and swapped.
pub fn words_from_bytes(bytes: &[u8]) -> Result<Vec<u32>, ReflectError> {
    if bytes.len() % size_of::<u32>() != 0 {
        return Err(ReflectError::UnalignedLength(bytes.len()));
    }

    // Copies, the byte buffer is not necessarily word aligned.
    let mut words: Vec<u32> = bytemuck::pod_collect_to_vec(bytes);
    if words.first() == Some(&spv::MAGIC.swap_bytes()) {
        words.iter_mut().for_each(|w| *w = w.swap_bytes());
    }
    Ok(words)
}
