// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Vulkan
//!
//! Binding state that writes itself.  Shaders are reflected, their bindings merged, and the
//! layouts and update templates fall out the other end.  Nobody hand-writes a
//! `VkDescriptorSetLayoutBinding` again.
//!
//! Core types:
//!
//! - `VkContext`
//! - `Capabilities`
//! - `Shader`
//! - `BindingTable`
//! - `Program`
//!   * descriptor set layout
//!   * pipeline layout
//!   * update template
//! - **Shader inputs**
//!   * `DescriptorInfo`
//!     + `DescriptorRecord`
//!   * push constants

pub mod binding;
pub mod capabilities;
pub mod context;
pub mod descriptors;
pub mod pipeline;
pub mod program;
pub mod shader;
pub mod template;

use ash::vk;

use hevk_spirv::{DescriptorKind, MAX_BINDINGS, ReflectError, ShaderStage};

pub mod prelude {
    pub use super::VulkanError;
    pub use crate::binding::BindingTable;
    pub use crate::capabilities::Capabilities;
    pub use crate::context::VkContext;
    pub use crate::descriptors::{DescriptorInfo, DescriptorRecord};
    pub use crate::program::Program;
    pub use crate::shader::Shader;
}

#[derive(thiserror::Error, Debug)]
pub enum VulkanError {
    #[error("Ash: {0}")]
    Ash(#[from] vk::Result),

    #[error("Loading: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("Reflection: {0}")]
    Reflect(#[from] ReflectError),

    #[error("binding {binding} is {first} in one stage but {second} in the {stage} stage")]
    BindingConflict {
        binding: u32,
        first: DescriptorKind,
        second: DescriptorKind,
        stage: ShaderStage,
    },

    #[error("binding {binding} is out of range, bindings must be below {}", MAX_BINDINGS)]
    BindingRange { binding: u32 },

    #[error("expected {expected} descriptors, one per occupied binding, found {found}")]
    DescriptorCount { expected: usize, found: usize },

    #[error("binding {binding} needs a {kind} descriptor")]
    DescriptorMismatch { binding: u32, kind: DescriptorKind },

    #[error("push constant size {0} is not a multiple of 4")]
    PushConstantSize(u32),

    #[error("push constant size is non-zero but no stage uses push constants")]
    PushConstantsUnused,

    #[error("push constant data is {size} bytes, the range holds {capacity}")]
    PushConstantOverflow { size: usize, capacity: u32 },

    #[error("program has no push constant range")]
    NoPushConstants,

    #[error("push descriptors are not supported by this device")]
    PushDescriptorsUnsupported,

    #[error("program was built for push descriptors, not set updates")]
    TemplateMismatch,

    #[error("compute pipeline needs a compute shader, found {0}")]
    NotCompute(ShaderStage),

    #[error("graphics pipeline cannot contain a {0} shader")]
    NotGraphics(ShaderStage),

    #[error("no Vulkan device with a graphics and compute queue")]
    NoDevice,
}
