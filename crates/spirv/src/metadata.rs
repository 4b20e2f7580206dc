// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Shader Metadata
//!
//! The per-shader summary that layouts are built from.  Derived from a walked [`Module`] by
//! resolving every descriptor-backed variable through its pointer type, and resolving work-group
//! size ids through their constants.

use std::collections::BTreeMap;
use std::fmt;

use ash::vk;

use crate::prelude::*;
use crate::spv;
use crate::walker::{IdKind, Module, StorageClass};

/// Bindings are numbered `0..MAX_BINDINGS` within the single descriptor set.
pub const MAX_BINDINGS: u32 = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    TessellationControl,
    TessellationEvaluation,
    Geometry,
    Fragment,
    Compute,
    Task,
    Mesh,
}

impl ShaderStage {
    /// NV and EXT task and mesh models share a stage.
    pub fn from_execution_model(model: u32) -> Option<Self> {
        Some(match model {
            spv::EXECUTION_MODEL_VERTEX => Self::Vertex,
            spv::EXECUTION_MODEL_TESSELLATION_CONTROL => Self::TessellationControl,
            spv::EXECUTION_MODEL_TESSELLATION_EVALUATION => Self::TessellationEvaluation,
            spv::EXECUTION_MODEL_GEOMETRY => Self::Geometry,
            spv::EXECUTION_MODEL_FRAGMENT => Self::Fragment,
            spv::EXECUTION_MODEL_GL_COMPUTE => Self::Compute,
            spv::EXECUTION_MODEL_TASK_NV | spv::EXECUTION_MODEL_TASK_EXT => Self::Task,
            spv::EXECUTION_MODEL_MESH_NV | spv::EXECUTION_MODEL_MESH_EXT => Self::Mesh,
            _ => return None,
        })
    }

    pub fn flags(self) -> vk::ShaderStageFlags {
        match self {
            Self::Vertex => vk::ShaderStageFlags::VERTEX,
            Self::TessellationControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
            Self::TessellationEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            Self::Geometry => vk::ShaderStageFlags::GEOMETRY,
            Self::Fragment => vk::ShaderStageFlags::FRAGMENT,
            Self::Compute => vk::ShaderStageFlags::COMPUTE,
            Self::Task => vk::ShaderStageFlags::TASK_EXT,
            Self::Mesh => vk::ShaderStageFlags::MESH_EXT,
        }
    }

    /// Stages that declare a work-group size.
    pub fn is_compute_family(self) -> bool {
        matches!(self, Self::Compute | Self::Task | Self::Mesh)
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::TessellationControl => "tessellation control",
            Self::TessellationEvaluation => "tessellation evaluation",
            Self::Geometry => "geometry",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
            Self::Task => "task",
            Self::Mesh => "mesh",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DescriptorKind {
    StorageBuffer,
    StorageImage,
    Sampler,
    CombinedImageSampler,
}

impl DescriptorKind {
    /// Map the pointee of a resource variable to the descriptor that backs it.
    pub fn from_pointee(kind: IdKind) -> Option<Self> {
        match kind {
            IdKind::TypeStruct => Some(Self::StorageBuffer),
            IdKind::TypeImage => Some(Self::StorageImage),
            IdKind::TypeSampler => Some(Self::Sampler),
            IdKind::TypeSampledImage => Some(Self::CombinedImageSampler),
            _ => None,
        }
    }

    pub fn descriptor_type(self) -> vk::DescriptorType {
        match self {
            Self::StorageBuffer => vk::DescriptorType::STORAGE_BUFFER,
            Self::StorageImage => vk::DescriptorType::STORAGE_IMAGE,
            Self::Sampler => vk::DescriptorType::SAMPLER,
            Self::CombinedImageSampler => vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StorageBuffer => "storage buffer",
            Self::StorageImage => "storage image",
            Self::Sampler => "sampler",
            Self::CombinedImageSampler => "combined image sampler",
        })
    }
}

/// Everything layout creation needs to know about one shader stage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderMetadata {
    pub stage: ShaderStage,
    /// Occupied bindings of set 0, in ascending order.
    pub resources: BTreeMap<u32, DescriptorKind>,
    pub uses_push_constants: bool,
    /// Work-group size.  Zeros outside the compute family.
    pub local_size: [u32; 3],
}

impl ShaderMetadata {
    pub fn from_words(words: &[u32]) -> Result<Self, ReflectError> {
        Self::from_module(&Module::parse(words)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ReflectError> {
        Self::from_words(&crate::words_from_bytes(bytes)?)
    }

    pub fn from_module(module: &Module) -> Result<Self, ReflectError> {
        let model = module
            .execution_model
            .ok_or(ReflectError::MissingEntryPoint)?;
        let stage = ShaderStage::from_execution_model(model)
            .ok_or(ReflectError::UnsupportedExecutionModel(model))?;

        let mut resources = BTreeMap::new();
        let mut uses_push_constants = false;

        for (id, record) in module.ids.iter().enumerate() {
            if record.kind != IdKind::Variable {
                continue;
            }
            let id = id as u32;

            match record.storage_class {
                Some(class) if class.is_descriptor() => {
                    if record.set != 0 {
                        return Err(ReflectError::NonZeroSet {
                            id,
                            set: record.set,
                        });
                    }
                    if record.binding >= MAX_BINDINGS {
                        return Err(ReflectError::BindingOutOfRange {
                            id,
                            binding: record.binding,
                        });
                    }

                    let pointer = module.record(record.type_id)?;
                    if pointer.kind != IdKind::TypePointer {
                        return Err(ReflectError::NotAPointer { id });
                    }
                    let pointee = module.record(pointer.type_id)?;
                    let kind = DescriptorKind::from_pointee(pointee.kind)
                        .ok_or(ReflectError::UnsupportedResource { id })?;

                    match resources.insert(record.binding, kind) {
                        Some(first) if first != kind => {
                            return Err(ReflectError::KindConflict {
                                binding: record.binding,
                                first,
                                second: kind,
                            });
                        }
                        _ => {}
                    }
                }
                Some(StorageClass::PushConstant) => uses_push_constants = true,
                _ => {}
            }
        }

        let mut local_size = module.local_size;
        if stage.is_compute_family() {
            if let Some(ids) = module.local_size_ids {
                for (dim, id) in local_size.iter_mut().zip(ids) {
                    let constant = module.record(id)?;
                    if constant.kind != IdKind::Constant {
                        return Err(ReflectError::LocalSizeNotConstant(id));
                    }
                    *dim = constant
                        .constant
                        .ok_or(ReflectError::UnsupportedConstantWidth(id))?;
                }
            }

            if local_size.contains(&0) {
                return Err(ReflectError::ZeroLocalSize {
                    stage,
                    size: local_size,
                });
            }
        }

        let metadata = ShaderMetadata {
            stage,
            resources,
            uses_push_constants,
            local_size,
        };
        log::debug!(
            "reflected {} shader: bindings {:#034b}, push constants {}, local size {:?}",
            metadata.stage,
            metadata.resource_mask(),
            metadata.uses_push_constants,
            metadata.local_size,
        );
        Ok(metadata)
    }

    /// Occupied bindings as a bit mask, bit `n` for binding `n`.
    pub fn resource_mask(&self) -> u32 {
        self.resources.keys().fold(0, |mask, b| mask | (1 << b))
    }

    pub fn resource(&self, binding: u32) -> Option<DescriptorKind> {
        self.resources.get(&binding).copied()
    }
}
