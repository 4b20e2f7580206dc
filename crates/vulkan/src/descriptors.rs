// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Descriptors
//!
//! One descriptor set, number zero, with at most one descriptor per binding.  The layout is
//! whatever the shaders say it is.
//!
//! The geometry of the data handed to the driver is:
//!
//!   `[DescriptorRecord; occupied bindings]`
//!
//! A record is either an image or a buffer description.  Both are 24 bytes, so every record has the
//! same stride and the update template can walk the block without knowing which is which.  The
//! tagged [`DescriptorInfo`] is what callers build.  It is lowered to the untagged
//! [`DescriptorRecord`] right before the driver sees it.

use ash::vk;

use hevk_spirv::DescriptorKind;

use crate::binding::BindingTable;
use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptorInfo {
    Image {
        sampler: vk::Sampler,
        view: vk::ImageView,
        layout: vk::ImageLayout,
    },
    Buffer {
        buffer: vk::Buffer,
        offset: vk::DeviceSize,
        range: vk::DeviceSize,
    },
}

impl DescriptorInfo {
    /// A storage image.
    pub fn image(view: vk::ImageView, layout: vk::ImageLayout) -> Self {
        Self::Image {
            sampler: vk::Sampler::null(),
            view,
            layout,
        }
    }

    /// A combined image sampler.
    pub fn sampled_image(sampler: vk::Sampler, view: vk::ImageView, layout: vk::ImageLayout) -> Self {
        Self::Image {
            sampler,
            view,
            layout,
        }
    }

    pub fn sampler(sampler: vk::Sampler) -> Self {
        Self::Image {
            sampler,
            view: vk::ImageView::null(),
            layout: vk::ImageLayout::UNDEFINED,
        }
    }

    /// The whole buffer.
    pub fn buffer(buffer: vk::Buffer) -> Self {
        Self::buffer_range(buffer, 0, vk::WHOLE_SIZE)
    }

    pub fn buffer_range(buffer: vk::Buffer, offset: vk::DeviceSize, range: vk::DeviceSize) -> Self {
        Self::Buffer {
            buffer,
            offset,
            range,
        }
    }

    /// Whether this description can fill a slot of `kind`.
    pub fn fits(&self, kind: DescriptorKind) -> bool {
        match self {
            Self::Buffer { .. } => kind == DescriptorKind::StorageBuffer,
            Self::Image { .. } => kind != DescriptorKind::StorageBuffer,
        }
    }

    pub fn record(&self) -> DescriptorRecord {
        match *self {
            Self::Image {
                sampler,
                view,
                layout,
            } => DescriptorRecord {
                image: vk::DescriptorImageInfo {
                    sampler,
                    image_view: view,
                    image_layout: layout,
                },
            },
            Self::Buffer {
                buffer,
                offset,
                range,
            } => DescriptorRecord {
                buffer: vk::DescriptorBufferInfo {
                    buffer,
                    offset,
                    range,
                },
            },
        }
    }
}

/// Untagged, fixed-stride form of [`DescriptorInfo`].  The update template decides which field
/// the driver reads from the descriptor type of each binding.
#[repr(C)]
#[derive(Clone, Copy)]
pub union DescriptorRecord {
    pub image: vk::DescriptorImageInfo,
    pub buffer: vk::DescriptorBufferInfo,
}

/// Lower `infos` in binding order, checking that each one fits its slot.
pub fn lower(table: &BindingTable, infos: &[DescriptorInfo]) -> Result<Vec<DescriptorRecord>, VulkanError> {
    if infos.len() != table.len() {
        return Err(VulkanError::DescriptorCount {
            expected: table.len(),
            found: infos.len(),
        });
    }

    table
        .iter()
        .zip(infos)
        .map(|((binding, slot), info)| {
            if info.fits(slot.kind) {
                Ok(info.record())
            } else {
                Err(VulkanError::DescriptorMismatch {
                    binding,
                    kind: slot.kind,
                })
            }
        })
        .collect()
}

/// One layout binding per occupied slot, ascending.
pub fn layout_bindings(table: &BindingTable) -> Vec<vk::DescriptorSetLayoutBinding<'static>> {
    table
        .iter()
        .map(|(binding, slot)| {
            vk::DescriptorSetLayoutBinding::default()
                .binding(binding)
                .descriptor_type(slot.kind.descriptor_type())
                .descriptor_count(1)
                .stage_flags(slot.stages)
        })
        .collect()
}

pub fn set_layout_flags(push_descriptors: bool) -> vk::DescriptorSetLayoutCreateFlags {
    if push_descriptors {
        vk::DescriptorSetLayoutCreateFlags::PUSH_DESCRIPTOR_KHR
    } else {
        vk::DescriptorSetLayoutCreateFlags::empty()
    }
}

pub fn create_set_layout(
    device: &ash::Device,
    table: &BindingTable,
    push_descriptors: bool,
) -> Result<vk::DescriptorSetLayout, VulkanError> {
    let bindings = layout_bindings(table);
    let layout_info = vk::DescriptorSetLayoutCreateInfo::default()
        .flags(set_layout_flags(push_descriptors))
        .bindings(&bindings);

    Ok(unsafe { device.create_descriptor_set_layout(&layout_info, None)? })
}

/// The single push range `[0, size)`, or none for a zero size.
pub fn push_constant_range(
    size: u32,
    stages: vk::ShaderStageFlags,
) -> Result<Option<vk::PushConstantRange>, VulkanError> {
    if size == 0 {
        return Ok(None);
    }
    if size % 4 != 0 {
        return Err(VulkanError::PushConstantSize(size));
    }
    if stages.is_empty() {
        return Err(VulkanError::PushConstantsUnused);
    }
    Ok(Some(vk::PushConstantRange {
        stage_flags: stages,
        offset: 0,
        size,
    }))
}

pub fn create_pipeline_layout(
    device: &ash::Device,
    set_layout: vk::DescriptorSetLayout,
    push_constants: Option<vk::PushConstantRange>,
) -> Result<vk::PipelineLayout, VulkanError> {
    let set_layouts = [set_layout];
    let ranges: Vec<vk::PushConstantRange> = push_constants.into_iter().collect();
    let layout_info = vk::PipelineLayoutCreateInfo::default()
        .set_layouts(&set_layouts)
        .push_constant_ranges(&ranges);

    Ok(unsafe { device.create_pipeline_layout(&layout_info, None)? })
}
