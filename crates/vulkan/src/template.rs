// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Update Templates
//!
//! A template tells the driver where in a block of [`DescriptorRecord`]s each binding's descriptor
//! lives.  Records are packed in ascending binding order, so the `n`th occupied binding is read from
//! offset `n * size_of::<DescriptorRecord>()`, whatever its binding number is.

use ash::vk;

use crate::binding::BindingTable;
use crate::descriptors::DescriptorRecord;
use crate::prelude::*;

pub const RECORD_STRIDE: usize = size_of::<DescriptorRecord>();

pub fn template_entries(table: &BindingTable) -> Vec<vk::DescriptorUpdateTemplateEntry> {
    table
        .iter()
        .enumerate()
        .map(|(index, (binding, slot))| vk::DescriptorUpdateTemplateEntry {
            dst_binding: binding,
            dst_array_element: 0,
            descriptor_count: 1,
            descriptor_type: slot.kind.descriptor_type(),
            offset: index * RECORD_STRIDE,
            stride: RECORD_STRIDE,
        })
        .collect()
}

pub fn template_type(push_descriptors: bool) -> vk::DescriptorUpdateTemplateType {
    if push_descriptors {
        vk::DescriptorUpdateTemplateType::PUSH_DESCRIPTORS_KHR
    } else {
        vk::DescriptorUpdateTemplateType::DESCRIPTOR_SET
    }
}

/// Returns `None` for an empty table.  Templates must have at least one entry.
pub fn create_update_template(
    device: &ash::Device,
    bind_point: vk::PipelineBindPoint,
    set_layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    table: &BindingTable,
    push_descriptors: bool,
) -> Result<Option<vk::DescriptorUpdateTemplate>, VulkanError> {
    let entries = template_entries(table);
    if entries.is_empty() {
        return Ok(None);
    }

    let mut template_info = vk::DescriptorUpdateTemplateCreateInfo::default()
        .descriptor_update_entries(&entries)
        .template_type(template_type(push_descriptors));

    template_info = if push_descriptors {
        template_info
            .pipeline_bind_point(bind_point)
            .pipeline_layout(pipeline_layout)
            .set(0)
    } else {
        template_info.descriptor_set_layout(set_layout)
    };

    let template = unsafe { device.create_descriptor_update_template(&template_info, None)? };
    Ok(Some(template))
}
