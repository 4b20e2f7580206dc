// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Program
//!
//! Everything a set of shaders needs to be bound, owned as a unit.  Build one per combination of
//! stages that will be used together, then build pipelines against its layout.
//!
//! ```ignore
//! let program = Program::new(
//!     device,
//!     vk::PipelineBindPoint::COMPUTE,
//!     &[&shader.metadata],
//!     size_of::<Params>() as u32,
//!     capabilities.push_descriptors,
//! )?;
//! let pipeline = create_compute_pipeline(device, cache, &shader, program.layout, &[])?;
//! // record
//! program.push_descriptors(loader, cb, &[DescriptorInfo::buffer(buffer)])?;
//! program.push_constants(device, cb, &params)?;
//! // ...
//! program.destroy(device);
//! ```

use std::ffi::c_void;

use ash::vk;

use hevk_spirv::ShaderMetadata;

use crate::binding::BindingTable;
use crate::descriptors::{self, DescriptorInfo};
use crate::prelude::*;
use crate::template;

pub struct Program {
    pub bind_point: vk::PipelineBindPoint,
    pub set_layout: vk::DescriptorSetLayout,
    pub layout: vk::PipelineLayout,
    /// Absent when no binding is occupied.
    pub update_template: Option<vk::DescriptorUpdateTemplate>,
    pub push_constant_stages: vk::ShaderStageFlags,
    pub push_constant_size: u32,
    pub bindings: BindingTable,
    /// The set layout and template were built for push descriptors.
    pub push_descriptors: bool,
}

/// Stages that read push constants.
pub fn push_constant_stages(shaders: &[&ShaderMetadata]) -> vk::ShaderStageFlags {
    shaders
        .iter()
        .filter(|s| s.uses_push_constants)
        .fold(vk::ShaderStageFlags::empty(), |stages, s| {
            stages | s.stage.flags()
        })
}

impl Program {
    pub fn new(
        device: &ash::Device,
        bind_point: vk::PipelineBindPoint,
        shaders: &[&ShaderMetadata],
        push_constant_size: u32,
        push_descriptors: bool,
    ) -> Result<Self, VulkanError> {
        let push_constant_stages = push_constant_stages(shaders);
        let push_range = descriptors::push_constant_range(push_constant_size, push_constant_stages)?;
        let bindings = BindingTable::aggregate(shaders.iter().copied())?;

        let set_layout = descriptors::create_set_layout(device, &bindings, push_descriptors)?;

        let layout = match descriptors::create_pipeline_layout(device, set_layout, push_range) {
            Ok(layout) => layout,
            Err(e) => {
                unsafe { device.destroy_descriptor_set_layout(set_layout, None) };
                return Err(e);
            }
        };

        let update_template = match template::create_update_template(
            device,
            bind_point,
            set_layout,
            layout,
            &bindings,
            push_descriptors,
        ) {
            Ok(update_template) => update_template,
            Err(e) => {
                unsafe {
                    device.destroy_pipeline_layout(layout, None);
                    device.destroy_descriptor_set_layout(set_layout, None);
                }
                return Err(e);
            }
        };

        log::info!(
            "program: {} bindings {:#034b}, push constants {} bytes to {:?}, push descriptors {}",
            bindings.len(),
            bindings.resource_mask(),
            push_constant_size,
            push_constant_stages,
            push_descriptors,
        );

        Ok(Self {
            bind_point,
            set_layout,
            layout,
            update_template,
            push_constant_stages,
            push_constant_size,
            bindings,
            push_descriptors,
        })
    }

    /// Bind `pipeline` at this program's bind point.
    pub fn bind(&self, device: &ash::Device, cb: vk::CommandBuffer, pipeline: vk::Pipeline) {
        unsafe {
            device.cmd_bind_pipeline(cb, self.bind_point, pipeline);
        }
    }

    /// Push one descriptor per occupied binding, in ascending binding order.
    pub fn push_descriptors(
        &self,
        loader: &ash::khr::push_descriptor::Device,
        cb: vk::CommandBuffer,
        infos: &[DescriptorInfo],
    ) -> Result<(), VulkanError> {
        if !self.push_descriptors {
            return Err(VulkanError::PushDescriptorsUnsupported);
        }
        let records = descriptors::lower(&self.bindings, infos)?;
        if let Some(update_template) = self.update_template {
            unsafe {
                loader.cmd_push_descriptor_set_with_template(
                    cb,
                    update_template,
                    self.layout,
                    0,
                    records.as_ptr() as *const c_void,
                );
            }
        }
        Ok(())
    }

    /// Write one descriptor per occupied binding into an allocated `set`.
    pub fn update_set(
        &self,
        device: &ash::Device,
        set: vk::DescriptorSet,
        infos: &[DescriptorInfo],
    ) -> Result<(), VulkanError> {
        if self.push_descriptors {
            return Err(VulkanError::TemplateMismatch);
        }
        let records = descriptors::lower(&self.bindings, infos)?;
        if let Some(update_template) = self.update_template {
            unsafe {
                device.update_descriptor_set_with_template(
                    set,
                    update_template,
                    records.as_ptr() as *const c_void,
                );
            }
        }
        Ok(())
    }

    pub fn push_constants<T: bytemuck::Pod>(
        &self,
        device: &ash::Device,
        cb: vk::CommandBuffer,
        value: &T,
    ) -> Result<(), VulkanError> {
        let bytes = bytemuck::bytes_of(value);
        if self.push_constant_size == 0 {
            return Err(VulkanError::NoPushConstants);
        }
        if bytes.len() > self.push_constant_size as usize {
            return Err(VulkanError::PushConstantOverflow {
                size: bytes.len(),
                capacity: self.push_constant_size,
            });
        }
        unsafe {
            device.cmd_push_constants(cb, self.layout, self.push_constant_stages, 0, bytes);
        }
        Ok(())
    }

    pub fn destroy(&self, device: &ash::Device) {
        unsafe {
            if let Some(update_template) = self.update_template {
                device.destroy_descriptor_update_template(update_template, None);
            }
            device.destroy_pipeline_layout(self.layout, None);
            device.destroy_descriptor_set_layout(self.set_layout, None);
        }
    }
}
