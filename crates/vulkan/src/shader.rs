// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Shader
//!
//! A compiled module together with what reflection found in it.

use ash::vk;

use hevk_spirv::{ShaderMetadata, ShaderStage};

use crate::prelude::*;

pub struct Shader {
    pub module: vk::ShaderModule,
    pub metadata: ShaderMetadata,
}

impl Shader {
    /// Reflect `words` and create the module.  Nothing is created when reflection fails.
    pub fn new(device: &ash::Device, words: &[u32]) -> Result<Self, VulkanError> {
        let metadata = ShaderMetadata::from_words(words)?;

        let module_info = vk::ShaderModuleCreateInfo::default().code(words);
        let module = unsafe { device.create_shader_module(&module_info, None)? };

        Ok(Self { module, metadata })
    }

    pub fn stage(&self) -> ShaderStage {
        self.metadata.stage
    }

    /// Stage description for pipeline creation.  Entry point is always `main`.
    pub fn stage_info<'a>(
        &self,
        specialization: &'a vk::SpecializationInfo<'a>,
    ) -> vk::PipelineShaderStageCreateInfo<'a> {
        vk::PipelineShaderStageCreateInfo::default()
            .stage(self.metadata.stage.flags())
            .module(self.module)
            .name(c"main")
            .specialization_info(specialization)
    }

    pub fn destroy(&self, device: &ash::Device) {
        unsafe {
            device.destroy_shader_module(self.module, None);
        }
    }
}
