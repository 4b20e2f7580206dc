// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Pipelines
//!
//! Pipelines are built against a [`Program`](crate::program::Program) layout.  Graphics pipelines
//! use dynamic rendering, so instead of a render pass they take the formats they will render into.
//! Viewport and scissor are always dynamic.
//!
//! Specialization constants are plain `i32`s, constant `n` is the `n`th value.

use ash::vk;

use hevk_spirv::ShaderStage;

use crate::prelude::*;

/// Attachment formats of the rendering the pipeline will be used in.
#[derive(Clone, Debug, Default)]
pub struct RenderingFormats {
    pub color: Vec<vk::Format>,
    /// `UNDEFINED` for no depth attachment.  Depth testing is enabled otherwise.
    pub depth: vk::Format,
}

/// Map constant `i` to bytes `[4i, 4i + 4)`.
pub fn specialization_entries(count: usize) -> Vec<vk::SpecializationMapEntry> {
    (0..count as u32)
        .map(|i| vk::SpecializationMapEntry {
            constant_id: i,
            offset: i * size_of::<i32>() as u32,
            size: size_of::<i32>(),
        })
        .collect()
}

pub fn create_compute_pipeline(
    device: &ash::Device,
    cache: vk::PipelineCache,
    shader: &Shader,
    layout: vk::PipelineLayout,
    constants: &[i32],
) -> Result<vk::Pipeline, VulkanError> {
    if shader.stage() != ShaderStage::Compute {
        return Err(VulkanError::NotCompute(shader.stage()));
    }

    let entries = specialization_entries(constants.len());
    let specialization = vk::SpecializationInfo::default()
        .map_entries(&entries)
        .data(bytemuck::cast_slice(constants));

    let pipeline_info = vk::ComputePipelineCreateInfo::default()
        .stage(shader.stage_info(&specialization))
        .layout(layout);

    let pipelines = unsafe { device.create_compute_pipelines(cache, &[pipeline_info], None) }
        .map_err(|(_, e)| e)?;
    Ok(pipelines[0])
}

pub fn create_graphics_pipeline(
    device: &ash::Device,
    cache: vk::PipelineCache,
    formats: &RenderingFormats,
    shaders: &[&Shader],
    layout: vk::PipelineLayout,
    constants: &[i32],
) -> Result<vk::Pipeline, VulkanError> {
    if let Some(shader) = shaders.iter().find(|s| s.stage() == ShaderStage::Compute) {
        return Err(VulkanError::NotGraphics(shader.stage()));
    }

    let entries = specialization_entries(constants.len());
    let specialization = vk::SpecializationInfo::default()
        .map_entries(&entries)
        .data(bytemuck::cast_slice(constants));

    let stages: Vec<_> = shaders
        .iter()
        .map(|s| s.stage_info(&specialization))
        .collect();

    // Vertices are pulled from buffers by the shaders.
    let vertex_input = vk::PipelineVertexInputStateCreateInfo::default();
    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST);
    let viewport = vk::PipelineViewportStateCreateInfo::default()
        .viewport_count(1)
        .scissor_count(1);
    let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
        .polygon_mode(vk::PolygonMode::FILL)
        .cull_mode(vk::CullModeFlags::NONE)
        .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
        .line_width(1.0);
    let multisample = vk::PipelineMultisampleStateCreateInfo::default()
        .rasterization_samples(vk::SampleCountFlags::TYPE_1);

    let has_depth = formats.depth != vk::Format::UNDEFINED;
    let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
        .depth_test_enable(has_depth)
        .depth_write_enable(has_depth)
        .depth_compare_op(vk::CompareOp::LESS)
        .max_depth_bounds(1.0);

    let blend_attachments: Vec<_> = formats
        .color
        .iter()
        .map(|_| {
            vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)
        })
        .collect();
    let color_blend =
        vk::PipelineColorBlendStateCreateInfo::default().attachments(&blend_attachments);

    let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
    let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

    let mut rendering = vk::PipelineRenderingCreateInfo::default()
        .color_attachment_formats(&formats.color)
        .depth_attachment_format(formats.depth);

    let pipeline_info = vk::GraphicsPipelineCreateInfo::default()
        .stages(&stages)
        .vertex_input_state(&vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport)
        .rasterization_state(&rasterization)
        .multisample_state(&multisample)
        .depth_stencil_state(&depth_stencil)
        .color_blend_state(&color_blend)
        .dynamic_state(&dynamic_state)
        .layout(layout)
        .push_next(&mut rendering);

    let pipelines = unsafe { device.create_graphics_pipelines(cache, &[pipeline_info], None) }
        .map_err(|(_, e)| e)?;
    Ok(pipelines[0])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_specialization_entries() {
        let entries = specialization_entries(3);
        assert_eq!(
            entries
                .iter()
                .map(|e| (e.constant_id, e.offset, e.size))
                .collect::<Vec<_>>(),
            vec![(0, 0, 4), (1, 4, 4), (2, 8, 4)]
        );
        assert!(specialization_entries(0).is_empty());
    }

    #[test]
    fn test_constant_bytes_match_entries() {
        let constants = [7i32, -1];
        let bytes: &[u8] = bytemuck::cast_slice(&constants);
        let entries = specialization_entries(constants.len());
        let last = entries.last().unwrap();
        assert_eq!(bytes.len(), last.offset as usize + last.size);
        assert_eq!(&bytes[4..8], &(-1i32).to_ne_bytes());
    }
}
