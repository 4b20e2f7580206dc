// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Stage Inference
//!
//! GLSL sources carry their stage in the file name: `shader.vert`, or `shader.vert.glsl` for
//! editors that want to see a `.glsl` extension.

use std::path::Path;

use hevk_spirv::ShaderStage;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShaderKind(pub ShaderStage);

impl ShaderKind {
    /// Unknown extensions are treated as fragment shaders.
    pub fn from_path(path: &Path) -> Self {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Self(ShaderStage::Fragment);
        };
        let name = name.strip_suffix(".glsl").unwrap_or(name);
        let stage = name
            .rsplit_once('.')
            .and_then(|(_, ext)| Self::from_extension(ext))
            .unwrap_or(ShaderStage::Fragment);
        Self(stage)
    }

    pub fn from_extension(ext: &str) -> Option<ShaderStage> {
        Some(match ext {
            "vert" => ShaderStage::Vertex,
            "frag" => ShaderStage::Fragment,
            "geom" => ShaderStage::Geometry,
            "comp" => ShaderStage::Compute,
            "tesc" => ShaderStage::TessellationControl,
            "tese" => ShaderStage::TessellationEvaluation,
            "task" => ShaderStage::Task,
            "mesh" => ShaderStage::Mesh,
            _ => return None,
        })
    }

    /// Stage name as the compiler's `-S` option takes it.
    pub fn extension(self) -> &'static str {
        match self.0 {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
            ShaderStage::Geometry => "geom",
            ShaderStage::Compute => "comp",
            ShaderStage::TessellationControl => "tesc",
            ShaderStage::TessellationEvaluation => "tese",
            ShaderStage::Task => "task",
            ShaderStage::Mesh => "mesh",
        }
    }

    pub fn stage(self) -> ShaderStage {
        self.0
    }
}
