// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Compile
//!
//! GLSL is compiled by running `glslangValidator`.  Set `HEVK_GLSLANG` to use a different binary.
//!
//! Includes are expanded here rather than by the compiler, so the compiler only ever sees one
//! self-contained file in a scratch directory.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::glsl::expand_includes;
use crate::prelude::*;
use crate::stage::ShaderKind;

pub const DEFAULT_COMPILER: &str = "glslangValidator";

#[derive(Clone, Debug)]
pub struct CompilerConfig {
    /// Compiler binary.  Defaults to `HEVK_GLSLANG` or `glslangValidator` on the `PATH`.
    pub compiler: String,
    /// Passed as `--target-env`.
    pub target_env: String,
    /// Rewrites a vertex shader's `#define VertexPulling` line to this value.
    pub vertex_pulling: Option<bool>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            compiler: std::env::var("HEVK_GLSLANG").unwrap_or_else(|_| DEFAULT_COMPILER.to_owned()),
            target_env: "vulkan1.2".to_owned(),
            vertex_pulling: None,
        }
    }
}

/// Replace the rest of the first `#define VertexPulling` line.
pub fn set_vertex_pulling(source: &str, enabled: bool) -> String {
    const DEFINE: &str = "#define VertexPulling";
    let Some(begin) = source.find(DEFINE) else {
        return source.to_owned();
    };
    let end = source[begin..]
        .find('\n')
        .map(|n| begin + n)
        .unwrap_or(source.len());

    format!(
        "{}{DEFINE} {}{}",
        &source[..begin],
        enabled as u32,
        &source[end..]
    )
}

/// Compile a GLSL file.  The stage comes from the file name.
pub fn compile_glsl(path: &Path, config: &CompilerConfig) -> Result<Vec<u32>, AssetError> {
    let kind = ShaderKind::from_path(path);
    let mut source = expand_includes(path)?;
    if let (Some(enabled), hevk_spirv::ShaderStage::Vertex) = (config.vertex_pulling, kind.stage())
    {
        source = set_vertex_pulling(&source, enabled);
    }

    let scratch = Scratch::new(kind)?;
    std::fs::write(&scratch.source, source)?;

    log::debug!(
        "compiling {path:?} as {} with {}",
        kind.stage(),
        config.compiler
    );
    let output = process::Command::new(&config.compiler)
        .arg("-V")
        .arg("--target-env")
        .arg(&config.target_env)
        .arg("-S")
        .arg(kind.extension())
        .arg("-o")
        .arg(&scratch.output)
        .arg(&scratch.source)
        .output()
        .map_err(|e| {
            log::debug!("spawning {}: {e}", config.compiler);
            AssetError::CompilerMissing(config.compiler.clone())
        })?;

    if !output.status.success() {
        // glslang reports on stdout.
        let mut report = String::from_utf8_lossy(&output.stdout).into_owned();
        report.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(AssetError::CompileFailed {
            path: path.to_owned(),
            output: report,
        });
    }

    crate::load_spirv(&scratch.output)
}

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Input and output files under the temp dir, removed on drop.
struct Scratch {
    source: PathBuf,
    output: PathBuf,
}

impl Scratch {
    fn new(kind: ShaderKind) -> Result<Self, AssetError> {
        let dir = std::env::temp_dir().join("hevk");
        std::fs::create_dir_all(&dir)?;
        let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
        let stem = format!("{}-{n}", process::id());
        Ok(Scratch {
            source: dir.join(format!("{stem}.{}", kind.extension())),
            output: dir.join(format!("{stem}.spv")),
        })
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        for path in [&self.source, &self.output] {
            if let Err(e) = std::fs::remove_file(path) {
                log::trace!("scratch {path:?}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_vertex_pulling() {
        let source = "#version 450\n#define VertexPulling 1\nvoid main() {}\n";
        assert_eq!(
            set_vertex_pulling(source, false),
            "#version 450\n#define VertexPulling 0\nvoid main() {}\n"
        );
        assert_eq!(set_vertex_pulling(source, true), source);
    }

    #[test]
    fn test_set_vertex_pulling_last_line() {
        assert_eq!(
            set_vertex_pulling("#define VertexPulling", true),
            "#define VertexPulling 1"
        );
        assert_eq!(set_vertex_pulling("void main() {}", true), "void main() {}");
    }

    #[test]
    fn test_missing_compiler() {
        let dir = std::env::temp_dir().join(format!("hevk-compile-{}", process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("missing.comp");
        std::fs::write(&path, "#version 450\nvoid main() {}\n").unwrap();

        let config = CompilerConfig {
            compiler: "hevk-no-such-compiler".to_owned(),
            ..Default::default()
        };
        assert!(matches!(
            compile_glsl(&path, &config),
            Err(AssetError::CompilerMissing(_))
        ));
    }
}
