// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Assets
//!
//! Shaders arrive either as SPIR-V files or as GLSL sources.  SPIR-V is loaded as words.  GLSL has
//! its includes expanded and is handed to an external compiler, which produces the same words.
//!
//! Asset directory lookup is feature gated behind `runtime`, just to keep the `dirs` dependency out
//! of crates that only load files by path.

#[cfg(feature = "runtime")]
pub mod assets;
pub mod compile;
pub mod glsl;
pub mod stage;

#[cfg(feature = "runtime")]
pub use assets::*;
pub use compile::{CompilerConfig, compile_glsl};
pub use glsl::expand_includes;
pub use stage::ShaderKind;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use hevk_spirv::spv;

mod prelude {
    pub use super::AssetError;
    pub use super::AssetKind;
}

#[derive(Debug)]
pub enum AssetKind {
    Shader,
    ShaderSource,
}

impl AssetKind {
    fn ext(&self) -> &'static OsStr {
        match self {
            AssetKind::Shader => OsStr::new("spv"),
            AssetKind::ShaderSource => OsStr::new("glsl"),
        }
    }

    fn subdir(&self) -> &'static OsStr {
        OsStr::new("shaders")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("read failed: {:?}", .0)]
    ReadError(#[from] std::io::Error),
    #[error("file not found: {:?}", .0)]
    NotFound(String),
    #[error("load spirv failed: {:?}", .0)]
    InvalidShader(String),
    #[error("malformed #include in {path:?} line {line}")]
    BadInclude { path: PathBuf, line: usize },
    #[error("include cycle through {:?}", .0)]
    IncludeCycle(PathBuf),
    #[error("shader compiler {:?} could not be started", .0)]
    CompilerMissing(String),
    #[error("compiling {path:?} failed:\n{output}")]
    CompileFailed { path: PathBuf, output: String },
}

/// Read a SPIR-V file as words.  Modules written in the other byte order are swapped.
pub fn load_spirv(path: &Path) -> Result<Vec<u32>, AssetError> {
    let bytes = std::fs::read(path)?;
    let words = hevk_spirv::words_from_bytes(&bytes)
        .map_err(|e| AssetError::InvalidShader(format!("{path:?}: {e}")))?;

    match words.first() {
        Some(&spv::MAGIC) => Ok(words),
        Some(&magic) => Err(AssetError::InvalidShader(format!(
            "bad magic number {magic:#010x} in {path:?}"
        ))),
        None => Err(AssetError::InvalidShader(format!("{path:?} is empty"))),
    }
}

/// Write words in native byte order.
pub fn save_spirv(path: &Path, words: &[u32]) -> Result<(), AssetError> {
    std::fs::write(path, bytemuck::cast_slice::<u32, u8>(words))?;
    Ok(())
}

/// Load `.spv` files directly, compile anything else.
pub fn load_or_compile(path: &Path, config: &CompilerConfig) -> Result<Vec<u32>, AssetError> {
    if path.extension() == Some(AssetKind::Shader.ext()) {
        load_spirv(path)
    } else {
        compile_glsl(path, config)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hevk-assets-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_spirv_round_trip() {
        let path = scratch("round-trip.spv");
        let words = [spv::MAGIC, 0x0001_0300, 0, 1, 0];
        save_spirv(&path, &words).unwrap();
        assert_eq!(load_spirv(&path).unwrap(), words);
    }

    #[test]
    fn test_spirv_swapped() {
        let path = scratch("swapped.spv");
        let words = [spv::MAGIC, 0x0001_0300, 0, 7, 0];
        let swapped: Vec<u32> = words.iter().map(|w| w.swap_bytes()).collect();
        save_spirv(&path, &swapped).unwrap();
        assert_eq!(load_spirv(&path).unwrap(), words);
    }

    #[test]
    fn test_spirv_unaligned() {
        let path = scratch("unaligned.spv");
        std::fs::write(&path, [0u8; 7]).unwrap();
        assert!(matches!(
            load_spirv(&path),
            Err(AssetError::InvalidShader(_))
        ));
    }

    #[test]
    fn test_spirv_bad_magic() {
        let path = scratch("magic.spv");
        save_spirv(&path, &[0xdead_beef, 0, 0, 0, 0]).unwrap();
        assert!(matches!(
            load_spirv(&path),
            Err(AssetError::InvalidShader(_))
        ));
    }

    #[test]
    fn test_spirv_empty() {
        let path = scratch("empty.spv");
        std::fs::write(&path, []).unwrap();
        assert!(matches!(
            load_spirv(&path),
            Err(AssetError::InvalidShader(_))
        ));
    }

    #[test]
    fn test_spirv_missing() {
        assert!(matches!(
            load_spirv(&scratch("does-not-exist.spv")),
            Err(AssetError::ReadError(_))
        ));
    }
}
