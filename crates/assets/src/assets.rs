// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Asset Directories
//!
//! Lookups vary across platforms and between usage and development.  `AssetDirs` is a set of
//! realized directories where lookups may search.  Hold onto it for doing many lookups at computer
//! speed but re-initialize it for human-speed queries.
//!
//! ## Precedence Rules
//!
//! - On **debug builds**:
//!
//!   1. `HEVK_ASSETS_DIR` enabling overrides for any purpose.
//!   2. The assets folder below `CARGO_MANIFEST_DIR` when run through cargo.
//!
//! - On **release builds**:
//!
//!   1. `HEVK_ASSETS_DIR`
//!   2. The user's local data directory
//!   3. The system data directory as a backup.
//!
//! `HEVK_ASSETS_DIR` should point directly to an assets root i.e. a folder containing a shaders
//! directory.

use std::path::PathBuf;

use crate::prelude::*;
use crate::{CompilerConfig, compile_glsl, load_spirv};

/// Pre-calculated and checked parent paths for reuse in asset look-ups.
pub struct AssetDirs {
    search_paths: Vec<PathBuf>,
}

impl Default for AssetDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetDirs {
    /// Checks asset search directories once on construction.
    pub fn new() -> Self {
        let mut search_paths = Vec::with_capacity(3);

        let as_assets_root = |p: PathBuf| -> Option<PathBuf> {
            p.canonicalize().ok().filter(|p| p.is_dir())
        };

        // Treat the given path as a parent containing an `assets/` subdir.
        let with_assets_subdir = |p: PathBuf| as_assets_root(p.join("assets"));

        // Always highest priority: explicit override.
        if let Some(raw) = std::env::var_os("HEVK_ASSETS_DIR") {
            match as_assets_root(PathBuf::from(&raw)) {
                Some(path) => search_paths.push(path),
                None => log::warn!("invalid HEVK_ASSETS_DIR (path not found): {raw:?}"),
            }
        }

        if cfg!(debug_assertions) {
            std::env::var_os("CARGO_MANIFEST_DIR")
                .map(PathBuf::from)
                .and_then(with_assets_subdir)
                .into_iter()
                .for_each(|p| search_paths.push(p));
        } else {
            dirs::data_local_dir()
                .map(|d| d.join("hevk"))
                .and_then(with_assets_subdir)
                .into_iter()
                .for_each(|p| search_paths.push(p));

            dirs::data_dir()
                .map(|d| d.join("hevk"))
                .and_then(with_assets_subdir)
                .into_iter()
                .for_each(|p| search_paths.push(p));
        }

        AssetDirs { search_paths }
    }

    /// Search only `roots`, in order.
    pub fn with_roots(roots: impl IntoIterator<Item = PathBuf>) -> Self {
        AssetDirs {
            search_paths: roots.into_iter().collect(),
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Checks asset paths for `name`, e.g. `triangle.vert` as `shaders/triangle.vert.spv`.
    pub fn find(&self, name: &str, kind: AssetKind) -> Option<PathBuf> {
        let file_name = format!("{name}.{}", kind.ext().to_string_lossy());
        let file = PathBuf::from(kind.subdir()).join(file_name);

        let found = self
            .search_paths
            .iter()
            .map(|root| root.join(&file))
            .find(|candidate| candidate.exists());

        if found.is_none() {
            log::warn!("{kind:?} {name} not found");
            self.search_paths
                .iter()
                .for_each(|root| log::debug!("  checked: {:?}", root.join(&file)));
        }
        found
    }

    pub fn find_shader(&self, name: &str) -> Result<Vec<u32>, AssetError> {
        let path = self
            .find(name, AssetKind::Shader)
            .ok_or_else(|| AssetError::NotFound(name.to_owned()))?;
        load_spirv(&path)
    }

    /// Prefer a compiled shader, falling back to compiling its source.
    pub fn find_or_compile(&self, name: &str, config: &CompilerConfig) -> Result<Vec<u32>, AssetError> {
        if let Some(path) = self.find(name, AssetKind::Shader) {
            return load_spirv(&path);
        }
        let source = self
            .find(name, AssetKind::ShaderSource)
            .ok_or_else(|| AssetError::NotFound(name.to_owned()))?;
        compile_glsl(&source, config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hevk_spirv::spv;

    fn root(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hevk-dirs-{}-{test}", std::process::id()));
        std::fs::create_dir_all(dir.join("shaders")).unwrap();
        dir
    }

    #[test]
    fn test_find_in_order() {
        let (first, second) = (root("first"), root("second"));
        std::fs::write(second.join("shaders/only-second.comp.spv"), [0u8; 4]).unwrap();
        std::fs::write(first.join("shaders/both.frag.spv"), [0u8; 4]).unwrap();
        std::fs::write(second.join("shaders/both.frag.spv"), [0u8; 4]).unwrap();

        let dirs = AssetDirs::with_roots([first.clone(), second.clone()]);
        assert_eq!(
            dirs.find("only-second.comp", AssetKind::Shader),
            Some(second.join("shaders/only-second.comp.spv"))
        );
        assert_eq!(
            dirs.find("both.frag", AssetKind::Shader),
            Some(first.join("shaders/both.frag.spv"))
        );
        assert_eq!(dirs.find("nowhere.vert", AssetKind::Shader), None);
    }

    #[test]
    fn test_find_shader() {
        let dir = root("shader");
        let words = [spv::MAGIC, 0x0001_0300, 0, 1, 0];
        crate::save_spirv(&dir.join("shaders/empty.comp.spv"), &words).unwrap();

        let dirs = AssetDirs::with_roots([dir]);
        assert_eq!(dirs.find_shader("empty.comp").unwrap(), words);
        assert!(matches!(
            dirs.find_shader("absent.comp"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn test_find_or_compile() {
        let dir = root("compile");
        let words = [spv::MAGIC, 0x0001_0300, 0, 1, 0];
        crate::save_spirv(&dir.join("shaders/built.comp.spv"), &words).unwrap();
        std::fs::write(dir.join("shaders/built.comp.glsl"), "not compiled\n").unwrap();
        std::fs::write(
            dir.join("shaders/source.comp.glsl"),
            "#version 450\nvoid main() {}\n",
        )
        .unwrap();

        let dirs = AssetDirs::with_roots([dir]);
        let config = CompilerConfig {
            compiler: "hevk-no-such-compiler".to_owned(),
            ..Default::default()
        };

        // Compiled shaders win over sources.
        assert_eq!(dirs.find_or_compile("built.comp", &config).unwrap(), words);
        // Sources alone reach the compiler.
        assert!(matches!(
            dirs.find_or_compile("source.comp", &config),
            Err(AssetError::CompilerMissing(_))
        ));
        assert!(matches!(
            dirs.find_or_compile("absent.comp", &config),
            Err(AssetError::NotFound(_))
        ));
    }
}
