// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # GLSL Sources
//!
//! `#include "file"` and `#include <file>` are expanded in place, relative to the including file,
//! before the compiler sees the source.  There are no include guards, so including a file twice
//! pastes it twice.  Including a file from itself, directly or not, is an error.

use std::path::{Path, PathBuf};

use crate::prelude::*;

const BOM: char = '\u{feff}';

/// Read `path` and expand its includes recursively.
pub fn expand_includes(path: &Path) -> Result<String, AssetError> {
    let mut stack = Vec::new();
    let mut out = String::new();
    expand_into(path, &mut stack, &mut out)?;
    Ok(out)
}

fn expand_into(path: &Path, stack: &mut Vec<PathBuf>, out: &mut String) -> Result<(), AssetError> {
    let canonical = path.canonicalize()?;
    if stack.contains(&canonical) {
        return Err(AssetError::IncludeCycle(canonical));
    }

    let source = std::fs::read_to_string(&canonical)?;
    let source = source.strip_prefix(BOM).unwrap_or(&source);
    let dir = canonical.parent().map(Path::to_path_buf).unwrap_or_default();

    stack.push(canonical.clone());
    for (index, line) in source.split_inclusive('\n').enumerate() {
        match include_target(line) {
            None => out.push_str(line),
            Some(Some(name)) => {
                log::trace!("{canonical:?} includes {name}");
                expand_into(&dir.join(name), stack, out)?;
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Some(None) => {
                return Err(AssetError::BadInclude {
                    path: canonical,
                    line: index + 1,
                });
            }
        }
    }
    stack.pop();
    Ok(())
}

/// `None` for ordinary lines, `Some(None)` for an include without a readable file name.
fn include_target(line: &str) -> Option<Option<&str>> {
    let rest = line.trim_start().strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("include")?;
    let delimited = rest.starts_with(|c: char| c.is_whitespace() || c == '"' || c == '<');
    if !rest.is_empty() && !delimited {
        return None;
    }
    let rest = rest.trim();

    let name = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.split_once('"').map(|(name, _)| name)
    } else if let Some(angled) = rest.strip_prefix('<') {
        angled.split_once('>').map(|(name, _)| name)
    } else {
        None
    };
    Some(name.filter(|n| !n.is_empty()))
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hevk-glsl-{}-{test}", std::process::id()));
        std::fs::create_dir_all(dir.join("common")).unwrap();
        dir
    }

    #[test]
    fn test_include_target() {
        assert_eq!(include_target("#include \"a.glsl\"\n"), Some(Some("a.glsl")));
        assert_eq!(include_target("  #  include <common/b.h>"), Some(Some("common/b.h")));
        assert_eq!(include_target("#include a.glsl"), Some(None));
        assert_eq!(include_target("#include \"\""), Some(None));
        assert_eq!(include_target("#version 450"), None);
        assert_eq!(include_target("// #include \"a.glsl\""), None);
        assert_eq!(include_target("#include<c.h>"), Some(Some("c.h")));
        assert_eq!(include_target("#include_guard"), None);
        assert_eq!(include_target("#includex \"a.glsl\""), None);
        assert_eq!(include_target("#include"), Some(None));
    }

    #[test]
    fn test_expand_nested() {
        let dir = scratch("nested");
        std::fs::write(
            dir.join("main.comp"),
            "\u{feff}#version 450\n#include \"common/a.h\"\nvoid main() {}\n",
        )
        .unwrap();
        std::fs::write(dir.join("common/a.h"), "// a\n#include <b.h>").unwrap();
        std::fs::write(dir.join("common/b.h"), "// b\n").unwrap();

        let source = expand_includes(&dir.join("main.comp")).unwrap();
        assert_eq!(source, "#version 450\n// a\n// b\nvoid main() {}\n");
    }

    #[test]
    fn test_include_cycle() {
        let dir = scratch("cycle");
        std::fs::write(dir.join("a.glsl"), "#include \"b.glsl\"\n").unwrap();
        std::fs::write(dir.join("b.glsl"), "#include \"a.glsl\"\n").unwrap();
        assert!(matches!(
            expand_includes(&dir.join("a.glsl")),
            Err(AssetError::IncludeCycle(_))
        ));
    }

    #[test]
    fn test_repeat_include_is_not_a_cycle() {
        let dir = scratch("repeat");
        std::fs::write(dir.join("main.frag"), "#include \"x.h\"\n#include \"x.h\"\n").unwrap();
        std::fs::write(dir.join("x.h"), "x\n").unwrap();
        assert_eq!(expand_includes(&dir.join("main.frag")).unwrap(), "x\nx\n");
    }

    #[test]
    fn test_bad_include() {
        let dir = scratch("bad");
        std::fs::write(dir.join("main.vert"), "#version 450\n#include nothing\n").unwrap();
        assert!(matches!(
            expand_includes(&dir.join("main.vert")),
            Err(AssetError::BadInclude { line: 2, .. })
        ));
    }

    #[test]
    fn test_missing_include() {
        let dir = scratch("missing");
        std::fs::write(dir.join("main.vert"), "#include \"gone.h\"\n").unwrap();
        assert!(matches!(
            expand_includes(&dir.join("main.vert")),
            Err(AssetError::ReadError(_))
        ));
    }
}
