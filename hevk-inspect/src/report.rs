// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain text reports.

use std::fmt::Write;

use hevk_spirv::ShaderMetadata;
use hevk_vulkan::binding::BindingTable;
use hevk_vulkan::capabilities::Capabilities;

pub fn metadata(name: &str, metadata: &ShaderMetadata) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{name}: {} shader", metadata.stage);
    if metadata.stage.is_compute_family() {
        let [x, y, z] = metadata.local_size;
        let _ = writeln!(out, "  local size: {x} x {y} x {z}");
    }
    let _ = writeln!(out, "  push constants: {}", yes_no(metadata.uses_push_constants));
    if metadata.resources.is_empty() {
        let _ = writeln!(out, "  no bindings");
    }
    for (binding, kind) in &metadata.resources {
        let _ = writeln!(out, "  binding {binding:>2}: {kind}");
    }
    out
}

pub fn table(table: &BindingTable) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "set 0, mask {:#010x}", table.resource_mask());
    for (binding, slot) in table.iter() {
        let _ = writeln!(out, "  binding {binding:>2}: {} {:?}", slot.kind, slot.stages);
    }
    out
}

pub fn capabilities(capabilities: &Capabilities) -> String {
    let mesh = if capabilities.mesh_shading {
        "EXT"
    } else if capabilities.mesh_shading_nv {
        "NV"
    } else {
        "no"
    };
    format!(
        "push descriptors: {}, mesh shading: {mesh}",
        yes_no(capabilities.push_descriptors)
    )
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}
