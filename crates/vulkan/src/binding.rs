// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Binding Table
//!
//! Every shader in a program sees the same descriptor set, so their bindings have to agree.  The
//! table is the union of all the stages' bindings.  A slot used by several stages is visible to
//! each of them, and must be the same kind of descriptor in each.
//!
//! Merging is order independent.  Feeding the same shader twice changes nothing.

use std::collections::BTreeMap;

use ash::vk;

use hevk_spirv::{DescriptorKind, MAX_BINDINGS, ShaderMetadata};

use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotBinding {
    pub kind: DescriptorKind,
    /// Every stage that reads or writes the slot.
    pub stages: vk::ShaderStageFlags,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindingTable {
    slots: BTreeMap<u32, SlotBinding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge all `shaders` into one table.
    pub fn aggregate<'a>(
        shaders: impl IntoIterator<Item = &'a ShaderMetadata>,
    ) -> Result<Self, VulkanError> {
        let mut table = Self::new();
        for shader in shaders {
            table.add(shader)?;
        }
        Ok(table)
    }

    /// Merge one shader's bindings.  On a conflict or an out of range binding the table is left
    /// untouched.
    pub fn add(&mut self, shader: &ShaderMetadata) -> Result<(), VulkanError> {
        for (&binding, &kind) in &shader.resources {
            if binding >= MAX_BINDINGS {
                return Err(VulkanError::BindingRange { binding });
            }
            if let Some(slot) = self.slots.get(&binding) {
                if slot.kind != kind {
                    return Err(VulkanError::BindingConflict {
                        binding,
                        first: slot.kind,
                        second: kind,
                        stage: shader.stage,
                    });
                }
            }
        }

        let stage = shader.stage.flags();
        for (&binding, &kind) in &shader.resources {
            self.slots
                .entry(binding)
                .and_modify(|slot| slot.stages |= stage)
                .or_insert(SlotBinding {
                    kind,
                    stages: stage,
                });
        }
        Ok(())
    }

    pub fn get(&self, binding: u32) -> Option<&SlotBinding> {
        self.slots.get(&binding)
    }

    /// Occupied slots in ascending binding order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SlotBinding)> {
        self.slots.iter().map(|(b, s)| (*b, s))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn resource_mask(&self) -> u32 {
        self.slots.keys().fold(0, |mask, b| mask | (1 << b))
    }
}
