// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # SPIR-V Constants
//!
//! The handful of enumerants the walker understands.  Values match the SPIR-V unified
//! specification; anything not listed here is skipped by the walker.

pub const MAGIC: u32 = 0x0723_0203;

/// Magic, version, generator, bound, schema.
pub const HEADER_LEN: usize = 5;
/// Word offset of the identifier bound within the header.
pub const BOUND_OFFSET: usize = 3;

// Opcodes
pub const OP_ENTRY_POINT: u16 = 15;
pub const OP_EXECUTION_MODE: u16 = 16;
pub const OP_TYPE_INT: u16 = 21;
pub const OP_TYPE_IMAGE: u16 = 25;
pub const OP_TYPE_SAMPLER: u16 = 26;
pub const OP_TYPE_SAMPLED_IMAGE: u16 = 27;
pub const OP_TYPE_ARRAY: u16 = 28;
pub const OP_TYPE_STRUCT: u16 = 30;
pub const OP_TYPE_POINTER: u16 = 32;
pub const OP_CONSTANT: u16 = 43;
pub const OP_VARIABLE: u16 = 59;
pub const OP_DECORATE: u16 = 71;
pub const OP_EXECUTION_MODE_ID: u16 = 331;

// Execution models
pub const EXECUTION_MODEL_VERTEX: u32 = 0;
pub const EXECUTION_MODEL_TESSELLATION_CONTROL: u32 = 1;
pub const EXECUTION_MODEL_TESSELLATION_EVALUATION: u32 = 2;
pub const EXECUTION_MODEL_GEOMETRY: u32 = 3;
pub const EXECUTION_MODEL_FRAGMENT: u32 = 4;
pub const EXECUTION_MODEL_GL_COMPUTE: u32 = 5;
pub const EXECUTION_MODEL_KERNEL: u32 = 6;
pub const EXECUTION_MODEL_TASK_NV: u32 = 5267;
pub const EXECUTION_MODEL_MESH_NV: u32 = 5268;
pub const EXECUTION_MODEL_TASK_EXT: u32 = 5364;
pub const EXECUTION_MODEL_MESH_EXT: u32 = 5365;

// Execution modes
pub const EXECUTION_MODE_LOCAL_SIZE: u32 = 17;
pub const EXECUTION_MODE_LOCAL_SIZE_ID: u32 = 38;

// Decorations
pub const DECORATION_BINDING: u32 = 33;
pub const DECORATION_DESCRIPTOR_SET: u32 = 34;

// Storage classes
pub const STORAGE_CLASS_UNIFORM_CONSTANT: u32 = 0;
pub const STORAGE_CLASS_INPUT: u32 = 1;
pub const STORAGE_CLASS_UNIFORM: u32 = 2;
pub const STORAGE_CLASS_OUTPUT: u32 = 3;
pub const STORAGE_CLASS_PUSH_CONSTANT: u32 = 9;
pub const STORAGE_CLASS_STORAGE_BUFFER: u32 = 12;
