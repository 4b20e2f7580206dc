// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Assembler
//!
//! Just enough of a SPIR-V writer to hand-build modules for tests.  Nothing is validated.  The
//! bound in the emitted header is one past the last id handed out by [`Assembler::id`], so raw ids
//! beyond that can be used to provoke out-of-bounds errors.

use crate::spv;

#[derive(Debug)]
pub struct Assembler {
    next_id: u32,
    body: Vec<u32>,
}

impl Default for Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl Assembler {
    pub fn new() -> Self {
        Assembler {
            next_id: 1,
            body: Vec::new(),
        }
    }

    /// Reserve a fresh result id.
    pub fn id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Emit any instruction.  The word count is derived from the operands.
    pub fn inst(&mut self, opcode: u16, operands: &[u32]) {
        let count = operands.len() as u32 + 1;
        self.body.push((count << 16) | opcode as u32);
        self.body.extend_from_slice(operands);
    }

    pub fn finish(&self) -> Vec<u32> {
        let mut words = vec![spv::MAGIC, 0x0001_0300, 0, self.next_id, 0];
        words.extend_from_slice(&self.body);
        words
    }

    pub fn entry_point(&mut self, model: u32, function: u32) {
        let mut operands = vec![model, function];
        operands.extend(string_words("main"));
        self.inst(spv::OP_ENTRY_POINT, &operands);
    }

    pub fn execution_mode_local_size(&mut self, function: u32, size: [u32; 3]) {
        self.inst(
            spv::OP_EXECUTION_MODE,
            &[function, spv::EXECUTION_MODE_LOCAL_SIZE, size[0], size[1], size[2]],
        );
    }

    pub fn execution_mode_local_size_id(&mut self, function: u32, ids: [u32; 3]) {
        self.inst(
            spv::OP_EXECUTION_MODE_ID,
            &[function, spv::EXECUTION_MODE_LOCAL_SIZE_ID, ids[0], ids[1], ids[2]],
        );
    }

    pub fn decorate_binding(&mut self, id: u32, set: u32, binding: u32) {
        self.inst(
            spv::OP_DECORATE,
            &[id, spv::DECORATION_DESCRIPTOR_SET, set],
        );
        self.inst(spv::OP_DECORATE, &[id, spv::DECORATION_BINDING, binding]);
    }

    /// 32-bit unsigned integer.
    pub fn type_int(&mut self, id: u32) {
        self.inst(spv::OP_TYPE_INT, &[id, 32, 0]);
    }

    pub fn type_struct(&mut self, id: u32, members: &[u32]) {
        let mut operands = vec![id];
        operands.extend_from_slice(members);
        self.inst(spv::OP_TYPE_STRUCT, &operands);
    }

    /// 2D storage image over `sampled` with an unknown format.
    pub fn type_image(&mut self, id: u32, sampled: u32) {
        self.inst(spv::OP_TYPE_IMAGE, &[id, sampled, 1, 0, 0, 0, 2, 0]);
    }

    pub fn type_sampler(&mut self, id: u32) {
        self.inst(spv::OP_TYPE_SAMPLER, &[id]);
    }

    pub fn type_sampled_image(&mut self, id: u32, image: u32) {
        self.inst(spv::OP_TYPE_SAMPLED_IMAGE, &[id, image]);
    }

    pub fn type_pointer(&mut self, id: u32, storage_class: u32, pointee: u32) {
        self.inst(spv::OP_TYPE_POINTER, &[id, storage_class, pointee]);
    }

    pub fn constant(&mut self, id: u32, ty: u32, value: u32) {
        self.inst(spv::OP_CONSTANT, &[ty, id, value]);
    }

    pub fn variable(&mut self, id: u32, pointer: u32, storage_class: u32) {
        self.inst(spv::OP_VARIABLE, &[pointer, id, storage_class]);
    }

    // Whole resources.  Each call declares its own types, returning the variable id.

    pub fn storage_buffer(&mut self, binding: u32) -> u32 {
        let (int, block) = (self.id(), self.id());
        self.type_int(int);
        self.type_struct(block, &[int]);
        self.resource(block, spv::STORAGE_CLASS_STORAGE_BUFFER, binding)
    }

    pub fn storage_image(&mut self, binding: u32) -> u32 {
        let image = self.image();
        self.resource(image, spv::STORAGE_CLASS_UNIFORM_CONSTANT, binding)
    }

    pub fn sampler(&mut self, binding: u32) -> u32 {
        let sampler = self.id();
        self.type_sampler(sampler);
        self.resource(sampler, spv::STORAGE_CLASS_UNIFORM_CONSTANT, binding)
    }

    pub fn combined_image_sampler(&mut self, binding: u32) -> u32 {
        let image = self.image();
        let sampled = self.id();
        self.type_sampled_image(sampled, image);
        self.resource(sampled, spv::STORAGE_CLASS_UNIFORM_CONSTANT, binding)
    }

    /// An undecorated push constant block.
    pub fn push_constant_block(&mut self) -> u32 {
        let (int, block, ptr, var) = (self.id(), self.id(), self.id(), self.id());
        self.type_int(int);
        self.type_struct(block, &[int]);
        self.type_pointer(ptr, spv::STORAGE_CLASS_PUSH_CONSTANT, block);
        self.variable(var, ptr, spv::STORAGE_CLASS_PUSH_CONSTANT);
        var
    }

    fn image(&mut self) -> u32 {
        let (float, image) = (self.id(), self.id());
        // OpTypeFloat 32
        self.inst(22, &[float, 32]);
        self.type_image(image, float);
        image
    }

    fn resource(&mut self, pointee: u32, storage_class: u32, binding: u32) -> u32 {
        let (ptr, var) = (self.id(), self.id());
        self.type_pointer(ptr, storage_class, pointee);
        self.variable(var, ptr, storage_class);
        self.decorate_binding(var, 0, binding);
        var
    }
}

/// Nul-terminated, padded to a whole word.
pub fn string_words(s: &str) -> Vec<u32> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    bytes.resize(bytes.len().next_multiple_of(4), 0);
    bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_string_words() {
        assert_eq!(
            string_words("main"),
            vec![u32::from_le_bytes(*b"main"), 0]
        );
        assert_eq!(string_words("cs"), vec![u32::from_le_bytes(*b"cs\0\0")]);
    }

    #[test]
    fn test_header() {
        let mut asm = Assembler::new();
        asm.id();
        assert_eq!(asm.finish(), vec![spv::MAGIC, 0x0001_0300, 0, 2, 0]);
    }
}
