// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Walker
//!
//! One pass over the instruction stream fills an identifier table.  Each record holds the few facts
//! about an id that descriptor reflection needs: what kind of instruction defined it, its type, its
//! storage class, and its set and binding decorations.  The table is sized by the bound in the
//! header, so every id the module mentions has a slot before its definition is seen.
//!
//! Resolution happens afterwards in [`crate::metadata`], since decorations and work-group size ids
//! may refer to ids that are defined later in the stream.

use crate::prelude::*;
use crate::spv;

/// Split the first word of an instruction into `(opcode, word_count)`.  The opcode lives in the
/// low 16 bits and the word count, which includes this word, in the high 16 bits.
pub fn decode_op(word: u32) -> (u16, u16) {
    ((word & 0xffff) as u16, (word >> 16) as u16)
}

/// Which instruction defined an id.  Only the kinds that matter for descriptor reflection are
/// tracked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum IdKind {
    #[default]
    None,
    TypePointer,
    TypeStruct,
    TypeImage,
    TypeSampler,
    TypeSampledImage,
    Constant,
    Variable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageClass {
    UniformConstant,
    Uniform,
    StorageBuffer,
    PushConstant,
    Other(u32),
}

impl From<u32> for StorageClass {
    fn from(raw: u32) -> Self {
        match raw {
            spv::STORAGE_CLASS_UNIFORM_CONSTANT => Self::UniformConstant,
            spv::STORAGE_CLASS_UNIFORM => Self::Uniform,
            spv::STORAGE_CLASS_STORAGE_BUFFER => Self::StorageBuffer,
            spv::STORAGE_CLASS_PUSH_CONSTANT => Self::PushConstant,
            other => Self::Other(other),
        }
    }
}

impl StorageClass {
    /// Storage classes whose variables are backed by descriptors.
    pub fn is_descriptor(&self) -> bool {
        matches!(
            self,
            Self::UniformConstant | Self::Uniform | Self::StorageBuffer
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct IdRecord {
    pub kind: IdKind,
    /// Pointee for pointers, result type for constants and variables.
    pub type_id: u32,
    /// Only set for pointers and variables.
    pub storage_class: Option<StorageClass>,
    pub binding: u32,
    pub set: u32,
    /// Literal value of a 32-bit constant.  Wider constants are recorded with `None`.
    pub constant: Option<u32>,
}

/// The walked module.  Nothing here is checked against the binding model yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Module {
    pub bound: u32,
    /// Raw execution model of the single entry point.
    pub execution_model: Option<u32>,
    /// Literal `LocalSize` execution mode, zeros when absent.
    pub local_size: [u32; 3],
    /// `LocalSizeId` execution mode, resolved against constants once the pass is complete.
    pub local_size_ids: Option<[u32; 3]>,
    pub ids: Vec<IdRecord>,
}

/// One decoded instruction.
#[derive(Clone, Copy, Debug)]
pub struct Instruction<'a> {
    pub opcode: u16,
    /// Word offset of the instruction within the module.
    pub offset: usize,
    pub operands: &'a [u32],
}

impl<'a> Instruction<'a> {
    pub fn operand(&self, index: usize) -> Result<u32, ReflectError> {
        self.operands
            .get(index)
            .copied()
            .ok_or(ReflectError::MissingOperands {
                opcode: self.opcode,
                offset: self.offset,
            })
    }

    fn triple(&self, start: usize) -> Result<[u32; 3], ReflectError> {
        Ok([
            self.operand(start)?,
            self.operand(start + 1)?,
            self.operand(start + 2)?,
        ])
    }
}

/// Iterates instructions after the header.  An overrun or zero-length instruction is reported once
/// and ends iteration.
pub struct Instructions<'a> {
    words: &'a [u32],
    offset: usize,
}

impl<'a> Instructions<'a> {
    pub fn new(module: &'a [u32]) -> Self {
        let start = spv::HEADER_LEN.min(module.len());
        Instructions {
            words: &module[start..],
            offset: start,
        }
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, ReflectError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (opcode, count) = decode_op(*self.words.first()?);
        let count = count as usize;
        let offset = self.offset;

        if count == 0 {
            self.words = &[];
            return Some(Err(ReflectError::ZeroLength { offset }));
        }
        if count > self.words.len() {
            let excess = count - self.words.len();
            self.words = &[];
            return Some(Err(ReflectError::Overrun { offset, excess }));
        }

        let (inst, rest) = self.words.split_at(count);
        self.words = rest;
        self.offset += count;
        Some(Ok(Instruction {
            opcode,
            offset,
            operands: &inst[1..],
        }))
    }
}

impl Module {
    /// Check the header and walk every instruction.
    pub fn parse(words: &[u32]) -> Result<Self, ReflectError> {
        let header = words
            .get(..spv::HEADER_LEN)
            .ok_or(ReflectError::TruncatedHeader(words.len()))?;
        if header[0] != spv::MAGIC {
            return Err(ReflectError::BadMagic(header[0]));
        }

        let bound = header[spv::BOUND_OFFSET];
        let mut module = Module {
            bound,
            execution_model: None,
            local_size: [0; 3],
            local_size_ids: None,
            ids: vec![IdRecord::default(); bound as usize],
        };

        for inst in Instructions::new(words) {
            module.visit(&inst?)?;
        }
        Ok(module)
    }

    pub fn record(&self, id: u32) -> Result<&IdRecord, ReflectError> {
        self.ids.get(id as usize).ok_or(ReflectError::IdOutOfBounds {
            id,
            bound: self.bound,
        })
    }

    fn record_mut(&mut self, id: u32) -> Result<&mut IdRecord, ReflectError> {
        let bound = self.bound;
        self.ids
            .get_mut(id as usize)
            .ok_or(ReflectError::IdOutOfBounds { id, bound })
    }

    /// Claim `id` for a defining instruction.  Each id has exactly one definition.
    fn define(&mut self, id: u32, kind: IdKind) -> Result<&mut IdRecord, ReflectError> {
        let record = self.record_mut(id)?;
        if record.kind != IdKind::None {
            return Err(ReflectError::DuplicateDefinition(id));
        }
        record.kind = kind;
        Ok(record)
    }

    fn visit(&mut self, inst: &Instruction<'_>) -> Result<(), ReflectError> {
        match inst.opcode {
            spv::OP_ENTRY_POINT => {
                let model = inst.operand(0)?;
                if self.execution_model.replace(model).is_some() {
                    return Err(ReflectError::MultipleEntryPoints);
                }
            }
            spv::OP_EXECUTION_MODE => {
                if inst.operand(1)? == spv::EXECUTION_MODE_LOCAL_SIZE {
                    self.local_size = inst.triple(2)?;
                }
            }
            spv::OP_EXECUTION_MODE_ID => {
                if inst.operand(1)? == spv::EXECUTION_MODE_LOCAL_SIZE_ID {
                    self.local_size_ids = Some(inst.triple(2)?);
                }
            }
            spv::OP_DECORATE => {
                let id = inst.operand(0)?;
                match inst.operand(1)? {
                    spv::DECORATION_DESCRIPTOR_SET => self.record_mut(id)?.set = inst.operand(2)?,
                    spv::DECORATION_BINDING => self.record_mut(id)?.binding = inst.operand(2)?,
                    _ => {}
                }
            }
            spv::OP_TYPE_STRUCT => {
                self.define(inst.operand(0)?, IdKind::TypeStruct)?;
            }
            spv::OP_TYPE_IMAGE => {
                self.define(inst.operand(0)?, IdKind::TypeImage)?;
            }
            spv::OP_TYPE_SAMPLER => {
                self.define(inst.operand(0)?, IdKind::TypeSampler)?;
            }
            spv::OP_TYPE_SAMPLED_IMAGE => {
                self.define(inst.operand(0)?, IdKind::TypeSampledImage)?;
            }
            spv::OP_TYPE_POINTER => {
                let (id, class, pointee) = (inst.operand(0)?, inst.operand(1)?, inst.operand(2)?);
                let record = self.define(id, IdKind::TypePointer)?;
                record.storage_class = Some(class.into());
                record.type_id = pointee;
            }
            spv::OP_CONSTANT => {
                let (ty, id, value) = (inst.operand(0)?, inst.operand(1)?, inst.operand(2)?);
                // Type, result and exactly one literal word.  Anything longer is a 64-bit literal.
                let narrow = inst.operands.len() == 3;
                let record = self.define(id, IdKind::Constant)?;
                record.type_id = ty;
                record.constant = narrow.then_some(value);
            }
            spv::OP_VARIABLE => {
                let (ty, id, class) = (inst.operand(0)?, inst.operand(1)?, inst.operand(2)?);
                let record = self.define(id, IdKind::Variable)?;
                record.type_id = ty;
                record.storage_class = Some(class.into());
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assembler::Assembler;

    #[test]
    fn test_decode_op_bit_layout() {
        assert_eq!(decode_op(0x0004_003b), (spv::OP_VARIABLE, 4));
        assert_eq!(decode_op(0xffff_0000), (0, 0xffff));
        assert_eq!(decode_op(0x0000_ffff), (0xffff, 0));
        assert_eq!(decode_op(0x0006_014b), (spv::OP_EXECUTION_MODE_ID, 6));
    }

    #[test]
    fn test_bad_magic() {
        let mut words = Assembler::new().finish();
        words[0] = 0xdead_beef;
        assert_eq!(Module::parse(&words), Err(ReflectError::BadMagic(0xdead_beef)));
    }

    #[test]
    fn test_truncated_header() {
        assert_eq!(
            Module::parse(&[spv::MAGIC, 0x0001_0000]),
            Err(ReflectError::TruncatedHeader(2))
        );
    }

    #[test]
    fn test_table_sized_to_bound() {
        let mut asm = Assembler::new();
        asm.id();
        asm.id();
        let module = Module::parse(&asm.finish()).unwrap();
        assert_eq!(module.bound, 3);
        assert_eq!(module.ids.len(), 3);
        assert!(module.ids.iter().all(|r| *r == IdRecord::default()));
    }

    #[test]
    fn test_overrun() {
        let mut words = Assembler::new().finish();
        // Claims four words, only two follow.
        words.extend([(4 << 16) | spv::OP_VARIABLE as u32, 1]);
        assert_eq!(
            Module::parse(&words),
            Err(ReflectError::Overrun {
                offset: spv::HEADER_LEN,
                excess: 2
            })
        );
    }

    #[test]
    fn test_zero_length_instruction() {
        let mut words = Assembler::new().finish();
        words.push(spv::OP_VARIABLE as u32);
        assert_eq!(
            Module::parse(&words),
            Err(ReflectError::ZeroLength {
                offset: spv::HEADER_LEN
            })
        );
    }

    #[test]
    fn test_missing_operands() {
        let mut asm = Assembler::new();
        asm.inst(spv::OP_TYPE_POINTER, &[1]);
        asm.id();
        assert_eq!(
            Module::parse(&asm.finish()),
            Err(ReflectError::MissingOperands {
                opcode: spv::OP_TYPE_POINTER,
                offset: spv::HEADER_LEN
            })
        );
    }

    #[test]
    fn test_duplicate_definition() {
        let mut asm = Assembler::new();
        let id = asm.id();
        asm.type_sampler(id);
        asm.type_sampler(id);
        assert_eq!(
            Module::parse(&asm.finish()),
            Err(ReflectError::DuplicateDefinition(id))
        );
    }

    #[test]
    fn test_id_out_of_bounds() {
        let mut asm = Assembler::new();
        asm.id();
        asm.decorate_binding(9, 0, 0);
        assert_eq!(
            Module::parse(&asm.finish()),
            Err(ReflectError::IdOutOfBounds { id: 9, bound: 2 })
        );
    }

    #[test]
    fn test_multiple_entry_points() {
        let mut asm = Assembler::new();
        let main = asm.id();
        asm.entry_point(spv::EXECUTION_MODEL_VERTEX, main);
        asm.entry_point(spv::EXECUTION_MODEL_FRAGMENT, main);
        assert_eq!(
            Module::parse(&asm.finish()),
            Err(ReflectError::MultipleEntryPoints)
        );
    }

    #[test]
    fn test_records() {
        let mut asm = Assembler::new();
        let main = asm.id();
        let int = asm.id();
        let block = asm.id();
        let ptr = asm.id();
        let var = asm.id();
        let size = asm.id();
        asm.entry_point(spv::EXECUTION_MODEL_GL_COMPUTE, main);
        asm.execution_mode_local_size(main, [4, 2, 1]);
        asm.decorate_binding(var, 0, 7);
        asm.type_int(int);
        asm.type_struct(block, &[int]);
        asm.type_pointer(ptr, spv::STORAGE_CLASS_STORAGE_BUFFER, block);
        asm.constant(size, int, 64);
        asm.variable(var, ptr, spv::STORAGE_CLASS_STORAGE_BUFFER);

        let module = Module::parse(&asm.finish()).unwrap();
        assert_eq!(module.execution_model, Some(spv::EXECUTION_MODEL_GL_COMPUTE));
        assert_eq!(module.local_size, [4, 2, 1]);
        assert_eq!(module.local_size_ids, None);
        // Integer types are not tracked.
        assert_eq!(module.record(int).unwrap().kind, IdKind::None);
        assert_eq!(module.record(block).unwrap().kind, IdKind::TypeStruct);
        assert_eq!(
            *module.record(ptr).unwrap(),
            IdRecord {
                kind: IdKind::TypePointer,
                type_id: block,
                storage_class: Some(StorageClass::StorageBuffer),
                ..Default::default()
            }
        );
        assert_eq!(module.record(size).unwrap().constant, Some(64));
        assert_eq!(
            *module.record(var).unwrap(),
            IdRecord {
                kind: IdKind::Variable,
                type_id: ptr,
                storage_class: Some(StorageClass::StorageBuffer),
                binding: 7,
                set: 0,
                constant: None,
            }
        );
    }

    #[test]
    fn test_wide_constant_has_no_literal() {
        let mut asm = Assembler::new();
        let long = asm.id();
        let value = asm.id();
        asm.inst(spv::OP_TYPE_INT, &[long, 64, 0]);
        asm.inst(spv::OP_CONSTANT, &[long, value, 1, 0]);
        let module = Module::parse(&asm.finish()).unwrap();
        let record = module.record(value).unwrap();
        assert_eq!(record.kind, IdKind::Constant);
        assert_eq!(record.constant, None);
    }

    #[test]
    fn test_unknown_opcodes_skipped() {
        let mut asm = Assembler::new();
        asm.inst(17, &[1]); // OpCapability Shader
        asm.inst(14, &[0, 1]); // OpMemoryModel Logical GLSL450
        let module = Module::parse(&asm.finish()).unwrap();
        assert_eq!(module.execution_model, None);
    }
}
