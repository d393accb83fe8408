use binary::Index;
use binary::opcode::{Opcode, ImmediateKind};
use error::Error;
use floathex;
use reader::{Reader, Read};

use alloc::vec::Vec;
use core::cmp;
use core::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ValueType {
    I32,
    I64,
    F32,
    F64,
}

impl ValueType {
    pub fn from_u8(code: u8) -> Option<ValueType> {
        Some(match code {
            0x7f => ValueType::I32,
            0x7e => ValueType::I64,
            0x7d => ValueType::F32,
            0x7c => ValueType::F64,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            ValueType::I32 => "i32",
            ValueType::I64 => "i64",
            ValueType::F32 => "f32",
            ValueType::F64 => "f64",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl<'a> Read<ValueType> for Reader<'a> {
    fn read(&mut self) -> Result<ValueType, Error> {
        let code = self.read_u8()?;
        ValueType::from_u8(code).ok_or(Error::InvalidValueType(code))
    }
}

/// The signature of a `block`, `loop` or `if`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BlockType {
    Void,
    Value(ValueType),
    /// A type index; only decoded when multi-value is enabled.
    Index(Index),
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            BlockType::Void => Ok(()),
            BlockType::Value(t) => write!(f, "{}", t),
            BlockType::Index(index) => write!(f, "(type {})", index),
        }
    }
}

impl<'a> Read<BlockType> for Reader<'a> {
    fn read(&mut self) -> Result<BlockType, Error> {
        match self.rest().first() {
            Some(&0x40) => {
                self.read_u8()?;
                return Ok(BlockType::Void)
            }
            Some(&code) => if let Some(t) = ValueType::from_u8(code) {
                self.read_u8()?;
                return Ok(BlockType::Value(t))
            },
            None => return Err(Error::UnexpectedEof),
        }
        if !self.features().multi_value {
            return Err(Error::InvalidBlockType)
        }
        let index = self.read_var_i33()?;
        if index < 0 {
            return Err(Error::InvalidBlockType)
        }
        Ok(BlockType::Index(index as Index))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CallIndirectImmediate {
    pub index: Index,
    pub reserved: u8,
}

impl<'a> Read<CallIndirectImmediate> for Reader<'a> {
    fn read(&mut self) -> Result<CallIndirectImmediate, Error> {
        let index = self.read_var_u32()?;
        let reserved = self.read_u8()?;
        if reserved != 0 {
            return Err(Error::InvalidReserved(reserved))
        }
        Ok(CallIndirectImmediate { index, reserved })
    }
}

/// `targets` keeps the encoding order; the default target is separate.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BrTableImmediate {
    pub targets: Vec<Index>,
    pub default_target: Index,
}

impl<'a> Read<BrTableImmediate> for Reader<'a> {
    fn read(&mut self) -> Result<BrTableImmediate, Error> {
        let count = self.read_var_u32()?;
        let mut targets = Vec::with_capacity(cmp::min(count as usize, self.len()));
        for _ in 0..count {
            targets.push(self.read_var_u32()?);
        }
        let default_target = self.read_var_u32()?;
        Ok(BrTableImmediate { targets, default_target })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct MemArgImmediate {
    pub align_log2: u32,
    pub offset: u32,
}

impl<'a> Read<MemArgImmediate> for Reader<'a> {
    fn read(&mut self) -> Result<MemArgImmediate, Error> {
        let align_log2 = self.read_var_u32()?;
        let offset = self.read_var_u32()?;
        Ok(MemArgImmediate { align_log2, offset })
    }
}

/// The operand attached to an opcode. Which variant is present is decided
/// by `Opcode::immediate_kind`.
///
/// Equality is per variant and field by field. Two immediates of different
/// variants are never equal. Floats compare by bit pattern, so a NaN
/// constant equals itself and `0.0` differs from `-0.0`.
#[derive(Debug, Clone)]
pub enum Immediate {
    Empty,
    BlockType(BlockType),
    Index(Index),
    CallIndirect(CallIndirectImmediate),
    BrTable(BrTableImmediate),
    U8(u8),
    MemArg(MemArgImmediate),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Immediate {
    pub fn kind(&self) -> ImmediateKind {
        match *self {
            Immediate::Empty => ImmediateKind::Empty,
            Immediate::BlockType(_) => ImmediateKind::BlockType,
            Immediate::Index(_) => ImmediateKind::Index,
            Immediate::CallIndirect(_) => ImmediateKind::CallIndirect,
            Immediate::BrTable(_) => ImmediateKind::BrTable,
            Immediate::U8(_) => ImmediateKind::U8,
            Immediate::MemArg(_) => ImmediateKind::MemArg,
            Immediate::I32(_) => ImmediateKind::I32,
            Immediate::I64(_) => ImmediateKind::I64,
            Immediate::F32(_) => ImmediateKind::F32,
            Immediate::F64(_) => ImmediateKind::F64,
        }
    }
}

impl PartialEq for Immediate {
    fn eq(&self, other: &Immediate) -> bool {
        match (self, other) {
            (&Immediate::Empty, &Immediate::Empty) => true,
            (&Immediate::BlockType(a), &Immediate::BlockType(b)) => a == b,
            (&Immediate::Index(a), &Immediate::Index(b)) => a == b,
            (&Immediate::CallIndirect(a), &Immediate::CallIndirect(b)) => a == b,
            (&Immediate::BrTable(ref a), &Immediate::BrTable(ref b)) => a == b,
            (&Immediate::U8(a), &Immediate::U8(b)) => a == b,
            (&Immediate::MemArg(a), &Immediate::MemArg(b)) => a == b,
            (&Immediate::I32(a), &Immediate::I32(b)) => a == b,
            (&Immediate::I64(a), &Immediate::I64(b)) => a == b,
            (&Immediate::F32(a), &Immediate::F32(b)) => a.to_bits() == b.to_bits(),
            (&Immediate::F64(a), &Immediate::F64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Immediate {}

impl fmt::Display for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Immediate::Empty => Ok(()),
            Immediate::BlockType(t) => write!(f, "{}", t),
            Immediate::Index(index) => write!(f, "{}", index),
            Immediate::CallIndirect(imm) => write!(f, "{} {}", imm.index, imm.reserved),
            Immediate::BrTable(ref imm) => {
                for target in imm.targets.iter() {
                    write!(f, "{} ", target)?;
                }
                write!(f, "{}", imm.default_target)
            }
            Immediate::U8(v) => write!(f, "{}", v),
            Immediate::MemArg(imm) => write!(f, "{} {}", imm.align_log2, imm.offset),
            Immediate::I32(v) => write!(f, "{}", v),
            Immediate::I64(v) => write!(f, "{}", v),
            Immediate::F32(v) => floathex::f32_hex(f, v),
            Immediate::F64(v) => floathex::f64_hex(f, v),
        }
    }
}

impl From<BlockType> for Immediate {
    fn from(other: BlockType) -> Self {
        Immediate::BlockType(other)
    }
}

impl From<CallIndirectImmediate> for Immediate {
    fn from(other: CallIndirectImmediate) -> Self {
        Immediate::CallIndirect(other)
    }
}

impl From<BrTableImmediate> for Immediate {
    fn from(other: BrTableImmediate) -> Self {
        Immediate::BrTable(other)
    }
}

impl From<MemArgImmediate> for Immediate {
    fn from(other: MemArgImmediate) -> Self {
        Immediate::MemArg(other)
    }
}

impl From<i32> for Immediate {
    fn from(other: i32) -> Self {
        Immediate::I32(other)
    }
}

impl From<i64> for Immediate {
    fn from(other: i64) -> Self {
        Immediate::I64(other)
    }
}

impl From<f32> for Immediate {
    fn from(other: f32) -> Self {
        Immediate::F32(other)
    }
}

impl From<f64> for Immediate {
    fn from(other: f64) -> Self {
        Immediate::F64(other)
    }
}

/// A decoded instruction. It only carries data; the decoder is what keeps
/// the immediate in step with the opcode.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Instruction {
    pub opcode: Opcode,
    pub immediate: Immediate,
}

impl Instruction {
    pub fn new(opcode: Opcode) -> Self {
        Instruction { opcode, immediate: Immediate::Empty }
    }

    pub fn with_immediate<I: Into<Immediate>>(opcode: Opcode, immediate: I) -> Self {
        Instruction { opcode, immediate: immediate.into() }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.immediate {
            Immediate::Empty | Immediate::BlockType(BlockType::Void) => write!(f, "{}", self.opcode),
            ref imm => write!(f, "{} {}", self.opcode, imm),
        }
    }
}

impl<'a> Read<Instruction> for Reader<'a> {
    fn read(&mut self) -> Result<Instruction, Error> {
        let opcode: Opcode = self.read()?;
        let immediate = match opcode.immediate_kind() {
            ImmediateKind::Empty => Immediate::Empty,
            ImmediateKind::BlockType => Immediate::BlockType(self.read()?),
            ImmediateKind::Index => Immediate::Index(self.read_var_u32()?),
            ImmediateKind::CallIndirect => Immediate::CallIndirect(self.read()?),
            ImmediateKind::BrTable => Immediate::BrTable(self.read()?),
            ImmediateKind::U8 => {
                let reserved = self.read_u8()?;
                if reserved != 0 {
                    return Err(Error::InvalidReserved(reserved))
                }
                Immediate::U8(reserved)
            }
            ImmediateKind::MemArg => Immediate::MemArg(self.read()?),
            ImmediateKind::I32 => Immediate::I32(self.read_var_i32()?),
            ImmediateKind::I64 => Immediate::I64(self.read_var_i64()?),
            ImmediateKind::F32 => Immediate::F32(self.read_f32()?),
            ImmediateKind::F64 => Immediate::F64(self.read_f64()?),
        };
        Ok(Instruction { opcode, immediate })
    }
}
