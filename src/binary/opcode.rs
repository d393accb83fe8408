use error::Error;
use features::Feature;
use reader::{Reader, Read};

use core::fmt;

pub const MISC_PREFIX: u8 = 0xfc;

/// The shape of the immediate that follows an opcode.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ImmediateKind {
    Empty,
    BlockType,
    Index,
    CallIndirect,
    BrTable,
    U8,
    MemArg,
    I32,
    I64,
    F32,
    F64,
}

macro_rules! opcodes {
    (
        $( ($code:tt, $name:ident, $text:expr, $kind:ident), )*
        misc {
            $( ($mcode:tt, $mname:ident, $mtext:expr, $mkind:ident), )*
        }
    ) => {
        #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
        pub enum Opcode {
            $( $name, )*
            $( $mname, )*
        }

        impl Opcode {
            pub fn from_u8(code: u8) -> Option<Opcode> {
                match code {
                    $( $code => Some(Opcode::$name), )*
                    _ => None,
                }
            }

            pub fn from_misc(code: u32) -> Option<Opcode> {
                match code {
                    $( $mcode => Some(Opcode::$mname), )*
                    _ => None,
                }
            }

            /// The opcode byte, or the LEB128 code after the prefix byte.
            pub fn code(&self) -> u32 {
                match *self {
                    $( Opcode::$name => $code, )*
                    $( Opcode::$mname => $mcode, )*
                }
            }

            pub fn prefix(&self) -> Option<u8> {
                match *self {
                    $( Opcode::$mname => Some(MISC_PREFIX), )*
                    _ => None,
                }
            }

            pub fn text(&self) -> &'static str {
                match *self {
                    $( Opcode::$name => $text, )*
                    $( Opcode::$mname => $mtext, )*
                }
            }

            pub fn immediate_kind(&self) -> ImmediateKind {
                match *self {
                    $( Opcode::$name => ImmediateKind::$kind, )*
                    $( Opcode::$mname => ImmediateKind::$mkind, )*
                }
            }
        }
    }
}

opcodes! {
    (0x00, Unreachable, "unreachable", Empty),
    (0x01, Nop, "nop", Empty),
    (0x02, Block, "block", BlockType),
    (0x03, Loop, "loop", BlockType),
    (0x04, If, "if", BlockType),
    (0x05, Else, "else", Empty),
    (0x0b, End, "end", Empty),
    (0x0c, Br, "br", Index),
    (0x0d, BrIf, "br_if", Index),
    (0x0e, BrTable, "br_table", BrTable),
    (0x0f, Return, "return", Empty),
    (0x10, Call, "call", Index),
    (0x11, CallIndirect, "call_indirect", CallIndirect),
    (0x1a, Drop, "drop", Empty),
    (0x1b, Select, "select", Empty),
    (0x20, LocalGet, "local.get", Index),
    (0x21, LocalSet, "local.set", Index),
    (0x22, LocalTee, "local.tee", Index),
    (0x23, GlobalGet, "global.get", Index),
    (0x24, GlobalSet, "global.set", Index),
    (0x28, I32Load, "i32.load", MemArg),
    (0x29, I64Load, "i64.load", MemArg),
    (0x2a, F32Load, "f32.load", MemArg),
    (0x2b, F64Load, "f64.load", MemArg),
    (0x2c, I32Load8S, "i32.load8_s", MemArg),
    (0x2d, I32Load8U, "i32.load8_u", MemArg),
    (0x2e, I32Load16S, "i32.load16_s", MemArg),
    (0x2f, I32Load16U, "i32.load16_u", MemArg),
    (0x30, I64Load8S, "i64.load8_s", MemArg),
    (0x31, I64Load8U, "i64.load8_u", MemArg),
    (0x32, I64Load16S, "i64.load16_s", MemArg),
    (0x33, I64Load16U, "i64.load16_u", MemArg),
    (0x34, I64Load32S, "i64.load32_s", MemArg),
    (0x35, I64Load32U, "i64.load32_u", MemArg),
    (0x36, I32Store, "i32.store", MemArg),
    (0x37, I64Store, "i64.store", MemArg),
    (0x38, F32Store, "f32.store", MemArg),
    (0x39, F64Store, "f64.store", MemArg),
    (0x3a, I32Store8, "i32.store8", MemArg),
    (0x3b, I32Store16, "i32.store16", MemArg),
    (0x3c, I64Store8, "i64.store8", MemArg),
    (0x3d, I64Store16, "i64.store16", MemArg),
    (0x3e, I64Store32, "i64.store32", MemArg),
    (0x3f, MemorySize, "memory.size", U8),
    (0x40, MemoryGrow, "memory.grow", U8),
    (0x41, I32Const, "i32.const", I32),
    (0x42, I64Const, "i64.const", I64),
    (0x43, F32Const, "f32.const", F32),
    (0x44, F64Const, "f64.const", F64),
    (0x45, I32Eqz, "i32.eqz", Empty),
    (0x46, I32Eq, "i32.eq", Empty),
    (0x47, I32Ne, "i32.ne", Empty),
    (0x48, I32LtS, "i32.lt_s", Empty),
    (0x49, I32LtU, "i32.lt_u", Empty),
    (0x4a, I32GtS, "i32.gt_s", Empty),
    (0x4b, I32GtU, "i32.gt_u", Empty),
    (0x4c, I32LeS, "i32.le_s", Empty),
    (0x4d, I32LeU, "i32.le_u", Empty),
    (0x4e, I32GeS, "i32.ge_s", Empty),
    (0x4f, I32GeU, "i32.ge_u", Empty),
    (0x50, I64Eqz, "i64.eqz", Empty),
    (0x51, I64Eq, "i64.eq", Empty),
    (0x52, I64Ne, "i64.ne", Empty),
    (0x53, I64LtS, "i64.lt_s", Empty),
    (0x54, I64LtU, "i64.lt_u", Empty),
    (0x55, I64GtS, "i64.gt_s", Empty),
    (0x56, I64GtU, "i64.gt_u", Empty),
    (0x57, I64LeS, "i64.le_s", Empty),
    (0x58, I64LeU, "i64.le_u", Empty),
    (0x59, I64GeS, "i64.ge_s", Empty),
    (0x5a, I64GeU, "i64.ge_u", Empty),
    (0x5b, F32Eq, "f32.eq", Empty),
    (0x5c, F32Ne, "f32.ne", Empty),
    (0x5d, F32Lt, "f32.lt", Empty),
    (0x5e, F32Gt, "f32.gt", Empty),
    (0x5f, F32Le, "f32.le", Empty),
    (0x60, F32Ge, "f32.ge", Empty),
    (0x61, F64Eq, "f64.eq", Empty),
    (0x62, F64Ne, "f64.ne", Empty),
    (0x63, F64Lt, "f64.lt", Empty),
    (0x64, F64Gt, "f64.gt", Empty),
    (0x65, F64Le, "f64.le", Empty),
    (0x66, F64Ge, "f64.ge", Empty),
    (0x67, I32Clz, "i32.clz", Empty),
    (0x68, I32Ctz, "i32.ctz", Empty),
    (0x69, I32Popcnt, "i32.popcnt", Empty),
    (0x6a, I32Add, "i32.add", Empty),
    (0x6b, I32Sub, "i32.sub", Empty),
    (0x6c, I32Mul, "i32.mul", Empty),
    (0x6d, I32DivS, "i32.div_s", Empty),
    (0x6e, I32DivU, "i32.div_u", Empty),
    (0x6f, I32RemS, "i32.rem_s", Empty),
    (0x70, I32RemU, "i32.rem_u", Empty),
    (0x71, I32And, "i32.and", Empty),
    (0x72, I32Or, "i32.or", Empty),
    (0x73, I32Xor, "i32.xor", Empty),
    (0x74, I32Shl, "i32.shl", Empty),
    (0x75, I32ShrS, "i32.shr_s", Empty),
    (0x76, I32ShrU, "i32.shr_u", Empty),
    (0x77, I32Rotl, "i32.rotl", Empty),
    (0x78, I32Rotr, "i32.rotr", Empty),
    (0x79, I64Clz, "i64.clz", Empty),
    (0x7a, I64Ctz, "i64.ctz", Empty),
    (0x7b, I64Popcnt, "i64.popcnt", Empty),
    (0x7c, I64Add, "i64.add", Empty),
    (0x7d, I64Sub, "i64.sub", Empty),
    (0x7e, I64Mul, "i64.mul", Empty),
    (0x7f, I64DivS, "i64.div_s", Empty),
    (0x80, I64DivU, "i64.div_u", Empty),
    (0x81, I64RemS, "i64.rem_s", Empty),
    (0x82, I64RemU, "i64.rem_u", Empty),
    (0x83, I64And, "i64.and", Empty),
    (0x84, I64Or, "i64.or", Empty),
    (0x85, I64Xor, "i64.xor", Empty),
    (0x86, I64Shl, "i64.shl", Empty),
    (0x87, I64ShrS, "i64.shr_s", Empty),
    (0x88, I64ShrU, "i64.shr_u", Empty),
    (0x89, I64Rotl, "i64.rotl", Empty),
    (0x8a, I64Rotr, "i64.rotr", Empty),
    (0x8b, F32Abs, "f32.abs", Empty),
    (0x8c, F32Neg, "f32.neg", Empty),
    (0x8d, F32Ceil, "f32.ceil", Empty),
    (0x8e, F32Floor, "f32.floor", Empty),
    (0x8f, F32Trunc, "f32.trunc", Empty),
    (0x90, F32Nearest, "f32.nearest", Empty),
    (0x91, F32Sqrt, "f32.sqrt", Empty),
    (0x92, F32Add, "f32.add", Empty),
    (0x93, F32Sub, "f32.sub", Empty),
    (0x94, F32Mul, "f32.mul", Empty),
    (0x95, F32Div, "f32.div", Empty),
    (0x96, F32Min, "f32.min", Empty),
    (0x97, F32Max, "f32.max", Empty),
    (0x98, F32Copysign, "f32.copysign", Empty),
    (0x99, F64Abs, "f64.abs", Empty),
    (0x9a, F64Neg, "f64.neg", Empty),
    (0x9b, F64Ceil, "f64.ceil", Empty),
    (0x9c, F64Floor, "f64.floor", Empty),
    (0x9d, F64Trunc, "f64.trunc", Empty),
    (0x9e, F64Nearest, "f64.nearest", Empty),
    (0x9f, F64Sqrt, "f64.sqrt", Empty),
    (0xa0, F64Add, "f64.add", Empty),
    (0xa1, F64Sub, "f64.sub", Empty),
    (0xa2, F64Mul, "f64.mul", Empty),
    (0xa3, F64Div, "f64.div", Empty),
    (0xa4, F64Min, "f64.min", Empty),
    (0xa5, F64Max, "f64.max", Empty),
    (0xa6, F64Copysign, "f64.copysign", Empty),
    (0xa7, I32WrapI64, "i32.wrap_i64", Empty),
    (0xa8, I32TruncF32S, "i32.trunc_f32_s", Empty),
    (0xa9, I32TruncF32U, "i32.trunc_f32_u", Empty),
    (0xaa, I32TruncF64S, "i32.trunc_f64_s", Empty),
    (0xab, I32TruncF64U, "i32.trunc_f64_u", Empty),
    (0xac, I64ExtendI32S, "i64.extend_i32_s", Empty),
    (0xad, I64ExtendI32U, "i64.extend_i32_u", Empty),
    (0xae, I64TruncF32S, "i64.trunc_f32_s", Empty),
    (0xaf, I64TruncF32U, "i64.trunc_f32_u", Empty),
    (0xb0, I64TruncF64S, "i64.trunc_f64_s", Empty),
    (0xb1, I64TruncF64U, "i64.trunc_f64_u", Empty),
    (0xb2, F32ConvertI32S, "f32.convert_i32_s", Empty),
    (0xb3, F32ConvertI32U, "f32.convert_i32_u", Empty),
    (0xb4, F32ConvertI64S, "f32.convert_i64_s", Empty),
    (0xb5, F32ConvertI64U, "f32.convert_i64_u", Empty),
    (0xb6, F32DemoteF64, "f32.demote_f64", Empty),
    (0xb7, F64ConvertI32S, "f64.convert_i32_s", Empty),
    (0xb8, F64ConvertI32U, "f64.convert_i32_u", Empty),
    (0xb9, F64ConvertI64S, "f64.convert_i64_s", Empty),
    (0xba, F64ConvertI64U, "f64.convert_i64_u", Empty),
    (0xbb, F64PromoteF32, "f64.promote_f32", Empty),
    (0xbc, I32ReinterpretF32, "i32.reinterpret_f32", Empty),
    (0xbd, I64ReinterpretF64, "i64.reinterpret_f64", Empty),
    (0xbe, F32ReinterpretI32, "f32.reinterpret_i32", Empty),
    (0xbf, F64ReinterpretI64, "f64.reinterpret_i64", Empty),
    (0xc0, I32Extend8S, "i32.extend8_s", Empty),
    (0xc1, I32Extend16S, "i32.extend16_s", Empty),
    (0xc2, I64Extend8S, "i64.extend8_s", Empty),
    (0xc3, I64Extend16S, "i64.extend16_s", Empty),
    (0xc4, I64Extend32S, "i64.extend32_s", Empty),
    misc {
        (0x00, I32TruncSatF32S, "i32.trunc_sat_f32_s", Empty),
        (0x01, I32TruncSatF32U, "i32.trunc_sat_f32_u", Empty),
        (0x02, I32TruncSatF64S, "i32.trunc_sat_f64_s", Empty),
        (0x03, I32TruncSatF64U, "i32.trunc_sat_f64_u", Empty),
        (0x04, I64TruncSatF32S, "i64.trunc_sat_f32_s", Empty),
        (0x05, I64TruncSatF32U, "i64.trunc_sat_f32_u", Empty),
        (0x06, I64TruncSatF64S, "i64.trunc_sat_f64_s", Empty),
        (0x07, I64TruncSatF64U, "i64.trunc_sat_f64_u", Empty),
    }
}

impl Opcode {
    /// The proposal an opcode belongs to, if it is not part of the MVP.
    pub fn required_feature(&self) -> Option<Feature> {
        use self::Opcode::*;
        match *self {
            I32Extend8S | I32Extend16S | I64Extend8S | I64Extend16S | I64Extend32S => {
                Some(Feature::SignExtension)
            }
            _ if self.prefix().is_some() => Some(Feature::SaturatingFloatToInt),
            _ => None,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl<'a> Read<Opcode> for Reader<'a> {
    fn read(&mut self) -> Result<Opcode, Error> {
        let code = self.read_u8()?;
        let opcode = if code == MISC_PREFIX {
            let code = self.read_var_u32()?;
            Opcode::from_misc(code).ok_or(Error::InvalidMiscOpcode(code))?
        } else {
            Opcode::from_u8(code).ok_or(Error::InvalidOpcode(code))?
        };
        if let Some(feature) = opcode.required_feature() {
            if !self.features().is_enabled(feature) {
                return Err(Error::FeatureDisabled(feature))
            }
        }
        Ok(opcode)
    }
}
