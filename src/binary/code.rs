use binary::instruction::{Instruction, ValueType};
use binary::lazy::LazySection;
use error::{Error, Errors};
use features::Features;
use reader::{Reader, Read, FallibleIterator};

/// One function body from the code section.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Code<'a> {
    pub body: &'a [u8],
}

impl<'a> Read<Code<'a>> for Reader<'a> {
    fn read(&mut self) -> Result<Code<'a>, Error> {
        let body = self.read()?;
        Ok(Code { body })
    }
}

/// A run of `count` locals of the same type.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Locals {
    pub count: u32,
    pub ty: ValueType,
}

impl<'a> Read<Locals> for Reader<'a> {
    fn read(&mut self) -> Result<Locals, Error> {
        let count = self.read_var_u32()?;
        let ty = self.read()?;
        Ok(Locals { count, ty })
    }
}

impl<'a> Code<'a> {
    pub fn locals<E: Errors>(&self, features: Features, errors: E) -> LazySection<'a, Locals, E> {
        LazySection::new(self.body, features, errors)
    }

    pub fn instructions(&self, features: Features) -> InstructionIterator<'a> {
        InstructionIterator::new(Reader::with_features(self.body, features))
    }
}

enum State {
    Start,
    Instr,
    Done,
}

/// Skips the local declarations, then yields instructions until the body
/// is exhausted. Stops after the first error.
pub struct InstructionIterator<'a> {
    base: Reader<'a>,
    r: Reader<'a>,
    state: State,
}

impl<'a> InstructionIterator<'a> {
    pub fn new(r: Reader<'a>) -> Self {
        InstructionIterator { base: r.clone(), r, state: State::Start }
    }

    /// Starts at an expression with no local declarations in front of it,
    /// e.g. `Code::locals(..).rest()` once the locals are exhausted.
    pub fn from_expression(r: Reader<'a>) -> Self {
        InstructionIterator { base: r.clone(), r, state: State::Instr }
    }

    /// Offset of the next instruction from the start of the body.
    pub fn offset(&self) -> usize {
        self.r.offset_from(&self.base)
    }

    fn skip_locals(&mut self) -> Result<(), Error> {
        let count = self.r.read_var_u32()?;
        for _ in 0..count {
            let _: Locals = self.r.read()?;
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Instruction>, Error> {
        loop {
            match self.state {
                State::Start => {
                    self.skip_locals()?;
                    self.state = State::Instr;
                }
                State::Instr => {
                    if self.r.is_empty() {
                        self.state = State::Done;
                        return Ok(None)
                    }
                    return self.r.read().map(Some)
                }
                State::Done => return Ok(None),
            }
        }
    }
}

impl<'a> FallibleIterator for InstructionIterator<'a> {
    type Item = Instruction;
    type Error = Error;

    fn next(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        let result = self.step();
        if let Err(e) = result {
            debug!("instruction at {:#x}: {:?}", self.offset(), e);
            self.state = State::Done;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binary::instruction::{BlockType, Immediate, MemArgImmediate};
    use binary::opcode::Opcode;
    use error::{ErrorAt, ErrorList};
    use features::Feature;

    // (local i32 i32) (local f64)
    // block i32; local.get 0; i32.load 2 4; end; drop; end
    const BODY: &[u8] = b"\x02\x02\x7f\x01\x7c\x02\x7f\x20\x00\x28\x02\x04\x0b\x1a\x0b";

    #[test]
    fn test_locals() {
        let code = Code { body: BODY };
        let mut errors = ErrorList::new();
        {
            let mut locals = code.locals(Features::default(), &mut errors);
            assert_eq!(locals.next(), Ok(Some(Locals { count: 2, ty: ValueType::I32 })));
            assert_eq!(locals.next(), Ok(Some(Locals { count: 1, ty: ValueType::F64 })));
            assert_eq!(locals.next(), Ok(None));
            assert_eq!(locals.rest(), &BODY[5..]);
        }
        assert!(errors.is_empty());
    }

    #[test]
    fn test_bad_locals() {
        let code = Code { body: b"\x01\x01\x7b\x0b" };
        let mut errors = ErrorList::new();
        {
            let mut locals = code.locals(Features::default(), &mut errors);
            assert_eq!(locals.next(), Err(Error::InvalidValueType(0x7b)));
        }
        assert_eq!(errors.errors(), &[ErrorAt { offset: 1, error: Error::InvalidValueType(0x7b) }]);
        assert_eq!(code.instructions(Features::default()).next(), Err(Error::InvalidValueType(0x7b)));
    }

    #[test]
    fn test_instructions() {
        let code = Code { body: BODY };
        let mut it = code.instructions(Features::default());
        assert_eq!(it.next(), Ok(Some(Instruction::with_immediate(Opcode::Block, BlockType::Value(ValueType::I32)))));
        assert_eq!(it.offset(), 7);
        assert_eq!(it.next(), Ok(Some(Instruction { opcode: Opcode::LocalGet, immediate: Immediate::Index(0) })));
        assert_eq!(it.next(), Ok(Some(Instruction::with_immediate(Opcode::I32Load, MemArgImmediate { align_log2: 2, offset: 4 }))));
        assert_eq!(it.next(), Ok(Some(Instruction::new(Opcode::End))));
        assert_eq!(it.next(), Ok(Some(Instruction::new(Opcode::Drop))));
        assert_eq!(it.next(), Ok(Some(Instruction::new(Opcode::End))));
        assert_eq!(it.next(), Ok(None));
        assert_eq!(it.next(), Ok(None));
    }

    #[test]
    fn test_from_expression() {
        let code = Code { body: BODY };
        let mut locals = code.locals(Features::default(), ErrorList::new());
        while let Some(_) = locals.next().unwrap() {}
        let mut it = InstructionIterator::from_expression(Reader::new(locals.rest()));
        assert_eq!(it.offset(), 0);
        assert_eq!(it.next(), Ok(Some(Instruction::with_immediate(Opcode::Block, BlockType::Value(ValueType::I32)))));
        assert_eq!(it.offset(), 2);
    }

    #[test]
    fn test_instruction_error_stops() {
        let body = b"\x00\xc0\x6a";
        let code = Code { body };
        let mut it = code.instructions(Features::default());
        assert_eq!(it.next(), Err(Error::FeatureDisabled(Feature::SignExtension)));
        assert_eq!(it.next(), Ok(None));

        let mut features = Features::default();
        features.enable(Feature::SignExtension);
        let mut it = code.instructions(features);
        let mut opcodes = Vec::new();
        while let Some(instr) = it.next().unwrap() {
            opcodes.push(instr.opcode);
        }
        assert_eq!(opcodes, vec![Opcode::I32Extend8S, Opcode::I32Add]);
    }

    #[test]
    fn test_code_section() {
        let section = b"\x02\x02\x00\x0b\x03\x00\x01\x0b";
        let mut bodies: LazySection<Code, ErrorList> = LazySection::new(section, Features::default(), ErrorList::new());
        assert_eq!(bodies.next(), Ok(Some(Code { body: b"\x00\x0b" })));
        assert_eq!(bodies.next(), Ok(Some(Code { body: b"\x00\x01\x0b" })));
        assert_eq!(bodies.next(), Ok(None));
    }
}
