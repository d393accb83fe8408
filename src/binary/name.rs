use binary::Index;
use binary::lazy::LazySection;
use error::{Error, Errors};
use features::Features;
use reader::{Reader, Read, ReadIterator};

use alloc::vec::Vec;
use core::cmp;

/// One name bound to an index.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct NameAssoc<'a> {
    pub index: Index,
    pub name: &'a str,
}

impl<'a> Read<NameAssoc<'a>> for Reader<'a> {
    fn read(&mut self) -> Result<NameAssoc<'a>, Error> {
        let index = self.read()?;
        let name = self.read()?;
        Ok(NameAssoc { index, name })
    }
}

/// A name map bound to an index, e.g. the local names of one function.
/// `name_map` keeps the encoding order.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IndirectNameAssoc<'a> {
    pub index: Index,
    pub name_map: Vec<NameAssoc<'a>>,
}

impl<'a> Read<IndirectNameAssoc<'a>> for Reader<'a> {
    fn read(&mut self) -> Result<IndirectNameAssoc<'a>, Error> {
        let index = self.read()?;
        let count: u32 = self.read()?;
        // Every entry takes at least two bytes.
        let mut name_map = Vec::with_capacity(cmp::min(count as usize, self.len() / 2));
        for _ in 0..count {
            name_map.push(self.read()?);
        }
        Ok(IndirectNameAssoc { index, name_map })
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NameSubsectionId {
    Module,
    Function,
    Local,
    Unknown(u8),
}

impl NameSubsectionId {
    pub fn from_u8(id: u8) -> Self {
        match id {
            0 => NameSubsectionId::Module,
            1 => NameSubsectionId::Function,
            2 => NameSubsectionId::Local,
            _ => NameSubsectionId::Unknown(id),
        }
    }

    pub fn as_str(&self) -> &'static str {
        use self::NameSubsectionId::*;
        match *self {
            Module => "module",
            Function => "function",
            Local => "local",
            Unknown(_) => "unknown",
        }
    }
}

/// One subsection of the "name" custom section.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct NameSubsection<'a> {
    pub id: NameSubsectionId,
    pub data: &'a [u8],
}

impl<'a> Read<NameSubsection<'a>> for Reader<'a> {
    fn read(&mut self) -> Result<NameSubsection<'a>, Error> {
        let id = NameSubsectionId::from_u8(self.read_u8()?);
        let data = self.read()?;
        Ok(NameSubsection { id, data })
    }
}

pub type LazyFunctionNamesSubsection<'a, E> = LazySection<'a, NameAssoc<'a>, E>;
pub type LazyLocalNamesSubsection<'a, E> = LazySection<'a, IndirectNameAssoc<'a>, E>;

pub fn read_function_names_subsection<'a, E: Errors>(data: &'a [u8], features: Features, errors: E) -> LazyFunctionNamesSubsection<'a, E> {
    LazySection::new(data, features, errors)
}

pub fn read_local_names_subsection<'a, E: Errors>(data: &'a [u8], features: Features, errors: E) -> LazyLocalNamesSubsection<'a, E> {
    LazySection::new(data, features, errors)
}

impl<'a> NameSubsection<'a> {
    /// Decodes the body as the function-names table. The caller is
    /// responsible for checking that `id` is `Function`.
    pub fn function_names<E: Errors>(&self, features: Features, errors: E) -> LazyFunctionNamesSubsection<'a, E> {
        read_function_names_subsection(self.data, features, errors)
    }

    /// Decodes the body as the local-names table. The caller is responsible
    /// for checking that `id` is `Local`.
    pub fn local_names<E: Errors>(&self, features: Features, errors: E) -> LazyLocalNamesSubsection<'a, E> {
        read_local_names_subsection(self.data, features, errors)
    }

    /// Decodes the body as the module name.
    pub fn module_name(&self) -> Result<&'a str, Error> {
        Reader::new(self.data).read()
    }
}

pub type NameSection<'a> = ReadIterator<'a, NameSubsection<'a>>;

/// Splits the payload of the "name" custom section into its subsections.
pub fn read_name_section<'a>(data: &'a [u8]) -> NameSection<'a> {
    ReadIterator::new(Reader::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use error::{ErrorAt, ErrorList};
    use reader::FallibleIterator;

    const FUNCTION_NAMES: &[u8] = b"\x03\x00\x04main\x02\x03add\x80\x01\x00";

    fn assoc(index: Index, name: &str) -> NameAssoc {
        NameAssoc { index, name }
    }

    #[test]
    fn test_function_names() {
        let mut errors = ErrorList::new();
        {
            let mut names = read_function_names_subsection(FUNCTION_NAMES, Features::default(), &mut errors);
            assert_eq!(names.declared_count(), Some(3));
            assert_eq!(names.next(), Ok(Some(assoc(0, "main"))));
            assert_eq!(names.next(), Ok(Some(assoc(2, "add"))));
            assert_eq!(names.next(), Ok(Some(assoc(128, ""))));
            assert_eq!(names.next(), Ok(None));
        }
        assert!(errors.is_empty());
    }

    #[test]
    fn test_local_names() {
        let data = b"\x02\x00\x02\x00\x01a\x01\x01b\x05\x00";
        let mut errors = ErrorList::new();
        {
            let mut locals = read_local_names_subsection(data, Features::default(), &mut errors);
            assert_eq!(locals.next(), Ok(Some(IndirectNameAssoc {
                index: 0,
                name_map: vec![assoc(0, "a"), assoc(1, "b")],
            })));
            assert_eq!(locals.next(), Ok(Some(IndirectNameAssoc { index: 5, name_map: vec![] })));
            assert_eq!(locals.next(), Ok(None));
        }
        assert!(errors.is_empty());
    }

    #[test]
    fn test_from_subsection() {
        let sec = NameSubsection { id: NameSubsectionId::Function, data: FUNCTION_NAMES };
        let mut a = sec.function_names(Features::default(), ErrorList::new());
        let mut b = read_function_names_subsection(FUNCTION_NAMES, Features::default(), ErrorList::new());
        loop {
            let (x, y) = (a.next(), b.next());
            assert_eq!(x, y);
            if x == Ok(None) {
                break
            }
        }
        assert!(a.into_errors().is_empty());
    }

    #[test]
    fn test_subsection_id_not_checked() {
        // A local-names decoder over a function-names body simply misreads it.
        let sec = NameSubsection { id: NameSubsectionId::Function, data: b"\x01\x00\x01\x03a" };
        let mut locals = sec.local_names(Features::default(), ErrorList::new());
        assert_eq!(locals.next(), Err(Error::LengthOutOfBounds));
    }

    #[test]
    fn test_bad_name() {
        // The second name is not UTF-8; the third is never reached.
        let data = b"\x03\x00\x01a\x01\x01\xff\x02\x01c";
        let mut errors = ErrorList::new();
        {
            let mut names = read_function_names_subsection(data, Features::default(), &mut errors);
            assert_eq!(names.next(), Ok(Some(assoc(0, "a"))));
            assert_eq!(names.next(), Err(Error::InvalidUtf8));
            assert_eq!(names.next(), Ok(None));
        }
        assert_eq!(errors.errors(), &[ErrorAt { offset: 4, error: Error::InvalidUtf8 }]);
    }

    #[test]
    fn test_bad_local() {
        // Function 1 claims two locals but the section ends after one.
        let data = b"\x02\x00\x00\x01\x02\x00\x01x";
        let mut errors = ErrorList::new();
        {
            let mut locals = read_local_names_subsection(data, Features::default(), &mut errors);
            assert_eq!(locals.next(), Ok(Some(IndirectNameAssoc { index: 0, name_map: vec![] })));
            assert_eq!(locals.next(), Err(Error::UnexpectedEof));
            assert_eq!(locals.next(), Ok(None));
        }
        assert_eq!(errors.errors(), &[ErrorAt { offset: 3, error: Error::UnexpectedEof }]);
    }

    #[test]
    fn test_name_section() {
        let data = b"\x00\x04\x03mod\x01\x06\x01\x00\x03foo\x07\x01\x00";
        let mut subsections = read_name_section(data);

        let sec = subsections.next().unwrap().unwrap();
        assert_eq!(sec.id, NameSubsectionId::Module);
        assert_eq!(sec.module_name(), Ok("mod"));

        let sec = subsections.next().unwrap().unwrap();
        assert_eq!(sec.id, NameSubsectionId::Function);
        let mut names = sec.function_names(Features::default(), ErrorList::new());
        assert_eq!(names.next(), Ok(Some(assoc(0, "foo"))));
        assert_eq!(names.next(), Ok(None));

        let sec = subsections.next().unwrap().unwrap();
        assert_eq!(sec.id, NameSubsectionId::Unknown(7));
        assert_eq!(sec.data, b"\x00");

        assert_eq!(subsections.next(), Ok(None));
    }

    #[test]
    fn test_name_section_truncated() {
        let mut subsections = read_name_section(b"\x01\x09\x01");
        assert_eq!(subsections.next(), Err(Error::LengthOutOfBounds));
        assert_eq!(subsections.next(), Ok(None));
    }
}
