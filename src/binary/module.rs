use binary::code::Code;
use binary::lazy::LazySection;
use binary::name::{NameSection, read_name_section};
use error::{Error, Errors};
use features::Features;
use reader::{Reader, Read, ReadIterator, FallibleIterator};
use {MAGIC_COOKIE, VERSION};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Id {
    Custom = 0,
    Type = 1,
    Import = 2,
    Function = 3,
    Table = 4,
    Memory = 5,
    Global = 6,
    Export = 7,
    Start = 8,
    Element = 9,
    Code = 10,
    Data = 11,
    DataCount = 12,
}

impl<'a> Read<Id> for Reader<'a> {
    fn read(&mut self) -> Result<Id, Error> {
        Ok(match self.read_u8()? {
            0 => Id::Custom,
            1 => Id::Type,
            2 => Id::Import,
            3 => Id::Function,
            4 => Id::Table,
            5 => Id::Memory,
            6 => Id::Global,
            7 => Id::Export,
            8 => Id::Start,
            9 => Id::Element,
            10 => Id::Code,
            11 => Id::Data,
            12 => Id::DataCount,
            id => return Err(Error::InvalidSectionId(id))
        })
    }
}

impl Id {
    pub fn as_str(&self) -> &'static str {
        use self::Id::*;
        match *self {
            Custom => "Custom",
            Type => "Type",
            Import => "Import",
            Function => "Function",
            Table => "Table",
            Memory => "Memory",
            Global => "Global",
            Export => "Export",
            Start => "Start",
            Element => "Element",
            Code => "Code",
            Data => "Data",
            DataCount => "DataCount",
        }
    }
}

/// A module whose header has been checked. Sections are sliced on demand.
#[derive(Debug)]
pub struct Module<'a> {
    pub magic: u32,
    pub version: u32,
    pub buf: &'a [u8],
}

impl<'a> Read<Module<'a>> for Reader<'a> {
    fn read(&mut self) -> Result<Module<'a>, Error> {
        let magic = self.read_u32()?;
        if magic != MAGIC_COOKIE {
            return Err(Error::InvalidMagic)
        }
        let version = self.read_u32()?;
        if version != VERSION {
            return Err(Error::InvalidVersion)
        }
        let buf = self.rest();
        Ok(Module { magic, version, buf })
    }
}

impl<'a> Module<'a> {
    pub fn new(buf: &'a [u8]) -> Result<Self, Error> {
        Reader::new(buf).read()
    }

    pub fn sections(&self) -> ReadIterator<'a, Section<'a>> {
        ReadIterator::new(Reader::new(self.buf))
    }

    /// File offset of a slice borrowed from this module.
    pub fn offset_to(&self, buf: &[u8]) -> usize {
        Reader::new(buf).offset_from(&Reader::new(self.buf)) + 8
    }

    /// The subsections of the first custom section called "name", if any.
    pub fn name_section(&self) -> Result<Option<NameSection<'a>>, Error> {
        let mut sections = self.sections();
        while let Some(section) = sections.next()? {
            if section.id != Id::Custom {
                continue
            }
            let custom = section.custom()?;
            if custom.name == "name" {
                debug!("name section: {} bytes", custom.data.len());
                return Ok(Some(read_name_section(custom.data)))
            }
        }
        Ok(None)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Section<'a> {
    pub id: Id,
    pub data: &'a [u8],
}

impl<'a> Read<Section<'a>> for Reader<'a> {
    fn read(&mut self) -> Result<Section<'a>, Error> {
        let id = self.read()?;
        let data = self.read()?;
        Ok(Section { id, data })
    }
}

impl<'a> Section<'a> {
    pub fn custom(&self) -> Result<Custom<'a>, Error> {
        Reader::new(self.data).read()
    }

    /// The function bodies, or `None` if this is not the code section.
    pub fn code<E: Errors>(&self, features: Features, errors: E) -> Option<LazySection<'a, Code<'a>, E>> {
        if self.id == Id::Code {
            Some(LazySection::new(self.data, features, errors))
        } else {
            None
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Custom<'a> {
    pub name: &'a str,
    pub data: &'a [u8],
}

impl<'a> Read<Custom<'a>> for Reader<'a> {
    fn read(&mut self) -> Result<Custom<'a>, Error> {
        let name = self.read()?;
        let data = self.rest();
        Ok(Custom { name, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binary::name::NameSubsectionId;
    use error::ErrorList;

    const HEADER: &[u8] = b"\0asm\x01\x00\x00\x00";

    fn module_bytes(sections: &[u8]) -> Vec<u8> {
        let mut buf = HEADER.to_vec();
        buf.extend_from_slice(sections);
        buf
    }

    #[test]
    fn test_header() {
        let buf = module_bytes(&[]);
        let m = Module::new(&buf).unwrap();
        assert_eq!(m.magic, MAGIC_COOKIE);
        assert_eq!(m.version, VERSION);
        assert_eq!(m.sections().next(), Ok(None));

        assert_eq!(Module::new(b"\0asn\x01\x00\x00\x00").err(), Some(Error::InvalidMagic));
        assert_eq!(Module::new(b"\0asm\x02\x00\x00\x00").err(), Some(Error::InvalidVersion));
        assert_eq!(Module::new(b"\0asm\x01").err(), Some(Error::UnexpectedEof));
    }

    #[test]
    fn test_sections() {
        let buf = module_bytes(b"\x01\x01\x00\x0c\x01\x02\x00\x05\x01abcd");
        let m = Module::new(&buf).unwrap();
        let mut sections = m.sections();

        let s = sections.next().unwrap().unwrap();
        assert_eq!(s, Section { id: Id::Type, data: b"\x00" });
        assert_eq!(m.offset_to(s.data), 10);
        assert_eq!(s.code(Features::default(), ErrorList::new()).is_none(), true);

        let s = sections.next().unwrap().unwrap();
        assert_eq!(s.id, Id::DataCount);

        let s = sections.next().unwrap().unwrap();
        assert_eq!(s.custom(), Ok(Custom { name: "a", data: b"bcd" }));
        assert_eq!(sections.next(), Ok(None));
    }

    #[test]
    fn test_bad_section() {
        let buf = module_bytes(b"\x0d\x00");
        let m = Module::new(&buf).unwrap();
        assert_eq!(m.sections().next(), Err(Error::InvalidSectionId(13)));
        assert_eq!(m.name_section().err(), Some(Error::InvalidSectionId(13)));
    }

    #[test]
    fn test_name_section() {
        // A "foo" custom section, then "name" with a module name subsection.
        let buf = module_bytes(b"\x00\x05\x03foox\x00\x0b\x04name\x00\x04\x03mod");
        let m = Module::new(&buf).unwrap();
        let mut names = m.name_section().unwrap().unwrap();
        let sub = names.next().unwrap().unwrap();
        assert_eq!(sub.id, NameSubsectionId::Module);
        assert_eq!(sub.module_name(), Ok("mod"));
        assert_eq!(names.next(), Ok(None));

        let buf = module_bytes(b"\x00\x05\x03foox");
        assert!(Module::new(&buf).unwrap().name_section().unwrap().is_none());
    }
}
