extern crate wasm;
extern crate clap;
extern crate env_logger;

use std::process;
use std::io::{self, Read};
use std::fs::File;
use std::path::Path;

use clap::{App, Arg, ArgMatches};

use wasm::{ErrorList, Errors, Features, FallibleIterator, Reader};
use wasm::binary::{Id, InstructionIterator, Module, NameSubsectionId, Opcode};

use std::fmt::{self, Write};

#[derive(Debug)]
pub enum Error {
    IoError(io::Error),
    FmtError(fmt::Error),
    WasmError(wasm::Error),
}

impl From<io::Error> for Error {
    fn from(other: io::Error) -> Self {
        Error::IoError(other)
    }
}

impl From<fmt::Error> for Error {
    fn from(other: fmt::Error) -> Self {
        Error::FmtError(other)
    }
}

impl From<wasm::Error> for Error {
    fn from(other: wasm::Error) -> Self {
        Error::WasmError(other)
    }
}

pub fn main() {
    env_logger::init();
    let matches = App::new("dump")
        .arg(Arg::with_name("path")
            .required(true))
        .arg(Arg::with_name("headers")
            .long("headers")
            .short("h"))
        .arg(Arg::with_name("names")
            .long("names")
            .short("n"))
        .arg(Arg::with_name("disassemble")
            .long("disassemble")
            .short("d"))
        .arg(Arg::with_name("all-features")
            .long("all-features"))
        .get_matches();

    if let Err(e) = run(matches) {
        eprintln!("Error: {:?}", e);
        process::exit(1);
    }
}

/// Moves what a section reported into `errors`, rebased onto the file.
fn rebase(errors: &mut ErrorList, base: usize, found: ErrorList) {
    for e in found.errors() {
        errors.on_error(base + e.offset, e.error);
    }
}

pub fn run(matches: ArgMatches) -> Result<(), Error> {
    let path = Path::new(matches.value_of("path").unwrap_or_default());
    let mut file = File::open(&path)?;
    let mut data: Vec<u8> = Vec::new();
    file.read_to_end(&mut data)?;

    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let features = if matches.is_present("all-features") { Features::all() } else { Features::default() };
    let mut out = String::new();
    let mut errors = ErrorList::new();

    let m = Module::new(data.as_ref())?;

    writeln!(out, "\n{}:\tfile format wasm 0x{:x}\n", name, m.version)?;

    let result = dump(&mut out, &m, &matches, features, &mut errors);
    print!("{}", out);
    // Decode errors go out even when a dump stopped early.
    for e in errors.errors() {
        eprintln!("{}", e);
    }
    result
}

fn dump<W: Write>(out: &mut W, m: &Module, matches: &ArgMatches, features: Features, errors: &mut ErrorList) -> Result<(), Error> {
    if matches.is_present("headers") {
        dump_headers(out, m)?;
    }
    if matches.is_present("names") {
        dump_names(out, m, features, errors)?;
    }
    if matches.is_present("disassemble") {
        dump_code(out, m, features, errors)?;
    }
    Ok(())
}

pub fn dump_headers<W: Write>(out: &mut W, m: &Module) -> Result<(), Error> {
    writeln!(out, "Sections:")?;
    let mut sections = m.sections();
    while let Some(s) = sections.next()? {
        let s_beg = m.offset_to(s.data);
        let s_len = s.data.len();
        let s_end = s_beg + s_len;
        if s.id == Id::Custom {
            let c = s.custom()?;
            writeln!(out, "{:>9} start={:#010x} end={:#010x} (size={:#010x}) {:?}", s.id.as_str(), s_beg, s_end, s_len, c.name)?;
        } else {
            writeln!(out, "{:>9} start={:#010x} end={:#010x} (size={:#010x})", s.id.as_str(), s_beg, s_end, s_len)?;
        }
    }
    Ok(())
}

pub fn dump_names<W: Write>(out: &mut W, m: &Module, features: Features, errors: &mut ErrorList) -> Result<(), Error> {
    writeln!(out, "Names:")?;
    let mut subsections = match m.name_section()? {
        Some(subsections) => subsections,
        None => return Ok(()),
    };
    while let Some(sub) = subsections.next()? {
        let base = m.offset_to(sub.data);
        match sub.id {
            NameSubsectionId::Module => {
                writeln!(out, " - module <{}>", sub.module_name()?)?;
            },
            NameSubsectionId::Function => {
                let mut names = sub.function_names(features, ErrorList::new());
                loop {
                    match names.next() {
                        Ok(Some(n)) => writeln!(out, " - func[{}] <{}>", n.index, n.name)?,
                        Ok(None) => break,
                        Err(e) => {
                            rebase(errors, base, names.into_errors());
                            return Err(e.into())
                        }
                    }
                }
            },
            NameSubsectionId::Local => {
                let mut locals = sub.local_names(features, ErrorList::new());
                loop {
                    match locals.next() {
                        Ok(Some(f)) => {
                            for n in f.name_map.iter() {
                                writeln!(out, " - func[{}] local[{}] <{}>", f.index, n.index, n.name)?;
                            }
                        },
                        Ok(None) => break,
                        Err(e) => {
                            rebase(errors, base, locals.into_errors());
                            return Err(e.into())
                        }
                    }
                }
            },
            NameSubsectionId::Unknown(id) => {
                writeln!(out, " - subsection {} (size={:#x})", id, sub.data.len())?;
            },
        }
    }
    Ok(())
}

pub fn dump_code<W: Write>(out: &mut W, m: &Module, features: Features, errors: &mut ErrorList) -> Result<(), Error> {
    writeln!(out, "Code Disassembly:")?;
    let mut sections = m.sections();
    while let Some(s) = sections.next()? {
        let mut bodies = match s.code(features, ErrorList::new()) {
            Some(bodies) => bodies,
            None => continue,
        };

        // Numbered by position; imported functions are not counted.
        let mut n = 0;
        loop {
            let code = match bodies.next() {
                Ok(Some(code)) => code,
                Ok(None) => break,
                Err(e) => {
                    rebase(errors, m.offset_to(s.data), bodies.into_errors());
                    return Err(e.into())
                }
            };
            let base = m.offset_to(code.body);
            writeln!(out, "{:06x} code[{}]:", base, n)?;

            let mut local_index = 0u64;
            let mut locals = code.locals(features, ErrorList::new());
            loop {
                let l = match locals.next() {
                    Ok(Some(l)) => l,
                    Ok(None) => break,
                    Err(e) => {
                        rebase(errors, base, locals.into_errors());
                        return Err(e.into())
                    }
                };
                if l.count == 1 {
                    writeln!(out, " - local[{}] type={}", local_index, l.ty)?;
                } else if l.count > 1 {
                    writeln!(out, " - local[{}..{}] type={}", local_index, local_index + l.count as u64 - 1, l.ty)?;
                }
                local_index += l.count as u64;
            }

            let expr = locals.rest();
            let base = m.offset_to(expr);
            let mut instrs = InstructionIterator::from_expression(Reader::with_features(expr, features));
            let mut depth = 0;
            loop {
                let start = instrs.offset();
                let instr = match instrs.next() {
                    Ok(Some(instr)) => instr,
                    Ok(None) => break,
                    Err(e) => {
                        errors.on_error(base + start, e);
                        return Err(e.into())
                    }
                };
                let data = &expr[start..instrs.offset()];
                match instr.opcode {
                    Opcode::Else | Opcode::End => {
                        if depth > 0 {
                            depth -= 1;
                        }
                    },
                    _ => {},
                }
                write!(out, " {:06x}:", base + start)?;
                let mut w = 0;
                for b in data.iter().take(9) {
                    write!(out, " {:02x}", b)?;
                    w += 3;
                }
                while w < 28 {
                    write!(out, " ")?;
                    w += 1;
                }
                write!(out, "| ")?;
                for _ in 0..depth { write!(out, "  ")?; }
                writeln!(out, "{}", instr)?;

                match instr.opcode {
                    Opcode::Block | Opcode::Loop | Opcode::If | Opcode::Else => {
                        depth += 1;
                    },
                    _ => {},
                }
            }
            n += 1;
        }
    }
    Ok(())
}
