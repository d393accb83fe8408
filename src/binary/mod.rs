pub mod lazy;
pub mod name;
pub mod module;
pub mod code;
pub mod opcode;
pub mod instruction;

pub use self::lazy::*;
pub use self::name::*;
pub use self::module::*;
pub use self::code::*;
pub use self::opcode::*;
pub use self::instruction::*;

pub type Index = u32;
