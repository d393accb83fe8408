pub mod numeric;

pub use self::numeric::*;
