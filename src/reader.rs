use error::Error;
use features::Features;
use byteorder::{ByteOrder, LittleEndian};
pub use fallible_iterator::FallibleIterator;

use core::str;
use core::marker::PhantomData;

/// A read-only view over a byte span with a moving read position.
///
/// Every read either consumes exactly the bytes of the value it returns or
/// fails; on failure the position is unspecified and the reader should be
/// discarded.
pub struct Reader<'a> {
    buf: &'a [u8],
    features: Features,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, features: Features::default() }
    }

    pub fn with_features(buf: &'a [u8], features: Features) -> Self {
        Reader { buf, features }
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn rest(&self) -> &'a [u8] {
        self.buf
    }

    /// Byte distance from the start of `base` to the current position.
    /// `self` must have been derived from `base`.
    pub fn offset_from(&self, base: &Reader<'a>) -> usize {
        let base_ptr = base.buf.as_ptr() as usize;
        let ptr = self.buf.as_ptr() as usize;
        debug_assert!(base_ptr <= ptr);
        debug_assert!(ptr + self.buf.len() <= base_ptr + base.buf.len());
        ptr - base_ptr
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.len() < len {
            Err(Error::UnexpectedEof)
        } else {
            let val = &self.buf[..len];
            self.buf = &self.buf[len..];
            Ok(val)
        }
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        let slice = self.read_slice(1)?;
        Ok(slice[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, Error> {
        self.read_slice(4).map(LittleEndian::read_u32)
    }

    pub fn read_var_u32(&mut self) -> Result<u32, Error> {
        self.read_var_unsigned(32, Error::InvalidU32).map(|v| v as u32)
    }

    pub fn read_var_u64(&mut self) -> Result<u64, Error> {
        self.read_var_unsigned(64, Error::InvalidU64)
    }

    #[inline]
    pub fn read_var_i32(&mut self) -> Result<i32, Error> {
        self.read_var_signed(32, Error::InvalidI32).map(|v| v as i32)
    }

    /// Signed 33-bit LEB128, used for block type indices.
    #[inline]
    pub fn read_var_i33(&mut self) -> Result<i64, Error> {
        self.read_var_signed(33, Error::InvalidI33)
    }

    #[inline]
    pub fn read_var_i64(&mut self) -> Result<i64, Error> {
        self.read_var_signed(64, Error::InvalidI64)
    }

    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, Error> {
        self.read_slice(4).map(LittleEndian::read_f32)
    }

    #[inline]
    pub fn read_f64(&mut self) -> Result<f64, Error> {
        self.read_slice(8).map(LittleEndian::read_f64)
    }

    fn read_var_unsigned(&mut self, bits: u32, err: Error) -> Result<u64, Error> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let byte = self.read_u8()?;
            let low = (byte & 0x7f) as u64;
            if shift + 7 > bits {
                // Last byte allowed: no continuation, no bits past the width.
                if byte & 0x80 != 0 || low >> (bits - shift) != 0 {
                    return Err(err)
                }
            }
            value |= low << shift;
            if byte & 0x80 == 0 {
                return Ok(value)
            }
            shift += 7;
        }
    }

    fn read_var_signed(&mut self, bits: u32, err: Error) -> Result<i64, Error> {
        let mut value = 0u64;
        let mut shift = 0;
        loop {
            let byte = self.read_u8()?;
            let low = (byte & 0x7f) as u64;
            if shift + 7 > bits {
                // Last byte allowed: the unused high bits must copy the sign bit.
                let used = bits - shift;
                let high = low >> (used - 1);
                if byte & 0x80 != 0 || (high != 0 && high != (1 << (8 - used)) - 1) {
                    return Err(err)
                }
            }
            value |= low << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 64 && byte & 0x40 != 0 {
                    value |= !0u64 << shift;
                }
                return Ok(value as i64)
            }
        }
    }
}

impl<'a> Clone for Reader<'a> {
    fn clone(&self) -> Self {
        Reader::with_features(self.buf, self.features)
    }
}

/// Record grammar: how to decode a `T` from the current position.
pub trait Read<T> {
    fn read(&mut self) -> Result<T, Error>;
}

impl<'a> Read<u8> for Reader<'a> {
    fn read(&mut self) -> Result<u8, Error> {
        self.read_u8()
    }
}

impl<'a> Read<u32> for Reader<'a> {
    fn read(&mut self) -> Result<u32, Error> {
        self.read_var_u32()
    }
}

impl<'a> Read<i32> for Reader<'a> {
    fn read(&mut self) -> Result<i32, Error> {
        self.read_var_i32()
    }
}

impl<'a> Read<i64> for Reader<'a> {
    fn read(&mut self) -> Result<i64, Error> {
        self.read_var_i64()
    }
}

impl<'a> Read<f32> for Reader<'a> {
    fn read(&mut self) -> Result<f32, Error> {
        self.read_f32()
    }
}

impl<'a> Read<f64> for Reader<'a> {
    fn read(&mut self) -> Result<f64, Error> {
        self.read_f64()
    }
}

impl<'a> Read<&'a [u8]> for Reader<'a> {
    fn read(&mut self) -> Result<&'a [u8], Error> {
        let len = self.read_var_u32()? as usize;
        if len > self.len() {
            return Err(Error::LengthOutOfBounds)
        }
        self.read_slice(len)
    }
}

impl<'a> Read<&'a str> for Reader<'a> {
    fn read(&mut self) -> Result<&'a str, Error> {
        match str::from_utf8(self.read()?) {
            Ok(s) => Ok(s),
            Err(_) => Err(Error::InvalidUtf8)
        }
    }
}

/// Reads `T` records back to back until the span is exhausted.
pub struct ReadIterator<'a, T> {
    r: Reader<'a>,
    done: bool,
    _phantom: PhantomData<T>,
}

impl<'a, T> ReadIterator<'a, T> {
    pub fn new(r: Reader<'a>) -> Self {
        ReadIterator { r, done: false, _phantom: PhantomData }
    }
}

impl<'a, T> FallibleIterator for ReadIterator<'a, T>
where Reader<'a>: Read<T> {
    type Item = T;
    type Error = Error;
    fn next(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        if self.done || self.r.is_empty() {
            return Ok(None)
        }
        match self.r.read() {
            Ok(item) => Ok(Some(item)),
            Err(e) => {
                self.done = true;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! leb_test {
        ($method:ident, [ $( ($buf:expr, $value:expr) ),* $(,)* ]) => {
            $(
                {
                    let mut r = Reader::new($buf);
                    assert_eq!(r.$method(), Ok($value), "{:?}", $buf);
                    assert!(r.is_empty(), "{:?} not fully consumed", $buf);
                }
            )*
        }
    }

    #[test]
    fn test_var_u32() {
        leb_test!(read_var_u32, [
            (&[0x00][..], 0),
            (&[0x7f][..], 127),
            (&[0x80, 0x01][..], 128),
            (&[0xe5, 0x8e, 0x26][..], 624485),
            (&[0x80, 0x80, 0x80, 0x80, 0x00][..], 0),
            (&[0xff, 0xff, 0xff, 0xff, 0x0f][..], 0xffff_ffff),
        ]);
    }

    #[test]
    fn test_var_u32_invalid() {
        assert_eq!(Reader::new(&[0xff, 0xff, 0xff, 0xff, 0x1f]).read_var_u32(), Err(Error::InvalidU32));
        assert_eq!(Reader::new(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]).read_var_u32(), Err(Error::InvalidU32));
        assert_eq!(Reader::new(&[0x80, 0x80]).read_var_u32(), Err(Error::UnexpectedEof));
        assert_eq!(Reader::new(&[]).read_var_u32(), Err(Error::UnexpectedEof));
    }

    #[test]
    fn test_var_i32() {
        leb_test!(read_var_i32, [
            (&[0x00][..], 0),
            (&[0x7f][..], -1),
            (&[0x40][..], -64),
            (&[0x3f][..], 63),
            (&[0xc0, 0x00][..], 64),
            (&[0x80, 0x7f][..], -128),
            (&[0xff, 0xff, 0xff, 0xff, 0x07][..], i32::max_value()),
            (&[0x80, 0x80, 0x80, 0x80, 0x78][..], i32::min_value()),
        ]);
        assert_eq!(Reader::new(&[0xff, 0xff, 0xff, 0xff, 0x0f]).read_var_i32(), Err(Error::InvalidI32));
        assert_eq!(Reader::new(&[0x80, 0x80, 0x80, 0x80, 0x70]).read_var_i32(), Err(Error::InvalidI32));
    }

    #[test]
    fn test_var_i33() {
        leb_test!(read_var_i33, [
            (&[0x40][..], -64),
            (&[0x80, 0x01][..], 128),
            (&[0xff, 0xff, 0xff, 0xff, 0x0f][..], 0xffff_ffff),
            (&[0x80, 0x80, 0x80, 0x80, 0x70][..], -(1 << 32)),
        ]);
        assert_eq!(Reader::new(&[0xff, 0xff, 0xff, 0xff, 0x1f]).read_var_i33(), Err(Error::InvalidI33));
    }

    #[test]
    fn test_var_64() {
        leb_test!(read_var_u64, [
            (&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01][..], u64::max_value()),
        ]);
        leb_test!(read_var_i64, [
            (&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7f][..], i64::min_value()),
            (&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00][..], i64::max_value()),
        ]);
        let buf = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert_eq!(Reader::new(&buf).read_var_u64(), Err(Error::InvalidU64));
        let buf = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        assert_eq!(Reader::new(&buf).read_var_i64(), Err(Error::InvalidI64));
    }

    #[test]
    fn test_fixed() {
        let buf = [0x00, 0x61, 0x73, 0x6d, 0x00, 0x00, 0xc0, 0x3f];
        let mut r = Reader::new(&buf);
        assert_eq!(r.read_u32(), Ok(0x6d736100));
        assert_eq!(r.read_slice(2), Ok(&[0x00, 0x00][..]));
        assert_eq!(r.read_f32(), Err(Error::UnexpectedEof));

        let buf = [0x00, 0x00, 0xc0, 0x3f];
        assert_eq!(Reader::new(&buf).read_f32(), Ok(1.5));
    }

    #[test]
    fn test_strings() {
        let mut r = Reader::new(b"\x03abc\x02\xff\xfe\x05ab");
        let s: &str = r.read().unwrap();
        assert_eq!(s, "abc");
        let s: Result<&str, Error> = r.read();
        assert_eq!(s, Err(Error::InvalidUtf8));
        let s: Result<&[u8], Error> = r.read();
        assert_eq!(s, Err(Error::LengthOutOfBounds));
    }

    #[test]
    fn test_offset_from() {
        let buf = [0x01, 0x02, 0x03, 0x04];
        let base = Reader::new(&buf);
        let mut r = base.clone();
        r.read_slice(3).unwrap();
        assert_eq!(r.offset_from(&base), 3);
        assert_eq!(r.rest(), &[0x04]);
    }

    #[test]
    fn test_read_iterator() {
        let buf = [0x01, 0x80, 0x01, 0x05, 0x80];
        let mut it = ReadIterator::<u32>::new(Reader::new(&buf));
        assert_eq!(it.next(), Ok(Some(1)));
        assert_eq!(it.next(), Ok(Some(128)));
        assert_eq!(it.next(), Ok(Some(5)));
        assert_eq!(it.next(), Err(Error::UnexpectedEof));
        assert_eq!(it.next(), Ok(None));
    }
}
