//! Hexadecimal float formatting in the WebAssembly text style
//! (`0x1.8p+1`, `-inf`, `nan:0x200000`).

use core::fmt::{self, Write};

pub fn f32_parts(v: f32) -> (u8, u8, u32) {
    let v = v.to_bits();
    let s = (v >> 31) as u8;
    let e = (v >> 23) as u8;
    let f = v << 9;
    (s, e, f)
}

pub fn f64_parts(v: f64) -> (u8, u16, u64) {
    let v = v.to_bits();
    let s = (v >> 63) as u8;
    let e = ((v >> 52) & ((1 << 11) - 1)) as u16;
    let f = v << 12;
    (s, e, f)
}

pub fn f32_hex<W: Write>(out: &mut W, v: f32) -> fmt::Result {
    let (s, e, f) = f32_parts(v);
    write_hex(out, s != 0, e as i32, 0xff, 127, (f as u64) << 32, 23)
}

pub fn f64_hex<W: Write>(out: &mut W, v: f64) -> fmt::Result {
    let (s, e, f) = f64_parts(v);
    write_hex(out, s != 0, e as i32, 0x7ff, 1023, f, 52)
}

// `f` holds the fraction left-aligned in 64 bits.
fn write_hex<W: Write>(out: &mut W, neg: bool, e: i32, e_max: i32, bias: i32, f: u64, mbits: u32) -> fmt::Result {
    if neg {
        write!(out, "-")?;
    }
    if e == e_max {
        if f == 0 {
            write!(out, "inf")
        } else if f == 1 << 63 {
            write!(out, "nan")
        } else {
            write!(out, "nan:0x{:x}", f >> (64 - mbits))
        }
    } else if e == 0 && f == 0 {
        write!(out, "0x0p+0")
    } else {
        // Subnormals are normalized so the leading digit is always 1.
        let (mut f, e) = if e == 0 {
            let shift = f.leading_zeros() + 1;
            (f << shift, 1 - bias - shift as i32)
        } else {
            (f, e - bias)
        };
        write!(out, "0x1")?;
        if f != 0 {
            write!(out, ".")?;
            while f != 0 {
                write!(out, "{:x}", f >> 60)?;
                f <<= 4;
            }
        }
        write!(out, "p{:+}", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex32(v: f32) -> String {
        let mut s = String::new();
        f32_hex(&mut s, v).unwrap();
        s
    }

    fn hex64(v: f64) -> String {
        let mut s = String::new();
        f64_hex(&mut s, v).unwrap();
        s
    }

    #[test]
    fn test_f32() {
        assert_eq!(f32_parts(1.0), (0, 127, 0));
        assert_eq!(f32_parts(0.5), (0, 126, 0));
        assert_eq!(f32_parts(3.0), (0, 128, 0x8000_0000));
        assert_eq!(hex32(0.0), "0x0p+0");
        assert_eq!(hex32(-0.0), "-0x0p+0");
        assert_eq!(hex32(1.0), "0x1p+0");
        assert_eq!(hex32(0.5), "0x1p-1");
        assert_eq!(hex32(3.0), "0x1.8p+1");
        assert_eq!(hex32(2.0f32.powi(8)), "0x1p+8");
        assert_eq!(hex32(0.857421875f32), "0x1.b7p-1");
        assert_eq!(hex32(f32::from_bits(0x65a9_6816)), "0x1.52d02cp+76");
        assert_eq!(hex32(f32::from_bits(0x0000_0001)), "0x1p-149");
        assert_eq!(hex32(f32::from_bits(0x7fc0_0000)), "nan");
        assert_eq!(hex32(f32::from_bits(0x7f80_0abc)), "nan:0xabc");
        assert_eq!(hex32(f32::from_bits(0xff80_0abc)), "-nan:0xabc");
        assert_eq!(hex32(f32::from_bits(0x7f80_0000)), "inf");
        assert_eq!(hex32(f32::from_bits(0xff80_0000)), "-inf");
    }

    #[test]
    fn test_f64() {
        assert_eq!(hex64(0.0), "0x0p+0");
        assert_eq!(hex64(1.0), "0x1p+0");
        assert_eq!(hex64(3.0), "0x1.8p+1");
        assert_eq!(hex64(f64::from_bits(0xbfef_9add_3c0e_56b8)), "-0x1.f9add3c0e56b8p-1");
        assert_eq!(hex64(f64::from_bits(0x4019_21fb_5444_2d18)), "0x1.921fb54442d18p+2");
        assert_eq!(hex64(f64::from_bits(0x0000_0000_0000_0001)), "0x1p-1074");
        assert_eq!(hex64(f64::from_bits(0x7ff8_0000_0000_0000)), "nan");
        assert_eq!(hex64(f64::from_bits(0xfff8_0000_0000_0000)), "-nan");
        assert_eq!(hex64(f64::from_bits(0x7ff0_0000_0000_0abc)), "nan:0xabc");
        assert_eq!(hex64(f64::from_bits(0x7ff0_0000_0000_0000)), "inf");
        assert_eq!(hex64(f64::from_bits(0xbfe0_0000_0000_0000)), "-0x1p-1");
    }
}
