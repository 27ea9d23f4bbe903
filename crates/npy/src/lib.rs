//! NPY: reader/writer for NumPy `.npy` arrays carrying LiDAR point clouds.
//!
//! - Accepts 1-D and 2-D arrays of `<f8` or `<f4`, little-endian, C order.
//! - Everything is widened to `f64` on load; rows are points, columns are
//!   whatever the producer persisted (x, y, z, ..., label in our clouds).
//! - The writer emits format version 1.0 with an `<f8` descr.
//!
//! File layout (format versions 1.0 and 2.0):
//!   00  : [u8;6]  magic = b"\x93NUMPY"
//!   06  : u8      major version (1 or 2)
//!   07  : u8      minor version
//!   08  : u16     header length            (u32 here for major version 2)
//!   ..  : ASCII   Python literal dict, space-padded, '\n'-terminated:
//!                 {'descr': '<f8', 'fortran_order': False, 'shape': (N, M), }
//!   ..  : raw     N*M little-endian scalars, row-major

use std::fs::File;
use std::io::{self, ErrorKind, Write};
use std::path::Path;

pub const NPY_MAGIC: [u8; 6] = *b"\x93NUMPY";

/// A dense row-major `f64` matrix loaded from an `.npy` file.
///
/// 1-D source arrays come back as a single column so callers can treat every
/// array uniformly as rows-of-records.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f64>,
}

impl NpyArray {
    /// Returns one row (one point record) as a slice of `cols` values.
    #[inline]
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Iterates over all rows in storage order.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols)
    }
}

#[inline(always)]
fn need(buf: &[u8], want: usize) -> io::Result<()> {
    if buf.len() < want {
        Err(io::Error::new(ErrorKind::UnexpectedEof, "truncated NPY"))
    } else {
        Ok(())
    }
}

#[inline(always)]
fn take<'a>(buf: &mut &'a [u8], n: usize) -> io::Result<&'a [u8]> {
    need(buf, n)?;
    let (head, tail) = buf.split_at(n);
    *buf = tail;
    Ok(head)
}

#[inline(always)]
fn le_u8(buf: &mut &[u8]) -> io::Result<u8> {
    Ok(take(buf, 1)?[0])
}

#[inline(always)]
fn le_u16(buf: &mut &[u8]) -> io::Result<u16> {
    let b = take(buf, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

#[inline(always)]
fn le_u32(buf: &mut &[u8]) -> io::Result<u32> {
    let b = take(buf, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

#[cold]
fn bad(msg: &str) -> io::Error {
    io::Error::new(ErrorKind::InvalidData, msg)
}

/// Extracts the value text following `'key':` in the header dict.
///
/// The header is a flat Python literal dict; values are either a quoted
/// string, a bare token (True/False), or a parenthesised tuple, so a small
/// scanner is enough.
fn dict_value<'a>(header: &'a str, key: &str) -> io::Result<&'a str> {
    let pat = format!("'{key}':");
    let at = header
        .find(&pat)
        .ok_or_else(|| bad("NPY header missing key"))?;
    let rest = header[at + pat.len()..].trim_start();

    if let Some(stripped) = rest.strip_prefix('\'') {
        let end = stripped.find('\'').ok_or_else(|| bad("unterminated string in NPY header"))?;
        return Ok(&stripped[..end]);
    }

    if rest.starts_with('(') {
        let end = rest.find(')').ok_or_else(|| bad("unterminated tuple in NPY header"))?;
        return Ok(&rest[..=end]);
    }

    let end = rest
        .find([',', '}'])
        .ok_or_else(|| bad("malformed NPY header"))?;
    Ok(rest[..end].trim_end())
}

fn parse_shape(text: &str) -> io::Result<(usize, usize)> {
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or_else(|| bad("NPY shape is not a tuple"))?;

    let mut dims = Vec::with_capacity(2);
    for part in inner.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        dims.push(
            part.parse::<usize>()
                .map_err(|_| bad("non-integer NPY shape dimension"))?,
        );
    }

    match dims.as_slice() {
        // A 1-D array is a single column of records.
        [n] => Ok((*n, 1)),
        [n, m] => Ok((*n, *m)),
        _ => Err(bad("only 1-D and 2-D NPY arrays are supported")),
    }
}

/// Parse an `.npy` byte buffer. This is the single source of truth for parsing.
pub fn parse_npy_bytes(mut p: &[u8]) -> io::Result<NpyArray> {
    if take(&mut p, 6)? != NPY_MAGIC {
        return Err(bad("bad NPY magic"));
    }

    let major = le_u8(&mut p)?;
    let _minor = le_u8(&mut p)?;
    let header_len = match major {
        1 => le_u16(&mut p)? as usize,
        2 => le_u32(&mut p)? as usize,
        _ => return Err(bad("unsupported NPY format version")),
    };

    let header = std::str::from_utf8(take(&mut p, header_len)?)
        .map_err(|_| bad("NPY header is not ASCII"))?;

    if dict_value(header, "fortran_order")? != "False" {
        return Err(bad("Fortran-ordered NPY arrays are not supported"));
    }

    let descr = dict_value(header, "descr")?;
    let (rows, cols) = parse_shape(dict_value(header, "shape")?)?;
    let count = rows
        .checked_mul(cols)
        .ok_or_else(|| bad("NPY shape overflow"))?;

    let data = match descr {
        "<f8" => {
            let nbytes = count.checked_mul(8).ok_or_else(|| bad("NPY data size overflow"))?;
            let raw = take(&mut p, nbytes)?;

            // Zero-copy reinterpret when the slice happens to be 8-aligned;
            // the portable path otherwise (mmap offsets make no promises).
            match bytemuck::try_cast_slice::<u8, f64>(raw) {
                Ok(as_f64) => as_f64.to_vec(),
                Err(_) => raw
                    .chunks_exact(8)
                    .map(|c| f64::from_le_bytes(c.try_into().unwrap()))
                    .collect(),
            }
        }
        "<f4" => {
            let nbytes = count.checked_mul(4).ok_or_else(|| bad("NPY data size overflow"))?;
            let raw = take(&mut p, nbytes)?;
            raw.chunks_exact(4)
                .map(|c| f32::from_le_bytes(c.try_into().unwrap()) as f64)
                .collect()
        }
        _ => return Err(bad("unsupported NPY dtype (expected <f8 or <f4)")),
    };

    Ok(NpyArray { rows, cols, data })
}

/// Fast path: prefer mmap; fall back to a single read.
#[cfg(feature = "mmap")]
pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<NpyArray> {
    let file = File::open(path)?;
    let map = unsafe { memmap2::MmapOptions::new().map(&file)? };
    parse_npy_bytes(&map)
}

#[cfg(not(feature = "mmap"))]
pub fn read_file<P: AsRef<Path>>(path: P) -> io::Result<NpyArray> {
    let bytes = std::fs::read(path)?;
    parse_npy_bytes(&bytes)
}

/// Serializes a row-major `f64` matrix as NPY format version 1.0.
pub fn npy_bytes(rows: usize, cols: usize, data: &[f64]) -> io::Result<Vec<u8>> {
    if data.len() != rows * cols {
        return Err(bad("data length != rows * cols"));
    }

    let dict = format!("{{'descr': '<f8', 'fortran_order': False, 'shape': ({rows}, {cols}), }}");

    // Pad so the data section starts on a 64-byte boundary, as numpy does.
    let unpadded = NPY_MAGIC.len() + 4 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    let header_len = dict.len() + padding + 1;

    let mut out = Vec::with_capacity(unpadded + padding + data.len() * 8);
    out.extend_from_slice(&NPY_MAGIC);
    out.push(1);
    out.push(0);
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.resize(out.len() + padding, b' ');
    out.push(b'\n');

    for v in data {
        out.extend_from_slice(&v.to_le_bytes());
    }

    Ok(out)
}

pub fn write_file<P: AsRef<Path>>(path: P, rows: usize, cols: usize, data: &[f64]) -> io::Result<()> {
    let bytes = npy_bytes(rows, cols, data)?;
    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_2d_array() {
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let bytes = npy_bytes(2, 4, &data).unwrap();
        let arr = parse_npy_bytes(&bytes).unwrap();

        assert_eq!(arr.rows, 2);
        assert_eq!(arr.cols, 4);
        assert_eq!(arr.data, data);
        assert_eq!(arr.row(1), &[5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn data_section_is_64_byte_aligned() {
        let bytes = npy_bytes(1, 1, &[42.0]).unwrap();
        assert_eq!((bytes.len() - 8) % 64, 0);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = npy_bytes(1, 1, &[0.0]).unwrap();
        bytes[0] = b'X';
        assert_eq!(
            parse_npy_bytes(&bytes).unwrap_err().kind(),
            ErrorKind::InvalidData
        );
    }

    #[test]
    fn rejects_fortran_order() {
        // Flip the header flag in place on the byte buffer (the NPY magic byte
        // 0x93 makes the buffer invalid UTF-8, so edit bytes rather than a String).
        let mut bytes = npy_bytes(1, 2, &[0.0, 0.0]).unwrap();
        let needle = b"'fortran_order': False";
        let replacement = b"'fortran_order': True "; // same length, trailing space
        let pos = bytes
            .windows(needle.len())
            .position(|w| w == needle)
            .unwrap();
        bytes[pos..pos + needle.len()].copy_from_slice(replacement);
        assert!(parse_npy_bytes(&bytes).is_err());
    }

    #[test]
    fn rejects_truncated_data() {
        let mut bytes = npy_bytes(4, 2, &[0.0; 8]).unwrap();
        bytes.truncate(bytes.len() - 9);
        assert_eq!(
            parse_npy_bytes(&bytes).unwrap_err().kind(),
            ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn widens_f4_arrays() {
        // Hand-build an <f4 header around two known floats.
        let dict = "{'descr': '<f4', 'fortran_order': False, 'shape': (2, 1), }";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&NPY_MAGIC);
        bytes.push(1);
        bytes.push(0);
        bytes.extend_from_slice(&((dict.len() + 1) as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes.push(b'\n');
        bytes.extend_from_slice(&1.5f32.to_le_bytes());
        bytes.extend_from_slice(&(-2.25f32).to_le_bytes());

        let arr = parse_npy_bytes(&bytes).unwrap();
        assert_eq!(arr.rows, 2);
        assert_eq!(arr.cols, 1);
        assert_eq!(arr.data, vec![1.5, -2.25]);
    }

    #[test]
    fn one_dimensional_arrays_become_a_single_column() {
        let dict = "{'descr': '<f8', 'fortran_order': False, 'shape': (3,), }";
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&NPY_MAGIC);
        bytes.push(1);
        bytes.push(0);
        bytes.extend_from_slice(&((dict.len() + 1) as u16).to_le_bytes());
        bytes.extend_from_slice(dict.as_bytes());
        bytes.push(b'\n');
        for v in [7.0f64, 8.0, 9.0] {
            bytes.extend_from_slice(&v.to_le_bytes());
        }

        let arr = parse_npy_bytes(&bytes).unwrap();
        assert_eq!((arr.rows, arr.cols), (3, 1));
    }
}
