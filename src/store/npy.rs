//! Minimal NumPy `.npy` matrix reader.
//!
//! Corpus embeddings are produced offline by a NumPy-based ingestion
//! pipeline and saved with `np.save`, so the on-disk format is fixed:
//! one 2-D float matrix per document, rows = chunks, columns = embedding
//! dimension. This reader supports exactly what that pipeline emits:
//!
//! - format versions 1.0 / 2.0 / 3.0
//! - little-endian `f4` and `f8` element types
//! - C-order 1-D and 2-D arrays (a 1-D array is one chunk)
//!
//! Files are memory-mapped; the OS page cache keeps repeated scans of the
//! same corpus cheap without any caching layer here.

use std::fs::File;
use std::path::Path;
use std::sync::OnceLock;

use memmap2::MmapOptions;
use regex::Regex;
use thiserror::Error;

/// Magic bytes at the start of every `.npy` file.
const MAGIC_BYTES: &[u8; 6] = b"\x93NUMPY";

/// Errors specific to reading `.npy` matrix files.
#[derive(Error, Debug)]
pub enum NpyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not an .npy file (bad magic bytes)")]
    BadMagic,

    #[error("Unsupported .npy format version {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("Malformed .npy header: {0}")]
    HeaderParse(String),

    #[error("Unsupported element type '{0}' (expected little-endian '<f4' or '<f8')")]
    UnsupportedDescr(String),

    #[error("Fortran-ordered arrays are not supported")]
    FortranOrder,

    #[error("Unsupported array shape {0} (expected 1-D or 2-D)")]
    BadShape(String),

    #[error("Truncated data section: expected {expected} bytes, found {actual}")]
    Truncated { expected: usize, actual: usize },
}

/// A dense row-major float matrix loaded from disk.
///
/// `cols` is known even when `rows == 0`, which lets a zero-chunk
/// artifact still report its embedding dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f32>>,
}

/// Reads a `.npy` matrix file into memory.
pub fn read_matrix(path: &Path) -> Result<NpyMatrix, NpyError> {
    let file = File::open(path)?;
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    parse_matrix(&mmap)
}

/// Parses `.npy` bytes into a matrix.
pub fn parse_matrix(bytes: &[u8]) -> Result<NpyMatrix, NpyError> {
    if bytes.len() < 10 || &bytes[..6] != MAGIC_BYTES {
        return Err(NpyError::BadMagic);
    }

    let (major, minor) = (bytes[6], bytes[7]);
    let (header_start, header_len) = match major {
        1 => (10, u16::from_le_bytes([bytes[8], bytes[9]]) as usize),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err(NpyError::HeaderParse("header length truncated".to_string()));
            }
            (
                12,
                u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize,
            )
        }
        _ => return Err(NpyError::UnsupportedVersion(major, minor)),
    };

    let data_start = header_start + header_len;
    if bytes.len() < data_start {
        return Err(NpyError::HeaderParse("header truncated".to_string()));
    }

    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|e| NpyError::HeaderParse(format!("header is not valid UTF-8: {e}")))?;

    let descr = capture(descr_re(), header)
        .ok_or_else(|| NpyError::HeaderParse("missing 'descr' field".to_string()))?;
    let item_size = match descr.as_str() {
        "<f4" => 4,
        "<f8" => 8,
        other => return Err(NpyError::UnsupportedDescr(other.to_string())),
    };

    let fortran = capture(fortran_re(), header)
        .ok_or_else(|| NpyError::HeaderParse("missing 'fortran_order' field".to_string()))?;
    if fortran == "True" {
        return Err(NpyError::FortranOrder);
    }

    let shape_str = capture(shape_re(), header)
        .ok_or_else(|| NpyError::HeaderParse("missing 'shape' field".to_string()))?;
    let dims: Vec<usize> = shape_str
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| NpyError::BadShape(format!("({shape_str})")))
        })
        .collect::<Result<_, _>>()?;

    let (rows, cols) = match dims.as_slice() {
        [n] => (1, *n),
        [r, c] => (*r, *c),
        _ => return Err(NpyError::BadShape(format!("({shape_str})"))),
    };

    let expected = rows * cols * item_size;
    let payload = &bytes[data_start..];
    if payload.len() < expected {
        return Err(NpyError::Truncated {
            expected,
            actual: payload.len(),
        });
    }

    let mut data = Vec::with_capacity(rows);
    for row in 0..rows {
        let start = row * cols * item_size;
        let row_bytes = &payload[start..start + cols * item_size];
        let vector: Vec<f32> = if item_size == 4 {
            row_bytes
                .chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect()
        } else {
            row_bytes
                .chunks_exact(8)
                .map(|b| {
                    f64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]) as f32
                })
                .collect()
        };
        data.push(vector);
    }

    Ok(NpyMatrix { rows, cols, data })
}

fn capture(re: &Regex, header: &str) -> Option<String> {
    re.captures(header)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn descr_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'descr'\s*:\s*'([^']+)'").expect("valid regex"))
}

fn fortran_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'fortran_order'\s*:\s*(True|False)").expect("valid regex"))
}

fn shape_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"'shape'\s*:\s*\(([^)]*)\)").expect("valid regex"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Builds v1.0 `.npy` bytes for a row-major f32 matrix, the same layout
    /// `np.save` produces.
    pub(crate) fn npy_bytes_f32(rows: &[Vec<f32>], cols: usize) -> Vec<u8> {
        let shape = if rows.len() == 1 {
            format!("({cols},)")
        } else {
            format!("({}, {})", rows.len(), cols)
        };
        let mut header = format!("{{'descr': '<f4', 'fortran_order': False, 'shape': {shape}, }}");
        // Pad so magic + version + length prefix + header is 64-byte aligned.
        let unpadded = 10 + header.len() + 1;
        header.push_str(&" ".repeat(unpadded.next_multiple_of(64) - unpadded));
        header.push('\n');

        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC_BYTES);
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        for row in rows {
            assert_eq!(row.len(), cols);
            for value in row {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        bytes
    }

    fn npy_bytes_f64(rows: &[Vec<f64>], cols: usize) -> Vec<u8> {
        let shape = format!("({}, {})", rows.len(), cols);
        let mut header = format!("{{'descr': '<f8', 'fortran_order': False, 'shape': {shape}, }}");
        let unpadded = 10 + header.len() + 1;
        header.push_str(&" ".repeat(unpadded.next_multiple_of(64) - unpadded));
        header.push('\n');

        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC_BYTES);
        bytes.extend_from_slice(&[1, 0]);
        bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
        bytes.extend_from_slice(header.as_bytes());
        for row in rows {
            for value in row {
                bytes.extend_from_slice(&value.to_le_bytes());
            }
        }
        bytes
    }

    #[test]
    fn test_parse_f32_matrix() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let bytes = npy_bytes_f32(&rows, 3);
        let matrix = parse_matrix(&bytes).unwrap();
        assert_eq!(matrix.rows, 2);
        assert_eq!(matrix.cols, 3);
        assert_eq!(matrix.data, rows);
    }

    #[test]
    fn test_parse_f64_matrix_downcasts() {
        let bytes = npy_bytes_f64(&[vec![0.5, -1.25], vec![2.0, 3.75]], 2);
        let matrix = parse_matrix(&bytes).unwrap();
        assert_eq!(matrix.rows, 2);
        assert_eq!(matrix.data[1], vec![2.0, 3.75]);
    }

    #[test]
    fn test_parse_1d_array_is_single_chunk() {
        let bytes = npy_bytes_f32(&[vec![0.1, 0.2, 0.3, 0.4]], 4);
        let matrix = parse_matrix(&bytes).unwrap();
        assert_eq!(matrix.rows, 1);
        assert_eq!(matrix.cols, 4);
    }

    #[test]
    fn test_bad_magic_rejected() {
        let err = parse_matrix(b"not a numpy file at all").unwrap_err();
        assert!(matches!(err, NpyError::BadMagic));
    }

    /// Overwrites the first occurrence of `from` with `to` (equal length)
    /// directly in the byte buffer, so the non-UTF-8 magic and payload
    /// bytes are left intact.
    fn replace_in_bytes(buf: &mut [u8], from: &[u8], to: &[u8]) {
        assert_eq!(from.len(), to.len());
        let pos = buf
            .windows(from.len())
            .position(|w| w == from)
            .expect("pattern present");
        buf[pos..pos + from.len()].copy_from_slice(to);
    }

    #[test]
    fn test_fortran_order_rejected() {
        let rows = vec![vec![1.0f32, 2.0]];
        let mut bytes = npy_bytes_f32(&rows, 2);
        replace_in_bytes(&mut bytes, b"False", b"True ");
        let err = parse_matrix(&bytes).unwrap_err();
        assert!(matches!(err, NpyError::FortranOrder));
    }

    #[test]
    fn test_truncated_data_rejected() {
        let rows = vec![vec![1.0f32, 2.0, 3.0]];
        let mut bytes = npy_bytes_f32(&rows, 3);
        bytes.truncate(bytes.len() - 4);
        let err = parse_matrix(&bytes).unwrap_err();
        assert!(matches!(err, NpyError::Truncated { .. }));
    }

    #[test]
    fn test_big_endian_rejected() {
        let rows = vec![vec![1.0f32, 2.0]];
        let mut bytes = npy_bytes_f32(&rows, 2);
        replace_in_bytes(&mut bytes, b"<f4", b">f4");
        let err = parse_matrix(&bytes).unwrap_err();
        assert!(matches!(err, NpyError::UnsupportedDescr(_)));
    }

    #[test]
    fn test_read_matrix_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.npy");
        let rows = vec![vec![0.9f32, 0.1], vec![0.2, 0.8]];
        std::fs::write(&path, npy_bytes_f32(&rows, 2)).unwrap();

        let matrix = read_matrix(&path).unwrap();
        assert_eq!(matrix.data, rows);
    }
}
