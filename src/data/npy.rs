// ============================================================
// Layer 4: NumPy Token Array Codec
// ============================================================
// Reads and writes the two pre-encoded corpus formats:
//
//   .npy  one array
//         magic  b"\x93NUMPY"              (6 bytes)
//         version major, minor            (2 bytes)
//         header_len u16 LE (v1) / u32 LE (v2, v3)
//         header  Python dict literal, e.g.
//                 {'descr': '<u2', 'fortran_order': False, 'shape': (1024,), }
//         payload raw element bytes, C order
//
//   .npz  a zip archive of .npy members (arr_0.npy, arr_1.npy, ...)
//
// Only integer dtypes are accepted since every element becomes a
// u32 token ID. Pickled object arrays are refused outright.

use std::io::{Read, Seek, Write};

use thiserror::Error;
use zip::{write::FileOptions, CompressionMethod, ZipArchive, ZipWriter};

use crate::domain::chunk::TokenChunk;

const MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Header + preamble is padded to a multiple of this many bytes.
const HEADER_ALIGN: usize = 64;

/// Cap on the preallocation taken from an `.npz` member's declared size.
const MAX_SIZE_HINT: u64 = 1 << 20;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("not a .npy array (bad magic bytes)")]
    BadMagic,

    #[error("unsupported .npy format version {0}.{1}")]
    UnsupportedVersion(u8, u8),

    #[error("truncated .npy data: {0}")]
    Truncated(&'static str),

    #[error("malformed .npy header: {0}")]
    BadHeader(String),

    #[error("unsupported dtype '{0}', expected an integer token array")]
    UnsupportedDtype(String),

    #[error("fortran-ordered array with shape {0:?} is not supported")]
    FortranOrder(Vec<usize>),

    #[error("token value {value} at position {position} does not fit in u32")]
    OutOfRange { value: i128, position: usize },

    #[error("npz member '{name}': {source}")]
    Member {
        name:   String,
        #[source]
        source: Box<FormatError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("npz archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

/// An integer element type parsed from a `descr` string like `<u2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IntDtype {
    signed: bool,
    size:   usize,
    order:  ByteOrder,
}

impl IntDtype {
    fn parse(descr: &str) -> Result<Self, FormatError> {
        let unsupported = || FormatError::UnsupportedDtype(descr.to_string());

        let mut chars = descr.chars();
        let order = match chars.next() {
            Some('<') | Some('|') => ByteOrder::Little,
            Some('>') => ByteOrder::Big,
            Some('=') if cfg!(target_endian = "big") => ByteOrder::Big,
            Some('=') => ByteOrder::Little,
            _ => return Err(unsupported()),
        };
        let signed = match chars.next() {
            Some('u') => false,
            Some('i') => true,
            _ => return Err(unsupported()),
        };
        let size: usize = chars.as_str().parse().map_err(|_| unsupported())?;
        if !matches!(size, 1 | 2 | 4 | 8) {
            return Err(unsupported());
        }

        Ok(Self { signed, size, order })
    }

    /// Decode one element, sign-extending signed types.
    fn read(&self, bytes: &[u8]) -> i128 {
        let mut buf = [0u8; 8];
        let raw = match self.order {
            ByteOrder::Little => {
                buf[..self.size].copy_from_slice(bytes);
                u64::from_le_bytes(buf)
            }
            ByteOrder::Big => {
                buf[8 - self.size..].copy_from_slice(bytes);
                u64::from_be_bytes(buf)
            }
        };

        if self.signed {
            let shift = 64 - 8 * self.size as u32;
            (((raw << shift) as i64) >> shift) as i128
        } else {
            raw as i128
        }
    }
}

/// The parts of the header dict the decoder needs.
#[derive(Debug, PartialEq, Eq)]
struct Header {
    descr:         String,
    fortran_order: bool,
    shape:         Vec<usize>,
}

impl Header {
    fn parse(text: &str) -> Result<Self, FormatError> {
        let descr = {
            let v     = dict_value(text, "descr")?;
            let quote = v.chars().next().filter(|c| *c == '\'' || *c == '"');
            let quote = quote.ok_or_else(|| FormatError::BadHeader("descr is not a string".into()))?;
            let rest  = &v[1..];
            let end   = rest
                .find(quote)
                .ok_or_else(|| FormatError::BadHeader("unterminated descr".into()))?;
            rest[..end].to_string()
        };

        let fortran_order = {
            let v = dict_value(text, "fortran_order")?;
            if v.starts_with("True") {
                true
            } else if v.starts_with("False") {
                false
            } else {
                return Err(FormatError::BadHeader("fortran_order is not a bool".into()));
            }
        };

        let shape = {
            let v = dict_value(text, "shape")?;
            let inner = v
                .strip_prefix('(')
                .and_then(|s| s.split(')').next())
                .ok_or_else(|| FormatError::BadHeader("shape is not a tuple".into()))?;
            inner
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.trim_end_matches('L')
                        .parse::<usize>()
                        .map_err(|_| FormatError::BadHeader(format!("bad shape dimension '{s}'")))
                })
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Self { descr, fortran_order, shape })
    }
}

/// Slice of the header starting right after `'key':`, trimmed.
fn dict_value<'h>(header: &'h str, key: &str) -> Result<&'h str, FormatError> {
    let at = header
        .find(&format!("'{key}'"))
        .or_else(|| header.find(&format!("\"{key}\"")))
        .ok_or_else(|| FormatError::BadHeader(format!("missing key '{key}'")))?;

    let after = &header[at + key.len() + 2..];
    let colon = after
        .find(':')
        .ok_or_else(|| FormatError::BadHeader(format!("no value for '{key}'")))?;
    Ok(after[colon + 1..].trim_start())
}

/// Decode a complete `.npy` file into a flat token chunk.
pub fn decode_npy(bytes: &[u8]) -> Result<TokenChunk, FormatError> {
    if bytes.len() < MAGIC.len() + 2 {
        return Err(FormatError::Truncated("preamble"));
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(FormatError::BadMagic);
    }

    let (major, minor) = (bytes[6], bytes[7]);
    let (header_len, header_start) = match major {
        1 => {
            let b = bytes.get(8..10).ok_or(FormatError::Truncated("header length"))?;
            (u16::from_le_bytes([b[0], b[1]]) as usize, 10)
        }
        2 | 3 => {
            let b = bytes.get(8..12).ok_or(FormatError::Truncated("header length"))?;
            (u32::from_le_bytes([b[0], b[1], b[2], b[3]]) as usize, 12)
        }
        _ => return Err(FormatError::UnsupportedVersion(major, minor)),
    };

    let header_end = header_start + header_len;
    let header_raw = bytes
        .get(header_start..header_end)
        .ok_or(FormatError::Truncated("header"))?;
    let header_text = std::str::from_utf8(header_raw)
        .map_err(|_| FormatError::BadHeader("header is not valid text".into()))?;
    let header = Header::parse(header_text)?;

    let dtype = IntDtype::parse(&header.descr)?;

    let non_trivial = header.shape.iter().filter(|&&d| d > 1).count();
    if header.fortran_order && non_trivial > 1 {
        return Err(FormatError::FortranOrder(header.shape));
    }

    // An empty shape tuple is a 0-d scalar holding one element
    let count = header
        .shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or_else(|| FormatError::BadHeader("shape overflows".into()))?;
    let payload_len = count
        .checked_mul(dtype.size)
        .ok_or_else(|| FormatError::BadHeader("shape overflows".into()))?;

    let payload = &bytes[header_end..];
    if payload.len() < payload_len {
        return Err(FormatError::Truncated("array payload"));
    }

    payload
        .chunks_exact(dtype.size)
        .take(count)
        .enumerate()
        .map(|(position, raw)| {
            let value = dtype.read(raw);
            u32::try_from(value).map_err(|_| FormatError::OutOfRange { value, position })
        })
        .collect()
}

/// Encode tokens as a version 1.0, little-endian `u4`, 1-D `.npy` file.
pub fn encode_npy(tokens: &[u32]) -> Vec<u8> {
    let dict = format!(
        "{{'descr': '<u4', 'fortran_order': False, 'shape': ({},), }}",
        tokens.len()
    );

    // magic + version + u16 length + dict + trailing newline, padded with spaces
    let unpadded = MAGIC.len() + 2 + 2 + dict.len() + 1;
    let padding  = (HEADER_ALIGN - unpadded % HEADER_ALIGN) % HEADER_ALIGN;
    let mut header = dict;
    header.push_str(&" ".repeat(padding));
    header.push('\n');

    let mut out = Vec::with_capacity(unpadded + padding + tokens.len() * 4);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for t in tokens {
        out.extend_from_slice(&t.to_le_bytes());
    }
    out
}

/// Read every `.npy` member of an `.npz` archive, in archive order.
pub fn read_npz<R: Read + Seek>(reader: R) -> Result<Vec<TokenChunk>, FormatError> {
    let mut archive = ZipArchive::new(reader)?;
    let mut chunks  = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut member = archive.by_index(i)?;
        let name = member.name().to_string();

        if !name.ends_with(".npy") {
            tracing::debug!("Skipping non-array npz member '{}'", name);
            continue;
        }

        // The declared size is untrusted; only use it as a bounded hint
        let hint      = member.size().min(MAX_SIZE_HINT) as usize;
        let mut bytes = Vec::with_capacity(hint);
        member.read_to_end(&mut bytes)?;

        let chunk = decode_npy(&bytes).map_err(|e| FormatError::Member {
            name,
            source: Box::new(e),
        })?;
        chunks.push(chunk);
    }

    Ok(chunks)
}

/// Write chunks as a deflate-compressed `.npz` (`arr_0.npy`, `arr_1.npy`, ...).
pub fn write_npz<W, C>(writer: W, chunks: &[C]) -> Result<W, FormatError>
where
    W: Write + Seek,
    C: AsRef<[u32]>,
{
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .large_file(true);

    for (i, chunk) in chunks.iter().enumerate() {
        zip.start_file(format!("arr_{i}.npy"), options)?;
        zip.write_all(&encode_npy(chunk.as_ref()))?;
    }

    Ok(zip.finish()?)
}
