//! Binary image format.
//!
//! ```text
//! magic        4 bytes  "FSIM"
//! version      u16 LE
//! optimization u8       OptimizationLevel
//! flags        u8       ImageFlags
//! mvid         u64 LE
//! manifest     u32 LE length + JSON
//! bodies       u32 LE count, then per body u32 LE length + UTF-8 source
//! ```

use std::io::{self, Read, Write};

use bitflags::bitflags;
use fnscript_core::OptimizationLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const IMAGE_MAGIC: [u8; 4] = *b"FSIM";
pub const IMAGE_VERSION: u16 = 1;

bitflags! {
    /// Properties of an emitted image.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ImageFlags: u8 {
        /// A debug-symbol document was written alongside the image.
        const DEBUG_SYMBOLS = 1 << 0;
        /// The script has top-level statements.
        const HAS_STATEMENTS = 1 << 1;
        /// The script class has no public method.
        const NO_PUBLIC_ENTRY = 1 << 2;
    }
}

/// Errors while reading an image back.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("not an fnscript image (magic {0:?})")]
    BadMagic([u8; 4]),

    #[error("unsupported image version {0}")]
    UnsupportedVersion(u16),

    #[error("invalid optimization level {0}")]
    InvalidOptimizationLevel(u8),

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("method body is not valid UTF-8")]
    InvalidBody(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Fixed-size image header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHeader {
    pub version: u16,
    pub optimization: OptimizationLevel,
    pub flags: ImageFlags,
    pub mvid: u64,
}

impl ImageHeader {
    pub const SIZE: usize = 16;

    pub fn write(&self, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(&IMAGE_MAGIC)?;
        out.write_all(&self.version.to_le_bytes())?;
        out.write_all(&[u8::from(self.optimization), self.flags.bits()])?;
        out.write_all(&self.mvid.to_le_bytes())
    }

    pub fn read(input: &mut impl Read) -> Result<Self, ImageError> {
        let mut bytes = [0u8; Self::SIZE];
        input.read_exact(&mut bytes)?;

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != IMAGE_MAGIC {
            return Err(ImageError::BadMagic(magic));
        }
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != IMAGE_VERSION {
            return Err(ImageError::UnsupportedVersion(version));
        }
        let optimization = OptimizationLevel::try_from(bytes[6])
            .map_err(|e| ImageError::InvalidOptimizationLevel(e.number))?;
        let flags = ImageFlags::from_bits_truncate(bytes[7]);
        let mut mvid = [0u8; 8];
        mvid.copy_from_slice(&bytes[8..16]);

        Ok(Self {
            version,
            optimization,
            flags,
            mvid: u64::from_le_bytes(mvid),
        })
    }
}

/// Kind of a script class member in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestMemberKind {
    Method,
    Field,
    Property,
}

/// A script class member in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestMember {
    pub kind: ManifestMemberKind,
    pub name: String,
    /// Rendered declaration, e.g. `Void Run(String name)`.
    pub signature: String,
    pub is_public: bool,
    pub is_static: bool,
    /// Index into the image's bodies, for methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<usize>,
}

/// A type declared by the script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestType {
    pub name: String,
    pub kind: String,
}

/// A referenced assembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestReference {
    pub name: String,
    pub mvid: String,
}

/// Description of the image contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub assembly: String,
    pub mvid: String,
    pub references: Vec<ManifestReference>,
    pub types: Vec<ManifestType>,
    pub script_class: String,
    pub members: Vec<ManifestMember>,
    /// Body indices of top-level statements, in execution order.
    pub statements: Vec<usize>,
}

fn write_blob(out: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "blob exceeds 4 GiB"))?;
    out.write_all(&len.to_le_bytes())?;
    out.write_all(bytes)
}

fn read_u32(input: &mut impl Read) -> io::Result<u32> {
    let mut bytes = [0u8; 4];
    input.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

/// Reads a length-prefixed blob. Memory grows with the bytes actually
/// present, never with the declared length.
fn read_blob(input: &mut impl Read) -> io::Result<Vec<u8>> {
    let len = read_u32(input)? as usize;
    let mut bytes = Vec::new();
    input.by_ref().take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("blob declares {len} bytes, found {}", bytes.len()),
        ));
    }
    Ok(bytes)
}

pub(crate) fn write_manifest(out: &mut dyn Write, manifest: &Manifest) -> io::Result<()> {
    let json = serde_json::to_vec(manifest)?;
    write_blob(out, &json)
}

pub(crate) fn write_body_count(out: &mut dyn Write, count: usize) -> io::Result<()> {
    let count = u32::try_from(count)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many bodies"))?;
    out.write_all(&count.to_le_bytes())
}

pub(crate) fn write_body(out: &mut dyn Write, text: &str) -> io::Result<()> {
    write_blob(out, text.as_bytes())
}

/// An image read back into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub header: ImageHeader,
    pub manifest: Manifest,
    pub bodies: Vec<String>,
}

impl LoadedImage {
    pub fn read(input: &mut impl Read) -> Result<Self, ImageError> {
        let header = ImageHeader::read(input)?;
        let manifest = serde_json::from_slice(&read_blob(input)?)?;
        let count = read_u32(input)?;
        let bodies = (0..count)
            .map(|_| Ok(String::from_utf8(read_blob(input)?)?))
            .collect::<Result<Vec<_>, ImageError>>()?;
        Ok(Self {
            header,
            manifest,
            bodies,
        })
    }

    /// Source of the body belonging to the named method.
    pub fn method_body(&self, name: &str) -> Option<&str> {
        self.manifest
            .members
            .iter()
            .find(|member| member.kind == ManifestMemberKind::Method && member.name == name)
            .and_then(|member| member.body)
            .and_then(|index| self.bodies.get(index))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ImageHeader {
        ImageHeader {
            version: IMAGE_VERSION,
            optimization: OptimizationLevel::Release,
            flags: ImageFlags::DEBUG_SYMBOLS,
            mvid: 0x0123_4567_89ab_cdef,
        }
    }

    #[test]
    fn header_layout() {
        let mut bytes = Vec::new();
        header().write(&mut bytes).unwrap();
        assert_eq!(bytes.len(), ImageHeader::SIZE);
        assert_eq!(&bytes[..4], b"FSIM");
        assert_eq!(bytes[6], 1);
        assert_eq!(ImageHeader::read(&mut bytes.as_slice()).unwrap(), header());
    }

    #[test]
    fn rejects_foreign_data() {
        let mut bytes = b"MZ\x90\x00".to_vec();
        bytes.resize(ImageHeader::SIZE, 0);
        assert!(matches!(
            ImageHeader::read(&mut bytes.as_slice()),
            Err(ImageError::BadMagic(_))
        ));
    }

    #[test]
    fn rejects_unknown_optimization_level() {
        let mut bytes = Vec::new();
        header().write(&mut bytes).unwrap();
        bytes[6] = 9;
        assert!(matches!(
            ImageHeader::read(&mut bytes.as_slice()),
            Err(ImageError::InvalidOptimizationLevel(9))
        ));
    }

    #[test]
    fn oversized_blob_length_is_io_error() {
        let mut bytes = Vec::new();
        header().write(&mut bytes).unwrap();
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(b"{}");
        let err = LoadedImage::read(&mut bytes.as_slice()).unwrap_err();
        let ImageError::Io(err) = err else {
            panic!("expected an io error, got {err:?}");
        };
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn blobs_read_exactly_their_length() {
        let mut bytes = Vec::new();
        write_blob(&mut bytes, b"abc").unwrap();
        bytes.extend_from_slice(b"tail");
        let mut input = bytes.as_slice();
        assert_eq!(read_blob(&mut input).unwrap(), b"abc");
        assert_eq!(input, b"tail");
    }

    #[test]
    fn truncated_image_is_io_error() {
        assert!(matches!(
            ImageHeader::read(&mut &b"FSIM"[..]),
            Err(ImageError::Io(_))
        ));
    }
}
