//! Debug-symbol document.

use serde::{Deserialize, Serialize};

pub const SYMBOLS_FORMAT: &str = "fnscript-symbols/1";

/// A source document the image was compiled from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugDocument {
    pub path: String,
    pub checksum_algorithm: String,
    /// Lowercase hex.
    pub checksum: String,
}

/// Maps a method to the start of its body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePoint {
    pub method: String,
    /// Index into `documents`.
    pub document: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugSymbols {
    pub format: String,
    pub mvid: String,
    pub documents: Vec<DebugDocument>,
    pub sequence_points: Vec<SequencePoint>,
}

impl DebugSymbols {
    pub fn new(mvid: u64) -> Self {
        Self {
            format: SYMBOLS_FORMAT.to_string(),
            mvid: format!("{mvid:016x}"),
            documents: Vec::new(),
            sequence_points: Vec::new(),
        }
    }

    pub fn add_document(&mut self, path: &str, checksum: u64) {
        self.documents.push(DebugDocument {
            path: path.to_string(),
            checksum_algorithm: "xxh64".to_string(),
            checksum: format!("{checksum:016x}"),
        });
    }

    /// Sequence point of the named method, if any.
    pub fn sequence_point(&self, method: &str) -> Option<&SequencePoint> {
        self.sequence_points.iter().find(|p| p.method == method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksums_render_as_fixed_width_hex() {
        let mut symbols = DebugSymbols::new(0xff);
        symbols.add_document("run.csx", 0xabc);
        assert_eq!(symbols.mvid, "00000000000000ff");
        assert_eq!(symbols.documents[0].checksum, "0000000000000abc");
        let json = serde_json::to_string(&symbols).unwrap();
        assert!(json.contains("\"format\":\"fnscript-symbols/1\""));
    }
}
