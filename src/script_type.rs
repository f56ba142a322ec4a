//! Kinds of function scripts a host can load.

use std::fmt;
use std::path::Path;

/// Language or packaging of a function's script file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptType {
    CSharp,
    FSharp,
    DotNetAssembly,
    JavaScript,
    Python,
    PowerShell,
}

impl ScriptType {
    pub const ALL: [ScriptType; 6] = [
        ScriptType::CSharp,
        ScriptType::FSharp,
        ScriptType::DotNetAssembly,
        ScriptType::JavaScript,
        ScriptType::Python,
        ScriptType::PowerShell,
    ];

    /// File extensions, without the dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ScriptType::CSharp => &["csx"],
            ScriptType::FSharp => &["fsx"],
            ScriptType::DotNetAssembly => &["dll"],
            ScriptType::JavaScript => &["js", "mjs"],
            ScriptType::Python => &["py"],
            ScriptType::PowerShell => &["ps1", "psm1"],
        }
    }

    /// Script type of a file extension, ignoring case and a leading dot.
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|ty| ty.extensions().contains(&extension.as_str()))
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScriptType::CSharp => "CSharp",
            ScriptType::FSharp => "FSharp",
            ScriptType::DotNetAssembly => "DotNetAssembly",
            ScriptType::JavaScript => "JavaScript",
            ScriptType::Python => "Python",
            ScriptType::PowerShell => "PowerShell",
        }
    }
}

impl fmt::Display for ScriptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
