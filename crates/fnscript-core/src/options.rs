//! Options that control how a script is compiled and emitted.

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Deserialize;

/// Optimization level recorded in the emitted image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, IntoPrimitive, TryFromPrimitive,
)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum OptimizationLevel {
    #[default]
    Debug = 0,
    Release = 1,
}

/// Compilation options, usually read from the `[compilation]` table of the
/// host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilationOptions {
    /// Base name of the emitted assembly.
    pub assembly_name: String,
    /// Name of the implicit class holding the script's top-level members.
    pub script_class_name: String,
    pub optimization: OptimizationLevel,
    /// Whether emission writes the debug-symbol document.
    pub emit_debug_symbols: bool,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            assembly_name: "Submission".to_string(),
            script_class_name: "Submission#0".to_string(),
            optimization: OptimizationLevel::Debug,
            emit_debug_symbols: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_options_fall_back_to_defaults() {
        let options: CompilationOptions =
            serde_json::from_str(r#"{ "optimization": "release" }"#).expect("valid options");
        assert_eq!(options.optimization, OptimizationLevel::Release);
        assert_eq!(options.assembly_name, "Submission");
        assert!(options.emit_debug_symbols);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<CompilationOptions>(r#"{ "optimise": true }"#);
        assert!(result.is_err());
    }
}
