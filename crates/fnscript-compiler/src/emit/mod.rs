//! Emission of the binary image and debug symbols.
//!
//! Emission first reports the compilation's native diagnostics. When none
//! of them is an error, the image is written to the caller's sink, followed
//! by the debug-symbol document when symbols are enabled and a sink was
//! given. Cancellation is checked before anything is written and between
//! method bodies; output already written stays written.

mod image;
mod symbols;

use std::io::{self, Write};

use fnscript_core::{CancellationToken, CompilationError, Diagnostic, DiagnosticSliceExt, Member, Modifiers};
use thiserror::Error;
use tracing::{debug, info};

pub use image::{
    IMAGE_MAGIC, IMAGE_VERSION, ImageError, ImageFlags, ImageHeader, LoadedImage, Manifest,
    ManifestMember, ManifestMemberKind, ManifestReference, ManifestType,
};
pub use symbols::{DebugDocument, DebugSymbols, SYMBOLS_FORMAT, SequencePoint};

use crate::compilation::{Compilation, ScriptCompilation};

/// Outcome of an emission attempt that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitResult {
    success: bool,
    diagnostics: Vec<Diagnostic>,
}

impl EmitResult {
    pub fn succeeded(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            success: true,
            diagnostics,
        }
    }

    pub fn failed(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            success: false,
            diagnostics,
        }
    }

    /// Whether an image was written.
    pub fn success(&self) -> bool {
        self.success
    }

    /// Diagnostics reported by the engine during emission.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Emission stopped before completing.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("emission was cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<EmitError> for CompilationError {
    fn from(err: EmitError) -> Self {
        match err {
            EmitError::Cancelled => CompilationError::Cancelled,
            EmitError::Io(e) => CompilationError::Io(e),
        }
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), EmitError> {
    if cancel.is_cancelled() {
        return Err(EmitError::Cancelled);
    }
    Ok(())
}

#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn emit_script(
    compilation: &ScriptCompilation,
    out: &mut dyn Write,
    symbol_sink: Option<&mut dyn Write>,
    cancel: &CancellationToken,
) -> Result<EmitResult, EmitError> {
    let diagnostics = compilation.diagnostics();
    if diagnostics.has_errors() {
        debug!(
            errors = diagnostics.errors().count(),
            "skipping emission of compilation with errors"
        );
        return Ok(EmitResult::failed(diagnostics));
    }
    check_cancelled(cancel)?;

    let options = compilation.options();
    let symbol_sink = symbol_sink.filter(|_| options.emit_debug_symbols);
    let bodies = compilation.bodies();
    let trees = compilation.syntax_trees();

    let mut flags = ImageFlags::empty();
    flags.set(ImageFlags::DEBUG_SYMBOLS, symbol_sink.is_some());
    flags.set(
        ImageFlags::HAS_STATEMENTS,
        bodies.iter().any(|b| b.member.is_none()),
    );
    flags.set(
        ImageFlags::NO_PUBLIC_ENTRY,
        !compilation.script_class().methods().any(|m| m.is_public()),
    );

    let header = ImageHeader {
        version: IMAGE_VERSION,
        optimization: options.optimization,
        flags,
        mvid: compilation.assembly().mvid(),
    };
    header.write(out)?;
    image::write_manifest(out, &build_manifest(compilation))?;
    image::write_body_count(out, bodies.len())?;
    for bound in bodies {
        check_cancelled(cancel)?;
        let text = trees
            .get(bound.document)
            .map(|tree| bound.body.text(tree.text()))
            .unwrap_or("");
        image::write_body(out, text)?;
    }
    out.flush()?;

    if let Some(sink) = symbol_sink {
        let document = build_symbols(compilation);
        serde_json::to_writer_pretty(&mut *sink, &document).map_err(io::Error::from)?;
        sink.flush()?;
    }

    info!(
        assembly = %compilation.assembly(),
        bodies = bodies.len(),
        debug_symbols = flags.contains(ImageFlags::DEBUG_SYMBOLS),
        "emitted image"
    );
    Ok(EmitResult::succeeded(diagnostics))
}

fn build_manifest(compilation: &ScriptCompilation) -> Manifest {
    let class = compilation.script_class();
    let mut member_bodies = vec![None; class.members.len()];
    let mut statements = Vec::new();
    for (index, bound) in compilation.bodies().iter().enumerate() {
        match bound.member {
            Some(member) => {
                if let Some(slot) = member_bodies.get_mut(member) {
                    *slot = Some(index);
                }
            }
            None => statements.push(index),
        }
    }

    let members = class
        .members
        .iter()
        .zip(member_bodies)
        .map(|(member, body)| match member {
            Member::Method(m) => ManifestMember {
                kind: ManifestMemberKind::Method,
                name: m.name.to_string(),
                signature: m.to_string(),
                is_public: m.is_public(),
                is_static: m.modifiers.contains(Modifiers::STATIC),
                body,
            },
            Member::Field(f) | Member::Property(f) => ManifestMember {
                kind: if matches!(member, Member::Field(_)) {
                    ManifestMemberKind::Field
                } else {
                    ManifestMemberKind::Property
                },
                name: f.name.to_string(),
                signature: format!("{} {}", f.ty, f.name),
                is_public: f.modifiers.contains(Modifiers::PUBLIC),
                is_static: f.modifiers.contains(Modifiers::STATIC),
                body: None,
            },
        })
        .collect();

    Manifest {
        assembly: compilation.assembly().name().to_string(),
        mvid: format!("{:016x}", compilation.assembly().mvid()),
        references: compilation
            .references()
            .iter()
            .map(|r| ManifestReference {
                name: r.name().to_string(),
                mvid: format!("{:016x}", r.identity().mvid()),
            })
            .collect(),
        types: compilation
            .local_types()
            .iter()
            .map(|ty| ManifestType {
                name: ty.to_string(),
                kind: format!("{:?}", ty.kind()).to_lowercase(),
            })
            .collect(),
        script_class: class.name.to_string(),
        members,
        statements,
    }
}

fn build_symbols(compilation: &ScriptCompilation) -> DebugSymbols {
    let mut symbols = DebugSymbols::new(compilation.assembly().mvid());
    for tree in compilation.syntax_trees() {
        symbols.add_document(tree.path(), tree.checksum());
    }
    let class = compilation.script_class();
    for bound in compilation.bodies() {
        let Some(Member::Method(method)) = bound.member.and_then(|m| class.members.get(m)) else {
            continue;
        };
        symbols.sequence_points.push(SequencePoint {
            method: method.name.to_string(),
            document: bound.document,
            line: bound.body.span.line,
            column: bound.body.span.col,
        });
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnscript_core::{OptimizationLevel, codes};

    fn compile(text: &str) -> ScriptCompilation {
        ScriptCompilation::builder().source("run.csx", text).build()
    }

    fn emit(compilation: &ScriptCompilation) -> (EmitResult, Vec<u8>, Vec<u8>) {
        let mut image = Vec::new();
        let mut symbols = Vec::new();
        let result = compilation
            .emit(&mut image, Some(&mut symbols), &CancellationToken::new())
            .unwrap();
        (result, image, symbols)
    }

    #[test]
    fn emits_image_with_manifest_and_bodies() {
        let compilation = compile(
            r#"
            public class Order { }
            static int calls;
            public static string Run(Order order, string name)
            {
                return "Hello " + name;
            }
            "#,
        );
        let (result, image, _) = emit(&compilation);
        assert!(result.success());

        let loaded = LoadedImage::read(&mut image.as_slice()).unwrap();
        assert_eq!(loaded.header.mvid, compilation.assembly().mvid());
        assert_eq!(loaded.manifest.script_class, "Submission#0");
        assert_eq!(loaded.manifest.types[0].name, "Order");
        assert_eq!(loaded.manifest.members.len(), 2);
        assert_eq!(
            loaded.manifest.members[1].signature,
            "String Run(Order order, String name)"
        );
        assert!(loaded.method_body("Run").unwrap().contains("\"Hello \" + name"));
    }

    #[test]
    fn writes_debug_symbols() {
        let compilation = compile("public static void Run()\n{\n}\n");
        let (_, image, symbols) = emit(&compilation);
        let header = ImageHeader::read(&mut image.as_slice()).unwrap();
        assert!(header.flags.contains(ImageFlags::DEBUG_SYMBOLS));

        let document: DebugSymbols = serde_json::from_slice(&symbols).unwrap();
        assert_eq!(document.documents[0].path, "run.csx");
        let point = document.sequence_point("Run").unwrap();
        assert_eq!((point.line, point.column), (2, 1));
    }

    #[test]
    fn symbols_are_skipped_when_disabled() {
        let compilation = ScriptCompilation::builder()
            .options(fnscript_core::CompilationOptions {
                optimization: OptimizationLevel::Release,
                emit_debug_symbols: false,
                ..Default::default()
            })
            .source("run.csx", "public static void Run() { }")
            .build();
        let (result, image, symbols) = emit(&compilation);
        assert!(result.success());
        assert!(symbols.is_empty());
        let header = ImageHeader::read(&mut image.as_slice()).unwrap();
        assert_eq!(header.optimization, OptimizationLevel::Release);
        assert!(!header.flags.contains(ImageFlags::DEBUG_SYMBOLS));
    }

    #[test]
    fn errors_prevent_writing() {
        let compilation = compile("public static void Run(Missing m) { }");
        let (result, image, symbols) = emit(&compilation);
        assert!(!result.success());
        assert_eq!(result.diagnostics()[0].code(), codes::TYPE_NOT_FOUND);
        assert!(image.is_empty());
        assert!(symbols.is_empty());
    }

    #[test]
    fn cancelled_before_writing() {
        let compilation = compile("public static void Run() { }");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut image = Vec::new();
        let result = compilation.emit(&mut image, None, &cancel);
        assert!(matches!(result, Err(EmitError::Cancelled)));
        assert!(image.is_empty());
    }

    #[test]
    fn statements_are_flagged() {
        let compilation = compile("Console.WriteLine(\"starting\");\npublic static void Run() { }");
        let (_, image, _) = emit(&compilation);
        let loaded = LoadedImage::read(&mut image.as_slice()).unwrap();
        assert!(loaded.header.flags.contains(ImageFlags::HAS_STATEMENTS));
        assert_eq!(loaded.manifest.statements, [0]);
    }

    #[test]
    fn emit_errors_convert_to_compilation_errors() {
        let err: CompilationError = EmitError::Cancelled.into();
        assert!(matches!(err, CompilationError::Cancelled));
        assert!(!err.is_user_error());
    }
}
