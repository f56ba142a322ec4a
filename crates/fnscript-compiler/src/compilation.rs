//! The compilation engine seam and the reference script engine.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use fnscript_core::{
    AssemblyIdentity, CancellationToken, CompilationOptions, Diagnostic, ScriptClass, TypeSymbol,
};

use crate::binder::{self, BoundBody, BoundCompilation};
use crate::emit::{self, EmitError, EmitResult};
use crate::metadata::{AssemblyMetadata, DefaultMetadataResolver, MetadataResolver};
use crate::syntax::{SourceText, SyntaxTree};

/// A compiled-source instance as seen by the compilation unit and the
/// analyzers.
///
/// Implementations are immutable once created.
pub trait Compilation: Send + Sync {
    /// Identity of the assembly this compilation produces.
    fn assembly(&self) -> &AssemblyIdentity;

    /// Parsed documents, in the order they were added.
    fn syntax_trees(&self) -> &[SyntaxTree];

    /// The class holding the script's top-level members.
    fn script_class(&self) -> &ScriptClass;

    /// Native diagnostics of the engine, in engine order.
    fn diagnostics(&self) -> Vec<Diagnostic>;

    /// Write the binary image and, if a sink is given, the debug symbols.
    ///
    /// Writes are not rolled back when emission fails part-way.
    fn emit(
        &self,
        image: &mut dyn Write,
        symbols: Option<&mut dyn Write>,
        cancel: &CancellationToken,
    ) -> Result<EmitResult, EmitError>;
}

/// The reference engine for function scripts.
///
/// Sources are bound when the compilation is built; every accessor reads
/// the bound result.
#[derive(Debug, Clone)]
pub struct ScriptCompilation {
    options: CompilationOptions,
    bound: BoundCompilation,
}

impl ScriptCompilation {
    pub fn builder() -> ScriptCompilationBuilder {
        ScriptCompilationBuilder::default()
    }

    /// Bind `sources` against the given references.
    pub fn create(
        options: CompilationOptions,
        sources: &[SourceText],
        resolver: &dyn MetadataResolver,
    ) -> Self {
        let bound = binder::bind(&options, sources, resolver);
        Self { options, bound }
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    /// Referenced assemblies, defaults first.
    pub fn references(&self) -> &[Arc<AssemblyMetadata>] {
        &self.bound.references
    }

    /// Namespaces imported by default or by `using`.
    pub fn imports(&self) -> &[String] {
        &self.bound.imports
    }

    /// Types declared in the scripts.
    pub fn local_types(&self) -> &[Arc<TypeSymbol>] {
        &self.bound.local_types
    }

    pub(crate) fn bodies(&self) -> &[BoundBody] {
        &self.bound.bodies
    }
}

impl Compilation for ScriptCompilation {
    fn assembly(&self) -> &AssemblyIdentity {
        &self.bound.assembly
    }

    fn syntax_trees(&self) -> &[SyntaxTree] {
        &self.bound.syntax_trees
    }

    fn script_class(&self) -> &ScriptClass {
        &self.bound.script_class
    }

    fn diagnostics(&self) -> Vec<Diagnostic> {
        self.bound.diagnostics.clone()
    }

    fn emit(
        &self,
        image: &mut dyn Write,
        symbols: Option<&mut dyn Write>,
        cancel: &CancellationToken,
    ) -> Result<EmitResult, EmitError> {
        emit::emit_script(self, image, symbols, cancel)
    }
}

/// Builder for [`ScriptCompilation`].
#[derive(Default)]
pub struct ScriptCompilationBuilder {
    options: CompilationOptions,
    sources: Vec<SourceText>,
    resolver: Option<Arc<dyn MetadataResolver>>,
    probing_paths: Vec<PathBuf>,
}

impl ScriptCompilationBuilder {
    pub fn options(mut self, options: CompilationOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a document.
    pub fn source(mut self, path: impl Into<Arc<str>>, text: impl Into<Arc<str>>) -> Self {
        self.sources.push(SourceText::new(path, text));
        self
    }

    pub fn sources(mut self, sources: impl IntoIterator<Item = SourceText>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Use `resolver` instead of the default one.
    pub fn resolver(mut self, resolver: Arc<dyn MetadataResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Extra directories for file references of the default resolver.
    pub fn probing_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.probing_paths.extend(paths);
        self
    }

    pub fn build(self) -> ScriptCompilation {
        match self.resolver {
            Some(resolver) => ScriptCompilation::create(self.options, &self.sources, &*resolver),
            None => {
                let resolver = DefaultMetadataResolver::new().with_probing_paths(self.probing_paths);
                ScriptCompilation::create(self.options, &self.sources, &resolver)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnscript_core::DiagnosticSliceExt;

    #[test]
    fn builder_binds_sources() {
        let compilation = ScriptCompilation::builder()
            .source("run.csx", "public static string Run(string name) => name;")
            .build();
        assert_eq!(compilation.syntax_trees().len(), 1);
        assert_eq!(compilation.script_class().methods().count(), 1);
        assert!(compilation.diagnostics().is_empty());
        assert_eq!(compilation.assembly().name(), "Submission");
    }

    #[test]
    fn empty_compilation_has_no_trees() {
        let compilation = ScriptCompilation::builder().build();
        assert!(compilation.syntax_trees().is_empty());
        assert!(compilation.script_class().members.is_empty());
    }

    #[test]
    fn custom_resolver_controls_references() {
        struct Bare;
        impl MetadataResolver for Bare {
            fn default_references(&self) -> Vec<Arc<AssemblyMetadata>> {
                Vec::new()
            }
            fn default_imports(&self) -> Vec<String> {
                Vec::new()
            }
            fn resolve_reference(
                &self,
                _reference: &str,
                _base_directory: Option<&std::path::Path>,
            ) -> Option<Arc<AssemblyMetadata>> {
                None
            }
        }

        let compilation = ScriptCompilation::builder()
            .resolver(Arc::new(Bare))
            .source("run.csx", "public static void Run(ILogger log) { }")
            .build();
        assert!(compilation.references().is_empty());
        assert!(compilation.diagnostics().has_errors());
    }

    #[test]
    fn options_name_the_assembly_and_class() {
        let options = CompilationOptions {
            assembly_name: "HttpTrigger".to_string(),
            script_class_name: "Script".to_string(),
            ..CompilationOptions::default()
        };
        let compilation = ScriptCompilation::builder()
            .options(options)
            .source("run.csx", "public static void Run() { }")
            .build();
        assert_eq!(compilation.assembly().name(), "HttpTrigger");
        assert_eq!(&*compilation.script_class().name, "Script");
    }
}
