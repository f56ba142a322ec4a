//! The compilation unit: one compiled-source instance and the operations a
//! host performs on it.
//!
//! The three operations are independent. Diagnostics and emission both
//! re-run the analyzers on every call; nothing is cached.

use std::io::Write;
use std::sync::Arc;

use fnscript_core::{
    AnalyzerError, CancellationToken, CompilationError, Diagnostic, DiagnosticSliceExt,
    FunctionSignature, MethodReference,
};
use tracing::{debug, warn};

use crate::analyzers::{CompilationWithAnalyzers, DiagnosticAnalyzer, builtin_analyzers};
use crate::compilation::{Compilation, ScriptCompilation};
use crate::locality::is_local_or_uses_local;
use crate::resolver::EntryPointResolver;

/// A compilation wrapped with its analyzers.
pub struct CompilationUnit<C = ScriptCompilation> {
    compilation: C,
    analyzers: Vec<Arc<dyn DiagnosticAnalyzer>>,
}

impl<C: Compilation> CompilationUnit<C> {
    /// Wrap `compilation` with the built-in analyzers.
    pub fn new(compilation: C) -> Self {
        Self::with_analyzers(compilation, builtin_analyzers().to_vec())
    }

    /// Wrap `compilation` with a fixed analyzer set.
    pub fn with_analyzers(compilation: C, analyzers: Vec<Arc<dyn DiagnosticAnalyzer>>) -> Self {
        Self {
            compilation,
            analyzers,
        }
    }

    pub fn compilation(&self) -> &C {
        &self.compilation
    }

    pub fn analyzers(&self) -> &[Arc<dyn DiagnosticAnalyzer>] {
        &self.analyzers
    }

    fn with_analyzers_view(&self) -> CompilationWithAnalyzers<'_> {
        CompilationWithAnalyzers::new(&self.compilation, &self.analyzers)
    }

    /// Analyzer diagnostics in registration order, then the engine's native
    /// diagnostics.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_diagnostics(&self) -> Result<Vec<Diagnostic>, AnalyzerError> {
        self.with_analyzers_view().all_diagnostics()
    }

    /// Write the image and debug symbols.
    ///
    /// The sinks are handed to the engine before the merged diagnostics are
    /// checked, so a failed emission may leave partial output behind. Any
    /// error-severity diagnostic fails the call with every diagnostic of the
    /// attempt.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn emit(
        &self,
        image: &mut dyn Write,
        symbols: Option<&mut dyn Write>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Diagnostic>, CompilationError> {
        let mut diagnostics = self.with_analyzers_view().analyzer_diagnostics()?;
        let result = self.compilation.emit(image, symbols, cancel)?;
        diagnostics.extend(result.into_diagnostics());

        if diagnostics.has_errors() {
            warn!(
                assembly = %self.compilation.assembly(),
                errors = diagnostics.errors().count(),
                "compilation failed"
            );
            return Err(CompilationError::Diagnostics { diagnostics });
        }
        debug!(assembly = %self.compilation.assembly(), "compilation emitted");
        Ok(diagnostics)
    }

    /// Resolve the entry point and describe how it is invoked.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn get_entry_point_signature(
        &self,
        resolver: &dyn EntryPointResolver,
    ) -> Result<FunctionSignature, CompilationError> {
        if self.compilation.syntax_trees().is_empty() {
            return Err(CompilationError::NoSyntaxTree);
        }

        let candidates: Vec<MethodReference> = self
            .compilation
            .script_class()
            .methods()
            .map(MethodReference::from_method)
            .collect();
        let entry_point = resolver.resolve(&candidates)?;

        let method = entry_point.method();
        let has_local_type_references = method
            .parameters
            .iter()
            .any(|param| is_local_or_uses_local(param.ty(), &method.containing_assembly));

        let signature = FunctionSignature::new(
            &*method.containing_type,
            &*method.name,
            method.parameters.clone(),
            has_local_type_references,
        );
        debug!(%signature, has_local_type_references, "resolved entry point");
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use fnscript_core::{
        AssemblyIdentity, EntryPointError, Location, Member, MethodSymbol, Modifiers,
        ParameterSymbol, RefKind, ScriptClass, Severity, TypeKind, TypeSymbol, codes,
    };

    use crate::emit::{EmitError, EmitResult};
    use crate::resolver::FunctionEntryPointResolver;
    use crate::syntax::{SourceText, SyntaxTree};

    fn local() -> AssemblyIdentity {
        AssemblyIdentity::new("Submission", 99)
    }

    fn external_type(name: &str) -> Arc<TypeSymbol> {
        Arc::new(TypeSymbol::named(
            Some("System"),
            name,
            TypeKind::Class,
            AssemblyIdentity::new("System.Runtime", 1),
        ))
    }

    fn local_type(name: &str) -> Arc<TypeSymbol> {
        Arc::new(TypeSymbol::named(None, name, TypeKind::Class, local()))
    }

    fn run_method(params: Vec<(&str, Arc<TypeSymbol>)>) -> Member {
        Member::Method(Arc::new(MethodSymbol {
            name: Arc::from("Run"),
            containing_type: Arc::from("Submission#0"),
            containing_assembly: local(),
            modifiers: Modifiers::PUBLIC | Modifiers::STATIC,
            return_type: external_type("Void"),
            type_parameters: Vec::new(),
            parameters: params
                .into_iter()
                .map(|(name, ty)| ParameterSymbol::new(name, ty, RefKind::None, false))
                .collect(),
            location: Location::none(),
        }))
    }

    /// Engine double with canned results.
    struct StubCompilation {
        trees: Vec<SyntaxTree>,
        class: ScriptClass,
        native: Vec<Diagnostic>,
    }

    impl StubCompilation {
        fn new(members: Vec<Member>) -> Self {
            Self {
                trees: vec![SyntaxTree::new(
                    &SourceText::new("run.csx", "// source"),
                    Vec::new(),
                    Vec::new(),
                )],
                class: ScriptClass {
                    name: Arc::from("Submission#0"),
                    assembly: local(),
                    members,
                },
                native: Vec::new(),
            }
        }

        fn without_trees(mut self) -> Self {
            self.trees.clear();
            self
        }

        fn with_native(mut self, diagnostic: Diagnostic) -> Self {
            self.native.push(diagnostic);
            self
        }
    }

    impl Compilation for StubCompilation {
        fn assembly(&self) -> &AssemblyIdentity {
            &self.class.assembly
        }

        fn syntax_trees(&self) -> &[SyntaxTree] {
            &self.trees
        }

        fn script_class(&self) -> &ScriptClass {
            &self.class
        }

        fn diagnostics(&self) -> Vec<Diagnostic> {
            self.native.clone()
        }

        fn emit(
            &self,
            image: &mut dyn Write,
            _symbols: Option<&mut dyn Write>,
            cancel: &CancellationToken,
        ) -> Result<EmitResult, EmitError> {
            if cancel.is_cancelled() {
                return Err(EmitError::Cancelled);
            }
            if self.native.has_errors() {
                return Ok(EmitResult::failed(self.native.clone()));
            }
            image.write_all(b"IMAGE")?;
            Ok(EmitResult::succeeded(self.native.clone()))
        }
    }

    struct Reporting {
        code: &'static str,
        severity: Severity,
        runs: AtomicUsize,
    }

    impl Reporting {
        fn new(code: &'static str, severity: Severity) -> Arc<Self> {
            Arc::new(Self {
                code,
                severity,
                runs: AtomicUsize::new(0),
            })
        }
    }

    impl DiagnosticAnalyzer for Reporting {
        fn id(&self) -> &'static str {
            self.code
        }

        fn analyze(&self, _: &dyn Compilation) -> Result<Vec<Diagnostic>, AnalyzerError> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Diagnostic::new(
                self.code,
                self.severity,
                "reported",
                Location::none(),
            )])
        }
    }

    struct Faulting;

    impl DiagnosticAnalyzer for Faulting {
        fn id(&self) -> &'static str {
            "AF999"
        }

        fn analyze(&self, _: &dyn Compilation) -> Result<Vec<Diagnostic>, AnalyzerError> {
            Err(AnalyzerError::new("AF999", "rule crashed"))
        }
    }

    struct CountingResolver(AtomicUsize);

    impl EntryPointResolver for CountingResolver {
        fn resolve<'a>(
            &self,
            candidates: &'a [MethodReference],
        ) -> Result<&'a MethodReference, EntryPointError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            candidates.first().ok_or(EntryPointError::Missing)
        }
    }

    fn warning(code: &str) -> Diagnostic {
        Diagnostic::warning(code, "native", Location::none())
    }

    fn error(code: &str) -> Diagnostic {
        Diagnostic::error(code, "native", Location::none())
    }

    #[test]
    fn clean_unit_emits_image() {
        let unit = CompilationUnit::with_analyzers(StubCompilation::new(Vec::new()), Vec::new());
        let mut image = Vec::new();
        let diagnostics = unit
            .emit(&mut image, None, &CancellationToken::new())
            .unwrap();
        assert!(diagnostics.is_empty());
        assert!(!image.is_empty());
    }

    #[test]
    fn analyzer_errors_fail_emission_after_writing() {
        let analyzer = Reporting::new("AF900", Severity::Error);
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(Vec::new()).with_native(warning("FS9001")),
            vec![analyzer as Arc<dyn DiagnosticAnalyzer>],
        );
        let mut image = Vec::new();
        let err = unit
            .emit(&mut image, None, &CancellationToken::new())
            .unwrap_err();

        let found: Vec<_> = err.diagnostics().iter().map(|d| d.code()).collect();
        assert_eq!(found, ["AF900", "FS9001"]);
        assert_eq!(err.errors().count(), 1);
        assert!(err.is_user_error());
        assert_eq!(image, b"IMAGE");
    }

    #[test]
    fn native_errors_fail_emission() {
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(Vec::new()).with_native(error(codes::TYPE_NOT_FOUND)),
            vec![Reporting::new("AF901", Severity::Warning) as Arc<dyn DiagnosticAnalyzer>],
        );
        let err = unit
            .emit(&mut io::sink(), None, &CancellationToken::new())
            .unwrap_err();
        let found: Vec<_> = err.diagnostics().iter().map(|d| d.code()).collect();
        assert_eq!(found, ["AF901", codes::TYPE_NOT_FOUND]);
    }

    #[test]
    fn warnings_do_not_fail_emission() {
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(Vec::new()).with_native(warning("FS9002")),
            vec![Reporting::new("AF902", Severity::Warning) as Arc<dyn DiagnosticAnalyzer>],
        );
        let diagnostics = unit
            .emit(&mut Vec::new(), None, &CancellationToken::new())
            .unwrap();
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn analyzer_fault_stops_emission_before_writing() {
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(Vec::new()),
            vec![
                Reporting::new("AF904", Severity::Warning) as Arc<dyn DiagnosticAnalyzer>,
                Arc::new(Faulting),
            ],
        );
        let mut image = Vec::new();
        let err = unit
            .emit(&mut image, None, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(&err, CompilationError::Analyzer(fault) if fault.analyzer == "AF999"));
        assert!(!err.is_user_error());
        assert!(image.is_empty());

        let fault = unit.get_diagnostics().unwrap_err();
        assert_eq!(fault.analyzer, "AF999");
    }

    #[test]
    fn cancellation_is_not_a_diagnostic_failure() {
        let unit = CompilationUnit::with_analyzers(StubCompilation::new(Vec::new()), Vec::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = unit.emit(&mut Vec::new(), None, &cancel).unwrap_err();
        assert!(matches!(err, CompilationError::Cancelled));
        assert!(err.diagnostics().is_empty());
    }

    #[test]
    fn diagnostics_are_recomputed_each_call() {
        let analyzer = Reporting::new("AF903", Severity::Info);
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(Vec::new()).with_native(warning("FS9003")),
            vec![analyzer.clone() as Arc<dyn DiagnosticAnalyzer>],
        );
        let first = unit.get_diagnostics().unwrap();
        let second = unit.get_diagnostics().unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].code(), "AF903");
        assert_eq!(first[1].code(), "FS9003");
        assert_eq!(analyzer.runs.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn missing_syntax_tree_skips_resolver() {
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(vec![run_method(Vec::new())]).without_trees(),
            Vec::new(),
        );
        let resolver = CountingResolver(AtomicUsize::new(0));
        let err = unit.get_entry_point_signature(&resolver).unwrap_err();
        assert!(matches!(err, CompilationError::NoSyntaxTree));
        assert_eq!(resolver.0.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn local_parameter_makes_signature_local() {
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(vec![run_method(vec![("x", local_type("Payload"))])]),
            Vec::new(),
        );
        let signature = unit
            .get_entry_point_signature(&FunctionEntryPointResolver::new())
            .unwrap();
        assert_eq!(signature.method_name(), "Run");
        assert_eq!(signature.parent_type_name(), "Submission#0");
        assert!(signature.has_local_type_references());
    }

    #[test]
    fn external_parameters_keep_signature_static() {
        let list_of_string = Arc::new(
            TypeSymbol::named(
                Some("System.Collections.Generic"),
                "List",
                TypeKind::Class,
                AssemblyIdentity::new("System.Runtime", 1),
            )
            .construct(vec![external_type("String")]),
        );
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(vec![run_method(vec![
                ("x", external_type("String")),
                ("items", list_of_string),
            ])]),
            Vec::new(),
        );
        let signature = unit
            .get_entry_point_signature(&FunctionEntryPointResolver::new())
            .unwrap();
        assert!(!signature.has_local_type_references());
        assert_eq!(signature.parameters().len(), 2);
    }

    #[test]
    fn array_parameters_are_not_local() {
        let local_list = Arc::new(
            TypeSymbol::named(
                Some("System.Collections.Generic"),
                "List",
                TypeKind::Class,
                AssemblyIdentity::new("System.Runtime", 1),
            )
            .construct(vec![local_type("Payload")]),
        );
        let unit = CompilationUnit::with_analyzers(
            StubCompilation::new(vec![run_method(vec![
                ("items", Arc::new(TypeSymbol::array(local_type("Payload")))),
                ("batches", Arc::new(TypeSymbol::array(local_list))),
            ])]),
            Vec::new(),
        );
        let signature = unit
            .get_entry_point_signature(&FunctionEntryPointResolver::new())
            .unwrap();
        assert!(!signature.has_local_type_references());
    }

    #[test]
    fn resolver_failures_surface() {
        let unit = CompilationUnit::with_analyzers(StubCompilation::new(Vec::new()), Vec::new());
        let err = unit
            .get_entry_point_signature(&FunctionEntryPointResolver::new())
            .unwrap_err();
        assert!(matches!(
            err,
            CompilationError::EntryPoint(EntryPointError::Missing)
        ));
    }

    #[test]
    fn units_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompilationUnit>();
    }
}
