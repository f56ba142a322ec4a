//! fnscript compiler
//!
//! Turns function scripts into emitted images and tells the host how to
//! invoke them.
//!
//! ## Architecture
//!
//! - **Binding**: parse every document, resolve references and lower the
//!   declarations into symbols of a [`ScriptCompilation`]
//! - **Analysis**: run the [`DiagnosticAnalyzer`]s over the compilation
//! - **Emission**: write the image and debug symbols when no error was found
//! - **Entry point**: select the invoked method and compute its
//!   [`FunctionSignature`]
//!
//! [`CompilationUnit`] ties these together for one compilation.
//!
//! ## Modules
//!
//! - [`analyzers`]: Built-in host rules and the analyzer seam
//! - [`compilation`]: The engine seam and the reference script engine
//! - [`emit`]: Image format and debug-symbol document
//! - [`locality`]: Whether a type only exists inside the compiled unit
//! - [`metadata`]: Referenced assemblies and their resolution
//! - [`resolver`]: Entry-point selection policy
//! - [`syntax`]: Source texts and syntax trees
//! - [`type_resolver`]: Type resolution from AST to semantic types
//! - [`unit`]: The compilation unit

pub mod analyzers;
mod binder;
pub mod compilation;
pub mod emit;
pub mod locality;
pub mod metadata;
pub mod resolver;
pub mod syntax;
pub mod type_resolver;
pub mod unit;

pub use analyzers::{
    AsyncVoidAnalyzer, CompilationWithAnalyzers, DiagnosticAnalyzer,
    InvalidFileMetadataReferenceAnalyzer, builtin_analyzers,
};
pub use compilation::{Compilation, ScriptCompilation, ScriptCompilationBuilder};
pub use emit::{EmitError, EmitResult, ImageError, ImageHeader, LoadedImage};
pub use locality::is_local_or_uses_local;
pub use metadata::{AssemblyMetadata, DefaultMetadataResolver, MetadataResolver, TypeDefinition};
pub use resolver::{EntryPointResolver, FunctionEntryPointResolver};
pub use syntax::{SourceReference, SourceText, SyntaxTree};
pub use type_resolver::TypeResolver;
pub use unit::CompilationUnit;

// Re-export the shared types hosts need alongside the compiler.
pub use fnscript_core::{
    CancellationToken, CompilationError, CompilationOptions, Diagnostic, FunctionSignature,
    MethodReference, Severity,
};
