//! Shared types for the fnscript compiler.
//!
//! This crate holds everything the parser, the compiler and the host layer
//! agree on:
//! - [`Span`] and [`Location`] for pointing into source
//! - [`Diagnostic`] and [`Severity`]
//! - the error hierarchy ([`ParseError`], [`CompilationError`], ...)
//! - semantic symbols ([`TypeSymbol`], [`MethodSymbol`], [`ScriptClass`])
//! - [`MethodReference`] and [`FunctionSignature`]
//! - [`CancellationToken`] and [`CompilationOptions`]

mod cancel;
pub mod diagnostic;
mod error;
mod options;
mod signature;
mod span;
pub mod symbols;

pub use cancel::CancellationToken;
pub use diagnostic::{Diagnostic, DiagnosticSliceExt, Severity, codes};
pub use error::{
    AnalyzerError, CompilationError, EntryPointError, LexError, ParseError, ParseErrorKind,
    ParseErrors,
};
pub use options::{CompilationOptions, OptimizationLevel};
pub use signature::{FunctionSignature, MethodReference};
pub use span::{Location, Span};
pub use symbols::{
    Accessibility, AssemblyIdentity, FieldSymbol, Member, MethodSymbol, Modifiers,
    ParameterSymbol, RefKind, ScriptClass, TypeKind, TypeSymbol,
};
