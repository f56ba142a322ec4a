//! fnscript
//!
//! Runtime compilation of function scripts for a serverless host. The host
//! asks the [`CompilationServiceFactory`](factory::CompilationServiceFactory)
//! for a service per script type, gets a compilation unit for each function
//! and then:
//! - reads its diagnostics,
//! - emits the image and debug symbols into caller-supplied sinks,
//! - resolves the entry point into a [`FunctionSignature`](prelude::FunctionSignature).
//!
//! ## Modules
//!
//! - [`config`]: Host configuration loaded from TOML
//! - [`error`]: Service-level errors
//! - [`factory`]: Service selection per script type
//! - [`logging`]: `tracing` subscriber setup
//! - [`script_type`]: Supported script languages and file extensions
//! - [`service`]: Compilation services and the per-function build flow
//!
//! The compiler itself lives in `fnscript-compiler`, shared types in
//! `fnscript-core`.

pub mod config;
pub mod error;
pub mod factory;
pub mod logging;
pub mod script_type;
pub mod service;

pub use fnscript_compiler as compiler;
pub use fnscript_core as core;

pub mod prelude {
    pub use crate::config::{ConfigError, HostConfig};
    pub use crate::error::ServiceError;
    pub use crate::factory::{CompilationServiceFactory, DefaultCompilationServiceFactory};
    pub use crate::logging::{LogFormat, LogLevel, LogOptions, init_logging};
    pub use crate::script_type::ScriptType;
    pub use crate::service::{
        CompilationService, FunctionAssembly, FunctionMetadata, ScriptCompilationService,
    };
    pub use fnscript_compiler::{
        Compilation, CompilationUnit, DefaultMetadataResolver, DiagnosticAnalyzer,
        EntryPointResolver, FunctionEntryPointResolver, MetadataResolver, ScriptCompilation,
        SourceText,
    };
    pub use fnscript_core::{
        CancellationToken, CompilationError, CompilationOptions, Diagnostic, DiagnosticSliceExt,
        FunctionSignature, MethodReference, Severity,
    };
}
