//! Resolution of `#r` references to assembly metadata.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::AssemblyMetadata;
use super::catalog::{FUNCTIONS_HOST, NEWTONSOFT_JSON, SYSTEM_NET_HTTP, SYSTEM_RUNTIME};

/// Namespaces imported into every script.
const DEFAULT_IMPORTS: &[&str] = &[
    "System",
    "System.Collections.Generic",
    "System.IO",
    "System.Linq",
    "System.Net.Http",
    "System.Threading",
    "System.Threading.Tasks",
    "Microsoft.Azure.WebJobs",
    "Microsoft.Extensions.Logging",
];

/// Supplies referenced assemblies to a compilation.
pub trait MetadataResolver: Send + Sync {
    /// Assemblies referenced by every compilation.
    fn default_references(&self) -> Vec<Arc<AssemblyMetadata>>;

    /// Namespaces imported by every compilation.
    fn default_imports(&self) -> Vec<String>;

    /// Resolve the text of a `#r` directive. `base_directory` is the directory
    /// of the script containing the directive, if known.
    fn resolve_reference(
        &self,
        reference: &str,
        base_directory: Option<&Path>,
    ) -> Option<Arc<AssemblyMetadata>>;
}

/// Whether a reference names an assembly file rather than a shared assembly.
pub(crate) fn is_file_reference(reference: &str) -> bool {
    reference.to_ascii_lowercase().ends_with(".dll")
}

/// Resolver over the built-in shared assemblies and the file system.
///
/// Shared assemblies are looked up by name, ignoring case. File references
/// (ending in `.dll`) are searched for in the script's directory and then in
/// each probing path; an existing file resolves to an opaque assembly.
#[derive(Debug, Clone)]
pub struct DefaultMetadataResolver {
    shared: FxHashMap<String, Arc<AssemblyMetadata>>,
    probing_paths: Vec<PathBuf>,
}

impl DefaultMetadataResolver {
    pub fn new() -> Self {
        let mut resolver = Self {
            shared: FxHashMap::default(),
            probing_paths: Vec::new(),
        };
        for assembly in [
            &*SYSTEM_RUNTIME,
            &*FUNCTIONS_HOST,
            &*SYSTEM_NET_HTTP,
            &*NEWTONSOFT_JSON,
        ] {
            resolver.register(Arc::clone(assembly));
        }
        resolver
    }

    /// Add directories searched for file references.
    pub fn with_probing_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.probing_paths.extend(paths);
        self
    }

    /// Make an assembly available to `#r` by name.
    pub fn register(&mut self, assembly: Arc<AssemblyMetadata>) {
        self.shared
            .insert(assembly.name().to_ascii_lowercase(), assembly);
    }

    pub fn probing_paths(&self) -> &[PathBuf] {
        &self.probing_paths
    }

    fn resolve_file(&self, reference: &str, base_directory: Option<&Path>) -> Option<PathBuf> {
        let reference = Path::new(reference);
        if reference.is_absolute() {
            return reference.is_file().then(|| reference.to_path_buf());
        }
        base_directory
            .into_iter()
            .chain(self.probing_paths.iter().map(PathBuf::as_path))
            .map(|dir| dir.join(reference))
            .find(|candidate| candidate.is_file())
    }
}

impl Default for DefaultMetadataResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataResolver for DefaultMetadataResolver {
    fn default_references(&self) -> Vec<Arc<AssemblyMetadata>> {
        vec![
            Arc::clone(&SYSTEM_RUNTIME),
            Arc::clone(&SYSTEM_NET_HTTP),
            Arc::clone(&FUNCTIONS_HOST),
        ]
    }

    fn default_imports(&self) -> Vec<String> {
        DEFAULT_IMPORTS.iter().map(|ns| ns.to_string()).collect()
    }

    fn resolve_reference(
        &self,
        reference: &str,
        base_directory: Option<&Path>,
    ) -> Option<Arc<AssemblyMetadata>> {
        if is_file_reference(reference) {
            let path = self.resolve_file(reference, base_directory)?;
            debug!(reference, path = %path.display(), "resolved file reference");
            return Some(Arc::new(AssemblyMetadata::opaque(&path)));
        }
        self.shared.get(&reference.to_ascii_lowercase()).cloned()
    }
}
