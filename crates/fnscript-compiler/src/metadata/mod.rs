//! Metadata of referenced assemblies.
//!
//! An [`AssemblyMetadata`] lists the types an assembly exports. Shared
//! framework and host assemblies come with a built-in type catalog; assemblies
//! loaded from a file are opaque: their identity is known but their types are
//! not.

mod catalog;
mod resolver;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use fnscript_core::{AssemblyIdentity, TypeKind, TypeSymbol};
use rustc_hash::FxHashMap;
use xxhash_rust::xxh64::xxh64;

pub use catalog::{FUNCTIONS_HOST, NEWTONSOFT_JSON, SYSTEM_NET_HTTP, SYSTEM_RUNTIME, keyword_type};
pub use resolver::{DefaultMetadataResolver, MetadataResolver};
pub(crate) use resolver::is_file_reference;

/// A type exported by an assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub namespace: Arc<str>,
    pub name: Arc<str>,
    /// Number of generic parameters.
    pub arity: usize,
    pub kind: TypeKind,
}

impl TypeDefinition {
    pub fn new(namespace: &str, name: &str, arity: usize, kind: TypeKind) -> Self {
        Self {
            namespace: Arc::from(namespace),
            name: Arc::from(name),
            arity,
            kind,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }
}

/// Identity and exported types of a referenced assembly.
#[derive(Debug)]
pub struct AssemblyMetadata {
    identity: AssemblyIdentity,
    types: Vec<TypeDefinition>,
    /// (name, arity) -> indices into `types`
    index: FxHashMap<(Arc<str>, usize), Vec<usize>>,
    path: Option<PathBuf>,
    opaque: bool,
}

impl AssemblyMetadata {
    /// An assembly with a known type catalog. The mvid is derived from the name.
    pub fn new(name: &str, types: Vec<TypeDefinition>) -> Self {
        let mut index: FxHashMap<(Arc<str>, usize), Vec<usize>> = FxHashMap::default();
        for (i, def) in types.iter().enumerate() {
            index
                .entry((Arc::clone(&def.name), def.arity))
                .or_default()
                .push(i);
        }
        Self {
            identity: AssemblyIdentity::new(name, xxh64(name.as_bytes(), 0)),
            types,
            index,
            path: None,
            opaque: false,
        }
    }

    /// An assembly loaded from `path` whose types cannot be inspected.
    pub fn opaque(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let mvid = xxh64(path.to_string_lossy().as_bytes(), 0);
        Self {
            identity: AssemblyIdentity::new(name, mvid),
            types: Vec::new(),
            index: FxHashMap::default(),
            path: Some(path.to_path_buf()),
            opaque: true,
        }
    }

    pub fn identity(&self) -> &AssemblyIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn types(&self) -> &[TypeDefinition] {
        &self.types
    }

    /// File the assembly was loaded from, for file references.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether the exported types are unknown.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Types named `name` with `arity` generic parameters, in any namespace.
    pub fn find(&self, name: &str, arity: usize) -> impl Iterator<Item = &TypeDefinition> {
        self.index
            .get(&(Arc::from(name), arity))
            .into_iter()
            .flatten()
            .map(|&i| &self.types[i])
    }

    /// Whether a type named `name` exists with any arity.
    pub fn has_type_named(&self, name: &str) -> bool {
        self.types.iter().any(|def| &*def.name == name)
    }

    /// Whether any exported type lives in `namespace`.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.types.iter().any(|def| &*def.namespace == namespace)
    }

    /// A symbol for one of this assembly's types.
    pub fn symbol(&self, def: &TypeDefinition) -> TypeSymbol {
        TypeSymbol::named(
            Some(&*def.namespace),
            Arc::clone(&def.name),
            def.kind,
            self.identity.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_name_and_arity() {
        let assembly = AssemblyMetadata::new(
            "Sample",
            vec![
                TypeDefinition::new("Sample.Tasks", "Task", 0, TypeKind::Class),
                TypeDefinition::new("Sample.Tasks", "Task", 1, TypeKind::Class),
            ],
        );
        assert_eq!(assembly.find("Task", 1).count(), 1);
        assert_eq!(assembly.find("Task", 2).count(), 0);
        assert!(assembly.has_type_named("Task"));
        assert!(assembly.has_namespace("Sample.Tasks"));
        assert!(!assembly.has_namespace("Sample"));
    }

    #[test]
    fn symbol_belongs_to_assembly() {
        let assembly = AssemblyMetadata::new(
            "Sample",
            vec![TypeDefinition::new("Sample", "Widget", 0, TypeKind::Class)],
        );
        let def = assembly.find("Widget", 0).next().unwrap();
        let symbol = assembly.symbol(def);
        assert_eq!(symbol.full_name(), "Sample.Widget");
        assert_eq!(symbol.containing_assembly(), Some(assembly.identity()));
    }

    #[test]
    fn opaque_assembly_is_named_after_file() {
        let assembly = AssemblyMetadata::opaque(Path::new("/functions/bin/Shared.Models.dll"));
        assert_eq!(assembly.name(), "Shared.Models");
        assert!(assembly.is_opaque());
        assert!(assembly.types().is_empty());
    }

    #[test]
    fn identities_are_stable() {
        let a = AssemblyMetadata::new("Sample", Vec::new());
        let b = AssemblyMetadata::new("Sample", Vec::new());
        assert_eq!(a.identity(), b.identity());
    }
}
