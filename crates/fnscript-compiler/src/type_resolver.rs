//! Type resolution from AST type expressions to semantic types.
//!
//! Lookup order for a name written in source:
//! 1. predefined keywords (`int`, `string`, ...) and type parameters in scope
//! 2. types declared in the script
//! 3. types of referenced assemblies in an imported namespace, or in the
//!    namespace named by the qualifier
//!
//! Failures are reported as diagnostics and produce an error type so that
//! binding can continue.

use std::sync::Arc;

use fnscript_core::{AssemblyIdentity, Diagnostic, Location, TypeKind, TypeSymbol, codes};
use fnscript_parser::{TypeExpr, TypeSuffix};
use rustc_hash::FxHashMap;

use crate::metadata::{AssemblyMetadata, SYSTEM_RUNTIME, TypeDefinition, keyword_type};

/// Result of looking up a named type.
enum Lookup {
    Found(TypeSymbol),
    NotFound,
    WrongArity { expected: usize },
    Ambiguous(Vec<String>),
}

/// Resolves type expressions against a compilation's declared and
/// referenced types.
pub struct TypeResolver<'a> {
    local_assembly: &'a AssemblyIdentity,
    /// (name, arity) -> declared type
    local_types: &'a FxHashMap<(String, usize), Arc<TypeSymbol>>,
    references: &'a [Arc<AssemblyMetadata>],
    imports: &'a [String],
    /// alias -> namespace or fully qualified type name
    aliases: &'a FxHashMap<String, String>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        local_assembly: &'a AssemblyIdentity,
        local_types: &'a FxHashMap<(String, usize), Arc<TypeSymbol>>,
        references: &'a [Arc<AssemblyMetadata>],
        imports: &'a [String],
        aliases: &'a FxHashMap<String, String>,
    ) -> Self {
        Self {
            local_assembly,
            local_types,
            references,
            imports,
            aliases,
        }
    }

    /// Resolve `ty`, reporting failures into `diagnostics`.
    ///
    /// `type_params` are the generic parameters in scope; they resolve to
    /// type-parameter symbols owned by the local assembly.
    pub fn resolve(
        &self,
        ty: &TypeExpr<'_>,
        type_params: &[Arc<str>],
        path: &Arc<str>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Arc<TypeSymbol> {
        if let Some((inner, suffix)) = ty.without_last_suffix() {
            let element = self.resolve(&inner, type_params, path, diagnostics);
            return match suffix {
                TypeSuffix::Array => Arc::new(TypeSymbol::array(element)),
                TypeSuffix::Nullable if element.kind().is_value_type() => nullable(element),
                TypeSuffix::Nullable => element,
            };
        }

        let args: Vec<Arc<TypeSymbol>> = ty
            .type_args
            .iter()
            .map(|arg| self.resolve(arg, type_params, path, diagnostics))
            .collect();

        let name = ty.name();
        if ty.path.len() == 1 && args.is_empty() {
            if let Some(framework_name) = keyword_type(name) {
                return framework_type(framework_name);
            }
            if let Some(param) = type_params.iter().find(|p| ***p == *name) {
                return Arc::new(TypeSymbol::type_parameter(
                    Arc::clone(param),
                    self.local_assembly.clone(),
                ));
            }
        }

        let location = Location::new(Arc::clone(path), ty.span);
        match self.lookup(ty, args.len()) {
            Lookup::Found(symbol) if args.is_empty() => Arc::new(symbol),
            Lookup::Found(symbol) => Arc::new(symbol.construct(args)),
            Lookup::NotFound => {
                diagnostics.push(Diagnostic::error(
                    codes::TYPE_NOT_FOUND,
                    format!(
                        "The type or namespace name '{name}' could not be found (are you missing a using directive or an assembly reference?)"
                    ),
                    location,
                ));
                Arc::new(TypeSymbol::error(name))
            }
            Lookup::WrongArity { expected } => {
                diagnostics.push(Diagnostic::error(
                    codes::WRONG_ARITY,
                    format!(
                        "Using the type '{name}' requires {expected} type argument(s), but {} were given",
                        args.len()
                    ),
                    location,
                ));
                Arc::new(TypeSymbol::error(name))
            }
            Lookup::Ambiguous(candidates) => {
                diagnostics.push(Diagnostic::error(
                    codes::AMBIGUOUS_TYPE,
                    format!(
                        "'{name}' is an ambiguous reference between {}",
                        candidates
                            .iter()
                            .map(|c| format!("'{c}'"))
                            .collect::<Vec<_>>()
                            .join(" and ")
                    ),
                    location,
                ));
                Arc::new(TypeSymbol::error(name))
            }
        }
    }

    fn lookup(&self, ty: &TypeExpr<'_>, arity: usize) -> Lookup {
        let name = ty.name();
        let qualifier = ty
            .qualifier()
            .map(|q| self.aliases.get(&q).cloned().unwrap_or(q));

        if qualifier.is_none() {
            // `using Json = Newtonsoft.Json.JsonConvert;`
            if let Some((namespace, target)) = self
                .aliases
                .get(name)
                .and_then(|full| full.rsplit_once('.'))
            {
                return self.lookup_in(target, arity, |ns| ns == namespace);
            }
            if let Some(local) = self.local_types.get(&(name.to_string(), arity)) {
                return Lookup::Found(local.as_ref().clone());
            }
        }

        let lookup = match &qualifier {
            Some(q) => self.lookup_in(name, arity, |ns| ns == q),
            None => self.lookup_in(name, arity, |ns| self.imports.iter().any(|i| i == ns)),
        };
        if !matches!(lookup, Lookup::NotFound) {
            return lookup;
        }

        if qualifier.is_none()
            && let Some(((_, expected), _)) = self
                .local_types
                .iter()
                .find(|((local, _), _)| local == name)
        {
            return Lookup::WrongArity {
                expected: *expected,
            };
        }

        // Types of assemblies loaded from files cannot be enumerated; a name
        // nothing else claims is attributed to the first such reference.
        match self.references.iter().find(|asm| asm.is_opaque()) {
            Some(opaque) => Lookup::Found(TypeSymbol::named(
                qualifier.as_deref(),
                name,
                TypeKind::Class,
                opaque.identity().clone(),
            )),
            None => Lookup::NotFound,
        }
    }

    /// Find `name` among referenced types whose namespace satisfies `visible`.
    fn lookup_in(&self, name: &str, arity: usize, visible: impl Fn(&str) -> bool) -> Lookup {
        let mut found: Vec<(&AssemblyMetadata, &TypeDefinition)> = Vec::new();
        for assembly in self.references {
            for def in assembly.find(name, arity) {
                if visible(&def.namespace[..]) {
                    found.push((assembly, def));
                }
            }
        }

        match found.as_slice() {
            [] => {
                let other_arity = self.references.iter().find_map(|assembly| {
                    assembly
                        .types()
                        .iter()
                        .find(|def| &*def.name == name && visible(&def.namespace[..]))
                        .map(|def| def.arity)
                });
                match other_arity {
                    Some(expected) => Lookup::WrongArity { expected },
                    None => Lookup::NotFound,
                }
            }
            [(assembly, def)] => Lookup::Found(assembly.symbol(def)),
            many => Lookup::Ambiguous(many.iter().map(|(_, def)| def.full_name()).collect()),
        }
    }
}

/// A framework type by its name in `System`.
pub(crate) fn framework_type(name: &str) -> Arc<TypeSymbol> {
    match SYSTEM_RUNTIME
        .find(name, 0)
        .find(|def| &*def.namespace == "System")
    {
        Some(def) => Arc::new(SYSTEM_RUNTIME.symbol(def)),
        None => Arc::new(TypeSymbol::error(name)),
    }
}

fn nullable(element: Arc<TypeSymbol>) -> Arc<TypeSymbol> {
    match SYSTEM_RUNTIME.find("Nullable", 1).next() {
        Some(def) => Arc::new(SYSTEM_RUNTIME.symbol(def).construct(vec![element])),
        None => element,
    }
}
