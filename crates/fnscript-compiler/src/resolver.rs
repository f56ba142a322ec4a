//! Entry-point selection.

use fnscript_core::{EntryPointError, MethodReference};
use tracing::trace;

/// Selects the method a host invokes from a script's candidate methods.
pub trait EntryPointResolver: Send + Sync {
    fn resolve<'a>(
        &self,
        candidates: &'a [MethodReference],
    ) -> Result<&'a MethodReference, EntryPointError>;
}

/// Default policy for function scripts.
///
/// With a configured entry-point name, the public method with exactly that
/// name is selected. Otherwise a lone public method wins, and failing that
/// the public method named `Run`, ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FunctionEntryPointResolver {
    entry_point_name: Option<String>,
}

impl FunctionEntryPointResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the method named `name` from the function's metadata.
    pub fn with_entry_point(name: impl Into<String>) -> Self {
        Self {
            entry_point_name: Some(name.into()),
        }
    }

    pub fn entry_point_name(&self) -> Option<&str> {
        self.entry_point_name.as_deref()
    }
}

const DEFAULT_ENTRY_POINT: &str = "Run";

impl EntryPointResolver for FunctionEntryPointResolver {
    fn resolve<'a>(
        &self,
        candidates: &'a [MethodReference],
    ) -> Result<&'a MethodReference, EntryPointError> {
        let public: Vec<&MethodReference> = candidates.iter().filter(|m| m.is_public()).collect();
        trace!(
            candidates = candidates.len(),
            public = public.len(),
            entry_point = self.entry_point_name.as_deref(),
            "resolving entry point"
        );

        if let Some(name) = &self.entry_point_name {
            return single_named(&public, name, |m| m.name() == name);
        }
        if let [only] = public.as_slice() {
            return Ok(*only);
        }
        single_named(&public, DEFAULT_ENTRY_POINT, |m| {
            m.name().eq_ignore_ascii_case(DEFAULT_ENTRY_POINT)
        })
    }
}

fn single_named<'a>(
    methods: &[&'a MethodReference],
    name: &str,
    matches: impl Fn(&MethodReference) -> bool,
) -> Result<&'a MethodReference, EntryPointError> {
    let mut named = methods.iter().copied().filter(|m| matches(*m));
    match (named.next(), named.next()) {
        (Some(method), None) => Ok(method),
        (Some(_), Some(_)) => Err(EntryPointError::Ambiguous {
            name: name.to_string(),
        }),
        (None, _) => Err(EntryPointError::Missing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fnscript_core::{
        AssemblyIdentity, Location, MethodSymbol, Modifiers, TypeKind, TypeSymbol, codes,
    };

    fn method(name: &str, is_public: bool) -> MethodReference {
        let assembly = AssemblyIdentity::new("Submission", 1);
        let modifiers = if is_public {
            Modifiers::PUBLIC | Modifiers::STATIC
        } else {
            Modifiers::STATIC
        };
        let symbol = MethodSymbol {
            name: Arc::from(name),
            containing_type: Arc::from("Submission#0"),
            containing_assembly: assembly.clone(),
            modifiers,
            return_type: Arc::new(TypeSymbol::named(
                Some("System"),
                "Void",
                TypeKind::Struct,
                assembly,
            )),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            location: Location::none(),
        };
        MethodReference::from_method(&Arc::new(symbol))
    }

    #[test]
    fn single_public_method_wins() {
        let candidates = [method("Helper", false), method("Process", true)];
        let chosen = FunctionEntryPointResolver::new().resolve(&candidates).unwrap();
        assert_eq!(chosen.name(), "Process");
    }

    #[test]
    fn run_is_preferred_ignoring_case() {
        let candidates = [method("Format", true), method("run", true)];
        let chosen = FunctionEntryPointResolver::new().resolve(&candidates).unwrap();
        assert_eq!(chosen.name(), "run");
    }

    #[test]
    fn several_run_methods_are_ambiguous() {
        let candidates = [method("Run", true), method("Run", true)];
        let err = FunctionEntryPointResolver::new()
            .resolve(&candidates)
            .unwrap_err();
        assert_eq!(
            err,
            EntryPointError::Ambiguous {
                name: "Run".to_string()
            }
        );
        assert_eq!(err.diagnostic().code(), codes::AMBIGUOUS_ENTRY_POINT);
    }

    #[test]
    fn no_candidate_is_missing() {
        let candidates = [method("Run", false), method("A", true), method("B", true)];
        let err = FunctionEntryPointResolver::new()
            .resolve(&candidates)
            .unwrap_err();
        assert_eq!(err, EntryPointError::Missing);
        assert_eq!(
            FunctionEntryPointResolver::new().resolve(&[]),
            Err(EntryPointError::Missing)
        );
    }

    #[test]
    fn configured_name_is_matched_exactly() {
        let candidates = [method("Run", true), method("Process", true)];
        let resolver = FunctionEntryPointResolver::with_entry_point("Process");
        assert_eq!(resolver.resolve(&candidates).unwrap().name(), "Process");

        let resolver = FunctionEntryPointResolver::with_entry_point("process");
        assert_eq!(resolver.resolve(&candidates), Err(EntryPointError::Missing));
    }

    #[test]
    fn configured_name_ignores_private_methods() {
        let candidates = [method("Process", false), method("Run", true)];
        let resolver = FunctionEntryPointResolver::with_entry_point("Process");
        assert_eq!(resolver.resolve(&candidates), Err(EntryPointError::Missing));
    }
}
