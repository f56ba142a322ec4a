//! Entry-point candidates and the resolved function signature.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::symbols::{MethodSymbol, ParameterSymbol};

/// A candidate entry point handed to an entry-point resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodReference {
    name: Arc<str>,
    is_public: bool,
    method: Arc<MethodSymbol>,
}

impl MethodReference {
    pub fn new(name: impl Into<Arc<str>>, is_public: bool, method: Arc<MethodSymbol>) -> Self {
        Self {
            name: name.into(),
            is_public,
            method,
        }
    }

    /// Project a method symbol into a reference.
    pub fn from_method(method: &Arc<MethodSymbol>) -> Self {
        Self::new(Arc::clone(&method.name), method.is_public(), Arc::clone(method))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_public(&self) -> bool {
        self.is_public
    }

    /// The underlying method symbol.
    pub fn method(&self) -> &Arc<MethodSymbol> {
        &self.method
    }
}

/// Invocation shape of a resolved entry point.
///
/// When `has_local_type_references` is set, at least one parameter type is
/// only known inside the compiled unit, so the host cannot bind the call
/// statically and has to dispatch it late.
///
/// Equality ignores symbol identity: two signatures are equal when the
/// containing type, method name, locality flag and the parameters' names,
/// rendered types and passing modes match. Hosts use this to detect whether
/// a recompiled function changed shape.
#[derive(Debug, Clone)]
pub struct FunctionSignature {
    parent_type_name: String,
    method_name: String,
    parameters: Vec<ParameterSymbol>,
    has_local_type_references: bool,
}

impl FunctionSignature {
    pub fn new(
        parent_type_name: impl Into<String>,
        method_name: impl Into<String>,
        parameters: Vec<ParameterSymbol>,
        has_local_type_references: bool,
    ) -> Self {
        Self {
            parent_type_name: parent_type_name.into(),
            method_name: method_name.into(),
            parameters,
            has_local_type_references,
        }
    }

    pub fn parent_type_name(&self) -> &str {
        &self.parent_type_name
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameters(&self) -> &[ParameterSymbol] {
        &self.parameters
    }

    pub fn has_local_type_references(&self) -> bool {
        self.has_local_type_references
    }

    fn parameter_key(param: &ParameterSymbol) -> (&str, String, crate::symbols::RefKind) {
        (param.name(), param.ty().to_string(), param.ref_kind())
    }
}

impl PartialEq for FunctionSignature {
    fn eq(&self, other: &Self) -> bool {
        self.parent_type_name == other.parent_type_name
            && self.method_name == other.method_name
            && self.has_local_type_references == other.has_local_type_references
            && self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| Self::parameter_key(a) == Self::parameter_key(b))
    }
}

impl Eq for FunctionSignature {}

impl Hash for FunctionSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parent_type_name.hash(state);
        self.method_name.hash(state);
        self.has_local_type_references.hash(state);
        for param in &self.parameters {
            Self::parameter_key(param).hash(state);
        }
    }
}

impl fmt::Display for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.parent_type_name, self.method_name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}
