//! Semantic symbols produced by a compilation.
//!
//! Symbols are immutable and shared through `Arc`, so a symbol handed out by
//! a compilation (for example a parameter type inside a function signature)
//! stays valid after the compilation itself is dropped.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

use crate::span::Location;

/// Identity of an assembly: the compiled unit itself or a referenced one.
///
/// Two identities are equal when both the name and the module version id
/// match. The compiled unit derives its `mvid` from its source texts, so two
/// compilations of different sources never share an identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    name: Arc<str>,
    mvid: u64,
}

impl AssemblyIdentity {
    pub fn new(name: impl Into<Arc<str>>, mvid: u64) -> Self {
        Self {
            name: name.into(),
            mvid,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Module version id.
    pub fn mvid(&self) -> u64 {
        self.mvid
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, mvid={:016x}", self.name, self.mvid)
    }
}

/// Kind of a type symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
    /// Single-dimensional array; the element type is the only type argument.
    Array,
    /// Type parameter of a generic method.
    TypeParameter,
    /// A type that failed to resolve.
    Error,
}

impl TypeKind {
    /// Whether values of this kind are copied rather than referenced.
    pub fn is_value_type(&self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::Enum)
    }
}

/// A type as seen by the compiler: a named type, a constructed generic type,
/// an array, a method type parameter, or an error type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeSymbol {
    namespace: Option<Arc<str>>,
    name: Arc<str>,
    kind: TypeKind,
    assembly: Option<AssemblyIdentity>,
    type_arguments: Vec<Arc<TypeSymbol>>,
}

impl TypeSymbol {
    /// A non-generic named type defined in `assembly`.
    pub fn named(
        namespace: Option<&str>,
        name: impl Into<Arc<str>>,
        kind: TypeKind,
        assembly: AssemblyIdentity,
    ) -> Self {
        Self {
            namespace: namespace.map(Arc::from),
            name: name.into(),
            kind,
            assembly: Some(assembly),
            type_arguments: Vec::new(),
        }
    }

    /// Construct this generic definition with the given type arguments.
    pub fn construct(&self, type_arguments: Vec<Arc<TypeSymbol>>) -> Self {
        Self {
            type_arguments,
            ..self.clone()
        }
    }

    /// An array of `element`. Arrays have no containing assembly.
    pub fn array(element: Arc<TypeSymbol>) -> Self {
        Self {
            namespace: None,
            name: Arc::from("Array"),
            kind: TypeKind::Array,
            assembly: None,
            type_arguments: vec![element],
        }
    }

    /// A method type parameter, owned by the assembly declaring the method.
    pub fn type_parameter(name: impl Into<Arc<str>>, assembly: AssemblyIdentity) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            kind: TypeKind::TypeParameter,
            assembly: Some(assembly),
            type_arguments: Vec::new(),
        }
    }

    /// A type that could not be resolved.
    pub fn error(name: impl Into<Arc<str>>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
            kind: TypeKind::Error,
            assembly: None,
            type_arguments: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Assembly that defines this type, if any.
    ///
    /// Arrays and error types have none.
    pub fn containing_assembly(&self) -> Option<&AssemblyIdentity> {
        self.assembly.as_ref()
    }

    pub fn type_arguments(&self) -> &[Arc<TypeSymbol>] {
        &self.type_arguments
    }

    /// Whether this is a named type constructed with type arguments.
    pub fn is_generic(&self) -> bool {
        self.kind != TypeKind::Array && !self.type_arguments.is_empty()
    }

    /// Element type of an array.
    pub fn element_type(&self) -> Option<&Arc<TypeSymbol>> {
        match self.kind {
            TypeKind::Array => self.type_arguments.first(),
            _ => None,
        }
    }

    /// Name including the namespace, without type arguments.
    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.to_string(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.namespace.as_deref() == Some("System") && &*self.name == "Void"
    }
}

/// Renders as source would spell it: `List<Payload>`, `Payload[]`.
impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(element) = self.element_type() {
            return write!(f, "{}[]", element);
        }
        f.write_str(&self.name)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// How an argument is passed to a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RefKind {
    #[default]
    None,
    Ref,
    Out,
    In,
    Params,
}

impl RefKind {
    /// Source keyword, empty for by-value parameters.
    pub fn keyword(&self) -> &'static str {
        match self {
            RefKind::None => "",
            RefKind::Ref => "ref",
            RefKind::Out => "out",
            RefKind::In => "in",
            RefKind::Params => "params",
        }
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterSymbol {
    name: Arc<str>,
    ty: Arc<TypeSymbol>,
    ref_kind: RefKind,
    has_default: bool,
}

impl ParameterSymbol {
    pub fn new(
        name: impl Into<Arc<str>>,
        ty: Arc<TypeSymbol>,
        ref_kind: RefKind,
        has_default: bool,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            ref_kind,
            has_default,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Arc<TypeSymbol> {
        &self.ty
    }

    pub fn ref_kind(&self) -> RefKind {
        self.ref_kind
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }
}

impl fmt::Display for ParameterSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ref_kind != RefKind::None {
            write!(f, "{} ", self.ref_kind.keyword())?;
        }
        write!(f, "{} {}", self.ty, self.name)
    }
}

bitflags! {
    /// Declaration modifiers of a member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const PROTECTED = 1 << 2;
        const INTERNAL = 1 << 3;
        const STATIC = 1 << 4;
        const ASYNC = 1 << 5;
    }
}

/// Declared accessibility of a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    Private,
}

impl Modifiers {
    /// Accessibility implied by these modifiers. Members without an explicit
    /// modifier are private.
    pub fn accessibility(&self) -> Accessibility {
        if self.contains(Modifiers::PUBLIC) {
            Accessibility::Public
        } else if self.contains(Modifiers::INTERNAL) {
            Accessibility::Internal
        } else if self.contains(Modifiers::PROTECTED) {
            Accessibility::Protected
        } else {
            Accessibility::Private
        }
    }
}

/// A method declared in the script class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSymbol {
    pub name: Arc<str>,
    pub containing_type: Arc<str>,
    pub containing_assembly: AssemblyIdentity,
    pub modifiers: Modifiers,
    pub return_type: Arc<TypeSymbol>,
    pub type_parameters: Vec<Arc<str>>,
    pub parameters: Vec<ParameterSymbol>,
    pub location: Location,
}

impl MethodSymbol {
    pub fn accessibility(&self) -> Accessibility {
        self.modifiers.accessibility()
    }

    pub fn is_public(&self) -> bool {
        self.accessibility() == Accessibility::Public
    }

    pub fn is_async(&self) -> bool {
        self.modifiers.contains(Modifiers::ASYNC)
    }
}

/// `Name(Type a, ref Type b)`.
impl fmt::Display for MethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}(", self.return_type, self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")
    }
}

/// A field or property declared in the script class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSymbol {
    pub name: Arc<str>,
    pub ty: Arc<TypeSymbol>,
    pub modifiers: Modifiers,
    pub location: Location,
}

/// A member of the script class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Method(Arc<MethodSymbol>),
    Field(Arc<FieldSymbol>),
    Property(Arc<FieldSymbol>),
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Method(m) => &m.name,
            Member::Field(f) | Member::Property(f) => &f.name,
        }
    }

    pub fn as_method(&self) -> Option<&Arc<MethodSymbol>> {
        match self {
            Member::Method(m) => Some(m),
            _ => None,
        }
    }
}

/// The implicit class that holds a script's top-level members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptClass {
    pub name: Arc<str>,
    pub assembly: AssemblyIdentity,
    pub members: Vec<Member>,
}

impl ScriptClass {
    /// Method members, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &Arc<MethodSymbol>> {
        self.members.iter().filter_map(Member::as_method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framework() -> AssemblyIdentity {
        AssemblyIdentity::new("System.Runtime", 1)
    }

    #[test]
    fn display_constructed_and_array_types() {
        let list = TypeSymbol::named(
            Some("System.Collections.Generic"),
            "List",
            TypeKind::Class,
            framework(),
        );
        let string = Arc::new(TypeSymbol::named(
            Some("System"),
            "String",
            TypeKind::Class,
            framework(),
        ));
        let constructed = list.construct(vec![Arc::clone(&string)]);
        assert_eq!(constructed.to_string(), "List<String>");
        assert_eq!(constructed.full_name(), "System.Collections.Generic.List");
        assert!(constructed.is_generic());

        let array = TypeSymbol::array(string);
        assert_eq!(array.to_string(), "String[]");
        assert!(!array.is_generic());
        assert!(array.containing_assembly().is_none());
        assert_eq!(array.element_type().map(|e| e.name()), Some("String"));
    }

    #[test]
    fn identities_compare_by_name_and_mvid() {
        assert_eq!(AssemblyIdentity::new("A", 1), AssemblyIdentity::new("A", 1));
        assert_ne!(AssemblyIdentity::new("A", 1), AssemblyIdentity::new("A", 2));
        assert_ne!(AssemblyIdentity::new("A", 1), AssemblyIdentity::new("B", 1));
    }

    #[test]
    fn accessibility_from_modifiers() {
        assert_eq!(
            (Modifiers::PUBLIC | Modifiers::STATIC).accessibility(),
            Accessibility::Public
        );
        assert_eq!(Modifiers::STATIC.accessibility(), Accessibility::Private);
        assert_eq!(Modifiers::INTERNAL.accessibility(), Accessibility::Internal);
    }

    #[test]
    fn parameter_display_includes_ref_kind() {
        let int = Arc::new(TypeSymbol::named(
            Some("System"),
            "Int32",
            TypeKind::Struct,
            framework(),
        ));
        let param = ParameterSymbol::new("count", int, RefKind::Out, false);
        assert_eq!(param.to_string(), "out Int32 count");
    }
}
