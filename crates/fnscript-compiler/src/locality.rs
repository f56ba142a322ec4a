//! Whether a type is only known inside a compiled unit.

use fnscript_core::{AssemblyIdentity, TypeSymbol};

/// True when `ty` belongs to `assembly`, or when it is a constructed generic
/// type and any of its type arguments is local, at any depth.
///
/// Arrays are not generic types and have no containing assembly, so
/// `Payload[]` is never local.
pub fn is_local_or_uses_local(ty: &TypeSymbol, assembly: &AssemblyIdentity) -> bool {
    if ty.containing_assembly() == Some(assembly) {
        return true;
    }
    if !ty.is_generic() {
        return false;
    }
    ty.type_arguments()
        .iter()
        .any(|arg| is_local_or_uses_local(arg, assembly))
}
