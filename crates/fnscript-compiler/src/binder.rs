//! Lowering of parsed scripts into the symbols of a compilation.
//!
//! Binding runs once, when a compilation is created. Every document is
//! parsed leniently, references are resolved, declared types are entered
//! and top-level members become members of the script class. Problems are
//! collected as native diagnostics; binding itself never fails.

use std::sync::Arc;

use bumpalo::Bump;
use fnscript_core::{
    AssemblyIdentity, CompilationOptions, Diagnostic, FieldSymbol, Location, Member, MethodSymbol,
    ParameterSymbol, ScriptClass, TypeKind, TypeSymbol, codes,
};
use fnscript_parser::{Body, FieldDecl, Item, MethodDecl, Parser, PropertyDecl, Script, TypeDeclKind};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;
use xxhash_rust::xxh64::Xxh64;

use crate::metadata::{AssemblyMetadata, MetadataResolver};
use crate::syntax::{SourceText, SyntaxTree};
use crate::type_resolver::{TypeResolver, framework_type};

/// An opaque body recorded for emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundBody {
    /// Index of the owning method in the script class members; `None` for a
    /// top-level statement.
    pub member: Option<usize>,
    /// Index of the syntax tree the body comes from.
    pub document: usize,
    pub body: Body,
}

/// Everything binding produced for one compilation.
#[derive(Debug, Clone)]
pub(crate) struct BoundCompilation {
    pub assembly: AssemblyIdentity,
    pub syntax_trees: Vec<SyntaxTree>,
    pub references: Vec<Arc<AssemblyMetadata>>,
    pub imports: Vec<String>,
    pub local_types: Vec<Arc<TypeSymbol>>,
    pub script_class: ScriptClass,
    pub bodies: Vec<BoundBody>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Bind `sources` into a compilation.
#[cfg_attr(feature = "profiling", profiling::function)]
pub(crate) fn bind(
    options: &CompilationOptions,
    sources: &[SourceText],
    resolver: &dyn MetadataResolver,
) -> BoundCompilation {
    let assembly = AssemblyIdentity::new(options.assembly_name.as_str(), compute_mvid(sources));
    let mut diagnostics = Vec::new();

    // Scripts borrow their arenas; both live until lowering is done.
    let arenas: Vec<Bump> = sources.iter().map(|_| Bump::new()).collect();
    let scripts: Vec<Script<'_>> = sources
        .iter()
        .zip(&arenas)
        .map(|(source, arena)| {
            let (script, errors) = Parser::parse_lenient(source.text(), arena);
            let path: Arc<str> = Arc::from(source.path());
            diagnostics.extend(errors.iter().map(|error| error.to_diagnostic(&path)));
            script
        })
        .collect();

    let syntax_trees: Vec<SyntaxTree> = sources
        .iter()
        .zip(&scripts)
        .map(|(source, script)| SyntaxTree::from_script(source, script))
        .collect();

    let mut binder = Binder {
        options,
        resolver,
        assembly: assembly.clone(),
        diagnostics,
    };
    let references = binder.bind_references(&syntax_trees);
    let (imports, aliases) = binder.bind_usings(&scripts);
    let (local_types, type_index) = binder.declare_types(&syntax_trees, &scripts);

    let types = TypeResolver::new(
        &assembly,
        &type_index,
        &references,
        &imports,
        &aliases,
    );
    binder.bind_type_bases(&types, &syntax_trees, &scripts);
    let (script_class, bodies) = binder.bind_members(&types, &syntax_trees, &scripts);

    debug!(
        assembly = %assembly,
        documents = syntax_trees.len(),
        members = script_class.members.len(),
        diagnostics = binder.diagnostics.len(),
        "bound compilation"
    );

    BoundCompilation {
        assembly,
        syntax_trees,
        references,
        imports,
        local_types,
        script_class,
        bodies,
        diagnostics: binder.diagnostics,
    }
}

/// xxh64 over every document's path and text.
fn compute_mvid(sources: &[SourceText]) -> u64 {
    let mut hasher = Xxh64::new(0);
    for source in sources {
        hasher.update(source.path().as_bytes());
        hasher.update(&[0]);
        hasher.update(source.text().as_bytes());
        hasher.update(&[0]);
    }
    hasher.digest()
}

struct Binder<'a> {
    options: &'a CompilationOptions,
    resolver: &'a dyn MetadataResolver,
    assembly: AssemblyIdentity,
    diagnostics: Vec<Diagnostic>,
}

impl Binder<'_> {
    /// Default references followed by the resolved `#r` references, without
    /// duplicates.
    fn bind_references(&mut self, trees: &[SyntaxTree]) -> Vec<Arc<AssemblyMetadata>> {
        let mut references = self.resolver.default_references();
        for tree in trees {
            for directive in tree.references() {
                match self
                    .resolver
                    .resolve_reference(&directive.reference, tree.directory())
                {
                    Some(assembly) => {
                        if !references
                            .iter()
                            .any(|known| known.identity() == assembly.identity())
                        {
                            references.push(assembly);
                        }
                    }
                    None => self.diagnostics.push(Diagnostic::error(
                        codes::METADATA_FILE_NOT_FOUND,
                        format!("Metadata file '{}' could not be found", directive.reference),
                        directive.location.clone(),
                    )),
                }
            }
        }
        references
    }

    /// Imported namespaces and `using X = Y;` aliases.
    fn bind_usings(&self, scripts: &[Script<'_>]) -> (Vec<String>, FxHashMap<String, String>) {
        let mut imports = self.resolver.default_imports();
        let mut aliases = FxHashMap::default();
        for using in scripts.iter().flat_map(|script| script.usings()) {
            let target = using.target();
            match using.alias {
                Some(alias) => {
                    aliases.insert(alias.name.to_string(), target);
                }
                None if using.is_static => {}
                None => {
                    if !imports.contains(&target) {
                        imports.push(target);
                    }
                }
            }
        }
        (imports, aliases)
    }

    /// Enter every declared type, keyed by name and arity.
    fn declare_types(
        &mut self,
        trees: &[SyntaxTree],
        scripts: &[Script<'_>],
    ) -> (Vec<Arc<TypeSymbol>>, FxHashMap<(String, usize), Arc<TypeSymbol>>) {
        let mut declared = Vec::new();
        let mut index = FxHashMap::default();
        for (tree, script) in trees.iter().zip(scripts) {
            for item in script.items() {
                let Item::Type(decl) = item else { continue };
                let key = (decl.name.name.to_string(), decl.type_params.len());
                if index.contains_key(&key) {
                    self.diagnostics.push(Diagnostic::error(
                        codes::DUPLICATE_TYPE,
                        format!(
                            "The script already contains a definition for '{}'",
                            decl.name.name
                        ),
                        Location::new(Arc::clone(tree.path_arc()), decl.name.span),
                    ));
                    continue;
                }
                let kind = match decl.kind {
                    TypeDeclKind::Class | TypeDeclKind::Record => TypeKind::Class,
                    TypeDeclKind::Struct => TypeKind::Struct,
                    TypeDeclKind::Interface => TypeKind::Interface,
                    TypeDeclKind::Enum => TypeKind::Enum,
                };
                let symbol = Arc::new(TypeSymbol::named(
                    None,
                    decl.name.name,
                    kind,
                    self.assembly.clone(),
                ));
                declared.push(Arc::clone(&symbol));
                index.insert(key, symbol);
            }
        }
        (declared, index)
    }

    /// Resolve base types so unknown bases are reported.
    fn bind_type_bases(
        &mut self,
        types: &TypeResolver<'_>,
        trees: &[SyntaxTree],
        scripts: &[Script<'_>],
    ) {
        for (tree, script) in trees.iter().zip(scripts) {
            for item in script.items() {
                let Item::Type(decl) = item else { continue };
                let type_params = type_param_names(decl.type_params.iter().map(|p| p.name));
                for base in decl.bases {
                    types.resolve(base, &type_params, tree.path_arc(), &mut self.diagnostics);
                }
            }
        }
    }

    /// Lower top-level members into the script class.
    fn bind_members(
        &mut self,
        types: &TypeResolver<'_>,
        trees: &[SyntaxTree],
        scripts: &[Script<'_>],
    ) -> (ScriptClass, Vec<BoundBody>) {
        let class_name: Arc<str> = Arc::from(self.options.script_class_name.as_str());
        let mut members = MemberTable::default();
        let mut bodies = Vec::new();

        for (document, (tree, script)) in trees.iter().zip(scripts).enumerate() {
            let path = tree.path_arc();
            for item in script.items() {
                match item {
                    Item::Method(decl) => {
                        let method = self.bind_method(types, decl, &class_name, path);
                        match members.add_method(method) {
                            Ok(index) => bodies.push(BoundBody {
                                member: Some(index),
                                document,
                                body: decl.body,
                            }),
                            Err(method) => self.diagnostics.push(Diagnostic::error(
                                codes::DUPLICATE_MEMBER,
                                format!(
                                    "Type '{class_name}' already defines a member called '{}' with the same parameter types",
                                    method.name
                                ),
                                method.location.clone(),
                            )),
                        }
                    }
                    Item::Field(decl) => {
                        for field in self.bind_field(types, decl, path) {
                            self.add_data_member(&mut members, Member::Field(field), &class_name);
                        }
                    }
                    Item::Property(decl) => {
                        let property = self.bind_property(types, decl, path);
                        self.add_data_member(&mut members, Member::Property(property), &class_name);
                    }
                    Item::Statement(body) => bodies.push(BoundBody {
                        member: None,
                        document,
                        body: *body,
                    }),
                    Item::Reference(_) | Item::Using(_) | Item::Type(_) => {}
                }
            }
        }

        let class = ScriptClass {
            name: class_name,
            assembly: self.assembly.clone(),
            members: members.into_members(),
        };
        (class, bodies)
    }

    fn bind_method(
        &mut self,
        types: &TypeResolver<'_>,
        decl: &MethodDecl<'_>,
        class_name: &Arc<str>,
        path: &Arc<str>,
    ) -> MethodSymbol {
        let type_params = type_param_names(decl.type_params.iter().map(|p| p.name));
        let return_type = types.resolve(&decl.return_type, &type_params, path, &mut self.diagnostics);
        let parameters = decl
            .params
            .iter()
            .map(|param| {
                let ty = types.resolve(&param.ty, &type_params, path, &mut self.diagnostics);
                ParameterSymbol::new(param.name.name, ty, param.ref_kind, param.has_default)
            })
            .collect();
        MethodSymbol {
            name: Arc::from(decl.name.name),
            containing_type: Arc::clone(class_name),
            containing_assembly: self.assembly.clone(),
            modifiers: decl.modifiers,
            return_type,
            type_parameters: type_params,
            parameters,
            location: Location::new(Arc::clone(path), decl.name.span),
        }
    }

    fn bind_field(
        &mut self,
        types: &TypeResolver<'_>,
        decl: &FieldDecl<'_>,
        path: &Arc<str>,
    ) -> Vec<Arc<FieldSymbol>> {
        // `var` fields are only meaningful with an initializer we do not bind.
        let ty = if decl.ty.is_simple() && decl.ty.name() == "var" {
            framework_type("Object")
        } else {
            types.resolve(&decl.ty, &[], path, &mut self.diagnostics)
        };
        decl.names
            .iter()
            .map(|name| {
                Arc::new(FieldSymbol {
                    name: Arc::from(name.name),
                    ty: Arc::clone(&ty),
                    modifiers: decl.modifiers,
                    location: Location::new(Arc::clone(path), name.span),
                })
            })
            .collect()
    }

    fn bind_property(
        &mut self,
        types: &TypeResolver<'_>,
        decl: &PropertyDecl<'_>,
        path: &Arc<str>,
    ) -> Arc<FieldSymbol> {
        Arc::new(FieldSymbol {
            name: Arc::from(decl.name.name),
            ty: types.resolve(&decl.ty, &[], path, &mut self.diagnostics),
            modifiers: decl.modifiers,
            location: Location::new(Arc::clone(path), decl.name.span),
        })
    }

    fn add_data_member(&mut self, members: &mut MemberTable, member: Member, class_name: &str) {
        if let Err(member) = members.add_data(member) {
            let location = match &member {
                Member::Field(f) | Member::Property(f) => f.location.clone(),
                Member::Method(m) => m.location.clone(),
            };
            self.diagnostics.push(Diagnostic::error(
                codes::DUPLICATE_MEMBER,
                format!(
                    "The type '{class_name}' already contains a definition for '{}'",
                    member.name()
                ),
                location,
            ));
        }
    }
}

fn type_param_names<'s>(names: impl Iterator<Item = &'s str>) -> Vec<Arc<str>> {
    names.map(Arc::from).collect()
}

/// Members of the script class with the lookups needed to detect
/// duplicates. Methods may overload each other; fields and properties may
/// not share a name with any member.
#[derive(Default)]
struct MemberTable {
    members: Vec<Member>,
    method_names: FxHashSet<Arc<str>>,
    method_signatures: FxHashSet<String>,
    data_names: FxHashSet<Arc<str>>,
}

impl MemberTable {
    /// Add a method, returning its member index, or the method back if it
    /// clashes with an existing member.
    fn add_method(&mut self, method: MethodSymbol) -> Result<usize, MethodSymbol> {
        let key = overload_key(&method);
        if self.data_names.contains(&method.name) || self.method_signatures.contains(&key) {
            return Err(method);
        }
        self.method_signatures.insert(key);
        self.method_names.insert(Arc::clone(&method.name));
        self.members.push(Member::Method(Arc::new(method)));
        Ok(self.members.len() - 1)
    }

    fn add_data(&mut self, member: Member) -> Result<(), Member> {
        let name: Arc<str> = Arc::from(member.name());
        if self.data_names.contains(&name) || self.method_names.contains(&name) {
            return Err(member);
        }
        self.data_names.insert(name);
        self.members.push(member);
        Ok(())
    }

    fn into_members(self) -> Vec<Member> {
        self.members
    }
}

/// Name, generic arity and parameter types with passing modes.
fn overload_key(method: &MethodSymbol) -> String {
    let params = method
        .parameters
        .iter()
        .map(|p| format!("{}{}", p.ref_kind().keyword(), p.ty()))
        .collect::<Vec<_>>()
        .join(",");
    format!("{}`{}({})", method.name, method.type_parameters.len(), params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnscript_core::{DiagnosticSliceExt, RefKind};

    use crate::metadata::DefaultMetadataResolver;

    fn bind_sources(sources: &[(&str, &str)]) -> BoundCompilation {
        let sources: Vec<SourceText> = sources
            .iter()
            .map(|(path, text)| SourceText::new(*path, *text))
            .collect();
        bind(
            &CompilationOptions::default(),
            &sources,
            &DefaultMetadataResolver::new(),
        )
    }

    fn bind_one(text: &str) -> BoundCompilation {
        bind_sources(&[("run.csx", text)])
    }

    fn codes_of(bound: &BoundCompilation) -> Vec<&str> {
        bound.diagnostics.iter().map(|d| d.code()).collect()
    }

    #[test]
    fn methods_become_script_class_members() {
        let bound = bind_one(
            r#"
            using Microsoft.Extensions.Logging;

            public class Payload { public string Name { get; set; } }

            public static void Run(Payload payload, ILogger log)
            {
                log.LogInformation(payload.Name);
            }
            "#,
        );
        assert!(bound.diagnostics.is_empty(), "{:?}", bound.diagnostics);
        assert_eq!(&*bound.script_class.name, "Submission#0");

        let run = bound.script_class.methods().next().unwrap();
        assert_eq!(&*run.name, "Run");
        assert!(run.is_public());
        assert_eq!(run.parameters.len(), 2);
        assert_eq!(
            run.parameters[0].ty().containing_assembly(),
            Some(&bound.assembly)
        );
        assert_eq!(bound.local_types.len(), 1);
        assert_eq!(bound.bodies.len(), 1);
        assert_eq!(bound.bodies[0].member, Some(0));
    }

    #[test]
    fn parameters_keep_passing_mode() {
        let bound = bind_one("public static void Run(string input, out string output) { output = input; }");
        let run = bound.script_class.methods().next().unwrap();
        assert_eq!(run.parameters[1].ref_kind(), RefKind::Out);
        assert_eq!(run.to_string(), "Void Run(String input, out String output)");
    }

    #[test]
    fn parse_errors_become_diagnostics() {
        let bound = bind_one("public static void Run(string input { }");
        assert!(bound.diagnostics.has_errors());
        assert!(bound.diagnostics[0].location().is_in_source());
    }

    #[test]
    fn unknown_types_are_reported() {
        let bound = bind_one("public static void Run(Widget widget) { }");
        assert_eq!(codes_of(&bound), [codes::TYPE_NOT_FOUND]);
        assert_eq!(
            bound.diagnostics[0].location().path(),
            Some("run.csx")
        );
    }

    #[test]
    fn missing_shared_reference_is_reported() {
        let bound = bind_one("#r \"Contoso.Unknown\"\npublic static void Run() { }");
        assert_eq!(codes_of(&bound), [codes::METADATA_FILE_NOT_FOUND]);
        assert!(bound.diagnostics[0].message().contains("Contoso.Unknown"));
    }

    #[test]
    fn shared_reference_makes_types_visible() {
        let bound = bind_one(
            "#r \"Newtonsoft.Json\"\nusing Newtonsoft.Json.Linq;\npublic static JObject Run(JObject body) => body;",
        );
        assert!(bound.diagnostics.is_empty(), "{:?}", bound.diagnostics);
        assert!(bound.references.iter().any(|r| r.name() == "Newtonsoft.Json"));
    }

    #[test]
    fn duplicate_types_and_members_are_reported() {
        let bound = bind_one(
            r#"
            class Payload { }
            class Payload { }
            static int count;
            static string count;
            public static void Run(string a) { }
            public static void Run(string b) { }
            public static void Run(int a) { }
            "#,
        );
        assert_eq!(
            codes_of(&bound),
            [codes::DUPLICATE_TYPE, codes::DUPLICATE_MEMBER, codes::DUPLICATE_MEMBER]
        );
        assert_eq!(bound.script_class.methods().count(), 2);
    }

    #[test]
    fn var_fields_and_statements() {
        let bound = bind_one(
            r#"
            static var client = new HttpClient();
            client.Timeout = TimeSpan.FromSeconds(5);
            public static void Run() { }
            "#,
        );
        assert!(bound.diagnostics.is_empty(), "{:?}", bound.diagnostics);
        let Member::Field(field) = &bound.script_class.members[0] else {
            panic!("expected field");
        };
        assert_eq!(field.ty.full_name(), "System.Object");
        assert_eq!(bound.bodies.iter().filter(|b| b.member.is_none()).count(), 1);
    }

    #[test]
    fn aliases_and_static_usings() {
        let bound = bind_one(
            r#"
            #r "Newtonsoft.Json"
            using Json = Newtonsoft.Json.JsonConvert;
            using static System.Math;
            public static Json Run() => null;
            "#,
        );
        assert!(bound.diagnostics.is_empty(), "{:?}", bound.diagnostics);
        assert!(!bound.imports.iter().any(|i| i == "System.Math"));
    }

    #[test]
    fn mvid_depends_on_sources() {
        let a = bind_one("public static void Run() { }");
        let b = bind_one("public static void Run() { }");
        let c = bind_one("public static void Run(string s) { }");
        assert_eq!(a.assembly, b.assembly);
        assert_ne!(a.assembly.mvid(), c.assembly.mvid());
    }

    #[test]
    fn multiple_documents_share_one_class() {
        let bound = bind_sources(&[
            ("models.csx", "public class Order { }"),
            ("run.csx", "public static void Run(Order order) { }"),
        ]);
        assert!(bound.diagnostics.is_empty(), "{:?}", bound.diagnostics);
        assert_eq!(bound.syntax_trees.len(), 2);
        assert_eq!(bound.bodies[0].document, 1);
    }
}
