//! Built-in type catalogs of the shared framework and host assemblies.

use std::sync::Arc;

use fnscript_core::TypeKind;
use fnscript_core::TypeKind::{Class, Delegate, Enum, Interface, Struct};
use lazy_static::lazy_static;

use super::{AssemblyMetadata, TypeDefinition};

lazy_static! {
    /// Core framework assembly.
    pub static ref SYSTEM_RUNTIME: Arc<AssemblyMetadata> = Arc::new(AssemblyMetadata::new(
        "System.Runtime",
        system_runtime_types(),
    ));

    /// Host assembly exposing logging, triggers and bindings.
    pub static ref FUNCTIONS_HOST: Arc<AssemblyMetadata> = Arc::new(AssemblyMetadata::new(
        "Functions.Host",
        defs(&[
            ("Microsoft.Extensions.Logging", "ILogger", 0, Interface),
            ("Microsoft.Extensions.Logging", "LogLevel", 0, Enum),
            ("Microsoft.AspNetCore.Http", "HttpRequest", 0, Class),
            ("Microsoft.AspNetCore.Mvc", "IActionResult", 0, Interface),
            ("Microsoft.AspNetCore.Mvc", "OkObjectResult", 0, Class),
            ("Microsoft.Azure.WebJobs", "TimerInfo", 0, Class),
            ("Microsoft.Azure.WebJobs", "ExecutionContext", 0, Class),
            ("Microsoft.Azure.WebJobs", "IAsyncCollector", 1, Interface),
            ("Microsoft.Azure.WebJobs", "ICollector", 1, Interface),
            ("Microsoft.Azure.WebJobs", "IBinder", 0, Interface),
        ]),
    ));

    /// HTTP client library.
    pub static ref SYSTEM_NET_HTTP: Arc<AssemblyMetadata> = Arc::new(AssemblyMetadata::new(
        "System.Net.Http",
        defs(&[
            ("System.Net.Http", "HttpClient", 0, Class),
            ("System.Net.Http", "HttpRequestMessage", 0, Class),
            ("System.Net.Http", "HttpResponseMessage", 0, Class),
            ("System.Net.Http", "HttpMethod", 0, Class),
            ("System.Net.Http", "HttpContent", 0, Class),
            ("System.Net", "HttpStatusCode", 0, Enum),
        ]),
    ));

    /// JSON library shipped with the host.
    pub static ref NEWTONSOFT_JSON: Arc<AssemblyMetadata> = Arc::new(AssemblyMetadata::new(
        "Newtonsoft.Json",
        defs(&[
            ("Newtonsoft.Json", "JsonConvert", 0, Class),
            ("Newtonsoft.Json", "JsonSerializer", 0, Class),
            ("Newtonsoft.Json", "JsonPropertyAttribute", 0, Class),
            ("Newtonsoft.Json.Linq", "JObject", 0, Class),
            ("Newtonsoft.Json.Linq", "JArray", 0, Class),
            ("Newtonsoft.Json.Linq", "JToken", 0, Class),
        ]),
    ));
}

fn defs(entries: &[(&str, &str, usize, TypeKind)]) -> Vec<TypeDefinition> {
    entries
        .iter()
        .map(|&(namespace, name, arity, kind)| TypeDefinition::new(namespace, name, arity, kind))
        .collect()
}

fn system_runtime_types() -> Vec<TypeDefinition> {
    let mut types = defs(&[
        ("System", "Object", 0, Class),
        ("System", "String", 0, Class),
        ("System", "Boolean", 0, Struct),
        ("System", "Byte", 0, Struct),
        ("System", "SByte", 0, Struct),
        ("System", "Char", 0, Struct),
        ("System", "Int16", 0, Struct),
        ("System", "UInt16", 0, Struct),
        ("System", "Int32", 0, Struct),
        ("System", "UInt32", 0, Struct),
        ("System", "Int64", 0, Struct),
        ("System", "UInt64", 0, Struct),
        ("System", "Single", 0, Struct),
        ("System", "Double", 0, Struct),
        ("System", "Decimal", 0, Struct),
        ("System", "Void", 0, Struct),
        ("System", "DateTime", 0, Struct),
        ("System", "DateTimeOffset", 0, Struct),
        ("System", "TimeSpan", 0, Struct),
        ("System", "Guid", 0, Struct),
        ("System", "Uri", 0, Class),
        ("System", "Exception", 0, Class),
        ("System", "Console", 0, Class),
        ("System", "Math", 0, Class),
        ("System", "Environment", 0, Class),
        ("System", "IDisposable", 0, Interface),
        ("System", "IEquatable", 1, Interface),
        ("System", "Nullable", 1, Struct),
        ("System", "Lazy", 1, Class),
        ("System.Collections.Generic", "List", 1, Class),
        ("System.Collections.Generic", "IList", 1, Interface),
        ("System.Collections.Generic", "ICollection", 1, Interface),
        ("System.Collections.Generic", "IEnumerable", 1, Interface),
        ("System.Collections.Generic", "IReadOnlyList", 1, Interface),
        ("System.Collections.Generic", "HashSet", 1, Class),
        ("System.Collections.Generic", "Dictionary", 2, Class),
        ("System.Collections.Generic", "IDictionary", 2, Interface),
        ("System.Collections.Generic", "IReadOnlyDictionary", 2, Interface),
        ("System.Collections.Generic", "KeyValuePair", 2, Struct),
        ("System.Linq", "Enumerable", 0, Class),
        ("System.Threading", "CancellationToken", 0, Struct),
        ("System.Threading.Tasks", "Task", 0, Class),
        ("System.Threading.Tasks", "Task", 1, Class),
        ("System.Threading.Tasks", "ValueTask", 0, Struct),
        ("System.Threading.Tasks", "ValueTask", 1, Struct),
        ("System.IO", "Stream", 0, Class),
        ("System.IO", "TextReader", 0, Class),
        ("System.IO", "File", 0, Class),
        ("System.Text", "StringBuilder", 0, Class),
        ("System.Text", "Encoding", 0, Class),
    ]);

    // Func<TResult> .. Func<T1, T2, T3, TResult>, Action .. Action<T1, T2, T3>
    for arity in 1..=4 {
        types.push(TypeDefinition::new("System", "Func", arity, Delegate));
    }
    for arity in 0..=3 {
        types.push(TypeDefinition::new("System", "Action", arity, Delegate));
    }
    types
}

/// Map a predefined type keyword to its framework type name in `System`.
pub fn keyword_type(keyword: &str) -> Option<&'static str> {
    let name = match keyword {
        "object" | "dynamic" => "Object",
        "string" => "String",
        "bool" => "Boolean",
        "byte" => "Byte",
        "sbyte" => "SByte",
        "char" => "Char",
        "short" => "Int16",
        "ushort" => "UInt16",
        "int" => "Int32",
        "uint" => "UInt32",
        "long" => "Int64",
        "ulong" => "UInt64",
        "float" => "Single",
        "double" => "Double",
        "decimal" => "Decimal",
        "void" => "Void",
        _ => return None,
    };
    Some(name)
}
