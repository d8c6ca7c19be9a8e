//! Helper functions callable from template bodies.
//!
//! Every helper is a pure function over [`tera::Value`] (a `serde_json::Value`)
//! and reports misuse through [`HelperError`] instead of panicking. The
//! [`HelperLibrary`] is the fixed, read-only name table that binds them into a
//! namespace:
//!
//! - filters: `title`, `untitle`, `toupper`, `tolower`, `basename`, `type`,
//!   `dump`, `string`, `replace`, `replacen`, `CamelCase`
//! - functions: `append(seqs=[...])`, `dict(pairs=[...])`
//!
//! Tera functions only take named arguments, so the two variadic helpers read
//! their ordered argument list from a single array argument.

use std::collections::HashMap;

use tera::{Map, Tera, Value};
use thiserror::Error;

type FilterFn = fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>;
type FunctionFn = fn(&HashMap<String, Value>) -> tera::Result<Value>;

/// Segment overrides applied by `CamelCase` after title-casing.
const ACRONYMS: &[(&str, &str)] = &[("Id", "ID"), ("Html", "HTML"), ("Http", "HTTP")];

const FILTERS: &[(&str, FilterFn)] = &[
    ("title", title_filter),
    ("untitle", untitle_filter),
    ("toupper", toupper_filter),
    ("tolower", tolower_filter),
    ("basename", basename_filter),
    ("type", type_filter),
    ("dump", dump_filter),
    ("string", string_filter),
    ("replace", replace_filter),
    ("replacen", replacen_filter),
    ("CamelCase", camel_case_filter),
];

const FUNCTIONS: &[(&str, FunctionFn)] = &[("append", append_function), ("dict", dict_function)];

/// Misuse of a helper. Aborts the render it happens in.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HelperError {
    #[error("{helper}: missing argument `{name}`")]
    MissingArgument {
        helper: &'static str,
        name: &'static str,
    },

    #[error("{helper}: argument {position} is {found}, expected {expected}")]
    TypeMismatch {
        helper: &'static str,
        position: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{helper}: odd number of arguments ({count})")]
    OddArguments { helper: &'static str, count: usize },
}

impl From<HelperError> for tera::Error {
    fn from(err: HelperError) -> Self {
        tera::Error::msg(err)
    }
}

/// Immutable table of helper names bound into every template namespace.
#[derive(Debug, Clone, Copy)]
pub struct HelperLibrary {
    filters: &'static [(&'static str, FilterFn)],
    functions: &'static [(&'static str, FunctionFn)],
}

impl HelperLibrary {
    /// The built-in helper set.
    pub const fn standard() -> Self {
        Self {
            filters: FILTERS,
            functions: FUNCTIONS,
        }
    }

    /// Names of every helper, filters first.
    #[cfg(test)]
    pub(crate) fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters
            .iter()
            .map(|(name, _)| *name)
            .chain(self.functions.iter().map(|(name, _)| *name))
    }

    /// Register every helper with a template engine instance.
    pub fn install(&self, tera: &mut Tera) {
        for (name, filter) in self.filters {
            tera.register_filter(name, *filter);
        }
        for (name, function) in self.functions {
            tera.register_function(name, *function);
        }
    }
}

impl Default for HelperLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

/// Human-readable type name of a template value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "map",
    }
}

/// Upper-cases the first letter of every word, leaving the rest untouched.
pub fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = is_word_separator(c);
    }
    out
}

fn is_word_separator(c: char) -> bool {
    if c.is_ascii() {
        !(c.is_ascii_alphanumeric() || c == '_')
    } else {
        c.is_whitespace()
    }
}

/// Lower-cases exactly the first character. Empty input yields empty output.
pub fn untitle(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().chain(chars).collect(),
    }
}

/// `user_id` -> `UserID`, `http_status` -> `HTTPStatus`.
pub fn camel_case(s: &str) -> String {
    s.split('_')
        .map(|segment| {
            let titled = title(segment);
            match ACRONYMS.iter().find(|(word, _)| *word == titled) {
                Some((_, acronym)) => (*acronym).to_string(),
                None => titled,
            }
        })
        .collect()
}

/// Last element of a slash-delimited path.
pub fn basename(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    match trimmed.rfind('/') {
        Some(idx) => trimmed[idx + 1..].to_string(),
        None => trimmed.to_string(),
    }
}

/// Type name followed by the value, for debugging templates.
pub fn dump(value: &Value) -> String {
    format!("{} {}", type_name(value), value)
}

/// Default textual form: strings verbatim, nil empty, anything else as JSON.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Replaces the first `n` occurrences of `old`; negative `n` replaces all.
pub fn replacen(s: &str, old: &str, new: &str, n: i64) -> String {
    match usize::try_from(n) {
        Ok(count) => s.replacen(old, new, count),
        Err(_) => s.replace(old, new),
    }
}

/// Concatenates arrays left to right.
///
/// No arguments gives nil, a single argument is returned as is.
pub fn append(values: &[Value]) -> Result<Value, HelperError> {
    let Some((first, rest)) = values.split_first() else {
        return Ok(Value::Null);
    };
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let mut acc = expect_array("append", 0, first)?.clone();
    for (offset, value) in rest.iter().enumerate() {
        acc.extend(expect_array("append", offset + 1, value)?.iter().cloned());
    }
    Ok(Value::Array(acc))
}

/// Builds a map from alternating keys and values.
///
/// No arguments gives nil. Later duplicate keys overwrite earlier ones.
pub fn dict(values: &[Value]) -> Result<Value, HelperError> {
    if values.is_empty() {
        return Ok(Value::Null);
    }
    if values.len() % 2 != 0 {
        return Err(HelperError::OddArguments {
            helper: "dict",
            count: values.len(),
        });
    }

    let mut map = Map::new();
    for (idx, pair) in values.chunks_exact(2).enumerate() {
        let key = expect_str("dict", idx * 2, &pair[0])?;
        map.insert(key.to_string(), pair[1].clone());
    }
    Ok(Value::Object(map))
}

fn expect_array<'a>(
    helper: &'static str,
    position: usize,
    value: &'a Value,
) -> Result<&'a Vec<Value>, HelperError> {
    value.as_array().ok_or(HelperError::TypeMismatch {
        helper,
        position,
        expected: "array",
        found: type_name(value),
    })
}

fn expect_str<'a>(
    helper: &'static str,
    position: usize,
    value: &'a Value,
) -> Result<&'a str, HelperError> {
    value.as_str().ok_or(HelperError::TypeMismatch {
        helper,
        position,
        expected: "string",
        found: type_name(value),
    })
}

fn named_arg<'a>(
    helper: &'static str,
    args: &'a HashMap<String, Value>,
    name: &'static str,
) -> Result<&'a Value, HelperError> {
    args.get(name)
        .ok_or(HelperError::MissingArgument { helper, name })
}

fn variadic<'a>(
    helper: &'static str,
    args: &'a HashMap<String, Value>,
    name: &'static str,
) -> Result<&'a [Value], HelperError> {
    match args.get(name) {
        None => Ok(&[]),
        Some(value) => expect_array(helper, 0, value).map(Vec::as_slice),
    }
}

fn title_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(title(expect_str("title", 0, value)?)))
}

fn untitle_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(untitle(expect_str("untitle", 0, value)?)))
}

fn toupper_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(expect_str("toupper", 0, value)?.to_uppercase()))
}

fn tolower_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(expect_str("tolower", 0, value)?.to_lowercase()))
}

fn basename_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(basename(expect_str("basename", 0, value)?)))
}

fn type_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(type_name(value).to_string()))
}

fn dump_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(dump(value)))
}

fn string_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(to_text(value)))
}

fn replace_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = expect_str("replace", 0, value)?;
    let old = expect_str("replace", 1, named_arg("replace", args, "old")?)?;
    let new = expect_str("replace", 2, named_arg("replace", args, "new")?)?;
    Ok(Value::String(s.replace(old, new)))
}

fn replacen_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = expect_str("replacen", 0, value)?;
    let old = expect_str("replacen", 1, named_arg("replacen", args, "old")?)?;
    let new = expect_str("replacen", 2, named_arg("replacen", args, "new")?)?;
    let n = named_arg("replacen", args, "n")?;
    let n = n.as_i64().ok_or(HelperError::TypeMismatch {
        helper: "replacen",
        position: 3,
        expected: "int",
        found: type_name(n),
    })?;
    Ok(Value::String(replacen(s, old, new, n)))
}

fn camel_case_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(camel_case(expect_str("CamelCase", 0, value)?)))
}

fn append_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(append(variadic("append", args, "seqs")?)?)
}

fn dict_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(dict(variadic("dict", args, "pairs")?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tera::Context;

    fn render(body: &str) -> tera::Result<String> {
        let mut tera = Tera::default();
        HelperLibrary::standard().install(&mut tera);
        tera.add_raw_template("t", body)?;
        tera.render("t", &Context::new())
    }

    fn error_chain(err: &dyn std::error::Error) -> String {
        let mut out = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            out.push_str(": ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }

    #[test]
    fn test_camel_case_acronyms() {
        assert_eq!(camel_case("user_id"), "UserID");
        assert_eq!(camel_case("http_status"), "HTTPStatus");
        assert_eq!(camel_case("html_body"), "HTMLBody");
        assert_eq!(camel_case("first_name"), "FirstName");
        assert_eq!(camel_case("id"), "ID");
        assert_eq!(camel_case("identity"), "Identity");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_title_only_touches_word_starts() {
        assert_eq!(title("hello world"), "Hello World");
        assert_eq!(title("hELLO"), "HELLO");
        assert_eq!(title("get-pet/by-id"), "Get-Pet/By-Id");
        assert_eq!(title("snake_case"), "Snake_case");
    }

    #[test]
    fn test_untitle() {
        assert_eq!(untitle("UserID"), "userID");
        assert_eq!(untitle("X"), "x");
        assert_eq!(untitle(""), "");
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("go/server.tmpl"), "server.tmpl");
        assert_eq!(basename("/pets/{petId}"), "{petId}");
        assert_eq!(basename("/pets/"), "pets");
        assert_eq!(basename("plain"), "plain");
        assert_eq!(basename("///"), "/");
        assert_eq!(basename(""), ".");
    }

    #[test]
    fn test_type_name_and_dump() {
        assert_eq!(type_name(&Value::Null), "nil");
        assert_eq!(type_name(&json!(true)), "bool");
        assert_eq!(type_name(&json!(3)), "int");
        assert_eq!(type_name(&json!(1.5)), "float");
        assert_eq!(type_name(&json!("s")), "string");
        assert_eq!(type_name(&json!([1])), "array");
        assert_eq!(type_name(&json!({"a": 1})), "map");
        assert_eq!(dump(&json!({"a": 1})), r#"map {"a":1}"#);
    }

    #[test]
    fn test_to_text() {
        assert_eq!(to_text(&json!("plain")), "plain");
        assert_eq!(to_text(&Value::Null), "");
        assert_eq!(to_text(&json!(42)), "42");
        assert_eq!(to_text(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_replacen() {
        assert_eq!(replacen("a.b.c", ".", "/", 1), "a/b.c");
        assert_eq!(replacen("a.b.c", ".", "/", 0), "a.b.c");
        assert_eq!(replacen("a.b.c", ".", "/", -1), "a/b/c");
    }

    #[test]
    fn test_append() {
        assert_eq!(append(&[]).unwrap(), Value::Null);

        let seq = json!(["a", "b"]);
        assert_eq!(append(std::slice::from_ref(&seq)).unwrap(), seq);

        let first = json!(["a", "b"]);
        let second = json!(["c"]);
        let joined = append(&[first.clone(), second.clone()]).unwrap();
        assert_eq!(joined, json!(["a", "b", "c"]));
        assert_eq!(first, json!(["a", "b"]));
        assert_eq!(second, json!(["c"]));
    }

    #[test]
    fn test_append_type_mismatch() {
        let err = append(&[json!(["a"]), json!("b")]).unwrap_err();
        assert_eq!(
            err,
            HelperError::TypeMismatch {
                helper: "append",
                position: 1,
                expected: "array",
                found: "string",
            }
        );
    }

    #[test]
    fn test_dict() {
        let map = dict(&[json!("a"), json!(1), json!("b"), json!(2)]).unwrap();
        assert_eq!(map, json!({"a": 1, "b": 2}));

        let map = dict(&[json!("a"), json!(1), json!("a"), json!(2)]).unwrap();
        assert_eq!(map, json!({"a": 2}));

        assert_eq!(dict(&[]).unwrap(), Value::Null);
    }

    #[test]
    fn test_dict_rejects_odd_count_and_non_string_keys() {
        let err = dict(&[json!("a"), json!(1), json!("b")]).unwrap_err();
        assert_eq!(
            err,
            HelperError::OddArguments {
                helper: "dict",
                count: 3
            }
        );

        let err = dict(&[json!(1), json!(1)]).unwrap_err();
        assert!(matches!(err, HelperError::TypeMismatch { found: "int", .. }));
    }

    #[test]
    fn test_library_names() {
        let names: Vec<_> = HelperLibrary::standard().names().collect();
        assert_eq!(names.len(), 13);
        assert!(names.contains(&"CamelCase"));
        assert!(names.contains(&"dict"));
    }

    #[test]
    fn test_filters_in_templates() {
        let out = render(
            r#"{{ "user_id" | CamelCase }} {{ "Pet" | untitle }} {{ "a-b" | toupper }} {{ "x/y.tmpl" | basename }} {{ 3 | type }}"#,
        )
        .unwrap();
        assert_eq!(out, "UserID pet A-B y.tmpl int");

        let out = render(r#"{{ "a.b.c" | replace(old=".", new="_") }} {{ "a.b.c" | replacen(old=".", new="_", n=1) }}"#)
            .unwrap();
        assert_eq!(out, "a_b_c a_b.c");
    }

    #[test]
    fn test_functions_in_templates() {
        let out = render(
            r#"{% set m = dict(pairs=["a", 1, "b", 2]) %}{{ m.a }}-{{ m.b }}"#,
        )
        .unwrap();
        assert_eq!(out, "1-2");

        let out = render(
            r#"{% set a = ["x", "y"] %}{% set b = ["z"] %}{{ append(seqs=[a, b]) | join(sep=",") }}"#,
        )
        .unwrap();
        assert_eq!(out, "x,y,z");
    }

    #[test]
    fn test_odd_dict_aborts_render() {
        let err = render(r#"before {{ dict(pairs=["a", 1, "b"]) }}"#).unwrap_err();
        assert!(error_chain(&err).contains("dict: odd number of arguments (3)"));
    }

    #[test]
    fn test_wrong_type_aborts_render() {
        let err = render(r#"{{ 5 | CamelCase }}"#).unwrap_err();
        assert!(error_chain(&err).contains("CamelCase: argument 0 is int, expected string"));
    }
}
