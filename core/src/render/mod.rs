//! Target-language text generation.
//!
//! Fragments are minijinja templates rendered from typed records. Values
//! reach the generated script only through the `pystr`/`pylit` filters, so
//! quoting is handled in one place.

use minijinja::{AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use serde::Serialize;
use serde_json::Value;

use crate::error::CompileError;

/// Imports shared by both build modes.
pub const PRELUDE: &str = include_str!("assets/prelude.py");
/// Runtime helpers called by the generated task code.
pub const HELPERS: &str = include_str!("assets/helpers.py");
/// Status notification nodes of the deployable script.
pub const TELEMETRY: &str = include_str!("assets/telemetry.py");

const TEMPLATES: &[(&str, &str)] = &[
    ("deploy_header", include_str!("templates/deploy_header.py.j2")),
    ("query_local", include_str!("templates/query_local.py.j2")),
    ("query_deploy", include_str!("templates/query_deploy.py.j2")),
    ("copy_local", include_str!("templates/copy_local.py.j2")),
    ("copy_deploy", include_str!("templates/copy_deploy.py.j2")),
    ("create_local", include_str!("templates/create_local.py.j2")),
    ("create_deploy", include_str!("templates/create_deploy.py.j2")),
    ("vm_deploy", include_str!("templates/vm_deploy.py.j2")),
    ("local_main", include_str!("templates/local_main.py.j2")),
    ("wiring", include_str!("templates/wiring.py.j2")),
];

pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, CompileError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.add_filter("pystr", pystr_filter);
        env.add_filter("pylit", pylit_filter);

        for (name, source) in TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| template_error(name, e))?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: &S) -> Result<String, CompileError> {
        let tmpl = self
            .env
            .get_template(name)
            .map_err(|e| template_error(name, e))?;
        tmpl.render(ctx).map_err(|e| template_error(name, e))
    }
}

fn template_error(name: &str, e: minijinja::Error) -> CompileError {
    CompileError::Template {
        template: name.to_string(),
        message: e.to_string(),
    }
}

fn pystr_filter(value: String) -> String {
    python_str(&value)
}

fn pylit_filter(value: minijinja::Value) -> Result<String, minijinja::Error> {
    let json = serde_json::to_value(&value)
        .map_err(|e| minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()))?;
    Ok(python_literal(&json))
}

/// Double-quoted string literal valid in Python 3 source.
///
/// JSON string escapes (`\"`, `\\`, `\n`, `\uXXXX`) have the same meaning in
/// Python, so the literal evaluates to exactly `s`.
pub fn python_str(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Renders a JSON value as the equivalent Python literal.
pub fn python_literal(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => python_str(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(python_literal).collect();
            format!("[{}]", inner.join(", "))
        }
        Value::Object(map) => {
            let inner: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}: {}", python_str(k), python_literal(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn literals_use_python_spelling() {
        let v = json!({"a": [1, true, null], "b": "x\"y"});
        assert_eq!(python_literal(&v), r#"{"a": [1, True, None], "b": "x\"y"}"#);
    }

    #[test]
    fn strings_escape_quotes_and_newlines() {
        assert_eq!(python_str("say \"hi\"\n`x`"), r#""say \"hi\"\n`x`""#);
        assert_eq!(python_str("a\\b"), r#""a\\b""#);
    }

    #[test]
    fn every_template_compiles() {
        let r = Renderer::new().unwrap();
        for (name, _) in TEMPLATES {
            assert!(r.env.get_template(name).is_ok(), "{name}");
        }
    }

    #[test]
    fn undefined_variables_are_errors() {
        let r = Renderer::new().unwrap();
        let err = r.render("local_main", &json!({})).unwrap_err();
        assert!(matches!(err, CompileError::Template { .. }));
    }

    #[test]
    fn local_main_calls_procedures_in_order() {
        let r = Renderer::new().unwrap();
        let out = r
            .render("local_main", &json!({"procedures": ["t2", "t4"]}))
            .unwrap();
        assert!(out.ends_with("    t2()\n    t4()\n"), "{out}");
    }

    #[test]
    fn helper_assets_are_spec_independent() {
        assert!(!HELPERS.contains("{{ "));
        assert!(PRELUDE.starts_with("# -*- coding: utf-8 -*-"));
        assert!(TELEMETRY.contains("notify_deactivated = StatusPublisherOperator("));
    }
}
