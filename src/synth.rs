// src/synth.rs
//! Building object-literal nodes from plain route descriptions.

use serde_json::{Map, Number as JsonNumber, Value};
use swc_common::DUMMY_SP;
use swc_ecma_ast::*;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::RouteEntry;

/// Synthesize the object literal for one route entry.
pub fn synthesize_route(entry: &RouteEntry) -> Result<Expr> {
    match serde_json::to_value(entry)? {
        Value::Object(map) => Ok(synthesize_object(&map)),
        other => Err(Error::Injection(format!("route entry is not an object: {other}"))),
    }
}

/// Turn a key/value description into an object literal.
///
/// - strings, numbers and booleans become literals
/// - arrays become array literals of flat objects, and the property is moved
///   to the front of the object
/// - `null` and nested objects are not supported and are left out
pub fn synthesize_object(desc: &Map<String, Value>) -> Expr {
    let mut props: Vec<PropOrSpread> = Vec::with_capacity(desc.len());

    for (key, value) in desc {
        match value {
            Value::Array(items) => {
                let elems = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Object(fields) => Some(flat_object(fields)),
                        other => {
                            debug!("dropping non-object element {other} of `{key}`");
                            None
                        }
                    })
                    .map(|expr| {
                        Some(ExprOrSpread {
                            spread: None,
                            expr: Box::new(expr),
                        })
                    })
                    .collect();
                let array = Expr::Array(ArrayLit {
                    span: DUMMY_SP,
                    elems,
                });
                props.insert(0, key_value(key, array));
            }
            scalar => match scalar_lit(scalar) {
                Some(lit) => props.push(key_value(key, Expr::Lit(lit))),
                None => debug!("dropping unsupported value for `{key}`"),
            },
        }
    }

    Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props,
    })
}

/// Array elements are flat: only scalar fields survive.
fn flat_object(fields: &Map<String, Value>) -> Expr {
    let props = fields
        .iter()
        .filter_map(|(k, v)| scalar_lit(v).map(|lit| key_value(k, Expr::Lit(lit))))
        .collect();
    Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props,
    })
}

fn scalar_lit(value: &Value) -> Option<Lit> {
    match value {
        Value::String(s) => Some(Lit::Str(str_lit(s))),
        Value::Number(n) => n.as_f64().map(|value| {
            Lit::Num(Number {
                span: DUMMY_SP,
                value,
                raw: None,
            })
        }),
        Value::Bool(b) => Some(Lit::Bool(Bool {
            span: DUMMY_SP,
            value: *b,
        })),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// String literal printed with single quotes, matching the route files.
fn str_lit(value: &str) -> Str {
    Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: Some(single_quoted(value).into()),
    }
}

/// Source text of `value` as a single-quoted JS string literal.
pub fn single_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn key_value(key: &str, value: Expr) -> PropOrSpread {
    let key = if is_identifier(key) {
        PropName::Ident(Ident::new(key.into(), DUMMY_SP))
    } else {
        PropName::Str(str_lit(key))
    };
    PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
        key,
        value: Box::new(value),
    })))
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Read a literal expression back into a plain value. This is the inverse of
/// [`synthesize_object`] for everything it can produce, and also understands
/// nested objects and `null`. Anything else (identifiers, calls, arrow
/// functions) yields `None`.
pub fn expr_to_value(expr: &Expr) -> Option<Value> {
    match expr {
        Expr::Lit(Lit::Str(Str { value, .. })) => Some(Value::String(value.to_string())),
        Expr::Lit(Lit::Num(Number { value, .. })) => number_value(*value),
        Expr::Lit(Lit::Bool(Bool { value, .. })) => Some(Value::Bool(*value)),
        Expr::Lit(Lit::Null(_)) => Some(Value::Null),
        Expr::Array(ArrayLit { elems, .. }) => elems
            .iter()
            .map(|elem| elem.as_ref().and_then(|e| expr_to_value(&e.expr)))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        Expr::Object(ObjectLit { props, .. }) => {
            let mut map = Map::new();
            for prop in props {
                let PropOrSpread::Prop(prop) = prop else {
                    return None;
                };
                let Prop::KeyValue(KeyValueProp { key, value }) = &**prop else {
                    return None;
                };
                let key = match key {
                    PropName::Ident(ident) => ident.sym.to_string(),
                    PropName::Str(s) => s.value.to_string(),
                    _ => return None,
                };
                map.insert(key, expr_to_value(value)?);
            }
            Some(Value::Object(map))
        }
        Expr::Paren(ParenExpr { expr, .. }) => expr_to_value(expr),
        _ => None,
    }
}

fn number_value(value: f64) -> Option<Value> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Value::Number(JsonNumber::from(value as i64)))
    } else {
        JsonNumber::from_f64(value).map(Value::Number)
    }
}
