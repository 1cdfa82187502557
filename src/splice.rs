// src/splice.rs
//! Appending a synthesized route into a located route table and printing
//! the file back out.

use std::path::Path;

use swc_ecma_ast::*;
use swc_ecma_codegen::{text_writer::JsWriter, Emitter};
use swc_ecma_visit::{VisitMut, VisitMutWith};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{RouteEntry, RouteShape};
use crate::parser::{self, ParsedSource, TargetNode};
use crate::synth;

/// Push `element` as the last element of the array `target` points at.
pub fn append_element(parsed: &mut ParsedSource, target: &TargetNode, element: Expr) -> Result<()> {
    struct Appender {
        span: swc_common::Span,
        element: Option<Expr>,
    }

    impl VisitMut for Appender {
        fn visit_mut_array_lit(&mut self, arr: &mut ArrayLit) {
            if self.element.is_none() {
                return;
            }
            if arr.span == self.span {
                if let Some(expr) = self.element.take() {
                    arr.elems.push(Some(ExprOrSpread {
                        spread: None,
                        expr: Box::new(expr),
                    }));
                }
                return;
            }
            arr.visit_mut_children_with(self);
        }
    }

    let mut appender = Appender {
        span: target.span,
        element: Some(element),
    };
    parsed.module.visit_mut_with(&mut appender);

    if appender.element.is_some() {
        return Err(Error::Injection(format!(
            "route table at {:?} is no longer in {:?}",
            target.span, parsed.path
        )));
    }
    Ok(())
}

/// Print the whole module again. Literals keep their original raw text and
/// comments are re-attached. Everything else follows swc's own formatting,
/// so the whole file comes back re-indented to four spaces and a route
/// registration shows up as a whole-file diff.
pub fn emit_source(parsed: &ParsedSource) -> Result<String> {
    let mut buf = Vec::new();
    {
        let mut emitter = Emitter {
            cfg: swc_ecma_codegen::Config::default(),
            cm: parsed.cm.clone(),
            comments: Some(&parsed.comments),
            wr: JsWriter::new(parsed.cm.clone(), "\n", &mut buf, None),
        };
        emitter
            .emit_module(&parsed.module)
            .map_err(|e| Error::Injection(format!("could not emit {:?}: {e}", parsed.path)))?;
    }
    String::from_utf8(buf).map_err(|e| Error::Injection(e.to_string()))
}

/// Parse `file`, append `entry` to its route table and return the new text.
///
/// `Ok(None)` means no route table of that shape was found and nothing was
/// changed. The regenerated text is parsed once more before it is returned;
/// text that does not parse is an [`Error::Injection`]. Nothing is written to
/// disk here. See [`emit_source`] for how formatting changes.
pub fn inject_route(file: &Path, shape: RouteShape, key: &str, entry: &RouteEntry) -> Result<Option<String>> {
    let mut parsed = parser::parse_file(file)?;

    let Some(target) = parser::locate_route_table(&parsed, shape, key) else {
        warn!("no `{key}` route table ({shape:?}) found in {:?}, skipping route registration", file);
        return Ok(None);
    };
    debug!("route table in {:?} has {} entries", file, target.len);

    let node = synth::synthesize_route(entry)?;
    append_element(&mut parsed, &target, node)?;
    let code = emit_source(&parsed)?;

    if let Err(err) = parser::parse_source(file, code.clone()) {
        return Err(Error::Injection(format!("regenerated route file does not parse: {err}")));
    }
    Ok(Some(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(src: &str) -> ParsedSource {
        parser::parse_source(&PathBuf::from("routers.ts"), src.to_string()).unwrap()
    }

    #[test]
    fn append_puts_element_last() {
        let mut parsed = parse("const config = [{ path: '/a' }];\n");
        let target = parser::locate_route_table(&parsed, RouteShape::Declaration, "config").unwrap();
        assert_eq!(target.len, 1);

        let entry = RouteEntry::for_page("/aps", "Foo");
        append_element(&mut parsed, &target, synth::synthesize_route(&entry).unwrap()).unwrap();

        let code = emit_source(&parsed).unwrap();
        let a = code.find("'/a'").unwrap();
        let foo = code.find("'/aps/Foo'").unwrap();
        assert!(a < foo, "new entry should follow the existing one:\n{code}");
    }

    #[test]
    fn append_to_missing_target_is_an_injection_error() {
        let mut parsed = parse("const config = [];\n");
        let mut target = parser::locate_route_table(&parsed, RouteShape::Declaration, "config").unwrap();
        target.span = swc_common::DUMMY_SP;

        let err = append_element(&mut parsed, &target, Expr::Array(ArrayLit {
            span: swc_common::DUMMY_SP,
            elems: vec![],
        }))
        .unwrap_err();
        assert!(matches!(err, Error::Injection(_)));
    }

    #[test]
    fn comments_survive_regeneration() {
        let parsed = parse("// route table\nconst config = [{ path: '/home' }];\n");
        let code = emit_source(&parsed).unwrap();
        assert!(code.contains("// route table"));
    }
}
