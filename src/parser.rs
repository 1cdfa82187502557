// src/parser.rs
//! Parsing route files and locating the route table inside them.

use swc_common::comments::SingleThreadedComments;
use swc_common::{sync::Lrc, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_parser::{lexer::Lexer, Parser as SwcParser, StringInput, Syntax, TsConfig};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::model::RouteShape;
use crate::synth::expr_to_value;
use serde_json::Value;

/// A parsed source file together with everything needed to print it again:
/// the source map (original text) and the comments collected while lexing.
pub struct ParsedSource {
    pub path: PathBuf,
    pub cm: Lrc<SourceMap>,
    pub comments: SingleThreadedComments,
    pub module: Module,
}

/// Where the route array lives inside a [`ParsedSource`].
///
/// Only the array's span and its length at parse time are recorded; the
/// splicer finds the array again by span, so the tree stays singly owned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetNode {
    pub span: Span,
    pub len: usize,
}

pub fn parse_file(file_path: &Path) -> Result<ParsedSource> {
    let src = fs::read_to_string(file_path)?;
    parse_source(file_path, src)
}

/// Parse TypeScript source (TSX when the file name ends in `.tsx`).
///
/// Both fatal and recovered parser errors are reported as [`Error::Parse`];
/// a file that only parses with recovery is not safe to regenerate.
pub fn parse_source(file_path: &Path, src: String) -> Result<ParsedSource> {
    let started = Instant::now();
    let len = src.len();

    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Real(file_path.to_path_buf()), src);
    let comments = SingleThreadedComments::default();

    let syntax = Syntax::Typescript(TsConfig {
        tsx: file_path.extension().is_some_and(|ext| ext == "tsx"),
        decorators: true,
        dts: false,
        no_early_errors: true,
        disallow_ambiguous_jsx_like: true,
    });

    let lexer = Lexer::new(
        syntax,
        Default::default(), // es version
        StringInput::from(&*fm),
        Some(&comments),
    );

    let mut parser = SwcParser::new_from(lexer);

    let parse_error = |e: swc_ecma_parser::error::Error| {
        let loc = cm.lookup_char_pos(e.span().lo);
        Error::Parse {
            path: file_path.to_path_buf(),
            message: format!("{} (line {}, column {})", e.kind().msg(), loc.line, loc.col_display + 1),
        }
    };

    let module = parser.parse_module().map_err(parse_error)?;
    if let Some(e) = parser.take_errors().into_iter().next() {
        return Err(parse_error(e));
    }

    debug!("parsed {:?} ({} bytes) in {:?}", file_path, len, started.elapsed());
    Ok(ParsedSource {
        path: file_path.to_path_buf(),
        cm,
        comments,
        module,
    })
}

/// Visitor that looks for the first route table of a given shape.
struct RouteTableLocator<'a> {
    shape: RouteShape,
    key: &'a str,
    found: Option<TargetNode>,
    /// counters for the debug log
    call_count: usize,
    decl_count: usize,
}

impl<'a> RouteTableLocator<'a> {
    fn new(shape: RouteShape, key: &'a str) -> Self {
        RouteTableLocator {
            shape,
            key,
            found: None,
            call_count: 0,
            decl_count: 0,
        }
    }

    fn target(arr: &ArrayLit) -> TargetNode {
        TargetNode {
            span: arr.span,
            len: arr.elems.len(),
        }
    }

    /// `call({ <key>: [...] })`: the first argument must be an object literal
    /// with an identifier-keyed property whose value is an array.
    fn match_call<'c>(&self, call: &'c CallExpr) -> Option<&'c ArrayLit> {
        let first = call.args.first()?;
        if first.spread.is_some() {
            return None;
        }
        let Expr::Object(obj) = &*first.expr else {
            return None;
        };
        obj.props.iter().find_map(|prop| match prop {
            PropOrSpread::Prop(boxed_prop) => match &**boxed_prop {
                Prop::KeyValue(KeyValueProp {
                    key: PropName::Ident(ident),
                    value,
                }) if &*ident.sym == self.key => match &**value {
                    Expr::Array(arr) => Some(arr),
                    _ => None,
                },
                _ => None,
            },
            PropOrSpread::Spread(_) => None,
        })
    }

    /// `const <key> = [...]`
    fn match_decl<'d>(&self, var_decl: &'d VarDecl) -> Option<&'d ArrayLit> {
        var_decl.decls.iter().find_map(|declarator| {
            let Pat::Ident(BindingIdent { id, .. }) = &declarator.name else {
                return None;
            };
            if &*id.sym != self.key {
                return None;
            }
            match declarator.init.as_deref() {
                Some(Expr::Array(arr)) => Some(arr),
                _ => None,
            }
        })
    }
}

impl Visit for RouteTableLocator<'_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        if self.found.is_some() {
            return;
        }
        self.call_count += 1;

        if self.shape == RouteShape::CallArgument {
            if let Some(arr) = self.match_call(call) {
                self.found = Some(Self::target(arr));
                return;
            }
        }
        call.visit_children_with(self);
    }

    fn visit_var_decl(&mut self, var_decl: &VarDecl) {
        if self.found.is_some() {
            return;
        }
        self.decl_count += 1;

        if self.shape == RouteShape::Declaration {
            if let Some(arr) = self.match_decl(var_decl) {
                self.found = Some(Self::target(arr));
                return;
            }
        }
        var_decl.visit_children_with(self);
    }
}

/// Find the route table of `shape` keyed by `key`.
///
/// The first match in pre-order wins; later matches (nested or shadowing
/// declarations with the same name) are ignored. `None` means the file is not
/// in the expected shape.
pub fn locate_route_table(parsed: &ParsedSource, shape: RouteShape, key: &str) -> Option<TargetNode> {
    let mut locator = RouteTableLocator::new(shape, key);
    parsed.module.visit_with(&mut locator);

    debug!(
        "locator on {:?}: {} calls, {} declarations visited, found {:?}",
        parsed.path, locator.call_count, locator.decl_count, locator.found
    );
    locator.found
}

/// Read the elements of the array a [`TargetNode`] points at back into plain
/// values (see [`expr_to_value`]). Elements that are not literals read as
/// `null`.
pub fn read_route_table(parsed: &ParsedSource, target: &TargetNode) -> Option<Vec<Value>> {
    struct Reader {
        span: Span,
        values: Option<Vec<Value>>,
    }

    impl Visit for Reader {
        fn visit_array_lit(&mut self, arr: &ArrayLit) {
            if self.values.is_some() {
                return;
            }
            if arr.span == self.span {
                self.values = Some(
                    arr.elems
                        .iter()
                        .map(|elem| {
                            elem.as_ref()
                                .and_then(|e| expr_to_value(&e.expr))
                                .unwrap_or(Value::Null)
                        })
                        .collect(),
                );
                return;
            }
            arr.visit_children_with(self);
        }
    }

    let mut reader = Reader {
        span: target.span,
        values: None,
    };
    parsed.module.visit_with(&mut reader);
    reader.values
}
