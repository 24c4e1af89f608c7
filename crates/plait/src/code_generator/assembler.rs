//! Assembly of the final single-file script.
//!
//! Layout, in order: shebang, the entry script's leading `__future__`
//! imports, prelude, one registration per embedded module, the rest of the
//! entry script indented into the prelude's `try:` block, epilogue.

use std::borrow::Cow;

use anyhow::{Context, Result};
use log::debug;
use ruff_python_ast::{Stmt, StmtExpr, StmtImportFrom};

use super::encoder::{encode, python_string_literal};
use crate::types::ModuleRecord;

/// Runtime support emitted right after the shebang. Ends inside an open
/// `try:` block that has already installed the import hook.
pub const PRELUDE: &str = include_str!("prelude.py");

/// Closes the prelude's `try:` block.
pub const EPILOGUE: &str = include_str!("epilogue.py");

/// Shebang used when the entry script's own is not copied.
pub const DEFAULT_SHEBANG: &str = "#!/usr/bin/env python3";

const INDENT: &str = "    ";

/// Name of the registration function defined by the prelude.
const REGISTER_FUNCTION: &str = "_plait_register_module";

#[derive(Debug, Clone)]
pub struct AssembleOptions {
    /// Reuse the entry script's first line when it is a shebang.
    pub copy_shebang: bool,
    pub default_shebang: String,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            copy_shebang: false,
            default_shebang: DEFAULT_SHEBANG.to_owned(),
        }
    }
}

/// Produce the bundle text for `entry_source` with `modules` embedded in
/// the given order.
pub fn assemble(
    entry_source: &str,
    modules: &[ModuleRecord],
    options: &AssembleOptions,
) -> Result<String> {
    let mut output = String::with_capacity(PRELUDE.len() + entry_source.len() * 2);
    let (future_imports, entry_body) = split_future_imports(entry_source);

    output.push_str(shebang_line(entry_source, options));
    output.push('\n');
    for statement in &future_imports {
        output.push_str(statement);
        output.push('\n');
    }
    if !future_imports.is_empty() {
        debug!("Hoisted {} __future__ imports above the prelude", future_imports.len());
    }
    output.push_str(PRELUDE);

    for module in modules {
        let payload = encode(&module.source)
            .with_context(|| format!("Failed to encode module {}", module.canonical_path))?;
        output.push_str(&registration_line(&module.canonical_path, &payload));
    }
    debug!("Registered {} embedded modules", modules.len());

    output.push_str(&indent(&entry_body));
    if !output.ends_with('\n') {
        output.push('\n');
    }
    output.push('\n');
    output.push_str(EPILOGUE);

    Ok(output)
}

fn shebang_line<'a>(entry_source: &'a str, options: &'a AssembleOptions) -> &'a str {
    if options.copy_shebang {
        let first_line = entry_source.lines().next().unwrap_or_default();
        if first_line.starts_with("#!") {
            return first_line.strip_suffix('\r').unwrap_or(first_line);
        }
    }
    &options.default_shebang
}

/// Split off the `from __future__` imports that open the entry script,
/// after an optional docstring.
///
/// Returns their text and the entry with each of them replaced by `pass`,
/// so statements sharing a line with them stay valid. A source that does
/// not parse is returned unchanged.
fn split_future_imports(entry_source: &str) -> (Vec<&str>, Cow<'_, str>) {
    let Ok(parsed) = ruff_python_parser::parse_module(entry_source) else {
        return (Vec::new(), Cow::Borrowed(entry_source));
    };

    let mut body = parsed.syntax().body.iter().peekable();
    if let Some(Stmt::Expr(StmtExpr { value, .. })) = body.peek()
        && value.is_string_literal_expr()
    {
        body.next();
    }
    let spans: Vec<(usize, usize)> = body
        .map_while(|stmt| match stmt {
            Stmt::ImportFrom(StmtImportFrom {
                module: Some(module),
                level: 0,
                range,
                ..
            }) if module.as_str() == "__future__" => {
                Some((range.start().to_usize(), range.end().to_usize()))
            }
            _ => None,
        })
        .collect();
    if spans.is_empty() {
        return (Vec::new(), Cow::Borrowed(entry_source));
    }

    let mut hoisted = Vec::with_capacity(spans.len());
    let mut rest = String::with_capacity(entry_source.len());
    let mut cursor = 0;
    for (start, end) in spans {
        hoisted.push(&entry_source[start..end]);
        rest.push_str(&entry_source[cursor..start]);
        rest.push_str("pass");
        cursor = end;
    }
    rest.push_str(&entry_source[cursor..]);
    (hoisted, Cow::Owned(rest))
}

fn registration_line(canonical_path: &str, payload: &str) -> String {
    format!(
        "{INDENT}{REGISTER_FUNCTION}({}, {})\n",
        python_string_literal(canonical_path),
        python_string_literal(payload)
    )
}

/// Indent every non-empty line by one level.
fn indent(source: &str) -> String {
    let mut indented = String::with_capacity(source.len() + source.len() / 8);
    for line in source.split_inclusive('\n') {
        if !line.trim_end_matches(['\r', '\n']).is_empty() {
            indented.push_str(INDENT);
        }
        indented.push_str(line);
    }
    indented
}
