//! Preprocessor directives and header files.

use std::{any::Any, cell::Cell, path::Path, rc::Rc};

use lazycode_core::{
    Node, NodeId, RenderContext, Role, Slot, StatementList, Value, impl_node_value,
    naming::{IdentStyle, format_ident, sanitize_ident},
};
use tracing::debug;

use crate::{Commented, Result, Trivia, block::statements};

/// Render a one-line directive with its comments.
fn directive(
    cx: &mut RenderContext<'_>,
    trivia: &Trivia,
    text: &str,
) -> lazycode_core::Result<String> {
    let side = trivia.side(cx)?;
    let line = cx.indent_lines(&format!("{text}{side}"));
    trivia.lead(cx, line)
}

#[derive(Debug)]
struct IncludeInner {
    id: NodeId,
    header: Slot,
    system: bool,
    trivia: Trivia,
}

/// `#include "header"` or `#include <header>`.
#[derive(Debug, Clone)]
pub struct Include {
    inner: Rc<IncludeInner>,
}

impl Include {
    pub fn new(header: impl Into<Value>, system: bool) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(IncludeInner {
                id: NodeId::fresh(),
                header: Slot::with_value("header", Role::TOKEN, header)?,
                system,
                trivia: Trivia::new(),
            }),
        })
    }

    /// `#include "header"`
    pub fn local(header: impl Into<Value>) -> Result<Self> {
        Self::new(header, false)
    }

    /// `#include <header>`
    pub fn system(header: impl Into<Value>) -> Result<Self> {
        Self::new(header, true)
    }

    pub fn header(&self) -> &Slot {
        &self.inner.header
    }

    pub fn is_system(&self) -> bool {
        self.inner.system
    }
}

impl Commented for Include {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Include {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Include"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let header = self.inner.header.require(cx)?;
        Ok(match self.inner.system {
            true => format!("#include <{header}>"),
            false => format!("#include \"{header}\""),
        })
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let text = self.inline(cx)?;
        directive(cx, &self.inner.trivia, &text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Include);

#[derive(Debug)]
struct DefineInner {
    id: NodeId,
    name: Slot,
    value: Slot,
    trivia: Trivia,
}

/// `#define NAME value`
#[derive(Debug, Clone)]
pub struct Define {
    inner: Rc<DefineInner>,
}

impl Define {
    /// A macro without replacement text.
    pub fn new(name: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(DefineInner {
                id: NodeId::fresh(),
                name: Slot::with_value("name", Role::NAME, name)?,
                value: Slot::new("value", Role::TOKEN),
                trivia: Trivia::new(),
            }),
        })
    }

    pub fn with_value(self, value: impl Into<Value>) -> Result<Self> {
        self.inner.value.set(value)?;
        Ok(self)
    }

    pub fn name(&self) -> &Slot {
        &self.inner.name
    }

    pub fn value(&self) -> &Slot {
        &self.inner.value
    }
}

impl Commented for Define {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Define {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Define"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let name = self.inner.name.require(cx)?;
        let value = self.inner.value.inline(cx)?;
        Ok(format!("#define {name} {value}").trim_end().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let text = self.inline(cx)?;
        directive(cx, &self.inner.trivia, &text)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Define);

/// Flavor of a [`PrepIf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrepKind {
    /// `#if cond`
    If,
    /// `#ifdef cond`
    IfDef,
    /// `#ifndef cond`
    IfNDef,
}

impl PrepKind {
    fn directive(self) -> &'static str {
        match self {
            PrepKind::If => "if",
            PrepKind::IfDef => "ifdef",
            PrepKind::IfNDef => "ifndef",
        }
    }

    /// Text repeated after `#endif //`.
    fn endif_prefix(self) -> &'static str {
        match self {
            PrepKind::If => "",
            PrepKind::IfDef => "ifdef ",
            PrepKind::IfNDef => "ifndef ",
        }
    }
}

#[derive(Debug)]
struct PrepIfInner {
    id: NodeId,
    kind: PrepKind,
    cond: Slot,
    body: StatementList,
    indent_content: Cell<bool>,
    trivia: Trivia,
}

/// A conditional compilation section, closed by an `#endif` that repeats
/// its condition.
///
/// The content keeps the directive's indentation unless
/// [`indented`](Self::indented) is requested.
#[derive(Debug, Clone)]
pub struct PrepIf {
    inner: Rc<PrepIfInner>,
}

impl PrepIf {
    pub fn new(kind: PrepKind, cond: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(PrepIfInner {
                id: NodeId::fresh(),
                kind,
                cond: Slot::with_value("cond", Role::TOKEN, cond)?,
                body: statements(),
                indent_content: Cell::new(false),
                trivia: Trivia::new(),
            }),
        })
    }

    pub fn if_(cond: impl Into<Value>) -> Result<Self> {
        Self::new(PrepKind::If, cond)
    }

    pub fn ifdef(name: impl Into<Value>) -> Result<Self> {
        Self::new(PrepKind::IfDef, name)
    }

    pub fn ifndef(name: impl Into<Value>) -> Result<Self> {
        Self::new(PrepKind::IfNDef, name)
    }

    /// Indent the content one level deeper than the directives.
    pub fn indented(self) -> Self {
        self.set_indent_content(true);
        self
    }

    pub fn set_indent_content(&self, indent: bool) {
        self.inner.indent_content.set(indent);
    }

    pub fn kind(&self) -> PrepKind {
        self.inner.kind
    }

    pub fn cond(&self) -> &Slot {
        &self.inner.cond
    }

    pub fn body(&self) -> &StatementList {
        &self.inner.body
    }

    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        Ok(self.inner.body.append(value)?)
    }
}

impl Commented for PrepIf {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for PrepIf {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "PrepIf"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        Ok(self.freestanding(cx)?.trim_start().to_string())
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let inner = &self.inner;
        let indentation = cx.indentation();
        let cond = inner.cond.require(cx)?;
        let side = inner.trivia.side(cx)?;

        let mut lines = vec![format!(
            "{indentation}#{} {cond}{side}",
            inner.kind.directive()
        )];
        let content = if inner.indent_content.get() {
            cx.nested(|cx| inner.body.render_entries(cx))?
        } else {
            inner.body.render_entries(cx)?
        };
        if !content.is_empty() {
            lines.push(content);
        }
        lines.push(format!(
            "{indentation}#endif //{}{cond}",
            inner.kind.endif_prefix()
        ));
        inner.trivia.lead(cx, lines.join("\n"))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(PrepIf);

#[derive(Debug)]
struct HeaderInner {
    id: NodeId,
    guard: Slot,
    section: PrepIf,
}

/// A header file wrapped in an include guard.
///
/// ```
/// use lazycode_c::{Fun, HeaderFile};
/// use lazycode_core::Render;
///
/// let header = HeaderFile::new("net/socket_pool.h")?;
/// header.append(Fun::new("pool_init")?.decl())?;
/// assert_eq!(
///     header.render_freestanding(0)?,
///     "#ifndef SOCKET_POOL_H_\n#define SOCKET_POOL_H_\nvoid pool_init(void);\n#endif //ifndef SOCKET_POOL_H_"
/// );
/// # Ok::<(), lazycode_c::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct HeaderFile {
    inner: Rc<HeaderInner>,
}

impl HeaderFile {
    /// A header whose guard is derived from the file name.
    pub fn new(filename: &str) -> Result<Self> {
        Self::with_guard(guard_for(filename))
    }

    /// A header guarded by `guard`.
    pub fn with_guard(guard: impl Into<Value>) -> Result<Self> {
        let guard = Slot::with_value("guard", Role::NAME, guard)?;
        let section = PrepIf::ifndef(guard.required_proxy())?;
        section.append(Define::new(guard.required_proxy())?)?;
        Ok(Self {
            inner: Rc::new(HeaderInner {
                id: NodeId::fresh(),
                guard,
                section,
            }),
        })
    }

    /// The include guard macro name.
    pub fn guard(&self) -> &Slot {
        &self.inner.guard
    }

    /// Content of the guarded section, starting with the guard's `#define`.
    pub fn body(&self) -> &StatementList {
        self.inner.section.body()
    }

    pub fn append(&self, value: impl Into<Value>) -> Result<()> {
        self.inner.section.append(value)
    }
}

/// `dir/my-file.h` becomes `MY_FILE_H_`.
fn guard_for(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let guard = format_ident(&sanitize_ident(&stem), IdentStyle::UpperUnderscoreCase) + "_H_";
    debug!(filename, %guard, "derived include guard");
    guard
}

impl Commented for HeaderFile {
    fn trivia(&self) -> &Trivia {
        self.inner.section.trivia()
    }
}

impl Node for HeaderFile {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "HeaderFile"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        cx.inline(&self.inner.section)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        cx.freestanding(&self.inner.section)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(HeaderFile);

#[cfg(test)]
mod tests {
    use super::*;
    use lazycode_core::{Render, TokenList};

    use crate::{Fun, NewLine, Var};

    #[test]
    fn test_include() {
        assert_eq!(
            Include::system("stdio.h").unwrap().render_freestanding(0).unwrap(),
            "#include <stdio.h>"
        );
        let local = Include::local("pool.h")
            .unwrap()
            .with_side_comment("own header")
            .unwrap();
        assert!(!local.is_system());
        assert_eq!(
            local.render_freestanding(0).unwrap(),
            "#include \"pool.h\" //own header"
        );
    }

    #[test]
    fn test_define() {
        let max = Define::new("MAX_CLIENTS").unwrap().with_value(64).unwrap();
        assert_eq!(max.render_freestanding(0).unwrap(), "#define MAX_CLIENTS 64");
        assert_eq!(
            Define::new("DEBUG").unwrap().render_freestanding(0).unwrap(),
            "#define DEBUG"
        );
    }

    #[test]
    fn test_prep_if_kinds() {
        let section = PrepIf::if_("VERSION > 2").unwrap();
        section.append("enable()").unwrap();
        insta::assert_snapshot!(section.render_freestanding(0).unwrap(), @r"
        #if VERSION > 2
        enable();
        #endif //VERSION > 2
        ");

        let ifdef = PrepIf::ifdef("DEBUG").unwrap();
        assert_eq!(ifdef.kind(), PrepKind::IfDef);
        assert_eq!(
            ifdef.render_freestanding(0).unwrap(),
            "#ifdef DEBUG\n#endif //ifdef DEBUG"
        );
    }

    #[test]
    fn test_indented_content() {
        let section = PrepIf::ifndef("NDEBUG").unwrap().indented();
        section.append(Define::new("TRACE").unwrap()).unwrap();
        assert_eq!(
            section.render_freestanding(1).unwrap(),
            "    #ifndef NDEBUG\n        #define TRACE\n    #endif //ifndef NDEBUG"
        );
    }

    #[test]
    fn test_guard_from_file_name() {
        assert_eq!(guard_for("pool.h"), "POOL_H_");
        assert_eq!(guard_for("src/my-socket.pool.h"), "MY_SOCKET_POOL_H_");
    }

    #[test]
    fn test_header_file() {
        let header = HeaderFile::new("counter.h").unwrap();
        let count = Var::parse("int count").unwrap();
        header.append(Include::system("stddef.h").unwrap()).unwrap();
        header.append(NewLine::new()).unwrap();
        header.append(count.extern_decl()).unwrap();
        header
            .append(Fun::new("counter_reset").unwrap().decl())
            .unwrap();

        insta::assert_snapshot!(header.render_freestanding(0).unwrap(), @r"
        #ifndef COUNTER_H_
        #define COUNTER_H_
        #include <stddef.h>

        extern int count;
        void counter_reset(void);
        #endif //ifndef COUNTER_H_
        ");
    }

    #[test]
    fn test_renaming_guard() {
        let header = HeaderFile::new("a.h").unwrap();
        let guard: TokenList = header.guard().get().downcast().unwrap();
        guard.insert(0, "LIB_").unwrap();
        assert_eq!(
            header.render_freestanding(0).unwrap(),
            "#ifndef LIB_A_H_\n#define LIB_A_H_\n#endif //ifndef LIB_A_H_"
        );

        header.guard().set("OTHER_H").unwrap();
        assert_eq!(
            header.render_freestanding(0).unwrap(),
            "#ifndef OTHER_H\n#define OTHER_H\n#endif //ifndef OTHER_H"
        );
    }
}
