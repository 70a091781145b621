//! Variables.

use std::{any::Any, rc::Rc, sync::LazyLock};

use lazycode_core::{Node, NodeId, RenderContext, Role, Slot, Value, impl_node_value, values};
use regex::Regex;
use tracing::trace;

use crate::{Commented, Error, Expr, Result, Trivia};

const IDENT: &str = r"[A-Za-z_][A-Za-z0-9_]*";

/// `name[size] = initializer`, shared by both declaration patterns.
fn name_tail() -> String {
    format!(
        r"(?P<name>{IDENT})\s*(?:\[\s*(?P<array_size>[^\]]*?)\s*\])?(?:\s*=\s*(?P<initializer>.*?))?\s*;?\s*$"
    )
}

static UNTYPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\s*{}", name_tail())).expect("valid declaration pattern")
});

static TYPED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^\s*(?:(?P<storage>.*?)\s+)?(?P<ty>(?:(?:struct|union|enum)\s+)?{IDENT}(?:\s*\*+\s*|\s+)){}",
        name_tail()
    ))
    .expect("valid declaration pattern")
});

#[derive(Debug)]
struct Inner {
    id: NodeId,
    storage: Slot,
    ty: Slot,
    name: Slot,
    array_size: Slot,
    initializer: Slot,
    trivia: Trivia,
}

/// A C variable.
///
/// Inline a variable renders its name, so it can be used directly in
/// expressions. Freestanding it renders its definition. The
/// [`decl`](Self::decl), [`defi`](Self::defi) and
/// [`extern_decl`](Self::extern_decl) views render the other forms.
///
/// ```
/// use lazycode_c::Var;
/// use lazycode_core::Render;
///
/// let table = Var::parse("const int table[3] = {1, 2, 3}")?;
/// assert_eq!(table.defi().render_freestanding(0)?, "const int table[3] = {1, 2, 3};");
/// assert_eq!(table.extern_decl().render_freestanding(0)?, "extern const int table[];");
/// # Ok::<(), lazycode_c::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Var {
    inner: Rc<Inner>,
}

impl Var {
    /// A variable named `name`, without type.
    pub fn new(name: impl Into<Value>) -> Result<Self> {
        Ok(Self {
            inner: Rc::new(Inner {
                id: NodeId::fresh(),
                storage: Slot::new("storage", Role::TOKEN),
                ty: Slot::new("ty", Role::TOKEN),
                name: Slot::with_value("name", Role::NAME, name)?,
                array_size: Slot::new("array_size", Role::TOKEN),
                initializer: Slot::new("initializer", Role::TOKEN),
                trivia: Trivia::new(),
            }),
        })
    }

    /// Build a variable from a C declaration such as
    /// `static const char *name = "x"` or `int table[3] = {1, 2, 3}`.
    ///
    /// Storage class and qualifiers are whatever precedes the last word of
    /// the type. Spaces before the pointer stars of the type are
    /// normalized to one.
    pub fn parse(decl: &str) -> Result<Self> {
        let caps = UNTYPED
            .captures(decl)
            .or_else(|| TYPED.captures(decl))
            .ok_or_else(|| Error::invalid_declaration(decl))?;
        trace!(decl, "parsed variable declaration");

        let var = Self::new(&caps["name"])?;
        if let Some(storage) = caps.name("storage") {
            let words = storage.as_str().split_whitespace().collect::<Vec<_>>();
            if !words.is_empty() {
                var.inner.storage.set(words.join(" "))?;
            }
        }
        if let Some(ty) = caps.name("ty") {
            var.inner.ty.set(normalize_stars(ty.as_str()))?;
        }
        if let Some(size) = caps.name("array_size") {
            var.inner.array_size.set(size.as_str())?;
        }
        if let Some(init) = caps.name("initializer") {
            var.inner.initializer.set(init.as_str())?;
        }
        Ok(var)
    }

    pub fn with_storage(self, storage: impl Into<Value>) -> Result<Self> {
        self.inner.storage.set(storage)?;
        Ok(self)
    }

    pub fn with_type(self, ty: impl Into<Value>) -> Result<Self> {
        self.inner.ty.set(ty)?;
        Ok(self)
    }

    pub fn with_array_size(self, size: impl Into<Value>) -> Result<Self> {
        self.inner.array_size.set(size)?;
        Ok(self)
    }

    pub fn with_initializer(self, initializer: impl Into<Value>) -> Result<Self> {
        self.inner.initializer.set(initializer)?;
        Ok(self)
    }

    pub fn storage(&self) -> &Slot {
        &self.inner.storage
    }

    pub fn ty(&self) -> &Slot {
        &self.inner.ty
    }

    pub fn name(&self) -> &Slot {
        &self.inner.name
    }

    pub fn array_size(&self) -> &Slot {
        &self.inner.array_size
    }

    pub fn initializer(&self) -> &Slot {
        &self.inner.initializer
    }

    /// Declaration: no initializer.
    pub fn decl(&self) -> VarView {
        self.view(VarForm::Decl)
    }

    /// Definition: with the initializer, if any.
    pub fn defi(&self) -> VarView {
        self.view(VarForm::Defi)
    }

    /// `extern` declaration: no initializer, no array size.
    pub fn extern_decl(&self) -> VarView {
        self.view(VarForm::ExternDecl)
    }

    /// The variable as an expression.
    pub fn expr(&self) -> Expr {
        Expr::new(self)
    }

    /// `name = value`
    pub fn assign(&self, value: impl Into<Value>) -> Expr {
        Expr::new(values![self, " = ", value])
    }

    /// `name[index]`
    pub fn index(&self, index: impl Into<Value>) -> Expr {
        Expr::new(values![self, "[", index, "]"])
    }

    fn view(&self, form: VarForm) -> VarView {
        VarView {
            id: NodeId::fresh(),
            var: self.clone(),
            form,
        }
    }

    fn render_decl(&self, cx: &mut RenderContext<'_>, form: VarForm) -> lazycode_core::Result<String> {
        let inner = &self.inner;
        let mut parts = Vec::with_capacity(4);
        if form == VarForm::ExternDecl {
            parts.push("extern".to_string());
        }
        let storage = inner.storage.inline(cx)?;
        if !storage.trim().is_empty() {
            parts.push(storage.trim().to_string());
        }

        let name = inner.name.require(cx)?;
        let ty = normalize_stars(&inner.ty.inline(cx)?);
        let sep = if ty.ends_with('*') { "" } else { " " };
        if ty.is_empty() {
            parts.push(name);
        } else if inner.array_size.is_bound() {
            let size = match form {
                VarForm::ExternDecl => String::new(),
                _ => inner.array_size.inline(cx)?,
            };
            parts.push(format!("{ty}{sep}{name}[{size}]"));
        } else {
            parts.push(format!("{ty}{sep}{name}"));
        }

        let mut text = parts.join(" ");
        if form == VarForm::Defi && inner.initializer.is_bound() {
            text.push_str(" = ");
            text.push_str(&inner.initializer.inline(cx)?);
        }
        Ok(text)
    }
}

/// `char  **` becomes `char **`; types without stars are only trimmed.
fn normalize_stars(ty: &str) -> String {
    match ty.find('*') {
        Some(index) => format!("{} {}", ty[..index].trim(), ty[index..].trim()),
        None => ty.trim().to_string(),
    }
}

impl Commented for Var {
    fn trivia(&self) -> &Trivia {
        &self.inner.trivia
    }
}

impl Node for Var {
    fn id(&self) -> NodeId {
        self.inner.id
    }

    fn kind(&self) -> &'static str {
        "Var"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.inner.name.require(cx)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        cx.freestanding(&self.defi())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(Var);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VarForm {
    Decl,
    Defi,
    ExternDecl,
}

/// One textual form of a [`Var`], rendered from the variable's current
/// state.
///
/// Inline it renders without the trailing `;`, which makes the
/// declaration view suitable for function parameters.
#[derive(Debug, Clone)]
pub struct VarView {
    id: NodeId,
    var: Var,
    form: VarForm,
}

impl VarView {
    pub fn var(&self) -> &Var {
        &self.var
    }
}

impl Node for VarView {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> &'static str {
        "VarView"
    }

    fn inline(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        self.var.render_decl(cx, self.form)
    }

    fn freestanding(&self, cx: &mut RenderContext<'_>) -> lazycode_core::Result<String> {
        let trivia = &self.var.inner.trivia;
        let text = self.inline(cx)?;
        let side = trivia.side(cx)?;
        let line = cx.indent_lines(&format!("{text};{side}"));
        trivia.lead(cx, line)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl_node_value!(VarView);

#[cfg(test)]
mod tests {
    use super::*;
    use lazycode_core::{Render, TokenList};

    fn defi(decl: &str) -> String {
        Var::parse(decl).unwrap().defi().render_inline().unwrap()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(defi("x"), "x");
        assert_eq!(defi("x = 1"), "x = 1");
        assert_eq!(defi("int x"), "int x");
        assert_eq!(defi("int x[3] = {1, 2, 3}"), "int x[3] = {1, 2, 3}");
        assert_eq!(defi("static int x[3] = {1, 2, 3}"), "static int x[3] = {1, 2, 3}");
        assert_eq!(defi("static const char   *  name = \"a\";"), "static const char *name = \"a\"");
        assert_eq!(defi("struct point origin"), "struct point origin");
        assert_eq!(defi("unsigned buf[]"), "unsigned buf[]");
        assert_eq!(defi("char*p"), "char *p");
    }

    #[test]
    fn test_parse_keeps_identifiers_whole() {
        let count = Var::parse("int count").unwrap();
        assert_eq!(count.ty().get().render_inline().unwrap(), "int");
        assert_eq!(count.name().get().render_inline().unwrap(), "count");
        assert!(!count.storage().is_bound());

        let table = Var::parse("int table[8]").unwrap();
        assert_eq!(table.ty().get().render_inline().unwrap(), "int");
        assert_eq!(table.name().get().render_inline().unwrap(), "table");
        assert_eq!(table.array_size().get().render_inline().unwrap(), "8");

        let by = Var::parse("static unsigned by").unwrap();
        assert_eq!(by.storage().get().render_inline().unwrap(), "static");
        assert_eq!(by.ty().get().render_inline().unwrap(), "unsigned");
        assert_eq!(by.name().get().render_inline().unwrap(), "by");
    }

    #[test]
    fn test_parse_slots() {
        let var = Var::parse("static volatile int counter[4] = {0}").unwrap();
        assert_eq!(var.storage().get().render_inline().unwrap(), "static volatile");
        assert_eq!(var.ty().get().render_inline().unwrap(), "int");
        assert_eq!(var.name().get().render_inline().unwrap(), "counter");
        assert_eq!(var.array_size().get().render_inline().unwrap(), "4");
        assert_eq!(var.initializer().get().render_inline().unwrap(), "{0}");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = Var::parse("3 = x").unwrap_err();
        assert!(matches!(err, Error::InvalidDeclaration { .. }));
        assert!(Var::parse("").is_err());
    }

    #[test]
    fn test_views() {
        let var = Var::parse("int table[8] = {0}").unwrap();
        assert_eq!(var.decl().render_freestanding(0).unwrap(), "int table[8];");
        assert_eq!(var.defi().render_freestanding(1).unwrap(), "    int table[8] = {0};");
        assert_eq!(var.extern_decl().render_freestanding(0).unwrap(), "extern int table[];");
        assert_eq!(var.render_freestanding(0).unwrap(), "int table[8] = {0};");
    }

    #[test]
    fn test_pointer_array() {
        let names = Var::parse("const char * names[3]").unwrap();
        assert_eq!(names.decl().render_inline().unwrap(), "const char *names[3]");
        assert_eq!(
            names.extern_decl().render_freestanding(0).unwrap(),
            "extern const char *names[];"
        );

        let built = Var::new("argv")
            .unwrap()
            .with_type("char  **")
            .unwrap()
            .with_array_size(2)
            .unwrap();
        assert_eq!(built.defi().render_inline().unwrap(), "char **argv[2]");
    }

    #[test]
    fn test_inline_is_the_name() {
        let var = Var::parse("int n").unwrap();
        assert_eq!(var.render_inline().unwrap(), "n");
        assert_eq!(var.index("i").render_inline().unwrap(), "n[i]");
        assert_eq!(var.assign(2).render_freestanding(0).unwrap(), "n = 2;");
    }

    #[test]
    fn test_late_rename_is_visible_everywhere() {
        let var = Var::new("tmp").unwrap().with_type("long").unwrap();
        let use_site = var.assign(0);
        let definition = var.defi();

        let name: TokenList = var.name().get().downcast().unwrap();
        name.append("_count");

        assert_eq!(use_site.render_inline().unwrap(), "tmp_count = 0");
        assert_eq!(definition.render_inline().unwrap(), "long tmp_count");
    }

    #[test]
    fn test_pointer_type_spacing() {
        let var = Var::new("p").unwrap().with_type("char*").unwrap();
        assert_eq!(var.decl().render_inline().unwrap(), "char *p");
    }

    #[test]
    fn test_comments_on_definition() {
        let var = Var::parse("int n = 0")
            .unwrap()
            .with_side_comment("items")
            .unwrap();
        assert_eq!(var.defi().render_freestanding(0).unwrap(), "int n = 0; //items");
    }
}
