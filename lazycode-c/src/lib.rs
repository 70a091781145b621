//! C source constructs built on `lazycode-core`.
//!
//! Every construct is a lazily rendered node: names, types, bodies and
//! comments can be set or extended after the construct was embedded in a
//! larger tree, and the final text is only produced by
//! [`Render::render_freestanding`](lazycode_core::Render::render_freestanding).
//!
//! # Module Organization
//!
//! - [`expr`] - Expressions and the statement form `expr;`
//! - [`comment`] - Block and line comments
//! - [`block`] - Braced statement blocks
//! - [`control`] - `if`/`else`/`while`, `for`, `do while`, `switch`
//! - [`var`] - Variables, their declarations and definitions
//! - [`fun`] - Functions, prototypes and calls
//! - [`typedef`] - Type aliases and blank lines
//! - [`compound`] - `struct`, `union` and `enum` types
//! - [`init`] - Designated initializers
//! - [`order`] - Type definitions ordered after their dependencies
//! - [`prep`] - Preprocessor directives and header files
//!
//! ```
//! use lazycode_c::{Fun, Var};
//! use lazycode_core::Render;
//!
//! let main = Fun::new("main")?.returns("int")?;
//! let count = Var::parse("int count = 0")?;
//! main.append(count.defi())?;
//! main.append(count.assign(count.expr() + " + 1"))?;
//! main.append("return count")?;
//!
//! assert_eq!(
//!     main.render_freestanding(0)?,
//!     "int main(void)\n{\n    int count = 0;\n    count = count + 1;\n    return count;\n}"
//! );
//! # Ok::<(), lazycode_c::Error>(())
//! ```

use std::cell::Cell;

use lazycode_core::{CoercionRule, register_coercion};
use tracing::debug;

pub mod block;
pub mod comment;
pub mod compound;
pub mod control;
mod error;
pub mod expr;
pub mod fun;
pub mod init;
pub mod order;
pub mod prep;
mod trivia;
pub mod typedef;
pub mod var;

pub use block::Block;
pub use comment::{Comment, LineComment};
pub use compound::{CompoundKind, CompoundType, CompoundView};
pub use control::{CondKind, Conditional, DoWhile, For, Switch};
pub use error::{Error, Result};
pub use expr::{Expr, expr};
pub use fun::{Fun, FunView};
pub use init::DesignatedInit;
pub use order::OrderedTypes;
pub use prep::{Define, HeaderFile, Include, PrepIf, PrepKind};
pub use trivia::{Commented, Trivia};
pub use typedef::{FunPtrTypedef, NewLine, Typedef};
pub use var::{Var, VarView};

/// Roles registered by [`install`].
pub mod roles {
    use lazycode_core::Role;

    /// C expression. Only [`Expr`](crate::Expr) qualifies; anything else
    /// is wrapped in one.
    pub const EXPR: Role = Role::new("c.expr");

    /// Entry of a C statement list. Any node qualifies; plain values become
    /// an [`Expr`](crate::Expr), rendered `value;`.
    pub const STATEMENT: Role = Role::new("c.statement");

    /// Leading comment of a construct. Plain values become a
    /// [`Comment`](crate::Comment).
    pub const COMMENT: Role = Role::new("c.comment");

    /// Trailing comment of a construct. Plain values become a
    /// [`LineComment`](crate::LineComment).
    pub const SIDE_COMMENT: Role = Role::new("c.side_comment");
}

thread_local! {
    static INSTALLED: Cell<bool> = const { Cell::new(false) };
}

/// Register the C roles in this thread's coercion registry.
///
/// Constructors call it, so it only needs to be called explicitly before
/// coercing through [`roles`] without having built any C construct.
/// Calling it again is a no-op.
pub fn install() {
    if INSTALLED.with(|installed| installed.replace(true)) {
        return;
    }
    debug!("installing C coercion rules");
    register_coercion(
        roles::EXPR,
        CoercionRule::for_type::<Expr>(|value| Ok(Expr::new(value).into())),
    );
    register_coercion(
        roles::STATEMENT,
        CoercionRule::new(|value| Ok(Expr::new(value).into())),
    );
    register_coercion(
        roles::COMMENT,
        CoercionRule::new(|value| Ok(Comment::new(value).into())),
    );
    register_coercion(
        roles::SIDE_COMMENT,
        CoercionRule::new(|value| Ok(LineComment::new(value).into())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazycode_core::{Node, NodeExt, Render, coerce, is_registered};

    #[test]
    fn test_install_registers_roles() {
        install();
        install();
        for role in [roles::EXPR, roles::STATEMENT, roles::COMMENT, roles::SIDE_COMMENT] {
            assert!(is_registered(&role));
        }
    }

    #[test]
    fn test_statement_role_builds_expressions() {
        install();
        let node = coerce("x = 1", &roles::STATEMENT).unwrap();
        assert!(node.is::<Expr>());
        assert_eq!(node.render_freestanding(0).unwrap(), "x = 1;");
    }

    #[test]
    fn test_expr_role_wraps_other_nodes() {
        install();
        let list = lazycode_core::TokenList::from_value("a").to_node();
        let node = coerce(&list, &roles::EXPR).unwrap();
        assert!(node.is::<Expr>());
        assert_ne!(node.id(), list.id());

        let again = coerce(&node, &roles::EXPR).unwrap();
        assert!(again.same(&node));
    }
}
