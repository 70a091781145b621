//! Lazily rendered source-code trees.
//!
//! Generators build a graph of code constructs, keep mutating it (filling
//! in names discovered later, appending statements to blocks that are
//! already embedded elsewhere) and only ask for text at the end. Nothing is
//! formatted before [`Render::render_inline`] or
//! [`Render::render_freestanding`] is called.
//!
//! # Module Organization
//!
//! - [`node`] - The [`Node`] trait, shared [`NodeRef`] handles and identities
//! - [`coerce`] - Roles and the coercion registry turning values into nodes
//! - [`token`] - [`TokenList`], a sequence rendered like a deferred string
//! - [`stmt`] - [`StatementList`], statements rendered one per line
//! - [`slot`] - [`Slot`], a named node attribute bound after construction
//! - [`render`] - [`RenderContext`] threaded through a render
//! - [`config`] - [`RenderConfig`], loadable from TOML
//!
//! ```
//! use lazycode_core::{Render, StatementList, TokenList};
//!
//! let body = StatementList::new();
//! let name = TokenList::from_value("count");
//! body.append(&name + " = 0;")?;
//! name.append("_total");
//!
//! assert_eq!(body.render_freestanding(1)?, "    count_total = 0;");
//! # Ok::<(), Box<lazycode_core::Error>>(())
//! ```

pub mod coerce;
pub mod config;
mod error;
mod indent;
pub mod naming;
pub mod node;
pub mod render;
pub mod slot;
pub mod stmt;
pub mod token;
mod value;

pub use coerce::{CoercionRegistry, CoercionRule, Role, coerce, is_registered, register_coercion};
pub use config::{MissingContentPolicy, RenderConfig};
pub use error::{Error, Result};
pub use indent::Indent;
pub use node::{Empty, Node, NodeExt, NodeId, NodeRef, Render, empty};
pub use render::RenderContext;
pub use slot::{Slot, SlotProxy, SlotState};
pub use stmt::StatementList;
pub use token::{Token, TokenList};
pub use value::Value;
