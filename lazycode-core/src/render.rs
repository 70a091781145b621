//! Render context threaded through a tree walk.

use tracing::warn;

use crate::{Error, MissingContentPolicy, Node, NodeId, RenderConfig, Result};

/// State of one render call: configuration, current indentation level and
/// the chain of nodes currently being rendered.
///
/// Every child render goes through [`inline`](Self::inline) or
/// [`freestanding`](Self::freestanding), which refuse to re-enter a node
/// that is already on the chain. A tree that reaches itself therefore
/// fails with [`Error::CyclicStructure`] instead of recursing forever.
#[derive(Debug)]
pub struct RenderContext<'a> {
    config: &'a RenderConfig,
    level: usize,
    chain: Vec<NodeId>,
}

impl<'a> RenderContext<'a> {
    pub fn new(config: &'a RenderConfig) -> Self {
        Self::at_level(config, 0)
    }

    pub fn at_level(config: &'a RenderConfig, level: usize) -> Self {
        Self {
            config,
            level,
            chain: Vec::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        self.config
    }

    /// Current indentation level.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Indentation prefix for the current level.
    pub fn indentation(&self) -> String {
        self.config.indent.prefix(self.level)
    }

    /// Render `node` inline.
    pub fn inline<N: Node + ?Sized>(&mut self, node: &N) -> Result<String> {
        self.guarded(node.id(), |cx| node.inline(cx))
    }

    /// Render `node` freestanding at the current level.
    pub fn freestanding<N: Node + ?Sized>(&mut self, node: &N) -> Result<String> {
        self.guarded(node.id(), |cx| node.freestanding(cx))
    }

    /// Run `f` one indentation level deeper.
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.level += 1;
        let result = f(self);
        self.level -= 1;
        result
    }

    /// Prefix every non-empty line of `text` with the current indentation.
    pub fn indent_lines(&self, text: &str) -> String {
        if self.level == 0 || text.is_empty() {
            return text.to_string();
        }
        let prefix = self.indentation();
        text.split('\n')
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{prefix}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Continue every line after the first at the current indentation.
    ///
    /// Used for multi-line inline fragments whose first line is placed by
    /// the caller.
    pub fn continue_lines(&self, text: &str) -> String {
        if self.level == 0 {
            return text.to_string();
        }
        text.replace('\n', &format!("\n{}", self.indentation()))
    }

    /// Text standing in for the unbound slot `slot`, per the configured policy.
    pub fn missing_content(&self, slot: &str) -> Result<String> {
        match self.config.missing_content {
            MissingContentPolicy::Empty => Ok(String::new()),
            MissingContentPolicy::Placeholder => {
                warn!(slot, "rendering placeholder for unbound slot");
                Ok(self.config.placeholder.replace("{slot}", slot))
            }
            MissingContentPolicy::Error => Err(Error::missing_content(slot)),
        }
    }

    fn guarded(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut Self) -> Result<String>,
    ) -> Result<String> {
        if id != NodeId::EMPTY && self.chain.contains(&id) {
            return Err(Error::cyclic(id));
        }
        self.chain.push(id);
        let result = f(self);
        self.chain.pop();
        result
    }
}
