//! Recursion limits and the path cursor threaded through every pass

use crate::error::{Error, Result};

/// Configuration limits for a transformation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Deepest nesting level a pass will descend to; the root is level 0
    pub max_depth: usize,
    /// Most nodes a shared-reference graph may expand to when materialised
    pub max_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_nodes: 100_000,
        }
    }
}

/// Tracks where a recursive walk currently is
///
/// Every descent goes through [`Cursor::descend`], which enforces the depth
/// limit and keeps the path available for error reporting.
#[derive(Debug)]
pub struct Cursor<'a> {
    limits: &'a Limits,
    segments: Vec<String>,
}

impl<'a> Cursor<'a> {
    /// Start a walk at the root
    #[must_use]
    pub fn new(limits: &'a Limits) -> Self {
        Self {
            limits,
            segments: Vec::new(),
        }
    }

    /// Current nesting level
    #[must_use]
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The limits this walk enforces
    #[must_use]
    pub fn limits(&self) -> &Limits {
        self.limits
    }

    /// Render the current location as `$.field.nested`
    #[must_use]
    pub fn path(&self) -> String {
        render_path(&self.segments)
    }

    /// Run `f` one level below the current node, under `segment`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DepthExceeded`] if the new level is past the limit,
    /// otherwise whatever `f` returns.
    pub fn descend<T>(
        &mut self,
        segment: &str,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.segments.push(segment.to_owned());
        let result = if self.segments.len() > self.limits.max_depth {
            Err(Error::depth_exceeded(self.path(), self.limits.max_depth))
        } else {
            f(self)
        };
        self.segments.pop();
        result
    }
}

pub(crate) fn render_path(segments: &[String]) -> String {
    let mut out = String::from("$");
    for segment in segments {
        let plain = !segment.is_empty()
            && segment
                .chars()
                .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '@'));
        if plain {
            out.push('.');
            out.push_str(segment);
        } else {
            out.push_str(&format!("[{segment:?}]"));
        }
    }
    out
}
