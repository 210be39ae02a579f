//! Element visibility as a user would judge it.
//!
//! Given a [`RenderingContext`] that already knows computed styles and
//! geometry, decide whether an element is actually perceptible: displayed, not
//! `visibility: hidden`, not fully transparent, with some area on screen, and
//! not clipped away by an ancestor's overflow.
//!
//! ```ignore
//! let evaluator = VisibilityEvaluator::new(&context);
//! assert!(evaluator.is_visible(button)?);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod evaluator;
pub mod overflow;
pub mod style;

mod display;
mod opacity;
mod size;

pub use config::{EvaluatorConfig, SIMULATED_ENV_VAR};
pub use context::{NodeKind, Rect, RenderingContext, ScrollOffset, Size};
pub use error::AttachmentError;
pub use evaluator::{HiddenReason, Verdict, VisibilityEvaluator};
pub use overflow::OverflowState;
pub use style::{ComputedStyle, Display, Overflow, Position, StyleParseError, Visibility};

/// Evaluate `node` with the default configuration.
///
/// # Errors
/// Returns [`AttachmentError`] if the node's document has no rendering window.
pub fn is_visible<C: RenderingContext>(ctx: &C, node: C::Node) -> Result<bool, AttachmentError> {
    VisibilityEvaluator::new(ctx).is_visible(node)
}
