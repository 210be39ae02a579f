//! Top-level visibility decision.
//!
//! Rules are applied in a fixed order and the first one that decides wins.
//! Every call re-reads the context; nothing is cached between calls.

use core::fmt;

use log::debug;

use crate::config::EvaluatorConfig;
use crate::context::{NodeKind, RenderingContext, closest_tag, parent_element};
use crate::display::is_displayed;
use crate::error::AttachmentError;
use crate::opacity::{effective_opacity, is_transparent};
use crate::overflow::{OverflowState, overflow_state};
use crate::size::{has_positive_size, hidden_by_overflow};

/// Why an element is not perceptible.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HiddenReason {
    /// `<input type="hidden">`.
    HiddenInput,
    /// `<noscript>`.
    NoScript,
    /// `visibility: hidden` or `visibility: collapse`.
    VisibilityStyle,
    /// `display: none` on the element or an ancestor.
    NotDisplayed,
    /// Effective opacity is zero.
    Transparent,
    /// No area of its own and nothing inside it with area.
    ZeroSize,
    /// Clipped away by an ancestor's overflow.
    ClippedByOverflow,
    /// An `<option>`/`<optgroup>` with no enclosing `<select>`.
    OrphanedOption,
    /// Not a rendered node at all (comments, detached text).
    NotRendered,
}

impl fmt::Display for HiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::HiddenInput => "hidden input",
            Self::NoScript => "noscript element",
            Self::VisibilityStyle => "visibility is hidden or collapse",
            Self::NotDisplayed => "display is none on the element or an ancestor",
            Self::Transparent => "effective opacity is zero",
            Self::ZeroSize => "has no positive size",
            Self::ClippedByOverflow => "hidden by ancestor overflow",
            Self::OrphanedOption => "option outside of any select",
            Self::NotRendered => "not a rendered node",
        };
        f.write_str(text)
    }
}

/// Outcome of one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Visible,
    Hidden(HiddenReason),
}

impl Verdict {
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }

    pub const fn hidden_reason(self) -> Option<HiddenReason> {
        match self {
            Self::Visible => None,
            Self::Hidden(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Visible => f.write_str("visible"),
            Self::Hidden(reason) => write!(f, "hidden ({reason})"),
        }
    }
}

/// Whether the opacity rule applies. Options are judged by their select
/// without it, since a closed dropdown may be transparent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum OpacityCheck {
    Enforce,
    Ignore,
}

/// Decides whether nodes of one rendering context are perceptible.
#[derive(Debug)]
pub struct VisibilityEvaluator<'ctx, C: RenderingContext> {
    ctx: &'ctx C,
    config: EvaluatorConfig,
}

impl<'ctx, C: RenderingContext> VisibilityEvaluator<'ctx, C> {
    pub fn new(ctx: &'ctx C) -> Self {
        Self::with_config(ctx, EvaluatorConfig::default())
    }

    pub const fn with_config(ctx: &'ctx C, config: EvaluatorConfig) -> Self {
        Self { ctx, config }
    }

    pub const fn config(&self) -> EvaluatorConfig {
        self.config
    }

    /// Whether `node` would be seen by a user.
    ///
    /// # Errors
    /// Returns [`AttachmentError`] if the node's document has no rendering window.
    pub fn is_visible(&self, node: C::Node) -> Result<bool, AttachmentError> {
        self.evaluate(node).map(Verdict::is_visible)
    }

    /// Like [`Self::is_visible`], but reports which rule hid the node.
    ///
    /// Text nodes take the verdict of their parent element; a document is
    /// always visible.
    ///
    /// # Errors
    /// Returns [`AttachmentError`] if the node's document has no rendering window.
    pub fn evaluate(&self, node: C::Node) -> Result<Verdict, AttachmentError> {
        self.ensure_attached(node)?;
        let verdict = match self.ctx.kind(node) {
            NodeKind::Element { .. } => self.evaluate_element(node, OpacityCheck::Enforce),
            NodeKind::Text => parent_element(self.ctx, node).map_or(
                Verdict::Hidden(HiddenReason::NotRendered),
                |parent| self.evaluate_element(parent, OpacityCheck::Enforce),
            ),
            NodeKind::Document => Verdict::Visible,
            NodeKind::Other => Verdict::Hidden(HiddenReason::NotRendered),
        };
        debug!(target: "visibility", "{node:?}: {verdict}");
        Ok(verdict)
    }

    /// Overflow state of an element relative to its clipping ancestors.
    ///
    /// # Errors
    /// Returns [`AttachmentError`] if the node's document has no rendering window.
    pub fn overflow_state(&self, element: C::Node) -> Result<OverflowState, AttachmentError> {
        self.ensure_attached(element)?;
        Ok(overflow_state(self.ctx, element))
    }

    /// Product of the element's opacity and all of its ancestors'.
    ///
    /// Transparency is decided by a zero factor on the chain, not by this
    /// product, which may round to zero for very deep chains.
    ///
    /// # Errors
    /// Returns [`AttachmentError`] if the node's document has no rendering window.
    pub fn effective_opacity(&self, element: C::Node) -> Result<f64, AttachmentError> {
        self.ensure_attached(element)?;
        Ok(effective_opacity(self.ctx, element))
    }

    /// # Errors
    /// Returns [`AttachmentError`] if the node's document has no rendering window.
    pub fn is_displayed(&self, element: C::Node) -> Result<bool, AttachmentError> {
        self.ensure_attached(element)?;
        Ok(is_displayed(self.ctx, element))
    }

    /// # Errors
    /// Returns [`AttachmentError`] if the node's document has no rendering window.
    pub fn has_positive_size(&self, element: C::Node) -> Result<bool, AttachmentError> {
        self.ensure_attached(element)?;
        Ok(has_positive_size(self.ctx, element))
    }

    fn ensure_attached(&self, node: C::Node) -> Result<(), AttachmentError> {
        let document = self.ctx.owner_document(node);
        if self.ctx.has_rendering_window(document) {
            Ok(())
        } else {
            Err(AttachmentError::new(format!("{node:?}")))
        }
    }

    fn geometry_checks_enabled(&self) -> bool {
        !self.config.is_simulated(self.ctx.is_simulated())
    }

    fn evaluate_element(&self, element: C::Node, opacity: OpacityCheck) -> Verdict {
        let ctx = self.ctx;
        let kind = ctx.kind(element);

        // The body stands for the document itself, which is always showing.
        let document = ctx.owner_document(element);
        if ctx.body_element(document) == Some(element) {
            return Verdict::Visible;
        }

        if kind.is_tag("option") || kind.is_tag("optgroup") {
            return closest_tag(ctx, element, "select").map_or(
                Verdict::Hidden(HiddenReason::OrphanedOption),
                |select| self.evaluate_element(select, OpacityCheck::Ignore),
            );
        }

        if kind.is_tag("input")
            && ctx
                .attribute(element, "type")
                .is_some_and(|input_type| input_type.eq_ignore_ascii_case("hidden"))
        {
            return Verdict::Hidden(HiddenReason::HiddenInput);
        }

        if kind.is_tag("noscript") {
            return Verdict::Hidden(HiddenReason::NoScript);
        }

        if ctx.computed_style(element).visibility.is_hidden() {
            return Verdict::Hidden(HiddenReason::VisibilityStyle);
        }

        if !is_displayed(ctx, element) {
            return Verdict::Hidden(HiddenReason::NotDisplayed);
        }

        if opacity == OpacityCheck::Enforce && is_transparent(ctx, element) {
            return Verdict::Hidden(HiddenReason::Transparent);
        }

        if self.geometry_checks_enabled() {
            if !has_positive_size(ctx, element) {
                return Verdict::Hidden(HiddenReason::ZeroSize);
            }
            if hidden_by_overflow(ctx, element) {
                return Verdict::Hidden(HiddenReason::ClippedByOverflow);
            }
        }

        Verdict::Visible
    }
}
