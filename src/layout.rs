//! Measure, layout and draw passes for custom nodes.
//!
//! The engine runs three passes over a node. Each pass calls into the node's [`CustomLayout`]
//! delegate, if it has one, and moves the node through the states of [`LayoutPhase`]:
//!
//! ```text
//! Idle -> Measuring -> Measured -> Positioning -> Positioned -> Drawing -> Idle
//! ```
//!
//! A failed pass puts the node back in the phase it was in before.

use crate::attribute::AttributeKind;
use crate::color::Color;
use crate::error::{Error, Result};
use crate::handle::NodeHandle;
use crate::kind::NodeKind;
use crate::rect::Rect;
use crate::tree::{DirtyFlags, NodeTree};
use cgmath::{Matrix3, Point2, Vector2};
use core::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutPhase {
    Idle,
    Measuring,
    Measured,
    Positioning,
    Positioned,
    Drawing,
}

impl LayoutPhase {
    /// True while a delegate callback for this node is running.
    pub fn in_progress(self) -> bool {
        match self {
            LayoutPhase::Measuring | LayoutPhase::Positioning | LayoutPhase::Drawing => true,
            _ => false,
        }
    }
}

impl Default for LayoutPhase {
    fn default() -> LayoutPhase {
        LayoutPhase::Idle
    }
}

/// Size bounds passed down by the parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConstraint {
    pub min: Vector2<f32>,
    /// May be infinite.
    pub max: Vector2<f32>,
}

impl LayoutConstraint {
    /// Creates a constraint; fails unless `0 <= min <= max` on both axes.
    pub fn new(min: Vector2<f32>, max: Vector2<f32>) -> Result<LayoutConstraint> {
        let constraint = LayoutConstraint { min, max };
        constraint.validate()?;
        Ok(constraint)
    }

    /// Exactly `size`.
    pub fn tight(size: Vector2<f32>) -> LayoutConstraint {
        LayoutConstraint {
            min: size,
            max: size,
        }
    }

    /// Anything between zero and `max`.
    pub fn loose(max: Vector2<f32>) -> LayoutConstraint {
        LayoutConstraint {
            min: Vector2::new(0., 0.),
            max,
        }
    }

    pub fn unbounded() -> LayoutConstraint {
        LayoutConstraint::loose(Vector2::new(f32::INFINITY, f32::INFINITY))
    }

    fn validate(&self) -> Result<()> {
        let axis_ok = |min: f32, max: f32| min.is_finite() && min >= 0. && !max.is_nan() && min <= max;
        if axis_ok(self.min.x, self.max.x) && axis_ok(self.min.y, self.max.y) {
            Ok(())
        } else {
            Err(Error::InvalidParameter("malformed layout constraint"))
        }
    }

    /// Returns true if `size` satisfies the constraint.
    pub fn admits(&self, size: Vector2<f32>) -> bool {
        size.x.is_finite()
            && size.y.is_finite()
            && size.x >= self.min.x
            && size.x <= self.max.x
            && size.y >= self.min.y
            && size.y <= self.max.y
    }

    /// Clamps `size` into the constraint.
    pub fn clamp(&self, size: Vector2<f32>) -> Vector2<f32> {
        Vector2::new(
            size.x.max(self.min.x).min(self.max.x),
            size.y.max(self.min.y).min(self.max.y),
        )
    }
}

/// Draw layers, visited in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawLayer {
    /// Behind the children.
    Content,
    /// Above the children.
    Foreground,
    /// Above everything, unclipped.
    Overlay,
}

impl DrawLayer {
    pub const ALL: [DrawLayer; 3] = [DrawLayer::Content, DrawLayer::Foreground, DrawLayer::Overlay];
}

/// A drawing surface provided by the engine.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    /// Multiplies the current transform by `transform`.
    fn concat(&mut self, transform: Matrix3<f32>);
    fn clip_rect(&mut self, rect: Rect);
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32);
    fn draw_text(&mut self, origin: Point2<f32>, text: &str, color: Color);
}

/// A recorded canvas command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Concat(Matrix3<f32>),
    ClipRect(Rect),
    FillRect(Rect, Color),
    StrokeRect(Rect, Color, f32),
    Text(Point2<f32>, String, Color),
}

/// A [`Canvas`] that records commands for the engine to replay later.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> DisplayList {
        DisplayList::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Replays the recorded commands onto another canvas.
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        for command in &self.commands {
            match command {
                DrawCommand::Save => canvas.save(),
                DrawCommand::Restore => canvas.restore(),
                DrawCommand::Concat(t) => canvas.concat(*t),
                DrawCommand::ClipRect(r) => canvas.clip_rect(*r),
                DrawCommand::FillRect(r, c) => canvas.fill_rect(*r, *c),
                DrawCommand::StrokeRect(r, c, w) => canvas.stroke_rect(*r, *c, *w),
                DrawCommand::Text(o, t, c) => canvas.draw_text(*o, t, *c),
            }
        }
    }
}

impl Canvas for DisplayList {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }
    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }
    fn concat(&mut self, transform: Matrix3<f32>) {
        self.commands.push(DrawCommand::Concat(transform));
    }
    fn clip_rect(&mut self, rect: Rect) {
        self.commands.push(DrawCommand::ClipRect(rect));
    }
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect(rect, color));
    }
    fn stroke_rect(&mut self, rect: Rect, color: Color, width: f32) {
        self.commands.push(DrawCommand::StrokeRect(rect, color, width));
    }
    fn draw_text(&mut self, origin: Point2<f32>, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text(origin, text.to_string(), color));
    }
}

/// The drawing context handed to [`CustomLayout::draw`]. Only valid during the callback.
pub struct DrawContext<'a> {
    canvas: &'a mut dyn Canvas,
    size: Vector2<f32>,
    layer: DrawLayer,
}

impl<'a> DrawContext<'a> {
    /// The node's measured size.
    pub fn size(&self) -> Vector2<f32> {
        self.size
    }

    /// The node's bounds in its own coordinate system.
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.size)
    }

    pub fn layer(&self) -> DrawLayer {
        self.layer
    }

    pub fn canvas(&mut self) -> &mut dyn Canvas {
        &mut *self.canvas
    }
}

/// A layout delegate for a custom node.
///
/// Every method receives the tree, so delegates can read attributes and measure or position
/// children.
pub trait CustomLayout: fmt::Debug {
    /// Measures the node.
    ///
    /// Must call [`NodeTree::set_measured_size`] before returning. The default reports the
    /// constraint's minimum size.
    fn measure(
        &self,
        tree: &mut NodeTree,
        node: NodeHandle,
        constraint: LayoutConstraint,
    ) -> Result<()> {
        tree.set_measured_size(node, constraint.min)
    }

    /// Positions the node's children, typically through [`NodeTree::layout_node`] or
    /// [`NodeTree::set_layout_position`].
    fn layout(&self, tree: &mut NodeTree, node: NodeHandle, position: Point2<f32>) -> Result<()> {
        let _ = (tree, node, position);
        Ok(())
    }

    /// Draws one layer of the node.
    fn draw(&self, tree: &mut NodeTree, node: NodeHandle, context: &mut DrawContext<'_>) {
        let _ = (tree, node, context);
    }
}

/// Per-node pass state.
#[derive(Default)]
pub(crate) struct LayoutState {
    phase: LayoutPhase,
    measured: Option<Vector2<f32>>,
    /// Size reported during the current measure callback.
    reported: Option<Vector2<f32>>,
    position: Option<Point2<f32>>,
    delegate: Option<Rc<dyn CustomLayout>>,
}

impl NodeTree {
    /// Installs a layout delegate on a custom node.
    pub fn set_custom_layout<L: CustomLayout + 'static>(
        &mut self,
        node: NodeHandle,
        delegate: L,
    ) -> Result<()> {
        let n = self.node_mut(node)?;
        if n.kind != NodeKind::Custom {
            return Err(Error::UnsupportedForNodeKind(n.kind));
        }
        n.layout.delegate = Some(Rc::new(delegate));
        self.invalidate(node, DirtyFlags::all());
        Ok(())
    }

    pub fn clear_custom_layout(&mut self, node: NodeHandle) -> Result<()> {
        if self.node_mut(node)?.layout.delegate.take().is_some() {
            self.invalidate(node, DirtyFlags::all());
        }
        Ok(())
    }

    pub fn layout_phase(&self, node: NodeHandle) -> Option<LayoutPhase> {
        self.nodes.get(node).map(|n| n.layout.phase)
    }

    pub fn measured_size(&self, node: NodeHandle) -> Option<Vector2<f32>> {
        self.nodes.get(node)?.layout.measured
    }

    pub fn layout_position(&self, node: NodeHandle) -> Option<Point2<f32>> {
        self.nodes.get(node)?.layout.position
    }

    /// The node's frame in its parent's coordinate system, once measured and positioned.
    pub fn frame(&self, node: NodeHandle) -> Option<Rect> {
        let layout = &self.nodes.get(node)?.layout;
        Some(Rect::new(layout.position?, layout.measured?))
    }

    /// Forces the given passes to run again.
    pub fn mark_dirty(&mut self, node: NodeHandle, flags: DirtyFlags) -> Result<()> {
        self.node(node)?;
        self.invalidate(node, flags);
        Ok(())
    }

    /// Enters a pass: checks that no pass is running on the node and switches to `phase`.
    /// Returns the phase to restore on failure.
    fn begin_pass(&mut self, node: NodeHandle, phase: LayoutPhase) -> Result<LayoutPhase> {
        let layout = &mut self.node_mut(node)?.layout;
        if layout.phase.in_progress() {
            return Err(Error::InvalidParameter("a pass is already running on this node"));
        }
        let previous = layout.phase;
        layout.phase = phase;
        Ok(previous)
    }

    fn restore_phase(&mut self, node: NodeHandle, phase: LayoutPhase) {
        if let Some(n) = self.nodes.get_mut(node) {
            n.layout.phase = phase;
            n.layout.reported = None;
        }
    }

    /// Measures a node. Called by the engine.
    ///
    /// Nodes without a delegate measure to their `WIDTH`/`HEIGHT` attributes (or the
    /// constraint's minimum) clamped into the constraint. Delegates must report a size that
    /// satisfies the constraint.
    pub fn measure_node(
        &mut self,
        node: NodeHandle,
        constraint: LayoutConstraint,
    ) -> Result<Vector2<f32>> {
        constraint.validate()?;
        let delegate = self.node(node)?.layout.delegate.clone();
        let previous = self.begin_pass(node, LayoutPhase::Measuring)?;
        self.node_mut(node)?.layout.reported = None;

        let result = match delegate {
            Some(delegate) => self.run_callback(
                "measure",
                node,
                |tree| delegate.measure(tree, node, constraint),
                |tree| tree.restore_phase(node, previous),
            ),
            None => {
                let size = self.intrinsic_size(node, constraint);
                self.set_measured_size(node, size)
            }
        };

        let reported = match self.nodes.get_mut(node) {
            Some(n) => n.layout.reported.take(),
            None => return Err(Error::InvalidParameter("node was disposed while measuring")),
        };
        let size = match (result, reported) {
            (Err(e), _) => {
                self.restore_phase(node, previous);
                return Err(e);
            }
            (Ok(()), None) => {
                tracing::warn!(?node, "measure callback did not report a size");
                self.restore_phase(node, previous);
                return Err(Error::InvalidParameter("measure callback did not report a size"));
            }
            (Ok(()), Some(size)) if !constraint.admits(size) => {
                tracing::warn!(?node, ?size, ?constraint, "measured size violates the constraint");
                self.restore_phase(node, previous);
                return Err(Error::InvalidParameter("measured size violates the constraint"));
            }
            (Ok(()), Some(size)) => size,
        };

        let n = self.node_mut(node)?;
        n.layout.measured = Some(size);
        n.layout.phase = LayoutPhase::Measured;
        n.dirty.remove(DirtyFlags::NEEDS_MEASURE);
        tracing::trace!(?node, ?size, "measured node");
        Ok(size)
    }

    fn intrinsic_size(&self, node: NodeHandle, constraint: LayoutConstraint) -> Vector2<f32> {
        let length = |kind: AttributeKind| {
            self.nodes
                .get(node)
                .and_then(|n| n.attributes.get(&kind))
                .and_then(|value| value.f32_at(0))
        };
        let size = Vector2::new(
            length(AttributeKind::WIDTH).unwrap_or(constraint.min.x),
            length(AttributeKind::HEIGHT).unwrap_or(constraint.min.y),
        );
        constraint.clamp(size)
    }

    /// Reports the measured size from inside a measure callback.
    pub fn set_measured_size(&mut self, node: NodeHandle, size: Vector2<f32>) -> Result<()> {
        let layout = &mut self.node_mut(node)?.layout;
        if layout.phase != LayoutPhase::Measuring {
            return Err(Error::InvalidParameter("node is not being measured"));
        }
        if !(size.x.is_finite() && size.y.is_finite() && size.x >= 0. && size.y >= 0.) {
            return Err(Error::InvalidParameter("measured size must be finite and non-negative"));
        }
        layout.reported = Some(size);
        Ok(())
    }

    /// Positions a node. Called by the engine, or by a parent's delegate for its children.
    ///
    /// The node must have been measured and must not need measuring again.
    pub fn layout_node(&mut self, node: NodeHandle, position: Point2<f32>) -> Result<()> {
        let n = self.node(node)?;
        if n.layout.measured.is_none() || n.dirty.contains(DirtyFlags::NEEDS_MEASURE) {
            return Err(Error::InvalidParameter("node must be measured before layout"));
        }
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(Error::InvalidParameter("position must be finite"));
        }
        let delegate = n.layout.delegate.clone();
        let previous = self.begin_pass(node, LayoutPhase::Positioning)?;
        let previous_position = self.node_mut(node)?.layout.position.replace(position);

        let result = match delegate {
            Some(delegate) => self.run_callback(
                "layout",
                node,
                |tree| delegate.layout(tree, node, position),
                |tree| tree.restore_phase(node, previous),
            ),
            None => Ok(()),
        };

        let n = self
            .nodes
            .get_mut(node)
            .ok_or(Error::InvalidParameter("node was disposed during layout"))?;
        if let Err(e) = result {
            n.layout.position = previous_position;
            n.layout.phase = previous;
            return Err(e);
        }
        n.layout.phase = LayoutPhase::Positioned;
        n.dirty.remove(DirtyFlags::NEEDS_LAYOUT);
        tracing::trace!(?node, ?position, "laid out node");
        Ok(())
    }

    /// Stores a position for a measured node without running its layout callback.
    pub fn set_layout_position(&mut self, node: NodeHandle, position: Point2<f32>) -> Result<()> {
        if !(position.x.is_finite() && position.y.is_finite()) {
            return Err(Error::InvalidParameter("position must be finite"));
        }
        let n = self.node_mut(node)?;
        if n.layout.phase.in_progress() {
            return Err(Error::InvalidParameter("a pass is already running on this node"));
        }
        if n.layout.measured.is_none() || n.dirty.contains(DirtyFlags::NEEDS_MEASURE) {
            return Err(Error::InvalidParameter("node must be measured before layout"));
        }
        n.layout.position = Some(position);
        if n.layout.phase == LayoutPhase::Measured {
            n.layout.phase = LayoutPhase::Positioned;
        }
        n.dirty.remove(DirtyFlags::NEEDS_LAYOUT);
        tracing::trace!(?node, ?position, "stored node position");
        Ok(())
    }

    /// Draws a node onto `canvas`. Called by the engine.
    ///
    /// The node must be measured and positioned, with no pending measure or layout. The
    /// delegate's `draw` is called once per [`DrawLayer`].
    pub fn draw_node(&mut self, node: NodeHandle, canvas: &mut dyn Canvas) -> Result<()> {
        let n = self.node(node)?;
        let size = match (n.layout.measured, n.layout.position) {
            (Some(size), Some(_)) => size,
            _ => return Err(Error::InvalidParameter("node must be laid out before drawing")),
        };
        if n.dirty.intersects(DirtyFlags::NEEDS_MEASURE | DirtyFlags::NEEDS_LAYOUT)
            || n.layout.phase == LayoutPhase::Measured
        {
            return Err(Error::InvalidParameter("node must be laid out before drawing"));
        }
        let delegate = n.layout.delegate.clone();
        let previous = self.begin_pass(node, LayoutPhase::Drawing)?;

        if let Some(delegate) = delegate {
            for layer in DrawLayer::ALL.iter().copied() {
                if !self.nodes.contains_key(node) {
                    break;
                }
                let mut context = DrawContext {
                    canvas: &mut *canvas,
                    size,
                    layer,
                };
                self.run_callback(
                    "draw",
                    node,
                    |tree| delegate.draw(tree, node, &mut context),
                    |tree| tree.restore_phase(node, previous),
                );
            }
        }

        let n = self
            .nodes
            .get_mut(node)
            .ok_or(Error::InvalidParameter("node was disposed while drawing"))?;
        n.layout.phase = LayoutPhase::Idle;
        n.dirty.remove(DirtyFlags::NEEDS_RENDER);
        Ok(())
    }
}
