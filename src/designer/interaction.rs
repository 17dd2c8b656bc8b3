//! Pointer, touch and keyboard handling for the designer canvas.
//!
//! [`InteractionMachine`] is a small state machine over the field model.
//! Every event returns the [`Effect`]s the host should act on; nothing is
//! rendered implicitly. All coordinates are canvas pixels relative to the
//! canvas's top-left corner.

use super::kinds::FieldKind;
use super::model::{FieldId, FieldModel};
use crate::config::DesignerConfig;
use crate::error::Result;
use crate::geometry::{clamp_span, Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// One of the eight resize handles around a selected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top-left corner
    Nw,
    /// Top edge
    N,
    /// Top-right corner
    Ne,
    /// Right edge
    E,
    /// Bottom-right corner
    Se,
    /// Bottom edge
    S,
    /// Bottom-left corner
    Sw,
    /// Left edge
    W,
}

impl Handle {
    /// All handles, clockwise from the top-left corner.
    pub const ALL: [Handle; 8] = [
        Handle::Nw,
        Handle::N,
        Handle::Ne,
        Handle::E,
        Handle::Se,
        Handle::S,
        Handle::Sw,
        Handle::W,
    ];

    fn moves_north(self) -> bool {
        matches!(self, Handle::Nw | Handle::N | Handle::Ne)
    }

    fn moves_south(self) -> bool {
        matches!(self, Handle::Sw | Handle::S | Handle::Se)
    }

    fn moves_east(self) -> bool {
        matches!(self, Handle::Ne | Handle::E | Handle::Se)
    }

    fn moves_west(self) -> bool {
        matches!(self, Handle::Nw | Handle::W | Handle::Sw)
    }

    /// Apply a pointer displacement to the geometry captured when the
    /// resize started.
    ///
    /// Trailing edges (`e`, `s`) grow the box; leading edges (`w`, `n`)
    /// shrink it and move the origin so the opposite edge stays put. Sizes
    /// never drop below `min`.
    pub fn resize(self, anchor: Rect, dx: f32, dy: f32, min: Size) -> Rect {
        let mut rect = anchor;
        if self.moves_east() {
            rect.width = (anchor.width + dx).max(min.width);
        }
        if self.moves_west() {
            rect.width = (anchor.width - dx).max(min.width);
            rect.x = anchor.x + (anchor.width - rect.width);
        }
        if self.moves_south() {
            rect.height = (anchor.height + dy).max(min.height);
        }
        if self.moves_north() {
            rect.height = (anchor.height - dy).max(min.height);
            rect.y = anchor.y + (anchor.height - rect.height);
        }
        rect
    }
}

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas
    Canvas,
    /// A field's body
    Field(FieldId),
    /// A resize handle of a field
    Handle(FieldId, Handle),
}

/// Keys the designer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Delete
    Delete,
    /// Backspace
    Backspace,
    /// Escape
    Escape,
    /// Anything else
    Other,
}

/// Work for the host after an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", content = "value", rename_all = "camelCase")]
pub enum Effect {
    /// Re-render this field's visual
    Render(FieldId),
    /// Remove this field's visual
    Remove(FieldId),
    /// The selection changed; refresh the property panel
    SelectionChanged(Option<FieldId>),
    /// The armed tool changed
    ToolChanged(Option<FieldKind>),
}

/// Current gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    /// Nothing in progress
    Idle,
    /// The next canvas click places a field of this kind
    ToolArmed(FieldKind),
    /// A field follows the pointer
    Dragging {
        /// Field being moved
        field: FieldId,
        /// Pointer position relative to the field origin
        grab: Point,
    },
    /// A field is being resized
    Resizing {
        /// Field being resized
        field: FieldId,
        /// Handle in use
        handle: Handle,
        /// Geometry when the resize started
        anchor: Rect,
        /// Pointer position when the resize started
        start: Point,
    },
}

#[derive(Debug, Clone, Copy)]
struct ToolTouch {
    kind: FieldKind,
    start: Point,
    dragging: bool,
}

/// The designer's interaction state machine.
#[derive(Debug, Clone)]
pub struct InteractionMachine {
    state: InteractionState,
    touch: Option<ToolTouch>,
    canvas: Size,
    placement_offset: Point,
    min_size: Size,
    touch_threshold: f32,
}

impl InteractionMachine {
    /// Create an idle machine with the configured constants.
    pub fn new(config: &DesignerConfig) -> Self {
        Self {
            state: InteractionState::Idle,
            touch: None,
            canvas: config.canvas,
            placement_offset: config.placement_offset,
            min_size: config.min_resize,
            touch_threshold: config.touch_drag_threshold,
        }
    }

    /// Current state.
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// The armed tool, if any.
    pub fn armed_tool(&self) -> Option<FieldKind> {
        match self.state {
            InteractionState::ToolArmed(kind) => Some(kind),
            _ => None,
        }
    }

    /// Return to idle, dropping any gesture.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
        self.touch = None;
    }

    /// A toolbar button was clicked: arm that tool, or disarm it if it was
    /// already armed.
    pub fn click_tool(&mut self, kind: FieldKind) -> Vec<Effect> {
        if self.armed_tool() == Some(kind) {
            self.state = InteractionState::Idle;
            vec![Effect::ToolChanged(None)]
        } else {
            self.state = InteractionState::ToolArmed(kind);
            vec![Effect::ToolChanged(Some(kind))]
        }
    }

    /// A click on empty canvas: place the armed tool, or deselect.
    pub fn click_canvas(&mut self, model: &mut FieldModel, at: Point, page: usize) -> Vec<Effect> {
        if let Some(kind) = self.armed_tool() {
            self.state = InteractionState::Idle;
            let id = self.place(model, kind, at, page);
            return vec![Effect::Render(id), Effect::ToolChanged(None)];
        }
        deselect(model)
    }

    /// A toolbar item was dragged and dropped on the canvas. Places a field
    /// whatever tool is armed.
    pub fn drop_tool(&mut self, model: &mut FieldModel, kind: FieldKind, at: Point, page: usize) -> Vec<Effect> {
        vec![Effect::Render(self.place(model, kind, at, page))]
    }

    /// A touch started on a toolbar item.
    pub fn touch_tool_start(&mut self, kind: FieldKind, at: Point) {
        self.touch = Some(ToolTouch {
            kind,
            start: at,
            dragging: false,
        });
    }

    /// The touch on a toolbar item moved. Becomes a drag once it travels
    /// past the threshold on either axis.
    pub fn touch_tool_move(&mut self, at: Point) {
        let threshold = self.touch_threshold;
        if let Some(touch) = self.touch.as_mut() {
            let (dx, dy) = at.delta_from(touch.start);
            if dx.abs() > threshold || dy.abs() > threshold {
                touch.dragging = true;
            }
        }
    }

    /// The touch on a toolbar item ended at `at`.
    ///
    /// A tap acts like a click on the tool. A drag that ends on the canvas
    /// places a field there; one that ends elsewhere does nothing.
    pub fn touch_tool_end(&mut self, model: &mut FieldModel, at: Point, page: usize) -> Vec<Effect> {
        let Some(touch) = self.touch.take() else {
            return Vec::new();
        };
        if !touch.dragging {
            return self.click_tool(touch.kind);
        }
        let canvas = Rect::new(0.0, 0.0, self.canvas.width, self.canvas.height);
        if canvas.contains(at) {
            vec![Effect::Render(self.place(model, touch.kind, at, page))]
        } else {
            Vec::new()
        }
    }

    /// Pointer (mouse or touch) pressed on a field or handle.
    ///
    /// Pressing a field selects it and starts a drag; pressing a handle
    /// starts a resize. A press on empty canvas is a no-op here; the click
    /// that follows is handled by [`InteractionMachine::click_canvas`].
    pub fn pointer_down(&mut self, model: &mut FieldModel, target: PointerTarget, at: Point) -> Result<Vec<Effect>> {
        let mut effects = Vec::new();
        match target {
            PointerTarget::Canvas => return Ok(effects),
            PointerTarget::Field(id) => {
                let rect = model.get(id)?.rect;
                effects.extend(select(model, id)?);
                if self.armed_tool().is_some() {
                    effects.push(Effect::ToolChanged(None));
                }
                self.state = InteractionState::Dragging {
                    field: id,
                    grab: Point::new(at.x - rect.x, at.y - rect.y),
                };
            },
            PointerTarget::Handle(id, handle) => {
                let anchor = model.get(id)?.rect;
                effects.extend(select(model, id)?);
                if self.armed_tool().is_some() {
                    effects.push(Effect::ToolChanged(None));
                }
                self.state = InteractionState::Resizing {
                    field: id,
                    handle,
                    anchor,
                    start: at,
                };
            },
        }
        Ok(effects)
    }

    /// Pointer moved. Updates the dragged or resized field synchronously.
    pub fn pointer_move(&mut self, model: &mut FieldModel, at: Point) -> Vec<Effect> {
        match self.state {
            InteractionState::Dragging { field, grab } => {
                let Ok(f) = model.get_mut(field) else {
                    self.state = InteractionState::Idle;
                    return Vec::new();
                };
                f.rect.x = clamp_span(at.x - grab.x, f.rect.width, self.canvas.width);
                f.rect.y = clamp_span(at.y - grab.y, f.rect.height, self.canvas.height);
                vec![Effect::Render(field)]
            },
            InteractionState::Resizing {
                field,
                handle,
                anchor,
                start,
            } => {
                let Ok(f) = model.get_mut(field) else {
                    self.state = InteractionState::Idle;
                    return Vec::new();
                };
                let (dx, dy) = at.delta_from(start);
                f.rect = handle.resize(anchor, dx, dy, self.min_size);
                vec![Effect::Render(field)]
            },
            _ => Vec::new(),
        }
    }

    /// Pointer released. Ends a drag or resize; the selection stays.
    pub fn pointer_up(&mut self) -> Vec<Effect> {
        if matches!(
            self.state,
            InteractionState::Dragging { .. } | InteractionState::Resizing { .. }
        ) {
            self.state = InteractionState::Idle;
        }
        Vec::new()
    }

    /// A key was pressed.
    pub fn key_down(&mut self, model: &mut FieldModel, key: Key) -> Vec<Effect> {
        match key {
            Key::Delete | Key::Backspace => {
                let Some(id) = model.selected_id() else {
                    return Vec::new();
                };
                if model.delete(id).is_err() {
                    return Vec::new();
                }
                if matches!(
                    self.state,
                    InteractionState::Dragging { field, .. } | InteractionState::Resizing { field, .. } if field == id
                ) {
                    self.state = InteractionState::Idle;
                }
                log::debug!("deleted {}", id);
                vec![Effect::Remove(id), Effect::SelectionChanged(None)]
            },
            Key::Escape if self.armed_tool().is_some() => {
                self.state = InteractionState::Idle;
                vec![Effect::ToolChanged(None)]
            },
            _ => Vec::new(),
        }
    }

    fn place(&self, model: &mut FieldModel, kind: FieldKind, at: Point, page: usize) -> FieldId {
        model.create(
            kind,
            at.x - self.placement_offset.x,
            at.y - self.placement_offset.y,
            page,
        )
    }
}

fn select(model: &mut FieldModel, id: FieldId) -> Result<Vec<Effect>> {
    let previous = model.selected_id();
    model.select(id)?;
    if previous == Some(id) {
        return Ok(Vec::new());
    }
    let mut effects = Vec::new();
    if let Some(prev) = previous {
        effects.push(Effect::Render(prev));
    }
    effects.push(Effect::Render(id));
    effects.push(Effect::SelectionChanged(Some(id)));
    Ok(effects)
}

fn deselect(model: &mut FieldModel) -> Vec<Effect> {
    match model.selected_id() {
        Some(prev) => {
            model.deselect();
            vec![Effect::Render(prev), Effect::SelectionChanged(None)]
        },
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (InteractionMachine, FieldModel) {
        let config = DesignerConfig::default();
        (InteractionMachine::new(&config), FieldModel::new(config.canvas))
    }

    #[test]
    fn test_tool_toggle_and_escape() {
        let (mut machine, mut model) = setup();
        assert_eq!(machine.click_tool(FieldKind::Text), vec![Effect::ToolChanged(Some(FieldKind::Text))]);
        assert_eq!(machine.click_tool(FieldKind::Text), vec![Effect::ToolChanged(None)]);
        machine.click_tool(FieldKind::Date);
        assert_eq!(machine.key_down(&mut model, Key::Escape), vec![Effect::ToolChanged(None)]);
        assert_eq!(machine.state(), InteractionState::Idle);
    }

    #[test]
    fn test_armed_click_places_with_offset() {
        let (mut machine, mut model) = setup();
        machine.click_tool(FieldKind::Text);
        let effects = machine.click_canvas(&mut model, Point::new(175.0, 115.0), 0);
        let field = &model.fields()[0];
        assert_eq!(effects, vec![Effect::Render(field.id), Effect::ToolChanged(None)]);
        assert_eq!(field.rect.origin(), Point::new(100.0, 100.0));
        assert_eq!(machine.state(), InteractionState::Idle);
    }

    #[test]
    fn test_unarmed_click_deselects() {
        let (mut machine, mut model) = setup();
        let id = model.create(FieldKind::Text, 0.0, 0.0, 0);
        model.select(id).unwrap();
        let effects = machine.click_canvas(&mut model, Point::new(500.0, 500.0), 0);
        assert_eq!(effects, vec![Effect::Render(id), Effect::SelectionChanged(None)]);
        assert!(!model.is_empty());
        assert!(model.selected().is_none());
    }

    #[test]
    fn test_drag_clamps_to_canvas() {
        let (mut machine, mut model) = setup();
        let id = model.create(FieldKind::Text, 100.0, 100.0, 0);
        machine
            .pointer_down(&mut model, PointerTarget::Field(id), Point::new(110.0, 105.0))
            .unwrap();
        assert_eq!(model.selected_id(), Some(id));

        machine.pointer_move(&mut model, Point::new(210.0, 305.0));
        assert_eq!(model.get(id).unwrap().rect.origin(), Point::new(200.0, 300.0));

        machine.pointer_move(&mut model, Point::new(5000.0, -50.0));
        assert_eq!(model.get(id).unwrap().rect.origin(), Point::new(816.0 - 150.0, 0.0));

        machine.pointer_up();
        assert_eq!(machine.state(), InteractionState::Idle);
        assert_eq!(model.selected_id(), Some(id));
    }

    #[test]
    fn test_west_resize_keeps_right_edge() {
        let (mut machine, mut model) = setup();
        let id = model.create(FieldKind::Text, 100.0, 100.0, 0);
        machine
            .pointer_down(&mut model, PointerTarget::Handle(id, Handle::W), Point::new(100.0, 115.0))
            .unwrap();
        machine.pointer_move(&mut model, Point::new(140.0, 130.0));
        let rect = model.get(id).unwrap().rect;
        assert_eq!(rect.width, 110.0);
        assert_eq!(rect.right(), 250.0);
        assert_eq!(rect.height, 30.0);

        machine.pointer_move(&mut model, Point::new(400.0, 115.0));
        let rect = model.get(id).unwrap().rect;
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.right(), 250.0);
    }

    #[test]
    fn test_corner_resize_floors() {
        let anchor = Rect::new(10.0, 10.0, 100.0, 40.0);
        let min = Size::new(50.0, 20.0);
        let rect = Handle::Nw.resize(anchor, 80.0, 80.0, min);
        assert_eq!(rect, Rect::new(60.0, 30.0, 50.0, 20.0));
        let rect = Handle::Se.resize(anchor, 15.0, -5.0, min);
        assert_eq!(rect, Rect::new(10.0, 10.0, 115.0, 35.0));
    }

    #[test]
    fn test_delete_key_removes_selected() {
        let (mut machine, mut model) = setup();
        let id = model.create(FieldKind::Checkbox, 0.0, 0.0, 0);
        assert!(machine.key_down(&mut model, Key::Delete).is_empty());
        model.select(id).unwrap();
        assert_eq!(
            machine.key_down(&mut model, Key::Backspace),
            vec![Effect::Remove(id), Effect::SelectionChanged(None)]
        );
        assert!(model.is_empty());
    }

    #[test]
    fn test_touch_tap_and_drag() {
        let (mut machine, mut model) = setup();
        machine.touch_tool_start(FieldKind::Radio, Point::new(5.0, 5.0));
        machine.touch_tool_move(Point::new(9.0, 9.0));
        assert_eq!(
            machine.touch_tool_end(&mut model, Point::new(9.0, 9.0), 0),
            vec![Effect::ToolChanged(Some(FieldKind::Radio))]
        );
        assert!(model.is_empty());

        machine.touch_tool_start(FieldKind::Radio, Point::new(5.0, 5.0));
        machine.touch_tool_move(Point::new(300.0, 300.0));
        let effects = machine.touch_tool_end(&mut model, Point::new(300.0, 300.0), 0);
        assert_eq!(effects.len(), 1);
        assert_eq!(model.fields()[0].rect.origin(), Point::new(225.0, 285.0));

        machine.touch_tool_start(FieldKind::Radio, Point::new(5.0, 5.0));
        machine.touch_tool_move(Point::new(300.0, 300.0));
        assert!(machine.touch_tool_end(&mut model, Point::new(-20.0, 300.0), 0).is_empty());
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_drop_ignores_armed_tool() {
        let (mut machine, mut model) = setup();
        machine.click_tool(FieldKind::Text);
        machine.drop_tool(&mut model, FieldKind::Image, Point::new(375.0, 215.0), 0);
        assert_eq!(model.fields()[0].kind(), FieldKind::Image);
        assert_eq!(machine.armed_tool(), Some(FieldKind::Text));
    }
}
