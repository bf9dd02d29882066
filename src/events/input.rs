//! Raw input payloads.

use crate::rect::Rect;
use cgmath::{Point2, Vector2};

/// The tool a pointer belongs to.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDevice {
    Unknown = 0,
    Finger = 1,
    /// Stylus. Pressure and tilt are reported if the hardware has them.
    Pen = 2,
    Mouse = 3,
    Touchpad = 4,
    Joystick = 5,
}

impl PointerDevice {
    /// If true, the tool can reliably hit small targets.
    pub fn is_precise(self) -> bool {
        match self {
            PointerDevice::Pen | PointerDevice::Mouse | PointerDevice::Touchpad => true,
            PointerDevice::Unknown | PointerDevice::Finger | PointerDevice::Joystick => false,
        }
    }
}

/// The hardware that produced an input event.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    Unknown = 0,
    Mouse = 1,
    TouchScreen = 2,
    Touchpad = 3,
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Down = 0,
    Up = 1,
    Move = 2,
    Cancel = 3,
    /// Pointer moved without contact (hover).
    Hover = 4,
    /// Axis (wheel or pinch) input; see [`InputEvent::scroll_delta`].
    Axis = 5,
}

/// One contact point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    /// Unique ID of the pointer, or zero. If nonzero, can be expected to stay stable for the
    /// whole gesture.
    pub id: u64,

    /// Location in the node's coordinate system.
    pub location: Point2<f32>,

    /// Location in the window coordinate system.
    pub window_location: Point2<f32>,

    /// Pointer pressure, between 0 and 1.
    pub pressure: f32,

    /// Stylus tilt around the X and Y axes, in degrees. Zero when upright or unsupported.
    pub tilt: Vector2<f32>,

    pub device: PointerDevice,
}

impl Pointer {
    /// A pointer with unit pressure and no tilt.
    pub fn new(id: u64, location: Point2<f32>, device: PointerDevice) -> Pointer {
        Pointer {
            id,
            location,
            window_location: location,
            pressure: 1.,
            tilt: Vector2::new(0., 0.),
            device,
        }
    }
}

/// Modifier key state.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyModifiers {
    /// Whether any shift key is pressed.
    pub shift: bool,

    /// Whether any control key is pressed.
    pub control: bool,

    /// Whether any option key or alt key is pressed.
    pub option: bool,

    /// Whether any command key or meta key is pressed.
    pub command: bool,
}

/// A raw input event, as delivered with `Touch`, `Mouse` and `TouchIntercept` events.
#[derive(Debug, Clone, PartialEq)]
pub struct InputEvent {
    pub action: InputAction,
    pub source: SourceType,
    /// All active pointers. The pointer that changed is at `changed_index`.
    pub pointers: Vec<Pointer>,
    pub changed_index: usize,
    pub modifiers: KeyModifiers,
    /// Event time in nanoseconds, on the engine's monotonic clock.
    pub timestamp: u64,
    /// Scroll delta in points for `Axis` actions.
    pub scroll_delta: Option<Vector2<f32>>,
}

impl InputEvent {
    pub fn new(action: InputAction, source: SourceType, pointers: Vec<Pointer>) -> InputEvent {
        InputEvent {
            action,
            source,
            pointers,
            changed_index: 0,
            modifiers: KeyModifiers::default(),
            timestamp: 0,
            scroll_delta: None,
        }
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }

    pub fn pointer(&self, index: usize) -> Option<&Pointer> {
        self.pointers.get(index)
    }

    /// The pointer whose change produced this event.
    pub fn changed_pointer(&self) -> Option<&Pointer> {
        self.pointers.get(self.changed_index)
    }

    /// Location of the changed pointer in the node's coordinate system.
    pub fn location(&self) -> Option<Point2<f32>> {
        self.changed_pointer().map(|p| p.location)
    }
}

/// How a custom child hit test resolved.
///
/// Written back through the return channel of a `ChildTouchTest` event as
/// `[i32 strategy, i32 child index]`.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchTestStrategy {
    /// Let the engine hit-test children as usual.
    Default = 0,
    /// Forward to the given child, which competes with its siblings.
    ForwardCompetition = 1,
    /// Forward to the given child only.
    Forward = 2,
}

/// One child candidate of a custom hit test.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchTestItem {
    /// The child's `ID` attribute, if set.
    pub id: Option<String>,
    /// The child's frame in the parent's coordinate system.
    pub frame: Rect,
}

/// Payload of `ChildTouchTest` events.
#[derive(Debug, Clone, PartialEq)]
pub struct TouchTestInfo {
    /// Touch location in the parent's coordinate system.
    pub location: Point2<f32>,
    pub items: Vec<TouchTestItem>,
}

impl TouchTestInfo {
    /// Index of the topmost (last) child whose frame contains the touch location.
    pub fn hit_child(&self) -> Option<usize> {
        self.items
            .iter()
            .rposition(|item| item.frame.contains(self.location))
    }
}
