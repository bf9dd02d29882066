//! Events.
//!
//! The engine reports things that happen to a node (lifecycle changes, input, component
//! callbacks) by dispatching an event on it. Only nodes registered for an event type receive
//! it. Each type carries exactly one [`PayloadShape`], and some types let receivers write a
//! value back to the engine through a return channel.

mod dispatch;
mod input;

pub use dispatch::{Dispatch, EventReceiver, NodeEvent};
pub(crate) use dispatch::NodeEvents;
pub use input::{
    InputAction, InputEvent, KeyModifiers, Pointer, PointerDevice, SourceType, TouchTestInfo,
    TouchTestItem, TouchTestStrategy,
};

use crate::attribute::TaggedNumber;
use crate::kind::NodeKind;

/// The payload shapes an event can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    /// An array of tagged numbers.
    Numeric,
    /// A [`StringRecord`].
    Text,
    /// A raw [`InputEvent`].
    Input,
    /// [`TouchTestInfo`] for a custom child hit test.
    TouchTest,
}

/// List of event types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventType {
    Touch = 0,
    Appear = 1,
    Disappear = 2,
    AreaChange = 3,
    Focus = 4,
    Blur = 5,
    Click = 6,
    /// Return `[i32 mode]` to change how the touch is handled.
    TouchIntercept = 7,
    VisibleAreaChange = 8,
    Hover = 9,
    Mouse = 10,
    Attach = 11,
    Detach = 12,
    /// Return `[i32 strategy, i32 child index]`; see [`TouchTestStrategy`].
    ChildTouchTest = 13,
    PreDrag = 14,
    /// Return `[i32 allowed]`.
    DragStart = 15,

    TextDetectResultUpdate = 1000,

    TextInputChange = 7000,
    TextInputSubmit = 7001,
    TextInputPaste = 7002,
    /// Return `[i32 allowed]` to accept or veto the insertion.
    TextInputWillInsert = 7003,

    ToggleChange = 5000,
    CheckboxChange = 11000,
    SliderChange = 17000,

    ImageComplete = 4000,
    ImageError = 4001,

    Scroll = 21000,
    /// Return `[f32 offset]` to replace the offset the frame will scroll by.
    ScrollFrameBegin = 21001,
    /// Return `[f32 offset]` to adjust the offset about to be applied.
    WillScroll = 21002,
    ScrollReachStart = 21003,
    ScrollReachEnd = 21004,
    ScrollStart = 21005,
    ScrollStop = 21006,

    ListScrollIndex = 22000,
    RefreshStateChange = 28000,
    Refreshing = 28001,
    SwiperChange = 20000,
}

impl EventType {
    /// The one payload shape events of this type carry.
    pub fn payload_shape(self) -> PayloadShape {
        use EventType::*;
        match self {
            Touch | TouchIntercept | Mouse => PayloadShape::Input,
            ChildTouchTest => PayloadShape::TouchTest,
            TextDetectResultUpdate | TextInputChange | TextInputPaste | TextInputWillInsert => {
                PayloadShape::Text
            }
            _ => PayloadShape::Numeric,
        }
    }

    /// If true, receivers may write a return value.
    pub fn supports_return(self) -> bool {
        use EventType::*;
        match self {
            TouchIntercept | ChildTouchTest | DragStart | TextInputWillInsert
            | ScrollFrameBegin | WillScroll => true,
            _ => false,
        }
    }

    /// Returns true if nodes of this kind can be registered for the event type.
    pub fn applies_to(self, kind: NodeKind) -> bool {
        use EventType::*;
        match self {
            TextDetectResultUpdate => kind == NodeKind::Text,
            TextInputChange | TextInputSubmit | TextInputPaste | TextInputWillInsert => {
                kind == NodeKind::TextInput || kind == NodeKind::TextArea
            }
            ToggleChange => kind == NodeKind::Toggle,
            CheckboxChange => kind == NodeKind::Checkbox,
            SliderChange => kind == NodeKind::Slider,
            ImageComplete | ImageError => kind == NodeKind::Image,
            Scroll | ScrollFrameBegin | WillScroll | ScrollReachStart | ScrollReachEnd
            | ScrollStart | ScrollStop => kind.is_scrollable() && kind != NodeKind::Swiper,
            ListScrollIndex => kind == NodeKind::List,
            RefreshStateChange | Refreshing => kind == NodeKind::Refresh,
            SwiperChange => kind == NodeKind::Swiper,
            ChildTouchTest => kind.accepts_children(),
            _ => true,
        }
    }
}

/// A string-pair-plus-number record, used by text events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringRecord {
    /// The main text (inserted text, current value, detection result...).
    pub text: String,
    /// Secondary text, if the event type has one.
    pub extra: Option<String>,
    /// An associated number, such as an insertion offset.
    pub number: i32,
}

impl StringRecord {
    pub fn new<S: Into<String>>(text: S) -> StringRecord {
        StringRecord {
            text: text.into(),
            ..StringRecord::default()
        }
    }
}

/// The payload the engine delivers with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    Numeric(Vec<TaggedNumber>),
    Text(StringRecord),
    Input(InputEvent),
    TouchTest(TouchTestInfo),
}

impl EventPayload {
    pub fn shape(&self) -> PayloadShape {
        match self {
            EventPayload::Numeric(_) => PayloadShape::Numeric,
            EventPayload::Text(_) => PayloadShape::Text,
            EventPayload::Input(_) => PayloadShape::Input,
            EventPayload::TouchTest(_) => PayloadShape::TouchTest,
        }
    }
}

#[test]
fn test_event_classes() {
    assert_eq!(EventType::Click.payload_shape(), PayloadShape::Numeric);
    assert_eq!(EventType::Touch.payload_shape(), PayloadShape::Input);
    assert_eq!(EventType::TextInputWillInsert.payload_shape(), PayloadShape::Text);
    assert!(EventType::DragStart.supports_return());
    assert!(!EventType::Click.supports_return());
    assert!(EventType::ToggleChange.applies_to(NodeKind::Toggle));
    assert!(!EventType::ToggleChange.applies_to(NodeKind::Slider));
    assert!(EventType::Scroll.applies_to(NodeKind::List));
    assert!(EventType::Click.applies_to(NodeKind::Image));
}
