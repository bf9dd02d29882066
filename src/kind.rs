/// Node kinds.
///
/// The kind is fixed when a node is created. Everything except `Custom` is laid out and drawn
/// by the engine's built-in implementation; `Custom` nodes rely on a
/// [`CustomLayout`](crate::CustomLayout) delegate.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    Custom = 0,
    Text = 1,
    Span = 2,
    ImageSpan = 3,
    Image = 4,
    Toggle = 5,
    LoadingProgress = 6,
    TextInput = 7,
    TextArea = 8,
    Button = 9,
    Progress = 10,
    Checkbox = 11,
    XComponent = 12,
    DatePicker = 13,
    TimePicker = 14,
    TextPicker = 15,
    CalendarPicker = 16,
    Slider = 17,
    Radio = 18,
    Stack = 19,
    Swiper = 20,
    Scroll = 21,
    List = 22,
    ListItem = 23,
    ListItemGroup = 24,
    Column = 25,
    Row = 26,
    Flex = 27,
    Refresh = 28,
    WaterFlow = 29,
    FlowItem = 30,
    RelativeContainer = 31,
    Grid = 32,
    GridItem = 33,
}

impl NodeKind {
    /// If false, the node never has structural children.
    pub fn accepts_children(self) -> bool {
        match self {
            NodeKind::Image
            | NodeKind::ImageSpan
            | NodeKind::Toggle
            | NodeKind::LoadingProgress
            | NodeKind::TextInput
            | NodeKind::TextArea
            | NodeKind::Progress
            | NodeKind::Checkbox
            | NodeKind::XComponent
            | NodeKind::DatePicker
            | NodeKind::TimePicker
            | NodeKind::TextPicker
            | NodeKind::CalendarPicker
            | NodeKind::Slider
            | NodeKind::Radio => false,
            _ => true,
        }
    }

    /// If true, the node scrolls its content and may be driven by a node adapter.
    pub fn is_scrollable(self) -> bool {
        match self {
            NodeKind::Scroll
            | NodeKind::List
            | NodeKind::Grid
            | NodeKind::WaterFlow
            | NodeKind::Swiper => true,
            _ => false,
        }
    }

    /// If true, a node adapter can supply this node's children.
    pub fn accepts_adapter(self) -> bool {
        self.is_scrollable() && self != NodeKind::Scroll
    }
}

#[test]
fn test_kind_classes() {
    assert!(NodeKind::Column.accepts_children());
    assert!(!NodeKind::Image.accepts_children());
    assert!(NodeKind::List.accepts_adapter());
    assert!(
        !NodeKind::Scroll.accepts_adapter(),
        "plain scroll containers have a single content child and no adapter"
    );
    assert!(!NodeKind::Stack.is_scrollable());
}
