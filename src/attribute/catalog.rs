//! The attribute contract catalog.

use super::contract::{Check, Contract, Encoding, Numbers, Scope, Slot};
use super::{AttributeKind, NumberKind, TaggedNumber};
use crate::error::{Error, Result};
use crate::kind::NodeKind;
use crate::tree::DirtyFlags;
use std::collections::HashMap;

/// Versioned, append-only table of attribute contracts.
///
/// The codec consults the catalog for every `set`. Entries can be added at runtime for kinds the
/// host engine knows about; existing ids can never be replaced.
#[derive(Debug, Clone)]
pub struct Catalog {
    version: u32,
    contracts: HashMap<AttributeKind, Contract>,
}

impl Catalog {
    /// An empty catalog at version 0.
    pub fn empty() -> Catalog {
        Catalog {
            version: 0,
            contracts: HashMap::new(),
        }
    }

    /// The built-in catalog.
    pub fn builtin() -> Catalog {
        Catalog {
            version: 1,
            contracts: BUILTIN.iter().copied().collect(),
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }

    pub fn contract(&self, kind: AttributeKind) -> Option<&Contract> {
        self.contracts.get(&kind)
    }

    /// Appends a contract. Fails if the id is already taken.
    pub fn register(&mut self, kind: AttributeKind, contract: Contract) -> Result<()> {
        if self.contracts.contains_key(&kind) {
            return Err(Error::InvalidParameter("attribute kind id already registered"));
        }
        if contract.encodings.is_empty() {
            return Err(Error::InvalidParameter("contract has no encodings"));
        }
        self.contracts.insert(kind, contract);
        self.version += 1;
        tracing::debug!(?kind, version = self.version, "registered attribute contract");
        Ok(())
    }

    pub(crate) fn builtin_name(kind: AttributeKind) -> Option<&'static str> {
        BUILTIN
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, contract)| contract.name)
    }
}

impl Default for Catalog {
    fn default() -> Catalog {
        Catalog::builtin()
    }
}

impl AttributeKind {
    pub const WIDTH: AttributeKind = AttributeKind(0);
    pub const HEIGHT: AttributeKind = AttributeKind(1);
    pub const BACKGROUND_COLOR: AttributeKind = AttributeKind(2);
    pub const BACKGROUND_IMAGE: AttributeKind = AttributeKind(3);
    pub const PADDING: AttributeKind = AttributeKind(4);
    pub const ID: AttributeKind = AttributeKind(5);
    pub const ENABLED: AttributeKind = AttributeKind(6);
    pub const MARGIN: AttributeKind = AttributeKind(7);
    pub const TRANSLATE: AttributeKind = AttributeKind(8);
    pub const SCALE: AttributeKind = AttributeKind(9);
    pub const ROTATE: AttributeKind = AttributeKind(10);
    pub const BORDER_WIDTH: AttributeKind = AttributeKind(13);
    pub const BORDER_RADIUS: AttributeKind = AttributeKind(14);
    pub const BORDER_COLOR: AttributeKind = AttributeKind(15);
    pub const BORDER_STYLE: AttributeKind = AttributeKind(16);
    pub const Z_INDEX: AttributeKind = AttributeKind(17);
    pub const VISIBILITY: AttributeKind = AttributeKind(18);
    pub const CLIP: AttributeKind = AttributeKind(19);
    pub const OPACITY: AttributeKind = AttributeKind(21);
    pub const POSITION: AttributeKind = AttributeKind(26);
    pub const ALIGNMENT: AttributeKind = AttributeKind(37);
    pub const ASPECT_RATIO: AttributeKind = AttributeKind(56);
    pub const LAYOUT_WEIGHT: AttributeKind = AttributeKind(57);
    pub const CONSTRAINT_SIZE: AttributeKind = AttributeKind(59);

    pub const TEXT_CONTENT: AttributeKind = AttributeKind(1000);
    pub const FONT_COLOR: AttributeKind = AttributeKind(1001);
    pub const FONT_SIZE: AttributeKind = AttributeKind(1002);
    pub const FONT_STYLE: AttributeKind = AttributeKind(1003);
    pub const FONT_WEIGHT: AttributeKind = AttributeKind(1004);
    pub const LINE_HEIGHT: AttributeKind = AttributeKind(1005);
    pub const TEXT_DECORATION: AttributeKind = AttributeKind(1006);
    pub const TEXT_ALIGN: AttributeKind = AttributeKind(1010);
    pub const MAX_LINES: AttributeKind = AttributeKind(1012);
    pub const FONT_FAMILY: AttributeKind = AttributeKind(1015);
    pub const TEXT_FONT: AttributeKind = AttributeKind(1018);

    pub const IMAGE_SRC: AttributeKind = AttributeKind(4000);
    pub const IMAGE_OBJECT_FIT: AttributeKind = AttributeKind(4001);
    pub const IMAGE_ALT: AttributeKind = AttributeKind(4005);

    pub const TOGGLE_SELECTED_COLOR: AttributeKind = AttributeKind(5000);
    pub const TOGGLE_VALUE: AttributeKind = AttributeKind(5002);

    pub const TEXT_INPUT_PLACEHOLDER: AttributeKind = AttributeKind(7000);
    pub const TEXT_INPUT_TEXT: AttributeKind = AttributeKind(7001);
    pub const TEXT_INPUT_CARET_COLOR: AttributeKind = AttributeKind(7002);

    pub const XCOMPONENT_ID: AttributeKind = AttributeKind(12000);
    pub const XCOMPONENT_SURFACE_SIZE: AttributeKind = AttributeKind(12002);

    pub const SLIDER_VALUE: AttributeKind = AttributeKind(17004);
    pub const SLIDER_MIN_VALUE: AttributeKind = AttributeKind(17005);
    pub const SLIDER_MAX_VALUE: AttributeKind = AttributeKind(17006);
    pub const SLIDER_STEP: AttributeKind = AttributeKind(17007);

    pub const STACK_ALIGN_CONTENT: AttributeKind = AttributeKind(19000);

    pub const SWIPER_NODE_ADAPTER: AttributeKind = AttributeKind(20017);

    pub const SCROLL_BAR_DISPLAY_MODE: AttributeKind = AttributeKind(21000);
    pub const SCROLL_FRICTION: AttributeKind = AttributeKind(21006);
    pub const SCROLL_OFFSET: AttributeKind = AttributeKind(21010);

    pub const LIST_DIRECTION: AttributeKind = AttributeKind(22000);
    pub const LIST_SPACE: AttributeKind = AttributeKind(22003);
    pub const LIST_NODE_ADAPTER: AttributeKind = AttributeKind(22004);
    pub const LIST_CACHED_COUNT: AttributeKind = AttributeKind(22005);

    pub const COLUMN_ALIGN_ITEMS: AttributeKind = AttributeKind(25000);
    pub const COLUMN_JUSTIFY_CONTENT: AttributeKind = AttributeKind(25001);
    pub const ROW_ALIGN_ITEMS: AttributeKind = AttributeKind(26000);
    pub const ROW_JUSTIFY_CONTENT: AttributeKind = AttributeKind(26001);

    pub const WATER_FLOW_NODE_ADAPTER: AttributeKind = AttributeKind(29004);
    pub const GRID_NODE_ADAPTER: AttributeKind = AttributeKind(32007);

    /// True for the attributes that bind a node adapter to a container.
    pub fn is_node_adapter(self) -> bool {
        self == AttributeKind::LIST_NODE_ADAPTER
            || self == AttributeKind::GRID_NODE_ADAPTER
            || self == AttributeKind::WATER_FLOW_NODE_ADAPTER
            || self == AttributeKind::SWIPER_NODE_ADAPTER
    }
}

const ALL: DirtyFlags = DirtyFlags::all();
const RENDER: DirtyFlags = DirtyFlags::NEEDS_RENDER;
const LAYOUT: DirtyFlags = DirtyFlags::NEEDS_LAYOUT.union(DirtyFlags::NEEDS_RENDER);
const NONE: DirtyFlags = DirtyFlags::empty();

const fn f32_slot(check: Check) -> Slot {
    Slot::required(NumberKind::F32, check)
}
const fn i32_slot(check: Check) -> Slot {
    Slot::required(NumberKind::I32, check)
}
const fn u32_slot() -> Slot {
    Slot::required(NumberKind::U32, Check::Any)
}

const LENGTH: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[f32_slot(
    Check::NonNegative,
)]))];
const POSITIVE: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[f32_slot(Check::Positive)]))];
const ANY_F32: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[f32_slot(Check::Any)]))];
const COLOR: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[u32_slot()]))];
const BOOL: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[int_range(1)]))];
const STRING: &[Encoding] = &[Encoding::string()];
const SOURCE: &[Encoding] = &[Encoding::string(), Encoding::object()];
const ADAPTER: &[Encoding] = &[Encoding::object()];

const fn int_range(max: i32) -> Slot {
    i32_slot(Check::IntRange(0, max))
}

const ENUM_2: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[int_range(2)]))];
const ENUM_3: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[int_range(3)]))];
const ENUM_6: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[int_range(6)]))];
const ENUM_8: &[Encoding] = &[Encoding::numbers(Numbers::Slots(&[int_range(8)]))];

const EDGE_LENGTHS: &[Encoding] = &[Encoding::numbers(Numbers::Edges(f32_slot(
    Check::NonNegative,
)))];
const EDGE_OFFSETS: &[Encoding] = &[Encoding::numbers(Numbers::Edges(f32_slot(Check::Any)))];
const EDGE_COLORS: &[Encoding] = &[Encoding::numbers(Numbers::Edges(u32_slot()))];
const EDGE_STYLES: &[Encoding] = &[Encoding::numbers(Numbers::Edges(int_range(2)))];

const TEXTUAL: Scope = Scope::Only(&[
    NodeKind::Text,
    NodeKind::Span,
    NodeKind::TextInput,
    NodeKind::TextArea,
    NodeKind::Button,
]);
const TEXT_ONLY: Scope = Scope::Only(&[NodeKind::Text, NodeKind::Span]);
const IMAGES: Scope = Scope::Only(&[NodeKind::Image, NodeKind::ImageSpan]);
const SCROLLABLE: Scope = Scope::Only(&[
    NodeKind::Scroll,
    NodeKind::List,
    NodeKind::Grid,
    NodeKind::WaterFlow,
]);
const INPUTS: Scope = Scope::Only(&[NodeKind::TextInput, NodeKind::TextArea]);

const fn contract(
    name: &'static str,
    encodings: &'static [Encoding],
    dirty: DirtyFlags,
    scope: Scope,
) -> Contract {
    Contract {
        name,
        encodings,
        dirty,
        scope,
    }
}

const BUILTIN: &[(AttributeKind, Contract)] = &[
    (AttributeKind::WIDTH, contract("WIDTH", LENGTH, ALL, Scope::Common)),
    (AttributeKind::HEIGHT, contract("HEIGHT", LENGTH, ALL, Scope::Common)),
    (
        AttributeKind::BACKGROUND_COLOR,
        contract("BACKGROUND_COLOR", COLOR, RENDER, Scope::Common),
    ),
    (
        AttributeKind::BACKGROUND_IMAGE,
        contract(
            "BACKGROUND_IMAGE",
            &[
                Encoding {
                    numbers: Numbers::Slots(&[Slot::optional(
                        NumberKind::I32,
                        Check::IntRange(0, 3),
                        TaggedNumber::I32(0),
                    )]),
                    string: super::Presence::Required,
                    object: super::Presence::Forbidden,
                },
                Encoding {
                    numbers: Numbers::Slots(&[Slot::optional(
                        NumberKind::I32,
                        Check::IntRange(0, 3),
                        TaggedNumber::I32(0),
                    )]),
                    string: super::Presence::Forbidden,
                    object: super::Presence::Required,
                },
            ],
            RENDER,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::PADDING,
        contract("PADDING", EDGE_LENGTHS, ALL, Scope::Common),
    ),
    (AttributeKind::ID, contract("ID", STRING, NONE, Scope::Common)),
    (AttributeKind::ENABLED, contract("ENABLED", BOOL, RENDER, Scope::Common)),
    (
        AttributeKind::MARGIN,
        contract("MARGIN", EDGE_OFFSETS, ALL, Scope::Common),
    ),
    (
        AttributeKind::TRANSLATE,
        contract(
            "TRANSLATE",
            &[Encoding::numbers(Numbers::Slots(&[
                f32_slot(Check::Any),
                Slot::optional(NumberKind::F32, Check::Any, TaggedNumber::F32(0.)),
                Slot::optional(NumberKind::F32, Check::Any, TaggedNumber::F32(0.)),
            ]))],
            RENDER,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::SCALE,
        contract(
            "SCALE",
            &[Encoding::numbers(Numbers::Slots(&[
                f32_slot(Check::Any),
                Slot::optional(NumberKind::F32, Check::Any, TaggedNumber::F32(1.)),
            ]))],
            RENDER,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::ROTATE,
        contract(
            "ROTATE",
            &[Encoding::numbers(Numbers::Slots(&[
                f32_slot(Check::Any),
                f32_slot(Check::Any),
                f32_slot(Check::Any),
                f32_slot(Check::Any),
                Slot::optional(NumberKind::F32, Check::Any, TaggedNumber::F32(0.)),
            ]))],
            RENDER,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::BORDER_WIDTH,
        contract("BORDER_WIDTH", EDGE_LENGTHS, ALL, Scope::Common),
    ),
    (
        AttributeKind::BORDER_RADIUS,
        contract("BORDER_RADIUS", EDGE_LENGTHS, RENDER, Scope::Common),
    ),
    (
        AttributeKind::BORDER_COLOR,
        contract("BORDER_COLOR", EDGE_COLORS, RENDER, Scope::Common),
    ),
    (
        AttributeKind::BORDER_STYLE,
        contract(
            "BORDER_STYLE",
            EDGE_STYLES,
            RENDER,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::Z_INDEX,
        contract(
            "Z_INDEX",
            &[Encoding::numbers(Numbers::Slots(&[i32_slot(Check::Any)]))],
            RENDER,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::VISIBILITY,
        contract("VISIBILITY", ENUM_2, ALL, Scope::Common),
    ),
    (AttributeKind::CLIP, contract("CLIP", BOOL, RENDER, Scope::Common)),
    (
        AttributeKind::OPACITY,
        contract(
            "OPACITY",
            &[Encoding::numbers(Numbers::Slots(&[f32_slot(Check::Range(0., 1.))]))],
            RENDER,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::POSITION,
        contract(
            "POSITION",
            &[Encoding::numbers(Numbers::Slots(&[
                f32_slot(Check::Any),
                f32_slot(Check::Any),
            ]))],
            LAYOUT,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::ALIGNMENT,
        contract("ALIGNMENT", ENUM_8, LAYOUT, Scope::Common),
    ),
    (
        AttributeKind::ASPECT_RATIO,
        contract("ASPECT_RATIO", POSITIVE, ALL, Scope::Common),
    ),
    (
        AttributeKind::LAYOUT_WEIGHT,
        contract("LAYOUT_WEIGHT", LENGTH, ALL, Scope::Common),
    ),
    (
        AttributeKind::CONSTRAINT_SIZE,
        contract(
            "CONSTRAINT_SIZE",
            &[Encoding::numbers(Numbers::Slots(&[
                f32_slot(Check::NonNegative),
                f32_slot(Check::NonNegative),
                f32_slot(Check::NonNegative),
                f32_slot(Check::NonNegative),
            ]))],
            ALL,
            Scope::Common,
        ),
    ),
    (
        AttributeKind::TEXT_CONTENT,
        contract("TEXT_CONTENT", STRING, ALL, TEXT_ONLY),
    ),
    (AttributeKind::FONT_COLOR, contract("FONT_COLOR", COLOR, RENDER, TEXTUAL)),
    (AttributeKind::FONT_SIZE, contract("FONT_SIZE", POSITIVE, ALL, TEXTUAL)),
    (AttributeKind::FONT_STYLE, contract("FONT_STYLE", BOOL, ALL, TEXTUAL)),
    (
        AttributeKind::FONT_WEIGHT,
        contract(
            "FONT_WEIGHT",
            &[Encoding::numbers(Numbers::Slots(&[i32_slot(Check::IntRange(0, 12))]))],
            ALL,
            TEXTUAL,
        ),
    ),
    (AttributeKind::LINE_HEIGHT, contract("LINE_HEIGHT", LENGTH, ALL, TEXT_ONLY)),
    (
        AttributeKind::TEXT_DECORATION,
        contract(
            "TEXT_DECORATION",
            &[Encoding::numbers(Numbers::Slots(&[
                i32_slot(Check::IntRange(0, 3)),
                Slot::optional(NumberKind::U32, Check::Any, TaggedNumber::U32(0xff00_0000)),
                Slot::optional(NumberKind::I32, Check::IntRange(0, 4), TaggedNumber::I32(0)),
            ]))],
            RENDER,
            TEXT_ONLY,
        ),
    ),
    (
        AttributeKind::TEXT_ALIGN,
        contract("TEXT_ALIGN", ENUM_3, LAYOUT, TEXTUAL),
    ),
    (
        AttributeKind::MAX_LINES,
        contract(
            "MAX_LINES",
            &[Encoding::numbers(Numbers::Slots(&[i32_slot(Check::IntRange(
                0,
                i32::MAX,
            ))]))],
            ALL,
            TEXT_ONLY,
        ),
    ),
    (AttributeKind::FONT_FAMILY, contract("FONT_FAMILY", STRING, ALL, TEXTUAL)),
    (
        AttributeKind::TEXT_FONT,
        contract(
            "TEXT_FONT",
            &[Encoding {
                numbers: Numbers::Slots(&[
                    f32_slot(Check::Positive),
                    Slot::optional(NumberKind::I32, Check::IntRange(0, 12), TaggedNumber::I32(10)),
                    Slot::optional(NumberKind::I32, Check::IntRange(0, 1), TaggedNumber::I32(0)),
                ]),
                string: super::Presence::Optional,
                object: super::Presence::Forbidden,
            }],
            ALL,
            TEXTUAL,
        ),
    ),
    (AttributeKind::IMAGE_SRC, contract("IMAGE_SRC", SOURCE, ALL, IMAGES)),
    (
        AttributeKind::IMAGE_OBJECT_FIT,
        contract("IMAGE_OBJECT_FIT", ENUM_6, LAYOUT, IMAGES),
    ),
    (AttributeKind::IMAGE_ALT, contract("IMAGE_ALT", SOURCE, RENDER, IMAGES)),
    (
        AttributeKind::TOGGLE_SELECTED_COLOR,
        contract(
            "TOGGLE_SELECTED_COLOR",
            COLOR,
            RENDER,
            Scope::Only(&[NodeKind::Toggle]),
        ),
    ),
    (
        AttributeKind::TOGGLE_VALUE,
        contract("TOGGLE_VALUE", BOOL, RENDER, Scope::Only(&[NodeKind::Toggle])),
    ),
    (
        AttributeKind::TEXT_INPUT_PLACEHOLDER,
        contract("TEXT_INPUT_PLACEHOLDER", STRING, ALL, INPUTS),
    ),
    (
        AttributeKind::TEXT_INPUT_TEXT,
        contract("TEXT_INPUT_TEXT", STRING, ALL, INPUTS),
    ),
    (
        AttributeKind::TEXT_INPUT_CARET_COLOR,
        contract("TEXT_INPUT_CARET_COLOR", COLOR, RENDER, INPUTS),
    ),
    (
        AttributeKind::XCOMPONENT_ID,
        contract("XCOMPONENT_ID", STRING, NONE, Scope::Only(&[NodeKind::XComponent])),
    ),
    (
        AttributeKind::XCOMPONENT_SURFACE_SIZE,
        contract(
            "XCOMPONENT_SURFACE_SIZE",
            &[Encoding::numbers(Numbers::Slots(&[u32_slot(), u32_slot()]))],
            ALL,
            Scope::Only(&[NodeKind::XComponent]),
        ),
    ),
    (
        AttributeKind::SLIDER_VALUE,
        contract("SLIDER_VALUE", ANY_F32, RENDER, Scope::Only(&[NodeKind::Slider])),
    ),
    (
        AttributeKind::SLIDER_MIN_VALUE,
        contract("SLIDER_MIN_VALUE", ANY_F32, RENDER, Scope::Only(&[NodeKind::Slider])),
    ),
    (
        AttributeKind::SLIDER_MAX_VALUE,
        contract("SLIDER_MAX_VALUE", ANY_F32, RENDER, Scope::Only(&[NodeKind::Slider])),
    ),
    (
        AttributeKind::SLIDER_STEP,
        contract("SLIDER_STEP", POSITIVE, RENDER, Scope::Only(&[NodeKind::Slider])),
    ),
    (
        AttributeKind::STACK_ALIGN_CONTENT,
        contract(
            "STACK_ALIGN_CONTENT",
            ENUM_8,
            LAYOUT,
            Scope::Only(&[NodeKind::Stack]),
        ),
    ),
    (
        AttributeKind::SWIPER_NODE_ADAPTER,
        contract("SWIPER_NODE_ADAPTER", ADAPTER, ALL, Scope::Only(&[NodeKind::Swiper])),
    ),
    (
        AttributeKind::SCROLL_BAR_DISPLAY_MODE,
        contract("SCROLL_BAR_DISPLAY_MODE", ENUM_2, RENDER, SCROLLABLE),
    ),
    (
        AttributeKind::SCROLL_FRICTION,
        contract("SCROLL_FRICTION", LENGTH, NONE, SCROLLABLE),
    ),
    (
        AttributeKind::SCROLL_OFFSET,
        contract(
            "SCROLL_OFFSET",
            &[Encoding::numbers(Numbers::Slots(&[
                f32_slot(Check::Any),
                f32_slot(Check::Any),
                Slot::optional(NumberKind::I32, Check::IntRange(0, i32::MAX), TaggedNumber::I32(0)),
                Slot::optional(NumberKind::I32, Check::IntRange(0, 12), TaggedNumber::I32(0)),
                Slot::optional(NumberKind::I32, Check::IntRange(0, 1), TaggedNumber::I32(0)),
            ]))],
            LAYOUT,
            SCROLLABLE,
        ),
    ),
    (
        AttributeKind::LIST_DIRECTION,
        contract("LIST_DIRECTION", BOOL, ALL, Scope::Only(&[NodeKind::List])),
    ),
    (
        AttributeKind::LIST_SPACE,
        contract("LIST_SPACE", LENGTH, ALL, Scope::Only(&[NodeKind::List])),
    ),
    (
        AttributeKind::LIST_NODE_ADAPTER,
        contract("LIST_NODE_ADAPTER", ADAPTER, ALL, Scope::Only(&[NodeKind::List])),
    ),
    (
        AttributeKind::LIST_CACHED_COUNT,
        contract(
            "LIST_CACHED_COUNT",
            &[Encoding::numbers(Numbers::Slots(&[i32_slot(Check::IntRange(
                0,
                i32::MAX,
            ))]))],
            LAYOUT,
            Scope::Only(&[NodeKind::List]),
        ),
    ),
    (
        AttributeKind::COLUMN_ALIGN_ITEMS,
        contract("COLUMN_ALIGN_ITEMS", ENUM_2, LAYOUT, Scope::Only(&[NodeKind::Column])),
    ),
    (
        AttributeKind::COLUMN_JUSTIFY_CONTENT,
        contract(
            "COLUMN_JUSTIFY_CONTENT",
            ENUM_6,
            LAYOUT,
            Scope::Only(&[NodeKind::Column]),
        ),
    ),
    (
        AttributeKind::ROW_ALIGN_ITEMS,
        contract("ROW_ALIGN_ITEMS", ENUM_2, LAYOUT, Scope::Only(&[NodeKind::Row])),
    ),
    (
        AttributeKind::ROW_JUSTIFY_CONTENT,
        contract("ROW_JUSTIFY_CONTENT", ENUM_6, LAYOUT, Scope::Only(&[NodeKind::Row])),
    ),
    (
        AttributeKind::WATER_FLOW_NODE_ADAPTER,
        contract(
            "WATER_FLOW_NODE_ADAPTER",
            ADAPTER,
            ALL,
            Scope::Only(&[NodeKind::WaterFlow]),
        ),
    ),
    (
        AttributeKind::GRID_NODE_ADAPTER,
        contract("GRID_NODE_ADAPTER", ADAPTER, ALL, Scope::Only(&[NodeKind::Grid])),
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_are_unique() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), BUILTIN.len(), "duplicate id in the built-in table");
    }

    #[test]
    fn register_is_append_only() {
        let mut catalog = Catalog::builtin();
        let version = catalog.version();
        let custom = AttributeKind(90_000);
        let contract = contract("CUSTOM_GLOW", COLOR, RENDER, Scope::Common);
        catalog.register(custom, contract).unwrap();
        assert_eq!(catalog.version(), version + 1);
        assert!(
            catalog.register(AttributeKind::WIDTH, contract).is_err(),
            "existing ids must never be replaced"
        );
        assert_eq!(catalog.contract(AttributeKind::WIDTH).unwrap().name, "WIDTH");
    }

    #[test]
    fn debug_uses_catalog_names() {
        assert_eq!(format!("{:?}", AttributeKind::PADDING), "PADDING");
        assert_eq!(format!("{:?}", AttributeKind(424_242)), "AttributeKind(424242)");
    }
}
