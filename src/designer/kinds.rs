//! Field kinds and their per-kind defaults.
//!
//! Everything that differs between kinds at creation time lives in one
//! table indexed by [`FieldKind`], so adding a kind means adding a row here
//! plus the match arms the compiler then asks for.

use super::model::{
    ButtonAction, ButtonAttributes, CheckAttributes, ChoiceAttributes, DateAttributes,
    FieldAttributes, ImageAttributes, RadioAttributes, TextAttributes, TextStyle,
    VisibilityAction,
};
use crate::error::{Error, Result};
use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of placeable field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Single or multi-line text input
    Text,
    /// On/off box
    Checkbox,
    /// One option of a named group
    Radio,
    /// Combo box
    Dropdown,
    /// List box
    Optionlist,
    /// Push button with an action
    Button,
    /// Digital signature placeholder
    Signature,
    /// Text input with date formatting
    Date,
    /// Button that imports an image as its face
    Image,
}

/// Creation-time description of a kind.
#[derive(Debug)]
pub struct KindSpec {
    /// The kind this row describes
    pub kind: FieldKind,
    /// Lowercase tag used in events and serialized models
    pub tag: &'static str,
    /// Prefix of auto-generated names (`Text_1`)
    pub name_prefix: &'static str,
    /// Size in canvas pixels when placed
    pub size: Size,
    /// Designer background tint
    pub tint: &'static str,
    defaults: fn() -> FieldAttributes,
}

const SMALL: Size = Size {
    width: 30.0,
    height: 30.0,
};
const WIDE: Size = Size {
    width: 150.0,
    height: 30.0,
};

static KINDS: [KindSpec; 9] = [
    KindSpec {
        kind: FieldKind::Text,
        tag: "text",
        name_prefix: "Text",
        size: WIDE,
        tint: "#eef2ff",
        defaults: || FieldAttributes::Text(TextAttributes::default()),
    },
    KindSpec {
        kind: FieldKind::Checkbox,
        tag: "checkbox",
        name_prefix: "Checkbox",
        size: SMALL,
        tint: "#eef2ff",
        defaults: || FieldAttributes::Checkbox(CheckAttributes::default()),
    },
    KindSpec {
        kind: FieldKind::Radio,
        tag: "radio",
        name_prefix: "Radio",
        size: SMALL,
        tint: "#eef2ff",
        defaults: || FieldAttributes::Radio(RadioAttributes::default()),
    },
    KindSpec {
        kind: FieldKind::Dropdown,
        tag: "dropdown",
        name_prefix: "Dropdown",
        size: WIDE,
        tint: "#e6f0ff",
        defaults: || FieldAttributes::Dropdown(ChoiceAttributes::default()),
    },
    KindSpec {
        kind: FieldKind::Optionlist,
        tag: "optionlist",
        name_prefix: "Optionlist",
        size: WIDE,
        tint: "#ffffff",
        defaults: || FieldAttributes::Optionlist(ChoiceAttributes::default()),
    },
    KindSpec {
        kind: FieldKind::Button,
        tag: "button",
        name_prefix: "Button",
        size: WIDE,
        tint: "#e5e7eb",
        defaults: || {
            FieldAttributes::Button(ButtonAttributes {
                label: "Button".to_string(),
                action: ButtonAction::None,
                action_url: String::new(),
                js_script: r#"app.alert("Hello World!");"#.to_string(),
                target_field_name: String::new(),
                visibility_action: VisibilityAction::Toggle,
                style: TextStyle::default(),
            })
        },
    },
    KindSpec {
        kind: FieldKind::Signature,
        tag: "signature",
        name_prefix: "Signature",
        size: WIDE,
        tint: "#f9fafb",
        defaults: || FieldAttributes::Signature,
    },
    KindSpec {
        kind: FieldKind::Date,
        tag: "date",
        name_prefix: "Date",
        size: WIDE,
        tint: "#ffffff",
        defaults: || {
            FieldAttributes::Date(DateAttributes {
                date_format: "mm/dd/yyyy".to_string(),
                style: TextStyle::default(),
            })
        },
    },
    KindSpec {
        kind: FieldKind::Image,
        tag: "image",
        name_prefix: "Image",
        size: WIDE,
        tint: "#f3f4f6",
        defaults: || {
            FieldAttributes::Image(ImageAttributes {
                label: "Click to Upload Image".to_string(),
            })
        },
    },
];

impl FieldKind {
    /// Every kind, in toolbar order.
    pub const ALL: [FieldKind; 9] = [
        FieldKind::Text,
        FieldKind::Checkbox,
        FieldKind::Radio,
        FieldKind::Dropdown,
        FieldKind::Optionlist,
        FieldKind::Button,
        FieldKind::Signature,
        FieldKind::Date,
        FieldKind::Image,
    ];

    /// This kind's row of the defaults table.
    pub fn spec(self) -> &'static KindSpec {
        &KINDS[self as usize]
    }

    /// Lowercase tag.
    pub fn as_str(self) -> &'static str {
        self.spec().tag
    }

    /// Size when placed.
    pub fn default_size(self) -> Size {
        self.spec().size
    }

    /// Fresh type-specific attributes.
    pub fn default_attributes(self) -> FieldAttributes {
        (self.spec().defaults)()
    }

    /// Auto-generated name for the given counter value.
    pub fn generated_name(self, counter: u32) -> String {
        format!("{}_{}", self.spec().name_prefix, counter)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        KINDS
            .iter()
            .find(|spec| spec.tag == s)
            .map(|spec| spec.kind)
            .ok_or_else(|| Error::Unsupported(format!("unknown field kind '{}'", s)))
    }
}
