//! Appearance streams for checkboxes and radio buttons.
//!
//! The keys of a toggle widget's `/AP /N` dictionary are its appearance
//! states. The non-`Off` key is the widget's on-state, i.e. its export
//! value, so every checkbox and radio widget carries one even while it is
//! off. `NeedAppearances` still lets viewers redraw them.

use super::WidgetStyle;
use crate::geometry::Rect;
use crate::object::{Dict, Object};
use crate::writer::object_serializer::{format_real, ObjectSerializer};

/// Background tint of the down (pressed) appearance.
const DOWN_SHADE: f32 = 0.75;

/// Which glyph a toggle widget draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleShape {
    /// Square box with a check mark
    Check,
    /// Circle with a filled dot
    Dot,
}

/// Generator for toggle widget content streams.
#[derive(Debug, Clone)]
pub struct FormAppearanceGenerator {
    border_width: f32,
    border_color: Option<[f32; 3]>,
    background_color: Option<[f32; 3]>,
    indicator_color: [f32; 3],
}

impl FormAppearanceGenerator {
    /// Generator drawing the widget's border and background.
    pub fn from_style(style: &WidgetStyle) -> Self {
        Self {
            border_width: style.border_width,
            border_color: style.border_color,
            background_color: style.background_color,
            indicator_color: [0.0, 0.0, 0.0],
        }
    }

    /// Same generator with the background darkened for the down state.
    fn pressed(&self) -> Self {
        let base = self.background_color.unwrap_or([1.0, 1.0, 1.0]);
        Self {
            background_color: Some(base.map(|c| c * DOWN_SHADE)),
            ..self.clone()
        }
    }

    /// Checkbox with its check mark.
    pub fn checkbox_on_appearance(&self, size: (f32, f32)) -> String {
        let (width, height) = size;
        let mut stream = self.checkbox_off_appearance(size);
        let margin = width * 0.2;
        stream.push_str(&format!("{} RG\n", rgb(self.indicator_color)));
        stream.push_str(&format!("{} w\n", num(width * 0.1)));
        stream.push_str(&format!(
            "{} {} m {} {} l {} {} l S\n",
            num(margin),
            num(height * 0.5),
            num(width * 0.4),
            num(margin),
            num(width - margin),
            num(height - margin)
        ));
        stream
    }

    /// Empty checkbox.
    pub fn checkbox_off_appearance(&self, size: (f32, f32)) -> String {
        let (width, height) = size;
        let mut stream = String::new();
        if let Some(bg) = self.background_color {
            stream.push_str(&format!("{} rg\n0 0 {} {} re f\n", rgb(bg), num(width), num(height)));
        }
        if let Some(bc) = self.border_color.filter(|_| self.border_width > 0.0) {
            let half = self.border_width / 2.0;
            stream.push_str(&format!(
                "{} RG\n{} w\n{} {} {} {} re S\n",
                rgb(bc),
                num(self.border_width),
                num(half),
                num(half),
                num(width - self.border_width),
                num(height - self.border_width)
            ));
        }
        stream
    }

    /// Radio button with its dot.
    pub fn radio_on_appearance(&self, size: (f32, f32)) -> String {
        let (cx, cy, radius) = circle_of(size);
        let mut stream = self.radio_off_appearance(size);
        stream.push_str(&format!("{} rg\n", rgb(self.indicator_color)));
        stream.push_str(&circle_path(cx, cy, radius * 0.5));
        stream.push_str("f\n");
        stream
    }

    /// Empty radio button.
    pub fn radio_off_appearance(&self, size: (f32, f32)) -> String {
        let (cx, cy, radius) = circle_of(size);
        let mut stream = String::new();
        if let Some(bg) = self.background_color {
            stream.push_str(&format!("{} rg\n", rgb(bg)));
            stream.push_str(&circle_path(cx, cy, radius));
            stream.push_str("f\n");
        }
        if let Some(bc) = self.border_color.filter(|_| self.border_width > 0.0) {
            stream.push_str(&format!("{} RG\n{} w\n", rgb(bc), num(self.border_width)));
            stream.push_str(&circle_path(cx, cy, radius));
            stream.push_str("S\n");
        }
        stream
    }

    fn on(&self, shape: ToggleShape, size: (f32, f32)) -> String {
        match shape {
            ToggleShape::Check => self.checkbox_on_appearance(size),
            ToggleShape::Dot => self.radio_on_appearance(size),
        }
    }

    fn off(&self, shape: ToggleShape, size: (f32, f32)) -> String {
        match shape {
            ToggleShape::Check => self.checkbox_off_appearance(size),
            ToggleShape::Dot => self.radio_off_appearance(size),
        }
    }
}

/// The `/N` and `/D` state streams of one toggle widget.
#[derive(Debug, Clone)]
pub struct ToggleAppearances {
    on_state: String,
    size: (f32, f32),
    normal: (String, String),
    down: (String, String),
}

impl ToggleAppearances {
    /// Appearances for a widget of `rect` whose on-state is `on_state`.
    pub fn new(shape: ToggleShape, on_state: &str, rect: &Rect, style: &WidgetStyle) -> Self {
        let size = (rect.width, rect.height);
        let normal = FormAppearanceGenerator::from_style(style);
        let down = normal.pressed();
        Self {
            on_state: on_state.to_string(),
            size,
            normal: (normal.on(shape, size), normal.off(shape, size)),
            down: (down.on(shape, size), down.off(shape, size)),
        }
    }

    /// The on-state name.
    pub fn on_state(&self) -> &str {
        &self.on_state
    }

    /// Form XObjects keyed by appearance type (`N`, `D`), each pair being
    /// the on stream then the `Off` stream.
    pub fn streams(&self) -> [(&'static str, Object, Object); 2] {
        [
            ("N", self.xobject(&self.normal.0), self.xobject(&self.normal.1)),
            ("D", self.xobject(&self.down.0), self.xobject(&self.down.1)),
        ]
    }

    fn xobject(&self, content: &str) -> Object {
        let mut dict = ObjectSerializer::dict_map(vec![
            ("Type", ObjectSerializer::name("XObject")),
            ("Subtype", ObjectSerializer::name("Form")),
            (
                "BBox",
                ObjectSerializer::array(vec![
                    ObjectSerializer::integer(0),
                    ObjectSerializer::integer(0),
                    ObjectSerializer::real(self.size.0 as f64),
                    ObjectSerializer::real(self.size.1 as f64),
                ]),
            ),
        ]);
        dict.insert("Resources".to_string(), Object::Dictionary(Dict::new()));
        Object::Stream {
            dict,
            data: bytes::Bytes::from(content.as_bytes().to_vec()),
        }
    }
}

fn circle_of(size: (f32, f32)) -> (f32, f32, f32) {
    let (width, height) = size;
    (width / 2.0, height / 2.0, (width.min(height) / 2.0 - 1.0).max(0.5))
}

fn num(value: f32) -> String {
    format_real(value as f64)
}

fn rgb(color: [f32; 3]) -> String {
    format!("{} {} {}", num(color[0]), num(color[1]), num(color[2]))
}

/// Four Bézier arcs approximating a circle.
fn circle_path(cx: f32, cy: f32, r: f32) -> String {
    let k = r * 0.552_284_7;
    format!(
        "{} {} m\n{} {} {} {} {} {} c\n{} {} {} {} {} {} c\n{} {} {} {} {} {} c\n{} {} {} {} {} {} c\n",
        num(cx + r),
        num(cy),
        num(cx + r),
        num(cy + k),
        num(cx + k),
        num(cy + r),
        num(cx),
        num(cy + r),
        num(cx - k),
        num(cy + r),
        num(cx - r),
        num(cy + k),
        num(cx - r),
        num(cy),
        num(cx - r),
        num(cy - k),
        num(cx - k),
        num(cy - r),
        num(cx),
        num(cy - r),
        num(cx + k),
        num(cy - r),
        num(cx + r),
        num(cy - k),
        num(cx + r),
        num(cy)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_streams() {
        let gen = FormAppearanceGenerator::from_style(&WidgetStyle::default());
        let off = gen.checkbox_off_appearance((15.0, 15.0));
        let on = gen.checkbox_on_appearance((15.0, 15.0));
        assert!(off.starts_with("1 1 1 rg\n0 0 15 15 re f\n"));
        assert!(off.contains("0.5 0.5 14 14 re S"));
        assert!(on.starts_with(&off));
        assert!(on.contains("3 7.5 m 6 3 l 12 12 l S"));
    }

    #[test]
    fn test_radio_streams() {
        let gen = FormAppearanceGenerator::from_style(&WidgetStyle::default().without_border());
        let off = gen.radio_off_appearance((22.5, 22.5));
        assert!(off.contains(" c\n"));
        assert!(off.ends_with("f\n"));
        assert!(!off.contains("RG"));
        let on = gen.radio_on_appearance((22.5, 22.5));
        assert_eq!(on.matches("f\n").count(), 2);
    }

    #[test]
    fn test_down_state_is_darker() {
        let appearances = ToggleAppearances::new(
            ToggleShape::Check,
            "Agreed",
            &Rect::new(0.0, 0.0, 20.0, 20.0),
            &WidgetStyle::default(),
        );
        assert_eq!(appearances.on_state(), "Agreed");
        assert!(appearances.down.1.starts_with("0.75 0.75 0.75 rg"));
    }

    #[test]
    fn test_xobjects_carry_bbox() {
        let appearances = ToggleAppearances::new(
            ToggleShape::Dot,
            "Yes",
            &Rect::new(40.0, 600.0, 22.5, 22.5),
            &WidgetStyle::default(),
        );
        let [(normal, on, _), (down, _, _)] = appearances.streams();
        assert_eq!((normal, down), ("N", "D"));
        let dict = on.as_dict().unwrap();
        assert_eq!(dict.get("Subtype").and_then(Object::as_name), Some("Form"));
        let bbox = dict.get("BBox").and_then(Object::as_array).unwrap();
        assert_eq!(bbox[2].as_number(), Some(22.5));
    }
}
