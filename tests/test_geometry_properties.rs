//! Property tests for placement clamping, resizing, name validation and
//! the canvas/document transform.

use pdf_form_designer::designer::{Calibration, FieldKind, FieldModel, Handle};
use pdf_form_designer::geometry::{Point, Rect, Size};
use proptest::prelude::*;

const CANVAS: Size = Size {
    width: 816.0,
    height: 1056.0,
};

fn any_kind() -> impl Strategy<Value = FieldKind> {
    (0..FieldKind::ALL.len()).prop_map(|i| FieldKind::ALL[i])
}

fn any_handle() -> impl Strategy<Value = Handle> {
    (0..Handle::ALL.len()).prop_map(|i| Handle::ALL[i])
}

proptest! {
    #[test]
    fn created_fields_stay_on_canvas(kind in any_kind(), x in -2000.0f32..3000.0, y in -2000.0f32..3000.0) {
        let mut model = FieldModel::new(CANVAS);
        let id = model.create(kind, x, y, 0);
        let rect = model.get(id).unwrap().rect;
        prop_assert!(rect.x >= 0.0 && rect.x <= CANVAS.width - rect.width);
        prop_assert!(rect.y >= 0.0 && rect.y <= CANVAS.height - rect.height);
    }

    #[test]
    fn resize_keeps_opposite_edges(
        handle in any_handle(),
        x in 0.0f32..500.0,
        y in 0.0f32..500.0,
        w in 50.0f32..300.0,
        h in 20.0f32..200.0,
        dx in -400.0f32..400.0,
        dy in -400.0f32..400.0,
    ) {
        let anchor = Rect::new(x, y, w, h);
        let min = Size::new(50.0, 20.0);
        let r = handle.resize(anchor, dx, dy, min);

        prop_assert!(r.width >= min.width && r.height >= min.height);

        let tol = 1e-3;
        match handle {
            Handle::W | Handle::Nw | Handle::Sw => prop_assert!((r.right() - anchor.right()).abs() < tol),
            Handle::E | Handle::Ne | Handle::Se => prop_assert!((r.x - anchor.x).abs() < tol),
            Handle::N | Handle::S => prop_assert!((r.x - anchor.x).abs() < tol && (r.width - anchor.width).abs() < tol),
        }
        match handle {
            Handle::N | Handle::Nw | Handle::Ne => prop_assert!((r.bottom() - anchor.bottom()).abs() < tol),
            Handle::S | Handle::Sw | Handle::Se => prop_assert!((r.y - anchor.y).abs() < tol),
            Handle::E | Handle::W => prop_assert!((r.y - anchor.y).abs() < tol && (r.height - anchor.height).abs() < tol),
        }
    }

    #[test]
    fn transform_round_trips(
        ox in -50.0f32..50.0,
        oy in -50.0f32..50.0,
        scale in 0.5f32..3.0,
        x in 0.0f32..800.0,
        y in 0.0f32..1000.0,
        w in 1.0f32..300.0,
        h in 1.0f32..300.0,
        page_height in 200.0f32..1500.0,
    ) {
        let calibration = Calibration { offset: Point::new(ox, oy), scale };
        let canvas = Rect::new(x, y, w, h);
        let back = calibration.to_canvas(&calibration.to_document(&canvas, page_height), page_height);
        prop_assert!(back.approx_eq(&canvas, 0.01), "{:?} -> {:?}", canvas, back);
    }

    #[test]
    fn validation_rejects_only_empty_or_taken_names(candidate in "[A-Za-z_ ]{0,12}") {
        let mut model = FieldModel::new(CANVAS);
        model.seed_from_existing(vec!["Existing".to_string()], Vec::<String>::new());
        let other = model.create(FieldKind::Text, 0.0, 0.0, 0);
        let text = model.create(FieldKind::Text, 0.0, 0.0, 0);
        let radio = model.create(FieldKind::Radio, 0.0, 0.0, 0);
        let taken = model.get(other).unwrap().name.clone();

        let trimmed = candidate.trim();
        let expected_ok = !trimmed.is_empty() && trimmed != taken && trimmed != "Existing";
        prop_assert_eq!(model.validate_name(&candidate, text).is_ok(), expected_ok);
        prop_assert_eq!(model.validate_name(&candidate, radio).is_ok(), !trimmed.is_empty());
    }
}
