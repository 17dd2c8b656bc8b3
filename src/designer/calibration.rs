//! Canvas-to-document calibration.
//!
//! The viewer draws each page inside the designer canvas at some offset and
//! zoom. After a page is rendered the host hands the calibrator a
//! [`ViewerProbe`]; the probe's reading of the rendered page element gives
//! the pixel origin of the page and the pixels-per-point scale. Layout can
//! shift right after the first render, so a second reading taken once the
//! viewer has settled replaces the first.
//!
//! Document space has its origin at the bottom-left with y growing upward;
//! canvas space has it at the top-left with y growing downward. The flip
//! happens in [`Calibration::to_document`], not in the stored offset.

use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bounding box and border widths of the rendered page element, in canvas
/// pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementGeometry {
    /// Left edge of the element box
    pub left: f32,
    /// Top edge of the element box
    pub top: f32,
    /// Outer width, borders included
    pub width: f32,
    /// Outer height, borders included
    pub height: f32,
    /// Left border width
    pub border_left: f32,
    /// Top border width
    pub border_top: f32,
    /// Right border width
    pub border_right: f32,
    /// Bottom border width
    pub border_bottom: f32,
}

/// Access to the rendered page element.
pub trait ViewerProbe {
    /// Read the element's geometry, or `None` if it cannot be located.
    fn measure(&mut self) -> Option<ElementGeometry>;
}

/// A fixed reading, for hosts that measure synchronously.
impl ViewerProbe for ElementGeometry {
    fn measure(&mut self) -> Option<ElementGeometry> {
        Some(*self)
    }
}

impl<F> ViewerProbe for F
where
    F: FnMut() -> Option<ElementGeometry>,
{
    fn measure(&mut self) -> Option<ElementGeometry> {
        self()
    }
}

/// Pixel origin of the page and pixels per point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Canvas position of document point (0, page top)
    pub offset: Point,
    /// Pixels per point, same on both axes
    pub scale: f32,
}

impl Calibration {
    /// The calibration used before any reading: no offset, default scale.
    pub fn with_scale(scale: f32) -> Self {
        Self {
            offset: Point::default(),
            scale,
        }
    }

    /// Derive a calibration from a geometry reading.
    pub fn from_geometry(geometry: &ElementGeometry, page_width: f32) -> Result<Self> {
        if page_width.is_nan() || page_width <= 0.0 {
            return Err(Error::Calibration(format!("page width {} is not positive", page_width)));
        }
        let content_width = geometry.width - geometry.border_left - geometry.border_right;
        if content_width.is_nan() || content_width <= 0.0 {
            return Err(Error::Calibration(format!(
                "rendered page has no content width ({} px)",
                content_width
            )));
        }
        Ok(Self {
            offset: Point::new(geometry.left + geometry.border_left, geometry.top + geometry.border_top),
            scale: content_width / page_width,
        })
    }

    /// Map a canvas box to a document box on a page `page_height` points tall.
    ///
    /// The document box is anchored at its bottom edge.
    pub fn to_document(&self, canvas: &Rect, page_height: f32) -> Rect {
        let x = (canvas.x - self.offset.x) / self.scale;
        let y = page_height - (canvas.y - self.offset.y) / self.scale - canvas.height / self.scale;
        Rect::new(x, y, canvas.width / self.scale, canvas.height / self.scale)
    }

    /// Inverse of [`Calibration::to_document`].
    pub fn to_canvas(&self, document: &Rect, page_height: f32) -> Rect {
        let height = document.height * self.scale;
        let x = document.x * self.scale + self.offset.x;
        let y = (page_height - document.y) * self.scale - height + self.offset.y;
        Rect::new(x, y, document.width * self.scale, height)
    }
}

/// What the calibrator knows about the page being designed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationStatus {
    /// No reading ever succeeded; the default calibration is in use
    Default,
    /// The last reading belongs to another page, or the latest reading failed
    Stale {
        /// Page the calibration in use was measured on
        page: usize,
    },
    /// The calibration was measured on the current page
    Current {
        /// Page index
        page: usize,
        /// Whether the post-settle reading has been taken
        settled: bool,
    },
}

/// Keeps the calibration of the current page and of every page measured so
/// far in the session.
#[derive(Debug, Clone)]
pub struct Calibrator {
    current: Calibration,
    status: CalibrationStatus,
    per_page: HashMap<usize, Calibration>,
}

impl Calibrator {
    /// A calibrator that starts from the default calibration.
    pub fn new(default_scale: f32) -> Self {
        Self {
            current: Calibration::with_scale(default_scale),
            status: CalibrationStatus::Default,
            per_page: HashMap::new(),
        }
    }

    /// The calibration in use.
    pub fn calibration(&self) -> Calibration {
        self.current
    }

    /// Current status.
    pub fn status(&self) -> CalibrationStatus {
        self.status
    }

    /// Whether a reading ever succeeded on `page`.
    pub fn is_calibrated(&self, page: usize) -> bool {
        self.per_page.contains_key(&page)
    }

    /// Calibration to use for fields on `page`: that page's own reading,
    /// else the one in use.
    pub fn for_page(&self, page: usize) -> Calibration {
        self.per_page.get(&page).copied().unwrap_or(self.current)
    }

    /// A different page is about to render. The calibration in use stays
    /// until a reading on the new page succeeds.
    pub fn page_changed(&mut self, page: usize) {
        if let CalibrationStatus::Current { page: measured, .. } = self.status {
            self.status = CalibrationStatus::Stale { page: measured };
        }
        log::debug!("page {} rendering, calibration status {:?}", page, self.status);
    }

    /// First reading after the viewer reports the page rendered.
    pub fn on_render_complete(
        &mut self,
        probe: &mut dyn ViewerProbe,
        page: usize,
        page_width: f32,
    ) -> Result<Calibration> {
        self.read(probe, page, page_width, false)
    }

    /// Authoritative reading once layout has settled.
    pub fn on_settled(&mut self, probe: &mut dyn ViewerProbe, page: usize, page_width: f32) -> Result<Calibration> {
        self.read(probe, page, page_width, true)
    }

    /// Both readings back to back, for hosts without a settle callback.
    ///
    /// Succeeds if either reading does; the later success wins.
    pub fn calibrate_now(&mut self, probe: &mut dyn ViewerProbe, page: usize, page_width: f32) -> Result<Calibration> {
        let first = self.on_render_complete(probe, page, page_width);
        self.on_settled(probe, page, page_width).or(first)
    }

    fn read(
        &mut self,
        probe: &mut dyn ViewerProbe,
        page: usize,
        page_width: f32,
        settled: bool,
    ) -> Result<Calibration> {
        let reading = probe
            .measure()
            .ok_or_else(|| Error::Calibration("rendered page element not found".to_string()))
            .and_then(|geometry| Calibration::from_geometry(&geometry, page_width));

        match reading {
            Ok(calibration) => {
                self.current = calibration;
                self.per_page.insert(page, calibration);
                self.status = CalibrationStatus::Current { page, settled };
                log::debug!(
                    "page {} calibrated: offset ({}, {}), scale {}{}",
                    page,
                    calibration.offset.x,
                    calibration.offset.y,
                    calibration.scale,
                    if settled { "" } else { " (provisional)" }
                );
                Ok(calibration)
            },
            Err(e) => {
                log::warn!("calibration of page {} failed, keeping previous values: {}", page, e);
                if let CalibrationStatus::Current { page: measured, .. } = self.status {
                    self.status = CalibrationStatus::Stale { page: measured };
                }
                Err(e)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter_reading() -> ElementGeometry {
        ElementGeometry {
            left: 10.0,
            top: 20.0,
            width: 612.0 * 1.5 + 2.0,
            height: 792.0 * 1.5 + 2.0,
            border_left: 1.0,
            border_top: 1.0,
            border_right: 1.0,
            border_bottom: 1.0,
        }
    }

    #[test]
    fn test_from_geometry() {
        let c = Calibration::from_geometry(&letter_reading(), 612.0).unwrap();
        assert_eq!(c.offset, Point::new(11.0, 21.0));
        assert!((c.scale - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_degenerate_readings() {
        let reading = ElementGeometry {
            width: 2.0,
            border_left: 1.0,
            border_right: 1.0,
            ..ElementGeometry::default()
        };
        assert!(matches!(Calibration::from_geometry(&reading, 612.0), Err(Error::Calibration(_))));
        assert!(Calibration::from_geometry(&letter_reading(), 0.0).is_err());
    }

    #[test]
    fn test_letter_scenario() {
        let c = Calibration::with_scale(1.333);
        let pdf = c.to_document(&Rect::new(100.0, 100.0, 150.0, 30.0), 792.0);
        assert!((pdf.x - 75.02).abs() < 0.05);
        assert!((pdf.width - 112.53).abs() < 0.05);
        assert!((pdf.height - 22.51).abs() < 0.05);
        assert!((pdf.y - (792.0 - 75.02 - 22.51)).abs() < 0.05);
    }

    #[test]
    fn test_second_reading_wins() {
        let mut calibrator = Calibrator::new(1.333);
        let mut readings = vec![
            Some(ElementGeometry { left: 5.0, ..letter_reading() }),
            Some(letter_reading()),
        ]
        .into_iter();
        let mut probe = move || readings.next().flatten();

        calibrator.on_render_complete(&mut probe, 0, 612.0).unwrap();
        assert_eq!(calibrator.status(), CalibrationStatus::Current { page: 0, settled: false });
        calibrator.on_settled(&mut probe, 0, 612.0).unwrap();
        assert_eq!(calibrator.calibration().offset.x, 11.0);
        assert_eq!(calibrator.status(), CalibrationStatus::Current { page: 0, settled: true });
    }

    #[test]
    fn test_failed_reading_keeps_previous() {
        let mut calibrator = Calibrator::new(1.333);
        let mut missing = || -> Option<ElementGeometry> { None };
        assert!(calibrator.calibrate_now(&mut missing, 0, 612.0).is_err());
        assert_eq!(calibrator.status(), CalibrationStatus::Default);
        assert!(!calibrator.is_calibrated(0));
        assert_eq!(calibrator.calibration(), Calibration::with_scale(1.333));

        let mut reading = letter_reading();
        calibrator.calibrate_now(&mut reading, 0, 612.0).unwrap();
        assert!(calibrator.calibrate_now(&mut missing, 0, 612.0).is_err());
        assert_eq!(calibrator.status(), CalibrationStatus::Stale { page: 0 });
        assert!(calibrator.is_calibrated(0));
        assert_eq!(calibrator.calibration().offset, Point::new(11.0, 21.0));
    }

    #[test]
    fn test_page_change_marks_stale() {
        let mut calibrator = Calibrator::new(1.333);
        calibrator.calibrate_now(&mut letter_reading(), 0, 612.0).unwrap();
        calibrator.page_changed(1);
        assert_eq!(calibrator.status(), CalibrationStatus::Stale { page: 0 });
        assert!(!calibrator.is_calibrated(1));
        assert_eq!(calibrator.for_page(1), calibrator.calibration());
    }
}
