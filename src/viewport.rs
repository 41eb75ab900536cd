//! Pure pan/zoom/fit transform state for the viewing surface.
//!
//! Every transition returns whether it changed anything; callers repaint
//! exactly once per `true` and must not repaint on `false`.

/// Upper zoom bound.
pub const SCALE_MAX: f32 = 20.0;

/// Multiplier applied by a single zoom-in or zoom-out step.
pub const SCALE_FACTOR: f32 = 1.25;

/// Where the image sits inside the container.
///
/// `Fitted` derives the centering offset from the current scale, so "fitted
/// implies centered" holds by construction; `Manual` stores the offset the
/// user panned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Fitted,
    Manual { x: f32, y: f32 },
}

/// Effective zoom value and bounds, reported to the surrounding UI after
/// every transform change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub scale: f32,
    pub min: f32,
    pub max: f32,
}

/// Pan/zoom/fit state machine over a container and an optional image.
///
/// Holds plain geometry only; GPU resources live with the session that owns
/// this value. Invariant: `scale_min <= scale <= scale_max` after every
/// transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    container_width: u32,
    container_height: u32,
    image: Option<(u32, u32)>,
    scale: f32,
    scale_min: f32,
    scale_max: f32,
    placement: Placement,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

#[allow(clippy::cast_precision_loss)]
impl Viewport {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            container_width: 0,
            container_height: 0,
            image: None,
            scale: 1.0,
            scale_min: 1.0,
            scale_max: SCALE_MAX,
            placement: Placement::Manual { x: 0.0, y: 0.0 },
        }
    }

    /// Largest scale `<= 1` at which the image fits on both axes.
    fn fit_scale(&self, img_w: u32, img_h: u32) -> f32 {
        if self.container_width == 0 || self.container_height == 0 || img_w == 0 || img_h == 0 {
            return 1.0;
        }
        (self.container_width as f32 / img_w as f32)
            .min(self.container_height as f32 / img_h as f32)
            .min(1.0)
    }

    /// Centering offset for the image at `scale`.
    fn centered(&self, scale: f32) -> (f32, f32) {
        let (img_w, img_h) = self.image.unwrap_or((0, 0));
        (
            (self.container_width as f32 - scale * img_w as f32) / 2.0,
            (self.container_height as f32 - scale * img_h as f32) / 2.0,
        )
    }

    /// Resize the container, re-deriving scale bounds and recentering.
    ///
    /// Fitted placement tracks the new fit scale; manual placement snaps up
    /// to the new minimum when it fell below it. Idempotent and cheap on a
    /// repeated size.
    pub fn set_container(&mut self, width: u32, height: u32) -> bool {
        if width == self.container_width && height == self.container_height {
            return false;
        }
        self.container_width = width;
        self.container_height = height;

        if let Some((img_w, img_h)) = self.image {
            self.scale_min = self.fit_scale(img_w, img_h);
            match self.placement {
                Placement::Fitted => self.scale = self.scale_min,
                Placement::Manual { .. } => {
                    if self.scale < self.scale_min {
                        self.scale = self.scale_min;
                    }
                    let (x, y) = self.centered(self.scale);
                    self.placement = Placement::Manual { x, y };
                }
            }
        }
        true
    }

    /// Swap in a new image (fit and center it) or clear the current one.
    pub fn set_image(&mut self, dims: Option<(u32, u32)>) -> bool {
        match dims {
            None => {
                if self.image.take().is_none() {
                    return false;
                }
                true
            }
            Some((img_w, img_h)) => {
                self.image = Some((img_w, img_h));
                self.scale_min = self.fit_scale(img_w, img_h);
                self.scale = self.scale_min;
                self.placement = Placement::Fitted;
                true
            }
        }
    }

    /// Set an explicit zoom target, clamped to the current bounds.
    ///
    /// A changed scale recenters the image; landing exactly on the minimum
    /// re-enters fitted mode.
    pub fn set_scale(&mut self, value: f32) -> bool {
        if self.image.is_none() {
            return false;
        }
        let clamped = value.clamp(self.scale_min, self.scale_max);
        if clamped == self.scale {
            return false;
        }
        self.scale = clamped;
        self.placement = if clamped == self.scale_min {
            Placement::Fitted
        } else {
            let (x, y) = self.centered(clamped);
            Placement::Manual { x, y }
        };
        true
    }

    /// One zoom step in.
    pub fn zoom_in(&mut self) -> bool {
        self.set_scale(self.scale * SCALE_FACTOR)
    }

    /// One zoom step out.
    pub fn zoom_out(&mut self) -> bool {
        self.set_scale(self.scale / SCALE_FACTOR)
    }

    /// Pan by a pixel delta; inactive while fitted.
    ///
    /// On each axis the offset is clamped so the image never scrolls past
    /// its own edge; when the scaled image is smaller than the container on
    /// an axis it stays centered there regardless of the delta.
    pub fn translate(&mut self, dx: f32, dy: f32) -> bool {
        let Some((img_w, img_h)) = self.image else {
            return false;
        };
        let Placement::Manual { x, y } = self.placement else {
            return false;
        };

        let overflow_x = self.container_width as f32 - self.scale * img_w as f32;
        let overflow_y = self.container_height as f32 - self.scale * img_h as f32;

        let next_x = if overflow_x < 0.0 {
            (x + dx).clamp(overflow_x, 0.0)
        } else {
            overflow_x / 2.0
        };
        let next_y = if overflow_y < 0.0 {
            (y + dy).clamp(overflow_y, 0.0)
        } else {
            overflow_y / 2.0
        };

        if next_x == x && next_y == y {
            return false;
        }
        self.placement = Placement::Manual {
            x: next_x,
            y: next_y,
        };
        true
    }

    /// Re-enter fitted mode at the fit scale.
    pub fn fit(&mut self) -> bool {
        if self.image.is_none() || matches!(self.placement, Placement::Fitted) {
            return false;
        }
        self.scale = self.scale_min;
        self.placement = Placement::Fitted;
        true
    }

    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    #[must_use]
    pub const fn scale_min(&self) -> f32 {
        self.scale_min
    }

    #[must_use]
    pub const fn scale_max(&self) -> f32 {
        self.scale_max
    }

    #[must_use]
    pub const fn fitted(&self) -> bool {
        matches!(self.placement, Placement::Fitted)
    }

    /// Top-left position of the scaled image inside the container.
    #[must_use]
    pub fn offset(&self) -> (f32, f32) {
        match self.placement {
            Placement::Fitted => self.centered(self.scale),
            Placement::Manual { x, y } => (x, y),
        }
    }

    #[must_use]
    pub const fn image(&self) -> Option<(u32, u32)> {
        self.image
    }

    #[must_use]
    pub const fn container(&self) -> (u32, u32) {
        (self.container_width, self.container_height)
    }

    #[must_use]
    pub fn bounds(&self) -> ZoomBounds {
        ZoomBounds {
            scale: self.scale,
            min: self.scale_min,
            max: self.scale_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport_800x600_with_1600x400() -> Viewport {
        let mut vp = Viewport::new();
        assert!(vp.set_container(800, 600));
        assert!(vp.set_image(Some((1600, 400))));
        vp
    }

    #[test]
    fn initial_state() {
        let vp = Viewport::new();
        assert!((vp.scale() - 1.0).abs() < f32::EPSILON);
        assert!((vp.scale_min() - 1.0).abs() < f32::EPSILON);
        assert!((vp.scale_max() - SCALE_MAX).abs() < f32::EPSILON);
        assert!(!vp.fitted());
        assert_eq!(vp.offset(), (0.0, 0.0));
    }

    #[test]
    fn new_image_fits_and_centers() {
        let vp = viewport_800x600_with_1600x400();
        // fit scale = min(1, 800/1600, 600/400) = 0.5
        assert!((vp.scale() - 0.5).abs() < 1e-6);
        assert!((vp.scale_min() - 0.5).abs() < 1e-6);
        assert!(vp.fitted());
        // offset = ((800 - 800) / 2, (600 - 200) / 2)
        assert_eq!(vp.offset(), (0.0, 200.0));
    }

    #[test]
    fn small_image_keeps_scale_one() {
        let mut vp = Viewport::new();
        vp.set_container(800, 600);
        vp.set_image(Some((100, 50)));
        assert!((vp.scale() - 1.0).abs() < 1e-6);
        assert_eq!(vp.offset(), (350.0, 275.0));
    }

    #[test]
    fn clear_image_then_again_is_a_noop() {
        let mut vp = viewport_800x600_with_1600x400();
        assert!(vp.set_image(None));
        assert!(!vp.set_image(None));
    }

    #[test]
    fn repeated_resize_is_a_noop() {
        let mut vp = viewport_800x600_with_1600x400();
        assert!(!vp.set_container(800, 600));
    }

    #[test]
    fn resize_while_fitted_tracks_fit_scale() {
        let mut vp = viewport_800x600_with_1600x400();
        assert!(vp.set_container(400, 600));
        assert!(vp.fitted());
        assert!((vp.scale() - 0.25).abs() < 1e-6);
        assert_eq!(vp.offset(), (0.0, 250.0));
    }

    #[test]
    fn resize_snaps_manual_scale_up_to_new_minimum() {
        let mut vp = viewport_800x600_with_1600x400();
        vp.zoom_in(); // 0.625, manual
        assert!(!vp.fitted());
        assert!(vp.set_container(1600, 600));
        // new fit scale = min(1, 1600/1600, 600/400) = 1.0 > 0.625
        assert!((vp.scale() - 1.0).abs() < 1e-6);
        assert!(!vp.fitted());
        assert_eq!(vp.offset(), (0.0, 100.0));
    }

    #[test]
    fn zoom_without_image_is_a_noop() {
        let mut vp = Viewport::new();
        vp.set_container(800, 600);
        assert!(!vp.zoom_in());
        assert!(!vp.set_scale(2.0));
    }

    #[test]
    fn zoom_in_unfits_and_recenters() {
        let mut vp = viewport_800x600_with_1600x400();
        assert!(vp.zoom_in());
        assert!((vp.scale() - 0.625).abs() < 1e-6);
        assert!(!vp.fitted());
        // offset = ((800 - 1000) / 2, (600 - 250) / 2)
        let (x, y) = vp.offset();
        assert!((x - -100.0).abs() < 1e-4);
        assert!((y - 175.0).abs() < 1e-4);
    }

    #[test]
    fn zoom_out_to_minimum_refits() {
        let mut vp = viewport_800x600_with_1600x400();
        vp.zoom_in();
        assert!(vp.zoom_out());
        assert!((vp.scale() - 0.5).abs() < 1e-6);
        assert!(vp.fitted());
        // already at the minimum: nothing left to change
        assert!(!vp.zoom_out());
    }

    #[test]
    fn scale_clamps_to_bounds() {
        let mut vp = viewport_800x600_with_1600x400();
        vp.set_scale(1000.0);
        assert!((vp.scale() - SCALE_MAX).abs() < 1e-6);
        vp.set_scale(0.0001);
        assert!((vp.scale() - vp.scale_min()).abs() < 1e-6);
        assert!(vp.fitted());
    }

    #[test]
    fn translate_is_inactive_while_fitted() {
        let mut vp = viewport_800x600_with_1600x400();
        assert!(vp.fitted());
        assert!(!vp.translate(10.0, 10.0));
    }

    #[test]
    fn translate_clamps_to_image_edges() {
        let mut vp = viewport_800x600_with_1600x400();
        vp.set_scale(1.0); // image 1600x400 in 800x600: overflows x, fits y
        assert!(vp.translate(-10_000.0, 50.0));
        let (x, y) = vp.offset();
        assert!((x - -800.0).abs() < 1e-4); // clamped to -(1600 - 800)
        assert!((y - 100.0).abs() < 1e-4); // forced to centered (600 - 400) / 2

        assert!(vp.translate(10_000.0, 0.0));
        assert_eq!(vp.offset().0, 0.0);

        // fully clamped on both axes: nothing changes
        assert!(!vp.translate(1.0, 1.0));
    }
}
