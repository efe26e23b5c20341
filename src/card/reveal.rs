/// Scroll-driven reveal of the card's message
///
/// Scroll progress over the card region turns the cover. On wide screens
/// the cover swings open around its left edge, on narrow screens around its
/// top edge, and narrow screens can also be opened with a tap. The message
/// is visible once the cover has turned past 90 degrees, or whenever the
/// card was tapped open.

use tracing::debug;

/// Viewports narrower than this are treated as phones
pub const DEFAULT_NARROW_BREAKPOINT: f32 = 768.0;

/// Progress at which the cover is fully open
const FULL_OPEN_PROGRESS: f32 = 0.8;

/// Wide layouts slide the card right by this much while opening
const WIDE_SHIFT: f32 = 225.0;

/// Narrow layouts slide the card down by this much while opening
const NARROW_SHIFT: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Wide,
    Narrow,
}

impl DeviceClass {
    pub fn from_width(width: f32, breakpoint: f32) -> Self {
        if width < breakpoint {
            DeviceClass::Narrow
        } else {
            DeviceClass::Wide
        }
    }
}

/// Progress through the card region for a scroll offset.
///
/// The region is `region_screens` viewports tall and its content stays
/// pinned while scrolling through it, so progress reaches 1 after
/// `region_screens - 1` viewports of scrolling.
pub fn scroll_progress(offset_y: f32, viewport_height: f32, region_screens: f32) -> f32 {
    let scrollable = viewport_height * (region_screens - 1.0);
    if scrollable <= 0.0 || !offset_y.is_finite() {
        return 0.0;
    }
    (offset_y / scrollable).clamp(0.0, 1.0)
}

fn opening(progress: f32) -> f32 {
    (progress / FULL_OPEN_PROGRESS).clamp(0.0, 1.0)
}

/// Cover rotation in degrees for a scroll progress.
/// Wide covers turn around the vertical axis (towards -180), narrow
/// covers around the horizontal axis (towards +180).
pub fn rotation_degrees(progress: f32, device: DeviceClass) -> f32 {
    match device {
        DeviceClass::Wide => -180.0 * opening(progress),
        DeviceClass::Narrow => 180.0 * opening(progress),
    }
}

/// Card offset `(x, y)` in pixels for a scroll progress
pub fn card_offset(progress: f32, device: DeviceClass) -> (f32, f32) {
    match device {
        DeviceClass::Wide => (WIDE_SHIFT * opening(progress), 0.0),
        DeviceClass::Narrow => (0.0, NARROW_SHIFT * opening(progress)),
    }
}

/// What an input did to message visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Revealed,
    Concealed,
    Unchanged,
}

#[derive(Debug, Clone, Default)]
pub struct Reveal {
    device: DeviceClass,
    progress: f32,
    opened: bool,
    visible: bool,
}

impl Reveal {
    pub fn new(device: DeviceClass) -> Self {
        Reveal {
            device,
            ..Default::default()
        }
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn narrative_visible(&self) -> bool {
        self.visible
    }

    /// Rotation of the scroll signal feeding the visibility rule
    pub fn rotation(&self) -> f32 {
        rotation_degrees(self.progress, self.device)
    }

    /// Rotation to draw the cover with. Narrow covers follow the tap
    /// toggle; wide covers follow the scroll.
    pub fn cover_rotation(&self) -> f32 {
        match self.device {
            DeviceClass::Wide => self.rotation(),
            DeviceClass::Narrow if self.opened => 180.0,
            DeviceClass::Narrow => 0.0,
        }
    }

    pub fn offset(&self) -> (f32, f32) {
        card_offset(self.progress, self.device)
    }

    /// Viewport was resized into a (possibly) different device class
    pub fn set_device(&mut self, device: DeviceClass) -> Transition {
        if device != self.device {
            debug!(?device, "card device class changed");
            self.device = device;
        }
        self.update()
    }

    pub fn set_progress(&mut self, progress: f32) -> Transition {
        self.progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.update()
    }

    /// Tap on the cover. Only narrow layouts have a tappable cover.
    pub fn toggle(&mut self) -> Transition {
        if self.device != DeviceClass::Narrow {
            return Transition::Unchanged;
        }
        self.opened = !self.opened;
        debug!(opened = self.opened, "card toggled");
        self.update()
    }

    fn update(&mut self) -> Transition {
        let visible = self.opened || self.rotation().abs() > 90.0;
        let transition = match (self.visible, visible) {
            (false, true) => Transition::Revealed,
            (true, false) => Transition::Concealed,
            _ => Transition::Unchanged,
        };
        self.visible = visible;
        transition
    }
}
