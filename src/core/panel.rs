/// Screen edges a layer-shell surface can be anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchors {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

/// Placement of the control-center panel on the overlay layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub width: i32,
    pub height: i32,
    pub anchors: Anchors,
    pub exclusive_zone: i32,
}

pub const PANEL_WIDTH_FRACTION: f32 = 0.3;

/// A right-hand sheet spanning the full monitor height, drawn over other
/// windows without reserving space.
///
/// Not used by `loki-ctl`; exported for a layer-shell front end to place
/// its window.
pub fn panel_geometry(monitor_width: i32, monitor_height: i32) -> PanelGeometry {
    PanelGeometry {
        width: (monitor_width as f32 * PANEL_WIDTH_FRACTION) as i32,
        height: monitor_height,
        anchors: Anchors {
            top: true,
            bottom: true,
            left: false,
            right: true,
        },
        exclusive_zone: 0,
    }
}
