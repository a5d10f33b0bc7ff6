//! Terminal presentation of the galaxy: an orbit camera projecting the star
//! cloud onto a braille canvas, and a slider panel beside it.

mod braille;
mod camera;
mod panel;

pub use braille::BrailleCanvas;
pub use camera::{Camera, Viewport};
pub use panel::{ParamPanel, PANEL_WIDTH};

use ratatui::prelude::*;

use crate::color::ColorScheme;
use crate::config::DisplayConfig;
use crate::galaxy::{Geometry, Param, Session};

/// Braille dots are roughly square, so no horizontal correction is needed.
const DOT_ASPECT: f64 = 1.0;

/// Project geometry onto a braille canvas sized `char_w x char_h` cells.
pub fn rasterize(
    geometry: &Geometry,
    camera: &Camera,
    max_radius: f64,
    char_w: usize,
    char_h: usize,
) -> BrailleCanvas {
    let mut canvas = BrailleCanvas::new(char_w, char_h);
    let (grid_w, grid_h) = (canvas.grid_w, canvas.grid_h);
    let viewport = Viewport::fit_disk(grid_w, grid_h, max_radius, DOT_ASPECT, camera.zoom);

    for (point, value) in geometry.points() {
        let (right, up, _) = camera.project(point);
        if let Some((gx, gy)) = viewport.to_grid(right, up, grid_w, grid_h) {
            canvas.plot(gx, gy, value);
        }
    }
    canvas
}

/// Everything the viewer shows besides the session itself.
pub struct ViewState {
    pub camera: Camera,
    pub color_scheme: ColorScheme,
    pub selected: Param,
    pub show_panel: bool,
    pub animate: bool,
}

impl ViewState {
    pub fn new(display: &DisplayConfig) -> Self {
        Self {
            camera: display.camera,
            color_scheme: display.color_scheme,
            selected: Param::Mass,
            show_panel: display.show_panel,
            animate: display.animate,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, session: &Session, geometry: &Geometry) {
        let (panel_area, scatter_area) = self.calculate_layout(area);

        if let Some(panel_area) = panel_area {
            ParamPanel {
                session,
                selected: self.selected,
                color_scheme: self.color_scheme,
                animate: self.animate,
            }
            .render(frame, panel_area);
        }

        if scatter_area.width == 0 || scatter_area.height == 0 {
            return;
        }
        let shape = session.shape();
        let canvas = rasterize(
            geometry,
            &self.camera,
            shape.max_radius,
            scatter_area.width as usize,
            scatter_area.height as usize,
        );
        let color_max = shape.color_max();
        let scheme = self.color_scheme;
        canvas.render(frame, scatter_area, |value| scheme.star_color(value, color_max));
    }

    fn calculate_layout(&self, area: Rect) -> (Option<Rect>, Rect) {
        if !self.show_panel || area.width <= PANEL_WIDTH * 2 {
            return (None, area);
        }
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(10)])
            .split(area);
        (Some(chunks[0]), chunks[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rasterized_cloud_is_centred() {
        let session = Session::default();
        let geometry = session.render();
        let canvas = rasterize(&geometry, &Camera::default(), 15.0, 40, 20);

        let lit = canvas.grid.iter().filter(|&&d| d).count();
        assert!(lit > 100, "only {lit} dots lit");

        // Stars concentrate toward the core, so the central cell is occupied
        assert!(canvas.cell_value(20, 10).is_some() || canvas.cell_value(19, 9).is_some());
    }

    #[test]
    fn narrow_terminal_hides_panel() {
        let view = ViewState::new(&DisplayConfig::default());
        let (panel, scatter) = view.calculate_layout(Rect::new(0, 0, 50, 20));
        assert!(panel.is_none());
        assert_eq!(scatter.width, 50);

        let (panel, scatter) = view.calculate_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(panel.map(|p| p.width), Some(PANEL_WIDTH));
        assert_eq!(scatter.width, 120 - PANEL_WIDTH);
    }
}
