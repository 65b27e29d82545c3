use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};
use winit::window::Icon;

const SIZE: u32 = 64;
const QUADRANTS: [[u8; 3]; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]];

/// Four-colour square drawn at startup; `None` if the platform rejects it.
pub fn window_icon() -> Option<Icon> {
    let mut pm = Pixmap::new(SIZE, SIZE)?;
    pm.fill(Color::from_rgba8(255, 255, 255, 255));

    let half = SIZE as f32 / 2.0;
    let inset = 4.0;
    let mut paint = Paint::default();
    paint.anti_alias = false;
    for (i, [r, g, b]) in QUADRANTS.into_iter().enumerate() {
        let x = (i % 2) as f32 * half;
        let y = (i / 2) as f32 * half;
        let rect = Rect::from_xywh(x + inset, y + inset, half - 2.0 * inset, half - 2.0 * inset)?;
        paint.set_color(Color::from_rgba8(r, g, b, 255));
        pm.fill_rect(rect, &paint, Transform::identity(), None);
    }

    Icon::from_rgba(pm.take(), SIZE, SIZE).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icon_is_built() {
        assert!(window_icon().is_some());
    }
}
