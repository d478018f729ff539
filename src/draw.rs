use glam::DVec2;

/// RGB color packed as `0xRRGGBB`. Alpha travels separately on fill/stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x000000);
    pub const WHITE: Color = Color(0xFFFFFF);

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Color((r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Convert an OKLCH color (lightness 0-1, chroma ~0-0.4, hue in degrees) to sRGB.
    /// Out-of-gamut channels are clipped.
    pub fn from_oklch(lightness: f64, chroma: f64, hue_deg: f64) -> Self {
        let h = hue_deg.to_radians();
        let a = chroma * h.cos();
        let b = chroma * h.sin();

        // OKLab -> LMS (cube roots)
        let l_ = lightness + 0.396_337_777_4 * a + 0.215_803_757_3 * b;
        let m_ = lightness - 0.105_561_345_8 * a - 0.063_854_172_8 * b;
        let s_ = lightness - 0.089_484_177_5 * a - 1.291_485_548_0 * b;
        let (l, m, s) = (l_ * l_ * l_, m_ * m_ * m_, s_ * s_ * s_);

        // LMS -> linear sRGB
        let r = 4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s;
        let g = -1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s;
        let bl = -0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_614_701_0 * s;

        Color::from_rgb8(encode_srgb(r), encode_srgb(g), encode_srgb(bl))
    }
}

/// Linear channel -> gamma-encoded 8-bit sRGB.
fn encode_srgb(c: f64) -> u8 {
    let c = c.clamp(0.0, 1.0);
    let v = if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    };
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// One renderer instruction. Path commands accumulate until the next
/// `Fill` or `Stroke`, which paints everything since the previous paint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    MoveTo(DVec2),
    LineTo(DVec2),
    /// Quadratic curve: control point, end point.
    QuadTo(DVec2, DVec2),
    /// Cubic curve: two control points, end point.
    BezierTo(DVec2, DVec2, DVec2),
    Circle {
        center: DVec2,
        radius: f64,
    },
    Ellipse {
        center: DVec2,
        radii: DVec2,
        rotation: f64,
    },
    ClosePath,
    Fill {
        color: Color,
        alpha: f64,
    },
    Stroke {
        color: Color,
        width: f64,
        alpha: f64,
    },
}

/// Ordered per-frame command buffer handed to the rendering backend.
/// Reused across frames to avoid allocation.
#[derive(Debug, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(4096),
        }
    }

    /// Drop all commands, keep the allocation.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn move_to(&mut self, p: DVec2) {
        self.commands.push(DrawCommand::MoveTo(p));
    }

    pub fn line_to(&mut self, p: DVec2) {
        self.commands.push(DrawCommand::LineTo(p));
    }

    pub fn quad_to(&mut self, control: DVec2, end: DVec2) {
        self.commands.push(DrawCommand::QuadTo(control, end));
    }

    pub fn bezier_to(&mut self, c1: DVec2, c2: DVec2, end: DVec2) {
        self.commands.push(DrawCommand::BezierTo(c1, c2, end));
    }

    pub fn circle(&mut self, center: DVec2, radius: f64) {
        self.commands.push(DrawCommand::Circle { center, radius });
    }

    pub fn ellipse(&mut self, center: DVec2, radii: DVec2, rotation: f64) {
        self.commands.push(DrawCommand::Ellipse {
            center,
            radii,
            rotation,
        });
    }

    pub fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    pub fn fill(&mut self, color: Color, alpha: f64) {
        self.commands.push(DrawCommand::Fill { color, alpha });
    }

    pub fn stroke(&mut self, color: Color, width: f64, alpha: f64) {
        self.commands.push(DrawCommand::Stroke {
            color,
            width,
            alpha,
        });
    }

    /// Quadratic wave from `start` along `dir` for `length`, alternating control
    /// points `amplitude` either side of the line. Used for flagellum tails.
    pub fn wavy_line(&mut self, start: DVec2, dir: DVec2, length: f64, amplitude: f64, waves: u32) {
        let Some(unit) = dir.try_normalize() else {
            return;
        };
        if waves == 0 {
            return;
        }
        let perp = unit.perp();
        let segment = length / waves as f64;

        let mut current = start;
        for i in 0..waves {
            let end = current + unit * segment;
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            let control = current + unit * (segment * 0.5) + perp * amplitude * side;
            self.quad_to(control, end);
            current = end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oklch_extremes() {
        assert_eq!(Color::from_oklch(1.0, 0.0, 0.0), Color::WHITE);
        assert_eq!(Color::from_oklch(0.0, 0.0, 0.0), Color::BLACK);
        let c = Color::from_oklch(0.7, 0.3, 30.0);
        assert!(c.r() > c.b(), "warm hue should lean red: {c:?}");
    }

    #[test]
    fn wavy_line_ends_at_length() {
        let mut list = DrawList::new();
        list.wavy_line(DVec2::ZERO, DVec2::new(3.0, 0.0), 10.0, 2.0, 5);
        assert_eq!(list.len(), 5);
        match list.commands()[4] {
            DrawCommand::QuadTo(_, end) => assert!((end - DVec2::new(10.0, 0.0)).length() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn wavy_line_degenerate_direction_is_noop() {
        let mut list = DrawList::new();
        list.wavy_line(DVec2::ZERO, DVec2::ZERO, 10.0, 2.0, 5);
        assert!(list.is_empty());
    }
}
