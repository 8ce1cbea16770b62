pub type Rgb = [u8; 3];

/// Drawing surface for the plot visualizations.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    /// Connected line through `points`, `line_width` pixels thick.
    fn stroke_polyline(&mut self, points: &[(f32, f32)], line_width: f32, color: Rgb);
}

/// Software RGBA canvas, row-major, 4 bytes per pixel.
pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([self.pixels[idx], self.pixels[idx + 1], self.pixels[idx + 2]])
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as usize * self.width as usize) + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&[color[0], color[1], color[2], 255]);
    }

    fn stamp(&mut self, cx: f32, cy: f32, line_width: f32, color: Rgb) {
        let half = (line_width / 2.0).max(0.5);
        let x0 = (cx - half).round() as i64;
        let x1 = (cx + half).round() as i64;
        let y0 = (cy - half).round() as i64;
        let y1 = (cy + half).round() as i64;
        for y in y0..y1.max(y0 + 1) {
            for x in x0..x1.max(x0 + 1) {
                self.put(x, y, color);
            }
        }
    }
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let x0 = x.round().max(0.0) as i64;
        let y0 = y.round().max(0.0) as i64;
        let x1 = ((x + w).round() as i64).min(self.width as i64);
        let y1 = ((y + h).round() as i64).min(self.height as i64);
        for py in y0..y1 {
            for px in x0..x1 {
                self.put(px, py, color);
            }
        }
    }

    fn stroke_polyline(&mut self, points: &[(f32, f32)], line_width: f32, color: Rgb) {
        if let [(x, y)] = points {
            self.stamp(*x, *y, line_width, color);
            return;
        }
        for segment in points.windows(2) {
            let (x0, y0) = segment[0];
            let (x1, y1) = segment[1];
            let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as usize;
            for step in 0..=steps {
                let t = step as f32 / steps as f32;
                self.stamp(x0 + (x1 - x0) * t, y0 + (y1 - y0) * t, line_width, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_clipped() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.fill_rect(2.0, 2.0, 10.0, 10.0, [255, 0, 0]);
        assert_eq!(canvas.pixel(3, 3), Some([255, 0, 0]));
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0]));
        assert_eq!(canvas.pixel(4, 4), None);
        assert_eq!(canvas.pixels().len(), 64);
    }

    #[test]
    fn polyline_connects_points() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.stroke_polyline(&[(0.0, 5.0), (9.0, 5.0)], 2.0, [9, 9, 9]);
        for x in 0..10 {
            assert_eq!(canvas.pixel(x, 5), Some([9, 9, 9]), "x={}", x);
        }
        assert_eq!(canvas.pixel(5, 0), Some([0, 0, 0]));
    }
}
