//! Colors.

/// An RGBA color with components between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0., 0., 0., 1.);
    pub const TRANSPARENT: Color = Color::new(0., 0., 0., 0.);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    /// Unpacks a `0xAARRGGBB` color, the encoding used by color attributes.
    pub fn from_argb(argb: u32) -> Color {
        let channel = |shift: u32| ((argb >> shift) & 0xff) as f32 / 255.;
        Color {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: channel(24),
        }
    }

    /// Packs the color as `0xAARRGGBB`, rounding each channel.
    pub fn to_argb(self) -> u32 {
        let channel = |c: f32| (c.max(0.).min(1.) * 255.).round() as u32;
        (channel(self.a) << 24) | (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }
}

#[test]
fn test_argb_packing() {
    let color = Color::from_argb(0x80ff0000);
    assert_eq!(color.r, 1.);
    assert_eq!(color.g, 0.);
    assert!((color.a - 128. / 255.).abs() < 1e-6);
    assert_eq!(color.to_argb(), 0x80ff0000);
}
