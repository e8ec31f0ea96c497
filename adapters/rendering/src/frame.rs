use crate::{Color, RenderingError};

/// Single RGBA pixel stored as bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Texel {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel, where zero marks a hole in a sprite.
    pub alpha: u8,
}

impl Texel {
    /// Fully transparent texel.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a texel from raw channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque texel from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 255)
    }

    /// Returns `true` when the texel should not be drawn.
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.alpha == 0
    }

    /// Mixes the colour towards black by `amount` in `0.0..=1.0`.
    #[must_use]
    pub fn darken(self, amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        let scale = |channel: u8| (f32::from(channel) * keep).round() as u8;
        Self::new(
            scale(self.red),
            scale(self.green),
            scale(self.blue),
            self.alpha,
        )
    }

    /// Same colour with its alpha multiplied by `factor`.
    #[must_use]
    pub fn faded(self, factor: f32) -> Self {
        let alpha = (f32::from(self.alpha) * factor.clamp(0.0, 1.0)).round() as u8;
        Self { alpha, ..self }
    }

    /// Composites `self` over an opaque `under` texel.
    #[must_use]
    pub fn over(self, under: Self) -> Self {
        let alpha = f32::from(self.alpha) / 255.0;
        let mix = |top: u8, bottom: u8| {
            (f32::from(top) * alpha + f32::from(bottom) * (1.0 - alpha)).round() as u8
        };
        Self::new(
            mix(self.red, under.red),
            mix(self.green, under.green),
            mix(self.blue, under.blue),
            255,
        )
    }
}

impl From<Color> for Texel {
    fn from(color: Color) -> Self {
        let byte = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(
            byte(color.red),
            byte(color.green),
            byte(color.blue),
            byte(color.alpha),
        )
    }
}

/// Software framebuffer with a per-column wall depth buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    bytes: Vec<u8>,
    depth: Vec<f32>,
}

impl FrameBuffer {
    /// Allocates a black frame of the provided resolution.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderingError> {
        if width < 2 || height < 2 {
            return Err(RenderingError::FrameTooSmall { width, height });
        }
        let pixels = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            bytes: [0, 0, 0, 255].repeat(pixels),
            depth: vec![f32::INFINITY; width as usize],
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes in row-major order.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Wall distance recorded for every screen column.
    #[must_use]
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    pub(crate) fn set_depth(&mut self, column: u32, distance: f32) {
        if let Some(slot) = self.depth.get_mut(column as usize) {
            *slot = distance;
        }
    }

    pub(crate) fn reset_depth(&mut self) {
        self.depth.fill(f32::INFINITY);
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    /// Reads the pixel at `(x, y)`.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Texel> {
        let offset = self.offset(x, y)?;
        let pixel = &self.bytes[offset..offset + 4];
        Some(Texel::new(pixel[0], pixel[1], pixel[2], pixel[3]))
    }

    /// Overwrites the pixel at `(x, y)`; writes outside the frame are ignored.
    pub fn set(&mut self, x: u32, y: u32, texel: Texel) {
        if let Some(offset) = self.offset(x, y) {
            self.bytes[offset..offset + 4].copy_from_slice(&[
                texel.red,
                texel.green,
                texel.blue,
                255,
            ]);
        }
    }

    /// Alpha-composites `texel` over the pixel at `(x, y)`.
    pub fn blend(&mut self, x: u32, y: u32, texel: Texel) {
        if texel.is_transparent() {
            return;
        }
        if let Some(under) = self.get(x, y) {
            self.set(x, y, texel.over(under));
        }
    }

    /// Paints every pixel in rows `top..bottom` with one colour.
    pub fn fill_rows(&mut self, top: u32, bottom: u32, texel: Texel) {
        for y in top..bottom.min(self.height) {
            for x in 0..self.width {
                self.set(x, y, texel);
            }
        }
    }
}
