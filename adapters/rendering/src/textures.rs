use std::collections::HashMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spraydoom_core::{DecalStyle, FloorKind, WallKind, OUTFIT_VARIANTS, PAINT_VARIANTS};
use thiserror::Error;

use crate::Texel;

const SURFACE_SIZE: u32 = 64;
const SPRITE_SIZE: u32 = 16;
const DECAL_WIDTH: u32 = 48;
const DECAL_HEIGHT: u32 = 32;
const MIST_SIZE: u32 = 96;

/// Seed of the cosmetic stream used to speckle textures.
const TEXTURE_SEED: u64 = 0x5eed_90;

/// Semantic handle of an image supplied by a [`TextureProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageKey {
    /// Facade texture of a wall material.
    Wall(WallKind),
    /// Ground texture of a floor classification.
    Floor(FloorKind),
    /// Civilian pedestrian in one of the outfits.
    Civilian {
        /// Outfit variant.
        outfit: u8,
    },
    /// Police officer on foot.
    Police,
    /// Civilian car seen from the front.
    CarFront {
        /// Paint variant.
        paint: u8,
    },
    /// Civilian car seen from the back.
    CarBack {
        /// Paint variant.
        paint: u8,
    },
    /// Police car seen from the front.
    PoliceCarFront {
        /// Which light pair is lit.
        lights_on: bool,
    },
    /// Police car seen from the back.
    PoliceCarBack,
    /// Graffiti left by a completed tag.
    Decal(DecalStyle),
    /// Translucent cloud drawn while spraying.
    SprayMist,
}

/// Failure to read a texel from a provider.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SampleError {
    /// The provider has no image for the key.
    #[error("no image is registered for {key:?}")]
    Missing {
        /// Requested image.
        key: ImageKey,
    },
    /// The texel lies outside the image.
    #[error("texel ({x}, {y}) lies outside {key:?}")]
    OutOfBounds {
        /// Requested image.
        key: ImageKey,
        /// Requested column.
        x: u32,
        /// Requested row.
        y: u32,
    },
}

/// Source of fixed-size images keyed by [`ImageKey`].
pub trait TextureProvider {
    /// Width and height of the image, or `None` when it is unavailable.
    fn dimensions(&self, key: ImageKey) -> Option<(u32, u32)>;

    /// Reads a single texel.
    fn sample(&self, key: ImageKey, x: u32, y: u32) -> Result<Texel, SampleError>;

    /// Reads the texel under normalised coordinates, clamping to the edges.
    fn sample_uv(&self, key: ImageKey, u: f32, v: f32) -> Result<Texel, SampleError> {
        let (width, height) = self.dimensions(key).ok_or(SampleError::Missing { key })?;
        let x = ((u * width as f32) as i64).clamp(0, i64::from(width) - 1);
        let y = ((v * height as f32) as i64).clamp(0, i64::from(height) - 1);
        self.sample(key, x as u32, y as u32)
    }
}

/// Owned RGBA image.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    texels: Vec<Texel>,
}

impl Image {
    /// Creates an image covered in a single texel.
    #[must_use]
    pub fn filled(width: u32, height: u32, texel: Texel) -> Self {
        Self {
            width,
            height,
            texels: vec![texel; width as usize * height as usize],
        }
    }

    /// Width in texels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Texel at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<Texel> {
        (x < self.width && y < self.height)
            .then(|| self.texels[y as usize * self.width as usize + x as usize])
    }

    fn put(&mut self, x: i64, y: i64, texel: Texel) {
        if x >= 0 && y >= 0 && x < i64::from(self.width) && y < i64::from(self.height) {
            self.texels[y as usize * self.width as usize + x as usize] = texel;
        }
    }

    fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, texel: Texel) {
        for row in y..y + height {
            for column in x..x + width {
                self.put(column, row, texel);
            }
        }
    }

    /// Composites a translucent texel over the opaque pixels in a rectangle.
    fn glaze_rect(&mut self, x: i64, y: i64, width: i64, height: i64, texel: Texel) {
        for row in y..y + height {
            for column in x..x + width {
                let under = u32::try_from(column)
                    .ok()
                    .zip(u32::try_from(row).ok())
                    .and_then(|(x, y)| self.get(x, y));
                if let Some(under) = under {
                    self.put(column, row, texel.over(under));
                }
            }
        }
    }

    fn speckle(&mut self, rng: &mut ChaCha8Rng, count: u32, tint: Texel, max_alpha: f32) {
        for _ in 0..count {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            let alpha = rng.gen_range(0.0..max_alpha);
            self.glaze_rect(i64::from(x), i64::from(y), 1, 1, tint.faded(alpha));
        }
    }
}

/// Pixel-art texture set painted procedurally at start-up.
///
/// Speckles and outfit colours come from a fixed-seed generator, so the art
/// is identical across sessions and never touches the simulation stream.
#[derive(Clone, Debug)]
pub struct ProceduralTextures {
    images: HashMap<ImageKey, Image>,
}

impl Default for ProceduralTextures {
    fn default() -> Self {
        Self::new()
    }
}

impl ProceduralTextures {
    /// Paints every image the renderer asks for.
    #[must_use]
    pub fn new() -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(TEXTURE_SEED);
        let mut images = HashMap::new();

        let _ = images.insert(ImageKey::Wall(WallKind::Brick), brick(&mut rng));
        let _ = images.insert(ImageKey::Wall(WallKind::Concrete), concrete(&mut rng));
        let _ = images.insert(ImageKey::Wall(WallKind::Glass), glass());
        let _ = images.insert(ImageKey::Floor(FloorKind::Road), asphalt(&mut rng));
        let _ = images.insert(ImageKey::Floor(FloorKind::Sidewalk), sidewalk(&mut rng));
        let _ = images.insert(ImageKey::Floor(FloorKind::Park), park(&mut rng));
        let _ = images.insert(
            ImageKey::Floor(FloorKind::CrosswalkVertical),
            crosswalk(Stripes::Vertical),
        );
        let _ = images.insert(
            ImageKey::Floor(FloorKind::CrosswalkHorizontal),
            crosswalk(Stripes::Horizontal),
        );

        for outfit in 0..OUTFIT_VARIANTS {
            let shirt = hsl(rng.gen_range(0.0..360.0), 0.7, 0.6);
            let pants = hsl(rng.gen_range(0.0..360.0), 0.4, 0.4);
            let _ = images.insert(ImageKey::Civilian { outfit }, civilian(shirt, pants));
        }
        let _ = images.insert(ImageKey::Police, police());

        for paint in 0..PAINT_VARIANTS {
            let body = hsl(f32::from(paint) * 360.0 / f32::from(PAINT_VARIANTS), 0.6, 0.5);
            let _ = images.insert(ImageKey::CarFront { paint }, car_front(body));
            let _ = images.insert(ImageKey::CarBack { paint }, car_back(body));
        }
        for lights_on in [false, true] {
            let _ = images.insert(
                ImageKey::PoliceCarFront { lights_on },
                police_car_front(lights_on),
            );
        }
        let _ = images.insert(ImageKey::PoliceCarBack, police_car_back());

        let _ = images.insert(ImageKey::Decal(DecalStyle::Ny90), tag_decal("NY90"));
        let _ = images.insert(ImageKey::Decal(DecalStyle::Doom), tag_decal("DOOM"));
        let _ = images.insert(ImageKey::SprayMist, spray_mist());

        Self { images }
    }

    /// Image registered under `key`.
    #[must_use]
    pub fn image(&self, key: ImageKey) -> Option<&Image> {
        self.images.get(&key)
    }

    /// Number of registered images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns `true` when no image is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl TextureProvider for ProceduralTextures {
    fn dimensions(&self, key: ImageKey) -> Option<(u32, u32)> {
        self.image(key).map(|image| (image.width(), image.height()))
    }

    fn sample(&self, key: ImageKey, x: u32, y: u32) -> Result<Texel, SampleError> {
        let image = self.image(key).ok_or(SampleError::Missing { key })?;
        image
            .get(x, y)
            .ok_or(SampleError::OutOfBounds { key, x, y })
    }
}

fn brick(rng: &mut ChaCha8Rng) -> Image {
    let size = i64::from(SURFACE_SIZE);
    let (course, length) = (size / 8, size / 4);
    let mut image = Image::filled(SURFACE_SIZE, SURFACE_SIZE, Texel::from_hex(0x7d1d1d));
    let mortar = Texel::new(0, 0, 0, 255).faded(0.35);

    for row in 0..size / course {
        let offset = if row % 2 == 1 { length / 2 } else { 0 };
        for column in 0..size / length {
            let red = (120 + rng.gen_range(-15..=15)) as u8;
            let green = (30 + rng.gen_range(-10..=10)) as u8;
            let blue = (30 + rng.gen_range(-10..=10)) as u8;
            let left = (column * length + offset) % size;
            image.fill_rect(
                left + 1,
                row * course + 1,
                length - 2,
                course - 2,
                Texel::new(red, green, blue, 255),
            );
        }
        image.glaze_rect(0, row * course, size, 1, mortar);
        let mut x = offset;
        while x < size + offset {
            image.glaze_rect(x % size, row * course, 1, course, mortar);
            x += length;
        }
    }
    image
}

fn concrete(rng: &mut ChaCha8Rng) -> Image {
    let mut image = Image::filled(SURFACE_SIZE, SURFACE_SIZE, Texel::from_hex(0xcfcfcf));
    image.speckle(rng, 800, Texel::from_hex(0x000000), 0.12);
    for y in 0..i64::from(SURFACE_SIZE) {
        let alpha = 0.05 * (y as f32 / 7.0).sin() + 0.06;
        image.glaze_rect(
            0,
            y,
            i64::from(SURFACE_SIZE),
            1,
            Texel::from_hex(0x000000).faded(alpha),
        );
    }
    image
}

fn glass() -> Image {
    let size = i64::from(SURFACE_SIZE);
    let (top, bottom) = (Texel::from_hex(0xa8e6ff), Texel::from_hex(0x5bb3e6));
    let mut image = Image::filled(SURFACE_SIZE, SURFACE_SIZE, top);
    for y in 0..size {
        let t = y as f32 / (size - 1) as f32;
        image.fill_rect(0, y, size, 1, bottom.faded(t).over(top));
    }
    for y in (0..size).step_by(8) {
        image.glaze_rect(0, y, size, 2, Texel::from_hex(0xffffff).faded(0.25));
        image.glaze_rect(0, y + 4, size, 1, Texel::from_hex(0x000000).faded(0.12));
    }
    image
}

fn asphalt(rng: &mut ChaCha8Rng) -> Image {
    let mut image = Image::filled(SURFACE_SIZE, SURFACE_SIZE, Texel::from_hex(0x2b2b2f));
    image.speckle(rng, 1500, Texel::from_hex(0xffffff), 0.06);
    image
}

fn sidewalk(rng: &mut ChaCha8Rng) -> Image {
    let size = i64::from(SURFACE_SIZE);
    let mut image = Image::filled(SURFACE_SIZE, SURFACE_SIZE, Texel::from_hex(0xbfc5c9));
    let seam = Texel::from_hex(0x000000).faded(0.25);
    for line in (0..size).step_by(8) {
        image.glaze_rect(line, 0, 1, size, seam);
        image.glaze_rect(0, line, size, 1, seam);
    }
    image.speckle(rng, 800, Texel::from_hex(0x000000), 0.12);
    image
}

fn park(rng: &mut ChaCha8Rng) -> Image {
    let mut image = Image::filled(SURFACE_SIZE, SURFACE_SIZE, Texel::from_hex(0x2f6d2f));
    image.speckle(rng, 1000, Texel::from_hex(0xffffff), 0.08);
    image
}

#[derive(Clone, Copy)]
enum Stripes {
    Vertical,
    Horizontal,
}

fn crosswalk(stripes: Stripes) -> Image {
    let size = i64::from(SURFACE_SIZE);
    let mut image = Image::filled(SURFACE_SIZE, SURFACE_SIZE, Texel::from_hex(0x2b2b2f));
    let paint = Texel::from_hex(0xffffff);
    for start in (2..size).step_by(12) {
        match stripes {
            Stripes::Vertical => image.fill_rect(start, 0, 6, size, paint),
            Stripes::Horizontal => image.fill_rect(0, start, size, 6, paint),
        }
    }
    image.glaze_rect(0, 0, size, size, Texel::from_hex(0x000000).faded(0.12));
    image
}

fn sprite() -> Image {
    Image::filled(SPRITE_SIZE, SPRITE_SIZE, Texel::TRANSPARENT)
}

fn police() -> Image {
    let mut image = sprite();
    image.fill_rect(4, 6, 8, 8, Texel::from_hex(0x0b1a5e));
    image.fill_rect(6, 3, 4, 3, Texel::from_hex(0xf1d2b3));
    image.fill_rect(5, 1, 6, 2, Texel::from_hex(0xffffff));
    image.fill_rect(10, 9, 2, 2, Texel::from_hex(0xffd400));
    image.fill_rect(5, 14, 2, 2, Texel::from_hex(0x09144a));
    image.fill_rect(9, 14, 2, 2, Texel::from_hex(0x09144a));
    image
}

fn civilian(shirt: Texel, pants: Texel) -> Image {
    let mut image = sprite();
    image.fill_rect(6, 3, 4, 3, Texel::from_hex(0xf1d8b5));
    image.fill_rect(4, 6, 8, 6, shirt);
    image.fill_rect(5, 12, 6, 3, pants);
    image
}

fn car_front(body: Texel) -> Image {
    let mut image = sprite();
    image.fill_rect(2, 4, 12, 8, body);
    image.fill_rect(4, 1, 8, 3, Texel::from_hex(0xaee7ff));
    image.fill_rect(1, 6, 2, 2, Texel::from_hex(0xffff99));
    image.fill_rect(13, 6, 2, 2, Texel::from_hex(0xffff99));
    image.fill_rect(2, 12, 12, 2, Texel::from_hex(0x000000));
    image
}

fn car_back(body: Texel) -> Image {
    let mut image = sprite();
    image.fill_rect(2, 4, 12, 8, body);
    image.fill_rect(4, 12, 8, 3, Texel::from_hex(0xaee7ff));
    image.fill_rect(1, 8, 2, 3, Texel::from_hex(0xff3333));
    image.fill_rect(13, 8, 2, 3, Texel::from_hex(0xff3333));
    image.fill_rect(2, 4, 12, 2, Texel::from_hex(0x000000));
    image
}

fn police_car_front(lights_on: bool) -> Image {
    let (red, blue) = (Texel::from_hex(0xff3344), Texel::from_hex(0x3aa0ff));
    let (left, right) = if lights_on { (red, blue) } else { (blue, red) };
    let mut image = sprite();
    image.fill_rect(2, 4, 12, 8, Texel::from_hex(0x1b2b8d));
    image.fill_rect(2, 8, 12, 2, Texel::from_hex(0xffffff));
    image.fill_rect(4, 1, 3, 3, left);
    image.fill_rect(9, 1, 3, 3, right);
    image.fill_rect(1, 6, 2, 2, Texel::from_hex(0xffff99));
    image.fill_rect(13, 6, 2, 2, Texel::from_hex(0xffff99));
    image
}

fn police_car_back() -> Image {
    let mut image = sprite();
    image.fill_rect(2, 4, 12, 8, Texel::from_hex(0x1b2b8d));
    image.fill_rect(2, 6, 12, 2, Texel::from_hex(0xffffff));
    image.fill_rect(3, 11, 3, 2, Texel::from_hex(0xff3333));
    image.fill_rect(10, 11, 3, 2, Texel::from_hex(0xff3333));
    image.fill_rect(4, 12, 8, 3, Texel::from_hex(0xaee7ff));
    image
}

/// 3x5 bitmap glyphs, one row per byte with the leftmost pixel in bit 2.
fn glyph(letter: char) -> [u8; 5] {
    match letter {
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '0' | 'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        _ => [0; 5],
    }
}

fn tag_decal(text: &str) -> Image {
    const SCALE: i64 = 3;
    const ADVANCE: i64 = 4 * SCALE - 1;
    let mut image = Image::filled(DECAL_WIDTH, DECAL_HEIGHT, Texel::TRANSPARENT);
    let layers = [0xff3bd4, 0x39ff14, 0x20d0ff];

    for (layer, rgb) in (0_i64..).zip(layers) {
        let paint = Texel::from_hex(rgb);
        for (index, letter) in (0_i64..).zip(text.chars()) {
            let left = 2 + layer + index * ADVANCE;
            let top = 8 + layer;
            for (row, bits) in (0_i64..).zip(glyph(letter)) {
                for column in 0..3_i64 {
                    if bits & (0b100 >> column) != 0 {
                        image.fill_rect(
                            left + column * SCALE,
                            top + row * SCALE,
                            SCALE,
                            SCALE,
                            paint,
                        );
                    }
                }
            }
        }
    }
    image
}

fn spray_mist() -> Image {
    let mut image = Image::filled(MIST_SIZE, MIST_SIZE, Texel::TRANSPARENT);
    let center = MIST_SIZE as f32 / 2.0;
    for y in 0..i64::from(MIST_SIZE) {
        for x in 0..i64::from(MIST_SIZE) {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let falloff = 1.0 - ((dx * dx + dy * dy).sqrt() - 2.0).max(0.0) / (center - 2.0);
            let alpha = (0.35 * falloff.clamp(0.0, 1.0) * 255.0).round() as u8;
            image.put(x, y, Texel::new(255, 255, 255, alpha));
        }
    }
    image
}

fn hsl(hue: f32, saturation: f32, lightness: f32) -> Texel {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue.rem_euclid(360.0) / 60.0;
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (red, green, blue) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let base = lightness - chroma / 2.0;
    let byte = |channel: f32| ((channel + base).clamp(0.0, 1.0) * 255.0).round() as u8;
    Texel::new(byte(red), byte(green), byte(blue), 255)
}
