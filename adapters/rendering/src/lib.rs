#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts and the software raycaster for Spray Doom.
//!
//! The renderer draws into a [`FrameBuffer`] on the CPU: sky, textured floor,
//! textured walls with a per-column depth buffer, then billboard sprites
//! sorted far to near. Backends only blit the finished frame and overlay
//! their own HUD, so any windowing layer can present the same pixels.

mod camera;
mod floor;
mod frame;
mod renderer;
mod sprites;
mod textures;

use anyhow::Result as AnyResult;
use spraydoom_core::{
    Actor, EntityView, Outcome, PlayerSnapshot, Tag, TileMap, VehicleCategory, WorldPoint,
};
use std::{error::Error, fmt, time::Duration};

pub use camera::{Camera, FIELD_OF_VIEW};
pub use frame::{FrameBuffer, Texel};
pub use renderer::{FrameStats, RaycastRenderer, RenderInput, SKY_COLOR};
pub use sprites::{billboards, Billboard};
pub use textures::{Image, ImageKey, ProceduralTextures, SampleError, TextureProvider};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::from_rgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Input snapshot gathered by adapters before updating the scene.
///
/// Movement, rotation and spray reflect keys held this frame. `tag` and
/// `pause_toggle` are edge-triggered and fire once per press.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Walk forward.
    pub forward: bool,
    /// Walk backward.
    pub backward: bool,
    /// Strafe to the left.
    pub strafe_left: bool,
    /// Strafe to the right.
    pub strafe_right: bool,
    /// Rotate counter-clockwise.
    pub turn_left: bool,
    /// Rotate clockwise.
    pub turn_right: bool,
    /// Spray trigger held.
    pub spray: bool,
    /// Tag action pressed this frame.
    pub tag: bool,
    /// Pause toggle pressed this frame.
    pub pause_toggle: bool,
}

/// Values shown in the heads-up display.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Hud {
    /// Player hit points in `0..=100`.
    pub health: f32,
    /// Spray resource in `0..=100`.
    pub spray: f32,
    /// Number of completed tags.
    pub tags_completed: usize,
    /// Number of tags in the city.
    pub tags_total: usize,
    /// Seed the session was generated from.
    pub seed: u32,
    /// Whether the simulation is paused.
    pub paused: bool,
    /// Terminal outcome once the session ends.
    pub outcome: Option<Outcome>,
}

/// Category of a dot drawn on the minimap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    /// Graffiti target.
    Tag {
        /// Whether the tag has been painted.
        completed: bool,
    },
    /// Civilian pedestrian.
    Civilian,
    /// Police officer on foot.
    Police,
    /// Civilian car.
    CivilianCar,
    /// Police car.
    PoliceCar,
}

/// Dot drawn on the minimap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MinimapMarker {
    /// World position of the marker.
    pub position: WorldPoint,
    /// What the marker represents.
    pub kind: MarkerKind,
}

/// Collects minimap markers for tags first and entities afterwards.
#[must_use]
pub fn minimap_markers(tags: &[Tag], entities: &EntityView) -> Vec<MinimapMarker> {
    let tag_markers = tags.iter().map(|tag| MinimapMarker {
        position: tag.position,
        kind: MarkerKind::Tag {
            completed: tag.completed,
        },
    });
    let entity_markers = entities.iter().map(|entity| MinimapMarker {
        position: entity.position,
        kind: match entity.actor {
            Actor::Civilian { .. } => MarkerKind::Civilian,
            Actor::Police { .. } => MarkerKind::Police,
            Actor::Vehicle {
                category: VehicleCategory::Civilian,
                ..
            } => MarkerKind::CivilianCar,
            Actor::Vehicle {
                category: VehicleCategory::Police,
                ..
            } => MarkerKind::PoliceCar,
        },
    });
    tag_markers.chain(entity_markers).collect()
}

/// Everything a backend needs to present one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// First-person view rendered by the raycaster.
    pub frame: FrameBuffer,
    /// Heads-up display values.
    pub hud: Hud,
    /// Player pose used by the minimap.
    pub player: PlayerSnapshot,
    /// Tags and entities drawn on the minimap.
    pub markers: Vec<MinimapMarker>,
}

impl Scene {
    /// Creates a new scene descriptor.
    #[must_use]
    pub fn new(
        frame: FrameBuffer,
        hud: Hud,
        player: PlayerSnapshot,
        markers: Vec<MinimapMarker>,
    ) -> Self {
        Self {
            frame,
            hud,
            player,
            markers,
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Static city drawn underneath the minimap markers.
    pub map: TileMap,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, map: TileMap, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            map,
            scene,
        }
    }
}

/// Time spent inside the scene update closure, split by phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameSimulationBreakdown {
    /// Time spent advancing the world.
    pub simulation: Duration,
    /// Time spent raycasting the frame.
    pub raycast: Duration,
}

/// Rendering backend capable of presenting Spray Doom scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the raw frame delta
    /// reported by the platform, the input captured this frame, and may
    /// mutate the scene before it is presented.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static;
}

/// Errors that can occur while rendering a frame.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Frames need at least two pixels along each axis to have a horizon.
    FrameTooSmall {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },
    /// The camera pose contained NaN or infinite components.
    NonFinitePose {
        /// Camera position that was rejected.
        position: WorldPoint,
        /// Camera heading that was rejected.
        heading: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooSmall { width, height } => {
                write!(f, "frame of {width}x{height} pixels is too small to render")
            }
            Self::NonFinitePose { position, heading } => write!(
                f,
                "camera pose ({}, {}) heading {heading} is not finite",
                position.x, position.y
            ),
        }
    }
}

impl Error for RenderingError {}
