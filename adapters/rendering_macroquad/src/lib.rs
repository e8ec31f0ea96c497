#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed presentation adapter for Spray Doom.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! The adapter never draws the 3D view itself. It uploads the software
//! framebuffer produced by `spraydoom-rendering` into a nearest-filtered
//! texture, scales it to the window, and overlays the minimap and HUD text.

mod minimap;

use anyhow::{Context, Result};
use log::info;
use macroquad::{
    input::{is_key_down, is_key_pressed, is_mouse_button_down, KeyCode, MouseButton},
    texture::{draw_texture_ex, DrawTextureParams, FilterMode, Image, Texture2D},
};
use spraydoom_core::Outcome;
use spraydoom_rendering::{
    Color, FrameInput, FrameSimulationBreakdown, Hud, Presentation, RenderingBackend, Scene,
};
use std::{
    fmt,
    time::{Duration, Instant},
};

use self::minimap::{draw_minimap, MinimapLayout};

/// Window pixels per framebuffer pixel requested at start-up.
const DEFAULT_WINDOW_SCALE: u32 = 3;

const HUD_FONT_SIZE: f32 = 22.0;
const BANNER_FONT_SIZE: f32 = 48.0;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Escape` quits the game loop.
    quit_requested: bool,
    /// `P` toggles the pause gate.
    pause_toggle: bool,
    /// `F` attempts to paint the nearest tag.
    tag: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            pause_toggle: is_key_pressed(KeyCode::P),
            tag: is_key_pressed(KeyCode::F),
        }
    }
}

fn gather_frame_input(keyboard: KeyboardShortcuts) -> FrameInput {
    frame_input_from_observations(
        is_key_down,
        is_mouse_button_down(MouseButton::Left),
        keyboard,
    )
}

fn frame_input_from_observations(
    held: impl Fn(KeyCode) -> bool,
    mouse_spray: bool,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    let any = |keys: &[KeyCode]| keys.iter().any(|key| held(*key));
    FrameInput {
        forward: any(&[KeyCode::W, KeyCode::Up]),
        backward: any(&[KeyCode::S, KeyCode::Down]),
        strafe_left: any(&[KeyCode::A]),
        strafe_right: any(&[KeyCode::D]),
        turn_left: any(&[KeyCode::Q, KeyCode::Left]),
        turn_right: any(&[KeyCode::E, KeyCode::Right]),
        spray: mouse_spray || any(&[KeyCode::Space]),
        tag: keyboard.tag,
        pause_toggle: keyboard.pause_toggle,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_scale: u32,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            window_scale: DEFAULT_WINDOW_SCALE,
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Configures how many window pixels cover one framebuffer pixel at start-up.
    #[must_use]
    pub fn with_window_scale(mut self, scale: u32) -> Self {
        self.window_scale = scale.max(1);
        self
    }
}

/// Once-per-second summary of where frame time went.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameReport {
    fps: f32,
    simulation: Duration,
    raycast: Duration,
    present: Duration,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let millis = |duration: Duration| duration.as_secs_f64() * 1_000.0;
        write!(
            f,
            "{:.1} fps | sim {:.2}ms raycast {:.2}ms present {:.2}ms",
            self.fps,
            millis(self.simulation),
            millis(self.raycast),
            millis(self.present),
        )
    }
}

/// Accumulates per-frame timings and yields a [`FrameReport`] every second.
#[derive(Debug, Default)]
struct FrameClock {
    elapsed: Duration,
    frames: u32,
    simulation: Duration,
    raycast: Duration,
    present: Duration,
}

impl FrameClock {
    fn record(
        &mut self,
        frame: Duration,
        work: FrameSimulationBreakdown,
        present: Duration,
    ) -> Option<FrameReport> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation += work.simulation;
        self.raycast += work.raycast;
        self.present += present;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let frames = self.frames;
        let report = FrameReport {
            fps: frames as f32 / self.elapsed.as_secs_f32(),
            simulation: self.simulation / frames,
            raycast: self.raycast / frames,
            present: self.present / frames,
        };
        *self = Self::default();
        Some(report)
    }
}

/// Placement of the scaled framebuffer inside the window.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ViewportMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    width: f32,
    height: f32,
}

impl ViewportMetrics {
    /// Fits a `frame_width` x `frame_height` image into the screen, preserving its aspect ratio.
    fn fit(frame_width: u32, frame_height: u32, screen_width: f32, screen_height: f32) -> Self {
        let (frame_width, frame_height) = (frame_width.max(1) as f32, frame_height.max(1) as f32);
        let scale = (screen_width / frame_width)
            .min(screen_height / frame_height)
            .max(0.0);
        let width = frame_width * scale;
        let height = frame_height * scale;
        Self {
            scale,
            offset_x: (screen_width - width) / 2.0,
            offset_y: (screen_height - height) / 2.0,
            width,
            height,
        }
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameSimulationBreakdown + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_scale,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            map,
            scene,
        } = presentation;

        let frame_width = u16::try_from(scene.frame.width())
            .context("framebuffer width does not fit in a texture")?;
        let frame_height = u16::try_from(scene.frame.height())
            .context("framebuffer height does not fit in a texture")?;
        let plan_width =
            u16::try_from(map.columns()).context("city is too wide for the minimap texture")?;
        let plan_height =
            u16::try_from(map.rows()).context("city is too tall for the minimap texture")?;
        let window_width = i32::try_from(u32::from(frame_width) * window_scale)
            .context("window width overflows")?;
        let window_height = i32::try_from(u32::from(frame_height) * window_scale)
            .context("window height overflows")?;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        info!(
            "opening {window_width}x{window_height} window for a {frame_width}x{frame_height} frame"
        );

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut clock = FrameClock::default();

            let view = Texture2D::from_rgba8(frame_width, frame_height, scene.frame.bytes());
            view.set_filter(FilterMode::Nearest);
            let floor_plan = Texture2D::from_rgba8(
                plan_width,
                plan_height,
                &minimap::floor_plan_pixels(&map),
            );
            floor_plan.set_filter(FilterMode::Nearest);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let frame_input = gather_frame_input(keyboard);

                let simulation_breakdown = update_scene(frame_dt, frame_input, &mut scene);

                let present_start = Instant::now();
                view.update(&Image {
                    bytes: scene.frame.bytes().to_vec(),
                    width: frame_width,
                    height: frame_height,
                });
                let viewport = ViewportMetrics::fit(
                    u32::from(frame_width),
                    u32::from(frame_height),
                    screen_width,
                    screen_height,
                );
                draw_texture_ex(
                    view,
                    viewport.offset_x,
                    viewport.offset_y,
                    macroquad::color::WHITE,
                    DrawTextureParams {
                        dest_size: Some(macroquad::math::Vec2::new(
                            viewport.width,
                            viewport.height,
                        )),
                        ..DrawTextureParams::default()
                    },
                );

                let layout = MinimapLayout::fit(
                    map.columns(),
                    map.rows(),
                    viewport.offset_x,
                    viewport.offset_y,
                    viewport.width,
                );
                draw_minimap(floor_plan, &layout, &scene);
                draw_hud(&scene.hud, &viewport);
                draw_banner(&scene.hud, &viewport);

                let present_duration = present_start.elapsed();

                let report = clock.record(frame_dt, simulation_breakdown, present_duration);
                if let Some(report) = report.filter(|_| show_fps) {
                    info!("{report}");
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

fn hud_line(hud: &Hud) -> String {
    format!(
        "HP {:>3}  SPRAY {:>3}  TAGS {}/{}  SEED {}",
        hud.health.clamp(0.0, 100.0) as u32,
        hud.spray.clamp(0.0, 100.0) as u32,
        hud.tags_completed,
        hud.tags_total,
        hud.seed,
    )
}

fn banner_text(hud: &Hud) -> Option<&'static str> {
    match hud.outcome {
        Some(Outcome::Won) => Some("ALL TAGS DONE! THE CITY IS YOURS"),
        Some(Outcome::Lost) => Some("BUSTED! GAME OVER"),
        None if hud.paused => Some("PAUSED"),
        None => None,
    }
}

fn draw_hud(hud: &Hud, viewport: &ViewportMetrics) {
    let text = hud_line(hud);
    let x = viewport.offset_x + 12.0;
    let y = viewport.offset_y + viewport.height - 14.0;
    let _ = macroquad::text::draw_text(
        &text,
        x + 2.0,
        y + 2.0,
        HUD_FONT_SIZE,
        macroquad::color::BLACK,
    );
    let _ = macroquad::text::draw_text(
        &text,
        x,
        y,
        HUD_FONT_SIZE,
        to_macroquad_color(Color::from_hex(0x39ff14)),
    );
}

fn draw_banner(hud: &Hud, viewport: &ViewportMetrics) {
    let Some(text) = banner_text(hud) else {
        return;
    };
    let size = macroquad::text::measure_text(text, None, BANNER_FONT_SIZE as u16, 1.0);
    let x = viewport.offset_x + (viewport.width - size.width) / 2.0;
    let y = viewport.offset_y + viewport.height / 2.0;
    macroquad::shapes::draw_rectangle(
        viewport.offset_x,
        y - size.height * 1.5,
        viewport.width,
        size.height * 2.5,
        to_macroquad_color(Color::from_hex(0x000000).with_alpha(0.6)),
    );
    let color = match hud.outcome {
        Some(Outcome::Lost) => Color::from_hex(0xff3344),
        Some(Outcome::Won) => Color::from_hex(0x39ff14),
        None => Color::from_hex(0xffcc00),
    };
    let _ = macroquad::text::draw_text(text, x, y, BANNER_FONT_SIZE, to_macroquad_color(color));
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
