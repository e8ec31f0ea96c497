//! Frame driver that owns the session and runs every system in a fixed order.

use std::time::Duration;

use log::{debug, info};
use spraydoom_core::{Command, Event, Outcome, SimRng, PLAYER_RADIUS};
use spraydoom_rendering::{
    minimap_markers, FrameBuffer, FrameInput, FrameStats, Hud, ProceduralTextures,
    RaycastRenderer, RenderInput, RenderingError, Scene,
};
use spraydoom_system_behavior::{CivilianBehavior, PoliceBehavior, VehicleBehavior};
use spraydoom_system_bootstrap::Session;
use spraydoom_system_combat::Combat;
use spraydoom_system_player_control::{MovementIntent, PlayerControl};
use spraydoom_world::{self as world, query, World};

/// Longest simulated step; slower frames are stretched over several.
pub(crate) const MAX_FRAME_DELTA: Duration = Duration::from_millis(50);

/// What happened to the world during one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FrameStep {
    /// Systems ran and the world advanced.
    Advanced,
    /// The pause gate is closed.
    Paused,
    /// The session already ended.
    Ended,
}

pub(crate) struct Simulation {
    seed: u32,
    world: World,
    rng: SimRng,
    paused: bool,
    player_control: PlayerControl,
    combat: Combat,
    civilians: CivilianBehavior,
    police: PoliceBehavior,
    vehicles: VehicleBehavior,
    commands: Vec<Command>,
    events: Vec<Event>,
}

impl Simulation {
    pub(crate) fn new(session: Session) -> Self {
        Self {
            seed: session.seed,
            world: session.world,
            rng: session.rng,
            paused: false,
            player_control: PlayerControl,
            combat: Combat,
            civilians: CivilianBehavior,
            police: PoliceBehavior,
            vehicles: VehicleBehavior,
            commands: Vec::new(),
            events: Vec::new(),
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Runs one frame: clock, player, spray, tag, civilians, police, vehicles, verdict.
    ///
    /// Commands from each stage are applied before the next stage reads the
    /// world, so later systems observe earlier results within the same frame.
    pub(crate) fn advance(&mut self, dt: Duration, input: &FrameInput) -> FrameStep {
        if query::outcome(&self.world).is_some() {
            return FrameStep::Ended;
        }
        if input.pause_toggle {
            self.paused = !self.paused;
            info!("{}", if self.paused { "paused" } else { "resumed" });
        }
        if self.paused {
            return FrameStep::Paused;
        }

        let dt = dt.min(MAX_FRAME_DELTA);
        self.events.clear();
        self.commands.push(Command::Tick { dt });
        self.flush();

        let player = query::player(&self.world);
        let intent = MovementIntent::from_held(
            input.forward,
            input.backward,
            input.strafe_left,
            input.strafe_right,
            input.turn_left,
            input.turn_right,
        );
        self.player_control.handle(
            &player,
            query::tile_map(&self.world),
            intent,
            dt,
            |point| query::is_blocked(&self.world, point, PLAYER_RADIUS, None),
            &mut self.commands,
        );
        self.flush();

        if input.spray {
            let player = query::player(&self.world);
            let view = query::entity_view(&self.world);
            self.combat.spray(
                &player,
                &view,
                query::tile_map(&self.world),
                dt,
                &mut self.commands,
            );
            self.flush();
        }

        if input.tag {
            let player = query::player(&self.world);
            self.combat.tag(
                &player,
                query::tags(&self.world),
                &mut self.rng,
                &mut self.commands,
            );
            self.flush();
        }

        let view = query::entity_view(&self.world);
        self.civilians.handle(
            &view,
            query::tile_map(&self.world),
            dt,
            &mut self.rng,
            |point, radius, mover| query::is_blocked(&self.world, point, radius, Some(mover)),
            &mut self.commands,
        );
        self.flush();

        let view = query::entity_view(&self.world);
        let player = query::player(&self.world);
        self.police.handle(
            &view,
            &player,
            query::tile_map(&self.world),
            dt,
            &mut self.rng,
            |point, radius, mover| query::is_blocked(&self.world, point, radius, Some(mover)),
            &mut self.commands,
        );
        self.flush();

        let view = query::entity_view(&self.world);
        let player = query::player(&self.world);
        self.vehicles.handle(
            &view,
            &player,
            query::tile_map(&self.world),
            dt,
            &mut self.rng,
            |point, radius, mover| query::is_blocked(&self.world, point, radius, Some(mover)),
            &mut self.commands,
        );
        self.flush();

        let player = query::player(&self.world);
        let (completed, total) = query::tag_progress(&self.world);
        self.combat.evaluate(
            &player,
            completed,
            total,
            query::outcome(&self.world),
            &mut self.commands,
        );
        self.flush();

        for event in &self.events {
            if let Event::TagCompleted {
                completed, total, ..
            } = event
            {
                info!("tag painted ({completed}/{total})");
            }
        }
        debug!(
            "tick {} produced {} events",
            query::tick_index(&self.world),
            self.events.len()
        );
        FrameStep::Advanced
    }

    /// Raycasts the current state into `frame`.
    pub(crate) fn render(
        &self,
        renderer: &RaycastRenderer<ProceduralTextures>,
        frame: &mut FrameBuffer,
        spraying: bool,
    ) -> Result<FrameStats, RenderingError> {
        let player = query::player(&self.world);
        let entities = query::entity_view(&self.world);
        renderer.render(
            &RenderInput {
                map: query::tile_map(&self.world),
                player,
                entities: &entities,
                decals: query::decals(&self.world),
                spraying: spraying && player.spray > 0.0,
            },
            frame,
        )
    }

    pub(crate) fn hud(&self) -> Hud {
        let player = query::player(&self.world);
        let (tags_completed, tags_total) = query::tag_progress(&self.world);
        Hud {
            health: player.health,
            spray: player.spray,
            tags_completed,
            tags_total,
            seed: self.seed,
            paused: self.paused,
            outcome: query::outcome(&self.world),
        }
    }

    pub(crate) fn outcome(&self) -> Option<Outcome> {
        query::outcome(&self.world)
    }

    /// Renders the view and refreshes the HUD and minimap of `scene`.
    ///
    /// The HUD is always refreshed. A failed render leaves the previous
    /// picture on screen.
    pub(crate) fn refresh_scene(
        &self,
        renderer: &RaycastRenderer<ProceduralTextures>,
        scene: &mut Scene,
        spraying: bool,
    ) -> Result<FrameStats, RenderingError> {
        scene.hud = self.hud();
        let stats = self.render(renderer, &mut scene.frame, spraying)?;
        scene.player = query::player(&self.world);
        scene.markers = minimap_markers(query::tags(&self.world), &query::entity_view(&self.world));
        Ok(stats)
    }

    fn flush(&mut self) {
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}
