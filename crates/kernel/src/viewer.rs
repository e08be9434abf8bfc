use crate::controller::CameraController;
use crate::error::InitError;
use crate::lifecycle::{LifecycleManager, LifecycleState};
use crate::scheduler::{
    Clock, FrameOutcome, FrameRequester, FrameScheduler, FrameStats, FrameToken, SystemClock,
};
use crate::selector::RenderPath;
use crate::session::{FrameContext, Session};
use glam::Vec2;
use std::future::Future;
use vantage_common::ViewerConfig;
use vantage_input::{InputState, KeyCode, MouseButton};
use vantage_render::{Backend, RenderError};

/// The object a presentation layer drives.
///
/// Device events go in through the `on_*` intake methods at any time; they
/// are reflected in the next frame. Frame callbacks arrive through
/// [`Viewer::on_frame`] with the token the requester handed out.
pub struct Viewer<B: Backend, R: FrameRequester, C: Clock = SystemClock> {
    controller: CameraController,
    input: InputState,
    scheduler: FrameScheduler<R, C>,
    lifecycle: LifecycleManager,
    session: Option<Session<B>>,
}

impl<B: Backend, R: FrameRequester> Viewer<B, R, SystemClock> {
    pub fn new(config: ViewerConfig, requester: R) -> Self {
        Self::with_clock(config, requester, SystemClock)
    }
}

impl<B: Backend, R: FrameRequester, C: Clock> Viewer<B, R, C> {
    pub fn with_clock(config: ViewerConfig, requester: R, clock: C) -> Self {
        Self {
            controller: CameraController::from_config(&config),
            input: InputState::new(),
            scheduler: FrameScheduler::with_clock(requester, clock),
            lifecycle: LifecycleManager::new(config),
            session: None,
        }
    }

    /// Await the backend, wire the session, and start the frame loop.
    ///
    /// On failure nothing is left running and [`Viewer::is_ready`] stays
    /// false. Only the first call does anything.
    pub async fn initialize<F>(&mut self, ready: F) -> Result<(), InitError>
    where
        F: Future<Output = Result<B, RenderError>>,
    {
        let session = self.lifecycle.initialize(ready).await?;
        self.session = Some(session);
        self.scheduler.start();
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn config(&self) -> &ViewerConfig {
        self.lifecycle.config()
    }

    /// Resume the loop. Refused until the session exists.
    pub fn start(&mut self) -> bool {
        if self.session.is_none() {
            tracing::warn!("start refused: backend not ready");
            return false;
        }
        self.scheduler.start()
    }

    pub fn stop(&mut self) -> bool {
        self.scheduler.stop()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn on_key(&mut self, key: KeyCode, pressed: bool) {
        self.input.on_key_change(key, pressed);
    }

    pub fn on_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        self.input.on_mouse_button_change(button, pressed);
    }

    pub fn on_mouse_move(&mut self, x: f32, y: f32) -> Option<Vec2> {
        self.input.on_mouse_move(x, y)
    }

    /// Forget held keys and any drag in progress.
    pub fn on_focus_lost(&mut self) {
        self.input.reset();
    }

    /// Deliver a frame callback from the requester.
    pub fn on_frame(&mut self, token: FrameToken) -> FrameOutcome {
        let Some(session) = self.session.as_mut() else {
            return FrameOutcome::Ignored;
        };
        let mut frame = FrameContext {
            session,
            controller: &self.controller,
            input: &mut self.input,
        };
        self.scheduler.on_frame(token, &mut frame)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(session) = self.session.as_mut() {
            session.resize(width, height);
        }
    }

    /// The renderer that drew the most recent frame.
    pub fn render_path(&self) -> Option<RenderPath> {
        self.session.as_ref().and_then(|s| s.selector().last_path())
    }

    pub fn session(&self) -> Option<&Session<B>> {
        self.session.as_ref()
    }

    pub fn camera(&self) -> Option<&B::Camera> {
        self.session.as_ref().map(|s| s.camera())
    }

    pub fn controller(&self) -> &CameraController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CameraController {
        &mut self.controller
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn stats(&self) -> &FrameStats {
        self.scheduler.stats()
    }

    pub fn requester(&self) -> &R {
        self.scheduler.requester()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manual::{ManualClock, ManualFrames};
    use glam::Vec3;
    use std::pin::pin;
    use std::task::{Context, Waker};
    use vantage_render::{Camera, DrawCall, DrawLog, DrawSurface, HeadlessBackend, HeadlessOptions};

    type TestViewer = Viewer<HeadlessBackend, ManualFrames, ManualClock>;

    const EPS: f32 = 1e-3;

    struct Rig {
        viewer: TestViewer,
        frames: ManualFrames,
        clock: ManualClock,
        log: DrawLog,
    }

    impl Rig {
        fn new(config: ViewerConfig) -> Self {
            let frames = ManualFrames::new();
            let clock = ManualClock::new();
            Self {
                viewer: Viewer::with_clock(config, frames.clone(), clock.clone()),
                frames,
                clock,
                log: DrawLog::new(),
            }
        }

        fn ready(config: ViewerConfig, options: HeadlessOptions) -> Self {
            let mut rig = Self::new(config);
            let log = rig.log.clone();
            pollster::block_on(rig.viewer.initialize(HeadlessBackend::connect(options, log))).unwrap();
            rig
        }

        fn step(&mut self, dt: f32) -> FrameOutcome {
            self.clock.advance_secs(dt);
            let token = self.frames.take_next().unwrap();
            self.viewer.on_frame(token)
        }

        fn position(&self) -> Vec3 {
            self.viewer.camera().unwrap().position()
        }
    }

    fn config() -> ViewerConfig {
        ViewerConfig {
            move_speed: 5.0,
            rotate_sensitivity: 0.01,
            ..ViewerConfig::default()
        }
    }

    #[test]
    fn initialize_starts_the_loop() {
        let rig = Rig::ready(config(), HeadlessOptions::default());
        assert!(rig.viewer.is_ready());
        assert!(rig.viewer.is_running());
        assert_eq!(rig.frames.requested(), 1);
        assert_eq!(rig.viewer.lifecycle_state(), LifecycleState::Ready);
    }

    #[test]
    fn holding_forward_for_one_second_moves_five_units() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        let start = rig.position();
        rig.viewer.on_key(KeyCode::KeyW, true);
        for _ in 0..10 {
            assert_eq!(rig.step(0.1), FrameOutcome::Rendered(RenderPath::Primary));
        }
        let moved = start - rig.position();
        assert!((moved - Vec3::new(0.0, 0.0, 5.0)).length() < EPS);
    }

    #[test]
    fn drag_rotates_by_mouse_delta() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.on_mouse_button(MouseButton::Left, true);
        assert_eq!(rig.viewer.on_mouse_move(100.0, 100.0), None);
        assert_eq!(rig.viewer.on_mouse_move(90.0, 80.0), Some(Vec2::new(10.0, 20.0)));
        rig.step(0.016);

        let camera = rig.viewer.camera().unwrap();
        assert!((camera.yaw() - 0.1).abs() < EPS);
        assert!((camera.pitch() - 0.2).abs() < EPS);
    }

    #[test]
    fn one_draw_per_frame() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        for _ in 0..7 {
            rig.step(0.016);
        }
        assert_eq!(rig.log.len(), 7);
        assert_eq!(rig.viewer.stats().frames, 7);
        assert_eq!(rig.viewer.stats().primary_frames, 7);
    }

    #[test]
    fn never_ready_backend_never_starts() {
        let mut rig = Rig::new(config());
        {
            let never = std::future::pending::<Result<HeadlessBackend, RenderError>>();
            let mut fut = pin!(rig.viewer.initialize(never));
            let mut cx = Context::from_waker(Waker::noop());
            assert!(fut.as_mut().poll(&mut cx).is_pending());
        }
        assert!(!rig.viewer.is_ready());
        assert!(!rig.viewer.is_running());
        assert!(!rig.viewer.start());
        assert_eq!(rig.frames.requested(), 0);
        assert_eq!(rig.viewer.on_frame(FrameToken(1)), FrameOutcome::Ignored);
        assert!(rig.log.is_empty());
    }

    #[test]
    fn unavailable_backend_reports_once() {
        let mut rig = Rig::new(config());
        let result = pollster::block_on(rig.viewer.initialize(HeadlessBackend::unavailable("no gpu")));
        assert!(matches!(result, Err(InitError::BackendUnavailable(_))));
        assert!(!rig.viewer.is_ready());
        assert_eq!(rig.frames.requested(), 0);
    }

    #[test]
    fn shader_failure_routes_every_frame_to_fallback() {
        let options = HeadlessOptions {
            shaders: Vec::new(),
            ..HeadlessOptions::default()
        };
        let mut rig = Rig::ready(config(), options);
        for _ in 0..5 {
            assert_eq!(rig.step(0.016), FrameOutcome::Rendered(RenderPath::Fallback));
        }
        assert_eq!((rig.log.mesh_draws(), rig.log.basic_draws()), (0, 5));
        assert_eq!(rig.viewer.render_path(), Some(RenderPath::Fallback));
    }

    #[test]
    fn stopped_viewer_ignores_late_callbacks() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.step(0.1);
        rig.viewer.on_key(KeyCode::KeyW, true);
        rig.viewer.on_mouse_button(MouseButton::Left, true);
        rig.viewer.on_mouse_move(0.0, 0.0);
        rig.viewer.on_mouse_move(50.0, 50.0);

        let late = rig.frames.peek().unwrap();
        assert!(rig.viewer.stop());
        let before = rig.position();
        let draws = rig.log.len();

        rig.clock.advance_secs(1.0);
        assert_eq!(rig.viewer.on_frame(late), FrameOutcome::Ignored);
        assert_eq!(rig.position(), before);
        assert_eq!(rig.viewer.camera().unwrap().yaw(), 0.0);
        assert_eq!(rig.log.len(), draws);
        assert_eq!(rig.frames.cancelled(), vec![late]);
    }

    #[test]
    fn restart_after_stop_resumes_rendering() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.stop();
        assert!(rig.viewer.start());
        assert!(matches!(rig.step(0.016), FrameOutcome::Rendered(_)));
    }

    #[test]
    fn backward_clock_jump_moves_nothing() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.on_key(KeyCode::KeyW, true);
        let before = rig.position();
        rig.clock.rewind_secs(3.0);
        rig.step(0.0);
        assert_eq!(rig.position(), before);
        assert_eq!(rig.viewer.stats().last_elapsed, 0.0);
    }

    #[test]
    fn frame_fault_keeps_the_loop_alive() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.log.fail_next(1);
        assert_eq!(rig.step(0.016), FrameOutcome::Faulted);
        assert!(rig.viewer.is_running());
        assert_eq!(rig.step(0.016), FrameOutcome::Rendered(RenderPath::Primary));
        assert_eq!(rig.viewer.stats().faults, 1);
        assert_eq!(rig.viewer.stats().frames, 1);
    }

    #[test]
    fn fault_still_clears_key_edges() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.on_key(KeyCode::KeyR, true);
        rig.log.fail_next(1);
        rig.step(0.016);
        assert!(!rig.viewer.input().was_pressed(KeyCode::KeyR));
    }

    #[test]
    fn second_initialize_is_rejected() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        let log = rig.log.clone();
        let again = pollster::block_on(
            rig.viewer
                .initialize(HeadlessBackend::connect(HeadlessOptions::default(), log)),
        );
        assert!(matches!(again, Err(InitError::AlreadyInitialized)));
        assert!(rig.viewer.is_running());
        assert_eq!(rig.frames.requested(), 1);
    }

    #[test]
    fn surface_bind_failure_leaves_viewer_not_ready() {
        let mut rig = Rig::new(config());
        let options = HeadlessOptions {
            fail_surface_bind: true,
            ..HeadlessOptions::default()
        };
        let log = rig.log.clone();
        let result = pollster::block_on(rig.viewer.initialize(HeadlessBackend::connect(options, log)));
        assert!(matches!(result, Err(InitError::SurfaceBind(_))));
        assert!(!rig.viewer.is_ready());
        assert!(!rig.viewer.is_running());
        assert_eq!(rig.frames.requested(), 0);
    }

    #[test]
    fn resize_updates_camera_aspect() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.resize(1000, 500);
        let camera = rig.viewer.camera().unwrap();
        assert_eq!(camera.perspective().aspect, 2.0);
        let surface = rig.viewer.session().unwrap().surface();
        assert_eq!((surface.width(), surface.height()), (1000, 500));
    }

    #[test]
    fn zero_sized_resize_keeps_projection_finite() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.resize(1000, 500);
        rig.viewer.resize(0, 0);
        assert_eq!(rig.viewer.camera().unwrap().perspective().aspect, 2.0);

        assert_eq!(rig.step(0.016), FrameOutcome::Rendered(RenderPath::Primary));
        let Some(DrawCall::Mesh { projection, .. }) = rig.log.last() else {
            panic!("expected a mesh draw");
        };
        assert!(projection.is_finite());
    }

    #[test]
    fn reset_view_restores_initial_pose() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.on_key(KeyCode::KeyD, true);
        rig.step(0.5);
        rig.viewer.on_key(KeyCode::KeyD, false);
        assert_ne!(rig.position(), config().initial_position);

        rig.viewer.on_key(KeyCode::KeyR, true);
        rig.step(0.016);
        assert_eq!(rig.position(), config().initial_position);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.viewer.on_key(KeyCode::KeyW, true);
        rig.viewer.on_focus_lost();
        let before = rig.position();
        rig.step(1.0);
        assert_eq!(rig.position(), before);
    }

    #[test]
    fn lights_animate_with_frames() {
        let mut rig = Rig::ready(config(), HeadlessOptions::default());
        rig.step(0.5);
        rig.step(0.5);
        let session = rig.viewer.session().unwrap();
        assert!((session.lights().time() - 1.0).abs() < EPS);
        let primary = session.selector().primary().unwrap();
        assert_eq!(primary.lights(), session.lights().lights());
    }
}
