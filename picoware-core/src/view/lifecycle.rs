//! View lifecycle
//!
//! ```text
//!            start ok             run error / request_stop
//! Inactive ───────────▶ Active ───────────────────────────▶ PendingStop
//!    ▲                    │                                      │
//!    │      stop()        │                                      │
//!    ├────────────────────┘                                      │
//!    │                     next run() executes stop              │
//!    └───────────────────────────────────────────────────────────┘
//! ```
//!
//! Errors never escape a view: every `Err` from the app is shown as an alert
//! and the view degrades to a safe state.

use alloc::boxed::Box;
use alloc::string::ToString;
use core::fmt;

use crate::context::Context;
use crate::error::AppError;

/// The callback triple every app implements
///
/// App state lives in the implementing struct: it is created in `start`,
/// mutated in `run` and released in `stop`.
pub trait App {
    /// Prepare the first frame
    ///
    /// Returns `Ok(true)` when the app is ready to run, `Ok(false)` to decline
    /// (the app is expected to have told the user why). `start` may be called
    /// again after a previous session, so it must rebuild its state rather
    /// than assume a fresh struct.
    fn start(&mut self, ctx: &mut Context) -> Result<bool, AppError>;

    /// Advance one frame
    fn run(&mut self, ctx: &mut Context) -> Result<(), AppError>;

    /// Release everything acquired in `start`
    ///
    /// Also called after a failed `start`, so it must cope with partially
    /// initialized state.
    fn stop(&mut self, ctx: &mut Context) -> Result<(), AppError> {
        let _ = ctx;
        Ok(())
    }
}

/// Lifecycle state of a view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ViewState {
    /// Not started, or stopped
    Inactive,
    /// Started; `run` executes the app each frame
    Active,
    /// A fatal condition was detected; the next `run` stops the view
    PendingStop,
}

/// A named unit of behaviour with error-isolated lifecycle callbacks
pub struct View {
    name: &'static str,
    app: Box<dyn App>,
    state: ViewState,
}

impl View {
    /// Wrap an app under a unique name
    pub fn new(name: &'static str, app: impl App + 'static) -> Self {
        Self::from_box(name, Box::new(app))
    }

    /// Wrap an already boxed app (as produced by the app registry)
    pub fn from_box(name: &'static str, app: Box<dyn App>) -> Self {
        Self {
            name,
            app,
            state: ViewState::Inactive,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Check if the view has started and is running
    pub fn is_active(&self) -> bool {
        self.state == ViewState::Active
    }

    /// Check if a stop is pending for the next `run`
    pub fn should_stop(&self) -> bool {
        self.state == ViewState::PendingStop
    }

    /// Ask for the view to be stopped on its next `run`
    pub fn request_stop(&mut self) {
        if self.state == ViewState::Active {
            self.state = ViewState::PendingStop;
        }
    }

    /// Start the view
    ///
    /// Returns `true` only if the app's `start` succeeded and returned `true`.
    /// On failure the app's `stop` runs to release partial state; errors from
    /// that cleanup are logged but not alerted. A view that is still running
    /// or has a stop pending is stopped before it starts again.
    pub fn start(&mut self, ctx: &mut Context) -> bool {
        if self.state != ViewState::Inactive {
            self.stop(ctx);
        }
        debug!("Starting view {}", self.name);

        match self.app.start(ctx) {
            Ok(true) => {
                self.state = ViewState::Active;
                true
            }
            Ok(false) => {
                info!("View {} declined to start", self.name);
                self.cleanup_failed_start(ctx);
                false
            }
            Err(e) => {
                self.report(ctx, &e);
                self.cleanup_failed_start(ctx);
                false
            }
        }
    }

    /// Stop the view
    ///
    /// The app's `stop` runs only if the view was started, so stopping twice
    /// is harmless. The view always ends inactive.
    pub fn stop(&mut self, ctx: &mut Context) {
        if self.state == ViewState::Inactive {
            trace!("View {} already stopped", self.name);
            return;
        }

        debug!("Stopping view {}", self.name);
        if let Err(e) = self.app.stop(ctx) {
            self.report(ctx, &e);
        }
        self.state = ViewState::Inactive;
    }

    /// Run one frame
    ///
    /// A pending stop is processed instead of the frame. An error from the
    /// app marks the view for stopping and asks the manager to go back.
    pub fn run(&mut self, ctx: &mut Context) {
        match self.state {
            ViewState::PendingStop => self.stop(ctx),
            ViewState::Active => {
                if let Err(e) = self.app.run(ctx) {
                    self.report(ctx, &e);
                    self.state = ViewState::PendingStop;
                    ctx.back();
                }
            }
            ViewState::Inactive => {}
        }
    }

    fn cleanup_failed_start(&mut self, ctx: &mut Context) {
        if let Err(e) = self.app.stop(ctx) {
            warn!("Cleanup of view {} failed: {:?}", self.name, e);
        }
        self.state = ViewState::Inactive;
    }

    fn report(&self, ctx: &mut Context, err: &AppError) {
        error!("View {} failed: {:?}", self.name, err);
        let message = err.to_string();
        ctx.alert(self.name, &message);
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Probe, TestPlatform};

    fn setup(probe: &Probe) -> (View, Context, TestPlatform) {
        let platform = TestPlatform::new();
        let ctx = platform.context();
        let view = View::new("probe", probe.app());
        (view, ctx, platform)
    }

    #[test]
    fn test_new_view_is_inactive() {
        let probe = Probe::new();
        let (view, _, _) = setup(&probe);
        assert_eq!(view.state(), ViewState::Inactive);
        assert!(!view.is_active());
        assert!(!view.should_stop());
    }

    #[test]
    fn test_idle_run_is_noop() {
        let probe = Probe::new();
        let (mut view, mut ctx, _) = setup(&probe);

        view.run(&mut ctx);
        view.run(&mut ctx);

        assert_eq!(probe.runs(), 0);
        assert_eq!(probe.stops(), 0);
        assert_eq!(ctx.diagnostics().alerts, 0);
    }

    #[test]
    fn test_start_success_activates() {
        let probe = Probe::new();
        let (mut view, mut ctx, _) = setup(&probe);

        assert!(view.start(&mut ctx));
        assert!(view.is_active());

        view.run(&mut ctx);
        assert_eq!(probe.runs(), 1);
    }

    #[test]
    fn test_start_declined_stays_inactive() {
        let probe = Probe::new();
        probe.set_start_result(Ok(false));
        let (mut view, mut ctx, _) = setup(&probe);

        assert!(!view.start(&mut ctx));
        assert!(!view.is_active());

        view.run(&mut ctx);
        assert_eq!(probe.runs(), 0);
    }

    #[test]
    fn test_start_error_alerts_once_and_stays_inactive() {
        let probe = Probe::new();
        probe.set_start_result(Err(AppError::Invalid("boom")));
        let (mut view, mut ctx, platform) = setup(&probe);

        assert!(!view.start(&mut ctx));
        assert!(!view.is_active());
        assert_eq!(ctx.diagnostics().alerts, 1);
        assert_eq!(ctx.diagnostics().last_alert.as_deref(), Some("boom"));
        assert!(platform.display.contains_text("boom"));

        view.run(&mut ctx);
        assert_eq!(probe.runs(), 0);
    }

    #[test]
    fn test_failed_start_releases_partial_state() {
        let probe = Probe::new();
        probe.set_start_result(Err(AppError::Invalid("half way")));
        let (mut view, mut ctx, _) = setup(&probe);

        view.start(&mut ctx);
        assert_eq!(probe.stops(), 1);
    }

    #[test]
    fn test_cleanup_error_is_not_alerted() {
        let probe = Probe::new();
        probe.set_start_result(Ok(false));
        probe.set_stop_fails(true);
        let (mut view, mut ctx, _) = setup(&probe);

        view.start(&mut ctx);
        assert_eq!(ctx.diagnostics().alerts, 0);
    }

    #[test]
    fn test_start_clears_pending_stop() {
        let probe = Probe::new();
        let (mut view, mut ctx, _) = setup(&probe);

        view.start(&mut ctx);
        view.request_stop();
        assert!(view.should_stop());

        assert!(view.start(&mut ctx));
        assert!(!view.should_stop());
        assert!(view.is_active());
        // The pending stop ran before the restart
        assert_eq!(probe.stops(), 1);
        assert_eq!(probe.starts(), 2);
    }

    #[test]
    fn test_restarting_active_view_stops_it_first() {
        let probe = Probe::new();
        let (mut view, mut ctx, _) = setup(&probe);

        view.start(&mut ctx);
        view.start(&mut ctx);
        assert_eq!(probe.stops(), 1);
        assert_eq!(probe.starts(), 2);
        assert!(view.is_active());
    }

    #[test]
    fn test_stop_always_clears_flags() {
        let probe = Probe::new();
        probe.set_stop_fails(true);
        let (mut view, mut ctx, _) = setup(&probe);

        view.start(&mut ctx);
        view.stop(&mut ctx);

        assert!(!view.is_active());
        assert!(!view.should_stop());
        // The failing stop is reported
        assert_eq!(ctx.diagnostics().alerts, 1);
    }

    #[test]
    fn test_double_stop_is_harmless() {
        let probe = Probe::new();
        probe.set_stop_fails(true);
        let (mut view, mut ctx, _) = setup(&probe);

        view.start(&mut ctx);
        view.stop(&mut ctx);
        view.stop(&mut ctx);

        assert_eq!(probe.stops(), 1);
        assert_eq!(ctx.diagnostics().alerts, 1);
    }

    #[test]
    fn test_run_error_marks_pending_stop_and_requests_back() {
        let probe = Probe::new();
        probe.fail_run_on(3);
        let (mut view, mut ctx, _) = setup(&probe);

        view.start(&mut ctx);
        view.run(&mut ctx);
        view.run(&mut ctx);
        assert!(view.is_active());

        // Tick 3 fails
        view.run(&mut ctx);
        assert!(!view.is_active());
        assert!(view.should_stop());
        assert_eq!(probe.stops(), 0);
        assert_eq!(ctx.diagnostics().alerts, 1);
        assert!(ctx.has_requests());

        // Tick 4 performs the stop
        view.run(&mut ctx);
        assert_eq!(probe.stops(), 1);
        assert_eq!(probe.runs(), 3);
        assert!(!view.is_active());
        assert!(!view.should_stop());
    }

    #[test]
    fn test_request_stop_only_from_active() {
        let probe = Probe::new();
        let (mut view, mut ctx, _) = setup(&probe);

        view.request_stop();
        assert_eq!(view.state(), ViewState::Inactive);

        view.start(&mut ctx);
        view.request_stop();
        assert_eq!(view.state(), ViewState::PendingStop);

        view.run(&mut ctx);
        assert_eq!(view.state(), ViewState::Inactive);
        assert_eq!(probe.runs(), 0);
        assert_eq!(probe.stops(), 1);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Start(Result<bool, ()>),
            Run(bool),
            Stop(bool),
            RequestStop,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                prop_oneof![Just(Ok(true)), Just(Ok(false)), Just(Err(()))].prop_map(Op::Start),
                any::<bool>().prop_map(Op::Run),
                any::<bool>().prop_map(Op::Stop),
                Just(Op::RequestStop),
            ]
        }

        proptest! {
            #[test]
            fn lifecycle_invariants_hold(ops in proptest::collection::vec(op(), 1..40)) {
                let probe = Probe::new();
                let (mut view, mut ctx, _) = setup(&probe);

                for op in ops {
                    match op {
                        Op::Start(outcome) => {
                            probe.set_start_result(outcome.map_err(|_| AppError::Invalid("start")));
                            let before = view.state();
                            let stops = probe.stops();
                            let started = view.start(&mut ctx);
                            // A live view is always stopped before restarting
                            if before != ViewState::Inactive {
                                prop_assert!(probe.stops() > stops);
                            }
                            prop_assert_eq!(started, outcome == Ok(true));
                            prop_assert_eq!(view.is_active(), started);
                            prop_assert!(!view.should_stop());
                        }
                        Op::Run(fails) => {
                            let before = view.state();
                            let runs = probe.runs();
                            probe.set_run_fails(fails);
                            view.run(&mut ctx);
                            // The app only runs when the view was active
                            if before == ViewState::Active {
                                prop_assert_eq!(probe.runs(), runs + 1);
                            } else {
                                prop_assert_eq!(probe.runs(), runs);
                            }
                            if before == ViewState::PendingStop {
                                prop_assert_eq!(view.state(), ViewState::Inactive);
                            }
                        }
                        Op::Stop(fails) => {
                            let before = view.state();
                            let stops = probe.stops();
                            probe.set_stop_fails(fails);
                            view.stop(&mut ctx);
                            prop_assert!(!view.is_active());
                            prop_assert!(!view.should_stop());
                            if before == ViewState::Inactive {
                                prop_assert_eq!(probe.stops(), stops);
                            }
                        }
                        Op::RequestStop => view.request_stop(),
                    }
                }
            }
        }
    }
}
