//! View manager
//!
//! Owns the registered views, the navigation stack and the shared context.
//! The board's main loop calls [`ViewManager::tick`] once per frame; each
//! tick runs exactly one view, the top of the stack, so shared resources are
//! never used by two views at once.

use alloc::vec::Vec;

use crate::config::Settings;
use crate::context::{Context, Navigation, Platform};
use crate::error::NavError;

use super::lifecycle::{View, ViewState};

/// Upper bound on request/response rounds when applying navigation
///
/// A start callback may itself request navigation; this bounds the chain.
const MAX_NAVIGATION_ROUNDS: usize = 8;

/// Registry of views plus a navigation stack
pub struct ViewManager {
    /// Registered views
    views: Vec<View>,
    /// Navigation stack (top = current)
    stack: Vec<&'static str>,
    /// Views popped while a stop was pending; their stop runs next tick
    retired: Vec<&'static str>,
    /// Shared context
    ctx: Context,
}

impl ViewManager {
    /// Create a manager, loading settings from the platform's storage
    pub fn new(mut platform: Platform) -> Self {
        let settings = Settings::load(platform.storage.as_mut());
        Self::with_settings(platform, settings)
    }

    /// Create a manager with explicit settings
    pub fn with_settings(platform: Platform, settings: Settings) -> Self {
        Self {
            views: Vec::new(),
            stack: Vec::new(),
            retired: Vec::new(),
            ctx: Context::new(platform, settings),
        }
    }

    /// Register a view
    pub fn add(&mut self, view: View) -> Result<(), NavError> {
        if self.index_of(view.name()).is_some() {
            return Err(NavError::DuplicateView);
        }
        debug!("Registered view {}", view.name());
        self.views.push(view);
        Ok(())
    }

    /// Unregister a view that is not on the navigation stack
    pub fn remove(&mut self, name: &str) -> Result<View, NavError> {
        let index = self.index_of(name).ok_or(NavError::UnknownView)?;
        if self.stack.iter().any(|n| *n == name) {
            return Err(NavError::InUse);
        }
        self.finalize_retired(name);
        debug!("Removed view {}", name);
        Ok(self.views.remove(index))
    }

    /// Look up a registered view
    pub fn get_view(&self, name: &str) -> Option<&View> {
        self.views.iter().find(|v| v.name() == name)
    }

    /// Name of the current (top) view
    pub fn current(&self) -> Option<&'static str> {
        self.stack.last().copied()
    }

    /// Number of views on the navigation stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    /// Push and start a registered view
    ///
    /// Switching to the current view is a no-op. If the view fails to start
    /// the stack is left unchanged and `StartFailed` is returned.
    pub fn switch_to(&mut self, name: &str) -> Result<(), NavError> {
        let result = self.push_view(name);
        self.apply_requests();
        result
    }

    /// Pop and stop the current view, resuming the previous one
    ///
    /// The previous view is not restarted; it continues from where it was.
    pub fn back(&mut self) -> Result<(), NavError> {
        let result = self.pop_view();
        self.apply_requests();
        result
    }

    /// Run one frame
    ///
    /// Retired views finish stopping first. While an alert is open the
    /// frame only waits for a button to dismiss it. A current view that has
    /// stopped itself (the root cannot be popped) is started again.
    pub fn tick(&mut self) {
        self.finalize_all_retired();

        if self.ctx.alert_open() {
            if self.ctx.take_button().is_some() {
                debug!("Alert dismissed");
                self.ctx.dismiss_alert();
                self.ctx.mark_dirty();
            }
            return;
        }

        if let Some(name) = self.current() {
            let Self { views, ctx, .. } = &mut *self;
            if let Some(view) = views.iter_mut().find(|v| v.name() == name) {
                view.run(ctx);
            }
        }

        self.apply_requests();
        self.revive_current();
    }

    /// Keep ticking while `keep_running` returns true
    pub fn run_while(&mut self, mut keep_running: impl FnMut(&ViewManager) -> bool) {
        while keep_running(self) {
            self.tick();
        }
    }

    /// Restart the top view if it is on the stack but no longer running
    fn revive_current(&mut self) {
        let Some(name) = self.current() else {
            return;
        };
        let Self { views, ctx, .. } = &mut *self;
        let Some(view) = views.iter_mut().find(|v| v.name() == name) else {
            return;
        };
        if view.state() != ViewState::Inactive {
            return;
        }

        warn!("View {} stopped while current, restarting", name);
        if view.start(ctx) {
            ctx.mark_dirty();
        } else {
            // Retried after the alert is dismissed
            warn!("View {} failed to restart", name);
        }
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.views.iter().position(|v| v.name() == name)
    }

    fn push_view(&mut self, name: &str) -> Result<(), NavError> {
        let index = self.index_of(name).ok_or(NavError::UnknownView)?;
        let name = self.views[index].name();

        if self.current() == Some(name) {
            return Ok(());
        }
        if self.stack.contains(&name) {
            return Err(NavError::AlreadyOnStack);
        }

        self.finalize_retired(name);

        info!("Switching to view {}", name);
        let Self { views, ctx, .. } = &mut *self;
        if !views[index].start(ctx) {
            warn!("View {} failed to start", name);
            return Err(NavError::StartFailed);
        }

        self.stack.push(name);
        self.ctx.mark_dirty();
        Ok(())
    }

    fn pop_view(&mut self) -> Result<(), NavError> {
        if self.stack.len() <= 1 {
            return Err(NavError::AtRoot);
        }
        let Some(name) = self.stack.pop() else {
            return Err(NavError::AtRoot);
        };

        let Self {
            views,
            ctx,
            retired,
            ..
        } = &mut *self;
        if let Some(view) = views.iter_mut().find(|v| v.name() == name) {
            if view.should_stop() {
                // Stop runs on the next tick
                retired.push(name);
            } else {
                view.stop(ctx);
            }
        }

        info!("Back to view {}", self.current().unwrap_or("-"));
        self.ctx.mark_dirty();
        Ok(())
    }

    /// Complete a pending stop for `name` right away
    fn finalize_retired(&mut self, name: &str) {
        if let Some(pos) = self.retired.iter().position(|n| *n == name) {
            self.retired.remove(pos);
            self.run_pending_stop(name);
        }
    }

    fn finalize_all_retired(&mut self) {
        for name in core::mem::take(&mut self.retired) {
            self.run_pending_stop(name);
        }
    }

    fn run_pending_stop(&mut self, name: &str) {
        let Self { views, ctx, .. } = &mut *self;
        if let Some(view) = views.iter_mut().find(|v| v.name() == name) {
            if view.should_stop() {
                view.run(ctx);
            }
        }
    }

    /// Apply navigation queued by app callbacks, in order
    fn apply_requests(&mut self) {
        for _ in 0..MAX_NAVIGATION_ROUNDS {
            if !self.ctx.has_requests() {
                return;
            }
            for request in self.ctx.take_requests() {
                match request {
                    Navigation::Back => {
                        if let Err(e) = self.pop_view() {
                            debug!("Back ignored: {:?}", e);
                        }
                    }
                    Navigation::SwitchTo(name) => {
                        if let Err(e) = self.push_view(name) {
                            warn!("Switch to {} failed: {:?}", name, e);
                            self.ctx.record_navigation_failure();
                        }
                    }
                    Navigation::Add(view) => {
                        if let Err(e) = self.add(view) {
                            debug!("View not added: {:?}", e);
                        }
                    }
                }
            }
        }

        if self.ctx.has_requests() {
            warn!("Navigation did not settle, dropping requests");
            drop(self.ctx.take_requests());
        }
    }
}
