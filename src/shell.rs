//! Navigation shell: owns the menu and the content area, mounts one screen at
//! a time and keeps running whatever the screen does.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use crate::error::{RegistryError, ScreenError};
use crate::registry::{build_menu, MenuItem, MenuTarget, ModuleManifest, ScreenRegistry, Unit};
use crate::screens::{self, Screen, ScreenContext};
use crate::view::{ContentArea, MessageLevel, ScreenEvent, Widget};

pub const APP_TITLE: &str = "Seating Arrangement System";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ShellState {
    Idle,
    Loading,
    Mounted,
    ErrorDisplayed,
}

#[derive(Debug)]
struct ActiveScreen {
    unit: String,
    screen: Box<dyn Screen>,
}

#[derive(Debug)]
pub struct Shell {
    registry: ScreenRegistry,
    menu: Vec<MenuItem>,
    menu_error: Option<String>,
    content: ContentArea,
    state: ShellState,
    title: String,
    active: Option<ActiveScreen>,
}

/// Serialisable snapshot of what the window currently shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellView<'a> {
    pub title: &'a str,
    pub state: ShellState,
    pub unit: Option<&'a str>,
    pub content: &'a ContentArea,
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "screen panicked".to_string()
    }
}

impl Shell {
    /// A manifest that failed to load leaves the menu with only Exit; the
    /// error is kept so the window can report it.
    pub fn new(registry: ScreenRegistry, manifest: Result<ModuleManifest, RegistryError>) -> Self {
        let (manifest, menu_error) = match manifest {
            Ok(m) => (m, None),
            Err(e) => {
                tracing::error!(error = %e, "module registry unavailable");
                (ModuleManifest::default(), Some(e.to_string()))
            }
        };
        Self {
            registry,
            menu: build_menu(&manifest),
            menu_error,
            content: ContentArea::new(),
            state: ShellState::Idle,
            title: APP_TITLE.to_string(),
            active: None,
        }
    }

    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    pub fn menu_error(&self) -> Option<&str> {
        self.menu_error.as_deref()
    }

    pub fn state(&self) -> ShellState {
        self.state
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &ContentArea {
        &self.content
    }

    pub fn active_unit(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.unit.as_str())
    }

    pub fn view(&self) -> ShellView<'_> {
        ShellView {
            title: &self.title,
            state: self.state,
            unit: self.active_unit(),
            content: &self.content,
        }
    }

    fn teardown(&mut self) {
        if let Some(mut active) = self.active.take() {
            tracing::debug!(unit = %active.unit, "unmounting screen");
            active.screen.unmount();
        }
        self.content.clear();
    }

    fn show_error(&mut self, text: String) {
        tracing::warn!("{}", text);
        self.content.clear();
        self.content.push(Widget::message(MessageLevel::Error, text));
        self.state = ShellState::ErrorDisplayed;
    }

    pub fn home(&mut self, ctx: &mut ScreenContext<'_>) -> ShellState {
        self.open(&MenuTarget::new("Home", screens::HOME), ctx)
    }

    /// Tears down whatever is mounted, then resolves and mounts `target`.
    pub fn open(&mut self, target: &MenuTarget, ctx: &mut ScreenContext<'_>) -> ShellState {
        self.teardown();
        let name = if target.name.trim().is_empty() {
            "Main Menu"
        } else {
            target.name.trim()
        };
        self.title = format!("{} | {}", name, APP_TITLE);
        self.state = ShellState::Loading;
        tracing::info!(unit = %target.unit, name, "opening screen");

        let factory = match self.registry.resolve(&target.unit) {
            None => {
                self.show_error(format!("Error: '{}' not found.", target.unit));
                return self.state;
            }
            Some(Unit::Headless) => {
                self.content.push(Widget::message(
                    MessageLevel::Warning,
                    "No display function found in module.",
                ));
                self.state = ShellState::ErrorDisplayed;
                return self.state;
            }
            Some(Unit::Screen(factory)) => factory,
        };

        let content = &mut self.content;
        let mounted = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut screen = factory();
            screen.mount(content, ctx).map(|()| screen)
        }));
        match mounted {
            Ok(Ok(screen)) => {
                self.active = Some(ActiveScreen {
                    unit: target.unit.clone(),
                    screen,
                });
                self.state = ShellState::Mounted;
            }
            Ok(Err(e)) => {
                self.show_error(format!("Error executing '{}': {}", target.unit, e));
            }
            Err(payload) => {
                self.show_error(format!(
                    "Error executing '{}': {}",
                    target.unit,
                    panic_message(payload)
                ));
            }
        }
        self.state
    }

    /// Forwards a user action to the mounted screen and repaints it. A
    /// returned error is shown under the repainted screen; a panic unmounts
    /// the screen.
    pub fn dispatch(
        &mut self,
        event: &ScreenEvent,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<ShellState, ScreenError> {
        let Some(active) = self.active.as_mut() else {
            return Err(ScreenError::NoActiveScreen);
        };
        let unit = active.unit.clone();
        tracing::debug!(unit = %unit, action = %event.action, "dispatching screen event");

        let screen = &mut active.screen;
        let handled = panic::catch_unwind(AssertUnwindSafe(|| screen.handle(event, ctx)));
        match handled {
            Ok(result) => {
                self.content.clear();
                active.screen.render(&mut self.content);
                if let Err(e) = result {
                    tracing::warn!(unit = %unit, error = %e, "screen action failed");
                    self.content
                        .push(Widget::message(MessageLevel::Error, e.to_string()));
                }
                Ok(self.state)
            }
            Err(payload) => {
                let message = panic_message(payload);
                self.teardown();
                self.show_error(format!("Error executing '{}': {}", unit, message));
                Err(ScreenError::Panicked(message))
            }
        }
    }
}
