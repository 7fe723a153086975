//! Feature screens. Each one is a mountable unit registered under a stable
//! identifier; the shell never touches their internals.

mod constraints;
mod home;
mod institute;
mod supervisors;

pub use constraints::SupervisorConstraintsScreen;
pub use home::HomeScreen;
pub use institute::InstituteInfoScreen;
pub use supervisors::SupervisorsScreen;

use crate::config::ConfigStore;
use crate::error::ScreenError;
use crate::gateway::Gateway;
use crate::registry::ScreenRegistry;
use crate::view::{ContentArea, MessageLevel, ScreenEvent, Widget};

pub const HOME: &str = "home";
pub const SUPERVISORS: &str = "supervisors";
pub const SUPERVISOR_CONSTRAINTS: &str = "supervisor_constraints";
pub const INSTITUTE_INFO: &str = "institute_info";

/// Services a screen may use while mounting or handling an action.
#[derive(Debug)]
pub struct ScreenContext<'a> {
    pub gateway: &'a mut Gateway,
    pub config: &'a ConfigStore,
}

pub trait Screen: std::fmt::Debug {
    /// Loads reference data and renders into `area`.
    fn mount(
        &mut self,
        area: &mut ContentArea,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError>;

    /// Paints the current state. `area` is empty when this is called.
    fn render(&self, area: &mut ContentArea);

    fn handle(
        &mut self,
        event: &ScreenEvent,
        _ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        Err(ScreenError::UnknownAction(event.action.clone()))
    }

    fn unmount(&mut self) {}
}

pub fn builtin_registry() -> ScreenRegistry {
    let mut registry = ScreenRegistry::default();
    registry
        .register::<HomeScreen>(HOME)
        .register::<SupervisorsScreen>(SUPERVISORS)
        .register::<SupervisorConstraintsScreen>(SUPERVISOR_CONSTRAINTS)
        .register::<InstituteInfoScreen>(INSTITUTE_INFO);
    registry
}

/// A pending dismissible message, shown once below the form.
#[derive(Debug, Clone, Default)]
struct Notice(Option<(MessageLevel, String)>);

impl Notice {
    fn set(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.0 = Some((level, text.into()));
    }

    fn dismiss(&mut self) {
        self.0 = None;
    }

    fn render(&self, area: &mut ContentArea) {
        if let Some((level, text)) = &self.0 {
            area.push(Widget::message(*level, text.clone()));
        }
    }
}
