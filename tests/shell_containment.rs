use seatingd::config::ConfigStore;
use seatingd::error::ScreenError;
use seatingd::gateway::Gateway;
use seatingd::registry::{MenuTarget, ModuleManifest, ScreenRegistry};
use seatingd::screens::{Screen, ScreenContext};
use seatingd::shell::{Shell, ShellState};
use seatingd::view::{ContentArea, MessageLevel, ScreenEvent, Widget};

#[derive(Debug, Default)]
struct Counter {
    clicks: u32,
}

impl Screen for Counter {
    fn mount(
        &mut self,
        area: &mut ContentArea,
        _ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        self.render(area);
        Ok(())
    }

    fn render(&self, area: &mut ContentArea) {
        area.push(Widget::field("clicks", "Clicks", self.clicks.to_string(), true));
        area.push(Widget::button("click", "Click"));
    }

    fn handle(
        &mut self,
        event: &ScreenEvent,
        _ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        match event.action.as_str() {
            "click" => {
                self.clicks += 1;
                Ok(())
            }
            "boom" => panic!("counter overflowed"),
            other => Err(ScreenError::UnknownAction(other.to_string())),
        }
    }
}

#[derive(Debug, Default)]
struct PanicsOnMount;

impl Screen for PanicsOnMount {
    fn mount(
        &mut self,
        area: &mut ContentArea,
        _ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        area.push(Widget::button("half", "Half drawn"));
        panic!("layout exploded");
    }

    fn render(&self, _area: &mut ContentArea) {}
}

#[derive(Debug, Default)]
struct FailsOnMount;

impl Screen for FailsOnMount {
    fn mount(
        &mut self,
        _area: &mut ContentArea,
        _ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        Err(ScreenError::UnknownAction("load".to_string()))
    }

    fn render(&self, _area: &mut ContentArea) {}
}

struct Fixture {
    _dir: tempfile::TempDir,
    gateway: Gateway,
    config: ConfigStore,
    shell: Shell,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let gateway = Gateway::open(dir.path().join("seating.sqlite3"));
        let config = ConfigStore::open(dir.path().join("config/data.json"));
        let mut registry = ScreenRegistry::default();
        registry
            .register::<Counter>("counter")
            .register::<PanicsOnMount>("panics")
            .register::<FailsOnMount>("fails")
            .register_headless("helpers");
        let shell = Shell::new(registry, Ok(ModuleManifest::default()));
        Self {
            _dir: dir,
            gateway,
            config,
            shell,
        }
    }

    fn open(&mut self, unit: &str) -> ShellState {
        let mut ctx = ScreenContext {
            gateway: &mut self.gateway,
            config: &self.config,
        };
        self.shell.open(&MenuTarget::new(unit, unit), &mut ctx)
    }

    fn dispatch(&mut self, action: &str) -> Result<ShellState, ScreenError> {
        let mut ctx = ScreenContext {
            gateway: &mut self.gateway,
            config: &self.config,
        };
        self.shell.dispatch(&ScreenEvent::new(action), &mut ctx)
    }

    fn only_message(&self) -> (MessageLevel, String) {
        let messages: Vec<_> = self
            .shell
            .content()
            .messages()
            .map(|(level, text)| (level, text.to_string()))
            .collect();
        assert_eq!(self.shell.content().widgets().len(), 1);
        assert_eq!(messages.len(), 1);
        messages.into_iter().next().expect("message")
    }
}

#[test]
fn panic_while_mounting_is_contained() {
    let mut fx = Fixture::new();
    assert_eq!(fx.open("panics"), ShellState::ErrorDisplayed);
    assert_eq!(
        fx.only_message(),
        (
            MessageLevel::Error,
            "Error executing 'panics': layout exploded".to_string()
        )
    );
    assert_eq!(fx.shell.active_unit(), None);

    assert_eq!(fx.open("counter"), ShellState::Mounted);
    assert_eq!(fx.shell.active_unit(), Some("counter"));
}

#[test]
fn mount_error_and_headless_unit_show_messages() {
    let mut fx = Fixture::new();
    assert_eq!(fx.open("fails"), ShellState::ErrorDisplayed);
    assert_eq!(
        fx.only_message(),
        (
            MessageLevel::Error,
            "Error executing 'fails': unknown action 'load'".to_string()
        )
    );

    assert_eq!(fx.open("helpers"), ShellState::ErrorDisplayed);
    assert_eq!(
        fx.only_message(),
        (
            MessageLevel::Warning,
            "No display function found in module.".to_string()
        )
    );
}

#[test]
fn dispatch_repaints_and_contains_handler_panics() {
    let mut fx = Fixture::new();
    assert!(matches!(
        fx.dispatch("click"),
        Err(ScreenError::NoActiveScreen)
    ));

    fx.open("counter");
    let first = fx.shell.content().generation();
    fx.dispatch("click").expect("click");
    fx.dispatch("click").expect("click");
    assert!(fx.shell.content().generation() > first);
    assert_eq!(
        fx.shell.content().widgets()[0],
        Widget::field("clicks", "Clicks", "2", true)
    );

    fx.dispatch("nope").expect("handled as message");
    assert_eq!(
        fx.shell.content().messages().last(),
        Some((MessageLevel::Error, "unknown action 'nope'"))
    );
    assert_eq!(fx.shell.active_unit(), Some("counter"));

    match fx.dispatch("boom") {
        Err(ScreenError::Panicked(msg)) => assert_eq!(msg, "counter overflowed"),
        other => panic!("expected a contained panic, got {:?}", other),
    }
    assert_eq!(fx.shell.active_unit(), None);
    assert_eq!(fx.shell.state(), ShellState::ErrorDisplayed);
    assert_eq!(
        fx.only_message().1,
        "Error executing 'counter': counter overflowed"
    );
}

#[test]
fn title_falls_back_to_main_menu() {
    let mut fx = Fixture::new();
    let mut ctx = ScreenContext {
        gateway: &mut fx.gateway,
        config: &fx.config,
    };
    fx.shell.open(&MenuTarget::new("  ", "counter"), &mut ctx);
    assert_eq!(fx.shell.title(), "Main Menu | Seating Arrangement System");
}
