//! On-disk layout of a workspace folder and the session that owns its
//! database, settings and shell.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ConfigStore;
use crate::db::DB_FILE_NAME;
use crate::error::ScreenError;
use crate::gateway::Gateway;
use crate::registry::{load_manifest, MenuTarget};
use crate::screens::{builtin_registry, ScreenContext};
use crate::shell::{Shell, ShellState};
use crate::view::ScreenEvent;

pub const CONFIG_FILE: &str = "config/data.json";
pub const MODULES_FILE: &str = "modules.json";

const DEFAULT_DATA_JSON: &str = include_str!("../assets/data.json");
const DEFAULT_MODULES_JSON: &str = include_str!("../assets/modules.json");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceLayout {
    root: PathBuf,
}

impl WorkspaceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn modules_path(&self) -> PathBuf {
        self.root.join(MODULES_FILE)
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(DB_FILE_NAME)
    }

    /// Seeds the settings document and module manifest if they are missing.
    /// Existing files are never touched. Returns the files written.
    pub fn init(&self) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for (path, contents) in [
            (self.config_path(), DEFAULT_DATA_JSON),
            (self.modules_path(), DEFAULT_MODULES_JSON),
        ] {
            if path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, contents)?;
            tracing::info!(path = %path.display(), "seeded default file");
            written.push(path);
        }
        Ok(written)
    }
}

#[derive(Debug)]
pub struct Workspace {
    layout: WorkspaceLayout,
    pub gateway: Gateway,
    pub config: ConfigStore,
    pub shell: Shell,
}

impl Workspace {
    /// Opens every service and shows the home screen. Nothing here is fatal:
    /// a missing database, settings file or manifest is reported through the
    /// corresponding service.
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let layout = WorkspaceLayout::new(root);
        let gateway = Gateway::open(layout.db_path());
        let config = ConfigStore::open(layout.config_path());
        let shell = Shell::new(builtin_registry(), load_manifest(&layout.modules_path()));
        let mut ws = Self {
            layout,
            gateway,
            config,
            shell,
        };
        ws.home();
        ws
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    pub fn home(&mut self) -> ShellState {
        let mut ctx = ScreenContext {
            gateway: &mut self.gateway,
            config: &self.config,
        };
        self.shell.home(&mut ctx)
    }

    pub fn open_screen(&mut self, target: &MenuTarget) -> ShellState {
        let mut ctx = ScreenContext {
            gateway: &mut self.gateway,
            config: &self.config,
        };
        self.shell.open(target, &mut ctx)
    }

    pub fn dispatch(&mut self, event: &ScreenEvent) -> Result<ShellState, ScreenError> {
        let mut ctx = ScreenContext {
            gateway: &mut self.gateway,
            config: &self.config,
        };
        self.shell.dispatch(event, &mut ctx)
    }
}
