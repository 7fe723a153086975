//! Module registry: the `modules.json` manifest that shapes the menu, and the
//! startup-time table mapping unit identifiers to screen factories.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::screens::Screen;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleManifest {
    #[serde(default)]
    pub modules: Vec<ModuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleEntry {
    pub module_name: String,
    #[serde(default)]
    pub submodules: Vec<MenuNode>,
}

/// A group is tried first so `{name, submodules}` never parses as a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MenuNode {
    Group {
        name: String,
        submodules: Vec<MenuNode>,
    },
    Leaf(MenuTarget),
}

/// What a menu command opens. `file` carries the registered unit id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuTarget {
    pub name: String,
    #[serde(rename = "file")]
    pub unit: String,
}

impl MenuTarget {
    pub fn new(name: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            unit: unit.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MenuItem {
    Command { label: String, target: MenuTarget },
    Cascade { label: String, items: Vec<MenuItem> },
    Exit { label: String },
}

pub fn load_manifest(path: &Path) -> Result<ModuleManifest, RegistryError> {
    let raw = fs::read_to_string(path).map_err(|source| RegistryError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| RegistryError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// One cascade per module, nested cascades per group, and a trailing Exit.
/// Every command owns a copy of its own target.
pub fn build_menu(manifest: &ModuleManifest) -> Vec<MenuItem> {
    let mut menu: Vec<MenuItem> = manifest
        .modules
        .iter()
        .map(|m| MenuItem::Cascade {
            label: m.module_name.clone(),
            items: menu_items(&m.submodules),
        })
        .collect();
    menu.push(MenuItem::Exit {
        label: "Exit".to_string(),
    });
    menu
}

fn menu_items(nodes: &[MenuNode]) -> Vec<MenuItem> {
    nodes
        .iter()
        .map(|node| match node {
            MenuNode::Group { name, submodules } => MenuItem::Cascade {
                label: name.clone(),
                items: menu_items(submodules),
            },
            MenuNode::Leaf(target) => MenuItem::Command {
                label: target.name.clone(),
                target: target.clone(),
            },
        })
        .collect()
}

pub type ScreenFactory = fn() -> Box<dyn Screen>;

#[derive(Debug, Clone, Copy)]
pub enum Unit {
    Screen(ScreenFactory),
    /// Registered, but exposes nothing to mount.
    Headless,
}

fn make<S: Screen + Default + 'static>() -> Box<dyn Screen> {
    Box::new(S::default())
}

#[derive(Debug, Default)]
pub struct ScreenRegistry {
    units: BTreeMap<String, Unit>,
}

impl ScreenRegistry {
    pub fn register<S: Screen + Default + 'static>(&mut self, id: &str) -> &mut Self {
        self.register_factory(id, make::<S>)
    }

    pub fn register_factory(&mut self, id: &str, factory: ScreenFactory) -> &mut Self {
        self.units.insert(id.to_string(), Unit::Screen(factory));
        self
    }

    pub fn register_headless(&mut self, id: &str) -> &mut Self {
        self.units.insert(id.to_string(), Unit::Headless);
        self
    }

    pub fn resolve(&self, id: &str) -> Option<Unit> {
        self.units.get(id.trim()).copied()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> ModuleManifest {
        serde_json::from_value(json!({
            "modules": [
                {
                    "module_name": "System Parameters",
                    "submodules": [
                        { "name": "Institute Information", "file": "institute_info" },
                        {
                            "name": "Supervisors",
                            "submodules": [
                                { "name": "Block Supervisors", "file": "supervisors" },
                                {
                                    "name": "Constraints",
                                    "submodules": [
                                        { "name": "Duty Dates", "file": "supervisor_constraints" }
                                    ]
                                }
                            ]
                        }
                    ]
                },
                { "module_name": "Reports" }
            ]
        }))
        .expect("manifest")
    }

    #[test]
    fn menu_follows_manifest_order_at_every_depth() {
        let menu = build_menu(&manifest());
        assert_eq!(menu.len(), 3);
        assert_eq!(
            menu[2],
            MenuItem::Exit {
                label: "Exit".to_string()
            }
        );

        let MenuItem::Cascade { label, items } = &menu[0] else {
            panic!("expected cascade");
        };
        assert_eq!(label, "System Parameters");
        assert_eq!(
            items[0],
            MenuItem::Command {
                label: "Institute Information".to_string(),
                target: MenuTarget::new("Institute Information", "institute_info"),
            }
        );
        let MenuItem::Cascade { items: nested, .. } = &items[1] else {
            panic!("expected nested cascade");
        };
        let MenuItem::Cascade { items: deepest, .. } = &nested[1] else {
            panic!("expected third level");
        };
        assert_eq!(
            deepest[0],
            MenuItem::Command {
                label: "Duty Dates".to_string(),
                target: MenuTarget::new("Duty Dates", "supervisor_constraints"),
            }
        );

        let MenuItem::Cascade { items: empty, .. } = &menu[1] else {
            panic!("expected cascade");
        };
        assert!(empty.is_empty());
    }

    #[test]
    fn manifest_read_errors_name_the_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("modules.json");
        let e = load_manifest(&path).expect_err("missing");
        assert!(e.to_string().contains("modules.json"));

        fs::write(&path, "{ \"modules\": 3 }").expect("write");
        assert!(matches!(
            load_manifest(&path),
            Err(RegistryError::Parse { .. })
        ));
    }

    #[test]
    fn registry_distinguishes_screens_headless_and_unknown() {
        let mut registry = crate::screens::builtin_registry();
        registry.register_headless("reports.absent_cases");

        assert!(matches!(registry.resolve("home"), Some(Unit::Screen(_))));
        assert!(matches!(
            registry.resolve("reports.absent_cases"),
            Some(Unit::Headless)
        ));
        assert!(registry.resolve("exam_blocks").is_none());
        assert!(registry.ids().any(|id| id == "supervisor_constraints"));
    }
}
