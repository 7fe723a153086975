use std::sync::Arc;

use crate::config::ConfigDocument;
use crate::error::{ScreenError, SupervisorError};
use crate::supervisors::{self, Supervisor};
use crate::view::{ContentArea, MessageLevel, ScreenEvent, Widget};

use super::{Notice, Screen, ScreenContext};

/// Duty-date range per supervisor, chosen by name.
#[derive(Debug, Default)]
pub struct SupervisorConstraintsScreen {
    cfg: Arc<ConfigDocument>,
    supervisors: Vec<Supervisor>,
    picked: Option<usize>,
    start_date: String,
    end_date: String,
    notice: Notice,
}

impl SupervisorConstraintsScreen {
    fn reload(&mut self, ctx: &mut ScreenContext<'_>) {
        match supervisors::list_records(ctx.gateway) {
            Ok(list) => self.supervisors = list,
            Err(e) => {
                self.supervisors.clear();
                self.notice
                    .set(MessageLevel::Error, format!("Error loading supervisors: {e}"));
            }
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        self.supervisors.iter().position(|s| s.name == name)
    }

    fn clear(&mut self) {
        self.picked = None;
        self.start_date.clear();
        self.end_date.clear();
    }

    fn save(&mut self, event: &ScreenEvent, ctx: &mut ScreenContext<'_>, verb: &str) {
        self.picked = self.position_of(event.value("supervisor"));
        self.start_date = event.value("start_date").trim().to_string();
        self.end_date = event.value("end_date").trim().to_string();

        let id = self.picked.map(|i| self.supervisors[i].id);
        match supervisors::set_constraint(ctx.gateway, id, &self.start_date, &self.end_date) {
            Ok(()) => {
                self.notice.set(
                    MessageLevel::Info,
                    format!("Supervisor constraint {verb} successfully."),
                );
                self.clear();
                self.reload(ctx);
            }
            Err(SupervisorError::Invalid(v)) => self.notice.set(MessageLevel::Warning, v.to_string()),
            Err(e) => self.notice.set(MessageLevel::Error, format!("Error: {e}")),
        }
    }
}

impl Screen for SupervisorConstraintsScreen {
    fn mount(
        &mut self,
        area: &mut ContentArea,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        self.cfg = ctx.config.snapshot();
        self.reload(ctx);
        self.render(area);
        Ok(())
    }

    fn render(&self, area: &mut ContentArea) {
        let picked = self.picked.and_then(|i| self.supervisors.get(i));
        let detail = |f: fn(&Supervisor) -> &str| picked.map(f).unwrap_or("").to_string();

        area.push(Widget::Heading {
            text: "Supervisor Constraints Management".to_string(),
            font: self.cfg.font("h1"),
        });
        area.push(Widget::Choice {
            key: "supervisor".to_string(),
            label: "Select Supervisor".to_string(),
            options: self.supervisors.iter().map(|s| s.name.clone()).collect(),
            selected: detail(|s| s.name.as_str()),
        });
        area.extend([
            Widget::field("name", "Name", detail(|s| s.name.as_str()), true),
            Widget::field("rfid", "RFID", detail(|s| s.rfid.as_deref().unwrap_or("")), true),
            Widget::field("dept_code", "Dept Code", detail(|s| s.dept_code.as_str()), true),
            Widget::field("desg", "Designation", detail(|s| s.desg.as_str()), true),
        ]);
        area.extend([
            Widget::DateField {
                key: "start_date".to_string(),
                label: "Start Date".to_string(),
                value: self.start_date.clone(),
            },
            Widget::DateField {
                key: "end_date".to_string(),
                label: "End Date".to_string(),
                value: self.end_date.clone(),
            },
        ]);
        area.extend([
            Widget::button("add", "Add"),
            Widget::button("update", "Update"),
            Widget::button("clear", "Clear"),
        ]);
        area.push(Widget::Table {
            key: "constraints".to_string(),
            columns: ["Name", "RFID", "Start Date", "End Date"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            rows: self
                .supervisors
                .iter()
                .map(|s| {
                    vec![
                        s.name.clone(),
                        s.rfid.clone().unwrap_or_default(),
                        s.start_date.clone().unwrap_or_default(),
                        s.end_date.clone().unwrap_or_default(),
                    ]
                })
                .collect(),
        });
        self.notice.render(area);
    }

    fn handle(
        &mut self,
        event: &ScreenEvent,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        self.notice.dismiss();
        match event.action.as_str() {
            "pick" => {
                self.picked = self.position_of(event.value("supervisor"));
                if self.picked.is_none() {
                    self.notice
                        .set(MessageLevel::Warning, "Supervisor not found!");
                }
            }
            "add" => self.save(event, ctx, "added"),
            "update" => self.save(event, ctx, "updated"),
            "clear" => self.clear(),
            other => return Err(ScreenError::UnknownAction(other.to_string())),
        }
        Ok(())
    }
}
