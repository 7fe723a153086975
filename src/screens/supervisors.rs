use std::sync::Arc;

use crate::config::ConfigDocument;
use crate::error::{ScreenError, SupervisorError};
use crate::supervisors::{self, SupervisorForm, SupervisorRow};
use crate::view::{ContentArea, MessageLevel, ScreenEvent, Widget};

use super::{Notice, Screen, ScreenContext};

const COLUMNS: [&str; 4] = ["Name", "Department", "Designation", "RFID"];

/// Block supervisor management: add, update, delete and list.
#[derive(Debug, Default)]
pub struct SupervisorsScreen {
    cfg: Arc<ConfigDocument>,
    rows: Vec<SupervisorRow>,
    form: SupervisorForm,
    notice: Notice,
}

impl SupervisorsScreen {
    fn reload(&mut self, ctx: &mut ScreenContext<'_>) {
        match supervisors::list(ctx.gateway, &self.cfg) {
            Ok(rows) => self.rows = rows,
            Err(e) => {
                self.rows.clear();
                self.notice.set(
                    MessageLevel::Error,
                    format!("Error loading supervisor data: {e}"),
                );
            }
        }
    }

    fn selected_rfid(&self, event: &ScreenEvent) -> Option<String> {
        event
            .selection
            .and_then(|i| self.rows.get(i))
            .map(|r| r.rfid.clone())
    }

    /// Success clears the form and refreshes the table; any failure keeps
    /// what the user typed.
    fn finish(
        &mut self,
        ctx: &mut ScreenContext<'_>,
        result: Result<(), SupervisorError>,
        done: &str,
        failed: &str,
    ) {
        match result {
            Ok(()) => {
                self.notice
                    .set(MessageLevel::Info, format!("Block Supervisor {done} successfully."));
                self.form = SupervisorForm::default();
                self.reload(ctx);
            }
            Err(SupervisorError::Invalid(v)) => self.notice.set(MessageLevel::Warning, v.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "supervisor action failed");
                self.notice
                    .set(MessageLevel::Error, format!("Error {failed} supervisor: {e}"));
            }
        }
    }
}

fn form_from(event: &ScreenEvent) -> SupervisorForm {
    SupervisorForm {
        name: event.value("name").trim().to_string(),
        rfid: event.value("rfid").trim().to_string(),
        department: event.value("department").to_string(),
        role: event.value("role").trim().to_string(),
    }
}

impl Screen for SupervisorsScreen {
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
        area.push(Widget::Heading {
            text: "Block Supervisors".to_string(),
            font: self.cfg.font("h2"),
        });
        area.push(Widget::field(
            "name",
            "Name of Block Supervisor",
            self.form.name.clone(),
            false,
        ));
        area.push(Widget::field(
            "rfid",
            "Supervisor's RFID",
            self.form.rfid.clone(),
            false,
        ));
        area.push(Widget::Choice {
            key: "department".to_string(),
            label: "Department".to_string(),
            options: self.cfg.departments.iter().map(|d| d.name.clone()).collect(),
            selected: self.form.department.clone(),
        });
        area.push(Widget::Choice {
            key: "role".to_string(),
            label: "Designation".to_string(),
            options: self.cfg.roles.clone(),
            selected: self.form.role.clone(),
        });
        area.extend([
            Widget::button("add", "Add"),
            Widget::button("update", "Update"),
            Widget::button("delete", "Delete"),
            Widget::button("clear", "Clear"),
        ]);
        area.push(Widget::Table {
            key: "supervisors".to_string(),
            columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| {
                    vec![
                        r.name.clone(),
                        r.department.clone(),
                        r.designation.clone(),
                        r.rfid.clone(),
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
            "add" => {
                self.form = form_from(event);
                let form = self.form.clone();
                let result = supervisors::add(ctx.gateway, &self.cfg, &form);
                self.finish(ctx, result, "added", "adding");
            }
            "update" => {
                self.form = form_from(event);
                let form = self.form.clone();
                let selected = self.selected_rfid(event);
                let result =
                    supervisors::update(ctx.gateway, &self.cfg, selected.as_deref(), &form);
                self.finish(ctx, result, "updated", "updating");
            }
            "delete" => {
                let selected = self.selected_rfid(event);
                let result = supervisors::delete(ctx.gateway, selected.as_deref());
                self.finish(ctx, result, "deleted", "deleting");
            }
            "clear" => self.form = SupervisorForm::default(),
            "refresh" => self.reload(ctx),
            other => return Err(ScreenError::UnknownAction(other.to_string())),
        }
        Ok(())
    }
}
