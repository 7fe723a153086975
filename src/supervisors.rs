//! Supervisor records and duty-date constraints. Every operation is one
//! statement through the [`Gateway`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{parse_date, ConfigDocument};
use crate::error::{SupervisorError, ValidationError};
use crate::gateway::{text, Gateway, Param, Row};

/// A full `supervisors` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supervisor {
    pub id: i64,
    pub rfid: Option<String>,
    pub name: String,
    pub dept_code: String,
    pub desg: String,
    #[serde(default)]
    pub emp_type: Option<String>,
    #[serde(default)]
    pub post: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// One line of the supervisor table as displayed, department code already
/// replaced by its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Department")]
    pub department: String,
    #[serde(rename = "Designation")]
    pub designation: String,
    #[serde(rename = "RFID")]
    pub rfid: String,
}

/// What the user typed or picked. `department` is the display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorForm {
    pub name: String,
    pub rfid: String,
    pub department: String,
    pub role: String,
}

struct ValidForm<'a> {
    name: &'a str,
    rfid: &'a str,
    dept_code: &'a str,
    role: &'a str,
}

impl SupervisorForm {
    fn validate<'a>(
        &'a self,
        cfg: &'a ConfigDocument,
        action: &'static str,
    ) -> Result<ValidForm<'a>, ValidationError> {
        let name = self.name.trim();
        let rfid = self.rfid.trim();
        let role = self.role.trim();
        let dept_code = cfg.department_code(&self.department).unwrap_or("");
        if name.is_empty() || rfid.is_empty() || dept_code.is_empty() || role.is_empty() {
            return Err(ValidationError::Incomplete { action });
        }
        Ok(ValidForm {
            name,
            rfid,
            dept_code,
            role,
        })
    }
}

fn decode<T: for<'de> Deserialize<'de>>(rows: Vec<Row>) -> Result<Vec<T>, SupervisorError> {
    rows.into_iter()
        .map(|r| serde_json::from_value(Value::Object(r)).map_err(SupervisorError::from))
        .collect()
}

pub fn list(gw: &mut Gateway, cfg: &ConfigDocument) -> Result<Vec<SupervisorRow>, SupervisorError> {
    let rows = gw.fetch(
        "SELECT name AS Name, dept_code AS Department, desg AS Designation,
                COALESCE(rfid, '') AS RFID
         FROM supervisors
         ORDER BY id",
        &[],
    )?;
    let mut out: Vec<SupervisorRow> = decode(rows)?;
    for row in &mut out {
        row.department = cfg.department_name(&row.department).to_string();
    }
    Ok(out)
}

pub fn find_by_rfid(gw: &mut Gateway, rfid: &str) -> Result<Option<Supervisor>, SupervisorError> {
    let rows = gw.fetch(
        "SELECT id, rfid, name, dept_code, desg, emp_type, post, start_date, end_date
         FROM supervisors WHERE rfid = ?",
        &[text(rfid.trim())],
    )?;
    Ok(decode(rows)?.into_iter().next())
}

pub fn list_records(gw: &mut Gateway) -> Result<Vec<Supervisor>, SupervisorError> {
    let rows = gw.fetch(
        "SELECT id, rfid, name, dept_code, desg, emp_type, post, start_date, end_date
         FROM supervisors ORDER BY name, id",
        &[],
    )?;
    decode(rows)
}

pub fn add(
    gw: &mut Gateway,
    cfg: &ConfigDocument,
    form: &SupervisorForm,
) -> Result<(), SupervisorError> {
    let f = form.validate(cfg, "adding")?;
    gw.execute(
        "INSERT INTO supervisors (name, dept_code, desg, rfid) VALUES (?, ?, ?, ?)",
        &[text(f.name), text(f.dept_code), text(f.role), text(f.rfid)],
    )?;
    tracing::info!(rfid = f.rfid, "supervisor added");
    Ok(())
}

/// Updates the row whose RFID was selected; the form may change the RFID.
pub fn update(
    gw: &mut Gateway,
    cfg: &ConfigDocument,
    selected_rfid: Option<&str>,
    form: &SupervisorForm,
) -> Result<(), SupervisorError> {
    let selected = selected_rfid
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::NoSelection { action: "update" })?;
    let f = form.validate(cfg, "updating")?;
    let changed = gw.execute(
        "UPDATE supervisors SET name = ?, dept_code = ?, desg = ?, rfid = ? WHERE rfid = ?",
        &[
            text(f.name),
            text(f.dept_code),
            text(f.role),
            text(f.rfid),
            text(selected),
        ],
    )?;
    if changed == 0 {
        return Err(SupervisorError::NoMatch(selected.to_string()));
    }
    tracing::info!(from = selected, to = f.rfid, "supervisor updated");
    Ok(())
}

pub fn delete(gw: &mut Gateway, selected_rfid: Option<&str>) -> Result<(), SupervisorError> {
    let selected = selected_rfid
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::NoSelection { action: "delete" })?;
    let changed = gw.execute("DELETE FROM supervisors WHERE rfid = ?", &[text(selected)])?;
    if changed == 0 {
        return Err(SupervisorError::NoMatch(selected.to_string()));
    }
    tracing::info!(rfid = selected, "supervisor deleted");
    Ok(())
}

/// Checks the constraint form the way the date pickers would: a supervisor
/// must be chosen and both dates must be `YYYY-MM-DD`.
pub fn validate_constraint(
    supervisor_id: Option<i64>,
    start: &str,
    end: &str,
) -> Result<(i64, NaiveDate, NaiveDate), ValidationError> {
    let (Some(id), false, false) = (supervisor_id, start.trim().is_empty(), end.trim().is_empty())
    else {
        return Err(ValidationError::MissingConstraintFields);
    };
    let start = parse_date(start).ok_or(ValidationError::BadDate {
        field: "Start Date",
    })?;
    let end = parse_date(end).ok_or(ValidationError::BadDate { field: "End Date" })?;
    Ok((id, start, end))
}

pub fn set_constraint(
    gw: &mut Gateway,
    supervisor_id: Option<i64>,
    start: &str,
    end: &str,
) -> Result<(), SupervisorError> {
    let (id, start, end) = validate_constraint(supervisor_id, start, end)?;
    let changed = gw.execute(
        "UPDATE supervisors SET start_date = ?, end_date = ? WHERE id = ?",
        &[
            text(start.format(crate::config::DATE_FORMAT).to_string()),
            text(end.format(crate::config::DATE_FORMAT).to_string()),
            Param::Integer(id),
        ],
    )?;
    if changed == 0 {
        return Err(SupervisorError::NoMatch(format!("id {}", id)));
    }
    tracing::info!(id, %start, %end, "supervisor constraint saved");
    Ok(())
}
