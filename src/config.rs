//! Settings document (`config/data.json`) and the process-wide store that
//! hands out immutable snapshots of it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn fallback_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// `[family, size, weight]` in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, u16, String)", into = "(String, u16, String)")]
pub struct FontSpec {
    pub family: String,
    pub size: u16,
    pub weight: String,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 14,
            weight: "normal".to_string(),
        }
    }
}

impl From<(String, u16, String)> for FontSpec {
    fn from((family, size, weight): (String, u16, String)) -> Self {
        Self {
            family,
            size,
            weight,
        }
    }
}

impl From<FontSpec> for (String, u16, String) {
    fn from(f: FontSpec) -> Self {
        (f.family, f.size, f.weight)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Institute {
    #[serde(
        rename = "INS_CODE",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub code: Option<String>,
    #[serde(
        rename = "INS_NAME",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,
    #[serde(
        rename = "INS_ADDRESS",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
    #[serde(
        rename = "EXAM_CENTER",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub exam_center: Option<String>,
    #[serde(
        rename = "DISTRIBUTION_CENTER",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub distribution_center: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Theory examination session. Stored as `"0"` / `"1"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value", into = "String")]
pub enum ExamPeriod {
    #[default]
    Summer,
    Winter,
}

impl ExamPeriod {
    pub const ALL: [ExamPeriod; 2] = [ExamPeriod::Summer, ExamPeriod::Winter];

    pub fn code(self) -> &'static str {
        match self {
            Self::Summer => "0",
            Self::Winter => "1",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Summer => "Summer",
            Self::Winter => "Winter",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::Summer),
            "1" => Some(Self::Winter),
            _ => None,
        }
    }
}

impl From<Value> for ExamPeriod {
    fn from(v: Value) -> Self {
        let winter = match &v {
            Value::String(s) => s.trim() == "1",
            Value::Number(n) => n.as_i64() == Some(1),
            _ => false,
        };
        if winter {
            Self::Winter
        } else {
            Self::Summer
        }
    }
}

impl From<ExamPeriod> for String {
    fn from(p: ExamPeriod) -> Self {
        p.code().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamDetails {
    #[serde(rename = "EXAM_PERIOD", default)]
    pub period: ExamPeriod,
    #[serde(
        rename = "EXAM_START_DATE",
        default = "fallback_date",
        deserialize_with = "lenient_date"
    )]
    pub start_date: NaiveDate,
    #[serde(
        rename = "EXAM_END_DATE",
        default = "fallback_date",
        deserialize_with = "lenient_date"
    )]
    pub end_date: NaiveDate,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for ExamDetails {
    fn default() -> Self {
        Self {
            period: ExamPeriod::default(),
            start_date: fallback_date(),
            end_date: fallback_date(),
            extra: BTreeMap::new(),
        }
    }
}

/// Text setting that tolerates numbers and booleans (`"INS_CODE": 1740`).
/// Anything else is dropped with a warning instead of failing the document.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => {
            tracing::warn!(value = %other, "ignoring non-text setting");
            None
        }
    })
}

fn lenient_fonts<'de, D>(deserializer: D) -> Result<BTreeMap<String, FontSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Object(map) => map,
        other => {
            tracing::warn!(value = %other, "fonts is not an object, using defaults");
            return Ok(BTreeMap::new());
        }
    };
    Ok(raw
        .into_iter()
        .map(|(style, v)| {
            let font = serde_json::from_value(v.clone()).unwrap_or_else(|e| {
                tracing::warn!(style = %style, value = %v, error = %e, "malformed font, using default");
                FontSpec::default()
            });
            (style, font)
        })
        .collect())
}

/// Entries that are not `{code, name}` are skipped.
fn lenient_departments<'de, D>(deserializer: D) -> Result<Vec<Department>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        other => {
            tracing::warn!(value = %other, "departments is not a list");
            return Ok(Vec::new());
        }
    };
    Ok(raw
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v.clone()) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::warn!(value = %v, error = %e, "skipping malformed department");
                None
            }
        })
        .collect())
}

fn lenient_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        other => {
            tracing::warn!(value = %other, "roles is not a list");
            return Ok(Vec::new());
        }
    };
    Ok(raw
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            other => {
                tracing::warn!(value = %other, "skipping malformed role");
                None
            }
        })
        .collect())
}

fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    match raw.as_str().and_then(parse_date) {
        Some(d) => Ok(d),
        None => {
            tracing::warn!(value = %raw, "unreadable exam date, using {}", fallback_date());
            Ok(fallback_date())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevInfo {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigDocument {
    #[serde(deserialize_with = "lenient_fonts")]
    pub fonts: BTreeMap<String, FontSpec>,
    #[serde(deserialize_with = "lenient_departments")]
    pub departments: Vec<Department>,
    #[serde(deserialize_with = "lenient_roles")]
    pub roles: Vec<String>,
    pub institute: Institute,
    pub exam_details: ExamDetails,
    pub dev: DevInfo,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ConfigDocument {
    pub fn font(&self, style: &str) -> FontSpec {
        self.fonts.get(style).cloned().unwrap_or_default()
    }

    pub fn department_code(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.departments
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.code.as_str())
    }

    /// Display name for a stored code; unknown codes come back unchanged.
    pub fn department_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.departments
            .iter()
            .find(|d| d.code == code)
            .map(|d| d.name.as_str())
            .unwrap_or(code)
    }
}

pub fn read_document(path: &Path) -> Result<ConfigDocument, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrites the whole document. Written to a sibling temp file first so a
/// failed write never leaves a truncated `data.json` behind.
pub fn write_document(path: &Path, doc: &ConfigDocument) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    doc.serialize(&mut ser)?;
    buf.push(b'\n');

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, &buf).map_err(write_err)?;
    fs::rename(&tmp, path).map_err(write_err)?;
    Ok(())
}

/// Loaded once per workspace. Screens read snapshots; saves go through
/// `save_settings`, one writer at a time.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    current: RwLock<Arc<ConfigDocument>>,
    load_error: RwLock<Option<String>>,
    writer: Mutex<()>,
}

impl ConfigStore {
    /// Never fails: an unreadable document is logged and replaced by empty
    /// defaults.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let (doc, load_error) = match read_document(&path) {
            Ok(doc) => {
                tracing::info!(path = %path.display(), "configuration loaded");
                (doc, None)
            }
            Err(e) => {
                tracing::error!(error = %e, "error loading config, using defaults");
                (ConfigDocument::default(), Some(e.to_string()))
            }
        };
        Self {
            path,
            current: RwLock::new(Arc::new(doc)),
            load_error: RwLock::new(load_error),
            writer: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Arc<ConfigDocument> {
        Arc::clone(&self.current.read())
    }

    pub fn load_error(&self) -> Option<String> {
        self.load_error.read().clone()
    }

    /// Re-reads the file. On failure the previous snapshot stays in place.
    pub fn reload(&self) -> Result<Arc<ConfigDocument>, ConfigError> {
        let _guard = self.writer.lock();
        match read_document(&self.path) {
            Ok(doc) => {
                let doc = Arc::new(doc);
                *self.current.write() = Arc::clone(&doc);
                *self.load_error.write() = None;
                Ok(doc)
            }
            Err(e) => {
                tracing::warn!(error = %e, "config reload failed, keeping previous snapshot");
                *self.load_error.write() = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Replaces the `institute` and `exam_details` objects wholesale and
    /// persists the full document. The file is re-read under the writer
    /// lock and the change merged into it; a document that exists but cannot
    /// be read is never overwritten.
    pub fn save_settings(
        &self,
        institute: Institute,
        exam: ExamDetails,
    ) -> Result<Arc<ConfigDocument>, ConfigError> {
        let _guard = self.writer.lock();
        let mut next = match read_document(&self.path) {
            Ok(doc) => doc,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                (*self.snapshot()).clone()
            }
            Err(e) => {
                tracing::error!(error = %e, "refusing to overwrite unreadable settings");
                return Err(e);
            }
        };
        next.institute = institute;
        next.exam_details = exam;
        write_document(&self.path, &next)?;

        let next = Arc::new(next);
        *self.current.write() = Arc::clone(&next);
        *self.load_error.write() = None;
        tracing::info!(
            path = %self.path.display(),
            period = next.exam_details.period.code(),
            start = %next.exam_details.start_date,
            end = %next.exam_details.end_date,
            "institute and exam settings saved"
        );
        Ok(next)
    }
}
