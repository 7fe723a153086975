use std::sync::Arc;

use crate::config::{parse_date, ConfigDocument, ExamDetails, ExamPeriod, DATE_FORMAT};
use crate::error::{ScreenError, ValidationError};
use crate::view::{ChoiceOption, ContentArea, MessageLevel, ScreenEvent, Widget};

use super::{Notice, Screen, ScreenContext};

/// Institute identity (read-only) and the exam period / date range.
#[derive(Debug, Default)]
pub struct InstituteInfoScreen {
    cfg: Arc<ConfigDocument>,
    period: String,
    start_date: String,
    end_date: String,
    notice: Notice,
}

impl InstituteInfoScreen {
    fn load_form(&mut self) {
        let exam = &self.cfg.exam_details;
        self.period = exam.period.code().to_string();
        self.start_date = exam.start_date.format(DATE_FORMAT).to_string();
        self.end_date = exam.end_date.format(DATE_FORMAT).to_string();
    }

    fn read_exam_details(&self) -> Result<ExamDetails, String> {
        let period = ExamPeriod::from_code(&self.period)
            .ok_or_else(|| "Select Summer or Winter for the examination period.".to_string())?;
        let start_date = parse_date(&self.start_date).ok_or_else(|| {
            ValidationError::BadDate {
                field: "Exam Start Date",
            }
            .to_string()
        })?;
        let end_date = parse_date(&self.end_date).ok_or_else(|| {
            ValidationError::BadDate {
                field: "Exam End Date",
            }
            .to_string()
        })?;
        Ok(ExamDetails {
            period,
            start_date,
            end_date,
            extra: self.cfg.exam_details.extra.clone(),
        })
    }

    fn save(&mut self, event: &ScreenEvent, ctx: &mut ScreenContext<'_>) {
        self.period = event.value("exam_period").trim().to_string();
        self.start_date = event.value("exam_start_date").trim().to_string();
        self.end_date = event.value("exam_end_date").trim().to_string();

        let exam = match self.read_exam_details() {
            Ok(exam) => exam,
            Err(msg) => {
                self.notice.set(MessageLevel::Warning, msg);
                return;
            }
        };
        match ctx.config.save_settings(self.cfg.institute.clone(), exam) {
            Ok(saved) => {
                self.cfg = saved;
                self.load_form();
                self.notice
                    .set(MessageLevel::Info, "Changes saved successfully!");
            }
            Err(e) => {
                tracing::error!(error = %e, "saving institute settings failed");
                self.notice
                    .set(MessageLevel::Error, format!("Error updating data.json: {e}"));
            }
        }
    }
}

impl Screen for InstituteInfoScreen {
    fn mount(
        &mut self,
        area: &mut ContentArea,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        self.cfg = ctx.config.snapshot();
        self.load_form();
        self.render(area);
        Ok(())
    }

    fn render(&self, area: &mut ContentArea) {
        let inst = &self.cfg.institute;
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());

        area.push(Widget::Heading {
            text: "Institute Information".to_string(),
            font: self.cfg.font("h2"),
        });
        area.extend([
            Widget::field("INS_CODE", "Inst. Code of Exam Center", or_na(&inst.code), true),
            Widget::field("INS_NAME", "Name Of Examination Center", or_na(&inst.name), true),
            Widget::field(
                "INS_ADDRESS",
                "Examination Center Address",
                or_na(&inst.address),
                true,
            ),
        ]);
        area.push(Widget::Radio {
            key: "exam_period".to_string(),
            label: "Theory Examination Details".to_string(),
            options: ExamPeriod::ALL
                .iter()
                .map(|p| ChoiceOption {
                    value: p.code().to_string(),
                    label: p.label().to_string(),
                })
                .collect(),
            selected: self.period.clone(),
        });
        area.extend([
            Widget::DateField {
                key: "exam_start_date".to_string(),
                label: "Exam Start Date".to_string(),
                value: self.start_date.clone(),
            },
            Widget::DateField {
                key: "exam_end_date".to_string(),
                label: "Exam End Date".to_string(),
                value: self.end_date.clone(),
            },
        ]);
        area.push(Widget::button("save", "Save Changes"));
        self.notice.render(area);
    }

    fn handle(
        &mut self,
        event: &ScreenEvent,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        self.notice.dismiss();
        match event.action.as_str() {
            "save" => self.save(event, ctx),
            other => return Err(ScreenError::UnknownAction(other.to_string())),
        }
        Ok(())
    }
}
