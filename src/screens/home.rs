use std::sync::Arc;

use crate::config::{ConfigDocument, FontSpec};
use crate::error::ScreenError;
use crate::view::{ContentArea, Tab, Widget};

use super::{Screen, ScreenContext};

const FEATURES: [(&str, &str); 5] = [
    (
        "Seating Arrangement Management",
        "Manage seating assignments for students across multiple blocks.",
    ),
    (
        "Supervisor and Block Management",
        "Assign supervisors to blocks and keep track of their duties.",
    ),
    (
        "Automatic Generation of Seating Plans",
        "Generate seating plans automatically based on various parameters.",
    ),
    (
        "Real-time Data Updates",
        "Keep track of real-time changes and updates during the exam period.",
    ),
    (
        "Easy-to-use Interface",
        "The system has a user-friendly interface for easy navigation.",
    ),
];

const DEFAULT_WEBSITE: &str = "https://example.com";

/// Landing page.
#[derive(Debug, Default)]
pub struct HomeScreen {
    cfg: Arc<ConfigDocument>,
}

fn label(text: impl Into<String>, font: &FontSpec) -> Widget {
    Widget::Label {
        text: text.into(),
        font: font.clone(),
    }
}

impl HomeScreen {
    fn software_tab(&self) -> Tab {
        let body = self.cfg.font("h4");
        Tab {
            title: "Software Info".to_string(),
            widgets: vec![
                Widget::Heading {
                    text: "Exam Seating Arrangement System".to_string(),
                    font: self.cfg.font("h2"),
                },
                label(format!("Version: {}", env!("CARGO_PKG_VERSION")), &body),
                label(
                    "This software helps in managing the seating arrangement for exams, \
                     keeping track of blocks, supervisors, and students.",
                    &body,
                ),
            ],
        }
    }

    fn features_tab(&self) -> Tab {
        let title = self.cfg.font("h3");
        let body = self.cfg.font("h4");
        Tab {
            title: "Features".to_string(),
            widgets: FEATURES
                .iter()
                .flat_map(|(name, text)| [label(*name, &title), label(*text, &body)])
                .collect(),
        }
    }

    fn contact_tab(&self) -> Tab {
        let dev = &self.cfg.dev;
        let body = self.cfg.font("h4");
        let mut widgets: Vec<Widget> = [
            ("Phone", &dev.phone),
            ("Email", &dev.email),
            ("Website", &dev.website),
            ("Address", &dev.address),
        ]
        .iter()
        .map(|(name, value)| {
            label(
                format!("{}: {}", name, value.as_deref().unwrap_or("Not Available")),
                &body,
            )
        })
        .collect();
        widgets.push(Widget::Link {
            label: "Contact Us".to_string(),
            url: dev
                .website
                .clone()
                .unwrap_or_else(|| DEFAULT_WEBSITE.to_string()),
        });
        Tab {
            title: "Contact".to_string(),
            widgets,
        }
    }
}

impl Screen for HomeScreen {
    fn mount(
        &mut self,
        area: &mut ContentArea,
        ctx: &mut ScreenContext<'_>,
    ) -> Result<(), ScreenError> {
        self.cfg = ctx.config.snapshot();
        self.render(area);
        Ok(())
    }

    fn render(&self, area: &mut ContentArea) {
        let inst = &self.cfg.institute;
        let body = self.cfg.font("h4");
        area.push(Widget::Heading {
            text: inst
                .name
                .clone()
                .unwrap_or_else(|| "Institute Name Not Found".to_string()),
            font: self.cfg.font("h1"),
        });
        area.push(label(
            inst.address
                .clone()
                .unwrap_or_else(|| "Address Not Found".to_string()),
            &body,
        ));
        area.push(label(
            format!(
                "Exam Center: {}",
                inst.exam_center.as_deref().unwrap_or("Not Specified")
            ),
            &body,
        ));
        area.push(Widget::Tabs {
            tabs: vec![self.software_tab(), self.features_tab(), self.contact_tab()],
        });
    }
}
