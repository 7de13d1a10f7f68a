//! Console screens composed from list and form controllers
//!
//! Each screen is constructed per mount with its own gateway, so nothing is
//! shared between screens except the notifier.

pub mod announcement;
pub mod mail_template;
pub mod my_projects;

use serde::{Deserialize, Serialize};

pub use announcement::{AnnouncementScreen, AnnouncementStatus};
pub use mail_template::{MailTemplateScreen, TemplateSource};
pub use my_projects::{project_link, MyProjectsWidget};

/// Level of the console the user is working at; selects API prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Site,
    Organization {
        id: String,
        #[serde(default)]
        name: Option<String>,
    },
    Project {
        id: String,
        #[serde(default)]
        name: Option<String>,
        organization_id: String,
    },
}

impl Scope {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Site => "site",
            Self::Organization { .. } => "organization",
            Self::Project { .. } => "project",
        }
    }

    /// Organization the scope belongs to; a project reports its parent.
    pub fn organization_id(&self) -> Option<&str> {
        match self {
            Self::Site => None,
            Self::Organization { id, .. } => Some(id),
            Self::Project {
                organization_id, ..
            } => Some(organization_id),
        }
    }
}
