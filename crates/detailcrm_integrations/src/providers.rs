// --- File: crates/detailcrm_integrations/src/providers.rs ---

use serde::{Deserialize, Serialize};
use std::fmt;

pub const GOOGLE_CALENDAR_TABLE: &str = "google_calendar_integrations";
pub const EMAIL_TABLE: &str = "email_integrations";
pub const GMB_TABLE: &str = "gmb_integrations";

const GOOGLE_CALENDAR_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/calendar.events",
];

const GMAIL_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
];

const GMB_SCOPES: &[&str] = &["https://www.googleapis.com/auth/business.manage"];

const OUTLOOK_SCOPES: &[&str] = &[
    "offline_access",
    "https://graph.microsoft.com/Mail.Send",
    "https://graph.microsoft.com/Mail.Read",
    "User.Read",
];

/// A third-party account a user can connect.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    GoogleCalendar,
    Gmail,
    Gmb,
    Outlook,
}

impl Provider {
    pub fn slug(&self) -> &'static str {
        match self {
            Provider::GoogleCalendar => "google_calendar",
            Provider::Gmail => "gmail",
            Provider::Gmb => "gmb",
            Provider::Outlook => "outlook",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::GoogleCalendar => "Google Calendar",
            Provider::Gmail => "Gmail",
            Provider::Gmb => "Google Business Profile",
            Provider::Outlook => "Outlook",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            Provider::GoogleCalendar => GOOGLE_CALENDAR_TABLE,
            Provider::Gmail | Provider::Outlook => EMAIL_TABLE,
            Provider::Gmb => GMB_TABLE,
        }
    }

    /// Value of the `provider` column for rows in the shared email table.
    pub fn email_provider(&self) -> Option<&'static str> {
        match self {
            Provider::Gmail => Some("gmail"),
            Provider::Outlook => Some("outlook"),
            _ => None,
        }
    }

    pub fn is_google(&self) -> bool {
        !matches!(self, Provider::Outlook)
    }

    pub fn scopes(&self) -> &'static [&'static str] {
        match self {
            Provider::GoogleCalendar => GOOGLE_CALENDAR_SCOPES,
            Provider::Gmail => GMAIL_SCOPES,
            Provider::Gmb => GMB_SCOPES,
            Provider::Outlook => OUTLOOK_SCOPES,
        }
    }

    /// Path (under the app origin) the provider redirects back to.
    pub fn callback_path(&self) -> &'static str {
        match self {
            Provider::GoogleCalendar => "/api/auth/google/callback",
            Provider::Gmail => "/api/integrations/gmail/callback",
            Provider::Gmb => "/api/integrations/gmb/callback",
            Provider::Outlook => "/api/integrations/outlook/callback",
        }
    }

    pub fn initiate_error(&self) -> String {
        format!("Failed to initiate {} connection", self.display_name())
    }

    pub fn disconnect_error(&self) -> String {
        format!("Failed to disconnect {}", self.display_name())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
