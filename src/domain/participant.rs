use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::contains_ignore_case;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub birth_date: i64,
    pub birth_place: String,
    pub address: String,
    pub current_residence: String,
    pub reason: String,
    pub status: ParticipantStatus,
    #[serde(rename = "type")]
    pub kind: ParticipantKind,
    pub last_education: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Participant {
    /// Registration time, shown as the payment date in the payment list.
    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        if self.created_at <= 0 {
            return None;
        }
        Utc.timestamp_millis_opt(self.created_at).single()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Pending => "pending",
            ParticipantStatus::Accepted => "accepted",
            ParticipantStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(ParticipantStatus::Pending),
            "accepted" => Some(ParticipantStatus::Accepted),
            "rejected" => Some(ParticipantStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantKind {
    Event,
    #[default]
    Class,
}

#[derive(Debug, Clone, Default)]
pub struct ParticipantFilter {
    pub query: String,
    pub status: Option<ParticipantStatus>,
}

impl ParticipantFilter {
    pub fn matches(&self, participant: &Participant) -> bool {
        if !self.query.is_empty()
            && !contains_ignore_case(&participant.name, &self.query)
            && !contains_ignore_case(&participant.email, &self.query)
        {
            return false;
        }

        self.status.map_or(true, |status| participant.status == status)
    }

    pub fn apply(&self, participants: &[Participant]) -> Vec<Participant> {
        participants.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}
