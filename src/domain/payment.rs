use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{contains_ignore_case, Class, Participant};

/// Proof-of-payment upload submitted by a participant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFile {
    pub id: String,
    pub participant_id: String,
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<i64>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
}

impl PaymentFile {
    /// Search box match on participant id or file path.
    pub fn matches(&self, query: &str) -> bool {
        contains_ignore_case(&self.participant_id, query)
            || contains_ignore_case(&self.file_path, query)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    Invalid,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFileForm {
    #[validate(length(min = 1, message = "participantId is required"))]
    pub participant_id: String,
    #[validate(length(min = 1, message = "filePath is required"))]
    pub file_path: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<i64>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
}

impl From<&PaymentFile> for PaymentFileForm {
    fn from(payment: &PaymentFile) -> Self {
        Self {
            participant_id: payment.participant_id.clone(),
            file_path: payment.file_path.clone(),
            verified: payment.verified,
            verification_date: payment.verification_date,
            verification_status: payment.verification_status,
        }
    }
}

/// A payment joined with its participant and the participant's class.
///
/// Never stored. `class` is `None` when the participant has no class or the
/// class record no longer exists.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentDetail {
    pub participant: Participant,
    pub class: Option<Class>,
}
