// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Card swipes: attendance and access checks.

use std::str::FromStr;

use super::{required, CampusService, LedgerContext, ServiceError, ServiceResult};
use crate::models::{
    AttendanceResponse, IncrementAttendanceRequest, ValidateAccessRequest, ValidateAccessResponse,
};

/// What a card swipe is being checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationType {
    Door,
    Ticket,
    StudentId,
}

impl VerificationType {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationType::Door => "door",
            VerificationType::Ticket => "ticket",
            VerificationType::StudentId => "studentId",
        }
    }
}

impl FromStr for VerificationType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "door" => Ok(VerificationType::Door),
            "ticket" => Ok(VerificationType::Ticket),
            "studentId" => Ok(VerificationType::StudentId),
            _ => Err(ServiceError::BadRequest(
                "Invalid verification type. Use 'door', 'ticket', or 'studentId'".to_string(),
            )),
        }
    }
}

impl CampusService {
    /// Bump the attendance counter of the card's owner with the admin key.
    pub async fn increment_attendance(
        &self,
        req: IncrementAttendanceRequest,
    ) -> ServiceResult<AttendanceResponse> {
        let student_id = required(&req.student_id)
            .ok_or_else(|| ServiceError::BadRequest("Student ID is required".to_string()))?;

        let user = self
            .registry
            .user_by_student_id(student_id)?
            .ok_or(ServiceError::NotFound("Student ID not found"))?;

        let address = user
            .ledger_address()
            .during("Failed to increment attendance")?;
        let tx_hash = self
            .ledger
            .increment_attendance(address)
            .await
            .during("Failed to increment attendance")?;

        tracing::info!(
            student_id,
            username = %user.username,
            tx_hash = %tx_hash,
            "attendance incremented"
        );
        Ok(AttendanceResponse {
            status: "success".to_string(),
            message: "Attendance incremented successfully".to_string(),
            tx_hash: tx_hash.to_string(),
        })
    }

    /// Decide a door, ticket or student id check for a card.
    ///
    /// The verification type is validated before the card is looked up.
    pub async fn validate_access(
        &self,
        req: ValidateAccessRequest,
    ) -> ServiceResult<ValidateAccessResponse> {
        let (Some(student_id), Some(kind)) =
            (required(&req.student_id), required(&req.verification_type))
        else {
            return Err(ServiceError::BadRequest(
                "Both studentId and verificationType are required".to_string(),
            ));
        };
        let kind: VerificationType = kind.parse()?;

        let user = self
            .registry
            .user_by_student_id(student_id)?
            .ok_or(ServiceError::NotFound("Student ID not registered"))?;

        let address = user.ledger_address().during("Failed to validate access")?;
        let assets = self
            .ledger
            .user_assets(address)
            .await
            .during("Failed to validate access")?;

        let (valid, message) = match kind {
            VerificationType::Door if assets.door_access => (true, "Door access granted"),
            VerificationType::Door => (false, "Door access denied"),
            VerificationType::Ticket if assets.ticket_access => (true, "Ticket access granted"),
            VerificationType::Ticket => (false, "Ticket access denied"),
            VerificationType::StudentId if assets.student_id == student_id => {
                (true, "Valid student ID")
            }
            VerificationType::StudentId => (false, "Invalid student ID"),
        };

        tracing::debug!(student_id, kind = kind.as_str(), valid, "access checked");
        Ok(ValidateAccessResponse {
            valid,
            message: message.to_string(),
            student_id: student_id.to_string(),
            verification_type: kind.as_str().to_string(),
        })
    }
}
