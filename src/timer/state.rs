use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::SessionDraft;

/// Duration used when free-form input cannot be understood.
pub const DEFAULT_MINUTES: u32 = 25;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("Not allowed while the timer is running")]
    Running,

    #[error("Timer is not running")]
    NotRunning,

    #[error("Select a subject before starting")]
    NoSubject,

    #[error("Duration must be at least one minute")]
    InvalidDuration,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub status: TimerStatus,
    pub total_minutes: u32,
    pub remaining_seconds: u64,
    pub subject_id: Option<i32>,
    /// Wall-clock start of the current run; survives pause/resume.
    pub started_at: Option<DateTime<Utc>>,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(DEFAULT_MINUTES)
    }
}

/// Free-form minutes; anything unparsable or zero falls back to 25.
#[must_use]
pub fn parse_minutes(input: &str) -> u32 {
    match input.trim().parse::<u32>() {
        Ok(minutes) if minutes > 0 => minutes,
        _ => DEFAULT_MINUTES,
    }
}

impl TimerState {
    #[must_use]
    pub fn new(total_minutes: u32) -> Self {
        let total_minutes = if total_minutes == 0 {
            DEFAULT_MINUTES
        } else {
            total_minutes
        };
        Self {
            status: TimerStatus::Idle,
            total_minutes,
            remaining_seconds: u64::from(total_minutes) * 60,
            subject_id: None,
            started_at: None,
        }
    }

    #[must_use]
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.total_minutes) * 60
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn set_duration(&mut self, minutes: u32) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        if minutes == 0 {
            return Err(TimerError::InvalidDuration);
        }

        self.total_minutes = minutes;
        self.reset();
        Ok(())
    }

    pub fn select_subject(&mut self, subject_id: i32) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        self.subject_id = Some(subject_id);
        Ok(())
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), TimerError> {
        if self.is_running() {
            return Err(TimerError::Running);
        }
        if self.subject_id.is_none() {
            return Err(TimerError::NoSubject);
        }

        if self.status == TimerStatus::Completed {
            self.remaining_seconds = self.total_seconds();
        }
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
        self.status = TimerStatus::Running;
        Ok(())
    }

    /// One second elapsed. Returns the finished session when this tick
    /// brought the countdown to zero.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<SessionDraft> {
        if !self.is_running() {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            return self.complete(now);
        }
        None
    }

    pub fn pause(&mut self) -> Result<(), TimerError> {
        if !self.is_running() {
            return Err(TimerError::NotRunning);
        }
        self.status = TimerStatus::Paused;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.status = TimerStatus::Idle;
        self.remaining_seconds = self.total_seconds();
        self.started_at = None;
    }

    /// The persisted duration is the configured length, not the measured
    /// span between start and `now`.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Option<SessionDraft> {
        self.status = TimerStatus::Completed;
        self.remaining_seconds = 0;

        let started_at = self.started_at.take()?;
        let subject_id = self.subject_id?;

        Some(SessionDraft {
            subject_id,
            start_time: started_at,
            end_time: now,
            duration_seconds: i64::from(self.total_minutes) * 60,
        })
    }
}
