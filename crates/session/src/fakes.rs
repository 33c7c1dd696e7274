//! Scripted service fakes for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use workday_core::{EmployeeId, Time};
use workday_services::{
    Acknowledgement, AttendanceDay, AttendanceService, MonitoringService, MonitoringSession,
    Result, ServiceError, StartSessionRequest,
};

/// A fixed test day at `hour:minute` UTC.
pub fn at(hour: u32, minute: u32) -> Time {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

/// Answers come off the front; the last answer repeats.
struct Script<T> {
    answers: VecDeque<T>,
    fallback: T,
}

impl<T: Clone> Script<T> {
    fn new(fallback: T) -> Self {
        Self {
            answers: VecDeque::new(),
            fallback,
        }
    }

    fn push(&mut self, answer: T) {
        self.answers.push_back(answer);
    }

    fn next(&mut self) -> T {
        if self.answers.len() > 1 {
            self.answers.pop_front().unwrap()
        } else {
            self.answers.front().cloned().unwrap_or_else(|| self.fallback.clone())
        }
    }
}

pub struct FakeMonitoring {
    current: Mutex<Script<Result<Option<MonitoringSession>>>>,
    start: Mutex<Script<Result<MonitoringSession>>>,
    pause: Mutex<Script<Result<Acknowledgement>>>,
    resume: Mutex<Script<Result<Acknowledgement>>>,
    end: Mutex<Script<Result<Acknowledgement>>>,
    calls: Mutex<Vec<&'static str>>,
    started: Mutex<Vec<StartSessionRequest>>,
}

impl FakeMonitoring {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(Script::new(Ok(None))),
            start: Mutex::new(Script::new(Err(ServiceError::Transport(
                "monitoring unavailable".into(),
            )))),
            pause: Mutex::new(Script::new(Ok(Acknowledgement::ok(None)))),
            resume: Mutex::new(Script::new(Ok(Acknowledgement::ok(None)))),
            end: Mutex::new(Script::new(Ok(Acknowledgement::ok(None)))),
            calls: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
        }
    }

    pub fn with_current(self, answer: Result<Option<MonitoringSession>>) -> Self {
        self.current.lock().unwrap().push(answer);
        self
    }

    pub fn with_start(self, answer: Result<MonitoringSession>) -> Self {
        self.start.lock().unwrap().push(answer);
        self
    }

    pub fn with_pause(self, answer: Result<Acknowledgement>) -> Self {
        self.pause.lock().unwrap().push(answer);
        self
    }

    pub fn with_resume(self, answer: Result<Acknowledgement>) -> Self {
        self.resume.lock().unwrap().push(answer);
        self
    }

    pub fn with_end(self, answer: Result<Acknowledgement>) -> Self {
        self.end.lock().unwrap().push(answer);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<StartSessionRequest> {
        self.started.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MonitoringService for FakeMonitoring {
    async fn current_session(&self, _employee: &EmployeeId) -> Result<Option<MonitoringSession>> {
        self.record("current_session");
        self.current.lock().unwrap().next()
    }

    async fn start_session(&self, request: &StartSessionRequest) -> Result<MonitoringSession> {
        self.record("start_session");
        self.started.lock().unwrap().push(request.clone());
        self.start.lock().unwrap().next()
    }

    async fn pause_session(&self, _employee: &EmployeeId) -> Result<Acknowledgement> {
        self.record("pause_session");
        self.pause.lock().unwrap().next()
    }

    async fn resume_session(&self, _employee: &EmployeeId) -> Result<Acknowledgement> {
        self.record("resume_session");
        self.resume.lock().unwrap().next()
    }

    async fn end_session(&self, _employee: &EmployeeId) -> Result<Acknowledgement> {
        self.record("end_session");
        self.end.lock().unwrap().next()
    }
}

pub struct FakeAttendance {
    day: Mutex<Script<Result<Option<AttendanceDay>>>>,
    end: Mutex<Script<Result<Acknowledgement>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeAttendance {
    pub fn new() -> Self {
        Self {
            day: Mutex::new(Script::new(Ok(None))),
            end: Mutex::new(Script::new(Ok(Acknowledgement::ok(None)))),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_day(self, answer: Result<Option<AttendanceDay>>) -> Self {
        self.day.lock().unwrap().push(answer);
        self
    }

    pub fn with_end(self, answer: Result<Acknowledgement>) -> Self {
        self.end.lock().unwrap().push(answer);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AttendanceService for FakeAttendance {
    async fn verify_day(&self, _employee: &EmployeeId) -> Result<Option<AttendanceDay>> {
        self.record("verify_day");
        self.day.lock().unwrap().next()
    }

    async fn end_day(&self, _employee: &EmployeeId) -> Result<Acknowledgement> {
        self.record("end_day");
        self.end.lock().unwrap().next()
    }
}
