//! Per-employee in-flight guard.
//!
//! An intent holds a ticket for its employee until it completes, so a second
//! click while the first request is still out is refused instead of sent.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use workday_core::EmployeeId;

/// Tracks which employees have an intent in flight.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    active: Arc<Mutex<HashSet<EmployeeId>>>,
}

impl InFlightGuard {
    /// Create an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the employee. `None` when an intent is already in flight.
    pub fn try_acquire(&self, employee: &EmployeeId) -> Option<InFlightTicket> {
        if !lock(&self.active).insert(employee.clone()) {
            return None;
        }
        Some(InFlightTicket {
            active: Arc::clone(&self.active),
            employee: employee.clone(),
        })
    }

    /// Whether the employee has an intent in flight.
    pub fn is_in_flight(&self, employee: &EmployeeId) -> bool {
        lock(&self.active).contains(employee)
    }
}

/// Proof of a claimed employee; releases the claim on drop.
#[derive(Debug)]
pub struct InFlightTicket {
    active: Arc<Mutex<HashSet<EmployeeId>>>,
    employee: EmployeeId,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        lock(&self.active).remove(&self.employee);
    }
}

// The set stays consistent even if a holder panicked.
fn lock(active: &Mutex<HashSet<EmployeeId>>) -> MutexGuard<'_, HashSet<EmployeeId>> {
    active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
