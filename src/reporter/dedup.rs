// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Set of violations already reported

use std::sync::Arc;

use dashmap::DashSet;

use crate::security::ViolationKey;

/// Keys of every violation that reached dispatch.
///
/// Grows monotonically: entries are never removed, not even when the send
/// fails. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct ReportedViolations {
    keys: Arc<DashSet<ViolationKey>>,
}

impl ReportedViolations {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key`, returning `true` if it was not present.
    ///
    /// Check and insert are a single atomic step, so two concurrent callers
    /// with the same key never both see `true`.
    pub fn insert_if_new(&self, key: ViolationKey) -> bool {
        self.keys.insert(key)
    }

    /// Whether `key` has been recorded
    pub fn contains(&self, key: &ViolationKey) -> bool {
        self.keys.contains(key)
    }

    /// Number of distinct violations recorded
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
