//! Snapshot files for offline evaluation.

use anyhow::{bail, Context, Result};
use gig_core::{BookingInterval, ConflictDecision, ConflictResolver, Coordinate, InputFault};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A candidate plus the provider's existing bookings, as the server would load them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub candidate: BookingInterval,
    #[serde(default)]
    pub existing: Vec<BookingInterval>,
}

#[derive(Debug)]
pub enum SnapshotVerdict {
    Decision(ConflictDecision),
    Fault(InputFault),
}

impl SnapshotVerdict {
    /// 0 accepted, 1 rejected, 2 input fault.
    pub fn exit_code(&self) -> i32 {
        match self {
            SnapshotVerdict::Decision(d) if d.can_book => 0,
            SnapshotVerdict::Decision(_) => 1,
            SnapshotVerdict::Fault(_) => 2,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        let decision = match self {
            SnapshotVerdict::Decision(d) => d.clone(),
            SnapshotVerdict::Fault(f) => f.to_decision(),
        };
        Ok(serde_json::to_string_pretty(&decision)?)
    }
}

impl Snapshot {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing snapshot {}", path.display()))
    }

    pub fn evaluate(&self, resolver: &ConflictResolver) -> SnapshotVerdict {
        match resolver.evaluate(&self.candidate, &self.existing) {
            Ok(decision) => SnapshotVerdict::Decision(decision),
            Err(fault) => SnapshotVerdict::Fault(fault),
        }
    }
}

/// Parse "LAT,LNG".
pub fn parse_coordinate(raw: &str) -> Result<Coordinate> {
    let Some((lat, lng)) = raw.split_once(',') else {
        bail!("expected LAT,LNG but got '{}'", raw);
    };
    let lat: f64 = lat.trim().parse().with_context(|| format!("bad latitude '{}'", lat))?;
    let lng: f64 = lng.trim().parse().with_context(|| format!("bad longitude '{}'", lng))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        bail!("coordinate out of range: {},{}", lat, lng);
    }
    Ok(Coordinate::new(lat, lng))
}
