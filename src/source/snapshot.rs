//! Raw history snapshots as the terminal reports them.
//!
//! A snapshot is one capture of the terminal's circular history buffer: a set
//! of equal-length per-second arrays plus the uptime counter (`current`) at
//! the moment of capture. Sample `k` of the device's uptime lives in slot
//! `k % capacity`, so the newest sample is at `(current - 1) % capacity`.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::IngestError;
use dishwatch_types::Sample;

/// Key of the envelope the device RPC wraps the history in.
const ENVELOPE_KEY: &str = "dishGetHistory";

/// One capture of the terminal's history ring buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    /// Seconds of uptime at capture; also the number of samples ever written.
    #[serde(deserialize_with = "uptime_counter")]
    pub current: u64,

    /// Ping loss to the point of presence, per second.
    pub pop_ping_drop_rate: Vec<f64>,

    /// Downlink throughput (bits per second), per second.
    pub downlink_throughput_bps: Vec<f64>,

    /// Uplink throughput (bits per second), per second.
    pub uplink_throughput_bps: Vec<f64>,

    /// Signal-to-noise ratio, per second.
    pub snr: Vec<f64>,

    /// Whether a satellite was scheduled, per second.
    pub scheduled: Vec<bool>,

    /// Whether the view was obstructed, per second.
    pub obstructed: Vec<bool>,
}

impl HistorySnapshot {
    /// Decode a history dump, with or without the RPC envelope.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let mut value: serde_json::Value = serde_json::from_str(content)?;
        if let Some(inner) = value.get_mut(ENVELOPE_KEY) {
            value = inner.take();
        }
        serde_json::from_value(value)
    }

    /// Build a snapshot whose every slot holds `sample`.
    pub fn filled(current: u64, capacity: usize, sample: Sample) -> Self {
        Self {
            current,
            pop_ping_drop_rate: vec![sample.pop_ping_drop_rate; capacity],
            downlink_throughput_bps: vec![sample.downlink_throughput_bps; capacity],
            uplink_throughput_bps: vec![sample.uplink_throughput_bps; capacity],
            snr: vec![sample.snr; capacity],
            scheduled: vec![sample.scheduled; capacity],
            obstructed: vec![sample.obstructed; capacity],
        }
    }

    /// Ring buffer capacity, after checking that every field array agrees.
    pub fn capacity(&self) -> Result<usize, IngestError> {
        let expected = self.pop_ping_drop_rate.len();
        if expected == 0 {
            return Err(IngestError::EmptyBuffer);
        }

        let lengths = [
            ("downlinkThroughputBps", self.downlink_throughput_bps.len()),
            ("uplinkThroughputBps", self.uplink_throughput_bps.len()),
            ("snr", self.snr.len()),
            ("scheduled", self.scheduled.len()),
            ("obstructed", self.obstructed.len()),
        ];
        for (field, len) in lengths {
            if len != expected {
                return Err(IngestError::Misaligned {
                    field,
                    len,
                    expected,
                });
            }
        }

        Ok(expected)
    }

    /// Read one ring slot. Callers must have validated [`capacity`](Self::capacity).
    pub fn sample_at(&self, slot: usize) -> Sample {
        Sample {
            downlink_throughput_bps: self.downlink_throughput_bps[slot],
            uplink_throughput_bps: self.uplink_throughput_bps[slot],
            pop_ping_drop_rate: self.pop_ping_drop_rate[slot],
            obstructed: self.obstructed[slot],
            scheduled: self.scheduled[slot],
            snr: self.snr[slot],
            unrecorded: false,
            adjacent_obstructed: false,
        }
    }

    /// Overwrite one ring slot.
    pub fn set_sample(&mut self, slot: usize, sample: Sample) {
        self.downlink_throughput_bps[slot] = sample.downlink_throughput_bps;
        self.uplink_throughput_bps[slot] = sample.uplink_throughput_bps;
        self.pop_ping_drop_rate[slot] = sample.pop_ping_drop_rate;
        self.obstructed[slot] = sample.obstructed;
        self.scheduled[slot] = sample.scheduled;
        self.snr[slot] = sample.snr;
    }
}

/// A snapshot together with the label it was stored under (usually the
/// capture's file name, which embeds the capture time).
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSnapshot {
    pub label: String,
    pub snapshot: HistorySnapshot,
}

/// Accept the uptime counter as a JSON number or a decimal string; protobuf
/// JSON renders 64-bit integers as strings.
fn uptime_counter<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Counter {
        Number(u64),
        Text(String),
    }

    match Counter::deserialize(deserializer)? {
        Counter::Number(n) => Ok(n),
        Counter::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
