//! Append-only analytics event trail. Writes JSON Lines (one event per
//! line). Optional hash chain: each event can include hash_prev + hash_self
//! so a trail handed to reporting tooling can be checked for tampering.
//!
//! Events are typed ([`EventKind`]) rather than free-form topic strings:
//! the storefront only emits product views and purchases, and the typed
//! representation keeps payload shape drift out of the trail.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use cnx_checkout::PurchaseTracker;
use cnx_types::StoreError;

/// Namespace for deterministic event-id derivation (v5 UUID).
const EVENT_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0xd3, 0x4e, 0x9a, 0x02, 0x7b, 0x1d, 0x45, 0x5a, 0x8c, 0x16, 0x42, 0xe0, 0x5f, 0x7a, 0xb9,
    0x13,
]);

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// A product detail page was viewed.
    ProductView { slug: String },
    /// An order was completed.
    Purchase { order_id: String },
}

/// One line of the analytics trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEvent {
    pub event_id: Uuid,
    /// The browsing session this event belongs to.
    pub session_id: Uuid,
    pub ts_utc: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
    pub hash_prev: Option<String>,
    pub hash_self: Option<String>,
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

/// Append-only analytics writer.
pub struct EventLog {
    path: PathBuf,
    session_id: Uuid,
    hash_chain: bool,
    last_hash: Option<String>,
    /// Monotonically increasing sequence counter for event-id derivation.
    /// Starts at 0 and increments on every append. When resuming an existing
    /// trail, restore with `set_seq(events_already_written)` alongside
    /// `set_last_hash`.
    seq: u64,
}

impl EventLog {
    /// Creates the writer and ensures parent dirs exist.
    pub fn new(path: impl AsRef<Path>, session_id: Uuid, hash_chain: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {:?}", parent))?;
        }

        Ok(Self {
            path,
            session_id,
            hash_chain,
            last_hash: None,
            seq: 0,
        })
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Set last hash explicitly (e.g., after reading the last line on
    /// restart).
    pub fn set_last_hash(&mut self, last_hash: Option<String>) {
        self.last_hash = last_hash;
    }

    pub fn last_hash(&self) -> Option<String> {
        self.last_hash.clone()
    }

    /// Restore the sequence counter when resuming an existing trail. Must be
    /// called in conjunction with `set_last_hash` for correct restart
    /// semantics.
    pub fn set_seq(&mut self, seq: u64) {
        self.seq = seq;
    }

    /// Current sequence counter (equals the number of events appended).
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Record a product-view event.
    pub fn record_view(&mut self, slug: impl Into<String>) -> Result<StoreEvent> {
        self.append(EventKind::ProductView { slug: slug.into() })
    }

    /// Record a purchase event.
    pub fn record_purchase(&mut self, order_id: impl Into<String>) -> Result<StoreEvent> {
        self.append(EventKind::Purchase {
            order_id: order_id.into(),
        })
    }

    fn append(&mut self, kind: EventKind) -> Result<StoreEvent> {
        let ts_utc = Utc::now();
        // event_id derived deterministically from chain state + payload +
        // seq. No RNG, so replaying the same trail converges to the same ids.
        let event_id = derive_event_id(self.last_hash.as_deref(), &kind, self.seq)?;
        self.seq += 1;

        let mut ev = StoreEvent {
            event_id,
            session_id: self.session_id,
            ts_utc,
            kind,
            hash_prev: None,
            hash_self: None,
        };

        if self.hash_chain {
            ev.hash_prev = self.last_hash.clone();

            let self_hash = compute_event_hash(&ev)?;
            ev.hash_self = Some(self_hash.clone());
            self.last_hash = Some(self_hash);
        }

        let line = canonical_json_line(&ev)?;
        append_line(&self.path, &line)?;

        Ok(ev)
    }
}

impl PurchaseTracker for EventLog {
    fn track_purchase(&mut self, order_id: &str) -> Result<(), StoreError> {
        self.record_purchase(order_id)
            .map(|_| ())
            .map_err(|err| StoreError::server(format!("analytics append failed: {err}")))
    }
}

// ---------------------------------------------------------------------------
// Derivation / hashing
// ---------------------------------------------------------------------------

/// Derive a deterministic event id from the chain tip, the payload, and the
/// sequence number.
fn derive_event_id(last_hash: Option<&str>, kind: &EventKind, seq: u64) -> Result<Uuid> {
    let payload = serde_json::to_string(kind).context("serialize event kind failed")?;
    let material = format!("{}:{}:{}", last_hash.unwrap_or("genesis"), seq, payload);
    Ok(Uuid::new_v5(&EVENT_ID_NAMESPACE, material.as_bytes()))
}

/// Write a single line to file (with trailing newline).
fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open analytics trail {:?}", path))?;
    f.write_all(line.as_bytes())
        .context("write event line failed")?;
    f.write_all(b"\n").context("write newline failed")?;
    Ok(())
}

/// Canonicalize by sorting keys recursively and emitting compact JSON.
/// One event == one JSON line.
fn canonical_json_line<T: Serialize>(v: &T) -> Result<String> {
    let raw = serde_json::to_value(v).context("serialize event failed")?;
    let sorted = sort_keys(&raw);
    serde_json::to_string(&sorted).context("json stringify failed")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

/// Hash chain is computed from canonical JSON of the event WITHOUT
/// hash_self (to avoid self-reference).
pub fn compute_event_hash(ev: &StoreEvent) -> Result<String> {
    let mut clone = ev.clone();
    clone.hash_self = None;

    let canonical = canonical_json_line(&clone)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Verify the hash chain integrity of an analytics trail file.
pub fn verify_chain(path: impl AsRef<Path>) -> Result<ChainStatus> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("read analytics trail {:?}", path.as_ref()))?;
    verify_chain_str(&content)
}

/// Same logic as [`verify_chain`] but over in-memory JSONL content.
pub fn verify_chain_str(content: &str) -> Result<ChainStatus> {
    let mut prev_hash: Option<String> = None;
    let mut event_count = 0usize;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let ev: StoreEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("parse event at line {}", i + 1))?;

        event_count += 1;

        // 1. hash_prev must match the previous event's hash_self.
        if ev.hash_prev != prev_hash {
            return Ok(ChainStatus::Broken {
                line: i + 1,
                reason: format!(
                    "hash_prev mismatch: expected {:?}, got {:?}",
                    prev_hash, ev.hash_prev
                ),
            });
        }

        // 2. hash_self must be correct for this event's content.
        if let Some(ref claimed_hash) = ev.hash_self {
            let recomputed = compute_event_hash(&ev)?;
            if *claimed_hash != recomputed {
                return Ok(ChainStatus::Broken {
                    line: i + 1,
                    reason: format!(
                        "hash_self mismatch: claimed {}, recomputed {}",
                        claimed_hash, recomputed
                    ),
                });
            }
        }

        prev_hash = ev.hash_self.clone();
    }

    Ok(ChainStatus::Valid {
        events: event_count,
    })
}

/// Result of chain verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainStatus {
    /// The entire chain is valid.
    Valid { events: usize },
    /// The chain is broken at the given line.
    Broken { line: usize, reason: String },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
