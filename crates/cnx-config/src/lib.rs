//! Layered storefront configuration.
//!
//! YAML documents merge in order (earlier docs are base, later docs
//! override), producing a canonical JSON form and a stable config hash so a
//! deployment can prove which knobs it ran with. Literal credential-looking
//! values are refused outright — config files carry knobs, never secrets.
//!
//! [`StoreConfig`] is the typed view the storefront actually consumes:
//! platform fee rate, cart limits, checkout policy, and the simulated
//! latency of the mock backend.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;

use cnx_cart::{CartLimits, FeeSchedule};
use cnx_checkout::CheckoutPolicy;

/// Known secret-like prefixes. If any leaf string value in the effective
/// config starts with one of these, loading aborts with
/// CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // Stripe / OpenAI style
    "sk_live",    // Stripe live
    "sk_test",    // Stripe test
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "xoxb-",      // Slack bot token
];

// ---------------------------------------------------------------------------
// Loading / hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Merge YAML docs in order: earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    // Enforce "no secrets as literal values" policy.
    enforce_no_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

/// Canonical form: keys sorted recursively, compact rendering. Two configs
/// with identical content but different key order hash identically.
fn canonicalize_json(v: &Value) -> Result<String> {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).context("canonical json serialize failed")
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

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    hex::encode(out)
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    // Walk leaf strings; reject if they look like a secret.
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(val) = v.pointer(&ptr) {
            if let Some(s) = val.as_str() {
                if looks_like_secret(s) {
                    bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
                }
            }
        }
    }
    Ok(())
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            // Leaf
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

// ---------------------------------------------------------------------------
// StoreConfig — the typed view
// ---------------------------------------------------------------------------

/// Every knob the storefront consumes.
///
/// Consumed JSON pointers:
/// - `/platform/fee_bps`        — platform fee in basis points (default 1000)
/// - `/cart/max_quantity`       — per-item quantity cap (default unlimited)
/// - `/cart/max_distinct_items` — distinct line-item cap (default unlimited)
/// - `/checkout/policy`         — "best_effort" (default) | "all_or_nothing"
/// - `/simulate/latency_ms`     — mock backend latency (default 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub fees: FeeSchedule,
    pub limits: CartLimits,
    pub policy: CheckoutPolicy,
    pub latency_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            limits: CartLimits::UNLIMITED,
            policy: CheckoutPolicy::default(),
            latency_ms: 0,
        }
    }
}

impl StoreConfig {
    pub fn from_loaded(cfg: &LoadedConfig) -> Result<Self> {
        Self::from_value(&cfg.config_json)
    }

    /// Typed parse with defaults for absent keys and hard errors for values
    /// that are present but unusable.
    pub fn from_value(v: &Value) -> Result<Self> {
        let mut out = StoreConfig::default();

        if let Some(bps) = read_u64(v, "/platform/fee_bps")? {
            if bps > 10_000 {
                bail!("/platform/fee_bps must be <= 10000, got {bps}");
            }
            out.fees = FeeSchedule::from_bps(bps as u32);
        }

        if let Some(max_q) = read_u64(v, "/cart/max_quantity")? {
            let max_q = u32::try_from(max_q)
                .map_err(|_| anyhow::anyhow!("/cart/max_quantity out of range: {max_q}"))?;
            out.limits.max_quantity = Some(max_q);
        }

        if let Some(max_items) = read_u64(v, "/cart/max_distinct_items")? {
            out.limits.max_distinct_items = Some(max_items as usize);
        }

        if let Some(policy) = v.pointer("/checkout/policy") {
            let s = policy
                .as_str()
                .ok_or_else(|| anyhow::anyhow!("/checkout/policy must be a string"))?;
            out.policy = CheckoutPolicy::parse(s)
                .ok_or_else(|| anyhow::anyhow!("unknown checkout policy '{s}'"))?;
        }

        if let Some(ms) = read_u64(v, "/simulate/latency_ms")? {
            out.latency_ms = ms;
        }

        Ok(out)
    }
}

fn read_u64(v: &Value, pointer: &str) -> Result<Option<u64>> {
    match v.pointer(pointer) {
        None | Some(Value::Null) => Ok(None),
        Some(val) => val
            .as_u64()
            .map(Some)
            .ok_or_else(|| anyhow::anyhow!("{pointer} must be a non-negative integer")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_docs_override_earlier_ones() {
        let base = "platform:\n  fee_bps: 1000\ncart:\n  max_quantity: 10\n";
        let env = "platform:\n  fee_bps: 500\n";
        let cfg = load_layered_yaml_from_strings(&[base, env]).unwrap();
        let typed = StoreConfig::from_loaded(&cfg).unwrap();
        assert_eq!(typed.fees.rate_bps(), 500);
        // Unoverridden keys survive the merge.
        assert_eq!(typed.limits.max_quantity, Some(10));
    }

    #[test]
    fn defaults_apply_when_keys_absent() {
        let cfg = load_layered_yaml_from_strings(&["{}"]).unwrap();
        let typed = StoreConfig::from_loaded(&cfg).unwrap();
        assert_eq!(typed, StoreConfig::default());
        assert_eq!(typed.fees.rate_bps(), 1_000);
        assert_eq!(typed.limits, CartLimits::UNLIMITED);
        assert_eq!(typed.policy, CheckoutPolicy::BestEffort);
    }

    #[test]
    fn checkout_policy_parses_both_names() {
        let cfg =
            load_layered_yaml_from_strings(&["checkout:\n  policy: all_or_nothing\n"]).unwrap();
        let typed = StoreConfig::from_loaded(&cfg).unwrap();
        assert_eq!(typed.policy, CheckoutPolicy::AllOrNothing);
    }

    #[test]
    fn unknown_checkout_policy_is_an_error() {
        let cfg = load_layered_yaml_from_strings(&["checkout:\n  policy: sometimes\n"]).unwrap();
        let err = StoreConfig::from_loaded(&cfg).unwrap_err();
        assert!(err.to_string().contains("unknown checkout policy"));
    }

    #[test]
    fn fee_bps_above_100_percent_is_an_error() {
        let cfg = load_layered_yaml_from_strings(&["platform:\n  fee_bps: 10001\n"]).unwrap();
        assert!(StoreConfig::from_loaded(&cfg).is_err());
    }

    #[test]
    fn hash_is_stable_across_key_order() {
        let a = "platform:\n  fee_bps: 1000\ncart:\n  max_quantity: 5\n";
        let b = "cart:\n  max_quantity: 5\nplatform:\n  fee_bps: 1000\n";
        let ha = load_layered_yaml_from_strings(&[a]).unwrap().config_hash;
        let hb = load_layered_yaml_from_strings(&[b]).unwrap().config_hash;
        assert_eq!(ha, hb);
    }

    #[test]
    fn hash_changes_when_values_change() {
        let a = "platform:\n  fee_bps: 1000\n";
        let b = "platform:\n  fee_bps: 999\n";
        let ha = load_layered_yaml_from_strings(&[a]).unwrap().config_hash;
        let hb = load_layered_yaml_from_strings(&[b]).unwrap().config_hash;
        assert_ne!(ha, hb);
    }

    #[test]
    fn secret_literals_are_refused() {
        let doc = "payments:\n  api_key: sk_live_abcdef123456\n";
        let err = load_layered_yaml_from_strings(&[doc]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("CONFIG_SECRET_DETECTED"));
        assert!(msg.contains("/payments/api_key"));
        // The value itself must never be echoed.
        assert!(!msg.contains("abcdef123456"));
    }

    #[test]
    fn short_or_ordinary_strings_are_not_secrets() {
        let doc = "checkout:\n  policy: best_effort\nbranding:\n  name: Conectory\n";
        assert!(load_layered_yaml_from_strings(&[doc]).is_ok());
    }
}
