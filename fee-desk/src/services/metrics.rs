//! Domain counters for fee-desk, exported through the desk-core recorder.

use ::metrics::counter;

pub fn record_fee_api_call(endpoint: &'static str, ok: bool) {
    let outcome = if ok { "ok" } else { "error" };
    counter!("fee_api_requests_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

/// A collection attempt that reached validation.
pub fn record_collection(accepted: bool) {
    let outcome = if accepted { "accepted" } else { "rejected" };
    counter!("fee_collections_total", "outcome" => outcome).increment(1);
}

pub fn record_revert() {
    counter!("fee_reverts_total").increment(1);
}

pub fn record_cache_lookup(cache: &'static str, hit: bool) {
    let outcome = if hit { "hit" } else { "miss" };
    counter!("fee_cache_lookups_total", "cache" => cache, "outcome" => outcome).increment(1);
}
