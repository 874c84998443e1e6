use log::{debug, error, info, warn};

pub fn log_rejection(reason: &str) {
    error!("❌ Rejected: {}", reason);
}

pub fn log_retry(attempt: u32, reason: &str) {
    warn!("🔁 Retry {} — {}", attempt, reason);
}

pub fn log_reconcile(lines: usize, units: i64) {
    debug!("🛒 Cart reconciled — {} line(s), {} unit(s)", lines, units);
}

pub fn log_success(msg: &str) {
    info!("✅ {}", msg);
}
