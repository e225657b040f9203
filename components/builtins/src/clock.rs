//! `clock()` - wall-clock seconds

use chrono::Utc;
use core_types::Value;

/// Seconds since the Unix epoch, with microsecond resolution.
///
/// Arguments are ignored.
pub fn clock(_args: &[Value]) -> Value {
    let micros = Utc::now().timestamp_micros();
    Value::Number(micros as f64 / 1_000_000.0)
}
