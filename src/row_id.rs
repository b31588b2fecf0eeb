use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A 64-bit surrogate row-id generator.
/// Structure:
/// - 48 bits: Timestamp (milliseconds)
/// - 16 bits: Randomness / Counter
///
/// IDs are strictly increasing within one generator, and the random low
/// bits keep independent processes from colliding on the same millisecond.
pub struct RowIdGen {
    last_val: u64,
    rng: StdRng,
}

impl Default for RowIdGen {
    fn default() -> Self {
        Self::new()
    }
}

impl RowIdGen {
    pub fn new() -> Self {
        Self {
            last_val: 0,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Generate a new unique u64 ID.
    /// Logic:
    /// 1. Get current timestamp (48 bits).
    /// 2. If timestamp > last_timestamp, use new timestamp and random 16 bits.
    /// 3. If timestamp == last_timestamp (or clock moved back), increment last value.
    pub fn generate(&mut self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(std::time::Duration::ZERO)
            .as_millis() as u64;

        // 48 bits timestamp, shifted to high bits
        let ts_part = now << 16;

        if ts_part > self.last_val {
            // New millisecond: generate random low 16 bits
            let rand_part = self.rng.random::<u16>() as u64;
            self.last_val = ts_part | rand_part;
        } else {
            // Same millisecond or regression: increment
            // This might overflow into the timestamp bits if we exhaust 16 bits (65536 IDs/ms),
            // which effectively moves us to the "next" millisecond in ID space.
            self.last_val = self.last_val.wrapping_add(1);
        }
        self.last_val
    }

    /// Extract the timestamp part (milliseconds since epoch)
    pub fn timestamp_ms(val: u64) -> u64 {
        val >> 16
    }
}
