use rand::Rng;
use std::time::Duration;

/// Exponential backoff with ±30% jitter. The exponent is capped so the
/// delay stays bounded regardless of the attempt number.
pub fn backoff_delay(attempt: u32, base_delay_ms: u64) -> Duration {
    let capped_attempt = attempt.min(6);

    let base = base_delay_ms.saturating_mul(2_u64.saturating_pow(capped_attempt));

    let jitter = rand::thread_rng().gen_range(0.7..1.3);
    let delay_ms = (base as f64 * jitter).round() as u64;

    Duration::from_millis(delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progression_doubles_with_jitter() {
        let base = 1000;

        let d0 = backoff_delay(0, base);
        let d1 = backoff_delay(1, base);
        let d2 = backoff_delay(2, base);

        assert!(d0.as_millis() >= 700 && d0.as_millis() <= 1300);
        assert!(d1.as_millis() >= 1400 && d1.as_millis() <= 2600);
        assert!(d2.as_millis() >= 2800 && d2.as_millis() <= 5200);
    }

    #[test]
    fn exponent_is_capped() {
        let base = 1000;

        // 1000 * 2^6 = 64000ms, jittered 44.8k..83.2k
        let high = backoff_delay(30, base);
        let capped = backoff_delay(6, base);

        assert!(high.as_millis() >= 44_800 && high.as_millis() <= 83_200);
        assert!(capped.as_millis() >= 44_800 && capped.as_millis() <= 83_200);
    }
}
