//! Chronologically ordered keys for appended records.
//!
//! A key is 20 characters: 8 encode the millisecond timestamp, 12 are
//! random. Keys generated within the same millisecond reuse the previous
//! random part incremented by one so they still sort in creation order.

use rand::Rng;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Default)]
pub struct PushIdGenerator {
    last_ms: i64,
    last_rand: [u8; 12],
}

impl PushIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        self.next_at(now, &mut rand::thread_rng())
    }

    pub fn next_at<R: Rng + ?Sized>(&mut self, now_ms: i64, rng: &mut R) -> String {
        let same_ms = now_ms == self.last_ms;
        self.last_ms = now_ms;

        let mut time_chars = [0u8; 8];
        let mut remaining = now_ms.max(0) as u64;
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(remaining % 64) as usize];
            remaining /= 64;
        }

        if same_ms {
            for digit in self.last_rand.iter_mut().rev() {
                if *digit == 63 {
                    *digit = 0;
                } else {
                    *digit += 1;
                    break;
                }
            }
        } else {
            for digit in self.last_rand.iter_mut() {
                *digit = rng.gen_range(0..64);
            }
        }

        let mut id = String::with_capacity(20);
        id.extend(time_chars.iter().map(|&c| c as char));
        id.extend(self.last_rand.iter().map(|&d| PUSH_CHARS[d as usize] as char));
        id
    }
}
