use chrono::TimeDelta;

/// Durations and failure counts reconstructed for one stack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimelineSummary {
    /// Present only when a CREATE_COMPLETE found its CREATE_IN_PROGRESS.
    pub creation_duration: Option<TimeDelta>,

    /// One entry per paired update, in the order encountered.
    pub update_durations: Vec<TimeDelta>,

    /// Number of UPDATE_ROLLBACK_COMPLETE events for the stack itself.
    pub failed_update_count: u32,
}

impl TimelineSummary {
    /// Mean of the update durations, `None` when there were no updates.
    ///
    /// Rounded to the nearest microsecond, ties to even.
    pub fn average_update_duration(&self) -> Option<TimeDelta> {
        if self.update_durations.is_empty() {
            return None;
        }

        let total: i128 = self
            .update_durations
            .iter()
            .map(|d| i128::from(micros(*d)))
            .sum();
        let count = self.update_durations.len() as i128;

        let mut quotient = total.div_euclid(count);
        let remainder = total.rem_euclid(count);
        if remainder * 2 > count || (remainder * 2 == count && quotient % 2 != 0) {
            quotient += 1;
        }

        // The mean lies between the smallest and largest input, so it fits.
        Some(TimeDelta::microseconds(quotient as i64))
    }
}

fn micros(delta: TimeDelta) -> i64 {
    delta
        .num_microseconds()
        .unwrap_or(if delta < TimeDelta::zero() { i64::MIN } else { i64::MAX })
}
