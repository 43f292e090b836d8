/// The number of blocks between trial phases.
pub const DEFAULT_TRIAL_INTERVAL: usize = 100;

/// The number of blocks compressed both ways in each trial phase.
pub const DEFAULT_TRIAL_COUNT: usize = 2;

/// The size ratio the secondary encoder must reach to win a trial.
///
/// With `0.98`, the secondary output must be at least 2% smaller than the primary output.
pub const DEFAULT_SECONDARY_MARGIN: f64 = 0.98;

/// Which encoder to use for the next block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Choice {
    /// Compress with both encoders and keep the smaller output.
    Trial,
    /// Use the primary encoder.
    Primary,
    /// Use the secondary encoder.
    Secondary,
}

/// Adaptive encoder selection state for a stream of blocks.
///
/// The first blocks of a stream are trials, compressed with both encoders. Afterward, the encoder
/// that won more trials is used alone until the next trial phase.
#[derive(Clone, Debug, PartialEq)]
pub struct Metrics {
    trial_interval: usize,
    trial_count: usize,
    secondary_margin: f64,
    trials_remaining: usize,
    countdown: usize,
    primary_wins: usize,
    secondary_wins: usize,
}

impl Metrics {
    /// Creates adaptive encoder selection state.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::container::block::Metrics;
    /// let metrics = Metrics::new(100, 2, 0.98);
    /// ```
    pub fn new(trial_interval: usize, trial_count: usize, secondary_margin: f64) -> Self {
        let trial_interval = trial_interval.max(1);

        Self {
            trial_interval,
            trial_count,
            secondary_margin,
            trials_remaining: trial_count,
            countdown: trial_interval,
            primary_wins: 0,
            secondary_wins: 0,
        }
    }

    /// Returns the number of trials the primary encoder won in the current phase.
    pub fn primary_wins(&self) -> usize {
        self.primary_wins
    }

    /// Returns the number of trials the secondary encoder won in the current phase.
    pub fn secondary_wins(&self) -> usize {
        self.secondary_wins
    }

    /// Advances the state by one block and returns how to compress it.
    pub fn next_choice(&mut self) -> Choice {
        if self.trials_remaining > 0 {
            self.trials_remaining -= 1;
            return Choice::Trial;
        }

        self.countdown -= 1;

        if self.countdown == 0 {
            self.countdown = self.trial_interval;
            self.primary_wins = 0;
            self.secondary_wins = 0;

            if self.trial_count > 0 {
                self.trials_remaining = self.trial_count - 1;
                return Choice::Trial;
            }
        }

        if self.secondary_wins > self.primary_wins {
            Choice::Secondary
        } else {
            Choice::Primary
        }
    }

    /// Records the result of a trial and returns whether the secondary output won.
    pub fn record_trial(&mut self, primary_len: usize, secondary_len: usize) -> bool {
        let secondary_wins = secondary_len as f64 <= self.secondary_margin * primary_len as f64;

        if secondary_wins {
            self.secondary_wins += 1;
        } else {
            self.primary_wins += 1;
        }

        secondary_wins
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(
            DEFAULT_TRIAL_INTERVAL,
            DEFAULT_TRIAL_COUNT,
            DEFAULT_SECONDARY_MARGIN,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_choice() {
        let mut metrics = Metrics::new(4, 2, DEFAULT_SECONDARY_MARGIN);

        assert_eq!(metrics.next_choice(), Choice::Trial);
        assert!(metrics.record_trial(100, 50));
        assert_eq!(metrics.next_choice(), Choice::Trial);
        assert!(metrics.record_trial(100, 90));

        assert_eq!(metrics.next_choice(), Choice::Secondary);
        assert_eq!(metrics.next_choice(), Choice::Secondary);
        assert_eq!(metrics.next_choice(), Choice::Secondary);

        // The interval elapses: counters reset and a new trial phase starts.
        assert_eq!(metrics.next_choice(), Choice::Trial);
        assert_eq!(metrics.primary_wins(), 0);
        assert_eq!(metrics.secondary_wins(), 0);
        assert!(!metrics.record_trial(100, 99));
        assert_eq!(metrics.next_choice(), Choice::Trial);
        assert!(!metrics.record_trial(100, 100));

        assert_eq!(metrics.next_choice(), Choice::Primary);
    }

    #[test]
    fn test_record_trial() {
        let mut metrics = Metrics::default();

        assert!(metrics.record_trial(100, 98));
        assert!(!metrics.record_trial(100, 99));
        assert!(!metrics.record_trial(0, 1));
        assert!(metrics.record_trial(0, 0));

        assert_eq!(metrics.secondary_wins(), 2);
        assert_eq!(metrics.primary_wins(), 2);
    }

    #[test]
    fn test_next_choice_with_ties() {
        let mut metrics = Metrics::new(100, 2, DEFAULT_SECONDARY_MARGIN);

        metrics.next_choice();
        metrics.record_trial(100, 50);
        metrics.next_choice();
        metrics.record_trial(50, 100);

        assert_eq!(metrics.next_choice(), Choice::Primary);
    }

    #[test]
    fn test_next_choice_without_trials() {
        let mut metrics = Metrics::new(1, 0, DEFAULT_SECONDARY_MARGIN);

        for _ in 0..4 {
            assert_eq!(metrics.next_choice(), Choice::Primary);
        }
    }
}
