use std::collections::HashMap;

/// A data series key.
pub type Key = [u8; 2];

/// Per-container value histograms.
///
/// The record encoder feeds each data series value through here so it can choose an encoding for
/// the series before the container is written.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Statistics(HashMap<Key, HashMap<i32, u64>>);

impl Statistics {
    /// Records one occurrence of a value in a data series.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::container::Statistics;
    ///
    /// let mut statistics = Statistics::default();
    /// statistics.add(*b"RL", 100);
    /// statistics.add(*b"RL", 100);
    ///
    /// assert_eq!(statistics.get(*b"RL").and_then(|values| values.get(&100)), Some(&2));
    /// ```
    pub fn add(&mut self, key: Key, value: i32) {
        *self.0.entry(key).or_default().entry(value).or_default() += 1;
    }

    /// Returns the value histogram of a data series.
    pub fn get(&self, key: Key) -> Option<&HashMap<i32, u64>> {
        self.0.get(&key)
    }

    /// Returns the number of distinct values seen in a data series.
    pub fn distinct_value_count(&self, key: Key) -> usize {
        self.get(key).map(HashMap::len).unwrap_or_default()
    }

    /// Returns whether no values were recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Removes all histograms.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        let mut statistics = Statistics::default();
        assert!(statistics.is_empty());

        statistics.add(*b"BF", 0);
        statistics.add(*b"BF", 16);
        statistics.add(*b"BF", 0);

        assert_eq!(statistics.distinct_value_count(*b"BF"), 2);
        assert_eq!(statistics.distinct_value_count(*b"RL"), 0);

        statistics.clear();
        assert!(statistics.is_empty());
    }
}
