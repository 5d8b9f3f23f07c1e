//! Upper-tail outlier trimming.
//!
//! Network timing distributions carry a heavy right tail from scheduler
//! preemption and transient host load. Trimming drops the highest
//! `floor(percent * n / 100)` samples of each segment's dataset,
//! independently per segment, before analysis.

use crate::runner::Dataset;

/// Drop the highest `percent`% of samples from each dataset.
///
/// Each dataset is sorted ascending by sample value and truncated to its
/// lowest `n - floor(percent * n / 100)` entries; ties at the cut
/// boundary are resolved by the stable sort's numeric ordering alone.
/// `percent == 0` returns the datasets untouched, preserving collection
/// order. Trimming one dataset never affects another's count.
///
/// # Panics
///
/// Panics if `percent >= 100`; the pipeline validates the range before
/// calling.
pub fn trim_upper(datasets: Vec<Dataset>, percent: u8) -> Vec<Dataset> {
    assert!(percent < 100, "outlier percentage must be in [0, 100)");
    if percent == 0 {
        return datasets;
    }

    datasets
        .into_iter()
        .map(|mut dataset| {
            let remove = percent as usize * dataset.len() / 100;
            dataset.samples.sort_by_key(|s| s.nanos());
            dataset.samples.truncate(dataset.len() - remove);
            dataset
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::DurationSample;

    fn dataset(index: usize, nanos: &[u64]) -> Dataset {
        Dataset {
            segment_index: index,
            samples: nanos.iter().map(|&n| DurationSample::Elapsed(n)).collect(),
        }
    }

    #[test]
    fn removes_floor_of_percent_times_n_highest_values() {
        // R = 10, P = 20 -> floor(20 * 10 / 100) = 2 removed.
        let input = vec![dataset(0, &[50, 10, 90, 30, 70, 20, 80, 40, 60, 100])];
        let trimmed = trim_upper(input, 20);
        assert_eq!(trimmed[0].len(), 8);
        assert_eq!(
            trimmed[0].nanos(),
            vec![10, 20, 30, 40, 50, 60, 70, 80]
        );
    }

    #[test]
    fn zero_percent_is_identity() {
        let input = vec![dataset(0, &[5, 3, 9, 1])];
        let trimmed = trim_upper(input.clone(), 0);
        assert_eq!(trimmed, input);
    }

    #[test]
    fn segments_are_trimmed_independently() {
        let input = vec![
            dataset(0, &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
            dataset(2, &[10, 20, 30, 40]),
        ];
        let trimmed = trim_upper(input, 25);
        // floor(25 * 10 / 100) = 2 and floor(25 * 4 / 100) = 1.
        assert_eq!(trimmed[0].len(), 8);
        assert_eq!(trimmed[1].len(), 3);
        assert_eq!(trimmed[1].nanos(), vec![10, 20, 30]);
        assert_eq!(trimmed[1].segment_index, 2);
    }

    #[test]
    fn small_percent_on_small_dataset_removes_nothing() {
        // floor(5 * 10 / 100) = 0: sorted but nothing dropped.
        let input = vec![dataset(0, &[3, 1, 2])];
        let trimmed = trim_upper(input, 5);
        assert_eq!(trimmed[0].nanos(), vec![1, 2, 3]);
    }

    #[test]
    fn fault_sentinels_sort_lowest_and_survive_trimming() {
        let mut ds = dataset(0, &[100, 110, 120, 95]);
        ds.samples.push(DurationSample::Fault);
        let trimmed = trim_upper(vec![ds], 20);
        // floor(20 * 5 / 100) = 1: the highest value goes, the sentinel stays.
        assert_eq!(trimmed[0].len(), 4);
        assert_eq!(trimmed[0].fault_count(), 1);
        assert_eq!(trimmed[0].nanos(), vec![0, 95, 100, 110]);
    }
}
