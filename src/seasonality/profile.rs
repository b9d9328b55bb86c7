//! Calendar seasonality profiles.
//!
//! Values are bucketed by hour of day, day of week and month of year, and
//! each profile is summarised as a [`SeasonalComponent`].

use crate::core::{Calendar, Sample, SampleSeries, SeasonalPeriod};
use crate::error::Result;
use crate::utils::stats;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Seasonal profile of one calendar cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalComponent {
    /// `Hourly` for hour of day, `Daily` for day of week, `Monthly` for month of year.
    pub period: SeasonalPeriod,
    /// Coefficient of variation of the bucket means, in `[0, 1]`.
    pub strength: f64,
    /// Bucket indices that are local maxima above the profile mean.
    pub peaks: Vec<usize>,
    /// Bucket indices that are local minima below the profile mean.
    pub valleys: Vec<usize>,
    pub amplitude: f64,
    /// Index of the first peak, 0 if there is none.
    pub phase: usize,
    pub confidence: f64,
    /// Mean value per bucket, `None` where no samples fell.
    pub bucket_means: Vec<Option<f64>>,
}

/// Configuration for the seasonality profiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Below this many samples no profile is produced.
    pub min_samples: usize,
    /// Offset east of UTC used to derive calendar fields.
    pub utc_offset_minutes: i32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            min_samples: 24,
            utc_offset_minutes: 0,
        }
    }
}

impl ProfileConfig {
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = min_samples;
        self
    }

    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }
}

/// Builds hour-of-day, weekday and month profiles.
#[derive(Debug, Clone, Default)]
pub struct SeasonalityProfiler {
    config: ProfileConfig,
}

impl SeasonalityProfiler {
    pub fn new(config: ProfileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    pub fn profile(&self, samples: &[Sample]) -> Result<Vec<SeasonalComponent>> {
        let series = SampleSeries::from_slice(samples)?;
        self.profile_series(&series)
    }

    pub fn profile_series(&self, series: &SampleSeries) -> Result<Vec<SeasonalComponent>> {
        let calendar = Calendar::with_offset_minutes(self.config.utc_offset_minutes)?;
        if series.len() < self.config.min_samples.max(1) {
            trace!(
                samples = series.len(),
                needed = self.config.min_samples,
                "too few samples for seasonality profiles"
            );
            return Ok(Vec::new());
        }

        let cycles: [(SeasonalPeriod, usize, fn(&Calendar, &Sample) -> usize); 3] = [
            (SeasonalPeriod::Hourly, 24, |c, s| c.hour(&s.timestamp)),
            (SeasonalPeriod::Daily, 7, |c, s| c.weekday(&s.timestamp)),
            (SeasonalPeriod::Monthly, 12, |c, s| c.month(&s.timestamp)),
        ];

        let components: Vec<SeasonalComponent> = cycles
            .iter()
            .filter_map(|&(period, buckets, key)| {
                let means = bucket_means(series.samples(), buckets, |s| key(&calendar, s));
                summarize_profile(period, means)
            })
            .collect();

        debug!(
            samples = series.len(),
            profiles = components.len(),
            "seasonality profiling complete"
        );
        Ok(components)
    }
}

/// Profile with the given configuration.
pub fn profile_seasonality(
    samples: &[Sample],
    config: &ProfileConfig,
) -> Result<Vec<SeasonalComponent>> {
    SeasonalityProfiler::new(config.clone()).profile(samples)
}

fn bucket_means<F>(samples: &[Sample], buckets: usize, key: F) -> Vec<Option<f64>>
where
    F: Fn(&Sample) -> usize,
{
    let mut sums = vec![0.0; buckets];
    let mut counts = vec![0usize; buckets];
    for sample in samples {
        let b = key(sample);
        sums[b] += sample.value;
        counts[b] += 1;
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
        .collect()
}

fn summarize_profile(period: SeasonalPeriod, means: Vec<Option<f64>>) -> Option<SeasonalComponent> {
    let populated: Vec<(usize, f64)> = means
        .iter()
        .enumerate()
        .filter_map(|(i, m)| m.map(|v| (i, v)))
        .collect();
    if populated.len() < 2 {
        return None;
    }

    let values: Vec<f64> = populated.iter().map(|&(_, v)| v).collect();
    let mean = stats::mean(&values);
    let strength = if mean > 0.0 {
        (stats::std_dev(&values) / mean).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let m = populated.len();
    let mut peaks = Vec::new();
    let mut valleys = Vec::new();
    for (j, &(bucket, value)) in populated.iter().enumerate() {
        let prev = populated[(j + m - 1) % m].1;
        let next = populated[(j + 1) % m].1;
        if value > prev && value > next && value > mean {
            peaks.push(bucket);
        } else if value < prev && value < next && value < mean {
            valleys.push(bucket);
        }
    }

    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);

    Some(SeasonalComponent {
        period,
        strength,
        phase: peaks.first().copied().unwrap_or(0),
        peaks,
        valleys,
        amplitude: max - min,
        confidence: (strength * 2.0).min(0.95),
        bucket_means: means,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn hourly_samples(values: &[f64]) -> Vec<Sample> {
        // 2024-01-01 is a Monday
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(start + Duration::hours(i as i64), v))
            .collect()
    }

    fn find(components: &[SeasonalComponent], period: SeasonalPeriod) -> Option<&SeasonalComponent> {
        components.iter().find(|c| c.period == period)
    }

    #[test]
    fn hour_of_day_profile_finds_afternoon_peak() {
        // two days, busy at 14:00
        let values: Vec<f64> = (0..48)
            .map(|i| if i % 24 == 14 { 200.0 } else { 100.0 })
            .collect();
        let components = SeasonalityProfiler::default()
            .profile(&hourly_samples(&values))
            .unwrap();

        let hourly = find(&components, SeasonalPeriod::Hourly).unwrap();
        assert_eq!(hourly.peaks, vec![14]);
        assert!(hourly.valleys.is_empty());
        assert_eq!(hourly.phase, 14);
        assert_relative_eq!(hourly.amplitude, 100.0);
        assert_eq!(hourly.bucket_means.len(), 24);
        assert_eq!(hourly.bucket_means[14], Some(200.0));
        assert!(hourly.strength > 0.0);
        assert!(hourly.confidence <= 0.95);
    }

    #[test]
    fn weekday_profile_uses_monday_first() {
        let values: Vec<f64> = (0..24 * 7)
            .map(|i| if i / 24 == 5 { 10.0 } else { 50.0 })
            .collect();
        let components = SeasonalityProfiler::default()
            .profile(&hourly_samples(&values))
            .unwrap();

        let weekly = find(&components, SeasonalPeriod::Daily).unwrap();
        // Saturday is day 5
        assert_eq!(weekly.valleys, vec![5]);
        assert_eq!(weekly.bucket_means[5], Some(10.0));
        assert_eq!(weekly.phase, 0);
    }

    #[test]
    fn single_bucket_profiles_are_omitted() {
        // one day: only one weekday and one month populated
        let values: Vec<f64> = (0..24).map(|i| i as f64 + 1.0).collect();
        let components = SeasonalityProfiler::default()
            .profile(&hourly_samples(&values))
            .unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].period, SeasonalPeriod::Hourly);
    }

    #[test]
    fn empty_buckets_are_none() {
        let values: Vec<f64> = (0..24 * 3).map(|i| (i % 24) as f64 + 1.0).collect();
        let components = SeasonalityProfiler::default()
            .profile(&hourly_samples(&values))
            .unwrap();
        let weekly = find(&components, SeasonalPeriod::Daily).unwrap();
        assert!(weekly.bucket_means[..3].iter().all(Option::is_some));
        assert!(weekly.bucket_means[3..].iter().all(Option::is_none));
    }

    #[test]
    fn flat_series_has_zero_strength() {
        let components = SeasonalityProfiler::default()
            .profile(&hourly_samples(&[50.0; 100]))
            .unwrap();
        for c in &components {
            assert_eq!(c.strength, 0.0);
            assert_eq!(c.amplitude, 0.0);
            assert!(c.peaks.is_empty());
            assert!(c.valleys.is_empty());
        }
    }

    #[test]
    fn non_positive_mean_has_zero_strength() {
        let values: Vec<f64> = (0..48).map(|i| -((i % 24) as f64) - 1.0).collect();
        let components = SeasonalityProfiler::default()
            .profile(&hourly_samples(&values))
            .unwrap();
        assert_eq!(find(&components, SeasonalPeriod::Hourly).unwrap().strength, 0.0);
    }

    #[test]
    fn offset_moves_hour_buckets() {
        let values: Vec<f64> = (0..48)
            .map(|i| if i % 24 == 14 { 200.0 } else { 100.0 })
            .collect();
        let config = ProfileConfig::default().with_utc_offset_minutes(120);
        let components = profile_seasonality(&hourly_samples(&values), &config).unwrap();
        assert_eq!(find(&components, SeasonalPeriod::Hourly).unwrap().peaks, vec![16]);
    }

    #[test]
    fn too_few_samples_is_empty() {
        let components = SeasonalityProfiler::default()
            .profile(&hourly_samples(&[1.0; 23]))
            .unwrap();
        assert!(components.is_empty());
    }
}
