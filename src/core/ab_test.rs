use crate::models::{ABTestSample, Statistics, Variant, VariantSummary};

/// Two-tailed critical values and the confidence bucket each one unlocks,
/// checked from the strictest down. Large-sample approximation, no
/// degrees-of-freedom lookup.
const CONFIDENCE_BUCKETS: [(f64, u8); 3] = [(2.576, 99), (1.96, 95), (1.645, 90)];

/// Confidence reported when no critical value is exceeded
pub const BASELINE_CONFIDENCE: u8 = 80;

/// Compare a control and a variant sample
///
/// Degenerate inputs (an empty arm, two observations in total, zero spread)
/// report a t-statistic of 0 and the baseline confidence.
pub fn analyze(control: &[f64], variant: &[f64]) -> Statistics {
    let control_avg = mean(control);
    let variant_avg = mean(variant);

    let improvement_pct = if control_avg == 0.0 {
        0.0
    } else {
        (variant_avg - control_avg) / control_avg * 100.0
    };

    let t_statistic = t_statistic(control, variant, control_avg, variant_avg);

    Statistics {
        control_avg,
        variant_avg,
        improvement_pct,
        t_statistic,
        confidence_level: confidence_level(t_statistic),
    }
}

/// Map a t-statistic onto one of the 80/90/95/99 buckets
pub fn confidence_level(t_statistic: f64) -> u8 {
    CONFIDENCE_BUCKETS
        .iter()
        .find(|(critical, _)| t_statistic > *critical)
        .map(|(_, level)| *level)
        .unwrap_or(BASELINE_CONFIDENCE)
}

/// Arithmetic mean; 0 for an empty sample
#[inline]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n - 1 denominator); 0 below two observations
pub fn sample_variance(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let squared: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    squared / (values.len() - 1) as f64
}

/// Pooled two-sample variance; `None` when `n1 + n2 <= 2`
pub fn pooled_variance(n1: usize, var1: f64, n2: usize, var2: f64) -> Option<f64> {
    let total = n1 + n2;
    if n1 == 0 || n2 == 0 || total <= 2 {
        return None;
    }
    let weighted = (n1 as f64 - 1.0) * var1 + (n2 as f64 - 1.0) * var2;
    Some(weighted / (total - 2) as f64)
}

fn t_statistic(control: &[f64], variant: &[f64], control_avg: f64, variant_avg: f64) -> f64 {
    let (n1, n2) = (control.len(), variant.len());

    let pooled = match pooled_variance(
        n1,
        sample_variance(control, control_avg),
        n2,
        sample_variance(variant, variant_avg),
    ) {
        Some(pooled) => pooled,
        None => return 0.0,
    };

    let standard_error = (pooled * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    if !standard_error.is_finite() || standard_error <= 0.0 {
        return 0.0;
    }

    (variant_avg - control_avg).abs() / standard_error
}

/// Aggregate one arm's metric values
pub fn summarize(values: &[f64]) -> VariantSummary {
    VariantSummary {
        sample_size: values.len(),
        average: mean(values),
        total: values.iter().sum(),
    }
}

/// Split participant rows into (control, variant) metric values
pub fn split_samples(samples: &[ABTestSample]) -> (Vec<f64>, Vec<f64>) {
    let mut control = Vec::new();
    let mut variant = Vec::new();

    for sample in samples {
        match sample.variant {
            Variant::Control => control.push(sample.metric_value),
            Variant::Variant => variant.push(sample.metric_value),
        }
    }

    (control, variant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_samples() {
        let stats = analyze(&[10.0, 10.0, 10.0], &[10.0, 10.0, 10.0]);

        assert_eq!(stats.improvement_pct, 0.0);
        assert_eq!(stats.t_statistic, 0.0);
        assert_eq!(stats.confidence_level, 80);
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(confidence_level(3.0), 99);
        assert_eq!(confidence_level(2.576), 95);
        assert_eq!(confidence_level(2.0), 95);
        assert_eq!(confidence_level(1.96), 90);
        assert_eq!(confidence_level(1.7), 90);
        assert_eq!(confidence_level(1.645), 80);
        assert_eq!(confidence_level(0.0), 80);
    }

    #[test]
    fn test_known_t_statistic() {
        // control mean 2, var 1; variant mean 4, var 1; pooled 1; se = sqrt(2/3)
        let stats = analyze(&[1.0, 2.0, 3.0], &[3.0, 4.0, 5.0]);

        assert_eq!(stats.control_avg, 2.0);
        assert_eq!(stats.variant_avg, 4.0);
        assert_eq!(stats.improvement_pct, 100.0);
        assert!((stats.t_statistic - 2.0 / (2.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(stats.confidence_level, 95);
    }

    #[test]
    fn test_zero_control_average() {
        let stats = analyze(&[0.0, 0.0], &[1.0, 2.0]);
        assert_eq!(stats.improvement_pct, 0.0);
    }

    #[test]
    fn test_insufficient_samples() {
        let stats = analyze(&[5.0], &[9.0]);
        assert_eq!(stats.t_statistic, 0.0);
        assert_eq!(stats.confidence_level, 80);

        let stats = analyze(&[], &[1.0, 2.0, 3.0]);
        assert_eq!(stats.control_avg, 0.0);
        assert_eq!(stats.t_statistic, 0.0);
        assert_eq!(stats.confidence_level, 80);
    }

    #[test]
    fn test_pooled_variance_guard() {
        assert_eq!(pooled_variance(1, 0.0, 1, 0.0), None);
        assert_eq!(pooled_variance(0, 0.0, 5, 2.0), None);
        assert_eq!(pooled_variance(3, 1.0, 3, 3.0), Some(2.0));
    }

    #[test]
    fn test_split_and_summarize() {
        let samples = vec![
            ABTestSample { variant: Variant::Control, metric_value: 1.0 },
            ABTestSample { variant: Variant::Variant, metric_value: 4.0 },
            ABTestSample { variant: Variant::Control, metric_value: 3.0 },
        ];

        let (control, variant) = split_samples(&samples);
        assert_eq!(control, vec![1.0, 3.0]);
        assert_eq!(variant, vec![4.0]);

        let summary = summarize(&control);
        assert_eq!(summary.sample_size, 2);
        assert_eq!(summary.average, 2.0);
        assert_eq!(summary.total, 4.0);
    }
}
