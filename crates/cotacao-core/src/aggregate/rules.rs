use crate::aggregate::outcome::{ExclusionDirection, FinalMethod};
use crate::policy::schema::{OutlierRule, Statistic};
use rust_decimal::{Decimal, MathematicalOps};

/// Verdict for one value of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Kept,
    Excluded {
        direction: ExclusionDirection,
        reference: Option<Decimal>,
        ratio: Option<Decimal>,
    },
}

impl Mark {
    pub fn is_kept(&self) -> bool {
        matches!(self, Mark::Kept)
    }
}

/// Mark every value of one item. Depends on `values` alone.
pub fn mark_outliers(rule: &OutlierRule, values: &[Decimal]) -> Vec<Mark> {
    match rule {
        OutlierRule::MeanOfOthers {
            upper_ratio,
            lower_ratio,
        } => mean_of_others(values, *upper_ratio, *lower_ratio),
        OutlierRule::MedianBand {
            upper_fraction,
            lower_fraction,
        } => median_band(values, *upper_fraction, *lower_fraction),
        OutlierRule::Iqr { k } => iqr_fences(values, *k),
    }
}

fn mean_of_others(values: &[Decimal], upper: Decimal, lower: Decimal) -> Vec<Mark> {
    let mut marks = vec![Mark::Kept; values.len()];

    for (i, &v) in values.iter().enumerate() {
        if let Some((m, ratio)) = ratio_to_others(values, i) {
            if ratio > upper {
                marks[i] = excluded(ExclusionDirection::High, m, ratio);
            }
        }
    }

    // Lows are judged only among the values that survived the high pass
    let kept: Vec<usize> = (0..values.len()).filter(|&i| marks[i].is_kept()).collect();
    let kept_values: Vec<Decimal> = kept.iter().map(|&i| values[i]).collect();
    for (j, &i) in kept.iter().enumerate() {
        if let Some((m, ratio)) = ratio_to_others(&kept_values, j) {
            if ratio < lower {
                marks[i] = excluded(ExclusionDirection::Low, m, ratio);
            }
        }
    }

    marks
}

fn ratio_to_others(values: &[Decimal], idx: usize) -> Option<(Decimal, Decimal)> {
    let m = mean_without(values, idx)?;
    if m.is_zero() {
        return None;
    }
    Some((m, values[idx].checked_div(m)?))
}

fn excluded(direction: ExclusionDirection, reference: Decimal, ratio: Decimal) -> Mark {
    Mark::Excluded {
        direction,
        reference: Some(reference),
        ratio: Some(ratio),
    }
}

fn median_band(values: &[Decimal], upper: Decimal, lower: Decimal) -> Vec<Mark> {
    let Some(med) = median(values) else {
        return vec![Mark::Kept; values.len()];
    };
    // A limit that does not fit in a Decimal excludes nothing on its side
    let high_limit = Decimal::ONE.checked_add(upper).and_then(|f| f.checked_mul(med));
    let low_limit = Decimal::ONE.checked_sub(lower).and_then(|f| f.checked_mul(med));

    values
        .iter()
        .map(|&v| {
            let ratio = v.checked_div(med);
            if high_limit.is_some_and(|limit| v > limit) {
                Mark::Excluded {
                    direction: ExclusionDirection::High,
                    reference: Some(med),
                    ratio,
                }
            } else if low_limit.is_some_and(|limit| v < limit) {
                Mark::Excluded {
                    direction: ExclusionDirection::Low,
                    reference: Some(med),
                    ratio,
                }
            } else {
                Mark::Kept
            }
        })
        .collect()
}

fn iqr_fences(values: &[Decimal], k: Decimal) -> Vec<Mark> {
    let mut sorted = values.to_vec();
    sorted.sort();
    let (Some(q1), Some(q3)) = (quantile(&sorted, 1, 4), quantile(&sorted, 3, 4)) else {
        return vec![Mark::Kept; values.len()];
    };
    let spread = q3.checked_sub(q1).and_then(|iqr| iqr.checked_mul(k));
    let high_fence = spread.and_then(|s| q3.checked_add(s));
    let low_fence = spread.and_then(|s| q1.checked_sub(s));

    values
        .iter()
        .map(|&v| match (high_fence, low_fence) {
            (Some(fence), _) if v > fence => Mark::Excluded {
                direction: ExclusionDirection::High,
                reference: Some(fence),
                ratio: None,
            },
            (_, Some(fence)) if v < fence => Mark::Excluded {
                direction: ExclusionDirection::Low,
                reference: Some(fence),
                ratio: None,
            },
            _ => Mark::Kept,
        })
        .collect()
}

pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    checked_sum(values.iter().copied())?.checked_div(Decimal::from(values.len()))
}

/// Sum that gives None instead of overflowing.
fn checked_sum(mut values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

fn mean_without(values: &[Decimal], idx: usize) -> Option<Decimal> {
    if values.len() <= 1 {
        return None;
    }
    let others = values
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != idx)
        .map(|(_, &v)| v);
    checked_sum(others)?.checked_div(Decimal::from(values.len() - 1))
}

pub fn median(values: &[Decimal]) -> Option<Decimal> {
    let mut sorted = values.to_vec();
    sorted.sort();
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        Some(sorted[mid])
    } else {
        let (a, b) = (sorted[mid - 1], sorted[mid]);
        a.checked_add(b)
            .map(|s| s / Decimal::TWO)
            .or_else(|| b.checked_sub(a).and_then(|d| a.checked_add(d / Decimal::TWO)))
    }
}

/// Quantile `num/den` of sorted values by linear interpolation.
fn quantile(sorted: &[Decimal], num: usize, den: usize) -> Option<Decimal> {
    if sorted.is_empty() {
        return None;
    }
    let pos = Decimal::from((sorted.len() - 1) * num) / Decimal::from(den);
    let lo = pos.floor();
    let frac = pos - lo;
    let i = (sorted.len() - 1) * num / den;
    if frac.is_zero() || i + 1 >= sorted.len() {
        return Some(sorted[i]);
    }
    sorted[i + 1]
        .checked_sub(sorted[i])
        .and_then(|d| d.checked_mul(frac))
        .and_then(|d| sorted[i].checked_add(d))
}

/// Population coefficient of variation. None when empty, when the mean is 0
/// or when the squared deviations do not fit in a Decimal.
pub fn coefficient_of_variation(values: &[Decimal]) -> Option<Decimal> {
    let m = mean(values)?;
    if m.is_zero() {
        return None;
    }
    let squares = values
        .iter()
        .map(|&x| x.checked_sub(m).and_then(|d| d.checked_mul(d)))
        .collect::<Option<Vec<_>>>()?;
    let variance = checked_sum(squares.into_iter())?.checked_div(Decimal::from(values.len()))?;
    variance.sqrt()?.checked_div(m)
}

/// Apply a statistic, returning the method used and the value.
pub fn apply_statistic(
    statistic: &Statistic,
    values: &[Decimal],
) -> (Option<FinalMethod>, Option<Decimal>) {
    if values.is_empty() {
        return (None, None);
    }
    let method = match statistic {
        Statistic::Mean => FinalMethod::Mean,
        Statistic::Median => FinalMethod::Median,
        Statistic::CvSwitch { cv_threshold } => {
            match coefficient_of_variation(values) {
                Some(cv) if cv < *cv_threshold => FinalMethod::Mean,
                _ => FinalMethod::Median,
            }
        }
    };
    let value = match method {
        FinalMethod::Mean => mean(values),
        FinalMethod::Median => median(values),
    };
    (Some(method), value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn default_rule() -> OutlierRule {
        OutlierRule::MeanOfOthers {
            upper_ratio: dec!(1.25),
            lower_ratio: dec!(0.75),
        }
    }

    fn directions(marks: &[Mark]) -> Vec<Option<ExclusionDirection>> {
        marks
            .iter()
            .map(|m| match m {
                Mark::Kept => None,
                Mark::Excluded { direction, .. } => Some(*direction),
            })
            .collect()
    }

    #[test]
    fn test_mean_of_others_drops_high_outlier() {
        let values = [dec!(10), dec!(11), dec!(9), dec!(500), dec!(10.5)];
        let marks = mark_outliers(&default_rule(), &values);
        assert_eq!(
            directions(&marks),
            vec![None, None, None, Some(ExclusionDirection::High), None]
        );
        match marks[3] {
            Mark::Excluded {
                reference, ratio, ..
            } => {
                assert_eq!(reference, Some(dec!(10.125)));
                assert!(ratio.unwrap() > dec!(49));
            }
            Mark::Kept => panic!("500 should be excluded"),
        }
    }

    #[test]
    fn test_mean_of_others_low_pass_uses_survivors() {
        // 2 is not low next to 1000 (others mean ~257), but is once 1000 is gone
        let values = [dec!(10), dec!(10), dec!(10), dec!(2), dec!(1000)];
        let marks = mark_outliers(&default_rule(), &values);
        assert_eq!(
            directions(&marks),
            vec![
                None,
                None,
                None,
                Some(ExclusionDirection::Low),
                Some(ExclusionDirection::High)
            ]
        );
    }

    #[test]
    fn test_mean_of_others_zero_reference_kept() {
        let values = [dec!(0), dec!(0), dec!(0), dec!(0), dec!(0)];
        let marks = mark_outliers(&default_rule(), &values);
        assert!(marks.iter().all(Mark::is_kept));
    }

    #[test]
    fn test_mean_of_others_single_value_kept() {
        let marks = mark_outliers(&default_rule(), &[dec!(42)]);
        assert_eq!(marks, vec![Mark::Kept]);
    }

    #[test]
    fn test_median_band() {
        let rule = OutlierRule::MedianBand {
            upper_fraction: dec!(0.25),
            lower_fraction: dec!(0.25),
        };
        let values = [dec!(100), dec!(70), dec!(110), dec!(130), dec!(95)];
        // median 100: keep [75, 125]
        let marks = mark_outliers(&rule, &values);
        assert_eq!(
            directions(&marks),
            vec![
                None,
                Some(ExclusionDirection::Low),
                None,
                Some(ExclusionDirection::High),
                None
            ]
        );
    }

    #[test]
    fn test_iqr_fences() {
        let rule = OutlierRule::Iqr { k: dec!(1.5) };
        let values = [dec!(10), dec!(12), dec!(11), dec!(13), dec!(40), dec!(12)];
        // sorted 10 11 12 12 13 40: Q1 11.25, Q3 12.75, fences 9 and 15
        let marks = mark_outliers(&rule, &values);
        assert_eq!(
            directions(&marks),
            vec![None, None, None, None, Some(ExclusionDirection::High), None]
        );
    }

    #[test]
    fn test_quantile_interpolation() {
        let sorted = [dec!(1), dec!(2), dec!(3), dec!(4)];
        assert_eq!(quantile(&sorted, 1, 4), Some(dec!(1.75)));
        assert_eq!(quantile(&sorted, 3, 4), Some(dec!(3.25)));
        assert_eq!(quantile(&[dec!(5)], 1, 4), Some(dec!(5)));
    }

    #[test]
    fn test_median_even_and_odd() {
        assert_eq!(median(&[dec!(3), dec!(1), dec!(2)]), Some(dec!(2)));
        assert_eq!(median(&[dec!(4), dec!(1), dec!(2), dec!(3)]), Some(dec!(2.5)));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_coefficient_of_variation() {
        // mean 10, population std 2
        let cv = coefficient_of_variation(&[dec!(8), dec!(12), dec!(8), dec!(12)]).unwrap();
        assert_eq!(cv.round_dp(6), dec!(0.2));
        assert_eq!(coefficient_of_variation(&[dec!(0), dec!(0)]), None);
        assert_eq!(coefficient_of_variation(&[]), None);
    }

    #[test]
    fn test_cv_switch_picks_mean_for_tight_values() {
        let stat = Statistic::CvSwitch {
            cv_threshold: dec!(0.25),
        };
        let (method, value) = apply_statistic(&stat, &[dec!(10), dec!(11), dec!(12)]);
        assert_eq!(method, Some(FinalMethod::Mean));
        assert_eq!(value, Some(dec!(11)));
    }

    #[test]
    fn test_cv_switch_picks_median_for_spread_values() {
        let stat = Statistic::CvSwitch {
            cv_threshold: dec!(0.25),
        };
        let (method, value) = apply_statistic(&stat, &[dec!(10), dec!(12), dec!(40)]);
        assert_eq!(method, Some(FinalMethod::Median));
        assert_eq!(value, Some(dec!(12)));
    }

    #[test]
    fn test_huge_values_give_no_cv_instead_of_overflowing() {
        assert_eq!(
            coefficient_of_variation(&[dec!(1), dec!(1000000000000000)]),
            None
        );
    }

    #[test]
    fn test_mean_overflow_is_none() {
        assert_eq!(mean(&[Decimal::MAX, Decimal::MAX]), None);
        assert_eq!(
            apply_statistic(&Statistic::Mean, &[Decimal::MAX, Decimal::MAX]),
            (Some(FinalMethod::Mean), None)
        );
    }

    #[test]
    fn test_median_of_two_maximal_values() {
        assert_eq!(median(&[Decimal::MAX, Decimal::MAX]), Some(Decimal::MAX));
    }

    #[test]
    fn test_rules_on_maximal_values_keep_unjudgeable_quotes() {
        let values = [Decimal::MAX, Decimal::MAX, dec!(1), dec!(1), dec!(1)];
        let marks = mark_outliers(&default_rule(), &values);
        assert_eq!(marks.len(), 5);
        assert!(marks[0].is_kept());
        assert!(marks[1].is_kept());

        let band = OutlierRule::MedianBand {
            upper_fraction: dec!(0.25),
            lower_fraction: dec!(0.25),
        };
        let marks = mark_outliers(&band, &values);
        assert_eq!(marks.len(), 5);

        let marks = mark_outliers(&OutlierRule::Iqr { k: dec!(1.5) }, &values);
        assert!(marks.iter().all(Mark::is_kept));
    }

    #[test]
    fn test_statistic_on_empty() {
        assert_eq!(apply_statistic(&Statistic::Mean, &[]), (None, None));
    }
}
