use crate::models::ReviewMetrics;

/// How a single sample entered, changed or left the population.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampleChange {
    Add(f64),
    Edit { old: f64, new: f64 },
    Delete(f64),
}

impl SampleChange {
    /// Builds a change from the optional old and new sides of a metric.
    /// Returns `None` when neither side carries a sample.
    pub fn from_sides(old: Option<f64>, new: Option<f64>) -> Option<Self> {
        match (old, new) {
            (None, Some(new)) => Some(SampleChange::Add(new)),
            (Some(old), Some(new)) => Some(SampleChange::Edit { old, new }),
            (Some(old), None) => Some(SampleChange::Delete(old)),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageUpdate {
    pub old_average: Option<f64>,
    pub old_count: u32,
    pub new_count: u32,
    pub change: SampleChange,
}

/// Recomputes a running mean from its previous value without re-reading the samples.
pub fn update_average(update: AverageUpdate) -> Option<f64> {
    if update.new_count == 0 {
        return None;
    }

    let old_total = update.old_average.unwrap_or(0.0) * f64::from(update.old_count);
    let new_total = match update.change {
        SampleChange::Add(new) => old_total + new,
        SampleChange::Edit { old, new } => old_total - old + new,
        SampleChange::Delete(old) => old_total - old,
    };

    Some(new_total / f64::from(update.new_count))
}

/// Review-level counterpart of [`SampleChange`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReviewChange {
    Add(ReviewMetrics),
    Edit {
        old: ReviewMetrics,
        new: ReviewMetrics,
    },
    Delete(ReviewMetrics),
}

impl ReviewChange {
    fn sides(&self) -> (Option<ReviewMetrics>, Option<ReviewMetrics>) {
        match *self {
            ReviewChange::Add(new) => (None, Some(new)),
            ReviewChange::Edit { old, new } => (Some(old), Some(new)),
            ReviewChange::Delete(old) => (Some(old), None),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Averages {
    pub workload: Option<f64>,
    pub difficulty: Option<f64>,
    pub overall: Option<f64>,
    pub staff_support: Option<f64>,
}

pub fn update_averages(
    current: Averages,
    old_count: u32,
    new_count: u32,
    change: ReviewChange,
) -> Averages {
    if new_count == 0 {
        return Averages::default();
    }

    let is_edit = matches!(change, ReviewChange::Edit { .. });
    let (old, new) = change.sides();
    let metric = |old_average: Option<f64>, pick: fn(&ReviewMetrics) -> Option<f64>| {
        let (old_value, new_value) = (old.as_ref().and_then(pick), new.as_ref().and_then(pick));
        // an edit keeps the count, so a sample appearing or vanishing has no defined mean
        if is_edit && old_value.is_some() != new_value.is_some() {
            return old_average;
        }
        match SampleChange::from_sides(old_value, new_value) {
            Some(change) => update_average(AverageUpdate {
                old_average,
                old_count,
                new_count,
                change,
            }),
            // no sample on either side, the mean is untouched
            None => old_average,
        }
    };

    Averages {
        workload: metric(current.workload, |m| Some(m.workload)),
        difficulty: metric(current.difficulty, |m| Some(m.difficulty)),
        overall: metric(current.overall, |m| Some(m.overall)),
        staff_support: metric(current.staff_support, |m| m.staff_support),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    fn assert_close(actual: Option<f64>, expected: Option<f64>) {
        match (actual, expected) {
            (Some(a), Some(b)) => assert!((a - b).abs() < 1e-9, "{a} != {b}"),
            (a, b) => assert_eq!(a, b),
        }
    }

    fn metrics(workload: f64, difficulty: f64, overall: f64, staff: f64) -> ReviewMetrics {
        ReviewMetrics {
            workload,
            difficulty,
            overall,
            staff_support: Some(staff),
        }
    }

    fn averages_of(reviews: &[ReviewMetrics]) -> Averages {
        let pick = |f: fn(&ReviewMetrics) -> f64| {
            Some(mean(&reviews.iter().map(f).collect::<Vec<_>>()))
        };
        Averages {
            workload: pick(|m| m.workload),
            difficulty: pick(|m| m.difficulty),
            overall: pick(|m| m.overall),
            staff_support: pick(|m| m.staff_support.unwrap_or(0.0)),
        }
    }

    fn base_reviews() -> Vec<ReviewMetrics> {
        vec![
            metrics(10.0, 3.0, 3.0, 3.0),
            metrics(15.0, 4.0, 2.0, 3.0),
            metrics(5.0, 1.0, 5.0, 5.0),
        ]
    }

    #[test]
    fn returns_none_for_zero_new_count() {
        let update = AverageUpdate {
            old_average: Some(3.0),
            old_count: 1,
            new_count: 0,
            change: SampleChange::Delete(3.0),
        };
        assert_eq!(update_average(update), None);
    }

    #[test]
    fn first_sample_becomes_the_average() {
        let update = AverageUpdate {
            old_average: None,
            old_count: 0,
            new_count: 1,
            change: SampleChange::Add(4.0),
        };
        assert_eq!(update_average(update), Some(4.0));
    }

    #[test]
    fn updates_average_for_added_edited_and_deleted_values() {
        let old = [1.0, 2.0, 3.0, 4.0, 5.0];
        let old_average = Some(mean(&old));

        let added = update_average(AverageUpdate {
            old_average,
            old_count: 5,
            new_count: 6,
            change: SampleChange::Add(6.0),
        });
        assert_eq!(added, Some(mean(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])));

        let edited = update_average(AverageUpdate {
            old_average,
            old_count: 5,
            new_count: 5,
            change: SampleChange::Edit { old: 5.0, new: 6.0 },
        });
        assert_eq!(edited, Some(mean(&[1.0, 2.0, 3.0, 4.0, 6.0])));

        let deleted = update_average(AverageUpdate {
            old_average,
            old_count: 5,
            new_count: 4,
            change: SampleChange::Delete(5.0),
        });
        assert_eq!(deleted, Some(mean(&[1.0, 2.0, 3.0, 4.0])));
    }

    #[test]
    fn averages_are_all_none_for_zero_new_count() {
        let reviews = base_reviews();
        let updated = update_averages(averages_of(&reviews), 1, 0, ReviewChange::Delete(reviews[0]));
        assert_eq!(updated, Averages::default());
    }

    #[test]
    fn averages_follow_added_review() {
        let mut reviews = base_reviews();
        let added = metrics(7.0, 2.0, 4.0, 4.0);
        let updated = update_averages(averages_of(&reviews), 3, 4, ReviewChange::Add(added));

        reviews.push(added);
        let expected = averages_of(&reviews);
        assert_close(updated.workload, expected.workload);
        assert_close(updated.difficulty, expected.difficulty);
        assert_close(updated.overall, expected.overall);
        assert_close(updated.staff_support, expected.staff_support);
    }

    #[test]
    fn averages_follow_edited_review() {
        let reviews = base_reviews();
        let edited = metrics(7.0, 2.0, 4.0, 4.0);
        let updated = update_averages(
            averages_of(&reviews),
            3,
            3,
            ReviewChange::Edit {
                old: reviews[2],
                new: edited,
            },
        );

        let expected = averages_of(&[reviews[0], reviews[1], edited]);
        assert_close(updated.workload, expected.workload);
        assert_close(updated.difficulty, expected.difficulty);
        assert_close(updated.overall, expected.overall);
    }

    #[test]
    fn averages_follow_deleted_review() {
        let reviews = base_reviews();
        let updated = update_averages(averages_of(&reviews), 3, 2, ReviewChange::Delete(reviews[2]));

        let expected = averages_of(&reviews[..2]);
        assert_close(updated.workload, expected.workload);
        assert_close(updated.difficulty, expected.difficulty);
        assert_close(updated.overall, expected.overall);
    }

    #[test]
    fn edit_gaining_or_losing_staff_support_keeps_previous_mean() {
        let reviews = base_reviews();
        let mut without = reviews[2];
        without.staff_support = None;
        let current = averages_of(&reviews);

        let dropped = update_averages(current, 3, 3, ReviewChange::Edit { old: reviews[2], new: without });
        assert_eq!(dropped.staff_support, current.staff_support);
        assert_close(dropped.workload, current.workload);

        let gained = update_averages(current, 3, 3, ReviewChange::Edit { old: without, new: reviews[2] });
        assert_eq!(gained.staff_support, current.staff_support);
    }

    #[test]
    fn missing_staff_support_keeps_previous_mean() {
        let mut added = metrics(7.0, 2.0, 4.0, 0.0);
        added.staff_support = None;
        let current = Averages {
            staff_support: Some(3.5),
            ..averages_of(&base_reviews())
        };

        let updated = update_averages(current, 3, 4, ReviewChange::Add(added));
        assert_eq!(updated.staff_support, Some(3.5));
    }
}
