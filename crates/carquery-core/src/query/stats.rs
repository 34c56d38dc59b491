/// Descriptive statistics over record sequences
///
/// Every function skips missing values. Functions that take an attribute fail
/// with a configuration error when the attribute is not numeric.
use super::aggregate::GroupKey;
use crate::error::{Error, Result};
use crate::record::{Attribute, VehicleRecord};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut m = 0.0_f64;
    for (i, x) in values.iter().enumerate() {
        m += (x - m) / (i + 1) as f64;
    }
    Some(m)
}

/// Middle value, or the average of the two middle values for even counts.
pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = sorted(values);
    let n = sorted.len();
    match n {
        0 => None,
        _ if n % 2 == 1 => Some(sorted[n / 2]),
        _ => Some(sorted[n / 2 - 1] / 2.0 + sorted[n / 2] / 2.0),
    }
}

/// Quantile with linear interpolation between closest ranks.
pub fn quantile(values: &[f64], q: f64) -> Result<Option<f64>> {
    if !(0.0..=1.0).contains(&q) {
        return Err(Error::config(format!("quantile {} outside [0, 1]", q)));
    }
    Ok(quantile_sorted(&sorted(values), q))
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Fails with a configuration error unless the attribute is numeric.
pub fn require_numeric(attribute: Attribute) -> Result<()> {
    if !attribute.kind().is_numeric() {
        return Err(Error::config(format!(
            "{} is a {} attribute, expected a numeric one",
            attribute,
            attribute.kind()
        )));
    }
    Ok(())
}

/// Non-null numeric values of an attribute.
pub fn numbers<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
    attribute: Attribute,
) -> Vec<f64> {
    records
        .into_iter()
        .filter_map(|r| r.number(attribute))
        .collect()
}

/// Quantile of a numeric attribute over the records.
pub fn attribute_quantile<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
    attribute: Attribute,
    q: f64,
) -> Result<Option<f64>> {
    require_numeric(attribute)?;
    quantile(&numbers(records, attribute), q)
}

/// Missing values per attribute, every attribute present.
pub fn missing_values<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
) -> BTreeMap<Attribute, usize> {
    let mut counts: BTreeMap<Attribute, usize> =
        Attribute::ALL.iter().map(|a| (*a, 0)).collect();
    for record in records {
        for attribute in Attribute::ALL {
            if record.value(attribute).is_null() {
                *counts.entry(attribute).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Summary of one numeric attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Count, mean, spread and quartiles of a numeric attribute.
pub fn describe<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
    attribute: Attribute,
) -> Result<Summary> {
    require_numeric(attribute)?;
    let values = numbers(records, attribute);
    let sorted = sorted(&values);
    Ok(Summary {
        count: values.len(),
        mean: mean(&values),
        std: std_dev(&values),
        min: sorted.first().copied(),
        q25: quantile_sorted(&sorted, 0.25),
        median: quantile_sorted(&sorted, 0.5),
        q75: quantile_sorted(&sorted, 0.75),
        max: sorted.last().copied(),
    })
}

/// Occurrences of each distinct value, most frequent first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueCounts {
    entries: Vec<(GroupKey, usize)>,
}

impl ValueCounts {
    pub fn entries(&self) -> &[(GroupKey, usize)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Count for one value, zero if never seen.
    pub fn get(&self, key: &GroupKey) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, count)| *count)
    }

    /// Keep only the `n` most frequent values.
    pub fn top(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

/// Count listings per distinct value of `attribute`.
///
/// Ties keep the order in which the values first appear.
pub fn value_counts<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
    attribute: Attribute,
) -> Result<ValueCounts> {
    GroupKey::require_groupable(attribute)?;

    let mut order: Vec<GroupKey> = Vec::new();
    let mut counts: HashMap<GroupKey, usize> = HashMap::new();
    for record in records {
        if let Some(key) = GroupKey::from_value(record.value(attribute)) {
            let count = counts.entry(key.clone()).or_insert(0);
            if *count == 0 {
                order.push(key);
            }
            *count += 1;
        }
    }

    let mut entries: Vec<(GroupKey, usize)> = order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            (key, count)
        })
        .collect();
    // stable: equal counts stay in first-seen order
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    Ok(ValueCounts { entries })
}

/// Last day (Sunday) of the week containing `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let offset = 6 - date.weekday().num_days_from_monday() as i64;
    date.checked_add_signed(Duration::days(offset))
        .unwrap_or(NaiveDate::MAX)
}

/// Listings per week, keyed by the Sunday closing each week.
///
/// Weeks without listings between the first and last listing are present with
/// a zero count.
pub fn weekly_activity<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
) -> BTreeMap<NaiveDate, usize> {
    let mut weeks: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in records.into_iter().filter_map(|r| r.listing_date) {
        *weeks.entry(week_ending(date)).or_insert(0) += 1;
    }

    if let (Some(first), Some(last)) = (
        weeks.keys().next().copied(),
        weeks.keys().next_back().copied(),
    ) {
        let mut week = first;
        while week < last {
            weeks.entry(week).or_insert(0);
            match week.checked_add_signed(Duration::days(7)) {
                Some(next) => week = next,
                None => break,
            }
        }
    }
    weeks
}

/// Median of each attribute over the records.
pub fn profile<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
    attributes: &[Attribute],
) -> Result<BTreeMap<Attribute, Option<f64>>> {
    for attribute in attributes {
        require_numeric(*attribute)?;
    }
    let records: Vec<&VehicleRecord> = records.into_iter().collect();
    Ok(attributes
        .iter()
        .map(|attr| {
            (
                *attr,
                median(&numbers(records.iter().copied(), *attr)),
            )
        })
        .collect())
}

/// Pearson correlation over records where both attributes are present.
pub fn correlation<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
    a: Attribute,
    b: Attribute,
) -> Result<Option<f64>> {
    require_numeric(a)?;
    require_numeric(b)?;

    let pairs: Vec<(f64, f64)> = records
        .into_iter()
        .filter_map(|r| Some((r.number(a)?, r.number(b)?)))
        .collect();
    if pairs.len() < 2 {
        return Ok(None);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }
    if var_x == 0.0 || var_y == 0.0 {
        return Ok(None);
    }
    Ok(Some(cov / (var_x.sqrt() * var_y.sqrt())))
}

/// Pairwise correlations between numeric attributes.
pub fn correlation_matrix<'a>(
    records: impl IntoIterator<Item = &'a VehicleRecord>,
    attributes: &[Attribute],
) -> Result<BTreeMap<(Attribute, Attribute), Option<f64>>> {
    let records: Vec<&VehicleRecord> = records.into_iter().collect();
    let mut matrix = BTreeMap::new();
    for a in attributes {
        for b in attributes {
            let r = correlation(records.iter().copied(), *a, *b)?;
            matrix.insert((*a, *b), r);
        }
    }
    Ok(matrix)
}
