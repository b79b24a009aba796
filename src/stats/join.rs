//! Inner join of two aligned series on `(entity, date)` and per-entity grouping.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::domain::{AlignedSeries, JoinedRecord};

/// Join `x_series` and `y_series` on `(entity, date)`.
///
/// Keys present on one side only are dropped, as are keys where either value is
/// missing. Output is sorted by entity, then date.
pub fn inner_join(x_series: &AlignedSeries, y_series: &AlignedSeries) -> Vec<JoinedRecord> {
    let y_values: HashMap<(&str, NaiveDate), f64> = y_series
        .observations()
        .iter()
        .filter_map(|o| o.value.map(|v| ((o.entity.as_str(), o.date), v)))
        .collect();

    let mut out: Vec<JoinedRecord> = x_series
        .observations()
        .iter()
        .filter_map(|o| {
            let x = o.value?;
            let y = *y_values.get(&(o.entity.as_str(), o.date))?;
            Some(JoinedRecord {
                entity: o.entity.clone(),
                date: o.date,
                x,
                y,
            })
        })
        .collect();

    out.sort_by(|a, b| a.entity.cmp(&b.entity).then(a.date.cmp(&b.date)));
    out
}

/// Records of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityGroup {
    pub entity: String,
    pub records: Vec<JoinedRecord>,
}

impl EntityGroup {
    pub fn xs(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.y).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Group joined records by entity.
///
/// Every entity in `requested` gets a group (possibly empty), in that order.
/// Entities found in `records` but not requested follow, sorted by name.
pub fn group_by_entity(records: Vec<JoinedRecord>, requested: &[String]) -> Vec<EntityGroup> {
    let mut by_entity: BTreeMap<String, Vec<JoinedRecord>> = BTreeMap::new();
    for r in records {
        by_entity.entry(r.entity.clone()).or_default().push(r);
    }

    let mut out = Vec::with_capacity(requested.len().max(by_entity.len()));
    let mut seen = HashSet::new();
    for entity in requested {
        if !seen.insert(entity.as_str()) {
            continue;
        }
        out.push(EntityGroup {
            entity: entity.clone(),
            records: by_entity.remove(entity).unwrap_or_default(),
        });
    }
    out.extend(
        by_entity
            .into_iter()
            .map(|(entity, records)| EntityGroup { entity, records }),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;

    fn y(year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
    }

    fn series(label: &str, obs: &[(&str, i32, Option<f64>)]) -> AlignedSeries {
        AlignedSeries::from_observations(
            label,
            obs.iter().map(|(e, yr, v)| Observation::new(*e, y(*yr), *v)).collect(),
        )
    }

    #[test]
    fn join_keeps_only_shared_keys() {
        let a = series("a", &[("A", 2020, Some(1.0)), ("A", 2021, Some(2.0)), ("B", 2020, Some(3.0))]);
        let b = series("b", &[("A", 2020, Some(5.0)), ("A", 2021, Some(7.0))]);

        let joined = inner_join(&a, &b);
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|r| r.entity == "A"));
        assert_eq!((joined[0].x, joined[0].y), (1.0, 5.0));
        assert_eq!((joined[1].x, joined[1].y), (2.0, 7.0));
    }

    #[test]
    fn join_does_not_match_across_entities() {
        let a = series("a", &[("A", 2020, Some(1.0))]);
        let b = series("b", &[("B", 2020, Some(1.0))]);
        assert!(inner_join(&a, &b).is_empty());
    }

    #[test]
    fn join_drops_missing_values() {
        let a = series("a", &[("A", 2020, None), ("A", 2021, Some(2.0))]);
        let b = series("b", &[("A", 2020, Some(5.0)), ("A", 2021, None)]);
        assert!(inner_join(&a, &b).is_empty());
    }

    #[test]
    fn join_output_is_sorted() {
        let a = series("a", &[("B", 2021, Some(1.0)), ("A", 2021, Some(2.0)), ("A", 2019, Some(3.0))]);
        let b = series("b", &[("A", 2019, Some(0.0)), ("A", 2021, Some(0.0)), ("B", 2021, Some(0.0))]);
        let keys: Vec<(String, NaiveDate)> = inner_join(&a, &b).into_iter().map(|r| (r.entity, r.date)).collect();
        assert_eq!(
            keys,
            vec![("A".to_string(), y(2019)), ("A".to_string(), y(2021)), ("B".to_string(), y(2021))]
        );
    }

    #[test]
    fn grouping_keeps_requested_entities_even_without_records() {
        let records = vec![
            JoinedRecord { entity: "Z".into(), date: y(2020), x: 1.0, y: 1.0 },
            JoinedRecord { entity: "A".into(), date: y(2020), x: 1.0, y: 1.0 },
            JoinedRecord { entity: "A".into(), date: y(2021), x: 2.0, y: 2.0 },
        ];
        let requested = vec!["B".to_string(), "A".to_string()];
        let groups = group_by_entity(records, &requested);

        let names: Vec<&str> = groups.iter().map(|g| g.entity.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "Z"]);
        assert!(groups[0].is_empty());
        assert_eq!(groups[1].len(), 2);
        assert_eq!(groups[1].xs(), vec![1.0, 2.0]);
    }
}
