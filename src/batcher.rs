use crate::datamodel::{DataQuery, MetricSeries};
use crate::measurement::MeasurementPlan;
use std::sync::Arc;

/// Most queries the provider accepts in a single fetch call.
pub const MAX_QUERIES_PER_BATCH: usize = 500;

/// One query per (series, statistic), in working set order then statistic order.
pub fn build_queries(
    plan: &MeasurementPlan,
    working_set: &[Arc<MetricSeries>],
    period_minutes: u32,
) -> Vec<DataQuery> {
    let period_seconds = period_minutes.saturating_mul(60);
    working_set
        .iter()
        .flat_map(|series| {
            plan.stat_configs_for(series)
                .into_iter()
                .map(move |stat_config| {
                    DataQuery::new(
                        stat_config.label,
                        Arc::clone(series),
                        stat_config.stat,
                        period_seconds,
                    )
                })
        })
        .collect()
}

/// Consecutive batches of at most [`MAX_QUERIES_PER_BATCH`] queries.
pub fn batches(queries: &[DataQuery]) -> impl Iterator<Item = &[DataQuery]> {
    queries.chunks(MAX_QUERIES_PER_BATCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamodel::StatConfig;
    use crate::measurement::MeasurementConfiguration;
    use std::collections::HashSet;

    fn plan_with_stats(k: usize) -> MeasurementPlan {
        let mut configuration = MeasurementConfiguration::default();
        let stats = (0..k)
            .map(|i| StatConfig::new(format!("p{}", 50 + i), format!("label_{}", i)))
            .collect();
        configuration.insert_measurement("Metric", stats);
        configuration.insert_measurement("Empty", Vec::new());
        MeasurementPlan::configured("Custom", configuration)
    }

    fn working_set(n: usize, metric_name: &str) -> Vec<Arc<MetricSeries>> {
        (0..n)
            .map(|i| {
                Arc::new(
                    MetricSeries::new("AWS/Test", metric_name).with_dimension("Id", i.to_string()),
                )
            })
            .collect()
    }

    #[test]
    fn test_n_times_k_queries() {
        for (n, k, expected_batches) in [(0, 3, 0), (1, 1, 1), (100, 5, 1), (250, 3, 2), (400, 3, 3)] {
            let plan = plan_with_stats(k);
            let queries = build_queries(&plan, &working_set(n, "Metric"), 1);
            assert_eq!(queries.len(), n * k);

            let batches: Vec<&[DataQuery]> = batches(&queries).collect();
            assert_eq!(batches.len(), expected_batches, "n={} k={}", n, k);
            assert!(batches.iter().all(|batch| batch.len() <= MAX_QUERIES_PER_BATCH));
            assert_eq!(batches.iter().map(|b| b.len()).sum::<usize>(), n * k);
        }
    }

    #[test]
    fn test_query_fields_and_order() {
        let plan = plan_with_stats(2);
        let set = working_set(2, "Metric");
        let queries = build_queries(&plan, &set, 5);

        assert_eq!(queries[0].label, "label_0");
        assert_eq!(queries[1].label, "label_1");
        assert_eq!(queries[0].stat, "p50");
        assert_eq!(queries[0].period_seconds, 300);
        assert!(Arc::ptr_eq(&queries[0].series, &set[0]));
        assert!(Arc::ptr_eq(&queries[2].series, &set[1]));

        let ids: HashSet<&str> = queries.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids.len(), queries.len());
    }

    #[test]
    fn test_no_queries_for_empty_stat_list() {
        let plan = plan_with_stats(2);
        let queries = build_queries(&plan, &working_set(10, "Empty"), 1);
        assert!(queries.is_empty());
    }
}
