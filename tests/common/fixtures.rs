/// One metric, one statistic, mapped to `test_label`.
pub const TEST_CONFIG: &str = r#"{
    "namespace": "AWS/Test",
    "period-minutes": 1,
    "measurements": [
        {"metric": "TestMetric", "config": [{"stat": "Average", "measurement": "test_label"}]}
    ]
}"#;

/// One metric with three statistics.
pub const THREE_STATS_CONFIG: &str = r#"{
    "namespace": "AWS/Test",
    "measurements": [
        {"metric": "TestMetric", "config": [
            {"stat": "Average", "measurement": "test.average"},
            {"stat": "Maximum", "measurement": "test.maximum"},
            {"stat": "p95", "measurement": "test.p95"}
        ]}
    ]
}"#;

pub const TIMESTAMP_MS: i64 = 1_704_067_200_000;
