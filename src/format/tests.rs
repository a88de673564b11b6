use similar_asserts::assert_eq;

use super::{encode_family, write_json, write_openmetrics_text, write_opentsdb_json, EncoderConfig, Format};
use crate::{
    parse_exposition, CdTime, CounterValue, Distribution, Histogram, LabelSet, Metric, MetricError, MetricFamily,
    MetricType, ParserConfig, StateSet, Summary, Value,
};

const TIME: CdTime = CdTime::from_raw(1710200311404036096);

fn family(name: &str, family_type: MetricType, labels: &[(&str, &str)], value: Value) -> MetricFamily {
    let mut family = MetricFamily::new(name, family_type).unwrap();
    let metric = Metric::new(value)
        .with_labels(LabelSet::from_pairs(labels).unwrap())
        .with_time(TIME);
    family.push(metric).unwrap();
    family
}

fn host() -> &'static [(&'static str, &'static str)] {
    &[("hostname", "arrakis.canopus")]
}

fn system_uname() -> MetricFamily {
    let info = LabelSet::from_pairs(&[
        ("machine", "riscv128"),
        ("nodename", "arrakis.canopus"),
        ("release", "998"),
        ("sysname", "Linux"),
        ("version", "#1 SMP PREEMPT_DYNAMIC 10191"),
    ])
    .unwrap();
    family("system_uname", MetricType::Info, host(), Value::Info(info))
}

fn stateset() -> MetricFamily {
    let states = StateSet::from_states(&[("a", false), ("bb", true), ("ccc", false)]).unwrap();
    family("stateset", MetricType::StateSet, host(), Value::StateSet(states))
}

fn summary() -> MetricFamily {
    let mut summary = Summary::new();
    summary.quantile_append(0.5, 0.232227334).unwrap();
    summary.quantile_append(0.90, 0.821139321).unwrap();
    summary.quantile_append(0.95, 1.528948804).unwrap();
    summary.quantile_append(0.99, 2.829188272).unwrap();
    summary.quantile_append(1.0, 34.283829292).unwrap();
    summary.sum = 8953.332;
    summary.count = 27892;
    family("summary", MetricType::Summary, host(), Value::Summary(summary))
}

fn histogram() -> MetricFamily {
    let mut histogram = Histogram::new();
    for (bound, count) in &[
        (f64::INFINITY, 27892.0),
        (25.0, 27890.0),
        (10.0, 27881.0),
        (5.0, 27814.0),
        (2.5, 27534.0),
        (1.0, 26351.0),
        (0.5, 24101.0),
        (0.25, 14251.0),
        (0.1, 8954.0),
        (0.05, 1672.0),
        (0.025, 8.0),
        (0.01, 0.0),
    ] {
        histogram.bucket_append(*bound, *count).unwrap();
    }
    histogram.sum = 8953.332;
    family("histogram", MetricType::Histogram, host(), Value::Histogram(histogram))
}

fn gauge_histogram() -> MetricFamily {
    let mut histogram = Histogram::new();
    for (bound, count) in &[
        (f64::INFINITY, 120.0),
        (1048576.0, 115.0),
        (786432.0, 107.0),
        (524288.0, 98.0),
        (262144.0, 96.0),
        (131072.0, 85.0),
        (65536.0, 61.0),
        (32768.0, 42.0),
        (16384.0, 26.0),
        (8192.0, 22.0),
        (4096.0, 10.0),
        (1024.0, 4.0),
    ] {
        histogram.bucket_append(*bound, *count).unwrap();
    }
    histogram.sum = 120.0;
    family("gauge_histogram", MetricType::GaugeHistogram, host(), Value::Histogram(histogram))
}

fn counter_with_label() -> MetricFamily {
    family(
        "metric_counter_with_label",
        MetricType::Counter,
        &[("alpha", "first"), ("beta", "second")],
        Value::Counter(CounterValue::UInt64(0)),
    )
}

fn text(family: &MetricFamily) -> String {
    let mut buf = String::new();
    write_openmetrics_text(&mut buf, family).unwrap();
    buf
}

fn json(family: &MetricFamily) -> String {
    let mut buf = String::new();
    write_json(&mut buf, family).unwrap();
    buf
}

fn opentsdb(family: &MetricFamily) -> String {
    let mut buf = String::new();
    write_opentsdb_json(&mut buf, family, 3600).unwrap();
    buf
}

#[test]
fn test_openmetrics_text_scalars() {
    assert_eq!(
        text(&family("metric_unknow", MetricType::Unknown, &[], Value::Unknown(42.0))),
        "# TYPE metric_unknow unknown\nmetric_unknow 42 1592748157125\n"
    );
    assert_eq!(
        text(&family("metric_gauge", MetricType::Gauge, &[], Value::Gauge(42.0))),
        "# TYPE metric_gauge gauge\nmetric_gauge 42 1592748157125\n"
    );
    assert_eq!(
        text(&counter_with_label()),
        "# TYPE metric_counter_with_label counter\n\
         metric_counter_with_label_total{alpha=\"first\",beta=\"second\"} 0 1592748157125\n"
    );
}

#[test]
fn test_openmetrics_text_escaped_label_value() {
    let family = family(
        "escaped_label_value",
        MetricType::Counter,
        &[("alpha", "first \"value\""), ("beta", "second value")],
        Value::Counter(CounterValue::UInt64(u64::MAX)),
    );

    assert_eq!(
        text(&family),
        "# TYPE escaped_label_value counter\n\
         escaped_label_value_total{alpha=\"first \\\"value\\\"\",beta=\"second value\"} 18446744073709551615 1592748157125\n"
    );
}

#[test]
fn test_openmetrics_text_info_and_stateset() {
    assert_eq!(
        text(&system_uname()),
        "# TYPE system_uname info\n\
         system_uname_info{hostname=\"arrakis.canopus\",machine=\"riscv128\",nodename=\"arrakis.canopus\",release=\"998\",sysname=\"Linux\",version=\"#1 SMP PREEMPT_DYNAMIC 10191\"} 1 1592748157125\n"
    );

    assert_eq!(
        text(&stateset()),
        "# TYPE stateset stateset\n\
         stateset{hostname=\"arrakis.canopus\",stateset=\"a\"} 0 1592748157125\n\
         stateset{hostname=\"arrakis.canopus\",stateset=\"bb\"} 1 1592748157125\n\
         stateset{hostname=\"arrakis.canopus\",stateset=\"ccc\"} 0 1592748157125\n"
    );
}

#[test]
fn test_sample_labels_replace_metric_labels_of_the_same_name() {
    let payload = LabelSet::from_pairs(&[("host", "payload"), ("kernel", "6.1")]).unwrap();
    let sys = family("sys", MetricType::Info, &[("host", "metric"), ("zone", "b")], Value::Info(payload));
    let states = StateSet::from_states(&[("off", false), ("on", true)]).unwrap();
    let mode = family("mode", MetricType::StateSet, &[("host", "a"), ("mode", "stale")], Value::StateSet(states));

    let mut encoded = text(&sys);
    encoded.push_str(&text(&mode));
    assert_eq!(
        encoded,
        "# TYPE sys info\n\
         sys_info{host=\"payload\",kernel=\"6.1\",zone=\"b\"} 1 1592748157125\n\
         # TYPE mode stateset\n\
         mode{host=\"a\",mode=\"off\"} 0 1592748157125\n\
         mode{host=\"a\",mode=\"on\"} 1 1592748157125\n"
    );

    let families = parse_exposition(&encoded, &ParserConfig::default()).unwrap();
    assert_eq!(families.len(), 2);
    let labels = &families[0].metrics()[0].labels;
    assert_eq!(labels.get("host"), Some("payload"));
    assert_eq!(labels.get("kernel"), Some("6.1"));
    assert_eq!(labels.get("zone"), Some("b"));
    assert_eq!(families[1].metrics().len(), 1);

    assert_eq!(
        opentsdb(&sys),
        r#"[{"metric":"sys_info","tags":{"host":"payload","kernel":"6.1","zone":"b"},"timestamp":1592748157125,"ttl":3600,"value":1}]"#
    );
    assert_eq!(
        opentsdb(&mode),
        concat!(
            r#"[{"metric":"mode","tags":{"host":"a","mode":"off"},"timestamp":1592748157125,"ttl":3600,"value":0},"#,
            r#"{"metric":"mode","tags":{"host":"a","mode":"on"},"timestamp":1592748157125,"ttl":3600,"value":1}]"#,
        )
    );
}

#[test]
fn test_openmetrics_text_summary() {
    assert_eq!(
        text(&summary()),
        "# TYPE summary summary\n\
         summary{hostname=\"arrakis.canopus\",quantile=\"1\"} 34.283829292 1592748157125\n\
         summary{hostname=\"arrakis.canopus\",quantile=\"0.99\"} 2.829188272 1592748157125\n\
         summary{hostname=\"arrakis.canopus\",quantile=\"0.95\"} 1.528948804 1592748157125\n\
         summary{hostname=\"arrakis.canopus\",quantile=\"0.9\"} 0.821139321 1592748157125\n\
         summary{hostname=\"arrakis.canopus\",quantile=\"0.5\"} 0.232227334 1592748157125\n\
         summary_count{hostname=\"arrakis.canopus\"} 27892 1592748157125\n\
         summary_sum{hostname=\"arrakis.canopus\"} 8953 1592748157125\n"
    );
}

#[test]
fn test_openmetrics_text_histograms() {
    assert_eq!(
        text(&histogram()),
        "# TYPE histogram histogram\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"0.01\"} 0 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"0.025\"} 8 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"0.05\"} 1672 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"0.1\"} 8954 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"0.25\"} 14251 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"0.5\"} 24101 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"1\"} 26351 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"2.5\"} 27534 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"5\"} 27814 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"10\"} 27881 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"25\"} 27890 1592748157125\n\
         histogram_bucket{hostname=\"arrakis.canopus\",le=\"inf\"} 27892 1592748157125\n\
         histogram_count{hostname=\"arrakis.canopus\"} 27892 1592748157125\n\
         histogram_sum{hostname=\"arrakis.canopus\"} 8953.332 1592748157125\n"
    );

    assert_eq!(
        text(&gauge_histogram()),
        "# TYPE gauge_histogram gaugehistogram\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"1024\"} 4 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"4096\"} 10 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"8192\"} 22 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"16384\"} 26 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"32768\"} 42 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"65536\"} 61 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"131072\"} 85 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"262144\"} 96 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"524288\"} 98 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"786432\"} 107 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"1048576\"} 115 1592748157125\n\
         gauge_histogram_bucket{hostname=\"arrakis.canopus\",le=\"inf\"} 120 1592748157125\n\
         gauge_histogram_gcount{hostname=\"arrakis.canopus\"} 120 1592748157125\n\
         gauge_histogram_gsum{hostname=\"arrakis.canopus\"} 120 1592748157125\n"
    );
}

#[test]
fn test_openmetrics_text_help_and_unit() {
    let mut family = family("disk_read", MetricType::Gauge, &[("device", "sda")], Value::Gauge(0.5));
    family.help = Some("Bytes read from disk".to_owned());
    family.unit = Some("bytes".to_owned());

    assert_eq!(
        text(&family),
        "# TYPE disk_read gauge\n\
         # HELP disk_read Bytes read from disk\n\
         # UNIT disk_read bytes\n\
         disk_read{device=\"sda\"} 0.5 1592748157125\n"
    );
}

#[test]
fn test_json_scalars() {
    assert_eq!(
        json(&family("metric_unknow", MetricType::Unknown, &[], Value::Unknown(42.0))),
        r#"{"metric":"metric_unknow","type":"unknown","metrics":[{"labels":{},"timestamp":1592748157125,"interval":0,"value":42}]}"#
    );
    assert_eq!(
        json(&family("metric_gauge", MetricType::Gauge, &[], Value::Gauge(42.0))),
        r#"{"metric":"metric_gauge","type":"gauge","metrics":[{"labels":{},"timestamp":1592748157125,"interval":0,"value":42}]}"#
    );
    assert_eq!(
        json(&counter_with_label()),
        r#"{"metric":"metric_counter_with_label","type":"counter","metrics":[{"labels":{"alpha":"first","beta":"second"},"timestamp":1592748157125,"interval":0,"value":0}]}"#
    );
}

#[test]
fn test_json_escaped_label_value() {
    let family = family(
        "escaped_label_value",
        MetricType::Counter,
        &[("alpha", "first/value"), ("beta", "second value")],
        Value::Counter(CounterValue::UInt64(42)),
    );

    assert_eq!(
        json(&family),
        r#"{"metric":"escaped_label_value","type":"counter","metrics":[{"labels":{"alpha":"first/value","beta":"second value"},"timestamp":1592748157125,"interval":0,"value":42}]}"#
    );

    let quoted = self::family("quoted", MetricType::Gauge, &[("path", "C:\\tmp \"x\"")], Value::Gauge(1.0));
    assert_eq!(
        json(&quoted),
        r#"{"metric":"quoted","type":"gauge","metrics":[{"labels":{"path":"C:\\tmp \"x\""},"timestamp":1592748157125,"interval":0,"value":1}]}"#
    );
}

#[test]
fn test_json_info_and_stateset() {
    assert_eq!(
        json(&system_uname()),
        r##"{"metric":"system_uname","type":"info","metrics":[{"labels":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"interval":0,"info":{"machine":"riscv128","nodename":"arrakis.canopus","release":"998","sysname":"Linux","version":"#1 SMP PREEMPT_DYNAMIC 10191"}}]}"##
    );
    assert_eq!(
        json(&stateset()),
        r#"{"metric":"stateset","type":"stateset","metrics":[{"labels":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"interval":0,"stateset":{"a":false,"bb":true,"ccc":false}}]}"#
    );
}

#[test]
fn test_json_summary() {
    assert_eq!(
        json(&summary()),
        r#"{"metric":"summary","type":"summary","metrics":[{"labels":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"interval":0,"quantiles":[[1,34.283829292],[0.99,2.829188272],[0.95,1.528948804],[0.9,0.821139321],[0.5,0.232227334]],"count":27892,"sum":8953}]}"#
    );
}

#[test]
fn test_json_histograms() {
    assert_eq!(
        json(&histogram()),
        r#"{"metric":"histogram","type":"histogram","metrics":[{"labels":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"interval":0,"buckets":[[0.01,0],[0.025,8],[0.05,1672],[0.1,8954],[0.25,14251],[0.5,24101],[1,26351],[2.5,27534],[5,27814],[10,27881],[25,27890],[inf,27892]],"count":27892,"sum":8953.332}]}"#
    );
    assert_eq!(
        json(&gauge_histogram()),
        r#"{"metric":"gauge_histogram","type":"gaugehistogram","metrics":[{"labels":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"interval":0,"buckets":[[1024,4],[4096,10],[8192,22],[16384,26],[32768,42],[65536,61],[131072,85],[262144,96],[524288,98],[786432,107],[1048576,115],[inf,120]],"gcount":120,"gsum":120}]}"#
    );
}

#[test]
fn test_json_help_unit_and_interval() {
    let mut family = family("load", MetricType::Gauge, &[], Value::Gauge(0.25));
    family.help = Some("System load".to_owned());
    family.unit = Some("ratio".to_owned());
    family.push(Metric::new(Value::Gauge(1.5)).with_time(TIME)).unwrap();
    let mut metrics = family.try_clone().unwrap();
    for metric in metrics.metrics_mut() {
        metric.interval = CdTime::from_secs(10);
    }

    assert_eq!(
        json(&metrics),
        r#"{"metric":"load","type":"gauge","help":"System load","unit":"ratio","metrics":[{"labels":{},"timestamp":1592748157125,"interval":10000,"value":0.25},{"labels":{},"timestamp":1592748157125,"interval":10000,"value":1.5}]}"#
    );
}

#[test]
fn test_opentsdb_scalars() {
    assert_eq!(
        opentsdb(&family("metric_unknow", MetricType::Unknown, &[], Value::Unknown(42.0))),
        r#"[{"metric":"metric_unknow","timestamp":1592748157125,"ttl":3600,"value":42}]"#
    );
    assert_eq!(
        opentsdb(&family("metric_gauge", MetricType::Gauge, &[], Value::Gauge(42.0))),
        r#"[{"metric":"metric_gauge","timestamp":1592748157125,"ttl":3600,"value":42}]"#
    );
    assert_eq!(
        opentsdb(&counter_with_label()),
        r#"[{"metric":"metric_counter_with_label_total","tags":{"alpha":"first","beta":"second"},"timestamp":1592748157125,"ttl":3600,"value":0}]"#
    );
}

#[test]
fn test_opentsdb_info_and_stateset() {
    assert_eq!(
        opentsdb(&system_uname()),
        r##"[{"metric":"system_uname_info","tags":{"hostname":"arrakis.canopus","machine":"riscv128","nodename":"arrakis.canopus","release":"998","sysname":"Linux","version":"#1 SMP PREEMPT_DYNAMIC 10191"},"timestamp":1592748157125,"ttl":3600,"value":1}]"##
    );
    assert_eq!(
        opentsdb(&stateset()),
        concat!(
            r#"[{"metric":"stateset","tags":{"hostname":"arrakis.canopus","stateset":"a"},"timestamp":1592748157125,"ttl":3600,"value":0},"#,
            r#"{"metric":"stateset","tags":{"hostname":"arrakis.canopus","stateset":"bb"},"timestamp":1592748157125,"ttl":3600,"value":1},"#,
            r#"{"metric":"stateset","tags":{"hostname":"arrakis.canopus","stateset":"ccc"},"timestamp":1592748157125,"ttl":3600,"value":0}]"#,
        )
    );
}

#[test]
fn test_opentsdb_summary() {
    assert_eq!(
        opentsdb(&summary()),
        concat!(
            r#"[{"metric":"summary","tags":{"hostname":"arrakis.canopus","quantile":"1"},"timestamp":1592748157125,"ttl":3600,"value":34.283829292},"#,
            r#"{"metric":"summary","tags":{"hostname":"arrakis.canopus","quantile":"0.99"},"timestamp":1592748157125,"ttl":3600,"value":2.829188272},"#,
            r#"{"metric":"summary","tags":{"hostname":"arrakis.canopus","quantile":"0.95"},"timestamp":1592748157125,"ttl":3600,"value":1.528948804},"#,
            r#"{"metric":"summary","tags":{"hostname":"arrakis.canopus","quantile":"0.9"},"timestamp":1592748157125,"ttl":3600,"value":0.821139321},"#,
            r#"{"metric":"summary","tags":{"hostname":"arrakis.canopus","quantile":"0.5"},"timestamp":1592748157125,"ttl":3600,"value":0.232227334},"#,
            r#"{"metric":"summary_count","tags":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"ttl":3600,"value":27892},"#,
            r#"{"metric":"summary_sum","tags":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"ttl":3600,"value":8953}]"#,
        )
    );
}

#[test]
fn test_opentsdb_gauge_histogram() {
    assert_eq!(
        opentsdb(&gauge_histogram()),
        concat!(
            r#"[{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"1024"},"timestamp":1592748157125,"ttl":3600,"value":4},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"4096"},"timestamp":1592748157125,"ttl":3600,"value":10},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"8192"},"timestamp":1592748157125,"ttl":3600,"value":22},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"16384"},"timestamp":1592748157125,"ttl":3600,"value":26},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"32768"},"timestamp":1592748157125,"ttl":3600,"value":42},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"65536"},"timestamp":1592748157125,"ttl":3600,"value":61},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"131072"},"timestamp":1592748157125,"ttl":3600,"value":85},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"262144"},"timestamp":1592748157125,"ttl":3600,"value":96},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"524288"},"timestamp":1592748157125,"ttl":3600,"value":98},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"786432"},"timestamp":1592748157125,"ttl":3600,"value":107},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"1048576"},"timestamp":1592748157125,"ttl":3600,"value":115},"#,
            r#"{"metric":"gauge_histogram","tags":{"hostname":"arrakis.canopus","le":"inf"},"timestamp":1592748157125,"ttl":3600,"value":120},"#,
            r#"{"metric":"gauge_histogram_gcount","tags":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"ttl":3600,"value":120},"#,
            r#"{"metric":"gauge_histogram_gsum","tags":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"ttl":3600,"value":120}]"#,
        )
    );
}

#[test]
fn test_opentsdb_histogram_tail() {
    let out = opentsdb(&histogram());
    assert!(out.starts_with(
        r#"[{"metric":"histogram","tags":{"hostname":"arrakis.canopus","le":"0.01"},"timestamp":1592748157125,"ttl":3600,"value":0},"#
    ));
    assert!(out.ends_with(concat!(
        r#"{"metric":"histogram","tags":{"hostname":"arrakis.canopus","le":"inf"},"timestamp":1592748157125,"ttl":3600,"value":27892},"#,
        r#"{"metric":"histogram_count","tags":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"ttl":3600,"value":27892},"#,
        r#"{"metric":"histogram_sum","tags":{"hostname":"arrakis.canopus"},"timestamp":1592748157125,"ttl":3600,"value":8953.332}]"#,
    )));
}

#[test]
fn test_opentsdb_without_ttl() {
    let mut buf = String::new();
    write_opentsdb_json(&mut buf, &family("up", MetricType::Gauge, &[], Value::Gauge(1.0)), 0).unwrap();
    assert_eq!(buf, r#"[{"metric":"up","timestamp":1592748157125,"value":1}]"#);
}

#[test]
fn test_summary_sum_is_truncated_but_histogram_sum_is_not() {
    assert!(text(&summary()).contains("summary_sum{hostname=\"arrakis.canopus\"} 8953 "));
    assert!(text(&histogram()).contains("histogram_sum{hostname=\"arrakis.canopus\"} 8953.332 "));
}

#[test]
fn test_empty_family_renders_nothing() {
    let family = MetricFamily::new("nothing", MetricType::Gauge).unwrap();

    for format in &[Format::OpenMetrics, Format::Json, Format::OpenTsdb] {
        let mut buf = String::from("kept");
        let config = EncoderConfig {
            format: *format,
            ttl: 60,
        };
        encode_family(&mut buf, &family, &config).unwrap();
        assert_eq!(buf, "kept");
    }
}

#[test]
fn test_distribution_is_unsupported() {
    let distribution = Distribution::exponential(8, 2.0, 1.0).unwrap();
    let family = family("latency", MetricType::Distribution, &[], Value::Distribution(distribution));

    for format in &[Format::OpenMetrics, Format::Json, Format::OpenTsdb] {
        let mut buf = String::from("kept");
        let config = EncoderConfig {
            format: *format,
            ttl: 0,
        };
        let result = encode_family(&mut buf, &family, &config);
        assert!(matches!(result, Err(MetricError::UnsupportedValue(MetricType::Distribution))));
        assert_eq!(buf, "kept");
    }
}

#[test]
fn test_non_finite_values() {
    let family = family("odd", MetricType::Gauge, &[], Value::Gauge(f64::NAN));
    assert_eq!(
        json(&family),
        r#"{"metric":"odd","type":"gauge","metrics":[{"labels":{},"timestamp":1592748157125,"interval":0,"value":nan}]}"#
    );

    let family = self::family("odd", MetricType::Gauge, &[], Value::Gauge(f64::NEG_INFINITY));
    assert_eq!(text(&family), "# TYPE odd gauge\nodd -inf 1592748157125\n");
}

#[test]
fn test_format_selection() {
    assert_eq!("OpenMetrics".parse::<Format>().unwrap(), Format::OpenMetrics);
    assert_eq!("JSON".parse::<Format>().unwrap(), Format::Json);
    assert_eq!("opentsdb".parse::<Format>().unwrap(), Format::OpenTsdb);
    assert!(matches!("graphite".parse::<Format>(), Err(MetricError::InvalidArgument(_))));

    let config: EncoderConfig = serde_json::from_str(r#"{"format": "opentsdb", "ttl": 300}"#).unwrap();
    assert_eq!(config.format, Format::OpenTsdb);
    assert_eq!(config.ttl, 300);

    let config: EncoderConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config.format, Format::OpenMetrics);
    assert_eq!(config.ttl, 0);

    assert!(serde_json::from_str::<EncoderConfig>(r#"{"format": "json", "compress": true}"#).is_err());
}

#[test]
fn test_encode_family_appends() {
    let mut buf = String::new();
    let config = EncoderConfig {
        format: Format::OpenMetrics,
        ttl: 0,
    };
    encode_family(&mut buf, &family("a", MetricType::Gauge, &[], Value::Gauge(1.0)), &config).unwrap();
    encode_family(&mut buf, &family("b", MetricType::Gauge, &[], Value::Gauge(2.0)), &config).unwrap();

    assert_eq!(
        buf,
        "# TYPE a gauge\na 1 1592748157125\n# TYPE b gauge\nb 2 1592748157125\n"
    );
}
