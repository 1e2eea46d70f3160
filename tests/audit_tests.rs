//! End-to-end audit runs against a mock registry.

use chrono::{DateTime, Duration, TimeZone, Utc};
use libyear_audit::config::NetworkConfig;
use libyear_audit::{
    check_dependencies, report_dependencies, Coordinate, DependencyNode, LibyearConfig,
    Repository, ValidatorKind,
};
use mockito::{Matcher, Mock, Server};

fn years(n: i64) -> Duration {
    Duration::seconds(31_556_952 * n)
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 7, 1, 0, 0, 0).unwrap()
}

fn commons_text() -> Coordinate {
    Coordinate::new("org.apache.commons", "commons-text", "1.8")
}

fn commons_collections() -> Coordinate {
    Coordinate::new("org.apache.commons", "commons-collections4", "4.4")
}

fn two_dependency_graph() -> DependencyNode {
    DependencyNode::root(
        Coordinate::new("com.example", "app", "1.0.0"),
        vec![
            DependencyNode::resolved(commons_text(), "central", vec![]),
            DependencyNode::resolved(commons_collections(), "central", vec![]),
        ],
    )
}

fn config_for(server: &Server, kind: ValidatorKind, max_age: Duration) -> LibyearConfig {
    LibyearConfig::builder()
        .repository(Repository::new(
            "central",
            format!("{}/solrsearch/select", server.url()),
        ))
        .validator(kind, max_age)
        .network(NetworkConfig {
            timeout_secs: 5,
            max_retries: 0,
            initial_retry_delay_ms: 10,
            retry_backoff_multiplier: 2,
        })
        .now(now())
        .build()
        .unwrap()
}

/// Mock the `g AND a AND v` search query with a creation timestamp.
fn mock_created(server: &mut Server, coordinate: &Coordinate, created: DateTime<Utc>) -> Mock {
    mock_created_expect(server, coordinate, created, None)
}

/// Same, asserting an exact hit count via [`Mock::assert`].
fn mock_created_expect(
    server: &mut Server,
    coordinate: &Coordinate,
    created: DateTime<Utc>,
    hits: Option<usize>,
) -> Mock {
    let query = format!(
        r#"g:"{}" AND a:"{}" AND v:"{}""#,
        coordinate.group, coordinate.artifact, coordinate.version
    );
    let mock = server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::UrlEncoded("q".into(), query))
        .with_body(format!(
            r#"{{"response": {{"docs": [{{"timestamp": {}}}], "numFound": 1, "start": 0}}}}"#,
            created.timestamp_millis()
        ));
    let mock = match hits {
        Some(hits) => mock.expect(hits),
        None => mock,
    };
    mock.create()
}

/// Mock the `g AND a` search query naming the latest version.
fn mock_latest(server: &mut Server, coordinate: &Coordinate, latest: &str) -> Mock {
    let query = format!(r#"g:"{}" AND a:"{}""#, coordinate.group, coordinate.artifact);
    server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::UrlEncoded("q".into(), query))
        .with_body(format!(
            r#"{{"response": {{"docs": [{{"latestVersion": "{latest}"}}], "numFound": 1, "start": 0}}}}"#
        ))
        .create()
}

#[test]
fn cumulative_threshold_breach_lists_all_violators() {
    let mut server = Server::new();
    mock_created(&mut server, &commons_text(), now() - (years(5) + Duration::days(2)));
    mock_created(&mut server, &commons_collections(), now() - years(3));

    let config = config_for(&server, ValidatorKind::Cumulative, years(5));
    let outcome = check_dependencies(&two_dependency_graph(), &config).unwrap();

    assert!(!outcome.valid);
    assert_eq!(
        outcome
            .violators
            .iter()
            .map(|v| v.coordinate.clone())
            .collect::<Vec<_>>(),
        vec![commons_text(), commons_collections()]
    );
    assert_eq!(outcome.violators[0].age, years(5) + Duration::days(2));
    assert_eq!(outcome.violators[1].age, years(3));
    assert_eq!(outcome.exceeded_by, Some(years(3) + Duration::days(2)));

    let summary = outcome.failure_summary().unwrap();
    assert!(summary.contains("Too many libyears encountered!"));
    assert!(summary.contains("org.apache.commons:commons-text:1.8"));
}

#[test]
fn single_age_validator_accepts_the_same_graph_with_a_wider_threshold() {
    let mut server = Server::new();
    mock_created(&mut server, &commons_text(), now() - (years(5) + Duration::days(2)));
    mock_created(&mut server, &commons_collections(), now() - years(3));

    let config = config_for(&server, ValidatorKind::SingleAge, years(6));
    let outcome = check_dependencies(&two_dependency_graph(), &config).unwrap();

    assert!(outcome.valid);
    assert!(outcome.violators.is_empty());
    assert!(outcome.failure_summary().is_none());
}

#[test]
fn diamond_dependencies_are_queried_exactly_once() {
    let mut server = Server::new();
    let shared = Coordinate::new("org.shared", "leaf", "1.0");
    let left = Coordinate::new("org.a", "left", "1.0");
    let right = Coordinate::new("org.b", "right", "1.0");

    let shared_mock =
        mock_created_expect(&mut server, &shared, now() - Duration::days(30), Some(1));
    mock_created(&mut server, &left, now() - Duration::days(10));
    mock_created(&mut server, &right, now() - Duration::days(10));

    let graph = DependencyNode::root(
        Coordinate::new("com.example", "app", "1.0.0"),
        vec![
            DependencyNode::resolved(
                left,
                "central",
                vec![DependencyNode::resolved(shared.clone(), "central", vec![])],
            ),
            DependencyNode::resolved(
                right,
                "central",
                vec![DependencyNode::resolved(shared, "central", vec![])],
            ),
        ],
    );

    let config = config_for(&server, ValidatorKind::Cumulative, years(10));
    let outcome = check_dependencies(&graph, &config).unwrap();

    assert!(outcome.valid);
    shared_mock.assert();
}

#[test]
fn include_and_exclude_filters_limit_the_queried_set() {
    let mut server = Server::new();
    let slf4j = Coordinate::new("org.slf4j", "slf4j", "1.0");
    let core = Coordinate::new("org.slf4j", "slf4j-core", "1.0");
    let core_a = Coordinate::new("org.slf4j", "slf4j-core-a", "1.0");
    let core_b = Coordinate::new("org.slf4j", "slf4j-core-b", "1.0");

    mock_created(&mut server, &slf4j, now() - Duration::days(1));
    mock_created(&mut server, &core, now() - Duration::days(1));
    mock_created(&mut server, &core_a, now() - Duration::days(1));
    let excluded = mock_created_expect(&mut server, &core_b, now() - Duration::days(1), Some(0));

    let graph = DependencyNode::root(
        Coordinate::new("com.example", "app", "1.0.0"),
        vec![
            DependencyNode::resolved(slf4j, "central", vec![]),
            DependencyNode::resolved(
                core,
                "central",
                vec![
                    DependencyNode::resolved(core_a, "central", vec![]),
                    DependencyNode::resolved(core_b, "central", vec![]),
                ],
            ),
        ],
    );

    let mut config = config_for(&server, ValidatorKind::Cumulative, years(10));
    config.include_modules = vec!["org.slf4j*".to_string()];
    config.exclude_modules = vec!["*core-b".to_string()];

    let outcome = check_dependencies(&graph, &config).unwrap();

    assert!(outcome.valid);
    excluded.assert();
}

#[test]
fn lookup_failure_aborts_with_context_under_fail_on_error() {
    let mut server = Server::new();
    server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::Any)
        .with_status(500)
        .create();

    let config = config_for(&server, ValidatorKind::Cumulative, years(5));
    let err = check_dependencies(&two_dependency_graph(), &config).unwrap_err();

    let message = err.to_string();
    assert!(message.contains("org.apache.commons:commons-text:1.8"));
    assert!(message.contains("central"));
    assert!(message.contains("fail_on_error"));
}

#[test]
fn lookup_failures_are_skipped_when_tolerated() {
    let mut server = Server::new();
    // commons-text resolves, commons-collections4 errors out. The catch-all
    // goes last: mockito matches in definition order, so the specific mock
    // must be defined before the Matcher::Any fallback.
    mock_created(&mut server, &commons_text(), now() - (years(5) + Duration::days(2)));
    server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::Any)
        .with_status(500)
        .create();

    let mut config = config_for(&server, ValidatorKind::Cumulative, years(5));
    config.fail_on_error = false;

    let outcome = check_dependencies(&two_dependency_graph(), &config).unwrap();

    assert!(!outcome.valid);
    assert_eq!(outcome.violators.len(), 1);
    assert_eq!(outcome.violators[0].coordinate, commons_text());
}

#[test]
fn unknown_repository_aborts_even_when_tolerant() {
    let server = Server::new();
    let graph = DependencyNode::root(
        Coordinate::new("com.example", "app", "1.0.0"),
        vec![DependencyNode::resolved(commons_text(), "nowhere", vec![])],
    );

    let mut config = config_for(&server, ValidatorKind::Cumulative, years(5));
    config.fail_on_error = false;

    let err = check_dependencies(&graph, &config).unwrap_err();

    assert!(err.is_fatal());
    assert!(err.to_string().contains("nowhere"));
}

#[test]
fn report_classifies_updates_missing_info_and_errors() {
    let mut server = Server::new();

    // commons-text 1.8 -> 1.9, published 326 days apart.
    mock_latest(&mut server, &commons_text(), "1.9");
    mock_created(&mut server, &commons_text(), now() - Duration::days(400));
    mock_created(
        &mut server,
        &commons_text().with_version("1.9"),
        now() - Duration::days(74),
    );
    // commons-collections4 is already the latest version.
    mock_latest(&mut server, &commons_collections(), "4.4");
    // Catch-all last (mockito matches in definition order): anything not
    // mocked above errors out.
    server
        .mock("GET", "/solrsearch/select")
        .match_query(Matcher::Any)
        .with_status(500)
        .create();

    let broken = Coordinate::new("org.broken", "flaky", "0.1");
    let graph = DependencyNode::root(
        Coordinate::new("com.example", "app", "1.0.0"),
        vec![
            DependencyNode::resolved(commons_text(), "central", vec![]),
            DependencyNode::resolved(commons_collections(), "central", vec![]),
            DependencyNode::resolved(broken, "central", vec![]),
        ],
    );

    let config = config_for(&server, ValidatorKind::Cumulative, years(5));
    let outcome = report_dependencies(&graph, &config).unwrap();

    assert!(outcome
        .summary
        .contains("Dependencies with no update information available:"));
    assert!(outcome
        .summary
        .contains(" -> org.apache.commons:commons-collections4:4.4"));
    assert!(outcome
        .summary
        .contains("Dependencies with errors during age determination:"));
    assert!(outcome.summary.contains(" -> org.broken:flaky:0.1"));
    assert!(outcome
        .summary
        .contains("org.apache.commons:commons-text (1.8 => 1.9)"));

    assert_eq!(outcome.report.collected.len(), 1);
    assert_eq!(
        outcome.report.collected[0].module,
        "org.apache.commons:commons-text:1.8"
    );
    assert_eq!(outcome.report.collected[0].lag_days, 326);
    assert_eq!(outcome.report.collected[0].next_version, "1.9");
    assert_eq!(
        outcome.report.missing_info,
        vec!["org.apache.commons:commons-collections4:4.4"]
    );
    assert_eq!(outcome.report.errors, vec!["org.broken:flaky:0.1"]);
}

#[test]
fn unresolved_dependencies_are_never_queried() {
    let server = Server::new();
    // No mocks: any query would fail the run under fail_on_error.
    let graph = DependencyNode::root(
        Coordinate::new("com.example", "app", "1.0.0"),
        vec![DependencyNode::unresolved(Coordinate::new(
            "org.broken",
            "missing",
            "0.1",
        ))],
    );

    let config = config_for(&server, ValidatorKind::Cumulative, years(5));
    let outcome = check_dependencies(&graph, &config).unwrap();

    assert!(outcome.valid);
}
