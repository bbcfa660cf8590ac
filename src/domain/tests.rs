// Domain module tests.

use super::*;

#[test]
fn test_normalize_adds_https() {
    assert_eq!(normalize_target("example.com"), "https://example.com");
}

#[test]
fn test_normalize_preserves_existing_scheme() {
    assert_eq!(normalize_target("https://example.com"), "https://example.com");
    assert_eq!(normalize_target("http://example.com"), "http://example.com");
}

#[test]
fn test_normalize_does_not_touch_path_or_trailing_slash() {
    assert_eq!(
        normalize_target("example.com/health/"),
        "https://example.com/health/"
    );
    assert_eq!(normalize_target("example.com:8443"), "https://example.com:8443");
}

#[test]
fn test_target_url_uses_normalization() {
    let target = DomainTarget::new("example.com", "Web");
    assert_eq!(target.url(), "https://example.com");
}

#[test]
fn test_ungrouped_target_uses_default_group() {
    let target = DomainTarget::ungrouped("example.com");
    assert_eq!(target.group, "Default");
}

#[test]
fn test_validate_rejects_empty_name() {
    let target = DomainTarget::new("   ", "Web");
    assert_eq!(
        validate_target(&target),
        Err(InvalidTarget::EmptyName {
            group: "Web".to_string()
        })
    );
}

#[test]
fn test_validate_rejects_unparseable_name() {
    let target = DomainTarget::ungrouped("not a valid url!!!");
    assert!(matches!(
        validate_target(&target),
        Err(InvalidTarget::Malformed { .. })
    ));
}

#[test]
fn test_validate_rejects_overlong_name() {
    let target = DomainTarget::ungrouped(format!("{}.com", "a".repeat(3000)));
    assert!(matches!(
        validate_target(&target),
        Err(InvalidTarget::TooLong { length, .. }) if length == 3004
    ));
}

#[test]
fn test_validate_accepts_common_forms() {
    for name in [
        "example.com",
        "https://example.com",
        "http://127.0.0.1:8080",
        "sub.example.co.uk/path?q=1",
    ] {
        assert!(
            validate_target(&DomainTarget::ungrouped(name)).is_ok(),
            "{name} should be accepted"
        );
    }
}

#[test]
fn test_partition_preserves_order_and_reports_rejects() {
    let targets = vec![
        DomainTarget::ungrouped("a.example"),
        DomainTarget::ungrouped(""),
        DomainTarget::ungrouped("b.example"),
        DomainTarget::ungrouped("bad url with spaces"),
        DomainTarget::ungrouped("c.example"),
    ];
    let (valid, rejected) = partition_targets(targets);
    let names: Vec<_> = valid.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["a.example", "b.example", "c.example"]);
    assert_eq!(rejected.len(), 2);
    assert!(matches!(rejected[0], InvalidTarget::EmptyName { .. }));
}

#[test]
fn test_parse_domain_list() {
    assert_eq!(
        parse_domain_list("google.com, facebook.com,github.com\nexample.org"),
        vec!["google.com", "facebook.com", "github.com", "example.org"]
    );
    assert!(parse_domain_list(" , ,").is_empty());
}

#[test]
fn test_parse_domain_list_skips_comments() {
    let input = "# staging\nalpha.example # primary\n\n  # old, unused\nbeta.example,gamma.example\n";
    assert_eq!(
        parse_domain_list(input),
        vec!["alpha.example", "beta.example", "gamma.example"]
    );
}

#[test]
fn test_foreign_scheme_is_rejected() {
    let err = validate_target(&DomainTarget::ungrouped("ftp://files.example")).unwrap_err();
    match err {
        InvalidTarget::Malformed { name, detail } => {
            assert_eq!(name, "ftp://files.example");
            assert_eq!(detail, "unsupported scheme ftp");
        }
        other => panic!("unexpected rejection: {other:?}"),
    }
}

#[test]
fn test_scheme_match_is_case_insensitive() {
    assert_eq!(normalize_target("HTTP://Example.com"), "HTTP://Example.com");
    assert!(validate_target(&DomainTarget::ungrouped("HTTPS://example.com")).is_ok());
}
