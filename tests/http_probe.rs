//! HTTP probe behavior against local mock servers.

mod helpers;

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use domain_watch::dns::{CachingResolver, DnsCache};
use domain_watch::error_handling::ErrorKind;
use domain_watch::initialization::init_resolver;
use domain_watch::{Checker, DomainTarget, HttpProbe, Probe, ProbeError, Status};
use helpers::{closed_port, local_http_probe, test_config};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_status(server: &MockServer, route: &str, code: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(code))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mixed_batch_scenario() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mount_status(&server, "/", 200).await;

    let slow = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&slow)
        .await;

    let failing = MockServer::start().await;
    mount_status(&failing, "/", 500).await;

    let config = test_config(4, 2);
    let probe = local_http_probe(
        &config,
        &["up.example", "slow.example", "down.example", "http-error.example"],
    )
    .await;
    let checker = Checker::new(probe, config).unwrap();

    let targets = vec![
        DomainTarget::ungrouped(format!("http://up.example:{port}")),
        DomainTarget::ungrouped(format!("http://slow.example:{}", slow.address().port())),
        DomainTarget::ungrouped(format!("http://down.example:{}", closed_port())),
        DomainTarget::ungrouped(format!(
            "http://http-error.example:{}",
            failing.address().port()
        )),
    ];
    let run = checker.run(targets).await;
    let results = &run.results;
    assert_eq!(results.len(), 4);

    assert_eq!(results[0].status(), Status::Up);
    assert_eq!(results[0].status_code(), Some(200));
    assert!(results[0].response_time.is_some());

    assert_eq!(results[1].status(), Status::Down);
    assert_eq!(results[1].error(), Some(&ProbeError::Timeout));
    assert_eq!(results[1].status_code(), None);
    assert_eq!(results[1].error().unwrap().to_string(), "timeout");

    assert_eq!(results[2].status(), Status::Down);
    assert_eq!(results[2].error(), Some(&ProbeError::ConnectionRefused));
    assert_eq!(results[2].status_code(), None);

    assert_eq!(results[3].status(), Status::Down);
    assert_eq!(results[3].status_code(), Some(500));
    assert!(results[3].error().is_none());
    assert!(results[3].response_time.is_some());
}

#[tokio::test]
async fn test_status_code_boundaries() {
    let server = MockServer::start().await;
    mount_status(&server, "/ok", 200).await;
    mount_status(&server, "/edge", 399).await;
    mount_status(&server, "/bad", 400).await;
    mount_status(&server, "/forbidden", 403).await;

    let config = test_config(4, 4);
    let probe = local_http_probe(&config, &[]).await;
    let base = server.uri();

    let expectations = [
        ("/ok", Status::Up, 200),
        ("/edge", Status::Up, 399),
        ("/bad", Status::Down, 400),
        ("/forbidden", Status::Down, 403),
    ];
    for (route, status, code) in expectations {
        let result = probe
            .probe(&DomainTarget::ungrouped(format!("{base}{route}")))
            .await;
        assert_eq!(result.status(), status, "{route}");
        assert_eq!(result.status_code(), Some(code), "{route}");
        assert!(result.error().is_none(), "{route}");
    }
}

#[tokio::test]
async fn test_redirects_are_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    mount_status(&server, "/new", 204).await;

    let config = test_config(1, 1);
    let probe = local_http_probe(&config, &[]).await;
    let result = probe
        .probe(&DomainTarget::ungrouped(format!("{}/old", server.uri())))
        .await;
    assert_eq!(result.status(), Status::Up);
    assert_eq!(result.status_code(), Some(204));
}

#[tokio::test]
async fn test_probe_sends_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "domain_watch_test/1.0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(1, 1);
    let probe = local_http_probe(&config, &[]).await;
    let result = probe
        .probe(&DomainTarget::ungrouped(server.uri()))
        .await;
    assert_eq!(result.status(), Status::Up);
}

#[tokio::test]
async fn test_named_host_is_served_from_dns_cache() {
    let server = MockServer::start().await;
    mount_status(&server, "/", 200).await;

    let config = test_config(1, 1);
    let probe = local_http_probe(&config, &["cached-host.example"]).await;
    assert_eq!(probe.dns_cache().len().await, 1);

    let target = DomainTarget::ungrouped(format!(
        "http://cached-host.example:{}",
        server.address().port()
    ));
    assert_eq!(probe.probe(&target).await.status(), Status::Up);
    // Second probe reuses the pooled connection and the cached address
    assert_eq!(probe.probe(&target).await.status(), Status::Up);
}

#[tokio::test]
async fn test_run_evicts_expired_dns_entries() {
    let cache = Arc::new(DnsCache::new(Duration::from_millis(20)));
    cache
        .insert("retired.example", vec![IpAddr::V4(Ipv4Addr::LOCALHOST)])
        .await;
    let config = test_config(1, 1);
    let probe = HttpProbe::with_resolver(&config, CachingResolver::new(init_resolver(), cache.clone()))
        .unwrap();
    let checker = Checker::new(probe, config).unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    // Never looked up again, so only the end-of-run sweep can drop it
    assert_eq!(cache.len().await, 1);
    checker.run(Vec::new()).await;
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn test_unresolvable_host_is_dns_failure() {
    let config = test_config(1, 1);
    let probe = local_http_probe(&config, &[]).await;
    // .invalid never resolves
    let result = probe
        .probe(&DomainTarget::ungrouped("http://no-such-host.invalid"))
        .await;
    assert_eq!(result.status(), Status::Down);
    assert_eq!(result.status_code(), None);
    let kind = result.error().map(ProbeError::kind);
    // A resolver that cannot be reached at all times out instead
    assert!(
        matches!(kind, Some(ErrorKind::Dns) | Some(ErrorKind::Timeout)),
        "unexpected error: {:?}",
        result.error()
    );
}

#[tokio::test]
async fn test_scheme_is_added_when_missing() {
    let config = test_config(1, 1);
    let probe = local_http_probe(&config, &["plain.example"]).await;
    // Resolves to localhost, but https on port 443 has no listener
    let result = probe.probe(&DomainTarget::ungrouped("plain.example")).await;
    assert_eq!(result.status(), Status::Down);
    assert!(result.error().is_some());
}

#[tokio::test]
#[ignore] // Needs outbound network; 10.255.255.1 must black-hole SYNs
async fn test_connect_timeout_on_blackhole_address() {
    let config = test_config(1, 1);
    let probe = local_http_probe(&config, &[]).await;
    let result = probe
        .probe(&DomainTarget::ungrouped("http://10.255.255.1"))
        .await;
    assert_eq!(result.status(), Status::Down);
    assert_eq!(result.error(), Some(&ProbeError::Timeout));
}
