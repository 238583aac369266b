use echoprobe_lib::headers::{forwarded, HOST};
use echoprobe_lib::scenarios::{build_client, catalog, contains_ipv4, is_ipv4, run_scenario};
use crate::common::{echo_via_proxy, echoed_header, ensure_proxy_ready, harness, TestResult};

#[tokio::test]
async fn test_sets_x_real_ip() -> TestResult {
    let body = echo_via_proxy(&[]).await?;

    let real_ip =
        echoed_header(&body, forwarded::REAL_IP).ok_or("X-Real-IP header missing in backend request")?;
    assert!(is_ipv4(real_ip), "X-Real-IP is not an IPv4 address: {real_ip}");
    Ok(())
}

#[tokio::test]
async fn test_sets_x_forwarded_for() -> TestResult {
    let body = echo_via_proxy(&[]).await?;

    let forwarded_for = echoed_header(&body, forwarded::FOR)
        .ok_or("X-Forwarded-For header missing in backend request")?;
    assert!(
        contains_ipv4(forwarded_for),
        "X-Forwarded-For carries no IPv4 address: {forwarded_for}"
    );
    Ok(())
}

#[tokio::test]
async fn test_forwards_host_header() -> TestResult {
    let body = echo_via_proxy(&[(HOST, "example.com")]).await?;

    assert_eq!(echoed_header(&body, HOST), Some("example.com"));
    Ok(())
}

#[tokio::test]
async fn test_full_catalog_is_repeatable() -> TestResult {
    ensure_proxy_ready().await;

    let cfg = harness();
    let client = build_client(cfg.request_timeout)?;

    for scenario in catalog(&cfg.target_url)? {
        let first = run_scenario(&client, &cfg.target_url, &scenario).await;
        assert!(first.passed(), "{first}");

        let second = run_scenario(&client, &cfg.target_url, &scenario).await;
        assert_eq!(first, second, "{} changed between runs", scenario.name);
    }
    Ok(())
}
