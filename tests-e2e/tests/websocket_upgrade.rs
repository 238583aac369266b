use echoprobe_lib::headers::upgrade;
use crate::common::{echo_via_proxy, echoed_header, TestResult};

#[tokio::test]
async fn test_forwards_websocket_upgrade_headers() -> TestResult {
    let body =
        echo_via_proxy(&[(upgrade::UPGRADE, "websocket"), (upgrade::CONNECTION, "upgrade")])
            .await?;

    let upgrade_value = echoed_header(&body, upgrade::UPGRADE)
        .ok_or("Upgrade header missing in backend request")?;
    assert_eq!(upgrade_value, "websocket");

    let connection = echoed_header(&body, upgrade::CONNECTION)
        .ok_or("Connection header missing in backend request")?;
    assert_eq!(connection, "upgrade");
    Ok(())
}
