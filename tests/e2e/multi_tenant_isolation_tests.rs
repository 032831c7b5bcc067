use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::{default_wedding_config, random_slug, TestHarness};

async fn setup_harness_with_two_tenants() -> Result<(TestHarness, String, String)> {
    let harness = TestHarness::start().await?;
    let tenant_a = random_slug("anna-ben");
    let tenant_b = random_slug("chi-dung");
    harness
        .create_tenant(&tenant_a, &default_wedding_config())
        .await?;
    harness
        .create_tenant(&tenant_b, &json!({ "weddingDate": "2099-12-31", "venue": "Old Town Hall" }))
        .await?;
    Ok((harness, tenant_a, tenant_b))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_is_scoped_to_tenant() -> Result<()> {
    let (mut harness, tenant_a, tenant_b) = setup_harness_with_two_tenants().await?;

    let a: Value = harness
        .get(&format!("/api/config?tenant={tenant_a}"))
        .await?
        .json()
        .await?;
    let b: Value = harness
        .get(&format!("/api/config?tenant={tenant_b}"))
        .await?
        .json()
        .await?;

    assert_eq!(a["slug"], tenant_a.as_str());
    assert_eq!(a["config"]["venue"], "Lakeside Pavilion");
    assert_eq!(b["config"]["venue"], "Old Town Hall");

    harness.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_guests_do_not_leak_between_tenants() -> Result<()> {
    let (mut harness, tenant_a, tenant_b) = setup_harness_with_two_tenants().await?;

    let guest: Value = harness
        .post(
            "/api/guests",
            &json!({ "tenant": tenant_a, "name": "Linh", "maxPartySize": 2 }),
        )
        .await?
        .json()
        .await?;
    let guest_id = guest["guestId"].as_str().unwrap_or_default().to_string();
    assert!(!guest_id.is_empty());

    let foreign = harness
        .get(&format!("/api/guests/{guest_id}?tenant={tenant_b}"))
        .await?;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let rsvp = harness
        .post(
            "/api/rsvp",
            &json!({ "tenant": tenant_b, "guestId": guest_id, "attending": true, "partySize": 1 }),
        )
        .await?;
    assert_eq!(rsvp.status(), StatusCode::NOT_FOUND);

    let listed: Value = harness
        .get(&format!("/api/guests?tenant={tenant_b}"))
        .await?
        .json()
        .await?;
    assert_eq!(listed, json!([]));

    harness.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_preferences_are_isolated_per_tenant_and_visitor() -> Result<()> {
    let (mut harness, tenant_a, tenant_b) = setup_harness_with_two_tenants().await?;

    let path_a = format!("/api/preferences/theme?tenant={tenant_a}&visitor=v-1");
    let written = harness.put(&path_a, &json!({ "value": "dark" })).await?;
    assert_eq!(written.status(), StatusCode::OK);

    let other_tenant = harness
        .get(&format!("/api/preferences/theme?tenant={tenant_b}&visitor=v-1"))
        .await?;
    assert_eq!(other_tenant.status(), StatusCode::NOT_FOUND);

    let other_visitor = harness
        .get(&format!("/api/preferences/theme?tenant={tenant_a}&visitor=v-2"))
        .await?;
    assert_eq!(other_visitor.status(), StatusCode::NOT_FOUND);

    let read: Value = harness.get(&path_a).await?.json().await?;
    assert_eq!(read["value"], "dark");

    harness.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_music_served_only_from_tenant_folder() -> Result<()> {
    let (mut harness, tenant_a, tenant_b) = setup_harness_with_two_tenants().await?;
    harness.write_track(&tenant_a, "01 - First Dance.mp3")?;

    let tracks: Value = harness
        .get(&format!("/api/music?tenant={tenant_a}"))
        .await?
        .json()
        .await?;
    assert_eq!(tracks[0]["title"], "First Dance");
    let url = tracks[0]["url"].as_str().unwrap_or_default().to_string();
    assert_eq!(url, format!("/music/{tenant_a}/01%20-%20First%20Dance.mp3"));

    let file = harness.get(&url).await?;
    assert_eq!(file.status(), StatusCode::OK);
    assert_eq!(file.bytes().await?.as_ref(), b"ID3");

    let empty: Value = harness
        .get(&format!("/api/music?tenant={tenant_b}"))
        .await?
        .json()
        .await?;
    assert_eq!(empty, json!([]));

    harness.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_deactivated_tenant_is_indistinguishable_from_unknown() -> Result<()> {
    let (mut harness, tenant_a, _tenant_b) = setup_harness_with_two_tenants().await?;

    let before = harness
        .get(&format!("/api/tenant/validate?tenant={tenant_a}"))
        .await?;
    assert_eq!(before.status(), StatusCode::OK);

    harness.set_tenant_active(&tenant_a, false).await?;

    let inactive = harness
        .get(&format!("/api/tenant/validate?tenant={tenant_a}"))
        .await?;
    let unknown = harness
        .get(&format!("/api/tenant/validate?tenant={}", random_slug("nobody")))
        .await?;

    assert_eq!(inactive.status(), StatusCode::BAD_REQUEST);
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
    let inactive: Value = inactive.json().await?;
    let unknown: Value = unknown.json().await?;
    assert_eq!(inactive, unknown);
    assert_eq!(inactive["error"], "Tenant not found or inactive.");

    let config = harness
        .get(&format!("/api/config?tenant={tenant_a}"))
        .await?;
    assert_eq!(config.status(), StatusCode::BAD_REQUEST);

    harness.stop().await;
    Ok(())
}
