use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use super::{default_wedding_config, random_slug, TestHarness};

#[tokio::test(flavor = "multi_thread")]
async fn test_guest_journey_from_link_to_rsvp() -> Result<()> {
    let mut harness = TestHarness::start().await?;
    let tenant = random_slug("minh-an");
    harness
        .create_tenant(&tenant, &default_wedding_config())
        .await?;

    // The invitation link carries the slug as its first path segment
    let resolved: Value = harness
        .get(&format!("/api/tenant/resolve?path=/{tenant}/rsvp"))
        .await?
        .json()
        .await?;
    assert_eq!(resolved["isValid"], true);
    assert_eq!(resolved["slug"], tenant.as_str());

    let countdown: Value = harness
        .get(&format!("/api/countdown?tenant={tenant}"))
        .await?
        .json()
        .await?;
    assert_eq!(countdown["isPast"], false);
    assert!(countdown["days"].as_i64().unwrap_or_default() > 0);

    let guest: Value = harness
        .post(
            "/api/guests",
            &json!({
                "tenant": tenant,
                "name": "Hoa",
                "email": "hoa@example.com",
                "maxPartySize": 4
            }),
        )
        .await?
        .json()
        .await?;
    let guest_id = guest["guestId"].as_str().unwrap_or_default().to_string();

    let declined: Value = harness
        .post(
            "/api/rsvp",
            &json!({ "tenant": tenant, "guestId": guest_id, "attending": false }),
        )
        .await?
        .json()
        .await?;
    assert_eq!(declined["rsvpStatus"], "declined");
    assert_eq!(declined["partySize"], 0);

    // Guests may change their mind
    let accepted: Value = harness
        .post(
            "/api/rsvp",
            &json!({
                "tenant": tenant,
                "guestId": guest_id,
                "attending": true,
                "partySize": 3,
                "message": "  Congratulations!  "
            }),
        )
        .await?
        .json()
        .await?;
    assert_eq!(accepted["rsvpStatus"], "attending");
    assert_eq!(accepted["partySize"], 3);
    assert_eq!(accepted["message"], "Congratulations!");

    harness.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_malformed_links_are_rejected_before_lookup() -> Result<()> {
    let mut harness = TestHarness::start().await?;

    let cases = [
        ("/api/tenant/validate", "No tenant slug provided"),
        (
            "/api/tenant/validate?tenant=a",
            "Tenant slug must be between 2 and 50 characters long.",
        ),
        (
            "/api/tenant/validate?tenant=anna.ben",
            "Invalid tenant slug format. Only letters, numbers, hyphens, and underscores are allowed.",
        ),
        ("/api/tenant/resolve?path=/", "No tenant slug provided"),
    ];

    for (path, message) in cases {
        let response = harness.get(path).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path}");
        let body: Value = response.json().await?;
        assert_eq!(body["isValid"], false, "{path}");
        assert_eq!(body["error"], message, "{path}");
    }

    harness.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_gallery_keeps_curated_order() -> Result<()> {
    let mut harness = TestHarness::start().await?;
    let tenant = random_slug("gallery");
    harness
        .create_tenant(&tenant, &default_wedding_config())
        .await?;

    for (url, order) in [("/p/c.jpg", 3), ("/p/a.jpg", 1), ("/p/b.jpg", 2)] {
        let response = harness
            .post(
                "/api/gallery",
                &json!({ "tenant": tenant, "url": url, "displayOrder": order }),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let photos: Value = harness
        .get(&format!("/api/gallery?tenant={tenant}"))
        .await?
        .json()
        .await?;
    let urls: Vec<&str> = photos
        .as_array()
        .map(|photos| photos.iter().filter_map(|p| p["url"].as_str()).collect())
        .unwrap_or_default();
    assert_eq!(urls, ["/p/a.jpg", "/p/b.jpg", "/p/c.jpg"]);

    harness.stop().await;
    Ok(())
}
