mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{send, seeded_data, test_app, ADMIN_KEY, READ_KEY, WRITE_KEY};

#[tokio::test]
async fn missing_credential_yields_401_everywhere() -> Result<()> {
    let (app, _dir) = test_app(seeded_data());

    let cases = [
        (Method::GET, "/admin/keys"),
        (Method::POST, "/admin/keys"),
        (Method::DELETE, "/admin/keys?key=x"),
        (Method::GET, "/flags"),
        (Method::POST, "/flags"),
        (Method::GET, "/flag?tag=checkout"),
        // Credential extraction happens before route matching.
        (Method::GET, "/no/such/route"),
    ];
    for (method, uri) in cases {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert!(body.is_null(), "401 carries no body");
    }
    Ok(())
}

#[tokio::test]
async fn unknown_credential_yields_403_at_every_level() -> Result<()> {
    let (app, _dir) = test_app(seeded_data());

    for uri in ["/admin/keys", "/flags", "/flag?tag=checkout"] {
        let (status, body) = send(&app, Method::GET, uri, Some("nobody"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert!(body.is_null(), "403 carries no body");
    }
    Ok(())
}

#[tokio::test]
async fn tier_matrix_across_routes() -> Result<()> {
    let (app, _dir) = test_app(seeded_data());

    // read key: read routes only
    let (status, _) = send(&app, Method::GET, "/flags", Some(READ_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(
        &app,
        Method::POST,
        "/flags",
        Some(READ_KEY),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::GET, "/admin/keys", Some(READ_KEY), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // write key: read and write, not admin
    let (status, _) = send(&app, Method::GET, "/flags", Some(WRITE_KEY), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, "/admin/keys", Some(WRITE_KEY), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // admin key: everything
    for (method, uri) in [
        (Method::GET, "/admin/keys"),
        (Method::GET, "/flags"),
        (Method::GET, "/flag?tag=checkout"),
    ] {
        let (status, _) = send(&app, method, uri, Some(ADMIN_KEY), None).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
    }
    Ok(())
}

#[tokio::test]
async fn unknown_route_yields_404_naming_path_and_method() -> Result<()> {
    let (app, _dir) = test_app(seeded_data());

    let (status, body) = send(&app, Method::GET, "/nope", Some(ADMIN_KEY), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No route found");
    assert_eq!(body["path"], "/nope");
    assert_eq!(body["method"], "GET");

    // Registered path, unregistered method.
    let (status, body) = send(&app, Method::PATCH, "/flags", Some(ADMIN_KEY), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["method"], "PATCH");
    Ok(())
}
