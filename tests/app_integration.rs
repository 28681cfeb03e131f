use std::fs;
use tracing::info;

use propintake::AppCommand;
use propintake::core::config::ApiConfig;
use propintake::core::dashboard::PropertyFilter;
use propintake::core::property::PropertyType;
use propintake::providers::HttpPropertyApi;

// Adds automatic logging to test
mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const LIST_RESPONSE: &str = r#"[
        {"_id": "1", "title": "Cottage", "location": "Hobart", "type": "House",
         "purchase_price": 450000, "created_at": "Fri, 05 Jan 2024 00:00:00 GMT",
         "owners": [{"name": "Ana", "ownership": 100}]},
        {"_id": "2", "title": "Loft", "location": "Fitzroy", "type": "Apartment",
         "purchase_price": 620000, "created_at": "Fri, 01 Mar 2024 12:00:00 GMT",
         "owners": [{"name": "Ana", "ownership": 50}, {"name": "Ben", "ownership": 50}]}
    ]"#;

    pub async fn create_mock_server(
        http_method: &str,
        url_path: &str,
        status: u16,
        body: &str,
    ) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method(http_method))
            .and(path(url_path))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
            api:
              base_url: {base_url}
              properties_path: /api/properties
            currency: AUD
            "#
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

const DRAFT_YAML: &str = r#"
title: Beach House
location: Byron Bay
type: House
purchase_price: 800000
deposit: 160000
loan_amount: 640000
interest_rate: 6.2
loan_term: 30
rent: 3000
vacancy_rate: 5
council_rates: 2000
insurance: 1500
maintenance: 1200
property_manager: 2400
owners:
  - name: Ana
    ownership: 60
    income: 95000
  - name: Ben
    ownership: 40
    income: 88000
wage_growth: 3
"#;

const CREATED_JSON: &str = r#"{
    "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
    "title": "Beach House",
    "location": "Byron Bay",
    "type": "House",
    "purchase_price": 800000,
    "created_at": "Tue, 02 Jan 2024 03:04:05 GMT"
}"#;

#[test_log::test(tokio::test)]
async fn test_full_add_flow_with_mock() {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/properties"))
        .and(body_partial_json(serde_json::json!({
            "title": "Beach House",
            "type": "House",
            "loan_term": 30,
            "owners": [
                {"name": "Ana", "ownership": 60.0, "income": 95000.0},
                {"name": "Ben", "ownership": 40.0, "income": 88000.0}
            ],
            "wage_growth": 3.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_string(CREATED_JSON))
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());
    let draft_path = temp_dir.path().join("draft.yaml");
    fs::write(&draft_path, DRAFT_YAML).expect("Failed to write draft file");

    let result = propintake::run_command(
        AppCommand::Add {
            draft_path: Some(draft_path.to_string_lossy().into_owned()),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Add command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_add_flow_reports_backend_failure() {
    let mock_server = test_utils::create_mock_server(
        "POST",
        "/api/properties",
        500,
        r#"{"error": "Insert failed"}"#,
    )
    .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());
    let draft_path = temp_dir.path().join("draft.yaml");
    fs::write(&draft_path, DRAFT_YAML).expect("Failed to write draft file");

    let err = propintake::run_command(
        AppCommand::Add {
            draft_path: Some(draft_path.to_string_lossy().into_owned()),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();
    info!("Add failed as expected: {err:#}");
    assert!(format!("{err:#}").contains("500"));
}

#[test_log::test(tokio::test)]
async fn test_add_flow_rejects_unbalanced_ownership() {
    // Nothing is mounted: a request reaching the server would fail with 404.
    let mock_server = wiremock::MockServer::start().await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());
    let draft_path = temp_dir.path().join("draft.yaml");
    fs::write(&draft_path, DRAFT_YAML.replace("ownership: 40", "ownership: 39"))
        .expect("Failed to write draft file");

    let err = propintake::run_command(
        AppCommand::Add {
            draft_path: Some(draft_path.to_string_lossy().into_owned()),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();
    assert!(format!("{err:#}").contains("Currently: 99%"));
    let received = mock_server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_confirmation_uses_submitted_values() {
    use propintake::cli::add::{load_draft, submit_draft};

    // The backend echoes a different title and price; the confirmation must not change.
    let echoed = CREATED_JSON
        .replace("\"Beach House\"", "\"Renamed\"")
        .replace("800000", "1");
    let mock_server =
        test_utils::create_mock_server("POST", "/api/properties", 201, &echoed).await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let draft_path = temp_dir.path().join("draft.yml");
    fs::write(&draft_path, DRAFT_YAML).expect("Failed to write draft file");

    let api = HttpPropertyApi::new(&ApiConfig {
        base_url: mock_server.uri(),
        ..Default::default()
    })
    .unwrap();
    let confirmation = submit_draft(load_draft(&draft_path).unwrap(), &api)
        .await
        .unwrap();

    assert_eq!(confirmation.title, "Beach House");
    assert_eq!(confirmation.property_type, PropertyType::House);
    assert_eq!(confirmation.roi_display(), "20.92%");
    assert_eq!(confirmation.cash_flow_display("AUD"), "$2,408/mo");
}

#[test_log::test(tokio::test)]
async fn test_full_dashboard_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(
        "GET",
        "/api/properties",
        200,
        test_utils::LIST_RESPONSE,
    )
    .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let filter = PropertyFilter::from_dates(
        Some(PropertyType::Apartment),
        chrono::NaiveDate::from_ymd_opt(2024, 2, 1),
        None,
    );
    let result = propintake::run_command(
        AppCommand::Dashboard { filter },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Dashboard command failed with: {:?}",
        result.err()
    );

    let api = HttpPropertyApi::new(&ApiConfig {
        base_url: mock_server.uri(),
        ..Default::default()
    })
    .unwrap();
    let report = propintake::cli::dashboard::build_report(&api, &PropertyFilter::default(), "AUD")
        .await
        .unwrap();
    let report = console::strip_ansi_codes(&report).to_string();
    info!("{report}");
    assert!(report.contains("Properties: 2"));
    assert!(report.contains("Average purchase price: $535,000"));
    assert!(report.contains("Ben"));
}

#[test_log::test(tokio::test)]
async fn test_dashboard_flow_with_backend_down() {
    let mock_server =
        test_utils::create_mock_server("GET", "/api/properties", 503, "Service Unavailable")
            .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let err = propintake::run_command(
        AppCommand::Dashboard {
            filter: PropertyFilter::default(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Failed to load properties"));
}

#[test_log::test(tokio::test)]
async fn test_full_show_flow_with_mock() {
    let mock_server = test_utils::create_mock_server(
        "GET",
        "/api/properties/65a1f0c2e4b0a1b2c3d4e5f6",
        200,
        CREATED_JSON,
    )
    .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let result = propintake::run_command(
        AppCommand::Show {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".to_string(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Show command failed with: {:?}", result.err());

    let err = propintake::run_command(
        AppCommand::Show {
            id: "missing".to_string(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Failed to load property missing"));
}

#[test_log::test(tokio::test)]
async fn test_full_delete_flow_with_mock() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let mock_server = test_utils::create_mock_server(
        "DELETE",
        "/api/properties/missing",
        404,
        r#"{"error": "Property not found"}"#,
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/api/properties/65a1f0c2e4b0a1b2c3d4e5f6"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"message": "Property deleted"}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri());

    let result = propintake::run_command(
        AppCommand::Delete {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".to_string(),
            assume_yes: true,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Delete command failed with: {:?}", result.err());

    let err = propintake::run_command(
        AppCommand::Delete {
            id: "missing".to_string(),
            assume_yes: true,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await
    .unwrap_err();
    assert_eq!(
        format!("{err:#}"),
        "Failed to delete property missing: Property not found: missing"
    );
}

#[test_log::test(tokio::test)]
async fn test_dashboard_keeps_records_with_text_prices() {
    let body = r#"[
        {"_id": "1", "title": "Cottage", "type": "House", "purchase_price": 450000,
         "created_at": "Fri, 05 Jan 2024 00:00:00 GMT"},
        {"_id": "2", "title": "Loft", "type": "Apartment", "purchase_price": "500000",
         "created_at": "Fri, 01 Mar 2024 12:00:00 GMT"},
        {"_id": "3", "title": "Broken", "type": "House", "purchase_price": {"amount": 1},
         "created_at": "Fri, 01 Mar 2024 12:00:00 GMT"}
    ]"#;
    let mock_server = test_utils::create_mock_server("GET", "/api/properties", 200, body).await;

    let api = HttpPropertyApi::new(&ApiConfig {
        base_url: mock_server.uri(),
        ..Default::default()
    })
    .unwrap();
    let report = propintake::cli::dashboard::build_report(&api, &PropertyFilter::default(), "AUD")
        .await
        .unwrap();
    let report = console::strip_ansi_codes(&report).to_string();
    assert!(report.contains("Properties: 2"));
    assert!(report.contains("Average purchase price: $475,000"));
    assert!(!report.contains("Broken"));
}
