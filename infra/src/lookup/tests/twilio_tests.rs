//! Tests for the Twilio Lookup v2 client

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use pv_core::domain::entities::LineType;
use pv_core::services::phone::{LookupResult, PhoneLookupTrait};

use crate::lookup::twilio::LookupResponse;
use crate::lookup::{TwilioLookupClient, TwilioLookupConfig};

/// Serve one canned HTTP response and hand back the raw request head
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/v2/PhoneNumbers", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).to_string()
    });

    (base_url, handle)
}

fn client(base_url: String) -> TwilioLookupClient {
    TwilioLookupClient::new(TwilioLookupConfig {
        account_sid: "ACtest".to_string(),
        auth_token: "secret".to_string(),
        base_url,
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

#[test]
fn test_response_mapping() {
    let body = r#"{
        "calling_country_code": "81",
        "country_code": "JP",
        "phone_number": "+819012345678",
        "valid": true,
        "line_type_intelligence": {
            "carrier_name": "NTT DOCOMO, INC.",
            "type": "mobile",
            "error_code": null
        }
    }"#;

    let response: LookupResponse = serde_json::from_str(body).unwrap();
    let result = LookupResult::from(response);

    assert!(result.valid);
    assert_eq!(result.carrier.as_deref(), Some("NTT DOCOMO, INC."));
    assert_eq!(result.line_type, LineType::Mobile);
    assert_eq!(result.country_code.as_deref(), Some("81"));
    assert!(!result.carrier_error);
}

#[test]
fn test_response_mapping_for_voip_with_carrier_error() {
    let body = r#"{
        "calling_country_code": "1",
        "valid": true,
        "line_type_intelligence": {"carrier_name": "", "type": "nonFixedVoip", "error_code": 60601}
    }"#;

    let result = LookupResult::from(serde_json::from_str::<LookupResponse>(body).unwrap());

    assert_eq!(result.line_type, LineType::Voip);
    assert!(result.carrier.is_none());
    assert!(result.carrier_error);
}

#[test]
fn test_fixed_voip_maps_to_voip() {
    let body = r#"{
        "calling_country_code": "81",
        "valid": true,
        "line_type_intelligence": {"carrier_name": "Example Telecom", "type": "fixedVoip", "error_code": null}
    }"#;

    let result = LookupResult::from(serde_json::from_str::<LookupResponse>(body).unwrap());

    assert_eq!(result.line_type, LineType::Voip);
    assert_eq!(LineType::parse("landline"), LineType::Landline);
}

#[test]
fn test_response_without_line_type_data() {
    let result = LookupResult::from(
        serde_json::from_str::<LookupResponse>(r#"{"valid": false}"#).unwrap(),
    );

    assert!(!result.valid);
    assert_eq!(result.line_type, LineType::Unknown);
    assert!(result.country_code.is_none());
}

#[tokio::test]
async fn test_lookup_sends_credentials_and_fields() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"valid": true, "calling_country_code": "81", "line_type_intelligence": {"carrier_name": "KDDI", "type": "mobile"}}"#,
    )
    .await;

    let result = client(base_url).lookup("+819012345678").await.unwrap();

    assert_eq!(result.carrier.as_deref(), Some("KDDI"));
    let request = server.await.unwrap();
    assert!(request.starts_with("GET /v2/PhoneNumbers/+819012345678?Fields=line_type_intelligence"));
    assert!(request.to_lowercase().contains("authorization: basic"));
}

#[tokio::test]
async fn test_http_error_status_is_reported() {
    let (base_url, server) = serve_once("404 Not Found", r#"{"code": 20404}"#).await;

    let err = client(base_url).lookup("+819012345678").await.unwrap_err();

    assert!(err.contains("404"));
    server.await.unwrap();
}
