// SOAP availability client
// Standalone check against a remote hotel-availability service. It is not
// used by the reservation endpoint.

use std::time::Duration;

use chrono::{DateTime, NaiveDate};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, error, info};

use crate::config::SoapConfig;
use crate::error::RemoteCallError;
use crate::xml_document::{decode_html_entities, extract_available_rooms, XmlElement};

pub const ROOM_PATH: [&str; 5] = [
    "soap:Envelope",
    "soap:Body",
    "tns:checkAvailabilityResponse",
    "tns:availableRooms",
    "tns:room",
];

// The window the fixed envelope asks for
pub const WINDOW_START: &str = "2024-12-20";
pub const WINDOW_END: &str = "2024-12-22";

pub const SOAP_REQUEST: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"
               xmlns:tns="http://www.example.org/hotelavailability">
    <soap:Body>
        <tns:checkAvailability>
            <tns:roomType>single</tns:roomType>
            <tns:startDate>2024-12-20</tns:startDate>
            <tns:endDate>2024-12-22</tns:endDate>
        </tns:checkAvailability>
    </soap:Body>
</soap:Envelope>
"#;

#[derive(Debug, Clone, PartialEq)]
pub struct SoapRoom {
    pub room_type: String,
    pub available_date: String,
}

impl SoapRoom {
    fn from_element(element: &XmlElement) -> Self {
        Self {
            room_type: element
                .child_text("tns:room_type")
                .unwrap_or_default()
                .to_string(),
            available_date: element
                .child_text("tns:available_date")
                .unwrap_or_default()
                .to_string(),
        }
    }

    // ISO date, or an RFC 3339 timestamp reduced to its date
    pub fn available_on(&self) -> Option<NaiveDate> {
        let raw = self.available_date.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.date_naive()))
    }
}

/// Rooms listed in an escaped availability response.
///
/// Any missing piece (fragment, envelope, body, response, room list) yields
/// an empty list. Only a fragment that is present but not well-formed XML is
/// an error.
pub fn parse_available_rooms(response: &str) -> Result<Vec<SoapRoom>, RemoteCallError> {
    let Some(escaped) = extract_available_rooms(response) else {
        debug!("Response has no availableRooms fragment");
        return Ok(Vec::new());
    };

    let decoded = decode_html_entities(&escaped);
    debug!(xml = %decoded, "Decoded availableRooms fragment");

    let document = XmlElement::parse_document(&decoded)?;
    Ok(document
        .select(&ROOM_PATH)
        .into_iter()
        .map(SoapRoom::from_element)
        .collect())
}

// First room whose date falls in [start, end]
pub fn first_room_in_window(
    rooms: &[SoapRoom],
    start: NaiveDate,
    end: NaiveDate,
) -> Option<&SoapRoom> {
    rooms.iter().find(|room| {
        room.available_on()
            .is_some_and(|day| day >= start && day <= end)
    })
}

pub struct SoapAvailabilityClient {
    http: reqwest::Client,
    endpoint: String,
    window: (NaiveDate, NaiveDate),
}

impl SoapAvailabilityClient {
    pub fn new(config: &SoapConfig) -> Result<Self, RemoteCallError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }

        Ok(Self {
            http: builder.build()?,
            endpoint: config.endpoint.clone(),
            window: fixed_window(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// `true` if the remote service lists a room inside the fixed window.
    ///
    /// Every failure is logged and reported as `false`.
    pub async fn check_availability(&self) -> bool {
        match self.find_available_room().await {
            Ok(Some(room)) => {
                info!(room_type = %room.room_type, date = %room.available_date, "SOAP room available");
                true
            }
            Ok(None) => {
                info!("No SOAP rooms available");
                false
            }
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "SOAP availability request failed");
                false
            }
        }
    }

    // Same as check_availability but keeps the room and the error
    pub async fn find_available_room(&self) -> Result<Option<SoapRoom>, RemoteCallError> {
        let body = self.send_request().await?;
        let rooms = parse_available_rooms(&body)?;
        let (start, end) = self.window;
        Ok(first_room_in_window(&rooms, start, end).cloned())
    }

    async fn send_request(&self) -> Result<String, RemoteCallError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/xml")
            .header(ACCEPT, "application/xml")
            .body(SOAP_REQUEST)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        debug!(bytes = body.len(), "SOAP response received");
        Ok(body)
    }
}

fn fixed_window() -> (NaiveDate, NaiveDate) {
    // Both constants are valid ISO dates
    let start = WINDOW_START.parse().unwrap_or(NaiveDate::MIN);
    let end = WINDOW_END.parse().unwrap_or(NaiveDate::MIN);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::Router;
    use test_case::test_case;

    fn escape(xml: &str) -> String {
        xml.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    fn inner_envelope(dates: &[&str]) -> String {
        let rooms: String = dates
            .iter()
            .map(|d| {
                format!(
                    "<tns:room><tns:room_type>single</tns:room_type><tns:available_date>{}</tns:available_date></tns:room>",
                    d
                )
            })
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?><soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:tns="http://www.example.org/hotelavailability"><soap:Body><tns:checkAvailabilityResponse><tns:availableRooms>{}</tns:availableRooms></tns:checkAvailabilityResponse></soap:Body></soap:Envelope>"#,
            rooms
        )
    }

    fn soap_response(dates: &[&str]) -> String {
        format!(
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\" xmlns:tns=\"http://www.example.org/hotelavailability\"><soap:Body><tns:checkAvailabilityResponse><tns:availableRooms>{}</tns:availableRooms></tns:checkAvailabilityResponse></soap:Body></soap:Envelope>",
            escape(&inner_envelope(dates))
        )
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_available_rooms() {
        let rooms = parse_available_rooms(&soap_response(&["2024-12-18", "2024-12-21"])).unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].room_type, "single");
        assert_eq!(rooms[1].available_date, "2024-12-21");
    }

    #[test_case(&["2024-12-21"], Some("2024-12-21"); "#1 Room inside window")]
    #[test_case(&["2024-12-20"], Some("2024-12-20"); "#2 Window start inclusive")]
    #[test_case(&["2024-12-22"], Some("2024-12-22"); "#3 Window end inclusive")]
    #[test_case(&["2024-12-19", "2024-12-23"], None; "#4 Rooms outside window")]
    #[test_case(&["not a date", "2024-12-22"], Some("2024-12-22"); "#5 Unparsable date skipped")]
    #[test_case(&["2024-12-21T10:00:00Z"], Some("2024-12-21T10:00:00Z"); "#6 Timestamp reduced to date")]
    #[test_case(&[], None; "#7 No rooms")]
    fn test_first_room_in_window(dates: &[&str], expected: Option<&str>) {
        let rooms = parse_available_rooms(&soap_response(dates)).unwrap();
        let found = first_room_in_window(&rooms, date(WINDOW_START), date(WINDOW_END));
        assert_eq!(found.map(|r| r.available_date.as_str()), expected);
    }

    #[test]
    fn test_missing_navigation_step_yields_no_rooms() {
        let inner = "<soap:Envelope><soap:Body><tns:fault>busy</tns:fault></soap:Body></soap:Envelope>";
        let response = format!(
            "<x><tns:availableRooms>{}</tns:availableRooms></x>",
            escape(inner)
        );
        assert!(parse_available_rooms(&response).unwrap().is_empty());
    }

    #[test]
    fn test_missing_fragment_yields_no_rooms() {
        assert!(parse_available_rooms("<x/>").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_fragment_is_an_error() {
        let response = "<x><tns:availableRooms>&lt;room&gt;&lt;/other&gt;</tns:availableRooms></x>";
        assert!(parse_available_rooms(response).is_err());
    }

    #[test]
    fn test_request_envelope_asks_for_fixed_window() {
        let document = XmlElement::parse_document(SOAP_REQUEST).unwrap();
        let query = document.select(&["soap:Envelope", "soap:Body", "tns:checkAvailability"]);
        assert_eq!(query.len(), 1);
        assert_eq!(query[0].child_text("tns:roomType"), Some("single"));
        assert_eq!(query[0].child_text("tns:startDate"), Some(WINDOW_START));
        assert_eq!(query[0].child_text("tns:endDate"), Some(WINDOW_END));
    }

    // Serves `body` for every POST to /soap and returns the endpoint URL
    async fn spawn_soap_stub(body: String) -> String {
        let app = Router::new().route("/soap", post(move || async move { body }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/soap", addr)
    }

    fn client_for(endpoint: String) -> SoapAvailabilityClient {
        SoapAvailabilityClient::new(&SoapConfig {
            endpoint,
            timeout_ms: Some(5000),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_client_reports_available_room() {
        let endpoint = spawn_soap_stub(soap_response(&["2024-12-21"])).await;
        let client = client_for(endpoint.clone());
        assert_eq!(client.endpoint(), endpoint);

        assert!(client.check_availability().await);
        let room = client.find_available_room().await.unwrap().unwrap();
        assert_eq!(room.available_date, "2024-12-21");
    }

    #[tokio::test]
    async fn test_client_reports_no_room_outside_window() {
        let endpoint = spawn_soap_stub(soap_response(&["2025-01-05"])).await;
        assert!(!client_for(endpoint).check_availability().await);
    }

    #[tokio::test]
    async fn test_client_swallows_malformed_response() {
        let endpoint = spawn_soap_stub(
            "<x><tns:availableRooms>&lt;broken</tns:availableRooms></x>".to_string(),
        )
        .await;
        let client = client_for(endpoint);

        assert!(client.find_available_room().await.is_err());
        assert!(!client.check_availability().await);
    }

    #[tokio::test]
    async fn test_client_swallows_network_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_for(format!("http://{}/soap", addr));
        let result = client.find_available_room().await;
        assert!(matches!(result, Err(RemoteCallError::Network(_))));
        assert!(!client.check_availability().await);
    }
}
