//! HTTP client for the XDS Connect web service

use std::time::Duration;

use crate::infra::{BridgeError, PollConfig, PollResult, Poller, Result};

use super::envelope;
use super::response::{self, ConsumerSummary};

const SOAP12_CONTENT_TYPE: &str = "application/soap+xml; charset=utf-8";
const SOAP11_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

/// Connection settings for the XDS Connect endpoint
#[derive(Debug, Clone)]
pub struct XdsConfig {
    /// WSDL endpoint URL
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// DOV product identifier sent on match and facial requests
    pub product_id: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl XdsConfig {
    /// Load settings from environment variables, with the sandbox defaults.
    pub fn from_env() -> Self {
        let endpoint = std::env::var("XDS_URL").unwrap_or_else(|_| {
            "https://www.web.xds.co.za/xdsconnect/XDSConnectWS.asmx?WSDL".to_string()
        });
        let username = std::env::var("XDS_USER").unwrap_or_else(|_| "TestUser_DOVS".to_string());
        let password = std::env::var("XDS_PASS").unwrap_or_else(|_| "xds100".to_string());
        let product_id =
            std::env::var("DEFAULT_PRODUCT_ID").unwrap_or_else(|_| "194".to_string());
        let timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            endpoint,
            username,
            password,
            product_id,
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Result of a `ConnectConsumerMatchDOVS` call
#[derive(Debug, Clone)]
pub struct ConsumerMatch {
    /// Inner result document, verbatim
    pub xml: String,
    /// Correlation id for the verification session
    pub enquiry_id: Option<String>,
    /// Correlation id for this match result
    pub enquiry_result_id: Option<String>,
    /// Consumer details, when the match found one
    pub summary: Option<ConsumerSummary>,
}

impl ConsumerMatch {
    /// Both correlation identifiers, when the match succeeded.
    pub fn enquiry_ids(&self) -> Option<(&str, &str)> {
        match (self.enquiry_id.as_deref(), self.enquiry_result_id.as_deref()) {
            (Some(enquiry_id), Some(enquiry_result_id))
                if !enquiry_id.is_empty() && !enquiry_result_id.is_empty() =>
            {
                Some((enquiry_id, enquiry_result_id))
            }
            _ => None,
        }
    }
}

/// SOAP client for the XDS Connect operations
#[derive(Debug, Clone)]
pub struct XdsClient {
    http: reqwest::Client,
    config: XdsConfig,
}

impl XdsClient {
    /// Build a client for the configured endpoint
    pub fn new(config: XdsConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// The configured product id
    pub fn product_id(&self) -> &str {
        &self.config.product_id
    }

    async fn post_soap(
        &self,
        body: String,
        content_type: &str,
        soap_action: Option<String>,
    ) -> Result<String> {
        let mut request = self
            .http
            .post(&self.config.endpoint)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .header(reqwest::header::ACCEPT, "*/*")
            .body(body);
        if let Some(action) = soap_action {
            request = request.header("SOAPAction", action);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// `Login` - obtain a session ticket.
    ///
    /// Returns an empty string when the response carries no `LoginResult`.
    pub async fn login(&self) -> Result<String> {
        let body = envelope::login(&self.config.username, &self.config.password);
        let xml = self.post_soap(body, SOAP12_CONTENT_TYPE, None).await?;
        let ticket = response::find_text(&xml, "LoginResult").unwrap_or_default();
        tracing::info!(ticket = %mask_ticket(&ticket), "XDS login completed");
        Ok(ticket)
    }

    /// `IsTicketValid` - textual validity result for a ticket.
    pub async fn is_ticket_valid(&self, ticket: &str) -> Result<String> {
        let body = envelope::is_ticket_valid(ticket);
        let xml = self.post_soap(body, SOAP12_CONTENT_TYPE, None).await?;
        Ok(response::find_text(&xml, "IsTicketValidResult").unwrap_or_default())
    }

    /// `ConnectConsumerMatchDOVS` - match a consumer by ID number and
    /// cellphone, yielding the session correlation identifiers.
    pub async fn match_consumer(
        &self,
        ticket: &str,
        id_number: &str,
        cell_number: &str,
        reference: &str,
        voucher_code: &str,
    ) -> Result<ConsumerMatch> {
        let body = envelope::consumer_match(
            ticket,
            &self.config.product_id,
            id_number,
            cell_number,
            reference,
            voucher_code,
        );
        let outer = self.post_soap(body, SOAP12_CONTENT_TYPE, None).await?;
        let inner = response::find_text(&outer, "ConnectConsumerMatchDOVSResult")
            .ok_or_else(|| {
                BridgeError::Soap("response carries no ConnectConsumerMatchDOVSResult".to_string())
            })?;

        Ok(ConsumerMatch {
            enquiry_id: response::find_text(&inner, "EnquiryID"),
            enquiry_result_id: response::find_text(&inner, "EnquiryResultID"),
            summary: ConsumerSummary::parse(&inner),
            xml: inner,
        })
    }

    /// `ConnectDOVRequest` - start the facial-match session.
    ///
    /// The upstream product sends the consumer an SMS link; the returned
    /// string is that link (empty when the request was not accepted).
    /// `RedirectURL` is sent blank per the upstream production spec.
    pub async fn request_facial_verification(
        &self,
        ticket: &str,
        enquiry_id: &str,
        enquiry_result_id: &str,
    ) -> Result<String> {
        let body = envelope::dov_request(
            ticket,
            enquiry_id,
            enquiry_result_id,
            &self.config.product_id,
            "",
        );
        let xml = self.post_soap(body, SOAP12_CONTENT_TYPE, None).await?;
        Ok(response::find_text(&xml, "ConnectDOVRequestResult").unwrap_or_default())
    }

    /// `ConnectGetDOVResult` - fetch the session result document.
    ///
    /// Returns the inner result XML; while the session is pending the
    /// document contains a `<NoResult>` placeholder.
    pub async fn get_dov_result(&self, ticket: &str, enquiry_id: &str) -> Result<String> {
        let body = envelope::get_dov_result(ticket, enquiry_id);
        let xml = self
            .post_soap(
                body,
                SOAP11_CONTENT_TYPE,
                Some(envelope::get_dov_result_action()),
            )
            .await?;
        Ok(response::find_text(&xml, "ConnectGetDOVResultResult").unwrap_or_default())
    }

    /// Poll `ConnectGetDOVResult` until a conclusive document arrives or
    /// the attempt budget is exhausted.
    pub async fn poll_dov_result(
        &self,
        ticket: &str,
        enquiry_id: &str,
        poll: &PollConfig,
    ) -> PollResult<String> {
        tracing::info!(enquiry_id, "Polling for DOV result");
        Poller::new(poll.clone())
            .run(
                || self.get_dov_result(ticket, enquiry_id),
                |xml| !xml.is_empty() && !response::is_no_result(xml),
            )
            .await
    }
}

/// Shorten a ticket for log output.
pub fn mask_ticket(ticket: &str) -> String {
    if ticket.is_empty() {
        return "None".to_string();
    }
    if ticket.len() <= 16 {
        return "***".to_string();
    }
    format!("{}...{}", &ticket[..8], &ticket[ticket.len() - 8..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_ticket() {
        assert_eq!(mask_ticket(""), "None");
        assert_eq!(mask_ticket("short"), "***");
        assert_eq!(
            mask_ticket("ABCDEFGH-0123456789-STUVWXYZ"),
            "ABCDEFGH...STUVWXYZ"
        );
    }

    #[test]
    fn test_enquiry_ids_require_both() {
        let matched = ConsumerMatch {
            xml: String::new(),
            enquiry_id: Some("152".to_string()),
            enquiry_result_id: None,
            summary: None,
        };
        assert_eq!(matched.enquiry_ids(), None);

        let matched = ConsumerMatch {
            xml: String::new(),
            enquiry_id: Some("152".to_string()),
            enquiry_result_id: Some("8871".to_string()),
            summary: None,
        };
        assert_eq!(matched.enquiry_ids(), Some(("152", "8871")));
    }
}
