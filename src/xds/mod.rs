//! SOAP client for the XDS Connect web service
//!
//! The upstream Digital Onboarding Verification product is exposed as a
//! SOAP/XML WSDL. This module builds the request envelopes, posts them, and
//! parses the responses:
//!
//! - `Login` / `IsTicketValid` - session ticket handling
//! - `ConnectConsumerMatchDOVS` - ID number + cellphone consumer match
//! - `ConnectDOVRequest` - starts the facial-match session (SMS link)
//! - `ConnectGetDOVResult` - polls for the asynchronous session result

mod client;
mod envelope;
mod response;

pub use client::{mask_ticket, ConsumerMatch, XdsClient, XdsConfig};
pub use response::{extract_photos, find_text, is_no_result, ConsumerSummary};
