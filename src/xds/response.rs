//! XML response parsing for the XDS Connect operations
//!
//! Responses wrap their payload in a `*Result` element whose text is
//! itself an XML document (escaped in transport). Elements are matched by
//! local name so the SOAP namespace prefixes do not matter.

use quick_xml::events::Event;
use quick_xml::Reader;

/// Text content of the first element with the given local name.
///
/// Returns `Some("")` for a present-but-empty element, `None` when the
/// element is absent or the document is malformed.
pub fn find_text(xml: &str, tag: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    let mut inside = false;
    let mut depth = 0u32;
    let mut value = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if inside {
                    depth += 1;
                } else if e.local_name().as_ref() == tag.as_bytes() {
                    inside = true;
                    depth = 0;
                    value.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                if !inside && e.local_name().as_ref() == tag.as_bytes() {
                    return Some(String::new());
                }
            }
            Ok(Event::Text(t)) if inside => {
                value.push_str(t.unescape().ok()?.as_ref());
            }
            Ok(Event::CData(t)) if inside => {
                value.push_str(String::from_utf8_lossy(t.as_ref()).as_ref());
            }
            Ok(Event::End(_)) if inside => {
                if depth == 0 {
                    return Some(value.trim().to_string());
                }
                depth -= 1;
            }
            Ok(Event::Eof) => return None,
            Err(_) => return None,
            _ => {}
        }
    }
}

/// Whether the document contains an element with the given local name.
pub fn has_element(xml: &str, tag: &str) -> bool {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == tag.as_bytes() {
                    return true;
                }
            }
            Ok(Event::Eof) | Err(_) => return false,
            _ => {}
        }
    }
}

/// Whether a DOV result payload is still pending upstream.
pub fn is_no_result(xml: &str) -> bool {
    xml.contains("<NoResult>")
}

/// Consumer details parsed out of a match or DOV result document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsumerSummary {
    pub first_name: String,
    pub second_name: String,
    pub surname: String,
    pub id_number: String,
    pub birth_date: String,
    pub gender: String,
    pub marital_status: String,
    pub cellular_no: String,
    pub email: String,
    pub residential_address: String,
    pub employer: String,
    pub privacy_status: String,
    pub reference_no: String,
}

impl ConsumerSummary {
    /// Parse the `ConsumerDetails` subtree, if present.
    pub fn parse(xml: &str) -> Option<Self> {
        if !has_element(xml, "ConsumerDetails") {
            return None;
        }
        let field = |tag: &str| find_text(xml, tag).unwrap_or_default();
        Some(Self {
            first_name: field("FirstName"),
            second_name: field("SecondName"),
            surname: field("Surname"),
            id_number: field("IDNo"),
            birth_date: field("BirthDate"),
            gender: field("Gender"),
            marital_status: field("MaritalStatusDesc"),
            cellular_no: field("CellularNo"),
            email: field("EmailAddress"),
            residential_address: field("ResidentialAddress"),
            employer: field("EmployerDetail"),
            privacy_status: field("PrivacyStatus"),
            reference_no: field("ReferenceNo"),
        })
    }

    /// First, second, and surname joined with single spaces.
    pub fn full_name(&self) -> String {
        [&self.first_name, &self.second_name, &self.surname]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Base64 photo payloads from a DOV result document.
///
/// Returns `(id_photo, captured_selfie)`; either side may be absent.
pub fn extract_photos(xml: &str) -> (Option<String>, Option<String>) {
    let non_empty = |tag: &str| find_text(xml, tag).filter(|v| !v.is_empty());
    (
        non_empty("ConsumerIDPhoto"),
        non_empty("ConsumerCapturedPhoto"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_RESPONSE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://www.w3.org/2003/05/soap-envelope">
  <soap:Body>
    <LoginResponse xmlns="http://www.web.xds.co.za/XDSConnectWS">
      <LoginResult>ABCD-1234-TICKET</LoginResult>
    </LoginResponse>
  </soap:Body>
</soap:Envelope>"#;

    const MATCH_INNER: &str = r#"<ConsumerMatch>
  <EnquiryID>152</EnquiryID>
  <EnquiryResultID>8871</EnquiryResultID>
  <ConsumerDetails>
    <FirstName>Thandi</FirstName>
    <SecondName></SecondName>
    <Surname>Mokoena</Surname>
    <IDNo>9001015800087</IDNo>
    <BirthDate>1990-01-01</BirthDate>
    <Gender>Female</Gender>
    <MaritalStatusDesc>Single</MaritalStatusDesc>
    <CellularNo>0732563864</CellularNo>
    <EmailAddress>thandi@example.com</EmailAddress>
    <ResidentialAddress>12 Main Rd, Cape Town</ResidentialAddress>
    <EmployerDetail>Acme Ltd</EmployerDetail>
    <PrivacyStatus>None</PrivacyStatus>
    <ReferenceNo>REF-99</ReferenceNo>
  </ConsumerDetails>
</ConsumerMatch>"#;

    #[test]
    fn test_find_text_ignores_namespace_prefix() {
        assert_eq!(
            find_text(LOGIN_RESPONSE, "LoginResult").as_deref(),
            Some("ABCD-1234-TICKET")
        );
    }

    #[test]
    fn test_find_text_absent_element() {
        assert_eq!(find_text(LOGIN_RESPONSE, "IsTicketValidResult"), None);
    }

    #[test]
    fn test_find_text_empty_element() {
        assert_eq!(
            find_text("<a><LoginResult/></a>", "LoginResult").as_deref(),
            Some("")
        );
        assert_eq!(
            find_text("<a><LoginResult></LoginResult></a>", "LoginResult").as_deref(),
            Some("")
        );
    }

    #[test]
    fn test_find_text_unescapes_nested_xml() {
        let outer = "<r><Result>&lt;Inner&gt;ok&lt;/Inner&gt;</Result></r>";
        assert_eq!(
            find_text(outer, "Result").as_deref(),
            Some("<Inner>ok</Inner>")
        );
    }

    #[test]
    fn test_enquiry_ids() {
        assert_eq!(find_text(MATCH_INNER, "EnquiryID").as_deref(), Some("152"));
        assert_eq!(
            find_text(MATCH_INNER, "EnquiryResultID").as_deref(),
            Some("8871")
        );
    }

    #[test]
    fn test_consumer_summary() {
        let summary = ConsumerSummary::parse(MATCH_INNER).expect("details present");
        assert_eq!(summary.full_name(), "Thandi Mokoena");
        assert_eq!(summary.id_number, "9001015800087");
        assert_eq!(summary.email, "thandi@example.com");
        assert_eq!(summary.employer, "Acme Ltd");
    }

    #[test]
    fn test_consumer_summary_absent() {
        assert_eq!(ConsumerSummary::parse("<r><EnquiryID>1</EnquiryID></r>"), None);
    }

    #[test]
    fn test_no_result_detection() {
        assert!(is_no_result("<DOV><NoResult>pending</NoResult></DOV>"));
        assert!(!is_no_result("<DOV><Status>Success</Status></DOV>"));
    }

    #[test]
    fn test_extract_photos() {
        let xml = "<DOV><ConsumerIDPhoto>aWQ=</ConsumerIDPhoto><ConsumerCapturedPhoto>c2VsZmll</ConsumerCapturedPhoto></DOV>";
        let (id_photo, selfie) = extract_photos(xml);
        assert_eq!(id_photo.as_deref(), Some("aWQ="));
        assert_eq!(selfie.as_deref(), Some("c2VsZmll"));

        let (id_photo, selfie) = extract_photos("<DOV><ConsumerIDPhoto></ConsumerIDPhoto></DOV>");
        assert_eq!(id_photo, None);
        assert_eq!(selfie, None);
    }
}
