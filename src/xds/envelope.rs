//! SOAP envelope builders for the XDS Connect operations
//!
//! All operations use SOAP 1.2 envelopes except `ConnectGetDOVResult`,
//! which the upstream service serves over SOAP 1.1 with a `SOAPAction`
//! header. Text values are XML-escaped before interpolation.

use quick_xml::escape::escape;

/// XML namespace of the XDS Connect operations
pub const XDS_NAMESPACE: &str = "http://www.web.xds.co.za/XDSConnectWS";

fn soap12(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap12:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                 xmlns:xsd="http://www.w3.org/2001/XMLSchema"
                 xmlns:soap12="http://www.w3.org/2003/05/soap-envelope">
  <soap12:Body>
{inner}
  </soap12:Body>
</soap12:Envelope>"#
    )
}

fn soap11(inner: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
               xmlns:xsd="http://www.w3.org/2001/XMLSchema"
               xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
  <soap:Body>
{inner}
  </soap:Body>
</soap:Envelope>"#
    )
}

pub fn login(username: &str, password: &str) -> String {
    soap12(&format!(
        r#"    <Login xmlns="{XDS_NAMESPACE}">
      <strUser>{}</strUser>
      <strPwd>{}</strPwd>
    </Login>"#,
        escape(username),
        escape(password),
    ))
}

pub fn is_ticket_valid(ticket: &str) -> String {
    soap12(&format!(
        r#"    <IsTicketValid xmlns="{XDS_NAMESPACE}">
      <XDSConnectTicket>{}</XDSConnectTicket>
    </IsTicketValid>"#,
        escape(ticket),
    ))
}

pub fn consumer_match(
    ticket: &str,
    product_id: &str,
    id_number: &str,
    cell_number: &str,
    reference: &str,
    voucher_code: &str,
) -> String {
    soap12(&format!(
        r#"    <ConnectConsumerMatchDOVS xmlns="{XDS_NAMESPACE}">
      <ConnectTicket>{}</ConnectTicket>
      <ProductId>{}</ProductId>
      <IdNumber>{}</IdNumber>
      <CellNumber>{}</CellNumber>
      <YourReference>{}</YourReference>
      <VoucherCode>{}</VoucherCode>
    </ConnectConsumerMatchDOVS>"#,
        escape(ticket),
        escape(product_id),
        escape(id_number),
        escape(cell_number),
        escape(reference),
        escape(voucher_code),
    ))
}

pub fn dov_request(
    ticket: &str,
    enquiry_id: &str,
    enquiry_result_id: &str,
    product_id: &str,
    redirect_url: &str,
) -> String {
    soap12(&format!(
        r#"    <ConnectDOVRequest xmlns="{XDS_NAMESPACE}">
      <ConnectTicket>{}</ConnectTicket>
      <EnquiryID>{}</EnquiryID>
      <EnquiryResultID>{}</EnquiryResultID>
      <ProductID>{}</ProductID>
      <RedirectURL>{}</RedirectURL>
    </ConnectDOVRequest>"#,
        escape(ticket),
        escape(enquiry_id),
        escape(enquiry_result_id),
        escape(product_id),
        escape(redirect_url),
    ))
}

pub fn get_dov_result(ticket: &str, enquiry_id: &str) -> String {
    soap11(&format!(
        r#"    <ConnectGetDOVResult xmlns="{XDS_NAMESPACE}">
      <ConnectTicket>{}</ConnectTicket>
      <EnquiryID>{}</EnquiryID>
    </ConnectGetDOVResult>"#,
        escape(ticket),
        escape(enquiry_id),
    ))
}

/// SOAPAction header value for `ConnectGetDOVResult`
pub fn get_dov_result_action() -> String {
    format!("{XDS_NAMESPACE}/ConnectGetDOVResult")
}
