//! SOAP 1.1 envelopes for the Ad Manager API
//!
//! Every request carries a `RequestHeader` with the network code and the
//! application name. Results come back as
//! `<soap:Body><{operation}Response><rval>...</rval></...></soap:Body>`.

use anyhow::{Context, Result};
use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;
use serde::Serialize;
use serde::de::DeserializeOwned;

const SOAP_ENVELOPE_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const PUBLISHER_NS: &str = "https://www.google.com/apis/ads/publisher/";

/// Target namespace of one API version, e.g. `.../publisher/v202405`
pub fn namespace(api_version: &str) -> String {
    format!("{}{}", PUBLISHER_NS, api_version)
}

/// Values sent in the SOAP header of every request
#[derive(Debug, Clone, Copy)]
pub struct RequestHeader<'a> {
    pub network_code: &'a str,
    pub application_name: &'a str,
}

/// Build the envelope for `operation` with `body` as its parameters
pub fn request_envelope<B: Serialize>(
    namespace: &str,
    header: RequestHeader<'_>,
    operation: &str,
    body: &B,
) -> Result<String> {
    let body_xml = quick_xml::se::to_string_with_root(operation, body)
        .with_context(|| format!("Failed to serialize {} request", operation))?;

    Ok(format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8"?>"#,
            r#"<soapenv:Envelope xmlns:soapenv="{soap}" xmlns:xsi="{xsi}" xmlns="{ns}">"#,
            "<soapenv:Header><RequestHeader>",
            "<networkCode>{network_code}</networkCode>",
            "<applicationName>{application_name}</applicationName>",
            "</RequestHeader></soapenv:Header>",
            "<soapenv:Body>{body}</soapenv:Body>",
            "</soapenv:Envelope>"
        ),
        soap = SOAP_ENVELOPE_NS,
        xsi = XSI_NS,
        ns = escape(namespace),
        network_code = escape(header.network_code),
        application_name = escape(header.application_name),
        body = body_xml,
    ))
}

/// Decode the `rval` of a response envelope
///
/// Returns `Ok(None)` when the operation response has no `rval`.
pub fn response_value<T: DeserializeOwned>(xml: &str) -> Result<Option<T>> {
    let body = element_content(xml, b"Body")?.context("Response has no SOAP body")?;
    let Some(rval) = element_content(body, b"rval")? else {
        return Ok(None);
    };

    let value = quick_xml::de::from_str(&format!("<rval>{}</rval>", rval))
        .context("Failed to decode rval")?;
    Ok(Some(value))
}

/// Human-readable message of a SOAP fault, if the document is one
pub fn fault_string(xml: &str) -> Option<String> {
    let raw = element_content(xml, b"faultstring").ok().flatten()?;
    let message = unescape(raw)
        .map(|m| m.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let message = message.trim();
    (!message.is_empty()).then(|| message.to_string())
}

/// Raw inner XML of the first element with the given local name
fn element_content<'a>(xml: &'a str, local_name: &[u8]) -> Result<Option<&'a str>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().context("Malformed XML")? {
            Event::Start(start) if start.local_name().as_ref() == local_name => {
                let end = start.to_end();
                let span = reader.read_to_end(end.name()).context("Malformed XML")?;
                return Ok(xml.get(span.start as usize..span.end as usize));
            }
            Event::Empty(start) if start.local_name().as_ref() == local_name => {
                return Ok(Some(""));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}
