//! SOAP 1.1 style endpoint at `POST /NorthwindService/basichttp`.
//!
//! Supports the `GetCustomersByCountry(country)` and
//! `GetOrdersByCustomer(customerId)` operations of the `http://tempuri.org/`
//! contract. The request body is scanned for the first element inside
//! `Body` (the operation) and its first child element (the argument);
//! namespace prefixes are ignored. Responses are hand-built envelopes.

use std::fmt::Write as _;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::NaiveDateTime;
use northwind_core::{Customer, Order};

use crate::state::AppState;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const SERVICE_NS: &str = "http://tempuri.org/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const CONTENT_TYPE: &str = "text/xml; charset=utf-8";
const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Operation named in a SOAP request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapCall {
    GetCustomersByCountry { country: String },
    GetOrdersByCustomer { customer_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapParseError {
    MissingBody,
    MissingOperation,
    UnknownOperation(String),
}

impl std::fmt::Display for SoapParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBody => f.write_str("SOAP envelope has no Body element"),
            Self::MissingOperation => f.write_str("SOAP Body has no operation element"),
            Self::UnknownOperation(name) => write!(f, "Unknown operation `{name}`"),
        }
    }
}

pub async fn soap_endpoint(State(state): State<AppState>, body: String) -> Response {
    let call = match parse_request(&body) {
        Ok(call) => call,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected SOAP request");
            return fault_response(&e.to_string());
        }
    };

    let envelope = match call {
        SoapCall::GetCustomersByCountry { country } => {
            let customers = state.northwind.customers_by_country(&country).await;
            customers_envelope(&customers)
        }
        SoapCall::GetOrdersByCustomer { customer_id } => {
            let orders = state.northwind.orders_by_customer(&customer_id).await;
            orders_envelope(&orders)
        }
    };

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], envelope).into_response()
}

/// Extracts the operation and its argument from a SOAP envelope.
pub fn parse_request(xml: &str) -> Result<SoapCall, SoapParseError> {
    let mut pos = 0;
    let body = loop {
        let tag = next_start_tag(xml, pos).ok_or(SoapParseError::MissingBody)?;
        if tag.local_name == "Body" {
            break tag;
        }
        pos = tag.end;
    };
    if body.self_closing {
        return Err(SoapParseError::MissingOperation);
    }

    let operation = next_start_tag(xml, body.end).ok_or(SoapParseError::MissingOperation)?;
    let argument = if operation.self_closing {
        String::new()
    } else {
        first_child_text(xml, operation.end)
    };

    match operation.local_name {
        "GetCustomersByCountry" => Ok(SoapCall::GetCustomersByCountry { country: argument }),
        "GetOrdersByCustomer" => Ok(SoapCall::GetOrdersByCustomer {
            customer_id: argument,
        }),
        other => Err(SoapParseError::UnknownOperation(other.to_string())),
    }
}

struct StartTag<'a> {
    local_name: &'a str,
    self_closing: bool,
    /// Byte offset just past the closing `>`.
    end: usize,
}

/// Finds the next opening (or self-closing) element at or after `from`,
/// skipping declarations, comments, CDATA sections and closing tags.
fn next_start_tag(xml: &str, from: usize) -> Option<StartTag<'_>> {
    let mut pos = from;
    loop {
        let lt = pos + xml.get(pos..)?.find('<')?;
        let rest = &xml[lt..];

        // Sections whose content may itself contain `>`.
        if let Some(section) = [(CDATA_OPEN, CDATA_CLOSE), ("<!--", "-->")]
            .into_iter()
            .find(|(open, _)| rest.starts_with(*open))
        {
            let (open, close) = section;
            pos = lt + open.len() + rest[open.len()..].find(close)? + close.len();
            continue;
        }

        let gt = lt + rest.find('>')?;
        let inner = &xml[lt + 1..gt];

        if inner.starts_with(['?', '!', '/']) {
            pos = gt + 1;
            continue;
        }

        let name = inner
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or_default();
        let local_name = name.rsplit(':').next().unwrap_or(name);

        return Some(StartTag {
            local_name,
            self_closing: inner.ends_with('/'),
            end: gt + 1,
        });
    }
}

/// Text of the first child element starting right after `from`, or empty if
/// the parent has no element children.
fn first_child_text(xml: &str, from: usize) -> String {
    let rest = &xml[from..];
    let Some(lt) = rest.find('<') else {
        return String::new();
    };
    if rest[lt..].starts_with("</") || rest[lt..].starts_with(CDATA_OPEN) {
        return String::new();
    }
    let Some(child) = next_start_tag(xml, from + lt) else {
        return String::new();
    };
    if child.self_closing {
        return String::new();
    }

    element_text(&xml[child.end..])
}

/// Character data up to the next markup that is not a CDATA section.
/// Entity and character references are decoded; CDATA is taken verbatim.
fn element_text(mut rest: &str) -> String {
    let mut out = String::new();
    loop {
        if let Some(cdata) = rest.strip_prefix(CDATA_OPEN) {
            let Some(end) = cdata.find(CDATA_CLOSE) else {
                out.push_str(cdata);
                return out;
            };
            out.push_str(&cdata[..end]);
            rest = &cdata[end + CDATA_CLOSE.len()..];
            continue;
        }
        if rest.is_empty() || rest.starts_with('<') {
            return out;
        }
        let end = rest.find('<').unwrap_or(rest.len());
        out.push_str(&unescape(&rest[..end]));
        rest = &rest[end..];
    }
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .and_then(|semi| decode_reference(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            // Not a reference we know; keep the ampersand literally.
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Resolves the body of `&...;`: the five predefined entities plus decimal
/// (`#214`) and hexadecimal (`#xD6`) character references.
fn decode_reference(name: &str) -> Option<char> {
    match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

fn envelope(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\
         <s:Envelope xmlns:s=\"{SOAP_ENV_NS}\"><s:Body>{body}</s:Body></s:Envelope>"
    )
}

fn push_text(out: &mut String, name: &str, value: Option<&str>) {
    match value {
        Some(value) => {
            let _ = write!(out, "<{name}>{}</{name}>", escape(value));
        }
        None => {
            let _ = write!(out, "<{name} i:nil=\"true\"/>");
        }
    }
}

fn push_date(out: &mut String, name: &str, value: Option<NaiveDateTime>) {
    let formatted = value.map(|d| d.format("%Y-%m-%dT%H:%M:%S").to_string());
    push_text(out, name, formatted.as_deref());
}

pub fn customers_envelope(customers: &[Customer]) -> String {
    let mut body = format!(
        "<GetCustomersByCountryResponse xmlns=\"{SERVICE_NS}\">\
         <GetCustomersByCountryResult xmlns:i=\"{XSI_NS}\">"
    );
    for customer in customers {
        body.push_str("<Customer>");
        push_text(&mut body, "CustomerID", Some(&customer.customer_id));
        push_text(&mut body, "CompanyName", Some(&customer.company_name));
        push_text(&mut body, "ContactName", customer.contact_name.as_deref());
        push_text(&mut body, "Country", customer.country.as_deref());
        push_text(&mut body, "Phone", customer.phone.as_deref());
        push_text(&mut body, "Fax", customer.fax.as_deref());
        body.push_str("</Customer>");
    }
    body.push_str("</GetCustomersByCountryResult></GetCustomersByCountryResponse>");
    envelope(&body)
}

pub fn orders_envelope(orders: &[Order]) -> String {
    let mut body = format!(
        "<GetOrdersByCustomerResponse xmlns=\"{SERVICE_NS}\">\
         <GetOrdersByCustomerResult xmlns:i=\"{XSI_NS}\">"
    );
    for order in orders {
        body.push_str("<Order>");
        push_text(&mut body, "OrderID", Some(&order.order_id.to_string()));
        push_text(&mut body, "CustomerID", order.customer_id.as_deref());
        push_date(&mut body, "OrderDate", order.order_date);
        push_date(&mut body, "ShippedDate", order.shipped_date);
        body.push_str("</Order>");
    }
    body.push_str("</GetOrdersByCustomerResult></GetOrdersByCustomerResponse>");
    envelope(&body)
}

fn fault_response(message: &str) -> Response {
    let body = envelope(&format!(
        "<s:Fault><faultcode>s:Client</faultcode>\
         <faultstring xml:lang=\"en-US\">{}</faultstring></s:Fault>",
        escape(message)
    ));
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, CONTENT_TYPE)],
        body,
    )
        .into_response()
}
