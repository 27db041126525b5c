//! XML-RPC codec limited to what `pingback.ping` needs.
//!
//! Only `string` values are produced. On input, untyped `<value>` content is
//! read as a string (the XML-RPC default type); any other value type is
//! rejected. The codec is a pure syntax layer and does not interpret method
//! names or parameter counts.

use thiserror::Error;

use super::xml::{self, Element, XmlError};

/// Method name of the only call this service understands.
pub const PINGBACK_METHOD: &str = "pingback.ping";

const PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// A decoded `methodCall` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method_name: String,
    pub params: Vec<String>,
}

/// A decoded `methodResponse` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResponse {
    Success(String),
    Fault { code: i32, message: String },
}

/// Errors produced while decoding XML-RPC payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlRpcError {
    #[error("malformed XML-RPC payload: {0}")]
    Malformed(String),
}

impl From<XmlError> for XmlRpcError {
    fn from(e: XmlError) -> Self {
        Self::Malformed(e.to_string())
    }
}

fn malformed(reason: impl Into<String>) -> XmlRpcError {
    XmlRpcError::Malformed(reason.into())
}

/// Encodes a `methodCall` with one `string` value per parameter, in order.
pub fn encode_method_call<S: AsRef<str>>(method_name: &str, params: &[S]) -> Vec<u8> {
    let mut out = String::from(PROLOG);
    out.push_str("<methodCall><methodName>");
    xml::escape(method_name, &mut out);
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param><value><string>");
        xml::escape(param.as_ref(), &mut out);
        out.push_str("</string></value></param>");
    }
    out.push_str("</params></methodCall>");
    out.into_bytes()
}

/// Decodes a `methodCall` document.
///
/// # Errors
///
/// Returns [`XmlRpcError::Malformed`] if the payload is not well-formed XML,
/// the root is not `methodCall`, `methodName` is missing or empty, or a
/// parameter holds a non-string value.
pub fn decode_method_call(input: &[u8]) -> Result<MethodCall, XmlRpcError> {
    let root = xml::parse(input)?;
    if root.name != "methodCall" {
        return Err(malformed(format!(
            "root element is <{}>, expected <methodCall>",
            root.name
        )));
    }

    let method_name = root
        .child("methodName")
        .map(|element| element.text().trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| malformed("missing methodName"))?;

    let mut params = Vec::new();
    if let Some(list) = root.child("params") {
        for param in list.children_named("param") {
            let value = param
                .child("value")
                .ok_or_else(|| malformed("param without value"))?;
            params.push(string_value(value)?);
        }
    }

    Ok(MethodCall {
        method_name,
        params,
    })
}

/// Encodes a successful `methodResponse` carrying a single string.
pub fn encode_success(value: &str) -> Vec<u8> {
    let mut out = String::from(PROLOG);
    out.push_str("<methodResponse><params><param><value><string>");
    xml::escape(value, &mut out);
    out.push_str("</string></value></param></params></methodResponse>");
    out.into_bytes()
}

/// Encodes a `methodResponse` fault.
pub fn encode_fault(code: i32, message: &str) -> Vec<u8> {
    let mut out = String::from(PROLOG);
    out.push_str("<methodResponse><fault><value><struct>");
    out.push_str("<member><name>faultCode</name><value><int>");
    out.push_str(&code.to_string());
    out.push_str("</int></value></member>");
    out.push_str("<member><name>faultString</name><value><string>");
    xml::escape(message, &mut out);
    out.push_str("</string></value></member>");
    out.push_str("</struct></value></fault></methodResponse>");
    out.into_bytes()
}

/// Encodes either kind of response.
pub fn encode_response(response: &MethodResponse) -> Vec<u8> {
    match response {
        MethodResponse::Success(value) => encode_success(value),
        MethodResponse::Fault { code, message } => encode_fault(*code, message),
    }
}

/// Decodes a `methodResponse` returned by a remote endpoint.
///
/// # Errors
///
/// Returns [`XmlRpcError::Malformed`] if the document is not a
/// `methodResponse` with either a string parameter or a fault struct.
pub fn decode_method_response(input: &[u8]) -> Result<MethodResponse, XmlRpcError> {
    let root = xml::parse(input)?;
    if root.name != "methodResponse" {
        return Err(malformed(format!(
            "root element is <{}>, expected <methodResponse>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let fields = fault
            .child("value")
            .and_then(|value| value.child("struct"))
            .ok_or_else(|| malformed("fault without struct"))?;

        let mut code = None;
        let mut message = String::new();
        for member in fields.children_named("member") {
            let name = member.child("name").map(|n| n.text()).unwrap_or_default();
            let Some(value) = member.child("value") else {
                continue;
            };
            match name.trim() {
                "faultCode" => code = Some(int_value(value)?),
                "faultString" => message = string_value(value)?,
                _ => {}
            }
        }

        let code = code.ok_or_else(|| malformed("fault without faultCode"))?;
        return Ok(MethodResponse::Fault { code, message });
    }

    let value = root
        .child("params")
        .and_then(|params| params.child("param"))
        .and_then(|param| param.child("value"))
        .ok_or_else(|| malformed("response has neither params nor fault"))?;

    Ok(MethodResponse::Success(string_value(value)?))
}

fn string_value(value: &Element) -> Result<String, XmlRpcError> {
    let mut typed = value.elements();
    match (typed.next(), typed.next()) {
        (None, _) => Ok(value.text()),
        (Some(inner), None) if inner.name == "string" => Ok(inner.text()),
        (Some(inner), None) => Err(malformed(format!(
            "unsupported value type <{}>",
            inner.name
        ))),
        _ => Err(malformed("value holds more than one element")),
    }
}

fn int_value(value: &Element) -> Result<i32, XmlRpcError> {
    let raw = match value.elements().next() {
        None => value.text(),
        Some(inner) if inner.name == "int" || inner.name == "i4" => inner.text(),
        Some(inner) => {
            return Err(malformed(format!(
                "expected an integer, found <{}>",
                inner.name
            )));
        }
    };

    raw.trim()
        .parse()
        .map_err(|_| malformed(format!("invalid integer {:?}", raw.trim())))
}
