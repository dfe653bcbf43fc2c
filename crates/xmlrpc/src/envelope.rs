//! # Envelopes
//!
//! Request and response framing around encoded values.
//!
//! - Call: `<methodCall><methodName>m</methodName><params><param><value>..</value></param>..</params></methodCall>`
//! - Response: `<methodResponse><params><param><value>..</value></param></params></methodResponse>`
//! - Fault: `<methodResponse><fault><value><struct>faultCode, faultString</struct></value></fault></methodResponse>`

use xmlpack::Decoder;
use xmlpack::EncodeOptions;
use xmlpack::Encoder;
use xmlpack::Malformed;
use xmlpack::TokenKind;
use xmlpack::Unsupported;
use xmlpack::Value;

use crate::error::Result;

/// A decoded method call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub params: Vec<Value>,
}

/// Method names are written verbatim, so they are restricted to
/// identifier-safe characters.
pub fn check_method_name(method: &str) -> Result<()> {
    let valid = !method.is_empty()
        && method.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '/'));
    if valid {
        Ok(())
    } else {
        Err(Unsupported::InvalidMethodName(method.to_string()).into())
    }
}

/// Encodes a method call with the default options.
pub fn encode_call(method: &str, params: &[Value]) -> Result<String> {
    encode_call_with(method, params, &EncodeOptions::default())
}

/// Encodes a method call.
///
/// Every parameter is checked before any markup is written.
pub fn encode_call_with(method: &str, params: &[Value], options: &EncodeOptions) -> Result<String> {
    check_method_name(method)?;
    for param in params {
        xmlpack::check_value(param)?;
    }

    let mut enc = Encoder::with_options(*options);
    enc.prolog();
    enc.open("methodCall");
    enc.open("methodName");
    enc.text(method);
    enc.close("methodName");
    enc.open("params");
    for param in params {
        enc.open("param");
        enc.value(param)?;
        enc.close("param");
    }
    enc.close("params");
    enc.close("methodCall");
    Ok(enc.into_string())
}

/// Decodes a method call document, the server side of `encode_call`.
pub fn decode_call(document: &str) -> Result<Call> {
    let mut dec = Decoder::new(document);
    dec.expect_open("methodCall")?;
    dec.expect_open("methodName")?;
    let method = xmlpack::unescape(dec.text_content("methodName")?.trim()).into_owned();

    let mut params = Vec::new();
    match dec.next_element()? {
        Some(tok) if tok.kind == TokenKind::Open("params") => {
            loop {
                match dec.next_element()? {
                    Some(tok) if tok.kind == TokenKind::Open("param") => {
                        params.push(dec.value_element()?);
                        dec.expect_close("param")?;
                    }
                    Some(tok) if tok.kind == TokenKind::Close("params") => break,
                    Some(tok) => {
                        return Err(Malformed::UnexpectedTag {
                            expected: "param".to_string(),
                            found: tok.describe(),
                            pos: tok.pos,
                        }
                        .into());
                    }
                    None => return Err(Malformed::Unterminated("params".to_string()).into()),
                }
            }
            dec.expect_close("methodCall")?;
        }
        Some(tok) if tok.kind == TokenKind::Close("methodCall") => {}
        Some(tok) => {
            return Err(Malformed::UnexpectedTag {
                expected: "params".to_string(),
                found: tok.describe(),
                pos: tok.pos,
            }
            .into());
        }
        None => return Err(Malformed::Unterminated("methodCall".to_string()).into()),
    }

    dec.finish()?;
    Ok(Call { method, params })
}

/// Encodes a successful single-value response.
pub fn encode_response(value: &Value) -> Result<String> {
    encode_response_with(value, &EncodeOptions::default())
}

pub fn encode_response_with(value: &Value, options: &EncodeOptions) -> Result<String> {
    let mut enc = Encoder::with_options(*options);
    enc.prolog();
    enc.open("methodResponse");
    enc.open("params");
    enc.open("param");
    enc.value(value)?;
    enc.close("param");
    enc.close("params");
    enc.close("methodResponse");
    Ok(enc.into_string())
}

/// Encodes a fault response with the conventional `faultCode`/`faultString` struct.
pub fn encode_fault(code: i64, message: &str) -> String {
    let mut enc = Encoder::new();
    enc.prolog();
    enc.open("methodResponse");
    enc.open("fault");
    enc.open("value");
    enc.open("struct");

    enc.open("member");
    enc.open("name");
    enc.text("faultCode");
    enc.close("name");
    enc.int_value(code);
    enc.close("member");

    enc.open("member");
    enc.open("name");
    enc.text("faultString");
    enc.close("name");
    enc.string_value(message);
    enc.close("member");

    enc.close("struct");
    enc.close("value");
    enc.close("fault");
    enc.close("methodResponse");
    enc.into_string()
}
