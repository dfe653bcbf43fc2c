use xmlpack::Malformed;
use xmlpack::Unsupported;
use xmlpack::Value;

use crate::*;

// ============================================================================
//  CALL ENVELOPE
// ============================================================================

#[test]
fn test_encode_call_ping() -> Result<()> {
    let doc = encode_call("ping", &[Value::Integer(42), Value::from("a&b")])?;
    assert_eq!(
        doc,
        "<?xml version=\"1.0\"?><methodCall><methodName>ping</methodName><params>\
         <param><value><int>42</int></value></param>\
         <param><value><string>a&amp;b</string></value></param>\
         </params></methodCall>"
    );
    Ok(())
}

#[test]
fn test_call_roundtrip() -> Result<()> {
    let params = vec![
        Value::Integer(-3),
        Value::Double(2.5),
        Value::Array(vec![]),
        Value::from_iter([("login", Value::from("admin")), ("login", Value::from("guest"))]),
    ];
    let doc = encode_call("object.execute_kw", &params)?;
    let call = decode_call(&doc)?;

    assert_eq!(call.method, "object.execute_kw");
    assert_eq!(call.params, params);
    Ok(())
}

#[test]
fn test_call_without_params() -> Result<()> {
    let doc = encode_call("system.listMethods", &[])?;
    assert!(decode_call(&doc)?.params.is_empty());

    let call = decode_call("<methodCall><methodName>version</methodName></methodCall>")?;
    assert_eq!(call, Call { method: "version".into(), params: vec![] });
    Ok(())
}

#[test]
fn test_invalid_method_name() {
    let err = encode_call("drop <table>", &[]).unwrap_err();
    assert_eq!(err, Error::Unsupported(Unsupported::InvalidMethodName("drop <table>".into())));

    assert!(encode_call("", &[]).is_err());
}

#[test]
fn test_unsupported_param() {
    let err = encode_call("ok", &[Value::Integer(1), Value::Double(f64::NAN)]).unwrap_err();
    assert!(matches!(err, Error::Unsupported(Unsupported::NonFiniteDouble(_))));
}

#[test]
fn test_nil_policy_in_call() -> Result<()> {
    let explicit = EncodeOptions::default().with_nil(NilPolicy::Explicit);
    let doc = encode_call_with("set", &[Value::Nil], &explicit)?;
    assert!(doc.contains("<value><nil/></value>"));
    assert_eq!(decode_call(&doc)?.params, vec![Value::Nil]);

    let doc = encode_call("set", &[Value::Nil])?;
    assert!(doc.contains("<value><boolean>0</boolean></value>"));
    Ok(())
}

// ============================================================================
//  RESPONSE SCANNER
// ============================================================================

#[test]
fn test_scan_success() -> Result<()> {
    let doc = r#"<?xml version="1.0"?>
<methodResponse>
  <params>
    <param>
      <value><struct>
        <member><name>uid</name><value><int>2</int></value></member>
      </struct></value>
    </param>
  </params>
</methodResponse>"#;

    let value = scan_response(doc)?.into_result().expect("success");
    assert_eq!(value.get("uid"), Some(&Value::Integer(2)));
    Ok(())
}

#[test]
fn test_scan_bare_string_result() -> Result<()> {
    let doc = "<methodResponse><params><param><value> pong </value></param></params></methodResponse>";
    assert_eq!(scan_response(doc)?, Outcome::Success(Value::from("pong")));
    Ok(())
}

#[test]
fn test_ping_response_collected() -> Result<()> {
    // The two call parameters, collected into one array and sent back as a result.
    let call = decode_call(&encode_call("ping", &[Value::Integer(42), Value::from("a&b")])?)?;
    let doc = encode_response(&Value::Array(call.params))?;

    assert_eq!(
        scan_response(&doc)?,
        Outcome::Success(Value::Array(vec![Value::Integer(42), Value::from("a&b")]))
    );
    Ok(())
}

#[test]
fn test_scan_fault() -> Result<()> {
    let doc = encode_fault(3, "Access <denied>");
    let outcome = scan_response(&doc)?;
    assert_eq!(
        outcome,
        Outcome::Fault(Fault { code: Some(3), message: "Access <denied>".into() })
    );
    Ok(())
}

#[test]
fn test_fault_precedence() -> Result<()> {
    let doc = "<methodResponse>\
        <params><param><value><int>1</int></value></param></params>\
        <fault><value><struct>\
        <member><name>faultString</name><value><string>boom</string></value></member>\
        </struct></value></fault>\
        </methodResponse>";

    match scan_response(doc)? {
        Outcome::Fault(fault) => assert_eq!(fault.message, "boom"),
        other => panic!("expected fault, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_fault_first_string() -> Result<()> {
    let doc = "<methodResponse><fault><value><struct>\
        <member><name>code</name><value><i4>7</i4></value></member>\
        <member><name>detail</name><value><array><data><value>nested reason</value></data></array></value></member>\
        </struct></value></fault></methodResponse>";

    let outcome = scan_response(doc)?;
    assert_eq!(outcome, Outcome::Fault(Fault { code: None, message: "nested reason".into() }));
    Ok(())
}

#[test]
fn test_fault_without_message() -> Result<()> {
    let doc = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><int>1</int></value></member>\
        </struct></value></fault></methodResponse>";
    let outcome = scan_response(doc)?;
    assert_eq!(outcome, Outcome::Fault(Fault { code: Some(1), message: NO_FAULT_MESSAGE.into() }));

    let outcome = scan_response("<methodResponse><fault/></methodResponse>")?;
    assert_eq!(outcome, Outcome::Fault(Fault { code: None, message: NO_FAULT_MESSAGE.into() }));
    Ok(())
}

#[test]
fn test_fault_unparsable_value() -> Result<()> {
    let doc = "<methodResponse><fault><value><struct>\
        <member><value>server exploded</value></member>\
        </struct></value></fault></methodResponse>";
    let outcome = scan_response(doc)?;
    assert_eq!(outcome, Outcome::Fault(Fault { code: None, message: "server exploded".into() }));
    Ok(())
}

#[test]
fn test_fault_with_unknown_member_type() -> Result<()> {
    let doc = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><int>4</int></value></member>\
        <member><name>when</name><value><dateTime.iso8601>20260101T00:00:00</dateTime.iso8601></value></member>\
        <member><name>faultString</name><value><string>Access denied</string></value></member>\
        </struct></value></fault></methodResponse>";

    let outcome = scan_response(doc)?;
    assert_eq!(outcome, Outcome::Fault(Fault { code: Some(4), message: "Access denied".into() }));
    Ok(())
}

#[test]
fn test_fault_salvage_skips_member_names() -> Result<()> {
    let doc = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><base64>AAAA</base64></value></member>\
        <member><name>reason</name><value>quota exceeded</value></member>\
        </struct></value></fault></methodResponse>";

    let outcome = scan_response(doc)?;
    assert_eq!(outcome, Outcome::Fault(Fault { code: None, message: "quota exceeded".into() }));
    Ok(())
}

#[test]
fn test_encode_fault_document() {
    assert_eq!(
        encode_fault(3, "a&b"),
        "<?xml version=\"1.0\"?><methodResponse><fault><value><struct>\
         <member><name>faultCode</name><value><int>3</int></value></member>\
         <member><name>faultString</name><value><string>a&amp;b</string></value></member>\
         </struct></value></fault></methodResponse>"
    );
}

#[test]
fn test_scan_malformed() {
    let cases: [(&str, Malformed); 4] = [
        ("", Malformed::MissingElement("methodResponse")),
        ("<methodResponse></methodResponse>", Malformed::MissingElement("params")),
        ("<methodResponse><params></params></methodResponse>", Malformed::MissingElement("param")),
        ("<html><body>502 Bad Gateway</body></html>", Malformed::MissingElement("methodResponse")),
    ];

    for (doc, expected) in cases {
        assert_eq!(scan_response(doc).unwrap_err(), Error::Malformed(expected), "doc: {:?}", doc);
    }
}

#[test]
fn test_scan_unterminated_array() {
    let doc = "<methodResponse><params><param><value><array><data>\
        <value><int>1</int></value>\
        <value><array><data><value><int>2</int></value>\
        </data></array></value></param></params></methodResponse>";

    let err = scan_response(doc).unwrap_err();
    assert!(matches!(err, Error::Malformed(_)), "got {:?}", err);
}

#[test]
fn test_scan_reads_first_param_only() -> Result<()> {
    let doc = "<methodResponse><params>\
        <param><value><int>1</int></value></param>\
        <param><value><int>2</int></value></param>\
        <param><value><base64>AAAA</base64></value></param>\
        </params></methodResponse>";
    assert_eq!(scan_response(doc)?, Outcome::Success(Value::Integer(1)));
    Ok(())
}

#[test]
fn test_scan_truncated_response() {
    let head = "<methodResponse><params><param><value><int>1</int></value>";
    let cases = [
        (head.to_string(), Malformed::Unterminated("param".into())),
        (format!("{}</param>", head), Malformed::Unterminated("params".into())),
        (format!("{}</param></params>", head), Malformed::Unterminated("methodResponse".into())),
        (format!("{}</param><param><value>2</value>", head), Malformed::Unterminated("param".into())),
    ];

    for (doc, expected) in cases {
        assert_eq!(scan_response(&doc).unwrap_err(), Error::Malformed(expected), "doc: {:?}", doc);
    }
}

#[test]
fn test_scan_trailing_content() {
    let doc = "<methodResponse><params><param><value>1</value></param></params></methodResponse><extra/>";
    let err = scan_response(doc).unwrap_err();
    assert!(matches!(err, Error::Malformed(Malformed::TrailingContent(_))), "got {:?}", err);
}

#[test]
fn test_error_display() {
    let err = Error::Fault(Fault { code: Some(2), message: "denied".into() });
    assert_eq!(err.to_string(), "remote fault: [2] denied");

    let err = Error::from(TransportError::Timeout);
    assert_eq!(err.to_string(), "transport failure: request timed out");
}
