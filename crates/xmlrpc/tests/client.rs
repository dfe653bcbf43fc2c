//! Client tests over in-process transports.

use std::sync::Arc;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use xmlpack::Malformed;
use xmlpack::Unsupported;
use xmlrpc::Client;
use xmlrpc::Error;
use xmlrpc::Fault;
use xmlrpc::FnTransport;
use xmlrpc::Outcome;
use xmlrpc::Transport;
use xmlrpc::TransportError;
use xmlrpc::Value;
use xmlrpc::transport;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A tiny server: `echo` returns its params as an array, `add` sums
/// integers, `fail` faults, `garbage` replies with non-envelope text.
fn serve(payload: &[u8]) -> transport::Result<Vec<u8>> {
    let text = std::str::from_utf8(payload).map_err(|e| TransportError::Io(e.to_string()))?;
    let call = xmlrpc::decode_call(text).map_err(|e| TransportError::Io(e.to_string()))?;

    let reply = match call.method.as_str() {
        "echo" => xmlrpc::encode_response(&Value::Array(call.params)),
        "add" => {
            let sum = call.params.iter().filter_map(Value::as_i64).sum::<i64>();
            xmlrpc::encode_response(&Value::Integer(sum))
        }
        "fail" => Ok(xmlrpc::encode_fault(42, "nope")),
        "garbage" => Ok("<html>502 Bad Gateway</html>".to_string()),
        other => Ok(xmlrpc::encode_fault(1, &format!("unknown method {}", other))),
    };
    reply.map(String::into_bytes).map_err(|e| TransportError::Io(e.to_string()))
}

fn server_client() -> Client {
    Client::new(Arc::new(FnTransport::new(serve)))
}

/// Records every payload it is asked to send.
struct RecordingTransport {
    sent: Mutex<Vec<Vec<u8>>>,
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn call(&self, payload: &[u8]) -> transport::Result<Vec<u8>> {
        self.sent.lock().map_err(|e| TransportError::Io(e.to_string()))?.push(payload.to_vec());
        serve(payload)
    }
}

struct TimeoutTransport;

#[async_trait::async_trait]
impl Transport for TimeoutTransport {
    async fn call(&self, _payload: &[u8]) -> transport::Result<Vec<u8>> {
        Err(TransportError::Timeout)
    }
}

#[tokio::test]
async fn test_echo_call() -> anyhow::Result<()> {
    init_tracing();
    let client = server_client();

    let value = client.call("echo", &[Value::Integer(42), Value::from("a&b")]).await?;
    assert_eq!(value, Value::Array(vec![Value::Integer(42), Value::from("a&b")]));
    Ok(())
}

#[tokio::test]
async fn test_nested_values_survive_the_trip() -> anyhow::Result<()> {
    init_tracing();
    let client = server_client();

    let record = Value::from_iter([
        ("id", Value::Integer(7)),
        ("tags", Value::Array(vec![Value::from("x"), Value::Array(vec![])])),
        ("meta", Value::Struct(vec![])),
        ("price", Value::Double(-19.99)),
    ]);
    let value = client.call("echo", &[record.clone()]).await?;
    assert_eq!(value, Value::Array(vec![record]));
    Ok(())
}

#[tokio::test]
async fn test_fault_is_an_error() {
    init_tracing();
    let client = server_client();

    let err = client.call("fail", &[]).await.unwrap_err();
    assert_eq!(err, Error::Fault(Fault { code: Some(42), message: "nope".into() }));
}

#[tokio::test]
async fn test_call_outcome_keeps_fault() -> anyhow::Result<()> {
    init_tracing();
    let client = server_client();

    let outcome = client.call_outcome("missing.method", &[]).await?;
    assert_eq!(
        outcome,
        Outcome::Fault(Fault { code: Some(1), message: "unknown method missing.method".into() })
    );
    Ok(())
}

#[tokio::test]
async fn test_malformed_response() {
    init_tracing();
    let client = server_client();

    let err = client.call("garbage", &[]).await.unwrap_err();
    assert_eq!(err, Error::Malformed(Malformed::MissingElement("methodResponse")));
}

#[tokio::test]
async fn test_invalid_utf8_response() {
    init_tracing();
    let client = Client::new(Arc::new(FnTransport::new(|_: &[u8]| Ok(vec![0xFF, 0xFE]))));

    let err = client.call("anything", &[]).await.unwrap_err();
    assert_eq!(err, Error::Malformed(Malformed::InvalidUtf8));
}

#[tokio::test]
async fn test_transport_error() {
    init_tracing();
    let client = Client::new(Arc::new(TimeoutTransport));

    let err = client.call("echo", &[]).await.unwrap_err();
    assert_eq!(err, Error::Transport(TransportError::Timeout));
}

#[tokio::test]
async fn test_unsupported_value_sends_nothing() {
    init_tracing();
    let transport = Arc::new(RecordingTransport { sent: Mutex::new(Vec::new()) });
    let client = Client::new(transport.clone());

    let err = client.call("echo", &[Value::Double(f64::INFINITY)]).await.unwrap_err();
    assert!(matches!(err, Error::Unsupported(Unsupported::NonFiniteDouble(_))));

    let err = client.call("bad name", &[]).await.unwrap_err();
    assert!(matches!(err, Error::Unsupported(Unsupported::InvalidMethodName(_))));

    assert!(transport.sent.lock().map(|sent| sent.is_empty()).unwrap_or(false));
}

#[tokio::test]
async fn test_concurrent_calls() -> anyhow::Result<()> {
    init_tracing();
    let client = server_client();

    let mut handles = Vec::new();
    for i in 0..32i64 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client.call("add", &[Value::Integer(i), Value::Integer(1000)]).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let value = handle.await??;
        assert_eq!(value, Value::Integer(i as i64 + 1000));
    }
    Ok(())
}
