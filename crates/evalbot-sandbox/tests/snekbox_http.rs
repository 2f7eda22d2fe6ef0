// Exercise SnekboxClient against a mock snekbox over real HTTP.

use std::time::Duration;

use evalbot_sandbox::{Sandbox, SandboxError, SnekboxClient};
use httpmock::prelude::*;
use serde_json::json;

fn client_for(server: &MockServer) -> SnekboxClient {
    SnekboxClient::new(&server.base_url(), Duration::from_secs(5))
        .expect("client should build")
}

#[tokio::test]
async fn posts_input_and_parses_result() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/eval")
            .json_body(json!({"input": "print('hi')"}));
        then.status(200)
            .json_body(json!({"stdout": "hi\n", "returncode": 0}));
    });

    let result = client_for(&server)
        .eval("print('hi')")
        .await
        .expect("eval should succeed");

    mock.assert();
    assert_eq!(result.stdout, "hi\n");
    assert_eq!(result.returncode, Some(0));
}

#[tokio::test]
async fn null_returncode_is_preserved() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eval");
        then.status(200)
            .json_body(json!({"stdout": "nsjail exploded", "returncode": null}));
    });

    let result = client_for(&server).eval("1").await.expect("eval should succeed");
    assert_eq!(result.returncode, None);
    assert_eq!(result.stdout, "nsjail exploded");
}

#[tokio::test]
async fn non_success_status_is_a_hard_failure() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eval");
        then.status(400).body("bad request");
    });

    let err = client_for(&server).eval("1").await.unwrap_err();
    match err {
        SandboxError::Status { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "bad request");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/eval");
        then.status(200).body("not json");
    });

    let err = client_for(&server).eval("1").await.unwrap_err();
    assert!(matches!(err, SandboxError::Parse(_)), "got {err:?}");
}
