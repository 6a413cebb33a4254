//! Tests for [`Dispatcher`].

use super::*;

fn numbers(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_unconfigured_dispatcher_returns_single_failure() {
    let dispatcher = Dispatcher::unconfigured();

    let results = dispatcher
        .dispatch("hello", &numbers(&["+1", "+2", "+3"]))
        .await;

    assert_eq!(results.len(), 1);
    assert!(!results[0].success);
    assert_eq!(results[0].to, "+1,+2,+3");
    assert_eq!(results[0].error.as_deref(), Some(UNCONFIGURED_MESSAGE));
    assert!(!dispatcher.is_configured());
}

#[tokio::test]
async fn test_every_recipient_receives_the_message() {
    let mut sender = MockSmsSender::new();
    sender
        .expect_send()
        .withf(|body, _to| body.to_string() == "alert text")
        .times(2)
        .returning(|_, to| Ok(MessageSid::new(format!("SM-{}", to))));

    let dispatcher = Dispatcher::new(Some(Arc::new(sender)));
    let results = dispatcher
        .dispatch("alert text", &numbers(&["+1", "+2"]))
        .await;

    assert_eq!(
        results,
        vec![
            DispatchResult::delivered("+1", &MessageSid::new("SM-+1")),
            DispatchResult::delivered("+2", &MessageSid::new("SM-+2")),
        ]
    );
}

/// The k-th failure is captured and later recipients are still attempted.
#[tokio::test]
async fn test_single_failure_does_not_abort_later_recipients() {
    let mut sender = MockSmsSender::new();
    sender
        .expect_send()
        .withf(|body, _to| body.to_string() == "msg")
        .times(4)
        .returning(|_, to| match to {
            "+2" => Err(SmsError::Rejected {
                status: 400,
                code: Some(21211),
                message: "Invalid 'To' Phone Number".to_string(),
            }),
            other => Ok(MessageSid::new(format!("SM{}", other.len()))),
        });

    let dispatcher = Dispatcher::new(Some(Arc::new(sender)));
    let results = dispatcher
        .dispatch("msg", &numbers(&["+1", "+2", "+3", "+4"]))
        .await;

    assert_eq!(results.len(), 4);
    assert_eq!(results.iter().filter(|r| !r.success).count(), 1);
    assert_eq!(results[1].to, "+2");
    assert!(!results[1].success);
    assert!(results[1]
        .error
        .as_deref()
        .unwrap()
        .contains("Invalid 'To' Phone Number"));
    assert!(results[3].success);
}

#[tokio::test]
async fn test_no_recipients_means_no_attempts() {
    let mut sender = MockSmsSender::new();
    sender.expect_send().never();

    let dispatcher = Dispatcher::new(Some(Arc::new(sender)));
    let results = dispatcher.dispatch("msg", &[]).await;

    assert!(results.is_empty());
}

#[test]
fn test_result_serialization_shape() {
    let ok = serde_json::to_value(DispatchResult::delivered("+1", &MessageSid::new("SM1"))).unwrap();
    let err = serde_json::to_value(DispatchResult::failed("+2", "boom")).unwrap();

    assert_eq!(ok, serde_json::json!({"to": "+1", "success": true, "sid": "SM1"}));
    assert_eq!(err, serde_json::json!({"to": "+2", "success": false, "error": "boom"}));
}
