//! Tests for the webhook request model and payload classification.

use super::*;
use serde_json::json;

fn header_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

mod header_tests {
    use super::*;

    #[test]
    fn test_known_resources_are_parsed() {
        assert_eq!(ResourceType::parse("issue"), ResourceType::Issue);
        assert_eq!(ResourceType::parse("event_alert"), ResourceType::EventAlert);
        assert_eq!(ResourceType::parse("metric_alert"), ResourceType::MetricAlert);
        assert_eq!(
            ResourceType::parse("installation"),
            ResourceType::Other("installation".to_string())
        );
    }

    #[test]
    fn test_resource_round_trips_to_wire_value() {
        for value in ["issue", "event_alert", "metric_alert", "comment"] {
            assert_eq!(ResourceType::parse(value).as_str(), value);
        }
    }

    #[test]
    fn test_headers_extracted_from_lowercase_map() {
        let headers = WebhookHeaders::from_http_headers(&header_map(&[
            ("sentry-hook-resource", "issue"),
            ("sentry-hook-signature", "abc123"),
            ("request-id", "req-1"),
            ("sentry-hook-timestamp", "1700000000"),
        ]));

        assert_eq!(headers.resource, ResourceType::Issue);
        assert_eq!(headers.signature.as_deref(), Some("abc123"));
        assert_eq!(headers.request_id.as_deref(), Some("req-1"));
        assert_eq!(headers.hook_timestamp.as_deref(), Some("1700000000"));
    }

    #[test]
    fn test_missing_resource_header_defaults_to_unknown() {
        let headers = WebhookHeaders::from_http_headers(&HashMap::new());

        assert_eq!(headers.resource.as_str(), "unknown");
        assert!(headers.signature.is_none());
    }
}

mod payload_tests {
    use super::*;

    #[test]
    fn test_body_is_split_into_action_and_data() {
        let body = br#"{"action":"created","data":{"issue":{"title":"Boom"}},"actor":{}}"#;
        let payload = WebhookPayload::from_body(ResourceType::Issue, body).unwrap();

        assert_eq!(payload.action.as_deref(), Some("created"));
        assert_eq!(payload.data, json!({"issue": {"title": "Boom"}}));
    }

    #[test]
    fn test_missing_data_becomes_null() {
        let payload = WebhookPayload::from_body(ResourceType::Issue, br#"{"action":"x"}"#).unwrap();

        assert_eq!(payload.data, Value::Null);
    }

    #[test]
    fn test_scalar_action_is_rendered_as_text() {
        let number =
            WebhookPayload::from_body(ResourceType::Issue, br#"{"action":5,"data":{}}"#).unwrap();
        let flag =
            WebhookPayload::from_body(ResourceType::Issue, br#"{"action":true,"data":{}}"#).unwrap();

        assert_eq!(number.action(), Some("5"));
        assert_eq!(flag.action(), Some("true"));
    }

    #[test]
    fn test_falsy_or_structured_action_is_ignored() {
        for body in [
            r#"{"action":0,"data":{}}"#,
            r#"{"action":false,"data":{}}"#,
            r#"{"action":null,"data":{}}"#,
            r#"{"action":{"kind":"x"},"data":{}}"#,
            r#"{"action":["x"],"data":{}}"#,
        ] {
            let payload = WebhookPayload::from_body(ResourceType::Issue, body.as_bytes()).unwrap();
            assert!(payload.action.is_none(), "body: {body}");
        }
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = WebhookPayload::from_body(ResourceType::Issue, b"{not json");

        assert!(matches!(result, Err(PayloadError::InvalidJson(_))));
    }

    #[test]
    fn test_non_object_body_is_rejected() {
        let result = WebhookPayload::from_body(ResourceType::Issue, b"[1,2,3]");

        assert!(matches!(result, Err(PayloadError::NotAnObject)));
    }
}

mod classification_tests {
    use super::*;

    #[test]
    fn test_issue_with_issue_object_is_issue_alert() {
        let payload = WebhookPayload::new(
            ResourceType::Issue,
            Some("resolved".to_string()),
            json!({"issue": {"title": "t"}}),
        );

        match payload.alert() {
            Alert::Issue { action, issue } => {
                assert_eq!(action, Some("resolved"));
                assert_eq!(issue["title"], "t");
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn test_issue_without_issue_object_falls_through() {
        let payload = WebhookPayload::new(ResourceType::Issue, None, json!({"other": 1}));

        assert!(matches!(payload.alert(), Alert::Unrecognized { .. }));
    }

    #[test]
    fn test_event_alert_requires_event() {
        let with_event = WebhookPayload::new(
            ResourceType::EventAlert,
            Some("triggered".to_string()),
            json!({"event": {"title": "e"}, "triggered_rule": "High errors"}),
        );
        let without_event = WebhookPayload::new(
            ResourceType::EventAlert,
            Some("triggered".to_string()),
            json!({"triggered_rule": "High errors"}),
        );

        assert!(matches!(
            with_event.alert(),
            Alert::EventAlert {
                triggered_rule: Some(_),
                ..
            }
        ));
        assert!(matches!(without_event.alert(), Alert::Unrecognized { .. }));
    }

    #[test]
    fn test_metric_alert_always_matches() {
        let payload = WebhookPayload::new(ResourceType::MetricAlert, None, json!({}));

        assert!(matches!(
            payload.alert(),
            Alert::MetricAlert {
                metric_alert: None,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_action_is_treated_as_absent() {
        let payload = WebhookPayload::new(
            ResourceType::MetricAlert,
            Some(String::new()),
            json!({}),
        );

        assert!(payload.action().is_none());
    }
}

mod value_helper_tests {
    use super::*;

    #[test]
    fn test_text_renders_scalars_and_skips_falsy_values() {
        assert_eq!(text(Some(&json!("abc"))), Some("abc".to_string()));
        assert_eq!(text(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(text(Some(&json!(""))), None);
        assert_eq!(text(Some(&json!(null))), None);
        assert_eq!(text(None), None);
    }

    #[test]
    fn test_lookup_follows_nested_keys() {
        let value = json!({"a": {"b": {"c": "deep"}}});

        assert_eq!(lookup(&value, &["a", "b", "c"]), Some(&json!("deep")));
        assert_eq!(lookup(&value, &["a", "x", "c"]), None);
    }
}
