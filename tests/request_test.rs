//! Correlation handling end to end, one module per toggle combination.

use std::collections::HashMap;

mod common;

use common::{client, send_request, start_server, start_with_config};

mod filter_and_span {
    use super::*;

    #[tokio::test]
    async fn context_and_trace_field_contain_correlation_id() {
        let server = start_server(true, true).await;

        let response = send_request(&client(), server.addr, HashMap::new()).await;

        assert!(response.context.as_deref().is_some_and(|id| !id.is_empty()));
        assert!(response.span.as_deref().is_some_and(|id| !id.is_empty()));
        assert_eq!(response.context, response.span);
    }

    #[tokio::test]
    async fn inbound_id_reaches_both_stores() {
        let server = start_server(true, true).await;

        let response =
            send_request(&client(), server.addr, HashMap::from([("Korrelasjonsid", "abc123")])).await;

        assert_eq!(response.context.as_deref(), Some("abc123"));
        assert_eq!(response.span.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn any_non_empty_value_is_adopted_as_is() {
        let server = start_server(true, true).await;
        let long = "a".repeat(512);

        for value in ["blåbær-1", long.as_str(), "not a uuid; anything goes"] {
            let response =
                send_request(&client(), server.addr, HashMap::from([("Korrelasjonsid", value)])).await;

            assert_eq!(response.context.as_deref(), Some(value));
            assert_eq!(response.span.as_deref(), Some(value));
        }
    }
}

mod filter_only {
    use super::*;

    #[tokio::test]
    async fn context_contains_correlation_id() {
        let server = start_server(true, false).await;

        let response = send_request(&client(), server.addr, HashMap::new()).await;

        assert!(response.context.as_deref().is_some_and(|id| !id.is_empty()));
        assert_eq!(response.span, None);
    }

    #[tokio::test]
    async fn context_contains_same_id_as_incoming_request() {
        let server = start_server(true, false).await;

        let response =
            send_request(&client(), server.addr, HashMap::from([("Korrelasjonsid", "abc123")])).await;

        assert_eq!(response.context.as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn header_name_is_case_insensitive() {
        let server = start_server(true, false).await;

        let response =
            send_request(&client(), server.addr, HashMap::from([("KORRELASJONSID", "upper")])).await;

        assert_eq!(response.context.as_deref(), Some("upper"));
    }

    #[tokio::test]
    async fn blank_header_is_replaced() {
        let server = start_server(true, false).await;

        let response =
            send_request(&client(), server.addr, HashMap::from([("Korrelasjonsid", "  ")])).await;

        assert!(response.context.as_deref().is_some_and(|id| !id.trim().is_empty()));
    }
}

mod span_only {
    use super::*;

    #[tokio::test]
    async fn trace_field_contains_correlation_id() {
        let server = start_server(false, true).await;

        let response = send_request(&client(), server.addr, HashMap::new()).await;

        assert_eq!(response.context, None);
        assert!(response.span.as_deref().is_some_and(|id| !id.is_empty()));
    }
}

mod neither {
    use super::*;

    #[tokio::test]
    async fn nothing_is_populated() {
        let server = start_server(false, false).await;

        let response =
            send_request(&client(), server.addr, HashMap::from([("Korrelasjonsid", "abc123")])).await;

        assert_eq!(response.context, None);
        assert_eq!(response.span, None);
    }
}

mod response_header {
    use super::*;
    use request_correlation::config::AppConfig;

    #[tokio::test]
    async fn echoed_when_configured() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();
        config.header.filter.enabled = true;
        config.header.filter.echo_response_header = true;
        let server = start_with_config(config).await;

        let response = client()
            .get(format!("http://{}/correlation", server.addr))
            .header("Korrelasjonsid", "abc123")
            .send()
            .await
            .unwrap();

        assert_eq!(response.headers().get("korrelasjonsid").unwrap(), "abc123");
    }
}
