use super::websocket::{SubscribeRequest, is_upgrade_head, parse_request_target};

#[test]
fn test_upgrade_head_detection() {
    let upgrade = b"GET /topics/subscribe/room1 HTTP/1.1\r\n\
                    Host: localhost\r\n\
                    Connection: Upgrade\r\n\
                    Upgrade: websocket\r\n\
                    Sec-WebSocket-Version: 13\r\n\r\n";
    assert!(is_upgrade_head(upgrade));

    let plain = b"GET /topics/subscribe/room1 HTTP/1.1\r\n\
                  Host: localhost\r\n\
                  Connection: close\r\n\r\n";
    assert!(!is_upgrade_head(plain));

    // Upgrading to something other than WebSocket does not count.
    let h2c = b"GET / HTTP/1.1\r\nConnection: Upgrade\r\nUpgrade: h2c\r\n\r\n";
    assert!(!is_upgrade_head(h2c));
}

#[test]
fn test_parse_subscribe_path_with_client() {
    let parsed = parse_request_target("/topics/subscribe/room1", Some("client=alice")).unwrap();
    assert_eq!(
        parsed,
        SubscribeRequest {
            topic: "room1".to_string(),
            client: Some("alice".to_string()),
        }
    );
}

#[test]
fn test_parse_subscribe_path_without_client() {
    let parsed = parse_request_target("/topics/subscribe/room1", None).unwrap();
    assert_eq!(parsed.topic, "room1");
    assert_eq!(parsed.client, None);
}

#[test]
fn test_parse_ignores_unrelated_query_params() {
    let parsed =
        parse_request_target("/topics/subscribe/room1", Some("debug=1&client=bob")).unwrap();
    assert_eq!(parsed.client, Some("bob".to_string()));
}

#[test]
fn test_parse_empty_client_means_absent() {
    let parsed = parse_request_target("/topics/subscribe/room1", Some("client=")).unwrap();
    assert_eq!(parsed.client, None);
}

#[test]
fn test_parse_rejects_unknown_paths() {
    assert!(parse_request_target("/", None).is_err());
    assert!(parse_request_target("/topics", None).is_err());
    assert!(parse_request_target("/topics/subscribe", None).is_err());
    assert!(parse_request_target("/topics/subscribe/room1/extra", None).is_err());
    assert!(parse_request_target("/other/subscribe/room1", None).is_err());
}

#[test]
fn test_parse_rejects_delimiter_in_topic_or_client() {
    assert!(parse_request_target("/topics/subscribe/bad_topic", None).is_err());
    assert!(parse_request_target("/topics/subscribe/room1", Some("client=bad_client")).is_err());
}
