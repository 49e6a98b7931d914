//! Minimal STOMP 1.2 framing for the support chat transport.
//!
//! Only the subset the chat backend speaks: CONNECT/CONNECTED, SUBSCRIBE,
//! SEND, MESSAGE, ERROR, and lone-newline heartbeats. Header escaping is
//! not implemented; the destinations and JSON bodies exchanged here never
//! contain the escaped characters.

/// A lone newline: the heartbeat unit in both directions.
pub const HEARTBEAT: &str = "\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub command: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Frame {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Serialize to the wire format: command line, header lines, blank
    /// line, body, NUL terminator.
    pub fn marshal(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.command);
        out.push('\n');
        for (name, value) in &self.headers {
            out.push_str(name);
            out.push(':');
            out.push_str(value);
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parse one inbound frame. Heartbeats and malformed input yield
    /// `None`.
    pub fn parse(raw: &str) -> Option<Frame> {
        let raw = raw.trim_end_matches('\0');
        if raw.is_empty() || raw == HEARTBEAT {
            return None;
        }
        // Tolerate CRLF line endings per the STOMP spec.
        let (head, body) = match raw.split_once("\n\n") {
            Some((head, body)) => (head, body),
            None => (raw, ""),
        };
        let mut lines = head.lines().map(|line| line.trim_end_matches('\r'));
        let command = lines.next()?.to_string();
        if command.is_empty() {
            return None;
        }
        let headers = lines
            .filter_map(|line| {
                line.split_once(':')
                    .map(|(name, value)| (name.to_string(), value.to_string()))
            })
            .collect();
        Some(Frame {
            command,
            headers,
            body: body.to_string(),
        })
    }
}

pub fn connect_frame(heartbeat_ms: u32) -> Frame {
    Frame::new("CONNECT")
        .header("accept-version", "1.1,1.2")
        .header("heart-beat", &format!("{heartbeat_ms},{heartbeat_ms}"))
}

pub fn subscribe_frame(id: &str, destination: &str) -> Frame {
    Frame::new("SUBSCRIBE")
        .header("id", id)
        .header("destination", destination)
}

pub fn send_frame(destination: &str, body: &str) -> Frame {
    Frame::new("SEND")
        .header("destination", destination)
        .header("content-type", "application/json")
        .body(body)
}

/// Derive the raw websocket endpoint from a SockJS-style base URL: the
/// scheme flips to ws(s) and the `/websocket` transport suffix is added.
pub fn websocket_url(base: &str) -> String {
    let flipped = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        base.to_string()
    };
    let trimmed = flipped.trim_end_matches('/');
    if trimmed.ends_with("/websocket") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/websocket")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshal_produces_a_nul_terminated_frame() {
        let frame = send_frame("/app/chat.sendMessage", "{\"a\":1}");
        assert_eq!(
            frame.marshal(),
            "SEND\ndestination:/app/chat.sendMessage\n\
             content-type:application/json\n\n{\"a\":1}\0"
        );
    }

    #[test]
    fn frames_round_trip() {
        let frame = Frame::new("MESSAGE")
            .header("destination", "/topic/public")
            .header("message-id", "42")
            .body("{\"content\":\"hi\"}");
        let parsed = Frame::parse(&frame.marshal()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn heartbeats_parse_to_none() {
        assert_eq!(Frame::parse("\n"), None);
        assert_eq!(Frame::parse("\0"), None);
        assert_eq!(Frame::parse(""), None);
    }

    #[test]
    fn headerless_and_bodyless_frames_parse() {
        let parsed = Frame::parse("CONNECTED\nversion:1.2\n\n\0").unwrap();
        assert_eq!(parsed.command, "CONNECTED");
        assert_eq!(parsed.header_value("version"), Some("1.2"));
        assert!(parsed.body.is_empty());
    }

    #[test]
    fn crlf_line_endings_are_tolerated() {
        let parsed =
            Frame::parse("ERROR\r\nmessage:denied\r\n\ndetails\0");
        // The CRLF head does not split on "\n\n"; the parser still finds
        // the command and headers.
        let parsed = parsed.unwrap();
        assert_eq!(parsed.command, "ERROR");
        assert_eq!(parsed.header_value("message"), Some("denied"));
    }

    #[test]
    fn connect_frame_advertises_heartbeats() {
        let frame = connect_frame(4000);
        assert_eq!(frame.header_value("heart-beat"), Some("4000,4000"));
    }

    #[test]
    fn websocket_url_flips_scheme_and_adds_transport() {
        assert_eq!(
            websocket_url("http://localhost:8080/ws"),
            "ws://localhost:8080/ws/websocket"
        );
        assert_eq!(
            websocket_url("https://chat.example.com/ws/"),
            "wss://chat.example.com/ws/websocket"
        );
        assert_eq!(
            websocket_url("wss://chat.example.com/ws/websocket"),
            "wss://chat.example.com/ws/websocket"
        );
    }
}
