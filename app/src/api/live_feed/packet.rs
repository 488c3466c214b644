//! Engine.IO v4 and Socket.IO v5 text packets.
//!
//! Engine.IO frames carry a one-digit type prefix. A Socket.IO packet lives inside an
//! Engine.IO `Message` and is laid out as `<type>[<namespace>,][<ack id>][<json>]`.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PacketError {
    #[error("Empty packet")]
    Empty,
    #[error("Unknown packet type `{0}`")]
    UnknownType(char),
    #[error("Binary packets are not supported")]
    Binary,
    #[error("Malformed packet payload: {0}")]
    Payload(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

impl Handshake {
    /// Longest silence tolerated from the server, `None` when it did not announce pings.
    pub fn liveness(&self) -> Option<std::time::Duration> {
        let total = self.ping_interval + self.ping_timeout;
        (total > 0).then(|| std::time::Duration::from_millis(total))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn parse(raw: &str) -> Result<Self, PacketError> {
        let mut chars = raw.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let body = chars.as_str();

        Ok(match kind {
            '0' => Self::Open(
                serde_json::from_str(body).map_err(|e| PacketError::Payload(e.to_string()))?,
            ),
            '1' => Self::Close,
            '2' => Self::Ping,
            '3' => Self::Pong,
            '4' => Self::Message(body.to_string()),
            '5' => Self::Upgrade,
            '6' => Self::Noop,
            other => return Err(PacketError::UnknownType(other)),
        })
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Open(handshake) => format!(
                "0{{\"sid\":{},\"pingInterval\":{},\"pingTimeout\":{}}}",
                Value::String(handshake.sid.clone()),
                handshake.ping_interval,
                handshake.ping_timeout
            ),
            Self::Close => "1".to_string(),
            Self::Ping => "2".to_string(),
            Self::Pong => "3".to_string(),
            Self::Message(body) => format!("4{body}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        data: Value,
    },
    Ack {
        namespace: String,
        id: u64,
        data: Value,
    },
    ConnectError {
        namespace: String,
        data: Value,
    },
}

impl SocketPacket {
    /// Event packet whose payload is `[name, ...args]`.
    pub fn event(namespace: &str, id: Option<u64>, name: &str, args: Vec<Value>) -> Self {
        let data = std::iter::once(Value::String(name.to_string()))
            .chain(args)
            .collect();

        Self::Event {
            namespace: namespace.to_string(),
            id,
            data: Value::Array(data),
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace,
        }
    }

    /// Name and first argument of an event packet.
    pub fn event_parts(&self) -> Option<(&str, Option<&Value>)> {
        let Self::Event { data, .. } = self else {
            return None;
        };

        let items = data.as_array()?;
        let name = items.first()?.as_str()?;

        Some((name, items.get(1)))
    }

    pub fn parse(raw: &str) -> Result<Self, PacketError> {
        let mut chars = raw.chars();
        let kind = chars.next().ok_or(PacketError::Empty)?;
        let mut rest = chars.as_str();

        if matches!(kind, '5' | '6') {
            return Err(PacketError::Binary);
        }

        let namespace = if rest.starts_with('/') {
            let (namespace, tail) = rest.split_once(',').unwrap_or((rest, ""));
            rest = tail;
            namespace.to_string()
        } else {
            "/".to_string()
        };

        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (id, body) = rest.split_at(digits);
        let id = match id {
            "" => None,
            id => Some(
                id.parse::<u64>()
                    .map_err(|e| PacketError::Payload(e.to_string()))?,
            ),
        };

        let data = match body {
            "" => None,
            body => Some(
                serde_json::from_str::<Value>(body)
                    .map_err(|e| PacketError::Payload(e.to_string()))?,
            ),
        };

        let required = |data: Option<Value>| {
            data.ok_or_else(|| PacketError::Payload("missing payload".to_string()))
        };

        Ok(match kind {
            '0' => Self::Connect { namespace, data },
            '1' => Self::Disconnect { namespace },
            '2' => Self::Event {
                namespace,
                id,
                data: required(data)?,
            },
            '3' => Self::Ack {
                namespace,
                id: id.ok_or_else(|| PacketError::Payload("ack without id".to_string()))?,
                data: data.unwrap_or(Value::Array(vec![])),
            },
            '4' => Self::ConnectError {
                namespace,
                data: data.unwrap_or(Value::Null),
            },
            other => return Err(PacketError::UnknownType(other)),
        })
    }

    pub fn encode(&self) -> String {
        let (kind, namespace, id, data) = match self {
            Self::Connect { namespace, data } => ('0', namespace, None, data.as_ref()),
            Self::Disconnect { namespace } => ('1', namespace, None, None),
            Self::Event {
                namespace,
                id,
                data,
            } => ('2', namespace, *id, Some(data)),
            Self::Ack {
                namespace,
                id,
                data,
            } => ('3', namespace, Some(*id), Some(data)),
            Self::ConnectError { namespace, data } => ('4', namespace, None, Some(data)),
        };

        let mut encoded = kind.to_string();
        if namespace != "/" {
            encoded.push_str(namespace);
            encoded.push(',');
        }
        if let Some(id) = id {
            encoded.push_str(&id.to_string());
        }
        if let Some(data) = data {
            encoded.push_str(&data.to_string());
        }

        encoded
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_engine_open() {
        let packet = EnginePacket::parse(
            r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000,"maxPayload":1000000}"#,
        )
        .unwrap();

        assert_eq!(
            packet,
            EnginePacket::Open(Handshake {
                sid: "lv_VI97HAXpY6yYWAAAC".to_string(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
    }

    #[test]
    fn test_engine_control_packets() {
        assert_eq!(EnginePacket::parse("2").unwrap(), EnginePacket::Ping);
        assert_eq!(EnginePacket::Pong.encode(), "3");
        assert_eq!(
            EnginePacket::parse("40/live,").unwrap(),
            EnginePacket::Message("0/live,".to_string())
        );
        assert_eq!(EnginePacket::parse(""), Err(PacketError::Empty));
        assert_eq!(EnginePacket::parse("9"), Err(PacketError::UnknownType('9')));
    }

    #[test]
    fn test_connect_with_auth() {
        let packet = SocketPacket::Connect {
            namespace: "/live".to_string(),
            data: Some(json!({"token": "abc"})),
        };

        assert_eq!(packet.encode(), r#"0/live,{"token":"abc"}"#);
    }

    #[test]
    fn test_connect_reply() {
        let packet = SocketPacket::parse(r#"0/live,{"sid":"wZX3oN0bSVIhsaknAAAI"}"#).unwrap();

        assert_eq!(packet.namespace(), "/live");
        assert!(matches!(packet, SocketPacket::Connect { data: Some(_), .. }));
    }

    #[test]
    fn test_new_comment_event() {
        let packet = SocketPacket::parse(
            r#"2/live,["new_comment",{"username":"alice","comment":"Hi","created_at":"2024-05-01T10:00:00"}]"#,
        )
        .unwrap();

        let (name, payload) = packet.event_parts().unwrap();
        assert_eq!(name, "new_comment");
        assert_eq!(payload.unwrap()["username"], "alice");
    }

    #[test]
    fn test_event_with_ack_id() {
        let packet = SocketPacket::event("/live", Some(12), "new_comment", vec![json!({"comment": "Hi"})]);
        let encoded = packet.encode();

        assert_eq!(encoded, r#"2/live,12["new_comment",{"comment":"Hi"}]"#);
        assert_eq!(SocketPacket::parse(&encoded).unwrap(), packet);
    }

    #[test]
    fn test_ack_and_errors() {
        assert_eq!(
            SocketPacket::parse(r#"3/live,12[{"error":"Unauthorized"}]"#).unwrap(),
            SocketPacket::Ack {
                namespace: "/live".to_string(),
                id: 12,
                data: json!([{"error": "Unauthorized"}]),
            }
        );
        assert_eq!(
            SocketPacket::parse(r#"4/live,{"message":"Not authorized"}"#).unwrap(),
            SocketPacket::ConnectError {
                namespace: "/live".to_string(),
                data: json!({"message": "Not authorized"}),
            }
        );
        assert_eq!(SocketPacket::parse("1").unwrap(), SocketPacket::Disconnect {
            namespace: "/".to_string()
        });
        assert_eq!(SocketPacket::parse("51-[]"), Err(PacketError::Binary));
        assert!(matches!(
            SocketPacket::parse("2/live,[broken"),
            Err(PacketError::Payload(_))
        ));
    }
}
