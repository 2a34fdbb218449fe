use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::bridge::{Ack, Actuator};
use crate::error::ActuatorError;
use crate::scheduler::Speed;

pub const PLAY_METHOD: &str = "morse_play";

/// One request line sent to the device.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BridgeRequest {
    pub method: String,
    pub params: (String, u8),
}

/// One reply line read back from the device.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct BridgeReply {
    pub ok: bool,
    #[serde(default)]
    pub ack: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Talks to a keying device over newline-delimited JSON.
///
/// A fresh connection is opened per playback; the device answers once the
/// message has been keyed.
#[derive(Debug, Clone)]
pub struct TcpBridge {
    addr: String,
}

impl TcpBridge {
    pub fn new(addr: String) -> Self {
        Self { addr }
    }
}

#[async_trait]
impl Actuator for TcpBridge {
    async fn play(&self, text: &str, speed: Speed) -> Result<Ack, ActuatorError> {
        let stream = TcpStream::connect(&self.addr).await?;
        let (read_half, mut write_half) = stream.into_split();

        let request = BridgeRequest {
            method: PLAY_METHOD.to_string(),
            params: (text.to_string(), speed.wpm()),
        };
        let mut line = serde_json::to_vec(&request)?;
        line.push(b'\n');
        write_half.write_all(&line).await?;
        write_half.flush().await?;

        let mut reader = BufReader::new(read_half);
        let mut reply = String::new();
        if reader.read_line(&mut reply).await? == 0 {
            return Err(ActuatorError::Transport(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "bridge closed the connection without replying",
            )));
        }

        let reply: BridgeReply = serde_json::from_str(reply.trim_end())?;
        tracing::debug!(addr = %self.addr, ok = reply.ok, "Bridge replied");

        if !reply.ok {
            return Err(ActuatorError::Rejected(
                reply.error.unwrap_or_else(|| "unspecified".to_string()),
            ));
        }
        Ok(match reply.ack {
            Some(Value::String(ack)) => ack,
            Some(other) => other.to_string(),
            None => "ok".to_string(),
        })
    }
}
