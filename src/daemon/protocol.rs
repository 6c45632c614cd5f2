//
//  protocol.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Serialize};

/// One request per line, JSON-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Ping,
    Stats,
    Neighborhood {
        start: String,
        #[serde(default)]
        depth: Option<usize>,
    },
    Paths {
        from: String,
        to: String,
    },
    Shutdown,
}

/// One response per request, JSON-encoded on a single line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Pong,
    Goodbye,
    Ok { data: serde_json::Value },
    Error { message: String },
}

impl Response {
    pub fn ok<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Response::Ok { data },
            Err(e) => Response::error(format!("serialization error: {}", e)),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}
