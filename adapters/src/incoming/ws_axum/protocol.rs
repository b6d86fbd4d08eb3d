//! Wire protocol: the dispatcher in `handler.rs` accepts either framing on
//! the same socket, switching on the WebSocket opcode. JSON carries the
//! full request/response vocabulary; the binary envelope is a narrower,
//! denser framing for the high-frequency canvas/tile operations.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use domain::color::RgbColor;

/// A JSON request, tagged by `requestType`. Field names and case are part
/// of the wire contract and must not be renamed.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "requestType")]
pub enum JsonRequest {
    #[serde(rename = "initialAuth")]
    InitialAuth {},
    #[serde(rename = "auth")]
    Auth {
        #[serde(rename = "userID")]
        user_id: String,
    },
    #[serde(rename = "getCanvas")]
    GetCanvas {
        #[serde(rename = "userID")]
        user_id: String,
    },
    #[serde(rename = "getTileInfo")]
    GetTileInfo {
        #[serde(rename = "userID")]
        user_id: String,
        #[serde(rename = "X")]
        x: u16,
        #[serde(rename = "Y")]
        y: u16,
    },
    #[serde(rename = "postTile")]
    PostTile {
        #[serde(rename = "userID")]
        user_id: String,
        #[serde(rename = "X")]
        x: u16,
        #[serde(rename = "Y")]
        y: u16,
        #[serde(rename = "colorID")]
        color_id: String,
    },
    #[serde(rename = "getColors")]
    GetColors {
        #[serde(rename = "userID")]
        user_id: String,
    },
    #[serde(rename = "setUsername")]
    SetUsername {
        #[serde(rename = "userID")]
        user_id: String,
        name: String,
    },
    #[serde(rename = "admin_cmd")]
    AdminCmd {
        #[serde(rename = "userID")]
        user_id: String,
        cmd: AdminCmdPayload,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdminCmdPayload {
    pub action: String,
    pub coords: Option<(u16, u16)>,
    pub message: Option<String>,
    #[serde(rename = "colorID")]
    pub color_id: Option<String>,
    pub target: Option<String>,
}

/// A JSON response. Serialized by hand rather than derived, because the
/// wire tags differently-shaped payloads (`rt` for the normal case,
/// `responseType` for errors) under the same `{...}` envelope — a single
/// `#[serde(tag = ...)]` cannot express that split.
#[derive(Debug, Clone)]
pub enum JsonResponse {
    AuthSuccessful {
        user_id: String,
        remaining_tiles: i32,
        max_tiles: i32,
        regen_seconds: i32,
        level: i32,
    },
    ReAuthSuccessful {
        user_id: String,
        remaining_tiles: i32,
        max_tiles: i32,
        regen_seconds: i32,
        level: i32,
        is_admin: bool,
    },
    FullCanvas {
        edge_length: u16,
        tiles: Vec<u8>,
    },
    TileInfo {
        x: u16,
        y: u16,
        last_modifier: String,
        place_time: i64,
    },
    TileUpdate {
        x: u16,
        y: u16,
        color_id: u8,
    },
    ColorList {
        colors: Vec<(u8, RgbColor)>,
    },
    IncrementTileCount {
        amount: u8,
    },
    LevelUp {
        level: i32,
        max_tiles: i32,
    },
    UserCount {
        count: u16,
    },
    Kicked {
        reason: String,
        button_label: String,
    },
    Announcement {
        message: String,
    },
    NameSetSuccess,
    BanClickSuccess {
        target: String,
    },
    Disconnecting,
    Error {
        message: String,
    },
}

impl JsonResponse {
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::AuthSuccessful {
                user_id,
                remaining_tiles,
                max_tiles,
                regen_seconds,
                level,
            } => json!({
                "rt": "authSuccessful",
                "userID": user_id,
                "remainingTiles": remaining_tiles,
                "maxTiles": max_tiles,
                "regenSeconds": regen_seconds,
                "level": level,
            }),
            Self::ReAuthSuccessful {
                user_id,
                remaining_tiles,
                max_tiles,
                regen_seconds,
                level,
                is_admin,
            } => json!({
                "rt": "reAuthSuccessful",
                "userID": user_id,
                "remainingTiles": remaining_tiles,
                "maxTiles": max_tiles,
                "regenSeconds": regen_seconds,
                "level": level,
                "isAdmin": is_admin,
            }),
            Self::FullCanvas { edge_length, tiles } => json!({
                "rt": "fullCanvas",
                "edgeLength": edge_length,
                "tiles": tiles,
            }),
            Self::TileInfo {
                x,
                y,
                last_modifier,
                place_time,
            } => json!({
                "rt": "tileInfo",
                "X": x,
                "Y": y,
                "lastModifier": last_modifier,
                "placeTime": place_time,
            }),
            Self::TileUpdate { x, y, color_id } => json!({
                "rt": "tu",
                "X": x,
                "Y": y,
                "colorID": color_id,
            }),
            Self::ColorList { colors } => json!({
                "rt": "colorList",
                "colors": colors.iter().map(|(id, rgb)| json!({
                    "id": id, "r": rgb.r, "g": rgb.g, "b": rgb.b,
                })).collect::<Vec<_>>(),
            }),
            Self::IncrementTileCount { amount } => json!({
                "rt": "itc",
                "amount": amount,
            }),
            Self::LevelUp { level, max_tiles } => json!({
                "rt": "levelUp",
                "level": level,
                "maxTiles": max_tiles,
            }),
            Self::UserCount { count } => json!({
                "rt": "userCount",
                "count": count,
            }),
            Self::Kicked {
                reason,
                button_label,
            } => json!({
                "rt": "kicked",
                "reason": reason,
                "buttonLabel": button_label,
            }),
            Self::Announcement { message } => json!({
                "rt": "announcement",
                "message": message,
            }),
            Self::NameSetSuccess => json!({ "rt": "nameSetSuccess" }),
            Self::BanClickSuccess { target } => json!({
                "rt": "ban_click_success",
                "target": target,
            }),
            Self::Disconnecting => json!({ "rt": "disconnecting" }),
            Self::Error { message } => json!({
                "responseType": "error",
                "errorMessage": message,
            }),
        }
    }
}

/// Binary request envelope, fixed layout, all multi-byte fields network
/// byte order: `[u8 type][36-byte uuid][u16 x][u16 y][u16 color_id_or_len]`.
///
/// Only the data-plane operations are reachable over the binary framing;
/// control-plane requests (`initialAuth`, `auth`, `setUsername`,
/// `admin_cmd`) carry variable-length text and stay JSON-only.
pub mod binary {
    pub const REQ_GET_CANVAS: u8 = 2;
    pub const REQ_GET_TILE_INFO: u8 = 3;
    pub const REQ_POST_TILE: u8 = 4;
    pub const REQ_GET_COLORS: u8 = 5;

    pub const RES_CANVAS: u8 = 10;
    pub const RES_TILE_UPDATE: u8 = 11;
    pub const RES_USER_COUNT: u8 = 12;
    pub const RES_TILE_INCREMENT: u8 = 13;
    pub const RES_COLOR_LIST: u8 = 14;
    pub const RES_ERROR: u8 = 15;

    const ENVELOPE_LEN: usize = 1 + 36 + 2 + 2 + 2;

    #[derive(Debug, Clone)]
    pub struct BinaryRequest {
        pub kind: u8,
        pub uuid: String,
        pub x: u16,
        pub y: u16,
        pub color_id_or_len: u16,
    }

    /// # Errors
    /// Returns a description of the malformed frame when it's shorter than
    /// the fixed envelope or the UUID bytes aren't valid UTF-8.
    pub fn decode_request(frame: &[u8]) -> Result<BinaryRequest, String> {
        if frame.len() < ENVELOPE_LEN {
            return Err(format!(
                "binary frame too short: {} bytes, need {ENVELOPE_LEN}",
                frame.len()
            ));
        }
        let kind = frame[0];
        let uuid = std::str::from_utf8(&frame[1..37])
            .map_err(|e| format!("uuid bytes not utf-8: {e}"))?
            .to_string();
        let x = u16::from_be_bytes([frame[37], frame[38]]);
        let y = u16::from_be_bytes([frame[39], frame[40]]);
        let color_id_or_len = u16::from_be_bytes([frame[41], frame[42]]);
        Ok(BinaryRequest {
            kind,
            uuid,
            x,
            y,
            color_id_or_len,
        })
    }

    #[must_use]
    pub fn encode_canvas(blob: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + blob.len());
        out.push(RES_CANVAS);
        out.extend_from_slice(blob);
        out
    }

    #[must_use]
    pub fn encode_tile_update(color_id: u8, index: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 1 + 2 + 4);
        out.push(RES_TILE_UPDATE);
        out.push(color_id);
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&index.to_be_bytes());
        out
    }

    #[must_use]
    pub fn encode_user_count(count: u16) -> Vec<u8> {
        let mut out = Vec::with_capacity(3);
        out.push(RES_USER_COUNT);
        out.extend_from_slice(&count.to_be_bytes());
        out
    }

    #[must_use]
    pub fn encode_tile_increment(amount: u8) -> Vec<u8> {
        vec![RES_TILE_INCREMENT, amount]
    }

    #[must_use]
    pub fn encode_color_list(colors: &[(u8, super::RgbColor)]) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + colors.len() * 5);
        out.push(RES_COLOR_LIST);
        for (id, rgb) in colors {
            out.push(rgb.r);
            out.push(rgb.g);
            out.push(rgb.b);
            out.extend_from_slice(&u16::from(*id).to_be_bytes());
        }
        out
    }

    #[must_use]
    pub fn encode_error(message: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + message.len());
        out.push(RES_ERROR);
        out.extend_from_slice(message.as_bytes());
        out
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn decode_rejects_short_frames() {
            assert!(decode_request(&[0u8; 10]).is_err());
        }

        #[test]
        fn tile_update_round_trips_index() {
            let encoded = encode_tile_update(7, 1234);
            assert_eq!(encoded[0], RES_TILE_UPDATE);
            assert_eq!(encoded[1], 7);
            let index = u32::from_be_bytes([encoded[4], encoded[5], encoded[6], encoded[7]]);
            assert_eq!(index, 1234);
        }
    }
}
