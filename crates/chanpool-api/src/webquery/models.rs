// WebQuery response types
//
// The server encodes every scalar as a JSON string ("cid": "12"), so the
// numeric fields go through the lenient decoders in `de`. Fields that only
// appear with optional switches (e.g. `-flags`) default when absent.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard WebQuery response envelope.
///
/// ```json
/// { "body": [...], "status": { "code": 0, "message": "ok" } }
/// ```
///
/// `body` is omitted for commands that return nothing and on errors.
#[derive(Debug, Deserialize)]
pub struct QueryResponse<T> {
    #[serde(default = "Vec::new")]
    pub body: Vec<T>,
    pub status: Status,
}

/// Status block of the envelope. `code == 0` means success.
#[derive(Debug, Deserialize)]
pub struct Status {
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

impl Status {
    pub const OK: u32 = 0;
    /// `database empty result set`: a list command matched nothing.
    pub const EMPTY_RESULT: u32 = 1281;
}

// ── Channel ──────────────────────────────────────────────────────────

/// One row of `channellist -flags`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryChannel {
    #[serde(deserialize_with = "de::number")]
    pub cid: u64,
    #[serde(deserialize_with = "de::number")]
    pub pid: u64,
    pub channel_name: String,
    #[serde(default, deserialize_with = "de::number")]
    pub channel_order: u64,
    #[serde(default, deserialize_with = "de::number")]
    pub total_clients: u32,
    #[serde(default, deserialize_with = "de::flag")]
    pub channel_flag_permanent: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub channel_flag_semi_permanent: bool,
    #[serde(default, deserialize_with = "de::flag")]
    pub channel_flag_default: bool,
    /// Catch-all for fields we don't model.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Parameters for `channelcreate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelCreate {
    pub name: String,
    pub parent: u64,
    pub semi_permanent: bool,
}

impl ChannelCreate {
    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("channel_name", self.name.clone()),
            ("cpid", self.parent.to_string()),
        ];
        if self.semi_permanent {
            params.push(("channel_flag_semi_permanent", "1".into()));
        }
        params
    }
}

/// Body row of a successful `channelcreate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedChannel {
    #[serde(deserialize_with = "de::number")]
    pub cid: u64,
}

// ── Server ───────────────────────────────────────────────────────────

/// Body row of `serveridgetbyport`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerIdEntry {
    #[serde(deserialize_with = "de::number")]
    pub server_id: u64,
}

/// Body row of `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub platform: String,
}

// ── Lenient decoders ─────────────────────────────────────────────────

pub(crate) mod de {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Decode a number sent either as a JSON number or as a numeric string.
    pub(crate) fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
        T::Err: Display,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => s.trim().parse().map_err(D::Error::custom),
            Value::Number(n) => n.to_string().parse().map_err(D::Error::custom),
            other => Err(D::Error::custom(format!("expected number, got {other}"))),
        }
    }

    /// Decode a `"0"` / `"1"` flag.
    pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        number::<D, u8>(deserializer).map(|v| v != 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_row_decodes_string_encoded_numbers() {
        let row = json!({
            "cid": "12",
            "pid": "4",
            "channel_order": "0",
            "channel_name": "Lounge",
            "total_clients": "3",
            "channel_flag_permanent": "0",
            "channel_flag_semi_permanent": "1",
            "channel_needed_subscribe_power": "0"
        });

        let ch: QueryChannel = serde_json::from_value(row).unwrap();
        assert_eq!(ch.cid, 12);
        assert_eq!(ch.pid, 4);
        assert_eq!(ch.total_clients, 3);
        assert!(ch.channel_flag_semi_permanent);
        assert!(!ch.channel_flag_permanent);
        assert!(ch.extra.contains_key("channel_needed_subscribe_power"));
    }

    #[test]
    fn channel_row_without_flags_defaults_to_false() {
        let row = json!({ "cid": 1, "pid": 0, "channel_name": "Default Channel" });
        let ch: QueryChannel = serde_json::from_value(row).unwrap();
        assert_eq!(ch.total_clients, 0);
        assert!(!ch.channel_flag_default);
    }

    #[test]
    fn non_numeric_cid_is_rejected() {
        let row = json!({ "cid": "abc", "pid": "0", "channel_name": "x" });
        assert!(serde_json::from_value::<QueryChannel>(row).is_err());
    }

    #[test]
    fn envelope_without_body_is_empty() {
        let resp: QueryResponse<QueryChannel> =
            serde_json::from_value(json!({ "status": { "code": 0, "message": "ok" } })).unwrap();
        assert!(resp.body.is_empty());
        assert_eq!(resp.status.code, Status::OK);
    }

    #[test]
    fn create_params_only_flag_when_requested() {
        let mut req = ChannelCreate {
            name: "Bravo".into(),
            parent: 7,
            semi_permanent: false,
        };
        assert_eq!(req.params().len(), 2);

        req.semi_permanent = true;
        assert!(req.params().contains(&("channel_flag_semi_permanent", "1".into())));
    }
}
