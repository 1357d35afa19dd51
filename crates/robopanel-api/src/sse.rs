// ── Server-sent-event framing and path application ──
//
// The store's subscription surface speaks `text/event-stream`: frames of
// `event:`/`data:` lines separated by a blank line. Each `put`/`patch`
// frame carries `{"path": "/sub/path", "data": <json>}` relative to the
// watched location; the watch loop keeps the current value and applies
// frames to it so subscribers always see the full channel value.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;

/// A complete frame: the `event:` name plus joined `data:` payload.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct SseFrame {
    pub event: String,
    pub data: String,
}

/// Incremental frame parser. Feed it decoded chunks in arrival order;
/// it returns every frame completed by that chunk.
#[derive(Debug, Default)]
pub(crate) struct SseFrameParser {
    buf: String,
}

impl SseFrameParser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn feed(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buf.push_str(chunk);

        let mut frames = Vec::new();
        // A blank line terminates a frame. Only consume fully-terminated
        // frames; a partial tail stays buffered for the next chunk.
        while let Some(end) = self.buf.find("\n\n") {
            let raw: String = self.buf.drain(..end + 2).collect();
            if let Some(frame) = parse_frame(&raw) {
                frames.push(frame);
            }
        }
        frames
    }
}

fn parse_frame(raw: &str) -> Option<SseFrame> {
    let mut event = None;
    let mut data_lines = Vec::new();

    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("event:") {
            event = Some(rest.trim().to_owned());
        } else if let Some(rest) = line.strip_prefix("data:") {
            data_lines.push(rest.strip_prefix(' ').unwrap_or(rest));
        }
        // Comment lines (leading ':') and unknown fields are ignored.
    }

    event.map(|event| SseFrame {
        event,
        data: data_lines.join("\n"),
    })
}

/// Payload of a `put`/`patch` frame.
#[derive(Debug, Deserialize)]
pub(crate) struct PathPayload {
    pub path: String,
    pub data: Value,
}

impl PathPayload {
    pub(crate) fn parse(data: &str) -> Result<Self, Error> {
        serde_json::from_str(data).map_err(|e| Error::StreamProtocol {
            detail: format!("bad put/patch payload: {e}"),
        })
    }
}

/// Apply a `put` (replace) or `patch` (merge keys) at `path` within
/// `current`. A `put` of `null` removes the node, matching the store's
/// delete semantics.
pub(crate) fn apply_update(current: &mut Value, path: &str, data: Value, merge: bool) {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let target = descend_mut(current, &segments);

    if merge {
        let incoming = match data {
            Value::Object(map) => map,
            // A non-object patch degenerates to replacement.
            other => {
                *target = other;
                return;
            }
        };
        if !target.is_object() {
            *target = Value::Object(serde_json::Map::new());
        }
        if let Some(obj) = target.as_object_mut() {
            for (key, value) in incoming {
                if value.is_null() {
                    obj.remove(&key);
                } else {
                    obj.insert(key, value);
                }
            }
        }
    } else if data.is_null() {
        *target = Value::Null;
        prune_nulls(current);
    } else {
        *target = data;
    }
}

/// Read the value at a `/`-separated path, `null` if absent.
pub(crate) fn value_at_path<'v>(root: &'v Value, path: &str) -> &'v Value {
    let mut node = root;
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        match node.get(segment) {
            Some(child) => node = child,
            None => return &Value::Null,
        }
    }
    node
}

fn descend_mut<'v>(root: &'v mut Value, segments: &[&str]) -> &'v mut Value {
    let mut node = root;
    for segment in segments {
        if !node.is_object() {
            *node = Value::Object(serde_json::Map::new());
        }
        node = node
            .as_object_mut()
            .expect("just coerced to object")
            .entry((*segment).to_owned())
            .or_insert(Value::Null);
    }
    node
}

/// Drop `null` leaves and the empty objects they leave behind, so deleted
/// children don't linger as tombstones.
fn prune_nulls(node: &mut Value) {
    if let Some(obj) = node.as_object_mut() {
        obj.values_mut().for_each(prune_nulls);
        obj.retain(|_, v| !v.is_null() && !v.as_object().is_some_and(serde_json::Map::is_empty));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parser_handles_split_chunks() {
        let mut parser = SseFrameParser::new();
        assert!(parser.feed("event: put\ndata: {\"path\":\"/\",").is_empty());

        let frames = parser.feed("\"data\":1}\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event, "put");
        assert_eq!(frames[0].data, "{\"path\":\"/\",\"data\":1}");
    }

    #[test]
    fn parser_yields_multiple_frames_from_one_chunk() {
        let mut parser = SseFrameParser::new();
        let frames =
            parser.feed("event: keep-alive\ndata: null\n\nevent: put\ndata: {\"path\":\"/\",\"data\":2}\n\n");
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event, "keep-alive");
        assert_eq!(frames[1].event, "put");
    }

    #[test]
    fn put_at_root_replaces() {
        let mut current = json!({"old": true});
        apply_update(&mut current, "/", json!({"fresh": 1}), false);
        assert_eq!(current, json!({"fresh": 1}));
    }

    #[test]
    fn put_at_subpath_creates_intermediates() {
        let mut current = Value::Null;
        apply_update(&mut current, "/w1/title", json!("leak"), false);
        assert_eq!(current, json!({"w1": {"title": "leak"}}));
    }

    #[test]
    fn put_null_removes_the_node() {
        let mut current = json!({"w1": {"title": "leak"}, "w2": {"title": "low"}});
        apply_update(&mut current, "/w1", Value::Null, false);
        assert_eq!(current, json!({"w2": {"title": "low"}}));
    }

    #[test]
    fn patch_merges_keys_without_clobbering() {
        let mut current = json!({"isOnline": true, "waterLevel": 10});
        apply_update(&mut current, "/", json!({"waterLevel": 900}), true);
        assert_eq!(current, json!({"isOnline": true, "waterLevel": 900}));
    }

    #[test]
    fn value_at_path_reads_nested_and_absent() {
        let root = json!({"a": {"b": 7}});
        assert_eq!(value_at_path(&root, "a/b"), &json!(7));
        assert_eq!(value_at_path(&root, "a/missing"), &Value::Null);
    }
}
