//! Sparse PATCH bodies for staged Connection API configuration.
//!
//! The Connection API merges a PATCH into the staged document, so the body
//! should carry only what the user changed. For `transport_params` that
//! means one object per leg, holding just the fields edited on that leg; an
//! empty object leaves the leg alone.

use crate::error::AdapterResult;
use crate::transport::SDP_MEDIA_TYPE;
use nmos_browser_types::ResourceFamily;
use serde::Serialize;
use serde_json::{Map, Value};

/// Body of a `PATCH .../staged` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StagedPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master_enable: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<ActivationPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_params: Option<Vec<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_file: Option<TransportFilePatch>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ActivationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_time: Option<Value>,
}

/// New transport file. Both fields `null` removes the staged file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportFilePatch {
    pub data: Option<String>,
    #[serde(rename = "type")]
    pub media_type: Option<String>,
}

impl TransportFilePatch {
    /// An SDP transport file.
    #[must_use]
    pub fn sdp(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
            media_type: Some(SDP_MEDIA_TYPE.to_string()),
        }
    }

    /// Removal of the staged transport file.
    #[must_use]
    pub fn cleared() -> Self {
        Self {
            data: None,
            media_type: None,
        }
    }
}

impl StagedPatch {
    /// Serializes to the wire body.
    pub fn to_json(&self) -> AdapterResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Builds the PATCH body that takes `previous` to `next`.
///
/// `previous` is the staged document as last read, `next` the edited one.
#[must_use]
pub fn synthesize(resource: &ResourceFamily, previous: Option<&Value>, next: &Value) -> StagedPatch {
    let mut patch = StagedPatch {
        master_enable: next.get("master_enable").cloned(),
        activation: activation_patch(next.get("activation")),
        ..Default::default()
    };

    match resource {
        ResourceFamily::Receivers => patch.sender_id = next.get("sender_id").cloned(),
        ResourceFamily::Senders => patch.receiver_id = next.get("receiver_id").cloned(),
        _ => {}
    }

    patch.transport_params = diff_transport_params(
        previous.and_then(|p| p.get("transport_params")),
        next.get("transport_params"),
    );

    let previous_file = previous.and_then(|p| p.pointer("/transport_file/data"));
    let next_file = next.pointer("/transport_file/data");
    if previous_file != next_file {
        patch.transport_file = Some(match next_file.and_then(Value::as_str) {
            Some(sdp) if !sdp.is_empty() => TransportFilePatch::sdp(sdp),
            _ => TransportFilePatch::cleared(),
        });
    }

    patch
}

fn activation_patch(activation: Option<&Value>) -> Option<ActivationPatch> {
    let activation = activation?.as_object()?;
    let patch = ActivationPatch {
        mode: activation.get("mode").cloned(),
        requested_time: activation.get("requested_time").cloned(),
    };
    (patch.mode.is_some() || patch.requested_time.is_some()).then_some(patch)
}

/// Per-leg diff of two `transport_params` arrays.
///
/// Returns `None` when the arrays are equal or `next` is not an array.
/// Otherwise the result has one slot per leg of `next`. A slot holds the
/// fields whose value differs from `previous` on the same leg. Fields and
/// legs that exist only in `next` are not reported, and neither are fields
/// removed in `next`.
#[must_use]
pub fn diff_transport_params(
    previous: Option<&Value>,
    next: Option<&Value>,
) -> Option<Vec<Map<String, Value>>> {
    let next = next?.as_array()?;
    let previous = previous.and_then(Value::as_array);
    if previous == Some(next) {
        return None;
    }

    let mut slots = vec![Map::new(); next.len()];
    let Some(previous) = previous else {
        return Some(slots);
    };

    for (slot, (before, after)) in slots.iter_mut().zip(previous.iter().zip(next)) {
        let (Some(before), Some(after)) = (before.as_object(), after.as_object()) else {
            continue;
        };
        for (field, value) in after {
            if let Some(old) = before.get(field) {
                if old != value {
                    slot.insert(field.clone(), value.clone());
                }
            }
        }
    }

    Some(slots)
}
