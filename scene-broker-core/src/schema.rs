//! Command schema
//!
//! Every scene mutation the consumer understands is described here. Raw
//! request bodies carry strings exactly as a caller sent them; converting a
//! request into its typed parameters is the single place field constraints
//! are checked. Past that point nothing re-validates strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::SchemaError;

/// Slot-filled parameters as produced by the external fill step.
pub type ParameterMap = BTreeMap<String, String>;

// ─── Command kinds ────────────────────────────────────────────

/// Every instruction kind the consumer executes.
///
/// The free-text classifier only ever produces the first five; `Snap` and
/// `Scale` arrive through their direct routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Spawn,
    Move,
    Replace,
    Rotate,
    Remove,
    Snap,
    Scale,
}

impl CommandKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandKind::Spawn => "spawn",
            CommandKind::Move => "move",
            CommandKind::Replace => "replace",
            CommandKind::Rotate => "rotate",
            CommandKind::Remove => "remove",
            CommandKind::Snap => "snap",
            CommandKind::Scale => "scale",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Enumerated fields ────────────────────────────────────────

/// Declares a closed string enumeration with case-insensitive parsing and an
/// `ALLOWED` table used in violation messages.
macro_rules! choice_field {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALLOWED: &'static [&'static str] = &[$($text),+];

            pub fn parse(raw: &str) -> Result<Self, SchemaError> {
                let normalized = raw.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(SchemaError::InvalidChoice {
                        field: $field,
                        value: raw.to_string(),
                        allowed: Self::ALLOWED,
                    }),
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                $name::parse(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

choice_field! {
    /// Placement or movement direction relative to an object.
    Direction, "direction" {
        Left => "left",
        Right => "right",
        Front => "front",
        Back => "back",
        Top => "top",
        Bottom => "bottom",
        Default => "default",
    }
}

choice_field! {
    /// Rotation axis; `reset` restores all axes.
    RotationAxis, "axis" {
        X => "x",
        Y => "y",
        Z => "z",
        Reset => "reset",
        Default => "default",
    }
}

choice_field! {
    ScaleMode, "axis" {
        XUp => "x_up",
        YUp => "y_up",
        ZUp => "z_up",
        XDown => "x_down",
        YDown => "y_down",
        ZDown => "z_down",
        Multiply => "multiply",
        Increase => "increase",
        Decrease => "decrease",
        Reset => "reset",
        Default => "default",
    }
}

// ─── Scalar field checks ──────────────────────────────────────

fn require_name(field: &'static str, raw: String) -> Result<String, SchemaError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::Empty { field });
    }
    Ok(trimmed.to_string())
}

/// Non-negative integer written with ASCII digits only. Digit strings past
/// `u64::MAX` are `OutOfRange`, not `NotNumeric`.
fn parse_count(field: &'static str, raw: &str) -> Result<u64, SchemaError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SchemaError::NotNumeric {
            field,
            value: raw.to_string(),
        });
    }
    trimmed.parse::<u64>().map_err(|_| SchemaError::OutOfRange {
        field,
        value: raw.to_string(),
    })
}

/// Signed decimal; rejects NaN and infinities.
fn parse_degrees(field: &'static str, raw: &str) -> Result<f64, SchemaError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(SchemaError::NotNumeric {
            field,
            value: raw.to_string(),
        }),
    }
}

/// Numbers travel to the consumer as strings.
mod as_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        raw.trim().parse::<T>().map_err(serde::de::Error::custom)
    }
}

// ─── Request bodies (unvalidated) ─────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub reference_object: String,
    pub prefab: String,
    pub direction: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRequest {
    pub prefab: String,
    pub direction: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRequest {
    pub prefab: String,
    pub object_to_replace: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RotateRequest {
    pub prefab: String,
    pub axis: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveRequest {
    pub prefab: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapRequest {
    pub snap_point: String,
    pub prefab: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaleRequest {
    pub prefab: String,
    pub axis: String,
    pub value: String,
}

// ─── Validated parameters ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnParams {
    pub prefab: String,
    /// Anchor object; the sentinel `"default"` means no anchor.
    pub reference_object: String,
    pub direction: Direction,
    #[serde(with = "as_string")]
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveParams {
    pub prefab: String,
    pub direction: Direction,
    #[serde(with = "as_string")]
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceParams {
    pub prefab: String,
    pub object_to_replace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotateParams {
    pub prefab: String,
    pub axis: RotationAxis,
    /// Degrees.
    #[serde(with = "as_string")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveParams {
    pub prefab: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapParams {
    pub snap_point: String,
    pub prefab: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    pub prefab: String,
    pub axis: ScaleMode,
    #[serde(with = "as_string")]
    pub value: u64,
}

impl TryFrom<SpawnRequest> for SpawnParams {
    type Error = SchemaError;

    fn try_from(req: SpawnRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            direction: Direction::parse(&req.direction)?,
            value: parse_count("value", &req.value)?,
            prefab: require_name("prefab", req.prefab)?,
            reference_object: require_name("reference_object", req.reference_object)?,
        })
    }
}

impl TryFrom<MoveRequest> for MoveParams {
    type Error = SchemaError;

    fn try_from(req: MoveRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            direction: Direction::parse(&req.direction)?,
            value: parse_count("value", &req.value)?,
            prefab: require_name("prefab", req.prefab)?,
        })
    }
}

impl TryFrom<ReplaceRequest> for ReplaceParams {
    type Error = SchemaError;

    fn try_from(req: ReplaceRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            prefab: require_name("prefab", req.prefab)?,
            object_to_replace: require_name("object_to_replace", req.object_to_replace)?,
        })
    }
}

impl TryFrom<RotateRequest> for RotateParams {
    type Error = SchemaError;

    fn try_from(req: RotateRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            axis: RotationAxis::parse(&req.axis)?,
            value: parse_degrees("value", &req.value)?,
            prefab: require_name("prefab", req.prefab)?,
        })
    }
}

impl TryFrom<RemoveRequest> for RemoveParams {
    type Error = SchemaError;

    fn try_from(req: RemoveRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            prefab: require_name("prefab", req.prefab)?,
        })
    }
}

impl TryFrom<SnapRequest> for SnapParams {
    type Error = SchemaError;

    fn try_from(req: SnapRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            snap_point: require_name("snap_point", req.snap_point)?,
            prefab: require_name("prefab", req.prefab)?,
        })
    }
}

impl TryFrom<ScaleRequest> for ScaleParams {
    type Error = SchemaError;

    fn try_from(req: ScaleRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            axis: ScaleMode::parse(&req.axis)?,
            value: parse_count("value", &req.value)?,
            prefab: require_name("prefab", req.prefab)?,
        })
    }
}

// ─── Instruction ──────────────────────────────────────────────

/// A fully validated command, ready for the dispatch queue.
///
/// Serializes as `{"action": "<kind>", "parameters": {...}}`, the shape the
/// consumer pops from the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "parameters", rename_all = "lowercase")]
pub enum Instruction {
    Spawn(SpawnParams),
    Move(MoveParams),
    Replace(ReplaceParams),
    Rotate(RotateParams),
    Remove(RemoveParams),
    Snap(SnapParams),
    Scale(ScaleParams),
}

impl Instruction {
    pub fn kind(&self) -> CommandKind {
        match self {
            Instruction::Spawn(_) => CommandKind::Spawn,
            Instruction::Move(_) => CommandKind::Move,
            Instruction::Replace(_) => CommandKind::Replace,
            Instruction::Rotate(_) => CommandKind::Rotate,
            Instruction::Remove(_) => CommandKind::Remove,
            Instruction::Snap(_) => CommandKind::Snap,
            Instruction::Scale(_) => CommandKind::Scale,
        }
    }

    /// The object the instruction acts on.
    pub fn prefab(&self) -> &str {
        match self {
            Instruction::Spawn(p) => &p.prefab,
            Instruction::Move(p) => &p.prefab,
            Instruction::Replace(p) => &p.prefab,
            Instruction::Rotate(p) => &p.prefab,
            Instruction::Remove(p) => &p.prefab,
            Instruction::Snap(p) => &p.prefab,
            Instruction::Scale(p) => &p.prefab,
        }
    }

    /// Build an instruction from a slot-filled parameter map.
    ///
    /// Missing fields surface as `SchemaError::Malformed`; present-but-invalid
    /// values surface as the field-level variant. Extra keys are ignored.
    pub fn from_parameters(kind: CommandKind, parameters: ParameterMap) -> Result<Self, SchemaError> {
        let value = serde_json::to_value(&parameters).map_err(|e| SchemaError::Malformed {
            kind,
            reason: e.to_string(),
        })?;
        let malformed = |e: serde_json::Error| SchemaError::Malformed {
            kind,
            reason: e.to_string(),
        };

        match kind {
            CommandKind::Spawn => {
                let req: SpawnRequest = serde_json::from_value(value).map_err(malformed)?;
                Ok(Instruction::Spawn(req.try_into()?))
            }
            CommandKind::Move => {
                let req: MoveRequest = serde_json::from_value(value).map_err(malformed)?;
                Ok(Instruction::Move(req.try_into()?))
            }
            CommandKind::Replace => {
                let req: ReplaceRequest = serde_json::from_value(value).map_err(malformed)?;
                Ok(Instruction::Replace(req.try_into()?))
            }
            CommandKind::Rotate => {
                let req: RotateRequest = serde_json::from_value(value).map_err(malformed)?;
                Ok(Instruction::Rotate(req.try_into()?))
            }
            CommandKind::Remove => {
                let req: RemoveRequest = serde_json::from_value(value).map_err(malformed)?;
                Ok(Instruction::Remove(req.try_into()?))
            }
            CommandKind::Snap => {
                let req: SnapRequest = serde_json::from_value(value).map_err(malformed)?;
                Ok(Instruction::Snap(req.try_into()?))
            }
            CommandKind::Scale => {
                let req: ScaleRequest = serde_json::from_value(value).map_err(malformed)?;
                Ok(Instruction::Scale(req.try_into()?))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
