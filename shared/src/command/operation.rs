use strokesync_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedInteger};

use crate::ids::CommandId;

/// One sample along a stroke
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub pressure: f32,
}

impl StrokePoint {
    pub fn new(x: f32, y: f32, z: f32, pressure: f32) -> Self {
        Self { x, y, z, pressure }
    }

    fn distance(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl Serde for StrokePoint {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.x.ser(writer);
        self.y.ser(writer);
        self.z.ser(writer);
        self.pressure.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            x: f32::de(reader)?,
            y: f32::de(reader)?,
            z: f32::de(reader)?,
            pressure: f32::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        128
    }
}

/// Geometry derived from a stroke's samples. Never sent; rebuilt on the
/// receiving side when the command is materialized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeGeometry {
    pub min: [f32; 3],
    pub max: [f32; 3],
    pub length: f32,
}

impl StrokeGeometry {
    pub fn from_points(points: &[StrokePoint]) -> Self {
        let Some(first) = points.first() else {
            return Self {
                min: [0.0; 3],
                max: [0.0; 3],
                length: 0.0,
            };
        };

        let mut min = [first.x, first.y, first.z];
        let mut max = min;
        let mut length = 0.0;
        for window in points.windows(2) {
            length += window[0].distance(&window[1]);
        }
        for point in points {
            for (axis, value) in [point.x, point.y, point.z].into_iter().enumerate() {
                min[axis] = min[axis].min(value);
                max[axis] = max[axis].max(value);
            }
        }

        Self { min, max, length }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StrokeData {
    pub stroke_id: CommandId,
    pub brush: u16,
    pub color: [u8; 4],
    pub size: f32,
    pub points: Vec<StrokePoint>,
    /// Filled in by `Operation::materialize`
    pub geometry: Option<StrokeGeometry>,
}

impl StrokeData {
    pub fn new(brush: u16, color: [u8; 4], size: f32, points: Vec<StrokePoint>) -> Self {
        Self {
            stroke_id: CommandId::generate(),
            brush,
            color,
            size,
            points,
            geometry: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DeleteData {
    pub stroke_ids: Vec<CommandId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnvironmentData {
    pub preset: u16,
    pub fog_density: f32,
}

/// Groups child commands under one undoable step, e.g. "paste selection"
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundData {
    pub label: String,
}

/// Every editing operation the replication layer knows how to carry
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    CreateStroke(StrokeData),
    DeleteStrokes(DeleteData),
    SetEnvironment(EnvironmentData),
    Compound(CompoundData),
}

impl Operation {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operation::CreateStroke(_) => "CreateStroke",
            Operation::DeleteStrokes(_) => "DeleteStrokes",
            Operation::SetEnvironment(_) => "SetEnvironment",
            Operation::Compound(_) => "Compound",
        }
    }

    /// Rebuilds any local state the scene needs before the operation is
    /// applied. Safe to call more than once.
    pub fn materialize(&mut self) {
        match self {
            Operation::CreateStroke(stroke) => {
                if stroke.geometry.is_none() {
                    stroke.geometry = Some(StrokeGeometry::from_points(&stroke.points));
                }
            }
            Operation::DeleteStrokes(_) | Operation::SetEnvironment(_) | Operation::Compound(_) => {}
        }
    }

    fn kind_index(&self) -> u8 {
        match self {
            Operation::CreateStroke(_) => 0,
            Operation::DeleteStrokes(_) => 1,
            Operation::SetEnvironment(_) => 2,
            Operation::Compound(_) => 3,
        }
    }
}

impl Serde for Operation {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedInteger::<2>::new(self.kind_index()).ser(writer);

        match self {
            Operation::CreateStroke(stroke) => {
                stroke.stroke_id.ser(writer);
                stroke.brush.ser(writer);
                stroke.color.ser(writer);
                stroke.size.ser(writer);
                stroke.points.ser(writer);
            }
            Operation::DeleteStrokes(delete) => {
                delete.stroke_ids.ser(writer);
            }
            Operation::SetEnvironment(environment) => {
                environment.preset.ser(writer);
                environment.fog_density.ser(writer);
            }
            Operation::Compound(compound) => {
                compound.label.ser(writer);
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match UnsignedInteger::<2>::de(reader)?.get() {
            0 => Ok(Operation::CreateStroke(StrokeData {
                stroke_id: CommandId::de(reader)?,
                brush: u16::de(reader)?,
                color: <[u8; 4]>::de(reader)?,
                size: f32::de(reader)?,
                points: Vec::<StrokePoint>::de(reader)?,
                geometry: None,
            })),
            1 => Ok(Operation::DeleteStrokes(DeleteData {
                stroke_ids: Vec::<CommandId>::de(reader)?,
            })),
            2 => Ok(Operation::SetEnvironment(EnvironmentData {
                preset: u16::de(reader)?,
                fog_density: f32::de(reader)?,
            })),
            3 => Ok(Operation::Compound(CompoundData {
                label: String::de(reader)?,
            })),
            _ => Err(SerdeErr),
        }
    }
}
