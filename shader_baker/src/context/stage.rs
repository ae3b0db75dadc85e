/// Pipeline stages a shader can be written for

use std::fmt;
use bitflags::bitflags;

/// Shader pipeline stage
///
/// Fixed at shader creation time. The discriminants are not meaningful; use
/// [`ShaderStage::gl_enum`] for the GL shader type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Geometry shader
    Geometry,
    /// Fragment shader
    Fragment,
}

impl ShaderStage {
    /// Every stage, in pipeline order
    pub const ALL: [ShaderStage; 3] = [
        ShaderStage::Vertex,
        ShaderStage::Geometry,
        ShaderStage::Fragment,
    ];

    /// GL shader type enum (`GL_VERTEX_SHADER`, ...)
    pub fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => 0x8B31,
            ShaderStage::Geometry => 0x8DD9,
            ShaderStage::Fragment => 0x8B30,
        }
    }

    /// Lowercase stage name, as used in link error messages
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// A set of pipeline stages
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StageFlags: u32 {
        const VERTEX = 0x01;
        const GEOMETRY = 0x02;
        const FRAGMENT = 0x04;
    }
}

impl From<ShaderStage> for StageFlags {
    fn from(stage: ShaderStage) -> Self {
        match stage {
            ShaderStage::Vertex => StageFlags::VERTEX,
            ShaderStage::Geometry => StageFlags::GEOMETRY,
            ShaderStage::Fragment => StageFlags::FRAGMENT,
        }
    }
}

impl StageFlags {
    /// Build a set from a list of stages
    pub fn from_stages(stages: impl IntoIterator<Item = ShaderStage>) -> Self {
        stages
            .into_iter()
            .fold(StageFlags::empty(), |flags, stage| flags | StageFlags::from(stage))
    }

    /// Whether `stage` is in the set
    pub fn contains_stage(self, stage: ShaderStage) -> bool {
        self.contains(StageFlags::from(stage))
    }

    /// Stages in the set, in pipeline order
    pub fn stages(self) -> impl Iterator<Item = ShaderStage> {
        ShaderStage::ALL
            .into_iter()
            .filter(move |stage| self.contains_stage(*stage))
    }
}
