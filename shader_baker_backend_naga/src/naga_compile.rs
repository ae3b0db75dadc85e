/// GLSL → naga module, with GL-style compile logs

use shader_baker::baker::ShaderStage;
use crate::naga_interface::StageInterface;

/// What a successful compile keeps around for linking
#[derive(Debug, Clone)]
pub(crate) struct CompiledShader {
    pub interface: StageInterface,
}

pub(crate) fn naga_stage(stage: ShaderStage) -> Option<naga::ShaderStage> {
    match stage {
        ShaderStage::Vertex => Some(naga::ShaderStage::Vertex),
        ShaderStage::Fragment => Some(naga::ShaderStage::Fragment),
        ShaderStage::Geometry => None,
    }
}

/// Parse and validate `source`; the error is the compile log
pub(crate) fn compile(stage: ShaderStage, source: &str) -> Result<CompiledShader, String> {
    let Some(naga_stage) = naga_stage(stage) else {
        return Err(format!("error: {} shaders are not supported by the naga backend", stage));
    };

    let options = naga::front::glsl::Options::from(naga_stage);
    let module = naga::front::glsl::Frontend::default()
        .parse(&options, source)
        .map_err(|err| err.emit_to_string(source))?;

    let Some(entry_point) = module.entry_points.iter().find(|ep| ep.stage == naga_stage) else {
        return Err(format!("error: no {} entry point 'main'", stage));
    };

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    if let Err(err) = validator.validate(&module) {
        return Err(err.emit_to_string(source));
    }

    Ok(CompiledShader {
        interface: StageInterface::of(&module, &entry_point.function),
    })
}
