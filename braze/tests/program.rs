//! Whole-pipeline assembly tests comparing against complete generated sources.

use braze::caps::ShaderCaps;
use braze::processor::{BlendStep, FragmentStep, GeometryStep, Pipeline};
use braze::program::{AttributeBinding, ProgramBuilder, UniformSlot};
use braze::swizzle::Swizzle;
use braze::types::{Dim, MatrixDim, ShaderStages, ShaderType};
use braze::var::{ShaderVar, TypeModifier};
use braze::varying::Interpolation;

fn textured_quad_pipeline() -> Pipeline {
  let geometry = GeometryStep::new(
    "unit-quad",
    vec![
      ShaderVar::new("a_Position", ShaderType::Float(Dim::D2), TypeModifier::In),
      ShaderVar::new("a_TexCoord", ShaderType::Float(Dim::D2), TypeModifier::In),
    ],
    vec![],
    ShaderVar::new("devicePos", ShaderType::Float(Dim::D2), TypeModifier::None),
    |ctx| {
      ctx
        .varyings
        .add_varying("v_TexCoord", ShaderType::Float(Dim::D2), Interpolation::Smooth);
      ctx
        .vertex
        .append_code("  v_TexCoord = a_TexCoord;\n  vec2 devicePos = a_Position;\n");
    },
  );

  let tint = FragmentStep::new("tint", |ctx| {
    let tint = ctx.uniforms.add_uniform(
      Some(ctx.owner),
      ShaderStages::FRAGMENT,
      ShaderType::Float(Dim::D4),
      "u_Tint",
    );
    let image = ctx.uniforms.add_sampler(Swizzle::RGBA, "u_Image");

    let tint_name = ctx.uniforms.uniform_variable(tint).unwrap().name().to_owned();
    let image_name = ctx.uniforms.sampler_variable(image).unwrap().name().to_owned();
    ctx.fragment.write_code(format_args!(
      "  vec4 color = texture({}, v_TexCoord) * {};\n",
      image_name, tint_name
    ));
  });

  let blend = BlendStep::new("src-over", |ctx| {
    ctx.fragment.append_code("  FragColor0 = color;\n");
  });

  Pipeline {
    geometry,
    fragments: vec![tint],
    blend: Some(blend),
  }
}

#[test]
fn textured_quad_sources() {
  let program = ProgramBuilder::new(ShaderCaps::default()).build(textured_quad_pipeline());

  assert_eq!(
    program.vertex_source,
    "#version 450 core\n\
     \n\
     layout(std140, set = 0, binding = 0) uniform UniformBlock {\n\
     \x20 layout(offset = 0) vec4 SV_Projection;\n\
     \x20 layout(offset = 16) vec4 u_Tint_1;\n\
     };\n\
     layout(location = 0) in vec2 a_Position;\n\
     layout(location = 1) in vec2 a_TexCoord;\n\
     out vec2 v_TexCoord;\n\
     \n\
     void main() {\n\
     \x20 v_TexCoord = a_TexCoord;\n\
     \x20 vec2 devicePos = a_Position;\n\
     \x20 gl_Position = vec4(devicePos.xy * SV_Projection.xz + SV_Projection.yw, 0.0, 1.0);\n\
     }\n"
  );

  assert_eq!(
    program.fragment_source,
    "#version 450 core\n\
     \n\
     layout(std140, set = 0, binding = 0) uniform UniformBlock {\n\
     \x20 layout(offset = 0) vec4 SV_Projection;\n\
     \x20 layout(offset = 16) vec4 u_Tint_1;\n\
     };\n\
     layout(set = 1, binding = 0) uniform sampler2D u_Image_0;\n\
     in vec2 v_TexCoord;\n\
     layout(location = 0, index = 0) out vec4 FragColor0;\n\
     \n\
     void main() {\n\
     \x20 vec4 color = texture(u_Image_0, v_TexCoord) * u_Tint_1;\n\
     \x20 FragColor0 = color;\n\
     }\n"
  );
}

#[test]
fn textured_quad_bindings() {
  let program = ProgramBuilder::new(ShaderCaps::default()).build(textured_quad_pipeline());
  let bindings = &program.bindings;

  assert_eq!(
    bindings.attributes,
    vec![
      AttributeBinding {
        name: "a_Position".to_owned(),
        location: 0,
      },
      AttributeBinding {
        name: "a_TexCoord".to_owned(),
        location: 1,
      },
    ]
  );

  assert_eq!(bindings.uniform_block_size, 32);
  assert_eq!(bindings.uniforms.len(), 3);

  assert_eq!(bindings.uniforms[0].raw_name, "SV_Projection");
  assert_eq!(bindings.uniforms[0].visibility, ShaderStages::VERTEX);
  assert_eq!(bindings.uniforms[0].slot, UniformSlot::BlockOffset(0));

  assert_eq!(bindings.uniforms[1].raw_name, "u_Tint");
  assert_eq!(bindings.uniforms[1].visibility, ShaderStages::FRAGMENT);
  assert_eq!(bindings.uniforms[1].slot, UniformSlot::BlockOffset(16));

  assert_eq!(bindings.uniforms[2].raw_name, "u_Image");
  assert_eq!(bindings.uniforms[2].slot, UniformSlot::Sampler(0));

  assert_eq!(bindings.varyings.len(), 1);
  assert_eq!(bindings.varyings[0].name, "v_TexCoord");
  assert_eq!(bindings.varyings[0].interpolation, Interpolation::Smooth);
}

#[test]
fn builds_are_deterministic() {
  let first = ProgramBuilder::new(ShaderCaps::default()).build(textured_quad_pipeline());
  let second = ProgramBuilder::new(ShaderCaps::default()).build(textured_quad_pipeline());

  assert_eq!(first.vertex_source, second.vertex_source);
  assert_eq!(first.fragment_source, second.fragment_source);
  assert_eq!(first.bindings.uniform_block_size, second.bindings.uniform_block_size);
}

#[test]
fn instanced_perspective_pipeline() {
  let geometry = GeometryStep::new(
    "instanced-mesh",
    vec![ShaderVar::new("a_Position", ShaderType::Float(Dim::D3), TypeModifier::In)],
    vec![
      ShaderVar::new("a_Model", ShaderType::Matrix(MatrixDim::D44), TypeModifier::In),
      ShaderVar::new("a_InstanceColor", ShaderType::Float(Dim::D4), TypeModifier::In),
    ],
    ShaderVar::new("devicePos", ShaderType::Float(Dim::D3), TypeModifier::None),
    |ctx| {
      ctx
        .varyings
        .add_varying("v_Color", ShaderType::Float(Dim::D4), Interpolation::Smooth);
      ctx.vertex.append_code(
        "  v_Color = a_InstanceColor;\n  vec3 devicePos = (a_Model * vec4(a_Position, 1.0)).xyz;\n",
      );
    },
  );

  let blend = BlendStep::new("coverage", |ctx| {
    let coverage = ctx.uniforms.add_uniform(
      Some(ctx.owner),
      ShaderStages::FRAGMENT,
      ShaderType::Float(Dim::Scalar),
      "u_Coverage",
    );
    let coverage_name = ctx
      .uniforms
      .uniform_variable(coverage)
      .unwrap()
      .name()
      .to_owned();

    ctx.fragment.enable_secondary_output();
    ctx.fragment.write_code(format_args!(
      "  FragColor0 = v_Color;\n  FragColor1 = vec4({});\n",
      coverage_name
    ));
  });

  let program = ProgramBuilder::new(ShaderCaps::default()).build(Pipeline {
    geometry,
    fragments: vec![],
    blend: Some(blend),
  });

  // mat4 takes one location per column
  assert_eq!(
    program.bindings.attributes,
    vec![
      AttributeBinding {
        name: "a_Position".to_owned(),
        location: 0,
      },
      AttributeBinding {
        name: "a_Model".to_owned(),
        location: 1,
      },
      AttributeBinding {
        name: "a_InstanceColor".to_owned(),
        location: 5,
      },
    ]
  );

  assert!(program.vertex_source.contains(
    "gl_Position = vec4(devicePos.xy * SV_Projection.xz + devicePos.zz * SV_Projection.yw, 0.0, devicePos.z);"
  ));
  assert!(program
    .fragment_source
    .contains("layout(location = 0, index = 1) out vec4 FragColor1;"));
  assert!(program.fragment_source.contains("FragColor1 = vec4(u_Coverage_1);"));
}
