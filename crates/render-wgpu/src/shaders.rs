use vantage_render::RenderError;

/// Name of the built-in lit vertex stage.
pub const BUILTIN_VERTEX: &str = "pbr.vert";
/// Name of the built-in lit fragment stage.
pub const BUILTIN_FRAGMENT: &str = "pbr.frag";

/// Lit mesh shader: instanced, four point lights, metallic/roughness
/// material packed per instance.
pub const MESH_SHADER: &str = r#"
struct Light {
    position_range: vec4<f32>,
    color_intensity: vec4<f32>,
};

struct Uniforms {
    view_proj: mat4x4<f32>,
    eye: vec4<f32>,
    lights: array<Light, 4>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) albedo_metallic: vec4<f32>,
    @location(7) roughness_ao: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) albedo_metallic: vec4<f32>,
    @location(3) roughness_ao: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize((model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.albedo_metallic = instance.albedo_metallic;
    out.roughness_ao = instance.roughness_ao;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = in.albedo_metallic.rgb;
    let metallic = in.albedo_metallic.a;
    let roughness = clamp(in.roughness_ao.x, 0.05, 1.0);
    let ao = in.roughness_ao.y;

    let n = normalize(in.world_normal);
    let v = normalize(uniforms.eye.xyz - in.world_pos);
    let shininess = 2.0 / (roughness * roughness) - 2.0;
    let specular_tint = mix(vec3<f32>(0.04), albedo, metallic);

    var color = vec3<f32>(0.03) * albedo * ao;
    for (var i = 0u; i < 4u; i = i + 1u) {
        let light = uniforms.lights[i];
        let to_light = light.position_range.xyz - in.world_pos;
        let dist = length(to_light);
        let l = to_light / max(dist, 0.0001);
        let h = normalize(l + v);
        let range = max(light.position_range.w, 0.0001);
        let falloff = clamp(1.0 - pow(dist / range, 4.0), 0.0, 1.0);
        let attenuation = light.color_intensity.w * falloff * falloff / max(dist * dist, 0.01);
        let radiance = light.color_intensity.rgb * attenuation;

        let n_dot_l = max(dot(n, l), 0.0);
        let diffuse = (1.0 - metallic) * albedo / 3.14159265;
        let specular = specular_tint * pow(max(dot(n, h), 0.0), shininess) * (shininess + 8.0) / 25.1327412;
        color = color + (diffuse + specular) * radiance * n_dot_l;
    }

    let mapped = color / (color + vec3<f32>(1.0));
    return vec4<f32>(mapped, 1.0);
}
"#;

/// Unlit line shader for the fallback grid.
pub const LINE_SHADER: &str = r#"
struct Uniforms {
    mvp: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.mvp * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Resolve a vertex/fragment pair to WGSL source.
///
/// The built-in names map to [`MESH_SHADER`]. Anything else is read from
/// disk: one file when both names are the same path, otherwise the two
/// files concatenated. The result must define `vs_main` and `fs_main` and
/// use the mesh uniform and vertex layout.
pub fn resolve(vertex: &str, fragment: &str) -> Result<String, RenderError> {
    let load_err = |reason: String| RenderError::ShaderLoad {
        vertex: vertex.to_string(),
        fragment: fragment.to_string(),
        reason,
    };

    if vertex == BUILTIN_VERTEX && fragment == BUILTIN_FRAGMENT {
        return Ok(MESH_SHADER.to_string());
    }

    let read = |path: &str| std::fs::read_to_string(path).map_err(|e| load_err(format!("{path}: {e}")));
    let source = if vertex == fragment {
        read(vertex)?
    } else {
        let mut source = read(vertex)?;
        source.push('\n');
        source.push_str(&read(fragment)?);
        source
    };

    for entry in ["fn vs_main", "fn fs_main"] {
        if !source.contains(entry) {
            return Err(load_err(format!("missing entry point `{entry}`")));
        }
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_names_resolve_to_mesh_shader() {
        assert_eq!(resolve("pbr.vert", "pbr.frag").unwrap(), MESH_SHADER);
    }

    #[test]
    fn half_builtin_pair_is_read_from_disk() {
        let err = resolve("pbr.vert", "nope.frag").unwrap_err();
        assert!(matches!(err, RenderError::ShaderLoad { .. }));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let err = resolve("/definitely/not/here.wgsl", "/definitely/not/here.wgsl").unwrap_err();
        match err {
            RenderError::ShaderLoad { vertex, reason, .. } => {
                assert_eq!(vertex, "/definitely/not/here.wgsl");
                assert!(reason.contains("here.wgsl"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn single_file_with_both_stages_loads() {
        let path = std::env::temp_dir().join("vantage-shader-single.wgsl");
        std::fs::write(&path, MESH_SHADER).unwrap();
        let p = path.to_str().unwrap();
        assert_eq!(resolve(p, p).unwrap(), MESH_SHADER);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn split_stages_are_concatenated() {
        let dir = std::env::temp_dir();
        let vert = dir.join("vantage-shader-split.vert.wgsl");
        let frag = dir.join("vantage-shader-split.frag.wgsl");
        std::fs::write(&vert, "fn vs_main() {}").unwrap();
        std::fs::write(&frag, "fn fs_main() {}").unwrap();
        let source = resolve(vert.to_str().unwrap(), frag.to_str().unwrap()).unwrap();
        assert_eq!(source, "fn vs_main() {}\nfn fs_main() {}");
        std::fs::remove_file(&vert).ok();
        std::fs::remove_file(&frag).ok();
    }

    #[test]
    fn source_without_entry_points_is_rejected() {
        let path = std::env::temp_dir().join("vantage-shader-empty.wgsl");
        std::fs::write(&path, "// nothing here").unwrap();
        let p = path.to_str().unwrap();
        let err = resolve(p, p).unwrap_err();
        assert!(err.to_string().contains("vs_main"));
        std::fs::remove_file(&path).ok();
    }
}
