/// Frame uniforms shared by every pipeline (bind group 0).
const FRAME_UNIFORMS: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    light_pos: vec4<f32>,
    light_color: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

// Cube maps are stored with +X on the viewer's left, as in the source images.
fn cube_dir(dir: vec3<f32>) -> vec3<f32> {
    return vec3<f32>(-dir.x, dir.y, dir.z);
}
"#;

/// Metal/rough shading with a normal map, one point light, ambient light,
/// and environment reflections.
const STANDARD_BODY: &str = r#"
struct Object {
    model: mat4x4<f32>,
    normal_matrix: mat4x4<f32>,
};

@group(1) @binding(0)
var<uniform> object: Object;

struct Material {
    color: vec4<f32>,
    // metalness, roughness, normal_scale.x, normal_scale.y
    params: vec4<f32>,
    // has_map, has_normal_map, has_env_map, unused
    flags: vec4<f32>,
};

@group(2) @binding(0)
var<uniform> material: Material;
@group(2) @binding(1)
var base_map: texture_2d<f32>;
@group(2) @binding(2)
var normal_map: texture_2d<f32>;
@group(2) @binding(3)
var env_map: texture_cube<f32>;
@group(2) @binding(4)
var tex_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) tangent: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tangent: vec4<f32>,
    @location(3) uv: vec2<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = object.model * vec4<f32>(vertex.position, 1.0);
    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_pos = world.xyz;
    out.normal = normalize((object.normal_matrix * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.tangent = vec4<f32>(
        normalize((object.model * vec4<f32>(vertex.tangent.xyz, 0.0)).xyz),
        vertex.tangent.w,
    );
    out.uv = vertex.uv;
    return out;
}

const PI: f32 = 3.14159265359;

fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn geometry_smith(n_dot_v: f32, n_dot_l: f32, roughness: f32) -> f32 {
    let r = roughness + 1.0;
    let k = r * r / 8.0;
    let gv = n_dot_v / (n_dot_v * (1.0 - k) + k);
    let gl = n_dot_l / (n_dot_l * (1.0 - k) + k);
    return gv * gl;
}

fn fresnel_schlick(cos_theta: f32, f0: vec3<f32>) -> vec3<f32> {
    return f0 + (1.0 - f0) * pow(1.0 - cos_theta, 5.0);
}

fn fresnel_schlick_roughness(cos_theta: f32, f0: vec3<f32>, roughness: f32) -> vec3<f32> {
    return f0 + (max(vec3<f32>(1.0 - roughness), f0) - f0) * pow(1.0 - cos_theta, 5.0);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let geometric_normal = normalize(in.normal);
    let view_dir = normalize(frame.camera_pos.xyz - in.world_pos);

    // Sample everything up front; selection happens afterwards.
    let base_sample = textureSample(base_map, tex_sampler, in.uv);
    let normal_sample = textureSample(normal_map, tex_sampler, in.uv).xyz * 2.0 - 1.0;

    let t = normalize(in.tangent.xyz - geometric_normal * dot(geometric_normal, in.tangent.xyz));
    let b = cross(geometric_normal, t) * in.tangent.w;
    let scaled = vec3<f32>(normal_sample.xy * material.params.zw, normal_sample.z);
    let mapped = normalize(mat3x3<f32>(t, b, geometric_normal) * scaled);
    let n = select(geometric_normal, mapped, material.flags.y > 0.5);

    let reflected = reflect(-view_dir, n);
    let env_sample = textureSample(env_map, tex_sampler, cube_dir(reflected)).rgb;

    let albedo = material.color.rgb * select(vec3<f32>(1.0), base_sample.rgb, material.flags.x > 0.5);
    let metalness = clamp(material.params.x, 0.0, 1.0);
    let roughness = clamp(material.params.y, 0.04, 1.0);

    let light_dir = normalize(frame.light_pos.xyz - in.world_pos);
    let half_dir = normalize(view_dir + light_dir);
    let n_dot_v = max(dot(n, view_dir), 1e-4);
    let n_dot_l = max(dot(n, light_dir), 0.0);
    let n_dot_h = max(dot(n, half_dir), 0.0);
    let h_dot_v = max(dot(half_dir, view_dir), 0.0);

    let f0 = mix(vec3<f32>(0.04), albedo, metalness);
    let f = fresnel_schlick(h_dot_v, f0);
    let specular = distribution_ggx(n_dot_h, roughness) * geometry_smith(n_dot_v, n_dot_l, roughness) * f
        / (4.0 * n_dot_v * n_dot_l + 1e-4);
    let kd = (vec3<f32>(1.0) - f) * (1.0 - metalness);
    let direct = (kd * albedo / PI + specular) * frame.light_color.rgb * PI * n_dot_l;

    let diffuse_ambient = frame.ambient.rgb * albedo * (1.0 - metalness);
    let env_fresnel = fresnel_schlick_roughness(n_dot_v, f0, roughness);
    let env = select(vec3<f32>(0.0), env_sample * env_fresnel * (1.0 - 0.5 * roughness), material.flags.z > 0.5);

    return vec4<f32>(diffuse_ambient + direct + env, 1.0);
}
"#;

/// Fullscreen triangle that samples the background cube map.
const SKYBOX_BODY: &str = r#"
@group(1) @binding(0)
var sky: texture_cube<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

@vertex
fn vs_sky(@builtin(vertex_index) index: u32) -> SkyOutput {
    let uv = vec2<f32>(f32((index << 1u) & 2u), f32(index & 2u));
    let ndc = uv * 2.0 - 1.0;
    var out: SkyOutput;
    out.clip_position = vec4<f32>(ndc, 1.0, 1.0);
    out.ndc = ndc;
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let far = frame.inv_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = normalize(far.xyz / far.w - frame.camera_pos.xyz);
    return vec4<f32>(textureSample(sky, sky_sampler, cube_dir(dir)).rgb, 1.0);
}
"#;

pub fn standard_shader() -> String {
    format!("{FRAME_UNIFORMS}{STANDARD_BODY}")
}

pub fn skybox_shader() -> String {
    format!("{FRAME_UNIFORMS}{SKYBOX_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_share_frame_uniforms() {
        for src in [standard_shader(), skybox_shader()] {
            assert!(src.contains("var<uniform> frame: Frame"));
        }
    }

    #[test]
    fn entry_points_present() {
        let standard = standard_shader();
        assert!(standard.contains("fn vs_main") && standard.contains("fn fs_main"));
        let sky = skybox_shader();
        assert!(sky.contains("fn vs_sky") && sky.contains("fn fs_sky"));
    }
}
