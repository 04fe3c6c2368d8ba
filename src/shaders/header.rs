use askama::Template;
use log::*;
use rustc_hash::FxHashMap;

use crate::error::{HeaderGenError, Result};

use super::json::*;

pub mod collect;
pub mod layout;
pub mod names;

use collect::collect_symbols;
use layout::build_layout;

const WORDS_PER_LINE: usize = 8;

/// Everything about the generated header that isn't reflected from the shader.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// prepended to every generated struct name
    pub struct_prefix: String,
    /// prepended to the payload, size and name constants
    pub global_prefix: String,
    pub shader_name: String,
    /// canonical glsl type name -> c type used verbatim for matching fields
    pub custom_type_overrides: FxHashMap<String, String>,
    /// copied into the header right after the prelude
    pub extra_prelude: String,
}

/// Renders the complete header for one stage.
///
/// Nothing is returned unless every struct could be laid out; the caller
/// writes the text out in one go.
pub fn generate_header(
    reflection: &ReflectionJson,
    payload: &[u32],
    config: &GeneratorConfig,
) -> Result<String> {
    let shader_name = &config.shader_name;
    let collected = collect_symbols(reflection);

    let mut defines = vec![];
    for block in reflection
        .uniform_blocks
        .iter()
        .chain(&reflection.buffer_blocks)
    {
        defines.push(Define::new("SLOT", shader_name, block));
    }
    for attribute in reflection.pipe_inputs.iter().chain(&reflection.pipe_outputs) {
        defines.push(Define::new("ATTR", shader_name, attribute));
    }
    for uniform in &collected.unhandled_uniforms {
        defines.push(Define::new("SLOT", shader_name, uniform));
    }

    let mut structs = vec![];
    for struct_type in collected.structs.iter() {
        let layout = build_layout(struct_type, config)?;
        debug!(
            "laid out struct {} ({} bytes, align {})",
            struct_type.type_name, layout.size, layout.alignment
        );

        structs.push(StructDefinition {
            struct_name: struct_type.type_name.clone(),
            tag: format!(
                "{}{}_{}",
                config.struct_prefix, shader_name, struct_type.type_name
            ),
            alias: format!("{}{}", config.struct_prefix, struct_type.type_name),
            fields: layout.entries.iter().map(|entry| entry.to_string()).collect(),
        });
    }

    info!(
        "generating header for {shader_name}: {} words, {} defines, {} structs",
        payload.len(),
        defines.len(),
        structs.len()
    );

    let template = ShaderHeader {
        source_file_name: &reflection.source_file_name,
        extra_prelude: &config.extra_prelude,
        global_prefix: &config.global_prefix,
        shader_name,
        payload_lines: payload_lines(payload),
        payload_len: payload.len(),
        defines,
        structs,
    };

    template.render().map_err(HeaderGenError::from)
}

/// the payload as comma separated hex literals, eight per line
fn payload_lines(payload: &[u32]) -> Vec<String> {
    let line_count = payload.len().div_ceil(WORDS_PER_LINE);

    payload
        .chunks(WORDS_PER_LINE)
        .enumerate()
        .map(|(index, chunk)| {
            let mut line = chunk
                .iter()
                .map(|word| format!("0x{word:08x}"))
                .collect::<Vec<_>>()
                .join(", ");
            if index + 1 < line_count {
                line.push(',');
            }
            line
        })
        .collect()
}

#[derive(Template)]
#[template(path = "header.h.askama", escape = "none")]
struct ShaderHeader<'a> {
    source_file_name: &'a str,
    extra_prelude: &'a str,
    global_prefix: &'a str,
    shader_name: &'a str,
    payload_lines: Vec<String>,
    payload_len: usize,
    defines: Vec<Define>,
    structs: Vec<StructDefinition>,
}

#[derive(Debug)]
struct Define {
    name: String,
    value: i32,
}

impl Define {
    fn new(kind: &str, shader_name: &str, symbol: &ReflectedSymbol) -> Self {
        Self {
            name: format!("{kind}_{shader_name}_{}", symbol.name),
            value: symbol.binding,
        }
    }
}

#[derive(Debug)]
struct StructDefinition {
    struct_name: String,
    /// the struct tag and its full typedef name
    tag: String,
    /// the short typedef used by fields of other structs
    alias: String,
    fields: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            shader_name: "basic".to_string(),
            ..Default::default()
        }
    }

    fn globals_reflection() -> ReflectionJson {
        let mut reflection = ReflectionJson {
            source_file_name: "basic.vert".to_string(),
            ..Default::default()
        };
        reflection.push(ReflectedSymbol::new(
            "Globals",
            SymbolCategory::UniformBlock,
            0,
            TypeDescriptor::structure(
                "Globals",
                vec![
                    StructMember::new("viewProj", TypeDescriptor::matrix(4, 4)),
                    StructMember::new("lightDir", TypeDescriptor::vector(BasicKind::Float, 3)),
                    StructMember::new("time", TypeDescriptor::scalar(BasicKind::Float)),
                ],
            ),
        ));
        reflection
    }

    fn position_of(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing '{needle}' in:\n{haystack}"))
    }

    #[test]
    fn globals_block_header() {
        let header = generate_header(&globals_reflection(), &[1, 2, 3], &config()).unwrap();

        assert!(header.contains("#define SLOT_basic_Globals 0\n"));
        assert!(header.contains("typedef struct basic_Globals Globals;\n"));
        assert!(header.contains("/// Struct for Globals\n"));
        assert!(header.contains(
            "typedef struct basic_Globals {\n    float viewProj[4][4];\n    float lightDir[3];\n    float time;\n} basic_Globals;\n"
        ));
        assert!(!header.contains("_padding"));
    }

    #[test]
    fn globals_layout_is_80_bytes() {
        let reflection = globals_reflection();
        let globals = reflection.uniform_blocks[0].symbol_type.as_struct().unwrap();
        let layout = build_layout(globals, &config()).unwrap();

        assert_eq!(layout.size, 80);
    }

    #[test]
    fn payload_words_eight_per_line() {
        let payload: Vec<u32> = (0..10).collect();
        let header = generate_header(&ReflectionJson::default(), &payload, &config()).unwrap();

        assert!(header.contains(
            "static const uint32_t basic_spv[] = {\n    0x00000000, 0x00000001, 0x00000002, 0x00000003, 0x00000004, 0x00000005, 0x00000006, 0x00000007,\n    0x00000008, 0x00000009\n};\n"
        ));
        assert!(header.contains("static const size_t basic_spv_size = 10;\n"));
        assert!(header.contains("static const char* basic_name = \"basic\";\n"));
    }

    #[test]
    fn global_prefix_applies_to_payload_constants() {
        let config = GeneratorConfig {
            global_prefix: "g_".to_string(),
            ..config()
        };
        let header = generate_header(&ReflectionJson::default(), &[7], &config).unwrap();

        assert!(header.contains("static const uint32_t g_basic_spv[] = {"));
        assert!(header.contains("static const size_t g_basic_spv_size = 1;"));
        assert!(header.contains("static const char* g_basic_name = \"basic\";"));
    }

    #[test]
    fn sections_are_in_order() {
        let mut reflection = globals_reflection();
        reflection.push(ReflectedSymbol::new(
            "Particles",
            SymbolCategory::BufferBlock,
            1,
            TypeDescriptor::structure(
                "Particles",
                vec![StructMember::new(
                    "positions",
                    TypeDescriptor::vector(BasicKind::Float, 4).unbounded_array(),
                )],
            ),
        ));
        reflection.push(ReflectedSymbol::new(
            "inPosition",
            SymbolCategory::PipeInput,
            0,
            TypeDescriptor::vector(BasicKind::Float, 3),
        ));
        reflection.push(ReflectedSymbol::new(
            "outColor",
            SymbolCategory::PipeOutput,
            1,
            TypeDescriptor::vector(BasicKind::Float, 4),
        ));
        reflection.push(ReflectedSymbol::new(
            "albedo",
            SymbolCategory::LooseUniform,
            2,
            TypeDescriptor::scalar(BasicKind::Unknown),
        ));

        let config = GeneratorConfig {
            extra_prelude: "typedef float real;\n".to_string(),
            ..config()
        };
        let header = generate_header(&reflection, &[0x0723_0203], &config).unwrap();

        let order = [
            "#pragma once",
            "extern \"C\" {",
            "typedef float real;",
            "static const uint32_t basic_spv[]",
            "#define SLOT_basic_Globals 0",
            "#define SLOT_basic_Particles 1",
            "#define ATTR_basic_inPosition 0",
            "#define ATTR_basic_outColor 1",
            "#define SLOT_basic_albedo 2",
            "typedef struct basic_Globals Globals;",
            "typedef struct basic_Particles Particles;",
            "/// Struct for Globals",
            "/// Struct for Particles",
            "#ifdef __cplusplus\n}",
        ];

        let positions: Vec<usize> = order
            .iter()
            .map(|needle| position_of(&header, needle))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{header}");
    }

    #[test]
    fn shared_struct_emitted_once() {
        let light = TypeDescriptor::structure(
            "Light",
            vec![StructMember::new(
                "color",
                TypeDescriptor::vector(BasicKind::Float, 4),
            )],
        );

        let mut reflection = ReflectionJson::default();
        for (binding, name) in ["Scene", "Shadow", "Probe"].into_iter().enumerate() {
            reflection.push(ReflectedSymbol::new(
                name,
                SymbolCategory::UniformBlock,
                binding as i32,
                TypeDescriptor::structure(name, vec![StructMember::new("light", light.clone())]),
            ));
        }

        let config = GeneratorConfig {
            struct_prefix: "P".to_string(),
            ..config()
        };
        let header = generate_header(&reflection, &[0], &config).unwrap();

        assert_eq!(header.matches("typedef struct Pbasic_Light PLight;").count(), 1);
        assert_eq!(header.matches("/// Struct for Light\n").count(), 1);
        assert!(header.contains("    PLight light;\n"));
        assert!(
            position_of(&header, "/// Struct for Light")
                < position_of(&header, "/// Struct for Scene")
        );
    }

    #[test]
    fn identical_input_identical_output() {
        let reflection = globals_reflection();
        let first = generate_header(&reflection, &[1, 2], &config()).unwrap();
        let second = generate_header(&reflection, &[1, 2], &config()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unsupported_member_fails_whole_header() {
        let mut reflection = ReflectionJson::default();
        reflection.push(ReflectedSymbol::new(
            "Broken",
            SymbolCategory::UniformBlock,
            0,
            TypeDescriptor::structure(
                "Broken",
                vec![StructMember::new(
                    "value",
                    TypeDescriptor::scalar(BasicKind::Unknown),
                )],
            ),
        ));

        let err = generate_header(&reflection, &[0], &config()).unwrap_err();
        assert!(matches!(err, HeaderGenError::UnsupportedType { .. }));
    }

    #[test]
    fn override_skips_builtin_suffixes() {
        let mut config = config();
        config
            .custom_type_overrides
            .insert("mat4".to_string(), "mat4_t".to_string());

        let header = generate_header(&globals_reflection(), &[0], &config).unwrap();

        assert!(header.contains("    mat4_t viewProj;\n"));
    }
}
