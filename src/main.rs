use std::path::PathBuf;

use clap::Parser;
use log::*;
use rustc_hash::FxHashMap;

use glsl_header_gen::build_tasks::{self, Config};
use glsl_header_gen::shader_watcher;
use glsl_header_gen::shaders::ShaderStage;
use glsl_header_gen::util::default_output_path;

/// Compiles a glsl shader to spirv and writes a c header with the payload,
/// binding defines and layout-matched structs
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// glsl source file, or a precompiled '.spv' module
    input: PathBuf,

    /// header to write; defaults to '<input stem>.h' in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// vert, frag or comp; guessed from the file name when omitted
    #[arg(short, long)]
    stage: Option<ShaderStage>,

    /// prefix for generated struct names
    #[arg(short = 'p', long = "prefix", default_value = "")]
    struct_prefix: String,

    /// prefix for the payload, size and name constants
    #[arg(short, long, default_value = "")]
    global_prefix: String,

    /// <glsl type>=<c type>, used verbatim for matching fields
    #[arg(short = 'm', long = "map")]
    type_maps: Vec<String>,

    /// file copied into the header before the payload
    #[arg(short = 'P', long)]
    prelude: Option<PathBuf>,

    /// directory searched for `#include <...>`
    #[arg(short = 'I', long = "include-dir")]
    include_dirs: Vec<PathBuf>,

    /// also write the reflected symbols as json
    #[arg(long)]
    reflection_json: Option<PathBuf>,

    /// regenerate whenever the source changes
    #[arg(short, long)]
    watch: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<Config> {
        let mut custom_type_overrides = FxHashMap::default();
        for type_map in &self.type_maps {
            let (glsl_type, c_type) = build_tasks::parse_type_map(type_map)?;
            custom_type_overrides.insert(glsl_type, c_type);
        }

        let extra_prelude = match &self.prelude {
            Some(prelude_path) => build_tasks::read_prelude(prelude_path)?,
            None => String::new(),
        };

        let stage = self.stage.unwrap_or_else(|| {
            let file_name = self.input.to_string_lossy();
            ShaderStage::guess_from_file_name(&file_name)
        });

        let output_path = self
            .output
            .unwrap_or_else(|| default_output_path(&self.input));

        Ok(Config {
            input_path: self.input,
            output_path,
            stage,
            struct_prefix: self.struct_prefix,
            global_prefix: self.global_prefix,
            custom_type_overrides,
            extra_prelude,
            include_dirs: self.include_dirs,
            reflection_json_path: self.reflection_json,
        })
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse();
    let watch = args.watch;
    let config = args.into_config()?;

    if !watch {
        build_tasks::write_header(&config)?;
        return Ok(());
    }

    let mut ignored = vec![config.output_path.as_path()];
    if let Some(json_path) = &config.reflection_json_path {
        ignored.push(json_path.as_path());
    }
    let mut shader_changes =
        shader_watcher::watch(&config.input_path, &config.include_dirs, &ignored)?;

    loop {
        match build_tasks::write_header(&config) {
            Ok(()) => info!("header up to date, waiting for changes"),
            Err(e) => error!("{e}"),
        }

        let events = shader_changes.wait_for_changes()?;
        debug!("source changed: {events:?}");
    }
}
