// Copyright 2026 The hevk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Inspect
//!
//! Look at what reflection sees in a set of shaders, and check that a device accepts the layouts
//! built from them.
//!
//! ## Usage
//!
//! ```text
//! hevk-inspect reflect shaders/mesh.mesh.glsl shaders/mesh.frag.glsl
//! hevk-inspect compile shaders/cull.comp cull.comp.spv
//! HEVK_VALIDATION=1 hevk-inspect program --compute --push-constants 16 cull.comp.spv
//! ```
//!
//! Files ending in `.spv` are loaded, anything else is compiled.  An argument that is not a file is
//! treated as a shader name such as `cull.comp` and looked up as `shaders/cull.comp.spv`, then
//! `shaders/cull.comp.glsl`, in the asset directories (`HEVK_ASSETS_DIR` first).  Set
//! `RUST_LOG=debug` to see the details.
//!
//! ```text
//! HEVK_ASSETS_DIR=./assets hevk-inspect reflect mesh.mesh mesh.frag
//! ```

mod report;

use std::path::{Path, PathBuf};

use ash::vk;
use clap::{Parser, Subcommand};

use hevk_assets::{AssetDirs, AssetError, CompilerConfig};
use hevk_spirv::{ReflectError, ShaderMetadata, ShaderStage};
use hevk_vulkan::pipeline::{self, RenderingFormats};
use hevk_vulkan::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "hevk-inspect")]
#[command(about = "Shader reflection and Vulkan binding layouts.", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(flatten)]
    compiler: CompilerArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct CompilerArgs {
    /// GLSL compiler binary (default: HEVK_GLSLANG or glslangValidator)
    #[arg(long, global = true)]
    glslang: Option<String>,

    /// Compiler target environment
    #[arg(long, global = true, default_value = "vulkan1.2")]
    target_env: String,

    /// Rewrite `#define VertexPulling` in vertex shaders
    #[arg(long, global = true)]
    vertex_pulling: Option<bool>,
}

impl CompilerArgs {
    fn config(&self) -> CompilerConfig {
        let mut config = CompilerConfig::default();
        if let Some(glslang) = &self.glslang {
            config.compiler = glslang.clone();
        }
        config.target_env = self.target_env.clone();
        config.vertex_pulling = self.vertex_pulling;
        config
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print reflected metadata and the merged binding table
    Reflect(ReflectArgs),
    /// Compile GLSL to SPIR-V, checking that it reflects
    Compile(CompileArgs),
    /// Build a program and pipeline on a real device
    Program(ProgramArgs),
}

#[derive(clap::Args, Debug)]
struct ReflectArgs {
    /// Shader files or asset names that will be used together
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct CompileArgs {
    source: PathBuf,
    dest: PathBuf,
}

#[derive(clap::Args, Debug)]
struct ProgramArgs {
    /// Shaders that will be used together
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Build a compute program instead of a graphics program
    #[arg(long)]
    compute: bool,

    /// Push constant range size in bytes
    #[arg(long, default_value_t = 0)]
    push_constants: u32,
}

#[derive(Debug, thiserror::Error)]
enum InspectError {
    #[error("{0}")]
    Asset(#[from] AssetError),
    #[error("{0}")]
    Reflect(#[from] ReflectError),
    #[error("{0}")]
    Vulkan(#[from] VulkanError),
    #[error("{path:?}: {source}")]
    Shader {
        path: PathBuf,
        #[source]
        source: Box<InspectError>,
    },
    #[error("a compute program takes exactly one compute shader")]
    ComputeShaderCount,
}

fn main() -> Result<(), InspectError> {
    env_logger::init();
    let args = Args::parse();
    let config = args.compiler.config();
    let dirs = AssetDirs::new();

    match args.command {
        Command::Reflect(a) => cmd_reflect(a, &config, &dirs),
        Command::Compile(a) => cmd_compile(a, &config),
        Command::Program(a) => cmd_program(a, &config, &dirs),
    }
}

fn load(
    path: &Path,
    config: &CompilerConfig,
    dirs: &AssetDirs,
) -> Result<Vec<u32>, InspectError> {
    let words = match path.to_str() {
        Some(name) if !path.exists() => dirs.find_or_compile(name, config),
        _ => hevk_assets::load_or_compile(path, config),
    };
    words.map_err(|e| InspectError::Shader {
        path: path.to_owned(),
        source: Box::new(e.into()),
    })
}

fn reflect(path: &Path, words: &[u32]) -> Result<ShaderMetadata, InspectError> {
    ShaderMetadata::from_words(words).map_err(|e| InspectError::Shader {
        path: path.to_owned(),
        source: Box::new(e.into()),
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_reflect(
    args: ReflectArgs,
    config: &CompilerConfig,
    dirs: &AssetDirs,
) -> Result<(), InspectError> {
    let mut shaders = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let words = load(path, config, dirs)?;
        let metadata = reflect(path, &words)?;
        print!("{}", report::metadata(&display_name(path), &metadata));
        shaders.push(metadata);
    }

    let table = BindingTable::aggregate(&shaders)?;
    println!();
    print!("{}", report::table(&table));
    Ok(())
}

fn cmd_compile(args: CompileArgs, config: &CompilerConfig) -> Result<(), InspectError> {
    let words = hevk_assets::compile_glsl(&args.source, config)?;
    let metadata = reflect(&args.source, &words)?;
    hevk_assets::save_spirv(&args.dest, &words)?;
    log::info!("wrote {} words to {:?}", words.len(), args.dest);
    print!("{}", report::metadata(&display_name(&args.source), &metadata));
    Ok(())
}

fn cmd_program(
    args: ProgramArgs,
    config: &CompilerConfig,
    dirs: &AssetDirs,
) -> Result<(), InspectError> {
    let words = args
        .files
        .iter()
        .map(|path| load(path, config, dirs))
        .collect::<Result<Vec<_>, _>>()?;

    let context = VkContext::new()?;
    println!("{}", report::capabilities(&context.capabilities));

    let result = build_program(&context, &args, &words);
    context.destroy();
    result
}

fn build_program(
    context: &VkContext,
    args: &ProgramArgs,
    words: &[Vec<u32>],
) -> Result<(), InspectError> {
    let device = context.device();

    let mut shaders = Vec::with_capacity(words.len());
    for (path, words) in args.files.iter().zip(words) {
        match Shader::new(device, words) {
            Ok(shader) => shaders.push(shader),
            Err(e) => {
                shaders.iter().for_each(|s| s.destroy(device));
                return Err(InspectError::Shader {
                    path: path.clone(),
                    source: Box::new(e.into()),
                });
            }
        }
    }

    let result = build_pipeline(context, args, &shaders);
    shaders.iter().for_each(|s| s.destroy(device));
    result
}

fn build_pipeline(
    context: &VkContext,
    args: &ProgramArgs,
    shaders: &[Shader],
) -> Result<(), InspectError> {
    let device = context.device();
    let bind_point = if args.compute {
        vk::PipelineBindPoint::COMPUTE
    } else {
        vk::PipelineBindPoint::GRAPHICS
    };

    if args.compute && shaders.len() != 1 {
        return Err(InspectError::ComputeShaderCount);
    }

    let metadata: Vec<_> = shaders.iter().map(|s| &s.metadata).collect();
    let program = Program::new(
        device,
        bind_point,
        &metadata,
        args.push_constants,
        context.capabilities.push_descriptors,
    )?;
    print!("{}", report::table(&program.bindings));

    let pipeline = if args.compute {
        pipeline::create_compute_pipeline(
            device,
            vk::PipelineCache::null(),
            &shaders[0],
            program.layout,
            &[],
        )
    } else {
        let formats = RenderingFormats {
            color: vec![vk::Format::B8G8R8A8_UNORM],
            depth: vk::Format::D32_SFLOAT,
        };
        let shaders: Vec<_> = shaders.iter().collect();
        pipeline::create_graphics_pipeline(
            device,
            vk::PipelineCache::null(),
            &formats,
            &shaders,
            program.layout,
            &[],
        )
    };

    let result = match pipeline {
        Ok(pipeline) => {
            let stages: Vec<ShaderStage> = shaders.iter().map(Shader::stage).collect();
            println!("pipeline created for {stages:?}");
            unsafe { device.destroy_pipeline(pipeline, None) };
            Ok(())
        }
        Err(e) => Err(e.into()),
    };
    program.destroy(device);
    result
}
