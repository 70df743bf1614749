//! Shader Template Manager
//!
//! Manages WGSL shaders using the minijinja template engine and provides a
//! `ShaderModule` cache shared by every pass.
//!
//! Templates live in `src/renderer/shaders` and are embedded with
//! `rust-embed`. Debug builds on native targets read them from disk first so
//! shader edits do not need a rebuild.
//!
//! Template syntax: blocks use `{$ ... $}`, expressions `{{ ... }}`, and
//! line statements start with `$$`. Includes resolve against `chunks/`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use minijinja::{Environment, Error, ErrorKind, syntax::SyntaxConfig};
use rust_embed::RustEmbed;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_128;

use crate::errors::{MarqueeError, Result};

static SHADER_ENV: OnceLock<std::result::Result<Environment<'static>, String>> = OnceLock::new();

const SHADER_DIR: &str = "src/renderer/shaders";

#[derive(RustEmbed)]
#[folder = "src/renderer/shaders"]
struct ShaderAssets;

fn build_env() -> std::result::Result<Environment<'static>, String> {
    let mut env = Environment::new();

    let syntax = SyntaxConfig::builder()
        .block_delimiters("{$", "$}")
        .variable_delimiters("{{", "}}")
        .line_statement_prefix("$$")
        .build()
        .map_err(|e| e.to_string())?;

    env.set_syntax(syntax);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_undefined_behavior(minijinja::UndefinedBehavior::SemiStrict);
    env.set_loader(shader_loader);
    env.set_path_join_callback(|name, _parent| format!("chunks/{name}").into());

    Ok(env)
}

fn get_env() -> Result<&'static Environment<'static>> {
    SHADER_ENV
        .get_or_init(build_env)
        .as_ref()
        .map_err(|reason| MarqueeError::ShaderCompilation {
            name: "<environment>".to_string(),
            reason: reason.clone(),
        })
}

fn shader_loader(name: &str) -> std::result::Result<Option<String>, Error> {
    let filename = if std::path::Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wgsl"))
    {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("{name}.wgsl"))
    };

    #[cfg(all(debug_assertions, not(target_arch = "wasm32")))]
    {
        let path = std::path::Path::new(SHADER_DIR).join(filename.as_ref());
        if path.exists() {
            return std::fs::read_to_string(&path).map(Some).map_err(|e| {
                Error::new(
                    ErrorKind::TemplateNotFound,
                    format!("Failed to read file: {e}"),
                )
            });
        }
    }

    if let Some(file) = ShaderAssets::get(&filename)
        && let Ok(source) = std::str::from_utf8(file.data.as_ref())
    {
        return Ok(Some(source.to_string()));
    }

    Ok(None)
}

// ─── Defines ──────────────────────────────────────────────────────────────────

/// Template variables of one shader variant.
///
/// Ordered so that the same set of defines always renders the same source
/// (and therefore hits the same cache entry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ShaderDefines {
    values: BTreeMap<String, String>,
}

impl ShaderDefines {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl ToString) -> &mut Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Sets `key` to `"1"` when `enabled`; removes it otherwise.
    pub fn toggle(&mut self, key: &str, enabled: bool) -> &mut Self {
        if enabled {
            self.values.insert(key.to_string(), "1".to_string());
        } else {
            self.values.remove(key);
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Renders a template to final WGSL without touching the GPU.
pub fn render_template(template_name: &str, defines: &ShaderDefines) -> Result<String> {
    let env = get_env()?;
    let template = env.get_template(template_name)?;
    let source = template.render(&defines.values)?;
    Ok(format!("// === Generated from {template_name} ===\n{source}"))
}

// ─── ShaderManager ────────────────────────────────────────────────────────────

/// Shader module cache.
///
/// Deduplicates compiled `wgpu::ShaderModule`s by hashing the **final** WGSL
/// source with xxh3-128, so two variants that render identically share one
/// module.
#[derive(Default)]
pub struct ShaderManager {
    module_cache: FxHashMap<u128, wgpu::ShaderModule>,
}

impl ShaderManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles a template variant (or returns the cached module).
    ///
    /// Returns `(module, source_hash)`.
    pub fn get_or_compile(
        &mut self,
        device: &wgpu::Device,
        template_name: &str,
        defines: &ShaderDefines,
    ) -> Result<(wgpu::ShaderModule, u128)> {
        let source = render_template(template_name, defines)?;
        self.compile_source(device, template_name, source)
    }

    /// Compiles already rendered WGSL. Modules that fail validation are
    /// reported as [`MarqueeError::ShaderCompilation`] and never cached.
    pub fn compile_source(
        &mut self,
        device: &wgpu::Device,
        name: &str,
        source: String,
    ) -> Result<(wgpu::ShaderModule, u128)> {
        let hash = xxh3_128(source.as_bytes());
        if let Some(module) = self.module_cache.get(&hash) {
            return Ok((module.clone(), hash));
        }

        log::debug!("Compiling shader module {name} ({hash:032x})");
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("Shader Module {name}")),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        if let Some(error) = pollster::block_on(scope.pop()) {
            log::error!("Shader module {name} failed validation: {error}");
            return Err(MarqueeError::ShaderCompilation {
                name: name.to_string(),
                reason: error.to_string(),
            });
        }

        self.module_cache.insert(hash, module.clone());
        Ok((module, hash))
    }

    /// Returns the number of cached shader modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.module_cache.len()
    }

    pub fn clear(&mut self) {
        self.module_cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (template, has fragment stage)
    const ALL_TEMPLATES: [(&str, bool); 10] = [
        ("passes/gbuffer", true),
        ("passes/shadow", false),
        ("passes/ssao", true),
        ("passes/ssao_blur", true),
        ("passes/lighting", true),
        ("passes/bloom_threshold", true),
        ("passes/bloom_downsample", true),
        ("passes/bloom_upsample", true),
        ("passes/tone_mapping", true),
        ("passes/fxaa", true),
    ];

    #[test]
    fn every_template_renders_with_default_defines() {
        for (name, has_fragment) in ALL_TEMPLATES {
            let source = render_template(name, &ShaderDefines::new())
                .unwrap_or_else(|e| panic!("{name}: {e}"));
            assert!(source.contains("fn vs_main"), "{name} has no vertex entry");
            assert_eq!(source.contains("fn fs_main"), has_fragment, "{name}");
            assert!(!source.contains("{$"), "{name} left template syntax behind");
        }
    }

    #[test]
    fn chunks_are_inlined() {
        let source = render_template("passes/lighting", &ShaderDefines::new()).unwrap();
        assert!(source.contains("struct FullscreenOutput"));
        assert!(source.contains("var t_depth: texture_depth_2d"));
    }

    #[test]
    fn fxaa_defaults_to_medium_iterations() {
        let source = render_template("passes/fxaa", &ShaderDefines::new()).unwrap();
        assert!(source.contains("const EDGE_SEARCH_STEPS: i32 = 8;"));
    }

    #[test]
    fn fxaa_iterations_are_substituted() {
        let mut defines = ShaderDefines::new();
        defines.set("FXAA_ITERATIONS", 12);
        let source = render_template("passes/fxaa", &defines).unwrap();
        assert!(source.contains("const EDGE_SEARCH_STEPS: i32 = 12;"));
    }

    #[test]
    fn tone_mapping_bloom_variant_declares_bloom_texture() {
        let plain = render_template("passes/tone_mapping", &ShaderDefines::new()).unwrap();
        let mut defines = ShaderDefines::new();
        defines.toggle("USE_BLOOM", true);
        let bloom = render_template("passes/tone_mapping", &defines).unwrap();
        assert!(!plain.contains("t_bloom"));
        assert!(bloom.contains("t_bloom"));
    }

    #[test]
    fn missing_template_is_an_error() {
        assert!(render_template("passes/does_not_exist", &ShaderDefines::new()).is_err());
    }
}
