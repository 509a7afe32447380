//! # Kiln Compiler
//!
//! This crate turns a data-model schema into a TypeScript + Bun CRUD API
//! project: request validators, handlers, a router, an authorization policy
//! artifact and test scaffolding. It supports multiple schema formats
//! through a pluggable frontend architecture.
//!
//! ## Supported Formats
//!
//! - JSON introspection documents (default)
//!
//! ## Architecture
//!
//! ```text
//! Schema Documents (JSON)
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Frontend   │  Format-specific parsing + normalization
//! │ (doc → IR)   │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │    Synth     │  Operation plans, procedure specs, rule table
//! │ (IR → data)  │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Validate   │  Structure + cross-artifact name consistency
//! │   (data)     │
//! └──────┬───────┘
//!        │
//!        ▼
//! ┌──────────────┐
//! │   Codegen    │  Render specs into TypeScript + Bun project
//! │ (data → TS)  │
//! └──────────────┘
//! ```
//!
//! Synthesis is pure in-memory data transformation and completes fully
//! before emission begins; emission never makes a decision of its own.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kiln_compiler::{Compiler, GeneratorConfig};
//!
//! let config = GeneratorConfig {
//!     schema_dir: "schema".into(),
//!     out_dir: ".kiln".into(),
//!     ..GeneratorConfig::default()
//! };
//!
//! let compiler = Compiler::new(config);
//! compiler.generate().await?;
//! ```

pub mod codegen;
pub mod config;
pub mod diagnostic;
pub mod frontend;
pub mod ir;
pub mod synth;
pub mod validate;

use std::path::PathBuf;

pub use config::GeneratorConfig;
pub use diagnostic::GeneratorError;

use ir::SchemaIR;
use synth::{OperationPlan, Synthesis};

/// The main compiler struct that orchestrates the generation pipeline.
pub struct Compiler {
    config: GeneratorConfig,
}

impl Compiler {
    /// Creates a new compiler with the given configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Runs the full pipeline and writes the generated module files.
    ///
    /// 1. Create the frontend for the configured format
    /// 2. Parse and normalize schema documents into IR
    /// 3. Resolve operation plans
    /// 4. Validate schema structure against the plans
    /// 5. Synthesize procedures and the rule table
    /// 6. Verify cross-artifact name consistency
    /// 7. Render and write TypeScript output
    pub async fn generate(&self) -> Result<GenerateResult, GeneratorError> {
        let (schema, plans, synthesis) = self.synthesize_all()?;
        let policy_import = self.resolve_policy_import(true)?;

        let generated = codegen::generate(
            &schema,
            &plans,
            &synthesis,
            &self.config,
            policy_import.as_deref(),
        )?;
        self.write_output(&generated)?;

        Ok(GenerateResult::of(&schema, &synthesis))
    }

    /// Runs the full pipeline and writes a standalone project: generated
    /// modules plus package.json, tsconfig.json, entry point, .gitignore
    /// and README.
    pub async fn generate_project(
        &self,
        project_name: &str,
        port: u16,
    ) -> Result<GenerateResult, GeneratorError> {
        let (schema, plans, synthesis) = self.synthesize_all()?;
        let policy_import = self.resolve_policy_import(true)?;

        let mut generated = codegen::generate(
            &schema,
            &plans,
            &synthesis,
            &self.config,
            policy_import.as_deref(),
        )?;

        generated.files.push((
            "package.json".to_string(),
            codegen::project::generate_package_json(project_name),
        ));
        generated.files.push((
            "tsconfig.json".to_string(),
            codegen::project::generate_tsconfig().to_string(),
        ));
        generated.files.push((
            "src/index.ts".to_string(),
            codegen::project::generate_index_ts(port),
        ));
        generated.files.push((
            ".gitignore".to_string(),
            codegen::project::generate_gitignore().to_string(),
        ));
        generated.files.push((
            "README.md".to_string(),
            codegen::project::generate_readme(project_name),
        ));

        self.write_output(&generated)?;

        Ok(GenerateResult::of(&schema, &synthesis))
    }

    /// Validates schema and synthesis without writing any output.
    pub async fn check(&self) -> Result<GenerateResult, GeneratorError> {
        let (schema, _, synthesis) = self.synthesize_all()?;
        self.resolve_policy_import(false)?;
        Ok(GenerateResult::of(&schema, &synthesis))
    }

    /// Frontend → plans → structure validation → synthesis → consistency.
    fn synthesize_all(
        &self,
    ) -> Result<(SchemaIR, Vec<OperationPlan>, Synthesis), GeneratorError> {
        let mut frontend = frontend::create_frontend(&self.config.format)?;
        let schema = frontend.parse_directory(&self.config.schema_dir)?;

        let plans = synth::plan::resolve_all(&schema, &self.config);
        validate::validate_structure(&schema, &plans)?;

        let synthesis = synth::synthesize(&schema, &plans, &self.config)?;
        validate::validate_consistency(&synthesis)?;

        Ok((schema, plans, synthesis))
    }

    /// Resolves the custom policy module into the specifier the generated
    /// `policy.ts` imports.
    ///
    /// Bare module specifiers pass through verbatim; absolute paths are
    /// used as-is; anything else resolves project-relative, from the
    /// generated directory to the module. When `check_exists` is set,
    /// path-like sources must exist on disk.
    fn resolve_policy_import(&self, check_exists: bool) -> Result<Option<String>, GeneratorError> {
        let Some(module) = &self.config.custom_policy else {
            return Ok(None);
        };

        let as_str = module.to_string_lossy();
        if is_bare_specifier(&as_str) {
            return Ok(Some(as_str.into_owned()));
        }

        let target = if module.is_absolute() {
            module.clone()
        } else {
            self.config.out_dir.join(module)
        };

        if check_exists && !target.exists() {
            return Err(GeneratorError::CustomPolicyNotFound { path: target });
        }

        if module.is_absolute() {
            return Ok(Some(strip_ts_extension(&as_str).to_string()));
        }

        let generated_dir = self.config.out_dir.join("src").join("generated");
        let relative = pathdiff::diff_paths(&target, &generated_dir)
            .unwrap_or_else(|| PathBuf::from("../..").join(module));
        let mut specifier = relative.to_string_lossy().replace('\\', "/");
        specifier = strip_ts_extension(&specifier).to_string();
        if !specifier.starts_with('.') {
            specifier = format!("./{specifier}");
        }
        Ok(Some(specifier))
    }

    /// Writes generated code to the output directory.
    ///
    /// Test scaffolds are written once: they are a starting point the
    /// application extends, so an existing file under `tests/` is left
    /// alone. Everything under `src/generated/` is owned by the generator
    /// and overwritten on every run.
    fn write_output(&self, generated: &codegen::GeneratedCode) -> Result<(), GeneratorError> {
        std::fs::create_dir_all(&self.config.out_dir)
            .map_err(|e| GeneratorError::io(&self.config.out_dir, e.to_string()))?;

        for (filename, content) in &generated.files {
            let path = self.config.out_dir.join(filename);
            if filename.starts_with("tests/") && path.exists() {
                continue;
            }
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| GeneratorError::io(parent, e.to_string()))?;
            }
            std::fs::write(&path, content).map_err(|e| GeneratorError::io(&path, e.to_string()))?;
        }

        Ok(())
    }
}

/// A module specifier with no path separators that doesn't start with a
/// relative or absolute marker - a package import, not a file.
fn is_bare_specifier(s: &str) -> bool {
    if s.starts_with('.') || s.starts_with('/') {
        return false;
    }
    s.starts_with('@') || !s.contains('/')
}

fn strip_ts_extension(s: &str) -> &str {
    s.strip_suffix(".ts").unwrap_or(s)
}

/// Result of a successful generation run.
#[derive(Debug)]
pub struct GenerateResult {
    /// Number of entities generated for.
    pub entities: usize,
    /// Number of synthesized procedures.
    pub procedures: usize,
    /// Number of authorization rules (0 under a custom policy source).
    pub rules: usize,
}

impl GenerateResult {
    fn of(schema: &SchemaIR, synthesis: &Synthesis) -> Self {
        Self {
            entities: schema.entities.len(),
            procedures: synthesis.procedures.len(),
            rules: synthesis.rule_table.as_ref().map_or(0, ir::RuleTable::len),
        }
    }
}
