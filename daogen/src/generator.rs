//! Generation pipeline
//!
//! describe columns → translate → build the [`ModelSpec`] → render → emit.

use crate::codegen::{CodeRenderer, GeneratedFile, ModelSpec, ModulePathResolver};
use crate::config::GeneratorConfig;
use crate::emit::{EmittedFile, Emitter, FileSink, LocalFileSystem};
use crate::error::Result;
use crate::schema::{
    describe_as_json, translate, ConnectionSettings, MySqlSchemaSource, RawColumn, SchemaSource,
};
use std::path::Path;
use tracing::{debug, info};

/// Result of one generator run
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// The model that was generated
    pub spec: ModelSpec,
    /// Every file considered, in emission order
    pub files: Vec<EmittedFile>,
}

/// Drives one generation run for a validated configuration
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
    resolver: ModulePathResolver,
    settings: ConnectionSettings,
}

impl Generator {
    /// Create a generator
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::Validation`] if required options are missing.
    pub fn new(config: GeneratorConfig, working_dir: &Path) -> Result<Self> {
        config.validate()?;
        let resolver = ModulePathResolver::from_config(&config.module_root, working_dir);
        Ok(Self {
            config,
            resolver,
            settings: ConnectionSettings::default(),
        })
    }

    /// The configuration in use
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Pool settings for the schema connection and the generated utility
    #[must_use]
    pub const fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Fetch the column descriptions of the configured table
    ///
    /// # Errors
    ///
    /// Propagates the schema source's error, e.g.
    /// [`crate::GenError::TableNotFound`].
    pub async fn describe<S>(&self, source: &S) -> Result<Vec<RawColumn>>
    where
        S: SchemaSource + ?Sized,
    {
        let columns = source.describe_columns(self.config.table_name()).await?;
        debug!(table = %self.config.table_name(), columns = %describe_as_json(&columns), "described table");
        Ok(columns)
    }

    /// Translate columns into the model to generate
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::Validation`] if two columns collide on the
    /// same member name.
    pub fn plan(&self, columns: &[RawColumn]) -> Result<ModelSpec> {
        let (fields, needs_datetime_import) = translate(columns);
        ModelSpec::new(&self.config, fields, needs_datetime_import, &self.resolver)
    }

    /// Render the files for `spec`
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::Template`] if a template fails to render.
    pub fn render(&self, spec: &ModelSpec) -> Result<Vec<GeneratedFile>> {
        CodeRenderer::with_settings(spec, self.settings.clone()).render_all()
    }

    /// Write rendered files through `sink`
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenError::Io`] on the first failed write.
    pub fn emit<F: FileSink>(&self, sink: F, files: &[GeneratedFile]) -> Result<Vec<EmittedFile>> {
        Emitter::new(sink, self.config.force).emit_all(files)
    }

    /// Run the whole pipeline against `source`, writing through `sink`
    ///
    /// # Errors
    ///
    /// Returns the first error of any stage.
    pub async fn generate<S, F>(&self, source: &S, sink: F) -> Result<GenerationReport>
    where
        S: SchemaSource + ?Sized,
        F: FileSink,
    {
        let columns = self.describe(source).await?;
        let spec = self.plan(&columns)?;
        let rendered = self.render(&spec)?;
        let files = self.emit(sink, &rendered)?;
        info!(model = %spec.model_name, files = files.len(), "generation finished");
        Ok(GenerationReport { spec, files })
    }
}

/// Connect to the configured database and generate into `working_dir`
///
/// # Errors
///
/// Returns [`crate::GenError::Validation`] for incomplete options,
/// [`crate::GenError::Connection`] if the database is unreachable, and any
/// error of the later stages.
pub async fn run(config: GeneratorConfig, working_dir: &Path) -> Result<GenerationReport> {
    let generator = Generator::new(config, working_dir)?;
    let source = MySqlSchemaSource::connect(&generator.config().connection, generator.settings()).await?;
    let report = generator
        .generate(&source, LocalFileSystem::new(working_dir))
        .await;
    source.close().await;
    report
}
