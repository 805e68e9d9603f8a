//! Report generation.
//!
//! A project is rendered top-down into a single Typst document: one section
//! per level, one sub-section per space, and within each space one list of
//! observations per location tag. Embedded photos are extracted through a
//! [`PhotoSink`] as they are encountered.
//!
//! Location tags are visited in a fixed order: `floor`, `wall`, `ceiling`,
//! then any custom tags in lexicographic order.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::markup::TypstWriter;
use crate::photo::{preview, DataUri, ImageStore, PhotoError, PhotoSink};
use crate::project::{Level, Observation, Project, Space};

/// Placeholder for missing building characteristics.
pub const NO_CHARACTERISTICS: &str = "Non spécifié.";
const NO_LEVELS: &str = "Aucun niveau enregistré pour ce projet.";
const NO_SPACES: &str = "Aucun espace enregistré pour ce niveau.";
const NO_OBSERVATIONS: &str = "Aucune observation enregistrée pour cet espace.";

/// One of the location tags every inspection app records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardLocation {
    /// `floor`
    Floor,
    /// `wall`
    Wall,
    /// `ceiling`
    Ceiling,
}

impl StandardLocation {
    /// Rendering order of the standard tags.
    pub const ORDER: [Self; 3] = [Self::Floor, Self::Wall, Self::Ceiling];

    /// Key used in the project JSON.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Floor => "floor",
            Self::Wall => "wall",
            Self::Ceiling => "ceiling",
        }
    }

    /// Label shown in the report.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Floor => "Sol",
            Self::Wall => "Mur",
            Self::Ceiling => "Plafond",
        }
    }

    /// Look up a standard tag by its JSON key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ORDER.into_iter().find(|loc| loc.key() == key)
    }
}

/// Where in a space a group of observations was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationTag<'a> {
    /// Floor, wall or ceiling.
    Standard(StandardLocation),
    /// Any other tag, as written in the project.
    Custom(&'a str),
}

impl LocationTag<'_> {
    /// Title of the section listing this location's observations.
    #[must_use]
    pub fn heading(&self) -> String {
        match self {
            Self::Standard(loc) => format!("Observations du {}", loc.label()),
            Self::Custom(tag) => format!("Observations de {}", capitalize(tag)),
        }
    }
}

/// Upper-case the first character and lower-case the rest.
#[must_use]
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// The non-empty observation groups of a space, in rendering order.
#[must_use]
pub fn ordered_locations(space: &Space) -> Vec<(LocationTag<'_>, &[Observation])> {
    let standard = StandardLocation::ORDER.into_iter().filter_map(|loc| {
        space
            .observations
            .get(loc.key())
            .map(|obs| (LocationTag::Standard(loc), obs.as_slice()))
    });

    // BTreeMap iteration is already sorted
    let custom = space
        .observations
        .iter()
        .filter(|(key, _)| StandardLocation::from_key(key).is_none())
        .map(|(key, obs)| (LocationTag::Custom(key.as_str()), obs.as_slice()));

    standard
        .chain(custom)
        .filter(|(_, obs)| !obs.is_empty())
        .collect()
}

/// Options controlling how a project is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Width of embedded images, in percent.
    pub width_percent: u8,
    /// Characters of a faulty photo quoted in its diagnostic.
    pub preview_chars: usize,
    /// Escape Typst markup in user text.
    pub escape_text: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width_percent: 50,
            preview_chars: 50,
            escape_text: false,
        }
    }
}

impl From<&Config> for RenderOptions {
    fn from(config: &Config) -> Self {
        Self {
            width_percent: config.images.width_percent,
            preview_chars: config.images.preview_chars,
            escape_text: config.markup.escape_text,
        }
    }
}

/// Counters collected while rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub levels: usize,
    pub spaces: usize,
    pub observations: usize,
    /// Photos stored and referenced from the report.
    pub images_written: usize,
    /// Photos replaced by a diagnostic comment.
    pub photo_diagnostics: usize,
}

/// A rendered report, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// The Typst document.
    pub markup: String,
    pub summary: ReportSummary,
}

/// Render `project` to Typst, extracting its photos into `sink`.
pub fn render_project(
    project: &Project,
    options: &RenderOptions,
    sink: &mut dyn PhotoSink,
) -> Rendered {
    let mut renderer = Renderer {
        out: TypstWriter::new().with_escaping(options.escape_text),
        options,
        sink,
        summary: ReportSummary::default(),
    };
    renderer.project(project);

    Rendered {
        markup: renderer.out.finish(),
        summary: renderer.summary,
    }
}

struct Renderer<'a> {
    out: TypstWriter,
    options: &'a RenderOptions,
    sink: &'a mut dyn PhotoSink,
    summary: ReportSummary,
}

impl Renderer<'_> {
    fn project(&mut self, project: &Project) {
        self.out
            .heading(1, &format!("Rapport d'Inspection : {}", project.location));
        self.out.line(&format!(
            "Caractéristiques du bâtiment : {}",
            project.characteristics().unwrap_or(NO_CHARACTERISTICS)
        ));
        self.out.spacing();

        if project.levels.is_empty() {
            self.out.line(NO_LEVELS);
            return;
        }
        for level in &project.levels {
            self.level(level);
        }
    }

    fn level(&mut self, level: &Level) {
        debug!(level = %level.name, spaces = level.spaces.len(), "Rendering level");
        self.summary.levels += 1;

        self.out.heading(2, &format!("Niveau : {}", level.name));
        self.out.spacing();

        if level.spaces.is_empty() {
            self.out.line(NO_SPACES);
            return;
        }
        for space in &level.spaces {
            self.space(space);
        }
    }

    fn space(&mut self, space: &Space) {
        debug!(space = %space.name, observations = space.observation_count(), "Rendering space");
        self.summary.spaces += 1;

        self.out.heading(3, &format!("Espace : {}", space.name));
        self.out.spacing();

        let locations = ordered_locations(space);
        if locations.is_empty() {
            self.out.line(NO_OBSERVATIONS);
        }
        for (tag, observations) in locations {
            self.location(tag, observations);
        }

        self.out.pagebreak();
    }

    fn location(&mut self, tag: LocationTag<'_>, observations: &[Observation]) {
        self.out.heading(4, &tag.heading());
        self.out.open_list();
        for obs in observations {
            self.observation(obs);
        }
        self.out.close_list();
        self.out.spacing();
    }

    fn observation(&mut self, obs: &Observation) {
        self.summary.observations += 1;
        self.out.bullet(&obs.text);

        if obs.photos.is_empty() {
            return;
        }
        self.out.item_spacing();
        for (index, raw) in obs.photos.iter().enumerate() {
            self.photo(obs, index, raw);
        }
    }

    fn photo(&mut self, obs: &Observation, index: usize, raw: &str) {
        let stored = DataUri::parse(raw).and_then(|uri| self.sink.store(&obs.id, index, &uri));

        match stored {
            Ok(reference) => {
                self.out.image(&reference, self.options.width_percent);
                self.out.item_spacing();
                self.summary.images_written += 1;
            }
            Err(err) => {
                warn!(observation = %obs.id, index, "Photo not extracted: {err}");
                self.out.comment(&diagnostic(obs, raw, &err, self.options.preview_chars));
                self.summary.photo_diagnostics += 1;
            }
        }
    }
}

/// The one-line comment left in place of a photo that could not be extracted.
fn diagnostic(obs: &Observation, raw: &str, err: &PhotoError, preview_chars: usize) -> String {
    let id = preview(&obs.id, usize::MAX);
    let data = preview(raw, preview_chars);
    if err.is_unrecognized() {
        format!(
            "Format d'image base64 non reconnu pour l'observation {id}. \
             Données Base64 (pour débogage): {data}..."
        )
    } else {
        let err = preview(&err.to_string(), usize::MAX);
        let err = err.trim_end_matches('.');
        format!(
            "Erreur lors de l'extraction de l'image pour l'observation {id}: {err}. \
             Données Base64 (pour débogage): {data}..."
        )
    }
}

/// Files produced by a successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutput {
    /// The generated Typst document.
    pub report_path: PathBuf,
    /// Directory holding the extracted photos.
    pub images_dir: PathBuf,
    pub summary: ReportSummary,
}

/// Builds a report directory from a project JSON file.
#[derive(Debug, Clone, Default)]
pub struct ReportBuilder {
    config: Config,
}

impl ReportBuilder {
    /// Create a builder with the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generate the report for `json_path` into `output_dir`.
    ///
    /// The project is loaded and validated before anything is created, so a
    /// load failure leaves the file system untouched. Photos that cannot be
    /// extracted do not fail the build; they are reported in the markup.
    ///
    /// # Errors
    ///
    /// Returns a load error ([`Error::is_load_error`]) if the project cannot
    /// be read, parsed or validated, and an I/O error if the output directory
    /// or report file cannot be written.
    pub fn build(
        &self,
        json_path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
    ) -> Result<ReportOutput> {
        let json_path = json_path.as_ref();
        let output_dir = output_dir.as_ref();

        let project = Project::load(json_path)?;
        info!(
            "Loaded project '{}': {} level(s), {} space(s), {} observation(s), {} photo(s)",
            project.location,
            project.levels.len(),
            project.space_count(),
            project.observation_count(),
            project.photo_count()
        );

        std::fs::create_dir_all(output_dir).map_err(|source| Error::DirectoryCreate {
            path: output_dir.to_path_buf(),
            source,
        })?;
        let mut store = ImageStore::create(
            self.config.images_path(output_dir),
            self.config.output.images_dir.clone(),
        )?;

        let rendered = render_project(&project, &RenderOptions::from(&self.config), &mut store);

        let report_path = self.config.report_path(output_dir);
        std::fs::write(&report_path, rendered.markup).map_err(|source| Error::FileWrite {
            path: report_path.clone(),
            source,
        })?;

        info!(
            "Wrote {} with {} image(s), {} photo diagnostic(s)",
            report_path.display(),
            rendered.summary.images_written,
            rendered.summary.photo_diagnostics
        );

        Ok(ReportOutput {
            report_path,
            images_dir: store.dir().to_path_buf(),
            summary: rendered.summary,
        })
    }
}
