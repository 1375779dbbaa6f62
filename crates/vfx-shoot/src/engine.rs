//! Shoot session: from selected files to finished movies.
//!
//! A [`ShootEngine`] moves through
//! `Empty -> SequencesBuilt -> [Combined] -> MoviesCreated`:
//!
//! - [`create_sequences`](ShootEngine::create_sequences) rebuilds the
//!   session from files and folders
//! - [`combine_sequences`](ShootEngine::combine_sequences) re-indexes every
//!   sequence into one synthetic sequence in the scratch area
//! - [`separate_sequences`](ShootEngine::separate_sequences) drops it again
//! - [`create_movie`](ShootEngine::create_movie) encodes one movie per
//!   visible sequence, materializing frames when needed
//!
//! While combined, the originals stay in the session behind the combined
//! sequence, which is always the last entry, and only the combined one is
//! visible through [`sequences`](ShootEngine::sequences).

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, trace, warn};
use vfx_seq::format::is_image_path;
use vfx_seq::validate::{
    movie_name_hint, validate_frame_range, validate_image_format, validate_movie_name,
    validate_range_bounds, validate_steps, RANGE_NOT_APPLICABLE,
};
use vfx_seq::{DecoderProbe, FrameRange, Image, ImageProbe, ImageSequence};

use crate::config::ShootConfig;
use crate::copy::{copy_batch, CopyJob};
use crate::encode::{EncodeJob, FfmpegEncoder, MovieEncoder};
use crate::fill::{needs_materialize, resolve_range, FramePlan, GapPolicy};
use crate::placeholder::resolve_placeholder;
use crate::player::{ExternalPlayer, MoviePlayer};
use crate::scratch::ScratchDir;
use crate::{ShootError, ShootResult};

/// Base name of re-indexed frames in a combined sequence.
pub const COMBINED_BASE_NAME: &str = "img_temp";

/// Frame padding of a combined sequence.
pub const COMBINED_PAD: usize = 4;

static BRACKET_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing loaded.
    Empty,
    /// Sequences discovered.
    SequencesBuilt,
    /// A combined sequence is active.
    Combined,
    /// At least one batch of movies was attempted.
    MoviesCreated,
}

/// Restricts which files of an expanded folder are used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageFilter {
    /// Keep only images with this base name.
    pub base_name: Option<String>,
    /// Keep only images with this extension (any case).
    pub ext: Option<String>,
}

impl ImageFilter {
    fn accepts(&self, image: &Image) -> bool {
        self.base_name.as_deref().is_none_or(|b| image.base_name() == b)
            && self
                .ext
                .as_deref()
                .is_none_or(|e| image.ext().eq_ignore_ascii_case(e.trim_start_matches('.')))
    }
}

/// Result of a movie batch.
#[derive(Debug, Clone, Default)]
pub struct MovieReport {
    /// Movies written.
    pub movies: Vec<PathBuf>,
    /// Per-sequence problems; the batch went on past each of them.
    pub warnings: Vec<String>,
}

impl MovieReport {
    /// True if nothing went wrong.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Movie creation session.
pub struct ShootEngine {
    config: ShootConfig,
    scratch: ScratchDir,
    probe: Box<dyn ImageProbe>,
    encoder: Box<dyn MovieEncoder>,
    player: Box<dyn MoviePlayer>,
    filter: ImageFilter,
    seq_list: Vec<ImageSequence>,
    combine: bool,
    combined: bool,
    frame_hold: bool,
    state: SessionState,
}

impl ShootEngine {
    /// Creates a session using ffmpeg and the player named in `config`.
    pub fn new(config: ShootConfig) -> Self {
        Self {
            scratch: ScratchDir::new(&config.scratch_dir),
            probe: Box::new(DecoderProbe),
            encoder: Box::new(FfmpegEncoder::new(&config.encoder)),
            player: Box::new(ExternalPlayer::new(&config.player, config.player_args.clone())),
            filter: ImageFilter::default(),
            seq_list: Vec::new(),
            combine: false,
            combined: false,
            frame_hold: config.frame_hold,
            state: SessionState::Empty,
            config,
        }
    }

    /// Replaces the encoder.
    pub fn with_encoder(mut self, encoder: Box<dyn MovieEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Replaces the player.
    pub fn with_player(mut self, player: Box<dyn MoviePlayer>) -> Self {
        self.player = player;
        self
    }

    /// Replaces the image size probe.
    pub fn with_probe(mut self, probe: Box<dyn ImageProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Restricts folder expansion.
    pub fn with_filter(mut self, filter: ImageFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &ShootConfig {
        &self.config
    }

    /// Scratch area.
    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Hold previous frames over gaps (`true`) or use placeholders.
    pub fn frame_hold(&self) -> bool {
        self.frame_hold
    }

    /// Sets the gap policy.
    pub fn set_frame_hold(&mut self, hold: bool) {
        self.frame_hold = hold;
    }

    /// Whether sequences are combined into one movie.
    pub fn combine(&self) -> bool {
        self.combine
    }

    /// Turns combining on or off, applying it to the loaded sequences.
    pub fn set_combine(&mut self, combine: bool) -> ShootResult<()> {
        self.combine = combine;
        if combine && !self.combined && !self.seq_list.is_empty() {
            self.combine_sequences()?;
        } else if !combine {
            self.separate_sequences();
        }
        Ok(())
    }

    /// Visible sequences: the combined one alone while combined.
    pub fn sequences(&self) -> &[ImageSequence] {
        if self.combined {
            &self.seq_list[self.seq_list.len() - 1..]
        } else {
            &self.seq_list
        }
    }

    /// Sequences as loaded, without the combined one.
    pub fn original_sequences(&self) -> &[ImageSequence] {
        if self.combined {
            &self.seq_list[..self.seq_list.len() - 1]
        } else {
            &self.seq_list
        }
    }

    /// True while a combined sequence is active.
    pub fn is_combined(&self) -> bool {
        self.combined
    }

    /// Rebuilds the session from files and folders.
    ///
    /// Folders contribute their supported images (filtered by
    /// [`with_filter`](Self::with_filter)); files are taken as given. Each
    /// image joins the first sequence that includes it. If any image
    /// cannot be loaded, nothing is built and every failure is reported.
    pub fn create_sequences<P: AsRef<Path>>(&mut self, paths: &[P]) -> ShootResult<()> {
        trace!(paths = paths.len(), "ShootEngine::create_sequences");
        self.seq_list.clear();
        self.combined = false;
        self.state = SessionState::Empty;

        let mut files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                files.extend(self.expand_dir(path)?);
            } else {
                files.push(path.to_path_buf());
            }
        }

        let mut images = Vec::with_capacity(files.len());
        let mut errors = Vec::new();
        for file in &files {
            match Image::open_with(file, self.probe.as_ref()) {
                Ok(image) => images.push(image),
                Err(e) => errors.push(e.to_string()),
            }
        }
        if !errors.is_empty() {
            return Err(ShootError::Load(errors));
        }
        if images.is_empty() {
            return Err(ShootError::NoSequences);
        }

        self.seq_list = ImageSequence::group(images, self.config.strict_pad);
        self.state = SessionState::SequencesBuilt;
        info!(sequences = self.seq_list.len(), images = files.len(), "sequences built");
        for seq in &self.seq_list {
            debug!(sequence = %seq, "found");
        }

        if self.combine {
            self.combine_sequences()?;
        }
        Ok(())
    }

    fn expand_dir(&self, dir: &Path) -> ShootResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_image_path(&path) {
                files.push(path);
            }
        }
        files.sort();

        if self.filter == ImageFilter::default() {
            return Ok(files);
        }
        // Filtering needs the decomposed name; probing waits for the caller.
        Ok(files
            .into_iter()
            .filter(|p| {
                let probe = vfx_seq::FixedProbe::new(0, 0);
                Image::open_with(p, &probe).is_ok_and(|img| self.filter.accepts(&img))
            })
            .collect())
    }

    /// Merges every loaded sequence into one re-indexed sequence.
    ///
    /// Frames keep their sequence order and their order within each
    /// sequence, and are copied to `img_temp.0001.<ext>` onwards in the
    /// scratch area. Any copy failure aborts without touching the session.
    pub fn combine_sequences(&mut self) -> ShootResult<()> {
        trace!("ShootEngine::combine_sequences");
        if self.combined {
            self.separate_sequences();
        }
        if self.seq_list.is_empty() {
            return Err(ShootError::NoSequences);
        }

        let mut exts: Vec<String> = self
            .seq_list
            .iter()
            .map(|s| s.ext().to_lowercase())
            .collect();
        exts.sort();
        exts.dedup();
        if exts.len() > 1 {
            return Err(ShootError::MixedFormats(exts.join(", ")));
        }
        let ext = self.seq_list[0].ext().to_string();

        let dir = self.scratch.combine_dir();
        self.scratch.reset(&dir)?;

        let jobs: Vec<CopyJob> = self
            .seq_list
            .iter()
            .flat_map(|seq| seq.sorted_images())
            .enumerate()
            .map(|(i, img)| {
                let name = format!(
                    "{}.{:0pad$}.{}",
                    COMBINED_BASE_NAME,
                    i + 1,
                    ext,
                    pad = COMBINED_PAD
                );
                CopyJob::new(img.path(), dir.join(name))
            })
            .collect();

        copy_batch(&jobs, self.config.combine_workers)?.into_result(true)?;

        let images = jobs
            .iter()
            .map(|job| Image::open_with(&job.dest, self.probe.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let combined = ImageSequence::from_images(images, self.config.strict_pad)?;

        info!(frames = combined.len(), sequences = self.seq_list.len(), "sequences combined");
        self.seq_list.push(combined);
        self.combined = true;
        self.state = SessionState::Combined;
        Ok(())
    }

    /// Drops the combined sequence, restoring the originals.
    ///
    /// Does nothing unless a combined sequence is active.
    pub fn separate_sequences(&mut self) {
        trace!("ShootEngine::separate_sequences");
        if self.combined {
            self.seq_list.pop();
            self.combined = false;
            self.state = SessionState::SequencesBuilt;
        }
    }

    /// Runs every pre-flight check for a movie batch.
    pub fn validate(&self, steps: u64, frame_range: &str, output: &str) -> ShootResult<()> {
        let seqs = self.sequences();
        if seqs.is_empty() {
            return Err(ShootError::NoSequences);
        }

        let mut problems = Vec::new();
        for seq in seqs {
            problems.extend(validate_steps(seq, steps));
            problems.extend(validate_image_format(seq));
        }
        if !frame_range.trim().is_empty() {
            if !validate_frame_range(frame_range) {
                problems.push(format!("Invalid frame range '{}'.", frame_range));
            } else {
                problems.extend(validate_range_bounds(frame_range));
            }
        }
        if !validate_movie_name(seqs, self.combined, output) {
            problems.push(movie_name_hint(seqs.len() > 1 && !self.combined));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ShootError::Validation(problems))
        }
    }

    /// Encodes one movie per visible sequence.
    ///
    /// `frame_range` is read loosely (first and last number) and widened to
    /// cover each sequence's own frames; empty or `N/A` means the sequence
    /// range alone. `output` may carry `%d`
    /// (1-based sequence index) or `[seq_shot]` (sequence name) when
    /// several sequences are written separately. A failure on one sequence
    /// is logged in the report and the batch moves on.
    pub fn create_movie(
        &mut self,
        steps: u64,
        frame_range: &str,
        output: &str,
        high_quality: bool,
    ) -> ShootResult<MovieReport> {
        trace!(steps, frame_range, output, high_quality, "ShootEngine::create_movie");
        self.validate(steps, frame_range, output)?;

        let user_range = if frame_range.trim() == RANGE_NOT_APPLICABLE {
            None
        } else {
            FrameRange::parse_loose(frame_range)?
        };

        self.scratch.reset(&self.scratch.frames_dir())?;

        let mut report = MovieReport::default();
        let seqs = self.sequences();
        let multiple = seqs.len() > 1 && !self.combined;

        for (index, seq) in seqs.iter().enumerate() {
            let movie = resolve_output(output, index, seq, multiple);
            match self.encode_sequence(index, seq, user_range, steps, &movie, high_quality) {
                Ok(warnings) => {
                    report.warnings.extend(warnings);
                    report.movies.push(movie);
                }
                Err(e) => {
                    warn!(sequence = %seq, error = %e, "movie failed");
                    report.warnings.push(format!("{}: {}", seq.name(), e));
                }
            }
        }

        self.state = SessionState::MoviesCreated;
        info!(
            movies = report.movies.len(),
            warnings = report.warnings.len(),
            "movie batch done"
        );
        Ok(report)
    }

    fn encode_sequence(
        &self,
        index: usize,
        seq: &ImageSequence,
        user_range: Option<FrameRange>,
        steps: u64,
        movie: &Path,
        high_quality: bool,
    ) -> ShootResult<Vec<String>> {
        let range = resolve_range(seq, user_range);
        let size = seq.dimensions().unwrap_or((0, 0));
        let mut warnings = Vec::new();

        let input = if needs_materialize(seq, range, steps) {
            let plan = FramePlan::new(seq, range, steps, self.scratch.sequence_dir(index));
            self.scratch.reset(plan.dir())?;
            let policy = if self.frame_hold {
                GapPolicy::Hold
            } else {
                GapPolicy::Placeholder(resolve_placeholder(
                    self.config.placeholder_dir.as_deref(),
                    &self.scratch.placeholder_dir(),
                    seq.ext(),
                    size,
                )?)
            };
            let filled = plan.execute(&policy, self.config.copy_workers, self.config.strict_copy)?;
            warnings.extend(filled.warnings);
            plan.pattern()
        } else {
            debug!(sequence = %seq, "encoding from source frames");
            PathBuf::from(seq.printf_pattern())
        };

        let job = EncodeJob {
            input,
            start_number: range.start(),
            frame_count: range.len(),
            size,
            output: movie.to_path_buf(),
            high_quality,
            fps: self.config.fps,
            crf: self.config.crf,
            linear_input: seq.ext().eq_ignore_ascii_case("exr"),
        };
        self.encoder.encode(&job)?;
        Ok(warnings)
    }

    /// Opens `movies` in the configured player.
    pub fn play_movies(&self, movies: &[PathBuf]) -> ShootResult<()> {
        trace!(movies = movies.len(), "ShootEngine::play_movies");
        if movies.is_empty() {
            return Err(ShootError::Player("no movies to play".into()));
        }
        self.player.play(movies)
    }

    /// Removes the scratch area. Safe to call repeatedly.
    pub fn cleanup(&self) -> ShootResult<()> {
        trace!("ShootEngine::cleanup");
        self.scratch.cleanup()?;
        Ok(())
    }
}

/// Output path for sequence `index`.
///
/// When several sequences are written separately, `%d` becomes the 1-based
/// index and any `[...]` token the sequence name; otherwise `template` is
/// used verbatim.
pub fn resolve_output(template: &str, index: usize, seq: &ImageSequence, multiple: bool) -> PathBuf {
    if !multiple {
        return PathBuf::from(template);
    }
    let numbered = template.replace("%d", &(index + 1).to_string());
    let name = seq.name();
    PathBuf::from(BRACKET_TOKEN.replace_all(&numbered, regex::NoExpand(&name)).into_owned())
}
