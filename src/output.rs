//! Output formatting for search results

use crate::query::{DisplayFormat, Group, ResultSet};
use crate::store::{Picture, Species, SpeciesId, SpeciesStore, Status, StoreResult};
use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

pub const EMPTY_MESSAGE: &str = "No species found.";

/// Pictures per species, fetched only for gallery output
pub type PictureMap = FxHashMap<SpeciesId, Vec<Picture>>;

/// Fetch pictures for every species in the result set
pub async fn collect_pictures(
    store: &dyn SpeciesStore,
    results: &ResultSet,
) -> StoreResult<PictureMap> {
    let species = results.unique_species();
    let pictures = try_join_all(species.iter().map(|sp| store.pictures(sp))).await?;
    Ok(species.iter().map(|sp| sp.id).zip(pictures).collect())
}

/// Print a result set according to its display format.
///
/// `max_display` caps the number of printed species lines (0 = no cap).
pub fn print_results<W: WriteColor>(
    out: &mut W,
    results: &ResultSet,
    pictures: &PictureMap,
    max_display: usize,
) -> io::Result<()> {
    if results.is_empty() {
        writeln!(out, "{}", EMPTY_MESSAGE)?;
        return Ok(());
    }

    match results.display_format() {
        DisplayFormat::Leaderboard => print_leaderboard(out, results, max_display),
        DisplayFormat::Gallery => print_gallery(out, results, pictures, max_display),
        DisplayFormat::None => print_list(out, results, max_display),
    }
}

fn print_list<W: WriteColor>(
    out: &mut W,
    results: &ResultSet,
    max_display: usize,
) -> io::Result<()> {
    let headings = !results.has_default_grouping();
    let indent = if headings { "  " } else { "" };
    let mut budget = Budget::new(max_display, results.len());

    for (i, group) in results.groups().into_iter().enumerate() {
        if budget.exhausted() {
            break;
        }
        if headings {
            if i > 0 {
                writeln!(out)?;
            }
            print_heading(out, group)?;
        }
        for sp in group.items() {
            if !budget.take() {
                break;
            }
            write!(out, "{}", indent)?;
            print_species(out, group, sp)?;
            writeln!(out)?;
        }
    }

    budget.finish(out)
}

fn print_leaderboard<W: WriteColor>(
    out: &mut W,
    results: &ResultSet,
    max_display: usize,
) -> io::Result<()> {
    let groups = results.groups();
    let mut budget = Budget::new(max_display, groups.len());
    let width = groups.len().to_string().len();

    for (rank, group) in groups.into_iter().enumerate() {
        if !budget.take() {
            break;
        }
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:>width$}.", rank + 1, width = width)?;
        out.reset()?;
        out.set_color(ColorSpec::new().set_bold(true))?;
        write!(out, " {}", display_group_name(group))?;
        out.reset()?;
        writeln!(out, " ({})", group.len())?;
    }

    budget.finish(out)
}

fn print_gallery<W: WriteColor>(
    out: &mut W,
    results: &ResultSet,
    pictures: &PictureMap,
    max_display: usize,
) -> io::Result<()> {
    let headings = !results.has_default_grouping();
    let mut budget = Budget::new(max_display, results.len());

    for group in results.groups() {
        if budget.exhausted() {
            break;
        }
        if headings {
            print_heading(out, group)?;
        }
        for sp in group.items() {
            if !budget.take() {
                break;
            }
            print_species(out, group, sp)?;
            writeln!(out)?;

            let pics = pictures.get(&sp.id).map(Vec::as_slice).unwrap_or_default();
            if pics.is_empty() {
                out.set_color(ColorSpec::new().set_dimmed(true))?;
                writeln!(out, "    (no pictures)")?;
                out.reset()?;
            }
            for pic in pics {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
                write!(out, "    {}", pic.url)?;
                out.reset()?;
                match &pic.artist {
                    Some(artist) => writeln!(out, " (by {})", artist)?,
                    None => writeln!(out)?,
                }
            }
        }
    }

    budget.finish(out)
}

fn print_heading<W: WriteColor>(out: &mut W, group: &Group) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)).set_bold(true))?;
    write!(out, "{}", display_group_name(group))?;
    out.reset()?;
    writeln!(out, " ({})", group.len())
}

fn print_species<W: WriteColor>(out: &mut W, group: &Group, species: &Species) -> io::Result<()> {
    if species.is_extinct() {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
    }
    write!(out, "{}", group.format(species))?;
    out.reset()
}

fn display_group_name(group: &Group) -> &str {
    if group.name().is_empty() {
        "All species"
    } else {
        group.name()
    }
}

/// Counts printed lines against `max_display`
struct Budget {
    limit: usize,
    total: usize,
    printed: usize,
}

impl Budget {
    fn new(limit: usize, total: usize) -> Self {
        Self {
            limit,
            total,
            printed: 0,
        }
    }

    fn exhausted(&self) -> bool {
        self.limit > 0 && self.printed >= self.limit
    }

    fn take(&mut self) -> bool {
        if self.exhausted() {
            return false;
        }
        self.printed += 1;
        true
    }

    fn finish<W: WriteColor>(&self, out: &mut W) -> io::Result<()> {
        if self.exhausted() && self.total > self.printed {
            out.set_color(ColorSpec::new().set_dimmed(true))?;
            writeln!(out, "... and {} more", self.total - self.printed)?;
            out.reset()?;
        }
        Ok(())
    }
}

/// Machine-readable form of a result set (`--json`)
#[derive(Debug, Serialize)]
pub struct JsonReport {
    pub display_format: DisplayFormat,
    pub total: usize,
    pub groups: Vec<JsonGroup>,
}

#[derive(Debug, Serialize)]
pub struct JsonGroup {
    pub name: String,
    pub count: usize,
    pub species: Vec<JsonSpecies>,
}

#[derive(Debug, Serialize)]
pub struct JsonSpecies {
    pub id: SpeciesId,
    /// Rendered through the group's formatter
    pub display: String,
    pub full_name: String,
    pub status: Status,
    pub created: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pictures: Vec<Picture>,
}

impl JsonReport {
    pub fn from_results(results: &ResultSet, pictures: &PictureMap) -> Self {
        let groups = results
            .groups()
            .into_iter()
            .map(|group| JsonGroup {
                name: group.name().to_string(),
                count: group.len(),
                species: group
                    .items()
                    .iter()
                    .map(|sp| JsonSpecies {
                        id: sp.id,
                        display: group.format(sp),
                        full_name: sp.full_name(),
                        status: sp.status,
                        created: sp.created,
                        pictures: pictures.get(&sp.id).cloned().unwrap_or_default(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            display_format: results.display_format(),
            total: results.len(),
            groups,
        }
    }
}

/// Write a result set as pretty-printed JSON
pub fn print_json<W: Write>(
    out: &mut W,
    results: &ResultSet,
    pictures: &PictureMap,
) -> io::Result<()> {
    let report = JsonReport::from_results(results, pictures);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}
