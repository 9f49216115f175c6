//! Writing figures to disk.

use crate::error::Result;
use crate::figure::Figure;
use crate::html::render_html_page;
use rd_common::FigureFormat;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Make a figure name usable as a single path component.
pub fn sanitize_name(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// Save `fig` to `stem` with the extension of `fmt`, creating parent
/// directories as needed. Returns the written path.
pub fn save_fig(stem: &Path, fig: &Figure, fmt: FigureFormat) -> Result<PathBuf> {
    // Append rather than replace: stems may contain dots, e.g. a discount.
    let mut path = stem.as_os_str().to_owned();
    path.push(".");
    path.push(fmt.extension());
    let path = PathBuf::from(path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let contents = match fmt {
        FigureFormat::Svg => fig.render_svg()?,
        FigureFormat::Html => {
            let name = stem
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            render_html_page(fig, &name)?
        }
    };

    info!(path = %path.display(), "Saving figure to {}", path.display());
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(path)
}

/// Save each named figure under `root_dir`. Names may contain `/`, which is
/// replaced so every figure lands directly in `root_dir`.
pub fn save_figs<'a, I>(root_dir: &Path, figs: I, fmt: FigureFormat) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = (&'a str, &'a Figure)>,
{
    figs.into_iter()
        .map(|(name, fig)| save_fig(&root_dir.join(sanitize_name(name)), fig, fmt))
        .collect()
}
