//! Slide inspection report.
//!
//! Opens a slide through a [`SlideBackend`] and writes a fixed list of
//! fields, one per line:
//!
//! ```text
//! aperio
//! level_count= 3
//! dimensions= (46000, 32914)
//! level_dimensions= ((46000, 32914), (11500, 8228), (2875, 2057))
//! level_downsamples= (1.0, 4.000170502033838, 16.00184247787362)
//! objective-power= 20
//! MPP= 0.4990
//! Properties= {"aperio.AppMag": "20", ...}
//! ```
//!
//! Each line is flushed as soon as it is written. The first failure ends the
//! report; lines already written stay written.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::InspectError;
use crate::slide::{SlideBackend, SlideHandle, PROPERTY_OBJECTIVE_POWER};

/// Property printed on the `objective-power=` line.
pub const OBJECTIVE_POWER_KEY: &str = PROPERTY_OBJECTIVE_POWER;

/// Property printed on the `MPP=` line.
pub const MPP_KEY: &str = "aperio.MPP";

/// Printed in place of a format identifier when detection finds nothing.
pub const UNKNOWN_FORMAT: &str = "unknown";

/// Inspect the slide at `path` and write the report to `out`.
///
/// The slide is opened before anything is written, so a missing or
/// unparseable file produces no output. The handle is released when this
/// function returns, on success and on every error path.
///
/// # Errors
/// - `NotFound` when the path does not resolve to a readable file
/// - `Format` when the container cannot be parsed
/// - `MissingProperty` when the objective power or MPP key is absent
/// - `Output` when writing to `out` fails
pub async fn inspect<B, W>(backend: &B, path: &Path, out: &mut W) -> Result<(), InspectError>
where
    B: SlideBackend,
    W: Write,
{
    let slide = backend.open(path).await?;
    let format = backend.detect_format(path).await?;
    debug!(path = %path.display(), ?format, "Inspecting slide");

    let format_id = format.map(|f| f.vendor()).unwrap_or(UNKNOWN_FORMAT);
    emit(out, format_args!("{}", format_id))?;
    write_report(&slide, out)
}

/// Write every field after the format line.
fn write_report<H, W>(slide: &H, out: &mut W) -> Result<(), InspectError>
where
    H: SlideHandle,
    W: Write,
{
    let (width, height) = slide.dimensions();

    emit(out, format_args!("level_count= {}", slide.level_count()))?;
    emit(out, format_args!("dimensions= ({}, {})", width, height))?;
    emit(
        out,
        format_args!(
            "level_dimensions= {}",
            tuple(slide.level_dimensions().iter().map(|(w, h)| format!("({}, {})", w, h)))
        ),
    )?;
    emit(
        out,
        format_args!(
            "level_downsamples= {}",
            tuple(slide.level_downsamples().iter().map(|d| format!("{:?}", d)))
        ),
    )?;

    let properties = slide.properties();
    emit(
        out,
        format_args!("objective-power= {}", properties.require(OBJECTIVE_POWER_KEY)?),
    )?;
    emit(out, format_args!("MPP= {}", properties.require(MPP_KEY)?))?;
    emit(out, format_args!("Properties= {:?}", properties))?;

    Ok(())
}

/// Write one line and flush it.
fn emit<W: Write>(out: &mut W, line: std::fmt::Arguments<'_>) -> Result<(), InspectError> {
    out.write_fmt(line)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Join already formatted items as `(a, b, c)`.
fn tuple<I, T>(items: I) -> String
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let parts: Vec<T> = items.into_iter().collect();
    let joined = parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(", ");
    format!("({})", joined)
}
